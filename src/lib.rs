//! Brokerage dashboard backend: portfolio analytics, market data, order
//! placement and a keyword chat assistant over a live Kite Connect account or
//! fixed demo data.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
