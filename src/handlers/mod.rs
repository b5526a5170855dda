pub mod auth;
pub mod chat;
pub mod health;
pub mod market;
pub mod orders;
pub mod portfolio;
