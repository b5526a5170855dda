pub mod broker;
pub mod chat;
pub mod market;
pub mod orders;
pub mod portfolio;
pub mod responses;
