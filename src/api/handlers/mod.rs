//! API request handlers

pub mod health;
pub mod proxy;
pub mod scrape;
pub mod stats;
pub mod tor;
pub mod transcript;
