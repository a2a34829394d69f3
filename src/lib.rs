//! Scrapegate - Proxy Identity Gateway
//!
//! Routes scraping and transcript traffic through Tor or paid residential
//! proxy pools and stores learning statistics in ClickHouse.
//!
//! ## Features
//!
//! - Per-vendor authenticated proxy URLs for five residential providers
//! - Rotating session identity for sticky-IP vendors
//! - Tor circuit rotation over the control protocol
//! - Headless Chromium scraping with metadata and main-content extraction
//! - YouTube transcript retrieval through the active proxy
//! - Statistics ingestion into ClickHouse

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod proxy;
pub mod services;

pub use config::Config;
pub use error::{Result, ScrapeGateError};
