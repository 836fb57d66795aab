#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod dedup;
pub mod error;
pub mod ggus;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod telemetry;
pub mod types;

pub type Result<T> = std::result::Result<T, error::Error>;
