pub mod check;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod resolve;

pub use check::{CheckOptions, CheckOutcome, Checker, check_high_critical_issues};
pub use client::{AuthScheme, SnykApi, SnykClient};
pub use config::Config;
pub use error::ApiError;
