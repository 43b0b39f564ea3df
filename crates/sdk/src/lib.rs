//! Imhotep SDK - Rust Client Library
//!
//! Submit inventory datasets to the Imhotep forecasting API, follow the
//! resulting job by polling or by server push, and fetch the result.
//!
//! # Example
//!
//! ```no_run
//! use imhotep_sdk::{ClientConfig, ForecastClient};
//! use imhotep_core::application::TransportKind;
//! use imhotep_core::port::CookieSession;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::load(None)?;
//!     let session = Arc::new(CookieSession::with_default_names("imhotep_token=abc"));
//!     let client = ForecastClient::connect(config, session)?;
//!
//!     let outcome = client.submit_sample(Some("retail".to_string())).await?;
//!     let result = client.wait_for_result(outcome, TransportKind::Push).await?;
//!
//!     println!("{} SKUs forecast", result.forecasts.len());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;

pub use client::{read_dataset, ForecastClient, UNASSIGNED_JOB_ID};
pub use config::{default_config_path, ClientConfig};
pub use error::{Result, SdkError};

// Convenience re-exports so callers need only this crate
pub use imhotep_core::application::{
    Completion, JobOutcome, JobUpdate, Observation, ResultView, TransportKind,
};
pub use imhotep_core::domain::{ForecastResult, ForecastSeries, SubmissionOutcome};
pub use imhotep_core::port::{CookieSession, SessionProvider, StaticSession};
