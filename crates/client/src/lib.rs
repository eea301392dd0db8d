//! Client for a remote key-value source-of-truth service.
//!
//! Values are sealed with AES-256-GCM before they leave the process and
//! opened after they come back; the service only ever sees envelopes.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! let client = sot_client::Client::from_env()?;
//! let outcome = client.store("db/password", "hunter2").await;
//! if !outcome.success {
//!     eprintln!("store failed ({}): {}", outcome.status_code, outcome.error);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod crypto;
pub mod key;
mod ops;
pub mod transport;

pub use client::Client;
pub use config::Settings;
pub use crypto::{AesGcmCodec, EnvelopeCodec};
pub use sot_common::{Outcome, SotError};
pub use transport::{HttpTransport, Transport};
