//! Secure composition vault.
//!
//! [`VaultOrchestrator::write_composition`] runs the full pipeline:
//!
//! 1. Serialize the composition into the requested output format.
//! 2. Encrypt for the configured recipients (signing first when a signing
//!    key is set), or store it flagged as unencrypted when there are none.
//! 3. Derive blind index tokens and reject duplicate unique attributes.
//! 4. Hand the assembled record to the [`RecordStore`] in one call.
//!
//! Nothing reaches storage unless every earlier step succeeded.
//!
//! [`RecordStore`]: compvault_storage::RecordStore

mod config;
mod error;
mod orchestrator;
pub mod telemetry;

pub use config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use orchestrator::{COMPOSITION_MESSAGE_TYPE, VaultOrchestrator, VaultOrchestratorBuilder};
