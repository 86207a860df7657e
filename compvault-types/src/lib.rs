//! Core data model for the secure composition vault.
//!
//! Everything here is a plain tagged data structure:
//! - [`Resource`] with its typed [`ParameterValue`]s
//! - [`Status`] and [`Role`] for composition bookkeeping
//! - [`KeyId`] and [`RecipientKey`] for addressing recipients
//!
//! Payload semantics (credentials, health records, identity evidence) are
//! opaque to this crate; they travel in `meta` and parameter values.

pub mod b64;
mod error;
mod key;
mod resource;
mod status;

pub use error::{TypesError, TypesResult};
pub use key::{KeyId, RecipientKey};
pub use resource::{Parameter, ParameterValue, Resource};
pub use status::{Role, Status};
