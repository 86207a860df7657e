//! Composition manager: an ordered set of typed resources plus composition
//! metadata, serialized into a named output format.
//!
//! Mutation goes through `&mut CompositionManager`, so one composition has a
//! single writer at a time. Independent compositions share nothing.

mod composition;
mod error;
mod format;
mod manager;

pub use composition::Composition;
pub use error::{CompositionError, CompositionResult};
pub use format::{FHIR, NATIVE, supported_formats};
pub use manager::CompositionManager;
