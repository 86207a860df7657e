//! Multi-recipient authenticated envelopes and signed message tokens.
//!
//! # Envelope
//!
//! One content-encryption key (CEK) per encryption call, shared across
//! recipients only in encapsulated form:
//!
//! 1. The payload is (optionally deflated and) encrypted once under the CEK.
//! 2. Each recipient gets a KEM encapsulation; the shared secret is run
//!    through HKDF into a key-encryption key that wraps the CEK.
//! 3. `aad` binds the protected header and the sorted recipient kid set,
//!    so adding or removing a recipient afterwards breaks decryption.
//!
//! # Message adapter
//!
//! [`MessageAdapter`] wraps a [`Message`] into a compact signed token,
//! a JSON envelope, or a signed token inside an envelope. Signing always
//! happens before encryption.

mod builder;
mod compact;
mod compression;
mod envelope;
mod error;
mod header;
mod message;

pub use builder::EnvelopeBuilder;
pub use compact::{CompactToken, TokenHeader};
pub use envelope::{Envelope, RecipientEntry, compute_aad};
pub use error::{EnvelopeError, EnvelopeResult, MessageError, MessageResult};
pub use header::{
    ENCRYPTED_TYP, PLAIN_TYP, ProtectedHeader, RecipientHeader, SIGNED_TYP, ZIP_DEFLATE,
};
pub use message::{Message, MessageAdapter, PackMode, Unpacked, Verification};
