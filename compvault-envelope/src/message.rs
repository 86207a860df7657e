//! Message records and the sign / encrypt / sign-then-encrypt adapter.

use crate::builder::EnvelopeBuilder;
use crate::compact::{CompactToken, TokenHeader};
use crate::envelope::Envelope;
use crate::error::{MessageError, MessageResult};
use crate::header::{ENCRYPTED_TYP, PLAIN_TYP, SIGNED_TYP};
use compvault_crypto::PrivateKeyMaterial;
use compvault_types::RecipientKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// A message record. Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub body: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Extension claims, flattened into the top-level object.
    #[serde(flatten)]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    /// New message with a random id and `nbf` set to now.
    pub fn new(message_type: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message_type: message_type.into(),
            body,
            from: None,
            to: Vec::new(),
            exp: None,
            nbf: Some(chrono::Utc::now().timestamp()),
            extensions: serde_json::Map::new(),
        }
    }

    pub fn from_sender(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    pub fn expires_at(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    pub fn not_before(mut self, nbf: i64) -> Self {
        self.nbf = Some(nbf);
        self
    }

    pub fn claim(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions.insert(name.into(), value);
        self
    }

    pub fn to_json(&self) -> MessageResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(raw: &[u8]) -> MessageResult<Self> {
        serde_json::from_slice(raw).map_err(|e| MessageError::Malformed(format!("message: {e}")))
    }

    /// `exp` is exclusive, `nbf` inclusive.
    pub fn check_validity(&self, now: i64) -> MessageResult<()> {
        if let Some(exp) = self.exp {
            if now >= exp {
                return Err(MessageError::Expired(exp));
            }
        }
        if let Some(nbf) = self.nbf {
            if now < nbf {
                return Err(MessageError::NotYetValid(nbf));
            }
        }
        Ok(())
    }
}

/// Which terminal operation [`MessageAdapter::pack`] performs.
///
/// Only `pack` dispatches on the mode. The explicit methods
/// (`sign_and_compact`, `encrypt_and_compact`, `sign_then_encrypt`) run
/// whatever the mode is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackMode {
    Sign,
    Encrypt,
    SignThenEncrypt,
}

/// Outcome of checking a signed token. A bad signature is a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Valid(Message),
    Invalid,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid(_))
    }
}

/// What an encrypted envelope turned out to contain.
#[derive(Debug, Clone, PartialEq)]
pub enum Unpacked {
    Plain(Message),
    /// A signed token inside the envelope, already checked.
    Signed(Verification),
}

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Wraps messages as compact signed tokens, envelopes, or both.
///
/// Signing always precedes encryption. A signed token whose payload is an
/// envelope is refused with [`MessageError::InvalidOrder`]. The [`PackMode`]
/// selects what [`Self::pack`] does and is advisory for the other methods.
#[derive(Clone)]
pub struct MessageAdapter {
    builder: EnvelopeBuilder,
    mode: PackMode,
    clock: Clock,
}

impl MessageAdapter {
    pub fn new(builder: EnvelopeBuilder, mode: PackMode) -> Self {
        Self {
            builder,
            mode,
            clock: Arc::new(|| chrono::Utc::now().timestamp()),
        }
    }

    /// Overrides the time source used for `exp`/`nbf` checks.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn mode(&self) -> PackMode {
        self.mode
    }

    /// Packs according to the adapter's mode. Keys the mode does not use are ignored.
    pub fn pack(
        &self,
        message: &Message,
        signing_key: Option<&PrivateKeyMaterial>,
        recipients: &[RecipientKey],
    ) -> MessageResult<String> {
        match self.mode {
            PackMode::Sign => self.sign_and_compact(
                message,
                signing_key.ok_or(MessageError::MissingKey("signing"))?,
            ),
            PackMode::Encrypt => self.encrypt_and_compact(message, recipients),
            PackMode::SignThenEncrypt => self.sign_then_encrypt(
                message,
                signing_key.ok_or(MessageError::MissingKey("signing"))?,
                recipients,
            ),
        }
    }

    /// Serializes the message with the plain `typ` claim, unsigned and unencrypted.
    pub fn pack_plain(&self, message: &Message) -> MessageResult<String> {
        let mut value = serde_json::to_value(message)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("typ".into(), PLAIN_TYP.into());
        }
        Ok(serde_json::to_string(&value)?)
    }

    /// Returns `b64url(header).b64url(payload).b64url(signature)`.
    pub fn sign_and_compact(
        &self,
        message: &Message,
        key: &PrivateKeyMaterial,
    ) -> MessageResult<String> {
        let header = TokenHeader {
            alg: key.alg().to_string(),
            kid: key.kid().clone(),
            typ: Some(SIGNED_TYP.to_string()),
        };
        let unsigned = CompactToken::unsigned(&header, &message.to_json()?)?;
        let signature = self
            .builder
            .capability()
            .sign(&unsigned.signing_input(), key, None)?;
        debug!(kid = %key.kid(), id = %message.id, "signed message");
        Ok(unsigned.with_signature(signature).to_string())
    }

    /// Encrypts the message JSON and returns the envelope's JSON form.
    pub fn encrypt_and_compact(
        &self,
        message: &Message,
        recipients: &[RecipientKey],
    ) -> MessageResult<String> {
        let envelope = self
            .builder
            .clone()
            .typ(ENCRYPTED_TYP)
            .cty(PLAIN_TYP)
            .encrypt(&message.to_json()?, recipients)?;
        Ok(envelope.to_json()?)
    }

    /// Signs first, then encrypts the compact token.
    pub fn sign_then_encrypt(
        &self,
        message: &Message,
        key: &PrivateKeyMaterial,
        recipients: &[RecipientKey],
    ) -> MessageResult<String> {
        let token = self.sign_and_compact(message, key)?;
        let envelope = self
            .builder
            .clone()
            .typ(ENCRYPTED_TYP)
            .cty(SIGNED_TYP)
            .encrypt(token.as_bytes(), recipients)?;
        Ok(envelope.to_json()?)
    }

    /// Checks a compact token against `public_key`.
    ///
    /// A kid or `alg` mismatch, or a bad signature, yields [`Verification::Invalid`].
    /// Time bounds are only checked on a valid signature.
    pub fn unpack_signed(
        &self,
        token: &str,
        public_key: &RecipientKey,
    ) -> MessageResult<Verification> {
        let token = CompactToken::parse(token)?;
        let header = token.header()?;
        let payload = token.payload()?;

        if header.typ.as_deref() == Some(ENCRYPTED_TYP) || looks_like_envelope(&payload) {
            return Err(MessageError::InvalidOrder);
        }
        if &header.kid != public_key.kid() {
            warn!(kid = %header.kid, expected = %public_key.kid(), "token signed by another key");
            return Ok(Verification::Invalid);
        }
        if header.alg != public_key.alg() {
            warn!(
                alg = %header.alg,
                expected = public_key.alg(),
                "token names another algorithm"
            );
            return Ok(Verification::Invalid);
        }

        let valid = self.builder.capability().verify(
            &token.signing_input(),
            token.signature(),
            public_key,
            Some(header.alg.as_str()),
        )?;
        if !valid {
            warn!(kid = %header.kid, "signature verification failed");
            return Ok(Verification::Invalid);
        }

        let message = Message::from_json(&payload)?;
        message.check_validity((self.clock)())?;
        Ok(Verification::Valid(message))
    }

    /// Opens an envelope and, when it carries a signed token, verifies it with `verifier`.
    pub fn unpack_encrypted(
        &self,
        json: &str,
        key: &PrivateKeyMaterial,
        verifier: Option<&RecipientKey>,
    ) -> MessageResult<Unpacked> {
        let envelope = Envelope::from_json(json)?;
        let plaintext = self.builder.decrypt(&envelope, key)?;
        let cty = envelope.header()?.cty;

        let signed = match cty.as_deref() {
            Some(SIGNED_TYP) => true,
            Some(_) => false,
            None => Message::from_json(&plaintext).is_err(),
        };
        if !signed {
            let message = Message::from_json(&plaintext)?;
            message.check_validity((self.clock)())?;
            return Ok(Unpacked::Plain(message));
        }

        let verifier = verifier.ok_or(MessageError::MissingKey("verification"))?;
        let token = std::str::from_utf8(&plaintext)
            .map_err(|e| MessageError::Malformed(format!("nested token: {e}")))?;
        Ok(Unpacked::Signed(self.unpack_signed(token, verifier)?))
    }
}

fn looks_like_envelope(payload: &[u8]) -> bool {
    serde_json::from_slice::<Envelope>(payload).is_ok()
}
