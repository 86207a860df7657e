use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use compvault_composition::CompositionManager;
use compvault_crypto::{CryptoCapability, KeyPair, PqCapability, PrivateKeyMaterial};
use compvault_envelope::{
    Envelope, EnvelopeBuilder, Message, MessageAdapter, PackMode, SIGNED_TYP, Verification,
};
use compvault_index::{BlindIndexBuilder, IndexKey, IndexTokenSet};
use compvault_storage::{RecordPayload, RecordStore, SecureStorageRecord};
use compvault_types::RecipientKey;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message `type` of signed composition payloads.
pub const COMPOSITION_MESSAGE_TYPE: &str = "https://compvault.dev/protocols/composition/1.0";

/// Content type of an envelope holding raw composition JSON.
const JSON_CTY: &str = "application/json";

/// Serializes, encrypts, indexes and stores compositions.
///
/// Crypto runs on tokio's blocking pool; call from within a tokio runtime.
pub struct VaultOrchestrator {
    envelopes: EnvelopeBuilder,
    messages: MessageAdapter,
    recipients: Vec<RecipientKey>,
    signer: Option<KeyPair>,
    index: BlindIndexBuilder,
    store: Arc<dyn RecordStore>,
    config: VaultConfig,
}

impl VaultOrchestrator {
    pub fn builder() -> VaultOrchestratorBuilder {
        VaultOrchestratorBuilder::default()
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn recipients(&self) -> &[RecipientKey] {
        &self.recipients
    }

    pub fn is_encrypting(&self) -> bool {
        !self.recipients.is_empty()
    }

    fn collection_or_default<'a>(&'a self, collection: Option<&'a str>) -> &'a str {
        collection.unwrap_or(&self.config.default_collection)
    }

    /// Writes `composition` as one record in `collection` (or the default collection).
    ///
    /// Any failure before the final `write_record` leaves storage untouched.
    /// Storage errors are returned as `VaultError::Storage` without retry.
    pub async fn write_composition(
        &self,
        composition: &CompositionManager,
        spec_name: &str,
        collection: Option<&str>,
        unique: &[String],
        non_unique: &[String],
    ) -> VaultResult<SecureStorageRecord> {
        let collection = self.collection_or_default(collection);

        let plaintext = Value::Array(composition.to_specification(spec_name)?);
        let payload = self.seal(plaintext).await?;

        let indexed = self.index.build_all(unique, non_unique, composition)?;
        self.reject_duplicates(collection, &indexed).await?;

        let record = SecureStorageRecord::new(payload, indexed);
        let stored = self
            .store
            .write_record(collection, record.clone())
            .await?
            .unwrap_or(record);

        info!(
            collection,
            id = %stored.id,
            mode = stored.payload.mode(),
            tokens = stored.indexed.token_count(),
            "wrote composition"
        );
        Ok(stored)
    }

    /// Builds the record payload off the async executor.
    async fn seal(&self, plaintext: Value) -> VaultResult<RecordPayload> {
        match (self.recipients.is_empty(), &self.signer) {
            (true, None) => {
                warn!("no recipients configured, storing composition unencrypted");
                Ok(RecordPayload::Unencrypted { plaintext })
            }
            (true, Some(signer)) => {
                let messages = self.messages.clone();
                let key = signer.private.clone();
                let message = Message::new(COMPOSITION_MESSAGE_TYPE, plaintext);
                let token = tokio::task::spawn_blocking(move || {
                    messages.sign_and_compact(&message, &key)
                })
                .await??;
                Ok(RecordPayload::Signed { token })
            }
            (false, None) => {
                let builder = self.envelopes.clone().cty(JSON_CTY);
                let recipients = self.recipients.clone();
                let bytes = serde_json::to_vec(&plaintext)?;
                let envelope =
                    tokio::task::spawn_blocking(move || builder.encrypt(&bytes, &recipients))
                        .await??;
                Ok(RecordPayload::Encrypted { envelope })
            }
            (false, Some(signer)) => {
                let messages = self.messages.clone();
                let key = signer.private.clone();
                let recipients = self.recipients.clone();
                let message = Message::new(COMPOSITION_MESSAGE_TYPE, plaintext);
                let json = tokio::task::spawn_blocking(move || {
                    messages.sign_then_encrypt(&message, &key, &recipients)
                })
                .await??;
                let envelope = Envelope::from_json(&json)?;
                Ok(RecordPayload::Encrypted { envelope })
            }
        }
    }

    async fn reject_duplicates(
        &self,
        collection: &str,
        indexed: &IndexTokenSet,
    ) -> VaultResult<()> {
        let unique: Vec<_> = indexed.unique_tokens().collect();
        if unique.is_empty() {
            return Ok(());
        }
        let tokens: Vec<_> = unique.iter().map(|(_, t)| (*t).clone()).collect();
        let existing = self.store.query_records(collection, &tokens).await?;

        for (attribute, token) in unique {
            if existing.iter().any(|r| r.indexed.contains(token)) {
                warn!(collection, attribute, "rejected duplicate unique attribute");
                return Err(VaultError::DuplicateAttribute {
                    attribute: attribute.to_string(),
                    collection: collection.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Reads a record back to its plaintext JSON. `None` when the id is unknown.
    ///
    /// Encrypted records need the caller's private key; signed payloads are
    /// verified against the configured signing key.
    pub async fn read_composition(
        &self,
        collection: Option<&str>,
        id: &str,
        key: Option<&PrivateKeyMaterial>,
    ) -> VaultResult<Option<Value>> {
        let collection = self.collection_or_default(collection);
        let Some(record) = self.store.read_record(collection, id).await? else {
            return Ok(None);
        };
        debug!(collection, id, mode = record.payload.mode(), "read composition");

        let plaintext = match record.payload {
            RecordPayload::Unencrypted { plaintext } => plaintext,
            RecordPayload::Signed { token } => self.verify_token(token).await?,
            RecordPayload::Encrypted { envelope } => {
                let key = key.cloned().ok_or_else(|| {
                    VaultError::Configuration("encrypted record needs a private key".into())
                })?;
                let builder = self.envelopes.clone();
                let (bytes, envelope) = tokio::task::spawn_blocking(move || {
                    builder.decrypt(&envelope, &key).map(|bytes| (bytes, envelope))
                })
                .await??;
                // Header is trusted only after the aad check inside decrypt.
                let signed = envelope.header()?.cty.as_deref() == Some(SIGNED_TYP);
                if signed {
                    let token = String::from_utf8(bytes)
                        .map_err(|e| VaultError::Malformed(format!("nested token: {e}")))?;
                    self.verify_token(token).await?
                } else {
                    serde_json::from_slice(&bytes)?
                }
            }
        };
        Ok(Some(plaintext))
    }

    async fn verify_token(&self, token: String) -> VaultResult<Value> {
        let verifier = self
            .signer
            .as_ref()
            .map(|s| s.public.clone())
            .ok_or_else(|| {
                VaultError::Configuration("signed record needs a verification key".into())
            })?;
        let messages = self.messages.clone();
        let verdict =
            tokio::task::spawn_blocking(move || messages.unpack_signed(&token, &verifier)).await??;
        match verdict {
            Verification::Valid(message) => Ok(message.body),
            Verification::Invalid => Err(VaultError::Signature(
                "composition signature is invalid".into(),
            )),
        }
    }

    /// Records whose index carries `name = value`. Only the token reaches storage.
    pub async fn find_by_attribute(
        &self,
        collection: Option<&str>,
        name: &str,
        value: &str,
    ) -> VaultResult<Vec<SecureStorageRecord>> {
        let collection = self.collection_or_default(collection);
        let token = self.index.build_index(name, value)?;
        Ok(self.store.query_records(collection, &[token]).await?)
    }
}

/// Assembles a [`VaultOrchestrator`]. A store and an index key are required.
#[derive(Default)]
pub struct VaultOrchestratorBuilder {
    capability: Option<Arc<dyn CryptoCapability>>,
    recipients: Vec<RecipientKey>,
    signer: Option<KeyPair>,
    index_key: Option<IndexKey>,
    store: Option<Arc<dyn RecordStore>>,
    config: VaultConfig,
}

impl VaultOrchestratorBuilder {
    /// Defaults to [`PqCapability`].
    pub fn capability(mut self, capability: Arc<dyn CryptoCapability>) -> Self {
        self.capability = Some(capability);
        self
    }

    pub fn recipient(mut self, key: RecipientKey) -> Self {
        self.recipients.push(key);
        self
    }

    pub fn recipients(mut self, keys: impl IntoIterator<Item = RecipientKey>) -> Self {
        self.recipients.extend(keys);
        self
    }

    pub fn signing_key(mut self, signer: KeyPair) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn index_key(mut self, key: IndexKey) -> Self {
        self.index_key = Some(key);
        self
    }

    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: VaultConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> VaultResult<VaultOrchestrator> {
        let store = self
            .store
            .ok_or_else(|| VaultError::Configuration("a record store is required".into()))?;
        let index_key = self
            .index_key
            .ok_or_else(|| VaultError::Configuration("an index key is required".into()))?;
        let capability = self
            .capability
            .unwrap_or_else(|| Arc::new(PqCapability::new()) as Arc<dyn CryptoCapability>);

        let envelopes = EnvelopeBuilder::new(capability)
            .content_algorithm(self.config.content_algorithm.clone())
            .compress(self.config.compress);
        let mode = if self.signer.is_some() {
            PackMode::SignThenEncrypt
        } else {
            PackMode::Encrypt
        };
        let messages = MessageAdapter::new(envelopes.clone(), mode);
        let index = BlindIndexBuilder::new(index_key).with_normalization(self.config.normalization);

        Ok(VaultOrchestrator {
            envelopes,
            messages,
            recipients: self.recipients,
            signer: self.signer,
            index,
            store,
            config: self.config,
        })
    }
}
