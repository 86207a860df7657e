//! Three-segment compact signed tokens: `header.payload.signature`.

use crate::error::{MessageError, MessageResult};
use compvault_types::{KeyId, b64};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header segment of a compact token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub kid: KeyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

/// A parsed compact token. The header and payload segments are kept exactly
/// as received so the signing input is reproduced byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactToken {
    header: String,
    payload: String,
    signature: Vec<u8>,
}

impl CompactToken {
    pub(crate) fn unsigned(header: &TokenHeader, payload: &[u8]) -> MessageResult<Self> {
        Ok(Self {
            header: b64::encode(serde_json::to_vec(header)?),
            payload: b64::encode(payload),
            signature: Vec::new(),
        })
    }

    pub(crate) fn with_signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = signature;
        self
    }

    /// Splits and decodes a token. Exactly three non-empty segments are required.
    pub fn parse(token: &str) -> MessageResult<Self> {
        let segments: Vec<&str> = token.trim().split('.').collect();
        let [header, payload, signature] = segments.as_slice() else {
            return Err(MessageError::Malformed(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(MessageError::Malformed("empty token segment".into()));
        }
        // Reject undecodable segments up front.
        b64::decode(header).map_err(|e| MessageError::Malformed(format!("header: {e}")))?;
        b64::decode(payload).map_err(|e| MessageError::Malformed(format!("payload: {e}")))?;
        let signature =
            b64::decode(signature).map_err(|e| MessageError::Malformed(format!("signature: {e}")))?;

        Ok(Self {
            header: (*header).to_string(),
            payload: (*payload).to_string(),
            signature,
        })
    }

    /// ASCII of `b64(header) "." b64(payload)`.
    pub fn signing_input(&self) -> Vec<u8> {
        format!("{}.{}", self.header, self.payload).into_bytes()
    }

    pub fn header(&self) -> MessageResult<TokenHeader> {
        let raw = b64::decode(&self.header).map_err(|e| MessageError::Malformed(e.to_string()))?;
        serde_json::from_slice(&raw).map_err(|e| MessageError::Malformed(format!("header: {e}")))
    }

    pub fn payload(&self) -> MessageResult<Vec<u8>> {
        b64::decode(&self.payload).map_err(|e| MessageError::Malformed(e.to_string()))
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

impl fmt::Display for CompactToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.header,
            self.payload,
            b64::encode(&self.signature)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> TokenHeader {
        TokenHeader {
            alg: "Dilithium3".into(),
            kid: KeyId::from("k1"),
            typ: None,
        }
    }

    #[test]
    fn display_then_parse() {
        let token = CompactToken::unsigned(&header(), b"{\"a\":1}")
            .unwrap()
            .with_signature(vec![1, 2, 3]);
        let text = token.to_string();
        assert_eq!(text.matches('.').count(), 2);
        assert!(!text.contains('='));

        let parsed = CompactToken::parse(&text).unwrap();
        assert_eq!(parsed, token);
        assert_eq!(parsed.header().unwrap(), header());
        assert_eq!(parsed.payload().unwrap(), b"{\"a\":1}");
    }

    #[test]
    fn wrong_segment_count() {
        assert!(matches!(
            CompactToken::parse("a.b"),
            Err(MessageError::Malformed(_))
        ));
        assert!(matches!(
            CompactToken::parse("a.b.c.d"),
            Err(MessageError::Malformed(_))
        ));
    }

    #[test]
    fn padded_segment_rejected() {
        assert!(CompactToken::parse("YQ==.YQ.YQ").is_err());
    }
}
