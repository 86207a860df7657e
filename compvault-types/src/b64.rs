//! Unpadded base64url helpers shared by every wire format in the vault.

use crate::error::{TypesError, TypesResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn decode(value: &str) -> TypesResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(value.as_bytes())
        .map_err(|e| TypesError::Encoding(e.to_string()))
}

/// `#[serde(with = "compvault_types::b64::bytes")]` for `Vec<u8>` fields.
pub mod bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::decode(&raw).map_err(serde::de::Error::custom)
    }
}

/// Optional variant of [`bytes`]; pair with `#[serde(default)]`.
pub mod opt_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&super::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::decode(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn output_has_no_padding_or_unsafe_chars() {
        let encoded = encode([0xfbu8, 0xff, 0xfe, 0x00]);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(decode(&encoded).unwrap(), vec![0xfb, 0xff, 0xfe, 0x00]);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let encoded = encode(&bytes);
            prop_assert!(!encoded.contains('='));
            prop_assert_eq!(decode(&encoded).unwrap(), bytes);
        }
    }

    #[test]
    fn padded_input_is_rejected() {
        assert!(decode("AAE=").is_err());
    }
}
