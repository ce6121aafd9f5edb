//! BN254 scalar field helpers.
//!
//! Every value that enters the validator circuit is embedded into the BN254
//! scalar field. Field elements are encoded with arkworks' canonical
//! compressed form (32 bytes, little-endian); human-readable serde formats get
//! the same bytes as a hex string.

pub use ark_bn254::Fr as Fp254;

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::CoreError;

/// Size of a canonical compressed BN254 scalar.
pub const FIELD_BYTES: usize = 32;

/// Encodes a field element into its canonical compressed bytes.
pub fn to_bytes(value: &Fp254) -> Result<[u8; FIELD_BYTES], CoreError> {
    let mut bytes = Vec::with_capacity(FIELD_BYTES);
    value
        .serialize_compressed(&mut bytes)
        .map_err(|e| CoreError::FieldEncoding(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| CoreError::FieldEncoding(format!("unexpected length {}", b.len())))
}

/// Decodes canonical compressed bytes, rejecting non-reduced encodings.
pub fn from_bytes(bytes: &[u8]) -> Result<Fp254, CoreError> {
    Fp254::deserialize_compressed(bytes).map_err(|e| CoreError::FieldEncoding(e.to_string()))
}

/// Serde adapter for raw field elements (`#[serde(with = "field::serde_fp")]`).
pub mod serde_fp {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{FIELD_BYTES, Fp254, from_bytes, to_bytes};

    pub fn serialize<S: Serializer>(value: &Fp254, serializer: S) -> Result<S::Ok, S::Error> {
        let bytes = to_bytes(value).map_err(S::Error::custom)?;
        if serializer.is_human_readable() {
            hex::encode(bytes).serialize(serializer)
        } else {
            bytes.serialize(serializer)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fp254, D::Error> {
        if deserializer.is_human_readable() {
            let encoded = String::deserialize(deserializer)?;
            let bytes = hex::decode(encoded).map_err(D::Error::custom)?;
            from_bytes(&bytes).map_err(D::Error::custom)
        } else {
            let bytes = <[u8; FIELD_BYTES]>::deserialize(deserializer)?;
            from_bytes(&bytes).map_err(D::Error::custom)
        }
    }
}
