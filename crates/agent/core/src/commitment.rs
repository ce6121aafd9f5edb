//! Poseidon commitments over BN254 field elements.
//!
//! The security-code commitment stored in every [`AgentState`] is the Poseidon
//! hash of the two symbol code points of the agent's secret. The same function
//! is evaluated natively by the direct validity check and the stub prover, and
//! in-circuit by the Groth16 validator; all of them read the single cached
//! parameter set returned by [`poseidon_config`].
//!
//! # Security Parameters
//!
//! - Field: BN254 scalar field (254-bit prime)
//! - Full rounds: 8
//! - Partial rounds: 57
//! - Rate 2, capacity 1, α = 5
//!
//! [`AgentState`]: crate::AgentState

use std::sync::OnceLock;

use ark_crypto_primitives::sponge::{
    CryptographicSponge,
    poseidon::{PoseidonConfig, PoseidonSponge, find_poseidon_ark_and_mds},
};
use serde::{Deserialize, Serialize};

use crate::field::{self, Fp254};
use crate::{CoreError, SecurityCode};

/// Cached Poseidon config, built once on first use.
static POSEIDON_CONFIG: OnceLock<PoseidonConfig<Fp254>> = OnceLock::new();

/// Get cached Poseidon config (8/57 rounds, 128-bit security).
pub fn poseidon_config() -> &'static PoseidonConfig<Fp254> {
    POSEIDON_CONFIG.get_or_init(|| {
        let (ark, mds) = find_poseidon_ark_and_mds::<Fp254>(254, 2, 8, 57, 0);
        PoseidonConfig::new(8, 57, 5, mds, ark, 2, 1)
    })
}

/// Absorbs `left` then `right` as separate elements and squeezes one output.
///
/// The in-circuit gadget absorbs in the same order; changing either side
/// invalidates every stored commitment.
pub fn hash_two(left: Fp254, right: Fp254) -> Result<Fp254, CoreError> {
    let mut sponge = PoseidonSponge::<Fp254>::new(poseidon_config());
    sponge.absorb(&left);
    sponge.absorb(&right);
    sponge
        .squeeze_field_elements::<Fp254>(1)
        .first()
        .copied()
        .ok_or(CoreError::HashSqueeze)
}

/// Commits to a security code: `Poseidon(code[0], code[1])`.
pub fn commit(code: &SecurityCode) -> Result<Commitment, CoreError> {
    let [first, second] = code.to_fields();
    hash_two(first, second).map(Commitment)
}

/// One-way binding of an agent's security code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(#[serde(with = "field::serde_fp")] pub Fp254);

impl Commitment {
    pub const fn new(value: Fp254) -> Self {
        Self(value)
    }

    pub const fn as_field(&self) -> Fp254 {
        self.0
    }

    /// Canonical compressed encoding of the commitment.
    pub fn to_bytes(&self) -> Result<[u8; field::FIELD_BYTES], CoreError> {
        field::to_bytes(&self.0)
    }
}

impl core::fmt::Display for Commitment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_bytes() {
            Ok(bytes) => f.write_str(&hex::encode(bytes)),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> SecurityCode {
        s.parse().expect("two-symbol code")
    }

    #[test]
    fn test_hash_two_deterministic() {
        let (left, right) = (Fp254::from(3u64), Fp254::from(4u64));
        let result1 = hash_two(left, right).expect("hash_two should succeed");
        let result2 = hash_two(left, right).expect("hash_two should succeed");
        assert_eq!(result1, result2);
    }

    #[test]
    fn test_hash_two_order_matters() {
        let (left, right) = (Fp254::from(3u64), Fp254::from(4u64));
        let result1 = hash_two(left, right).expect("hash_two should succeed");
        let result2 = hash_two(right, left).expect("hash_two should succeed");
        assert_ne!(result1, result2);
    }

    #[test]
    fn commit_uses_symbol_code_points() {
        let expected =
            hash_two(Fp254::from('1' as u64), Fp254::from('2' as u64)).expect("hash");
        assert_eq!(commit(&code("12")).expect("commit").as_field(), expected);
    }

    #[test]
    fn distinct_codes_commit_differently() {
        let a = commit(&code("12")).expect("commit");
        let b = commit(&code("56")).expect("commit");
        let c = commit(&code("21")).expect("commit");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn commitment_serializes_as_hex_in_json() {
        let commitment = commit(&code("12")).expect("commit");
        let json = serde_json::to_string(&commitment).expect("serialize");
        assert_eq!(json, format!("\"{}\"", commitment));
        let decoded: Commitment = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, commitment);
    }
}
