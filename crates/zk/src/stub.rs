//! Attestation stand-in for a real proving system.
//!
//! [`StubProver`] evaluates the validator natively and authenticates the
//! public claim/output pair with HMAC-SHA256. Verification recomputes the tag
//! and compares it in constant time, so only a verifier holding the same
//! attestation key accepts.
//!
//! # Warning
//!
//! Provides no zero-knowledge or soundness guarantees beyond trusting the key
//! holder. Use it for development and for testing the ledger logic.

use agent_core::{MessageWitness, ValidatorClaim, ValidatorOutput, evaluate};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::prover::{MessageProof, ProofBackend, ProofData, ProofError, Prover};

const ATTESTATION_DOMAIN: &[u8] = b"agent-ledger/stub-attestation/v1";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct StubProver {
    attestation_key: [u8; 32],
}

impl StubProver {
    pub const fn new(attestation_key: [u8; 32]) -> Self {
        Self { attestation_key }
    }

    /// Derives the attestation key from a seed string.
    pub fn from_seed(seed: &str) -> Self {
        Self::new(Sha256::digest(seed.as_bytes()).into())
    }

    /// MAC over the domain tag and the bincode-encoded public values.
    fn mac(
        &self,
        claim: &ValidatorClaim,
        output: &ValidatorOutput,
    ) -> Result<HmacSha256, ProofError> {
        let public = bincode::serialize(&(claim, output))
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;

        let mut mac = HmacSha256::new_from_slice(&self.attestation_key)
            .map_err(|e| ProofError::Attestation(e.to_string()))?;
        mac.update(ATTESTATION_DOMAIN);
        mac.update(&public);
        Ok(mac)
    }
}

impl Default for StubProver {
    fn default() -> Self {
        Self::from_seed("agent-ledger-dev")
    }
}

impl core::fmt::Debug for StubProver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StubProver").finish_non_exhaustive()
    }
}

impl Prover for StubProver {
    fn backend(&self) -> ProofBackend {
        ProofBackend::Stub
    }

    fn prove(
        &self,
        claim: &ValidatorClaim,
        witness: &MessageWitness,
    ) -> Result<MessageProof, ProofError> {
        let output = evaluate(claim, witness)?;
        let bytes = self.mac(claim, &output)?.finalize().into_bytes().to_vec();

        tracing::debug!(
            agent = %claim.agent_id,
            is_valid = output.is_valid,
            "stub attestation issued"
        );

        Ok(MessageProof {
            public_input: *claim,
            public_output: output,
            data: ProofData {
                bytes,
                backend: ProofBackend::Stub,
            },
        })
    }

    fn verify(&self, proof: &MessageProof) -> Result<bool, ProofError> {
        self.ensure_backend(proof)?;
        let mac = self.mac(&proof.public_input, &proof.public_output)?;
        Ok(mac.verify_slice(&proof.data.bytes).is_ok())
    }
}
