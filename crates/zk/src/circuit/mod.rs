//! Arkworks circuit proving backend.
//!
//! The message validator is expressed as a hand-written R1CS circuit
//! ([`MessageValidatorCircuit`]) and proven with Groth16 over BN254.
//!
//! ```text
//! ValidatorClaim + MessageWitness
//!   ↓ native evaluate (hard rules abort here)
//! MessageValidatorCircuit
//!   ↓ Groth16
//! MessageProof (public input + public output + proof bytes)
//! ```

pub mod gadgets;
pub mod groth16;
pub mod message_validator;

use std::sync::Arc;

use agent_core::{Fp254, MessageWitness, ValidatorClaim, evaluate};
use ark_bn254::Bn254;
use ark_groth16::PreparedVerifyingKey;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_std::rand::RngCore;

pub use groth16::Groth16Keys;
pub use message_validator::{MessageValidatorCircuit, PUBLIC_INPUT_COUNT, public_inputs};

use crate::prover::{MessageProof, ProofBackend, ProofData, ProofError, Prover};

/// Groth16 prover for the message validator circuit.
///
/// Keys are shared behind an `Arc`, so clones are cheap and every clone
/// verifies proofs from every other.
#[derive(Clone)]
pub struct ArkworksProver {
    keys: Arc<Groth16Keys>,
    pvk: Arc<PreparedVerifyingKey<Bn254>>,
}

impl ArkworksProver {
    /// Runs a fresh circuit-specific setup.
    pub fn setup<R: RngCore>(rng: &mut R) -> Result<Self, ProofError> {
        let keys = Groth16Keys::generate(MessageValidatorCircuit::dummy()?, rng)?;
        tracing::info!("generated Groth16 keys for message validator");
        Ok(Self::from_keys(keys))
    }

    /// Setup using the thread-local OS-seeded RNG.
    pub fn new() -> Result<Self, ProofError> {
        Self::setup(&mut rand::thread_rng())
    }

    pub fn from_keys(keys: Groth16Keys) -> Self {
        let pvk = keys.prepared_verifying_key();
        Self {
            keys: Arc::new(keys),
            pvk: Arc::new(pvk),
        }
    }

    pub fn keys(&self) -> &Groth16Keys {
        &self.keys
    }

    fn check_satisfied(circuit: MessageValidatorCircuit) -> Result<(), ProofError> {
        let cs = ConstraintSystem::<Fp254>::new_ref();
        circuit
            .generate_constraints(cs.clone())
            .map_err(|e| ProofError::CircuitProofError(e.to_string()))?;

        let satisfied = cs
            .is_satisfied()
            .map_err(|e| ProofError::CircuitProofError(e.to_string()))?;
        if satisfied {
            return Ok(());
        }

        let failing = cs
            .which_is_unsatisfied()
            .map_err(|e| ProofError::CircuitProofError(e.to_string()))?
            .unwrap_or_default();
        Err(ProofError::Unsatisfied(failing))
    }
}

impl core::fmt::Debug for ArkworksProver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArkworksProver").finish_non_exhaustive()
    }
}

impl Prover for ArkworksProver {
    fn backend(&self) -> ProofBackend {
        ProofBackend::Arkworks
    }

    fn prove(
        &self,
        claim: &ValidatorClaim,
        witness: &MessageWitness,
    ) -> Result<MessageProof, ProofError> {
        let output = evaluate(claim, witness)?;
        let circuit = MessageValidatorCircuit::new(claim, witness, &output);
        Self::check_satisfied(circuit.clone())?;

        let proof = groth16::prove(circuit, &self.keys, &mut rand::thread_rng())?;
        let bytes = groth16::serialize_proof(&proof)?;

        tracing::debug!(
            agent = %claim.agent_id,
            is_valid = output.is_valid,
            proof_bytes = bytes.len(),
            "groth16 proof generated"
        );

        Ok(MessageProof {
            public_input: *claim,
            public_output: output,
            data: ProofData {
                bytes,
                backend: ProofBackend::Arkworks,
            },
        })
    }

    fn verify(&self, proof: &MessageProof) -> Result<bool, ProofError> {
        self.ensure_backend(proof)?;
        let groth16_proof = groth16::deserialize_proof(&proof.data.bytes)?;
        let inputs = public_inputs(&proof.public_input, &proof.public_output);
        groth16::verify(&groth16_proof, &inputs, &self.pvk)
    }
}
