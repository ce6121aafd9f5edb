//! Groth16 proving and verification on BN254 curve.

use agent_core::Fp254;
use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::ConstraintSynthesizer;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::RngCore;

use crate::ProofError;

/// Groth16 proving and verifying keys.
///
/// Generated by a circuit-specific setup; whoever ran it could forge proofs,
/// so production deployments load keys from a ceremony via [`Self::from_bytes`].
#[derive(Clone)]
pub struct Groth16Keys {
    pub proving_key: ProvingKey<Bn254>,
    pub verifying_key: VerifyingKey<Bn254>,
}

impl Groth16Keys {
    /// Generate keys from a template circuit instance.
    pub fn generate<C, R>(circuit: C, rng: &mut R) -> Result<Self, ProofError>
    where
        C: ConstraintSynthesizer<Fp254>,
        R: RngCore,
    {
        let params = Groth16::<Bn254>::generate_random_parameters_with_reduction(circuit, rng)
            .map_err(|e| {
                ProofError::CircuitProofError(format!("Groth16 key generation failed: {:?}", e))
            })?;

        Ok(Self {
            verifying_key: params.vk.clone(),
            proving_key: params,
        })
    }

    /// Serialize both keys.
    ///
    /// Format: [pk_len (8 bytes, LE)][pk_bytes][vk_bytes]
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProofError> {
        let pk_bytes = serialize(&self.proving_key)?;
        let vk_bytes = serialize(&self.verifying_key)?;

        let mut bytes = Vec::with_capacity(8 + pk_bytes.len() + vk_bytes.len());
        bytes.extend_from_slice(&(pk_bytes.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&pk_bytes);
        bytes.extend_from_slice(&vk_bytes);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        let (len_bytes, rest) = bytes.split_first_chunk::<8>().ok_or_else(|| {
            ProofError::SerializationError("Invalid key bytes: too short".to_string())
        })?;

        let pk_len = usize::try_from(u64::from_le_bytes(*len_bytes))
            .ok()
            .filter(|len| *len <= rest.len())
            .ok_or_else(|| {
                ProofError::SerializationError("Invalid key bytes: pk too short".to_string())
            })?;
        let (pk_bytes, vk_bytes) = rest.split_at(pk_len);

        Ok(Self {
            proving_key: deserialize(pk_bytes)?,
            verifying_key: deserialize(vk_bytes)?,
        })
    }

    pub fn prepared_verifying_key(&self) -> PreparedVerifyingKey<Bn254> {
        ark_groth16::prepare_verifying_key(&self.verifying_key)
    }
}

/// Generate a Groth16 proof for a circuit carrying witness values.
pub fn prove<C, R>(
    circuit: C,
    keys: &Groth16Keys,
    rng: &mut R,
) -> Result<Proof<Bn254>, ProofError>
where
    C: ConstraintSynthesizer<Fp254>,
    R: RngCore,
{
    Groth16::<Bn254>::create_random_proof_with_reduction(circuit, &keys.proving_key, rng)
        .map_err(|e| ProofError::CircuitProofError(format!("Groth16 proving failed: {:?}", e)))
}

/// Verify a proof against its public inputs using a prepared verifying key.
pub fn verify(
    proof: &Proof<Bn254>,
    public_inputs: &[Fp254],
    pvk: &PreparedVerifyingKey<Bn254>,
) -> Result<bool, ProofError> {
    Groth16::<Bn254>::verify_proof(pvk, proof, public_inputs).map_err(|e| {
        ProofError::CircuitProofError(format!("Groth16 verification failed: {:?}", e))
    })
}

pub fn serialize_proof(proof: &Proof<Bn254>) -> Result<Vec<u8>, ProofError> {
    serialize(proof)
}

pub fn deserialize_proof(bytes: &[u8]) -> Result<Proof<Bn254>, ProofError> {
    deserialize(bytes)
}

fn serialize<T: CanonicalSerialize>(value: &T) -> Result<Vec<u8>, ProofError> {
    let mut bytes = Vec::new();
    value
        .serialize_compressed(&mut bytes)
        .map_err(|e| ProofError::SerializationError(e.to_string()))?;
    Ok(bytes)
}

fn deserialize<T: CanonicalDeserialize>(bytes: &[u8]) -> Result<T, ProofError> {
    T::deserialize_compressed(bytes).map_err(|e| ProofError::SerializationError(e.to_string()))
}
