//! Proving backends for the message validator.
//!
//! Every backend implements the [`Prover`] trait, which binds a public
//! [`ValidatorClaim`](agent_core::ValidatorClaim) and
//! [`ValidatorOutput`](agent_core::ValidatorOutput) to a private
//! [`MessageWitness`](agent_core::MessageWitness):
//!
//! - **Stub** (feature `stub`): recomputes the validator natively and attests
//!   to the public values with HMAC-SHA256. No zero knowledge.
//! - **Arkworks** (feature `arkworks`): Groth16 over BN254 with a hand-written
//!   R1CS circuit that hashes the secret with in-circuit Poseidon.
//!
//! # Examples
//!
//! ```toml
//! # Both backends (default)
//! zk = { path = "../zk" }
//!
//! # Fast iteration without the circuit stack
//! zk = { path = "../zk", default-features = false, features = ["stub"] }
//! ```

pub mod prover;

pub use prover::{MessageProof, ProofBackend, ProofData, ProofError, Prover};

#[cfg(feature = "stub")]
pub mod stub;

#[cfg(feature = "stub")]
pub use stub::StubProver;

#[cfg(feature = "arkworks")]
pub mod circuit;

#[cfg(feature = "arkworks")]
pub use circuit::ArkworksProver;
