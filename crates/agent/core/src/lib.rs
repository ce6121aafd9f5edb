//! Protocol rules and data types shared across the agent message ledger.
//!
//! `agent-core` defines the canonical agent state, the witness bundle a caller
//! assembles per submission, and the pure predicates both proving backends and
//! the direct validity check are built on. Nothing in this crate touches
//! storage or the host ledger; supporting crates depend on the types
//! re-exported here.
//!
//! Modules are organized by responsibility:
//! - [`state`] agent state, history keys and transaction metadata
//! - [`message`] fixed-capacity message buffer and the security code pair
//! - [`commitment`] Poseidon commitment over the BN254 scalar field
//! - [`validation`] claims, witnesses, results and the shared checks
//! - [`error`] error types and severity classification
pub mod commitment;
pub mod error;
pub mod field;
pub mod message;
pub mod state;
pub mod validation;

pub use commitment::{Commitment, commit, hash_two, poseidon_config};
pub use error::{CoreError, ErrorSeverity};
pub use field::Fp254;
pub use message::{MESSAGE_CAPACITY, MessageText, REQUIRED_MESSAGE_LENGTH, SecurityCode};
pub use state::{
    AgentId, AgentKeyAtBlock, AgentState, AgentStateWithTxInfo, BlockHeight, MessageNumber,
    Nonce, SenderKey,
};
pub use validation::{
    MessageWitness, ValidationError, ValidatorClaim, ValidatorOutput, check_message, evaluate,
};
