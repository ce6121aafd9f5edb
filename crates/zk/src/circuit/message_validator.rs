//! MessageValidatorCircuit - R1CS form of the message validator.
//!
//! # Public Inputs (in allocation order)
//!
//! 1. `agent_id`: agent the claim is submitted for
//! 2. `last_message_number`: last accepted message number of the agent
//! 3. `security_code_hash`: stored commitment of the agent's secret
//! 4. `state_agent_id`: agent id recorded in the claimed state
//! 5. `output_hash`: commitment echoed in the public result
//! 6. `output_is_valid`: length flag of the public result (0 or 1)
//!
//! # Private Witnesses
//!
//! - `message_number`, the null-padded message slots, the witness agent id and
//!   the two secret symbols
//!
//! # Constraints
//!
//! 1. `message_number > last_message_number`
//! 2. `Poseidon(code[0], code[1]) == security_code_hash`
//! 3. `witness_agent_id == state_agent_id`
//! 4. `agent_id == state_agent_id`
//! 5. `output_hash == security_code_hash`
//! 6. `output_is_valid == (non-null slot count == REQUIRED_MESSAGE_LENGTH)`

use agent_core::{
    Fp254, MESSAGE_CAPACITY, MessageWitness, REQUIRED_MESSAGE_LENGTH, SecurityCode,
    ValidatorClaim, ValidatorOutput, commit,
};
use ark_r1cs_std::alloc::AllocVar;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use super::gadgets::{enforce_greater_than, exact_length_gadget, poseidon_hash_two_gadget};
use crate::ProofError;

/// Number of public inputs the verifier supplies.
pub const PUBLIC_INPUT_COUNT: usize = 6;

#[derive(Clone)]
pub struct MessageValidatorCircuit {
    // ========================================================================
    // Public Inputs
    // ========================================================================
    pub agent_id: Option<Fp254>,
    pub last_message_number: Option<Fp254>,
    pub security_code_hash: Option<Fp254>,
    pub state_agent_id: Option<Fp254>,
    pub output_hash: Option<Fp254>,
    pub output_is_valid: Option<Fp254>,

    // ========================================================================
    // Private Witnesses
    // ========================================================================
    pub message_number: Option<Fp254>,
    pub message_slots: Option<[Fp254; MESSAGE_CAPACITY]>,
    pub witness_agent_id: Option<Fp254>,
    pub security_code: Option<[Fp254; 2]>,
}

impl MessageValidatorCircuit {
    /// Circuit instance for one submission.
    pub fn new(claim: &ValidatorClaim, witness: &MessageWitness, output: &ValidatorOutput) -> Self {
        let [
            agent_id,
            last_message_number,
            security_code_hash,
            state_agent_id,
            output_hash,
            output_is_valid,
        ] = public_inputs(claim, output);

        Self {
            agent_id: Some(agent_id),
            last_message_number: Some(last_message_number),
            security_code_hash: Some(security_code_hash),
            state_agent_id: Some(state_agent_id),
            output_hash: Some(output_hash),
            output_is_valid: Some(output_is_valid),
            message_number: Some(Fp254::from(witness.message_number)),
            message_slots: Some(witness.message_text.to_fields()),
            witness_agent_id: Some(witness.agent_id.to_field()),
            security_code: Some(witness.security_code.to_fields()),
        }
    }

    /// Satisfying instance used for key generation.
    ///
    /// The constraint shape does not depend on the values, so keys generated
    /// from this instance verify every real proof.
    pub fn dummy() -> Result<Self, ProofError> {
        let code = SecurityCode::new('0', '0');
        let hash = commit(&code).map_err(|e| ProofError::CircuitProofError(e.to_string()))?;
        let claim = ValidatorClaim::new(agent_core::AgentState::seeded(0.into(), hash));
        let witness = MessageWitness::new(1, "000000000000", 0.into(), code)
            .map_err(|e| ProofError::CircuitProofError(e.to_string()))?;
        let output = ValidatorOutput {
            security_code_hash: hash,
            is_valid: true,
        };
        Ok(Self::new(&claim, &witness, &output))
    }
}

/// Public inputs in the order the circuit allocates them.
pub fn public_inputs(
    claim: &ValidatorClaim,
    output: &ValidatorOutput,
) -> [Fp254; PUBLIC_INPUT_COUNT] {
    [
        claim.agent_id.to_field(),
        Fp254::from(claim.agent_state.last_message_number),
        claim.agent_state.security_code_hash.as_field(),
        claim.agent_state.agent_id.to_field(),
        output.security_code_hash.as_field(),
        output.is_valid_field(),
    ]
}

// ============================================================================
// Constraint Synthesis
// ============================================================================

impl ConstraintSynthesizer<Fp254> for MessageValidatorCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fp254>) -> Result<(), SynthesisError> {
        // 1. Public inputs
        let agent_id = alloc_input(cs.clone(), self.agent_id)?;
        let last_message_number = alloc_input(cs.clone(), self.last_message_number)?;
        let security_code_hash = alloc_input(cs.clone(), self.security_code_hash)?;
        let state_agent_id = alloc_input(cs.clone(), self.state_agent_id)?;
        let output_hash = alloc_input(cs.clone(), self.output_hash)?;
        let output_is_valid = alloc_input(cs.clone(), self.output_is_valid)?;

        // 2. Private witnesses
        let message_number = alloc_witness(cs.clone(), self.message_number)?;
        let slots = alloc_witness_array(cs.clone(), self.message_slots)?;
        let witness_agent_id = alloc_witness(cs.clone(), self.witness_agent_id)?;
        let code = alloc_witness_array(cs.clone(), self.security_code)?;

        // 3. Replay protection
        enforce_greater_than(&message_number, &last_message_number)?;

        // 4. Knowledge of the secret
        let computed_hash = poseidon_hash_two_gadget(cs, &code[0], &code[1])?;
        computed_hash.enforce_equal(&security_code_hash)?;

        // 5. Agent binding
        witness_agent_id.enforce_equal(&state_agent_id)?;
        agent_id.enforce_equal(&state_agent_id)?;

        // 6. Public result
        output_hash.enforce_equal(&security_code_hash)?;
        let has_exact_length = exact_length_gadget(&slots, REQUIRED_MESSAGE_LENGTH)?;
        output_is_valid.enforce_equal(&FpVar::from(has_exact_length))?;

        Ok(())
    }
}

// ============================================================================
// Helper Functions for Constraint Generation
// ============================================================================

#[inline]
fn alloc_input(
    cs: ConstraintSystemRef<Fp254>,
    value: Option<Fp254>,
) -> Result<FpVar<Fp254>, SynthesisError> {
    FpVar::new_input(cs, || value.ok_or(SynthesisError::AssignmentMissing))
}

#[inline]
fn alloc_witness(
    cs: ConstraintSystemRef<Fp254>,
    value: Option<Fp254>,
) -> Result<FpVar<Fp254>, SynthesisError> {
    FpVar::new_witness(cs, || value.ok_or(SynthesisError::AssignmentMissing))
}

fn alloc_witness_array<const N: usize>(
    cs: ConstraintSystemRef<Fp254>,
    values: Option<[Fp254; N]>,
) -> Result<Vec<FpVar<Fp254>>, SynthesisError> {
    (0..N)
        .map(|i| alloc_witness(cs.clone(), values.map(|v| v[i])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{AgentId, AgentState, Commitment};
    use ark_relations::r1cs::ConstraintSystem;

    fn code(s: &str) -> SecurityCode {
        s.parse().expect("two-symbol code")
    }

    fn claim(last: u64, secret: &str) -> ValidatorClaim {
        ValidatorClaim::new(AgentState {
            last_message_number: last,
            security_code_hash: commit(&code(secret)).expect("commit"),
            agent_id: AgentId(1),
        })
    }

    fn witness(number: u64, text: &str, secret: &str) -> MessageWitness {
        MessageWitness::new(number, text, AgentId(1), code(secret)).expect("fits")
    }

    fn is_satisfied(circuit: MessageValidatorCircuit) -> bool {
        let cs = ConstraintSystem::<Fp254>::new_ref();
        circuit
            .generate_constraints(cs.clone())
            .expect("constraint generation");
        assert_eq!(cs.num_instance_variables(), PUBLIC_INPUT_COUNT + 1);
        cs.is_satisfied().expect("check")
    }

    fn output_for(claim: &ValidatorClaim, is_valid: bool) -> ValidatorOutput {
        ValidatorOutput {
            security_code_hash: claim.agent_state.security_code_hash,
            is_valid,
        }
    }

    #[test]
    fn test_dummy_circuit_is_satisfied() {
        let dummy = MessageValidatorCircuit::dummy().expect("dummy");
        assert!(is_satisfied(dummy));
    }

    #[test]
    fn test_valid_message_satisfies() {
        let claim = claim(0, "12");
        let output = output_for(&claim, true);
        let circuit = MessageValidatorCircuit::new(&claim, &witness(5, "Hello, World", "12"), &output);
        assert!(is_satisfied(circuit));
    }

    #[test]
    fn test_short_message_satisfies_with_false_flag() {
        let claim = claim(0, "12");
        let witness = witness(5, "Hello", "12");

        let honest = MessageValidatorCircuit::new(&claim, &witness, &output_for(&claim, false));
        assert!(is_satisfied(honest));

        let lying = MessageValidatorCircuit::new(&claim, &witness, &output_for(&claim, true));
        assert!(!is_satisfied(lying));
    }

    #[test]
    fn test_stale_message_number_unsatisfied() {
        let claim = claim(5, "12");
        let output = output_for(&claim, true);
        for number in [3, 5] {
            let circuit =
                MessageValidatorCircuit::new(&claim, &witness(number, "Hello, World", "12"), &output);
            assert!(!is_satisfied(circuit), "number {number} must be rejected");
        }
    }

    #[test]
    fn test_wrong_secret_unsatisfied() {
        let claim = claim(0, "12");
        let output = output_for(&claim, true);
        let circuit = MessageValidatorCircuit::new(&claim, &witness(5, "Hello, World", "21"), &output);
        assert!(!is_satisfied(circuit));
    }

    #[test]
    fn test_agent_mismatch_unsatisfied() {
        let claim = claim(0, "12");
        let output = output_for(&claim, true);
        let foreign = MessageWitness::new(5, "Hello, World", AgentId(2), code("12")).expect("fits");
        assert!(!is_satisfied(MessageValidatorCircuit::new(&claim, &foreign, &output)));

        let rekeyed = ValidatorClaim::with_agent_id(AgentId(9), claim.agent_state);
        let circuit =
            MessageValidatorCircuit::new(&rekeyed, &witness(5, "Hello, World", "12"), &output);
        assert!(!is_satisfied(circuit));
    }

    #[test]
    fn test_output_hash_must_echo_claim() {
        let claim = claim(0, "12");
        let output = ValidatorOutput {
            security_code_hash: Commitment::new(Fp254::from(1u64)),
            is_valid: true,
        };
        let circuit = MessageValidatorCircuit::new(&claim, &witness(5, "Hello, World", "12"), &output);
        assert!(!is_satisfied(circuit));
    }
}
