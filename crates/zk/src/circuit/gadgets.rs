//! R1CS gadgets for the message validator.
//!
//! - Poseidon hashing that matches [`agent_core::hash_two`] bit for bit
//! - Strict ordering between small field values
//! - Exact-length check over a null-padded symbol buffer

use std::cmp::Ordering;

use agent_core::{Fp254, poseidon_config};
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::{FieldVar, fp::FpVar};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

// ============================================================================
// Poseidon Hash Gadgets
// ============================================================================

/// In-circuit Poseidon over two elements.
///
/// Absorbs `left` then `right` as separate elements, exactly like the native
/// `hash_two`, and constrains the full permutation.
pub fn poseidon_hash_two_gadget(
    cs: ConstraintSystemRef<Fp254>,
    left: &FpVar<Fp254>,
    right: &FpVar<Fp254>,
) -> Result<FpVar<Fp254>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, poseidon_config());
    sponge.absorb(left)?;
    sponge.absorb(right)?;
    sponge
        .squeeze_field_elements(1)?
        .into_iter()
        .next()
        .ok_or(SynthesisError::Unsatisfiable)
}

// ============================================================================
// Comparison Gadgets
// ============================================================================

/// Enforces `value > bound`.
///
/// Both operands must be at most `(p - 1) / 2`; u64 values always are.
pub fn enforce_greater_than(
    value: &FpVar<Fp254>,
    bound: &FpVar<Fp254>,
) -> Result<(), SynthesisError> {
    value
        .is_cmp(bound, Ordering::Greater, false)?
        .enforce_equal(&Boolean::TRUE)
}

// ============================================================================
// Length Gadgets
// ============================================================================

/// Returns whether exactly `required` slots are non-zero.
///
/// Each slot contributes independently, so an interior null is skipped
/// rather than terminating the count.
pub fn exact_length_gadget(
    slots: &[FpVar<Fp254>],
    required: usize,
) -> Result<Boolean<Fp254>, SynthesisError> {
    let zero = FpVar::zero();
    let mut count = FpVar::zero();
    for slot in slots {
        let occupied = slot.is_neq(&zero)?;
        count += FpVar::from(occupied);
    }
    count.is_eq(&FpVar::constant(Fp254::from(required as u64)))
}
