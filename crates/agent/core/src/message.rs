//! Message payload buffer and security code.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::field::Fp254;

/// Slot count of the message buffer.
pub const MESSAGE_CAPACITY: usize = 12;

/// Number of non-null symbols a message must carry to be valid.
pub const REQUIRED_MESSAGE_LENGTH: usize = 12;

/// Null symbol used to pad unused slots.
const NULL_SYMBOL: char = '\0';

/// Fixed-capacity symbol buffer carrying a message payload.
///
/// Unused trailing slots hold the null symbol. A payload longer than
/// [`MESSAGE_CAPACITY`] cannot be represented and is rejected on
/// construction, before any validity evaluation takes place.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageText {
    slots: [char; MESSAGE_CAPACITY],
}

impl MessageText {
    /// Packs `text` into the buffer.
    pub fn new(text: &str) -> Result<Self, CoreError> {
        let size = text.chars().count();
        if size > MESSAGE_CAPACITY {
            return Err(CoreError::MessageTooLong {
                size,
                capacity: MESSAGE_CAPACITY,
            });
        }

        let mut slots = [NULL_SYMBOL; MESSAGE_CAPACITY];
        for (slot, symbol) in slots.iter_mut().zip(text.chars()) {
            *slot = symbol;
        }
        Ok(Self { slots })
    }

    /// Builds a buffer from raw slots, nulls included.
    pub const fn from_slots(slots: [char; MESSAGE_CAPACITY]) -> Self {
        Self { slots }
    }

    pub const fn slots(&self) -> &[char; MESSAGE_CAPACITY] {
        &self.slots
    }

    /// Counts non-null slots.
    ///
    /// Every slot is visited regardless of its neighbours, so interior nulls
    /// are skipped rather than terminating the count. This mirrors the
    /// constant-shape circuit gadget.
    pub fn symbol_count(&self) -> usize {
        self.slots
            .iter()
            .fold(0, |count, symbol| count + usize::from(*symbol != NULL_SYMBOL))
    }

    /// Length predicate: exactly `required` non-null symbols.
    pub fn has_exact_length(&self, required: usize) -> bool {
        self.symbol_count() == required
    }

    /// Slot code points embedded into the field, nulls as zero.
    pub fn to_fields(&self) -> [Fp254; MESSAGE_CAPACITY] {
        self.slots.map(|symbol| Fp254::from(u64::from(u32::from(symbol))))
    }
}

impl FromStr for MessageText {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl core::fmt::Debug for MessageText {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageText")
            .field("symbols", &self.symbol_count())
            .finish()
    }
}

impl core::fmt::Display for MessageText {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.slots
            .iter()
            .filter(|symbol| **symbol != NULL_SYMBOL)
            .try_for_each(|symbol| write!(f, "{symbol}"))
    }
}

/// Two-symbol shared secret of an agent.
///
/// Only its [`commit`](crate::commit)ment is ever stored; `Debug` output is
/// redacted so the secret does not leak into logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityCode([char; 2]);

impl SecurityCode {
    pub const fn new(first: char, second: char) -> Self {
        Self([first, second])
    }

    pub const fn symbols(&self) -> [char; 2] {
        self.0
    }

    /// Code points embedded into the field, in absorption order.
    pub fn to_fields(&self) -> [Fp254; 2] {
        self.0.map(|symbol| Fp254::from(u64::from(u32::from(symbol))))
    }
}

impl FromStr for SecurityCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut symbols = s.chars();
        match (symbols.next(), symbols.next(), symbols.next()) {
            (Some(first), Some(second), None) => Ok(Self::new(first, second)),
            _ => Err(CoreError::InvalidSecurityCode(s.chars().count())),
        }
    }
}

impl core::fmt::Debug for SecurityCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SecurityCode(**)")
    }
}
