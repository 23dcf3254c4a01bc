//! Strongly typed identifier wrappers and agent addressing.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Identity of an order, stable for its lifetime in the scene.
    pub struct OrderId(u32);
}

typed_id! {
    /// Identity of a courier, stable for its lifetime in the scene.
    pub struct CourierId(u32);
}

/// The mailbox address of an agent: every order and every courier has
/// exactly one agent, addressed by the entity's identity.
///
/// This is the "reference book" key (§4.G) — the dispatcher maps each
/// `AgentAddress` to the `Box<dyn Agent>` that handles its mailbox.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentAddress {
    Order(OrderId),
    Courier(CourierId),
}

impl AgentAddress {
    /// A stable 64-bit value, distinct between the two entity kinds, used to
    /// seed per-agent RNGs (see [`crate::AgentRng`]).
    pub fn seed_component(self) -> u64 {
        match self {
            AgentAddress::Order(id) => (id.0 as u64) << 1,
            AgentAddress::Courier(id) => ((id.0 as u64) << 1) | 1,
        }
    }
}

impl fmt::Display for AgentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentAddress::Order(id) => write!(f, "order-agent:{id}"),
            AgentAddress::Courier(id) => write!(f, "courier-agent:{id}"),
        }
    }
}
