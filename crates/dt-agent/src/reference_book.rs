//! The "reference book": entity → agent lookup (§3 Ownership & lifecycle,
//! §4.G Dispatcher).
//!
//! Grounded on the teacher's [`AgentStore`]/[`AgentRngs`] split: the teacher
//! keeps per-agent state in parallel `Vec`s indexed by `AgentId` and exposes
//! `AgentRngs::get_many_mut` (an unsafe-but-sound disjoint-borrow helper) so
//! the intent phase can mutate many agents' RNGs at once under Rayon. The
//! same shape serves here — agents live in a slab (`Vec<Option<Box<dyn
//! Agent>>>`) indexed by a stable slot, with a `HashMap<AgentAddress, usize>`
//! resolving the spec's "entity → agent" lookup to a slot index — because an
//! `AgentAddress` is a `Copy` enum rather than a dense integer, unlike the
//! teacher's `AgentId`.
//!
//! [`AgentStore`]: https://docs.rs/dt-agent (teacher crate; not a dependency here)

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as Map;
#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap as Map;

use dt_behavior::Agent;
use dt_core::AgentAddress;

/// Entity → agent lookup, keyed by [`AgentAddress`].
///
/// Slots are never reused within a `ReferenceBook`'s lifetime: removing an
/// agent tombstones its slot (sets it to `None`) rather than compacting the
/// `Vec`, so indices handed out by [`insert`](Self::insert) stay valid for
/// the book's lifetime. This is what makes [`get_many_mut`](Self::get_many_mut)'s
/// disjoint-borrow trick sound.
pub struct ReferenceBook {
    index: Map<AgentAddress, usize>,
    slots: Vec<Option<Box<dyn Agent>>>,
}

impl ReferenceBook {
    pub fn new() -> Self {
        Self { index: Map::default(), slots: Vec::new() }
    }

    /// Register a new agent. Panics (programming error) if `address` is
    /// already registered — entity identities are unique for their
    /// lifetime (§3), so a caller attempting to double-insert has a bug.
    pub fn insert(&mut self, agent: Box<dyn Agent>) {
        let address = agent.address();
        assert!(
            !self.index.contains_key(&address),
            "address {address} already has a registered agent"
        );
        let slot = self.slots.len();
        self.slots.push(Some(agent));
        self.index.insert(address, slot);
    }

    /// Tombstone the slot for `address`. A no-op if it was never registered
    /// or was already removed.
    pub fn remove(&mut self, address: AgentAddress) {
        if let Some(slot) = self.index.remove(&address) {
            self.slots[slot] = None;
        }
    }

    pub fn contains(&self, address: AgentAddress) -> bool {
        self.index.contains_key(&address)
    }

    pub fn get_mut(&mut self, address: AgentAddress) -> Option<&mut Box<dyn Agent>> {
        let slot = *self.index.get(&address)?;
        self.slots[slot].as_mut()
    }

    /// All currently registered addresses, in no particular order.
    pub fn addresses(&self) -> impl Iterator<Item = AgentAddress> + '_ {
        self.index.keys().copied()
    }

    pub fn courier_addresses(&self) -> impl Iterator<Item = AgentAddress> + '_ {
        self.addresses().filter(|a| matches!(a, AgentAddress::Courier(_)))
    }

    pub fn order_addresses(&self) -> impl Iterator<Item = AgentAddress> + '_ {
        self.addresses().filter(|a| matches!(a, AgentAddress::Order(_)))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Disjoint mutable borrows of the agents at `addresses`.
    ///
    /// # Precondition (caller-enforced)
    ///
    /// `addresses` must contain no duplicates and every entry must be
    /// currently registered. Both hold for the dispatcher's own call site:
    /// it builds `addresses` from `self.addresses()` (a `HashMap`'s keys,
    /// inherently unique) filtered to ones with pending mail.
    pub fn get_many_mut(&mut self, addresses: &[AgentAddress]) -> Vec<&mut Box<dyn Agent>> {
        let ptr = self.slots.as_mut_ptr();
        addresses
            .iter()
            .map(|a| {
                let slot = self.index[a];
                // SAFETY: each `slot` is distinct (caller's no-duplicates
                // precondition) and in-bounds (it came from `self.index`),
                // so the resulting `&mut` references never alias.
                let cell = unsafe { &mut *ptr.add(slot) };
                cell.as_mut().expect("registered address has a tombstoned slot")
            })
            .collect()
    }
}

impl Default for ReferenceBook {
    fn default() -> Self {
        Self::new()
    }
}
