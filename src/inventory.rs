//! Fuel inventory.
//!
//! The inventory is an ordered list of slots. Each slot holds a template
//! assembly, a remaining quantity and a description. Slots are addressed by a
//! stable [`SlotId`]; positional indices are only a presentation concern.
//!
//! A slot drawn down to zero leaves the listing but is remembered until the next
//! commit, so undoing the load that emptied it puts it back where it was.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assembly::Assembly;
use crate::error::{MoveError, ShuffleError, ShuffleResult, ValidationError};

/// Stable identifier of an inventory slot.
///
/// Ids are never reused within a session and survive reordering.
///
/// # Examples
///
/// ```
/// use coreshuffle::SlotId;
///
/// let a = SlotId::new();
/// let b = SlotId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(Uuid);

impl SlotId {
    /// Creates a new random slot id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a slot id from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SlotId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// One inventory slot's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Template copied into the core on each load.
    pub assembly: Assembly,
    /// Assemblies remaining.
    pub quantity: u32,
    /// Operator-facing description, e.g. `Fresh Uniform 3.2 wt/o U235`.
    pub description: String,
}

impl InventoryItem {
    /// Creates an item.
    #[must_use]
    pub fn new(assembly: Assembly, quantity: u32, description: impl Into<String>) -> Self {
        Self {
            assembly,
            quantity,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Tombstone {
    index: usize,
    item: InventoryItem,
}

/// Ordered collection of inventory slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryStore {
    slots: Vec<(SlotId, InventoryItem)>,
    exhausted: HashMap<SlotId, Tombstone>,
}

impl InventoryStore {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new slot and returns its id.
    ///
    /// A new slot is created even if an identical assembly is already stocked.
    pub fn add_item(
        &mut self,
        assembly: Assembly,
        quantity: u32,
        description: impl Into<String>,
    ) -> Result<SlotId, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::InvalidStock {
                reason: format!("quantity of '{}' must be at least 1", assembly.label),
            });
        }
        let id = SlotId::new();
        self.slots
            .push((id, InventoryItem::new(assembly, quantity, description)));
        Ok(id)
    }

    /// Appends a slot under a known id. Used when replaying a removal.
    pub(crate) fn insert_with_id(&mut self, id: SlotId, item: InventoryItem) -> ShuffleResult<()> {
        if self.contains(id) {
            return Err(MoveError::SlotInUse { slot: id }.into());
        }
        self.slots.push((id, item));
        Ok(())
    }

    /// Returns true if `id` names a live or exhausted slot.
    #[must_use]
    pub fn contains(&self, id: SlotId) -> bool {
        self.position_of(id).is_some() || self.exhausted.contains_key(&id)
    }

    /// Live slot content.
    #[must_use]
    pub fn get(&self, id: SlotId) -> Option<&InventoryItem> {
        self.slots.iter().find(|(sid, _)| *sid == id).map(|(_, item)| item)
    }

    /// Id of the live slot at `index` in listing order.
    #[must_use]
    pub fn id_at(&self, index: usize) -> Option<SlotId> {
        self.slots.get(index).map(|(id, _)| *id)
    }

    /// Listing index of a live slot.
    #[must_use]
    pub fn position_of(&self, id: SlotId) -> Option<usize> {
        self.slots.iter().position(|(sid, _)| *sid == id)
    }

    /// Draws one assembly from a slot.
    ///
    /// A slot that reaches zero leaves the listing.
    pub fn take_one(&mut self, id: SlotId) -> Result<Assembly, MoveError> {
        let index = self
            .position_of(id)
            .filter(|i| self.slots[*i].1.quantity > 0)
            .ok_or(MoveError::InsufficientInventory { slot: id })?;

        let item = &mut self.slots[index].1;
        item.quantity -= 1;
        let assembly = item.assembly.clone();

        if item.quantity == 0 {
            let (_, item) = self.slots.remove(index);
            self.exhausted.insert(id, Tombstone { index, item });
        }
        Ok(assembly)
    }

    /// Returns one assembly to the slot it was drawn from.
    ///
    /// An exhausted slot is revived at its old listing index. The assembly must
    /// be the same fuel as the slot's template.
    pub(crate) fn restock(&mut self, id: SlotId, assembly: &Assembly) -> ShuffleResult<()> {
        let mismatch = |template: &Assembly| {
            ShuffleError::internal(format!(
                "cannot return {} to slot {id} holding {}",
                assembly.label, template.label
            ))
        };

        if let Some(index) = self.position_of(id) {
            let item = &mut self.slots[index].1;
            if !item.assembly.is_same_fuel(assembly) {
                return Err(mismatch(&item.assembly));
            }
            item.quantity += 1;
            return Ok(());
        }

        let Some(Tombstone { index, mut item }) = self.exhausted.remove(&id) else {
            return Err(ShuffleError::internal(format!("unknown inventory slot {id}")));
        };
        if !item.assembly.is_same_fuel(assembly) {
            let err = mismatch(&item.assembly);
            self.exhausted.insert(id, Tombstone { index, item });
            return Err(err);
        }
        item.quantity = 1;
        let index = index.min(self.slots.len());
        self.slots.insert(index, (id, item));
        Ok(())
    }

    /// Deletes a slot outright, live or exhausted.
    pub(crate) fn remove_slot(&mut self, id: SlotId) -> Option<InventoryItem> {
        if let Some(index) = self.position_of(id) {
            return Some(self.slots.remove(index).1);
        }
        self.exhausted.remove(&id).map(|t| t.item)
    }

    /// Forgets exhausted slots. Called when a cycle is committed.
    pub fn clear_exhausted(&mut self) {
        self.exhausted.clear();
    }

    /// Number of exhausted slots remembered for undo.
    #[must_use]
    pub fn exhausted_len(&self) -> usize {
        self.exhausted.len()
    }

    /// Live slots in listing order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &InventoryItem)> {
        self.slots.iter().map(|(id, item)| (*id, item))
    }

    /// Number of live slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no live slot remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Assemblies remaining across all live slots.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.slots.iter().map(|(_, item)| u64::from(item.quantity)).sum()
    }

    /// `(id, quantity)` of every live slot in listing order.
    #[must_use]
    pub fn quantities(&self) -> Vec<(SlotId, u32)> {
        self.slots.iter().map(|(id, item)| (*id, item.quantity)).collect()
    }

    /// Compares live slots against `baseline` by id, quantity and fuel.
    /// Returns the first mismatch as `(where, expected, actual)`.
    #[must_use]
    pub fn first_difference(&self, baseline: &Self) -> Option<(String, String, String)> {
        let describe = |slot: Option<&(SlotId, InventoryItem)>| {
            slot.map_or_else(
                || "<none>".to_string(),
                |(id, item)| format!("{id} x{} {}", item.quantity, item.assembly.label),
            )
        };
        let len = self.slots.len().max(baseline.slots.len());
        (0..len).find_map(|i| {
            let mine = self.slots.get(i);
            let theirs = baseline.slots.get(i);
            let same = match (mine, theirs) {
                (Some((a_id, a)), Some((b_id, b))) => {
                    a_id == b_id && a.quantity == b.quantity && a.assembly.is_same_fuel(&b.assembly)
                }
                _ => false,
            };
            (!same).then(|| (format!("inventory[{i}]"), describe(theirs), describe(mine)))
        })
    }
}
