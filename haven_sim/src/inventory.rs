// Inventory mutation under stacking and capacity rules.
//
// An `Inventory` is an ordered list of `ResourceStack`s, at most one per
// resource kind. `InventoryManager` is the only code that changes one, and
// it never mutates in place: each operation takes the old inventory by
// reference and returns a new one.
//
// Capacity rules for gains:
// - A gain for a kind that already has a stack merges into it. Under
//   `StackPolicy::Unbounded` (the default) the merged quantity may exceed
//   `max_stack`; under `Clamped` it stops at `max_stack` and the rest is
//   discarded.
// - A gain for a new kind opens a slot only if `slots_used < max_slots`.
//   Otherwise the gain is dropped silently. There is no partial credit and
//   no error.
//
// Removals are checked: asking for more than the inventory holds returns
// `InventoryError::Insufficient` and leaves the inventory alone. Subtraction
// never wraps.
//
// See also: `catalog.rs` for `max_stack` lookup, `harvest.rs` which
// produces the gains, `store.rs` which threads the result into `GameState`.

use crate::catalog::ResourceCatalog;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a merge treats `max_stack`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackPolicy {
    /// Merges ignore `max_stack`.
    #[default]
    Unbounded,
    /// Merges stop at `max_stack`; overflow is discarded.
    Clamped,
}

/// A player's carried resources. Serializes as a bare list of stacks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(pub Vec<ResourceStack>);

impl Inventory {
    pub fn stacks(&self) -> &[ResourceStack] {
        &self.0
    }

    pub fn slots_used(&self) -> usize {
        self.0.len()
    }

    pub fn quantity_of(&self, resource_type: &ResourceType) -> u32 {
        self.stack(resource_type).map_or(0, |s| s.quantity)
    }

    pub fn total_items(&self) -> u64 {
        self.0.iter().map(|s| s.quantity as u64).sum()
    }

    pub fn stack(&self, resource_type: &ResourceType) -> Option<&ResourceStack> {
        self.0.iter().find(|s| &s.resource_type == resource_type)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryError {
    Insufficient {
        resource: ResourceType,
        requested: u32,
        available: u32,
    },
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::Insufficient {
                resource,
                requested,
                available,
            } => write!(f, "need {requested} {resource}, have {available}"),
        }
    }
}

impl std::error::Error for InventoryError {}

/// Applies resource deltas to inventories.
pub struct InventoryManager<'a> {
    catalog: &'a ResourceCatalog,
    policy: StackPolicy,
}

impl<'a> InventoryManager<'a> {
    pub fn new(catalog: &'a ResourceCatalog, policy: StackPolicy) -> Self {
        Self { catalog, policy }
    }

    /// Add every gain in order, following the capacity rules above.
    pub fn apply_gain(
        &self,
        inventory: &Inventory,
        max_slots: u32,
        gains: &[ResourceGain],
    ) -> Inventory {
        let mut stacks = inventory.0.clone();
        for gain in gains {
            if gain.quantity == 0 {
                continue;
            }
            if let Some(stack) = stacks.iter_mut().find(|s| s.resource_type == gain.resource_type) {
                let merged = stack.quantity.saturating_add(gain.quantity);
                stack.quantity = match self.policy {
                    StackPolicy::Unbounded => merged,
                    StackPolicy::Clamped => merged.min(stack.max_stack.max(stack.quantity)),
                };
            } else if stacks.len() < max_slots as usize {
                let mut stack = self.catalog.new_stack(&gain.resource_type, gain.quantity);
                if self.policy == StackPolicy::Clamped {
                    stack.quantity = stack.quantity.min(stack.max_stack);
                }
                stacks.push(stack);
            }
        }
        Inventory(stacks)
    }

    /// Take `quantity` of one kind out. The slot disappears when it hits zero.
    pub fn remove(
        &self,
        inventory: &Inventory,
        resource_type: &ResourceType,
        quantity: u32,
    ) -> Result<Inventory, InventoryError> {
        let available = inventory.quantity_of(resource_type);
        if available < quantity {
            return Err(InventoryError::Insufficient {
                resource: resource_type.clone(),
                requested: quantity,
                available,
            });
        }
        let mut stacks = inventory.0.clone();
        if let Some(index) = stacks.iter().position(|s| &s.resource_type == resource_type) {
            let stack = &mut stacks[index];
            assert!(stack.quantity >= quantity, "inventory underflow");
            stack.quantity -= quantity;
            if stack.quantity == 0 {
                stacks.remove(index);
            }
        }
        Ok(Inventory(stacks))
    }

    /// Remove every cost, or nothing if any single cost cannot be paid.
    pub fn spend(
        &self,
        inventory: &Inventory,
        costs: &[ResourceGain],
    ) -> Result<Inventory, InventoryError> {
        let mut current = inventory.clone();
        for cost in costs {
            current = self.remove(&current, &cost.resource_type, cost.quantity)?;
        }
        Ok(current)
    }
}
