//! # Containers
//!
//! Bounded slot maps. A container only checks its own bounds and occupancy;
//! equip rules and cross-container moves belong to the inventory.

use crate::error::{InventoryError, InventoryResult};
use crate::item::Item;
use satchel_shared::{ContainerType, ItemPosition, TemplateId};
use std::collections::BTreeMap;

/// How an item arrives in a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Freshly created for this slot.
    Created,
    /// Moved in from another slot.
    Relocated,
}

/// A failed placement, handing the item back to the caller.
#[derive(Debug)]
pub struct Rejected {
    /// Why the slot refused the item.
    pub error: InventoryError,
    /// The item that was not placed.
    pub item: Item,
}

/// A bounded set of slots of one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    container_type: ContainerType,
    capacity: u16,
    slots: BTreeMap<u16, Item>,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new(container_type: ContainerType, capacity: u16) -> Self {
        Self {
            container_type,
            capacity,
            slots: BTreeMap::new(),
        }
    }

    /// Category of this container.
    #[inline]
    #[must_use]
    pub const fn container_type(&self) -> ContainerType {
        self.container_type
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub fn count(&self) -> u16 {
        // Occupancy never exceeds capacity, which is a u16.
        u16::try_from(self.slots.len()).unwrap_or(u16::MAX)
    }

    /// Returns true if no slot is free.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count() >= self.capacity
    }

    /// Item in a slot.
    #[inline]
    #[must_use]
    pub fn get_item(&self, slot: u16) -> Option<&Item> {
        self.slots.get(&slot)
    }

    /// Occupied slots in ascending order.
    pub fn items(&self) -> impl Iterator<Item = (u16, &Item)> + '_ {
        self.slots.iter().map(|(&slot, item)| (slot, item))
    }

    /// Stacks of a template in ascending slot order.
    pub fn items_of(&self, template_id: TemplateId) -> impl Iterator<Item = (u16, &Item)> + '_ {
        self.items().filter(move |(_, item)| item.template_id() == template_id)
    }

    pub(crate) fn stacks_of_mut(
        &mut self,
        template_id: TemplateId,
    ) -> impl Iterator<Item = &mut Item> + '_ {
        self.slots
            .values_mut()
            .filter(move |item| item.template_id() == template_id)
    }

    /// Lowest free slot, if any.
    #[must_use]
    pub fn first_available_slot(&self) -> Option<u16> {
        let mut candidate = 0u16;
        for &slot in self.slots.keys() {
            if slot != candidate {
                break;
            }
            candidate += 1;
        }
        (candidate < self.capacity).then_some(candidate)
    }

    /// Fails if `slot` is past the end of this container.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::SlotOutOfRange`].
    pub fn check_slot(&self, slot: u16) -> InventoryResult<()> {
        if slot < self.capacity {
            Ok(())
        } else {
            Err(InventoryError::SlotOutOfRange {
                container: self.container_type,
                slot,
                capacity: self.capacity,
            })
        }
    }

    /// Places an item into an empty slot and records its new position.
    pub(crate) fn add_item(
        &mut self,
        mut item: Item,
        slot: u16,
        placement: Placement,
    ) -> Result<(), Rejected> {
        let position = ItemPosition::new(self.container_type, slot);
        if let Err(error) = self.check_slot(slot) {
            return Err(Rejected { error, item });
        }
        if self.slots.contains_key(&slot) {
            return Err(Rejected {
                error: InventoryError::SlotOccupied(position),
                item,
            });
        }
        item.update_position(position);
        tracing::trace!(item = %item.id(), %position, ?placement, "item placed");
        self.slots.insert(slot, item);
        Ok(())
    }

    /// Takes the item out of a slot.
    pub(crate) fn remove_item(&mut self, slot: u16) -> InventoryResult<Item> {
        self.check_slot(slot)?;
        self.slots.remove(&slot).ok_or_else(|| {
            InventoryError::SlotEmpty(ItemPosition::new(self.container_type, slot))
        })
    }
}
