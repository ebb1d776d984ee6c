//! # Inventory Error Types
//!
//! All errors that can occur while placing items.

use satchel_shared::{ContainerType, ItemId, ItemPosition, OwnerId, TemplateId};
use thiserror::Error;

/// Coarse classification of an [`InventoryError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request named something the catalog rejects.
    Validation,
    /// A slot was empty or occupied against expectation.
    Position,
    /// A container that must receive an item has no room.
    Capacity,
    /// The inventory invariants can no longer be trusted.
    Consistency,
}

/// Errors that can occur in the placement engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Template id not present in the catalog.
    #[error("unknown item template: {0}")]
    UnknownTemplate(TemplateId),

    /// Template has no equip-slot category.
    #[error("item template {0} can't be equipped")]
    NotEquippable(TemplateId),

    /// Slot is not one of the template's legal equip slots.
    #[error("item template {template_id} can't be equipped into slot {slot}")]
    IllegalEquipSlot {
        /// Template being equipped.
        template_id: TemplateId,
        /// Requested equipped-container slot.
        slot: u16,
    },

    /// Use category with no armoury chest.
    #[error("no armoury chest for use category {0}")]
    UnknownUseCategory(u32),

    /// Race id not present in the catalog.
    #[error("unknown race: {0}")]
    UnknownRace(u32),

    /// Class job id not present in the catalog.
    #[error("unknown class job: {0}")]
    UnknownClassJob(u32),

    /// Slot index beyond the container's capacity.
    #[error("slot {slot} is out of range for {container} (capacity {capacity})")]
    SlotOutOfRange {
        /// Container addressed.
        container: ContainerType,
        /// Requested slot.
        slot: u16,
        /// Container capacity.
        capacity: u16,
    },

    /// Requested an item count of zero.
    #[error("item count must be at least 1")]
    InvalidCount,

    /// Expected an item, found an empty slot.
    #[error("no item in {0}")]
    SlotEmpty(ItemPosition),

    /// Expected an empty slot, found an item.
    #[error("{0} is already occupied")]
    SlotOccupied(ItemPosition),

    /// Both sides of a swap name the same slot.
    #[error("can't swap {0} with itself")]
    SameSlot(ItemPosition),

    /// Item id not resident in this inventory.
    #[error("item {0} is not in this inventory")]
    ItemNotFound(ItemId),

    /// Container has no free slot.
    #[error("{0} has no free slot")]
    ContainerFull(ContainerType),

    /// Undoing a failed operation failed as well.
    #[error("rollback after `{cause}` failed: {failure}")]
    RollbackFailed {
        /// Error that triggered the rollback.
        cause: Box<InventoryError>,
        /// Error raised by the rollback itself.
        failure: Box<InventoryError>,
    },

    /// A previous rollback failed; the inventory refuses further changes.
    #[error("inventory of {0} is quarantined after a failed rollback")]
    Quarantined(OwnerId),

    /// Consistency check found a broken invariant.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}

impl InventoryError {
    /// Returns the taxonomy bucket for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTemplate(_)
            | Self::NotEquippable(_)
            | Self::IllegalEquipSlot { .. }
            | Self::UnknownUseCategory(_)
            | Self::UnknownRace(_)
            | Self::UnknownClassJob(_)
            | Self::SlotOutOfRange { .. }
            | Self::InvalidCount => ErrorKind::Validation,
            Self::SlotEmpty(_)
            | Self::SlotOccupied(_)
            | Self::SameSlot(_)
            | Self::ItemNotFound(_) => ErrorKind::Position,
            Self::ContainerFull(_) => ErrorKind::Capacity,
            Self::RollbackFailed { .. } | Self::Quarantined(_) | Self::InvariantViolated(_) => {
                ErrorKind::Consistency
            }
        }
    }
}

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors raised while loading or validating a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not valid TOML for the schema.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    /// A container category has no capacity entry.
    #[error("no capacity configured for {0}")]
    MissingCapacity(ContainerType),

    /// Two templates share an id.
    #[error("duplicate template id {0}")]
    DuplicateTemplate(TemplateId),

    /// A template allows zero units per stack.
    #[error("template {0} has max_stack 0")]
    InvalidMaxStack(TemplateId),

    /// A template references a missing equip-slot category.
    #[error("template {template_id} references unknown equip slot category {category}")]
    UnknownEquipSlotCategory {
        /// Referencing template.
        template_id: TemplateId,
        /// Missing category id.
        category: u32,
    },

    /// An equip-slot category lists no slots or a slot past the equipped capacity.
    #[error("equip slot category {0} is empty or exceeds the equipped container")]
    InvalidEquipSlotCategory(u32),

    /// An armoury mapping targets a container that is not an armoury chest.
    #[error("use category {use_category} maps to {container}, which is not an armoury chest")]
    NotAnArmoury {
        /// Use category being mapped.
        use_category: u32,
        /// Configured target.
        container: ContainerType,
    },

    /// Starting gear names a template the catalog does not define.
    #[error("starting gear references unknown template {0}")]
    UnknownStartingGear(TemplateId),
}
