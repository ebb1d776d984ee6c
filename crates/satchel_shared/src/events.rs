//! Notifications an inventory hands to the session layer.
//!
//! These are one-way and fire-and-forget. Batching, flushing and encoding
//! are the session layer's job; the inventory only decides *what* happened.

use crate::container::ContainerType;
use crate::equip_slot::VISIBLE_SLOT_COUNT;
use crate::ids::{ItemId, TemplateId};
use serde::{Deserialize, Serialize};

/// Event type discriminator
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// Container header during a full inventory push
    ContainerSetup = 0,
    /// Item detail during a full inventory push
    ItemSetup = 1,
    /// New items entered the world
    ItemsCreated = 2,
    /// Visible gear changed
    AppearanceChanged = 3,
}

/// What observers see of a player's gear.
///
/// Always recomputed in full from the equipped container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    /// Primary model of the main-hand item.
    pub main_hand: u64,
    /// Secondary model of the off-hand item, or of the main hand when the
    /// off hand is empty (bow and quiver style weapons).
    pub off_hand: u64,
    /// Primary models of the visible non-weapon slots, in
    /// [`crate::VISIBLE_SLOTS`] order. Zero for an empty slot.
    pub visible: [u32; VISIBLE_SLOT_COUNT],
}

/// Notifications emitted by an inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Header for one container during a full push.
    ContainerSetup {
        /// Per-push sequential index; item details reference it.
        index: u32,
        /// Container category.
        container: ContainerType,
        /// Number of occupied slots.
        item_count: u16,
    },

    /// One resident item during a full push.
    ItemSetup {
        /// Index of the owning container within this push.
        container_index: u32,
        /// Container category.
        container: ContainerType,
        /// Slot inside the container.
        slot: u16,
        /// Item instance.
        item_id: ItemId,
        /// Item template.
        template_id: TemplateId,
        /// Stack size.
        stack_size: u32,
    },

    /// Units of a template were placed into the bags.
    ItemsCreated {
        /// Template that was created.
        template_id: TemplateId,
        /// Units actually placed (may be fewer than requested).
        count: u32,
    },

    /// The player's visible gear changed.
    AppearanceChanged(Appearance),
}

impl SessionEvent {
    /// Returns the event type
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::ContainerSetup { .. } => EventType::ContainerSetup,
            Self::ItemSetup { .. } => EventType::ItemSetup,
            Self::ItemsCreated { .. } => EventType::ItemsCreated,
            Self::AppearanceChanged(_) => EventType::AppearanceChanged,
        }
    }
}
