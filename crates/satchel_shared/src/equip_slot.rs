//! Positions inside the equipped container.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed position inside [`crate::ContainerType::Equipped`].
///
/// The discriminant is the slot index within the equipped container.
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    /// Primary weapon or tool.
    MainHand = 0,
    /// Shield, off-hand tool or weapon companion.
    OffHand = 1,
    /// Head gear.
    Head = 2,
    /// Body gear.
    Body = 3,
    /// Gloves.
    Hands = 4,
    /// Belt. Never visible.
    Waist = 5,
    /// Leg gear.
    Legs = 6,
    /// Boots.
    Feet = 7,
    /// Earrings.
    Ears = 8,
    /// Necklace.
    Neck = 9,
    /// Bracelets.
    Wrists = 10,
    /// Right ring.
    RightRing = 11,
    /// Left ring.
    LeftRing = 12,
    /// Soul crystal.
    SoulCrystal = 13,
}

/// Number of visible non-weapon equip slots.
pub const VISIBLE_SLOT_COUNT: usize = 10;

/// Slots whose primary model is part of the visible appearance, in order.
///
/// Everything from head to the left ring, minus the waist.
pub const VISIBLE_SLOTS: [EquipSlot; VISIBLE_SLOT_COUNT] = [
    EquipSlot::Head,
    EquipSlot::Body,
    EquipSlot::Hands,
    EquipSlot::Legs,
    EquipSlot::Feet,
    EquipSlot::Ears,
    EquipSlot::Neck,
    EquipSlot::Wrists,
    EquipSlot::RightRing,
    EquipSlot::LeftRing,
];

impl EquipSlot {
    /// Every equip slot in index order.
    pub const ALL: [Self; 14] = [
        Self::MainHand,
        Self::OffHand,
        Self::Head,
        Self::Body,
        Self::Hands,
        Self::Waist,
        Self::Legs,
        Self::Feet,
        Self::Ears,
        Self::Neck,
        Self::Wrists,
        Self::RightRing,
        Self::LeftRing,
        Self::SoulCrystal,
    ];

    /// Returns the slot index inside the equipped container.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u16 {
        self as u16
    }

    /// Converts an equipped-container slot index into an equip slot.
    #[must_use]
    pub fn from_index(index: u16) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Returns false for slots that never change how the player looks.
    #[inline]
    #[must_use]
    pub const fn affects_appearance(self) -> bool {
        !matches!(self, Self::Waist)
    }
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
