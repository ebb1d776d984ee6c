//! Container categories and item positions.
//!
//! Every player owns exactly one container per [`ContainerType`]. The
//! numeric values are stable and are what the session layer puts on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A category of slot space owned by a player.
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    /// First general bag.
    Inventory0 = 0,
    /// Second general bag.
    Inventory1 = 1,
    /// Third general bag.
    Inventory2 = 2,
    /// Fourth general bag.
    Inventory3 = 3,

    /// Gear currently worn, indexed by [`crate::EquipSlot`].
    Equipped = 1000,

    /// Currency pouch.
    Currency = 2000,
    /// Crafting crystals.
    Crystals = 2001,

    /// Armoury chest for off-hand gear.
    ArmouryOffHand = 3200,
    /// Armoury chest for head gear.
    ArmouryHead = 3201,
    /// Armoury chest for body gear.
    ArmouryBody = 3202,
    /// Armoury chest for hand gear.
    ArmouryHands = 3203,
    /// Armoury chest for waist gear.
    ArmouryWaist = 3204,
    /// Armoury chest for leg gear.
    ArmouryLegs = 3205,
    /// Armoury chest for foot gear.
    ArmouryFeet = 3206,
    /// Armoury chest for earrings.
    ArmouryEarrings = 3207,
    /// Armoury chest for necklaces.
    ArmouryNeck = 3208,
    /// Armoury chest for bracelets.
    ArmouryWrists = 3209,
    /// Armoury chest for rings.
    ArmouryRings = 3300,
    /// Armoury chest for soul crystals.
    ArmourySoulCrystal = 3400,
    /// Armoury chest for main-hand weapons.
    ArmouryMainHand = 3500,
}

impl ContainerType {
    /// Every container category, in ascending wire order.
    pub const ALL: [Self; 20] = [
        Self::Inventory0,
        Self::Inventory1,
        Self::Inventory2,
        Self::Inventory3,
        Self::Equipped,
        Self::Currency,
        Self::Crystals,
        Self::ArmouryOffHand,
        Self::ArmouryHead,
        Self::ArmouryBody,
        Self::ArmouryHands,
        Self::ArmouryWaist,
        Self::ArmouryLegs,
        Self::ArmouryFeet,
        Self::ArmouryEarrings,
        Self::ArmouryNeck,
        Self::ArmouryWrists,
        Self::ArmouryRings,
        Self::ArmourySoulCrystal,
        Self::ArmouryMainHand,
    ];

    /// General bags in the order new items fill them.
    pub const BAGS: [Self; 4] = [
        Self::Inventory0,
        Self::Inventory1,
        Self::Inventory2,
        Self::Inventory3,
    ];

    /// Returns the wire value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self as u16
    }

    /// Converts a wire value back into a category.
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.raw() == raw)
    }

    /// Position of this category in [`Self::ALL`].
    #[must_use]
    pub const fn ordinal(self) -> usize {
        match self {
            Self::Inventory0 => 0,
            Self::Inventory1 => 1,
            Self::Inventory2 => 2,
            Self::Inventory3 => 3,
            Self::Equipped => 4,
            Self::Currency => 5,
            Self::Crystals => 6,
            Self::ArmouryOffHand => 7,
            Self::ArmouryHead => 8,
            Self::ArmouryBody => 9,
            Self::ArmouryHands => 10,
            Self::ArmouryWaist => 11,
            Self::ArmouryLegs => 12,
            Self::ArmouryFeet => 13,
            Self::ArmouryEarrings => 14,
            Self::ArmouryNeck => 15,
            Self::ArmouryWrists => 16,
            Self::ArmouryRings => 17,
            Self::ArmourySoulCrystal => 18,
            Self::ArmouryMainHand => 19,
        }
    }

    /// Returns true for the general bags.
    #[inline]
    #[must_use]
    pub const fn is_bag(self) -> bool {
        matches!(
            self,
            Self::Inventory0 | Self::Inventory1 | Self::Inventory2 | Self::Inventory3
        )
    }

    /// Returns true for the armoury chests.
    #[inline]
    #[must_use]
    pub const fn is_armoury(self) -> bool {
        matches!(
            self,
            Self::ArmouryOffHand
                | Self::ArmouryHead
                | Self::ArmouryBody
                | Self::ArmouryHands
                | Self::ArmouryWaist
                | Self::ArmouryLegs
                | Self::ArmouryFeet
                | Self::ArmouryEarrings
                | Self::ArmouryNeck
                | Self::ArmouryWrists
                | Self::ArmouryRings
                | Self::ArmourySoulCrystal
                | Self::ArmouryMainHand
        )
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where an item lives: a container category and a slot inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemPosition {
    /// Container category.
    pub container: ContainerType,
    /// Slot index inside the container.
    pub slot: u16,
}

impl ItemPosition {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(container: ContainerType, slot: u16) -> Self {
        Self { container, slot }
    }
}

impl fmt::Display for ItemPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.container, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip_covers_every_category() {
        for container in ContainerType::ALL {
            assert_eq!(ContainerType::from_raw(container.raw()), Some(container));
        }
        assert_eq!(ContainerType::from_raw(42), None);
    }

    #[test]
    fn test_ordinal_indexes_all() {
        for (i, container) in ContainerType::ALL.iter().enumerate() {
            assert_eq!(container.ordinal(), i);
        }
    }

    #[test]
    fn test_bags_and_armoury_are_disjoint() {
        for container in ContainerType::ALL {
            assert!(!(container.is_bag() && container.is_armoury()));
        }
        assert!(ContainerType::BAGS.iter().all(|c| c.is_bag()));
        assert!(!ContainerType::Equipped.is_armoury());
        assert!(ContainerType::ArmouryRings.is_armoury());
    }

    #[test]
    fn test_snake_case_names_in_toml() {
        #[derive(Deserialize)]
        struct Row {
            container: ContainerType,
        }

        let row: Row = toml::from_str("container = \"armoury_main_hand\"").unwrap();
        assert_eq!(row.container, ContainerType::ArmouryMainHand);
    }

    #[test]
    fn test_position_display() {
        let pos = ItemPosition::new(ContainerType::Inventory1, 7);
        assert_eq!(pos.to_string(), "Inventory1[7]");
    }
}
