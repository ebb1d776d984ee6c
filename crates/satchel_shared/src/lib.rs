//! # Satchel Shared
//!
//! Common types used by the placement engine and the session layer.
//!
//! ## Rule
//!
//! This crate holds plain data: enumerations, identifiers and the
//! notifications an inventory emits. No behaviour that needs a catalog
//! or an inventory belongs here.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod container;
pub mod equip_slot;
pub mod events;
pub mod ids;

pub use container::{ContainerType, ItemPosition};
pub use equip_slot::{EquipSlot, VISIBLE_SLOTS, VISIBLE_SLOT_COUNT};
pub use events::{Appearance, EventType, SessionEvent};
pub use ids::{ItemId, OwnerId, TemplateId};
