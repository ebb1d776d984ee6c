//! # Satchel Inventory
//!
//! Item placement and consistency engine for a multiplayer world server.
//!
//! ## Design Principles
//!
//! 1. **Atomic placement** - Every operation completes or leaves the inventory untouched
//! 2. **No lost items** - A refused placement always hands the item back
//! 3. **Data-driven rules** - Templates, slots and capacities come from a TOML catalog
//! 4. **Explicit world context** - Notifications go through a handle passed per call
//!
//! ## Thread Safety
//!
//! An [`Inventory`] has no internal locking. It must be driven by a single
//! writer, normally the owning player's session.
//!
//! ## Example
//!
//! ```rust,ignore
//! use satchel_inventory::{Catalog, Inventory, Offline, SequentialItemIds};
//!
//! let catalog = Arc::new(Catalog::load("data/catalog.toml")?);
//! let mut inventory = Inventory::new(owner, catalog, Arc::new(SequentialItemIds::default()));
//!
//! // Top up potion stacks, then fill free bag slots
//! let placed = inventory.new_item(potion, 25, &Offline)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod container;
pub mod context;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod item;
pub mod transaction;

pub use catalog::{Catalog, CatalogBuilder, ClassJob, ItemTemplate, Race, Sex, StarterGear};
pub use container::{Container, Placement, Rejected};
pub use context::{Offline, RecordingContext, WorldContext};
pub use error::{CatalogError, ErrorKind, InventoryError, InventoryResult};
pub use ids::{ItemIdAllocator, SequentialItemIds};
pub use inventory::{Inventory, InventorySnapshot};
pub use item::Item;
pub use transaction::{Transaction, TransactionAction};
