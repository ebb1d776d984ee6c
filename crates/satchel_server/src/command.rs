//! Inventory commands queued on a session.

use satchel_inventory::{Inventory, InventoryResult, Item, WorldContext};
use satchel_shared::{EquipSlot, ItemId, ItemPosition, TemplateId};

/// One synchronous inventory operation requested for a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InventoryCommand {
    /// Create units of a template in the bags.
    NewItem {
        /// Template to create.
        template_id: TemplateId,
        /// Units requested.
        count: u32,
    },
    /// Move an item into an empty slot.
    MoveItem {
        /// Occupied source.
        from: ItemPosition,
        /// Empty destination.
        to: ItemPosition,
    },
    /// Exchange two items.
    SwapItems {
        /// Occupied source.
        from: ItemPosition,
        /// Occupied destination.
        to: ItemPosition,
    },
    /// Create one item straight into its first free equip slot.
    EquipNewItem {
        /// Template to create.
        template_id: TemplateId,
    },
    /// Move an item into a specific equip slot.
    EquipItem {
        /// Occupied source.
        from: ItemPosition,
        /// Target slot.
        slot: EquipSlot,
    },
    /// Destroy the item at a position.
    DiscardItem {
        /// Occupied position.
        position: ItemPosition,
    },
    /// Push the whole inventory to the owner.
    SendInventory,
}

/// What a successful command produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Units placed by [`InventoryCommand::NewItem`].
    Created(u32),
    /// Item created by [`InventoryCommand::EquipNewItem`], if it found a slot.
    Equipped(Option<ItemId>),
    /// Item destroyed by [`InventoryCommand::DiscardItem`].
    Discarded(Item),
    /// Any other command.
    Done,
}

impl InventoryCommand {
    /// Short operation name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewItem { .. } => "new_item",
            Self::MoveItem { .. } => "move_item",
            Self::SwapItems { .. } => "swap_items",
            Self::EquipNewItem { .. } => "equip_new_item",
            Self::EquipItem { .. } => "equip_item",
            Self::DiscardItem { .. } => "discard_item",
            Self::SendInventory => "send",
        }
    }

    /// Runs the command against an inventory.
    ///
    /// # Errors
    ///
    /// Returns whatever the inventory operation returns.
    pub fn apply(
        self,
        inventory: &mut Inventory,
        ctx: &dyn WorldContext,
    ) -> InventoryResult<CommandOutcome> {
        match self {
            Self::NewItem { template_id, count } => inventory
                .new_item(template_id, count, ctx)
                .map(CommandOutcome::Created),
            Self::MoveItem { from, to } => {
                inventory.move_item(from, to, ctx).map(|()| CommandOutcome::Done)
            }
            Self::SwapItems { from, to } => {
                inventory.swap_items(from, to, ctx).map(|()| CommandOutcome::Done)
            }
            Self::EquipNewItem { template_id } => inventory
                .equip_new_item(template_id, ctx)
                .map(CommandOutcome::Equipped),
            Self::EquipItem { from, slot } => {
                inventory.equip_item(from, slot, ctx).map(|()| CommandOutcome::Done)
            }
            Self::DiscardItem { position } => inventory
                .discard_item(position, ctx)
                .map(CommandOutcome::Discarded),
            Self::SendInventory => {
                inventory.send(ctx);
                Ok(CommandOutcome::Done)
            }
        }
    }
}
