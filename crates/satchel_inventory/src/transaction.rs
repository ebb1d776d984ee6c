//! # Transactions
//!
//! Staged placement actions committed as a unit.
//!
//! Nothing touches the inventory until [`Transaction::commit`]. Commit
//! applies the actions in order; if one fails, the ones already applied are
//! undone newest first, so the inventory ends up as if commit had never been
//! called. Dropping a transaction without committing has no effect.

use crate::context::WorldContext;
use crate::error::{InventoryError, InventoryResult};
use crate::inventory::Inventory;
use crate::item::Item;
use satchel_shared::{ItemPosition, OwnerId};

/// A staged placement action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionAction {
    /// Destroy the item at a position.
    Discard(ItemPosition),
    /// Move an item into an empty slot.
    Move {
        /// Occupied source.
        from: ItemPosition,
        /// Empty destination.
        to: ItemPosition,
    },
    /// Exchange two items in place.
    Swap {
        /// First occupied slot.
        a: ItemPosition,
        /// Second occupied slot.
        b: ItemPosition,
    },
}

/// What an applied action needs to be undone.
#[derive(Debug)]
enum Applied {
    Discarded { item: Item, from: ItemPosition },
    Moved { from: ItemPosition, to: ItemPosition },
    Swapped { a: ItemPosition, b: ItemPosition },
}

impl Applied {
    fn into_discarded(self) -> Option<Item> {
        match self {
            Self::Discarded { item, .. } => Some(item),
            Self::Moved { .. } | Self::Swapped { .. } => None,
        }
    }
}

/// Transaction handle for grouping actions against one inventory.
pub struct Transaction<'a> {
    inventory: &'a mut Inventory,
    owner: OwnerId,
    actions: Vec<TransactionAction>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(inventory: &'a mut Inventory) -> Self {
        let owner = inventory.owner();
        Self {
            inventory,
            owner,
            actions: Vec::new(),
        }
    }

    /// Player whose inventory this transaction targets.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Stages an action.
    pub fn add_action(&mut self, action: TransactionAction) -> &mut Self {
        self.actions.push(action);
        self
    }

    /// Staged actions in order.
    #[must_use]
    pub fn actions(&self) -> &[TransactionAction] {
        &self.actions
    }

    /// Number of staged actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Applies every staged action, or none of them.
    ///
    /// Returns the discarded items in the order they were discarded.
    ///
    /// # Errors
    ///
    /// Returns the error of the first action that failed, after undoing the
    /// actions before it. If undoing fails the inventory is quarantined and
    /// [`InventoryError::RollbackFailed`] is returned.
    pub fn commit(self, ctx: &dyn WorldContext) -> InventoryResult<Vec<Item>> {
        let Self {
            inventory,
            owner,
            actions,
        } = self;
        inventory.ensure_usable()?;

        let mut journal = Vec::with_capacity(actions.len());
        let mut failure = None;
        for action in &actions {
            match apply(inventory, *action) {
                Ok(applied) => journal.push(applied),
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }

        let result = match failure {
            None => {
                tracing::debug!(%owner, actions = actions.len(), "transaction committed");
                Ok(journal
                    .into_iter()
                    .filter_map(Applied::into_discarded)
                    .collect())
            }
            Some(error) if inventory.is_quarantined() => Err(error),
            Some(error) => Err(undo(inventory, journal, error)),
        };
        inventory.complete("transaction", result, ctx)
    }
}

fn apply(inventory: &mut Inventory, action: TransactionAction) -> InventoryResult<Applied> {
    match action {
        TransactionAction::Discard(from) => {
            let item = inventory.take(from)?;
            tracing::debug!(owner = %inventory.owner(), item = %item.id(), %from, "item discarded");
            Ok(Applied::Discarded { item, from })
        }
        TransactionAction::Move { from, to } => {
            inventory.relocate(from, to)?;
            Ok(Applied::Moved { from, to })
        }
        TransactionAction::Swap { a, b } => {
            inventory.check_swap(a, b)?;
            inventory.exchange(a, b, a)?;
            Ok(Applied::Swapped { a, b })
        }
    }
}

fn undo(inventory: &mut Inventory, mut journal: Vec<Applied>, cause: InventoryError) -> InventoryError {
    while let Some(applied) = journal.pop() {
        let restored = match applied {
            Applied::Discarded { item, from } => inventory.restore(vec![(item, from)], &[]),
            Applied::Moved { from, to } => inventory.restore(Vec::new(), &[(to, from)]),
            Applied::Swapped { a, b } => inventory.restore(Vec::new(), &[(b, a), (a, b)]),
        };
        if let Err(failure) = restored {
            return inventory.quarantine(cause, failure);
        }
    }
    tracing::warn!(owner = %inventory.owner(), error = %cause, "transaction rolled back");
    cause
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ItemTemplate};
    use crate::context::{Offline, RecordingContext};
    use crate::ids::SequentialItemIds;
    use satchel_shared::{ContainerType, EquipSlot, SessionEvent, TemplateId};
    use std::sync::Arc;

    const POTION: TemplateId = TemplateId(1);
    const HAT: TemplateId = TemplateId(2);

    fn inventory() -> Inventory {
        let catalog = ContainerType::ALL
            .iter()
            .fold(Catalog::builder(), |b, &c| b.capacity(c, 14))
            .equip_slot_category(3, &[EquipSlot::Head])
            .armoury(34, ContainerType::ArmouryHead)
            .template(ItemTemplate::new(POTION, 5))
            .template(ItemTemplate::new(HAT, 1).with_equip(3, 34).with_models(42, 0))
            .build()
            .unwrap();
        Inventory::new(
            OwnerId(3),
            Arc::new(catalog),
            Arc::new(SequentialItemIds::default()),
        )
    }

    fn bag(slot: u16) -> ItemPosition {
        ItemPosition::new(ContainerType::Inventory0, slot)
    }

    #[test]
    fn test_commit_applies_in_order() {
        let mut inv = inventory();
        inv.new_item(POTION, 15, &Offline).unwrap();

        let mut txn = inv.begin_transaction();
        txn.add_action(TransactionAction::Move { from: bag(0), to: bag(5) })
            .add_action(TransactionAction::Swap { a: bag(5), b: bag(1) })
            .add_action(TransactionAction::Discard(bag(2)));
        assert_eq!(txn.len(), 3);
        let discarded = txn.commit(&Offline).unwrap();

        assert_eq!(discarded.len(), 1);
        assert_eq!(discarded[0].position(), bag(2));
        assert!(inv.get_item(bag(0)).is_none());
        assert!(inv.get_item(bag(1)).is_some());
        assert!(inv.get_item(bag(5)).is_some());
        assert_eq!(inv.count_template(POTION), 10);
        inv.check_invariants().unwrap();
    }

    #[test]
    fn test_failure_undoes_earlier_actions() {
        let mut inv = inventory();
        inv.new_item(POTION, 10, &Offline).unwrap();
        let before = inv.snapshot();

        let mut txn = inv.begin_transaction();
        txn.add_action(TransactionAction::Discard(bag(0)))
            .add_action(TransactionAction::Move { from: bag(1), to: bag(4) })
            .add_action(TransactionAction::Discard(bag(9)));
        let err = txn.commit(&Offline).unwrap_err();

        assert_eq!(err, InventoryError::SlotEmpty(bag(9)));
        assert_eq!(inv.snapshot(), before);
    }

    #[test]
    fn test_swap_action_same_slot_fails_cleanly() {
        let mut inv = inventory();
        inv.new_item(POTION, 10, &Offline).unwrap();
        let before = inv.snapshot();

        let mut txn = inv.begin_transaction();
        txn.add_action(TransactionAction::Swap { a: bag(1), b: bag(0) })
            .add_action(TransactionAction::Swap { a: bag(0), b: bag(0) });
        assert_eq!(txn.commit(&Offline), Err(InventoryError::SameSlot(bag(0))));
        assert_eq!(inv.snapshot(), before);
    }

    #[test]
    fn test_dropped_transaction_has_no_effect() {
        let mut inv = inventory();
        inv.new_item(POTION, 5, &Offline).unwrap();
        let before = inv.snapshot();
        {
            let mut txn = inv.begin_transaction();
            txn.add_action(TransactionAction::Discard(bag(0)));
        }
        assert_eq!(inv.snapshot(), before);
    }

    #[test]
    fn test_discarding_worn_gear_broadcasts_once() {
        let mut inv = inventory();
        inv.equip_new_item(HAT, &Offline).unwrap();
        let ctx = RecordingContext::in_world();
        let head = ItemPosition::new(ContainerType::Equipped, EquipSlot::Head.index());

        let hat = inv.discard_item(head, &ctx).unwrap();
        assert_eq!(hat.template_id(), HAT);
        let visible = ctx.take_visible();
        assert_eq!(visible.len(), 1);
        assert!(matches!(
            &visible[0],
            SessionEvent::AppearanceChanged(a) if a.visible[0] == 0
        ));
    }

    #[test]
    fn test_failed_commit_is_silent() {
        let mut inv = inventory();
        inv.equip_new_item(HAT, &Offline).unwrap();
        let ctx = RecordingContext::in_world();
        let head = ItemPosition::new(ContainerType::Equipped, EquipSlot::Head.index());

        let mut txn = inv.begin_transaction();
        txn.add_action(TransactionAction::Discard(head))
            .add_action(TransactionAction::Discard(bag(0)));
        assert!(txn.commit(&ctx).is_err());
        assert!(ctx.take_visible().is_empty());
        assert_eq!(inv.get_item(head).unwrap().template_id(), HAT);
    }
}
