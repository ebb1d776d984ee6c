//! # Player Inventory
//!
//! One container per category, plus every placement rule that spans more
//! than one container.
//!
//! ## Atomicity
//!
//! Every mutating operation either completes or leaves the inventory exactly
//! as it found it. Structural primitives hand a refused item back
//! ([`Rejected`]) and the orchestrating operation puts every touched item
//! back at its original position before surfacing the error. If putting
//! things back fails too, the inventory is quarantined and refuses further
//! changes.
//!
//! ## Notifications
//!
//! Operations take a [`WorldContext`]. Item creation and appearance changes
//! are only reported while the owner is in the world, and appearance is
//! broadcast at most once per successful operation.

use crate::catalog::{Catalog, ItemTemplate, Sex};
use crate::container::{Container, Placement, Rejected};
use crate::context::WorldContext;
use crate::error::{ErrorKind, InventoryError, InventoryResult};
use crate::ids::ItemIdAllocator;
use crate::item::Item;
use crate::transaction::{Transaction, TransactionAction};
use satchel_shared::{
    Appearance, ContainerType, EquipSlot, ItemId, ItemPosition, OwnerId, SessionEvent,
    TemplateId, VISIBLE_SLOTS, VISIBLE_SLOT_COUNT,
};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Every item of an inventory keyed by position.
///
/// Two snapshots compare equal exactly when the inventories hold the same
/// items, with the same stack sizes, at the same positions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    items: BTreeMap<ItemPosition, Item>,
}

impl InventorySnapshot {
    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the inventory was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item recorded at a position.
    #[must_use]
    pub fn get(&self, position: ItemPosition) -> Option<&Item> {
        self.items.get(&position)
    }

    /// Items in position order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemPosition, &Item)> {
        self.items.iter()
    }
}

/// A player's complete set of containers.
pub struct Inventory {
    owner: OwnerId,
    catalog: Arc<Catalog>,
    ids: Arc<dyn ItemIdAllocator>,
    containers: [Container; ContainerType::ALL.len()],
    appearance_dirty: bool,
    quarantined: bool,
}

impl fmt::Debug for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inventory")
            .field("owner", &self.owner)
            .field("containers", &self.containers)
            .field("quarantined", &self.quarantined)
            .finish_non_exhaustive()
    }
}

impl Inventory {
    /// Creates an empty inventory sized from the catalog.
    #[must_use]
    pub fn new(owner: OwnerId, catalog: Arc<Catalog>, ids: Arc<dyn ItemIdAllocator>) -> Self {
        let containers =
            ContainerType::ALL.map(|container| Container::new(container, catalog.capacity(container)));
        Self {
            owner,
            catalog,
            ids,
            containers,
            appearance_dirty: false,
            quarantined: false,
        }
    }

    /// Creates an inventory wearing the class job's weapon and the race's
    /// starting armour.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::UnknownClassJob`] or
    /// [`InventoryError::UnknownRace`] for ids missing from the catalog.
    pub fn with_starting_gear(
        owner: OwnerId,
        catalog: Arc<Catalog>,
        ids: Arc<dyn ItemIdAllocator>,
        race: u32,
        sex: Sex,
        class_job: u32,
        ctx: &dyn WorldContext,
    ) -> InventoryResult<Self> {
        let weapon = catalog
            .class_job(class_job)
            .ok_or(InventoryError::UnknownClassJob(class_job))?
            .weapon;
        let armour = *catalog
            .race(race)
            .ok_or(InventoryError::UnknownRace(race))?
            .gear(sex);

        let mut inventory = Self::new(owner, catalog, ids);
        for template_id in std::iter::once(weapon).chain(armour.pieces()) {
            inventory.equip_new_item(template_id, ctx)?;
        }
        tracing::debug!(%owner, race, class_job, ?sex, "starting gear equipped");
        Ok(inventory)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Owning player.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Catalog this inventory was built against.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Container of a category.
    #[inline]
    #[must_use]
    pub fn container(&self, container: ContainerType) -> &Container {
        &self.containers[container.ordinal()]
    }

    fn container_mut(&mut self, container: ContainerType) -> &mut Container {
        &mut self.containers[container.ordinal()]
    }

    /// All containers in wire order.
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }

    /// Item at a position.
    #[must_use]
    pub fn get_item(&self, position: ItemPosition) -> Option<&Item> {
        self.container(position.container).get_item(position.slot)
    }

    /// Finds a resident item by id.
    #[must_use]
    pub fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.containers
            .iter()
            .flat_map(Container::items)
            .map(|(_, item)| item)
            .find(|item| item.id() == id)
    }

    /// Position of a resident item.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::ItemNotFound`] if no container holds it.
    pub fn position_of(&self, id: ItemId) -> InventoryResult<ItemPosition> {
        self.find_item(id)
            .map(Item::position)
            .ok_or(InventoryError::ItemNotFound(id))
    }

    /// Total units of a template across every container.
    #[must_use]
    pub fn count_template(&self, template_id: TemplateId) -> u32 {
        self.containers
            .iter()
            .flat_map(|container| container.items_of(template_id))
            .fold(0u32, |total, (_, item)| total.saturating_add(item.stack_size()))
    }

    /// Returns true after a failed rollback.
    #[inline]
    #[must_use]
    pub const fn is_quarantined(&self) -> bool {
        self.quarantined
    }

    /// Copies the full position-to-item map.
    #[must_use]
    pub fn snapshot(&self) -> InventorySnapshot {
        let items = self
            .containers
            .iter()
            .flat_map(|container| {
                let category = container.container_type();
                container
                    .items()
                    .map(move |(slot, item)| (ItemPosition::new(category, slot), item.clone()))
            })
            .collect();
        InventorySnapshot { items }
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Creates `count` units of a template in the general bags.
    ///
    /// Existing stacks are topped up first, then new stacks go into the
    /// lowest free slots, bag by bag. Units that do not fit are dropped.
    /// Returns the number of units placed.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidCount`] for a zero count and
    /// [`InventoryError::UnknownTemplate`] for an unknown template.
    pub fn new_item(
        &mut self,
        template_id: TemplateId,
        count: u32,
        ctx: &dyn WorldContext,
    ) -> InventoryResult<u32> {
        self.ensure_usable()?;
        if count == 0 {
            return Err(InventoryError::InvalidCount);
        }
        let template = self.catalog.require_template(template_id)?;

        let mut remaining = count;
        for bag in ContainerType::BAGS {
            if remaining == 0 {
                break;
            }
            let container = &mut self.containers[bag.ordinal()];

            if template.is_stackable() {
                for stack in container.stacks_of_mut(template_id) {
                    let change = stack.headroom().min(remaining);
                    stack.update_stack_size(change);
                    remaining -= change;
                    if remaining == 0 {
                        break;
                    }
                }
            }

            while remaining > 0 {
                let Some(slot) = container.first_available_slot() else {
                    break;
                };
                let size = template.max_stack.min(remaining);
                let position = ItemPosition::new(bag, slot);
                let item = Item::new(self.ids.next_id(), Arc::clone(&template), size, position);
                container
                    .add_item(item, slot, Placement::Created)
                    .map_err(|rejected| rejected.error)?;
                remaining -= size;
            }
        }

        let placed = count - remaining;
        if remaining > 0 {
            tracing::debug!(
                owner = %self.owner,
                %template_id,
                dropped = remaining,
                "bags full, dropping units"
            );
        }
        if ctx.is_in_world() {
            ctx.send(SessionEvent::ItemsCreated {
                template_id,
                count: placed,
            });
        }
        Ok(placed)
    }

    /// Moves an item into an empty slot.
    ///
    /// # Errors
    ///
    /// Fails if `from` is empty, `to` is occupied, either slot is out of
    /// range, or the item can't be worn in `to`. The inventory is unchanged
    /// on failure.
    pub fn move_item(
        &mut self,
        from: ItemPosition,
        to: ItemPosition,
        ctx: &dyn WorldContext,
    ) -> InventoryResult<()> {
        self.ensure_usable()?;
        let result = self.relocate(from, to);
        self.complete("move", result, ctx)
    }

    /// Swaps the items in two occupied slots.
    ///
    /// Swapping into the equipped container from anywhere but an armoury
    /// chest sends the displaced item to the armoury chest for its use
    /// category instead of back to `from`.
    ///
    /// # Errors
    ///
    /// Fails if either slot is empty, the slots are equal, the armoury chest
    /// is full, or the incoming item can't be worn in `to`. The inventory is
    /// unchanged on failure.
    pub fn swap_items(
        &mut self,
        from: ItemPosition,
        to: ItemPosition,
        ctx: &dyn WorldContext,
    ) -> InventoryResult<()> {
        self.ensure_usable()?;
        let result = self
            .check_swap(from, to)
            .and_then(|()| self.displacement_target(from, to))
            .and_then(|displaced_to| self.exchange(from, to, displaced_to));
        self.complete("swap", result, ctx)
    }

    /// Creates a new instance of a template in its first free legal equip
    /// slot.
    ///
    /// Returns `None` without touching anything if the template can't be
    /// equipped or every legal slot is taken.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::UnknownTemplate`] for an unknown template.
    pub fn equip_new_item(
        &mut self,
        template_id: TemplateId,
        ctx: &dyn WorldContext,
    ) -> InventoryResult<Option<ItemId>> {
        self.ensure_usable()?;
        let template = self.catalog.require_template(template_id)?;
        let Some(slots) = self.catalog.equip_slots(&template) else {
            tracing::debug!(owner = %self.owner, %template_id, "not equippable, ignoring");
            return Ok(None);
        };
        let equipped = self.container(ContainerType::Equipped);
        let Some(slot) = slots
            .iter()
            .copied()
            .find(|slot| equipped.get_item(slot.index()).is_none())
        else {
            tracing::debug!(owner = %self.owner, %template_id, "no free equip slot, ignoring");
            return Ok(None);
        };

        let position = ItemPosition::new(ContainerType::Equipped, slot.index());
        let id = self.ids.next_id();
        let item = Item::new(id, template, 1, position);
        let result = self
            .place(item, position, Placement::Created)
            .map_err(|rejected| rejected.error);
        self.complete("equip", result, ctx)?;
        Ok(Some(id))
    }

    /// Puts an existing item on, into a specific equip slot.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the item can't be worn in `slot`, and
    /// a position error if `from` is empty or `slot` is taken.
    pub fn equip_item(
        &mut self,
        from: ItemPosition,
        slot: EquipSlot,
        ctx: &dyn WorldContext,
    ) -> InventoryResult<()> {
        self.ensure_usable()?;
        let to = ItemPosition::new(ContainerType::Equipped, slot.index());
        let result = self
            .check_wearable(from, slot)
            .and_then(|()| self.relocate(from, to));
        self.complete("equip", result, ctx)
    }

    /// Destroys the item in a slot and hands it back.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::SlotEmpty`] if there is nothing to discard.
    pub fn discard_item(
        &mut self,
        position: ItemPosition,
        ctx: &dyn WorldContext,
    ) -> InventoryResult<Item> {
        let mut transaction = self.begin_transaction();
        transaction.add_action(TransactionAction::Discard(position));
        let mut discarded = transaction.commit(ctx)?;
        discarded.pop().ok_or(InventoryError::SlotEmpty(position))
    }

    /// Starts staging a group of actions to commit as a unit.
    pub fn begin_transaction(&mut self) -> Transaction<'_> {
        Transaction::new(self)
    }

    /// Pushes the full inventory to the owner's session.
    ///
    /// Each container gets a sequential index; its items are sent first,
    /// followed by the container header carrying the same index.
    pub fn send(&self, ctx: &dyn WorldContext) {
        for (index, container) in (0u32..).zip(self.containers.iter()) {
            let category = container.container_type();
            for (slot, item) in container.items() {
                ctx.send(SessionEvent::ItemSetup {
                    container_index: index,
                    container: category,
                    slot,
                    item_id: item.id(),
                    template_id: item.template_id(),
                    stack_size: item.stack_size(),
                });
            }
            ctx.send(SessionEvent::ContainerSetup {
                index,
                container: category,
                item_count: container.count(),
            });
        }
    }

    // ------------------------------------------------------------------
    // Appearance
    // ------------------------------------------------------------------

    /// Main-hand and off-hand models.
    ///
    /// The off-hand model falls back to the main hand's secondary model
    /// when the off hand is empty.
    #[must_use]
    pub fn weapon_display_ids(&self) -> (u64, u64) {
        let equipped = self.container(ContainerType::Equipped);
        let main_hand = equipped
            .get_item(EquipSlot::MainHand.index())
            .map(Item::template);
        let off_hand = equipped
            .get_item(EquipSlot::OffHand.index())
            .map(Item::template);

        let primary = main_hand.map_or(0, |template| template.model_primary);
        let secondary = off_hand
            .or(main_hand)
            .map_or(0, |template| template.model_secondary);
        (primary, secondary)
    }

    /// Primary models of the visible armour slots.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn visible_display_ids(&self) -> [u32; VISIBLE_SLOT_COUNT] {
        let equipped = self.container(ContainerType::Equipped);
        // Armour models live in the low 32 bits.
        VISIBLE_SLOTS.map(|slot| {
            equipped
                .get_item(slot.index())
                .map_or(0, |item| item.template().model_primary as u32)
        })
    }

    /// Full appearance, recomputed from the equipped container.
    #[must_use]
    pub fn appearance(&self) -> Appearance {
        let (main_hand, off_hand) = self.weapon_display_ids();
        Appearance {
            main_hand,
            off_hand,
            visible: self.visible_display_ids(),
        }
    }

    // ------------------------------------------------------------------
    // Consistency
    // ------------------------------------------------------------------

    /// Verifies the placement invariants.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvariantViolated`] describing the first
    /// breach found.
    pub fn check_invariants(&self) -> InventoryResult<()> {
        let violated = |message: String| Err(InventoryError::InvariantViolated(message));
        let mut seen = HashSet::new();

        for container in &self.containers {
            let category = container.container_type();
            if container.count() > container.capacity() {
                return violated(format!("{category} holds more items than slots"));
            }
            for (slot, item) in container.items() {
                let position = ItemPosition::new(category, slot);
                if slot >= container.capacity() {
                    return violated(format!("item {} sits past the end at {position}", item.id()));
                }
                if item.position() != position {
                    return violated(format!(
                        "item {} records {} but sits at {position}",
                        item.id(),
                        item.position()
                    ));
                }
                if !seen.insert(item.id()) {
                    return violated(format!("item {} occupies more than one slot", item.id()));
                }
                if item.stack_size() == 0 || item.stack_size() > item.template().max_stack {
                    return violated(format!(
                        "item {} at {position} has stack size {} outside 1..={}",
                        item.id(),
                        item.stack_size(),
                        item.template().max_stack
                    ));
                }
                if category == ContainerType::Equipped {
                    if let Err(error) = self.check_equip_slot(item.template(), slot) {
                        return violated(format!("{position}: {error}"));
                    }
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structural primitives
    // ------------------------------------------------------------------

    pub(crate) fn ensure_usable(&self) -> InventoryResult<()> {
        if self.quarantined {
            return Err(InventoryError::Quarantined(self.owner));
        }
        Ok(())
    }

    fn check_position(&self, position: ItemPosition) -> InventoryResult<()> {
        self.container(position.container).check_slot(position.slot)
    }

    fn check_equip_slot(&self, template: &ItemTemplate, slot: u16) -> InventoryResult<()> {
        let slots = self
            .catalog
            .equip_slots(template)
            .ok_or(InventoryError::NotEquippable(template.id))?;
        if slots.iter().any(|legal| legal.index() == slot) {
            Ok(())
        } else {
            Err(InventoryError::IllegalEquipSlot {
                template_id: template.id,
                slot,
            })
        }
    }

    fn check_wearable(&self, from: ItemPosition, slot: EquipSlot) -> InventoryResult<()> {
        self.check_position(from)?;
        let item = self.get_item(from).ok_or(InventoryError::SlotEmpty(from))?;
        self.check_equip_slot(item.template(), slot.index())
    }

    pub(crate) fn check_swap(&self, a: ItemPosition, b: ItemPosition) -> InventoryResult<()> {
        self.check_position(a)?;
        self.check_position(b)?;
        if a == b {
            return Err(InventoryError::SameSlot(a));
        }
        for position in [a, b] {
            if self.get_item(position).is_none() {
                return Err(InventoryError::SlotEmpty(position));
            }
        }
        Ok(())
    }

    /// Where the item displaced by a swap into `to` ends up.
    fn displacement_target(
        &self,
        from: ItemPosition,
        to: ItemPosition,
    ) -> InventoryResult<ItemPosition> {
        if to.container != ContainerType::Equipped || from.container.is_armoury() {
            return Ok(from);
        }
        let displaced = self.get_item(to).ok_or(InventoryError::SlotEmpty(to))?;
        let use_category = displaced.template().use_category;
        let armoury = self
            .catalog
            .armoury_for(use_category)
            .ok_or(InventoryError::UnknownUseCategory(use_category))?;
        let slot = self
            .container(armoury)
            .first_available_slot()
            .ok_or(InventoryError::ContainerFull(armoury))?;
        Ok(ItemPosition::new(armoury, slot))
    }

    fn touch(&mut self, position: ItemPosition) {
        if position.container == ContainerType::Equipped
            && EquipSlot::from_index(position.slot).map_or(true, EquipSlot::affects_appearance)
        {
            self.appearance_dirty = true;
        }
    }

    /// Adds an item, enforcing equip legality for the equipped container.
    fn place(
        &mut self,
        item: Item,
        position: ItemPosition,
        placement: Placement,
    ) -> Result<(), Rejected> {
        if position.container == ContainerType::Equipped {
            if let Err(error) = self.check_equip_slot(item.template(), position.slot) {
                return Err(Rejected { error, item });
            }
        }
        self.container_mut(position.container)
            .add_item(item, position.slot, placement)?;
        self.touch(position);
        Ok(())
    }

    pub(crate) fn take(&mut self, position: ItemPosition) -> InventoryResult<Item> {
        let item = self
            .container_mut(position.container)
            .remove_item(position.slot)?;
        self.touch(position);
        Ok(item)
    }

    /// Moves one item, undoing the removal if the add fails.
    pub(crate) fn relocate(&mut self, from: ItemPosition, to: ItemPosition) -> InventoryResult<()> {
        self.check_position(from)?;
        self.check_position(to)?;
        if self.get_item(from).is_none() {
            return Err(InventoryError::SlotEmpty(from));
        }
        if self.get_item(to).is_some() {
            return Err(InventoryError::SlotOccupied(to));
        }

        let item = self.take(from)?;
        if let Err(Rejected { error, item }) = self.place(item, to, Placement::Relocated) {
            return Err(self.roll_back(error, vec![(item, from)], &[]));
        }
        tracing::debug!(owner = %self.owner, %from, %to, "item moved");
        Ok(())
    }

    /// Puts the item at `from` into `to` and the item at `to` into
    /// `displaced_to`.
    pub(crate) fn exchange(
        &mut self,
        from: ItemPosition,
        to: ItemPosition,
        displaced_to: ItemPosition,
    ) -> InventoryResult<()> {
        let incoming = self.take(from)?;
        let displaced = match self.take(to) {
            Ok(item) => item,
            Err(error) => return Err(self.roll_back(error, vec![(incoming, from)], &[])),
        };
        if let Err(Rejected { error, item }) = self.place(incoming, to, Placement::Relocated) {
            return Err(self.roll_back(error, vec![(item, from), (displaced, to)], &[]));
        }
        if let Err(Rejected { error, item }) =
            self.place(displaced, displaced_to, Placement::Relocated)
        {
            return Err(self.roll_back(error, vec![(item, to)], &[(to, from)]));
        }
        tracing::debug!(owner = %self.owner, %from, %to, %displaced_to, "items swapped");
        Ok(())
    }

    /// Returns items to their original positions.
    ///
    /// `detached` items are out of every container; `placed` items are
    /// lifted from their current position first. All lifts happen before
    /// any placement so originals are free again.
    pub(crate) fn restore(
        &mut self,
        mut detached: Vec<(Item, ItemPosition)>,
        placed: &[(ItemPosition, ItemPosition)],
    ) -> InventoryResult<()> {
        for &(current, original) in placed {
            let item = self.take(current)?;
            detached.push((item, original));
        }
        for (item, original) in detached {
            self.place(item, original, Placement::Relocated)
                .map_err(|rejected| rejected.error)?;
        }
        Ok(())
    }

    fn roll_back(
        &mut self,
        cause: InventoryError,
        detached: Vec<(Item, ItemPosition)>,
        placed: &[(ItemPosition, ItemPosition)],
    ) -> InventoryError {
        match self.restore(detached, placed) {
            Ok(()) => {
                tracing::warn!(owner = %self.owner, error = %cause, "rolled back");
                cause
            }
            Err(failure) => self.quarantine(cause, failure),
        }
    }

    pub(crate) fn quarantine(
        &mut self,
        cause: InventoryError,
        failure: InventoryError,
    ) -> InventoryError {
        self.quarantined = true;
        tracing::error!(
            owner = %self.owner,
            %cause,
            %failure,
            "rollback failed, inventory quarantined"
        );
        InventoryError::RollbackFailed {
            cause: Box::new(cause),
            failure: Box::new(failure),
        }
    }

    /// Finishes a top-level operation: broadcasts appearance on success,
    /// forgets pending appearance changes on failure.
    pub(crate) fn complete<T>(
        &mut self,
        operation: &'static str,
        result: InventoryResult<T>,
        ctx: &dyn WorldContext,
    ) -> InventoryResult<T> {
        let changed = std::mem::take(&mut self.appearance_dirty);
        match &result {
            Ok(_) => {
                if changed && ctx.is_in_world() {
                    ctx.send_to_visible(SessionEvent::AppearanceChanged(self.appearance()));
                }
            }
            Err(error) if error.kind() == ErrorKind::Consistency => {
                tracing::error!(owner = %self.owner, operation, %error, "inventory operation failed");
            }
            Err(error) => {
                tracing::warn!(owner = %self.owner, operation, %error, "inventory operation rejected");
            }
        }
        result
    }
}
