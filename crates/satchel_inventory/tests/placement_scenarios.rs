//! Integration tests for player-facing placement operations.

use satchel_inventory::{
    Catalog, ErrorKind, Inventory, InventoryError, Offline, RecordingContext, SequentialItemIds,
    Sex,
};
use satchel_shared::{ContainerType, EquipSlot, ItemPosition, OwnerId, SessionEvent, TemplateId};
use std::sync::Arc;

const POTION: TemplateId = TemplateId(4551);
const FIRE_SHARD: TemplateId = TemplateId(5111);
const SHORTSWORD: TemplateId = TemplateId(1601);
const SHORTBOW: TemplateId = TemplateId(1602);
const HEMPEN_DOUBLET: TemplateId = TemplateId(3101);
const HEMPEN_CAMISE: TemplateId = TemplateId(3102);
const LEATHER_BELT: TemplateId = TemplateId(3301);
const COPPER_RING: TemplateId = TemplateId(4001);
const BRASS_RING: TemplateId = TemplateId(4002);

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::from_toml_str(include_str!("fixtures/catalog.toml")).unwrap())
}

fn inventory() -> Inventory {
    Inventory::new(OwnerId(1), catalog(), Arc::new(SequentialItemIds::default()))
}

fn bag(slot: u16) -> ItemPosition {
    ItemPosition::new(ContainerType::Inventory0, slot)
}

fn equipped(slot: EquipSlot) -> ItemPosition {
    ItemPosition::new(ContainerType::Equipped, slot.index())
}

#[test]
fn test_new_item_tops_up_existing_stack() {
    let mut inv = inventory();
    inv.new_item(POTION, 3, &Offline).unwrap();
    let ctx = RecordingContext::in_world();

    let placed = inv.new_item(POTION, 5, &ctx).unwrap();

    assert_eq!(placed, 5);
    assert_eq!(inv.get_item(bag(0)).unwrap().stack_size(), 8);
    assert!(inv.get_item(bag(1)).is_none());
    assert_eq!(
        ctx.take_direct(),
        vec![SessionEvent::ItemsCreated {
            template_id: POTION,
            count: 5
        }]
    );
}

#[test]
fn test_new_item_tops_up_every_stack_before_new_slots() {
    let mut inv = inventory();
    let parked = ItemPosition::new(ContainerType::Inventory1, 0);
    inv.new_item(POTION, 4, &Offline).unwrap();
    inv.move_item(bag(0), parked, &Offline).unwrap();
    inv.new_item(POTION, 4, &Offline).unwrap();
    inv.move_item(parked, bag(3), &Offline).unwrap();

    // Stacks of 4 in slot 0 and slot 3; slots 1 and 2 free.
    inv.new_item(POTION, 15, &Offline).unwrap();

    assert_eq!(inv.get_item(bag(0)).unwrap().stack_size(), 10);
    assert_eq!(inv.get_item(bag(3)).unwrap().stack_size(), 10);
    assert_eq!(inv.get_item(bag(1)).unwrap().stack_size(), 3);
    assert!(inv.get_item(bag(2)).is_none());
    assert_eq!(inv.count_template(POTION), 23);
}

#[test]
fn test_new_item_fills_earlier_bag_before_later_stacks() {
    let mut inv = inventory();
    let parked = ItemPosition::new(ContainerType::Inventory1, 0);
    inv.new_item(POTION, 4, &Offline).unwrap();
    inv.move_item(bag(0), parked, &Offline).unwrap();

    inv.new_item(POTION, 2, &Offline).unwrap();

    assert_eq!(inv.get_item(bag(0)).unwrap().stack_size(), 2);
    assert_eq!(inv.get_item(parked).unwrap().stack_size(), 4);
}

#[test]
fn test_new_item_spills_into_next_bag() {
    let mut inv = inventory();
    let placed = inv.new_item(FIRE_SHARD, 999 * 7, &Offline).unwrap();

    assert_eq!(placed, 999 * 7);
    assert!(inv.container(ContainerType::Inventory0).is_full());
    assert_eq!(inv.container(ContainerType::Inventory1).count(), 1);
    inv.check_invariants().unwrap();
}

#[test]
fn test_new_item_drops_what_does_not_fit() {
    let mut inv = inventory();
    let ctx = RecordingContext::in_world();
    let placed = inv.new_item(POTION, 250, &ctx).unwrap();

    assert_eq!(placed, 240);
    assert_eq!(inv.count_template(POTION), 240);
    assert_eq!(
        ctx.take_direct(),
        vec![SessionEvent::ItemsCreated {
            template_id: POTION,
            count: 240
        }]
    );

    // Completely full bags still succeed, placing nothing.
    assert_eq!(inv.new_item(POTION, 1, &Offline), Ok(0));
}

#[test]
fn test_move_from_empty_slot_fails() {
    let mut inv = inventory();
    inv.new_item(POTION, 30, &Offline).unwrap();
    let before = inv.snapshot();

    let err = inv.move_item(bag(4), bag(4), &Offline).unwrap_err();

    assert_eq!(err, InventoryError::SlotEmpty(bag(4)));
    assert_eq!(err.kind(), ErrorKind::Position);
    assert_eq!(inv.snapshot(), before);
}

#[test]
fn test_move_onto_occupied_slot_fails() {
    let mut inv = inventory();
    inv.new_item(POTION, 20, &Offline).unwrap();
    let before = inv.snapshot();

    let err = inv.move_item(bag(0), bag(1), &Offline).unwrap_err();

    assert_eq!(err, InventoryError::SlotOccupied(bag(1)));
    assert_eq!(inv.snapshot(), before);
}

#[test]
fn test_move_between_bags() {
    let mut inv = inventory();
    inv.new_item(POTION, 3, &Offline).unwrap();
    let id = inv.get_item(bag(0)).unwrap().id();
    let target = ItemPosition::new(ContainerType::Inventory2, 5);

    inv.move_item(bag(0), target, &Offline).unwrap();

    assert_eq!(inv.position_of(id), Ok(target));
    assert!(inv.get_item(bag(0)).is_none());
    inv.check_invariants().unwrap();
}

#[test]
fn test_swap_ring_into_equipped_sends_old_ring_to_armoury() {
    let mut inv = inventory();
    inv.new_item(COPPER_RING, 1, &Offline).unwrap();
    inv.equip_item(bag(0), EquipSlot::LeftRing, &Offline).unwrap();
    inv.new_item(BRASS_RING, 1, &Offline).unwrap();

    inv.swap_items(bag(0), equipped(EquipSlot::LeftRing), &Offline)
        .unwrap();

    let left = inv.get_item(equipped(EquipSlot::LeftRing)).unwrap();
    assert_eq!(left.template_id(), BRASS_RING);
    assert!(inv.get_item(bag(0)).is_none());
    let chest = ItemPosition::new(ContainerType::ArmouryRings, 0);
    assert_eq!(inv.get_item(chest).unwrap().template_id(), COPPER_RING);
    inv.check_invariants().unwrap();
}

#[test]
fn test_swap_between_bags_exchanges_positions() {
    let mut inv = inventory();
    inv.new_item(POTION, 1, &Offline).unwrap();
    inv.new_item(FIRE_SHARD, 1, &Offline).unwrap();
    let elsewhere = ItemPosition::new(ContainerType::Inventory3, 2);
    inv.move_item(bag(1), elsewhere, &Offline).unwrap();

    inv.swap_items(bag(0), elsewhere, &Offline).unwrap();

    assert_eq!(inv.get_item(bag(0)).unwrap().template_id(), FIRE_SHARD);
    assert_eq!(inv.get_item(elsewhere).unwrap().template_id(), POTION);
}

#[test]
fn test_swap_with_empty_slot_fails() {
    let mut inv = inventory();
    inv.new_item(POTION, 1, &Offline).unwrap();
    let before = inv.snapshot();

    assert_eq!(
        inv.swap_items(bag(0), bag(1), &Offline),
        Err(InventoryError::SlotEmpty(bag(1)))
    );
    assert_eq!(inv.snapshot(), before);
}

#[test]
fn test_swap_into_full_armoury_is_refused_up_front() {
    let mut inv = inventory();
    inv.equip_new_item(SHORTSWORD, &Offline).unwrap();
    for slot in 0..2 {
        inv.new_item(SHORTSWORD, 1, &Offline).unwrap();
        let chest = ItemPosition::new(ContainerType::ArmouryMainHand, slot);
        inv.move_item(bag(0), chest, &Offline).unwrap();
    }
    inv.new_item(SHORTBOW, 1, &Offline).unwrap();
    let ctx = RecordingContext::in_world();
    let before = inv.snapshot();

    let err = inv
        .swap_items(bag(0), equipped(EquipSlot::MainHand), &ctx)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Capacity);
    assert_eq!(inv.snapshot(), before);
    assert!(ctx.take_visible().is_empty());
}

#[test]
fn test_equip_new_item_with_both_rings_taken_is_noop() {
    let mut inv = inventory();
    inv.equip_new_item(COPPER_RING, &Offline).unwrap();
    inv.equip_new_item(COPPER_RING, &Offline).unwrap();
    let before = inv.snapshot();

    let result = inv.equip_new_item(BRASS_RING, &Offline);

    assert_eq!(result, Ok(None));
    assert_eq!(inv.snapshot(), before);
    assert_eq!(inv.count_template(BRASS_RING), 0);
}

#[test]
fn test_equip_new_item_unknown_template() {
    let mut inv = inventory();
    assert_eq!(
        inv.equip_new_item(TemplateId(1), &Offline),
        Err(InventoryError::UnknownTemplate(TemplateId(1)))
    );
}

#[test]
fn test_discard_empty_slot_fails() {
    let mut inv = inventory();
    inv.new_item(POTION, 60, &Offline).unwrap();
    inv.discard_item(bag(5), &Offline).unwrap();
    let before = inv.snapshot();

    let err = inv.discard_item(bag(5), &Offline).unwrap_err();

    assert_eq!(err, InventoryError::SlotEmpty(bag(5)));
    assert_eq!(err.kind(), ErrorKind::Position);
    assert_eq!(inv.snapshot(), before);
}

#[test]
fn test_discard_returns_the_item() {
    let mut inv = inventory();
    inv.new_item(POTION, 7, &Offline).unwrap();
    let id = inv.get_item(bag(0)).unwrap().id();

    let item = inv.discard_item(bag(0), &Offline).unwrap();

    assert_eq!(item.id(), id);
    assert_eq!(item.stack_size(), 7);
    assert!(inv.find_item(id).is_none());
    assert_eq!(inv.position_of(id), Err(InventoryError::ItemNotFound(id)));
}

#[test]
fn test_starting_gear_by_sex() {
    let catalog = catalog();
    let ids = Arc::new(SequentialItemIds::default());

    let male =
        Inventory::with_starting_gear(OwnerId(1), Arc::clone(&catalog), ids.clone(), 1, Sex::Male, 1, &Offline)
            .unwrap();
    let female =
        Inventory::with_starting_gear(OwnerId(2), catalog, ids, 1, Sex::Female, 5, &Offline)
            .unwrap();

    let body = equipped(EquipSlot::Body);
    assert_eq!(male.get_item(body).unwrap().template_id(), HEMPEN_DOUBLET);
    assert_eq!(female.get_item(body).unwrap().template_id(), HEMPEN_CAMISE);
    let main_hand = equipped(EquipSlot::MainHand);
    assert_eq!(male.get_item(main_hand).unwrap().template_id(), SHORTSWORD);
    assert_eq!(female.get_item(main_hand).unwrap().template_id(), SHORTBOW);
    assert_eq!(male.container(ContainerType::Equipped).count(), 5);
    male.check_invariants().unwrap();
}

#[test]
fn test_starting_gear_unknown_ids() {
    let catalog = catalog();
    let ids = Arc::new(SequentialItemIds::default());

    let err = Inventory::with_starting_gear(OwnerId(1), Arc::clone(&catalog), ids.clone(), 1, Sex::Male, 99, &Offline)
        .unwrap_err();
    assert_eq!(err, InventoryError::UnknownClassJob(99));

    let err = Inventory::with_starting_gear(OwnerId(1), catalog, ids, 42, Sex::Male, 1, &Offline)
        .unwrap_err();
    assert_eq!(err, InventoryError::UnknownRace(42));
}

#[test]
fn test_bow_appearance_uses_quiver_until_off_hand_is_worn() {
    let catalog = catalog();
    let mut inv = Inventory::with_starting_gear(
        OwnerId(1),
        catalog,
        Arc::new(SequentialItemIds::default()),
        1,
        Sex::Male,
        5,
        &Offline,
    )
    .unwrap();

    let (main_hand, off_hand) = inv.weapon_display_ids();
    assert_eq!(main_hand, 4_295_294_977);
    assert_eq!(off_hand, 4_295_295_233);

    // Body, hands, legs and feet are visible; the head is bare.
    let visible = inv.visible_display_ids();
    assert_eq!(visible[0], 0);
    assert_eq!(&visible[1..5], &[65538, 65540, 65542, 65543]);

    inv.equip_new_item(TemplateId(2101), &Offline).unwrap();
    assert_eq!(inv.weapon_display_ids().1, 4_295_098_369);
}

#[test]
fn test_belt_never_reaches_observers() {
    let mut inv = inventory();
    let ctx = RecordingContext::in_world();

    inv.equip_new_item(LEATHER_BELT, &ctx).unwrap();
    inv.discard_item(equipped(EquipSlot::Waist), &ctx).unwrap();

    assert!(ctx.take_visible().is_empty());
}

#[test]
fn test_send_pushes_every_container() {
    let mut inv = inventory();
    inv.new_item(POTION, 25, &Offline).unwrap();
    inv.equip_new_item(SHORTSWORD, &Offline).unwrap();
    let ctx = RecordingContext::default();

    inv.send(&ctx);

    let events = ctx.take_direct();
    let mut headers = 0u32;
    let mut open_index = 0u32;
    for event in &events {
        match event {
            SessionEvent::ItemSetup {
                container_index, ..
            } => assert_eq!(*container_index, open_index),
            SessionEvent::ContainerSetup { index, .. } => {
                assert_eq!(*index, headers);
                headers += 1;
                open_index = headers;
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(headers as usize, ContainerType::ALL.len());
    let items = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::ItemSetup { .. }))
        .count();
    assert_eq!(items, 4);
}
