//! Benchmark for item placement.
//!
//! Run with: cargo bench --package satchel_inventory --bench placement_benchmark

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use satchel_inventory::{Catalog, Inventory, ItemTemplate, Offline, SequentialItemIds};
use satchel_shared::{ContainerType, EquipSlot, ItemPosition, OwnerId, TemplateId};
use std::sync::Arc;

const SHARD: TemplateId = TemplateId(1);
const SWORD: TemplateId = TemplateId(2);
const AXE: TemplateId = TemplateId(3);

fn create_catalog() -> Arc<Catalog> {
    let catalog = ContainerType::ALL
        .iter()
        .fold(Catalog::builder(), |b, &c| {
            let slots = if c == ContainerType::Equipped { 14 } else { 35 };
            b.capacity(c, slots)
        })
        .equip_slot_category(1, &[EquipSlot::MainHand])
        .armoury(1, ContainerType::ArmouryMainHand)
        .template(ItemTemplate::new(SHARD, 999))
        .template(ItemTemplate::new(SWORD, 1).with_equip(1, 1).with_models(101, 0))
        .template(ItemTemplate::new(AXE, 1).with_equip(1, 1).with_models(102, 0))
        .build()
        .unwrap();
    Arc::new(catalog)
}

fn benchmark_stack_merge(c: &mut Criterion) {
    let catalog = create_catalog();
    let ids = Arc::new(SequentialItemIds::default());

    c.bench_function("new_item_scan_100_stacks", |b| {
        b.iter_batched(
            || {
                let mut inv = Inventory::new(OwnerId(1), Arc::clone(&catalog), ids.clone());
                // 99 full stacks and one with room for exactly 100 more.
                inv.new_item(SHARD, 999 * 100 - 100, &Offline).unwrap();
                inv
            },
            |mut inv| black_box(inv.new_item(SHARD, 100, &Offline).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_fill_bags(c: &mut Criterion) {
    let catalog = create_catalog();
    let ids = Arc::new(SequentialItemIds::default());

    c.bench_function("new_item_fill_140_slots", |b| {
        b.iter_batched(
            || Inventory::new(OwnerId(1), Arc::clone(&catalog), ids.clone()),
            |mut inv| black_box(inv.new_item(SWORD, 140, &Offline).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_swap_redirect(c: &mut Criterion) {
    let catalog = create_catalog();
    let ids = Arc::new(SequentialItemIds::default());
    let bag = ItemPosition::new(ContainerType::Inventory0, 0);
    let main_hand = ItemPosition::new(ContainerType::Equipped, EquipSlot::MainHand.index());

    c.bench_function("swap_into_equipped_with_redirect", |b| {
        b.iter_batched(
            || {
                let mut inv = Inventory::new(OwnerId(1), Arc::clone(&catalog), ids.clone());
                inv.equip_new_item(SWORD, &Offline).unwrap();
                inv.new_item(AXE, 1, &Offline).unwrap();
                inv
            },
            |mut inv| black_box(inv.swap_items(bag, main_hand, &Offline)),
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_snapshot(c: &mut Criterion) {
    let catalog = create_catalog();
    let mut inv = Inventory::new(
        OwnerId(1),
        catalog,
        Arc::new(SequentialItemIds::default()),
    );
    inv.new_item(SWORD, 140, &Offline).unwrap();

    c.bench_function("snapshot_140_items", |b| {
        b.iter(|| black_box(inv.snapshot()));
    });
}

criterion_group!(
    benches,
    benchmark_stack_merge,
    benchmark_fill_bags,
    benchmark_swap_redirect,
    benchmark_snapshot
);
criterion_main!(benches);
