//! # Satchel Server
//!
//! Loads the catalog, brings a set of players into the world through a
//! simulated character store, and drives their inventories through the
//! session pump.
//!
//! ## Usage
//!
//! ```bash
//! satchel_server --config satchel.toml --players 4 --store-latency-ms 15
//! ```

use satchel_inventory::{Catalog, Inventory, Offline, SequentialItemIds, Sex};
use satchel_server::{
    telemetry, InventoryCommand, Outbound, PlayerSession, ServerConfig, ServerError, ServerResult,
    SessionRegistry,
};
use satchel_shared::{ContainerType, EquipSlot, ItemPosition, OwnerId, SessionEvent, TemplateId};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CONFIG: &str = "satchel.toml";
const POTION: TemplateId = TemplateId(4551);
const SHIELD: TemplateId = TemplateId(2101);
const RING: TemplateId = TemplateId(4001);

struct Args {
    config: Option<PathBuf>,
    players: u64,
    store_latency: Duration,
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        config: None,
        players: 4,
        store_latency: Duration::from_millis(15),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--players" | "-p" => {
                if i + 1 < args.len() {
                    parsed.players = args[i + 1].parse().unwrap_or(4);
                    i += 1;
                }
            }
            "--store-latency-ms" | "-l" => {
                if i + 1 < args.len() {
                    parsed.store_latency =
                        Duration::from_millis(args[i + 1].parse().unwrap_or(15));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: satchel_server [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>            Server config (default: {DEFAULT_CONFIG} if present)");
                println!("  -p, --players <NUM>            Players to bring online (default: 4)");
                println!("  -l, --store-latency-ms <MS>    Simulated store latency (default: 15)");
                println!("  -h, --help                     Show this help");
                return None;
            }
            _ => {}
        }
        i += 1;
    }
    Some(parsed)
}

fn load_config(path: Option<&Path>) -> ServerResult<ServerConfig> {
    match path {
        Some(path) => ServerConfig::load(path),
        None if Path::new(DEFAULT_CONFIG).exists() => ServerConfig::load(DEFAULT_CONFIG),
        None => Ok(ServerConfig::default()),
    }
}

fn main() -> ExitCode {
    let Some(args) = parse_args() else {
        return ExitCode::SUCCESS;
    };
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("satchel_server: {error}");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init(&config.log_filter);

    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "server stopped");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &ServerConfig, args: &Args) -> ServerResult<()> {
    let catalog = Arc::new(Catalog::load(&config.catalog_path)?);
    let ids = Arc::new(SequentialItemIds::starting_at(config.first_item_id));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name("satchel-store")
        .enable_time()
        .build()
        .map_err(ServerError::Runtime)?;

    tracing::info!(
        catalog = %config.catalog_path.display(),
        templates = catalog.template_count(),
        players = args.players,
        "satchel server starting"
    );

    let registry = SessionRegistry::new();
    let (outbound_tx, outbound_rx) = crossbeam_channel::bounded(config.outbound_queue);

    for n in 1..=args.players {
        let owner = OwnerId(n);
        let sex = if n % 2 == 0 { Sex::Female } else { Sex::Male };
        let class_job = if n % 3 == 0 { 5 } else { 1 };
        let inventory = Inventory::with_starting_gear(
            owner,
            Arc::clone(&catalog),
            ids.clone(),
            1,
            sex,
            class_job,
            &Offline,
        )?;
        let handle = registry.insert(PlayerSession::new(
            inventory,
            outbound_tx.clone(),
            runtime.handle().clone(),
            config.max_pending_continuations,
        ))?;

        let latency = args.store_latency;
        let mut session = handle.lock();
        session.enter_world(async move {
            tokio::time::sleep(latency).await;
            Ok(())
        })?;
        // Loot arrives while the character row is still loading.
        session.submit(InventoryCommand::NewItem {
            template_id: POTION,
            count: 120,
        });
        session.submit(InventoryCommand::NewItem {
            template_id: SHIELD,
            count: 1,
        });
        session.submit(InventoryCommand::NewItem {
            template_id: RING,
            count: 1,
        });
    }
    drop(outbound_tx);

    let timeout = args.store_latency * 4 + Duration::from_secs(1);
    for owner in registry.owners() {
        registry.with_session(owner, |session| -> ServerResult<()> {
            session.drain(timeout)?;
            let bag = |slot| ItemPosition::new(ContainerType::Inventory0, slot);
            // Potions fill slots 0 and 1; shield and ring follow.
            session.execute(InventoryCommand::NewItem {
                template_id: POTION,
                count: 5,
            })?;
            session.execute(InventoryCommand::EquipItem {
                from: bag(2),
                slot: EquipSlot::OffHand,
            })?;
            session.execute(InventoryCommand::EquipItem {
                from: bag(3),
                slot: EquipSlot::RightRing,
            })?;
            session.execute(InventoryCommand::DiscardItem { position: bag(1) })?;
            let inventory = session.inventory();
            inventory.check_invariants()?;
            tracing::info!(
                %owner,
                potions = inventory.count_template(POTION),
                appearance = ?inventory.appearance(),
                "session settled"
            );
            Ok(())
        })??;
    }

    let (mut direct, mut visible, mut created) = (0usize, 0usize, 0u32);
    for message in outbound_rx.try_iter() {
        match &message {
            Outbound::Direct { event, .. } => {
                direct += 1;
                if let SessionEvent::ItemsCreated { count, .. } = event {
                    created += count;
                }
            }
            Outbound::Visible { .. } => visible += 1,
        }
    }
    tracing::info!(
        sessions = registry.len(),
        direct,
        visible,
        created,
        "outbound traffic"
    );
    Ok(())
}
