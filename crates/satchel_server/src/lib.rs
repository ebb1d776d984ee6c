//! # Satchel Server
//!
//! Session layer around the placement engine.
//!
//! ## Design Principles
//!
//! 1. **One writer per player** - Only the session pump mutates an inventory
//! 2. **Ordered continuations** - Store round trips resume in issue order
//! 3. **Fire-and-forget output** - A slow or vanished client never blocks a session
//!
//! ## Thread Safety
//!
//! [`SessionRegistry`] hands out one [`parking_lot::Mutex`] per player.
//! Store futures run on tokio worker threads; their continuations come back
//! through a crossbeam channel and run under the session lock.
//!
//! ## Example
//!
//! ```rust,ignore
//! use satchel_server::{InventoryCommand, PlayerSession, SessionRegistry};
//!
//! let registry = SessionRegistry::new();
//! let handle = registry.insert(PlayerSession::new(inventory, outbound, runtime.handle().clone(), 64))?;
//!
//! let mut session = handle.lock();
//! session.enter_world(store.load(owner))?;
//! session.submit(InventoryCommand::NewItem { template_id, count: 20 });
//! session.pump();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod config;
pub mod error;
pub mod registry;
pub mod session;
pub mod telemetry;

pub use command::{CommandOutcome, InventoryCommand};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{Outbound, PlayerSession, PumpStats, SessionContext};
