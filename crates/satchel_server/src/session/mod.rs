//! # Player Sessions
//!
//! A [`PlayerSession`] is the single writer of one player's inventory.
//! Work reaches it two ways:
//!
//! - **Commands** are queued with [`PlayerSession::submit`] and run on the
//!   next [`PlayerSession::pump`].
//! - **Continuations** follow a store round trip started with
//!   [`PlayerSession::dispatch`]. The future runs on tokio; the continuation
//!   runs on the session, after all queued commands, and in the order the
//!   dispatches were issued no matter which future finishes first.
//!
//! Nothing else touches the inventory, so operations on one player never
//! interleave.

mod context;
mod continuation;

pub use context::{Outbound, SessionContext};

use crate::command::{CommandOutcome, InventoryCommand};
use crate::error::{ServerError, ServerResult};
use continuation::{ContinuationQueue, Released};
use crossbeam_channel::Sender;
use satchel_inventory::{Inventory, InventoryResult, WorldContext};
use satchel_shared::{OwnerId, SessionEvent};
use std::collections::VecDeque;
use std::future::Future;
use std::ops::AddAssign;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

/// Work done by one pump.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Queued commands executed (including rejected ones).
    pub commands: usize,
    /// Continuations executed.
    pub continuations: usize,
    /// Dispatches whose future was dropped before resolving.
    pub abandoned: usize,
}

impl AddAssign for PumpStats {
    fn add_assign(&mut self, rhs: Self) {
        self.commands += rhs.commands;
        self.continuations += rhs.continuations;
        self.abandoned += rhs.abandoned;
    }
}

/// One connected player.
#[derive(Debug)]
pub struct PlayerSession {
    inventory: Inventory,
    context: SessionContext,
    commands: VecDeque<InventoryCommand>,
    continuations: ContinuationQueue,
    max_pending: usize,
}

impl PlayerSession {
    /// Creates a session around an inventory.
    ///
    /// The player starts outside the world; see [`PlayerSession::enter_world`].
    #[must_use]
    pub fn new(
        inventory: Inventory,
        outbound: Sender<Outbound>,
        runtime: Handle,
        max_pending: usize,
    ) -> Self {
        let owner = inventory.owner();
        Self {
            inventory,
            context: SessionContext::new(owner, outbound),
            commands: VecDeque::new(),
            continuations: ContinuationQueue::new(runtime),
            max_pending: max_pending.max(1),
        }
    }

    /// Player this session belongs to.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.inventory.owner()
    }

    /// Read access to the inventory.
    #[inline]
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Returns true once the player has entered the world.
    #[must_use]
    pub fn is_in_world(&self) -> bool {
        self.context.is_in_world()
    }

    /// Commands waiting for the next pump.
    #[must_use]
    pub fn queued_commands(&self) -> usize {
        self.commands.len()
    }

    /// Dispatches whose continuation has not run yet.
    #[must_use]
    pub fn pending_continuations(&self) -> usize {
        self.continuations.pending()
    }

    /// Runs a command immediately.
    ///
    /// Only call this from inside a continuation or when no other work is
    /// queued; queued commands would otherwise run after it.
    ///
    /// # Errors
    ///
    /// Returns the inventory error of a rejected command.
    pub fn execute(&mut self, command: InventoryCommand) -> InventoryResult<CommandOutcome> {
        let result = command.apply(&mut self.inventory, &self.context);
        match &result {
            Ok(outcome) => {
                tracing::trace!(owner = %self.owner(), command = command.name(), ?outcome, "command applied");
            }
            Err(error) => {
                tracing::debug!(owner = %self.owner(), command = command.name(), %error, "command failed");
            }
        }
        result
    }

    /// Queues a command for the next pump.
    pub fn submit(&mut self, command: InventoryCommand) {
        self.commands.push_back(command);
    }

    /// Starts a store round trip.
    ///
    /// `future` runs on the tokio runtime. When it resolves, `continuation`
    /// is queued with its output and runs during a later pump, after every
    /// continuation dispatched before it.
    ///
    /// Returns the dispatch sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Backpressure`] when too many round trips are
    /// already outstanding. Nothing is started in that case.
    pub fn dispatch<F, C>(&mut self, future: F, continuation: C) -> ServerResult<u64>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
        C: FnOnce(&mut Self, F::Output) + Send + 'static,
    {
        let pending = self.continuations.pending();
        if pending >= self.max_pending {
            return Err(ServerError::Backpressure {
                owner: self.owner(),
                pending,
            });
        }
        let sequence = self.continuations.spawn(future, continuation);
        tracing::trace!(owner = %self.owner(), sequence, "store request dispatched");
        Ok(sequence)
    }

    /// Loads the player into the world.
    ///
    /// Once `store` resolves successfully the player is marked present, the
    /// full inventory is pushed to them and their appearance is broadcast.
    ///
    /// # Errors
    ///
    /// Same as [`PlayerSession::dispatch`].
    pub fn enter_world<F>(&mut self, store: F) -> ServerResult<u64>
    where
        F: Future<Output = ServerResult<()>> + Send + 'static,
    {
        self.dispatch(store, |session, loaded| match loaded {
            Ok(()) => {
                session.context.set_in_world(true);
                session.inventory.send(&session.context);
                session.broadcast_appearance();
                tracing::info!(owner = %session.owner(), "player entered world");
            }
            Err(error) => {
                tracing::warn!(owner = %session.owner(), %error, "world entry failed");
            }
        })
    }

    /// Marks the player absent. Later operations stop notifying.
    pub fn leave_world(&mut self) {
        self.context.set_in_world(false);
        tracing::info!(owner = %self.owner(), "player left world");
    }

    /// Sends the current appearance to everyone who can see the player.
    pub fn broadcast_appearance(&self) {
        if self.context.is_in_world() {
            self.context
                .send_to_visible(SessionEvent::AppearanceChanged(self.inventory.appearance()));
        }
    }

    /// Runs queued commands, then every continuation that is ready in
    /// sequence order.
    ///
    /// Commands submitted by a continuation run before the next
    /// continuation.
    pub fn pump(&mut self) -> PumpStats {
        let mut stats = PumpStats {
            commands: self.run_commands(),
            ..PumpStats::default()
        };
        self.continuations.collect();
        while let Some(released) = self.continuations.release() {
            match released {
                Released::Ready(continuation) => {
                    continuation(self);
                    stats.continuations += 1;
                }
                Released::Abandoned(sequence) => {
                    tracing::warn!(owner = %self.owner(), sequence, "store request abandoned");
                    stats.abandoned += 1;
                }
            }
            stats.commands += self.run_commands();
            self.continuations.collect();
        }
        stats
    }

    /// Pumps until every outstanding continuation has run.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Timeout`] if some are still outstanding after
    /// `timeout`. Work finished before the deadline has been applied.
    pub fn drain(&mut self, timeout: Duration) -> ServerResult<PumpStats> {
        let deadline = Instant::now() + timeout;
        let mut stats = self.pump();
        while self.continuations.pending() > 0 {
            if !self.continuations.wait_until(deadline) {
                return Err(ServerError::Timeout {
                    owner: self.owner(),
                    pending: self.continuations.pending(),
                });
            }
            stats += self.pump();
        }
        Ok(stats)
    }

    fn run_commands(&mut self) -> usize {
        let mut ran = 0;
        while let Some(command) = self.commands.pop_front() {
            // Rejections are already logged; a queued command has no caller
            // to report to.
            let _ = self.execute(command);
            ran += 1;
        }
        ran
    }
}
