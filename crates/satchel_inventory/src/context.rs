//! # World Context
//!
//! The inventory's view of the world around its owner: whether the player
//! is currently in the world, and where notifications go.

use parking_lot::Mutex;
use satchel_shared::SessionEvent;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outbound side of an inventory.
///
/// Implementations must not block; notifications are fire-and-forget.
pub trait WorldContext {
    /// Returns true once the owner has entered the world.
    fn is_in_world(&self) -> bool;

    /// Sends a notification to the owner's own session.
    fn send(&self, event: SessionEvent);

    /// Broadcasts a notification to every player who can see the owner.
    fn send_to_visible(&self, event: SessionEvent);
}

/// Context for a player that is not connected. Drops every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct Offline;

impl WorldContext for Offline {
    fn is_in_world(&self) -> bool {
        false
    }

    fn send(&self, _event: SessionEvent) {}

    fn send_to_visible(&self, _event: SessionEvent) {}
}

/// Context that keeps every notification in memory.
///
/// Used by tests and tools that want to inspect what an inventory emitted.
#[derive(Debug, Default)]
pub struct RecordingContext {
    in_world: AtomicBool,
    direct: Mutex<Vec<SessionEvent>>,
    visible: Mutex<Vec<SessionEvent>>,
}

impl RecordingContext {
    /// Creates a recorder for a player inside the world.
    #[must_use]
    pub fn in_world() -> Self {
        let ctx = Self::default();
        ctx.set_in_world(true);
        ctx
    }

    /// Flips the in-world flag.
    pub fn set_in_world(&self, in_world: bool) {
        self.in_world.store(in_world, Ordering::Release);
    }

    /// Drains notifications sent to the owner.
    pub fn take_direct(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.direct.lock())
    }

    /// Drains notifications broadcast to observers.
    pub fn take_visible(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.visible.lock())
    }
}

impl WorldContext for RecordingContext {
    fn is_in_world(&self) -> bool {
        self.in_world.load(Ordering::Acquire)
    }

    fn send(&self, event: SessionEvent) {
        self.direct.lock().push(event);
    }

    fn send_to_visible(&self, event: SessionEvent) {
        self.visible.lock().push(event);
    }
}
