//! Outbound side of a player session.

use crossbeam_channel::{Sender, TrySendError};
use satchel_inventory::WorldContext;
use satchel_shared::{OwnerId, SessionEvent};

/// A notification leaving a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    /// Only the owner receives it.
    Direct {
        /// Session that produced it.
        owner: OwnerId,
        /// Payload.
        event: SessionEvent,
    },
    /// Everyone who can see the owner receives it.
    Visible {
        /// Session that produced it.
        owner: OwnerId,
        /// Payload.
        event: SessionEvent,
    },
}

impl Outbound {
    /// Session that produced the message.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        match self {
            Self::Direct { owner, .. } | Self::Visible { owner, .. } => *owner,
        }
    }

    /// Message payload.
    #[must_use]
    pub const fn event(&self) -> &SessionEvent {
        match self {
            Self::Direct { event, .. } | Self::Visible { event, .. } => event,
        }
    }
}

/// [`WorldContext`] backed by a bounded crossbeam channel.
///
/// Never blocks: when the queue is full or the receiver is gone the
/// notification is dropped and the inventory carries on.
#[derive(Debug)]
pub struct SessionContext {
    owner: OwnerId,
    in_world: bool,
    outbound: Sender<Outbound>,
}

impl SessionContext {
    /// Creates a context for a player who has not entered the world yet.
    #[must_use]
    pub fn new(owner: OwnerId, outbound: Sender<Outbound>) -> Self {
        Self {
            owner,
            in_world: false,
            outbound,
        }
    }

    pub(crate) fn set_in_world(&mut self, in_world: bool) {
        self.in_world = in_world;
    }

    fn push(&self, message: Outbound) {
        match self.outbound.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                tracing::warn!(owner = %self.owner, event = ?message.event(), "outbound queue full, dropping");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!(owner = %self.owner, "client gone, dropping notification");
            }
        }
    }
}

impl WorldContext for SessionContext {
    fn is_in_world(&self) -> bool {
        self.in_world
    }

    fn send(&self, event: SessionEvent) {
        self.push(Outbound::Direct {
            owner: self.owner,
            event,
        });
    }

    fn send_to_visible(&self, event: SessionEvent) {
        self.push(Outbound::Visible {
            owner: self.owner,
            event,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_shared::{Appearance, TemplateId};

    #[test]
    fn test_routes_by_audience() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let ctx = SessionContext::new(OwnerId(1), tx);
        ctx.send(SessionEvent::ItemsCreated {
            template_id: TemplateId(4551),
            count: 3,
        });
        ctx.send_to_visible(SessionEvent::AppearanceChanged(Appearance::default()));

        assert!(matches!(rx.try_recv(), Ok(Outbound::Direct { owner: OwnerId(1), .. })));
        let visible = rx.try_recv().unwrap();
        assert!(matches!(visible, Outbound::Visible { .. }));
        assert_eq!(visible.owner(), OwnerId(1));
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let ctx = SessionContext::new(OwnerId(1), tx);
        for count in 1..=3 {
            ctx.send(SessionEvent::ItemsCreated {
                template_id: TemplateId(4551),
                count,
            });
        }
        let first = rx.try_recv().unwrap();
        assert!(matches!(first.event(), SessionEvent::ItemsCreated { count: 1, .. }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_receiver_is_ignored() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        drop(rx);
        let ctx = SessionContext::new(OwnerId(1), tx);
        ctx.send_to_visible(SessionEvent::AppearanceChanged(Appearance::default()));
        assert!(!ctx.is_in_world());
    }
}
