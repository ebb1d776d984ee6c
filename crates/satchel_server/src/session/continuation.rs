//! Ordered release of store continuations.
//!
//! Futures run on the tokio runtime and may finish in any order. Each one is
//! tagged with a sequence number when dispatched; its continuation is parked
//! until every lower-numbered continuation has been released.

use super::PlayerSession;
use crossbeam_channel::{Receiver, Sender};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Instant;
use tokio::runtime::Handle;

/// Follow-up work that runs on the session once its future resolved.
pub(crate) type Continuation = Box<dyn FnOnce(&mut PlayerSession) + Send>;

struct Completion {
    sequence: u64,
    /// `None` when the task was cancelled or panicked.
    continuation: Option<Continuation>,
}

/// Reports a completion exactly once, even if the task never finishes.
struct CompletionSlot {
    sequence: u64,
    done: Sender<Completion>,
    sent: bool,
}

impl CompletionSlot {
    fn complete(mut self, continuation: Continuation) {
        self.sent = true;
        let _ = self.done.send(Completion {
            sequence: self.sequence,
            continuation: Some(continuation),
        });
    }
}

impl Drop for CompletionSlot {
    fn drop(&mut self) {
        if !self.sent {
            let _ = self.done.send(Completion {
                sequence: self.sequence,
                continuation: None,
            });
        }
    }
}

/// One step of continuation release.
pub(crate) enum Released {
    /// The future resolved; run this.
    Ready(Continuation),
    /// The future was dropped before resolving.
    Abandoned(u64),
}

/// Per-session continuation queue.
pub(crate) struct ContinuationQueue {
    runtime: Handle,
    next_sequence: u64,
    next_release: u64,
    done_tx: Sender<Completion>,
    done_rx: Receiver<Completion>,
    parked: BTreeMap<u64, Option<Continuation>>,
}

impl ContinuationQueue {
    pub(crate) fn new(runtime: Handle) -> Self {
        let (done_tx, done_rx) = crossbeam_channel::unbounded();
        Self {
            runtime,
            next_sequence: 0,
            next_release: 0,
            done_tx,
            done_rx,
            parked: BTreeMap::new(),
        }
    }

    /// Dispatched continuations not yet released.
    pub(crate) fn pending(&self) -> usize {
        usize::try_from(self.next_sequence - self.next_release).unwrap_or(usize::MAX)
    }

    /// Starts `future` and returns its sequence number.
    pub(crate) fn spawn<F, C>(&mut self, future: F, continuation: C) -> u64
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
        C: FnOnce(&mut PlayerSession, F::Output) + Send + 'static,
    {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let slot = CompletionSlot {
            sequence,
            done: self.done_tx.clone(),
            sent: false,
        };
        self.runtime.spawn(async move {
            let output = future.await;
            slot.complete(Box::new(move |session: &mut PlayerSession| {
                continuation(session, output);
            }));
        });
        sequence
    }

    /// Parks every completion that has arrived so far.
    pub(crate) fn collect(&mut self) {
        while let Ok(completion) = self.done_rx.try_recv() {
            self.parked.insert(completion.sequence, completion.continuation);
        }
    }

    /// Blocks until one more completion arrives or the deadline passes.
    pub(crate) fn wait_until(&mut self, deadline: Instant) -> bool {
        match self.done_rx.recv_deadline(deadline) {
            Ok(completion) => {
                self.parked.insert(completion.sequence, completion.continuation);
                true
            }
            Err(_) => false,
        }
    }

    /// Takes the next continuation in sequence, if it has completed.
    pub(crate) fn release(&mut self) -> Option<Released> {
        let sequence = self.next_release;
        let continuation = self.parked.remove(&sequence)?;
        self.next_release += 1;
        Some(match continuation {
            Some(continuation) => Released::Ready(continuation),
            None => Released::Abandoned(sequence),
        })
    }
}

impl std::fmt::Debug for ContinuationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContinuationQueue")
            .field("next_sequence", &self.next_sequence)
            .field("next_release", &self.next_release)
            .field("parked", &self.parked.len())
            .finish_non_exhaustive()
    }
}
