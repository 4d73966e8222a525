// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokenizer event dispatch.
//!
//! The event set is fixed, so events are an enum rather than runtime
//! names and a non-callable subscriber cannot be expressed. Payloads
//! carry positions instead of borrows: observers read the tokenizer
//! afterwards rather than reaching into it mid-dispatch, which keeps
//! the scan loop free of reentrant mutation.

use crate::context::ContextRange;
use crate::error::{Result, ShapeError};
use rustc_hash::FxHashMap;

/// The fixed set of tokenizer events.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CoreEvent {
    Start,
    End,
    Next,
    NewToken,
    ContextStart,
    ContextEnd,
    InsertToken,
    RemoveToken,
    RemoveRange,
    ReplaceToken,
    ReplaceRange,
    ComposeRud,
    UpdateContextsRanges,
}

/// Data attached to an event dispatch.
#[derive(Clone, Debug)]
pub enum EventPayload {
    /// A tokenize pass began.
    Start,
    /// The scan reached `index`.
    Next { index: usize },
    /// A token was appended at `index`.
    NewToken { index: usize },
    /// A context opened at `index`.
    ContextStart { context: String, index: usize },
    /// A context closed over `range`.
    ContextEnd { context: String, range: ContextRange },
    /// A tokenize pass finished with `len` tokens.
    End { len: usize },
    /// `count` tokens were inserted at `index`.
    InsertToken { index: usize, count: usize },
    /// The token at `index` was removed.
    RemoveToken { index: usize },
    /// `count` tokens starting at `start` were removed.
    RemoveRange { start: usize, count: usize },
    /// The token at `index` was replaced.
    ReplaceToken { index: usize },
    /// `removed` tokens starting at `start` gave way to `inserted`.
    ReplaceRange {
        start: usize,
        removed: usize,
        inserted: usize,
    },
    /// A batch of edits went through; `applied` sub-operations succeeded.
    ComposeRud { applied: usize },
    /// Context ranges were recomputed after an edit.
    UpdateContextsRanges,
}

impl EventPayload {
    /// The event this payload belongs to.
    pub fn event(&self) -> CoreEvent {
        match self {
            Self::Start => CoreEvent::Start,
            Self::Next { .. } => CoreEvent::Next,
            Self::NewToken { .. } => CoreEvent::NewToken,
            Self::ContextStart { .. } => CoreEvent::ContextStart,
            Self::ContextEnd { .. } => CoreEvent::ContextEnd,
            Self::End { .. } => CoreEvent::End,
            Self::InsertToken { .. } => CoreEvent::InsertToken,
            Self::RemoveToken { .. } => CoreEvent::RemoveToken,
            Self::RemoveRange { .. } => CoreEvent::RemoveRange,
            Self::ReplaceToken { .. } => CoreEvent::ReplaceToken,
            Self::ReplaceRange { .. } => CoreEvent::ReplaceRange,
            Self::ComposeRud { .. } => CoreEvent::ComposeRud,
            Self::UpdateContextsRanges => CoreEvent::UpdateContextsRanges,
        }
    }
}

/// Observer invoked synchronously on dispatch.
pub type EventHandler = Box<dyn FnMut(&EventPayload)>;

/// Generation-tagged handle returned by [`EventBus::subscribe`].
///
/// Removing a subscription leaves every other handle valid; a handle
/// used after removal is refused rather than silently hitting another
/// subscriber's slot.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Subscription {
    event: CoreEvent,
    slot: usize,
    generation: u64,
}

struct Slot {
    generation: u64,
    // None marks a tombstone left behind by unsubscribe.
    handler: Option<EventHandler>,
}

/// Named multi-subscriber signals with a silent-mode override.
#[derive(Default)]
pub struct EventBus {
    slots: FxHashMap<CoreEvent, Vec<Slot>>,
    generation: u64,
    silent: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppresses every dispatch while set. Used to batch edits.
    pub fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// True if the event has at least one live subscriber.
    pub fn has_subscribers(&self, event: CoreEvent) -> bool {
        self.slots
            .get(&event)
            .is_some_and(|slots| slots.iter().any(|s| s.handler.is_some()))
    }

    /// Appends a handler to the event's subscriber list.
    pub fn subscribe(&mut self, event: CoreEvent, handler: EventHandler) -> Subscription {
        self.generation += 1;
        let slots = self.slots.entry(event).or_default();
        slots.push(Slot {
            generation: self.generation,
            handler: Some(handler),
        });
        Subscription {
            event,
            slot: slots.len() - 1,
            generation: self.generation,
        }
    }

    /// Removes a subscription. Later handles stay valid.
    pub fn unsubscribe(&mut self, sub: Subscription) -> Result<()> {
        let slot = self
            .slots
            .get_mut(&sub.event)
            .and_then(|slots| slots.get_mut(sub.slot));
        match slot {
            Some(slot) if slot.generation == sub.generation && slot.handler.is_some() => {
                slot.handler = None;
                Ok(())
            }
            _ => Err(ShapeError::StaleSubscription),
        }
    }

    /// Invokes live subscribers in subscription order, synchronously.
    pub fn dispatch(&mut self, payload: &EventPayload) {
        if self.silent {
            return;
        }
        if let Some(slots) = self.slots.get_mut(&payload.event()) {
            for slot in slots.iter_mut() {
                if let Some(handler) = slot.handler.as_mut() {
                    handler(payload);
                }
            }
        }
    }
}
