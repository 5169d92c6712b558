/*
 * Events Module
 *
 * The window side of the simulation reports what happened to it through
 * these events. The world drains them once per tick, after pacing.
 */

use std::collections::vec_deque::{self, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Resize { width: f64, height: f64 },
    Quit,
    // Anything else the window reports; the world ignores it
    Other,
}

/// A source of events, polled once per tick. Each poll yields the events that
/// arrived since the previous one.
pub trait EventSource {
    type Events<'a>: Iterator<Item = SimEvent>
    where
        Self: 'a;

    fn poll(&mut self) -> Self::Events<'_>;
}

// Window callbacks push into this queue; the world drains it
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl EventSource for EventQueue {
    type Events<'a> = vec_deque::Drain<'a, SimEvent>;

    fn poll(&mut self) -> Self::Events<'_> {
        self.pending.drain(..)
    }
}
