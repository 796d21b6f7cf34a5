//! Generation-gated scheduling of update cycles.
//!
//! Every trigger bumps the generation. A burst of triggers before the next
//! animation frame collapses into one pending cycle, which runs with the
//! generation current at frame time. A running cycle compares its own
//! generation with [`UpdateScheduler::current`] after every suspension point
//! and gives up as soon as they differ.

use std::cell::Cell;
use std::fmt;

/// Identifies one triggered update; larger is newer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Single-threaded trigger coalescer
#[derive(Debug, Default)]
pub struct UpdateScheduler {
    generation: Cell<u64>,
    frame_pending: Cell<bool>,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a trigger. Returns true when a frame must be requested,
    /// false when one is already pending.
    pub fn schedule(&self) -> bool {
        self.generation.set(self.generation.get() + 1);
        !self.frame_pending.replace(true)
    }

    /// Consumes the pending frame, yielding the generation to run
    pub fn take_pending(&self) -> Option<Generation> {
        if self.frame_pending.replace(false) {
            Some(self.current())
        } else {
            None
        }
    }

    /// Supersedes whatever is running or pending without asking for a frame
    pub fn invalidate(&self) {
        self.generation.set(self.generation.get() + 1);
        self.frame_pending.set(false);
    }

    pub fn current(&self) -> Generation {
        Generation(self.generation.get())
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation.get() == generation.0
    }

    pub fn is_pending(&self) -> bool {
        self.frame_pending.get()
    }
}
