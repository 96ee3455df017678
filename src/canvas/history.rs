//! Undo/redo stacks of raster snapshots.

use crate::error::HistoryError;
use std::collections::VecDeque;

/// Paired undo/redo stacks.
///
/// Every snapshot is an independent copy; the stacks never share storage with
/// the live raster. Pushing a new state clears the redo stack.
#[derive(Debug)]
pub struct History<S> {
    undo: VecDeque<S>,
    redo: Vec<S>,
    /// Maximum undo depth (0 = unlimited); the oldest entry is evicted first
    max_depth: usize,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<S> History<S> {
    /// Creates empty stacks holding at most `max_depth` undo entries (0 = unlimited).
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Records the state before a mutation and clears the redo stack.
    pub fn push(&mut self, snapshot: S) {
        self.redo.clear();
        self.undo.push_back(snapshot);
        self.evict();
    }

    /// Replaces `current` with the most recent undo entry.
    ///
    /// The replaced state moves onto the redo stack. On error `current` is untouched.
    pub fn undo(&mut self, current: &mut S) -> Result<(), HistoryError> {
        let previous = self.undo.pop_back().ok_or(HistoryError::NothingToUndo)?;
        self.redo.push(std::mem::replace(current, previous));
        Ok(())
    }

    /// Replaces `current` with the most recent redo entry.
    pub fn redo(&mut self, current: &mut S) -> Result<(), HistoryError> {
        let next = self.redo.pop().ok_or(HistoryError::NothingToRedo)?;
        self.undo.push_back(std::mem::replace(current, next));
        self.evict();
        Ok(())
    }

    fn evict(&mut self) {
        if self.max_depth > 0 {
            while self.undo.len() > self.max_depth {
                self.undo.pop_front();
            }
        }
    }

    /// Drops every entry on both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
