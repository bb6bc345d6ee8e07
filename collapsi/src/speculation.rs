use std::ops::{Deref, DerefMut};

use crate::GameState;

/// Scoped speculative access to a [`GameState`].
///
/// Takes a snapshot when created and puts it back when dropped, so any
/// sequence of moves made through the guard is undone on every exit path,
/// including early returns through `?` and panics.
pub struct Speculation<'a> {
    state: &'a mut GameState,
    snapshot: GameState,
}

impl<'a> Speculation<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        let snapshot = state.clone();
        Self { state, snapshot }
    }

    /// The state as it was when the speculation started.
    pub fn snapshot(&self) -> &GameState {
        &self.snapshot
    }
}

impl Deref for Speculation<'_> {
    type Target = GameState;

    fn deref(&self) -> &Self::Target {
        &*self.state
    }
}

impl DerefMut for Speculation<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.state
    }
}

impl Drop for Speculation<'_> {
    fn drop(&mut self) {
        std::mem::swap(self.state, &mut self.snapshot);
    }
}
