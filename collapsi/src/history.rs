use crate::{GameState, InvalidState};

/// Undo and redo stacks of whole-state snapshots.
///
/// Undo and redo swap complete states in and out; nothing is replayed.
#[derive(Clone, Debug, Default)]
pub struct History {
    undo: Vec<GameState>,
    redo: Vec<GameState>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state from before a new action. This invalidates
    /// everything that could have been redone.
    pub fn record(&mut self, before: GameState) {
        self.undo.push(before);
        self.redo.clear();
    }

    pub fn undo(&mut self, current: &mut GameState) -> Result<(), InvalidState> {
        let previous = self.undo.pop().ok_or(InvalidState::NothingToUndo)?;
        self.redo.push(std::mem::replace(current, previous));
        Ok(())
    }

    pub fn redo(&mut self, current: &mut GameState) -> Result<(), InvalidState> {
        let next = self.redo.pop().ok_or(InvalidState::NothingToRedo)?;
        self.undo.push(std::mem::replace(current, next));
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::RandomPlayout;

    quickcheck! {
        fn undo_all_then_redo_all_round_trips(playout: RandomPlayout) -> bool {
            let mut history = History::new();
            for before in playout.history.iter().cloned() {
                history.record(before);
            }
            let original = playout.state.clone();
            let mut state = playout.state.clone();
            for expected in playout.history.iter().rev() {
                history.undo(&mut state).unwrap();
                if &state != expected {
                    return false;
                }
            }
            if history.undo(&mut state) != Err(InvalidState::NothingToUndo) {
                return false;
            }
            for _ in 0..playout.steps {
                history.redo(&mut state).unwrap();
            }
            state == original && history.redo(&mut state) == Err(InvalidState::NothingToRedo)
        }
    }

    #[test]
    fn recording_clears_redo() {
        let playout = RandomPlayout::new(3, 4, 2, 3);
        let mut history = History::new();
        for before in playout.history.iter().cloned() {
            history.record(before);
        }
        let mut state = playout.state.clone();
        history.undo(&mut state).unwrap();
        assert!(history.can_redo());
        history.record(state.clone());
        assert!(!history.can_redo());
        assert_eq!(history.redo(&mut state), Err(InvalidState::NothingToRedo));
    }
}
