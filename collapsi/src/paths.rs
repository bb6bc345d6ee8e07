use serde::{Deserialize, Serialize};

use crate::{Coord, GameError, GameEvent, GameState, InvalidState, Phase, Speculation};

/// One full turn: the destinations of every step, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub steps: Vec<Coord>,
    /// The player gets stuck on the last step and is eliminated.
    pub eliminates: bool,
}

impl Path {
    pub fn destination(&self) -> Option<Coord> {
        self.steps.last().copied()
    }

    /// Plays all steps on `state`.
    pub fn apply(&self, state: &mut GameState) -> Result<Vec<GameEvent>, GameError> {
        let mut events = Vec::new();
        for &step in &self.steps {
            events.extend(state.move_to(step)?);
        }
        Ok(events)
    }
}

/// Lists one path to every distinct tile the current player can end the
/// turn on.
///
/// Works by playing each candidate step on `state` and taking it back, so
/// `state` is borrowed mutably but is unchanged when this returns, even on
/// error. Paths that end the turn alive win over ones that end in
/// elimination on the same tile; otherwise the first path found is kept.
pub fn enumerate_paths(state: &mut GameState) -> Result<Vec<Path>, GameError> {
    if state.is_over() {
        return Err(InvalidState::GameOver.into());
    }
    let mover = state.current_index();
    let mut paths = Vec::new();
    let mut prefix = Vec::new();
    explore(state, mover, &mut prefix, &mut paths)?;
    Ok(paths)
}

fn explore(
    state: &mut GameState,
    mover: usize,
    prefix: &mut Vec<Coord>,
    paths: &mut Vec<Path>,
) -> Result<(), GameError> {
    for dest in state.possible_moves() {
        prefix.push(dest);
        let mut speculation = Speculation::new(state);
        speculation.move_to(dest)?;
        if speculation.current_index() == mover && speculation.phase() == Phase::AwaitingMove {
            explore(&mut speculation, mover, prefix, paths)?;
        } else {
            let eliminates = !speculation.players()[mover].alive;
            record(
                paths,
                Path {
                    steps: prefix.clone(),
                    eliminates,
                },
            );
        }
        drop(speculation);
        prefix.pop();
    }
    Ok(())
}

fn record(paths: &mut Vec<Path>, path: Path) {
    match paths
        .iter_mut()
        .find(|known| known.destination() == path.destination())
    {
        Some(known) => {
            if known.eliminates && !path.eliminates {
                *known = path;
            }
        }
        None => paths.push(path),
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::{fixture, RandomPlayout};

    fn at(x: i32, y: i32) -> Coord {
        Coord::new(x, y, 4)
    }

    quickcheck! {
        fn enumeration_leaves_state_untouched(playout: RandomPlayout) -> bool {
            let mut state = playout.state;
            if state.is_over() {
                return true;
            }
            let before = state.clone();
            let paths = enumerate_paths(&mut state).unwrap();
            !paths.is_empty() && state == before
        }

        fn every_path_is_playable(playout: RandomPlayout) -> bool {
            let state = playout.state;
            if state.is_over() {
                return true;
            }
            let mover = state.current_index();
            let paths = enumerate_paths(&mut state.clone()).unwrap();
            paths.iter().all(|path| {
                let mut copy = state.clone();
                path.apply(&mut copy).is_ok()
                    && copy.players()[mover].remaining_steps == 0
                    && copy.players()[mover].alive != path.eliminates
                    && copy.players()[mover].position == path.destination().unwrap()
            })
        }
    }

    #[test]
    fn one_path_per_destination() {
        let mut state = fixture(&["2 1 1 1", "1 1 1 1", "1 1 1 1", "1 1 1 1"], &[(0, 0), (2, 2)]);
        let paths = enumerate_paths(&mut state).unwrap();
        let mut destinations: Vec<Coord> =
            paths.iter().filter_map(|p| p.destination()).collect();
        destinations.sort();
        // Two steps on an open torus, never back through the collapsed start
        let mut expected = vec![at(2, 0), at(3, 3), at(3, 1), at(1, 3), at(1, 1), at(0, 2)];
        expected.sort();
        assert_eq!(destinations, expected);
        assert!(paths.iter().all(|p| p.steps.len() == 2 && !p.eliminates));
    }

    #[test]
    fn stuck_path_is_reported_as_elimination() {
        let mut state = fixture(&["2 1 x x", "x x 1 1", "1 1 1 1", "x x 1 1"], &[(0, 0), (3, 2)]);
        let paths = enumerate_paths(&mut state).unwrap();
        assert_eq!(
            paths,
            vec![Path {
                steps: vec![at(1, 0)],
                eliminates: true
            }]
        );
    }
}
