use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::eval::evaluate;
use super::policy::SearchLimits;
use crate::{enumerate_paths, Color, GameError, GameState, InvalidState, Path, Speculation};

/// Score of a won game, minus the number of turns it takes.
pub const WIN_SCORE: i32 = 1_000_000;
/// Score of a lost game, plus the number of turns it takes. Slightly smaller
/// in magnitude than a win, so that a late loss beats an early one.
pub const LOSS_SCORE: i32 = -999_000;

// No game lasts this many turns, so scores beyond it are decided games.
const MAX_PLY: i32 = 1_000;

fn is_decided(score: i32) -> bool {
    score >= WIN_SCORE - MAX_PLY || score <= LOSS_SCORE + MAX_PLY
}

/// How trustworthy a search result is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// Every line was followed to the end of the game.
    Exact,
    /// The depth limit was reached; leaves were scored heuristically.
    DepthLimited,
    /// Time ran out or the caller cancelled; the result comes from the
    /// deepest iteration that finished.
    TimedOut,
}

/// The outcome of [`search_best_path`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchReport {
    pub path: Path,
    pub score: i32,
    /// Depth of the last finished iteration, in turns.
    pub depth: u32,
    pub completion: Completion,
    pub nodes: u64,
}

impl SearchReport {
    pub fn is_exact(&self) -> bool {
        self.completion == Completion::Exact
    }
}

enum Abort {
    Interrupted,
    Failed(GameError),
}

impl From<GameError> for Abort {
    fn from(err: GameError) -> Self {
        Abort::Failed(err)
    }
}

/// Picks the current player's turn with iterative-deepening minimax.
///
/// Every node is one player's whole turn. The current player maximizes and
/// all others are assumed to play against it, with alpha-beta pruning.
/// The search stops at `limits.time_budget`, at `deadline` if that comes
/// first, or as soon as `stop` is set; running out of time is reported in
/// [`SearchReport::completion`], not as an error.
///
/// `state` is used as scratch space and is restored before returning.
pub fn search_best_path(
    state: &mut GameState,
    limits: &SearchLimits,
    deadline: Option<Instant>,
    stop: Option<&AtomicBool>,
) -> Result<SearchReport, GameError> {
    let started = Instant::now();
    let budget_end = started + limits.time_budget;
    let deadline = deadline.map_or(budget_end, |d| d.min(budget_end));
    let me = state.current_player().color;

    let mut paths = enumerate_paths(state)?;
    if paths.is_empty() {
        return Err(InvalidState::NoLegalMove { color: me }.into());
    }
    if paths.len() == 1 {
        let score = evaluate(state, me);
        return Ok(SearchReport {
            path: paths.swap_remove(0),
            score,
            depth: 0,
            completion: Completion::Exact,
            nodes: 1,
        });
    }

    let mut searcher = Searcher {
        me,
        deadline,
        stop,
        nodes: 0,
        hit_depth_limit: false,
    };
    let mut best: Option<(usize, i32)> = None;
    let mut depth_done = 0;
    let mut completion = Completion::DepthLimited;
    let mut depth = 1;
    loop {
        if limits.max_depth.is_some_and(|max| depth > max) {
            break;
        }
        searcher.hit_depth_limit = false;
        match searcher.root(state, &paths, depth) {
            Ok(found) => {
                best = Some(found);
                depth_done = depth;
                trace!(depth, score = found.1, nodes = searcher.nodes, "Iteration done");
                // A forced result cannot change with more depth
                if searcher.hit_depth_limit && !is_decided(found.1) {
                    completion = Completion::DepthLimited;
                } else {
                    completion = Completion::Exact;
                    break;
                }
            }
            Err(Abort::Interrupted) => {
                completion = Completion::TimedOut;
                break;
            }
            Err(Abort::Failed(err)) => return Err(err),
        }
        depth += 1;
    }

    let (idx, score) = match best {
        Some(found) => found,
        // Not even one turn deep: fall back to the first path
        None => (0, evaluate(state, me)),
    };
    debug!(
        player = %me,
        depth = depth_done,
        score,
        nodes = searcher.nodes,
        candidates = paths.len(),
        ?completion,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Search finished"
    );
    Ok(SearchReport {
        path: paths.swap_remove(idx),
        score,
        depth: depth_done,
        completion,
        nodes: searcher.nodes,
    })
}

struct Searcher<'a> {
    me: Color,
    deadline: Instant,
    stop: Option<&'a AtomicBool>,
    nodes: u64,
    hit_depth_limit: bool,
}

impl Searcher<'_> {
    fn interrupted(&self) -> bool {
        Instant::now() >= self.deadline
            || self.stop.is_some_and(|stop| stop.load(Ordering::Relaxed))
    }

    /// Scores each root path and returns the best; ties go to the earlier path.
    fn root(
        &mut self,
        state: &mut GameState,
        paths: &[Path],
        depth: u32,
    ) -> Result<(usize, i32), Abort> {
        let mut best = (0, i32::MIN);
        let mut alpha = i32::MIN;
        for (idx, path) in paths.iter().enumerate() {
            let mut speculation = Speculation::new(state);
            path.apply(&mut speculation)?;
            let score = self.minimax(&mut speculation, depth - 1, 1, alpha, i32::MAX)?;
            if score > best.1 {
                best = (idx, score);
            }
            alpha = alpha.max(score);
        }
        Ok(best)
    }

    fn minimax(
        &mut self,
        state: &mut GameState,
        depth: u32,
        ply: i32,
        mut alpha: i32,
        mut beta: i32,
    ) -> Result<i32, Abort> {
        self.nodes += 1;
        if self.interrupted() {
            return Err(Abort::Interrupted);
        }
        if let Some(score) = self.terminal_score(state, ply) {
            return Ok(score);
        }
        if depth == 0 {
            self.hit_depth_limit = true;
            return Ok(evaluate(state, self.me));
        }

        let maximizing = state.current_player().color == self.me;
        let paths = enumerate_paths(state)?;
        if paths.is_empty() {
            let color = state.current_player().color;
            return Err(GameError::from(InvalidState::NoLegalMove { color }).into());
        }
        let mut value = if maximizing { i32::MIN } else { i32::MAX };
        for path in &paths {
            let mut speculation = Speculation::new(state);
            path.apply(&mut speculation)?;
            let score = self.minimax(&mut speculation, depth - 1, ply + 1, alpha, beta)?;
            if maximizing {
                value = value.max(score);
                alpha = alpha.max(value);
            } else {
                value = value.min(score);
                beta = beta.min(value);
            }
            if alpha >= beta {
                break;
            }
        }
        Ok(value)
    }

    fn terminal_score(&self, state: &GameState, ply: i32) -> Option<i32> {
        let me_alive = state.player(self.me).is_some_and(|p| p.alive);
        if !me_alive {
            Some(LOSS_SCORE + ply)
        } else if state.is_over() {
            Some(WIN_SCORE - ply)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::{fixture, RandomPlayout};
    use crate::Coord;

    fn limits(max_depth: Option<u32>, millis: u64) -> SearchLimits {
        SearchLimits {
            max_depth,
            time_budget: Duration::from_millis(millis),
        }
    }

    quickcheck! {
        fn search_restores_state_and_returns_a_candidate(playout: RandomPlayout) -> bool {
            let mut state = playout.state;
            if state.is_over() {
                return true;
            }
            let before = state.clone();
            let report = search_best_path(&mut state, &limits(Some(2), 50), None, None).unwrap();
            let candidates = enumerate_paths(&mut state).unwrap();
            state == before && candidates.contains(&report.path)
        }
    }

    #[test]
    fn finds_forced_win_exactly() {
        // Blue's only exit is (1, 2). Ending the turn there leaves blue stuck.
        let mut state = fixture(&["1 1 1 1", "1 1 x 1", "1 1 1 x", "1 1 x 1"], &[(0, 2), (2, 2)]);
        assert_eq!(state.possible_moves().len(), 3);
        let before = state.clone();
        let report = search_best_path(&mut state, &limits(None, 2000), None, None).unwrap();
        assert_eq!(report.path.steps, vec![Coord::new(1, 2, 4)]);
        assert_eq!(report.score, WIN_SCORE - 1);
        assert_eq!(report.completion, Completion::Exact);
        assert!(report.is_exact());
        assert_eq!(state, before);
    }

    #[test]
    fn expired_deadline_degrades_instead_of_failing() {
        let mut state = RandomPlayout::new(2, 6, 4, 0).state;
        let before = state.clone();
        let past = Instant::now();
        let report = search_best_path(&mut state, &limits(None, 3000), Some(past), None).unwrap();
        assert_eq!(report.completion, Completion::TimedOut);
        assert_eq!(report.depth, 0);
        assert_eq!(state, before);
    }

    #[test]
    fn stop_flag_cancels() {
        let mut state = RandomPlayout::new(9, 5, 3, 0).state;
        let stop = AtomicBool::new(true);
        let report =
            search_best_path(&mut state, &limits(None, 3000), None, Some(&stop)).unwrap();
        assert_eq!(report.completion, Completion::TimedOut);
    }

    #[test]
    fn depth_limit_is_reported() {
        let mut state = RandomPlayout::new(4, 6, 4, 0).state;
        let report = search_best_path(&mut state, &limits(Some(1), 5000), None, None).unwrap();
        assert_eq!(report.depth, 1);
        assert_eq!(report.completion, Completion::DepthLimited);
    }
}
