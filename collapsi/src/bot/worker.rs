use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{BotPlayer, PlannedTurn};
use crate::{GameError, GameState, InvalidState};

// Extra wait past the search budget before the search is told to stop.
const GRACE: Duration = Duration::from_millis(250);

struct Request {
    state: GameState,
    deadline: Option<Instant>,
    reply: Sender<Result<PlannedTurn, GameError>>,
}

/// Runs a [`BotPlayer`]'s planning on its own thread.
///
/// The caller blocks in [`BotWorker::plan`] while the worker searches on a
/// copy of the state, so the game itself is never touched from two threads.
pub struct BotWorker {
    requests: Option<Sender<Request>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    time_budget: Duration,
}

impl BotWorker {
    pub fn spawn(mut bot: BotPlayer) -> Self {
        let (requests, inbox) = mpsc::channel::<Request>();
        let stop = Arc::new(AtomicBool::new(false));
        let time_budget = bot.policy().limits.time_budget;
        let worker_stop = Arc::clone(&stop);
        let handle = std::thread::spawn(move || serve(&mut bot, inbox, &worker_stop));
        Self {
            requests: Some(requests),
            stop,
            handle: Some(handle),
            time_budget,
        }
    }

    /// Plans the current player's turn in the background and waits for it.
    ///
    /// If the worker overruns its budget it is told to stop and the best
    /// result it found so far is returned.
    pub fn plan(
        &self,
        state: &GameState,
        deadline: Option<Instant>,
    ) -> Result<PlannedTurn, GameError> {
        let (reply, answer) = mpsc::channel();
        let requests = self
            .requests
            .as_ref()
            .ok_or(InvalidState::WorkerUnavailable)?;
        requests
            .send(Request {
                state: state.clone(),
                deadline,
                reply,
            })
            .map_err(|_| InvalidState::WorkerUnavailable)?;

        let wait = match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => self.time_budget,
        } + GRACE;
        match answer.recv_timeout(wait) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(waited_ms = wait.as_millis() as u64, "Bot overran its budget, stopping it");
                self.cancel();
                answer.recv().map_err(|_| InvalidState::WorkerUnavailable)?
            }
            Err(RecvTimeoutError::Disconnected) => Err(InvalidState::WorkerUnavailable.into()),
        }
    }

    /// Asks a running search to wrap up with what it has.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn serve(bot: &mut BotPlayer, inbox: Receiver<Request>, stop: &AtomicBool) {
    for request in inbox {
        stop.store(false, Ordering::Relaxed);
        let Request {
            mut state,
            deadline,
            reply,
        } = request;
        let result = bot.plan_turn(&mut state, deadline, Some(stop));
        if reply.send(result).is_err() {
            debug!("Plan was no longer wanted");
        }
    }
}

impl Drop for BotWorker {
    fn drop(&mut self) {
        self.cancel();
        // Closing the channel ends the worker loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Bot worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::arbitrary::RandomPlayout;
    use crate::{Difficulty, Strategy, TierPolicy};

    #[test]
    fn plans_on_a_copy() {
        let state = RandomPlayout::new(30, 5, 2, 3).state;
        let worker = BotWorker::spawn(BotPlayer::new(Difficulty::Random, 9));
        let plan = worker.plan(&state, None).unwrap();
        assert_eq!(plan.player, state.current_player().color);
        let mut copy = state.clone();
        for step in plan.steps {
            copy.move_to(step).unwrap();
        }
    }

    #[test]
    fn deadline_bounds_the_wait() {
        let state = RandomPlayout::new(31, 6, 4, 0).state;
        let policy = TierPolicy::for_difficulty(Difficulty::Hard);
        let worker = BotWorker::spawn(BotPlayer::with_policy(policy, StdRng::seed_from_u64(1)));
        let started = Instant::now();
        let plan = worker
            .plan(&state, Some(Instant::now() + Duration::from_millis(50)))
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(plan.strategy, Strategy::Search);
        // The worker is reusable after a cut-short search
        assert!(worker.plan(&state, Some(Instant::now() + Duration::from_millis(20))).is_ok());
    }

    #[test]
    fn reports_game_over() {
        let mut state = RandomPlayout::new(32, 4, 2, 0).state;
        while !state.is_over() {
            let dest = state.possible_moves()[0];
            state.move_to(dest).unwrap();
        }
        let worker = BotWorker::spawn(BotPlayer::new(Difficulty::Easy, 2));
        assert_eq!(
            worker.plan(&state, None).unwrap_err(),
            InvalidState::GameOver.into()
        );
    }
}
