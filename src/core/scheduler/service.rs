use crate::core::planner::service::MotionParameters;
use crate::domain::models::{AppError, GeoPoint};
use crate::domain::state_machine::{MotionMachine, MotionPhase};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Mutable progress of a run. Lives inside the tick task only.
#[derive(Debug, Clone, Copy)]
struct MotionState {
    current_step: u64,
    current_position: GeoPoint,
}

#[derive(Debug)]
struct RunGate {
    machine: MotionMachine,
    generation: u64,
}

#[derive(Debug)]
struct SchedulerShared {
    // Publication and cancellation both happen under this lock. Readers of
    // `published` and the phase never take it.
    gate: Mutex<RunGate>,
    published: AtomicU64,
    phase_tx: watch::Sender<MotionPhase>,
}

impl SchedulerShared {
    fn lock_gate(&self) -> MutexGuard<'_, RunGate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sync_phase(&self, gate: &RunGate) {
        self.phase_tx.send_replace(gate.machine.state());
    }
}

/// Drives one simulated object from `start` to `end` on a fixed cadence.
///
/// Dropping the scheduler cancels the run.
#[derive(Debug)]
pub struct MotionScheduler {
    params: MotionParameters,
    shared: Arc<SchedulerShared>,
    timer: Option<JoinHandle<()>>,
}

impl MotionScheduler {
    pub fn new(params: MotionParameters) -> Self {
        let (phase_tx, _) = watch::channel(MotionPhase::Idle);
        Self {
            params,
            shared: Arc::new(SchedulerShared {
                gate: Mutex::new(RunGate {
                    machine: MotionMachine::new(),
                    generation: 0,
                }),
                published: AtomicU64::new(0),
                phase_tx,
            }),
            timer: None,
        }
    }

    pub fn params(&self) -> &MotionParameters {
        &self.params
    }

    pub fn phase(&self) -> MotionPhase {
        *self.shared.phase_tx.borrow()
    }

    /// Positions handed to the consumer during the current run, final one included.
    pub fn published(&self) -> u64 {
        self.shared.published.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<MotionPhase> {
        self.shared.phase_tx.subscribe()
    }

    /// Resolves once the run leaves `Running`.
    pub async fn wait(&self) -> MotionPhase {
        wait_until_settled(self.subscribe()).await
    }

    /// Starts a new run, replacing any run in progress.
    ///
    /// A zero-step plan publishes `end` before returning and never spawns a timer;
    /// every other plan needs a tokio runtime with the time driver enabled.
    ///
    /// The consumer runs while the run is gated and must not cancel this scheduler.
    pub fn start<F>(&mut self, mut on_position: F) -> Result<(), AppError>
    where
        F: FnMut(GeoPoint) + Send + 'static,
    {
        self.cancel();

        if self.params.is_degenerate() {
            let mut gate = self.shared.lock_gate();
            gate.generation += 1;
            gate.machine = MotionMachine::new();
            self.shared.published.store(1, Ordering::SeqCst);
            if !publish(&mut on_position, self.params.end) {
                abandon_run(&mut gate, &self.shared);
                return Err(AppError::new(
                    "CONSUMER_PANICKED",
                    "position consumer panicked while receiving the destination",
                    None,
                ));
            }
            gate.machine.complete()?;
            self.shared.sync_phase(&gate);
            tracing::info!("zero-step route, published destination immediately");
            return Ok(());
        }

        let handle = Handle::try_current().map_err(|error| {
            AppError::new(
                "NO_RUNTIME",
                format!("motion timer needs a tokio runtime: {error}"),
                Some("start the scheduler from inside a tokio runtime".to_string()),
            )
        })?;

        let period = self.params.refresh_interval;
        let first_tick = Instant::now().checked_add(period).ok_or_else(|| {
            AppError::new(
                "INVALID_CONFIGURATION",
                format!("refresh interval of {period:?} cannot be scheduled"),
                Some("use a refresh interval of at most a day".to_string()),
            )
        })?;

        let generation = {
            let mut gate = self.shared.lock_gate();
            gate.generation += 1;
            gate.machine = MotionMachine::new();
            gate.machine.start()?;
            self.shared.published.store(0, Ordering::SeqCst);
            self.shared.sync_phase(&gate);
            gate.generation
        };
        tracing::info!(
            ticks = self.params.tick_count(),
            interval_ms = period.as_millis() as u64,
            "motion started"
        );

        self.timer = Some(handle.spawn(run_ticks(
            self.params.clone(),
            Arc::clone(&self.shared),
            generation,
            first_tick,
            on_position,
        )));
        Ok(())
    }

    /// Stops the run. No position is published after this returns.
    pub fn cancel(&mut self) {
        {
            let mut gate = self.shared.lock_gate();
            gate.generation += 1;
            if gate.machine.state() == MotionPhase::Running && gate.machine.cancel().is_ok() {
                self.shared.sync_phase(&gate);
                tracing::info!(published = self.published(), "motion cancelled");
            }
        }
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for MotionScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub async fn wait_until_settled(mut phase_rx: watch::Receiver<MotionPhase>) -> MotionPhase {
    let settled = phase_rx
        .wait_for(|phase| *phase != MotionPhase::Running)
        .await
        .map(|phase| *phase);
    match settled {
        Ok(phase) => phase,
        Err(_) => *phase_rx.borrow(),
    }
}

async fn run_ticks<F>(
    params: MotionParameters,
    shared: Arc<SchedulerShared>,
    generation: u64,
    first_tick: Instant,
    mut on_position: F,
) where
    F: FnMut(GeoPoint) + Send + 'static,
{
    let mut ticker = interval_at(first_tick, params.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut state = MotionState {
        current_step: 0,
        current_position: params.start,
    };

    loop {
        ticker.tick().await;
        let mut gate = shared.lock_gate();
        if gate.generation != generation || gate.machine.state() != MotionPhase::Running {
            break;
        }

        if state.current_step as f64 >= params.step_count {
            let published = shared.published.fetch_add(1, Ordering::SeqCst) + 1;
            let delivered = publish(&mut on_position, params.end);
            if delivered && gate.machine.complete().is_ok() {
                shared.sync_phase(&gate);
                tracing::info!(published, "motion completed");
            } else {
                abandon_run(&mut gate, &shared);
            }
            break;
        }

        state.current_position = params.position_at(state.current_step);
        state.current_step += 1;
        shared.published.fetch_add(1, Ordering::SeqCst);
        if !publish(&mut on_position, state.current_position) {
            abandon_run(&mut gate, &shared);
            break;
        }
        tracing::trace!(
            step = state.current_step,
            lat = state.current_position.lat,
            lng = state.current_position.lng,
            "position published"
        );
    }
}

fn publish<F>(on_position: &mut F, point: GeoPoint) -> bool
where
    F: FnMut(GeoPoint),
{
    catch_unwind(AssertUnwindSafe(|| on_position(point))).is_ok()
}

fn abandon_run(gate: &mut RunGate, shared: &SchedulerShared) {
    tracing::error!(
        published = shared.published.load(Ordering::SeqCst),
        "position consumer panicked, motion stopped"
    );
    gate.generation += 1;
    if gate.machine.cancel().is_ok() {
        shared.sync_phase(gate);
    }
}
