use crate::core::planner::service::{compute_motion_parameters, MotionParameters};
use crate::core::scheduler::service::{wait_until_settled, MotionScheduler};
use crate::domain::models::{AppError, GeoPoint, PositionEvent, SimulationSettings};
use crate::domain::state_machine::MotionPhase;
use crate::state::{RuntimeState, SimulationSession};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::MutexGuard;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub total_distance_meters: f64,
    pub effective_speed_kmph: f64,
    pub total_time_seconds: f64,
    pub step_count: f64,
    pub tick_count: u64,
    pub refresh_interval_seconds: f64,
    pub waypoints: Vec<GeoPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStatus {
    pub run_id: String,
    pub phase: MotionPhase,
    pub published: u64,
    pub total_publications: u64,
    pub started_at: DateTime<Utc>,
}

pub fn plan_route(settings: &SimulationSettings) -> Result<RouteSummary, AppError> {
    let params = compute_motion_parameters(settings.start, settings.end, &settings.simulation)?;
    Ok(route_summary(&params))
}

/// Plans the route and starts its timer; `sink` receives one event per tick.
///
/// The sink may query `simulation_status` or prune finished runs, but must not
/// cancel its own run from inside the callback.
pub fn start_simulation<F>(
    state: &RuntimeState,
    settings: SimulationSettings,
    mut sink: F,
) -> Result<String, AppError>
where
    F: FnMut(PositionEvent) + Send + 'static,
{
    let params = compute_motion_parameters(settings.start, settings.end, &settings.simulation)?;
    let run_id = Uuid::new_v4().to_string();
    let final_step = params.tick_count();
    let distance_m = params.total_distance_meters;

    let mut scheduler = MotionScheduler::new(params);
    let event_run_id = run_id.clone();
    let mut step = 0_u64;
    scheduler.start(move |position| {
        sink(PositionEvent {
            run_id: event_run_id.clone(),
            step,
            position,
            is_final: step == final_step,
            emitted_at: Utc::now(),
        });
        step += 1;
    })?;

    tracing::info!(
        run_id = %run_id,
        distance_m,
        ticks = final_step,
        "simulation started"
    );
    let session = SimulationSession {
        run_id: run_id.clone(),
        settings,
        scheduler,
        started_at: Utc::now(),
    };
    lock_simulations(state)?.insert(run_id.clone(), session);
    Ok(run_id)
}

pub fn simulation_status(state: &RuntimeState, run_id: &str) -> Result<SimulationStatus, AppError> {
    let simulations = lock_simulations(state)?;
    let session = simulations.get(run_id).ok_or_else(|| not_found(run_id))?;
    Ok(session_status(session))
}

pub fn cancel_simulation(state: &RuntimeState, run_id: &str) -> Result<SimulationStatus, AppError> {
    let mut session = lock_simulations(state)?
        .remove(run_id)
        .ok_or_else(|| not_found(run_id))?;
    session.scheduler.cancel();
    tracing::info!(run_id = %run_id, "simulation cancelled");
    Ok(session_status(&session))
}

/// Waits until the run completes or is cancelled, then reports its status.
pub async fn wait_for_simulation(
    state: &RuntimeState,
    run_id: &str,
) -> Result<SimulationStatus, AppError> {
    let phase_rx = {
        let simulations = lock_simulations(state)?;
        simulations
            .get(run_id)
            .ok_or_else(|| not_found(run_id))?
            .scheduler
            .subscribe()
    };
    wait_until_settled(phase_rx).await;
    simulation_status(state, run_id)
}

/// Drops sessions whose motion already reached the destination.
pub fn prune_finished_simulations(state: &RuntimeState) -> Result<usize, AppError> {
    let mut simulations = lock_simulations(state)?;
    let before = simulations.len();
    simulations.retain(|_, session| session.scheduler.phase() != MotionPhase::Completed);
    Ok(before - simulations.len())
}

fn route_summary(params: &MotionParameters) -> RouteSummary {
    RouteSummary {
        start: params.start,
        end: params.end,
        total_distance_meters: params.total_distance_meters,
        effective_speed_kmph: params.effective_speed_kmph,
        total_time_seconds: params.total_time_seconds,
        step_count: params.step_count,
        tick_count: params.tick_count(),
        refresh_interval_seconds: params.refresh_interval.as_secs_f64(),
        waypoints: params.planned_positions(),
    }
}

fn session_status(session: &SimulationSession) -> SimulationStatus {
    SimulationStatus {
        run_id: session.run_id.clone(),
        phase: session.scheduler.phase(),
        published: session.scheduler.published(),
        total_publications: session.scheduler.params().tick_count() + 1,
        started_at: session.started_at,
    }
}

fn lock_simulations(
    state: &RuntimeState,
) -> Result<MutexGuard<'_, HashMap<String, SimulationSession>>, AppError> {
    state
        .simulations
        .lock()
        .map_err(|_| AppError::new("STATE_LOCK_ERROR", "failed to lock simulations", None))
}

fn not_found(run_id: &str) -> AppError {
    AppError::new(
        "SIMULATION_NOT_FOUND",
        format!("simulation not found: {run_id}"),
        None,
    )
}
