use crate::core::scheduler::service::MotionScheduler;
use crate::domain::models::SimulationSettings;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug)]
pub struct SimulationSession {
    pub run_id: String,
    pub settings: SimulationSettings,
    pub scheduler: MotionScheduler,
    pub started_at: DateTime<Utc>,
}

pub struct RuntimeState {
    pub simulations: Mutex<HashMap<String, SimulationSession>>,
    pub settings_path: PathBuf,
}

impl RuntimeState {
    pub fn new(settings_path: PathBuf) -> Self {
        Self {
            simulations: Mutex::new(HashMap::new()),
            settings_path,
        }
    }
}
