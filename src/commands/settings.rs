use crate::core::planner::service::validate_configuration;
use crate::domain::models::{AppError, SimulationSettings};
use crate::infra::storage::settings_store::{load_or_default_settings, save_settings};
use crate::state::RuntimeState;

pub fn load_simulation_settings(state: &RuntimeState) -> Result<SimulationSettings, AppError> {
    let settings = load_or_default_settings(&state.settings_path)?;
    tracing::info!(path = %state.settings_path.display(), "simulation settings loaded");
    Ok(settings)
}

pub fn save_simulation_settings(
    state: &RuntimeState,
    settings: &SimulationSettings,
) -> Result<(), AppError> {
    validate_configuration(settings.start, settings.end, &settings.simulation)?;
    save_settings(&state.settings_path, settings)
}

#[cfg(test)]
mod tests {
    use super::{load_simulation_settings, save_simulation_settings};
    use crate::domain::models::SimulationSettings;
    use crate::state::RuntimeState;
    use tempfile::tempdir;

    #[test]
    fn invalid_settings_are_not_written() {
        let temp = tempdir().unwrap();
        let state = RuntimeState::new(temp.path().join("settings.json"));
        let mut settings = SimulationSettings::default();
        settings.simulation.refresh_interval_seconds = 0.0;
        let error = save_simulation_settings(&state, &settings).unwrap_err();
        assert_eq!(error.code, "INVALID_CONFIGURATION");
        assert!(!state.settings_path.exists());
    }

    #[test]
    fn saved_settings_are_loaded_by_runtime() {
        let temp = tempdir().unwrap();
        let state = RuntimeState::new(temp.path().join("settings.json"));
        let mut settings = SimulationSettings::default();
        settings.simulation.speed_kmph = 35.0;
        save_simulation_settings(&state, &settings).unwrap();
        let loaded = load_simulation_settings(&state).unwrap();
        assert_eq!(loaded.simulation.speed_kmph, 35.0);
    }
}
