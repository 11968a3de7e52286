use crate::domain::models::{AppError, MapStyle, SimulationConfig, SimulationSettings};
use serde_json::{json, Value};
use std::path::Path;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

pub fn load_or_default_settings(path: &Path) -> Result<SimulationSettings, AppError> {
    if !path.exists() {
        let settings = SimulationSettings::default();
        save_settings(path, &settings)?;
        tracing::info!(path = %path.display(), "wrote default simulation settings");
        return Ok(settings);
    }
    load_settings_from_file(path)
}

pub fn save_settings(path: &Path, settings: &SimulationSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| {
            AppError::new(
                "IO_ERROR",
                format!("failed to create settings dir: {error}"),
                Some("check directory permissions".to_string()),
            )
        })?;
    }
    let raw = serde_json::to_string_pretty(settings).map_err(|error| {
        AppError::new(
            "SERDE_ERROR",
            format!("failed to serialize settings: {error}"),
            None,
        )
    })?;
    std::fs::write(path, raw).map_err(|error| {
        AppError::new(
            "IO_ERROR",
            format!("failed to write settings: {error}"),
            Some("check disk space and file permissions".to_string()),
        )
    })
}

pub fn load_settings_from_file(path: &Path) -> Result<SimulationSettings, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|error| {
        AppError::new(
            "IO_ERROR",
            format!("failed to read settings: {error}"),
            Some(format!("make sure {} is readable", path.display())),
        )
    })?;

    let mut value: Value = serde_json::from_str(&raw).map_err(|error| {
        AppError::new(
            "SERDE_ERROR",
            format!("failed to parse settings json: {error}"),
            None,
        )
    })?;

    let schema_version = value
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    if schema_version > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(AppError::new(
            "UNSUPPORTED_SCHEMA",
            format!(
                "schemaVersion {schema_version} is newer than supported {}",
                CURRENT_SCHEMA_VERSION
            ),
            Some("upgrade vesseltrack and retry".to_string()),
        ));
    }

    if schema_version < u64::from(CURRENT_SCHEMA_VERSION) {
        value = migrate_to_v1(value)?;
    }

    serde_json::from_value(value).map_err(|error| {
        AppError::new(
            "SERDE_ERROR",
            format!("failed to decode settings: {error}"),
            None,
        )
    })
}

// v0 files were hand-written and may omit any section.
fn migrate_to_v1(mut value: Value) -> Result<Value, AppError> {
    let defaults = SimulationSettings::default();
    let default_value = json!({
      "schemaVersion": CURRENT_SCHEMA_VERSION,
      "start": defaults.start,
      "end": defaults.end,
      "simulation": SimulationConfig::default(),
      "map": MapStyle::default()
    });

    let object = value.as_object_mut().ok_or_else(|| {
        AppError::new(
            "MIGRATION_ERROR",
            "legacy settings should be a JSON object",
            None,
        )
    })?;
    if let Value::Object(default_object) = default_value {
        for (key, default_entry) in default_object {
            object.entry(key).or_insert(default_entry);
        }
    }
    object.insert(
        "schemaVersion".to_string(),
        Value::Number(CURRENT_SCHEMA_VERSION.into()),
    );
    Ok(value)
}
