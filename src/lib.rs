pub mod commands;
pub mod core;
pub mod domain;
pub mod infra;
pub mod state;

use commands::settings::load_simulation_settings;
use commands::simulation::{plan_route, start_simulation, wait_for_simulation};
use crate::core::scene::service::scene_frame;
use domain::models::AppError;
use infra::logging::init_tracing;
use state::RuntimeState;
use std::path::PathBuf;

const DEFAULT_SETTINGS_PATH: &str = "vesseltrack.json";

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    settings_path: PathBuf,
    plan_only: bool,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, AppError> {
        let mut settings_path = None;
        let mut plan_only = false;
        for arg in args {
            match arg.as_str() {
                "--plan" => plan_only = true,
                flag if flag.starts_with("--") => {
                    return Err(AppError::new(
                        "INVALID_ARGUMENT",
                        format!("unknown flag: {flag}"),
                        Some("usage: vesseltrack [settings.json] [--plan]".to_string()),
                    ));
                }
                path if settings_path.is_none() => settings_path = Some(PathBuf::from(path)),
                extra => {
                    return Err(AppError::new(
                        "INVALID_ARGUMENT",
                        format!("unexpected argument: {extra}"),
                        Some("usage: vesseltrack [settings.json] [--plan]".to_string()),
                    ));
                }
            }
        }
        Ok(Self {
            settings_path: settings_path.unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH)),
            plan_only,
        })
    }
}

pub fn run() -> Result<(), AppError> {
    init_tracing();

    let options = CliOptions::parse(std::env::args().skip(1))?;
    let state = RuntimeState::new(options.settings_path);
    let settings = load_simulation_settings(&state)?;

    if options.plan_only {
        let summary = plan_route(&settings)?;
        tracing::info!(
            distance_m = summary.total_distance_meters,
            time_s = summary.total_time_seconds,
            ticks = summary.tick_count,
            "route planned"
        );
        let raw = serde_json::to_string_pretty(&summary).map_err(|error| {
            AppError::new(
                "SERDE_ERROR",
                format!("failed to serialize route summary: {error}"),
                None,
            )
        })?;
        println!("{raw}");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|error| {
            AppError::new(
                "RUNTIME_ERROR",
                format!("failed to build tokio runtime: {error}"),
                None,
            )
        })?;

    runtime.block_on(async {
        let scene_settings = settings.clone();
        let run_id = start_simulation(&state, settings, move |event| {
            match serde_json::to_string(&scene_frame(&scene_settings, event)) {
                Ok(line) => println!("{line}"),
                Err(error) => tracing::warn!("failed to serialize scene frame: {error}"),
            }
        })?;
        let status = wait_for_simulation(&state, &run_id).await?;
        tracing::info!(
            run_id = %status.run_id,
            published = status.published,
            "simulation finished"
        );
        Ok::<(), AppError>(())
    })
}
