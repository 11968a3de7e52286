use crate::core::planner::geodesy::compute_distance;
use crate::domain::models::{AppError, GeoPoint, SimulationConfig};
use std::time::Duration;

/// Upper bound on ticks per run; at two ticks a second this is about two months.
pub const MAX_STEP_COUNT: f64 = 10_000_000.0;
pub const MAX_REFRESH_INTERVAL_SECONDS: f64 = 86_400.0;

/// Static parameters of one run, computed once before the timer starts.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionParameters {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub total_distance_meters: f64,
    pub effective_speed_kmph: f64,
    pub total_time_seconds: f64,
    /// Fractional; zero marks a degenerate run.
    pub step_count: f64,
    pub lat_step_per_tick: f64,
    pub lng_step_per_tick: f64,
    pub refresh_interval: Duration,
}

impl MotionParameters {
    pub fn is_degenerate(&self) -> bool {
        self.step_count == 0.0
    }

    /// Number of interpolated publications before the end point.
    pub fn tick_count(&self) -> u64 {
        if self.is_degenerate() {
            0
        } else {
            // step_count is capped at MAX_STEP_COUNT, so this fits.
            self.step_count.ceil().min(MAX_STEP_COUNT) as u64
        }
    }

    pub fn position_at(&self, step: u64) -> GeoPoint {
        let step = step as f64;
        GeoPoint::new(
            self.start.lat + self.lat_step_per_tick * step,
            self.start.lng + self.lng_step_per_tick * step,
        )
    }

    /// Every position a completed run publishes, in order, ending with `end` exactly.
    pub fn planned_positions(&self) -> Vec<GeoPoint> {
        let ticks = self.tick_count();
        let capacity = usize::try_from(ticks)
            .unwrap_or(usize::MAX)
            .saturating_add(1);
        let mut output = Vec::with_capacity(capacity);
        output.extend((0..ticks).map(|step| self.position_at(step)));
        output.push(self.end);
        output
    }
}

pub fn validate_configuration(
    start: GeoPoint,
    end: GeoPoint,
    config: &SimulationConfig,
) -> Result<(), AppError> {
    if !start.is_valid() || !end.is_valid() {
        return Err(AppError::new(
            "INVALID_CONFIGURATION",
            format!(
                "route endpoints must be finite coordinates within range: [{}, {}] -> [{}, {}]",
                start.lat, start.lng, end.lat, end.lng
            ),
            Some("latitude must be within [-90, 90] and longitude within [-180, 180]".to_string()),
        ));
    }
    if !config.speed_kmph.is_finite() || config.speed_kmph <= 0.0 {
        return Err(AppError::new(
            "INVALID_CONFIGURATION",
            format!("speed must be a positive number, got {}", config.speed_kmph),
            None,
        ));
    }
    if !config.speed_scale_factor.is_finite() || config.speed_scale_factor <= 0.0 {
        return Err(AppError::new(
            "INVALID_CONFIGURATION",
            format!(
                "speed scale factor must be a positive number, got {}",
                config.speed_scale_factor
            ),
            None,
        ));
    }
    if !config.refresh_interval_seconds.is_finite() || config.refresh_interval_seconds <= 0.0 {
        return Err(AppError::new(
            "INVALID_CONFIGURATION",
            format!(
                "refresh interval must be a positive number of seconds, got {}",
                config.refresh_interval_seconds
            ),
            Some("use 0.5 for two updates per second".to_string()),
        ));
    }
    if config.refresh_interval_seconds > MAX_REFRESH_INTERVAL_SECONDS {
        return Err(AppError::new(
            "INVALID_CONFIGURATION",
            format!(
                "refresh interval must be at most {MAX_REFRESH_INTERVAL_SECONDS} seconds, got {}",
                config.refresh_interval_seconds
            ),
            None,
        ));
    }
    Ok(())
}

pub fn compute_motion_parameters(
    start: GeoPoint,
    end: GeoPoint,
    config: &SimulationConfig,
) -> Result<MotionParameters, AppError> {
    validate_configuration(start, end, config)?;
    let refresh_interval = Duration::try_from_secs_f64(config.refresh_interval_seconds)
        .map_err(|error| {
            AppError::new(
                "INVALID_CONFIGURATION",
                format!("refresh interval is not representable: {error}"),
                None,
            )
        })?;
    if refresh_interval.is_zero() {
        return Err(AppError::new(
            "INVALID_CONFIGURATION",
            "refresh interval rounds down to zero",
            None,
        ));
    }

    let total_distance_meters = compute_distance(start, end);
    let effective_speed_kmph = config.effective_speed_kmph();
    let speed_meters_per_second = effective_speed_kmph / 3.6;
    let total_time_seconds = total_distance_meters / speed_meters_per_second;
    let step_count = total_time_seconds / config.refresh_interval_seconds;

    if step_count == 0.0 {
        tracing::debug!(
            total_distance_meters,
            "zero-length route, motion completes immediately"
        );
        return Ok(MotionParameters {
            start,
            end,
            total_distance_meters,
            effective_speed_kmph,
            total_time_seconds: 0.0,
            step_count: 0.0,
            lat_step_per_tick: 0.0,
            lng_step_per_tick: 0.0,
            refresh_interval,
        });
    }
    if !step_count.is_finite() || step_count > MAX_STEP_COUNT {
        return Err(AppError::new(
            "INVALID_CONFIGURATION",
            format!(
                "route would take {step_count} ticks, more than the supported {MAX_STEP_COUNT}"
            ),
            Some("raise the speed, the scale factor or the refresh interval".to_string()),
        ));
    }

    Ok(MotionParameters {
        start,
        end,
        total_distance_meters,
        effective_speed_kmph,
        total_time_seconds,
        step_count,
        lat_step_per_tick: (end.lat - start.lat) / step_count,
        lng_step_per_tick: (end.lng - start.lng) / step_count,
        refresh_interval,
    })
}

#[cfg(test)]
mod tests {
    use super::compute_motion_parameters;
    use crate::domain::models::{GeoPoint, SimulationConfig};
    use std::time::Duration;

    fn vessel_route() -> (GeoPoint, GeoPoint) {
        (GeoPoint::new(22.1696, 91.4996), GeoPoint::new(22.2637, 91.7159))
    }

    #[test]
    fn vessel_route_parameters() {
        let (start, end) = vessel_route();
        let params = compute_motion_parameters(start, end, &SimulationConfig::default()).unwrap();
        assert_eq!(params.effective_speed_kmph, 5000.0);
        assert!((params.total_distance_meters - 24_601.9).abs() < 0.5);
        assert!((params.total_time_seconds - 17.713).abs() < 0.01);
        assert!((params.step_count - 35.427).abs() < 0.01);
        assert_eq!(params.tick_count(), 36);
        assert_eq!(params.refresh_interval, Duration::from_millis(500));
    }

    #[test]
    fn step_count_applications_of_delta_reach_end() {
        let (start, end) = vessel_route();
        let params = compute_motion_parameters(start, end, &SimulationConfig::default()).unwrap();
        let lat = start.lat + params.lat_step_per_tick * params.step_count;
        let lng = start.lng + params.lng_step_per_tick * params.step_count;
        assert!((lat - end.lat).abs() < 1e-9);
        assert!((lng - end.lng).abs() < 1e-9);
    }

    #[test]
    fn planner_is_pure() {
        let (start, end) = vessel_route();
        let config = SimulationConfig::default();
        let first = compute_motion_parameters(start, end, &config).unwrap();
        let second = compute_motion_parameters(start, end, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn same_start_and_end_is_degenerate() {
        let (start, _) = vessel_route();
        let params = compute_motion_parameters(start, start, &SimulationConfig::default()).unwrap();
        assert!(params.is_degenerate());
        assert_eq!(params.tick_count(), 0);
        assert_eq!(params.lat_step_per_tick, 0.0);
        assert_eq!(params.lng_step_per_tick, 0.0);
        assert_eq!(params.planned_positions(), vec![start]);
    }

    #[test]
    fn planned_positions_end_exactly_at_destination() {
        let (start, end) = vessel_route();
        let params = compute_motion_parameters(start, end, &SimulationConfig::default()).unwrap();
        let positions = params.planned_positions();
        assert_eq!(positions.len(), 37);
        assert_eq!(positions[0], start);
        assert_eq!(*positions.last().unwrap(), end);
        for (step, point) in positions.iter().take(36).enumerate() {
            let expected_lat = start.lat + step as f64 * (end.lat - start.lat) / params.step_count;
            let expected_lng = start.lng + step as f64 * (end.lng - start.lng) / params.step_count;
            assert!((point.lat - expected_lat).abs() < 1e-9);
            assert!((point.lng - expected_lng).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_invalid_configuration() {
        let (start, end) = vessel_route();
        let cases = [
            SimulationConfig {
                speed_kmph: -1.0,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                speed_kmph: f64::NAN,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                speed_kmph: 0.0,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                refresh_interval_seconds: 0.0,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                refresh_interval_seconds: f64::INFINITY,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                speed_scale_factor: 0.0,
                ..SimulationConfig::default()
            },
        ];
        for config in cases {
            let error = compute_motion_parameters(start, end, &config).unwrap_err();
            assert_eq!(error.code, "INVALID_CONFIGURATION");
        }
    }

    #[test]
    fn rejects_routes_with_too_many_ticks() {
        let (start, end) = vessel_route();
        for speed_kmph in [1e-300, 1e-9, f64::MIN_POSITIVE] {
            let config = SimulationConfig {
                speed_kmph,
                ..SimulationConfig::default()
            };
            let error = compute_motion_parameters(start, end, &config).unwrap_err();
            assert_eq!(error.code, "INVALID_CONFIGURATION");
        }
    }

    #[test]
    fn rejects_refresh_interval_longer_than_a_day() {
        let (start, end) = vessel_route();
        let config = SimulationConfig {
            refresh_interval_seconds: 1e19,
            ..SimulationConfig::default()
        };
        let error = compute_motion_parameters(start, end, &config).unwrap_err();
        assert_eq!(error.code, "INVALID_CONFIGURATION");
    }

    #[test]
    fn rejects_out_of_range_endpoints() {
        let (start, _) = vessel_route();
        let error = compute_motion_parameters(
            start,
            GeoPoint::new(95.0, 10.0),
            &SimulationConfig::default(),
        )
        .unwrap_err();
        assert_eq!(error.code, "INVALID_CONFIGURATION");
    }
}
