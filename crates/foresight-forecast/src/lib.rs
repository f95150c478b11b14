//! foresight-forecast — ordinary-least-squares trend projection.
//!
//! Fits value against sample index, converts the slope to per-second
//! units, and projects the last observation to the forecast horizon.
//! Deliberately a plain linear fit rather than a Kalman filter or
//! ARIMA: the forecast has to stay explainable when it is about to
//! trigger autonomous remediation.
//!
//! # Thin-data fallbacks
//!
//! ```text
//! []            → None                      (caller skips the metric)
//! [a] / [a, b]  → forecast = last, r2 = 0   (no spurious confidence)
//! [a, b, c, ..] → full OLS fit
//! ```

use foresight_core::ForecastResult;

/// Floor applied to sum-of-squares denominators so constant series do
/// not divide by zero.
const SS_FLOOR: f64 = 1e-6;

/// Fit a linear trend to `series` and project it `horizon_secs` ahead.
///
/// `series` is ordered oldest first with one value per `step_secs`.
/// Returns `None` for an empty series; a series with fewer than three
/// points yields the last value with zero slope and zero confidence.
pub fn fit(series: &[f64], horizon_secs: u64, step_secs: u64) -> Option<ForecastResult> {
    let last = *series.last()?;
    if series.len() < 3 {
        return Some(ForecastResult {
            forecast: last,
            slope_per_sec: 0.0,
            r2: 0.0,
        });
    }

    let n = series.len() as f64;
    let mean_x = (series.len() - 1) as f64 / 2.0;
    let mean_y = series.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in series.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    let slope = num / den.max(SS_FLOOR); // units per index
    let intercept = mean_y - slope * mean_x;

    let ss_tot = series
        .iter()
        .map(|y| (y - mean_y).powi(2))
        .sum::<f64>()
        .max(SS_FLOOR);
    let ss_res = series
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (intercept + slope * i as f64)).powi(2))
        .sum::<f64>();
    let r2 = 1.0 - ss_res / ss_tot;

    let step = step_secs.max(1) as f64;
    let horizon_idx = horizon_secs as f64 / step;

    Some(ForecastResult {
        forecast: last + slope * horizon_idx,
        slope_per_sec: slope / step,
        r2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_series_has_no_result() {
        assert_eq!(fit(&[], 180, 30), None);
    }

    #[test]
    fn single_point_falls_back_to_last_value() {
        let result = fit(&[42.0], 180, 30).unwrap();
        assert_eq!(result.forecast, 42.0);
        assert_eq!(result.slope_per_sec, 0.0);
        assert_eq!(result.r2, 0.0);
    }

    #[test]
    fn two_points_fall_back_to_last_value() {
        let result = fit(&[10.0, 500.0], 180, 30).unwrap();
        assert_eq!(result.forecast, 500.0);
        assert_eq!(result.slope_per_sec, 0.0);
        assert_eq!(result.r2, 0.0);
    }

    #[test]
    fn linear_ramp_projects_to_horizon() {
        // +10ms per 30s step, horizon 180s = 6 steps ahead of the last value.
        let series = [100.0, 110.0, 120.0, 130.0, 140.0];
        let result = fit(&series, 180, 30).unwrap();

        assert!(approx(result.forecast, 200.0), "forecast was {}", result.forecast);
        assert!(approx(result.slope_per_sec, 10.0 / 30.0));
        assert!(result.r2 > 0.999);
    }

    #[test]
    fn steep_ramp_matches_hand_computation() {
        // 200 → 2000 over 5 points: slope 450/step, forecast 2000 + 450*6.
        let series = [200.0, 650.0, 1100.0, 1550.0, 2000.0];
        let result = fit(&series, 180, 30).unwrap();

        assert!(approx(result.forecast, 4700.0), "forecast was {}", result.forecast);
        assert!(result.r2 > 0.999);
    }

    #[test]
    fn constant_series_does_not_divide_by_zero() {
        let series = [50.0; 8];
        let result = fit(&series, 180, 30).unwrap();

        assert!(approx(result.forecast, 50.0));
        assert!(approx(result.slope_per_sec, 0.0));
        assert!(result.r2.is_finite());
    }

    #[test]
    fn downward_trend_has_negative_slope() {
        let series = [500.0, 400.0, 300.0, 200.0, 100.0];
        let result = fit(&series, 180, 30).unwrap();

        assert!(result.slope_per_sec < 0.0);
        assert!(result.forecast < 100.0);
    }

    #[test]
    fn noisy_series_has_lower_fit_quality() {
        let clean = [100.0, 110.0, 120.0, 130.0, 140.0];
        let noisy = [100.0, 140.0, 95.0, 150.0, 120.0];

        let clean_r2 = fit(&clean, 180, 30).unwrap().r2;
        let noisy_r2 = fit(&noisy, 180, 30).unwrap().r2;

        assert!(noisy_r2 < clean_r2);
        assert!(noisy_r2 <= 1.0);
    }

    #[test]
    fn zero_step_is_clamped() {
        let series = [100.0, 110.0, 120.0];
        let result = fit(&series, 180, 0).unwrap();
        assert!(result.forecast.is_finite());
        assert!(result.slope_per_sec.is_finite());
    }
}
