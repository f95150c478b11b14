//! Breach probability and forecast fusion.

/// Latency thresholds the probability is interpolated between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Soft SLO threshold: probability 0 at or below.
    pub soft: f64,
    /// Hard ceiling (real timeout): probability 1 at or above.
    pub hard: f64,
}

/// Normalized breach probability for an effective forecast.
///
/// Exactly 0 at or below the soft threshold, exactly 1 at or above the
/// hard ceiling, linear in between. The denominator is floored at 1.0
/// so a degenerate `soft == hard` configuration cannot divide by zero.
pub fn breach_probability(effective: f64, thresholds: Thresholds) -> f64 {
    if effective <= thresholds.soft {
        0.0
    } else if effective >= thresholds.hard {
        1.0
    } else {
        (effective - thresholds.soft) / (thresholds.hard - thresholds.soft).max(1.0)
    }
}

/// Fuse the long-window forecast with more reactive signals.
///
/// Takes the minimum of the long-window trend forecast, the
/// short-window trend forecast, and — only while the post-mitigation
/// blend window is open — the instantly observed fast-window sample.
/// The minimum is a deliberate conservative bias: a confirmed recovery
/// shrinks the effective forecast immediately instead of waiting for
/// the long window to decay, preventing repeat mitigations.
pub fn effective_forecast(
    long: f64,
    short: Option<f64>,
    fast_observed: Option<f64>,
    in_blend_window: bool,
) -> f64 {
    let mut effective = long;
    if let Some(s) = short {
        effective = effective.min(s);
    }
    if in_blend_window
        && let Some(f) = fast_observed
    {
        effective = effective.min(f);
    }
    effective
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLO: Thresholds = Thresholds {
        soft: 300.0,
        hard: 5000.0,
    };

    #[test]
    fn zero_at_or_below_soft() {
        assert_eq!(breach_probability(0.0, SLO), 0.0);
        assert_eq!(breach_probability(299.9, SLO), 0.0);
        assert_eq!(breach_probability(300.0, SLO), 0.0);
    }

    #[test]
    fn one_at_or_above_hard() {
        assert_eq!(breach_probability(5000.0, SLO), 1.0);
        assert_eq!(breach_probability(99999.0, SLO), 1.0);
    }

    #[test]
    fn linear_in_between() {
        // (3500 - 300) / 4700 ≈ 0.6808
        let p = breach_probability(3500.0, SLO);
        assert!((p - 0.6808).abs() < 0.001, "p was {p}");

        let mid = breach_probability(2650.0, SLO);
        assert!((mid - 0.5).abs() < 0.001);
    }

    #[test]
    fn monotonically_non_decreasing() {
        let mut prev = 0.0;
        for step in 0..200 {
            let eff = step as f64 * 30.0;
            let p = breach_probability(eff, SLO);
            assert!(p >= prev, "probability decreased at eff={eff}");
            assert!((0.0..=1.0).contains(&p));
            prev = p;
        }
    }

    #[test]
    fn degenerate_thresholds_do_not_divide_by_zero() {
        let t = Thresholds {
            soft: 300.0,
            hard: 300.0,
        };
        let p = breach_probability(300.0000001, t);
        assert!(p.is_finite());
    }

    #[test]
    fn effective_is_long_forecast_alone() {
        assert_eq!(effective_forecast(1000.0, None, None, false), 1000.0);
    }

    #[test]
    fn short_forecast_lowers_effective() {
        assert_eq!(effective_forecast(1000.0, Some(400.0), None, false), 400.0);
        // Higher short forecast never raises it.
        assert_eq!(effective_forecast(1000.0, Some(2000.0), None, false), 1000.0);
    }

    #[test]
    fn fast_sample_blends_only_inside_window() {
        assert_eq!(
            effective_forecast(1000.0, Some(800.0), Some(150.0), true),
            150.0
        );
        assert_eq!(
            effective_forecast(1000.0, Some(800.0), Some(150.0), false),
            800.0
        );
    }
}
