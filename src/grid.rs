//! Hour-angle grid construction.
//!
//! Bounds the user leaves out are filled in from the limits the dynamic
//! scheduler considers for a source at the block's declination.

use crate::error::SweepError;

use tracing::info;

/// Declination (deg) at and above which the narrower HA window applies.
pub const NORTHERN_DEC_LIMIT_DEG: f64 = -5.0;

/// Most hour angles a single sweep may simulate.
pub const MAX_GRID_POINTS: usize = 1000;

/// Default HA bounds in hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaLimits {
    pub min: f64,
    pub max: f64,
}

impl HaLimits {
    pub const NORTHERN: HaLimits = HaLimits { min: -3.0, max: 2.0 };
    pub const SOUTHERN: HaLimits = HaLimits { min: -4.0, max: 3.0 };

    /// Limits for a source at `declination_deg`; without a declination the
    /// wider southern window is used.
    pub fn for_declination(declination_deg: Option<f64>) -> HaLimits {
        match declination_deg {
            Some(dec) if dec >= NORTHERN_DEC_LIMIT_DEG => HaLimits::NORTHERN,
            _ => HaLimits::SOUTHERN,
        }
    }
}

/// Check the user-supplied bounds and step.
pub fn validate_bounds(min_ha: Option<f64>, max_ha: Option<f64>, step: f64) -> Result<(), SweepError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(SweepError::invalid(format!(
            "HA step needs to be larger than 0 (got {step})"
        )));
    }
    for (name, bound) in [("min HA", min_ha), ("max HA", max_ha)] {
        if let Some(v) = bound {
            if !v.is_finite() {
                return Err(SweepError::invalid(format!("{name} must be finite (got {v})")));
            }
        }
    }
    if let (Some(min), Some(max)) = (min_ha, max_ha) {
        if min >= max {
            return Err(SweepError::invalid(format!(
                "min HA ({min}) needs to be smaller than max HA ({max})"
            )));
        }
    }

    // Widest window any declination can resolve to.
    let min = min_ha.unwrap_or(HaLimits::SOUTHERN.min.min(HaLimits::NORTHERN.min));
    let max = max_ha.unwrap_or(HaLimits::SOUTHERN.max.max(HaLimits::NORTHERN.max));
    let points = ((max - min).max(0.0) / step).floor() + 1.0;
    if points > MAX_GRID_POINTS as f64 {
        return Err(SweepError::invalid(format!(
            "HA step {step} gives more than {MAX_GRID_POINTS} hour angles between {min} and {max}"
        )));
    }
    Ok(())
}

/// Build the ordered list of HA offsets (hours) to simulate.
///
/// Element k is `min + k * step`; growth stops at the first candidate that
/// exceeds the resolved max, so max itself is only included when it lies an
/// exact number of steps from min.
pub fn build_grid(
    min_ha: Option<f64>,
    max_ha: Option<f64>,
    step: f64,
    declination_deg: Option<f64>,
) -> Result<Vec<f64>, SweepError> {
    validate_bounds(min_ha, max_ha, step)?;

    let limits = HaLimits::for_declination(declination_deg);
    let min = match min_ha {
        Some(v) => {
            info!(min_ha = v, "using user-provided min HA");
            v
        }
        None => {
            info!(min_ha = limits.min, "no min HA provided, adopting the scheduler default");
            limits.min
        }
    };
    let max = match max_ha {
        Some(v) => {
            info!(max_ha = v, "using user-provided max HA");
            v
        }
        None => {
            info!(max_ha = limits.max, "no max HA provided, adopting the scheduler default");
            limits.max
        }
    };
    info!(step, "HA step");

    let mut grid = vec![min];
    let mut k = 1u32;
    loop {
        let next = min + f64::from(k) * step;
        if next > max {
            break;
        }
        grid.push(next);
        k += 1;
    }
    Ok(grid)
}

/// Render an HA with an explicit sign, e.g. `+2.5` or `-3`.
pub fn signed_ha(ha: f64) -> String {
    format!("{:+}", ha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_bounds_include_exact_max() {
        let grid = build_grid(Some(-2.0), Some(1.0), 1.0, None).unwrap();
        assert_eq!(grid, vec![-2.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn max_not_on_step_is_skipped() {
        let grid = build_grid(Some(-1.0), Some(0.9), 0.5, None).unwrap();
        assert_eq!(grid, vec![-1.0, -0.5, 0.0, 0.5]);
    }

    #[test]
    fn grid_properties_hold_for_several_inputs() {
        let cases = [(-4.0, 3.0, 1.0), (-3.0, 2.0, 0.5), (-1.5, 1.0, 0.75), (0.0, 0.25, 0.25)];
        for (min, max, step) in cases {
            let grid = build_grid(Some(min), Some(max), step, Some(10.0)).unwrap();
            assert!(!grid.is_empty());
            assert_eq!(grid[0], min);
            for pair in grid.windows(2) {
                assert!(pair[1] > pair[0]);
                assert!((pair[1] - pair[0] - step).abs() < 1e-12);
            }
            let last = *grid.last().unwrap();
            assert!(last <= max);
            assert!(max < last + step);
        }
    }

    #[test]
    fn declination_defaults() {
        assert_eq!(HaLimits::for_declination(Some(-5.0)), HaLimits::NORTHERN);
        assert_eq!(HaLimits::for_declination(Some(20.0)), HaLimits::NORTHERN);
        assert_eq!(HaLimits::for_declination(Some(-5.01)), HaLimits::SOUTHERN);
        assert_eq!(HaLimits::for_declination(None), HaLimits::SOUTHERN);

        let grid = build_grid(None, None, 1.0, Some(-5.0)).unwrap();
        assert_eq!(grid, vec![-3.0, -2.0, -1.0, 0.0, 1.0, 2.0]);
        let grid = build_grid(None, None, 1.0, Some(-60.0)).unwrap();
        assert_eq!(grid, vec![-4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn single_bound_mixes_with_default() {
        let grid = build_grid(Some(1.0), None, 1.0, Some(0.0)).unwrap();
        assert_eq!(grid, vec![1.0, 2.0]);
        // A user min beyond the default max still yields the min itself.
        let grid = build_grid(Some(5.0), None, 1.0, Some(0.0)).unwrap();
        assert_eq!(grid, vec![5.0]);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(
            build_grid(Some(1.0), Some(1.0), 1.0, None),
            Err(SweepError::InvalidArguments(_))
        ));
        assert!(matches!(
            build_grid(Some(2.0), Some(1.0), 1.0, None),
            Err(SweepError::InvalidArguments(_))
        ));
        assert!(build_grid(None, None, 0.0, None).is_err());
        assert!(build_grid(None, None, -1.0, None).is_err());
        assert!(build_grid(None, None, f64::NAN, None).is_err());
    }

    #[test]
    fn tiny_step_is_rejected() {
        assert!(matches!(
            build_grid(None, None, 1e-12, Some(0.0)),
            Err(SweepError::InvalidArguments(_))
        ));
        assert!(validate_bounds(Some(-1.0), None, 1e-9).is_err());
        let grid = build_grid(Some(0.0), Some(499.5), 0.5, None).unwrap();
        assert_eq!(grid.len(), MAX_GRID_POINTS);
        assert!(build_grid(Some(0.0), Some(500.0), 0.5, None).is_err());
    }

    #[test]
    fn signed_ha_always_has_sign() {
        assert_eq!(signed_ha(2.5), "+2.5");
        assert_eq!(signed_ha(-2.5), "-2.5");
        assert_eq!(signed_ha(-3.0), "-3");
        assert_eq!(signed_ha(0.0), "+0");
    }
}
