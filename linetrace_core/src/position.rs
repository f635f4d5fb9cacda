//! Weighted-centroid line position with lost-line fallback.
//!
//! Sensor `i` sits at position `i * 1000`, so an array of `N` sensors spans
//! `0..=(N-1)*1000`. Calibrated values above the noise threshold pull the
//! centroid toward their sensor; a value above the detect threshold is needed
//! to call the line present at all. When nothing clears the detect threshold
//! the line is reported at the edge it was last seen nearer to.

use tracing::{debug, trace};

use crate::config::{EstimatorCfg, POSITION_SCALE};

/// Edge the line left the array from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LostSide {
    Left,
    Right,
}

/// Outcome of one estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePosition {
    /// Line under the array at this centroid.
    Tracking(u16),
    /// No sensor above the detect threshold; `position` is the edge reported.
    Lost { side: LostSide, position: u16 },
}

impl LinePosition {
    /// Scalar position in `0..=(N-1)*1000`.
    #[inline]
    pub fn value(self) -> u16 {
        match self {
            Self::Tracking(p) | Self::Lost { position: p, .. } => p,
        }
    }

    #[inline]
    pub fn is_lost(self) -> bool {
        matches!(self, Self::Lost { .. })
    }
}

#[derive(Debug, Clone)]
pub struct PositionEstimator {
    sensor_count: u8,
    cfg: EstimatorCfg,
    last_position: u16,
}

impl PositionEstimator {
    pub fn new(sensor_count: u8, cfg: EstimatorCfg) -> Self {
        debug_assert!(cfg.detect_threshold > cfg.noise_threshold);
        Self {
            sensor_count,
            cfg,
            last_position: 0,
        }
    }

    /// Most recent tracked centroid; 0 until the line is first seen.
    #[inline]
    pub fn last_position(&self) -> u16 {
        self.last_position
    }

    pub fn cfg(&self) -> EstimatorCfg {
        self.cfg
    }

    /// Rightmost position, `(N-1) * 1000`.
    #[inline]
    pub fn max_position(&self) -> u16 {
        (u32::from(self.sensor_count.saturating_sub(1)) * POSITION_SCALE) as u16
    }

    /// Estimate the line position from calibrated values in sensor order.
    ///
    /// Updates `last_position` only when the line is detected.
    pub fn estimate(&mut self, calibrated: &[u16]) -> LinePosition {
        let mut on_line = false;
        // Worst case 16 sensors * 1000 * 15000 stays well inside u32.
        let mut weighted: u32 = 0;
        let mut total: u32 = 0;

        for (i, &value) in calibrated.iter().enumerate() {
            if value > self.cfg.detect_threshold {
                on_line = true;
            }
            if value > self.cfg.noise_threshold {
                weighted += u32::from(value) * (i as u32 * POSITION_SCALE);
                total += u32::from(value);
            }
        }

        if !on_line {
            let max = self.max_position();
            let side = if self.last_position <= max / 2 {
                LostSide::Left
            } else {
                LostSide::Right
            };
            let position = match side {
                LostSide::Left => 0,
                LostSide::Right => max,
            };
            debug!(?side, last_position = self.last_position, "line lost");
            return LinePosition::Lost { side, position };
        }

        // detect_threshold > noise_threshold, so the detecting sensor is in `total`.
        let position = (weighted / total) as u16;
        self.last_position = position;
        trace!(position, "line tracked");
        LinePosition::Tracking(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator(n: u8) -> PositionEstimator {
        PositionEstimator::new(n, EstimatorCfg::default())
    }

    #[test]
    fn single_sensor_peak_lands_on_its_index() {
        let mut est = estimator(3);
        assert_eq!(est.estimate(&[0, 1000, 0]), LinePosition::Tracking(1000));
        assert_eq!(est.last_position(), 1000);
    }

    #[test]
    fn centroid_between_two_sensors() {
        let mut est = estimator(4);
        // (500*1000 + 500*2000) / 1000 = 1500
        assert_eq!(est.estimate(&[0, 500, 500, 0]).value(), 1500);
    }

    #[test]
    fn values_at_noise_threshold_are_ignored() {
        let mut est = estimator(3);
        // Sensor 0 at exactly 50 does not contribute.
        assert_eq!(est.estimate(&[50, 0, 300]).value(), 2000);
        // Sensor 0 at 51 does: (51*0 + 300*2000) / 351 = 1709
        assert_eq!(est.estimate(&[51, 0, 300]).value(), 1709);
    }

    #[test]
    fn below_detect_threshold_is_lost_even_with_signal() {
        let mut est = estimator(3);
        est.estimate(&[0, 0, 900]);
        let got = est.estimate(&[0, 200, 150]);
        assert_eq!(
            got,
            LinePosition::Lost {
                side: LostSide::Right,
                position: 2000
            }
        );
        assert_eq!(est.last_position(), 2000);
    }

    #[test]
    fn lost_before_any_detection_reports_left() {
        let mut est = estimator(8);
        assert_eq!(est.estimate(&[0; 8]).value(), 0);
    }

    #[test]
    fn lost_exactly_at_midpoint_reports_left() {
        let mut est = estimator(8);
        // Two equal peaks centre on 3500, the array midpoint.
        assert_eq!(est.estimate(&[0, 0, 0, 1000, 1000, 0, 0, 0]).value(), 3500);
        assert!(est.estimate(&[0; 8]).is_lost());
        assert_eq!(est.estimate(&[0; 8]).value(), 0);
    }

    #[test]
    fn single_sensor_array() {
        let mut est = estimator(1);
        assert_eq!(est.max_position(), 0);
        assert_eq!(est.estimate(&[900]).value(), 0);
        assert_eq!(est.estimate(&[0]).value(), 0);
    }
}
