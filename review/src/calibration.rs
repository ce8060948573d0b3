//! Two-click ruler calibration.
//!
//! The reviewer arms calibration and clicks both ends of a 10 cm reference
//! segment on the sheet. The second click fixes the millimeter-per-pixel
//! scale and disarms calibration.

#[cfg(test)]
#[path = "calibration_test.rs"]
mod calibration_test;

use crate::consts::CALIBRATION_REFERENCE_MM;
use crate::error::ReviewError;
use crate::geometry::Point;

/// Outcome of feeding one click to the calibrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    /// Calibration was not armed; the click was ignored.
    Ignored,
    /// The first point was recorded.
    FirstPoint(Point),
    /// The second point was recorded and a scale derived.
    Calibrated { mm_per_px: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct Calibration {
    armed: bool,
    points: Vec<Point>,
    mm_per_px: Option<f64>,
}

impl Calibration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm calibration and discard any partially collected points.
    ///
    /// A previously derived scale stays active until replaced.
    pub fn arm(&mut self) {
        self.armed = true;
        self.points.clear();
    }

    /// Disarm without deriving a scale.
    pub fn cancel(&mut self) {
        self.armed = false;
        self.points.clear();
    }

    /// Feed one canvas click.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::DegenerateCalibration`] when the second point
    /// coincides with the first. The collected points are cleared and
    /// calibration stays armed for another attempt.
    pub fn click(&mut self, pt: Point) -> Result<CalibrationStep, ReviewError> {
        if !self.armed {
            return Ok(CalibrationStep::Ignored);
        }
        self.points.push(pt);
        let [first, second] = self.points.as_slice() else {
            return Ok(CalibrationStep::FirstPoint(pt));
        };
        let distance = first.distance_to(*second);
        if distance <= f64::EPSILON {
            self.points.clear();
            return Err(ReviewError::DegenerateCalibration);
        }
        let mm_per_px = CALIBRATION_REFERENCE_MM / distance;
        self.mm_per_px = Some(mm_per_px);
        self.armed = false;
        Ok(CalibrationStep::Calibrated { mm_per_px })
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The active scale, once a calibration has completed.
    #[must_use]
    pub fn mm_per_px(&self) -> Option<f64> {
        self.mm_per_px
    }
}
