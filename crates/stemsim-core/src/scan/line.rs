use super::{Scan, ScanError, coordinate_pair};
use crate::core::calibration::Calibration;
use crate::core::grid::SamplingAxis;
use nalgebra::{Point2, Vector2};
use std::ops::Range;

/// A scan along the straight segment from `start` to `end`.
///
/// One [`SamplingAxis`] spans the segment length, so consecutive positions
/// are equidistant and the spacing follows the axis's endpoint rule. A
/// degenerate segment (`start == end`) produces every position at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineScan {
    start: Point2<f64>,
    end: Point2<f64>,
    axis: SamplingAxis,
}

impl LineScan {
    /// Creates a line scan with an explicit number of positions.
    ///
    /// `start` and `end` must each be exactly two coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::IncorrectShape`] for malformed endpoints, or a
    /// grid error if `gpts` is zero.
    pub fn with_gpts(
        start: &[f64],
        end: &[f64],
        gpts: usize,
        endpoint: bool,
    ) -> Result<Self, ScanError> {
        let start = coordinate_pair(start)?;
        let end = coordinate_pair(end)?;
        let axis = SamplingAxis::from_gpts(0.0, (end - start).norm(), gpts, endpoint)?;
        Ok(Self { start, end, axis })
    }

    /// Creates a line scan with a step size between positions, deriving the
    /// number of positions from the segment length.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::IncorrectShape`] for malformed endpoints, or a
    /// grid error for a non-positive step or a step that rounds to zero
    /// positions.
    pub fn with_sampling(
        start: &[f64],
        end: &[f64],
        sampling: f64,
        endpoint: bool,
    ) -> Result<Self, ScanError> {
        let start = coordinate_pair(start)?;
        let end = coordinate_pair(end)?;
        let axis = SamplingAxis::from_sampling(0.0, (end - start).norm(), sampling, endpoint)?;
        Ok(Self { start, end, axis })
    }

    pub fn start(&self) -> Point2<f64> {
        self.start
    }

    pub fn end(&self) -> Point2<f64> {
        self.end
    }

    pub fn gpts(&self) -> usize {
        self.axis.gpts()
    }

    /// Euclidean distance between consecutive positions.
    pub fn sampling(&self) -> f64 {
        self.axis.sampling()
    }

    pub fn endpoint(&self) -> bool {
        self.axis.endpoint()
    }

    /// Length of the scanned segment.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    fn direction(&self) -> Vector2<f64> {
        let segment = self.end - self.start;
        let length = segment.norm();
        if length > 0.0 {
            segment / length
        } else {
            Vector2::zeros()
        }
    }
}

impl Scan for LineScan {
    fn num_positions(&self) -> usize {
        self.axis.gpts()
    }

    fn positions_in(&self, indices: Range<usize>) -> Vec<Point2<f64>> {
        let direction = self.direction();
        indices
            .map(|i| self.start + direction * self.axis.coordinate(i))
            .collect()
    }

    fn calibrations(&self) -> Vec<Calibration> {
        vec![Calibration::new("x", "Å", 0.0, self.axis.sampling())]
    }
}
