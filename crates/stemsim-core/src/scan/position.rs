use super::{Scan, ScanError};
use nalgebra::Point2;
use std::ops::Range;

/// A scan over caller-supplied explicit probe positions.
///
/// The positions are kept verbatim, in the order given; the scan adds no
/// sampling rule of its own. Useful for irregular patterns (defect sites,
/// hand-picked probe locations) the line and grid scans cannot express.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionScan {
    positions: Vec<Point2<f64>>,
}

impl PositionScan {
    /// Creates a scan over the given positions.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EmptyPositions`] if `positions` is empty.
    pub fn new(positions: Vec<Point2<f64>>) -> Result<Self, ScanError> {
        if positions.is_empty() {
            return Err(ScanError::EmptyPositions);
        }
        Ok(Self { positions })
    }

    /// Convenience constructor from `(x, y)` coordinate pairs.
    pub fn from_coords(coords: &[[f64; 2]]) -> Result<Self, ScanError> {
        Self::new(coords.iter().map(|&[x, y]| Point2::new(x, y)).collect())
    }

    pub fn positions(&self) -> &[Point2<f64>] {
        &self.positions
    }
}

impl Scan for PositionScan {
    fn num_positions(&self) -> usize {
        self.positions.len()
    }

    fn positions_in(&self, indices: Range<usize>) -> Vec<Point2<f64>> {
        self.positions[indices].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_positions_are_rejected() {
        assert_eq!(PositionScan::new(Vec::new()), Err(ScanError::EmptyPositions));
    }

    #[test]
    fn first_batch_of_size_one_is_the_first_position() {
        let scan = PositionScan::from_coords(&[[2.0, 2.0], [1.0, 1.0]]).unwrap();
        let batch = scan.generate_positions(1).next().unwrap();
        assert_eq!(batch.indices, 0..1);
        assert_eq!(batch.positions, vec![Point2::new(2.0, 2.0)]);
    }

    #[test]
    fn batch_covering_everything_equals_the_input() {
        let scan = PositionScan::from_coords(&[[2.0, 2.0], [1.0, 1.0]]).unwrap();
        let batch = scan.generate_positions(2).next().unwrap();
        assert_eq!(batch.positions, scan.positions());

        // A batch size beyond the scan length behaves the same.
        let batch = scan.generate_positions(100).next().unwrap();
        assert_eq!(batch.positions, scan.positions());
    }

    #[test]
    fn batches_concatenate_to_the_eager_positions() {
        let scan =
            PositionScan::from_coords(&[[0.0, 0.0], [1.0, 0.5], [2.0, 1.0], [3.0, 1.5], [4.0, 2.0]])
                .unwrap();
        let concatenated: Vec<_> = scan
            .generate_positions(2)
            .flat_map(|batch| batch.positions)
            .collect();
        assert_eq!(concatenated, scan.get_positions());
    }

    #[test]
    fn generation_restarts_from_the_beginning_on_each_call() {
        let scan = PositionScan::from_coords(&[[2.0, 2.0], [1.0, 1.0]]).unwrap();
        let first = scan.generate_positions(1).next().unwrap();
        let again = scan.generate_positions(1).next().unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn batch_iterator_reports_its_length() {
        let scan =
            PositionScan::from_coords(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]])
                .unwrap();
        assert_eq!(scan.generate_positions(2).len(), 3);
        assert_eq!(scan.generate_positions(5).len(), 1);
    }

    #[test]
    fn measurement_shape_is_flat() {
        let scan = PositionScan::from_coords(&[[0.0, 0.0], [1.0, 1.0]]).unwrap();
        assert_eq!(scan.measurement_shape(), vec![2]);
    }
}
