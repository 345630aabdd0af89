use super::{Scan, ScanError, coordinate_pair};
use crate::core::calibration::Calibration;
use crate::core::grid::{PerAxis, SamplingAxis};
use nalgebra::Point2;
use std::ops::Range;
use tracing::instrument;

/// A raster scan over the Cartesian product of two sampling axes.
///
/// Positions are ordered row-major with the second axis fastest: position
/// index `i` maps to axis indices `(i / gpts.y, i % gpts.y)`. The axes are
/// built from componentwise `start`/`end` bounds and broadcastable
/// `gpts`/`sampling`/`endpoint` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GridScan {
    x: SamplingAxis,
    y: SamplingAxis,
}

impl GridScan {
    /// Creates a grid scan with explicit position counts per axis.
    ///
    /// `start` and `end` must each be exactly two coordinates; `gpts` and
    /// `endpoint` accept a scalar (broadcast to both axes) or a per-axis
    /// pair.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::IncorrectShape`] for malformed endpoints, or a
    /// grid error if a position count is zero.
    pub fn with_gpts(
        start: &[f64],
        end: &[f64],
        gpts: impl Into<PerAxis<usize>>,
        endpoint: impl Into<PerAxis<bool>>,
    ) -> Result<Self, ScanError> {
        let start = coordinate_pair(start)?;
        let end = coordinate_pair(end)?;
        let gpts = gpts.into();
        let endpoint = endpoint.into();
        Ok(Self {
            x: SamplingAxis::from_gpts(start.x, end.x, gpts.x, endpoint.x)?,
            y: SamplingAxis::from_gpts(start.y, end.y, gpts.y, endpoint.y)?,
        })
    }

    /// Creates a grid scan with step sizes per axis, deriving the position
    /// counts from the axis extents.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::IncorrectShape`] for malformed endpoints, or a
    /// grid error for a non-positive step or a step that rounds to zero
    /// positions on an axis.
    pub fn with_sampling(
        start: &[f64],
        end: &[f64],
        sampling: impl Into<PerAxis<f64>>,
        endpoint: impl Into<PerAxis<bool>>,
    ) -> Result<Self, ScanError> {
        let start = coordinate_pair(start)?;
        let end = coordinate_pair(end)?;
        let sampling = sampling.into();
        let endpoint = endpoint.into();
        Ok(Self {
            x: SamplingAxis::from_sampling(start.x, end.x, sampling.x, endpoint.x)?,
            y: SamplingAxis::from_sampling(start.y, end.y, sampling.y, endpoint.y)?,
        })
    }

    pub fn start(&self) -> Point2<f64> {
        Point2::new(self.x.start(), self.y.start())
    }

    pub fn end(&self) -> Point2<f64> {
        Point2::new(self.x.end(), self.y.end())
    }

    /// Position counts per axis.
    pub fn gpts(&self) -> PerAxis<usize> {
        PerAxis::new(self.x.gpts(), self.y.gpts())
    }

    /// Derived spacing per axis.
    pub fn sampling(&self) -> PerAxis<f64> {
        PerAxis::new(self.x.sampling(), self.y.sampling())
    }

    pub fn endpoint(&self) -> PerAxis<bool> {
        PerAxis::new(self.x.endpoint(), self.y.endpoint())
    }

    pub fn axes(&self) -> (&SamplingAxis, &SamplingAxis) {
        (&self.x, &self.y)
    }

    /// Splits the scan into `partitions.0 × partitions.1` child grid scans
    /// whose position sets exactly tile this scan's, with no duplication
    /// and no omission.
    ///
    /// Each axis's index range is split into contiguous blocks whose sizes
    /// differ by at most one (remainder to the first blocks); interior
    /// blocks end at the exclusive successor of their last sample while the
    /// last block per axis keeps the parent's endpoint, so the tiling holds
    /// for either endpoint policy. Children are returned row-major over
    /// block pairs, consistent with position ordering, and are fully
    /// self-contained: they hold no reference to the parent and can be
    /// driven as independent sub-jobs whose results reassemble
    /// index-for-index.
    ///
    /// # Errors
    ///
    /// Returns a grid error if a block count is zero or exceeds the axis's
    /// position count.
    #[instrument(level = "debug", skip(self), fields(gpts = ?self.gpts()))]
    pub fn partition_scan(&self, partitions: (usize, usize)) -> Result<Vec<GridScan>, ScanError> {
        let blocks_x = self.x.partition(partitions.0)?;
        let blocks_y = self.y.partition(partitions.1)?;

        let mut scans = Vec::with_capacity(blocks_x.len() * blocks_y.len());
        for x in &blocks_x {
            for y in &blocks_y {
                scans.push(GridScan { x: *x, y: *y });
            }
        }
        tracing::debug!(children = scans.len(), "partitioned grid scan");
        Ok(scans)
    }
}

impl Scan for GridScan {
    fn num_positions(&self) -> usize {
        self.x.gpts() * self.y.gpts()
    }

    fn positions_in(&self, indices: Range<usize>) -> Vec<Point2<f64>> {
        let ny = self.y.gpts();
        indices
            .map(|i| Point2::new(self.x.coordinate(i / ny), self.y.coordinate(i % ny)))
            .collect()
    }

    fn measurement_shape(&self) -> Vec<usize> {
        vec![self.x.gpts(), self.y.gpts()]
    }

    fn calibrations(&self) -> Vec<Calibration> {
        vec![
            Calibration::new("x", "Å", self.x.start(), self.x.sampling()),
            Calibration::new("y", "Å", self.y.start(), self.y.sampling()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::GridError;

    const TOLERANCE: f64 = 1e-12;

    fn point_approx_equal(p: Point2<f64>, x: f64, y: f64) -> bool {
        (p.x - x).abs() < TOLERANCE && (p.y - y).abs() < TOLERANCE
    }

    /// Asserts two position sets are equal up to ordering.
    fn assert_same_position_set(a: &[Point2<f64>], b: &[Point2<f64>]) {
        assert_eq!(a.len(), b.len());
        for p in a {
            assert!(
                b.iter().any(|q| (p - q).norm_squared() < TOLERANCE),
                "position {p:?} missing from the other set"
            );
        }
        for q in b {
            assert!(
                a.iter().any(|p| (p - q).norm_squared() < TOLERANCE),
                "position {q:?} missing from the other set"
            );
        }
    }

    #[test]
    fn scalar_endpoints_are_rejected_with_the_contract_message() {
        let err = GridScan::with_gpts(&[0.0], &[1.0], 5, true).unwrap_err();
        assert_eq!(err.to_string(), "Scan start/end has incorrect shape");
        assert_eq!(err, ScanError::IncorrectShape);
    }

    #[test]
    fn positions_are_row_major_with_the_second_axis_fastest() {
        let scan = GridScan::with_gpts(&[0.0, 0.0], &[1.0, 2.0], 5, true).unwrap();
        let positions = scan.get_positions();

        assert_eq!(positions.len(), 25);
        assert!(point_approx_equal(positions[0], 0.0, 0.0));
        assert!(point_approx_equal(positions[24], 1.0, 2.0));
        // Index 4 is the last position of the first row: x still at start,
        // y at the end of its axis.
        assert!(point_approx_equal(positions[4], 0.0, 2.0));
    }

    #[test]
    fn consecutive_positions_within_a_row_step_by_the_fast_axis_sampling() {
        let scan = GridScan::with_gpts(&[0.0, 0.0], &[1.0, 2.0], 5, true).unwrap();
        let positions = scan.get_positions();
        for pair in positions[..5].windows(2) {
            assert!(((pair[1] - pair[0]).norm() - scan.sampling().y).abs() < TOLERANCE);
        }
    }

    #[test]
    fn open_endpoint_grid_stops_one_step_short_on_both_axes() {
        let scan = GridScan::with_gpts(&[0.0, 0.0], &[1.0, 2.0], 5, false).unwrap();
        let positions = scan.get_positions();
        assert!(point_approx_equal(positions[0], 0.0, 0.0));
        assert!(point_approx_equal(
            positions[24],
            1.0 - 1.0 / 5.0,
            2.0 - 2.0 / 5.0
        ));
    }

    #[test]
    fn per_axis_parameters_resolve_independently() {
        let scan = GridScan::with_gpts(&[0.0, 0.0], &[1.0, 2.0], (2, 4), (true, false)).unwrap();
        assert_eq!(scan.gpts(), PerAxis::new(2, 4));
        assert!((scan.sampling().x - 1.0).abs() < TOLERANCE);
        assert!((scan.sampling().y - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn sampling_constructor_derives_counts_per_axis() {
        let scan = GridScan::with_sampling(&[0.0, 0.0], &[2.0, 2.0], 0.5, false).unwrap();
        assert_eq!(scan.gpts(), PerAxis::new(4, 4));
        assert_eq!(scan.num_positions(), 16);
    }

    #[test]
    fn measurement_shape_is_the_grid_shape() {
        let scan = GridScan::with_gpts(&[0.0, 0.0], &[1.0, 2.0], (3, 7), true).unwrap();
        assert_eq!(scan.measurement_shape(), vec![3, 7]);
    }

    #[test]
    fn calibrations_carry_the_axis_offsets_and_steps() {
        let scan = GridScan::with_gpts(&[1.0, -1.0], &[2.0, 1.0], 5, true).unwrap();
        let calibrations = scan.calibrations();
        assert_eq!(calibrations.len(), 2);
        assert!((calibrations[0].offset - 1.0).abs() < TOLERANCE);
        assert!((calibrations[1].offset + 1.0).abs() < TOLERANCE);
        assert!((calibrations[1].sampling - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn batches_concatenate_to_the_eager_positions() {
        let scan = GridScan::with_gpts(&[0.0, 0.0], &[1.0, 1.0], (3, 4), true).unwrap();
        let concatenated: Vec<_> = scan
            .generate_positions(5)
            .flat_map(|batch| batch.positions)
            .collect();
        assert_eq!(concatenated, scan.get_positions());
    }

    #[test]
    fn partition_tiles_the_parent_without_endpoint() {
        let parent = GridScan::with_sampling(&[0.0, 0.0], &[2.0, 2.0], 0.5, false).unwrap();
        let children = parent.partition_scan((2, 2)).unwrap();
        assert_eq!(children.len(), 4);

        let union: Vec<_> = children
            .iter()
            .flat_map(|child| child.get_positions())
            .collect();
        assert_same_position_set(&union, &parent.get_positions());
    }

    #[test]
    fn partition_tiles_the_parent_with_endpoint() {
        let parent = GridScan::with_sampling(&[0.0, 0.0], &[2.0, 2.0], 0.5, true).unwrap();
        let children = parent.partition_scan((2, 2)).unwrap();

        let union: Vec<_> = children
            .iter()
            .flat_map(|child| child.get_positions())
            .collect();
        assert_same_position_set(&union, &parent.get_positions());
    }

    #[test]
    fn partition_tiles_an_uneven_split() {
        let parent = GridScan::with_gpts(&[0.0, 0.0], &[1.0, 3.0], (5, 7), true).unwrap();
        let children = parent.partition_scan((2, 3)).unwrap();
        assert_eq!(children.len(), 6);

        // Remainders go to the first blocks on each axis.
        assert_eq!(children[0].gpts(), PerAxis::new(3, 3));
        assert_eq!(children[5].gpts(), PerAxis::new(2, 2));

        let union: Vec<_> = children
            .iter()
            .flat_map(|child| child.get_positions())
            .collect();
        assert_same_position_set(&union, &parent.get_positions());
    }

    #[test]
    fn only_the_last_child_per_axis_keeps_the_parent_endpoint() {
        let parent = GridScan::with_gpts(&[0.0, 0.0], &[2.0, 2.0], 4, true).unwrap();
        let children = parent.partition_scan((2, 2)).unwrap();

        assert_eq!(children[0].endpoint(), PerAxis::new(false, false));
        assert_eq!(children[1].endpoint(), PerAxis::new(false, true));
        assert_eq!(children[2].endpoint(), PerAxis::new(true, false));
        assert_eq!(children[3].endpoint(), PerAxis::new(true, true));
        assert!(point_approx_equal(children[3].end(), 2.0, 2.0));
    }

    #[test]
    fn partition_rejects_invalid_block_counts() {
        let parent = GridScan::with_gpts(&[0.0, 0.0], &[1.0, 1.0], 3, true).unwrap();
        assert_eq!(
            parent.partition_scan((0, 1)),
            Err(ScanError::Grid(GridError::InvalidPartition {
                gpts: 3,
                blocks: 0
            }))
        );
        assert_eq!(
            parent.partition_scan((1, 4)),
            Err(ScanError::Grid(GridError::InvalidPartition {
                gpts: 3,
                blocks: 4
            }))
        );
    }
}
