//! # Scan Module
//!
//! Probe-position scan patterns: ordered sets of 2-D positions plus the
//! rule to generate them.
//!
//! ## Overview
//!
//! A scan is constructed once with immutable parameters and computes its
//! positions on demand, either eagerly ([`Scan::get_positions`]) or lazily
//! in bounded-size batches ([`Scan::generate_positions`]). Position ordering
//! is index-stable for the life of the scan, so measurements indexed by
//! position can be assembled out of order or across workers.
//!
//! ## Scan types
//!
//! - [`PositionScan`] - caller-supplied explicit coordinates, verbatim.
//! - [`LineScan`] - a 1-D sampling axis embedded along a segment in 2-D.
//! - [`GridScan`] - the row-major Cartesian product of two sampling axes;
//!   can be partitioned into self-contained child grids whose position sets
//!   exactly tile the parent's, for distributing work across independent
//!   sub-jobs.
//!
//! The subsystem is stateless computation over immutable parameters: no
//! shared mutable state, no locking, no I/O. Lazy generation is pull-based
//! and restartable; each call to `generate_positions` starts from index 0.

pub mod error;
mod grid;
mod line;
mod position;

pub use error::ScanError;
pub use grid::GridScan;
pub use line::LineScan;
pub use position::PositionScan;

use crate::core::calibration::Calibration;
use nalgebra::Point2;
use std::ops::Range;

/// Converts a caller-supplied coordinate slice into a 2-D point.
///
/// Scan endpoints must be exactly two coordinates; anything else is a
/// construction error.
pub(crate) fn coordinate_pair(values: &[f64]) -> Result<Point2<f64>, ScanError> {
    match *values {
        [x, y] => Ok(Point2::new(x, y)),
        _ => Err(ScanError::IncorrectShape),
    }
}

/// One batch of consecutive probe positions.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionBatch {
    /// Scan indices covered by this batch.
    pub indices: Range<usize>,
    /// Positions at those indices, in scan order.
    pub positions: Vec<Point2<f64>>,
}

/// An ordered, index-stable set of 2-D probe positions.
///
/// The eager accessor is defined in terms of the same range-read primitive
/// the lazy batches use, so every scan type implements its sampling rule
/// exactly once.
pub trait Scan {
    /// Total number of probe positions.
    fn num_positions(&self) -> usize;

    /// Positions at the given indices, in scan order.
    ///
    /// Callers must keep `indices` within `0..num_positions()`; the batch
    /// iterator and the eager accessor only ever pass in-bounds ranges.
    fn positions_in(&self, indices: Range<usize>) -> Vec<Point2<f64>>;

    /// Shape of a measurement buffer indexed by this scan.
    ///
    /// Detectors allocate their output from this; the default is flat,
    /// grid scans override it with their 2-D shape.
    fn measurement_shape(&self) -> Vec<usize> {
        vec![self.num_positions()]
    }

    /// Calibrations for the dimensions of `measurement_shape`, where the
    /// scan has a meaningful coordinate system. Empty for explicit
    /// position lists.
    fn calibrations(&self) -> Vec<Calibration> {
        Vec::new()
    }

    /// All positions, eagerly.
    fn get_positions(&self) -> Vec<Point2<f64>> {
        self.positions_in(0..self.num_positions())
    }

    /// Lazy, restartable iteration over batches of up to `batch_size`
    /// consecutive positions; the final batch may be shorter.
    fn generate_positions(&self, batch_size: usize) -> PositionBatches<'_>
    where
        Self: Sized,
    {
        PositionBatches::new(self, batch_size)
    }
}

/// Iterator over the batches of a scan.
///
/// Pull-based: positions for a batch are computed when the batch is
/// requested, and iteration simply stops being driven when the caller stops
/// requesting.
pub struct PositionBatches<'a> {
    scan: &'a dyn Scan,
    batch_size: usize,
    cursor: usize,
}

impl<'a> PositionBatches<'a> {
    /// A batch size of zero is treated as one.
    pub fn new(scan: &'a dyn Scan, batch_size: usize) -> Self {
        Self {
            scan,
            batch_size: batch_size.max(1),
            cursor: 0,
        }
    }
}

impl Iterator for PositionBatches<'_> {
    type Item = PositionBatch;

    fn next(&mut self) -> Option<PositionBatch> {
        let total = self.scan.num_positions();
        if self.cursor >= total {
            return None;
        }
        let end = total.min(self.cursor + self.batch_size);
        let indices = self.cursor..end;
        let positions = self.scan.positions_in(indices.clone());
        self.cursor = end;
        Some(PositionBatch { indices, positions })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.scan.num_positions().saturating_sub(self.cursor);
        let batches = remaining.div_ceil(self.batch_size);
        (batches, Some(batches))
    }
}

impl ExactSizeIterator for PositionBatches<'_> {}
