use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors arising from sampling-geometry construction or axis splitting.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("Number of grid points must be positive")]
    ZeroGpts,

    #[error("Sampling step must be positive and finite, got {0}")]
    InvalidSampling(f64),

    #[error("Cannot split an axis of {gpts} samples into {blocks} blocks")]
    InvalidPartition { gpts: usize, blocks: usize },
}

/// A value resolved per grid axis.
///
/// Grid parameters (`gpts`, `sampling`, `endpoint`) may be supplied as a
/// scalar broadcast to both axes or as an explicit per-axis pair. Callers
/// resolve the scalar-vs-pair choice once, at construction, through the
/// `From` conversions; everything downstream reads fully explicit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerAxis<T> {
    /// Value for the first (slow, x) axis.
    pub x: T,
    /// Value for the second (fast, y) axis.
    pub y: T,
}

impl<T> PerAxis<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Copy> From<T> for PerAxis<T> {
    fn from(value: T) -> Self {
        Self { x: value, y: value }
    }
}

impl<T> From<(T, T)> for PerAxis<T> {
    fn from((x, y): (T, T)) -> Self {
        Self { x, y }
    }
}

impl<T: Copy> From<[T; 2]> for PerAxis<T> {
    fn from([x, y]: [T; 2]) -> Self {
        Self { x, y }
    }
}

/// One sampled dimension of a line or grid scan.
///
/// An axis covers the interval from `start` to `end` with `gpts` equidistant
/// samples. The `endpoint` policy decides whether `end` itself is the last
/// sample (`spacing = (end - start) / (gpts - 1)`) or lies one step beyond
/// it (`spacing = (end - start) / gpts`), matching the two conventions of a
/// closed and a half-open sampled interval.
///
/// `gpts` and `sampling` are interconvertible; whichever the caller did not
/// supply is derived at construction so both can be read consistently
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingAxis {
    start: f64,
    end: f64,
    gpts: usize,
    sampling: f64,
    endpoint: bool,
}

impl SamplingAxis {
    /// Creates an axis from an explicit sample count.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ZeroGpts`] if `gpts` is zero.
    pub fn from_gpts(start: f64, end: f64, gpts: usize, endpoint: bool) -> Result<Self, GridError> {
        if gpts == 0 {
            return Err(GridError::ZeroGpts);
        }
        let sampling = spacing_for(start, end, gpts, endpoint);
        Ok(Self {
            start,
            end,
            gpts,
            sampling,
            endpoint,
        })
    }

    /// Creates an axis from a step size.
    ///
    /// The sample count is rounded to the nearest integer consistent with
    /// the endpoint policy; the stored step is then re-derived from that
    /// count so `gpts` and `sampling` agree exactly.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSampling`] if `sampling` is not a
    /// positive finite number, or [`GridError::ZeroGpts`] if the rounded
    /// sample count comes out to zero.
    pub fn from_sampling(
        start: f64,
        end: f64,
        sampling: f64,
        endpoint: bool,
    ) -> Result<Self, GridError> {
        if !sampling.is_finite() || sampling <= 0.0 {
            return Err(GridError::InvalidSampling(sampling));
        }
        let mut gpts = ((end - start) / sampling).round() as i64;
        if endpoint {
            gpts += 1;
        }
        if gpts < 1 {
            return Err(GridError::ZeroGpts);
        }
        Self::from_gpts(start, end, gpts as usize, endpoint)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Number of samples along the axis.
    pub fn gpts(&self) -> usize {
        self.gpts
    }

    /// Spacing between consecutive samples. Zero for a single-sample axis
    /// with `endpoint = true`.
    pub fn sampling(&self) -> f64 {
        self.sampling
    }

    /// Whether `end` itself is included as the last sample.
    pub fn endpoint(&self) -> bool {
        self.endpoint
    }

    /// Coordinate of the sample at `index`.
    ///
    /// Defined for any index; indices at or beyond `gpts` extrapolate past
    /// the sampled interval, which axis splitting uses to address the
    /// exclusive successor of a block's last sample.
    pub fn coordinate(&self, index: usize) -> f64 {
        self.start + index as f64 * self.sampling
    }

    /// All sample coordinates, in order.
    pub fn coordinates(&self) -> Vec<f64> {
        (0..self.gpts).map(|i| self.coordinate(i)).collect()
    }

    /// Splits the axis into `blocks` contiguous sub-axes covering the same
    /// samples.
    ///
    /// Block sizes differ by at most one, with the remainder going to the
    /// first blocks. Interior blocks end at the exclusive successor of
    /// their last sample and use `endpoint = false`, so their samples are
    /// exactly the parent's; the final block keeps the parent's `end` and
    /// `endpoint` so the true axis endpoint is honored either way.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidPartition`] if `blocks` is zero or
    /// exceeds `gpts` (some block would be empty).
    pub fn partition(&self, blocks: usize) -> Result<Vec<SamplingAxis>, GridError> {
        if blocks == 0 || blocks > self.gpts {
            return Err(GridError::InvalidPartition {
                gpts: self.gpts,
                blocks,
            });
        }

        let base = self.gpts / blocks;
        let remainder = self.gpts % blocks;

        let mut children = Vec::with_capacity(blocks);
        let mut first = 0;
        for block in 0..blocks {
            let count = base + usize::from(block < remainder);
            let is_last = block + 1 == blocks;
            let child = if is_last {
                Self::from_gpts(self.coordinate(first), self.end, count, self.endpoint)?
            } else {
                Self::from_gpts(
                    self.coordinate(first),
                    self.coordinate(first + count),
                    count,
                    false,
                )?
            };
            children.push(child);
            first += count;
        }
        Ok(children)
    }
}

fn spacing_for(start: f64, end: f64, gpts: usize, endpoint: bool) -> f64 {
    if endpoint {
        if gpts > 1 {
            (end - start) / (gpts - 1) as f64
        } else {
            0.0
        }
    } else {
        (end - start) / gpts as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn axis_with_endpoint_includes_end_as_last_sample() {
        let axis = SamplingAxis::from_gpts(0.0, 1.0, 5, true).unwrap();
        assert!(f64_approx_equal(axis.sampling(), 0.25));
        let coords = axis.coordinates();
        assert_eq!(coords.len(), 5);
        assert!(f64_approx_equal(coords[0], 0.0));
        assert!(f64_approx_equal(coords[4], 1.0));
    }

    #[test]
    fn axis_without_endpoint_stops_one_step_short_of_end() {
        let axis = SamplingAxis::from_gpts(0.0, 1.0, 5, false).unwrap();
        assert!(f64_approx_equal(axis.sampling(), 0.2));
        let coords = axis.coordinates();
        assert!(f64_approx_equal(coords[4], 0.8));
    }

    #[test]
    fn single_sample_axis_with_endpoint_has_zero_spacing() {
        let axis = SamplingAxis::from_gpts(1.5, 3.0, 1, true).unwrap();
        assert!(f64_approx_equal(axis.sampling(), 0.0));
        assert_eq!(axis.coordinates(), vec![1.5]);
    }

    #[test]
    fn zero_gpts_is_rejected() {
        assert_eq!(
            SamplingAxis::from_gpts(0.0, 1.0, 0, true),
            Err(GridError::ZeroGpts)
        );
    }

    #[test]
    fn from_sampling_derives_gpts_without_endpoint() {
        let axis = SamplingAxis::from_sampling(0.0, 2.0, 0.5, false).unwrap();
        assert_eq!(axis.gpts(), 4);
        assert!(f64_approx_equal(axis.sampling(), 0.5));
    }

    #[test]
    fn from_sampling_derives_gpts_with_endpoint() {
        let axis = SamplingAxis::from_sampling(0.0, 2.0, 0.5, true).unwrap();
        assert_eq!(axis.gpts(), 5);
        assert!(f64_approx_equal(axis.sampling(), 0.5));
    }

    #[test]
    fn from_sampling_rederives_step_from_rounded_gpts() {
        // 1.0 / 0.3 rounds to 3 samples, so the stored step becomes 1/3.
        let axis = SamplingAxis::from_sampling(0.0, 1.0, 0.3, false).unwrap();
        assert_eq!(axis.gpts(), 3);
        assert!(f64_approx_equal(axis.sampling(), 1.0 / 3.0));
    }

    #[test]
    fn from_sampling_rejects_non_positive_step() {
        assert_eq!(
            SamplingAxis::from_sampling(0.0, 1.0, 0.0, true),
            Err(GridError::InvalidSampling(0.0))
        );
        assert_eq!(
            SamplingAxis::from_sampling(0.0, 1.0, -0.5, false),
            Err(GridError::InvalidSampling(-0.5))
        );
    }

    #[test]
    fn from_sampling_on_empty_open_interval_is_rejected() {
        assert_eq!(
            SamplingAxis::from_sampling(1.0, 1.0, 0.5, false),
            Err(GridError::ZeroGpts)
        );
    }

    #[test]
    fn partition_distributes_remainder_to_first_blocks() {
        let axis = SamplingAxis::from_gpts(0.0, 10.0, 10, false).unwrap();
        let blocks = axis.partition(3).unwrap();
        let sizes: Vec<usize> = blocks.iter().map(|b| b.gpts()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn partition_union_reproduces_parent_samples_with_endpoint() {
        let axis = SamplingAxis::from_gpts(0.0, 2.0, 5, true).unwrap();
        let mut union: Vec<f64> = axis
            .partition(2)
            .unwrap()
            .iter()
            .flat_map(|b| b.coordinates())
            .collect();
        union.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let parent = axis.coordinates();
        assert_eq!(union.len(), parent.len());
        for (u, p) in union.iter().zip(parent.iter()) {
            assert!(f64_approx_equal(*u, *p));
        }
    }

    #[test]
    fn partition_union_reproduces_parent_samples_without_endpoint() {
        let axis = SamplingAxis::from_gpts(0.0, 2.0, 4, false).unwrap();
        let mut union: Vec<f64> = axis
            .partition(3)
            .unwrap()
            .iter()
            .flat_map(|b| b.coordinates())
            .collect();
        union.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let parent = axis.coordinates();
        assert_eq!(union.len(), parent.len());
        for (u, p) in union.iter().zip(parent.iter()) {
            assert!(f64_approx_equal(*u, *p));
        }
    }

    #[test]
    fn last_partition_block_inherits_parent_endpoint() {
        let axis = SamplingAxis::from_gpts(0.0, 2.0, 5, true).unwrap();
        let blocks = axis.partition(2).unwrap();
        assert!(!blocks[0].endpoint());
        assert!(blocks[1].endpoint());
        assert!(f64_approx_equal(blocks[1].end(), 2.0));
    }

    #[test]
    fn partition_rejects_zero_or_oversized_block_counts() {
        let axis = SamplingAxis::from_gpts(0.0, 1.0, 3, true).unwrap();
        assert_eq!(
            axis.partition(0),
            Err(GridError::InvalidPartition { gpts: 3, blocks: 0 })
        );
        assert_eq!(
            axis.partition(4),
            Err(GridError::InvalidPartition { gpts: 3, blocks: 4 })
        );
    }

    #[test]
    fn per_axis_broadcasts_scalars_and_accepts_pairs() {
        assert_eq!(PerAxis::from(5usize), PerAxis::new(5, 5));
        assert_eq!(PerAxis::from((2usize, 3usize)), PerAxis::new(2, 3));
        assert_eq!(PerAxis::from([0.5, 0.25]), PerAxis::new(0.5, 0.25));
    }
}
