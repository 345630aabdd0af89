use serde::{Deserialize, Serialize};

/// Calibration of one dimension of a measurement or image.
///
/// Detectors size their output buffers from a scan's measurement shape and
/// attach one `Calibration` per dimension so downstream consumers (plotting
/// front-ends, analysis code) can map array indices back to physical
/// coordinates. The mapping is affine: index `i` sits at
/// `offset + i * sampling`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Human-readable name of the dimension (e.g. "x").
    pub name: String,
    /// Physical units of the dimension (e.g. "Å").
    pub units: String,
    /// Coordinate of index 0.
    pub offset: f64,
    /// Coordinate step per index.
    pub sampling: f64,
}

impl Calibration {
    pub fn new(name: &str, units: &str, offset: f64, sampling: f64) -> Self {
        Self {
            name: name.to_string(),
            units: units.to_string(),
            offset,
            sampling,
        }
    }

    /// Physical coordinates of the first `n` indices.
    pub fn coordinates(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.offset + i as f64 * self.sampling).collect()
    }

    /// Physical extent spanned by `n` elements, as `(lower, upper)`.
    pub fn extent(&self, n: usize) -> (f64, f64) {
        (self.offset, self.offset + n as f64 * self.sampling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_affine_in_index() {
        let cal = Calibration::new("x", "Å", 1.0, 0.5);
        assert_eq!(cal.coordinates(3), vec![1.0, 1.5, 2.0]);
    }

    #[test]
    fn extent_spans_n_elements_from_offset() {
        let cal = Calibration::new("y", "Å", -1.0, 0.25);
        assert_eq!(cal.extent(8), (-1.0, 1.0));
    }
}
