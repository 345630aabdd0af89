//! # Core Module
//!
//! Foundation layer of the library: pure, stateless math with no knowledge
//! of scans or of any downstream consumer.
//!
//! ## Architecture
//!
//! - **Sampling Geometry** ([`grid`]) - ordered sample coordinates along one
//!   axis from start/end bounds and either a point count or a step size,
//!   with an explicit include-endpoint policy, plus the axis-splitting
//!   primitive behind grid-scan partitioning.
//! - **Calibrations** ([`calibration`]) - offset/step metadata attached to
//!   measurement dimensions, consumed by detectors and plotting front-ends.
//! - **Transfer Functions** ([`transfer`]) - polar aberration phases,
//!   aperture and envelope functions, and sampled CTF profiles.

pub mod calibration;
pub mod grid;
pub mod transfer;
