//! # STEMsim Core Library
//!
//! A library for simulating scanning transmission electron microscopy (STEM)
//! experiments: generating probe-position scan patterns over a specimen,
//! partitioning grid scans into independent sub-scans, and evaluating
//! contrast-transfer-function (CTF) curves for electron-optical aberrations.
//!
//! ## Architectural Philosophy
//!
//! The library is split into two layers with a strict dependency direction,
//! keeping the numerics testable in isolation from any consumer:
//!
//! - **[`core`]: The Foundation.** Pure, stateless math: one-dimensional
//!   sampling geometry (`SamplingAxis`), measurement calibrations, and the
//!   aberration/envelope functions behind CTF evaluation.
//!
//! - **[`scan`]: The Scan Subsystem.** The family of probe-position scan
//!   types (`PositionScan`, `LineScan`, `GridScan`) behind the [`scan::Scan`]
//!   trait, including lazy batched position generation and the deterministic
//!   partitioning of a `GridScan` into self-contained children whose
//!   position sets exactly tile the parent's.
//!
//! Simulation engines, detectors and plotting front-ends are collaborators,
//! not members: they consume positions, measurement shapes, calibrations and
//! CTF profiles produced here and feed nothing back.

pub mod core;
pub mod scan;
