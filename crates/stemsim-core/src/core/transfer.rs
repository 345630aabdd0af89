use crate::core::grid::{GridError, SamplingAxis};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

const ELECTRON_REST_ENERGY: f64 = 510_998.95; // In eV
const HC: f64 = 12_398.419_843_32; // In eV·Å

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("Electron energy must be positive, got {0} eV")]
    InvalidEnergy(f64),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Relativistic de Broglie wavelength in Å of an electron accelerated
/// through `energy` electron-volts.
#[inline]
pub fn energy2wavelength(energy: f64) -> f64 {
    HC / (energy * (2.0 * ELECTRON_REST_ENERGY + energy)).sqrt()
}

/// Polar aberration coefficients up to fifth order.
///
/// Magnitudes `cNM` are in Å; azimuth angles `phiNM` in radians. The polar
/// expansion groups coefficients by radial order N and azimuthal symmetry M,
/// so `c10` is (negative) defocus, `c12` twofold astigmatism, `c21` coma,
/// `c30` third-order spherical aberration, and so on. All coefficients
/// default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolarAberrations {
    pub c10: f64,
    pub c12: f64,
    pub phi12: f64,
    pub c21: f64,
    pub phi21: f64,
    pub c23: f64,
    pub phi23: f64,
    pub c30: f64,
    pub c32: f64,
    pub phi32: f64,
    pub c34: f64,
    pub phi34: f64,
    pub c41: f64,
    pub phi41: f64,
    pub c43: f64,
    pub phi43: f64,
    pub c45: f64,
    pub phi45: f64,
    pub c50: f64,
    pub c52: f64,
    pub phi52: f64,
    pub c54: f64,
    pub phi54: f64,
    pub c56: f64,
    pub phi56: f64,
}

impl PolarAberrations {
    /// Defocus in Å, defined as `-c10`.
    pub fn defocus(&self) -> f64 {
        -self.c10
    }

    pub fn set_defocus(&mut self, defocus: f64) {
        self.c10 = -defocus;
    }

    /// Third-order spherical aberration in Å.
    pub fn spherical_aberration(&self) -> f64 {
        self.c30
    }

    pub fn set_spherical_aberration(&mut self, cs: f64) {
        self.c30 = cs;
    }

    /// Aberration phase χ at scattering angle `alpha` (radians) and azimuth
    /// `phi` (radians) for the given electron wavelength (Å).
    pub fn chi(&self, alpha: f64, phi: f64, wavelength: f64) -> f64 {
        let a2 = alpha * alpha;
        let a3 = a2 * alpha;
        let a4 = a3 * alpha;
        let a5 = a4 * alpha;
        let a6 = a5 * alpha;

        2.0 * PI / wavelength
            * (a2 / 2.0 * (self.c10 + self.c12 * (2.0 * (phi - self.phi12)).cos())
                + a3 / 3.0
                    * (self.c21 * (phi - self.phi21).cos()
                        + self.c23 * (3.0 * (phi - self.phi23)).cos())
                + a4 / 4.0
                    * (self.c30
                        + self.c32 * (2.0 * (phi - self.phi32)).cos()
                        + self.c34 * (4.0 * (phi - self.phi34)).cos())
                + a5 / 5.0
                    * (self.c41 * (phi - self.phi41).cos()
                        + self.c43 * (3.0 * (phi - self.phi43)).cos()
                        + self.c45 * (5.0 * (phi - self.phi45)).cos())
                + a6 / 6.0
                    * (self.c50
                        + self.c52 * (2.0 * (phi - self.phi52)).cos()
                        + self.c54 * (4.0 * (phi - self.phi54)).cos()
                        + self.c56 * (6.0 * (phi - self.phi56)).cos()))
    }

    /// Radial derivative ∂χ/∂α, used by the spatial coherence envelope.
    pub fn dchi_dalpha(&self, alpha: f64, phi: f64, wavelength: f64) -> f64 {
        let a2 = alpha * alpha;
        let a3 = a2 * alpha;
        let a4 = a3 * alpha;
        let a5 = a4 * alpha;

        2.0 * PI / wavelength
            * (alpha * (self.c10 + self.c12 * (2.0 * (phi - self.phi12)).cos())
                + a2 * (self.c21 * (phi - self.phi21).cos()
                    + self.c23 * (3.0 * (phi - self.phi23)).cos())
                + a3 * (self.c30
                    + self.c32 * (2.0 * (phi - self.phi32)).cos()
                    + self.c34 * (4.0 * (phi - self.phi34)).cos())
                + a4 * (self.c41 * (phi - self.phi41).cos()
                    + self.c43 * (3.0 * (phi - self.phi43)).cos()
                    + self.c45 * (5.0 * (phi - self.phi45)).cos())
                + a5 * (self.c50
                    + self.c52 * (2.0 * (phi - self.phi52)).cos()
                    + self.c54 * (4.0 * (phi - self.phi54)).cos()
                    + self.c56 * (6.0 * (phi - self.phi56)).cos()))
    }

    /// Azimuthal derivative ∂χ/∂φ, used by the spatial coherence envelope.
    pub fn dchi_dphi(&self, alpha: f64, phi: f64, wavelength: f64) -> f64 {
        let a2 = alpha * alpha;
        let a3 = a2 * alpha;
        let a4 = a3 * alpha;
        let a5 = a4 * alpha;
        let a6 = a5 * alpha;

        -2.0 * PI / wavelength
            * (a2 / 2.0 * 2.0 * self.c12 * (2.0 * (phi - self.phi12)).sin()
                + a3 / 3.0
                    * (self.c21 * (phi - self.phi21).sin()
                        + 3.0 * self.c23 * (3.0 * (phi - self.phi23)).sin())
                + a4 / 4.0
                    * (2.0 * self.c32 * (2.0 * (phi - self.phi32)).sin()
                        + 4.0 * self.c34 * (4.0 * (phi - self.phi34)).sin())
                + a5 / 5.0
                    * (self.c41 * (phi - self.phi41).sin()
                        + 3.0 * self.c43 * (3.0 * (phi - self.phi43)).sin()
                        + 5.0 * self.c45 * (5.0 * (phi - self.phi45)).sin())
                + a6 / 6.0
                    * (2.0 * self.c52 * (2.0 * (phi - self.phi52)).sin()
                        + 4.0 * self.c54 * (4.0 * (phi - self.phi54)).sin()
                        + 6.0 * self.c56 * (6.0 * (phi - self.phi56)).sin()))
    }
}

/// Objective aperture at scattering angle `alpha`.
///
/// `cutoff` is the semiangle cutoff in radians; `rolloff` is the width of a
/// cosine taper below the cutoff as a fraction of it. Zero rolloff gives a
/// hard disc.
#[inline]
pub fn aperture(alpha: f64, cutoff: f64, rolloff: f64) -> f64 {
    if cutoff.is_infinite() {
        return 1.0;
    }
    if rolloff > 0.0 {
        let rolloff = rolloff * cutoff;
        if alpha > cutoff {
            0.0
        } else if alpha > cutoff - rolloff {
            0.5 * (1.0 + (PI * (alpha - cutoff + rolloff) / rolloff).cos())
        } else {
            1.0
        }
    } else if alpha <= cutoff {
        1.0
    } else {
        0.0
    }
}

/// Partial temporal coherence envelope for a focal spread in Å.
#[inline]
pub fn temporal_envelope(alpha: f64, wavelength: f64, focal_spread: f64) -> f64 {
    let u = 0.5 * PI / wavelength * focal_spread * alpha * alpha;
    (-u * u).exp()
}

/// Gaussian image-spread envelope for a source size in Å.
#[inline]
pub fn gaussian_envelope(alpha: f64, wavelength: f64, gaussian_spread: f64) -> f64 {
    let k = alpha / wavelength;
    (-0.5 * gaussian_spread * gaussian_spread * k * k).exp()
}

/// Partial spatial coherence envelope for an angular spread in radians.
///
/// Damps the transfer by the squared magnitude of the aberration-phase
/// gradient; the azimuthal term is taken as zero on the optic axis.
pub fn spatial_envelope(
    alpha: f64,
    phi: f64,
    wavelength: f64,
    angular_spread: f64,
    aberrations: &PolarAberrations,
) -> f64 {
    if angular_spread == 0.0 {
        return 1.0;
    }
    let dchi_dalpha = aberrations.dchi_dalpha(alpha, phi, wavelength);
    let dchi_dphi = if alpha > 0.0 {
        aberrations.dchi_dphi(alpha, phi, wavelength) / alpha
    } else {
        0.0
    };
    let half_spread = angular_spread / 2.0;
    (-half_spread * half_spread * (dchi_dalpha * dchi_dalpha + dchi_dphi * dchi_dphi)).exp()
}

/// Contrast transfer function of an electron-optical system.
///
/// Owns the acceleration energy, the aperture and coherence-envelope
/// parameters, and the polar aberration coefficients. The transfer value at
/// a scattering angle is the imaginary part of `exp(-iχ)`, i.e. `-sin χ`,
/// damped by the product of the aperture and the envelopes.
#[derive(Debug, Clone, PartialEq)]
pub struct Ctf {
    energy: f64,
    semiangle_cutoff: f64,
    rolloff: f64,
    focal_spread: f64,
    angular_spread: f64,
    gaussian_spread: f64,
    aberrations: PolarAberrations,
}

impl Ctf {
    /// Creates an aberration-free CTF with an unbounded aperture for an
    /// electron energy in eV.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidEnergy`] if `energy` is not a
    /// positive finite number.
    pub fn new(energy: f64) -> Result<Self, TransferError> {
        if !energy.is_finite() || energy <= 0.0 {
            return Err(TransferError::InvalidEnergy(energy));
        }
        Ok(Self {
            energy,
            semiangle_cutoff: f64::INFINITY,
            rolloff: 0.0,
            focal_spread: 0.0,
            angular_spread: 0.0,
            gaussian_spread: 0.0,
            aberrations: PolarAberrations::default(),
        })
    }

    /// Semiangle cutoff in radians.
    pub fn with_semiangle_cutoff(mut self, cutoff: f64) -> Self {
        self.semiangle_cutoff = cutoff;
        self
    }

    /// Aperture taper width as a fraction of the cutoff.
    pub fn with_rolloff(mut self, rolloff: f64) -> Self {
        self.rolloff = rolloff;
        self
    }

    /// 1/e focal spread in Å.
    pub fn with_focal_spread(mut self, focal_spread: f64) -> Self {
        self.focal_spread = focal_spread;
        self
    }

    /// Illumination angular spread in radians.
    pub fn with_angular_spread(mut self, angular_spread: f64) -> Self {
        self.angular_spread = angular_spread;
        self
    }

    /// Gaussian image spread in Å.
    pub fn with_gaussian_spread(mut self, gaussian_spread: f64) -> Self {
        self.gaussian_spread = gaussian_spread;
        self
    }

    pub fn with_aberrations(mut self, aberrations: PolarAberrations) -> Self {
        self.aberrations = aberrations;
        self
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn semiangle_cutoff(&self) -> f64 {
        self.semiangle_cutoff
    }

    pub fn aberrations(&self) -> &PolarAberrations {
        &self.aberrations
    }

    pub fn aberrations_mut(&mut self) -> &mut PolarAberrations {
        &mut self.aberrations
    }

    /// Electron wavelength in Å.
    pub fn wavelength(&self) -> f64 {
        energy2wavelength(self.energy)
    }

    /// Product of the aperture and all coherence envelopes at `alpha`.
    pub fn envelope(&self, alpha: f64, phi: f64) -> f64 {
        let wavelength = self.wavelength();
        aperture(alpha, self.semiangle_cutoff, self.rolloff)
            * temporal_envelope(alpha, wavelength, self.focal_spread)
            * spatial_envelope(alpha, phi, wavelength, self.angular_spread, &self.aberrations)
            * gaussian_envelope(alpha, wavelength, self.gaussian_spread)
    }

    /// Damped transfer value at scattering angle `alpha` and azimuth `phi`.
    pub fn evaluate(&self, alpha: f64, phi: f64) -> f64 {
        let chi = self.aberrations.chi(alpha, phi, self.wavelength());
        -chi.sin() * self.envelope(alpha, phi)
    }

    /// Samples the transfer function and its envelopes over `n` spatial
    /// frequencies from 0 to `max_k` (1/Å) at azimuth `phi`.
    ///
    /// This is the array family plotting front-ends consume: the damped
    /// CTF plus each envelope separately, on a shared frequency axis.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` is zero.
    pub fn profile(&self, max_k: f64, n: usize, phi: f64) -> Result<CtfProfile, TransferError> {
        let axis = SamplingAxis::from_gpts(0.0, max_k, n, true)?;
        let wavelength = self.wavelength();

        let k = axis.coordinates();
        let mut ctf = Vec::with_capacity(n);
        let mut aperture_values = Vec::with_capacity(n);
        let mut temporal = Vec::with_capacity(n);
        let mut spatial = Vec::with_capacity(n);
        let mut gaussian = Vec::with_capacity(n);
        for &k in &k {
            let alpha = k * wavelength;
            aperture_values.push(aperture(alpha, self.semiangle_cutoff, self.rolloff));
            temporal.push(temporal_envelope(alpha, wavelength, self.focal_spread));
            spatial.push(spatial_envelope(
                alpha,
                phi,
                wavelength,
                self.angular_spread,
                &self.aberrations,
            ));
            gaussian.push(gaussian_envelope(alpha, wavelength, self.gaussian_spread));
            ctf.push(self.evaluate(alpha, phi));
        }
        Ok(CtfProfile {
            k,
            ctf,
            aperture: aperture_values,
            temporal,
            spatial,
            gaussian,
        })
    }
}

/// Sampled CTF curves on a shared spatial-frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CtfProfile {
    /// Spatial frequencies in 1/Å.
    pub k: Vec<f64>,
    /// Damped transfer values.
    pub ctf: Vec<f64>,
    pub aperture: Vec<f64>,
    pub temporal: Vec<f64>,
    pub spatial: Vec<f64>,
    pub gaussian: Vec<f64>,
}

impl CtfProfile {
    /// Product envelope at sample `i`.
    pub fn envelope(&self, i: usize) -> f64 {
        self.aperture[i] * self.temporal[i] * self.spatial[i] * self.gaussian[i]
    }
}
