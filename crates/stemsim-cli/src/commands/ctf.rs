use crate::cli::CtfArgs;
use crate::error::Result;
use stemsim::core::transfer::{Ctf, PolarAberrations};
use tracing::info;

pub fn run(args: CtfArgs) -> Result<()> {
    let mut aberrations = PolarAberrations::default();
    aberrations.set_defocus(args.defocus);
    aberrations.set_spherical_aberration(args.cs);

    let ctf = Ctf::new(args.energy)?
        .with_semiangle_cutoff(
            args.semiangle_cutoff
                .map_or(f64::INFINITY, |mrad| mrad * 1e-3),
        )
        .with_rolloff(args.rolloff)
        .with_focal_spread(args.focal_spread)
        .with_angular_spread(args.angular_spread * 1e-3)
        .with_gaussian_spread(args.gaussian_spread)
        .with_aberrations(aberrations);

    info!(
        energy = args.energy,
        wavelength = ctf.wavelength(),
        "Evaluating CTF profile."
    );

    let profile = ctf.profile(args.max_k, args.num_samples, args.phi)?;

    let mut writer = csv::Writer::from_path(&args.output)?;
    writer.write_record([
        "k", "ctf", "aperture", "temporal", "spatial", "gaussian", "envelope",
    ])?;
    for i in 0..profile.k.len() {
        writer.write_record(&[
            profile.k[i].to_string(),
            profile.ctf[i].to_string(),
            profile.aperture[i].to_string(),
            profile.temporal[i].to_string(),
            profile.spatial[i].to_string(),
            profile.gaussian[i].to_string(),
            profile.envelope(i).to_string(),
        ])?;
    }
    writer.flush()?;

    info!(
        "Wrote {} CTF samples to '{}'.",
        profile.k.len(),
        args.output.display()
    );
    Ok(())
}
