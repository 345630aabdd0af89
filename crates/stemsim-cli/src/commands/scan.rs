use crate::cli::{ScanArgs, ScanKind};
use crate::config::{self, ScanFileConfig};
use crate::error::{CliError, Result};
use crate::utils;
use std::path::{Path, PathBuf};
use stemsim::core::grid::PerAxis;
use stemsim::scan::{GridScan, LineScan, PositionBatches, PositionScan, Scan};
use tracing::info;

/// Resolved gpts-xor-sampling parameterization.
enum Steps {
    Gpts(PerAxis<usize>),
    Sampling(PerAxis<f64>),
}

pub fn run(args: ScanArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => config::load_scan_config(path)?,
        None => ScanFileConfig::default(),
    };

    let kind = args.kind.or(file.kind).unwrap_or(ScanKind::Grid);
    let partitions = resolve_partitions(&args, &file)?;
    if partitions.is_some() && kind != ScanKind::Grid {
        return Err(CliError::Argument(
            "only grid scans can be partitioned".to_string(),
        ));
    }

    match kind {
        ScanKind::Custom => {
            let positions = file.positions.as_deref().ok_or_else(|| {
                CliError::Config("a custom scan requires 'positions' in the config file".into())
            })?;
            let scan = PositionScan::from_coords(positions)?;
            info!(positions = scan.num_positions(), "Built custom scan.");
            write_positions(&scan, &args.output, args.batch_size)
        }
        ScanKind::Line => {
            let start = resolve_point(args.start.as_deref(), file.start, "start")?;
            let end = resolve_point(args.end.as_deref(), file.end, "end")?;
            let endpoint = resolve_endpoint(&args, &file);
            let scan = match scalar_steps(resolve_steps(&args, &file)?)? {
                ScalarSteps::Gpts(gpts) => LineScan::with_gpts(&start, &end, gpts, endpoint)?,
                ScalarSteps::Sampling(step) => {
                    LineScan::with_sampling(&start, &end, step, endpoint)?
                }
            };
            info!(
                positions = scan.num_positions(),
                sampling = scan.sampling(),
                "Built line scan."
            );
            write_positions(&scan, &args.output, args.batch_size)
        }
        ScanKind::Grid => {
            let start = resolve_point(args.start.as_deref(), file.start, "start")?;
            let end = resolve_point(args.end.as_deref(), file.end, "end")?;
            let endpoint = resolve_endpoint(&args, &file);
            let scan = match resolve_steps(&args, &file)? {
                Steps::Gpts(gpts) => GridScan::with_gpts(&start, &end, gpts, endpoint)?,
                Steps::Sampling(sampling) => {
                    GridScan::with_sampling(&start, &end, sampling, endpoint)?
                }
            };
            info!(
                gpts = ?scan.gpts(),
                positions = scan.num_positions(),
                "Built grid scan."
            );

            match partitions {
                Some(partitions) => {
                    let children = scan.partition_scan(partitions)?;
                    info!(
                        children = children.len(),
                        "Partitioned grid scan; writing one file per sub-scan."
                    );
                    for (i, child) in children.iter().enumerate() {
                        let path = numbered_output(&args.output, i);
                        write_positions(child, &path, args.batch_size)?;
                    }
                    Ok(())
                }
                None => write_positions(&scan, &args.output, args.batch_size),
            }
        }
    }
}

fn resolve_point(
    flag: Option<&str>,
    file: Option<[f64; 2]>,
    name: &str,
) -> Result<[f64; 2]> {
    if let Some(value) = flag {
        return utils::parse_f64_pair(value);
    }
    file.ok_or_else(|| CliError::Config(format!("missing required scan parameter '{name}'")))
}

fn resolve_endpoint(args: &ScanArgs, file: &ScanFileConfig) -> bool {
    if args.no_endpoint {
        false
    } else {
        file.endpoint.unwrap_or(true)
    }
}

fn resolve_steps(args: &ScanArgs, file: &ScanFileConfig) -> Result<Steps> {
    if let Some(gpts) = &args.gpts {
        return Ok(Steps::Gpts(utils::parse_scalar_or_pair(gpts)?));
    }
    if let Some(sampling) = &args.sampling {
        return Ok(Steps::Sampling(utils::parse_scalar_or_pair(sampling)?));
    }
    if let Some(gpts) = file.gpts {
        return Ok(Steps::Gpts(gpts.into()));
    }
    if let Some(sampling) = file.sampling {
        return Ok(Steps::Sampling(sampling.into()));
    }
    Err(CliError::Config(
        "either 'gpts' or 'sampling' must be given".to_string(),
    ))
}

/// Scalar step parameterization for line scans.
enum ScalarSteps {
    Gpts(usize),
    Sampling(f64),
}

fn scalar_steps(steps: Steps) -> Result<ScalarSteps> {
    match steps {
        Steps::Gpts(gpts) if gpts.x == gpts.y => Ok(ScalarSteps::Gpts(gpts.x)),
        Steps::Sampling(sampling) if sampling.x == sampling.y => {
            Ok(ScalarSteps::Sampling(sampling.x))
        }
        _ => Err(CliError::Argument(
            "a line scan takes a single gpts/sampling value".to_string(),
        )),
    }
}

fn resolve_partitions(args: &ScanArgs, file: &ScanFileConfig) -> Result<Option<(usize, usize)>> {
    if let Some(value) = &args.partitions {
        return utils::parse_usize_pair(value).map(Some);
    }
    Ok(file.partitions.map(|[p1, p2]| (p1, p2)))
}

/// Output path for sub-scan `index`: `scan.csv` becomes `scan_000.csv`.
fn numbered_output(path: &Path, index: usize) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{index:03}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{index:03}"),
    };
    path.with_file_name(name)
}

fn write_positions(scan: &dyn Scan, path: &Path, batch_size: usize) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["index", "x", "y"])?;

    let bar = utils::position_bar(scan.num_positions() as u64);
    for batch in PositionBatches::new(scan, batch_size) {
        for (index, position) in batch.indices.clone().zip(&batch.positions) {
            writer.write_record(&[
                index.to_string(),
                position.x.to_string(),
                position.y.to_string(),
            ])?;
        }
        bar.inc(batch.positions.len() as u64);
    }
    bar.finish_and_clear();
    writer.flush()?;
    info!("Wrote {} positions to '{}'.", scan.num_positions(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_output_inserts_the_index_before_the_extension() {
        assert_eq!(
            numbered_output(Path::new("out/scan.csv"), 7),
            PathBuf::from("out/scan_007.csv")
        );
        assert_eq!(numbered_output(Path::new("scan"), 0), PathBuf::from("scan_000"));
    }

    #[test]
    fn written_csv_contains_one_row_per_position_plus_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.csv");

        let scan = GridScan::with_gpts(&[0.0, 0.0], &[1.0, 1.0], (3, 4), true).unwrap();
        write_positions(&scan, &path, 5).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "index,x,y");
        assert!(lines[1].starts_with("0,0,0"));
    }

    #[test]
    fn line_scans_reject_per_axis_step_values() {
        let steps = Steps::Gpts(PerAxis::new(4, 8));
        assert!(scalar_steps(steps).is_err());
    }
}
