use crate::error::{CliError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::str::FromStr;
use stemsim::core::grid::PerAxis;

/// Parses a comma-separated coordinate pair such as "0,0" or "1.5, 2".
pub fn parse_f64_pair(value: &str) -> Result<[f64; 2]> {
    let parts: Vec<f64> = split_parse(value)?;
    match parts[..] {
        [x, y] => Ok([x, y]),
        _ => Err(CliError::Argument(format!(
            "expected two comma-separated values, got '{value}'"
        ))),
    }
}

/// Parses "P1,P2" partition counts.
pub fn parse_usize_pair(value: &str) -> Result<(usize, usize)> {
    let parts: Vec<usize> = split_parse(value)?;
    match parts[..] {
        [p1, p2] => Ok((p1, p2)),
        _ => Err(CliError::Argument(format!(
            "expected two comma-separated values, got '{value}'"
        ))),
    }
}

/// Parses a scalar ("16") or per-axis pair ("16,32") grid parameter.
pub fn parse_scalar_or_pair<T>(value: &str) -> Result<PerAxis<T>>
where
    T: FromStr + Copy,
    T::Err: Display,
{
    let parts: Vec<T> = split_parse(value)?;
    match parts[..] {
        [v] => Ok(PerAxis::from(v)),
        [x, y] => Ok(PerAxis::new(x, y)),
        _ => Err(CliError::Argument(format!(
            "expected one or two comma-separated values, got '{value}'"
        ))),
    }
}

fn split_parse<T>(value: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .split(',')
        .map(str::trim)
        .map(|part| {
            part.parse().map_err(|e| {
                CliError::Argument(format!("could not parse '{part}' in '{value}': {e}"))
            })
        })
        .collect()
}

/// Progress bar over exported probe positions.
pub fn position_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    if let Ok(style) =
        ProgressStyle::with_template("{wide_bar:.cyan/blue} {pos}/{len} positions ({eta})")
    {
        bar.set_style(style);
    }
    bar
}
