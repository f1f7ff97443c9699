//! Checks a decoded dataset against an RSS verify listing.
//!
//! A listing holds one observation per line:
//!
//! ```text
//! # variable lon lat asc value
//! windspd    170  274  1   7.60
//! radrain    170  274  1  -1.0
//! ```
//!
//! Indices are 1-based. `asc` selects the orbit segment and is ignored by
//! products without one.

use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{space0, space1, u64 as parse_u64},
    combinator::all_consuming,
    number::complete::recognize_float,
    sequence::{delimited, preceded},
};

use crate::dataset::Dataset;
use crate::errors::{Error, Result};

/// One observation from a verify file, with 0-based indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneOb {
    pub lon: usize,
    pub lat: usize,
    pub asc: usize,
    pub val: f64,
    /// Decimal exponent of `val` as written, e.g. -2 for `7.60`.
    pub ndp: i32,
}

impl OneOb {
    /// Half a unit in the last written place.
    pub fn tolerance(&self) -> f64 {
        0.5 * 10f64.powi(self.ndp)
    }
}

/// Decimal exponent of a number as written (always <= 0 without an
/// exponent part): `"12.25"` gives -2, `"1.20"` gives -2, `"-999."` gives 0.
pub fn places(astring: &str) -> Result<i32> {
    let astring = astring.trim();
    let (mantissa, exponent) = match astring.find(['e', 'E']) {
        Some(pos) => (&astring[..pos], &astring[pos + 1..]),
        None => (astring, "0"),
    };
    let exponent: i32 = exponent
        .parse()
        .map_err(|_| Error::ParseError(format!("Bad exponent in {}", astring)))?;
    let digits = mantissa
        .split_once('.')
        .map(|(_, frac)| frac.len() as i32)
        .unwrap_or(0);

    Ok(exponent - digits)
}

pub fn zerobased(indx: usize) -> Option<usize> {
    indx.checked_sub(1)
}

fn observation(input: &str) -> IResult<&str, (&str, u64, u64, u64, &str)> {
    all_consuming(delimited(
        space0,
        (
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
            preceded(space1, parse_u64),
            preceded(space1, parse_u64),
            preceded(space1, parse_u64),
            preceded(space1, recognize_float),
        ),
        space0,
    ))
    .parse(input)
}

/// Parse a verify listing into `(variable, observation)` pairs.
pub fn parse_verify(text: &str) -> Result<Vec<(String, OneOb)>> {
    let mut obs = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (_, (name, lon, lat, asc, value)) = observation(trimmed)?;
        let index = |i: u64| {
            zerobased(i as usize).ok_or_else(|| {
                Error::ParseError(format!("line {}: indices are 1-based", lineno + 1))
            })
        };
        let val: f64 = value
            .parse()
            .map_err(|_| Error::ParseError(format!("line {}: bad value {}", lineno + 1, value)))?;

        obs.push((
            name.to_string(),
            OneOb {
                lon: index(lon)?,
                lat: index(lat)?,
                asc: index(asc)?,
                val,
                ndp: places(value)?,
            },
        ));
    }

    Ok(obs)
}

/// Read and parse a verify file.
pub fn read_verify<P: AsRef<std::path::Path>>(path: P) -> Result<Vec<(String, OneOb)>> {
    let text = std::fs::read_to_string(path)?;
    parse_verify(&text)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub variable: String,
    pub ob: OneOb,
    /// Decoded value, `None` when the indices fall outside the grid.
    pub actual: Option<f64>,
    pub passed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub checks: Vec<Check>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }
}

/// Compare every observation with the decoded dataset.
///
/// An observation naming a variable the dataset does not have is an error.
pub fn verify(dataset: &Dataset, observations: &[(String, OneOb)]) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();

    for (name, ob) in observations {
        let variable = dataset
            .get(name)
            .ok_or_else(|| Error::SpecNotFound(name.clone()))?;

        let index: Vec<usize> = variable
            .attributes()
            .coordinates
            .iter()
            .map(|c| match *c {
                "orbit_segment" => ob.asc,
                "latitude" => ob.lat,
                _ => ob.lon,
            })
            .collect();

        let actual = variable.get(&index);
        let passed = actual
            .map(|a| (a - ob.val).abs() <= ob.tolerance() + f64::EPSILON * ob.val.abs().max(1.0))
            .unwrap_or(false);

        report.checks.push(Check {
            variable: name.clone(),
            ob: *ob,
            actual,
            passed,
        });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_places() {
        assert_eq!(places("12.25").unwrap(), -2);
        assert_eq!(places("1.20").unwrap(), -2);
        assert_eq!(places("-999.").unwrap(), 0);
        assert_eq!(places("31").unwrap(), 0);
        assert_eq!(places("1.5e-3").unwrap(), -4);
        assert!(places("1.5ex").is_err());
    }

    #[test]
    fn test_zerobased() {
        assert_eq!(zerobased(1), Some(0));
        assert_eq!(zerobased(1440), Some(1439));
        assert_eq!(zerobased(0), None);
    }

    #[test]
    fn test_parse_verify() {
        let text = "# variable lon lat asc value\n\
                    windspd 170 274 1 7.60\n\
                    \n\
                    \tradrain  2   3  2  -1.0  \n";
        let obs = parse_verify(text).unwrap();
        assert_eq!(obs.len(), 2);

        let (name, ob) = &obs[0];
        assert_eq!(name, "windspd");
        assert_eq!((ob.lon, ob.lat, ob.asc), (169, 273, 0));
        assert_eq!(ob.val, 7.6);
        assert_eq!(ob.ndp, -2);
        assert!((ob.tolerance() - 0.005).abs() < 1e-12);

        let (name, ob) = &obs[1];
        assert_eq!(name, "radrain");
        assert_eq!((ob.lon, ob.lat, ob.asc), (1, 2, 1));
        assert_eq!(ob.val, -1.0);
    }

    #[test]
    fn test_parse_verify_rejects() {
        assert!(matches!(
            parse_verify("windspd 0 1 1 7.6\n"),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(
            parse_verify("windspd 1 1 7.6\n"),
            Err(Error::Nom(_))
        ));
        assert!(parse_verify("windspd 1 1 1 seven\n").is_err());
    }
}
