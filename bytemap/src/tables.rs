//! Static variable registry for the supported bytemap products.
//!
//! Each product declares its raw layout, the ordered list of variables it
//! yields and one [`VariableSpec`] per variable. The tables are constants;
//! nothing here is written at runtime.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::errors::{Error, Result};

/// Typed `valid_min` / `valid_max` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrValue {
    Float(f64),
    Int(i64),
    Bool(bool),
}

impl AttrValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            AttrValue::Float(v) => *v,
            AttrValue::Int(v) => *v as f64,
            AttrValue::Bool(v) => f64::from(u8::from(*v)),
        }
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Float(v) => write!(f, "{:?}", v),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Static metadata for one variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableSpec {
    pub name: &'static str,
    /// Band on the `variable` axis; `None` for synthesized coordinates.
    pub index: Option<usize>,
    /// Multiplier, absent means identity.
    pub scale: Option<f64>,
    /// Addend, absent means identity.
    pub offset: Option<f64>,
    pub long_name: &'static str,
    pub units: &'static str,
    pub valid_min: AttrValue,
    pub valid_max: AttrValue,
}

/// Raw array layout of a product, outer to inner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub coordinates: &'static [&'static str],
    pub shape: &'static [usize],
}

pub const BAND_COORDINATE: &str = "variable";

impl Layout {
    pub fn band_axis(&self) -> usize {
        self.coordinates
            .iter()
            .position(|c| *c == BAND_COORDINATE)
            .unwrap_or(0)
    }

    /// Coordinate extents in declared order, without the band axis.
    pub fn dimensions(&self) -> Vec<(&'static str, usize)> {
        self.coordinates
            .iter()
            .copied()
            .zip(self.shape.iter().copied())
            .filter(|(name, _)| *name != BAND_COORDINATE)
            .collect()
    }

    /// A coordinate variable is its own coordinate; anything else spans
    /// every coordinate except the band axis.
    pub fn coordinates_for(&self, var: &str) -> Vec<&'static str> {
        if let Some(c) = self.coordinates.iter().find(|c| **c == var) {
            return vec![*c];
        }
        self.coordinates
            .iter()
            .copied()
            .filter(|c| *c != BAND_COORDINATE)
            .collect()
    }
}

macro_rules! spec_table {
    ($table:ident: $(($name:literal, $index:expr, $scale:expr, $long:literal, $units:literal, $min:expr, $max:expr)),+ $(,)?) => {
        static $table: &[VariableSpec] = &[
            $(
                VariableSpec {
                    name: $name,
                    index: $index,
                    scale: $scale,
                    offset: None,
                    long_name: $long,
                    units: $units,
                    valid_min: $min,
                    valid_max: $max,
                },
            )+
        ];
    };
}

use AttrValue::{Bool, Float, Int};

spec_table!(DAILY_SPECS:
    ("mingmt", Some(0), Some(6.0), "Minute of Day UTC", "minute of day", Float(0.0), Float(1440.0)),
    ("windspd", Some(1), Some(0.2), "10-m Surface Wind Speed", "m/s", Float(0.0), Float(50.0)),
    ("winddir", Some(2), Some(1.5), "10-m Surface Wind Direction", "deg oceanographic", Float(0.0), Float(360.0)),
    ("scatflag", Some(3), None, "Scatterometer Rain Flag", "0=no-rain, 1=rain", Int(0), Int(1)),
    ("radrain", Some(3), None, "Radiometer Rain Flag", "0=no-rain, -1=adjacent rain, >0=rain(km*mm/hr)", Int(-1), Int(31)),
    ("longitude", None, None, "Grid Cell Center Longitude", "degrees east", Float(0.0), Float(360.0)),
    ("latitude", None, None, "Grid Cell Center Latitude", "degrees north", Float(-90.0), Float(90.0)),
    ("land", Some(0), None, "Is this land?", "True or False", Bool(false), Bool(true)),
    ("ice", Some(0), None, "Is this ice?", "True or False", Bool(false), Bool(true)),
    ("nodata", Some(0), None, "Is there no data?", "True or False", Bool(false), Bool(true)),
);

spec_table!(AVERAGED_SPECS:
    ("windspd", Some(0), Some(0.2), "10-m Surface Wind Speed", "m/s", Float(0.0), Float(50.0)),
    ("winddir", Some(1), Some(1.5), "10-m Surface Wind Direction", "deg oceanographic", Float(0.0), Float(360.0)),
    ("scatflag", Some(2), None, "Scatterometer Rain Flag", "0=no-rain, 1=rain", Int(0), Int(1)),
    ("radrain", Some(2), None, "Radiometer Rain Flag", "0=no-rain, -1=adjacent rain, >0=rain(km*mm/hr)", Int(-1), Int(31)),
    ("longitude", None, None, "Grid Cell Center Longitude", "degrees east", Float(0.0), Float(360.0)),
    ("latitude", None, None, "Grid Cell Center Latitude", "degrees north", Float(-90.0), Float(90.0)),
    ("land", Some(0), None, "Is this land?", "True or False", Bool(false), Bool(true)),
    ("ice", Some(0), None, "Is this ice?", "True or False", Bool(false), Bool(true)),
    ("nodata", Some(0), None, "Is there no data?", "True or False", Bool(false), Bool(true)),
);

static DAILY_LAYOUT: Layout = Layout {
    coordinates: &["orbit_segment", "variable", "latitude", "longitude"],
    shape: &[2, 4, 720, 1440],
};

static AVERAGED_LAYOUT: Layout = Layout {
    coordinates: &["variable", "latitude", "longitude"],
    shape: &[3, 720, 1440],
};

/// Supported RSS QuikSCAT version-4 bytemap products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    /// Daily maps, one layer per ascending/descending orbit segment.
    QuikScatDaily,
    /// Time-averaged (3-day, weekly, monthly) maps.
    QuikScatAveraged,
}

impl Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Product::QuikScatDaily => write!(f, "QuikScatDaily"),
            Product::QuikScatAveraged => write!(f, "QuikScatAveraged"),
        }
    }
}

impl Product {
    pub fn layout(&self) -> &'static Layout {
        match self {
            Product::QuikScatDaily => &DAILY_LAYOUT,
            Product::QuikScatAveraged => &AVERAGED_LAYOUT,
        }
    }

    /// Variables yielded by a dataset, in output order.
    pub fn variables(self) -> impl Iterator<Item = &'static str> {
        self.specs().iter().map(|s| s.name)
    }

    pub fn specs(&self) -> &'static [VariableSpec] {
        match self {
            Product::QuikScatDaily => DAILY_SPECS,
            Product::QuikScatAveraged => AVERAGED_SPECS,
        }
    }

    /// Band carrying a named raw field that is not itself a variable.
    pub fn band_index(&self, band: &str) -> Result<usize> {
        match (self, band) {
            (Product::QuikScatDaily, "rain") => Ok(3),
            (Product::QuikScatAveraged, "rain") => Ok(2),
            _ => self
                .spec_for(band)?
                .index
                .ok_or_else(|| Error::SpecNotFound(band.to_string())),
        }
    }

    pub fn spec_for(&self, var: &str) -> Result<&'static VariableSpec> {
        self.specs()
            .iter()
            .find(|s| s.name == var)
            .ok_or_else(|| Error::SpecNotFound(format!("{}/{}", self, var)))
    }
}
