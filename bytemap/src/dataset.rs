use ndarray::{ArrayD, Zip};
use rustc_hash::FxHashMap;
use std::{
    ops::Deref,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::{
    block::RawBytemap,
    config::ReaderConfig,
    decoder::{Data, Decoder},
    errors::{Error, Result},
    parser::{readgz, unpack},
    structs::tools::get_uv,
    tables::{AttrValue, Layout, Product, VariableSpec},
};

/// Coordinate extents in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimensions(Vec<(&'static str, usize)>);

impl Dimensions {
    pub fn get(&self, name: &str) -> Option<usize> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, len)| *len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&Layout> for Dimensions {
    fn from(layout: &Layout) -> Self {
        Dimensions(layout.dimensions())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    pub coordinates: Vec<&'static str>,
    pub long_name: &'static str,
    pub units: &'static str,
    pub valid_min: AttrValue,
    pub valid_max: AttrValue,
}

impl Attributes {
    fn new(spec: &VariableSpec, layout: &Layout) -> Self {
        Attributes {
            coordinates: layout.coordinates_for(spec.name),
            long_name: spec.long_name,
            units: spec.units,
            valid_min: spec.valid_min,
            valid_max: spec.valid_max,
        }
    }

    /// Whether `value` lies inside `[valid_min, valid_max]`.
    pub fn is_valid(&self, value: f64) -> bool {
        value >= self.valid_min.as_f64() && value <= self.valid_max.as_f64()
    }
}

/// A decoded variable together with its attributes.
#[derive(Debug, Clone)]
pub struct Variable {
    name: &'static str,
    data: Data,
    attributes: Attributes,
}

impl Deref for Variable {
    type Target = Data;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl Variable {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// Decoded variables, kept in the order the product declares them.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    entries: Vec<Variable>,
    index: FxHashMap<&'static str, usize>,
}

impl Variables {
    fn push(&mut self, variable: Variable) {
        self.index.insert(variable.name, self.entries.len());
        self.entries.push(variable);
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|i| &self.entries[*i])
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|v| v.name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Variables {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A fully decoded bytemap file.
///
/// Everything is decoded when the dataset is built; the raw bytes are
/// dropped afterwards and the dataset is read-only. To view the same file
/// with other options, open it again.
#[derive(Debug, Clone)]
pub struct Dataset {
    filename: PathBuf,
    product: Product,
    missing: Option<f64>,
    dimensions: Dimensions,
    variables: Variables,
}

impl Dataset {
    /// Read daily QuikSCAT bytemaps with the default fill value.
    pub fn quikscat_daily<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(Product::QuikScatDaily, path, &ReaderConfig::default())
    }

    /// Read time-averaged QuikSCAT bytemaps with the default fill value.
    pub fn quikscat_averaged<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(Product::QuikScatAveraged, path, &ReaderConfig::default())
    }

    /// Read and decode `path` as `product`.
    ///
    /// A file that cannot be opened or inflated yields a dataset without
    /// variables, unless `config.strict_open` is set. A stream whose length
    /// does not fit the product layout is always an error. Input without the
    /// gzip magic is decoded as is rather than treated as unreadable.
    pub fn open<P: AsRef<Path>>(product: Product, path: P, config: &ReaderConfig) -> Result<Self> {
        let path = path.as_ref();
        let mut dataset = Self::empty(product, path.to_path_buf(), config);

        let stream = match readgz(path) {
            Ok(stream) => stream,
            Err(source) if config.strict_open => {
                return Err(Error::FileUnreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
            Err(source) => {
                warn!(
                    path = %path.display(),
                    error = %source,
                    "Unreadable bytemap, dataset has no variables"
                );
                return Ok(dataset);
            }
        };

        info!(
            path = %path.display(),
            product = %product,
            bytes = stream.len(),
            "Decoding bytemap"
        );
        dataset.variables = Self::decode_all(product, stream, config)?;
        Ok(dataset)
    }

    /// Decode an already inflated stream.
    pub fn from_bytes(product: Product, stream: Vec<u8>, config: &ReaderConfig) -> Result<Self> {
        let mut dataset = Self::empty(product, PathBuf::new(), config);
        dataset.variables = Self::decode_all(product, stream, config)?;
        Ok(dataset)
    }

    fn empty(product: Product, filename: PathBuf, config: &ReaderConfig) -> Self {
        Dataset {
            filename,
            product,
            missing: config.missing,
            dimensions: Dimensions::from(product.layout()),
            variables: Variables::default(),
        }
    }

    fn decode_all(product: Product, stream: Vec<u8>, config: &ReaderConfig) -> Result<Variables> {
        let layout = product.layout();
        let bmap: RawBytemap = unpack(stream, layout)?;
        let decoder = Decoder::new(product, config);

        let mut variables = Variables::default();
        for spec in product.specs() {
            let data = decoder.decode(spec.name, &bmap)?;
            variables.push(Variable {
                name: spec.name,
                data,
                attributes: Attributes::new(spec, layout),
            });
        }
        Ok(variables)
    }

    /// Path the dataset was read from; empty for in-memory streams.
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn missing(&self) -> Option<f64> {
        self.missing
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Zonal and meridional wind from `windspd` and `winddir`.
    ///
    /// Cells where either input falls outside its valid range get the fill
    /// value, or NaN when the dataset keeps raw codes.
    pub fn wind_components(&self) -> Option<(ArrayD<f64>, ArrayD<f64>)> {
        let speed = self.get("windspd")?;
        let direction = self.get("winddir")?;
        let (s, d) = (speed.as_float()?, direction.as_float()?);
        let fill = self.missing.unwrap_or(f64::NAN);

        let valid = |sv: f64, dv: f64| {
            speed.attributes().is_valid(sv) && direction.attributes().is_valid(dv)
        };
        let u = Zip::from(s).and(d).map_collect(|&sv, &dv| {
            if valid(sv, dv) { get_uv(sv, dv).0 } else { fill }
        });
        let v = Zip::from(s).and(d).map_collect(|&sv, &dv| {
            if valid(sv, dv) { get_uv(sv, dv).1 } else { fill }
        });
        Some((u, v))
    }
}
