use ndarray::{Array1, ArrayD, Zip};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    block::RawBytemap,
    config::ReaderConfig,
    errors::{Error, Result},
    structs::{
        ICE_VALUE, LAND_VALUE,
        bit::{btest, ibits, is_bad},
    },
    tables::{Product, VariableSpec},
};

/// Decoded contents of one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Float(ArrayD<f64>),
    Mask(ArrayD<bool>),
}

impl Data {
    pub fn shape(&self) -> &[usize] {
        match self {
            Data::Float(a) => a.shape(),
            Data::Mask(a) => a.shape(),
        }
    }

    pub fn as_float(&self) -> Option<&ArrayD<f64>> {
        match self {
            Data::Float(a) => Some(a),
            Data::Mask(_) => None,
        }
    }

    pub fn as_mask(&self) -> Option<&ArrayD<bool>> {
        match self {
            Data::Mask(a) => Some(a),
            Data::Float(_) => None,
        }
    }

    /// Value at `index` as a number; masks read as 0/1.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        match self {
            Data::Float(a) => a.get(index).copied(),
            Data::Mask(a) => a.get(index).map(|v| f64::from(u8::from(*v))),
        }
    }
}

pub type DecoderFn = fn(&Decoder, &VariableSpec, &RawBytemap) -> Result<Data>;

/// Regular grid axis: `origin + delta * i` for `i` in `0..n`.
#[derive(Debug, Clone, Copy)]
pub struct GridAxis {
    pub name: &'static str,
    pub n: usize,
    pub delta: f64,
    pub origin: f64,
}

pub const LONGITUDE_AXIS: GridAxis = GridAxis {
    name: "Longitude",
    n: 1440,
    delta: 0.25,
    origin: 0.125,
};

pub const LATITUDE_AXIS: GridAxis = GridAxis {
    name: "Latitude",
    n: 720,
    delta: 0.25,
    origin: -89.875,
};

impl GridAxis {
    /// Cell centers, provided the raw extent agrees with the grid.
    pub fn centers(&self, found: usize) -> Result<Array1<f64>> {
        if found != self.n {
            return Err(Error::DimensionMismatch {
                axis: self.name,
                expected: self.n,
                found,
            });
        }
        Ok((0..self.n)
            .map(|i| self.delta * i as f64 + self.origin)
            .collect())
    }
}

static COMMON_DECODERS: [(&str, DecoderFn); 7] = [
    ("longitude", Decoder::get_longitude),
    ("latitude", Decoder::get_latitude),
    ("land", Decoder::get_land),
    ("ice", Decoder::get_ice),
    ("nodata", Decoder::get_nodata),
    ("scatflag", Decoder::get_scatflag),
    ("radrain", Decoder::get_radrain),
];

static DAILY_DECODERS: [(&str, DecoderFn); 1] = [("mingmt", Decoder::get_mingmt)];

fn product_decoders(product: Product) -> impl Iterator<Item = &'static (&'static str, DecoderFn)> {
    let own: &'static [(&str, DecoderFn)] = match product {
        Product::QuikScatDaily => &DAILY_DECODERS,
        Product::QuikScatAveraged => &[],
    };
    own.iter().chain(COMMON_DECODERS.iter())
}

/// Turns bands of a [`RawBytemap`] into physical variables.
///
/// Variables with a dedicated decoder use it; every other variable goes
/// through [`Decoder::default_get`].
pub struct Decoder {
    product: Product,
    missing: Option<f64>,
    max_valid: u8,
    overrides: FxHashMap<&'static str, DecoderFn>,
}

impl Decoder {
    pub fn new(product: Product, config: &ReaderConfig) -> Self {
        let mut overrides = FxHashMap::default();
        for (name, decoder) in product_decoders(product) {
            // product specific entries come first and win
            overrides.entry(*name).or_insert(*decoder);
        }

        Decoder {
            product,
            missing: config.missing,
            max_valid: config.max_valid,
            overrides,
        }
    }

    pub fn has_override(&self, var: &str) -> bool {
        self.overrides.contains_key(var)
    }

    pub fn decode(&self, var: &str, bmap: &RawBytemap) -> Result<Data> {
        let spec = self.product.spec_for(var)?;
        let data = match self.overrides.get(var) {
            Some(decoder) => decoder(self, spec, bmap)?,
            None => self.default_get(spec, bmap)?,
        };
        debug!(
            variable = var,
            dedicated = self.has_override(var),
            shape = ?data.shape(),
            "Decoded variable"
        );
        Ok(data)
    }

    /// Band select, scale, offset, then fill every cell whose raw byte is a
    /// fill code. An unset or zero fill value puts the raw code back instead.
    pub fn default_get(&self, spec: &VariableSpec, bmap: &RawBytemap) -> Result<Data> {
        let raw = bmap.band(band_of(spec)?);
        let mut data = raw.mapv(f64::from);
        if let Some(scale) = spec.scale {
            data *= scale;
        }
        if let Some(offset) = spec.offset {
            data += offset;
        }

        let max_valid = self.max_valid;
        let missing = self.missing;
        Zip::from(&mut data).and(&raw).for_each(|d, &r| {
            if is_bad(r, max_valid) {
                *d = match missing {
                    Some(m) if m != 0.0 => m,
                    _ => f64::from(r),
                };
            }
        });

        Ok(Data::Float(data))
    }

    /// Fill for composite fields, which carry no single raw byte to fall back on.
    fn fill(&self) -> f64 {
        self.missing.unwrap_or(f64::NAN)
    }

    fn get_longitude(&self, _spec: &VariableSpec, bmap: &RawBytemap) -> Result<Data> {
        Ok(Data::Float(LONGITUDE_AXIS.centers(bmap.nlon())?.into_dyn()))
    }

    fn get_latitude(&self, _spec: &VariableSpec, bmap: &RawBytemap) -> Result<Data> {
        Ok(Data::Float(LATITUDE_AXIS.centers(bmap.nlat())?.into_dyn()))
    }

    fn get_land(&self, spec: &VariableSpec, bmap: &RawBytemap) -> Result<Data> {
        let band = bmap.band(band_of(spec)?);
        Ok(Data::Mask(band.mapv(|b| b == LAND_VALUE)))
    }

    fn get_ice(&self, spec: &VariableSpec, bmap: &RawBytemap) -> Result<Data> {
        let band = bmap.band(band_of(spec)?);
        Ok(Data::Mask(band.mapv(|b| b == ICE_VALUE)))
    }

    fn get_nodata(&self, spec: &VariableSpec, bmap: &RawBytemap) -> Result<Data> {
        let max_valid = self.max_valid;
        let band = bmap.band(band_of(spec)?);
        Ok(Data::Mask(band.mapv(|b| is_bad(b, max_valid))))
    }

    /// Minute of day; the fill codes are scaled like any other byte.
    fn get_mingmt(&self, spec: &VariableSpec, bmap: &RawBytemap) -> Result<Data> {
        let mut data = bmap.band(band_of(spec)?).mapv(f64::from);
        if let Some(scale) = spec.scale {
            data *= scale;
        }
        Ok(Data::Float(data))
    }

    fn get_scatflag(&self, _spec: &VariableSpec, bmap: &RawBytemap) -> Result<Data> {
        let rain = bmap.band(self.product.band_index("rain")?);
        let first = bmap.band(0);
        let (fill, max_valid) = (self.fill(), self.max_valid);

        let data = Zip::from(&rain).and(&first).map_collect(|&r, &b0| {
            if is_bad(b0, max_valid) {
                fill
            } else {
                f64::from(ibits(r, 0, 1))
            }
        });
        Ok(Data::Float(data))
    }

    /// Bit 1 of the rain band flags collocated radiometer data; bits 2..8
    /// hold the rain rate in half km*mm/hr steps offset by one.
    fn get_radrain(&self, _spec: &VariableSpec, bmap: &RawBytemap) -> Result<Data> {
        let rain = bmap.band(self.product.band_index("rain")?);
        let first = bmap.band(0);
        let (fill, max_valid) = (self.fill(), self.max_valid);

        let data = Zip::from(&rain).and(&first).map_collect(|&r, &b0| {
            if is_bad(b0, max_valid) || !btest(r, 1) {
                return fill;
            }
            radiometer_rain_rate(ibits(r, 2, 6))
        });
        Ok(Data::Float(data))
    }
}

/// 0 = no rain, 1 = no rain here but adjacent cells rain, otherwise
/// `0.5 * (raw - 1)`.
#[inline]
pub fn radiometer_rain_rate(raw: u8) -> f64 {
    match raw {
        0 => 0.0,
        1 => -1.0,
        n => 0.5 * (f64::from(n) - 1.0),
    }
}

fn band_of(spec: &VariableSpec) -> Result<usize> {
    spec.index
        .ok_or_else(|| Error::SpecNotFound(format!("{} has no band", spec.name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: f64 = -999.0;

    fn decoder(product: Product, missing: Option<f64>) -> Decoder {
        Decoder::new(product, &ReaderConfig::default().with_missing(missing))
    }

    /// Averaged layout with a tiny grid: bands (windspd, winddir, rain).
    fn averaged_bmap(bands: [&[u8]; 3]) -> RawBytemap {
        let n = bands[0].len();
        let stream: Vec<u8> = bands.iter().flat_map(|b| b.iter().copied()).collect();
        RawBytemap::new(stream, &[3, 1, n], 0).unwrap()
    }

    fn floats(data: &Data) -> Vec<f64> {
        data.as_float().unwrap().iter().copied().collect()
    }

    #[test]
    fn test_default_get_scales_valid_bytes() {
        let speeds: Vec<u8> = (0..=250).collect();
        let zeros = vec![0u8; speeds.len()];
        let bmap = averaged_bmap([&speeds, &zeros, &zeros]);
        let dec = decoder(Product::QuikScatAveraged, Some(MISSING));

        let data = dec.decode("windspd", &bmap).unwrap();
        for (raw, value) in speeds.iter().zip(floats(&data)) {
            assert!((value - f64::from(*raw) * 0.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_default_get_applies_offset() {
        let spec = VariableSpec {
            offset: Some(-3.0),
            ..*Product::QuikScatAveraged.spec_for("winddir").unwrap()
        };
        let bmap = averaged_bmap([&[0, 0], &[10, 252], &[0, 0]]);
        let data = decoder(Product::QuikScatAveraged, Some(MISSING))
            .default_get(&spec, &bmap)
            .unwrap();
        assert_eq!(floats(&data), vec![12.0, MISSING]);
    }

    #[test]
    fn test_default_get_fill_codes() {
        let codes = [251u8, 252, 253, 254, 255, 100];
        let zeros = [0u8; 6];
        let bmap = averaged_bmap([&codes, &zeros, &zeros]);

        let data = decoder(Product::QuikScatAveraged, Some(MISSING))
            .decode("windspd", &bmap)
            .unwrap();
        assert_eq!(
            floats(&data),
            vec![MISSING, MISSING, MISSING, MISSING, MISSING, 20.0]
        );

        let data = decoder(Product::QuikScatAveraged, None)
            .decode("windspd", &bmap)
            .unwrap();
        assert_eq!(floats(&data), vec![251.0, 252.0, 253.0, 254.0, 255.0, 20.0]);
    }

    #[test]
    fn test_zero_fill_keeps_raw_codes() {
        let bmap = averaged_bmap([&[251, 100, 255], &[0, 0, 0], &[0b10, 0b10, 0b10]]);
        let dec = decoder(Product::QuikScatAveraged, Some(0.0));

        let data = dec.decode("windspd", &bmap).unwrap();
        assert_eq!(floats(&data), vec![251.0, 20.0, 255.0]);

        // composite fields have no raw code and use the fill value as given
        let data = dec.decode("radrain", &bmap).unwrap();
        assert_eq!(floats(&data), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_custom_max_valid() {
        let config = ReaderConfig {
            max_valid: 200,
            ..ReaderConfig::default()
        };
        let dec = Decoder::new(Product::QuikScatAveraged, &config);
        let bmap = averaged_bmap([&[200, 201, 250], &[0, 0, 0], &[1, 1, 1]]);

        let data = dec.decode("windspd", &bmap).unwrap();
        assert_eq!(floats(&data), vec![40.0, MISSING, MISSING]);

        let nodata: Vec<bool> = dec
            .decode("nodata", &bmap)
            .unwrap()
            .as_mask()
            .unwrap()
            .iter()
            .copied()
            .collect();
        assert_eq!(nodata, vec![false, true, true]);

        let data = dec.decode("scatflag", &bmap).unwrap();
        assert_eq!(floats(&data), vec![1.0, MISSING, MISSING]);
    }

    #[test]
    fn test_masks() {
        let first = [255u8, 252, 251, 0];
        let zeros = [0u8; 4];
        let bmap = averaged_bmap([&first, &zeros, &zeros]);
        let dec = decoder(Product::QuikScatAveraged, Some(MISSING));

        let mask = |var: &str| -> Vec<bool> {
            dec.decode(var, &bmap)
                .unwrap()
                .as_mask()
                .unwrap()
                .iter()
                .copied()
                .collect()
        };
        assert_eq!(mask("land"), vec![true, false, false, false]);
        assert_eq!(mask("ice"), vec![false, true, false, false]);
        assert_eq!(mask("nodata"), vec![true, true, true, false]);
    }

    #[test]
    fn test_radrain_scenarios() {
        // bit1 set plus intensity in bits 2..8
        let rain: [u8; 6] = [
            0b10 | (3 << 2),
            0b10,
            0b10 | (1 << 2),
            3 << 2,
            0b10 | (63 << 2),
            0b10 | (3 << 2),
        ];
        let first = [0u8, 0, 0, 0, 0, 255];
        let zeros = [0u8; 6];
        let bmap = averaged_bmap([&first, &zeros, &rain]);

        let data = decoder(Product::QuikScatAveraged, Some(MISSING))
            .decode("radrain", &bmap)
            .unwrap();
        assert_eq!(floats(&data), vec![1.0, 0.0, -1.0, MISSING, 31.0, MISSING]);
    }

    #[test]
    fn test_radrain_without_missing_uses_nan() {
        let bmap = averaged_bmap([&[0, 251], &[0, 0], &[0, 0b10]]);
        let data = decoder(Product::QuikScatAveraged, None)
            .decode("radrain", &bmap)
            .unwrap();
        let values = floats(&data);
        assert!(values[0].is_nan());
        assert!(values[1].is_nan());
    }

    #[test]
    fn test_scatflag() {
        let rain = [1u8, 0, 0b11, 1];
        let first = [0u8, 0, 0, 254];
        let zeros = [0u8; 4];
        let bmap = averaged_bmap([&first, &zeros, &rain]);

        let data = decoder(Product::QuikScatAveraged, Some(MISSING))
            .decode("scatflag", &bmap)
            .unwrap();
        assert_eq!(floats(&data), vec![1.0, 0.0, 1.0, MISSING]);
    }

    #[test]
    fn test_mingmt_daily() {
        // (segment=2, band=4, lat=1, lon=2)
        let stream = vec![
            10, 251, 0, 0, 0, 0, 0, 0, //
            240, 0, 0, 0, 0, 0, 0, 0,
        ];
        let bmap = RawBytemap::new(stream, &[2, 4, 1, 2], 1).unwrap();
        let data = decoder(Product::QuikScatDaily, Some(MISSING))
            .decode("mingmt", &bmap)
            .unwrap();
        assert_eq!(data.shape(), &[2, 2]);
        assert_eq!(floats(&data), vec![60.0, 1506.0, 1440.0, 0.0]);
    }

    #[test]
    fn test_grid_axes() {
        let lon = LONGITUDE_AXIS.centers(1440).unwrap();
        assert_eq!(lon[0], 0.125);
        assert_eq!(lon[1], 0.375);
        assert_eq!(lon[1439], 359.875);

        let lat = LATITUDE_AXIS.centers(720).unwrap();
        assert_eq!(lat[0], -89.875);
        assert_eq!(lat[719], 89.875);
    }

    #[test]
    fn test_longitude_dimension_mismatch() {
        let bmap = averaged_bmap([&[0; 4], &[0; 4], &[0; 4]]);
        let err = decoder(Product::QuikScatAveraged, Some(MISSING))
            .decode("longitude", &bmap)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                axis: "Longitude",
                expected: 1440,
                found: 4
            }
        ));
    }

    #[test]
    fn test_overrides_per_product() {
        let daily = decoder(Product::QuikScatDaily, Some(MISSING));
        let averaged = decoder(Product::QuikScatAveraged, Some(MISSING));
        assert!(daily.has_override("mingmt"));
        assert!(!averaged.has_override("mingmt"));
        assert!(averaged.has_override("radrain"));
        assert!(!averaged.has_override("windspd"));
    }

    #[test]
    fn test_every_variable_resolves() {
        for product in [Product::QuikScatDaily, Product::QuikScatAveraged] {
            let dec = decoder(product, Some(MISSING));
            for var in product.variables() {
                let spec = product.spec_for(var).unwrap();
                assert!(
                    dec.has_override(var) || spec.index.is_some(),
                    "{} {}",
                    product,
                    var
                );
            }
        }
    }

    #[test]
    fn test_unknown_variable() {
        let bmap = averaged_bmap([&[0], &[0], &[0]]);
        let err = decoder(Product::QuikScatAveraged, Some(MISSING))
            .decode("sst", &bmap)
            .unwrap_err();
        assert!(matches!(err, Error::SpecNotFound(_)));
    }
}
