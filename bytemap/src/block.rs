use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};

use crate::errors::{Error, Result};

/// Packed byte samples of one file, shaped by the product layout.
///
/// One axis is the `variable` axis; selecting an index on it yields a band.
#[derive(Debug, Clone)]
pub struct RawBytemap {
    data: ArrayD<u8>,
    band_axis: usize,
}

impl RawBytemap {
    /// Reshape a flat stream. The stream length must equal the product of `shape`.
    pub fn new(stream: Vec<u8>, shape: &[usize], band_axis: usize) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if stream.len() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                found: stream.len(),
            });
        }
        debug_assert!(band_axis < shape.len());

        let data = ArrayD::from_shape_vec(IxDyn(shape), stream)
            .map_err(|e| Error::ParseError(e.to_string()))?;

        Ok(RawBytemap { data, band_axis })
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn nbands(&self) -> usize {
        self.data.len_of(Axis(self.band_axis))
    }

    /// Extent of the innermost (longitude) axis.
    pub fn nlon(&self) -> usize {
        self.shape().last().copied().unwrap_or(0)
    }

    /// Extent of the second-innermost (latitude) axis.
    pub fn nlat(&self) -> usize {
        let shape = self.shape();
        if shape.len() < 2 {
            0
        } else {
            shape[shape.len() - 2]
        }
    }

    /// Select one band, dropping the band axis and any remaining axis of
    /// length one.
    pub fn band(&self, index: usize) -> ArrayViewD<'_, u8> {
        let mut view = self.data.index_axis(Axis(self.band_axis), index);
        for axis in (0..view.ndim()).rev() {
            if view.len_of(Axis(axis)) == 1 {
                view = view.index_axis_move(Axis(axis), 0);
            }
        }
        view
    }
}
