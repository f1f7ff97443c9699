//! Fortran-style bit helpers for packed byte fields.

/// Extract `ilen` bits starting at `ipos` (0 = least significant), like
/// Fortran `IBITS`. The field must lie inside the byte: `ipos + ilen <= 8`.
#[inline]
pub fn ibits(ival: u8, ipos: u32, ilen: u32) -> u8 {
    debug_assert!(ipos + ilen <= 8, "ibits field {}+{} exceeds a byte", ipos, ilen);
    let ones = (1u32 << ilen) - 1;
    ((u32::from(ival) >> ipos) & ones) as u8
}

/// Same usage as Fortran `BTEST`.
#[inline]
pub fn btest(ival: u8, ipos: u32) -> bool {
    (u32::from(ival) & (1 << ipos)) != 0
}

/// True when `sample` is one of the reserved fill codes above `maxvalid`.
#[inline]
pub fn is_bad(sample: u8, maxvalid: u8) -> bool {
    sample > maxvalid
}
