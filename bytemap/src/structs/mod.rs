pub mod bit;
pub mod tools;

/// Highest byte value that still carries a scaled sample.
pub const MAX_VALID: u8 = 250;
/// Fill code marking sea ice.
pub const ICE_VALUE: u8 = 252;
/// Fill code marking land.
pub const LAND_VALUE: u8 = 255;
