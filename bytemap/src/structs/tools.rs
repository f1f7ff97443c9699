/// Sine of an angle given in degrees.
#[inline]
pub fn sind(x: f64) -> f64 {
    x.to_radians().sin()
}

/// Cosine of an angle given in degrees.
#[inline]
pub fn cosd(x: f64) -> f64 {
    x.to_radians().cos()
}

/// Zonal and meridional components of a wind blowing *toward* `direction`
/// (degrees oceanographic, North = 0).
#[inline]
pub fn get_uv(speed: f64, direction: f64) -> (f64, f64) {
    (speed * sind(direction), speed * cosd(direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_trig_degrees() {
        assert!(close(sind(90.0), 1.0));
        assert!(close(cosd(180.0), -1.0));
        assert!(close(sind(0.0), 0.0));
    }

    #[test]
    fn test_get_uv() {
        let (u, v) = get_uv(10.0, 0.0);
        assert!(close(u, 0.0) && close(v, 10.0));

        let (u, v) = get_uv(4.0, 90.0);
        assert!(close(u, 4.0) && close(v, 0.0));

        let (u, v) = get_uv(2.0, 225.0);
        assert!(close(u, -2.0_f64.sqrt()) && close(v, -2.0_f64.sqrt()));
    }
}
