//! Points on the unit sphere
//!
//! Axes follow the equatorial frame: x toward RA 0° on the equator, y toward
//! RA 90° on the equator, z toward the north celestial pole.

use nalgebra::Vector3;

/// One projected point
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cartesian3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Cartesian3 { x, y, z }
    }

    /// Unit vector at right ascension `ra` and declination `dec`, in radians
    ///
    /// `x = cos(dec) cos(ra)`, `y = cos(dec) sin(ra)`, `z = sin(dec)`.
    ///
    /// ```rust
    /// use fitscan::coordinates::cartesian::Cartesian3;
    /// use std::f64::consts::FRAC_PI_2;
    ///
    /// let pole = Cartesian3::from_radians(1.0, FRAC_PI_2);
    /// assert!(pole.x.abs() < 1e-15 && pole.y.abs() < 1e-15);
    /// assert_eq!(pole.z, 1.0);
    /// ```
    pub fn from_radians(ra: f64, dec: f64) -> Self {
        let (sin_dec, cos_dec) = dec.sin_cos();
        let (sin_ra, cos_ra) = ra.sin_cos();
        Cartesian3 {
            x: cos_dec * cos_ra,
            y: cos_dec * sin_ra,
            z: sin_dec,
        }
    }

    /// Euclidean length, 1 for projected points up to rounding
    pub fn magnitude(&self) -> f64 {
        Vector3::from(*self).norm()
    }
}

impl From<Cartesian3> for Vector3<f64> {
    fn from(p: Cartesian3) -> Self {
        Vector3::new(p.x, p.y, p.z)
    }
}

impl From<Cartesian3> for (f64, f64, f64) {
    fn from(p: Cartesian3) -> Self {
        (p.x, p.y, p.z)
    }
}
