//! Equatorial coordinates and their projection onto the unit sphere

pub mod cartesian;

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub use self::cartesian::Cartesian3;
use crate::{FitscanError, Result};

/// Degrees to radians factor
const DEG_TO_RAD: f64 = PI / 180.0;

/// Equatorial position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaDec {
    /// Right ascension in degrees
    pub ra: f64,
    /// Declination in degrees
    pub dec: f64,
}

impl RaDec {
    /// Create a position from RA/Dec in degrees
    pub fn from_degrees(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Right ascension in radians
    pub fn ra_radians(&self) -> f64 {
        self.ra * DEG_TO_RAD
    }

    /// Declination in radians
    pub fn dec_radians(&self) -> f64 {
        self.dec * DEG_TO_RAD
    }

    /// Unit vector pointing at this position
    ///
    /// Declination is measured from the equatorial plane, right ascension
    /// eastward from the vernal equinox. Out-of-range angles are converted
    /// as-is.
    pub fn to_cartesian(&self) -> Cartesian3 {
        Cartesian3::from_radians(self.ra_radians(), self.dec_radians())
    }
}

/// Index-aligned x, y, z sequences of projected points
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    /// `cos(dec) * cos(ra)` of each input position
    pub x: Vec<f64>,
    /// `cos(dec) * sin(ra)` of each input position
    pub y: Vec<f64>,
    /// `sin(dec)` of each input position
    pub z: Vec<f64>,
}

impl Projection {
    /// Number of points
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether there are no points
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate the points as [`Cartesian3`] values
    pub fn points(&self) -> impl Iterator<Item = Cartesian3> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((&x, &y), &z)| Cartesian3::new(x, y, z))
    }
}

impl FromIterator<Cartesian3> for Projection {
    fn from_iter<I: IntoIterator<Item = Cartesian3>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut projection = Projection {
            x: Vec::with_capacity(lower),
            y: Vec::with_capacity(lower),
            z: Vec::with_capacity(lower),
        };
        for p in iter {
            projection.x.push(p.x);
            projection.y.push(p.y);
            projection.z.push(p.z);
        }
        projection
    }
}

/// Convert paired RA/Dec sequences (degrees) to unit-sphere Cartesian points
///
/// Values are not range checked. Fails with `ShapeMismatchError` when the two
/// sequences differ in length.
pub fn project_to_unit_sphere(ra_deg: &[f64], dec_deg: &[f64]) -> Result<Projection> {
    if ra_deg.len() != dec_deg.len() {
        return Err(FitscanError::ShapeMismatchError {
            ra_len: ra_deg.len(),
            dec_len: dec_deg.len(),
        });
    }

    Ok(ra_deg
        .iter()
        .zip(dec_deg)
        .map(|(&ra, &dec)| RaDec::from_degrees(ra, dec).to_cartesian())
        .collect())
}
