//! Resolved astronomical targets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::SkyCoord;

/// Celestial reference frame of catalogued coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceFrame {
    Icrs,
    Fk5,
    Fk4,
}

impl fmt::Display for ReferenceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Icrs => "ICRS",
            Self::Fk5 => "FK5",
            Self::Fk4 => "FK4",
        })
    }
}

/// Catalogued object returned by a name or region query.
///
/// Optional measurements are `None` when the source did not supply them;
/// a supplied value of `0.0` stays `Some(0.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstronomicalTarget {
    /// Canonical object name
    pub name: String,
    /// Catalogued position
    pub coordinates: SkyCoord,
    /// Proper motion in RA (mas/yr)
    pub pm_ra: Option<f64>,
    /// Proper motion in Dec (mas/yr)
    pub pm_dec: Option<f64>,
    /// Parallax (mas)
    pub parallax: Option<f64>,
    /// Radial velocity (km/s)
    pub radial_velocity: Option<f64>,
    /// Frame of `coordinates`, when known
    pub reference_frame: Option<ReferenceFrame>,
    /// Object classification from the local catalog
    pub object_type: Option<String>,
    /// Constellation abbreviation from the local catalog
    pub constellation: Option<String>,
    /// Spectral type from the local catalog
    pub spectral_type: Option<String>,
    /// Catalog of origin from the local catalog
    pub catalog: Option<String>,
}

impl AstronomicalTarget {
    /// Creates a target with only name and position.
    pub fn new(name: impl Into<String>, coordinates: SkyCoord) -> Self {
        Self {
            name: name.into(),
            coordinates,
            pm_ra: None,
            pm_dec: None,
            parallax: None,
            radial_velocity: None,
            reference_frame: None,
            object_type: None,
            constellation: None,
            spectral_type: None,
            catalog: None,
        }
    }

    /// Sets both proper motion components.
    pub fn with_proper_motion(mut self, pm_ra: Option<f64>, pm_dec: Option<f64>) -> Self {
        self.pm_ra = pm_ra;
        self.pm_dec = pm_dec;
        self
    }

    pub fn with_parallax(mut self, parallax: Option<f64>) -> Self {
        self.parallax = parallax;
        self
    }

    pub fn with_radial_velocity(mut self, radial_velocity: Option<f64>) -> Self {
        self.radial_velocity = radial_velocity;
        self
    }

    pub fn with_frame(mut self, frame: ReferenceFrame) -> Self {
        self.reference_frame = Some(frame);
        self
    }

    /// Distance in parsecs derived from the parallax, if one is known and positive.
    pub fn distance_pc(&self) -> Option<f64> {
        self.parallax
            .filter(|plx| *plx > 0.0)
            .map(|plx_mas| 1000.0 / plx_mas)
    }
}

impl fmt::Display for AstronomicalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.coordinates)
    }
}
