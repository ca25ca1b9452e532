//! Equatorial coordinates, sexagesimal notation and search regions.
//!
//! All angles are stored in degrees. Right ascension is kept in `[0, 360)`
//! when constructed through [`SkyCoord::new`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sexagesimal parse failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AngleParseError {
    #[error("Empty angle string")]
    Empty,

    #[error("Too many components in '{0}'")]
    TooManyComponents(String),

    #[error("Invalid component '{component}' in '{text}'")]
    InvalidComponent { text: String, component: String },

    #[error("Angle '{0}' out of range")]
    OutOfRange(String),
}

/// Position on the celestial sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyCoord {
    /// Right ascension in degrees
    pub ra_deg: f64,
    /// Declination in degrees
    pub dec_deg: f64,
}

impl SkyCoord {
    /// Creates a coordinate, wrapping RA into `[0, 360)`.
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self {
            ra_deg: wrap_ra(ra_deg),
            dec_deg,
        }
    }

    /// Creates a coordinate from RA in hours.
    pub fn from_hours(ra_hours: f64, dec_deg: f64) -> Self {
        Self::new(ra_hours * 15.0, dec_deg)
    }

    /// Parses sexagesimal RA (`HH MM SS.sss`) and Dec (`±DD MM SS.ss`).
    pub fn from_sexagesimal(ra: &str, dec: &str) -> Result<Self, AngleParseError> {
        Ok(Self::new(parse_ra_hms(ra)?, parse_dec_dms(dec)?))
    }

    /// Right ascension in hours.
    pub fn ra_hours(&self) -> f64 {
        self.ra_deg / 15.0
    }

    /// Angular distance to another coordinate in degrees.
    pub fn separation(&self, other: &SkyCoord) -> f64 {
        angular_separation(self.ra_deg, self.dec_deg, other.ra_deg, other.dec_deg)
    }
}

impl fmt::Display for SkyCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            format_ra_hms(self.ra_deg),
            format_dec_dms(self.dec_deg)
        )
    }
}

/// Wraps an RA value into `[0, 360)`.
pub fn wrap_ra(ra_deg: f64) -> f64 {
    let wrapped = ra_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Splits `[±]A B C` into sign and up to three unsigned components.
fn split_sexagesimal(text: &str) -> Result<(bool, [f64; 3]), AngleParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AngleParseError::Empty);
    }
    let (negative, body) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut parts = [0.0; 3];
    let mut count = 0;
    for component in body.split(|c: char| c.is_whitespace() || c == ':') {
        if component.is_empty() {
            continue;
        }
        if count == 3 {
            return Err(AngleParseError::TooManyComponents(text.to_string()));
        }
        let value: f64 = component
            .parse()
            .map_err(|_| AngleParseError::InvalidComponent {
                text: text.to_string(),
                component: component.to_string(),
            })?;
        if value < 0.0 || (count > 0 && value >= 60.0) {
            return Err(AngleParseError::InvalidComponent {
                text: text.to_string(),
                component: component.to_string(),
            });
        }
        parts[count] = value;
        count += 1;
    }
    if count == 0 {
        return Err(AngleParseError::Empty);
    }
    Ok((negative, parts))
}

/// Parses RA given in hours (`HH MM SS.sss`) and returns degrees.
pub fn parse_ra_hms(text: &str) -> Result<f64, AngleParseError> {
    let (negative, [h, m, s]) = split_sexagesimal(text)?;
    let hours = h + m / 60.0 + s / 3600.0;
    if negative || hours >= 24.0 {
        return Err(AngleParseError::OutOfRange(text.to_string()));
    }
    Ok(hours * 15.0)
}

/// Parses Dec given in degrees (`±DD MM SS.ss`).
///
/// The sign comes from the text, so `-00 30 00` is -0.5.
pub fn parse_dec_dms(text: &str) -> Result<f64, AngleParseError> {
    let (negative, [d, m, s]) = split_sexagesimal(text)?;
    let degrees = d + m / 60.0 + s / 3600.0;
    if degrees > 90.0 {
        return Err(AngleParseError::OutOfRange(text.to_string()));
    }
    Ok(if negative { -degrees } else { degrees })
}

/// Formats RA degrees as `HH MM SS.sss`.
pub fn format_ra_hms(ra_deg: f64) -> String {
    let total_ms = (wrap_ra(ra_deg) / 15.0 * 3_600_000.0).round() as u64 % 86_400_000;
    let h = total_ms / 3_600_000;
    let m = (total_ms / 60_000) % 60;
    let s = (total_ms % 60_000) as f64 / 1000.0;
    format!("{h:02} {m:02} {s:06.3}")
}

/// Formats Dec degrees as `±DD MM SS.ss`.
pub fn format_dec_dms(dec_deg: f64) -> String {
    let sign = if dec_deg < 0.0 { '-' } else { '+' };
    let total_cs = (dec_deg.abs() * 360_000.0).round() as u64;
    let d = total_cs / 360_000;
    let m = (total_cs / 6_000) % 60;
    let s = (total_cs % 6_000) as f64 / 100.0;
    format!("{sign}{d:02} {m:02} {s:05.2}")
}

/// Angular separation between two sky positions in degrees (Vincenty formula).
pub fn angular_separation(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let delta_ra = (ra2 - ra1).to_radians();
    let (sin_dec1, cos_dec1) = dec1.to_radians().sin_cos();
    let (sin_dec2, cos_dec2) = dec2.to_radians().sin_cos();

    let term1 = (cos_dec2 * delta_ra.sin()).powi(2);
    let term2 = (cos_dec1 * sin_dec2 - sin_dec1 * cos_dec2 * delta_ra.cos()).powi(2);
    let numerator = (term1 + term2).sqrt();
    let denominator = sin_dec1 * sin_dec2 + cos_dec1 * cos_dec2 * delta_ra.cos();

    numerator.atan2(denominator).to_degrees()
}

/// Rectangular search region with ordered edges.
///
/// Corners may be supplied in either diagonal order; construction swaps them
/// so that `right >= left` and `top >= bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateWindow {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl CoordinateWindow {
    /// Builds a window from two opposite corners.
    pub fn from_corners(top_left: SkyCoord, bottom_right: SkyCoord) -> Self {
        let mut left = top_left.ra_deg;
        let mut right = bottom_right.ra_deg;
        if left > right {
            std::mem::swap(&mut left, &mut right);
        }

        let mut top = top_left.dec_deg;
        let mut bottom = bottom_right.dec_deg;
        if top < bottom {
            std::mem::swap(&mut top, &mut bottom);
        }

        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Center of the window.
    pub fn center(&self) -> SkyCoord {
        SkyCoord {
            ra_deg: self.left + self.width() / 2.0,
            dec_deg: self.bottom + self.height() / 2.0,
        }
    }

    /// Center + extent form used by the remote region primitive.
    pub fn to_region(&self) -> BoxRegion {
        BoxRegion {
            center: self.center(),
            width: self.width(),
            height: self.height(),
        }
    }

    /// True when the coordinate lies inside the window (edges included).
    pub fn contains(&self, coord: &SkyCoord) -> bool {
        coord.ra_deg >= self.left
            && coord.ra_deg <= self.right
            && coord.dec_deg >= self.bottom
            && coord.dec_deg <= self.top
    }
}

/// Box described by its center and extent in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRegion {
    pub center: SkyCoord,
    pub width: f64,
    pub height: f64,
}

impl BoxRegion {
    /// Recovers the window edges.
    pub fn to_window(&self) -> CoordinateWindow {
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        CoordinateWindow {
            left: self.center.ra_deg - half_width,
            right: self.center.ra_deg + half_width,
            top: self.center.dec_deg + half_height,
            bottom: self.center.dec_deg - half_height,
        }
    }
}

/// Cone search region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeRegion {
    pub center: SkyCoord,
    /// Radius in degrees
    pub radius: f64,
}

impl ConeRegion {
    pub fn new(center: SkyCoord, radius: f64) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// Declination band `(min, max)` covering the cone, clamped to the poles.
    pub fn dec_band(&self) -> (f64, f64) {
        (
            (self.center.dec_deg - self.radius).max(-90.0),
            (self.center.dec_deg + self.radius).min(90.0),
        )
    }

    /// RA ranges covering the cone.
    ///
    /// Returns one range normally and two when the cone straddles the
    /// 0/360 seam. A cone touching a pole covers every RA.
    pub fn ra_ranges(&self) -> Vec<(f64, f64)> {
        let (dec_min, dec_max) = self.dec_band();
        if dec_min <= -90.0 || dec_max >= 90.0 {
            return vec![(0.0, 360.0)];
        }

        // widest RA offset of the circle: sin(dRA) = sin(r) / cos(dec)
        let sin_radius = self.radius.to_radians().sin();
        let cos_dec = self.center.dec_deg.to_radians().cos();
        if self.radius >= 90.0 || sin_radius >= cos_dec {
            return vec![(0.0, 360.0)];
        }
        let half_width = (sin_radius / cos_dec).asin().to_degrees();

        let low = self.center.ra_deg - half_width;
        let high = self.center.ra_deg + half_width;
        if low < 0.0 {
            vec![(0.0, high), (low + 360.0, 360.0)]
        } else if high >= 360.0 {
            vec![(0.0, high - 360.0), (low, 360.0)]
        } else {
            vec![(low, high)]
        }
    }

    /// True when the coordinate lies within the radius.
    pub fn contains(&self, coord: &SkyCoord) -> bool {
        self.center.separation(coord) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_window_scenario() {
        let window =
            CoordinateWindow::from_corners(SkyCoord::new(10.0, 20.0), SkyCoord::new(5.0, 15.0));

        assert_eq!(window.left(), 5.0);
        assert_eq!(window.right(), 10.0);
        assert_eq!(window.bottom(), 15.0);
        assert_eq!(window.top(), 20.0);
        assert_eq!(window.center(), SkyCoord::new(7.5, 17.5));
        assert_eq!(window.width(), 5.0);
        assert_eq!(window.height(), 5.0);
    }

    #[test]
    fn test_window_swap_invariance() {
        let corners = [
            (SkyCoord::new(200.25, -30.5), SkyCoord::new(201.75, -29.0)),
            (SkyCoord::new(0.0, 89.0), SkyCoord::new(359.5, 80.0)),
            (SkyCoord::new(45.0, 0.0), SkyCoord::new(45.0, 0.0)),
        ];
        for (a, b) in corners {
            let forward = CoordinateWindow::from_corners(a, b);
            let reversed = CoordinateWindow::from_corners(b, a);
            let mixed = CoordinateWindow::from_corners(
                SkyCoord::new(a.ra_deg, b.dec_deg),
                SkyCoord::new(b.ra_deg, a.dec_deg),
            );
            assert_eq!(forward, reversed);
            assert_eq!(forward, mixed);
            assert_eq!(forward.to_region(), reversed.to_region());
            assert!(forward.right() >= forward.left());
            assert!(forward.top() >= forward.bottom());
        }
    }

    #[test]
    fn test_region_recovers_window() {
        let window = CoordinateWindow::from_corners(
            SkyCoord::new(83.1234, -5.9),
            SkyCoord::new(84.0017, -4.25),
        );
        let back = window.to_region().to_window();

        assert!((back.left() - window.left()).abs() < EPS);
        assert!((back.right() - window.right()).abs() < EPS);
        assert!((back.top() - window.top()).abs() < EPS);
        assert!((back.bottom() - window.bottom()).abs() < EPS);
    }

    #[test]
    fn test_parse_sexagesimal() {
        let ra = parse_ra_hms("14 39 36.49").unwrap();
        assert!((ra - (14.0 + 39.0 / 60.0 + 36.49 / 3600.0) * 15.0).abs() < EPS);

        let dec = parse_dec_dms("-60 50 02.3").unwrap();
        assert!((dec + (60.0 + 50.0 / 60.0 + 2.3 / 3600.0)).abs() < EPS);

        assert!((parse_dec_dms("-00 30 00").unwrap() + 0.5).abs() < EPS);
        assert!((parse_dec_dms("+12").unwrap() - 12.0).abs() < EPS);
        assert!((parse_ra_hms("06:45").unwrap() - 101.25).abs() < EPS);
    }

    #[test]
    fn test_parse_sexagesimal_rejects_garbage() {
        assert_eq!(parse_ra_hms("  "), Err(AngleParseError::Empty));
        assert!(matches!(
            parse_ra_hms("12 3x 00"),
            Err(AngleParseError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse_ra_hms("25 00 00"),
            Err(AngleParseError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_dec_dms("10 61 00"),
            Err(AngleParseError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse_dec_dms("1 2 3 4"),
            Err(AngleParseError::TooManyComponents(_))
        ));
    }

    #[test]
    fn test_format_sexagesimal() {
        assert_eq!(format_ra_hms(219.9020417), "14 39 36.490");
        assert_eq!(format_dec_dms(-60.8339722), "-60 50 02.30");
        assert_eq!(format_dec_dms(0.25), "+00 15 00.00");
    }

    #[test]
    fn test_wrap_ra() {
        assert_eq!(wrap_ra(-10.0), 350.0);
        assert_eq!(wrap_ra(370.0), 10.0);
        assert_eq!(wrap_ra(360.0), 0.0);
    }

    #[test]
    fn test_angular_separation() {
        assert!(angular_separation(180.0, 45.0, 180.0, 45.0).abs() < 1e-10);
        assert!((angular_separation(0.0, 90.0, 0.0, -90.0) - 180.0).abs() < 1e-10);
        assert!((angular_separation(359.5, 0.0, 0.5, 0.0) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cone_ra_ranges_split_at_seam() {
        let cone = ConeRegion::new(SkyCoord::new(359.0, 0.0), 2.0);
        let ranges = cone.ra_ranges();
        assert_eq!(ranges.len(), 2);
        assert!((ranges[0].0 - 0.0).abs() < EPS && (ranges[0].1 - 1.0).abs() < EPS);
        assert!((ranges[1].0 - 357.0).abs() < EPS && (ranges[1].1 - 360.0).abs() < EPS);

        let cone = ConeRegion::new(SkyCoord::new(1.0, 0.0), 2.0);
        let ranges = cone.ra_ranges();
        assert_eq!(ranges.len(), 2);
        assert!((ranges[1].0 - 359.0).abs() < EPS);

        let polar = ConeRegion::new(SkyCoord::new(120.0, 89.5), 1.0);
        assert_eq!(polar.ra_ranges(), vec![(0.0, 360.0)]);
        assert_eq!(polar.dec_band(), (88.5, 90.0));
    }

    #[test]
    fn test_cone_widens_with_declination() {
        let cone = ConeRegion::new(SkyCoord::new(180.0, 60.0), 1.0);
        let ranges = cone.ra_ranges();
        assert_eq!(ranges.len(), 1);
        let (low, high) = ranges[0];
        let half_width = (1f64.to_radians().sin() / 60f64.to_radians().cos())
            .asin()
            .to_degrees();
        assert!((high - low - 2.0 * half_width).abs() < 1e-9);
        assert!(high - low > 4.0);
        assert!(cone.contains(&SkyCoord::new(181.9, 60.0)));
        assert!(!cone.contains(&SkyCoord::new(182.1, 60.0)));
    }

    #[test]
    fn test_cone_ra_range_covers_widest_member() {
        for (dec, radius) in [(60.0, 5.0), (80.0, 9.0), (-45.0, 3.0), (0.0, 10.0)] {
            let cone = ConeRegion::new(SkyCoord::new(180.0, dec), radius);
            let ranges = cone.ra_ranges();
            assert_eq!(ranges.len(), 1);
            let (low, high) = ranges[0];

            // the circle's widest RA offset lies at dec' = asin(sin(dec) / cos(r))
            let (dec_r, radius_r) = (f64::to_radians(dec), f64::to_radians(radius));
            let edge_dec = (dec_r.sin() / radius_r.cos()).asin();
            let d_ra = ((radius_r.cos() - dec_r.sin() * edge_dec.sin())
                / (dec_r.cos() * edge_dec.cos()))
            .acos()
            .to_degrees();

            // points just inside the radius at the widest offset, both sides
            for sign in [1.0, -1.0] {
                let edge = SkyCoord::new(180.0 + sign * d_ra * 0.999, edge_dec.to_degrees());
                assert!(cone.contains(&edge), "dec {dec} r {radius}: {edge:?}");
                assert!(
                    edge.ra_deg >= low && edge.ra_deg <= high,
                    "dec {dec} r {radius}: {edge:?} outside {ranges:?}"
                );
            }
        }

        let wide = ConeRegion::new(SkyCoord::new(10.0, 80.0), 12.0);
        assert_eq!(wide.ra_ranges(), vec![(0.0, 360.0)]);
    }
}
