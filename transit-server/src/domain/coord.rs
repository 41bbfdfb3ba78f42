//! Geographic coordinate type.

use std::fmt;

/// Error returned for malformed or out-of-range coordinates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

impl InvalidCoordinate {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A validated WGS84 position in decimal degrees.
///
/// Latitude is within [-90, 90] and longitude within [-180, 180]; both are
/// finite. Any `Coordinate` value is valid by construction.
///
/// # Examples
///
/// ```
/// use transit_server::domain::Coordinate;
///
/// let calgary = Coordinate::new(51.0447, -114.0719).unwrap();
/// assert_eq!(calgary.lat(), 51.0447);
///
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// assert!(Coordinate::new(0.0, f64::NAN).is_err());
/// assert!(Coordinate::parse("51.0447", "-114.0719").is_ok());
/// assert!(Coordinate::parse("north", "-114.0719").is_err());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Validate a latitude/longitude pair.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(InvalidCoordinate::new("must be finite numbers"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate::new("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinate::new(
                "longitude must be within [-180, 180]",
            ));
        }
        Ok(Self { lat, lon })
    }

    /// Parse decimal-degree strings as stored in a schedule feed.
    pub fn parse(lat: &str, lon: &str) -> Result<Self, InvalidCoordinate> {
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| InvalidCoordinate::new("latitude is not a decimal number"))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| InvalidCoordinate::new("longitude is not a decimal number"))?;
        Self::new(lat, lon)
    }

    /// Latitude in decimal degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.lat, self.lon)
    }
}
