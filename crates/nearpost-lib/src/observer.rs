use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::record::in_domain;

/// The querying party's coordinate at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObserverPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl ObserverPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Construct a position from device input, rejecting non-finite or
    /// out-of-domain values.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self> {
        if latitude.is_finite() && longitude.is_finite() && in_domain(latitude, longitude) {
            Ok(Self::new(latitude, longitude))
        } else {
            Err(Error::InvalidObserver {
                latitude: latitude.to_string(),
                longitude: longitude.to_string(),
            })
        }
    }
}

impl fmt::Display for ObserverPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"` or `"lat lon"`.
impl FromStr for ObserverPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty());

        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::InvalidObserver {
                latitude: s.trim().to_string(),
                longitude: String::new(),
            });
        };

        let invalid = || Error::InvalidObserver {
            latitude: lat.to_string(),
            longitude: lon.to_string(),
        };
        let latitude = lat.parse::<f64>().map_err(|_| invalid())?;
        let longitude = lon.parse::<f64>().map_err(|_| invalid())?;
        Self::checked(latitude, longitude)
    }
}
