/*
 *  location.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Forecast coordinates: config, then GeoIP, then built-in default
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{info, warn};
use serde::Deserialize;
use std::fmt;
use std::future::Future;

use crate::error::FeedError;
use crate::http::HttpFetcher;

pub const GEOIP_URL: &str = "https://ipapi.co/json/";
pub const DEFAULT_LATITUDE: f64 = 53.607;
pub const DEFAULT_LONGITUDE: f64 = 9.9054;

/// Location information with coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub region: Option<String>,
    pub source: LocationSource,
}

/// Source of location data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationSource {
    UserConfig,
    GeoIP,
    BuiltIn,
}

impl LocationSource {
    fn tag(self) -> &'static str {
        match self {
            LocationSource::UserConfig => "config",
            LocationSource::GeoIP => "geoip",
            LocationSource::BuiltIn => "default",
        }
    }
}

impl Location {
    pub fn built_in() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            city: None,
            region: None,
            source: LocationSource::BuiltIn,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(city), Some(region)) = (&self.city, &self.region) {
            write!(f, "{}, {} ({:.4}, {:.4}) [{}]",
                city, region, self.latitude, self.longitude, self.source.tag())
        } else {
            write!(f, "({:.4}, {:.4}) [{}]",
                self.latitude, self.longitude, self.source.tag())
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum LocationError {
    InvalidCoordinates(f64, f64),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::InvalidCoordinates(lat, lng) =>
                write!(f, "Invalid coordinates: {}, {}", lat, lng),
        }
    }
}

impl std::error::Error for LocationError {}

/// ipapi.co style answer, only the fields we use
#[derive(Debug, Deserialize)]
pub struct GeoLocation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Anything that can guess where we are
pub trait GeoLookup {
    fn lookup(&self) -> impl Future<Output = Result<GeoLocation, FeedError>>;
}

pub struct HttpGeoLookup {
    http: HttpFetcher,
    url: String,
}

impl HttpGeoLookup {
    pub fn new(http: HttpFetcher) -> Self {
        Self { http, url: GEOIP_URL.to_string() }
    }
}

impl GeoLookup for HttpGeoLookup {
    async fn lookup(&self) -> Result<GeoLocation, FeedError> {
        let body = self.http.get_bytes(&self.url, &[]).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn valid(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

/// Get location from config, else GeoIP, else the built-in default.
///
/// Only bad configured coordinates are an error; a failed lookup just
/// falls through to the default.
pub async fn get_location<G: GeoLookup>(
    config_lat: Option<f64>,
    config_lng: Option<f64>,
    geo: &G,
) -> Result<Location, LocationError> {
    // Try user-specified location from config first
    match (config_lat, config_lng) {
        (Some(lat), Some(lng)) => {
            if !valid(lat, lng) {
                warn!("Invalid coordinates in config: {}, {}", lat, lng);
                return Err(LocationError::InvalidCoordinates(lat, lng));
            }
            info!("Using location from config: {:.4}, {:.4}", lat, lng);
            return Ok(Location {
                latitude: lat,
                longitude: lng,
                city: None,
                region: None,
                source: LocationSource::UserConfig,
            });
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("Config has only one of latitude/longitude, ignoring it");
        }
        (None, None) => {}
    }

    // Fall back to GeoIP lookup
    info!("No location in config, attempting GeoIP lookup...");
    match geo.lookup().await {
        Ok(found) if valid(found.latitude, found.longitude) => {
            let loc = Location {
                latitude: found.latitude,
                longitude: found.longitude,
                city: found.city,
                region: found.region_code,
                source: LocationSource::GeoIP,
            };
            info!("GeoIP lookup successful: {}", loc);
            Ok(loc)
        }
        Ok(found) => {
            warn!("GeoIP returned unusable coordinates {}, {}", found.latitude, found.longitude);
            Ok(Location::built_in())
        }
        Err(e) => {
            warn!("GeoIP lookup failed ({}): {}, using default location", e.kind(), e);
            Ok(Location::built_in())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeo(Option<(f64, f64)>);

    impl GeoLookup for FixedGeo {
        async fn lookup(&self) -> Result<GeoLocation, FeedError> {
            match self.0 {
                Some((latitude, longitude)) => Ok(GeoLocation {
                    city: Some("Norderstedt".into()),
                    region_code: Some("SH".into()),
                    latitude,
                    longitude,
                }),
                None => Err(FeedError::NetworkUnavailable("offline".into())),
            }
        }
    }

    #[tokio::test]
    async fn test_config_location() {
        let loc = get_location(Some(40.7128), Some(-74.0060), &FixedGeo(None)).await.unwrap();
        assert_eq!(loc.latitude, 40.7128);
        assert_eq!(loc.longitude, -74.0060);
        assert_eq!(loc.source, LocationSource::UserConfig);
    }

    #[tokio::test]
    async fn test_invalid_coordinates() {
        let result = get_location(Some(100.0), Some(-74.0), &FixedGeo(None)).await;
        assert_eq!(result, Err(LocationError::InvalidCoordinates(100.0, -74.0)));
    }

    #[tokio::test]
    async fn test_geoip_fallback() {
        let loc = get_location(None, None, &FixedGeo(Some((53.7, 10.0)))).await.unwrap();
        assert_eq!(loc.source, LocationSource::GeoIP);
        assert_eq!(loc.to_string(), "Norderstedt, SH (53.7000, 10.0000) [geoip]");
    }

    #[tokio::test]
    async fn test_default_when_lookup_fails() {
        let loc = get_location(Some(12.0), None, &FixedGeo(None)).await.unwrap();
        assert_eq!(loc, Location::built_in());
        assert_eq!(loc.to_string(), "(53.6070, 9.9054) [default]");
    }

    #[test]
    fn test_parse_geoip_answer() {
        let raw = br#"{"ip": "1.2.3.4", "city": "Hamburg", "region_code": "HH",
                       "country_code": "DE", "latitude": 53.55, "longitude": 9.99}"#;
        let geo: GeoLocation = serde_json::from_slice(raw).unwrap();
        assert_eq!(geo.city.as_deref(), Some("Hamburg"));
        assert_eq!(geo.latitude, 53.55);
    }
}
