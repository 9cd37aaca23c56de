//! Local time resolution for GPS fixes.
//!
//! `TimezoneResolver` hides the geographic lookup so the assembler can be
//! driven by an offline boundary dataset in production and by fixed zones in
//! tests. A coordinate with no zone resolves to UTC.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;
use tzf_rs::DefaultFinder;

/// Maps a coordinate and UTC instant to local wall-clock time
pub trait TimezoneResolver {
    fn resolve(&self, latitude: f64, longitude: f64, utc: DateTime<Utc>) -> NaiveDateTime;
}

/// Convert `utc` into `zone`, or leave it as UTC when no zone applies
pub fn localize(utc: DateTime<Utc>, zone: Option<Tz>) -> NaiveDateTime {
    match zone {
        Some(tz) => utc.with_timezone(&tz).naive_local(),
        None => utc.naive_utc(),
    }
}

/// IANA zone lookup backed by the embedded timezone boundary dataset
pub struct GeoTimezoneResolver {
    finder: DefaultFinder,
}

impl std::fmt::Debug for GeoTimezoneResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoTimezoneResolver").finish_non_exhaustive()
    }
}

impl GeoTimezoneResolver {
    /// Builds the finder index; construct once per process
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }

    /// IANA zone covering the coordinate, if any
    pub fn zone_at(&self, latitude: f64, longitude: f64) -> Option<Tz> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }

        let name = self.finder.get_tz_name(longitude, latitude);
        if name.is_empty() {
            debug!("No timezone for ({}, {}), using UTC", latitude, longitude);
            return None;
        }

        match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                debug!("Unknown zone name '{}', using UTC", name);
                None
            }
        }
    }
}

impl Default for GeoTimezoneResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TimezoneResolver for GeoTimezoneResolver {
    fn resolve(&self, latitude: f64, longitude: f64, utc: DateTime<Utc>) -> NaiveDateTime {
        localize(utc, self.zone_at(latitude, longitude))
    }
}

/// Always UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcResolver;

impl TimezoneResolver for UtcResolver {
    fn resolve(&self, _latitude: f64, _longitude: f64, utc: DateTime<Utc>) -> NaiveDateTime {
        utc.naive_utc()
    }
}

/// A single fixed offset everywhere
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetResolver {
    offset: FixedOffset,
}

impl FixedOffsetResolver {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl TimezoneResolver for FixedOffsetResolver {
    fn resolve(&self, _latitude: f64, _longitude: f64, utc: DateTime<Utc>) -> NaiveDateTime {
        utc.with_timezone(&self.offset).naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn noon_utc_july() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_localize_without_zone_is_utc() {
        let utc = noon_utc_july();
        assert_eq!(localize(utc, None), utc.naive_utc());
    }

    #[test]
    fn test_localize_applies_dst_rules() {
        let summer = localize(noon_utc_july(), Some(chrono_tz::America::Chicago));
        assert_eq!(summer.hour(), 7);

        let winter_utc = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let winter = localize(winter_utc, Some(chrono_tz::America::Chicago));
        assert_eq!(winter.hour(), 6);
    }

    #[test]
    fn test_fixed_offset_resolver() {
        let resolver = FixedOffsetResolver::new(FixedOffset::east_opt(2 * 3600).unwrap());
        let local = resolver.resolve(0.0, 0.0, noon_utc_july());
        assert_eq!(local.hour(), 14);
    }

    #[test]
    fn test_utc_resolver_ignores_position() {
        let local = UtcResolver.resolve(38.97, -95.24, noon_utc_july());
        assert_eq!(local.hour(), 12);
    }

    #[test]
    fn test_geo_resolver_kansas() {
        let resolver = GeoTimezoneResolver::new();
        assert_eq!(
            resolver.zone_at(38.9717, -95.2353),
            Some(chrono_tz::America::Chicago)
        );
        let local = resolver.resolve(38.9717, -95.2353, noon_utc_july());
        assert_eq!(local.hour(), 7);
    }

    #[test]
    fn test_geo_resolver_rejects_non_finite() {
        let resolver = GeoTimezoneResolver::new();
        assert_eq!(resolver.zone_at(f64::NAN, 10.0), None);
        let local = resolver.resolve(f64::NAN, 10.0, noon_utc_july());
        assert_eq!(local.hour(), 12);
    }
}
