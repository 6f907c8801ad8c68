//! Local phone number analysis.

use crate::error::LookupError;
use crate::timezones::REGION_TIMEZONES;
use phonenumber::{Mode, PhoneNumber};
use serde::Serialize;

/// Zone reported when a region has no recorded time zones.
const UNKNOWN_TIMEZONE: &str = "Etc/Unknown";

/// Facts derived from a parsed phone number.
///
/// `country` and `carrier` may be empty: the metadata shipped with the parser
/// carries no carrier names, and numbers in non-geographic ranges have no
/// region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneDetails {
    pub e164: String,
    pub valid: bool,
    pub country: String,
    pub carrier: String,
    pub timezones: Vec<String>,
}

/// Parse `raw` without a default region and derive its details.
pub fn analyze_phone(raw: &str) -> Result<PhoneDetails, LookupError> {
    let number =
        phonenumber::parse(None, raw).map_err(|e| LookupError::PhoneParse(e.to_string()))?;

    let region = region_code(&number);
    let country = region
        .as_deref()
        .and_then(|code| isocountry::CountryCode::for_alpha2(code).ok())
        .map(|c| c.name().to_string())
        .unwrap_or_default();

    Ok(PhoneDetails {
        e164: number.format().mode(Mode::E164).to_string(),
        valid: phonenumber::is_valid(&number),
        country,
        carrier: String::new(),
        timezones: region
            .as_deref()
            .map(timezones_for_region)
            .unwrap_or_else(|| vec![UNKNOWN_TIMEZONE.to_string()]),
    })
}

/// ISO 3166-1 alpha-2 code of the number's region, if it has one.
fn region_code(number: &PhoneNumber) -> Option<String> {
    number.country().id().map(|id| format!("{:?}", id))
}

fn timezones_for_region(region: &str) -> Vec<String> {
    let zones: &[&str] = REGION_TIMEZONES
        .binary_search_by(|(code, _)| (*code).cmp(region))
        .map(|i| REGION_TIMEZONES[i].1)
        .unwrap_or(&[UNKNOWN_TIMEZONE]);

    zones.iter().map(|z| z.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_number() {
        let details = analyze_phone("+14155552671").unwrap();

        assert_eq!(details.e164, "+14155552671");
        assert!(details.valid);
        assert!(!details.country.is_empty());
        assert!(details.timezones.contains(&"America/Los_Angeles".to_string()));
    }

    #[test]
    fn test_formatting_is_normalized() {
        let details = analyze_phone("+44 20 7946 0958").unwrap();

        assert_eq!(details.e164, "+442079460958");
        assert_eq!(details.timezones, vec!["Europe/London".to_string()]);
    }

    #[test]
    fn test_unparseable_input() {
        let err = analyze_phone("notaphone").unwrap_err();

        assert!(matches!(err, LookupError::PhoneParse(_)));
        assert!(err.to_string().starts_with("Phone parse error"));
    }

    #[test]
    fn test_unknown_region_timezone() {
        assert_eq!(timezones_for_region("ZZ"), vec![UNKNOWN_TIMEZONE.to_string()]);
    }

    #[test]
    fn test_smaller_regions_have_zones() {
        let cases = [
            ("+94112345678", "Asia/Colombo"),
            ("+9779851234567", "Asia/Kathmandu"),
            ("+37060012345", "Europe/Vilnius"),
        ];

        for (raw, zone) in cases {
            let details = analyze_phone(raw).unwrap();
            assert_eq!(details.timezones, vec![zone.to_string()], "{}", raw);
        }
    }

    #[test]
    fn test_table_is_sorted() {
        assert!(REGION_TIMEZONES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_every_parser_region_has_zones() {
        let missing: Vec<&str> = phonenumber::metadata::DATABASE
            .iter()
            .map(|meta| meta.id())
            .filter(|id| id.chars().all(|c| c.is_ascii_uppercase()))
            .filter(|id| timezones_for_region(id) == vec![UNKNOWN_TIMEZONE.to_string()])
            .collect();

        assert!(missing.is_empty(), "regions without zones: {:?}", missing);
    }
}
