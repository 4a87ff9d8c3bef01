//! Geolocation metadata for one address, as returned by the lookup service.
//!
//! The record keeps the service's JSON object untouched. Every attribute is
//! optional and may come back as a string or a number depending on the
//! provider, so accessors render scalars to text instead of enforcing a
//! schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attributes the form knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ip,
    City,
    Region,
    CountryName,
    CountryCode,
    Network,
    Latitude,
    Longitude,
    Timezone,
    UtcOffset,
    Postal,
    CallingCode,
    CountryArea,
    CountryPopulation,
    CurrencyName,
    Currency,
    Languages,
    ContinentCode,
    Asn,
    Org,
}

impl Field {
    /// Key used by the lookup service's JSON body.
    pub fn key(self) -> &'static str {
        match self {
            Field::Ip => "ip",
            Field::City => "city",
            Field::Region => "region",
            Field::CountryName => "country_name",
            Field::CountryCode => "country_code",
            Field::Network => "network",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::Timezone => "timezone",
            Field::UtcOffset => "utc_offset",
            Field::Postal => "postal",
            Field::CallingCode => "country_calling_code",
            Field::CountryArea => "country_area",
            Field::CountryPopulation => "country_population",
            Field::CurrencyName => "currency_name",
            Field::Currency => "currency",
            Field::Languages => "languages",
            Field::ContinentCode => "continent_code",
            Field::Asn => "asn",
            Field::Org => "org",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressInfoRecord {
    attrs: Map<String, Value>,
}

impl AddressInfoRecord {
    pub fn from_map(attrs: Map<String, Value>) -> Self {
        Self { attrs }
    }

    /// Raw value for `field`, if the service supplied one.
    pub fn get(&self, field: Field) -> Option<&Value> {
        self.attrs.get(field.key()).filter(|v| !v.is_null())
    }

    /// `field` rendered as text. Strings, numbers and booleans are
    /// supported; nulls, arrays and objects count as absent.
    pub fn text(&self, field: Field) -> Option<String> {
        match self.get(field)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Every attribute as received, including ones [`Field`] does not name.
    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> AddressInfoRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_text_renders_scalars() {
        let r = record(json!({
            "city": "Mountain View",
            "latitude": 37.386,
            "country_population": 327167434,
            "in_eu": false,
        }));
        assert_eq!(r.text(Field::City).as_deref(), Some("Mountain View"));
        assert_eq!(r.text(Field::Latitude).as_deref(), Some("37.386"));
        assert_eq!(r.text(Field::CountryPopulation).as_deref(), Some("327167434"));
        assert_eq!(r.attrs().get("in_eu"), Some(&json!(false)));
    }

    #[test]
    fn test_missing_null_and_empty_are_absent() {
        let r = record(json!({ "region": null, "postal": "", "languages": ["en"] }));
        assert!(r.text(Field::City).is_none());
        assert!(r.text(Field::Region).is_none());
        assert!(r.get(Field::Region).is_none());
        assert!(r.text(Field::Postal).is_none());
        assert!(r.text(Field::Languages).is_none());
    }

    #[test]
    fn test_serializes_verbatim() {
        let body = json!({ "ip": "8.8.8.8", "custom": { "nested": 1 } });
        let r = record(body.clone());
        assert_eq!(serde_json::to_value(&r).unwrap(), body);
        assert_eq!(r.attrs().len(), 2);
    }
}
