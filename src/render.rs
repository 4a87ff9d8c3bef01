//! Prose description of an [`AddressInfoRecord`].

use crate::record::{AddressInfoRecord, Field};

const MISSING: &str = "unknown";

/// Placeholder shown before any lookup has succeeded.
pub const NO_INFO: &str = "No IP information available.";

/// Describe the record in four paragraphs. Absent attributes render as
/// `unknown`, so this never fails regardless of what the service sent.
pub fn describe(record: &AddressInfoRecord) -> Vec<String> {
    let v = |field: Field| record.text(field).unwrap_or_else(|| MISSING.to_string());

    vec![
        format!(
            "You are located in {}, {}, {} ({}). Your IP address is {}, and it belongs to the {} network.",
            v(Field::City),
            v(Field::Region),
            v(Field::CountryName),
            v(Field::CountryCode),
            v(Field::Ip),
            v(Field::Network),
        ),
        format!(
            "Your geographical coordinates are approximately {}, {}. You are in the {} timezone (UTC {}), and the postal code for your area is {}.",
            coordinate(record.text(Field::Latitude), 'N', 'S'),
            coordinate(record.text(Field::Longitude), 'E', 'W'),
            v(Field::Timezone),
            v(Field::UtcOffset),
            v(Field::Postal),
        ),
        format!(
            "The country calling code is {}, and the country area covers approximately {} square kilometers with a population of {} people. The official currency is the {} ({}).",
            v(Field::CallingCode),
            v(Field::CountryArea),
            v(Field::CountryPopulation),
            v(Field::CurrencyName),
            v(Field::Currency),
        ),
        format!(
            "Languages spoken in your region include {}, and you are part of the {} continent. Your IP belongs to the Autonomous System Number (ASN) {}, which is associated with {}.",
            v(Field::Languages),
            v(Field::ContinentCode),
            v(Field::Asn),
            v(Field::Org),
        ),
    ]
}

/// Format a signed decimal degree with its hemisphere letter.
fn coordinate(raw: Option<String>, positive: char, negative: char) -> String {
    let Some(raw) = raw else {
        return MISSING.to_string();
    };
    match raw.parse::<f64>() {
        Ok(deg) if deg < 0.0 => format!("{}° {}", -deg, negative),
        // abs() folds -0.0 into 0
        Ok(deg) => format!("{}° {}", deg.abs(), positive),
        Err(_) => raw,
    }
}
