//! Links to municipal and county zoning codes on Municode.
//!
//! A city inside a county has its own code of ordinances, so a known city
//! takes priority over the county link.

use flparcel_core::CountyKey;

const CITY_CODES: &[(&str, &str)] = &[
    ("TAMPA", "https://library.municode.com/fl/tampa/codes/code_of_ordinances"),
    (
        "ST. PETERSBURG",
        "https://library.municode.com/fl/st._petersburg/codes/code_of_ordinances",
    ),
    (
        "ST PETERSBURG",
        "https://library.municode.com/fl/st._petersburg/codes/code_of_ordinances",
    ),
    (
        "CLEARWATER",
        "https://library.municode.com/fl/clearwater/codes/land_development_code",
    ),
    ("SARASOTA", "https://library.municode.com/fl/sarasota/codes/code_of_ordinances"),
    ("BRADENTON", "https://library.municode.com/fl/bradenton/codes/code_of_ordinances"),
    ("PALMETTO", "https://library.municode.com/fl/palmetto/codes/code_of_ordinances"),
    ("PLANT CITY", "https://library.municode.com/fl/plant_city/codes/code_of_ordinances"),
    (
        "TEMPLE TERRACE",
        "https://library.municode.com/fl/temple_terrace/codes/code_of_ordinances",
    ),
];

fn county_code(county: CountyKey) -> &'static str {
    match county {
        CountyKey::Hillsborough => {
            "https://library.municode.com/fl/hillsborough_county/codes/land_development_code"
        }
        CountyKey::Pinellas => {
            "https://library.municode.com/fl/pinellas_county/codes/code_of_ordinances"
        }
        CountyKey::Pasco => {
            "https://library.municode.com/fl/pasco_county/codes/land_development_code"
        }
        CountyKey::Manatee => {
            "https://library.municode.com/fl/manatee_county/codes/land_development_code"
        }
        CountyKey::Sarasota => {
            "https://library.municode.com/fl/sarasota_county/codes/code_of_ordinances"
        }
    }
}

/// Code link for `city` when it has one, otherwise for `county`.
#[must_use]
pub(crate) fn municode_link(county: CountyKey, city: Option<&str>) -> &'static str {
    let city = city.map(|c| c.trim().to_uppercase()).unwrap_or_default();
    CITY_CODES
        .iter()
        .find(|(name, _)| *name == city)
        .map_or_else(|| county_code(county), |(_, url)| *url)
}

/// Search URL for `term` within the jurisdiction's code.
#[must_use]
pub(crate) fn municode_search_link(county: CountyKey, city: Option<&str>, term: &str) -> String {
    let terms: Vec<&str> = term.split_whitespace().collect();
    format!("{}?searchText={}", municode_link(county, city), terms.join("+"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn county_link_without_city() {
        assert_eq!(
            municode_link(CountyKey::Manatee, None),
            "https://library.municode.com/fl/manatee_county/codes/land_development_code"
        );
    }

    #[test]
    fn city_link_takes_priority() {
        assert_eq!(
            municode_link(CountyKey::Pinellas, Some(" clearwater ")),
            "https://library.municode.com/fl/clearwater/codes/land_development_code"
        );
        assert_eq!(
            municode_link(CountyKey::Pinellas, Some("St Petersburg")),
            municode_link(CountyKey::Pinellas, Some("st. petersburg"))
        );
    }

    #[test]
    fn unknown_city_falls_back_to_county() {
        assert_eq!(
            municode_link(CountyKey::Hillsborough, Some("Brandon")),
            municode_link(CountyKey::Hillsborough, None)
        );
    }

    #[test]
    fn search_joins_terms_with_plus() {
        assert_eq!(
            municode_search_link(CountyKey::Hillsborough, Some("Tampa"), "accessory  dwelling unit"),
            "https://library.municode.com/fl/tampa/codes/code_of_ordinances?searchText=accessory+dwelling+unit"
        );
    }
}
