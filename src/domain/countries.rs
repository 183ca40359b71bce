use crate::domain::model::Country;

macro_rules! countries {
    ($($code:literal => $name:literal),* $(,)?) => {
        &[$(Country { code: $code, name: $name }),*]
    };
}

/// Canonical lookup is by `code`; names are for display only.
pub static COUNTRIES: &[Country] = countries![
    "US" => "United States",
    "CA" => "Canada",
    "MX" => "Mexico",
    "BR" => "Brazil",
    "AR" => "Argentina",
    "CL" => "Chile",
    "CO" => "Colombia",
    "GB" => "United Kingdom",
    "IE" => "Ireland",
    "FR" => "France",
    "DE" => "Germany",
    "NL" => "Netherlands",
    "BE" => "Belgium",
    "LU" => "Luxembourg",
    "CH" => "Switzerland",
    "AT" => "Austria",
    "IT" => "Italy",
    "ES" => "Spain",
    "PT" => "Portugal",
    "SE" => "Sweden",
    "NO" => "Norway",
    "DK" => "Denmark",
    "FI" => "Finland",
    "PL" => "Poland",
    "CZ" => "Czech Republic",
    "GR" => "Greece",
    "TR" => "Turkey",
    "IL" => "Israel",
    "AE" => "United Arab Emirates",
    "SA" => "Saudi Arabia",
    "ZA" => "South Africa",
    "NG" => "Nigeria",
    "KE" => "Kenya",
    "EG" => "Egypt",
    "IN" => "India",
    "PK" => "Pakistan",
    "CN" => "China",
    "HK" => "Hong Kong",
    "TW" => "Taiwan",
    "JP" => "Japan",
    "KR" => "South Korea",
    "SG" => "Singapore",
    "MY" => "Malaysia",
    "TH" => "Thailand",
    "VN" => "Vietnam",
    "PH" => "Philippines",
    "ID" => "Indonesia",
    "AU" => "Australia",
    "NZ" => "New Zealand",
];

pub fn find_by_code(code: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|country| country.code == code)
}

/// Display name for `code`, falling back to the code itself.
pub fn display_name(code: &str) -> String {
    find_by_code(code)
        .map(|country| country.name.to_string())
        .unwrap_or_else(|| code.to_string())
}

pub fn sorted_by_name() -> Vec<&'static Country> {
    let mut list: Vec<&'static Country> = COUNTRIES.iter().collect();
    list.sort_by(|a, b| a.name.cmp(b.name));
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_by_code() {
        assert_eq!(find_by_code("US").map(|c| c.name), Some("United States"));
        assert_eq!(find_by_code("CA").map(|c| c.name), Some("Canada"));
        assert!(find_by_code("us").is_none());
        assert_eq!(display_name("XX"), "XX");
    }

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<&str> = COUNTRIES.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), COUNTRIES.len());
    }

    #[test]
    fn test_sorted_by_name_does_not_touch_table() {
        let sorted = sorted_by_name();
        assert_eq!(sorted.len(), COUNTRIES.len());
        assert!(sorted.windows(2).all(|w| w[0].name <= w[1].name));
        assert_eq!(COUNTRIES[0].code, "US");
    }
}
