//! Fixed country and category catalogs accepted by the digest backend

/// A country the backend can filter headlines by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
}

/// Countries offered in the form, lowercase two-letter codes
pub const COUNTRIES: &[Country] = &[
    Country { code: "au", name: "Australia" },
    Country { code: "br", name: "Brazil" },
    Country { code: "ca", name: "Canada" },
    Country { code: "cn", name: "China" },
    Country { code: "eg", name: "Egypt" },
    Country { code: "fr", name: "France" },
    Country { code: "de", name: "Germany" },
    Country { code: "gr", name: "Greece" },
    Country { code: "hk", name: "Hong Kong" },
    Country { code: "in", name: "India" },
    Country { code: "ie", name: "Ireland" },
    Country { code: "il", name: "Israel" },
    Country { code: "it", name: "Italy" },
    Country { code: "jp", name: "Japan" },
    Country { code: "nl", name: "Netherlands" },
    Country { code: "no", name: "Norway" },
    Country { code: "pk", name: "Pakistan" },
    Country { code: "pe", name: "Peru" },
    Country { code: "ph", name: "Philippines" },
    Country { code: "pt", name: "Portugal" },
    Country { code: "ro", name: "Romania" },
    Country { code: "ru", name: "Russia" },
    Country { code: "sg", name: "Singapore" },
    Country { code: "es", name: "Spain" },
    Country { code: "se", name: "Sweden" },
    Country { code: "ch", name: "Switzerland" },
    Country { code: "tw", name: "Taiwan" },
    Country { code: "ua", name: "Ukraine" },
    Country { code: "gb", name: "United Kingdom" },
    Country { code: "us", name: "United States" },
];

/// Topic names the backend understands
pub const CATEGORIES: &[&str] = &[
    "General",
    "World",
    "Nation",
    "Business",
    "Technology",
    "Entertainment",
    "Sports",
    "Science",
    "Health",
];

/// At most this many categories may be selected at once
pub const MAX_CATEGORIES: usize = 4;

/// Position of a country code in the catalog
pub fn country_index(code: &str) -> Option<usize> {
    COUNTRIES.iter().position(|c| c.code == code)
}

/// Canonical catalog entry for a category name, if it is one
pub fn category(name: &str) -> Option<&'static str> {
    CATEGORIES.iter().find(|c| **c == name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_codes_are_lowercase_two_letter() {
        for country in COUNTRIES {
            assert_eq!(country.code.len(), 2, "bad code: {}", country.code);
            assert!(country.code.chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(COUNTRIES.len(), 30);
        assert_eq!(CATEGORIES.len(), 9);
    }

    #[test]
    fn test_no_duplicate_codes() {
        let mut codes: Vec<&str> = COUNTRIES.iter().map(|c| c.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), COUNTRIES.len());
    }

    #[test]
    fn test_country_lookup() {
        assert_eq!(country_index("fr"), Some(5));
        assert_eq!(country_index("xx"), None);
    }

    #[test]
    fn test_category_lookup_is_exact() {
        assert_eq!(category("World"), Some("World"));
        assert_eq!(category("world"), None);
    }
}
