//! Placeholder records derived from a listing URL alone.
//!
//! Used when the page itself cannot be read. The address comes from the
//! URL's path segments; price, area and bedrooms are fixed illustrative
//! ranges, not estimates of this particular property.

use url::Url;

use crate::models::{ListingRecord, NOT_AVAILABLE};

pub const ESTIMATED_PRICE: &str = "€250.000 - €450.000 (estimated)";
pub const ESTIMATED_LIVING_AREA: &str = "60 - 90 m² (estimated)";
pub const ESTIMATED_BEDROOMS: &str = "2 - 3 (estimated)";

const UNKNOWN: &str = "Unknown";

/// Leading segments that carry no address information.
const PREFIX_SEGMENTS: &[&str] = &["detail", "en", "nl", "es", "ca", "it", "pt"];

/// Listing-kind segments that precede the city.
const LISTING_KINDS: &[&str] = &[
    "koop", "huur", "venta", "alquiler", "comprar", "buy", "rent", "inmueble",
];

/// Property-type prefixes on street slugs, e.g. `appartement-aragohof-4-1`.
const SLUG_PREFIXES: &[&str] = &[
    "appartement-",
    "huis-",
    "parkeergelegenheid-",
    "bouwgrond-",
    "woonhuis-",
    "piso-",
    "casa-",
    "chalet-",
    "atico-",
];

/// Address-bearing parts of a listing path
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PathParts {
    pub city: Option<String>,
    pub street: Option<String>,
    pub listing_id: Option<String>,
}

/// Split a listing path by position: optional locale/detail prefixes, a
/// listing-kind segment, then city, street slug and numeric id.
pub fn decompose(url: &Url) -> PathParts {
    let mut segments: Vec<&str> = url
        .path_segments()
        .map(|segs| segs.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    while segments
        .first()
        .is_some_and(|s| PREFIX_SEGMENTS.contains(&s.to_ascii_lowercase().as_str()))
    {
        segments.remove(0);
    }
    if segments
        .first()
        .is_some_and(|s| LISTING_KINDS.contains(&s.to_ascii_lowercase().as_str()))
    {
        segments.remove(0);
    }

    let listing_id = if segments
        .last()
        .is_some_and(|last| last.chars().all(|c| c.is_ascii_digit()))
    {
        segments.pop().map(str::to_string)
    } else {
        None
    };

    let mut rest = segments.into_iter();
    let city = rest.next().map(title_case_slug).filter(|s| !s.is_empty());
    let street = rest.next().map(street_from_slug).filter(|s| !s.is_empty());

    PathParts {
        city,
        street,
        listing_id,
    }
}

fn title_case_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn street_from_slug(slug: &str) -> String {
    let lower = slug.to_ascii_lowercase();
    let trimmed = SLUG_PREFIXES
        .iter()
        .find_map(|prefix| lower.strip_prefix(prefix))
        .unwrap_or(lower.as_str());
    title_case_slug(trimmed)
}

/// Address text for the decomposed path, never empty.
pub fn address_from(parts: &PathParts) -> String {
    let city = parts.city.as_deref().unwrap_or(UNKNOWN);
    match &parts.street {
        Some(street) => format!("{street}, {city}"),
        None => format!("Property in {city}"),
    }
}

/// Build the estimated record for `url`. Pure: no network access.
pub fn estimate(url: &Url) -> ListingRecord {
    let parts = decompose(url);

    ListingRecord {
        address: address_from(&parts),
        price: ESTIMATED_PRICE.to_string(),
        living_area: ESTIMATED_LIVING_AREA.to_string(),
        bedrooms: ESTIMATED_BEDROOMS.to_string(),
        bathrooms: NOT_AVAILABLE.to_string(),
        year_built: NOT_AVAILABLE.to_string(),
        is_estimated: true,
        source_url: url.to_string(),
    }
}
