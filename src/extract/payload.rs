//! Structured data islands embedded by the sites' server renderers.

use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::numeric::to_integer;
use crate::models::{Field, PartialListing};
use crate::scrapers::errors::ScrapeError;

/// Key alternates per field, as dotted paths, tried in order.
const PRICE_KEYS: &[&str] = &["price", "offers.price", "priceInfo.amount"];
const AREA_KEYS: &[&str] = &["floorSize.value", "size", "surface"];
const BEDROOM_KEYS: &[&str] = &["numberOfRooms", "bedrooms", "rooms"];
const BATHROOM_KEYS: &[&str] = &["bathrooms", "wc"];
const YEAR_KEYS: &[&str] = &["constructionYear", "yearBuilt", "builtYear"];
const ADDRESS_PARTS: &[&str] = &["streetAddress", "postalCode", "addressLocality"];

/// Keys whose presence marks a payload object as a listing.
const LISTING_HINTS: &[&str] = &["address", "offers", "floorSize", "numberOfRooms"];

/// True when `obj` carries at least one listing hint or the first segment
/// of any field's key alternates.
fn looks_like_listing(obj: &Map<String, Value>) -> bool {
    LISTING_HINTS
        .iter()
        .copied()
        .chain(
            [PRICE_KEYS, AREA_KEYS, BEDROOM_KEYS, BATHROOM_KEYS, YEAR_KEYS]
                .into_iter()
                .flatten()
                .filter_map(|path| path.split('.').next()),
        )
        .any(|key| obj.contains_key(key))
}

/// Locate the listing object in the page's structured payloads.
///
/// The `__NEXT_DATA__` island wins over JSON-LD when it holds a listing.
/// Islands that fail to parse, or carry no listing keys, are skipped.
pub fn find_listing_object(document: &Html) -> Option<Map<String, Value>> {
    next_data_listing(document).or_else(|| json_ld_listing(document))
}

fn parse_island(kind: &str, raw: &str) -> Result<Value, ScrapeError> {
    serde_json::from_str(raw)
        .map_err(|e| ScrapeError::MalformedStructuredPayload(format!("{kind}: {e}")))
}

fn next_data_listing(document: &Html) -> Option<Map<String, Value>> {
    let selector = Selector::parse("script#__NEXT_DATA__").ok()?;
    let script = document.select(&selector).next()?;
    let raw = script.text().collect::<String>();

    let payload = match parse_island("__NEXT_DATA__", &raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("{}", e);
            return None;
        }
    };

    let page_props = payload.get("props")?.get("pageProps")?;
    let estate = ["estate", "inmueble", "property"]
        .iter()
        .find_map(|key| page_props.get(*key).filter(|v| v.is_object()))
        .unwrap_or(page_props)
        .as_object()?;

    if !looks_like_listing(estate) {
        debug!("__NEXT_DATA__ has no listing keys");
        return None;
    }

    debug!("Using __NEXT_DATA__ payload");
    Some(estate.clone())
}

fn json_ld_listing(document: &Html) -> Option<Map<String, Value>> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;

    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        let value = match parse_island("ld+json", &raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        let candidates = match value {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("@graph") {
                Some(Value::Array(items)) => items,
                _ => vec![Value::Object(obj)],
            },
            _ => continue,
        };

        for candidate in candidates {
            if let Value::Object(obj) = candidate {
                if looks_like_listing(&obj) {
                    debug!("Using ld+json payload");
                    return Some(obj);
                }
            }
        }
    }

    None
}

fn lookup<'a>(obj: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = obj.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn value_to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => to_integer(s),
        _ => None,
    }
}

fn first_integer(obj: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .filter_map(|key| lookup(obj, key))
        .find_map(value_to_integer)
}

fn address_of(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("address")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(addr) => {
            let parts: Vec<&str> = ADDRESS_PARTS
                .iter()
                .filter_map(|key| addr.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

/// Fill `partial` from a listing object. Returns the fields it set.
pub fn apply(obj: &Map<String, Value>, partial: &mut PartialListing) -> Vec<Field> {
    let mut filled = Vec::new();
    let mut offer = |field: Field, value: Option<String>| {
        if let Some(value) = value {
            if partial.offer(field, value) {
                filled.push(field);
            }
        }
    };

    offer(Field::Address, address_of(obj));
    offer(Field::Price, first_integer(obj, PRICE_KEYS).map(|n| format!("{n} €")));
    offer(Field::LivingArea, first_integer(obj, AREA_KEYS).map(|n| format!("{n} m²")));
    offer(Field::Bedrooms, first_integer(obj, BEDROOM_KEYS).map(|n| n.to_string()));
    offer(Field::Bathrooms, first_integer(obj, BATHROOM_KEYS).map(|n| n.to_string()));
    offer(Field::YearBuilt, first_integer(obj, YEAR_KEYS).map(|n| n.to_string()));

    filled
}
