use serde::{Deserialize, Serialize};
use url::Url;

use crate::extract::numeric::{to_amount, to_number};

/// Placeholder for a field extraction could not fill.
pub const NOT_FOUND: &str = "Not found";
/// Placeholder for a field the estimator has no basis for.
pub const NOT_AVAILABLE: &str = "Not available";

/// Listing website a URL belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Funda,
    Idealista,
}

impl Site {
    /// Detect the site from a URL host, subdomains included.
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_ascii_lowercase();
        let matches = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));

        if matches("funda.nl") {
            Some(Site::Funda)
        } else if matches("idealista.com") {
            Some(Site::Idealista)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Site::Funda => "Funda",
            Site::Idealista => "Idealista",
        }
    }

    /// Accept-Language sent by the browser and direct tiers
    pub fn accept_language(&self) -> &'static str {
        match self {
            Site::Funda => "nl-NL,nl;q=0.9,en;q=0.8",
            Site::Idealista => "es-ES,es;q=0.9,en;q=0.8",
        }
    }

    /// Country the rendering proxy should exit from
    pub fn proxy_country(&self) -> &'static str {
        match self {
            Site::Funda => "nl",
            Site::Idealista => "es",
        }
    }

    /// Element whose presence proves the listing body rendered
    pub fn content_marker(&self) -> &'static str {
        match self {
            Site::Funda => "h1 span",
            Site::Idealista => "span.main-info__title-main",
        }
    }
}

/// Normalized listing attributes handed to the analysis stage.
///
/// Every field holds either an extracted literal or one of the sentinels
/// [`NOT_FOUND`] / [`NOT_AVAILABLE`]. Records are built once, through
/// [`PartialListing::finish`] or the estimator, and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub address: String,
    pub price: String,
    pub living_area: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub year_built: String,
    pub is_estimated: bool,
    pub source_url: String,
}

impl ListingRecord {
    /// Price per square meter, rounded to cents.
    ///
    /// `None` when either value is a sentinel, a range, or the area is not
    /// positive.
    pub fn price_per_sqm(&self) -> Option<f64> {
        let price = to_amount(&self.price)?;
        let area = to_number(&self.living_area)?;
        if area <= 0.0 {
            return None;
        }
        Some((price / area * 100.0).round() / 100.0)
    }
}

/// The six extractable fields, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Address,
    Price,
    LivingArea,
    Bedrooms,
    Bathrooms,
    YearBuilt,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Address,
        Field::Price,
        Field::LivingArea,
        Field::Bedrooms,
        Field::Bathrooms,
        Field::YearBuilt,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Address => "address",
            Field::Price => "price",
            Field::LivingArea => "living_area",
            Field::Bedrooms => "bedrooms",
            Field::Bathrooms => "bathrooms",
            Field::YearBuilt => "year_built",
        }
    }
}

/// Record under construction during extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialListing {
    address: Option<String>,
    price: Option<String>,
    living_area: Option<String>,
    bedrooms: Option<String>,
    bathrooms: Option<String>,
    year_built: Option<String>,
}

impl PartialListing {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Address => &mut self.address,
            Field::Price => &mut self.price,
            Field::LivingArea => &mut self.living_area,
            Field::Bedrooms => &mut self.bedrooms,
            Field::Bathrooms => &mut self.bathrooms,
            Field::YearBuilt => &mut self.year_built,
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Address => &self.address,
            Field::Price => &self.price,
            Field::LivingArea => &self.living_area,
            Field::Bedrooms => &self.bedrooms,
            Field::Bathrooms => &self.bathrooms,
            Field::YearBuilt => &self.year_built,
        };
        value.as_deref()
    }

    pub fn is_set(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Fill `field` unless it already holds a value. Returns whether the
    /// value was stored. Blank values are ignored.
    pub fn offer(&mut self, field: Field, value: impl Into<String>) -> bool {
        let value = value.into();
        let value = value.trim();
        let slot = self.slot(field);
        if slot.is_some() || value.is_empty() {
            return false;
        }
        *slot = Some(value.to_string());
        true
    }

    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| !self.is_set(*field))
            .collect()
    }

    /// Address and price are what make a record worth analysing.
    pub fn has_core_fields(&self) -> bool {
        self.is_set(Field::Address) && self.is_set(Field::Price)
    }

    pub fn finish(self, source_url: &str) -> ListingRecord {
        let or_sentinel = |value: Option<String>| value.unwrap_or_else(|| NOT_FOUND.to_string());
        ListingRecord {
            address: or_sentinel(self.address),
            price: or_sentinel(self.price),
            living_area: or_sentinel(self.living_area),
            bedrooms: or_sentinel(self.bedrooms),
            bathrooms: or_sentinel(self.bathrooms),
            year_built: or_sentinel(self.year_built),
            is_estimated: false,
            source_url: source_url.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_sites_by_host() {
        let funda = Url::parse("https://www.funda.nl/detail/koop/amsterdam/x/1/").unwrap();
        let idealista = Url::parse("https://www.idealista.com/inmueble/106396109/").unwrap();
        let other = Url::parse("https://www.booli.se/annons/1").unwrap();
        let lookalike = Url::parse("https://notfunda.nl/koop/").unwrap();

        assert_eq!(Site::from_url(&funda), Some(Site::Funda));
        assert_eq!(Site::from_url(&idealista), Some(Site::Idealista));
        assert_eq!(Site::from_url(&other), None);
        assert_eq!(Site::from_url(&lookalike), None);
    }

    #[test]
    fn offer_never_overwrites() {
        let mut partial = PartialListing::default();
        assert!(partial.offer(Field::Price, "450000 €"));
        assert!(!partial.offer(Field::Price, "1 €"));
        assert!(!partial.offer(Field::Bedrooms, "   "));
        assert_eq!(partial.get(Field::Price), Some("450000 €"));
        assert!(!partial.is_set(Field::Bedrooms));
    }

    #[test]
    fn finish_fills_sentinels() {
        let mut partial = PartialListing::default();
        partial.offer(Field::Address, "Aragohof 4-1, 1098 AB Amsterdam");
        let record = partial.finish("https://www.funda.nl/x");

        assert_eq!(record.address, "Aragohof 4-1, 1098 AB Amsterdam");
        assert_eq!(record.price, NOT_FOUND);
        assert_eq!(record.year_built, NOT_FOUND);
        assert!(!record.is_estimated);
    }

    #[test]
    fn price_per_sqm_uses_coercion() {
        let mut partial = PartialListing::default();
        partial.offer(Field::Price, "450000 €");
        partial.offer(Field::LivingArea, "75 m²");
        let record = partial.finish("https://www.funda.nl/x");
        assert_eq!(record.price_per_sqm(), Some(6000.0));

        let missing = PartialListing::default().finish("https://www.funda.nl/x");
        assert_eq!(missing.price_per_sqm(), None);
    }

    #[test]
    fn price_per_sqm_reads_markup_prices() {
        let mut funda = PartialListing::default();
        funda.offer(Field::Price, "€ 425.000 k.k.");
        funda.offer(Field::LivingArea, "72 m²");
        assert_eq!(funda.finish("https://www.funda.nl/x").price_per_sqm(), Some(5902.78));

        let mut idealista = PartialListing::default();
        idealista.offer(Field::Price, "310.000 €");
        idealista.offer(Field::LivingArea, "95 m²");
        assert_eq!(idealista.finish("https://www.idealista.com/x").price_per_sqm(), Some(3263.16));
    }
}
