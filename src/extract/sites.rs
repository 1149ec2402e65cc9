//! Candidate lists per site, newest markup revision first.

use super::ExtractorBuilder;
use crate::extract::Extractor;
use crate::models::{Field, Site};

pub fn profile(site: Site) -> ExtractorBuilder {
    match site {
        Site::Funda => funda(),
        Site::Idealista => idealista(),
    }
}

/// funda.nl, served in Dutch with an English variant.
fn funda() -> ExtractorBuilder {
    Extractor::builder(Site::Funda)
        // Address
        .joined(
            Field::Address,
            &["h1 span.block.text-2xl.font-bold", "h1 span.text-neutral-40"],
        )
        .joined(
            Field::Address,
            &[".object-header__title", ".object-header__subtitle"],
        )
        .selector(Field::Address, "h1")
        // Price
        .selector(Field::Price, "div.mt-5.flex.flex-wrap.items-center.gap-3 span")
        .selector(Field::Price, ".object-header__price")
        .regex(Field::Price, r"(€\s*[\d\.]+(?:,\d+)?(?:\s*(?:k\.k\.|v\.o\.n\.))?)")
        // Living area
        .selector_containing(Field::LivingArea, "ul.flex.flex-wrap.gap-4 li", "m²")
        .selector(Field::LivingArea, ".object-kenmerken-list [data-test='woonoppervlakte']")
        .regex_with(
            Field::LivingArea,
            r"(?i)(?:woonoppervlakte|wonen|living area)\D{0,40}?(\d+)\s*m²",
            "",
            " m²",
        )
        // Bedrooms
        .selector(
            Field::Bedrooms,
            r"ul.flex.flex-wrap.gap-4 li:nth-child(2) span.md\:font-bold",
        )
        .regex(Field::Bedrooms, r"(?i)(\d+)\s*(?:slaapkamers?|bedrooms?)")
        // Bathrooms
        .regex(Field::Bathrooms, r"(?i)(\d+)\s*(?:badkamers?|bathrooms?)")
        // Year built
        .regex(
            Field::YearBuilt,
            r"(?i)(?:bouwjaar|year of construction|construction year)\D{0,40}?(\d{4})",
        )
}

/// idealista.com, served in Spanish with an English variant.
fn idealista() -> ExtractorBuilder {
    Extractor::builder(Site::Idealista)
        // Address
        .heading_list(Field::Address, "Ubicación")
        .heading_list(Field::Address, "Location")
        .selector(Field::Address, "span.main-info__title-main")
        // Price
        .selector(Field::Price, "span.info-data-price")
        .regex_with(Field::Price, r"([\d\.]+)\s*€", ".", " €")
        // Living area
        .regex_with(Field::LivingArea, r"(\d+)\s*m²", "", " m²")
        // Bedrooms
        .regex(Field::Bedrooms, r"(?i)(\d+)\s*(?:hab|bed)")
        // Bathrooms
        .regex(Field::Bathrooms, r"(?i)(\d+)\s*(?:baño|bath)")
        // Year built
        .regex(Field::YearBuilt, r"(?i)(?:Construido en|Built in)\s*(\d{4})")
}
