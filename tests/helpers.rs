#![allow(dead_code)]

use async_trait::async_trait;
use listing_scout::scrapers::{FetchStrategy, ScrapeError};
use listing_scout::Site;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// Serves the same HTML for every URL and counts calls.
pub struct StaticPage {
    pub html: String,
    pub calls: Arc<AtomicUsize>,
}

impl StaticPage {
    pub fn new(html: impl Into<String>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                html: html.into(),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl FetchStrategy for StaticPage {
    async fn fetch(&self, _url: &Url, _site: Site) -> Result<String, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.clone())
    }

    fn name(&self) -> &'static str {
        "static-page"
    }
}

/// Always fails with the error `make` builds.
pub struct Failing {
    pub make: fn() -> ScrapeError,
    pub calls: Arc<AtomicUsize>,
}

impl Failing {
    pub fn new(make: fn() -> ScrapeError) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                make,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl FetchStrategy for Failing {
    async fn fetch(&self, _url: &Url, _site: Site) -> Result<String, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.make)())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// A Funda listing page carrying a full `__NEXT_DATA__` payload.
pub fn funda_listing_html() -> String {
    r#"<!DOCTYPE html><html><head><title>Aragohof 4-1 Amsterdam [funda]</title>
<script id="__NEXT_DATA__" type="application/json">{"props":{"pageProps":{"property":{
  "address":{"streetAddress":"Aragohof 4-1","postalCode":"1098 AB","addressLocality":"Amsterdam"},
  "offers":{"price":425000},"floorSize":{"value":72},"numberOfRooms":3,"bathrooms":1,"yearBuilt":1964}}}}</script>
</head><body><h1><span class="block text-2xl font-bold">Aragohof 4-1</span></h1>
<p>Een licht appartement met balkon op het zuiden, dichtbij het Science Park.</p></body></html>"#
        .to_string()
}

/// The Funda bot-check interstitial, with a payload that must be ignored.
pub fn blocked_html() -> String {
    format!(
        "<html><head><title>Je bent bijna op de pagina die je zoekt [funda]</title></head><body>{}</body></html>",
        funda_listing_html()
    )
}

/// A current-markup Funda page without any structured payload.
pub fn funda_markup_html() -> String {
    r#"<!DOCTYPE html><html><head><title>Aragohof 4-1 Amsterdam [funda]</title></head><body>
<h1><span class="block text-2xl font-bold">Aragohof 4-1</span>
    <span class="text-neutral-40">1098 AB Amsterdam</span></h1>
<div class="mt-5 flex flex-wrap items-center gap-3"><span>€ 425.000 k.k.</span></div>
<ul class="flex flex-wrap gap-4">
    <li><span>72 m²</span><span>wonen</span></li>
    <li><span class="md:font-bold">2</span><span>slaapkamers</span></li>
</ul>
<dl><dt>Aantal badkamers</dt><dd>1 badkamer</dd><dt>Bouwjaar</dt><dd>1964</dd></dl>
<p>Een licht appartement met balkon op het zuiden, dichtbij het Science Park.</p></body></html>"#
        .to_string()
}
