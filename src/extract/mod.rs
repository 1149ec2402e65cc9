//! Listing extraction: structured payload first, then per-field patterns.

pub mod numeric;
pub mod patterns;
pub mod payload;
pub mod sites;

use std::collections::HashMap;

use anyhow::Result;
use scraper::Html;
use tracing::debug;

use crate::models::{Field, ListingRecord, PartialListing, Site};
use patterns::{Candidate, CandidateSpec};

/// Extractor for one site dialect, parameterized by ordered candidates
/// per field.
#[derive(Debug)]
pub struct Extractor {
    site: Site,
    candidates: HashMap<Field, Vec<Candidate>>,
}

impl Extractor {
    pub fn builder(site: Site) -> ExtractorBuilder {
        ExtractorBuilder {
            site,
            candidates: Vec::new(),
        }
    }

    /// Extractor with the built-in candidates for `site`.
    pub fn for_site(site: Site) -> Result<Self> {
        sites::profile(site).build()
    }

    pub fn site(&self) -> Site {
        self.site
    }

    /// Two-phase extraction. Never fails: unfilled fields become sentinels.
    pub fn extract(&self, source_url: &str, raw: &str) -> ListingRecord {
        self.extract_partial(raw).finish(source_url)
    }

    pub fn extract_partial(&self, raw: &str) -> PartialListing {
        let document = Html::parse_document(raw);
        let mut partial = PartialListing::default();

        if let Some(obj) = payload::find_listing_object(&document) {
            let filled = payload::apply(&obj, &mut partial);
            debug!(site = self.site.name(), "payload filled {} fields", filled.len());
        }

        for field in partial.missing() {
            let Some(candidates) = self.candidates.get(&field) else {
                continue;
            };
            if let Some((idx, value)) = candidates
                .iter()
                .enumerate()
                .find_map(|(idx, c)| c.matches(&document, raw).map(|v| (idx, v)))
            {
                debug!(field = field.label(), candidate = idx, "pattern matched: {}", value);
                partial.offer(field, value);
            }
        }

        partial
    }
}

/// Collects candidate specs, compiles them on [`ExtractorBuilder::build`].
#[derive(Debug, Clone)]
pub struct ExtractorBuilder {
    site: Site,
    candidates: Vec<(Field, CandidateSpec)>,
}

impl ExtractorBuilder {
    pub fn candidate(mut self, field: Field, spec: CandidateSpec) -> Self {
        self.candidates.push((field, spec));
        self
    }

    pub fn selector(self, field: Field, css: &str) -> Self {
        self.candidate(field, CandidateSpec::Selector(css.to_string()))
    }

    pub fn selector_containing(self, field: Field, css: &str, needle: &str) -> Self {
        self.candidate(
            field,
            CandidateSpec::SelectorContaining {
                css: css.to_string(),
                needle: needle.to_string(),
            },
        )
    }

    pub fn joined(self, field: Field, selectors: &[&str]) -> Self {
        self.candidate(
            field,
            CandidateSpec::Joined(selectors.iter().map(|s| s.to_string()).collect()),
        )
    }

    pub fn heading_list(self, field: Field, heading: &str) -> Self {
        self.candidate(field, CandidateSpec::HeadingList(heading.to_string()))
    }

    pub fn regex(self, field: Field, pattern: &str) -> Self {
        self.regex_with(field, pattern, "", "")
    }

    /// Regex candidate whose capture drops `strip` characters and gains `suffix`.
    pub fn regex_with(self, field: Field, pattern: &str, strip: &str, suffix: &str) -> Self {
        self.candidate(
            field,
            CandidateSpec::Regex {
                pattern: pattern.to_string(),
                strip: strip.to_string(),
                suffix: suffix.to_string(),
            },
        )
    }

    pub fn build(self) -> Result<Extractor> {
        let mut candidates: HashMap<Field, Vec<Candidate>> = HashMap::new();
        for (field, spec) in &self.candidates {
            candidates.entry(*field).or_default().push(spec.compile()?);
        }
        Ok(Extractor {
            site: self.site,
            candidates,
        })
    }
}
