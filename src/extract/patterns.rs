//! Per-field text and DOM candidates for the pattern-fallback phase.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Uncompiled candidate, as listed in a site profile.
#[derive(Debug, Clone)]
pub enum CandidateSpec {
    /// Normalized text of the first element matching a selector
    Selector(String),
    /// First text node containing `needle` among elements matching a selector
    SelectorContaining { css: String, needle: String },
    /// Texts of several selectors joined with ", "; every one must match
    Joined(Vec<String>),
    /// `<li>` items of the list that follows a heading with this exact text
    HeadingList(String),
    /// Capture group 1 of a pattern run over the raw content
    Regex {
        pattern: String,
        strip: String,
        suffix: String,
    },
}

/// Compiled candidate, ready to run against a page.
#[derive(Debug)]
pub enum Candidate {
    Selector(Selector),
    SelectorContaining { selector: Selector, needle: String },
    Joined(Vec<Selector>),
    HeadingList(String),
    Regex {
        regex: Regex,
        strip: String,
        suffix: String,
    },
}

fn compile_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e}"))
}

impl CandidateSpec {
    pub fn compile(&self) -> Result<Candidate> {
        Ok(match self {
            CandidateSpec::Selector(css) => Candidate::Selector(compile_selector(css)?),
            CandidateSpec::SelectorContaining { css, needle } => Candidate::SelectorContaining {
                selector: compile_selector(css)?,
                needle: needle.clone(),
            },
            CandidateSpec::Joined(parts) => Candidate::Joined(
                parts
                    .iter()
                    .map(|css| compile_selector(css))
                    .collect::<Result<_>>()?,
            ),
            CandidateSpec::HeadingList(heading) => Candidate::HeadingList(heading.clone()),
            CandidateSpec::Regex {
                pattern,
                strip,
                suffix,
            } => Candidate::Regex {
                regex: Regex::new(pattern).with_context(|| format!("invalid pattern {pattern:?}"))?,
                strip: strip.clone(),
                suffix: suffix.clone(),
            },
        })
    }
}

fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(normalized_text)
        .find(|text| !text.is_empty())
}

impl Candidate {
    /// Run against a page. `raw` is the unparsed content `document` came from.
    pub fn matches(&self, document: &Html, raw: &str) -> Option<String> {
        match self {
            Candidate::Selector(selector) => first_text(document, selector),
            Candidate::SelectorContaining { selector, needle } => document
                .select(selector)
                .flat_map(|el| el.text())
                .map(str::trim)
                .find(|text| text.contains(needle.as_str()))
                .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" ")),
            Candidate::Joined(selectors) => {
                let parts = selectors
                    .iter()
                    .map(|selector| first_text(document, selector))
                    .collect::<Option<Vec<_>>>()?;
                Some(parts.join(", "))
            }
            Candidate::HeadingList(heading) => heading_list(document, heading),
            Candidate::Regex {
                regex,
                strip,
                suffix,
            } => {
                let captured = regex.captures(raw)?.get(1)?.as_str();
                let mut value: String = captured.chars().filter(|c| !strip.contains(*c)).collect();
                if value.trim().is_empty() {
                    return None;
                }
                value.push_str(suffix);
                Some(value)
            }
        }
    }
}

fn heading_list(document: &Html, heading: &str) -> Option<String> {
    let headings = Selector::parse("h2, h3").ok()?;
    let items = Selector::parse("li").ok()?;

    let title = document
        .select(&headings)
        .find(|el| normalized_text(*el).eq_ignore_ascii_case(heading))?;

    let list = title
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "ul" | "ol"))?;

    let entries: Vec<String> = list
        .select(&items)
        .map(normalized_text)
        .filter(|text| !text.is_empty())
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(spec: CandidateSpec, html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        spec.compile().unwrap().matches(&doc, html)
    }

    #[test]
    fn selector_normalizes_whitespace() {
        let html = "<div class='price'>\n  € 450.000\n  k.k.\n</div>";
        assert_eq!(
            run(CandidateSpec::Selector(".price".into()), html),
            Some("€ 450.000 k.k.".to_string())
        );
    }

    #[test]
    fn containing_takes_first_matching_text_node() {
        let html = "<ul class='f'><li>3 kamers</li><li><span>85 m²</span><span>wonen</span></li></ul>";
        let spec = CandidateSpec::SelectorContaining {
            css: "ul.f li".into(),
            needle: "m²".into(),
        };
        assert_eq!(run(spec, html), Some("85 m²".to_string()));
    }

    #[test]
    fn joined_requires_every_part() {
        let html = "<h1><span class='a'>Aragohof 4-1</span><span class='b'>1098 AB Amsterdam</span></h1>";
        let both = CandidateSpec::Joined(vec!["h1 .a".into(), "h1 .b".into()]);
        let missing = CandidateSpec::Joined(vec!["h1 .a".into(), "h1 .c".into()]);
        assert_eq!(run(both, html), Some("Aragohof 4-1, 1098 AB Amsterdam".to_string()));
        assert_eq!(run(missing, html), None);
    }

    #[test]
    fn heading_list_reads_following_list() {
        let html = "<section><h2>Ubicación</h2>\n<ul><li>Calle Mayor 1</li><li> Sol </li><li>Madrid</li></ul></section>";
        assert_eq!(
            run(CandidateSpec::HeadingList("Ubicación".into()), html),
            Some("Calle Mayor 1, Sol, Madrid".to_string())
        );
    }

    #[test]
    fn regex_strips_and_suffixes() {
        let spec = CandidateSpec::Regex {
            pattern: r"([\d\.]+)\s*€".into(),
            strip: ".".into(),
            suffix: " €".into(),
        };
        assert_eq!(run(spec, "<p>Precio 325.000 €</p>"), Some("325000 €".to_string()));
    }

    #[test]
    fn invalid_selector_is_an_error() {
        assert!(CandidateSpec::Selector("div[".into()).compile().is_err());
    }
}
