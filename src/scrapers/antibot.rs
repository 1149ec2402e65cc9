//! Recognizes bot-detection interstitials and unusable responses.

use super::errors::ScrapeError;

/// Phrases found on the challenge pages the listing sites serve to bots.
const BLOCK_MARKERS: &[&str] = &[
    "je bent bijna op de pagina die je zoekt",
    "captcha-delivery.com",
    "please enable js and disable any ad blocker",
    "pardon our interruption",
    "attention required! | cloudflare",
    "checking your browser before accessing",
    "access denied",
    "se ha detectado un uso indebido",
];

/// Shorter bodies cannot hold a listing page.
const MIN_CONTENT_LEN: usize = 100;

/// The first block marker present in `html`, if any.
pub fn block_marker(html: &str) -> Option<&'static str> {
    let lower = html.to_lowercase();
    BLOCK_MARKERS
        .iter()
        .copied()
        .find(|marker| lower.contains(marker))
}

pub fn is_blocked(html: &str) -> bool {
    block_marker(html).is_some()
}

/// Accept content only if it is neither near-empty nor a block page.
pub fn check_usable(html: &str) -> Result<(), ScrapeError> {
    if html.trim().len() < MIN_CONTENT_LEN {
        return Err(ScrapeError::EmptyContent);
    }
    if let Some(marker) = block_marker(html) {
        return Err(ScrapeError::BlockedByAntiBot(marker.to_string()));
    }
    Ok(())
}
