use serde_json::Value;

use crate::common::ReferenceStats;

use super::fields::{first_array_of, first_str_of, lookup};
use super::identity::{hash_document_data, Identity};
use super::normalize::{hashable_terms, Stopwords};
use super::record::author_surname;

/// Bibliography container for book-type aggregations.
const BOOK_BIBLIOGRAPHY_PATHS: &[&str] = &["further-reading.references"];
/// Bibliography container for everything else.
const DEFAULT_BIBLIOGRAPHY_PATHS: &[&str] = &["bibliography.references"];
/// Alternate nested location, tried when the type-dependent path is absent.
const FALLBACK_BIBLIOGRAPHY_PATHS: &[&str] = &["tail.bibliography.references"];

/// Reference-title locations, ordered most to least specific.
const REFERENCE_TITLE_PATHS: &[&str] = &[
    "contribution.title",
    "host.issue.series.title",
    "host.series.title",
    "host.title",
];

/// A document with fewer than this many extracted references is tallied as
/// having "few references" (diagnostic only, never a rejection).
const FEW_REFERENCES_THRESHOLD: usize = 3;

/// Extract best-effort reference identities for one document.
///
/// References that cannot be parsed are tallied by failure mode and dropped;
/// plaintext references are never parsed into identifiers. Extraction order is
/// preserved in the returned sequence.
pub fn extract_references(
    raw: &Value,
    aggregation_type: &str,
    stopwords: &Stopwords,
    stats: &mut ReferenceStats,
) -> Vec<Identity> {
    let primary_paths = if aggregation_type.eq_ignore_ascii_case("book") {
        BOOK_BIBLIOGRAPHY_PATHS
    } else {
        DEFAULT_BIBLIOGRAPHY_PATHS
    };

    let elements = first_array_of(raw, primary_paths)
        .or_else(|| first_array_of(raw, FALLBACK_BIBLIOGRAPHY_PATHS));

    let mut reference_ids = Vec::new();
    if let Some(elements) = elements {
        for element in elements {
            stats.attempted += 1;
            if let Some(id) = parse_reference(element, stopwords, stats) {
                reference_ids.push(id);
                stats.succeeded += 1;
            }
        }
    }

    if reference_ids.is_empty() {
        stats.docs_missing_references += 1;
    } else if reference_ids.len() < FEW_REFERENCES_THRESHOLD {
        stats.docs_with_few_references += 1;
    }

    reference_ids
}

/// Parse one candidate reference element into an identity, tallying the
/// failure mode when it cannot be parsed.
fn parse_reference(
    element: &Value,
    stopwords: &Stopwords,
    stats: &mut ReferenceStats,
) -> Option<Identity> {
    // Both the contribution (title/author) and host (publication) sections
    // must be present for a structured reference.
    let contribution = lookup(element, "contribution").filter(|v| v.is_object());
    let host = lookup(element, "host").filter(|v| v.is_object());
    let (contribution, _host) = match (contribution, host) {
        (Some(c), Some(h)) => (c, h),
        _ => {
            if lookup(element, "textref").is_some() {
                stats.plaintext += 1;
            } else {
                stats.unexpected_format += 1;
            }
            return None;
        }
    };

    let title = first_str_of(element, REFERENCE_TITLE_PATHS)
        .map(|t| hashable_terms(t, stopwords))
        .filter(|t| !t.is_empty());
    let title = match title {
        Some(t) => t,
        None => {
            stats.without_titles += 1;
            return None;
        }
    };

    let first_surname = contribution
        .get("authors")
        .and_then(Value::as_array)
        .and_then(|authors| authors.first())
        .and_then(author_surname);
    let first_surname = match first_surname {
        Some(s) => s,
        None => {
            stats.without_authors += 1;
            return None;
        }
    };

    Some(hash_document_data(&title, &first_surname))
}
