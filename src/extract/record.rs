use std::fmt;

use serde_json::Value;

use crate::common::ReferenceStats;

use super::fields::{first_array_of, lookup, lookup_str};
use super::filters::is_useless_title;
use super::identity::{hash_document_data, Identity};
use super::normalize::{clean_whitespace, hashable_terms, printable, year_in_text, Stopwords};
use super::references::extract_references;

/// Inclusive publication-year bounds; anything outside is a malformed record.
pub const MIN_YEAR: i32 = 1800;
pub const MAX_YEAR: i32 = 2013;

const TITLE_PATH: &str = "head.title";
const AUTHOR_PATHS: &[&str] = &["head.authors", "head.author-group.authors"];
const NON_CHAPTER_PATH: &str = "non-chapter";
const AGGREGATION_TYPE_PATH: &str = "head.aggregation-type";
const JOURNAL_ID_PATH: &str = "head.journal-id";
const PUBLICATION_NAME_PATH: &str = "head.publication-name";
const COVER_DATE_PATH: &str = "head.cover-date";
const COPYRIGHT_YEAR_PATH: &str = "head.copyright.year";

/// The extracted entity: created once per raw record, written immutably to an
/// intermediate partition, and promoted or dropped by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalDocument {
    /// Display title, whitespace-normalized.
    pub title: String,
    /// Comma-joined "given surname" author list; never empty.
    pub authors: String,
    pub year: i32,
    pub venue: String,
    /// Content hash of (normalized title, first-author surname).
    pub identity: Identity,
    /// Best-effort reference identities, in extraction order.
    pub references: Vec<Identity>,
    /// Opaque path back to the raw archive entry, carried for provenance.
    pub source_locator: String,
    /// Aggregation type, for per-type tallies.
    pub document_type: String,
}

/// Why a raw record was excluded. The dominant failure mode at corpus scale;
/// never fatal to the shard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SkipReason {
    EmptyRecord,
    MissingTitle,
    UselessTitle,
    NonChapterMarker,
    MissingAuthors,
    MissingVenue,
    SelfReferentialVenue,
    InvalidOrMissingYear,
    UnexpectedSchema,
    Unforeseen(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyRecord => write!(f, "empty record"),
            SkipReason::MissingTitle => write!(f, "missing title"),
            SkipReason::UselessTitle => write!(f, "useless title"),
            SkipReason::NonChapterMarker => write!(f, "non-chapter marker"),
            SkipReason::MissingAuthors => write!(f, "missing authors"),
            SkipReason::MissingVenue => write!(f, "missing venue"),
            SkipReason::SelfReferentialVenue => write!(f, "self-referential venue"),
            SkipReason::InvalidOrMissingYear => write!(f, "invalid or missing year"),
            SkipReason::UnexpectedSchema => write!(f, "unexpected schema"),
            SkipReason::Unforeseen(detail) => write!(f, "unforeseen error: {}", detail),
        }
    }
}

/// Last whitespace token of an author element's surname, printable-filtered.
pub fn author_surname(author: &Value) -> Option<String> {
    last_name_token(author, "surname")
}

/// Last whitespace token of an author element's given name, printable-filtered.
pub fn author_given_name(author: &Value) -> Option<String> {
    last_name_token(author, "given")
}

fn last_name_token(author: &Value, field: &str) -> Option<String> {
    author
        .get(field)
        .and_then(Value::as_str)
        .and_then(|text| text.split_whitespace().last())
        .map(printable)
        .filter(|token| !token.is_empty())
}

/// Comma-joined "given surname" list; authors missing either part are dropped.
fn authors_display(authors: &[Value]) -> String {
    authors
        .iter()
        .filter_map(|author| {
            let given = author_given_name(author)?;
            let surname = author_surname(author)?;
            Some(format!("{} {}", given, surname))
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Converts one raw source record into a canonical document record or a typed
/// skip reason. First applicable outcome wins; the check order is fixed.
pub struct Extractor {
    stopwords: Stopwords,
}

impl Extractor {
    pub fn new(stopwords: Stopwords) -> Self {
        Self { stopwords }
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    pub fn extract(
        &self,
        raw: &Value,
        locator: &str,
        reference_stats: &mut ReferenceStats,
    ) -> Result<CanonicalDocument, SkipReason> {
        if raw.is_null() || raw.as_object().is_some_and(|o| o.is_empty()) {
            return Err(SkipReason::EmptyRecord);
        }
        if !raw.is_object() {
            return Err(SkipReason::UnexpectedSchema);
        }

        let title = lookup_str(raw, TITLE_PATH)
            .map(clean_whitespace)
            .filter(|t| !t.is_empty())
            .ok_or(SkipReason::MissingTitle)?;

        if is_useless_title(&title) {
            return Err(SkipReason::UselessTitle);
        }

        let author_elements =
            first_array_of(raw, AUTHOR_PATHS).ok_or(SkipReason::MissingAuthors)?;
        let first_surname = author_elements
            .first()
            .and_then(author_surname)
            .ok_or(SkipReason::MissingAuthors)?;
        let authors = authors_display(author_elements);
        if authors.is_empty() {
            return Err(SkipReason::MissingAuthors);
        }

        if lookup(raw, NON_CHAPTER_PATH).is_some() {
            return Err(SkipReason::NonChapterMarker);
        }

        let aggregation_type =
            lookup_str(raw, AGGREGATION_TYPE_PATH).ok_or(SkipReason::UnexpectedSchema)?;

        // A secondary venue identifier marks a converted-article variant and
        // is preferred as the venue source.
        let (venue_source, document_type) = match lookup_str(raw, JOURNAL_ID_PATH) {
            Some(journal_id) => (Some(journal_id), format!("{} (jid)", aggregation_type)),
            None => (
                lookup_str(raw, PUBLICATION_NAME_PATH),
                aggregation_type.to_string(),
            ),
        };
        let venue = venue_source
            .map(clean_whitespace)
            .filter(|v| !v.is_empty())
            .ok_or(SkipReason::MissingVenue)?;

        if venue.eq_ignore_ascii_case(&title) {
            return Err(SkipReason::SelfReferentialVenue);
        }

        let year = self.extract_year(raw).ok_or(SkipReason::InvalidOrMissingYear)?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(SkipReason::InvalidOrMissingYear);
        }

        let hashable_title = hashable_terms(&title, &self.stopwords);
        let identity = hash_document_data(&hashable_title, &first_surname);

        let references =
            extract_references(raw, aggregation_type, &self.stopwords, reference_stats);

        Ok(CanonicalDocument {
            title,
            authors,
            year,
            venue,
            identity,
            references,
            source_locator: locator.to_string(),
            document_type,
        })
    }

    fn extract_year(&self, raw: &Value) -> Option<i32> {
        if let Some(cover_date) = lookup(raw, COVER_DATE_PATH) {
            if let Some(year) = cover_date.as_i64() {
                return i32::try_from(year).ok();
            }
            if let Some(text) = cover_date.as_str() {
                if let Ok(year) = text.trim().parse() {
                    return Some(year);
                }
                return year_in_text(text);
            }
            return None;
        }

        // Fall back to the copyright year when no cover date is listed
        match lookup(raw, COPYRIGHT_YEAR_PATH) {
            Some(value) => value
                .as_i64()
                .and_then(|y| i32::try_from(y).ok())
                .or_else(|| value.as_str().and_then(|t| t.trim().parse().ok())),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extractor() -> Extractor {
        Extractor::new(Stopwords::from_words(["a", "an", "the", "of"]))
    }

    fn valid_record() -> Value {
        json!({
            "head": {
                "title": "A Study of Citation Graphs",
                "authors": [
                    {"given": "Jane", "surname": "Doe"},
                    {"given": "John", "surname": "Roe"}
                ],
                "aggregation-type": "Journal",
                "publication-name": "Journal of Graph Studies",
                "cover-date": 2004
            }
        })
    }

    fn extract(raw: &Value) -> Result<CanonicalDocument, SkipReason> {
        let mut refs = ReferenceStats::default();
        extractor().extract(raw, "archive.tar.gz:records/1.json", &mut refs)
    }

    #[test]
    fn test_extracts_valid_record() {
        let doc = extract(&valid_record()).unwrap();
        assert_eq!(doc.title, "A Study of Citation Graphs");
        assert_eq!(doc.authors, "Jane Doe,John Roe");
        assert_eq!(doc.year, 2004);
        assert_eq!(doc.venue, "Journal of Graph Studies");
        assert_eq!(doc.document_type, "Journal");
        assert_eq!(doc.source_locator, "archive.tar.gz:records/1.json");
        // Identity derives from the normalized title and the first surname
        let stopwords = Stopwords::from_words(["a", "an", "the", "of"]);
        let expected = hash_document_data(
            &hashable_terms("A Study of Citation Graphs", &stopwords),
            "Doe",
        );
        assert_eq!(doc.identity, expected);
    }

    #[test]
    fn test_empty_and_non_object_records() {
        assert_eq!(extract(&json!({})), Err(SkipReason::EmptyRecord));
        assert_eq!(extract(&Value::Null), Err(SkipReason::EmptyRecord));
        assert_eq!(extract(&json!("text")), Err(SkipReason::UnexpectedSchema));
    }

    #[test]
    fn test_missing_and_blank_title() {
        let mut raw = valid_record();
        raw["head"].as_object_mut().unwrap().remove("title");
        assert_eq!(extract(&raw), Err(SkipReason::MissingTitle));

        let mut raw = valid_record();
        raw["head"]["title"] = json!("   ");
        assert_eq!(extract(&raw), Err(SkipReason::MissingTitle));
    }

    #[test]
    fn test_useless_title_never_reaches_hashing() {
        let mut raw = valid_record();
        raw["head"]["title"] = json!("Contents");
        assert_eq!(extract(&raw), Err(SkipReason::UselessTitle));
    }

    #[test]
    fn test_authors_fall_back_to_grouped_field() {
        let mut raw = valid_record();
        raw["head"].as_object_mut().unwrap().remove("authors");
        raw["head"]["author-group"] =
            json!({"authors": [{"given": "Grace", "surname": "Hopper"}]});
        let doc = extract(&raw).unwrap();
        assert_eq!(doc.authors, "Grace Hopper");
    }

    #[test]
    fn test_missing_authors() {
        let mut raw = valid_record();
        raw["head"]["authors"] = json!([]);
        assert_eq!(extract(&raw), Err(SkipReason::MissingAuthors));

        // Present but unusable author elements are still missing authors
        let mut raw = valid_record();
        raw["head"]["authors"] = json!([{"given": "OnlyGiven"}]);
        assert_eq!(extract(&raw), Err(SkipReason::MissingAuthors));
    }

    #[test]
    fn test_non_chapter_marker() {
        let mut raw = valid_record();
        raw["non-chapter"] = json!(true);
        assert_eq!(extract(&raw), Err(SkipReason::NonChapterMarker));
    }

    #[test]
    fn test_missing_aggregation_type_is_unexpected_schema() {
        let mut raw = valid_record();
        raw["head"].as_object_mut().unwrap().remove("aggregation-type");
        assert_eq!(extract(&raw), Err(SkipReason::UnexpectedSchema));
    }

    #[test]
    fn test_journal_id_preferred_as_venue_and_marks_variant() {
        let mut raw = valid_record();
        raw["head"]["journal-id"] = json!("JGS");
        let doc = extract(&raw).unwrap();
        assert_eq!(doc.venue, "JGS");
        assert_eq!(doc.document_type, "Journal (jid)");
    }

    #[test]
    fn test_missing_venue() {
        let mut raw = valid_record();
        raw["head"].as_object_mut().unwrap().remove("publication-name");
        assert_eq!(extract(&raw), Err(SkipReason::MissingVenue));
    }

    #[test]
    fn test_self_referential_venue() {
        let mut raw = valid_record();
        raw["head"]["publication-name"] = json!("a study OF citation graphs");
        assert_eq!(extract(&raw), Err(SkipReason::SelfReferentialVenue));
    }

    #[test]
    fn test_year_bounds() {
        for bad_year in [1799, 2014, -5] {
            let mut raw = valid_record();
            raw["head"]["cover-date"] = json!(bad_year);
            assert_eq!(extract(&raw), Err(SkipReason::InvalidOrMissingYear));
        }
        for good_year in [1800, 2013] {
            let mut raw = valid_record();
            raw["head"]["cover-date"] = json!(good_year);
            assert_eq!(extract(&raw).unwrap().year, good_year);
        }
    }

    #[test]
    fn test_year_from_display_date() {
        let mut raw = valid_record();
        raw["head"]["cover-date"] = json!("15 January 2004");
        assert_eq!(extract(&raw).unwrap().year, 2004);
    }

    #[test]
    fn test_year_falls_back_to_copyright() {
        let mut raw = valid_record();
        raw["head"].as_object_mut().unwrap().remove("cover-date");
        raw["head"]["copyright"] = json!({"year": 1999});
        assert_eq!(extract(&raw).unwrap().year, 1999);
    }

    #[test]
    fn test_missing_year_entirely() {
        let mut raw = valid_record();
        raw["head"].as_object_mut().unwrap().remove("cover-date");
        assert_eq!(extract(&raw), Err(SkipReason::InvalidOrMissingYear));
    }

    #[test]
    fn test_identical_content_yields_identical_identity() {
        // Two records with the same title and first-author surname collide by
        // construction, whatever their other fields say.
        let mut other = valid_record();
        other["head"]["publication-name"] = json!("A Different Venue");
        other["head"]["cover-date"] = json!(2010);
        other["head"]["authors"] = json!([{"given": "Janet", "surname": "Doe"}]);

        let a = extract(&valid_record()).unwrap();
        let b = extract(&other).unwrap();
        assert_eq!(a.identity, b.identity);
    }

    #[test]
    fn test_references_are_extracted() {
        let mut raw = valid_record();
        raw["bibliography"] = json!({
            "references": [{
                "contribution": {
                    "title": "A Cited Paper",
                    "authors": [{"given": "Alan", "surname": "Turing"}]
                },
                "host": {"title": "Famous Journal"}
            }]
        });
        let mut refs = ReferenceStats::default();
        let doc = extractor().extract(&raw, "loc", &mut refs).unwrap();
        assert_eq!(doc.references.len(), 1);
        assert_eq!(refs.succeeded, 1);
    }

    #[test]
    fn test_surname_takes_last_token() {
        let author = json!({"given": "Jean Pierre", "surname": "van Helsing"});
        assert_eq!(author_surname(&author).unwrap(), "Helsing");
        assert_eq!(author_given_name(&author).unwrap(), "Pierre");
    }
}
