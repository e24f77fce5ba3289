pub mod fields;
pub mod filters;
pub mod identity;
pub mod normalize;
pub mod record;
pub mod references;

pub use fields::*;
pub use filters::is_useless_title;
pub use identity::{hash_document_data, Identity};
pub use normalize::{clean_whitespace, hashable_terms, printable, Stopwords};
pub use record::{CanonicalDocument, Extractor, SkipReason, MAX_YEAR, MIN_YEAR};
pub use references::extract_references;
