/// How a skip-table entry is matched against a lowercased title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleMatch {
    /// Title must equal the entry exactly.
    Exact,
    /// Title must start with the entry.
    Prefix,
}

/// Titles shorter than this are almost always meaningless documents.
const MIN_USEFUL_TITLE_LEN: usize = 11;

/// Front-matter titles (tables of contents, editorial notices, indices) that
/// are not real papers.
const SKIP_TITLES: &[(&str, TitleMatch)] = &[
    ("about this", TitleMatch::Prefix),
    ("acknowledgment", TitleMatch::Prefix),
    ("announcements", TitleMatch::Exact),
    ("announcement", TitleMatch::Exact),
    ("associate editors", TitleMatch::Exact),
    ("authors' reply", TitleMatch::Exact),
    ("author's reply", TitleMatch::Exact),
    ("author index", TitleMatch::Prefix),
    ("board of editors", TitleMatch::Exact),
    ("book review", TitleMatch::Exact),
    ("call for papers", TitleMatch::Prefix),
    ("case history", TitleMatch::Exact),
    ("contents", TitleMatch::Prefix),
    ("corrigendum", TitleMatch::Exact),
    ("correspondence", TitleMatch::Exact),
    ("cumulative subject index", TitleMatch::Exact),
    ("editorial board", TitleMatch::Prefix),
    ("introduction", TitleMatch::Exact),
    ("inside front cover", TitleMatch::Prefix),
    ("letter from the editor", TitleMatch::Exact),
    ("letter to the editor", TitleMatch::Exact),
    ("list of contents", TitleMatch::Prefix),
    ("note from the publisher", TitleMatch::Exact),
    ("special issue contents", TitleMatch::Exact),
    ("subject index", TitleMatch::Exact),
    ("title index", TitleMatch::Prefix),
    ("to the editor", TitleMatch::Exact),
    ("withdrawn:", TitleMatch::Prefix),
    ("volume", TitleMatch::Prefix),
];

/// Decide whether a document should be skipped based on its title alone.
pub fn is_useless_title(title: &str) -> bool {
    if title.len() < MIN_USEFUL_TITLE_LEN {
        return true;
    }

    let title_lower = title.to_lowercase();
    SKIP_TITLES.iter().any(|(entry, mode)| match mode {
        TitleMatch::Exact => title_lower == *entry,
        TitleMatch::Prefix => title_lower.starts_with(entry),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_titles_are_useless() {
        assert!(is_useless_title("Errata"));
        assert!(is_useless_title("1234567890"));
        assert!(!is_useless_title("A Reasonably Long Paper Title"));
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert!(is_useless_title("Introduction"));
        assert!(is_useless_title("INTRODUCTION"));
        // Exact entries do not match as prefixes
        assert!(!is_useless_title("Introduction to Parsing Algorithms"));
    }

    #[test]
    fn test_contents_is_always_useless() {
        assert!(is_useless_title("Contents"));
        assert!(is_useless_title("contents"));
        assert!(is_useless_title("Contents of Volume 12"));
    }

    #[test]
    fn test_prefix_entries() {
        assert!(is_useless_title("Author index volumes 1-50"));
        assert!(is_useless_title("Call for papers: special issue"));
        assert!(is_useless_title("WITHDRAWN: Duplicate publication"));
    }

    #[test]
    fn test_real_titles_pass() {
        assert!(!is_useless_title("Authoritative Sources in a Hyperlinked Environment"));
        assert!(!is_useless_title("The Anatomy of a Large-Scale Search Engine"));
    }
}
