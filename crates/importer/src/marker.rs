//! `[v2: <source>] Needs review` markers embedded in the notes column.

use std::sync::LazyLock;

use regex::Regex;

static REVIEW_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[v2:\s*([^\]]+)\]\s*Needs review").expect("review marker pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewMarker {
    pub needs_review: bool,
    pub review_source: Option<String>,
    /// Notes with the marker removed.
    pub notes: Option<String>,
}

pub fn extract_review_marker(notes: Option<&str>) -> ReviewMarker {
    let Some(notes) = notes else {
        return ReviewMarker::default();
    };

    let Some(captures) = REVIEW_MARKER.captures(notes) else {
        return ReviewMarker {
            needs_review: false,
            review_source: None,
            notes: Some(notes.to_string()),
        };
    };

    let source = captures
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());
    let stripped = REVIEW_MARKER.replace(notes, "");
    let stripped = stripped.trim();

    ReviewMarker {
        needs_review: true,
        review_source: source,
        notes: (!stripped.is_empty()).then(|| stripped.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_sets_flag_and_source() {
        let m = extract_review_marker(Some("[v2: Vendor sheet] Needs review - count unclear"));
        assert!(m.needs_review);
        assert_eq!(m.review_source.as_deref(), Some("Vendor sheet"));
        assert_eq!(m.notes.as_deref(), Some("- count unclear"));
    }

    #[test]
    fn marker_match_is_case_insensitive() {
        let m = extract_review_marker(Some("[V2:  floor count ]   NEEDS REVIEW"));
        assert!(m.needs_review);
        assert_eq!(m.review_source.as_deref(), Some("floor count"));
        assert_eq!(m.notes, None);
    }

    #[test]
    fn marker_in_the_middle_of_notes() {
        let m = extract_review_marker(Some("Reorder monthly. [v2: audit] Needs review"));
        assert!(m.needs_review);
        assert_eq!(m.review_source.as_deref(), Some("audit"));
        assert_eq!(m.notes.as_deref(), Some("Reorder monthly."));
    }

    #[test]
    fn notes_without_marker_are_kept() {
        let m = extract_review_marker(Some("Keep sealed"));
        assert!(!m.needs_review);
        assert_eq!(m.review_source, None);
        assert_eq!(m.notes.as_deref(), Some("Keep sealed"));

        // Partial markers do not count.
        let m = extract_review_marker(Some("[v2: audit]"));
        assert!(!m.needs_review);
    }

    #[test]
    fn absent_notes() {
        assert_eq!(extract_review_marker(None), ReviewMarker::default());
    }
}
