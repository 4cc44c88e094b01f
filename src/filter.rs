//! Tag filter: which new items are eligible for publishing.

use crate::source::FeedItem;

/// Selects items carrying a required tag, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    required: Option<String>,
}

impl TagFilter {
    /// A blank tag is the same as no tag: every item passes.
    pub fn new(required: Option<&str>) -> Self {
        Self {
            required: required
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
        }
    }

    pub fn required(&self) -> Option<&str> {
        self.required.as_deref()
    }

    pub fn accepts(&self, item: &FeedItem) -> bool {
        match &self.required {
            Some(tag) => item.has_tag(tag),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::make_item;
    use rstest::rstest;

    #[rstest]
    #[case(Some("X"), &["x"], true)]
    #[case(Some("x"), &["Blog", "X"], true)]
    #[case(Some("X"), &["blog"], false)]
    #[case(Some("X"), &[], false)]
    #[case(None, &[], true)]
    #[case(None, &["anything"], true)]
    #[case(Some("  "), &[], true)]
    fn tag_filter(#[case] required: Option<&str>, #[case] tags: &[&str], #[case] expected: bool) {
        let filter = TagFilter::new(required);
        assert_eq!(filter.accepts(&make_item("1", tags)), expected);
    }

    #[test]
    fn blank_tag_is_pass_through() {
        assert_eq!(TagFilter::new(Some("")).required(), None);
        assert_eq!(TagFilter::new(Some(" X ")).required(), Some("X"));
    }
}
