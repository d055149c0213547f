//! Keyword spotting in chat text.

/// Case-insensitive substring matcher over the configured keyword list.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Build a matcher. Blank entries are dropped and duplicates collapsed.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !list.contains(&keyword) {
                list.push(keyword);
            }
        }
        Self { keywords: list }
    }

    /// The first configured keyword found in `text`.
    pub fn find(&self, text: &str) -> Option<&str> {
        if self.keywords.is_empty() {
            return None;
        }
        let haystack = text.to_lowercase();
        self.keywords
            .iter()
            .find(|k| haystack.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_case_insensitive_substring() {
        let matcher = KeywordMatcher::new(["Boss", "lets go"]);
        assert_eq!(matcher.find("FINAL BOSS incoming"), Some("boss"));
        assert_eq!(matcher.find("LETS GOOOO"), Some("lets go"));
        assert_eq!(matcher.find("just chatting"), None);
    }

    #[test]
    fn first_configured_keyword_wins() {
        let matcher = KeywordMatcher::new(["pog", "hype"]);
        assert_eq!(matcher.find("hype pog"), Some("pog"));
    }

    #[test]
    fn blank_and_duplicate_keywords_dropped() {
        let matcher = KeywordMatcher::new(["", "  ", "pog", "POG"]);
        assert_eq!(matcher.keywords(), ["pog".to_string()]);
    }

    #[test]
    fn empty_matcher_never_matches() {
        let matcher = KeywordMatcher::default();
        assert!(matcher.is_empty());
        assert_eq!(matcher.find("anything"), None);
    }
}
