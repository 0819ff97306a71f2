/// Default minimum character count, below which the primary backend's output
/// counts as a weak extraction.
pub const DEFAULT_MIN_CHARS: usize = 50;

/// Decides whether extracted text is good enough to skip the fallback backends.
///
/// Text is measured by `text.trim().chars().count()`: leading and trailing
/// whitespace is not counted, whitespace between words is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdequacyPolicy {
    /// Absolute minimum number of characters.
    pub min_chars: usize,
    /// Minimum characters per page. `0` disables the per-page check.
    pub min_chars_per_page: usize,
}

impl Default for AdequacyPolicy {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            min_chars_per_page: 0,
        }
    }
}

impl AdequacyPolicy {
    pub fn new(min_chars: usize, min_chars_per_page: usize) -> Self {
        Self {
            min_chars,
            min_chars_per_page,
        }
    }

    /// Number of characters the policy measures for `text`.
    pub fn measure(text: &str) -> usize {
        text.trim().chars().count()
    }

    /// The threshold that applies to a document with `pages` pages.
    pub fn required_chars(&self, pages: usize) -> usize {
        self.min_chars.max(self.min_chars_per_page.saturating_mul(pages))
    }

    pub fn is_adequate(&self, text: &str, pages: usize) -> bool {
        let chars = Self::measure(text);
        chars > 0 && chars >= self.required_chars(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_is_fifty_chars() {
        let policy = AdequacyPolicy::default();
        assert!(!policy.is_adequate(&"x".repeat(49), 1));
        assert!(policy.is_adequate(&"x".repeat(50), 1));
    }

    #[test]
    fn surrounding_whitespace_is_not_counted() {
        let policy = AdequacyPolicy::new(5, 0);
        assert!(!policy.is_adequate("\n\n  abcd \n\n\n", 3));
        assert!(policy.is_adequate("\n abcde\n", 1));
    }

    #[test]
    fn inner_whitespace_is_counted() {
        assert_eq!(AdequacyPolicy::measure("  a b\n\nc  "), 6);
        assert!(AdequacyPolicy::new(5, 0).is_adequate(" a b c ", 1));
    }

    #[test]
    fn whitespace_only_is_never_adequate() {
        let policy = AdequacyPolicy::new(0, 0);
        assert!(!policy.is_adequate("   \n\t\n", 2));
        assert!(!policy.is_adequate("", 0));
        assert!(policy.is_adequate("a", 1));
    }

    #[test]
    fn per_page_threshold_scales_with_page_count() {
        let policy = AdequacyPolicy::new(10, 100);
        assert_eq!(policy.required_chars(0), 10);
        assert_eq!(policy.required_chars(3), 300);

        let text = "y".repeat(250);
        assert!(policy.is_adequate(&text, 2));
        assert!(!policy.is_adequate(&text, 3));
    }

    #[test]
    fn multibyte_chars_count_once() {
        let policy = AdequacyPolicy::new(3, 0);
        assert!(policy.is_adequate("äöü", 1));
        assert!(!policy.is_adequate("äö", 1));
    }
}
