// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tab title cleanup.

use std::sync::OnceLock;

use regex::Regex;

/// Removes configured literal fragments from titles and tidies the separators they leave behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleCleaner {
    patterns: Vec<String>,
}

impl TitleCleaner {
    /// Patterns are trimmed; blank patterns are ignored.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| pattern.as_ref().trim().to_owned())
            .filter(|pattern| !pattern.is_empty())
            .collect();
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn clean(&self, title: &str) -> String {
        let mut out = title.to_owned();
        for pattern in &self.patterns {
            out = out.replace(pattern.as_str(), "");
        }
        out = out.replace('\u{a0}', " ");

        let [spaces, double_bar, trailing_bar, leading_bar] = separator_regexes();
        let out = spaces.replace_all(&out, " ");
        let out = double_bar.replace_all(&out, "|");
        let out = trailing_bar.replace(&out, "");
        let out = leading_bar.replace(&out, "");
        out.trim().to_owned()
    }
}

fn separator_regexes() -> &'static [Regex; 4] {
    static REGEXES: OnceLock<[Regex; 4]> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            Regex::new(r"[ \t]{2,}").expect("valid space run regex"),
            Regex::new(r"\s*\|\s*\|\s*").expect("valid double separator regex"),
            Regex::new(r"\s*\|\s*$").expect("valid trailing separator regex"),
            Regex::new(r"^\s*\|\s*").expect("valid leading separator regex"),
        ]
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::TitleCleaner;

    #[rstest]
    #[case(&[" - YouTube"], "Talk - YouTube", "Talk")]
    #[case(&["Inbox"], "Inbox | Mail | Provider", "Mail | Provider")]
    #[case(&["Mail"], "Inbox | Mail | Provider", "Inbox|Provider")]
    #[case(&["Provider"], "Inbox | Mail | Provider", "Inbox | Mail")]
    #[case(&[], "a\u{a0}\u{a0}b   c", "a b c")]
    #[case(&["  ", ""], "  keep  ", "keep")]
    fn cleans_patterns_and_separators(
        #[case] patterns: &[&str],
        #[case] title: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(TitleCleaner::new(patterns).clean(title), expected);
    }

    #[test]
    fn blank_patterns_are_dropped() {
        let cleaner = TitleCleaner::new([" x ", " ", ""]);
        assert_eq!(cleaner.patterns(), ["x".to_owned()]);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let cleaner = TitleCleaner::new([" - Site"]);
        let once = cleaner.clean("Page | | Section - Site");
        assert_eq!(cleaner.clean(&once), once);
    }
}
