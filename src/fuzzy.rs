use strsim::jaro_winkler;

/// Word-boundary phrase containment over normalized text, so "mi" matches
/// "csk vs mi" but not "minimum", and "left-hand" matches "left hand".
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let padded = format!(" {} ", NameMatcher::normalize(haystack));
    let needle = format!(" {} ", NameMatcher::normalize(phrase));
    padded.contains(&needle)
}

/// Fuzzy matcher for player-name variations.
///
/// Two scorers, matching how names actually get mangled in questions:
/// `ratio` compares whole strings, `partial_ratio` compares a short token
/// against every same-length word window of the candidate, so "bumrah"
/// still scores high against "Jasprit Bumrah".
pub struct NameMatcher {
    /// Similarity threshold (0.0-1.0) for single-token partial matches.
    pub partial_threshold: f64,
    /// Similarity threshold (0.0-1.0) for multi-word whole-string matches.
    pub ratio_threshold: f64,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self {
            partial_threshold: 0.78,
            ratio_threshold: 0.80,
        }
    }
}

impl NameMatcher {
    pub fn new(partial_threshold: f64, ratio_threshold: f64) -> Self {
        Self {
            partial_threshold,
            ratio_threshold,
        }
    }

    /// Normalize a name for comparison: lowercase, strip punctuation,
    /// collapse whitespace.
    pub fn normalize(s: &str) -> String {
        let filtered: String = s
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        filtered.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Whole-string similarity between two names.
    pub fn ratio(&self, a: &str, b: &str) -> f64 {
        jaro_winkler(&Self::normalize(a), &Self::normalize(b))
    }

    /// Best similarity between a short token and any word window of the
    /// candidate with the same word count.
    pub fn partial_ratio(&self, token: &str, candidate: &str) -> f64 {
        let norm_token = Self::normalize(token);
        let norm_candidate = Self::normalize(candidate);
        if norm_token.is_empty() || norm_candidate.is_empty() {
            return 0.0;
        }

        let token_words = norm_token.split_whitespace().count();
        let words: Vec<&str> = norm_candidate.split_whitespace().collect();
        if words.len() <= token_words {
            return jaro_winkler(&norm_token, &norm_candidate);
        }

        let mut best: f64 = 0.0;
        for window in words.windows(token_words) {
            let score = jaro_winkler(&norm_token, &window.join(" "));
            if score > best {
                best = score;
            }
        }
        best
    }

    /// Best full-name match for a single token, scored with `partial_ratio`.
    pub fn best_partial_match<'a>(
        &self,
        token: &str,
        candidates: impl IntoIterator<Item = &'a String>,
    ) -> Option<(&'a str, f64)> {
        let mut best: Option<(&'a str, f64)> = None;
        for candidate in candidates {
            let score = self.partial_ratio(token, candidate);
            if score >= self.partial_threshold
                && best.map_or(true, |(_, prev)| score > prev)
            {
                best = Some((candidate.as_str(), score));
            }
        }
        best
    }

    /// Best full-name match for a multi-word phrase, scored with `ratio`.
    pub fn best_ratio_match<'a>(
        &self,
        phrase: &str,
        candidates: impl IntoIterator<Item = &'a String>,
    ) -> Option<(&'a str, f64)> {
        let mut best: Option<(&'a str, f64)> = None;
        for candidate in candidates {
            let score = self.ratio(phrase, candidate);
            if score >= self.ratio_threshold
                && best.map_or(true, |(_, prev)| score > prev)
            {
                best = Some((candidate.as_str(), score));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_phrase_respects_word_boundaries() {
        assert!(contains_phrase("CSK vs MI head to head", "mi"));
        assert!(!contains_phrase("min 500 runs", "mi"));
        assert!(contains_phrase("against left-hand batters", "left hand"));
    }

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(NameMatcher::normalize("O'Brien"), "o brien");
        assert_eq!(NameMatcher::normalize("  MS   Dhoni "), "ms dhoni");
    }

    #[test]
    fn partial_ratio_finds_surname_inside_full_name() {
        let matcher = NameMatcher::default();
        let score = matcher.partial_ratio("bumrah", "Jasprit Bumrah");
        assert!(score > 0.95, "score was {}", score);
    }

    #[test]
    fn partial_ratio_rejects_unrelated_names() {
        let matcher = NameMatcher::default();
        let score = matcher.partial_ratio("zampa", "Virat Kohli");
        assert!(score < matcher.partial_threshold, "score was {}", score);
    }

    #[test]
    fn best_ratio_match_picks_closest_candidate() {
        let matcher = NameMatcher::default();
        let players = vec![
            "Virat Kohli".to_string(),
            "Rohit Sharma".to_string(),
            "Mohit Sharma".to_string(),
        ];
        let (name, _) = matcher
            .best_ratio_match("rohit sharma", &players)
            .expect("expected a match");
        assert_eq!(name, "Rohit Sharma");
    }

    #[test]
    fn misspelled_full_name_still_matches() {
        let matcher = NameMatcher::default();
        let players = vec!["Virat Kohli".to_string()];
        let hit = matcher.best_ratio_match("virat kohly", &players);
        assert!(hit.is_some());
    }
}
