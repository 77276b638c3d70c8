//! Word tokens for keyword overlap

use hashbrown::HashSet;

use super::LinkerConfig;

/// Lowercase alphanumeric words long enough to matter, minus stopwords
pub(crate) fn tokens(text: &str, config: &LinkerConfig) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() >= config.min_token_len)
        .map(str::to_lowercase)
        .filter(|word| !config.stopwords.iter().any(|stop| stop == word))
        .collect()
}

/// Every lowercase alphanumeric word, in order
pub(crate) fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}
