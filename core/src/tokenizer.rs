use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "an", "and", "are", "as", "at", "be", "by", "can", "for", "from", "have",
            "if", "in", "is", "it", "may", "not", "of", "on", "or", "tbd", "that", "the",
            "this", "to", "us", "we", "when", "will", "with", "yet", "you", "your",
        ];
        words.iter().copied().collect()
    };
}

/// Stemming strategy. Index time and query time must share one
/// implementation or inflected query words stop matching their terms.
pub trait Stem: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

/// Porter-style English stemmer, the default strategy.
pub struct PorterStemmer {
    inner: Stemmer,
}

impl Default for PorterStemmer {
    fn default() -> Self {
        Self { inner: Stemmer::create(Algorithm::English) }
    }
}

impl Stem for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        self.inner.stem(word).to_string()
    }
}

/// Tokenize field text into stemmed index terms: NFKC normalization,
/// lowercase, word extraction, stopword removal, stemming.
pub fn tokenize(text: &str, stemmer: &dyn Stem) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|t| !STOPWORDS.contains(t))
        .map(|t| stemmer.stem(t))
        .collect()
}

/// Split a query into lowercase raw words. Stopwords are kept here: a
/// query word that was never indexed should show up as missing, not
/// silently disappear.
pub fn raw_words(query: &str) -> Vec<String> {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
