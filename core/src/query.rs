use crate::index::{DocId, Posting};
use crate::persist::{IndexPaths, IndexStore, StoreError};
use crate::tokenizer::{raw_words, PorterStemmer, Stem};
use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, DFA};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Raw words up to this many characters get one fuzzy edit; longer words
/// get two. Transpositions count as a single edit.
const SHORT_WORD_CHARS: usize = 5;

/// Scoring strategy for one (term, document) hit.
pub trait Score: Send + Sync {
    fn score(&self, tf: u32, df: u32, num_docs: u32) -> f32;
}

/// Log-scaled term frequency times smoothed inverse document frequency:
/// `(1 + ln tf) * ln(1 + N/df)`. The smoothing keeps a term that occurs
/// in every document contributing a positive weight, so the match-count
/// tie-break stays a secondary signal rather than the only one.
pub struct TfIdf;

impl Score for TfIdf {
    fn score(&self, tf: u32, df: u32, num_docs: u32) -> f32 {
        if tf == 0 || df == 0 {
            return 0.0;
        }
        let tf_w = 1.0 + (tf as f32).ln();
        let idf = (1.0 + num_docs as f32 / df as f32).ln();
        tf_w * idf
    }
}

/// One ranked hit with per-word match reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub teaser: String,
    /// Raw query words whose stemmed form occurs in this document.
    pub matching_words: Vec<String>,
    /// The complementary raw query words.
    pub missing_words: Vec<String>,
    pub tfidf_score: f32,
    /// Count of matching words, the secondary sort key.
    pub rank: usize,
}

/// Read-side query engine over one committed index.
pub struct Searcher {
    store: IndexStore,
    stemmer: Box<dyn Stem>,
    scorer: Box<dyn Score>,
    lev_one: LevenshteinAutomatonBuilder,
    lev_two: LevenshteinAutomatonBuilder,
}

impl Searcher {
    /// Open the committed index for querying. Fails with
    /// `StoreError::NotBuilt` when no crawl has committed yet.
    pub fn open(paths: &IndexPaths) -> Result<Self, StoreError> {
        Ok(Self::over(IndexStore::open(paths)?))
    }

    pub fn over(store: IndexStore) -> Self {
        Self {
            store,
            stemmer: Box::new(PorterStemmer::default()),
            scorer: Box::new(TfIdf),
            lev_one: LevenshteinAutomatonBuilder::new(1, true),
            lev_two: LevenshteinAutomatonBuilder::new(2, true),
        }
    }

    /// Swap in a different scoring formula.
    pub fn with_scorer(mut self, scorer: Box<dyn Score>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Swap in a different stemmer. Must match the one used at index time.
    pub fn with_stemmer(mut self, stemmer: Box<dyn Stem>) -> Self {
        self.stemmer = stemmer;
        self
    }

    /// Run a free-text query: the OR of all exact stemmed query terms,
    /// OR'd with fuzzy variants of each raw word, executed over the text
    /// field and ranked by (tfidf_score, rank) descending.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let raw = raw_words(query);
        if raw.is_empty() {
            return Vec::new();
        }
        // Parallel to `raw`, duplicates retained.
        let stemmed: Vec<String> = raw.iter().map(|w| self.stemmer.stem(w)).collect();

        let text_index = &self.store.index.text;

        // Candidate index terms: exact stems plus fuzzy hits of raw words.
        let mut candidates: HashSet<&str> = HashSet::new();
        for stem in &stemmed {
            if let Some((term, _)) = text_index.get_key_value(stem.as_str()) {
                candidates.insert(term.as_str());
            }
        }
        for word in &raw {
            let dfa = self.dfa_for(word);
            for term in text_index.keys() {
                if let Distance::Exact(_) = dfa.eval(term) {
                    candidates.insert(term.as_str());
                }
            }
        }

        let num_docs = self.store.index.num_docs;
        let mut scores: HashMap<DocId, f32> = HashMap::new();
        let mut hit_terms: HashMap<DocId, HashSet<&str>> = HashMap::new();
        for term in &candidates {
            let postings = match text_index.get(*term) {
                Some(p) => p,
                None => continue,
            };
            let df = postings.len() as u32;
            for Posting { doc_id, tf } in postings {
                *scores.entry(*doc_id).or_insert(0.0) += self.scorer.score(*tf, df, num_docs);
                hit_terms.entry(*doc_id).or_default().insert(*term);
            }
        }

        let mut results: Vec<SearchResult> = Vec::with_capacity(scores.len());
        for (doc_id, score) in scores {
            let doc = match self.store.docs.get(&doc_id) {
                Some(d) => d,
                None => continue,
            };
            let hits = &hit_terms[&doc_id];
            let mut matching_words = Vec::new();
            let mut missing_words = Vec::new();
            for (word, stem) in raw.iter().zip(&stemmed) {
                if hits.contains(stem.as_str()) {
                    matching_words.push(word.clone());
                } else {
                    missing_words.push(word.clone());
                }
            }
            let rank = matching_words.len();
            results.push(SearchResult {
                url: doc.url.clone(),
                title: doc.title.clone(),
                teaser: doc.teaser.clone(),
                matching_words,
                missing_words,
                tfidf_score: score,
                rank,
            });
        }

        results.sort_by(by_score_then_rank);
        tracing::debug!(query, hits = results.len(), "query executed");
        results
    }

    fn dfa_for(&self, word: &str) -> DFA {
        if word.chars().count() <= SHORT_WORD_CHARS {
            self.lev_one.build_dfa(word)
        } else {
            self.lev_two.build_dfa(word)
        }
    }
}

/// Descending by score; equal scores fall back to descending match count.
fn by_score_then_rank(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.tfidf_score
        .partial_cmp(&a.tfidf_score)
        .unwrap_or(Ordering::Equal)
        .then(b.rank.cmp(&a.rank))
}
