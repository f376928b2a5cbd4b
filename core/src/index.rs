use crate::normalize::normalize;
use crate::persist::{self, IndexPaths, MetaFile, INDEX_VERSION};
use crate::tokenizer::{tokenize, Stem};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::format_description::well_known::Rfc3339;

pub type DocId = u32;

/// Sentinel title for pages without a `<title>` element.
pub const NO_TITLE: &str = "No Title";

const TEASER_CHARS: usize = 150;

/// One indexed page, keyed by its URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub title: String,
    pub text: String,
    pub teaser: String,
}

impl Document {
    /// Build a document from extracted page content: normalize title and
    /// body, strip the title prefix when the body repeats it, and cut the
    /// teaser at 150 characters.
    pub fn from_page(url: impl Into<String>, title: Option<&str>, body: &str) -> Self {
        let title = match title {
            Some(t) => normalize(t),
            None => NO_TITLE.to_string(),
        };
        let mut text = normalize(body);
        if !title.is_empty() && text.starts_with(&title) {
            text = text[title.len()..].trim_start().to_string();
        }
        let teaser = teaser_of(&text);
        Self { url: url.into(), title, text, teaser }
    }
}

fn teaser_of(text: &str) -> String {
    if text.chars().count() > TEASER_CHARS {
        let cut: String = text.chars().take(TEASER_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    /// Term frequency within one field of the document.
    pub tf: u32,
}

pub type PostingMap = HashMap<String, Vec<Posting>>;

/// Per-field maps from stemmed term to postings, sorted by doc_id.
/// Document frequency of a term is the length of its posting list.
/// Derived data: fully rebuildable from the stored documents.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub title: PostingMap,
    pub text: PostingMap,
    pub teaser: PostingMap,
    pub num_docs: u32,
}

impl InvertedIndex {
    /// Document frequency over the text field, the field queries run on.
    pub fn df(&self, term: &str) -> u32 {
        self.text.get(term).map_or(0, |p| p.len() as u32)
    }
}

/// Buffers documents during a crawl run. Upserts are last-write-wins by
/// URL, and nothing becomes visible to readers until `commit` persists
/// the whole batch at once.
#[derive(Default)]
pub struct IndexWriter {
    buffered: HashMap<String, Document>,
}

impl IndexWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buffered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffered.is_empty()
    }

    /// Buffer a document, replacing any earlier one with the same URL.
    pub fn upsert(&mut self, doc: Document) {
        self.buffered.insert(doc.url.clone(), doc);
    }

    /// Assign DocIds, build the per-field inverted index, and persist
    /// documents, index, and metadata under `paths`. Returns the number
    /// of committed documents.
    pub fn commit(self, paths: &IndexPaths, stemmer: &dyn Stem) -> Result<u32> {
        let mut batch: Vec<Document> = self.buffered.into_values().collect();
        // Deterministic id assignment across runs
        batch.sort_by(|a, b| a.url.cmp(&b.url));

        let mut index = InvertedIndex::default();
        let mut docs: HashMap<DocId, Document> = HashMap::new();
        for (i, doc) in batch.into_iter().enumerate() {
            let doc_id = i as DocId;
            index_field(&mut index.title, doc_id, &doc.title, stemmer);
            index_field(&mut index.text, doc_id, &doc.text, stemmer);
            index_field(&mut index.teaser, doc_id, &doc.teaser, stemmer);
            docs.insert(doc_id, doc);
        }
        index.num_docs = docs.len() as u32;

        persist::save_docs(paths, &docs)?;
        persist::save_index(paths, &index)?;
        let meta = MetaFile {
            num_docs: index.num_docs,
            created_at: time::OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
            version: INDEX_VERSION,
        };
        persist::save_meta(paths, &meta)?;

        tracing::info!(num_docs = index.num_docs, terms = index.text.len(), "index committed");
        Ok(index.num_docs)
    }
}

fn index_field(map: &mut PostingMap, doc_id: DocId, text: &str, stemmer: &dyn Stem) {
    let mut tf: HashMap<String, u32> = HashMap::new();
    for term in tokenize(text, stemmer) {
        *tf.entry(term).or_insert(0) += 1;
    }
    for (term, tf) in tf {
        map.entry(term).or_default().push(Posting { doc_id, tf });
    }
}
