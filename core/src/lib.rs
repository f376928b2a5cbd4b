//! Core library for sitesearch: text normalization, tokenization and
//! stemming, the document store / inverted index, on-disk persistence,
//! and the query engine.
//!
//! The crawl binary drives the write path (`IndexWriter`), the web server
//! drives the read path (`Searcher`). Writer and reader never run
//! concurrently: a crawl is a finite batch job that commits once.

pub mod index;
pub mod normalize;
pub mod persist;
pub mod query;
pub mod tokenizer;

pub use index::{DocId, Document, IndexWriter, InvertedIndex, Posting};
pub use persist::{IndexPaths, IndexStore, MetaFile, StoreError};
pub use query::{SearchResult, Searcher};
