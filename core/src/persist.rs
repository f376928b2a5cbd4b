use crate::index::{DocId, Document, InvertedIndex};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

/// File layout of one index instance: a single directory holding the
/// stored documents, the inverted index, and a metadata file.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn docs(&self) -> PathBuf {
        self.root.join("docs.bin")
    }
    fn index(&self) -> PathBuf {
        self.root.join("index.bin")
    }
    fn meta(&self) -> PathBuf {
        self.root.join("meta.json")
    }
}

/// Read-side errors callers must tell apart: an index that was never
/// built is a user-visible condition, not an empty result set.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("index does not exist")]
    NotBuilt,
    #[error("corrupt index: {0}")]
    Decode(#[from] bincode::Error),
    #[error("corrupt index metadata: {0}")]
    Meta(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Wipe and recreate the index directory. Every crawl run rebuilds from
/// scratch; the previous index is discarded wholesale.
pub fn reset(paths: &IndexPaths) -> Result<()> {
    if paths.root.exists() {
        fs::remove_dir_all(&paths.root)?;
    }
    create_dir_all(&paths.root)?;
    Ok(())
}

pub fn save_docs(paths: &IndexPaths, docs: &HashMap<DocId, Document>) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.docs())?;
    let bytes = bincode::serialize(docs)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.index())?;
    let bytes = bincode::serialize(index)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

fn load_bincode<T: DeserializeOwned>(path: PathBuf) -> Result<T, StoreError> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

/// Everything the query engine needs, loaded from one committed index.
pub struct IndexStore {
    pub docs: HashMap<DocId, Document>,
    pub index: InvertedIndex,
    pub meta: MetaFile,
}

impl IndexStore {
    /// Load a committed index. A missing or never-committed directory is
    /// `NotBuilt`, so callers can distinguish "never indexed" from
    /// "indexed, zero matches".
    pub fn open(paths: &IndexPaths) -> Result<Self, StoreError> {
        if !paths.meta().is_file() {
            return Err(StoreError::NotBuilt);
        }
        let mut f = File::open(paths.meta())?;
        let mut buf = String::new();
        f.read_to_string(&mut buf)?;
        let meta: MetaFile = serde_json::from_str(&buf)?;
        let docs = load_bincode(paths.docs())?;
        let index = load_bincode(paths.index())?;
        Ok(Self { docs, index, meta })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Document, IndexWriter};
    use crate::tokenizer::PorterStemmer;
    use tempfile::tempdir;

    #[test]
    fn open_before_any_commit_is_not_built() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("index"));
        match IndexStore::open(&paths) {
            Err(StoreError::NotBuilt) => {}
            other => panic!("expected NotBuilt, got {:?}", other.err()),
        }
    }

    #[test]
    fn commit_then_open_round_trips() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("index"));
        reset(&paths).unwrap();

        let mut writer = IndexWriter::new();
        writer.upsert(Document::from_page("https://a.test/", Some("Alpha"), "alpha body text"));
        writer.commit(&paths, &PorterStemmer::default()).unwrap();

        let store = IndexStore::open(&paths).unwrap();
        assert_eq!(store.meta.num_docs, 1);
        assert_eq!(store.docs.len(), 1);
        assert!(store.index.df("alpha") > 0);
    }

    #[test]
    fn reset_discards_prior_state() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("index"));
        reset(&paths).unwrap();

        let mut writer = IndexWriter::new();
        writer.upsert(Document::from_page("https://a.test/", Some("Alpha"), "alpha"));
        writer.commit(&paths, &PorterStemmer::default()).unwrap();

        reset(&paths).unwrap();
        assert!(matches!(IndexStore::open(&paths), Err(StoreError::NotBuilt)));
    }
}
