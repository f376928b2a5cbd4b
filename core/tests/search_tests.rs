use sitesearch_core::index::{Document, IndexWriter};
use sitesearch_core::persist::{self, IndexPaths, StoreError};
use sitesearch_core::query::Searcher;
use sitesearch_core::tokenizer::PorterStemmer;
use tempfile::tempdir;

fn build_index(paths: &IndexPaths, pages: &[(&str, &str, &str)]) {
    persist::reset(paths).unwrap();
    let mut writer = IndexWriter::new();
    for &(url, title, body) in pages {
        writer.upsert(Document::from_page(url, Some(title), body));
    }
    writer.commit(paths, &PorterStemmer::default()).unwrap();
}

#[test]
fn unbuilt_index_is_a_distinct_error() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("never-built"));
    let err = Searcher::open(&paths).err().expect("must not open");
    assert!(matches!(err, StoreError::NotBuilt));
    assert_eq!(err.to_string(), "index does not exist");
}

#[test]
fn stemmed_query_matches_inflected_text() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("index"));
    build_index(
        &paths,
        &[("https://site.test/a", "Training", "I went running through town every morning")],
    );

    let results = Searcher::open(&paths).unwrap().search("run");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "https://site.test/a");
    assert_eq!(results[0].matching_words, vec!["run"]);
    assert!(results[0].missing_words.is_empty());
    assert_eq!(results[0].rank, 1);
    assert!(results[0].tfidf_score > 0.0);
}

#[test]
fn nonsense_query_is_empty_but_not_an_error() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("index"));
    build_index(&paths, &[("https://site.test/a", "Alpha", "ordinary page content here")]);

    let results = Searcher::open(&paths).unwrap().search("zzzznotaword");
    assert!(results.is_empty());
}

#[test]
fn fuzzy_variant_matches_without_counting_as_word_match() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("index"));
    build_index(&paths, &[("https://site.test/a", "Colors", "bright color everywhere")]);

    // "colpr" is one edit from "color": hits via the fuzzy branch only,
    // so the document is returned but the word is reported missing.
    let results = Searcher::open(&paths).unwrap().search("colpr");
    assert_eq!(results.len(), 1);
    assert!(results[0].matching_words.is_empty());
    assert_eq!(results[0].missing_words, vec!["colpr"]);
    assert_eq!(results[0].rank, 0);
    assert!(results[0].tfidf_score > 0.0);
}

#[test]
fn higher_score_sorts_first_regardless_of_rank() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("index"));
    // Doc A hits "grape" many times (high tf, rank 1); doc B hits both
    // query words once each (rank 2, lower total score).
    let repeated = "grape ".repeat(10);
    build_index(
        &paths,
        &[
            ("https://site.test/a", "A", repeated.as_str()),
            ("https://site.test/b", "B", "grape melon"),
        ],
    );

    let results = Searcher::open(&paths).unwrap().search("grape melon");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "https://site.test/a");
    assert_eq!(results[0].rank, 1);
    assert_eq!(results[1].url, "https://site.test/b");
    assert_eq!(results[1].rank, 2);
    assert!(results[0].tfidf_score > results[1].tfidf_score);
}

#[test]
fn missing_words_are_reported_per_document() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("index"));
    build_index(&paths, &[("https://site.test/a", "A", "apples grow on trees")]);

    let results = Searcher::open(&paths).unwrap().search("apples zucchini");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].matching_words, vec!["apples"]);
    assert_eq!(results[0].missing_words, vec!["zucchini"]);
}

#[test]
fn recrawl_replaces_prior_documents() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("index"));
    build_index(&paths, &[("https://site.test/a", "Old", "obsolete wording")]);
    build_index(&paths, &[("https://site.test/a", "New", "fresh wording")]);

    let searcher = Searcher::open(&paths).unwrap();
    assert!(searcher.search("obsolete").is_empty());
    let results = searcher.search("fresh");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "New");
}
