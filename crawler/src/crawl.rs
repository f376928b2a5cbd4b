use crate::fetch::Fetch;
use crate::page::Page;
use sitesearch_core::index::{Document, IndexWriter};
use sitesearch_core::persist::{self, IndexPaths};
use sitesearch_core::tokenizer::PorterStemmer;
use std::collections::HashSet;
use url::Url;

/// Extensions the crawl never follows: images, documents, stylesheets,
/// scripts.
const SKIP_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".pdf", ".css", ".js"];

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Seed URL the frontier starts from.
    pub seed: Url,
    /// Resolved links must start with this prefix to count as internal.
    pub prefix: String,
}

#[derive(Debug, Default)]
pub struct CrawlStats {
    pub pages_indexed: usize,
    pub fetch_failures: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Running,
    Done,
}

/// One crawl run: owns the frontier (LIFO, depth-first) and the visited
/// set, drives fetch -> extract -> enqueue, and commits the index batch
/// once after the frontier drains. Constructed per run, discarded after.
pub struct Crawler<F: Fetch> {
    config: CrawlConfig,
    fetcher: F,
    frontier: Vec<Url>,
    visited: HashSet<String>,
    phase: Phase,
}

impl<F: Fetch> Crawler<F> {
    pub fn new(config: CrawlConfig, fetcher: F) -> Self {
        let frontier = vec![config.seed.clone()];
        Self { config, fetcher, frontier, visited: HashSet::new(), phase: Phase::Ready }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Drain the frontier, indexing every fetchable page. The index
    /// directory is wiped up front and the batch committed once at the
    /// end, so an interrupted run never leaves a partial index visible.
    /// A failed fetch is logged and skipped, never retried.
    pub fn run(&mut self, paths: &IndexPaths) -> anyhow::Result<CrawlStats> {
        debug_assert_eq!(self.phase, Phase::Ready);
        self.phase = Phase::Running;
        persist::reset(paths)?;

        let stemmer = PorterStemmer::default();
        let mut writer = IndexWriter::new();
        let mut stats = CrawlStats::default();

        while let Some(url) = self.frontier.pop() {
            let key = url.to_string();
            if self.visited.contains(&key) {
                continue;
            }
            self.visited.insert(key);

            tracing::info!(%url, frontier = self.frontier.len(), "fetching");
            let body = match self.fetcher.fetch(&url) {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(%url, %err, "fetch failed, skipping");
                    stats.fetch_failures += 1;
                    continue;
                }
            };

            let page = Page::parse(url, &body);
            writer.upsert(Document::from_page(
                page.url().as_str(),
                page.title().as_deref(),
                &page.text(),
            ));
            stats.pages_indexed += 1;

            for link in page.links() {
                if self.should_follow(&link) {
                    self.frontier.push(link);
                }
            }
        }

        writer.commit(paths, &stemmer)?;
        self.phase = Phase::Done;
        Ok(stats)
    }

    /// Internal links only: prefix match, no filtered extension, not yet
    /// visited.
    fn should_follow(&self, link: &Url) -> bool {
        let s = link.as_str();
        s.starts_with(&self.config.prefix)
            && !SKIP_EXTENSIONS.iter().any(|ext| s.ends_with(ext))
            && !self.visited.contains(s)
    }
}
