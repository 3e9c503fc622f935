//! Retrieval service: owns the current index snapshot.
//!
//! Readers clone the `Arc` under a short read lock and score against their
//! own reference; a rebuild builds a complete new snapshot first and then
//! swaps the `Arc` under the write lock. A query already in flight keeps the
//! snapshot it started with.

use folio_core::config::KnowledgeConfig;
use folio_core::error::Result;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::document::Snippet;
use crate::fallback::FallbackMatcher;
use crate::index::{self, Snapshot};
use crate::search::{Ranked, Searcher};
use crate::source::LocaleRecord;

/// Knowledge store — the in-memory index behind the chat assistant.
pub struct KnowledgeStore {
    config: KnowledgeConfig,
    searcher: Searcher,
    snapshot: RwLock<Arc<Snapshot>>,
    /// Serializes rebuilds; readers never take it.
    rebuild_lock: Mutex<()>,
}

impl KnowledgeStore {
    /// Build the first snapshot. A store never exists without one.
    pub fn open(config: KnowledgeConfig) -> Result<Self> {
        let snapshot = index::build(&config)?;
        Ok(Self::with_snapshot(config, snapshot))
    }

    /// Wrap an already built snapshot.
    pub fn with_snapshot(config: KnowledgeConfig, snapshot: Snapshot) -> Self {
        Self {
            searcher: Searcher::from_config(&config),
            config,
            snapshot: RwLock::new(Arc::new(snapshot)),
            rebuild_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    /// The current snapshot. Holding the returned `Arc` pins it across
    /// rebuilds.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of documents in the current snapshot.
    pub fn count(&self) -> usize {
        self.snapshot().len()
    }

    /// Rank the current snapshot and project the top `k` (default
    /// `default_k`) into snippets.
    pub fn snippets(&self, query: &str, lang: Option<&str>, k: Option<usize>) -> Vec<Snippet> {
        let snapshot = self.snapshot();
        self.snippets_in(&snapshot, query, lang, k)
    }

    /// Same as [`snippets`](Self::snippets) against a pinned snapshot.
    pub fn snippets_in(
        &self,
        snapshot: &Snapshot,
        query: &str,
        lang: Option<&str>,
        k: Option<usize>,
    ) -> Vec<Snippet> {
        let k = k.unwrap_or(self.config.default_k);
        let ranked = self.searcher.rank(snapshot.documents(), query, lang, k);
        tracing::debug!(
            "🔎 query={query:?} lang={lang:?}: {} of {} documents matched",
            ranked.len(),
            snapshot.len()
        );
        if let Some(top) = ranked.first() {
            tracing::debug!("  top: {} (score {})", top.document.title, top.score);
        }
        ranked
            .iter()
            .map(|Ranked { document, score }| {
                Snippet::from_document(document, *score, self.config.excerpt_chars)
            })
            .collect()
    }

    /// Re-extract both sources and swap in the new snapshot.
    ///
    /// On failure the previous snapshot stays active.
    pub fn rebuild(&self) -> Result<usize> {
        let _guard = self.rebuild_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let fresh = match index::build(&self.config) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("❌ Reindex failed, keeping previous snapshot: {e}");
                return Err(e);
            }
        };
        let count = fresh.len();
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(fresh);
        tracing::info!("🔄 Reindexed: {count} documents");
        Ok(count)
    }

    /// Offline answer from the structured record of `lang` (default language
    /// when `None`).
    pub fn fallback_answer(&self, query: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or_else(|| self.config.default_language());
        let snapshot = self.snapshot();
        let empty = LocaleRecord::default();
        let record = snapshot.locale(lang).unwrap_or(&empty);
        FallbackMatcher::new(record, lang).answer(query)
    }
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("documents", &self.count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::error::FolioError;
    use std::path::Path;

    const EN: &str = r#"{
        "about": {"title": "About me", "subtitle": "Engineer", "values": []},
        "portfolio": {"items": [
            {"title": "AI CRM", "description": "Lead scoring for sales", "tags": [], "slug": "crm"},
            {"title": "Pricing Engine", "description": "Dynamic pricing rules", "tags": ["pricing"], "slug": "pricing"}
        ]}
    }"#;
    const NL: &str = r#"{
        "about": {"title": "Over mij"},
        "portfolio": {"items": [
            {"title": "AI CRM", "description": "Leadscoring", "tags": ["crm"], "slug": "crm"}
        ]}
    }"#;

    fn site(root: &Path) -> KnowledgeConfig {
        let i18n = root.join("frontend/src/i18n");
        let content = root.join("frontend/src/content/en");
        std::fs::create_dir_all(&i18n).unwrap();
        std::fs::create_dir_all(&content).unwrap();
        std::fs::write(i18n.join("en.json"), EN).unwrap();
        std::fs::write(i18n.join("nl.json"), NL).unwrap();
        std::fs::write(
            content.join("crm.mdx"),
            "---\ndescription: ML lead scoring\ntags: [\"ai\", \"crm\"]\n---\nFull write-up.",
        )
        .unwrap();
        KnowledgeConfig {
            site_root: root.to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_and_snippets() {
        let tmp = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::open(site(tmp.path())).unwrap();
        assert_eq!(store.count(), 5);

        let snippets = store.snippets("crm", Some("en"), None);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].slug.as_deref(), Some("crm"));
        assert_eq!(snippets[0].tags, vec!["ai", "crm"]);
        assert!(snippets[0].excerpt.starts_with("ML lead scoring Lead scoring for sales"));
        // title 6 + tag 4; the merged text never says "crm"
        assert_eq!(snippets[0].score, 10);
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = site(tmp.path());
        config.excerpt_chars = 5;
        let store = KnowledgeStore::open(config).unwrap();
        let snippets = store.snippets("pricing", Some("en"), Some(4));
        assert_eq!(snippets[0].excerpt, "Dynam");
    }

    #[test]
    fn test_open_fails_without_structured_source() {
        let tmp = tempfile::tempdir().unwrap();
        let config = KnowledgeConfig {
            site_root: tmp.path().to_string_lossy().into_owned(),
            ..Default::default()
        };
        assert!(matches!(
            KnowledgeStore::open(config),
            Err(FolioError::Source(_))
        ));
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::open(site(tmp.path())).unwrap();
        std::fs::remove_dir_all(tmp.path().join("frontend/src/i18n")).unwrap();

        assert!(store.rebuild().is_err());
        assert_eq!(store.count(), 5);
        assert_eq!(store.snippets("pricing", Some("en"), None).len(), 1);
    }

    #[test]
    fn test_reader_keeps_its_snapshot_across_rebuild() {
        let tmp = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::open(site(tmp.path())).unwrap();
        let pinned = store.snapshot();

        std::fs::write(
            tmp.path().join("frontend/src/content/en/search.mdx"),
            "---\ntitle: Search engine\n---\nKeyword search.",
        )
        .unwrap();
        assert_eq!(store.rebuild().unwrap(), 6);

        assert_eq!(pinned.len(), 5);
        assert!(store.snippets_in(&pinned, "search", Some("en"), None).is_empty());
        assert_eq!(store.count(), 6);
        assert_eq!(store.snippets("search", Some("en"), None)[0].title, "Search engine");
    }

    #[test]
    fn test_concurrent_readers_during_rebuilds() {
        let tmp = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::open(site(tmp.path())).unwrap();

        std::thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..20 {
                    store.rebuild().unwrap();
                }
            });
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let snapshot = store.snapshot();
                        assert_eq!(snapshot.len(), 5);
                        let ids: Vec<_> =
                            snapshot.documents().iter().map(|d| d.id.as_str()).collect();
                        assert_eq!(ids.iter().filter(|id| id.ends_with("-crm")).count(), 2);
                    }
                });
            }
        });
    }

    #[test]
    fn test_fallback_answer_uses_snapshot_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::open(site(tmp.path())).unwrap();
        let answer = store.fallback_answer("list projects", Some("nl"));
        assert_eq!(answer, "AI CRM → /nl/project/crm\n- Leadscoring\n- Tags: crm");
        let answer = store.fallback_answer("pricing", None);
        assert!(answer.starts_with("Pricing Engine → /en/project/pricing"));
    }
}
