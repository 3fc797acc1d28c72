//! Read access to the documents written by the rating pipeline.
//!
//! [`RatingStore`] is the query interface the rest of the crate depends on.
//! [`JsonStore`] implements it over a directory of JSON documents:
//!
//! ```text
//! <data directory>/
//!     politicians.json   array of politician documents
//!     contests.json      array of contest documents
//!     metadata.json      {"last_updated": "<RFC 3339>"} (optional)
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};

use crate::error::*;
use crate::model::{Contest, ContestId, Politician, PoliticianId};

/// How a single politician is looked up.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PoliticianKey {
    Id(PoliticianId),
    /// Exact display name.
    Name(String),
}

/// Case-insensitive literal match on the name of a politician.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NameFilter {
    needle: String,
}

impl NameFilter {
    pub fn new(text: &str) -> NameFilter {
        NameFilter {
            needle: text.to_lowercase(),
        }
    }

    /// Matches either the display name or the searchable form of it.
    pub fn matches(&self, politician: &Politician) -> bool {
        politician.name.to_lowercase().contains(&self.needle)
            || politician
                .searchable_name
                .as_ref()
                .map(|s| s.to_lowercase().contains(&self.needle))
                .unwrap_or(false)
    }
}

pub trait RatingStore {
    fn politician(&self, key: &PoliticianKey) -> StoreResult<Option<Politician>>;

    /// The contest records whose ids are in `ids`, each at most once, in store order.
    fn contests_by_ids(&self, ids: &[ContestId]) -> StoreResult<Vec<Contest>>;

    /// Politicians by ascending stored ranking, optionally filtered by name.
    fn ranked_page(&self, filter: Option<&NameFilter>, limit: usize)
        -> StoreResult<Vec<Politician>>;

    fn last_updated(&self) -> StoreResult<Option<DateTime<Utc>>>;
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
    // Sorted by ranking.
    politicians: Vec<Politician>,
    contests: Vec<Contest>,
    contest_positions: HashMap<ContestId, usize>,
    metadata: Metadata,
}

impl JsonStore {
    pub const POLITICIANS_FILE: &'static str = "politicians.json";
    pub const CONTESTS_FILE: &'static str = "contests.json";
    pub const METADATA_FILE: &'static str = "metadata.json";

    pub fn open(root: &Path) -> StoreResult<JsonStore> {
        ensure!(
            root.is_dir(),
            InvalidDataDirectorySnafu {
                path: root.to_path_buf()
            }
        );
        info!("Opening rating data in {:?}", root);
        let politicians: Vec<Politician> = read_documents(&root.join(Self::POLITICIANS_FILE))?;
        let contests: Vec<Contest> = read_documents(&root.join(Self::CONTESTS_FILE))?;
        let metadata_path = root.join(Self::METADATA_FILE);
        let metadata: Metadata = if metadata_path.exists() {
            read_documents(&metadata_path)?
        } else {
            warn!("No {} in {:?}", Self::METADATA_FILE, root);
            Metadata::default()
        };
        let mut store = JsonStore::from_documents(politicians, contests, metadata)?;
        store.root = root.to_path_buf();
        Ok(store)
    }

    pub fn from_documents(
        mut politicians: Vec<Politician>,
        contests: Vec<Contest>,
        metadata: Metadata,
    ) -> StoreResult<JsonStore> {
        let mut seen: HashSet<PoliticianId> = HashSet::with_capacity(politicians.len());
        for p in politicians.iter() {
            ensure!(seen.insert(p.id), DuplicatePoliticianSnafu { id: p.id });
        }
        let mut contest_positions: HashMap<ContestId, usize> =
            HashMap::with_capacity(contests.len());
        for (idx, c) in contests.iter().enumerate() {
            ensure!(
                contest_positions.insert(c.id, idx).is_none(),
                DuplicateStoredContestSnafu { id: c.id }
            );
        }
        politicians.sort_by_key(|p| p.ranking);
        info!(
            "Loaded {} politicians and {} contests",
            politicians.len(),
            contests.len()
        );
        Ok(JsonStore {
            root: PathBuf::new(),
            politicians,
            contests,
            contest_positions,
            metadata,
        })
    }

    /// The directory the documents were read from; empty for in-memory stores.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn read_documents<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_documents: {} bytes from {:?}", contents.len(), path);
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

impl RatingStore for JsonStore {
    fn politician(&self, key: &PoliticianKey) -> StoreResult<Option<Politician>> {
        let found = match key {
            PoliticianKey::Id(id) => self.politicians.iter().find(|p| p.id == *id),
            PoliticianKey::Name(name) => self.politicians.iter().find(|p| p.name == *name),
        };
        debug!("politician: {:?} -> {:?}", key, found.map(|p| p.id));
        Ok(found.cloned())
    }

    fn contests_by_ids(&self, ids: &[ContestId]) -> StoreResult<Vec<Contest>> {
        let mut positions: Vec<usize> = ids
            .iter()
            .filter_map(|id| self.contest_positions.get(id).copied())
            .collect();
        positions.sort_unstable();
        positions.dedup();
        Ok(positions
            .into_iter()
            .map(|idx| self.contests[idx].clone())
            .collect())
    }

    fn ranked_page(
        &self,
        filter: Option<&NameFilter>,
        limit: usize,
    ) -> StoreResult<Vec<Politician>> {
        Ok(self
            .politicians
            .iter()
            .filter(|p| filter.map(|f| f.matches(p)).unwrap_or(true))
            .take(limit)
            .cloned()
            .collect())
    }

    fn last_updated(&self) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self.metadata.last_updated)
    }
}

static SHARED_STORE: OnceLock<JsonStore> = OnceLock::new();

/// The process-wide store, loaded from `root` on first use and kept for the
/// life of the process.
///
/// Later calls return the already loaded store, whatever their `root`.
pub fn shared_store(root: &Path) -> StoreResult<&'static JsonStore> {
    if let Some(store) = SHARED_STORE.get() {
        if store.root() != root {
            warn!(
                "shared_store: already loaded from {:?}, ignoring {:?}",
                store.root(),
                root
            );
        }
        return Ok(store);
    }
    let store = JsonStore::open(root)?;
    // Another thread may have won the race; its store is as good as ours.
    Ok(SHARED_STORE.get_or_init(|| store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::tests::politician;
    use crate::timeline::tests::contest;
    use serde_json::json;

    fn store() -> JsonStore {
        let mut bernie = politician(1, 2700.0, 2, Some(1));
        bernie.name = "Bernard Sanders".to_string();
        bernie.searchable_name = Some("Bernard Sanders".to_string());
        let mut jose = politician(2, 2650.0, 1, Some(2));
        jose.name = "José Serrano".to_string();
        jose.searchable_name = Some("Jose Serrano".to_string());
        let mut third = politician(3, 1200.0, 3, None);
        third.name = "Bernice Johnson".to_string();
        JsonStore::from_documents(
            vec![bernie, jose, third],
            vec![contest(10, 2016), contest(11, 2018), contest(12, 2020)],
            Metadata::default(),
        )
        .unwrap()
    }

    #[test]
    fn page_is_ordered_by_ranking() {
        let s = store();
        let page = s.ranked_page(None, 100).unwrap();
        let ids: Vec<u64> = page.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(s.ranked_page(None, 2).unwrap().len(), 2);
    }

    #[test]
    fn name_filter() {
        let s = store();
        let f = NameFilter::new("BERN");
        let ids: Vec<u64> = s
            .ranked_page(Some(&f), 100)
            .unwrap()
            .iter()
            .map(|p| p.id.0)
            .collect();
        assert_eq!(ids, vec![1, 3]);

        // Accent-free form of the name.
        let f = NameFilter::new("jose");
        assert_eq!(s.ranked_page(Some(&f), 100).unwrap().len(), 1);

        // Regex metacharacters are plain text.
        let f = NameFilter::new("b.rn");
        assert!(s.ranked_page(Some(&f), 100).unwrap().is_empty());
    }

    #[test]
    fn lookups() {
        let s = store();
        let p = s.politician(&PoliticianKey::Id(PoliticianId(3))).unwrap();
        assert_eq!(p.unwrap().name, "Bernice Johnson");
        let p = s
            .politician(&PoliticianKey::Name("José Serrano".to_string()))
            .unwrap();
        assert_eq!(p.unwrap().id, PoliticianId(2));
        assert!(s
            .politician(&PoliticianKey::Id(PoliticianId(42)))
            .unwrap()
            .is_none());

        let cs = s
            .contests_by_ids(&[ContestId(12), ContestId(10), ContestId(12), ContestId(99)])
            .unwrap();
        let ids: Vec<u64> = cs.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![10, 12]);
    }

    #[test]
    fn duplicates_rejected() {
        let err = JsonStore::from_documents(
            vec![politician(1, 1.0, 1, None), politician(1, 2.0, 2, None)],
            vec![],
            Metadata::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::DuplicatePolitician { .. }));

        let err = JsonStore::from_documents(
            vec![],
            vec![contest(5, 2000), contest(5, 2002)],
            Metadata::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateStoredContest { .. }));
    }

    #[test]
    fn open_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(JsonStore::POLITICIANS_FILE),
            json!([{
                "_id": 1,
                "name": "Jane Roe",
                "rating": {"mu": 1500.0, "sigma": 300.0, "low_confidence": true},
                "ranking": 1,
                "last_ran_in": 2022,
                "party": "Republican Party",
                "rating_history": [{"contest_id": null, "rating": {"mu": 1500.0, "sigma": 500.0}}]
            }])
            .to_string(),
        )
        .unwrap();
        fs::write(dir.path().join(JsonStore::CONTESTS_FILE), "[]").unwrap();
        fs::write(
            dir.path().join(JsonStore::METADATA_FILE),
            json!({"last_updated": "2022-11-09T12:00:00Z"}).to_string(),
        )
        .unwrap();

        let s = JsonStore::open(dir.path()).unwrap();
        assert_eq!(s.root(), dir.path());
        assert_eq!(
            s.last_updated().unwrap().unwrap().to_rfc3339(),
            "2022-11-09T12:00:00+00:00"
        );
        let page = s.ranked_page(None, 10).unwrap();
        assert_eq!(page[0].party.color, "#e91d0e");
    }

    #[test]
    fn open_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonStore::open(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDataDirectory { .. }));

        let err = JsonStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::OpeningJson { .. }));

        fs::write(dir.path().join(JsonStore::POLITICIANS_FILE), "{").unwrap();
        let err = JsonStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::ParsingJson { .. }));
    }

    #[test]
    fn shared_store_is_loaded_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(JsonStore::POLITICIANS_FILE), "[]").unwrap();
        fs::write(dir.path().join(JsonStore::CONTESTS_FILE), "[]").unwrap();
        let a = shared_store(dir.path()).unwrap();
        let b = shared_store(Path::new("/nonexistent")).unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
