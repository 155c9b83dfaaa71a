//! Durable ping list storage.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::PathBuf;

use log::{debug, info};
use tokio::sync::RwLock;

use crate::error::{BotError, Result};
use crate::validate::{is_valid_list_name, is_valid_nick};

/// The full store contents: list name to member set.
pub type PinglistMap = HashMap<String, BTreeSet<String>>;

/// Durable backing for the ping list map.
///
/// Implementations only need whole-map load and persist; the store keeps the
/// working copy in memory and rewrites the backing on every mutation.
pub trait StorageBackend: Send + Sync {
    fn load(&self) -> Result<PinglistMap>;
    fn persist(&self, lists: &PinglistMap) -> Result<()>;
}

/// JSON file on disk, rewritten atomically (temp file + rename) on every
/// mutation. A missing file means an empty store.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StorageBackend for JsonFileBackend {
    fn load(&self) -> Result<PinglistMap> {
        if !self.path.exists() {
            debug!("No ping list database at {}, starting empty", self.path.display());
            return Ok(PinglistMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn persist(&self, lists: &PinglistMap) -> Result<()> {
        let raw = serde_json::to_string_pretty(lists)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory backend for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryBackend {
    saved: std::sync::Mutex<PinglistMap>,
}

#[cfg(test)]
impl StorageBackend for MemoryBackend {
    fn load(&self) -> Result<PinglistMap> {
        Ok(self.saved.lock().expect("backend lock poisoned").clone())
    }

    fn persist(&self, lists: &PinglistMap) -> Result<()> {
        *self.saved.lock().expect("backend lock poisoned") = lists.clone();
        Ok(())
    }
}

/// Owner of all ping list data; the sole writer.
///
/// Mutations take the write lock, apply the change to a candidate copy,
/// persist it, and only then commit it to memory, so a failed persist never
/// leaves a half-applied set visible and two mutations of the same list
/// cannot interleave.
pub struct PinglistStore {
    backend: Box<dyn StorageBackend>,
    lists: RwLock<PinglistMap>,
}

impl PinglistStore {
    /// Loads the store from its backend.
    pub fn open(backend: Box<dyn StorageBackend>) -> Result<Self> {
        let lists = backend.load()?;
        info!("Loaded {} ping list(s)", lists.len());
        Ok(Self {
            backend,
            lists: RwLock::new(lists),
        })
    }

    /// Creates a new list seeded with `seed`.
    pub async fn create(&self, name: &str, seed: BTreeSet<String>) -> Result<()> {
        if !is_valid_list_name(name) {
            return Err(BotError::InvalidListName(name.to_string()));
        }
        if let Some(bad) = seed.iter().find(|nick| !is_valid_nick(nick)) {
            return Err(BotError::InvalidNick(bad.clone()));
        }
        let mut lists = self.lists.write().await;
        if lists.contains_key(name) {
            return Err(BotError::ListExists(name.to_string()));
        }
        let mut next = lists.clone();
        next.insert(name.to_string(), seed);
        self.backend.persist(&next)?;
        *lists = next;
        debug!("Created ping list {}", name);
        Ok(())
    }

    /// Deletes a list entirely.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut lists = self.lists.write().await;
        if !lists.contains_key(name) {
            return Err(BotError::NoSuchList(name.to_string()));
        }
        let mut next = lists.clone();
        next.remove(name);
        self.backend.persist(&next)?;
        *lists = next;
        debug!("Deleted ping list {}", name);
        Ok(())
    }

    /// Unions `nicks` into an existing list. Adding a present nick is a no-op.
    pub async fn add_members(&self, name: &str, nicks: &BTreeSet<String>) -> Result<()> {
        let mut lists = self.lists.write().await;
        if !lists.contains_key(name) {
            return Err(BotError::NoSuchList(name.to_string()));
        }
        if let Some(bad) = nicks.iter().find(|nick| !is_valid_nick(nick)) {
            return Err(BotError::InvalidNick(bad.clone()));
        }
        let mut next = lists.clone();
        if let Some(members) = next.get_mut(name) {
            members.extend(nicks.iter().cloned());
        }
        self.backend.persist(&next)?;
        *lists = next;
        Ok(())
    }

    /// Removes `nicks` from an existing list. Removing an absent nick is a
    /// no-op.
    pub async fn remove_members(&self, name: &str, nicks: &BTreeSet<String>) -> Result<()> {
        let mut lists = self.lists.write().await;
        if !lists.contains_key(name) {
            return Err(BotError::NoSuchList(name.to_string()));
        }
        if let Some(bad) = nicks.iter().find(|nick| !is_valid_nick(nick)) {
            return Err(BotError::InvalidNick(bad.clone()));
        }
        let mut next = lists.clone();
        if let Some(members) = next.get_mut(name) {
            members.retain(|member| !nicks.contains(member));
        }
        self.backend.persist(&next)?;
        *lists = next;
        Ok(())
    }

    /// Returns a snapshot of a list's members.
    pub async fn get(&self, name: &str) -> Result<BTreeSet<String>> {
        let lists = self.lists.read().await;
        lists
            .get(name)
            .cloned()
            .ok_or_else(|| BotError::NoSuchList(name.to_string()))
    }

    /// Returns all list names, lexicographically sorted.
    pub async fn list_names(&self) -> Vec<String> {
        let lists = self.lists.read().await;
        let mut names: Vec<String> = lists.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nicks(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn empty_store() -> PinglistStore {
        PinglistStore::open(Box::new(MemoryBackend::default())).expect("open store")
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let store = empty_store();
        store.create("foo", BTreeSet::new()).await.expect("first create");
        let err = store.create("foo", BTreeSet::new()).await.unwrap_err();
        assert!(matches!(err, BotError::ListExists(_)));
    }

    #[tokio::test]
    async fn create_rejects_illegal_names() {
        let store = empty_store();
        let err = store.create("a b", BTreeSet::new()).await.unwrap_err();
        assert!(matches!(err, BotError::InvalidListName(_)));
    }

    #[tokio::test]
    async fn delete_removes_the_list() {
        let store = empty_store();
        store.create("foo", BTreeSet::new()).await.expect("create");
        store.delete("foo").await.expect("delete");
        let err = store.get("foo").await.unwrap_err();
        assert!(matches!(err, BotError::NoSuchList(_)));
    }

    #[tokio::test]
    async fn delete_of_absent_list_fails() {
        let store = empty_store();
        let err = store.delete("nothere").await.unwrap_err();
        assert!(matches!(err, BotError::NoSuchList(_)));
    }

    #[tokio::test]
    async fn add_then_remove_restores_the_original_set() {
        let store = empty_store();
        store.create("team", nicks(&["alice"])).await.expect("create");
        store
            .add_members("team", &nicks(&["bob", "carol"]))
            .await
            .expect("add");
        store
            .remove_members("team", &nicks(&["bob", "carol"]))
            .await
            .expect("remove");
        assert_eq!(store.get("team").await.expect("get"), nicks(&["alice"]));
    }

    #[tokio::test]
    async fn mutations_are_idempotent() {
        let store = empty_store();
        store.create("team", nicks(&["alice"])).await.expect("create");
        store.add_members("team", &nicks(&["alice"])).await.expect("add");
        assert_eq!(store.get("team").await.expect("get"), nicks(&["alice"]));
        store
            .remove_members("team", &nicks(&["ghost"]))
            .await
            .expect("remove");
        assert_eq!(store.get("team").await.expect("get"), nicks(&["alice"]));
    }

    #[tokio::test]
    async fn add_rejects_illegal_nicks_without_mutating() {
        let store = empty_store();
        store.create("team", nicks(&["alice"])).await.expect("create");
        let err = store
            .add_members("team", &nicks(&["bob", "not a nick"]))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::InvalidNick(_)));
        assert_eq!(store.get("team").await.expect("get"), nicks(&["alice"]));
    }

    #[tokio::test]
    async fn list_names_are_sorted() {
        let store = empty_store();
        for name in ["zeta", "alpha", "mid"] {
            store.create(name, BTreeSet::new()).await.expect("create");
        }
        assert_eq!(store.list_names().await, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn json_backend_survives_a_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pinglists.json");

        let store = PinglistStore::open(Box::new(JsonFileBackend::new(&path))).expect("open");
        store.create("team", nicks(&["alice"])).await.expect("create");
        store.add_members("team", &nicks(&["bob"])).await.expect("add");
        drop(store);

        let reopened = PinglistStore::open(Box::new(JsonFileBackend::new(&path))).expect("reopen");
        assert_eq!(
            reopened.get("team").await.expect("get"),
            nicks(&["alice", "bob"])
        );
    }

    #[tokio::test]
    async fn json_backend_starts_empty_without_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.json");
        let store = PinglistStore::open(Box::new(JsonFileBackend::new(&path))).expect("open");
        assert!(store.list_names().await.is_empty());
    }
}
