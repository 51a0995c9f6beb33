use std::collections::HashSet;

use tracing::{debug, info};

use crate::gateway::BackendApi;
use crate::models::{DiffResult, Snapshot, SnapshotFilter, SnapshotSort};
use crate::observable::{derived3, Derived, Observable, ReadOnly};

use super::ActionStatus;

/// Snapshots known to the client plus the current filter and sort choice.
#[derive(Clone)]
pub struct SnapshotStore {
    api: BackendApi,
    snapshots: Observable<Vec<Snapshot>>,
    filter: Observable<Option<SnapshotFilter>>,
    sort: Observable<Option<SnapshotSort>>,
    status: ActionStatus,
}

impl SnapshotStore {
    pub fn new(api: BackendApi) -> Self {
        Self {
            api,
            snapshots: Observable::new(Vec::new()),
            filter: Observable::new(None),
            sort: Observable::new(None),
            status: ActionStatus::new(),
        }
    }

    pub fn snapshots(&self) -> ReadOnly<Vec<Snapshot>> {
        self.snapshots.read_only()
    }

    pub fn filter(&self) -> ReadOnly<Option<SnapshotFilter>> {
        self.filter.read_only()
    }

    pub fn sort(&self) -> ReadOnly<Option<SnapshotSort>> {
        self.sort.read_only()
    }

    pub fn loading(&self) -> ReadOnly<bool> {
        self.status.loading()
    }

    pub fn error(&self) -> ReadOnly<Option<String>> {
        self.status.error()
    }

    /// Snapshots passing the filter, in the chosen order (stored order when unsorted).
    pub fn visible_snapshots(&self) -> Derived<Vec<Snapshot>> {
        derived3(
            &self.snapshots,
            &self.filter,
            &self.sort,
            |snapshots: &Vec<Snapshot>,
             filter: &Option<SnapshotFilter>,
             sort: &Option<SnapshotSort>| {
                let mut visible: Vec<Snapshot> = snapshots
                    .iter()
                    .filter(|snapshot| filter.as_ref().map_or(true, |f| f.matches(snapshot)))
                    .cloned()
                    .collect();
                if let Some(sort) = sort {
                    visible.sort_by(|a, b| sort.compare(a, b));
                }
                visible
            },
        )
    }

    pub fn set_snapshots(&self, list: Vec<Snapshot>) {
        self.snapshots.set(list);
    }

    /// Append snapshots whose id is not present yet. Existing entries are
    /// neither moved nor overwritten.
    pub fn add_snapshots(&self, incoming: Vec<Snapshot>) {
        self.snapshots.update(|current| {
            let mut known: HashSet<String> = current.iter().map(|s| s.id.clone()).collect();
            for snapshot in incoming {
                if known.insert(snapshot.id.clone()) {
                    current.push(snapshot);
                }
            }
        });
    }

    pub fn remove_snapshot(&self, id: &str) {
        self.snapshots.update(|current| current.retain(|s| s.id != id));
    }

    pub fn set_filter(&self, filter: Option<SnapshotFilter>) {
        self.filter.set(filter);
    }

    pub fn set_sort(&self, sort: Option<SnapshotSort>) {
        self.sort.set(sort);
    }

    /// Load one repository's snapshots into the collection, or replace the
    /// whole collection when no repository is given.
    pub async fn load_snapshots(&self, repository_id: Option<&str>) {
        self.status.begin();
        match self.api.list_snapshots(repository_id).await {
            Ok(list) if repository_id.is_some() => self.add_snapshots(list),
            Ok(list) => self.set_snapshots(list),
            Err(err) => self
                .status
                .fail("load_snapshots", &err, "Failed to load snapshots"),
        }
        self.status.finish();
    }

    /// Re-fetch every repository currently represented in the collection.
    ///
    /// Repositories are fetched one after another. The collection is only
    /// replaced when every fetch succeeds; any failure leaves it untouched.
    pub async fn refresh_snapshots(&self) {
        let repository_ids = self.snapshots.with(|snapshots| {
            let mut seen = HashSet::new();
            snapshots
                .iter()
                .filter(|s| seen.insert(s.repository_id.clone()))
                .map(|s| s.repository_id.clone())
                .collect::<Vec<_>>()
        });

        self.status.begin();
        let mut buffer = Vec::new();
        let mut failed = false;
        for repository_id in &repository_ids {
            match self.api.list_snapshots(Some(repository_id.as_str())).await {
                Ok(list) => buffer.extend(list),
                Err(err) => {
                    self.status
                        .fail("refresh_snapshots", &err, "Failed to refresh snapshots");
                    failed = true;
                    break;
                }
            }
        }
        if !failed {
            debug!(
                repositories = repository_ids.len(),
                snapshots = buffer.len(),
                "Refreshed snapshots"
            );
            self.set_snapshots(buffer);
        }
        self.status.finish();
    }

    /// Delete a snapshot on the backend, then drop it locally.
    pub async fn delete_snapshot(&self, id: &str) -> bool {
        self.status.begin();
        let deleted = match self.api.delete_snapshot(id).await {
            Ok(()) => {
                self.remove_snapshot(id);
                info!(snapshot = id, "Snapshot deleted");
                true
            }
            Err(err) => {
                self.status
                    .fail("delete_snapshot", &err, "Failed to delete snapshot");
                false
            }
        };
        self.status.finish();
        deleted
    }

    pub async fn compare_snapshots(&self, id_a: &str, id_b: &str, password: &str) -> Option<DiffResult> {
        self.status.begin();
        let result = match self.api.compare_snapshots(id_a, id_b, password).await {
            Ok(diff) => Some(diff),
            Err(err) => {
                self.status
                    .fail("compare_snapshots", &err, "Failed to compare snapshots");
                None
            }
        };
        self.status.finish();
        result
    }

    pub fn reset(&self) {
        self.snapshots.set(Vec::new());
        self.filter.set(None);
        self.sort.set(None);
        self.status.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing::{record, scripted, snapshot};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{json, Value};

    fn ids(list: &[Snapshot]) -> Vec<&str> {
        list.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn add_skips_known_ids() {
        let (_gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        store.set_snapshots(vec![snapshot("1", "A")]);

        store.add_snapshots(vec![snapshot("1", "B"), snapshot("2", "A")]);

        let list = store.snapshots().get();
        assert_eq!(ids(&list), ["1", "2"]);
        assert_eq!(list[0].repository_id, "A");
    }

    #[test]
    fn add_deduplicates_within_one_batch() {
        let (_gateway, api) = scripted();
        let store = SnapshotStore::new(api);

        store.add_snapshots(vec![snapshot("x", "A"), snapshot("x", "B"), snapshot("y", "A")]);
        store.add_snapshots(vec![snapshot("z", "A"), snapshot("y", "B")]);

        let list = store.snapshots().get();
        assert_eq!(ids(&list), ["x", "y", "z"]);
        assert_eq!(list[0].repository_id, "A");
    }

    #[test]
    fn removing_absent_id_changes_nothing() {
        let (_gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        store.set_snapshots(vec![snapshot("1", "A")]);

        store.remove_snapshot("missing");
        store.remove_snapshot("1");
        store.remove_snapshot("1");

        assert!(store.snapshots().get().is_empty());
    }

    #[tokio::test]
    async fn scoped_load_merges_and_unscoped_load_replaces() {
        let (gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        store.set_snapshots(vec![snapshot("1", "A")]);
        gateway
            .respond("list_snapshots", vec![snapshot("1", "A"), snapshot("2", "A")])
            .respond("list_snapshots", vec![snapshot("9", "B")]);

        store.load_snapshots(Some("A")).await;
        assert_eq!(ids(&store.snapshots().get()), ["1", "2"]);

        store.load_snapshots(None).await;
        assert_eq!(ids(&store.snapshots().get()), ["9"]);

        assert_eq!(
            gateway.calls_to("list_snapshots"),
            vec![json!({ "repositoryId": "A" }), json!({})]
        );
    }

    #[tokio::test]
    async fn failed_load_leaves_collection() {
        let (gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        store.set_snapshots(vec![snapshot("1", "A")]);
        gateway.reject("list_snapshots", "Repository not found");

        store.load_snapshots(Some("A")).await;

        assert_eq!(ids(&store.snapshots().get()), ["1"]);
        assert_eq!(store.error().get().as_deref(), Some("Repository not found"));
        assert!(!store.loading().get());
    }

    #[tokio::test]
    async fn refresh_refetches_each_repository_in_order() {
        let (gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        store.set_snapshots(vec![snapshot("1", "A"), snapshot("2", "B"), snapshot("3", "A")]);
        gateway
            .respond("list_snapshots", vec![snapshot("4", "A")])
            .respond("list_snapshots", vec![snapshot("5", "B")]);

        store.refresh_snapshots().await;

        assert_eq!(ids(&store.snapshots().get()), ["4", "5"]);
        assert_eq!(
            gateway.calls_to("list_snapshots"),
            vec![json!({ "repositoryId": "A" }), json!({ "repositoryId": "B" })]
        );
        assert_eq!(store.error().get(), None);
    }

    #[tokio::test]
    async fn refresh_waits_for_each_fetch_before_the_next() {
        let (gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        store.set_snapshots(vec![snapshot("1", "A"), snapshot("2", "B")]);
        let (loading, _sub) = record(&store.loading());
        let first = gateway.hold("list_snapshots");
        gateway.respond("list_snapshots", vec![snapshot("5", "B")]);

        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.refresh_snapshots().await })
        };
        first.invoked().await;

        assert_eq!(gateway.call_count("list_snapshots"), 1);
        assert!(store.loading().get());
        assert_eq!(ids(&store.snapshots().get()), ["1", "2"]);

        first.resolve(vec![snapshot("4", "A")]);
        task.await.unwrap();

        assert_eq!(gateway.call_count("list_snapshots"), 2);
        assert_eq!(ids(&store.snapshots().get()), ["4", "5"]);
        assert!(!store.loading().get());
        assert_eq!(*loading.lock(), vec![false, true, false]);
    }

    #[tokio::test]
    async fn refresh_is_all_or_nothing() {
        let (gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        let before = vec![snapshot("1", "A"), snapshot("2", "B")];
        store.set_snapshots(before.clone());
        gateway
            .respond("list_snapshots", vec![snapshot("10", "A")])
            .reject("list_snapshots", "B is unreachable");

        store.refresh_snapshots().await;

        assert_eq!(store.snapshots().get(), before);
        assert_eq!(store.error().get().as_deref(), Some("B is unreachable"));
        assert!(!store.loading().get());
    }

    #[tokio::test]
    async fn refresh_of_empty_collection_calls_nothing() {
        let (gateway, api) = scripted();
        let store = SnapshotStore::new(api);

        store.refresh_snapshots().await;

        assert!(gateway.calls().is_empty());
        assert!(store.snapshots().get().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_only_on_success() {
        let (gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        store.set_snapshots(vec![snapshot("1", "A"), snapshot("2", "A")]);
        gateway
            .reject("delete_snapshot", "Snapshot is locked")
            .respond("delete_snapshot", Value::Null);

        assert!(!store.delete_snapshot("1").await);
        assert_eq!(store.snapshots().get().len(), 2);

        assert!(store.delete_snapshot("1").await);
        assert_eq!(ids(&store.snapshots().get()), ["2"]);
        assert_eq!(store.error().get(), None);
    }

    #[tokio::test]
    async fn compare_returns_diff() {
        let (gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        gateway.respond(
            "compare_snapshots",
            json!({
                "added": ["/a"],
                "removed": [],
                "modified": ["/b"],
                "stats": { "added_count": 1, "removed_count": 0, "modified_count": 1, "total_size_change": -20 }
            }),
        );

        let diff = store.compare_snapshots("1", "2", "pw").await.unwrap();

        assert_eq!(diff.added, vec!["/a"]);
        assert_eq!(diff.stats.total_size_change, -20);
    }

    #[test]
    fn visible_snapshots_apply_filter_and_sort() {
        let (_gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        let base = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        let mut list = Vec::new();
        for (i, tag) in ["daily", "weekly", "daily"].iter().enumerate() {
            let mut s = snapshot(&format!("s{i}"), "A");
            s.time = base + Duration::days(i as i64);
            s.tags = vec![tag.to_string()];
            list.push(s);
        }
        store.set_snapshots(list);
        let visible = store.visible_snapshots();
        assert_eq!(ids(&visible.get()), ["s0", "s1", "s2"]);

        store.set_filter(Some(SnapshotFilter::tag("daily")));
        store.set_sort(Some(SnapshotSort::Newest));
        assert_eq!(ids(&visible.get()), ["s2", "s0"]);

        store.set_filter(None);
        assert_eq!(ids(&visible.get()), ["s2", "s1", "s0"]);
    }

    #[test]
    fn reset_clears_filter_and_sort() {
        let (_gateway, api) = scripted();
        let store = SnapshotStore::new(api);
        store.set_snapshots(vec![snapshot("1", "A")]);
        store.set_filter(Some(SnapshotFilter::tag("daily")));
        store.set_sort(Some(SnapshotSort::Oldest));

        store.reset();

        assert!(store.snapshots().get().is_empty());
        assert_eq!(store.filter().get(), None);
        assert_eq!(store.sort().get(), None);
    }
}
