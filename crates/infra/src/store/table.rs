use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use tradeerp_core::{DomainError, DomainResult, Entity};

type Predicate<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;

/// Committed row and the table version that last wrote it.
#[derive(Debug, Clone)]
struct Row<V> {
    version: u64,
    value: V,
}

/// What a transaction looked at, checked again at commit.
struct ReadSet<K, V> {
    keys: BTreeSet<K>,
    predicates: Vec<Predicate<V>>,
    scanned: bool,
}

impl<K, V> Default for ReadSet<K, V> {
    fn default() -> Self {
        Self {
            keys: BTreeSet::new(),
            predicates: Vec::new(),
            scanned: false,
        }
    }
}

/// Keyed table of entities, ordered by id.
///
/// Ids are UUIDv7, so iteration order is creation order. The committed rows
/// are shared: a transaction's copy holds the same snapshot plus its own
/// written rows, and records the rows and predicates it read so the commit
/// can reject it if any of them changed underneath.
pub struct Table<K, V> {
    rows: Arc<BTreeMap<K, Row<V>>>,
    version: u64,
    writes: BTreeMap<K, V>,
    reads: Option<Mutex<ReadSet<K, V>>>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: Arc::new(BTreeMap::new()),
            version: 0,
            writes: BTreeMap::new(),
            reads: None,
        }
    }
}

impl<K, V> core::fmt::Debug for Table<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Table")
            .field("version", &self.version)
            .field("rows", &self.rows.len())
            .field("written", &self.writes.len())
            .finish()
    }
}

impl<K, V> Table<K, V>
where
    K: Ord + Clone + core::fmt::Display,
    V: Entity<Id = K> + Clone + 'static,
{
    pub fn get(&self, id: &K) -> Option<&V> {
        self.track(|r| {
            r.keys.insert(id.clone());
        });
        self.lookup(id)
    }

    /// Like [`Table::get`], but a missing row is `NotFound("{what} {id}")`.
    pub fn require(&self, id: &K, what: &str) -> DomainResult<&V> {
        self.get(id)
            .ok_or_else(|| DomainError::not_found(format!("{what} {id}")))
    }

    pub fn require_mut(&mut self, id: &K, what: &str) -> DomainResult<&mut V> {
        self.track(|r| {
            r.keys.insert(id.clone());
        });
        self.write_entry(id)
            .ok_or_else(|| DomainError::not_found(format!("{what} {id}")))
    }

    /// Insert or replace a row.
    pub fn insert(&mut self, value: V) {
        let id = value.id().clone();
        self.track(|r| {
            r.keys.insert(id.clone());
        });
        self.writes.insert(id, value);
    }

    /// Every row. Inside a transaction this reads the whole table, so any
    /// concurrent write to it makes the commit fail.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.track(|r| r.scanned = true);
        self.values()
    }

    /// Rows matching `predicate`. Only concurrent writes to rows that match
    /// it, before or after the write, conflict with this read.
    pub fn filter<F>(&self, predicate: F) -> impl DoubleEndedIterator<Item = &V>
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        let predicate: Predicate<V> = Arc::new(predicate);
        self.track(|r| r.predicates.push(Arc::clone(&predicate)));
        self.values().filter(move |v| predicate(*v))
    }

    pub fn find<F>(&self, predicate: F) -> Option<&V>
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.filter(predicate).next()
    }

    pub fn find_mut<F>(&mut self, predicate: F) -> Option<&mut V>
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        let id = self.find(predicate).map(|v| v.id().clone())?;
        self.write_entry(&id)
    }

    pub fn len(&self) -> usize {
        self.track(|r| r.scanned = true);
        self.rows.len() + self.writes.keys().filter(|k| !self.rows.contains_key(*k)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn is_dirty(&self) -> bool {
        !self.writes.is_empty()
    }

    /// A transaction's copy: same committed rows, empty write and read sets.
    pub(crate) fn snapshot(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            version: self.version,
            writes: BTreeMap::new(),
            reads: Some(Mutex::new(ReadSet::default())),
        }
    }

    /// Fail if a row this copy read or wrote, or a row matching one of its
    /// predicates, was committed by someone else after the snapshot was taken.
    pub(crate) fn check_base(&self, committed: &Self, name: &str) -> DomainResult<()> {
        if committed.version == self.version {
            return Ok(());
        }
        let Some(reads) = &self.reads else {
            return Ok(());
        };
        let reads = reads.lock().unwrap_or_else(PoisonError::into_inner);
        let stale = |detail: String| {
            DomainError::conflict(format!(
                "{name} was changed by a concurrent transaction ({detail})"
            ))
        };

        if reads.scanned {
            return Err(stale("table was read in full".to_string()));
        }
        let changed = |id: &K| {
            self.rows.get(id).map(|r| r.version) != committed.rows.get(id).map(|r| r.version)
        };
        if let Some(id) = reads.keys.iter().chain(self.writes.keys()).find(|id| changed(id)) {
            return Err(stale(format!("row {id}")));
        }
        if !reads.predicates.is_empty() {
            let newer = committed.rows.iter().filter(|(_, row)| row.version > self.version);
            for (id, row) in newer {
                let before = self.rows.get(id).map(|r| &r.value);
                let matched = reads
                    .predicates
                    .iter()
                    .any(|p| p(&row.value) || before.is_some_and(|v| p(v)));
                if matched {
                    return Err(stale(format!("row {id} matches a query it ran")));
                }
            }
        }
        Ok(())
    }

    /// Publish this copy's written rows into the committed table.
    pub(crate) fn merge_into(self, committed: &mut Self) {
        let Self { rows, writes, .. } = self;
        if writes.is_empty() {
            return;
        }
        drop(rows);
        committed.version += 1;
        let version = committed.version;
        let target = Arc::make_mut(&mut committed.rows);
        for (id, value) in writes {
            target.insert(id, Row { version, value });
        }
    }

    fn lookup(&self, id: &K) -> Option<&V> {
        self.writes
            .get(id)
            .or_else(|| self.rows.get(id).map(|row| &row.value))
    }

    fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        let writes = &self.writes;
        let rows = &self.rows;
        rows.iter()
            .map(move |(id, row)| writes.get(id).unwrap_or(&row.value))
            .chain(
                writes
                    .iter()
                    .filter(move |(id, _)| !rows.contains_key(*id))
                    .map(|(_, value)| value),
            )
    }

    /// Copy a committed row into the write set on first mutable access.
    fn write_entry(&mut self, id: &K) -> Option<&mut V> {
        if !self.writes.contains_key(id) {
            let value = self.rows.get(id)?.value.clone();
            self.writes.insert(id.clone(), value);
        }
        self.writes.get_mut(id)
    }

    fn track(&self, f: impl FnOnce(&mut ReadSet<K, V>)) {
        if let Some(reads) = &self.reads {
            f(&mut reads.lock().unwrap_or_else(PoisonError::into_inner));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradeerp_core::typed_id;

    typed_id!(RowId, "row id");

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: RowId,
        label: &'static str,
    }

    impl Entity for Item {
        type Id = RowId;

        fn id(&self) -> &Self::Id {
            &self.id
        }
    }

    fn row(label: &'static str) -> Item {
        Item {
            id: RowId::generate(),
            label,
        }
    }

    fn committed_with(rows: &[Item]) -> Table<RowId, Item> {
        let mut committed = Table::default();
        let mut seed = committed.snapshot();
        for r in rows {
            seed.insert(r.clone());
        }
        seed.merge_into(&mut committed);
        committed
    }

    #[test]
    fn reads_do_not_mark_dirty() {
        let r = row("a");
        let copy = committed_with(&[r.clone()]).snapshot();
        assert_eq!(copy.get(r.id()), Some(&r));
        assert!(copy.find(|x| x.label == "a").is_some());
        assert!(!copy.is_dirty());
    }

    #[test]
    fn require_reports_missing_row() {
        let t: Table<RowId, Item> = Table::default();
        let id = RowId::generate();
        let err = t.require(&id, "row").unwrap_err();
        assert_eq!(err, DomainError::not_found(format!("row {id}")));
    }

    #[test]
    fn failed_mutable_lookups_do_not_mark_dirty() {
        let mut copy = committed_with(&[row("a")]).snapshot();
        assert!(copy.require_mut(&RowId::generate(), "row").is_err());
        assert!(copy.find_mut(|x| x.label == "zzz").is_none());
        assert!(!copy.is_dirty());
    }

    #[test]
    fn writes_stay_private_until_merged() {
        let mut committed = committed_with(&[]);
        let mut copy = committed.snapshot();
        copy.insert(row("a"));
        assert_eq!(copy.len(), 1);
        assert!(committed.is_empty());

        copy.merge_into(&mut committed);
        assert_eq!(committed.len(), 1);
    }

    #[test]
    fn writers_of_different_rows_both_merge() {
        let a = row("a");
        let b = row("b");
        let mut committed = committed_with(&[a.clone(), b.clone()]);
        let mut first = committed.snapshot();
        let mut second = committed.snapshot();
        first.require_mut(a.id(), "row").unwrap().label = "a2";
        second.require_mut(b.id(), "row").unwrap().label = "b2";

        first.check_base(&committed, "rows").unwrap();
        first.merge_into(&mut committed);
        second.check_base(&committed, "rows").unwrap();
        second.merge_into(&mut committed);

        assert_eq!(committed.get(a.id()).unwrap().label, "a2");
        assert_eq!(committed.get(b.id()).unwrap().label, "b2");
    }

    #[test]
    fn stale_row_read_conflicts() {
        let a = row("a");
        let mut committed = committed_with(&[a.clone()]);
        let reader = committed.snapshot();
        let mut writer = committed.snapshot();
        assert!(reader.get(a.id()).is_some());
        writer.require_mut(a.id(), "row").unwrap().label = "changed";
        writer.merge_into(&mut committed);

        let err = reader.check_base(&committed, "rows").unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn new_row_matching_a_predicate_conflicts() {
        let mut committed = committed_with(&[row("a")]);
        let reader = committed.snapshot();
        assert_eq!(reader.filter(|x| x.label == "b").count(), 0);

        let mut writer = committed.snapshot();
        writer.insert(row("b"));
        writer.merge_into(&mut committed);

        let err = reader.check_base(&committed, "rows").unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn new_row_outside_a_predicate_does_not_conflict() {
        let mut committed = committed_with(&[row("a")]);
        let reader = committed.snapshot();
        assert_eq!(reader.filter(|x| x.label == "a").count(), 1);

        let mut writer = committed.snapshot();
        writer.insert(row("c"));
        writer.merge_into(&mut committed);

        reader.check_base(&committed, "rows").unwrap();
    }

    #[test]
    fn full_scan_conflicts_with_any_write() {
        let mut committed = committed_with(&[row("a")]);
        let reader = committed.snapshot();
        assert_eq!(reader.iter().count(), 1);

        let mut writer = committed.snapshot();
        writer.insert(row("z"));
        writer.merge_into(&mut committed);

        assert!(reader.check_base(&committed, "rows").is_err());
    }

    #[test]
    fn snapshot_is_isolated_from_later_commits() {
        let mut committed = committed_with(&[row("a")]);
        let reader = committed.snapshot();
        let mut writer = committed.snapshot();
        writer.insert(row("b"));
        writer.merge_into(&mut committed);

        assert_eq!(committed.len(), 2);
        assert_eq!(reader.len(), 1);
    }
}
