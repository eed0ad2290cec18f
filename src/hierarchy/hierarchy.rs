use std::collections::{HashMap, HashSet};
use std::slice;

use hashlink::LinkedHashMap;
use tracing::{debug, warn};

use crate::hierarchy::TreeWalker;
use crate::records::{AccountingId, AccountingRecord};

/// Qgroup forest rebuilt from the flat `parent` column.
///
/// Records are stored once, keyed by id. The parent/child relation lives in a
/// separate adjacency table mapping a parent id to its children's ids, sorted
/// by [`AccountingRecord::sort_key`]. Records without a parent form `roots`.
///
/// A record whose parent id is unknown is still filed under that id, so it is
/// never reached from a root and never walked. See [`Hierarchy::orphans`].
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    records: LinkedHashMap<AccountingId, AccountingRecord>,
    roots: Vec<AccountingId>,
    children: HashMap<AccountingId, Vec<AccountingId>>,
}

impl Hierarchy {
    pub fn from_records(entries: impl IntoIterator<Item = AccountingRecord>) -> Self {
        let records = Self::collect_unique_records(entries);

        let mut groups: HashMap<&AccountingId, Vec<&AccountingRecord>> = HashMap::new();
        let mut root_records = Vec::new();
        for record in records.values() {
            match &record.parent {
                Some(parent) => groups.entry(parent).or_default().push(record),
                None => root_records.push(record),
            }
        }

        let roots = Self::sorted_ids(root_records);
        let children = groups
            .into_iter()
            .map(|(parent, siblings)| (parent.clone(), Self::sorted_ids(siblings)))
            .collect::<HashMap<_, _>>();

        debug!(
            "Built qgroup hierarchy: {} records, {} roots, {} parents",
            records.len(),
            roots.len(),
            children.len()
        );

        Hierarchy {
            records,
            roots,
            children,
        }
    }

    /// Last occurrence of an id wins, both for lookup and for sibling membership.
    /// The id keeps the position of its first occurrence.
    fn collect_unique_records(
        entries: impl IntoIterator<Item = AccountingRecord>,
    ) -> LinkedHashMap<AccountingId, AccountingRecord> {
        let mut records = LinkedHashMap::new();
        for record in entries {
            if let Some(previous) = records.replace(record.id.clone(), record) {
                warn!(
                    "Qgroup '{}' is listed more than once, keeping the last entry",
                    previous.id
                );
            }
        }
        records
    }

    fn sorted_ids(mut siblings: Vec<&AccountingRecord>) -> Vec<AccountingId> {
        siblings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        siblings.into_iter().map(|record| record.id.clone()).collect()
    }

    pub fn get(&self, id: &AccountingId) -> Option<&AccountingRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn roots(&self) -> Siblings<'_> {
        Siblings {
            hierarchy: self,
            ids: self.roots.iter(),
        }
    }

    pub fn children(&self, record: &AccountingRecord) -> Siblings<'_> {
        let ids = self
            .children
            .get(&record.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Siblings {
            hierarchy: self,
            ids: ids.iter(),
        }
    }

    /// Depth-first pre-order walk over every record reachable from a root.
    pub fn walk(&self) -> TreeWalker<'_> {
        TreeWalker::new(self)
    }

    /// Records that no walk reaches: their parent id is unknown, or they sit
    /// on a parent-pointer cycle. Returned in order of first appearance.
    pub fn orphans(&self) -> Vec<&AccountingRecord> {
        let reachable = self
            .walk()
            .map(|item| &item.record.id)
            .collect::<HashSet<_>>();
        self.records
            .values()
            .filter(|record| !reachable.contains(&record.id))
            .collect()
    }
}

/// Sorted records sharing one parent, or the roots.
#[derive(Debug, Clone)]
pub struct Siblings<'a> {
    hierarchy: &'a Hierarchy,
    ids: slice::Iter<'a, AccountingId>,
}

impl<'a> Iterator for Siblings<'a> {
    type Item = &'a AccountingRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let hierarchy = self.hierarchy;
        self.ids.by_ref().find_map(|id| hierarchy.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn record(id: &str, parent: Option<&str>) -> AccountingRecord {
        AccountingRecord {
            id: id.into(),
            referenced: 1,
            exclusive: 1,
            parent: parent.map(AccountingId::from),
        }
    }

    fn ids<'a>(records: impl Iterator<Item = &'a AccountingRecord>) -> Vec<&'a str> {
        records.map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn empty_input_has_no_roots() {
        let hierarchy = Hierarchy::from_records(Vec::<AccountingRecord>::new());
        assert!(hierarchy.is_empty());
        assert_eq!(hierarchy.roots().count(), 0);
    }

    #[test]
    fn siblings_sharing_a_level_are_ordered_by_number() {
        let hierarchy = Hierarchy::from_records(vec![
            record("0/300", Some("1/1")),
            record("0/5", Some("1/1")),
            record("0/40", Some("1/1")),
            record("1/1", None),
        ]);

        let parent = hierarchy.get(&"1/1".into()).expect("Missing parent");
        assert_eq!(ids(hierarchy.children(parent)), vec!["0/5", "0/40", "0/300"]);
    }

    #[rstest]
    #[case(vec!["0/1", "zeta", "alpha"], vec!["alpha", "zeta", "0/1"])]
    #[case(vec!["2/0", "1/7", "1/3", "0/9"], vec!["0/9", "1/3", "1/7", "2/0"])]
    #[case(vec!["1/x", "0/0", "1/"], vec!["1/", "1/x", "0/0"])]
    fn roots_are_sorted_by_sort_key(#[case] input: Vec<&str>, #[case] expected: Vec<&str>) {
        let hierarchy =
            Hierarchy::from_records(input.into_iter().map(|id| record(id, None)).collect::<Vec<_>>());
        assert_eq!(ids(hierarchy.roots()), expected);
    }

    #[test]
    fn leaf_has_no_children() {
        let hierarchy = Hierarchy::from_records(vec![record("0/5", None)]);
        let leaf = hierarchy.get(&"0/5".into()).expect("Missing leaf");
        assert_eq!(hierarchy.children(leaf).count(), 0);
    }

    #[test]
    fn record_with_unknown_parent_is_an_orphan() {
        let hierarchy = Hierarchy::from_records(vec![
            record("0/5", None),
            record("0/257", None),
            record("0/258", Some("255/258")),
        ]);

        assert_eq!(ids(hierarchy.roots()), vec!["0/5", "0/257"]);
        assert_eq!(ids(hierarchy.orphans().into_iter()), vec!["0/258"]);
        assert_eq!(hierarchy.len(), 3);
    }

    #[test]
    fn parent_cycle_is_unreachable() {
        let hierarchy = Hierarchy::from_records(vec![
            record("0/5", None),
            record("1/1", Some("1/2")),
            record("1/2", Some("1/1")),
            record("1/3", Some("1/3")),
        ]);

        assert_eq!(ids(hierarchy.walk().map(|item| item.record)), vec!["0/5"]);
        assert_eq!(
            ids(hierarchy.orphans().into_iter()),
            vec!["1/1", "1/2", "1/3"]
        );
    }

    #[test]
    fn duplicate_id_keeps_last_entry_only() {
        let mut first = record("0/5", None);
        first.referenced = 10;
        let mut second = record("0/5", Some("1/1"));
        second.referenced = 20;

        let hierarchy =
            Hierarchy::from_records(vec![first, second, record("1/1", None)]);

        assert_eq!(hierarchy.len(), 2);
        assert_eq!(ids(hierarchy.roots()), vec!["1/1"]);
        let kept = hierarchy.get(&"0/5".into()).expect("Missing record");
        assert_eq!(kept.referenced, 20);
        let parent = hierarchy.get(&"1/1".into()).expect("Missing parent");
        assert_eq!(ids(hierarchy.children(parent)), vec!["0/5"]);
    }

    #[test]
    fn duplicate_orphan_keeps_its_first_position() {
        let hierarchy = Hierarchy::from_records(vec![
            record("0/7", Some("9/9")),
            record("0/8", Some("9/9")),
            record("0/7", Some("9/9")),
        ]);

        assert_eq!(ids(hierarchy.orphans().into_iter()), vec!["0/7", "0/8"]);
    }

    #[test]
    fn siblings_resume_where_they_stopped() {
        let hierarchy = Hierarchy::from_records(vec![
            record("1/1", None),
            record("0/5", Some("1/1")),
            record("0/6", Some("1/1")),
        ]);
        let parent = hierarchy.get(&"1/1".into()).expect("Missing parent");
        let mut children = hierarchy.children(parent);

        assert_eq!(children.next().map(|r| r.id.as_str()), Some("0/5"));
        assert_eq!(ids(children), vec!["0/6"]);
    }

    #[test]
    fn duplicate_id_referencing_itself_terminates() {
        let hierarchy = Hierarchy::from_records(vec![
            record("1/1", None),
            record("1/1", Some("1/1")),
        ]);

        assert_eq!(hierarchy.walk().count(), 0);
        assert_eq!(ids(hierarchy.orphans().into_iter()), vec!["1/1"]);
    }
}
