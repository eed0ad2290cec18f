use crate::hierarchy::{Hierarchy, Siblings};
use crate::records::AccountingRecord;

/// A record visited by [`TreeWalker`] together with its distance from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeItem<'a> {
    pub record: &'a AccountingRecord,
    pub depth: usize,
}

/// Lazy depth-first pre-order traversal of a [`Hierarchy`].
///
/// Roots are visited in sorted order and each record's children are exhausted
/// before moving to its next sibling. An explicit stack of sibling cursors
/// replaces recursion, so deep hierarchies cannot overflow the call stack.
pub struct TreeWalker<'a> {
    hierarchy: &'a Hierarchy,
    stack: Vec<(Siblings<'a>, usize)>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(hierarchy: &'a Hierarchy) -> Self {
        Self {
            hierarchy,
            stack: vec![(hierarchy.roots(), 0)],
        }
    }
}

impl<'a> Iterator for TreeWalker<'a> {
    type Item = TreeItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let hierarchy = self.hierarchy;
        loop {
            let (siblings, depth) = self.stack.last_mut()?;
            let depth = *depth;
            let Some(record) = siblings.next() else {
                self.stack.pop();
                continue;
            };

            self.stack.push((hierarchy.children(record), depth + 1));
            return Some(TreeItem { record, depth });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::AccountingId;

    fn record(id: &str, parent: Option<&str>) -> AccountingRecord {
        AccountingRecord {
            id: id.into(),
            referenced: 1,
            exclusive: 1,
            parent: parent.map(AccountingId::from),
        }
    }

    fn walk(records: Vec<AccountingRecord>) -> Vec<(String, usize)> {
        let hierarchy = Hierarchy::from_records(records);
        hierarchy
            .walk()
            .map(|item| (item.record.id.to_string(), item.depth))
            .collect()
    }

    fn expected(items: &[(&str, usize)]) -> Vec<(String, usize)> {
        items
            .iter()
            .map(|(id, depth)| (id.to_string(), *depth))
            .collect()
    }

    #[test]
    fn empty_hierarchy_yields_nothing() {
        assert!(walk(Vec::new()).is_empty());
    }

    #[test]
    fn visits_children_before_next_sibling() {
        let items = walk(vec![
            record("0/258", Some("1/100")),
            record("2/1", None),
            record("1/100", Some("2/1")),
            record("0/257", Some("1/100")),
            record("1/101", Some("2/1")),
            record("0/300", Some("1/101")),
            record("0/5", None),
        ]);

        assert_eq!(
            items,
            expected(&[
                ("0/5", 0),
                ("2/1", 0),
                ("1/100", 1),
                ("0/257", 2),
                ("0/258", 2),
                ("1/101", 1),
                ("0/300", 2),
            ])
        );
    }

    #[test]
    fn depth_equals_number_of_parent_hops() {
        let chain = (0..50)
            .map(|n| {
                let parent = (n > 0).then(|| format!("{}/0", n - 1));
                record(&format!("{n}/0"), parent.as_deref())
            })
            .collect::<Vec<_>>();

        let items = walk(chain);

        assert_eq!(items.len(), 50);
        for (n, (id, depth)) in items.iter().enumerate() {
            assert_eq!(id, &format!("{n}/0"));
            assert_eq!(*depth, n);
        }
    }

    #[test]
    fn never_visits_an_id_twice() {
        let items = walk(vec![
            record("1/1", None),
            record("0/5", Some("1/1")),
            record("0/5", Some("1/1")),
            record("0/6", Some("0/5")),
        ]);

        let mut seen = items.iter().map(|(id, _)| id.clone()).collect::<Vec<_>>();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), items.len());
    }

    #[test]
    fn orphaned_subtree_is_skipped() {
        let items = walk(vec![
            record("0/5", None),
            record("1/9", Some("9/9")),
            record("0/7", Some("1/9")),
        ]);

        assert_eq!(items, expected(&[("0/5", 0)]));
    }

    #[test]
    fn walker_is_exhausted_after_one_pass() {
        let hierarchy = Hierarchy::from_records(vec![record("0/5", None)]);
        let mut walker = hierarchy.walk();

        assert!(walker.next().is_some());
        assert!(walker.next().is_none());
        assert!(walker.next().is_none());
    }
}
