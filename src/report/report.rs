use std::collections::HashMap;
use std::io::{self, Write};

use colored::Colorize;
use tracing::{debug, warn};

use crate::hierarchy::{Hierarchy, TreeItem};
use crate::records::{AccountingRecord, SubvolumeId, SubvolumeRecord};

const INDENT: &str = "    ";

/// Subvolume listing keyed by subvolume id.
#[derive(Debug, Clone, Default)]
pub struct SubvolumeIndex {
    subvolumes: HashMap<SubvolumeId, SubvolumeRecord>,
}

impl SubvolumeIndex {
    pub fn get(&self, id: SubvolumeId) -> Option<&SubvolumeRecord> {
        self.subvolumes.get(&id)
    }

    /// Path of the subvolume a level 0 qgroup accounts for, or an empty string.
    pub fn path_of(&self, record: &AccountingRecord) -> &str {
        record
            .subvolume_id()
            .and_then(|id| self.get(id))
            .map(|subvolume| subvolume.path.as_str())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.subvolumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subvolumes.is_empty()
    }
}

impl FromIterator<SubvolumeRecord> for SubvolumeIndex {
    fn from_iter<T: IntoIterator<Item = SubvolumeRecord>>(iter: T) -> Self {
        let mut subvolumes = HashMap::new();
        for subvolume in iter {
            if let Some(previous) = subvolumes.insert(subvolume.id, subvolume) {
                warn!(
                    "Subvolume {} is listed more than once, keeping the last entry",
                    previous.id
                );
            }
        }
        SubvolumeIndex { subvolumes }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Also print qgroups that reference no data.
    pub show_empty: bool,
    pub color: bool,
}

/// Indented text rendering of a walked [`Hierarchy`].
pub struct Report<'a> {
    hierarchy: &'a Hierarchy,
    subvolumes: &'a SubvolumeIndex,
    options: ReportOptions,
}

impl<'a> Report<'a> {
    pub fn new(
        hierarchy: &'a Hierarchy,
        subvolumes: &'a SubvolumeIndex,
        options: ReportOptions,
    ) -> Self {
        Self {
            hierarchy,
            subvolumes,
            options,
        }
    }

    /// One line per visible qgroup, in walk order.
    ///
    /// Qgroups referencing zero bytes are hidden unless `show_empty` is set.
    /// Hiding a qgroup does not hide its children, which keep their depth.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.hierarchy
            .walk()
            .filter(|item| self.options.show_empty || item.record.referenced != 0)
            .map(|item| self.render(item))
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let mut written = 0usize;
        for line in self.lines() {
            writeln!(out, "{line}")?;
            written += 1;
        }
        out.flush()?;
        debug!("Wrote {} report lines", written);
        Ok(())
    }

    fn render(&self, item: TreeItem<'_>) -> String {
        let indent = INDENT.repeat(item.depth);
        let path = self.subvolumes.path_of(item.record);
        if self.options.color {
            format!(
                "{indent}{}: {} path={}",
                item.record.id.as_str().bold(),
                item.record.size_summary(),
                path.green()
            )
        } else {
            format!("{indent}{} path={path}", item.record)
        }
    }
}
