use std::fmt;

use derive_more::{Display, From};
use snafu::{ResultExt, Snafu, ensure};

use crate::records::SubvolumeId;

/// Token used in the `parent` column for qgroups without a parent.
pub const NO_PARENT_TOKEN: &str = "---";

const BYTES_PER_MEGABYTE: f64 = 1_000_000.0;

/// Identifier of a qgroup, normally of the form `<level>/<num>`.
///
/// Any other string is accepted as an opaque identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct AccountingId(String);

impl AccountingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decomposes the identifier into its numeric level and number.
    ///
    /// Returns `None` unless both halves around the first `/` are non-empty
    /// runs of ASCII digits that fit into a `u64`.
    pub fn composite(&self) -> Option<CompositeId> {
        let (level, num) = self.0.split_once('/')?;
        Some(CompositeId {
            level: parse_digits(level)?,
            num: parse_digits(num)?,
        })
    }
}

impl From<&str> for AccountingId {
    fn from(value: &str) -> Self {
        AccountingId(value.to_string())
    }
}

fn parse_digits(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// The numeric halves of a `<level>/<num>` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeId {
    pub level: u64,
    pub num: u64,
}

/// Ordering key for siblings.
///
/// Opaque identifiers carry no composite part and sort before every composite
/// one; ties are broken by the raw identifier string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey<'a> {
    composite: Option<CompositeId>,
    id: &'a str,
}

/// One row of the `btrfs qgroup show --raw -p` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountingRecord {
    pub id: AccountingId,
    pub referenced: u64,
    pub exclusive: u64,
    pub parent: Option<AccountingId>,
}

impl AccountingRecord {
    pub fn sort_key(&self) -> SortKey<'_> {
        SortKey {
            composite: self.id.composite(),
            id: self.id.as_str(),
        }
    }

    /// Referenced and exclusive sizes in decimal megabytes, e.g.
    /// `rfer=16320.0MB excl=134.2MB`.
    pub fn size_summary(&self) -> String {
        format!(
            "rfer={:.1}MB excl={:.1}MB",
            self.referenced as f64 / BYTES_PER_MEGABYTE,
            self.exclusive as f64 / BYTES_PER_MEGABYTE
        )
    }

    /// The subvolume this qgroup accounts for, if it is a level 0 qgroup.
    pub fn subvolume_id(&self) -> Option<SubvolumeId> {
        self.id
            .composite()
            .filter(|composite| composite.level == 0)
            .map(|composite| SubvolumeId::from(composite.num))
    }
}

impl fmt::Display for AccountingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.size_summary())
    }
}

impl TryFrom<&str> for AccountingRecord {
    type Error = AccountingLineError;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let fields = line.split_whitespace().collect::<Vec<_>>();
        ensure!(
            fields.len() == 4,
            FieldCountSnafu {
                found: fields.len()
            }
        );

        let referenced = fields[1]
            .parse::<u64>()
            .context(InvalidSizeSnafu { column: "rfer" })?;
        let exclusive = fields[2]
            .parse::<u64>()
            .context(InvalidSizeSnafu { column: "excl" })?;
        let parent = match fields[3] {
            NO_PARENT_TOKEN => None,
            parent => Some(AccountingId::from(parent)),
        };

        Ok(AccountingRecord {
            id: AccountingId::from(fields[0]),
            referenced,
            exclusive,
            parent,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum AccountingLineError {
    #[snafu(display("Expected 4 columns, found {}", found))]
    FieldCount { found: usize },
    #[snafu(display("Column '{}' is not a byte count", column))]
    InvalidSize {
        column: &'static str,
        source: std::num::ParseIntError,
    },
}
