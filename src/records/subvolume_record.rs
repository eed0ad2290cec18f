use std::fmt;

use derive_more::{Display, From};
use snafu::{OptionExt, ResultExt, Snafu, ensure};

/// Marker starting every line of `btrfs subvolume list`.
pub const SUBVOLUME_LINE_MARKER: &str = "ID";

const ID_COLUMN: usize = 1;
const PATH_COLUMN: usize = 8;

/// Numeric id of a btrfs subvolume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct SubvolumeId(u64);

/// One row of the `btrfs subvolume list` output:
///
/// ```text
/// ID 257 gen 1128091 top level 5 path @
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubvolumeRecord {
    pub id: SubvolumeId,
    pub path: String,
}

impl fmt::Display for SubvolumeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.id, self.path)
    }
}

impl TryFrom<&str> for SubvolumeRecord {
    type Error = SubvolumeLineError;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let fields = line.split_whitespace().collect::<Vec<_>>();
        ensure!(
            fields.first() == Some(&SUBVOLUME_LINE_MARKER),
            MissingMarkerSnafu
        );

        let id = fields
            .get(ID_COLUMN)
            .context(MissingColumnSnafu { column: "id" })?
            .parse::<u64>()
            .context(InvalidIdSnafu)?;
        let path = fields
            .get(PATH_COLUMN)
            .context(MissingColumnSnafu { column: "path" })?;

        Ok(SubvolumeRecord {
            id: id.into(),
            path: path.to_string(),
        })
    }
}

#[derive(Debug, Snafu)]
pub enum SubvolumeLineError {
    #[snafu(display("Line does not start with '{}'", SUBVOLUME_LINE_MARKER))]
    MissingMarker,
    #[snafu(display("Missing the '{}' column", column))]
    MissingColumn { column: &'static str },
    #[snafu(display("Subvolume id is not an integer"))]
    InvalidId { source: std::num::ParseIntError },
}
