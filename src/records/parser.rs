use derive_more::From;
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::debug;

use crate::records::{
    AccountingLineError, AccountingRecord, SUBVOLUME_LINE_MARKER, SubvolumeLineError,
    SubvolumeRecord,
};

/// Column names of the `btrfs qgroup show --raw -p` header, in order.
pub const QGROUP_HEADER: [&str; 4] = ["qgroupid", "rfer", "excl", "parent"];

/// A parsed input line after the header and separator.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Record {
    Subvolume(SubvolumeRecord),
    Accounting(AccountingRecord),
}

/// Parses the concatenated output of `btrfs qgroup show --raw -p` and
/// `btrfs subvolume list`.
///
/// The first line must be the qgroup table header and the second its dashed
/// separator. Every following line is either a subvolume line (first column
/// `ID`) or a qgroup line. Records are returned in input order; parent
/// references are not checked here.
pub fn parse_lines<I, S>(lines: I) -> Result<Vec<Record>, FormatError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = lines.into_iter().enumerate().map(|(index, line)| (index + 1, line));

    let (line_num, header) = lines.next().context(MissingHeaderSnafu)?;
    check_header(line_num, header.as_ref().trim())?;

    let (line_num, separator) = lines.next().context(MissingSeparatorSnafu)?;
    check_separator(line_num, separator.as_ref().trim())?;

    let records = lines
        .map(|(line_num, line)| parse_record(line_num, line.as_ref().trim()))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Parsed {} records", records.len());
    Ok(records)
}

/// Splits parsed records into subvolume and qgroup records, keeping their order.
pub fn partition_records(
    records: impl IntoIterator<Item = Record>,
) -> (Vec<SubvolumeRecord>, Vec<AccountingRecord>) {
    let mut subvolumes = Vec::new();
    let mut accounting = Vec::new();
    for record in records {
        match record {
            Record::Subvolume(subvolume) => subvolumes.push(subvolume),
            Record::Accounting(qgroup) => accounting.push(qgroup),
        }
    }
    (subvolumes, accounting)
}

fn check_header(line_num: usize, line: &str) -> Result<(), FormatError> {
    ensure!(
        line.split_whitespace().eq(QGROUP_HEADER),
        InvalidHeaderSnafu { line_num, line }
    );
    Ok(())
}

fn check_separator(line_num: usize, line: &str) -> Result<(), FormatError> {
    ensure!(
        !line.is_empty() && line.chars().all(|c| c == '-' || c == ' '),
        InvalidSeparatorSnafu { line_num, line }
    );
    Ok(())
}

fn parse_record(line_num: usize, line: &str) -> Result<Record, FormatError> {
    if line.split_whitespace().next() == Some(SUBVOLUME_LINE_MARKER) {
        SubvolumeRecord::try_from(line)
            .map(Record::Subvolume)
            .context(InvalidSubvolumeLineSnafu { line_num, line })
    } else {
        AccountingRecord::try_from(line)
            .map(Record::Accounting)
            .context(InvalidQgroupLineSnafu { line_num, line })
    }
}

#[derive(Debug, Snafu)]
pub enum FormatError {
    #[snafu(display("Input is empty, expected the qgroup data header"))]
    MissingHeader,
    #[snafu(display("Input ends after the header, expected a dash line"))]
    MissingSeparator,
    #[snafu(display("Invalid qgroup data header on line {}: {}", line_num, line))]
    InvalidHeader { line_num: usize, line: String },
    #[snafu(display("Invalid dash line on line {}: {}", line_num, line))]
    InvalidSeparator { line_num: usize, line: String },
    #[snafu(display("Not a valid subvol entry on line {}: {}", line_num, line))]
    InvalidSubvolumeLine {
        line_num: usize,
        line: String,
        source: SubvolumeLineError,
    },
    #[snafu(display("Not a valid qgroup line on line {}: {}", line_num, line))]
    InvalidQgroupLine {
        line_num: usize,
        line: String,
        source: AccountingLineError,
    },
}

impl FormatError {
    /// The raw text of the offending line, if the error concerns one.
    pub fn line(&self) -> Option<&str> {
        match self {
            FormatError::MissingHeader | FormatError::MissingSeparator => None,
            FormatError::InvalidHeader { line, .. }
            | FormatError::InvalidSeparator { line, .. }
            | FormatError::InvalidSubvolumeLine { line, .. }
            | FormatError::InvalidQgroupLine { line, .. } => Some(line.as_str()),
        }
    }
}
