//! Typed records for the two tables fed into the tool: the qgroup accounting
//! table and the subvolume listing.

mod accounting_record;
mod parser;
mod subvolume_record;

pub use accounting_record::{AccountingId, AccountingLineError, AccountingRecord};
pub use parser::{FormatError, parse_lines, partition_records};
pub use subvolume_record::{SUBVOLUME_LINE_MARKER, SubvolumeId, SubvolumeLineError, SubvolumeRecord};
