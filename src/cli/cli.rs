use clap::Parser;

use crate::application::data::{ColorChoice, LogLevel};

/// Print the btrfs qgroup hierarchy with subvolume paths.
///
/// Reads the output of `btrfs qgroup show --raw -p <mount>` followed by
/// `btrfs subvolume list <mount>` from standard input.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Also print qgroups that reference no data
    #[clap(long)]
    pub show_empty: bool,

    /// When to highlight qgroup ids and subvolume paths
    #[clap(long, default_value = "auto", value_enum)]
    pub color: ColorChoice,
}
