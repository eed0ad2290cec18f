use std::io::{self, BufWriter, Read, Write};

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::hierarchy::Hierarchy;
use crate::records::{FormatError, parse_lines, partition_records};
use crate::report::{Report, ReportOptions, SubvolumeIndex};

pub struct Application;

impl Application {
    /// Reads the qgroup and subvolume listings from stdin and prints the
    /// hierarchy to stdout.
    pub fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let stdin = io::stdin().lock();
        let stdout = BufWriter::new(io::stdout().lock());
        Self::run_with(app_config, stdin, stdout)
    }

    pub fn run_with(
        app_config: impl Into<RuntimeConfig>,
        mut input: impl Read,
        mut output: impl Write,
    ) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        debug!("Runtime config: {:?}", app_config);

        let mut contents = String::new();
        input.read_to_string(&mut contents).context(ReadInputSnafu)?;
        debug!("Read {} bytes of input", contents.len());

        let records = parse_lines(contents.lines())
            .inspect_err(|error| {
                if let Some(line) = error.line() {
                    debug!("Rejected input line: {line:?}");
                }
            })
            .context(ParseSnafu)?;
        let (subvolumes, qgroups) = partition_records(records);
        info!(
            "Parsed {} qgroups and {} subvolumes",
            qgroups.len(),
            subvolumes.len()
        );

        let hierarchy = Hierarchy::from_records(qgroups);
        debug!(
            "{} distinct qgroups, {} roots",
            hierarchy.len(),
            hierarchy.roots().count()
        );
        for orphan in hierarchy.orphans() {
            warn!(
                "Qgroup '{}' is not reachable from any root (parent: {})",
                orphan.id,
                orphan
                    .parent
                    .as_ref()
                    .map(|parent| parent.as_str())
                    .unwrap_or_default()
            );
        }

        let subvolumes = subvolumes.into_iter().collect::<SubvolumeIndex>();
        debug!("{} distinct subvolumes", subvolumes.len());
        if subvolumes.is_empty() && !hierarchy.is_empty() {
            info!("No subvolume listing in input, paths will be empty");
        }
        let options = ReportOptions {
            show_empty: app_config.show_empty,
            color: app_config.color.should_colorize(),
        };
        if options.color {
            colored::control::set_override(true);
        }

        Report::new(&hierarchy, &subvolumes, options)
            .write_to(&mut output)
            .context(WriteReportSnafu)?;

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Failed to read input"))]
    ReadInputError { source: io::Error },
    #[snafu(display("Input is not the output of btrfs qgroup show / subvolume list"))]
    ParseError { source: FormatError },
    #[snafu(display("Failed to write the report"))]
    WriteReportError { source: io::Error },
}
