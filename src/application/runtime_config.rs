use crate::application::data::ColorChoice;
use crate::cli::Cli;

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub show_empty: bool,
    pub color: ColorChoice,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            show_empty: cli.show_empty,
            color: cli.color,
        }
    }
}
