use std::path::PathBuf;

use dialoguer::theme::ColorfulTheme;

use crate::{
    config::{Config, ConfigManager},
    core::SessionManager,
    ledger::Ledger,
    receipt::ReceiptExporter,
    utils::Clock,
};

use super::advisory::{AdvisoryBoard, Severity};
use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub session: SessionManager,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub base_dir: PathBuf,
    pub advisories: AdvisoryBoard,
    pub clock: Box<dyn Clock>,
    pub running: bool,
}

impl ShellContext {
    pub fn ledger(&self) -> &Ledger {
        self.session.ledger()
    }

    /// Exporter honouring the configured receipt directory and style.
    pub fn exporter(&self) -> ReceiptExporter {
        ReceiptExporter::new(
            self.config.export_dir_in(&self.base_dir),
            self.config.receipt_style(),
        )
    }

    pub fn show_advisory(&mut self, message: impl Into<String>, severity: Severity) {
        self.advisories.show(message, severity);
    }
}
