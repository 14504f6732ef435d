//! Core CLI loop, dispatch, and shell context helpers.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Instant,
};

use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use tracing::{info, warn};

use crate::{
    config::{Config, ConfigManager},
    core::{OpenReport, SessionManager},
    errors::BudgetError,
    storage::{JsonStorage, SessionStore},
    utils::{PathResolver, SystemClock},
};

use super::advisory::{AdvisoryBoard, Severity};
use super::commands;
use super::io as cli_io;
use super::output;
use super::registry::CommandEntry;
use super::render;
use super::ui::UiStyle;
pub use crate::cli::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, PathResolver::base_dir())
    }

    /// Builds a shell whose config, session and receipts live under `base_dir`.
    pub fn with_base_dir(mode: CliMode, base_dir: PathBuf) -> Result<Self, CliError> {
        let registry = commands::registry();
        let config_manager = ConfigManager::with_base_dir(base_dir.clone())?;

        let mut notices = Vec::new();
        let config = match config_manager.load() {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "config unreadable; using defaults");
                notices.push(format!("{err}. Using default settings."));
                Config::default()
            }
        };

        let (session, report) = open_session(&base_dir, &mut notices)?;
        let advisories = AdvisoryBoard::new(config.advisory_ttl());

        let mut app = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            session,
            config_manager,
            config,
            base_dir,
            advisories,
            clock: Box::new(SystemClock),
            running: true,
        };

        for notice in notices.into_iter().chain(report.warnings) {
            app.show_advisory(notice, Severity::Warning);
        }
        if report.restored {
            let count = app.ledger().item_count();
            output::info(format!(
                "Restored previous session ({} item{}).",
                count,
                if count == 1 { "" } else { "s" }
            ));
        }
        Ok(app)
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        let ledger = self.ledger();
        if self.session.has_budget() {
            format!(
                "basket [{:.2}/{:.2} {}]> ",
                ledger.total_spent(),
                ledger.budget(),
                self.config.currency
            )
        } else {
            "basket> ".to_string()
        }
    }

    pub(crate) fn confirm(&self, prompt: &str, default: bool) -> Result<bool, CommandError> {
        cli_io::confirm_action(self.mode, &self.theme, prompt, default)
    }

    /// Prints the item table and summary, then warns when the balance is negative.
    pub(crate) fn render_ledger(&mut self) {
        let style = UiStyle::detect();
        for line in render::ledger_lines(self.ledger(), &self.config, &style) {
            output::plain(line);
        }
        if self.ledger().is_over_budget() {
            self.show_advisory("You have exceeded your budget!", Severity::Warning);
        }
    }

    pub(crate) fn active_advisories(&mut self) -> Vec<(Severity, String)> {
        self.advisories
            .active(Instant::now())
            .iter()
            .map(|advisory| (advisory.severity, advisory.message.clone()))
            .collect()
    }

    /// Persists the current config and applies the parts that affect a running shell.
    pub(crate) fn persist_config(&mut self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        self.advisories.set_ttl(self.config.advisory_ttl());
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err.to_string());
                return Ok(LoopControl::Continue);
            }
        };

        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        if let Some(best) = closest_command(&self.command_names(), input) {
            output::info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(self.confirm("Exit shell?", true)?)
    }

    pub(crate) fn report_error(&mut self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(BudgetError::InvalidInput(message)) => {
                self.show_advisory(message, Severity::Error);
                Ok(())
            }
            CommandError::Core(err @ BudgetError::ExportFailure(_)) => {
                self.show_advisory(err.to_string(), Severity::Error);
                output::hint("Your list was kept. Fix the export location and try again.");
                Ok(())
            }
            other => {
                output::error(other.to_string());
                Ok(())
            }
        }
    }
}

/// Closest registered name within an edit distance of three.
pub(crate) fn closest_command(names: &[&'static str], input: &str) -> Option<&'static str> {
    let needle = input.to_lowercase();
    names
        .iter()
        .map(|name| (levenshtein(name, &needle), *name))
        .min_by_key(|(distance, _)| *distance)
        .filter(|(distance, _)| *distance <= 3)
        .map(|(_, name)| name)
}

fn open_session(
    base_dir: &Path,
    notices: &mut Vec<String>,
) -> Result<(SessionManager, OpenReport), CliError> {
    let path = PathResolver::session_file_in(base_dir);
    let storage = match JsonStorage::open(&path) {
        Ok(storage) => storage,
        Err(err) => {
            let aside = path.with_extension("json.corrupt");
            warn!(error = %err, aside = %aside.display(), "moving unreadable session aside");
            fs::rename(&path, &aside)?;
            notices.push(format!(
                "Saved session could not be read and was moved to `{}`. Starting fresh.",
                aside.display()
            ));
            JsonStorage::open(&path)?
        }
    };

    match SessionManager::open(SessionStore::new(Box::new(storage.clone()))) {
        Ok(opened) => Ok(opened),
        Err(err) => {
            warn!(error = %err, "saved session values unreadable; clearing");
            notices.push(format!("{err}. Starting with an empty list."));
            let mut session = SessionManager::new(SessionStore::new(Box::new(storage)));
            session.reset()?;
            info!("session cleared after load failure");
            Ok((session, OpenReport::default()))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    pub(crate) fn usage(entry_usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {}", entry_usage))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Command(String),
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Input(message) | CliError::Command(message) => {
                CommandError::InvalidArguments(message)
            }
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(base_dir: &Path, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_base_dir(CliMode::Script, base_dir.to_path_buf())?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}
