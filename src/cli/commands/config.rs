use crate::cli::advisory::Severity;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::config::Config;

const USAGE: &str = "config [show|set <key> <value>|reset]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {
            show(context);
            Ok(())
        }
        ["set", key, value @ ..] if !value.is_empty() => {
            context.config.set_value(key, &value.join(" "))?;
            context.persist_config()?;
            context.show_advisory(format!("`{}` updated.", key), Severity::Success);
            Ok(())
        }
        ["reset"] => {
            if !context.confirm("Restore default preferences?", false)? {
                output::info("Nothing changed.");
                return Ok(());
            }
            context.config = Config::default();
            context.persist_config()?;
            context.show_advisory("Preferences restored to defaults.", Severity::Success);
            Ok(())
        }
        _ => Err(CommandError::usage(USAGE)),
    }
}

fn show(context: &ShellContext) {
    output::section("Configuration");
    for (key, value) in context.config.describe() {
        output::plain(format!("  {:<22} {}", key, value));
    }
    output::plain(format!(
        "  {:<22} {}",
        "file",
        context.config_manager.path().display()
    ));
}
