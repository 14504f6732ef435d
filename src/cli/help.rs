use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    output::section("Available commands");
    for entry in registry.list() {
        output::plain(format!("  {:<10} {}", entry.name, entry.description));
    }
    output::plain("Use `help <command>` for details. Tab completes command names.");
}

pub fn print_command(entry: &CommandEntry) {
    output::section(format!("Help: {}", entry.name));
    output::plain(format!("  Description: {}", entry.description));
    output::plain(format!("  Usage: {}", entry.usage));
}
