pub mod config;
pub mod items;
pub mod receipt;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub(crate) fn registry() -> CommandRegistry {
    let mut commands = Vec::new();
    commands.extend(items::definitions());
    commands.extend(receipt::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    CommandRegistry::new(commands).alias("quit", "exit")
}
