use std::collections::HashMap;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

/// Command table keyed by name; iteration keeps registration order.
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandEntry>,
    aliases: HashMap<&'static str, &'static str>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(entries: Vec<CommandEntry>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for entry in entries {
            order.push(entry.name);
            commands.insert(entry.name, entry);
        }
        Self {
            commands,
            aliases: HashMap::new(),
            order,
        }
    }

    /// Makes `alias` resolve to the already registered `target`.
    pub fn alias(mut self, alias: &'static str, target: &'static str) -> Self {
        if self.commands.contains_key(target) {
            self.aliases.insert(alias, target);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        let name = self.aliases.get(name).copied().unwrap_or(name);
        self.commands.get(name)
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.get(name).map(|entry| entry.handler)
    }

    pub fn list(&self) -> impl Iterator<Item = &CommandEntry> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    /// Registered names followed by aliases, for completion and suggestions.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = self.order.clone();
        let mut aliases: Vec<_> = self.aliases.keys().copied().collect();
        aliases.sort_unstable();
        names.extend(aliases);
        names
    }
}
