//! Command-line layer: an option registry backed by a [clap] `Command`.
//!
//! The synthesizer registers one `--dotted.name <VALUE>` option per config
//! leaf. Parsing yields [`ParsedFlags`]: the resolved value of every
//! registered option and the set of options the caller actually typed.
//! Options left at their default are never applied to the config.
//!
//! Go-style single-dash long options (`-server.port 80`, `-name=x`) are
//! accepted for registered names by rewriting them to `--name` before clap
//! sees them. Tokens in value position and everything after `--` are passed
//! through untouched.
//!
//! A registry can be seeded with an existing `Command`, so an application's
//! own arguments and the config-derived ones parse in a single pass. The
//! caller gets the full [`ArgMatches`] back to read its own arguments.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::error::ConfigError;
use crate::types::{FlagValue, Kind};

/// Registered options, keyed by dotted name, on top of a clap `Command`.
#[derive(Debug, Clone)]
pub struct Registry {
    command: Command,
    options: BTreeMap<String, Kind>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A fresh, private registry.
    pub fn new() -> Self {
        Self::from_command(Command::new("config"))
    }

    /// Seed the registry with a caller-built command. Its arguments count as
    /// taken names for collision detection.
    pub fn from_command(command: Command) -> Self {
        Self {
            command,
            options: BTreeMap::new(),
        }
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn kind(&self, name: &str) -> Option<Kind> {
        self.options.get(name).copied()
    }

    /// Registered option names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    /// Register `--name <VALUE>` with the value parser for `kind`.
    pub fn register(&mut self, name: &str, kind: Kind, help: &str) -> Result<(), ConfigError> {
        if self.is_taken(name) {
            return Err(ConfigError::NameCollision(name.to_string()));
        }

        let mut arg = Arg::new(name.to_string())
            .long(name.to_string())
            .value_name(kind.value_name())
            .action(ArgAction::Set)
            .allow_hyphen_values(true);
        arg = match kind {
            Kind::Text => arg.value_parser(clap::value_parser!(String)),
            Kind::Float => arg.value_parser(clap::value_parser!(f64)),
            Kind::Integer => arg.value_parser(clap::value_parser!(i64)),
        };
        if !help.is_empty() {
            arg = arg.help(help.to_string());
        }

        self.command = std::mem::take(&mut self.command).arg(arg);
        self.options.insert(name.to_string(), kind);
        tracing::trace!(option = name, %kind, "registered option");
        Ok(())
    }

    fn is_taken(&self, name: &str) -> bool {
        if self.options.contains_key(name) {
            return true;
        }
        if self
            .command
            .get_arguments()
            .any(|a| a.get_id().as_str() == name || a.get_long() == Some(name))
        {
            return true;
        }
        match name {
            "help" => !self.command.is_disable_help_flag_set(),
            "version" => {
                self.command.get_version().is_some() && !self.command.is_disable_version_flag_set()
            }
            _ => false,
        }
    }

    /// Parse `args` (without the program name) against the registry.
    pub fn parse<I, T>(self, args: I) -> Result<ParsedFlags, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let tokens = self.normalize(args.into_iter().map(Into::into));
        let matches = self
            .command
            .no_binary_name(true)
            .args_override_self(true)
            .try_get_matches_from(tokens)?;

        let mut values = BTreeMap::new();
        let mut supplied = BTreeSet::new();
        for (name, kind) in &self.options {
            if matches.value_source(name) == Some(ValueSource::CommandLine) {
                supplied.insert(name.clone());
            }
            let value = match kind {
                Kind::Text => matches.get_one::<String>(name).cloned().map(FlagValue::Text),
                Kind::Float => matches.get_one::<f64>(name).copied().map(FlagValue::Float),
                Kind::Integer => matches.get_one::<i64>(name).copied().map(FlagValue::Integer),
            };
            values.insert(name.clone(), value.unwrap_or_else(|| kind.zero()));
        }

        Ok(ParsedFlags {
            values,
            supplied,
            matches,
        })
    }

    /// Rewrite `-name` / `-name=value` to `--name` for registered long names.
    fn normalize(&self, mut args: impl Iterator<Item = OsString>) -> Vec<OsString> {
        let mut out = Vec::new();
        let mut expects_value = false;

        while let Some(token) = args.next() {
            if expects_value {
                expects_value = false;
                out.push(token);
                continue;
            }
            let Some(text) = token.to_str() else {
                out.push(token);
                continue;
            };
            if text == "--" {
                out.push(token);
                out.extend(args.by_ref());
                break;
            }
            let Some(body) = text.strip_prefix('-') else {
                out.push(token);
                continue;
            };
            let long = body.strip_prefix('-').unwrap_or(body);
            let (name, inline_value) = match long.split_once('=') {
                Some((name, _)) => (name, true),
                None => (long, false),
            };
            match self.find_long(name) {
                Some(arg) => {
                    expects_value = !inline_value && arg.get_action().takes_values();
                    out.push(OsString::from(format!("--{long}")));
                }
                None => out.push(token),
            }
        }
        out
    }

    fn find_long(&self, name: &str) -> Option<&Arg> {
        if name.is_empty() {
            return None;
        }
        self.command
            .get_arguments()
            .find(|a| a.get_long() == Some(name))
    }
}

/// Result of parsing arguments against a [`Registry`].
#[derive(Debug, Clone)]
pub struct ParsedFlags {
    values: BTreeMap<String, FlagValue>,
    supplied: BTreeSet<String>,
    matches: ArgMatches,
}

impl ParsedFlags {
    /// Resolved value of a registered option: what was typed, or the kind's
    /// zero value. `None` for names that were never registered.
    pub fn value(&self, name: &str) -> Option<&FlagValue> {
        self.values.get(name)
    }

    /// Whether `name` appeared on the command line, whatever its value.
    pub fn is_supplied(&self, name: &str) -> bool {
        self.supplied.contains(name)
    }

    /// Supplied option names, sorted.
    pub fn supplied(&self) -> impl Iterator<Item = &str> {
        self.supplied.iter().map(String::as_str)
    }

    /// The supplied value of a text option, if it was supplied and non-empty.
    pub fn supplied_text(&self, name: &str) -> Option<&str> {
        if !self.is_supplied(name) {
            return None;
        }
        match self.value(name)? {
            FlagValue::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }

    pub fn into_matches(self) -> ArgMatches {
        self.matches
    }
}
