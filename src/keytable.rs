//! Parse key tables. A key table maps the names a remote control source
//! produces onto command codes.
//!
//! ```toml
//! [[commands]]
//! name = "play"
//! code = 0x7689a05f
//!
//! [[keys]]
//! name = "KEY_VOLUMEUP"
//! code = 0x7689807f
//! repeat = true
//! ```
//!
//! Entries are kept in file order; when a name occurs more than once, the
//! first entry wins.

use crate::session::RELEASE_CODE;
use serde::Deserialize;
use std::{collections::HashSet, fs, path::Path};

/// Decoded command name to code
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(deny_unknown_fields)]
pub struct CommandEntry {
    pub name: String,
    pub code: u32,
}

/// Symbolic key name to code
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(deny_unknown_fields)]
pub struct KeyEntry {
    pub name: String,
    pub code: u32,
    /// Pass on auto-repeated samples for this key
    #[serde(default)]
    pub repeat: bool,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct KeyTable {
    /// The transport bumps the repeat counter when the button state changed,
    /// so an escalating counter on an unresolved key means release
    #[serde(default)]
    pub release_on_repeat_escalation: bool,
    #[serde(default)]
    pub commands: Vec<CommandEntry>,
    #[serde(default)]
    pub keys: Vec<KeyEntry>,
}

impl KeyTable {
    pub fn parse_file(path: &Path) -> Result<KeyTable, String> {
        let contents = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;

        KeyTable::parse_text(&contents, path)
    }

    pub fn parse_text(contents: &str, filename: &Path) -> Result<KeyTable, String> {
        let table: KeyTable =
            toml::from_str(contents).map_err(|e| format!("{}: {e}", filename.display()))?;

        let names = table
            .commands
            .iter()
            .map(|e| (e.name.as_str(), e.code, "command"))
            .chain(table.keys.iter().map(|e| (e.name.as_str(), e.code, "key")));

        let mut seen = HashSet::new();

        for (name, code, what) in names {
            if code == RELEASE_CODE {
                return Err(format!(
                    "{}: {what} ‘{name}’ uses reserved release code {RELEASE_CODE:#x}",
                    filename.display()
                ));
            }

            if !seen.insert((what, name)) {
                log::warn!(
                    "{}: duplicate {what} ‘{name}’, first entry is used",
                    filename.display()
                );
            }
        }

        Ok(table)
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.iter().find(|e| e.name == name)
    }

    pub fn key(&self, name: &str) -> Option<&KeyEntry> {
        self.keys.iter().find(|e| e.name == name)
    }
}
