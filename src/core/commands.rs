//! Command vocabulary
//!
//! Maps normalized command text to a fixed response.

use std::collections::HashMap;

use thiserror::Error;

/// Response for anything the table does not know
pub const UNKNOWN_COMMAND: &str = "Unknown command.";

/// Answer to the gate phrase when the table has no entry for it
pub const GATE_ACKNOWLEDGEMENT: &str = "INTERFACE 2037 READY FOR INQUIRY";

const BUILTIN: &[(&str, &str)] = &[
    ("hello", "Hello! How can I assist you today?"),
    ("help", "Available commands: hello, help, version, whoareyou"),
    ("version", "Retro Terminal v1.1"),
    ("whoareyou", "I am your retro-style terminal assistant"),
    ("hi mother", GATE_ACKNOWLEDGEMENT),
    (
        "request clarification on science inability to neutralize alien",
        "UNABLE TO CLARIFY",
    ),
    (
        "request enhancement",
        "NO FURTHER ENHANCEMENT\n\
         SPECIAL ORDER 937\n\
         SCIENCE OFFICER EYES ONLY\n\
         EMERGENCY COMMAND OVERIDE 100375",
    ),
    (
        "what is special order 937 ?",
        "NOSTROMO REROUTED\n\
         TO NEW CO-ORDINATES.\n\
         INVESTIGATE LIFE FORM. GATHER SPECIMEN.PRIORITY ONE\n\
         INSURE RETURN OF ORGANISM\n\
         FOR ANALYSIS.\n\
         ALL OTHER CONSIDERATIONS SECONDARY.\n\
         CREW EXPENDABLE",
    ),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandTableError {
    #[error("duplicate command {0:?} (keys are compared trimmed and case-insensitively)")]
    DuplicateKey(String),

    #[error("empty command key")]
    EmptyKey,
}

/// Result of a table lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a str),
    NotFound,
}

impl<'a> Lookup<'a> {
    /// Response text, falling back to the unknown-command sentinel
    pub fn text(self) -> &'a str {
        match self {
            Lookup::Found(text) => text,
            Lookup::NotFound => UNKNOWN_COMMAND,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Normalize user input for comparison: trimmed and lowercased
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Immutable command table
#[derive(Debug, Clone)]
pub struct CommandTable {
    entries: HashMap<String, String>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CommandTable {
    /// The built-in vocabulary
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(key, response)| (normalize(key), (*response).to_string()))
            .collect();
        Self { entries }
    }

    /// Build a table from arbitrary entries, rejecting colliding keys
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, CommandTableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self { entries: HashMap::new() };
        table.insert_all(entries, false)?;
        Ok(table)
    }

    /// Built-in table with extra entries. Overrides may replace built-in
    /// responses but must not collide with each other.
    pub fn with_overrides<I, K, V>(overrides: I) -> Result<Self, CommandTableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self::builtin();
        table.insert_all(overrides, true)?;
        Ok(table)
    }

    fn insert_all<I, K, V>(&mut self, entries: I, replace_existing: bool) -> Result<(), CommandTableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut seen = Vec::new();
        for (key, response) in entries {
            let key = normalize(key.as_ref());
            if key.is_empty() {
                return Err(CommandTableError::EmptyKey);
            }
            let collides = seen.contains(&key) || (!replace_existing && self.entries.contains_key(&key));
            if collides {
                return Err(CommandTableError::DuplicateKey(key));
            }
            seen.push(key.clone());
            self.entries.insert(key, response.into());
        }
        Ok(())
    }

    /// Look up a raw command
    pub fn lookup(&self, raw: &str) -> Lookup<'_> {
        match self.entries.get(&normalize(raw)) {
            Some(response) => Lookup::Found(response),
            None => Lookup::NotFound,
        }
    }

    /// Response split into display lines
    #[cfg(test)]
    pub fn lines(&self, raw: &str) -> Option<Vec<&str>> {
        match self.lookup(raw) {
            Lookup::Found(text) => Some(text.lines().collect()),
            Lookup::NotFound => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
