//! Parser settings.
//!
//! Defines the YAML-serializable settings shared by every scope of a
//! [`ParamTree`](crate::ParamTree): unknown-option handling, zero defaults,
//! usage text options, the message table and the declaration remaps.
//!
//! # Example YAML
//!
//! ```yaml
//! error_on_unknown: true
//! populate_all: true
//! help_type: 3
//! version: "1.4.0"
//! description: "Synchronizes mailboxes"
//! language: german
//! translation:
//!   HelpOptions: "Optionen:"
//! declaration_keys:
//!   shortpar: k
//! mode_codes:
//!   count: c
//! license:
//!   - "MIT"
//!   - "Permission is hereby granted, free of charge, ..."
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use argscope_core::{DeclarationError, DeclarationKeys, GLOBAL_SCOPE, ModeCodes, Translation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Built-in message table a [`ParserSettings`] starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    German,
}

/// Settings of a scope tree.
///
/// Every field has a default, so a settings file only lists what it
/// changes.
///
/// # Examples
///
/// ```
/// use argscope::ParserSettings;
///
/// let settings: ParserSettings = serde_yaml::from_str("help_type: 2").unwrap();
/// assert_eq!(settings.help_type, 2);
/// assert!(settings.error_on_unknown);
/// assert!(settings.populate_all);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Fail on options no scope recognizes instead of collecting them.
    pub error_on_unknown: bool,
    /// Pre-populate options without a default with a zero value.
    pub populate_all: bool,
    /// Usage detail: 0 plain, 1 defaults, 2 types, 3 types and defaults.
    pub help_type: u8,
    /// Put a dashed header above each child's usage block.
    pub show_prefix_on_help: bool,
    /// Program name in the usage line; taken from `argv[0]` when unset.
    pub program_name: Option<String>,
    pub version: String,
    /// Description of the root scope.
    pub description: String,
    /// Text after `[OPTIONS ...]` in the usage line.
    pub additional_usage: String,
    pub language: Language,
    /// Message overrides by key name.
    pub translation: BTreeMap<String, String>,
    /// Remapped structural declaration keys by canonical name.
    pub declaration_keys: BTreeMap<String, String>,
    /// Remapped mode codes by canonical name.
    pub mode_codes: BTreeMap<String, String>,
    /// License texts: the first entry is the short license.
    pub license: Vec<String>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            error_on_unknown: true,
            populate_all: true,
            help_type: 0,
            show_prefix_on_help: true,
            program_name: None,
            version: String::new(),
            description: String::new(),
            additional_usage: String::new(),
            language: Language::English,
            translation: BTreeMap::new(),
            declaration_keys: BTreeMap::new(),
            mode_codes: BTreeMap::new(),
            license: Vec::new(),
        }
    }
}

impl ParserSettings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::Error::Io) if the file cannot be read, or
    /// [`Yaml`](crate::Error::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let settings = serde_yaml::from_reader(reader)?;
        Ok(settings)
    }

    /// Saves the settings as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::Error::Io) if the file cannot be written, or
    /// [`Yaml`](crate::Error::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// The message table: the chosen language with overrides applied.
    ///
    /// Override keys that name no message are logged and skipped.
    pub fn translation_table(&self) -> Translation {
        let base = match self.language {
            Language::English => Translation::english(),
            Language::German => Translation::german(),
        };
        let (table, unknown) = base.with_overrides(
            self.translation
                .iter()
                .map(|(key, text)| (key.as_str(), text.clone())),
        );
        for key in unknown {
            warn!(key = %key, "ignoring unknown translation key");
        }
        table
    }

    /// Declaration keys with the remaps applied.
    ///
    /// # Errors
    ///
    /// Fails when a remap names an unknown key or two keys end up equal.
    pub fn declaration_keys(&self) -> std::result::Result<DeclarationKeys, DeclarationError> {
        DeclarationKeys::default()
            .remap(&self.declaration_keys)
            .map_err(|e| DeclarationError::from_validation(GLOBAL_SCOPE, e))
    }

    /// Mode codes with the remaps applied.
    ///
    /// # Errors
    ///
    /// Fails when a remap names an unknown mode or two codes end up equal.
    pub fn mode_codes(&self) -> std::result::Result<ModeCodes, DeclarationError> {
        ModeCodes::default()
            .remap(&self.mode_codes)
            .map_err(|e| DeclarationError::from_validation(GLOBAL_SCOPE, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argscope_core::MessageKey;

    #[test]
    fn test_defaults() {
        let settings = ParserSettings::default();
        assert!(settings.error_on_unknown);
        assert!(settings.populate_all);
        assert!(settings.show_prefix_on_help);
        assert_eq!(settings.help_type, 0);
        assert_eq!(settings.language, Language::English);
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yml");

        let settings = ParserSettings {
            help_type: 3,
            version: "2.0".into(),
            language: Language::German,
            license: vec!["MIT".into(), "full text".into()],
            ..ParserSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(ParserSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_translation_table_applies_overrides() {
        let settings: ParserSettings = serde_yaml::from_str(
            "language: german\ntranslation:\n  HelpOptions: 'Schalter:'\n  Bogus: x\n",
        )
        .unwrap();
        let table = settings.translation_table();
        assert_eq!(table.get(MessageKey::HelpOptions), "Schalter:");
        assert_eq!(table.get(MessageKey::HelpOptionInline), "[OPTION ...]");
    }

    #[test]
    fn test_remaps() {
        let settings: ParserSettings =
            serde_yaml::from_str("declaration_keys:\n  shortpar: k\nmode_codes:\n  count: c\n")
                .unwrap();
        assert_eq!(settings.declaration_keys().unwrap().short, "k");
        assert_eq!(
            settings.mode_codes().unwrap().resolve("c"),
            Some(argscope_core::OptionType::Counter)
        );

        let clash: ParserSettings =
            serde_yaml::from_str("declaration_keys:\n  shortpar: l\n").unwrap();
        assert!(clash.declaration_keys().is_err());
    }
}
