//! Message tables for user-facing parameter errors and usage text.
//!
//! Every user-facing string goes through a [`Translation`]: a table from
//! [`MessageKey`] to a format string with named `{placeholder}` fields.
//! The English table is the default; [`Translation::german`] ships a second
//! preset, and individual entries can be overridden by key name.

use std::collections::BTreeMap;
use std::fmt;

use crate::ParamError;

macro_rules! message_keys {
    ($($key:ident),+ $(,)?) => {
        /// Key of a translatable message.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum MessageKey {
            $($key),+
        }

        impl MessageKey {
            /// Every key, in declaration order.
            pub const ALL: &'static [MessageKey] = &[$(MessageKey::$key),+];

            /// Key name as used in override tables.
            pub fn name(self) -> &'static str {
                match self {
                    $(MessageKey::$key => stringify!($key)),+
                }
            }

            /// Looks a key up by name.
            pub fn from_name(name: &str) -> Option<MessageKey> {
                match name {
                    $(stringify!($key) => Some(MessageKey::$key),)+
                    _ => None,
                }
            }
        }
    };
}

message_keys!(
    PrefixError,
    JsonError,
    PathNoFile,
    PathNoDir,
    PathNoPath,
    LessLow,
    HigherUp,
    NoInt,
    NoFloat,
    NoBool,
    OptionNotDefined,
    OptionRequired,
    TypePath,
    TypeInteger,
    TypeBool,
    TypeFloat,
    TypeFile,
    TypeDir,
    TypeCount,
    TypeHelp,
    TypeImport,
    TypeExport,
    TypeGlobImport,
    TypeGlobExport,
    TypeLicense,
    TypeFullLicense,
    TypeStr,
    TypeIp,
    TypeIp4,
    TypeIp6,
    TypeLocalIp,
    TypeLocalIp4,
    TypeLocalIp6,
    HelpDefault,
    HelpValue,
    HelpUsage,
    HelpVersion,
    HelpOptions,
    HelpOptionInline,
    OptionRequiresArgumentLong,
    OptionNeedNoArgs,
    OptionNotRecognizedLong,
    ParNoUniquePrefix,
    OptionRequiresArgumentShort,
    OptionNotRecognizedShort,
    UndefinedOptionSingle,
    UndefinedOptionMultiple,
    InvalidIp,
    InvalidLocalIp,
);

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const ENGLISH: &[(MessageKey, &str)] = &[
    (MessageKey::PrefixError, "Error in prefixed parameter {OptionName}"),
    (
        MessageKey::JsonError,
        "Import failed '{wMsg}' in {OptionPath} ({FullPath}) for parameter {OptionName}",
    ),
    (
        MessageKey::PathNoFile,
        "The path '{OptionPath}' ({FullPath}) for parameter {OptionName} is not a file",
    ),
    (
        MessageKey::PathNoDir,
        "The path '{OptionPath}' ({FullPath}) for parameter {OptionName} is not a directory",
    ),
    (
        MessageKey::PathNoPath,
        "The path '{OptionPath}' ({FullPath}) for parameter {OptionName} is not valid on this filesystem",
    ),
    (
        MessageKey::LessLow,
        "Value '{OptValue}' for parameter {ParKey} is less than lower limit ({LowLimit})",
    ),
    (
        MessageKey::HigherUp,
        "Value '{OptValue}' for parameter {ParKey} is bigger than upper limit ({UppLimit})",
    ),
    (
        MessageKey::NoInt,
        "Value '{OptValue}' for parameter {ParKey} is not a valid integer",
    ),
    (
        MessageKey::NoFloat,
        "Value '{OptValue}' for parameter {ParKey} is not a valid floating point number",
    ),
    (
        MessageKey::NoBool,
        "Value '{OptValue}' for parameter {ParKey} is not valid boolean (YyTtJj1NnFf0)",
    ),
    (MessageKey::OptionNotDefined, "No action defined for {OptionName}"),
    (MessageKey::OptionRequired, "{DefArgName} ({ParList}) required but not given"),
    (MessageKey::TypePath, "path"),
    (MessageKey::TypeInteger, "integer"),
    (MessageKey::TypeBool, "bool"),
    (MessageKey::TypeFloat, "float"),
    (MessageKey::TypeFile, "file"),
    (MessageKey::TypeDir, "directory"),
    (MessageKey::TypeCount, "counter"),
    (MessageKey::TypeHelp, "help"),
    (MessageKey::TypeImport, "import"),
    (MessageKey::TypeExport, "export"),
    (MessageKey::TypeGlobImport, "global import"),
    (MessageKey::TypeGlobExport, "global export"),
    (MessageKey::TypeLicense, "license"),
    (MessageKey::TypeFullLicense, "full license"),
    (MessageKey::TypeStr, "string"),
    (MessageKey::TypeIp, "IP address"),
    (MessageKey::TypeIp4, "IPV4 address"),
    (MessageKey::TypeIp6, "IPV6 address"),
    (MessageKey::TypeLocalIp, "local IP address"),
    (MessageKey::TypeLocalIp4, "local IPV4 address"),
    (MessageKey::TypeLocalIp6, "local IPV6 address"),
    (MessageKey::HelpDefault, "Default"),
    (MessageKey::HelpValue, "value"),
    (MessageKey::HelpUsage, "Usage:"),
    (MessageKey::HelpVersion, "Version:"),
    (MessageKey::HelpOptions, "Options:"),
    (MessageKey::HelpOptionInline, "[OPTIONS ...]"),
    (MessageKey::OptionRequiresArgumentLong, "option --{opt} requires argument"),
    (MessageKey::OptionNeedNoArgs, "option --{opt} must not have an argument"),
    (MessageKey::OptionNotRecognizedLong, "option --{opt} not recognized"),
    (MessageKey::ParNoUniquePrefix, "option --{opt} not a unique prefix"),
    (MessageKey::OptionRequiresArgumentShort, "option -{opt} requires argument"),
    (MessageKey::OptionNotRecognizedShort, "option -{opt} not recognized"),
    (MessageKey::UndefinedOptionSingle, "option {OptStr} not recognized"),
    (MessageKey::UndefinedOptionMultiple, "options {OptStr} not recognized"),
    (
        MessageKey::InvalidIp,
        "Value '{OptValue}' for parameter {ParKey} is not a valid IP{IpVers} address",
    ),
    (
        MessageKey::InvalidLocalIp,
        "Value '{OptValue}' for parameter {ParKey} is not a valid local IP{IpVers} address on this computer",
    ),
];

const GERMAN: &[(MessageKey, &str)] = &[
    (
        MessageKey::PrefixError,
        "Der angegebene Prefix für die Option '{OptionName}' ist ungültig",
    ),
    (
        MessageKey::JsonError,
        "Fehler beim Import '{wMsg}' aus der Datei {OptionPath} ({FullPath}) für den Parameter {OptionName}",
    ),
    (
        MessageKey::PathNoFile,
        "Die Pfadangabe '{OptionPath}' ({FullPath}) für die Option {OptionName} ist keine Datei",
    ),
    (
        MessageKey::PathNoDir,
        "Die Pfadangabe '{OptionPath}' ({FullPath}) für die Option {OptionName} ist kein Verzeichnis",
    ),
    (
        MessageKey::PathNoPath,
        "Die Pfadangabe '{OptionPath}' ({FullPath}) für die Option {OptionName} ist bei diesem Dateisystem ungültig",
    ),
    (
        MessageKey::LessLow,
        "Der Wert '{OptValue}' für den Parameter {ParKey} ist kleiner als das untere Limit ({LowLimit})",
    ),
    (
        MessageKey::HigherUp,
        "Der Wert '{OptValue}' für den Parameter {ParKey} ist größer als das obere Limit ({UppLimit})",
    ),
    (
        MessageKey::NoInt,
        "Der Wert '{OptValue}' für den Parameter {ParKey} ist keine gültige Ganzzahl",
    ),
    (
        MessageKey::NoFloat,
        "Der Wert '{OptValue}' für den Parameter {ParKey} ist keine gültige Fließkommazahl",
    ),
    (
        MessageKey::NoBool,
        "Der Wert '{OptValue}' für den Parameter {ParKey} ist kein Wahrheitswert (YyTtJj1NnFf0)",
    ),
    (MessageKey::OptionNotDefined, "Die Option '{OptionName}' ist ungültig"),
    (
        MessageKey::OptionRequired,
        "Der Parameter '{DefArgName}' ({ParList}) muß angegeben werden",
    ),
    (MessageKey::TypePath, "Pfad"),
    (MessageKey::TypeInteger, "Ganzzahl"),
    (MessageKey::TypeBool, "Wahrheitswert"),
    (MessageKey::TypeFloat, "Fließkommazahl"),
    (MessageKey::TypeFile, "Datei"),
    (MessageKey::TypeDir, "Verzeichnis"),
    (MessageKey::TypeCount, "Zähler"),
    (MessageKey::TypeHelp, "Hilfe"),
    (MessageKey::TypeImport, "Import"),
    (MessageKey::TypeExport, "Export"),
    (MessageKey::TypeGlobImport, "Globaler Import"),
    (MessageKey::TypeGlobExport, "Globaler Export"),
    (MessageKey::TypeLicense, "Lizenz"),
    (MessageKey::TypeFullLicense, "vollständige Lizenz"),
    (MessageKey::TypeStr, "Zeichenkette"),
    (MessageKey::TypeIp, "IP Adresse"),
    (MessageKey::TypeIp4, "IPV4 Adresse"),
    (MessageKey::TypeIp6, "IPV6 Adresse"),
    (MessageKey::TypeLocalIp, "lokale IP Adresse"),
    (MessageKey::TypeLocalIp4, "lokale IPV4 Adresse"),
    (MessageKey::TypeLocalIp6, "lokale IPV6 Adresse"),
    (MessageKey::HelpDefault, "Standardwert"),
    (MessageKey::HelpValue, "Wert"),
    (MessageKey::HelpUsage, "Verwendung:"),
    (MessageKey::HelpVersion, "Version:"),
    (MessageKey::HelpOptions, "Folgende Optionen sind möglich:"),
    (MessageKey::HelpOptionInline, "[OPTION ...]"),
    (MessageKey::OptionRequiresArgumentLong, "Option --{opt} verlangt einen Wert"),
    (MessageKey::OptionNeedNoArgs, "Option --{opt} darf keinen Wert haben"),
    (MessageKey::OptionNotRecognizedLong, "Option --{opt} ist unbekannt"),
    (MessageKey::ParNoUniquePrefix, "Option --{opt} ist mehrdeutig"),
    (MessageKey::OptionRequiresArgumentShort, "Option -{opt} verlangt einen Wert"),
    (MessageKey::OptionNotRecognizedShort, "Option -{opt} ist unbekannt"),
    (MessageKey::UndefinedOptionSingle, "Unbekannte Option {OptStr} angegeben"),
    (MessageKey::UndefinedOptionMultiple, "Unbekannte Optionen {OptStr} angegeben"),
    (
        MessageKey::InvalidIp,
        "Der Wert '{OptValue}' für den Parameter {ParKey} ist keine gültige IP{IpVers} Adresse",
    ),
    (
        MessageKey::InvalidLocalIp,
        "Der Wert '{OptValue}' für den Parameter {ParKey} ist keine gültige, lokale IP{IpVers} Adresse auf diesem Computer",
    ),
];

/// A complete message table.
///
/// Tables are immutable once built; a tree shares one table between its
/// scopes and swaps it out explicitly.
///
/// # Examples
///
/// ```
/// use argscope_core::{MessageKey, Translation};
///
/// let table = Translation::english();
/// let text = table.format(MessageKey::NoInt, &[("OptValue", "x"), ("ParKey", "--port")]);
/// assert_eq!(text, "Value 'x' for parameter --port is not a valid integer");
///
/// let (custom, unknown) = Translation::english()
///     .with_overrides([("HelpOptions", "Flags:"), ("NoSuchKey", "ignored")]);
/// assert_eq!(custom.get(MessageKey::HelpOptions), "Flags:");
/// assert_eq!(unknown, vec!["NoSuchKey".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    entries: BTreeMap<MessageKey, String>,
}

impl Default for Translation {
    fn default() -> Self {
        Self::english()
    }
}

impl Translation {
    fn from_table(table: &[(MessageKey, &str)]) -> Self {
        let mut entries: BTreeMap<MessageKey, String> = ENGLISH
            .iter()
            .map(|(key, text)| (*key, (*text).to_string()))
            .collect();
        for (key, text) in table {
            entries.insert(*key, (*text).to_string());
        }
        Self { entries }
    }

    /// The built-in English table.
    pub fn english() -> Self {
        Self::from_table(ENGLISH)
    }

    /// The built-in German table.
    pub fn german() -> Self {
        Self::from_table(GERMAN)
    }

    /// Format string of `key`.
    pub fn get(&self, key: MessageKey) -> &str {
        self.entries.get(&key).map(String::as_str).unwrap_or_default()
    }

    /// Replaces a single entry.
    pub fn set(&mut self, key: MessageKey, text: impl Into<String>) {
        self.entries.insert(key, text.into());
    }

    /// Applies overrides given by key name.
    ///
    /// Returns the new table and the names that matched no key; those are
    /// skipped.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut unknown = Vec::new();
        for (name, text) in overrides {
            match MessageKey::from_name(name.as_ref()) {
                Some(key) => self.set(key, text),
                None => unknown.push(name.as_ref().to_string()),
            }
        }
        (self, unknown)
    }

    /// Renders `key`, substituting `{name}` placeholders from `args`.
    ///
    /// Placeholders without a matching argument are left verbatim.
    pub fn format(&self, key: MessageKey, args: &[(&str, &str)]) -> String {
        let template = self.get(key);
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = &after[..close];
                    match args.iter().find(|(arg, _)| *arg == name) {
                        Some((_, value)) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Formats `key` into a [`ParamError`].
    pub fn error(&self, key: MessageKey, args: &[(&str, &str)]) -> ParamError {
        ParamError::new(key, self.format(key, args))
    }
}
