//! Schema type definitions for scoped option declarations.
//!
//! An [`OptionSchema`] describes one canonical option: its type, the short
//! and long tokens that spell it on the command line, whether it takes a
//! value, limits, a default and the `required`/`multiple` flags. Options of
//! one scope are kept in an insertion-ordered [`OptionMap`] so usage text and
//! reports follow declaration order.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::MessageKey;

/// Name of the root scope.
///
/// Children may never use this name, and `--global.<name>` always targets
/// the root.
pub const GLOBAL_SCOPE: &str = "global";

/// Options of a single scope, keyed by canonical name in declaration order.
pub type OptionMap = IndexMap<String, OptionSchema>;

/// Value type of an option.
///
/// The type drives how a raw command-line string is coerced, which zero
/// value is pre-populated and whether the option is a terminal action
/// (help, license, export) instead of an ordinary value.
///
/// # Examples
///
/// ```
/// use argscope_core::OptionType;
///
/// assert!(OptionType::Help.is_terminal());
/// assert!(OptionType::File.forces_value());
/// assert!(OptionType::GlobalImport.root_only());
/// assert!(!OptionType::Int.is_special());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionType {
    /// Free text.
    Text,
    /// Boolean switch; without a value it flips its default.
    Bool,
    /// Path that need not exist.
    Path,
    /// Path to an existing regular file.
    File,
    /// Path to an existing directory.
    Dir,
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// Tally: short tokens add, long tokens set.
    Counter,
    /// Render usage text and stop.
    Help,
    /// Import a flat JSON document into the owning scope.
    Import,
    /// Export the owning scope's values as JSON and stop.
    Export,
    /// Import a JSON document keyed by scope name into the whole tree.
    GlobalImport,
    /// Export the whole tree as JSON keyed by scope name and stop.
    GlobalExport,
    /// Print the short license text and stop.
    License,
    /// Print the full license text and stop.
    FullLicense,
    /// IPv4 address or a name resolving to one.
    Ip4,
    /// IPv6 address or a name resolving to one.
    Ip6,
    /// Address of either family.
    Ip,
    /// IPv4 address bound to this host.
    LocalIp4,
    /// IPv6 address bound to this host.
    LocalIp6,
    /// Address of either family bound to this host.
    LocalIp,
}

/// Address family accepted by the IP option types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpFamily {
    V4,
    V6,
    Any,
}

impl IpFamily {
    /// Suffix used in address error messages (`""`, `"V4"`, `"V6"`).
    pub fn suffix(self) -> &'static str {
        match self {
            IpFamily::V4 => "V4",
            IpFamily::V6 => "V6",
            IpFamily::Any => "",
        }
    }
}

impl OptionType {
    /// Every option type, in declaration order of the enum.
    pub const ALL: [OptionType; 21] = [
        OptionType::Text,
        OptionType::Bool,
        OptionType::Path,
        OptionType::File,
        OptionType::Dir,
        OptionType::Int,
        OptionType::Float,
        OptionType::Counter,
        OptionType::Help,
        OptionType::Import,
        OptionType::Export,
        OptionType::GlobalImport,
        OptionType::GlobalExport,
        OptionType::License,
        OptionType::FullLicense,
        OptionType::Ip4,
        OptionType::Ip6,
        OptionType::Ip,
        OptionType::LocalIp4,
        OptionType::LocalIp6,
        OptionType::LocalIp,
    ];

    /// Types whose occurrence produces output and ends processing.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OptionType::Help
                | OptionType::License
                | OptionType::FullLicense
                | OptionType::Export
                | OptionType::GlobalExport
        )
    }

    /// Action types that never hold a value of their own.
    ///
    /// They are skipped when zero values are pre-populated and when
    /// defaults are stored.
    pub fn is_special(self) -> bool {
        self.is_terminal() || matches!(self, OptionType::Import | OptionType::GlobalImport)
    }

    /// Types that always need a value, whatever the declaration says.
    pub fn forces_value(self) -> bool {
        matches!(
            self,
            OptionType::Path
                | OptionType::File
                | OptionType::Dir
                | OptionType::Import
                | OptionType::GlobalImport
        )
    }

    /// Types that may only be declared on the root scope.
    pub fn root_only(self) -> bool {
        matches!(self, OptionType::GlobalImport | OptionType::GlobalExport)
    }

    /// Whether values of this type are filesystem paths.
    pub fn is_path(self) -> bool {
        matches!(self, OptionType::Path | OptionType::File | OptionType::Dir)
    }

    /// Address family and "must be local" flag for the IP types.
    ///
    /// # Examples
    ///
    /// ```
    /// use argscope_core::{IpFamily, OptionType};
    ///
    /// assert_eq!(OptionType::LocalIp6.address(), Some((IpFamily::V6, true)));
    /// assert_eq!(OptionType::Ip.address(), Some((IpFamily::Any, false)));
    /// assert_eq!(OptionType::Text.address(), None);
    /// ```
    pub fn address(self) -> Option<(IpFamily, bool)> {
        match self {
            OptionType::Ip4 => Some((IpFamily::V4, false)),
            OptionType::Ip6 => Some((IpFamily::V6, false)),
            OptionType::Ip => Some((IpFamily::Any, false)),
            OptionType::LocalIp4 => Some((IpFamily::V4, true)),
            OptionType::LocalIp6 => Some((IpFamily::V6, true)),
            OptionType::LocalIp => Some((IpFamily::Any, true)),
            _ => None,
        }
    }

    /// Message key of the human readable type label used in usage text.
    pub fn label_key(self) -> MessageKey {
        match self {
            OptionType::Text => MessageKey::TypeStr,
            OptionType::Bool => MessageKey::TypeBool,
            OptionType::Path => MessageKey::TypePath,
            OptionType::File => MessageKey::TypeFile,
            OptionType::Dir => MessageKey::TypeDir,
            OptionType::Int => MessageKey::TypeInteger,
            OptionType::Float => MessageKey::TypeFloat,
            OptionType::Counter => MessageKey::TypeCount,
            OptionType::Help => MessageKey::TypeHelp,
            OptionType::Import => MessageKey::TypeImport,
            OptionType::Export => MessageKey::TypeExport,
            OptionType::GlobalImport => MessageKey::TypeGlobImport,
            OptionType::GlobalExport => MessageKey::TypeGlobExport,
            OptionType::License => MessageKey::TypeLicense,
            OptionType::FullLicense => MessageKey::TypeFullLicense,
            OptionType::Ip4 => MessageKey::TypeIp4,
            OptionType::Ip6 => MessageKey::TypeIp6,
            OptionType::Ip => MessageKey::TypeIp,
            OptionType::LocalIp4 => MessageKey::TypeLocalIp4,
            OptionType::LocalIp6 => MessageKey::TypeLocalIp6,
            OptionType::LocalIp => MessageKey::TypeLocalIp,
        }
    }

    /// Zero value pre-populated when no default is declared.
    ///
    /// Returns `None` for the action types, which are never pre-populated.
    ///
    /// # Examples
    ///
    /// ```
    /// use argscope_core::{OptionType, Value};
    ///
    /// assert_eq!(OptionType::Bool.zero_value(false), Some(Value::Bool(false)));
    /// assert_eq!(OptionType::Int.zero_value(true), Some(Value::List(vec![])));
    /// assert_eq!(
    ///     OptionType::Ip6.zero_value(true),
    ///     Some(Value::List(vec![Value::from("::")]))
    /// );
    /// assert_eq!(OptionType::File.zero_value(false), Some(Value::Null));
    /// assert_eq!(OptionType::Help.zero_value(false), None);
    /// ```
    pub fn zero_value(self, multiple: bool) -> Option<Value> {
        if self.is_special() {
            return None;
        }
        let scalar = match self {
            OptionType::Bool => return Some(Value::Bool(false)),
            OptionType::Counter => return Some(Value::Int(0)),
            OptionType::Text => Value::Text(String::new()),
            OptionType::Int => Value::Int(0),
            OptionType::Float => Value::Float(0.0),
            OptionType::Ip4 | OptionType::Ip | OptionType::LocalIp4 | OptionType::LocalIp => {
                let wildcard = Value::from("0.0.0.0");
                return Some(if multiple { Value::List(vec![wildcard]) } else { wildcard });
            }
            OptionType::Ip6 | OptionType::LocalIp6 => {
                let wildcard = Value::from("::");
                return Some(if multiple { Value::List(vec![wildcard]) } else { wildcard });
            }
            _ => Value::Null,
        };
        Some(if multiple { Value::List(Vec::new()) } else { scalar })
    }
}

/// A resolved option value.
///
/// Serializes untagged, so a value map renders as plain JSON
/// (`{"port": 8080, "names": ["a", "b"]}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// No value (unset path, explicit JSON `null`).
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Values collected by a `multiple` option.
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Rendering fed back through the option validator on import.
    ///
    /// # Examples
    ///
    /// ```
    /// use argscope_core::Value;
    ///
    /// assert_eq!(Value::Bool(true).to_raw(), "true");
    /// assert_eq!(Value::Float(2.5).to_raw(), "2.5");
    /// assert_eq!(Value::from("x").to_raw(), "x");
    /// ```
    pub fn to_raw(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Converts a decoded JSON value. Objects are kept as their JSON text.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(_) => Value::Text(json.to_string()),
        }
    }

    /// Converts into a JSON value. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    match item {
                        Value::Text(s) => write!(f, "'{s}'")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

/// Declaration of one option.
///
/// Build one with [`OptionSchema::new`], [`OptionSchema::flag`] or
/// [`OptionSchema::with_value`] and chain the builder methods.
///
/// # Examples
///
/// ```
/// use argscope_core::{OptionSchema, OptionType, Value};
///
/// let port = OptionSchema::with_value(Some("p"), Some("port"), OptionType::Int)
///     .with_default(8080)
///     .with_limits(Some(Value::Int(1)), Some(Value::Int(65535)))
///     .with_description("Listening port");
/// assert!(port.takes_value);
/// assert_eq!(port.spellings(), vec!["-p", "--port"]);
///
/// let verbose = OptionSchema::flag(Some("v"), Some("verbose"));
/// assert_eq!(verbose.option_type, OptionType::Bool);
/// assert!(!verbose.needs_value());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSchema {
    /// Value type (the declaration's "mode").
    pub option_type: OptionType,
    /// Short tokens, one character each (`v` for `-v`).
    #[serde(default)]
    pub short: Vec<char>,
    /// Long tokens without dashes (`verbose` for `--verbose`).
    #[serde(default)]
    pub long: Vec<String>,
    /// Whether the flag is followed by a value.
    #[serde(default)]
    pub takes_value: bool,
    /// Declared default.
    #[serde(default)]
    pub default: Option<Value>,
    /// Inclusive lower limit.
    #[serde(default)]
    pub lower: Option<Value>,
    /// Inclusive upper limit.
    #[serde(default)]
    pub upper: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    /// Processing fails when no value reaches this option.
    #[serde(default)]
    pub required: bool,
    /// Values are collected into a list.
    #[serde(default)]
    pub multiple: bool,
}

fn split_short(short: Option<&str>) -> Vec<char> {
    short.map(|s| s.chars().collect()).unwrap_or_default()
}

impl OptionSchema {
    /// Creates an option of the given type with no tokens.
    pub fn new(option_type: OptionType) -> Self {
        Self {
            option_type,
            short: Vec::new(),
            long: Vec::new(),
            takes_value: false,
            default: None,
            lower: None,
            upper: None,
            description: None,
            required: false,
            multiple: false,
        }
    }

    /// Creates a boolean switch. Every character of `short` is a token.
    pub fn flag(short: Option<&str>, long: Option<&str>) -> Self {
        Self::new(OptionType::Bool)
            .with_short(short.unwrap_or_default())
            .with_long_opt(long)
    }

    /// Creates an option that takes a value.
    ///
    /// # Examples
    ///
    /// ```
    /// use argscope_core::{OptionSchema, OptionType};
    ///
    /// let name = OptionSchema::with_value(Some("nN"), Some("name"), OptionType::Text);
    /// assert_eq!(name.short, vec!['n', 'N']);
    /// assert_eq!(name.long, vec!["name".to_string()]);
    /// ```
    pub fn with_value(short: Option<&str>, long: Option<&str>, option_type: OptionType) -> Self {
        let mut schema = Self::new(option_type).with_long_opt(long);
        schema.short = split_short(short);
        schema.takes_value = true;
        schema
    }

    fn with_long_opt(mut self, long: Option<&str>) -> Self {
        if let Some(long) = long {
            self.long.push(long.to_string());
        }
        self
    }

    /// Adds short tokens, one per character.
    pub fn with_short(mut self, short: &str) -> Self {
        self.short.extend(short.chars());
        self
    }

    /// Adds a long token.
    pub fn with_long(mut self, long: &str) -> Self {
        self.long.push(long.to_string());
        self
    }

    /// Marks the option as taking a value.
    pub fn needing_value(mut self) -> Self {
        self.takes_value = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_limits(mut self, lower: Option<Value>, upper: Option<Value>) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn allow_multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Whether some token of this option consumes a value.
    ///
    /// Counters with a long token always do; their short tokens never do.
    pub fn needs_value(&self) -> bool {
        self.takes_value
            || self.option_type.forces_value()
            || (self.option_type == OptionType::Counter && !self.long.is_empty())
    }

    /// Whether a short token of this option consumes a value.
    pub fn short_needs_value(&self) -> bool {
        self.needs_value() && self.option_type != OptionType::Counter
    }

    /// All command-line spellings, shorts first.
    pub fn spellings(&self) -> Vec<String> {
        self.short
            .iter()
            .map(|c| format!("-{c}"))
            .chain(self.long.iter().map(|l| format!("--{l}")))
            .collect()
    }
}
