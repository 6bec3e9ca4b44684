//! Declaration documents and the remappable key/mode vocabulary.
//!
//! A declaration document maps option names to small records keyed by
//! one-letter structural keys:
//!
//! ```text
//! { "Port": { "m": "i", "s": "p", "l": "port", "o": true, "v": 8080 } }
//! ```
//!
//! Both the structural keys ([`DeclarationKeys`]) and the mode codes
//! ([`ModeCodes`]) can be remapped to other tokens as long as every token
//! stays unique. A [`ScopeDeclaration`] adds a description, additional usage
//! text and nested children on top of an option map:
//!
//! ```text
//! { "Def": {...}, "Desc": "...", "AddPar": "files...",
//!   "Children": { "alpha": { "Def": {...} } } }
//! ```

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::{
    DeclarationError, GLOBAL_SCOPE, OptionMap, OptionSchema, OptionType, ValidationError, Value,
    validate_child_name,
};

/// Structural keys of a declaration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationKeys {
    pub short: String,
    pub long: String,
    pub needs_value: String,
    pub default: String,
    pub mode: String,
    pub description: String,
    pub lower: String,
    pub upper: String,
    pub required: String,
    pub multiple: String,
}

impl Default for DeclarationKeys {
    fn default() -> Self {
        Self {
            short: "s".into(),
            long: "l".into(),
            needs_value: "o".into(),
            default: "v".into(),
            mode: "m".into(),
            description: "d".into(),
            lower: "L".into(),
            upper: "U".into(),
            required: "r".into(),
            multiple: "M".into(),
        }
    }
}

impl DeclarationKeys {
    /// Remap names, in the order tokens are checked for clashes.
    pub const NAMES: [&'static str; 10] = [
        "shortpar",
        "longpar",
        "needoption",
        "default",
        "mode",
        "description",
        "lowlimit",
        "uplimit",
        "required",
        "multiple",
    ];

    fn slot(&mut self, name: &str) -> Option<&mut String> {
        Some(match name {
            "shortpar" => &mut self.short,
            "longpar" => &mut self.long,
            "needoption" => &mut self.needs_value,
            "default" => &mut self.default,
            "mode" => &mut self.mode,
            "description" => &mut self.description,
            "lowlimit" => &mut self.lower,
            "uplimit" => &mut self.upper,
            "required" => &mut self.required,
            "multiple" => &mut self.multiple,
            _ => return None,
        })
    }

    fn entries(&self) -> [(&'static str, &str); 10] {
        [
            ("shortpar", self.short.as_str()),
            ("longpar", self.long.as_str()),
            ("needoption", self.needs_value.as_str()),
            ("default", self.default.as_str()),
            ("mode", self.mode.as_str()),
            ("description", self.description.as_str()),
            ("lowlimit", self.lower.as_str()),
            ("uplimit", self.upper.as_str()),
            ("required", self.required.as_str()),
            ("multiple", self.multiple.as_str()),
        ]
    }

    /// Replaces keys by remap name (`"shortpar" -> "short"`).
    ///
    /// # Examples
    ///
    /// ```
    /// use argscope_core::{DeclarationKeys, ValidationError};
    ///
    /// let keys = DeclarationKeys::default().remap([("mode", "type")]).unwrap();
    /// assert_eq!(keys.mode, "type");
    ///
    /// let clash = DeclarationKeys::default().remap([("mode", "s")]);
    /// assert!(matches!(clash, Err(ValidationError::DuplicateToken { .. })));
    /// ```
    pub fn remap<I, K, V>(mut self, overrides: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, token) in overrides {
            let slot = self
                .slot(name.as_ref())
                .ok_or_else(|| ValidationError::UnknownRemap(name.as_ref().to_string()))?;
            *slot = token.into();
        }
        check_unique(self.entries())?;
        Ok(self)
    }
}

/// Mode code of every [`OptionType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeCodes {
    codes: IndexMap<OptionType, String>,
}

const DEFAULT_MODES: [(OptionType, &str, &str); 21] = [
    (OptionType::Text, "text", "t"),
    (OptionType::Bool, "bool", "b"),
    (OptionType::Path, "path", "p"),
    (OptionType::File, "file", "f"),
    (OptionType::Dir, "dir", "d"),
    (OptionType::Int, "int", "i"),
    (OptionType::Float, "float", "F"),
    (OptionType::Counter, "count", "C"),
    (OptionType::Help, "help", "H"),
    (OptionType::Import, "import", "x"),
    (OptionType::Export, "export", "X"),
    (OptionType::GlobalImport, "glob_import", "<"),
    (OptionType::GlobalExport, "glob_export", ">"),
    (OptionType::License, "license", "§"),
    (OptionType::FullLicense, "fullLicense", "L"),
    (OptionType::Ip4, "ip4", "ip4"),
    (OptionType::Ip6, "ip6", "ip6"),
    (OptionType::Ip, "ip", "ip"),
    (OptionType::LocalIp4, "lip4", "lip4"),
    (OptionType::LocalIp6, "lip6", "lip6"),
    (OptionType::LocalIp, "lip", "lip"),
];

impl Default for ModeCodes {
    fn default() -> Self {
        Self {
            codes: DEFAULT_MODES
                .iter()
                .map(|(ty, _, code)| (*ty, (*code).to_string()))
                .collect(),
        }
    }
}

impl ModeCodes {
    /// Remap name of an option type (`"glob_import"`).
    pub fn remap_name(ty: OptionType) -> &'static str {
        DEFAULT_MODES
            .iter()
            .find(|(candidate, _, _)| *candidate == ty)
            .map(|(_, name, _)| *name)
            .unwrap_or_default()
    }

    /// Code currently used for `ty`.
    pub fn code(&self, ty: OptionType) -> &str {
        self.codes.get(&ty).map(String::as_str).unwrap_or_default()
    }

    /// Option type spelled by `code`.
    pub fn resolve(&self, code: &str) -> Option<OptionType> {
        self.codes
            .iter()
            .find(|(_, candidate)| candidate.as_str() == code)
            .map(|(ty, _)| *ty)
    }

    /// Replaces codes by remap name (`"int" -> "integer"`).
    ///
    /// # Examples
    ///
    /// ```
    /// use argscope_core::{ModeCodes, OptionType};
    ///
    /// let modes = ModeCodes::default().remap([("int", "integer")]).unwrap();
    /// assert_eq!(modes.resolve("integer"), Some(OptionType::Int));
    /// assert_eq!(modes.resolve("i"), None);
    /// ```
    pub fn remap<I, K, V>(mut self, overrides: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, code) in overrides {
            let ty = DEFAULT_MODES
                .iter()
                .find(|(_, candidate, _)| *candidate == name.as_ref())
                .map(|(ty, _, _)| *ty)
                .ok_or_else(|| ValidationError::UnknownRemap(name.as_ref().to_string()))?;
            self.codes.insert(ty, code.into());
        }
        check_unique(
            self.codes
                .iter()
                .map(|(ty, code)| (Self::remap_name(*ty), code.as_str())),
        )?;
        Ok(self)
    }
}

fn check_unique<'a, I>(entries: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = (&'static str, &'a str)>,
{
    let mut seen: IndexMap<&str, &str> = IndexMap::new();
    for (name, token) in entries {
        if let Some(first) = seen.insert(token, name) {
            return Err(ValidationError::DuplicateToken {
                token: token.to_string(),
                first: first.to_string(),
                second: name.to_string(),
            });
        }
    }
    Ok(())
}

fn expect_bool(option: &str, key: &str, value: &Json) -> Result<bool, ValidationError> {
    match value {
        Json::Bool(b) => Ok(*b),
        Json::Null => Ok(false),
        other => Err(ValidationError::InvalidDeclaration {
            option: option.to_string(),
            reason: format!("'{key}' must be a boolean, got {other}"),
        }),
    }
}

fn expect_strings(option: &str, key: &str, value: &Json) -> Result<Vec<String>, ValidationError> {
    let invalid = || ValidationError::InvalidDeclaration {
        option: option.to_string(),
        reason: format!("'{key}' must be a string or a list of strings"),
    };
    match value {
        Json::Null => Ok(Vec::new()),
        Json::String(s) => Ok(vec![s.clone()]),
        Json::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(String::from).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

fn parse_option(
    name: &str,
    entry: &Json,
    keys: &DeclarationKeys,
    modes: &ModeCodes,
) -> Result<OptionSchema, ValidationError> {
    let Json::Object(fields) = entry else {
        return Err(ValidationError::InvalidDeclaration {
            option: name.to_string(),
            reason: "declaration must be a mapping".into(),
        });
    };

    let code = match fields.get(&keys.mode) {
        None | Some(Json::Null) => return Err(ValidationError::MissingMode(name.to_string())),
        Some(Json::String(code)) => code,
        Some(other) => {
            return Err(ValidationError::UnknownMode {
                option: name.to_string(),
                code: other.to_string(),
            });
        }
    };
    let option_type = modes.resolve(code).ok_or_else(|| ValidationError::UnknownMode {
        option: name.to_string(),
        code: code.clone(),
    })?;

    let mut option = OptionSchema::new(option_type);
    for (key, value) in fields {
        if *key == keys.mode {
            continue;
        } else if *key == keys.short {
            for token in expect_strings(name, key, value)? {
                option.short.extend(token.chars());
            }
        } else if *key == keys.long {
            option.long = expect_strings(name, key, value)?;
        } else if *key == keys.needs_value {
            option.takes_value = expect_bool(name, key, value)?;
        } else if *key == keys.default {
            option.default = Some(Value::from_json(value)).filter(|v| !v.is_null());
        } else if *key == keys.description {
            option.description = match value {
                Json::Null => None,
                Json::String(s) => Some(s.clone()),
                _ => Some(expect_strings(name, key, value)?.join("\n")),
            };
        } else if *key == keys.lower {
            option.lower = Some(Value::from_json(value)).filter(|v| !v.is_null());
        } else if *key == keys.upper {
            option.upper = Some(Value::from_json(value)).filter(|v| !v.is_null());
        } else if *key == keys.required {
            option.required = expect_bool(name, key, value)?;
        } else if *key == keys.multiple {
            option.multiple = expect_bool(name, key, value)?;
        } else {
            return Err(ValidationError::UnknownKey {
                option: name.to_string(),
                key: key.clone(),
            });
        }
    }
    Ok(option)
}

/// Converts a declaration document into an ordered option map.
///
/// # Examples
///
/// ```
/// use argscope_core::*;
///
/// let doc = serde_json::json!({
///     "Verbose": {"m": "C", "s": "v", "l": "verbose"},
///     "Port": {"m": "i", "l": ["port", "listen"], "o": true, "v": 8080, "L": 1},
/// });
/// let options = parse_declaration(&doc, &DeclarationKeys::default(), &ModeCodes::default())
///     .unwrap();
/// assert_eq!(options["Verbose"].option_type, OptionType::Counter);
/// assert_eq!(options["Port"].long, vec!["port", "listen"]);
/// assert_eq!(options["Port"].default, Some(Value::Int(8080)));
/// ```
pub fn parse_declaration(
    document: &Json,
    keys: &DeclarationKeys,
    modes: &ModeCodes,
) -> Result<OptionMap, ValidationError> {
    let Json::Object(entries) = document else {
        return Err(ValidationError::InvalidDeclaration {
            option: "<document>".into(),
            reason: "option declarations must be a mapping".into(),
        });
    };

    let mut options = OptionMap::new();
    for (name, entry) in entries {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyOptionName);
        }
        options.insert(name.clone(), parse_option(name, entry, keys, modes)?);
    }
    Ok(options)
}

/// A scope with its options, help texts and nested children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeDeclaration {
    pub options: OptionMap,
    pub description: Option<String>,
    pub additional_usage: Option<String>,
    pub children: IndexMap<String, ScopeDeclaration>,
}

const SCOPE_KEYS: [&str; 4] = ["Def", "Desc", "AddPar", "Children"];

impl ScopeDeclaration {
    /// Parses a root scope document.
    ///
    /// A document without any of the `Def`/`Desc`/`AddPar`/`Children` keys
    /// is read as a bare option map.
    ///
    /// # Examples
    ///
    /// ```
    /// use argscope_core::*;
    ///
    /// let doc = serde_json::json!({
    ///     "Def": {"Auto": {"m": "b", "l": "auto", "o": true}},
    ///     "Children": {" Alpha ": {"Def": {"DoAuto": {"m": "b", "l": "auto", "o": true}}}},
    /// });
    /// let scope = ScopeDeclaration::parse(&doc, &DeclarationKeys::default(), &ModeCodes::default())
    ///     .unwrap();
    /// assert!(scope.options.contains_key("Auto"));
    /// assert!(scope.children["alpha"].options.contains_key("DoAuto"));
    /// ```
    pub fn parse(
        document: &Json,
        keys: &DeclarationKeys,
        modes: &ModeCodes,
    ) -> Result<Self, DeclarationError> {
        let is_scope_doc = document
            .as_object()
            .is_some_and(|map| map.keys().any(|k| SCOPE_KEYS.contains(&k.as_str())));
        if !is_scope_doc {
            let options = parse_declaration(document, keys, modes)
                .map_err(|e| DeclarationError::from_validation(GLOBAL_SCOPE, e))?;
            return Ok(Self {
                options,
                ..Self::default()
            });
        }
        Self::parse_scope(document, keys, modes)
            .map_err(|e| e.with_context(GLOBAL_SCOPE))
    }

    fn parse_scope(
        document: &Json,
        keys: &DeclarationKeys,
        modes: &ModeCodes,
    ) -> Result<Self, DeclarationError> {
        let fail = |reason: &str| DeclarationError::new("", reason);
        let Json::Object(map) = document else {
            return Err(fail("scope declaration must be a mapping"));
        };
        if let Some(unknown) = map.keys().find(|k| !SCOPE_KEYS.contains(&k.as_str())) {
            return Err(fail(&format!("unknown scope key '{unknown}'")));
        }

        let options = match map.get("Def") {
            Some(def) => parse_declaration(def, keys, modes)
                .map_err(|e| DeclarationError::from_validation("", e))?,
            None => return Err(fail("scope declaration does not include 'Def'")),
        };
        let text = |key: &str| -> Result<Option<String>, DeclarationError> {
            match map.get(key) {
                None | Some(Json::Null) => Ok(None),
                Some(Json::String(s)) => Ok(Some(s.clone())),
                Some(_) => Err(fail(&format!("'{key}' must be a string"))),
            }
        };

        let mut scope = Self {
            options,
            description: text("Desc")?,
            additional_usage: text("AddPar")?,
            children: IndexMap::new(),
        };

        match map.get("Children") {
            None | Some(Json::Null) => {}
            Some(Json::Object(children)) => {
                for (raw_name, child_doc) in children {
                    let name = validate_child_name(
                        raw_name,
                        scope.children.keys().map(String::as_str),
                    )
                    .map_err(|e| DeclarationError::from_validation("", e))?;
                    let child = Self::parse_scope(child_doc, keys, modes)
                        .map_err(|e| e.with_context(&name))?;
                    scope.children.insert(name, child);
                }
            }
            Some(_) => return Err(fail("'Children' must be a mapping")),
        }
        Ok(scope)
    }
}
