//! Structural validation of option declarations.
//!
//! Catches duplicate tokens, malformed tokens, root-only types declared on a
//! child, ill-typed defaults and limits before any argument is processed.
//!
//! # Examples
//!
//! ```
//! use argscope_core::*;
//!
//! let mut options = OptionMap::new();
//! options.insert("Verbose".into(), OptionSchema::flag(Some("v"), Some("verbose")));
//! assert!(validate_options(&options, true).is_empty());
//!
//! // `-v` claimed twice in one scope
//! options.insert("Version".into(), OptionSchema::flag(Some("v"), Some("version")));
//! assert!(!validate_options(&options, true).is_empty());
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;

use thiserror::Error;

use crate::{GLOBAL_SCOPE, OptionMap, OptionSchema, OptionType, Value};

/// Declaration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Option name is empty or whitespace-only.
    #[error("option name cannot be empty")]
    EmptyOptionName,
    /// The declaration has no mode entry.
    #[error("no mode setting in declaration for {0}")]
    MissingMode(String),
    /// The mode code matches no option type.
    #[error("unknown mode '{code}' for {option}")]
    UnknownMode { option: String, code: String },
    /// A declaration entry uses a key that is not a structural key.
    #[error("unknown declaration key '{key}' for {option}")]
    UnknownKey { option: String, key: String },
    /// A declaration field has the wrong container type.
    #[error("invalid declaration for {option}: {reason}")]
    InvalidDeclaration { option: String, reason: String },
    /// Short token is not a usable single character.
    #[error("invalid short token for {option}: {token:?}")]
    InvalidShortToken { option: String, token: char },
    /// Long token is empty or contains `-` prefix, `=`, `.` or whitespace.
    #[error("invalid long token for {option}: {token:?}")]
    InvalidLongToken { option: String, token: String },
    /// Two options of one scope share a short token.
    #[error("double short value for {option}: {token}")]
    DuplicateShort { option: String, token: char },
    /// Two options of one scope share a long token.
    #[error("double long value for {option}: {token}")]
    DuplicateLong { option: String, token: String },
    /// `GlobalImport`/`GlobalExport` declared below the root.
    #[error("{0} is invalid in child definition")]
    RootOnly(String),
    /// Default does not fit the option type or its limits.
    #[error("invalid default for {option}: {reason}")]
    InvalidDefault { option: String, reason: String },
    /// Limits do not fit the option type or are inverted.
    #[error("invalid limit for {option}: {reason}")]
    InvalidLimit { option: String, reason: String },
    /// Child name is blank after trimming.
    #[error("child name cannot be empty")]
    EmptyChildName,
    /// Child name equals the root scope name.
    #[error("prefix '{0}' is global -> invalid!")]
    ReservedChildName(String),
    /// Child name contains a dot or whitespace.
    #[error("prefix '{0}' is not a valid scope name")]
    InvalidChildName(String),
    /// Sibling already uses this child name.
    #[error("prefix '{0}' is already used")]
    DuplicateChild(String),
    /// Two remapped declaration keys or mode codes share a token.
    #[error("user tokens {first} and {second} have the same value {token}")]
    DuplicateToken {
        token: String,
        first: String,
        second: String,
    },
    /// A remap names a key or mode that does not exist.
    #[error("{0} is not a valid declaration key")]
    UnknownRemap(String),
}

/// Outcome of comparing a value against optional inclusive limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitCheck {
    Within,
    BelowLower,
    AboveUpper,
}

fn compare(value: &Value, limit: &Value) -> Option<Ordering> {
    match (value, limit) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => value.as_float()?.partial_cmp(&limit.as_float()?),
    }
}

/// Checks `value` against inclusive `lower`/`upper` limits.
///
/// Numbers compare numerically, text lexicographically. A limit that cannot
/// be compared with the value is ignored.
///
/// # Examples
///
/// ```
/// use argscope_core::{LimitCheck, Value, check_limits};
///
/// let lo = Some(Value::Int(1));
/// let hi = Some(Value::Int(10));
/// assert_eq!(check_limits(&Value::Int(1), lo.as_ref(), hi.as_ref()), LimitCheck::Within);
/// assert_eq!(check_limits(&Value::Int(0), lo.as_ref(), hi.as_ref()), LimitCheck::BelowLower);
/// assert_eq!(check_limits(&Value::Int(11), lo.as_ref(), hi.as_ref()), LimitCheck::AboveUpper);
/// ```
pub fn check_limits(value: &Value, lower: Option<&Value>, upper: Option<&Value>) -> LimitCheck {
    if let Some(lower) = lower {
        if compare(value, lower) == Some(Ordering::Less) {
            return LimitCheck::BelowLower;
        }
    }
    if let Some(upper) = upper {
        if compare(value, upper) == Some(Ordering::Greater) {
            return LimitCheck::AboveUpper;
        }
    }
    LimitCheck::Within
}

/// Normalizes and checks a child scope name against its siblings.
///
/// Names are trimmed and lowercased.
///
/// # Examples
///
/// ```
/// use argscope_core::{ValidationError, validate_child_name};
///
/// assert_eq!(validate_child_name(" Alpha ", ["beta"]), Ok("alpha".to_string()));
/// assert_eq!(
///     validate_child_name("Global", Vec::<&str>::new()),
///     Err(ValidationError::ReservedChildName("global".into()))
/// );
/// assert_eq!(
///     validate_child_name("beta", ["beta"]),
///     Err(ValidationError::DuplicateChild("beta".into()))
/// );
/// ```
pub fn validate_child_name<'a, I>(name: &str, siblings: I) -> Result<String, ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(ValidationError::EmptyChildName);
    }
    if name == GLOBAL_SCOPE {
        return Err(ValidationError::ReservedChildName(name));
    }
    if name.contains('.') || name.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidChildName(name));
    }
    if siblings.into_iter().any(|sibling| sibling == name) {
        return Err(ValidationError::DuplicateChild(name));
    }
    Ok(name)
}

/// Validates the options of one scope.
///
/// Checks names, token formats, duplicate tokens, root-only types, limits
/// and defaults. Stops at the first problem found.
pub fn validate_options(options: &OptionMap, is_root: bool) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen_short = HashSet::new();
    let mut seen_long = HashSet::new();

    for (name, option) in options {
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyOptionName);
            return errors;
        }

        if option.option_type.root_only() && !is_root {
            errors.push(ValidationError::RootOnly(name.clone()));
            return errors;
        }

        for &token in &option.short {
            if token.is_whitespace() || matches!(token, '-' | ':' | '=' | '+') {
                errors.push(ValidationError::InvalidShortToken {
                    option: name.clone(),
                    token,
                });
                return errors;
            }
            if !seen_short.insert(token) {
                errors.push(ValidationError::DuplicateShort {
                    option: name.clone(),
                    token,
                });
                return errors;
            }
        }

        for token in &option.long {
            if token.is_empty()
                || token.starts_with('-')
                || token.contains(['=', '.'])
                || token.chars().any(char::is_whitespace)
            {
                errors.push(ValidationError::InvalidLongToken {
                    option: name.clone(),
                    token: token.clone(),
                });
                return errors;
            }
            if !seen_long.insert(token.as_str()) {
                errors.push(ValidationError::DuplicateLong {
                    option: name.clone(),
                    token: token.clone(),
                });
                return errors;
            }
        }

        if let Err(err) = validate_limits(name, option) {
            errors.push(err);
            return errors;
        }

        if let Err(err) = validate_default(name, option) {
            errors.push(err);
            return errors;
        }
    }

    errors
}

/// Whether `value` is a well-typed scalar for `ty`.
fn scalar_fits(ty: OptionType, value: &Value) -> bool {
    match ty {
        OptionType::Bool => matches!(value, Value::Bool(_)),
        OptionType::Int | OptionType::Counter => matches!(value, Value::Int(_)),
        OptionType::Float => matches!(value, Value::Int(_) | Value::Float(_)),
        _ => matches!(value, Value::Text(_)),
    }
}

fn supports_limits(ty: OptionType) -> bool {
    matches!(
        ty,
        OptionType::Text | OptionType::Int | OptionType::Float | OptionType::Counter
    )
}

fn validate_limits(name: &str, option: &OptionSchema) -> Result<(), ValidationError> {
    let ty = option.option_type;
    let invalid = |reason: String| ValidationError::InvalidLimit {
        option: name.to_string(),
        reason,
    };

    for limit in [&option.lower, &option.upper].into_iter().flatten() {
        if !supports_limits(ty) {
            return Err(invalid(format!("{ty:?} options take no limits")));
        }
        if !scalar_fits(ty, limit) {
            return Err(invalid(format!("{} limit on a {ty:?} option", limit.kind())));
        }
    }

    if let (Some(lower), Some(upper)) = (&option.lower, &option.upper) {
        if compare(lower, upper) == Some(Ordering::Greater) {
            return Err(invalid(format!("lower limit {lower} exceeds upper limit {upper}")));
        }
    }
    Ok(())
}

fn validate_default(name: &str, option: &OptionSchema) -> Result<(), ValidationError> {
    let ty = option.option_type;
    let Some(default) = &option.default else {
        return Ok(());
    };
    if ty.is_special() || default.is_null() {
        return Ok(());
    }

    let invalid = |reason: String| ValidationError::InvalidDefault {
        option: name.to_string(),
        reason,
    };

    let items: Vec<&Value> = match default {
        Value::List(items) if option.multiple => items.iter().collect(),
        Value::List(_) => return Err(invalid("list default on a single-valued option".into())),
        scalar => vec![scalar],
    };

    for item in items {
        if !scalar_fits(ty, item) {
            return Err(invalid(format!("{} value for a {ty:?} option", item.kind())));
        }
        match check_limits(item, option.lower.as_ref(), option.upper.as_ref()) {
            LimitCheck::Within => {}
            LimitCheck::BelowLower => {
                return Err(invalid(format!("{item} is below the lower limit")));
            }
            LimitCheck::AboveUpper => {
                return Err(invalid(format!("{item} is above the upper limit")));
            }
        }
    }
    Ok(())
}
