//! Scope compilation ("prepare").
//!
//! Turns a scope's [`OptionMap`] into the tables used while processing:
//! the `getopt` short specification and long list, a token to option
//! lookup, the initial value map and the help layout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use argscope_core::{
    DeclarationError, OptionMap, OptionSchema, OptionType, ValidationError, Value, validate_options,
};
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::check::resolve_path;
use crate::help::HelpLayout;
use crate::net;

/// Token lookup of one compiled scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTable {
    short_spec: String,
    long_options: Vec<String>,
    by_token: IndexMap<String, (String, OptionType)>,
}

impl TokenTable {
    /// Short options in `getopt(3)` syntax (`vo:`).
    pub fn short_spec(&self) -> &str {
        &self.short_spec
    }

    /// Long options without dashes, value-taking ones ending in `=`.
    pub fn long_options(&self) -> &[String] {
        &self.long_options
    }

    /// Short options one per entry (`v`, `o:`).
    pub fn short_options(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for c in self.short_spec.chars() {
            match (c, out.last_mut()) {
                (':', Some(last)) => last.push(':'),
                _ => out.push(c.to_string()),
            }
        }
        out
    }

    /// Canonical option name and type of a token such as `-v` or `--port`.
    pub fn resolve(&self, token: &str) -> Option<(&str, OptionType)> {
        self.by_token
            .get(token)
            .map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Every registered token with its option name, longs first.
    pub fn tokens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_token
            .iter()
            .map(|(token, (name, _))| (token.as_str(), name.as_str()))
    }

    fn register(&mut self, token: String, name: &str, option: &OptionSchema) -> Result<(), ValidationError> {
        match self.by_token.entry(token) {
            Entry::Occupied(entry) => {
                let token = entry.key().clone();
                Err(match token.strip_prefix("--") {
                    Some(long) => ValidationError::DuplicateLong {
                        option: name.to_string(),
                        token: long.to_string(),
                    },
                    None => ValidationError::DuplicateShort {
                        option: name.to_string(),
                        token: token.chars().nth(1).unwrap_or('-'),
                    },
                })
            }
            Entry::Vacant(entry) => {
                entry.insert((name.to_string(), option.option_type));
                Ok(())
            }
        }
    }
}

/// Everything derived from a scope's declaration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompiledScope {
    pub tokens: TokenTable,
    pub defaults: BTreeMap<String, Value>,
    pub layout: HelpLayout,
    /// Working directory relative paths are resolved against.
    pub cwd: PathBuf,
}

pub(crate) struct CompileContext<'a> {
    pub is_root: bool,
    /// Dotted path of the scope, used in error messages.
    pub scope_path: &'a str,
    pub populate_all: bool,
    pub cwd: &'a Path,
}

fn resolve_default(
    name: &str,
    option: &OptionSchema,
    default: &Value,
    cwd: &Path,
) -> Result<Value, ValidationError> {
    if let Some((family, local)) = option.option_type.address() {
        let resolve_one = |value: &Value| -> Result<Value, ValidationError> {
            let raw = value.to_raw();
            let resolved = if local {
                net::resolve_local_address(&raw, family)
            } else {
                net::resolve_address(&raw, family)
            };
            resolved
                .map(|addr| Value::Text(addr.to_string()))
                .ok_or_else(|| ValidationError::InvalidDefault {
                    option: name.to_string(),
                    reason: format!("'{raw}' is invalid for this type (IP{})", family.suffix()),
                })
        };
        return match default {
            Value::List(items) => Ok(Value::List(
                items.iter().map(resolve_one).collect::<Result<_, _>>()?,
            )),
            Value::Null => Ok(Value::Null),
            single => resolve_one(single),
        };
    }

    if option.option_type.is_path() {
        let resolve_one = |value: &Value| -> Value {
            match value {
                Value::Text(raw) if !raw.trim().is_empty() => {
                    Value::Text(resolve_path(raw.trim(), cwd).display().to_string())
                }
                other => other.clone(),
            }
        };
        return Ok(match default {
            Value::List(items) => Value::List(items.iter().map(resolve_one).collect()),
            single => resolve_one(single),
        });
    }

    Ok(match (option.option_type, default) {
        (OptionType::Float, Value::Int(i)) => Value::Float(*i as f64),
        _ => default.clone(),
    })
}

/// Validates `options` and builds the compiled tables.
pub(crate) fn compile(options: &OptionMap, ctx: &CompileContext<'_>) -> Result<CompiledScope, DeclarationError> {
    let fail = |err: ValidationError| DeclarationError::from_validation(ctx.scope_path, err);

    if let Some(err) = validate_options(options, ctx.is_root).into_iter().next() {
        return Err(fail(err));
    }

    let mut tokens = TokenTable::default();
    let mut defaults = BTreeMap::new();

    for (name, option) in options {
        let ty = option.option_type;
        if !ty.is_special() {
            match &option.default {
                Some(default) => {
                    let value = resolve_default(name, option, default, ctx.cwd).map_err(fail)?;
                    defaults.insert(name.clone(), value);
                }
                None if ctx.populate_all && !option.required => {
                    if let Some(zero) = ty.zero_value(option.multiple) {
                        defaults.insert(name.clone(), zero);
                    }
                }
                None => {}
            }
        }

        let needs_value = option.needs_value();
        for long in &option.long {
            tokens.register(format!("--{long}"), name, option).map_err(fail)?;
            tokens.long_options.push(if needs_value {
                format!("{long}=")
            } else {
                long.clone()
            });
        }
        let short_needs_value = option.short_needs_value();
        for c in &option.short {
            tokens.register(format!("-{c}"), name, option).map_err(fail)?;
            tokens.short_spec.push(*c);
            if short_needs_value {
                tokens.short_spec.push(':');
            }
        }
    }

    Ok(CompiledScope {
        tokens,
        defaults,
        layout: HelpLayout::build(options),
        cwd: ctx.cwd.to_path_buf(),
    })
}
