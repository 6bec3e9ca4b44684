//! Per-type coercion of raw option values.
//!
//! [`check_option`] turns the raw string given for an option into a typed
//! [`Value`] and stores it in a scope's value map. On failure nothing is
//! written and a translated [`ParamError`] is returned.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use argscope_core::{
    LimitCheck, MessageKey, OptionSchema, OptionType, ParamError, Translation, Value, check_limits,
};

use crate::net;

/// Where a raw value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    /// A short token such as `-v`.
    Short,
    /// A long token such as `--verbose`.
    Long,
    /// A value read from an import document.
    Import,
}

impl Source {
    pub(crate) fn of_token(token: &str) -> Self {
        if token.starts_with("--") {
            Source::Long
        } else {
            Source::Short
        }
    }
}

/// Shared inputs of a check.
pub(crate) struct CheckContext<'a> {
    pub translation: &'a Translation,
    /// Working directory captured when the scope was compiled.
    pub cwd: &'a Path,
}

/// Expands a leading `~` and anchors relative paths at `cwd`.
pub(crate) fn absolute_path(raw: &str, cwd: &Path) -> PathBuf {
    let expanded = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        },
        _ => PathBuf::from(raw),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolves symlinks where the path exists, `.`/`..` lexically otherwise.
pub(crate) fn resolve_path(raw: &str, cwd: &Path) -> PathBuf {
    let path = absolute_path(raw, cwd);
    std::fs::canonicalize(&path).unwrap_or_else(|_| normalize(&path))
}

fn store(values: &mut BTreeMap<String, Value>, name: &str, option: &OptionSchema, value: Value) {
    if !option.multiple {
        values.insert(name.to_string(), value);
        return;
    }
    match values.get_mut(name) {
        Some(Value::List(items)) => items.push(value),
        _ => {
            values.insert(name.to_string(), Value::List(vec![value]));
        }
    }
}

fn limit_error(
    check: LimitCheck,
    raw: &str,
    key: &str,
    option: &OptionSchema,
    tr: &Translation,
) -> Result<(), ParamError> {
    match check {
        LimitCheck::Within => Ok(()),
        LimitCheck::BelowLower => {
            let limit = option.lower.as_ref().map(Value::to_string).unwrap_or_default();
            Err(tr.error(
                MessageKey::LessLow,
                &[("OptValue", raw), ("ParKey", key), ("LowLimit", limit.as_str())],
            ))
        }
        LimitCheck::AboveUpper => {
            let limit = option.upper.as_ref().map(Value::to_string).unwrap_or_default();
            Err(tr.error(
                MessageKey::HigherUp,
                &[("OptValue", raw), ("ParKey", key), ("UppLimit", limit.as_str())],
            ))
        }
    }
}

/// Adds one to counter `name` for a bare short token, within its limits.
pub(crate) fn increment_counter(
    values: &mut BTreeMap<String, Value>,
    name: &str,
    key: &str,
    option: &OptionSchema,
    tr: &Translation,
) -> Result<(), ParamError> {
    let count = values
        .get(name)
        .and_then(Value::as_int)
        .unwrap_or(0)
        .saturating_add(1);
    let value = Value::Int(count);
    let raw = count.to_string();
    limit_error(
        check_limits(&value, option.lower.as_ref(), option.upper.as_ref()),
        &raw,
        key,
        option,
        tr,
    )?;
    values.insert(name.to_string(), value);
    Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.chars().next()?.to_lowercase().next()? {
        'j' | 'y' | 't' | '1' => Some(true),
        'n' | 'f' | '0' => Some(false),
        _ => None,
    }
}

/// Coerces `raw` for option `name` and writes it into `values`.
///
/// `key` is how the option is named in error messages, usually the token
/// that carried the value.
pub(crate) fn check_option(
    values: &mut BTreeMap<String, Value>,
    name: &str,
    key: &str,
    option: &OptionSchema,
    raw: &str,
    source: Source,
    ctx: &CheckContext<'_>,
) -> Result<(), ParamError> {
    let tr = ctx.translation;
    let number_error = |msg: MessageKey| tr.error(msg, &[("OptValue", raw), ("ParKey", key)]);
    let path_error = |msg: MessageKey, full: &Path| {
        let full = full.display().to_string();
        tr.error(
            msg,
            &[("OptionPath", raw), ("FullPath", full.as_str()), ("OptionName", key)],
        )
    };

    let value = match option.option_type {
        OptionType::Text => {
            let value = Value::from(raw);
            limit_error(
                check_limits(&value, option.lower.as_ref(), option.upper.as_ref()),
                raw,
                key,
                option,
                tr,
            )?;
            value
        }
        OptionType::Int => {
            let value = Value::Int(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| number_error(MessageKey::NoInt))?,
            );
            limit_error(
                check_limits(&value, option.lower.as_ref(), option.upper.as_ref()),
                raw,
                key,
                option,
                tr,
            )?;
            value
        }
        OptionType::Float => {
            let value = Value::Float(
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| number_error(MessageKey::NoFloat))?,
            );
            limit_error(
                check_limits(&value, option.lower.as_ref(), option.upper.as_ref()),
                raw,
                key,
                option,
                tr,
            )?;
            value
        }
        OptionType::Bool => {
            Value::Bool(parse_bool(raw).ok_or_else(|| number_error(MessageKey::NoBool))?)
        }
        OptionType::Counter => {
            if raw.is_empty() {
                return Ok(());
            }
            let amount = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| number_error(MessageKey::NoInt))?;
            let current = values.get(name).and_then(Value::as_int);
            let count = match (source, current) {
                (Source::Short, Some(current)) => current.saturating_add(amount),
                _ => amount,
            };
            let value = Value::Int(count);
            limit_error(
                check_limits(&value, option.lower.as_ref(), option.upper.as_ref()),
                raw,
                key,
                option,
                tr,
            )?;
            values.insert(name.to_string(), value);
            return Ok(());
        }
        OptionType::File | OptionType::Dir => {
            let (want_file, msg) = if option.option_type == OptionType::File {
                (true, MessageKey::PathNoFile)
            } else {
                (false, MessageKey::PathNoDir)
            };
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(path_error(msg, Path::new("")));
            }
            let path = resolve_path(trimmed, ctx.cwd);
            let ok = if want_file { path.is_file() } else { path.is_dir() };
            if !ok {
                return Err(path_error(msg, &path));
            }
            Value::Text(path.display().to_string())
        }
        OptionType::Path => {
            if raw.contains('\0') {
                return Err(path_error(MessageKey::PathNoPath, Path::new(raw)));
            }
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Value::Text(String::new())
            } else {
                Value::Text(resolve_path(trimmed, ctx.cwd).display().to_string())
            }
        }
        ty => match ty.address() {
            Some((family, local)) => {
                let resolved = if local {
                    net::resolve_local_address(raw, family)
                } else {
                    net::resolve_address(raw, family)
                };
                match resolved {
                    Some(addr) => Value::Text(addr.to_string()),
                    None => {
                        let msg = if local {
                            MessageKey::InvalidLocalIp
                        } else {
                            MessageKey::InvalidIp
                        };
                        return Err(tr.error(
                            msg,
                            &[("OptValue", raw), ("ParKey", key), ("IpVers", family.suffix())],
                        ));
                    }
                }
            }
            None => {
                return Err(tr.error(MessageKey::OptionNotDefined, &[("OptionName", key)]));
            }
        },
    };

    store(values, name, option, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(option: &OptionSchema, raw: &str) -> Result<BTreeMap<String, Value>, ParamError> {
        let table = Translation::english();
        let cwd = std::env::temp_dir();
        let ctx = CheckContext {
            translation: &table,
            cwd: &cwd,
        };
        let mut values = BTreeMap::new();
        check_option(&mut values, "Opt", "--opt", option, raw, Source::Long, &ctx)?;
        Ok(values)
    }

    fn limited(ty: OptionType, lower: Value, upper: Value) -> OptionSchema {
        OptionSchema::with_value(None, Some("opt"), ty).with_limits(Some(lower), Some(upper))
    }

    #[test]
    fn test_integer_limits_are_inclusive() {
        let option = limited(OptionType::Int, Value::Int(1), Value::Int(10));
        assert_eq!(run(&option, "1").unwrap()["Opt"], Value::Int(1));
        assert_eq!(run(&option, "10").unwrap()["Opt"], Value::Int(10));
        assert_eq!(run(&option, "0").unwrap_err().key(), MessageKey::LessLow);
        assert_eq!(run(&option, "11").unwrap_err().key(), MessageKey::HigherUp);
    }

    #[test]
    fn test_float_limits_are_inclusive() {
        let option = limited(OptionType::Float, Value::Float(0.5), Value::Float(1.5));
        assert_eq!(run(&option, "0.5").unwrap()["Opt"], Value::Float(0.5));
        assert_eq!(run(&option, "1.5").unwrap()["Opt"], Value::Float(1.5));
        assert_eq!(run(&option, "-0.5").unwrap_err().key(), MessageKey::LessLow);
        assert_eq!(run(&option, "2.5").unwrap_err().key(), MessageKey::HigherUp);
    }

    #[test]
    fn test_limit_message_names_the_limit() {
        let option = limited(OptionType::Int, Value::Int(1), Value::Int(10));
        assert_eq!(
            run(&option, "11").unwrap_err().to_string(),
            "Value '11' for parameter --opt is bigger than upper limit (10)"
        );
    }

    #[test]
    fn test_number_parse_errors() {
        let int = OptionSchema::with_value(None, Some("opt"), OptionType::Int);
        let err = run(&int, "12a").unwrap_err();
        assert_eq!(err.key(), MessageKey::NoInt);
        assert_eq!(
            err.to_string(),
            "Value '12a' for parameter --opt is not a valid integer"
        );

        let float = OptionSchema::with_value(None, Some("opt"), OptionType::Float);
        assert_eq!(run(&float, "x").unwrap_err().key(), MessageKey::NoFloat);
    }

    #[test]
    fn test_bool_coercion() {
        let option = OptionSchema::with_value(None, Some("opt"), OptionType::Bool);
        for raw in ["Y", "yes", "1", "True", "ja"] {
            assert_eq!(run(&option, raw).unwrap()["Opt"], Value::Bool(true), "{raw}");
        }
        for raw in ["n", "0", "false", "No"] {
            assert_eq!(run(&option, raw).unwrap()["Opt"], Value::Bool(false), "{raw}");
        }
        for raw in ["", "maybe"] {
            assert_eq!(run(&option, raw).unwrap_err().key(), MessageKey::NoBool, "{raw}");
        }
    }

    #[test]
    fn test_text_limits_compare_as_strings() {
        let option = limited(OptionType::Text, Value::from("b"), Value::from("d"));
        assert!(run(&option, "c").is_ok());
        assert_eq!(run(&option, "a").unwrap_err().key(), MessageKey::LessLow);
        assert_eq!(run(&option, "e").unwrap_err().key(), MessageKey::HigherUp);
    }

    #[test]
    fn test_failed_check_leaves_values_untouched() {
        let table = Translation::english();
        let cwd = std::env::temp_dir();
        let ctx = CheckContext {
            translation: &table,
            cwd: &cwd,
        };
        let option = OptionSchema::with_value(None, Some("opt"), OptionType::Int);
        let mut values = BTreeMap::from([("Opt".to_string(), Value::Int(7))]);
        assert!(check_option(&mut values, "Opt", "--opt", &option, "x", Source::Long, &ctx).is_err());
        assert_eq!(values["Opt"], Value::Int(7));
    }

    #[test]
    fn test_counter_short_adds_long_replaces() {
        let table = Translation::english();
        let cwd = std::env::temp_dir();
        let ctx = CheckContext {
            translation: &table,
            cwd: &cwd,
        };
        let option = OptionSchema::new(OptionType::Counter)
            .with_short("v")
            .with_long("verbose");
        let mut values = BTreeMap::from([("V".to_string(), Value::Int(2))]);

        check_option(&mut values, "V", "-v", &option, "3", Source::Short, &ctx).unwrap();
        assert_eq!(values["V"], Value::Int(5));

        check_option(&mut values, "V", "--verbose", &option, "1", Source::Long, &ctx).unwrap();
        assert_eq!(values["V"], Value::Int(1));

        check_option(&mut values, "V", "-v", &option, "", Source::Short, &ctx).unwrap();
        assert_eq!(values["V"], Value::Int(1));
    }

    #[test]
    fn test_multiple_appends() {
        let table = Translation::english();
        let cwd = std::env::temp_dir();
        let ctx = CheckContext {
            translation: &table,
            cwd: &cwd,
        };
        let option = OptionSchema::with_value(None, Some("num"), OptionType::Int).allow_multiple();
        let mut values = BTreeMap::new();
        for raw in ["3", "1", "2"] {
            check_option(&mut values, "N", "--num", &option, raw, Source::Long, &ctx).unwrap();
        }
        assert_eq!(
            values["N"],
            Value::List(vec![Value::Int(3), Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_existing_file_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.json");
        std::fs::write(&file, "{}").unwrap();

        let table = Translation::english();
        let ctx = CheckContext {
            translation: &table,
            cwd: dir.path(),
        };
        let file_opt = OptionSchema::new(OptionType::File).with_long("file");
        let dir_opt = OptionSchema::new(OptionType::Dir).with_long("dir");
        let mut values = BTreeMap::new();

        check_option(&mut values, "F", "--file", &file_opt, "data.json", Source::Long, &ctx)
            .unwrap();
        let stored = PathBuf::from(values["F"].as_str().unwrap());
        assert!(stored.is_absolute());
        assert!(stored.ends_with("data.json"));

        let err = check_option(&mut values, "F", "--file", &file_opt, ".", Source::Long, &ctx)
            .unwrap_err();
        assert_eq!(err.key(), MessageKey::PathNoFile);

        let err = check_option(&mut values, "F", "--file", &file_opt, " ", Source::Long, &ctx)
            .unwrap_err();
        assert_eq!(err.key(), MessageKey::PathNoFile);

        check_option(&mut values, "D", "--dir", &dir_opt, ".", Source::Long, &ctx).unwrap();
        let err = check_option(&mut values, "D", "--dir", &dir_opt, "data.json", Source::Long, &ctx)
            .unwrap_err();
        assert_eq!(err.key(), MessageKey::PathNoDir);
    }

    #[test]
    fn test_path_need_not_exist() {
        let option = OptionSchema::new(OptionType::Path).with_long("out");
        let values = run(&option, "").unwrap();
        assert_eq!(values["Opt"], Value::from(""));

        let cwd = std::env::temp_dir();
        let table = Translation::english();
        let ctx = CheckContext {
            translation: &table,
            cwd: &cwd,
        };
        let mut values = BTreeMap::new();
        check_option(
            &mut values,
            "P",
            "--out",
            &option,
            "missing/../out.txt",
            Source::Long,
            &ctx,
        )
        .unwrap();
        let stored = PathBuf::from(values["P"].as_str().unwrap());
        assert!(stored.is_absolute());
        assert!(stored.ends_with("out.txt"));
        assert!(!stored.to_string_lossy().contains(".."));
    }

    #[test]
    fn test_ip_family_errors() {
        let v4 = OptionSchema::with_value(None, Some("opt"), OptionType::Ip4);
        assert_eq!(run(&v4, "127.0.0.1").unwrap()["Opt"], Value::from("127.0.0.1"));
        let err = run(&v4, "::1").unwrap_err();
        assert_eq!(err.key(), MessageKey::InvalidIp);
        assert_eq!(
            err.to_string(),
            "Value '::1' for parameter --opt is not a valid IPV4 address"
        );

        let local6 = OptionSchema::with_value(None, Some("opt"), OptionType::LocalIp6);
        assert_eq!(run(&local6, "::").unwrap()["Opt"], Value::from("::"));
        assert_eq!(
            run(&local6, "2001:db8::99").unwrap_err().key(),
            MessageKey::InvalidLocalIp
        );
    }

    #[test]
    fn test_absolute_path_expands_home() {
        let cwd = Path::new("/work");
        assert_eq!(absolute_path("a/b", cwd), PathBuf::from("/work/a/b"));
        assert_eq!(absolute_path("/etc", cwd), PathBuf::from("/etc"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(absolute_path("~/x", cwd), home.join("x"));
        }
    }
}
