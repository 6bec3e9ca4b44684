//! GNU-style option scanner.
//!
//! Splits an argument vector into `(option, value)` pairs, positional
//! arguments and, optionally, unrecognized option tokens. Long options may
//! be abbreviated to any unique prefix, options and positionals may be
//! intermixed, and `--` ends option scanning.
//!
//! The short option specification follows `getopt(3)`: each letter may be
//! followed by `:` to take a value, and a leading `+` (or a non-empty
//! `POSIXLY_CORRECT` environment variable) stops scanning at the first
//! positional argument. Long options are listed without dashes and end in
//! `=` when they take a value.
//!
//! # Examples
//!
//! ```
//! use argscope::{Getopt, Translation};
//!
//! let longs = vec!["verbose".to_string(), "output=".to_string()];
//! let table = Translation::english();
//! let tokens = Getopt::new("vo:", &longs, &table)
//!     .scan(&["-vofile", "input", "--verb", "--out", "x"])
//!     .unwrap();
//!
//! assert_eq!(
//!     tokens.options,
//!     vec![
//!         ("-v".to_string(), String::new()),
//!         ("-o".to_string(), "file".to_string()),
//!         ("--verbose".to_string(), String::new()),
//!         ("--output".to_string(), "x".to_string()),
//!     ]
//! );
//! assert_eq!(tokens.positional, vec!["input"]);
//! ```

use std::collections::HashMap;

use argscope_core::{MessageKey, ParamError, Translation};

/// Result of scanning an argument vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Resolved options in encounter order: `("--name", value)` or
    /// `("-c", value)`; the value is empty for options without one.
    pub options: Vec<(String, String)>,
    /// Positional arguments.
    pub positional: Vec<String>,
    /// Unrecognized option tokens, collected only when unknown options are
    /// accepted.
    pub unknown: Vec<String>,
}

/// Scanner configured with short and long option tables.
#[derive(Debug, Clone)]
pub struct Getopt<'a> {
    shorts: HashMap<char, bool>,
    longs: &'a [String],
    strict: bool,
    accept_unknown: bool,
    translation: &'a Translation,
}

enum LongMatch<'a> {
    Found { name: &'a str, takes_value: bool },
    NotFound,
}

impl<'a> Getopt<'a> {
    /// Creates a scanner.
    ///
    /// `short_spec` uses `getopt(3)` syntax; `longs` holds long option names
    /// without dashes, with a trailing `=` for options taking a value.
    pub fn new(short_spec: &str, longs: &'a [String], translation: &'a Translation) -> Self {
        let (spec, strict) = match short_spec.strip_prefix('+') {
            Some(rest) => (rest, true),
            None => (
                short_spec,
                std::env::var_os("POSIXLY_CORRECT").is_some_and(|v| !v.is_empty()),
            ),
        };

        let mut shorts = HashMap::new();
        let mut chars = spec.chars().peekable();
        while let Some(c) = chars.next() {
            if c == ':' {
                continue;
            }
            let takes_value = chars.peek() == Some(&':');
            shorts.insert(c, takes_value);
        }

        Self {
            shorts,
            longs,
            strict,
            accept_unknown: false,
            translation,
        }
    }

    /// Collects unrecognized options instead of failing on them.
    pub fn accept_unknown(mut self, accept: bool) -> Self {
        self.accept_unknown = accept;
        self
    }

    /// Stops at the first positional argument.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Scans `args` (without the program name).
    pub fn scan<S: AsRef<str>>(&self, args: &[S]) -> Result<Tokens, ParamError> {
        let mut tokens = Tokens::default();
        let mut rest = args.iter().map(|arg| arg.as_ref());

        while let Some(arg) = rest.next() {
            if arg == "--" {
                tokens.positional.extend(rest.by_ref().map(String::from));
                break;
            }
            if let Some(long) = arg.strip_prefix("--") {
                self.scan_long(long, &mut rest, &mut tokens)?;
            } else if arg.starts_with('-') && arg != "-" {
                self.scan_shorts(&arg[1..], &mut rest, &mut tokens)?;
            } else if self.strict {
                tokens.positional.push(arg.to_string());
                tokens.positional.extend(rest.by_ref().map(String::from));
                break;
            } else {
                tokens.positional.push(arg.to_string());
            }
        }

        Ok(tokens)
    }

    fn match_long(&self, opt: &str) -> Result<LongMatch<'a>, ParamError> {
        let candidates: Vec<&'a str> = self
            .longs
            .iter()
            .map(String::as_str)
            .filter(|long| long.starts_with(opt))
            .collect();

        if candidates.is_empty() {
            return Ok(LongMatch::NotFound);
        }
        for &candidate in &candidates {
            if candidate == opt {
                return Ok(LongMatch::Found {
                    name: candidate,
                    takes_value: false,
                });
            }
            if candidate.strip_suffix('=') == Some(opt) {
                return Ok(LongMatch::Found {
                    name: &candidate[..candidate.len() - 1],
                    takes_value: true,
                });
            }
        }
        if candidates.len() > 1 {
            return Err(self
                .translation
                .error(MessageKey::ParNoUniquePrefix, &[("opt", opt)]));
        }

        let unique = candidates[0];
        Ok(match unique.strip_suffix('=') {
            Some(name) => LongMatch::Found {
                name,
                takes_value: true,
            },
            None => LongMatch::Found {
                name: unique,
                takes_value: false,
            },
        })
    }

    fn scan_long<'s, I>(&self, long: &str, rest: &mut I, tokens: &mut Tokens) -> Result<(), ParamError>
    where
        I: Iterator<Item = &'s str>,
    {
        let (opt, inline) = match long.split_once('=') {
            Some((opt, value)) => (opt, Some(value)),
            None => (long, None),
        };

        let (name, takes_value) = match self.match_long(opt)? {
            LongMatch::Found { name, takes_value } => (name, takes_value),
            LongMatch::NotFound if self.accept_unknown => {
                tokens.unknown.push(format!("--{opt}"));
                return Ok(());
            }
            LongMatch::NotFound => {
                return Err(self
                    .translation
                    .error(MessageKey::OptionNotRecognizedLong, &[("opt", opt)]));
            }
        };

        let value = match (takes_value, inline) {
            (true, Some(value)) => value.to_string(),
            (true, None) => match rest.next() {
                Some(next) => next.to_string(),
                None => {
                    return Err(self
                        .translation
                        .error(MessageKey::OptionRequiresArgumentLong, &[("opt", name)]));
                }
            },
            (false, Some(_)) => {
                return Err(self
                    .translation
                    .error(MessageKey::OptionNeedNoArgs, &[("opt", name)]));
            }
            (false, None) => String::new(),
        };

        tokens.options.push((format!("--{name}"), value));
        Ok(())
    }

    fn scan_shorts<'s, I>(&self, cluster: &str, rest: &mut I, tokens: &mut Tokens) -> Result<(), ParamError>
    where
        I: Iterator<Item = &'s str>,
    {
        for (idx, c) in cluster.char_indices() {
            let takes_value = match self.shorts.get(&c) {
                Some(&takes_value) => takes_value,
                None if self.accept_unknown => {
                    tokens.unknown.push(format!("-{c}"));
                    continue;
                }
                None => {
                    let opt = c.to_string();
                    return Err(self
                        .translation
                        .error(MessageKey::OptionNotRecognizedShort, &[("opt", opt.as_str())]));
                }
            };

            if !takes_value {
                tokens.options.push((format!("-{c}"), String::new()));
                continue;
            }

            let remainder = &cluster[idx + c.len_utf8()..];
            let value = if !remainder.is_empty() {
                remainder.to_string()
            } else {
                match rest.next() {
                    Some(next) => next.to_string(),
                    None => {
                        let opt = c.to_string();
                        return Err(self
                            .translation
                            .error(MessageKey::OptionRequiresArgumentShort, &[("opt", opt.as_str())]));
                    }
                }
            };
            tokens.options.push((format!("-{c}"), value));
            return Ok(());
        }
        Ok(())
    }
}
