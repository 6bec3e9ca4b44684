//! Developer diagnostics.
//!
//! Tabular value dumps, token usage overviews and a lint pass that finds
//! tokens declared in more than one scope. None of this is meant for end
//! users; it helps while designing a command line.

use std::collections::BTreeSet;
use std::fmt;

use argscope_core::{DeclarationError, Value};
use indexmap::IndexMap;

use crate::tree::{ParamTree, Scope};

const RULE_WIDTH: usize = 60;
const WRAP_WIDTH: usize = 64;
const SHORT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Layout of [`ParamTree::param_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Spaces per depth level.
    pub indent: usize,
    /// Dashed header above each scope.
    pub header: bool,
    /// Include inherited values, not only the scope's own.
    pub all_values: bool,
    /// Name scopes by their dotted path.
    pub dotted: bool,
    /// Show the command-line spellings of each option.
    pub command_line: bool,
    /// Look up spellings of inherited options in the ancestors.
    pub parent_options: bool,
    /// Descend into children.
    pub recursive: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            header: true,
            all_values: true,
            dotted: false,
            command_line: true,
            parent_options: false,
            recursive: true,
        }
    }
}

enum ReportLine {
    Plain(String),
    Row([String; 3], String),
}

fn shown_value(value: &Value) -> String {
    match value {
        Value::Text(text) => format!("'{text}'"),
        other => other.to_string(),
    }
}

/// Joins `items` with `, ` and wraps at 64 columns, each line indented by
/// four spaces. Items are never split.
fn wrapped(items: &[String]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for (i, item) in items.iter().enumerate() {
        let piece = if i + 1 < items.len() {
            format!("{item},")
        } else {
            item.clone()
        };
        if current.is_empty() {
            current = piece;
        } else if current.len() + 1 + piece.len() <= WRAP_WIDTH {
            current.push(' ');
            current.push_str(&piece);
        } else {
            lines.push(std::mem::take(&mut current));
            current = piece;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    format!("    {}", lines.join("\n    "))
}

/// How serious a reused token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A short token takes a value in one scope and none in another.
    Error,
    /// A long token takes a value in one scope and none in another; users
    /// must always prefix it.
    Danger,
    /// Consistent reuse, possibly unintended.
    Warning,
}

/// One token declared in more than one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    /// The token with dashes (`-v`, `--verbose`).
    pub token: String,
    pub severity: Severity,
    /// Full paths of the declaring scopes.
    pub scopes: Vec<String>,
}

/// Result of [`ParamTree::lint_tokens`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    /// Short tokens first, then long tokens, each in declaration order.
    pub findings: Vec<LintFinding>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Whether any finding is an error or dangerous.
    pub fn has_problems(&self) -> bool {
        self.findings
            .iter()
            .any(|finding| finding.severity != Severity::Warning)
    }

    fn tokens_with(&self, severity: Severity) -> Vec<String> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == severity)
            .map(|finding| format!("'{}'", finding.token))
            .collect()
    }
}

impl fmt::Display for LintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen_long = false;
        for (i, finding) in self.findings.iter().enumerate() {
            let is_long = finding.token.starts_with("--");
            if is_long && !seen_long && i > 0 {
                writeln!(f)?;
            }
            seen_long |= is_long;
            let text = match finding.severity {
                Severity::Error => "Error:   Inconsistent use of required argument in",
                Severity::Danger => {
                    "Danger:  Inconsistent use of required argument (must always be prefixed by user) in"
                }
                Severity::Warning => "Warning: Possibly unintended double use in",
            };
            writeln!(f, "'{}':\n    {text}\n        {}", finding.token, finding.scopes.join(", "))?;
        }

        if self.has_problems() {
            let rule = "-".repeat(RULE_WIDTH);
            writeln!(f, "\n{rule}")?;
            let errors = self.tokens_with(Severity::Error);
            if !errors.is_empty() {
                writeln!(f, "There are errors in options {}", errors.join(", "))?;
            }
            let dangers = self.tokens_with(Severity::Danger);
            if !dangers.is_empty() {
                writeln!(f, "There are dangerous settings in options {}", dangers.join(", "))?;
            }
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

fn lint_group(
    tokens: IndexMap<String, Vec<(String, bool)>>,
    mismatch: Severity,
    dashes: &str,
    out: &mut Vec<LintFinding>,
) {
    for (token, uses) in tokens {
        if uses.len() < 2 {
            continue;
        }
        let first = uses[0].1;
        let severity = if uses.iter().all(|(_, has_arg)| *has_arg == first) {
            Severity::Warning
        } else {
            mismatch
        };
        out.push(LintFinding {
            token: format!("{dashes}{token}"),
            severity,
            scopes: uses.into_iter().map(|(scope, _)| scope).collect(),
        });
    }
}

impl ParamTree {
    /// Table of resolved values, one block per scope.
    ///
    /// ```text
    /// global        -> Verbose (-v, --verbose) : 2
    ///     alpha     -> Count   (-c, --count)   : 7
    /// ```
    pub fn param_report(&self, options: &ReportOptions) -> String {
        let mut lines = Vec::new();
        self.report_scope(self.root(), 0, "", options, &mut lines);

        let mut widths = [0usize; 3];
        for line in &lines {
            if let ReportLine::Row(cells, _) = line {
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        for line in lines {
            match line {
                ReportLine::Plain(text) => out.push_str(&text),
                ReportLine::Row(cells, value) => {
                    for (width, cell) in widths.iter().zip(&cells) {
                        out.push_str(&format!("{cell:<w$}", w = width + 1));
                    }
                    out.push_str(&value);
                }
            }
            out.push('\n');
        }
        out
    }

    fn report_scope(
        &self,
        scope: Scope<'_>,
        depth: usize,
        base: &str,
        options: &ReportOptions,
        lines: &mut Vec<ReportLine>,
    ) {
        let lead = " ".repeat(depth * options.indent);
        let name = if options.dotted && !base.is_empty() {
            format!("{base}.{}", scope.prefix())
        } else {
            scope.prefix().to_string()
        };

        if options.header {
            let rule = "-".repeat(RULE_WIDTH);
            lines.push(ReportLine::Plain(format!("{lead}{rule}")));
            lines.push(ReportLine::Plain(format!("{lead}{name}")));
            lines.push(ReportLine::Plain(format!("{lead}{rule}")));
        }

        for (key, value) in scope.items() {
            if !options.all_values && !scope.is_own_key(key) {
                continue;
            }
            let spellings = if options.command_line {
                scope.command_line_spellings(key, options.dotted, options.parent_options)
            } else {
                String::new()
            };
            let spellings = if spellings.is_empty() {
                spellings
            } else {
                format!("({spellings})")
            };
            lines.push(ReportLine::Row(
                [format!("{lead}{name}"), format!("-> {key}"), spellings],
                format!(": {}", shown_value(value)),
            ));
        }

        if options.recursive {
            for child in scope.children() {
                self.report_scope(child, depth + 1, &name, options, lines);
            }
        }
    }

    fn collect_tokens(&self, list: fn(Scope<'_>) -> Vec<String>, strip: char) -> Vec<String> {
        let used: BTreeSet<String> = self
            .scope_ids()
            .into_iter()
            .flat_map(|id| list(self.scope(id)))
            .map(|token| token.trim_end_matches(strip).to_string())
            .collect();
        used.into_iter().collect()
    }

    /// Short tokens declared anywhere in the tree, sorted (`-a`, `-v`).
    ///
    /// # Errors
    ///
    /// Returns the [`DeclarationError`] of a scope that does not compile.
    pub fn used_short_options(&mut self) -> Result<Vec<String>, DeclarationError> {
        self.prepare()?;
        Ok(self
            .collect_tokens(|scope| scope.short_options(), ':')
            .into_iter()
            .map(|c| format!("-{c}"))
            .collect())
    }

    /// Letters and digits no scope uses as a short token.
    ///
    /// # Errors
    ///
    /// As for [`used_short_options`](Self::used_short_options).
    pub fn free_short_options(&mut self) -> Result<Vec<String>, DeclarationError> {
        let used = self.used_short_options()?;
        Ok(SHORT_ALPHABET
            .chars()
            .map(|c| format!("-{c}"))
            .filter(|token| !used.contains(token))
            .collect())
    }

    /// Long tokens declared anywhere in the tree, sorted.
    ///
    /// # Errors
    ///
    /// As for [`used_short_options`](Self::used_short_options).
    pub fn used_long_options(&mut self) -> Result<Vec<String>, DeclarationError> {
        self.prepare()?;
        Ok(self
            .collect_tokens(|scope| scope.long_options().to_vec(), '=')
            .into_iter()
            .map(|long| format!("--{long}"))
            .collect())
    }

    /// Used short, free short and used long tokens as wrapped text.
    ///
    /// # Errors
    ///
    /// As for [`used_short_options`](Self::used_short_options).
    pub fn overview(&mut self) -> Result<String, DeclarationError> {
        let used_short = self.used_short_options()?;
        let free_short = self.free_short_options()?;
        let used_long = self.used_long_options()?;
        Ok(format!(
            "Used short options:\n{}\nFree short options:\n{}\nUsed long options:\n{}",
            wrapped(&used_short),
            wrapped(&free_short),
            wrapped(&used_long)
        ))
    }

    /// Finds tokens declared in more than one scope.
    ///
    /// # Errors
    ///
    /// As for [`used_short_options`](Self::used_short_options).
    pub fn lint_tokens(&mut self) -> Result<LintReport, DeclarationError> {
        self.prepare()?;
        let mut shorts: IndexMap<String, Vec<(String, bool)>> = IndexMap::new();
        let mut longs: IndexMap<String, Vec<(String, bool)>> = IndexMap::new();

        for id in self.scope_ids() {
            let scope = self.scope(id);
            let path = scope.full_prefix();
            for short in scope.short_options() {
                let (token, has_arg) = match short.strip_suffix(':') {
                    Some(token) => (token.to_string(), true),
                    None => (short, false),
                };
                shorts.entry(token).or_default().push((path.clone(), has_arg));
            }
            for long in scope.long_options() {
                let (token, has_arg) = match long.strip_suffix('=') {
                    Some(token) => (token, true),
                    None => (long.as_str(), false),
                };
                longs
                    .entry(token.to_string())
                    .or_default()
                    .push((path.clone(), has_arg));
            }
        }

        let mut findings = Vec::new();
        lint_group(shorts, Severity::Error, "-", &mut findings);
        lint_group(longs, Severity::Danger, "--", &mut findings);
        Ok(LintReport { findings })
    }
}
