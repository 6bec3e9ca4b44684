//! The processing engine.
//!
//! [`ParamTree::process`] runs the argument list through every scope:
//!
//! 1. Every scope tokenizes the arguments, parents before children. Long
//!    options are also offered with each dotted scope prefix found in the
//!    arguments (`--alpha.auto`), and a dotted token is only kept by the
//!    scope it names.
//! 2. The first help or license token, scanning scopes parents first, ends
//!    processing with its text.
//! 3. Tokens no scope recognized fail the call (or are kept for
//!    [`ParamTree::unused_args`]).
//! 4. Global and single-scope imports are applied, parents first.
//! 5. Scopes assign their values, children before parents, render exports
//!    and enforce required options.

use std::collections::{BTreeMap, HashMap, HashSet};

use argscope_core::{MessageKey, OptionType, ParamError, Translation, Value};
use tracing::{debug, info, trace};

use crate::check::{CheckContext, Source, check_option, increment_counter, resolve_path};
use crate::error::Result;
use crate::getopt::Getopt;
use crate::transfer::{load_document, to_pretty_json};
use crate::tree::{ParamTree, ScopeId};

/// What a terminal option asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Help,
    License,
    FullLicense,
    Export,
    GlobalExport,
}

/// Output produced by a terminal option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalAction {
    pub kind: TerminalKind,
    /// Full path of the scope that resolved the option.
    pub scope: String,
    /// Text to show the user.
    pub text: String,
}

/// Result of [`ParamTree::process`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// All values are assigned.
    Completed,
    /// A help, license or export option was given. The caller should show
    /// the texts and stop.
    Terminal(Vec<TerminalAction>),
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Terminal(_))
    }

    pub fn actions(&self) -> &[TerminalAction] {
        match self {
            Outcome::Completed => &[],
            Outcome::Terminal(actions) => actions,
        }
    }

    /// Texts of all terminal actions, one after the other.
    pub fn output(&self) -> String {
        self.actions()
            .iter()
            .map(|action| action.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Scope names given as dotted long options, in order of appearance.
///
/// Only names of existing scopes are returned; other dotted options stay
/// unrecognized. A dotted option naming a scope must have exactly two
/// parts.
fn dotted_prefixes(
    args: &[String],
    scopes: &HashSet<&str>,
    tr: &Translation,
) -> std::result::Result<Vec<String>, ParamError> {
    let mut prefixes: Vec<String> = Vec::new();
    for arg in args {
        if arg == "--" {
            break;
        }
        let Some(long) = arg.strip_prefix("--") else {
            continue;
        };
        let name = long.split_once('=').map_or(long, |(name, _)| name);
        let Some((prefix, rest)) = name.split_once('.') else {
            continue;
        };
        if !scopes.contains(prefix) {
            continue;
        }
        if rest.is_empty() || rest.contains('.') {
            return Err(tr.error(MessageKey::PrefixError, &[("OptionName", arg.as_str())]));
        }
        if !prefixes.iter().any(|p| p == prefix) {
            prefixes.push(prefix.to_string());
        }
    }
    Ok(prefixes)
}

/// Maps a resolved token to the form this scope registered.
///
/// `--alpha.auto` becomes `--auto` in scope `alpha` and is dropped
/// elsewhere. Other tokens pass through.
fn strip_scope(token: &str, own: &str, ctx: &CheckContext<'_>) -> std::result::Result<Option<String>, ParamError> {
    let Some(long) = token.strip_prefix("--") else {
        return Ok(Some(token.to_string()));
    };
    if !long.contains('.') {
        return Ok(Some(token.to_string()));
    }
    let parts: Vec<&str> = long.split('.').collect();
    if parts.len() != 2 {
        return Err(ctx
            .translation
            .error(MessageKey::PrefixError, &[("OptionName", token)]));
    }
    Ok((parts[0] == own).then(|| format!("--{}", parts[1])))
}

type Resolved = Vec<(String, String)>;

fn tokens_of(resolved: &HashMap<ScopeId, Resolved>, id: ScopeId) -> &[(String, String)] {
    resolved.get(&id).map(Vec::as_slice).unwrap_or_default()
}

impl ParamTree {
    /// Processes the argument list.
    ///
    /// Every scope starts from its defaults. On success the values are
    /// readable through [`scope`](Self::scope); a help, license or export
    /// option yields [`Outcome::Terminal`] with the text to show.
    ///
    /// # Errors
    ///
    /// Returns [`Declaration`](crate::Error::Declaration) for an invalid
    /// declaration and [`Param`](crate::Error::Param) for invalid input:
    /// an unknown or ambiguous option, a bad value, a failed import or a
    /// missing required option.
    pub fn process(&mut self) -> Result<Outcome> {
        self.prepare()?;
        for node in &mut self.nodes {
            if let Some(compiled) = &node.compiled {
                node.values = compiled.defaults.clone();
            }
        }

        let order = self.pre_order(ScopeId::ROOT);
        let resolved = self.tokenize_all(&order)?;

        for &id in &order {
            if let Some(action) = self.first_terminal(id, tokens_of(&resolved, id)) {
                info!(scope = %action.scope, kind = ?action.kind, "terminal option");
                return Ok(Outcome::Terminal(vec![action]));
            }
        }

        let unused = self.unused_args();
        if !unused.is_empty() && self.settings.error_on_unknown {
            let listed = unused
                .iter()
                .map(|token| format!("'{token}'"))
                .collect::<Vec<_>>()
                .join(", ");
            let key = if unused.len() > 1 {
                MessageKey::UndefinedOptionMultiple
            } else {
                MessageKey::UndefinedOptionSingle
            };
            let tr = &self.node(ScopeId::ROOT).translation;
            return Err(tr.error(key, &[("OptStr", listed.as_str())]).into());
        }

        for &id in &order {
            self.run_imports(id, tokens_of(&resolved, id))?;
        }

        let mut actions = Vec::new();
        for id in self.post_order(ScopeId::ROOT) {
            if let Some(action) = self.assign_values(id, tokens_of(&resolved, id))? {
                info!(scope = %action.scope, kind = ?action.kind, "terminal option");
                actions.push(action);
            }
        }

        Ok(if actions.is_empty() {
            Outcome::Completed
        } else {
            Outcome::Terminal(actions)
        })
    }

    /// Tokenizes the arguments for every scope in `order`.
    fn tokenize_all(&mut self, order: &[ScopeId]) -> Result<HashMap<ScopeId, Resolved>> {
        let prefixes = {
            let scopes: HashSet<&str> = self.nodes.iter().map(|node| node.prefix.as_str()).collect();
            dotted_prefixes(&self.args, &scopes, &self.node(ScopeId::ROOT).translation)?
        };

        let mut all = HashMap::with_capacity(order.len());
        for &id in order {
            let node = self.node(id);
            let Some(compiled) = node.compiled.as_ref() else {
                continue;
            };
            let table = &compiled.tokens;
            let mut longs = table.long_options().to_vec();
            for prefix in &prefixes {
                longs.extend(table.long_options().iter().map(|long| format!("{prefix}.{long}")));
            }

            let tokens = Getopt::new(table.short_spec(), &longs, &node.translation)
                .accept_unknown(true)
                .scan(&self.args)?;

            let ctx = CheckContext {
                translation: &node.translation,
                cwd: &compiled.cwd,
            };
            let mut own = Vec::with_capacity(tokens.options.len());
            for (token, value) in tokens.options {
                if let Some(token) = strip_scope(&token, &node.prefix, &ctx)? {
                    own.push((token, value));
                }
            }
            debug!(
                scope = %node.prefix,
                options = own.len(),
                positional = tokens.positional.len(),
                unknown = tokens.unknown.len(),
                "tokenized arguments"
            );

            let node = self.node_mut(id);
            node.remainder = tokens.positional;
            node.unused = tokens.unknown;
            all.insert(id, own);
        }
        Ok(all)
    }

    /// First help or license token of a scope, rendered.
    fn first_terminal(&self, id: ScopeId, tokens: &[(String, String)]) -> Option<TerminalAction> {
        let table = self.scope(id).token_table()?;
        for (token, _) in tokens {
            let kind = match table.resolve(token) {
                Some((_, OptionType::Help)) => TerminalKind::Help,
                Some((_, OptionType::License)) => TerminalKind::License,
                Some((_, OptionType::FullLicense)) => TerminalKind::FullLicense,
                _ => continue,
            };
            let text = match kind {
                TerminalKind::Help => self.render_usage(id),
                TerminalKind::License => self.settings.license.first().cloned().unwrap_or_default(),
                _ => self.settings.license.join("\n"),
            };
            return Some(TerminalAction {
                kind,
                scope: self.scope(id).full_prefix(),
                text,
            });
        }
        None
    }

    fn run_imports(&mut self, id: ScopeId, tokens: &[(String, String)]) -> Result<()> {
        for kind in [OptionType::GlobalImport, OptionType::Import] {
            for (token, raw) in tokens {
                let node = self.node(id);
                let Some(compiled) = node.compiled.as_ref() else {
                    return Ok(());
                };
                if compiled.tokens.resolve(token).map(|(_, ty)| ty) != Some(kind) {
                    continue;
                }
                let document = load_document(raw, &compiled.cwd, token, &node.translation)?;
                let origin = resolve_path(raw.trim(), &compiled.cwd).display().to_string();
                let Some(map) = document.as_object() else {
                    return Err(node
                        .translation
                        .error(
                            MessageKey::JsonError,
                            &[
                                ("OptionPath", raw.as_str()),
                                ("FullPath", origin.as_str()),
                                ("OptionName", token.as_str()),
                                ("wMsg", "expected an object"),
                            ],
                        )
                        .into());
                };
                debug!(scope = %node.prefix, file = %origin, kind = ?kind, "importing");
                if kind == OptionType::GlobalImport {
                    self.assign_tree_document(&document, &origin)?;
                } else {
                    self.assign_document(id, map, &origin)?;
                }
            }
        }
        Ok(())
    }

    /// Assigns a scope's command-line values, then handles exports and
    /// required options.
    fn assign_values(&mut self, id: ScopeId, tokens: &[(String, String)]) -> Result<Option<TerminalAction>> {
        let node = self.node(id);
        let Some(compiled) = node.compiled.as_ref() else {
            return Ok(None);
        };
        let ctx = CheckContext {
            translation: &node.translation,
            cwd: &compiled.cwd,
        };
        let mut values: BTreeMap<String, Value> = node.values.clone();

        for (token, raw) in tokens {
            let Some((name, ty)) = compiled.tokens.resolve(token) else {
                continue;
            };
            if ty.is_special() {
                continue;
            }
            let Some(option) = node.options.get(name) else {
                continue;
            };
            let source = Source::of_token(token);

            if option.needs_value() {
                check_option(&mut values, name, token, option, raw, source, &ctx)?;
                trace!(scope = %node.prefix, option = %name, "assigned value");
                if ty != OptionType::Counter {
                    continue;
                }
            }

            match ty {
                OptionType::Bool => {
                    let default = option.default.as_ref().and_then(Value::as_bool).unwrap_or(false);
                    values.insert(name.to_string(), Value::Bool(!default));
                }
                OptionType::Counter => {
                    if source == Source::Short {
                        increment_counter(&mut values, name, token, option, ctx.translation)?;
                    }
                }
                _ => {
                    return Err(ctx
                        .translation
                        .error(MessageKey::OptionNotDefined, &[("OptionName", token.as_str())])
                        .into());
                }
            }
            trace!(scope = %node.prefix, option = %name, "assigned value");
        }

        let export = tokens.iter().find_map(|(token, _)| match compiled.tokens.resolve(token) {
            Some((_, OptionType::GlobalExport)) => Some(TerminalKind::GlobalExport),
            Some((_, OptionType::Export)) => Some(TerminalKind::Export),
            _ => None,
        });

        self.node_mut(id).values = values;

        if let Some(kind) = export {
            let document = match kind {
                TerminalKind::GlobalExport => self.export_tree(),
                _ => self.export_scope(id),
            };
            return Ok(Some(TerminalAction {
                kind,
                scope: self.scope(id).full_prefix(),
                text: to_pretty_json(&document)?,
            }));
        }

        let scope = self.scope(id);
        for (name, option) in scope.definition() {
            if option.required && !scope.contains(name) {
                let spellings = scope.command_line_spellings(name, !scope.is_root(), false);
                return Err(scope
                    .translation()
                    .error(
                        MessageKey::OptionRequired,
                        &[("DefArgName", name.as_str()), ("ParList", spellings.as_str())],
                    )
                    .into());
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argscope_core::{OptionMap, OptionSchema};

    #[test]
    fn test_dotted_prefixes_only_name_known_scopes() {
        let scopes: HashSet<&str> = ["global", "alpha"].into_iter().collect();
        let args: Vec<String> = ["--alpha.x=1", "--beta.y", "--alpha.z", "--global.q", "--", "--alpha.w"]
            .map(String::from)
            .to_vec();
        let table = Translation::english();
        assert_eq!(dotted_prefixes(&args, &scopes, &table).unwrap(), vec!["alpha", "global"]);

        let args = vec!["--alpha.x.y=1".to_string()];
        let err = dotted_prefixes(&args, &scopes, &table).unwrap_err();
        assert_eq!(err.key(), MessageKey::PrefixError);
        assert_eq!(err.to_string(), "Error in prefixed parameter --alpha.x.y=1");
    }

    #[test]
    fn test_strip_scope() {
        let table = Translation::english();
        let cwd = std::env::temp_dir();
        let ctx = CheckContext {
            translation: &table,
            cwd: &cwd,
        };
        assert_eq!(strip_scope("--alpha.x", "alpha", &ctx).unwrap(), Some("--x".into()));
        assert_eq!(strip_scope("--alpha.x", "global", &ctx).unwrap(), None);
        assert_eq!(strip_scope("--x", "alpha", &ctx).unwrap(), Some("--x".into()));
        assert_eq!(strip_scope("-x", "alpha", &ctx).unwrap(), Some("-x".into()));
        let err = strip_scope("--a.b.c", "a", &ctx).unwrap_err();
        assert_eq!(err.key(), MessageKey::PrefixError);
    }

    #[test]
    fn test_outcome_output_joins_texts() {
        let outcome = Outcome::Terminal(vec![
            TerminalAction {
                kind: TerminalKind::Export,
                scope: "global.alpha".into(),
                text: "{}".into(),
            },
            TerminalAction {
                kind: TerminalKind::Export,
                scope: "global".into(),
                text: "{}".into(),
            },
        ]);
        assert!(outcome.is_terminal());
        assert_eq!(outcome.output(), "{}\n{}");
        assert_eq!(Outcome::Completed.output(), "");
    }

    #[test]
    fn test_bool_flips_declared_default() {
        let mut options = OptionMap::new();
        options.insert(
            "Color".into(),
            OptionSchema::flag(Some("c"), Some("color")).with_default(true),
        );
        let mut tree = ParamTree::new(options);
        tree.set_args(["-c"]);
        tree.process().unwrap();
        assert_eq!(tree.root().get("Color"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_values_reset_between_runs() {
        let mut options = OptionMap::new();
        options.insert(
            "Verbose".into(),
            OptionSchema::new(OptionType::Counter).with_short("v"),
        );
        let mut tree = ParamTree::new(options);
        tree.set_args(["-vv"]);
        tree.process().unwrap();
        tree.process().unwrap();
        assert_eq!(tree.root().get("Verbose"), Some(&Value::Int(2)));
    }
}
