//! JSON import and export of scope values.
//!
//! A single-scope document is a flat object `{name: value}`. A tree
//! document has one such object per scope, keyed by the scope's own name
//! (`{"global": {...}, "alpha": {...}}`). Imported values pass through the
//! same checks as command-line values.

use std::collections::BTreeMap;
use std::path::Path;

use argscope_core::{MessageKey, ParamError, Translation, Value};
use indexmap::IndexSet;
use serde::Serialize;
use serde_json::Value as Json;
use tracing::debug;

use crate::check::{CheckContext, Source, check_option, resolve_path};
use crate::error::Result;
use crate::tree::{ParamTree, ScopeId, ScopeNode};

/// Renders JSON with four-space indentation.
///
/// # Examples
///
/// ```
/// let doc = serde_json::json!({"b": 1, "a": [true]});
/// assert_eq!(
///     argscope::to_pretty_json(&doc).unwrap(),
///     "{\n    \"a\": [\n        true\n    ],\n    \"b\": 1\n}"
/// );
/// ```
pub fn to_pretty_json(value: &Json) -> std::result::Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Reads the JSON document named by an import option's value.
pub(crate) fn load_document(
    raw: &str,
    cwd: &Path,
    key: &str,
    tr: &Translation,
) -> std::result::Result<Json, ParamError> {
    let path = resolve_path(raw.trim(), cwd);
    let full = path.display().to_string();
    let fail = |msg_key: MessageKey, msg: &str| {
        tr.error(
            msg_key,
            &[
                ("OptionPath", raw),
                ("FullPath", full.as_str()),
                ("OptionName", key),
                ("wMsg", msg),
            ],
        )
    };

    if raw.trim().is_empty() || !path.is_file() {
        return Err(fail(MessageKey::PathNoFile, ""));
    }
    let text = std::fs::read_to_string(&path).map_err(|e| fail(MessageKey::JsonError, &e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| fail(MessageKey::JsonError, &e.to_string()))
}

fn exported(values: &BTreeMap<String, Value>) -> Json {
    Json::Object(
        values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect(),
    )
}

impl ParamTree {
    /// The scope's own values as a flat JSON object.
    pub fn export_scope(&self, id: ScopeId) -> Json {
        exported(&self.node(id).values)
    }

    /// Every scope's own values, keyed by scope name.
    ///
    /// Keys are the bare scope names, not dotted paths. When two scopes in
    /// different branches share a name, the one later in pre-order wins and
    /// the other is missing from the document.
    pub fn export_tree(&self) -> Json {
        Json::Object(
            self.pre_order(ScopeId::ROOT)
                .into_iter()
                .map(|id| (self.node(id).prefix.clone(), self.export_scope(id)))
                .collect(),
        )
    }

    /// Assigns the declared options found in `document` to scope `id`.
    ///
    /// Values are checked like command-line values; a list fills a
    /// `multiple` option element by element. Nothing is written unless
    /// every value is valid.
    pub(crate) fn assign_document(
        &mut self,
        id: ScopeId,
        document: &serde_json::Map<String, Json>,
        origin: &str,
    ) -> std::result::Result<(), ParamError> {
        let node = self.node(id);
        let Some(compiled) = node.compiled.as_ref() else {
            return Ok(());
        };
        let ctx = CheckContext {
            translation: &node.translation,
            cwd: &compiled.cwd,
        };
        let mut values = node.values.clone();

        for (name, option) in &node.options {
            if option.option_type.is_special() {
                continue;
            }
            let Some(json) = document.get(name) else {
                continue;
            };
            let key = format!("{name} (imported from {origin} [{}])", node.prefix);
            match json {
                Json::Null => {
                    values.insert(name.clone(), Value::Null);
                }
                Json::Array(items) => {
                    if option.multiple {
                        values.insert(name.clone(), Value::List(Vec::new()));
                    }
                    for item in items {
                        let raw = Value::from_json(item).to_raw();
                        check_option(&mut values, name, &key, option, &raw, Source::Import, &ctx)?;
                    }
                }
                scalar => {
                    if option.multiple {
                        values.insert(name.clone(), Value::List(Vec::new()));
                    }
                    let raw = Value::from_json(scalar).to_raw();
                    check_option(&mut values, name, &key, option, &raw, Source::Import, &ctx)?;
                }
            }
            debug!(scope = %node.prefix, option = %name, "imported value");
        }

        self.node_mut(id).values = values;
        Ok(())
    }

    /// Imports a flat document into one scope.
    ///
    /// # Errors
    ///
    /// Returns [`Declaration`](crate::Error::Declaration) if the tree does
    /// not compile and [`Param`](crate::Error::Param) for a value that fails
    /// its checks; in that case the scope is unchanged.
    pub fn import_json(&mut self, id: ScopeId, document: &Json) -> Result<()> {
        self.prepare()?;
        if let Some(map) = document.as_object() {
            self.assign_document(id, map, "document")?;
        }
        Ok(())
    }

    /// Imports a document keyed by scope name into every scope.
    ///
    /// # Errors
    ///
    /// As for [`import_json`](Self::import_json). Scopes imported before
    /// the failing one keep their new values.
    pub fn global_import_json(&mut self, document: &Json) -> Result<()> {
        self.prepare()?;
        self.assign_tree_document(document, "document")?;
        Ok(())
    }

    pub(crate) fn assign_tree_document(
        &mut self,
        document: &Json,
        origin: &str,
    ) -> std::result::Result<(), ParamError> {
        for id in self.pre_order(ScopeId::ROOT) {
            let sub = document
                .get(self.node(id).prefix.as_str())
                .and_then(Json::as_object);
            if let Some(sub) = sub {
                self.assign_document(id, sub, origin)?;
            }
        }
        Ok(())
    }

    /// Positional arguments that every scope left over, in order.
    pub fn remainder(&self) -> Vec<String> {
        self.intersect(|node| node.remainder.as_slice())
    }

    /// Option tokens that no scope recognized, in order.
    pub fn unused_args(&self) -> Vec<String> {
        self.intersect(|node| node.unused.as_slice())
    }

    fn intersect(&self, list: fn(&ScopeNode) -> &[String]) -> Vec<String> {
        let mut ids = self.pre_order(ScopeId::ROOT).into_iter();
        let Some(first) = ids.next() else {
            return Vec::new();
        };
        let mut common: IndexSet<&str> = list(self.node(first)).iter().map(String::as_str).collect();
        for id in ids {
            let other: IndexSet<&str> = list(self.node(id)).iter().map(String::as_str).collect();
            common.retain(|item| other.contains(item));
        }
        common.into_iter().map(str::to_string).collect()
    }
}
