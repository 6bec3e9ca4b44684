//! The scope tree.
//!
//! A [`ParamTree`] owns every scope in an arena. The root scope is named
//! `global`; children are added with [`ParamTree::add_child`] and addressed
//! by [`ScopeId`]. Each scope keeps its own declaration, compiled tables and
//! value map. Reads through a [`Scope`] fall back to the ancestors, nearest
//! first, so a child sees every value bound above it.
//!
//! Scopes compile lazily: changing a declaration, description, the argument
//! list or the message table marks the affected scopes dirty and the next
//! [`ParamTree::prepare`] (called by every operation that needs the tables)
//! recompiles them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use argscope_core::{
    DeclarationError, GLOBAL_SCOPE, OptionMap, OptionSchema, ScopeDeclaration, Translation, Value,
    validate_child_name,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::compile::{CompileContext, CompiledScope, TokenTable, compile};
use crate::config::ParserSettings;
use crate::error::Result;

/// Handle of a scope inside a [`ParamTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    /// The root scope.
    pub const ROOT: ScopeId = ScopeId(0);
}

#[derive(Debug, Clone)]
pub(crate) struct ScopeNode {
    pub prefix: String,
    pub parent: Option<ScopeId>,
    pub children: IndexMap<String, ScopeId>,
    pub options: OptionMap,
    pub description: String,
    pub additional_usage: String,
    pub translation: Arc<Translation>,
    /// `None` until compiled and again after every change.
    pub compiled: Option<CompiledScope>,
    pub values: BTreeMap<String, Value>,
    /// Positional arguments seen by this scope's tokenizer.
    pub remainder: Vec<String>,
    /// Option tokens this scope's tokenizer did not recognize.
    pub unused: Vec<String>,
}

impl ScopeNode {
    fn new(prefix: String, parent: Option<ScopeId>, options: OptionMap, translation: Arc<Translation>) -> Self {
        Self {
            prefix,
            parent,
            children: IndexMap::new(),
            options,
            description: String::new(),
            additional_usage: String::new(),
            translation,
            compiled: None,
            values: BTreeMap::new(),
            remainder: Vec::new(),
            unused: Vec::new(),
        }
    }
}

/// A tree of option scopes with a shared argument list.
///
/// # Examples
///
/// ```
/// use argscope::{OptionMap, OptionSchema, OptionType, ParamTree, ScopeId, Value};
///
/// let mut root = OptionMap::new();
/// root.insert("Auto".into(), OptionSchema::flag(Some("a"), Some("auto")).needing_value());
/// let mut alpha = OptionMap::new();
/// alpha.insert("DoAuto".into(), OptionSchema::flag(None, Some("auto")).needing_value());
///
/// let mut tree = ParamTree::new(root);
/// let child = tree.add_child(ScopeId::ROOT, "Alpha", alpha).unwrap();
/// tree.set_args(["--alpha.auto=yes", "--global.auto=no"]);
/// assert!(!tree.process().unwrap().is_terminal());
///
/// assert_eq!(tree.root().get("Auto"), Some(&Value::Bool(false)));
/// assert_eq!(tree.scope(child).get("DoAuto"), Some(&Value::Bool(true)));
/// assert_eq!(tree.scope(child).full_prefix(), "global.alpha");
/// ```
#[derive(Debug, Clone)]
pub struct ParamTree {
    pub(crate) nodes: Vec<ScopeNode>,
    pub(crate) args: Vec<String>,
    pub(crate) settings: ParserSettings,
    pub(crate) program_name: String,
    pub(crate) working_dir: Option<PathBuf>,
}

fn program_from_argv0(argv0: &str) -> String {
    Path::new(argv0)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ParamTree {
    /// Creates a tree whose root scope declares `options`.
    pub fn new(options: OptionMap) -> Self {
        Self::with_settings(options, ParserSettings::default())
    }

    /// Creates a tree with explicit settings.
    pub fn with_settings(options: OptionMap, settings: ParserSettings) -> Self {
        let translation = Arc::new(settings.translation_table());
        let mut root = ScopeNode::new(GLOBAL_SCOPE.to_string(), None, options, translation);
        root.description = settings.description.clone();
        root.additional_usage = settings.additional_usage.clone();
        let program_name = match &settings.program_name {
            Some(name) => name.clone(),
            None => std::env::args()
                .next()
                .map(|argv0| program_from_argv0(&argv0))
                .unwrap_or_default(),
        };
        Self {
            nodes: vec![root],
            args: Vec::new(),
            settings,
            program_name,
            working_dir: None,
        }
    }

    /// Builds a tree from a parsed declaration document.
    ///
    /// # Errors
    ///
    /// Fails when a child name is invalid or used twice.
    pub fn from_declaration(
        declaration: &ScopeDeclaration,
        settings: ParserSettings,
    ) -> std::result::Result<Self, DeclarationError> {
        let mut tree = Self::with_settings(declaration.options.clone(), settings);
        if let Some(description) = &declaration.description {
            tree.nodes[0].description = description.clone();
        }
        if let Some(additional) = &declaration.additional_usage {
            tree.nodes[0].additional_usage = additional.clone();
        }
        tree.add_declared_children(ScopeId::ROOT, declaration)?;
        Ok(tree)
    }

    /// Parses a JSON declaration document with the remaps of `settings` and
    /// builds the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Declaration`](crate::Error::Declaration) when the remaps
    /// clash or the document is not a valid declaration.
    pub fn from_document(document: &serde_json::Value, settings: ParserSettings) -> Result<Self> {
        let keys = settings.declaration_keys()?;
        let modes = settings.mode_codes()?;
        let declaration = ScopeDeclaration::parse(document, &keys, &modes)?;
        Ok(Self::from_declaration(&declaration, settings)?)
    }

    fn add_declared_children(
        &mut self,
        parent: ScopeId,
        declaration: &ScopeDeclaration,
    ) -> std::result::Result<(), DeclarationError> {
        for (name, child) in &declaration.children {
            let id = self.add_child(parent, name, child.options.clone())?;
            if let Some(description) = &child.description {
                self.nodes[id.0].description = description.clone();
            }
            if let Some(additional) = &child.additional_usage {
                self.nodes[id.0].additional_usage = additional.clone();
            }
            self.add_declared_children(id, child)?;
        }
        Ok(())
    }

    /// Adds a child scope below `parent`.
    ///
    /// The name is trimmed and lowercased; it must not be blank, `global`,
    /// contain a dot or whitespace, or repeat a sibling's name. The child
    /// shares the parent's message table.
    ///
    /// # Errors
    ///
    /// Returns a [`DeclarationError`] for an invalid name.
    pub fn add_child(
        &mut self,
        parent: ScopeId,
        name: &str,
        options: OptionMap,
    ) -> std::result::Result<ScopeId, DeclarationError> {
        let parent_node = &self.nodes[parent.0];
        let prefix = validate_child_name(name, parent_node.children.keys().map(String::as_str))
            .map_err(|e| DeclarationError::from_validation(self.scope(parent).full_prefix(), e))?;

        let id = ScopeId(self.nodes.len());
        let translation = Arc::clone(&parent_node.translation);
        self.nodes.push(ScopeNode::new(prefix.clone(), Some(parent), options, translation));
        self.nodes[parent.0].children.insert(prefix, id);
        debug!(scope = %self.scope(id).full_prefix(), "added child scope");
        Ok(id)
    }

    pub(crate) fn mark_dirty(&mut self, id: ScopeId) {
        self.nodes[id.0].compiled = None;
    }

    pub(crate) fn mark_all_dirty(&mut self) {
        for node in &mut self.nodes {
            node.compiled = None;
        }
    }

    /// Replaces the declaration of a scope.
    pub fn set_schema(&mut self, id: ScopeId, options: OptionMap) {
        self.nodes[id.0].options = options;
        self.mark_dirty(id);
    }

    /// Adds or replaces a single option of a scope.
    pub fn insert_option(&mut self, id: ScopeId, name: &str, option: OptionSchema) {
        self.nodes[id.0].options.insert(name.to_string(), option);
        self.mark_dirty(id);
    }

    /// Sets the text shown above a scope's options.
    pub fn set_description(&mut self, id: ScopeId, description: &str) {
        self.nodes[id.0].description = description.to_string();
        self.mark_dirty(id);
    }

    /// Sets the text after `[OPTIONS ...]` in the usage line.
    pub fn set_additional_usage(&mut self, id: ScopeId, text: &str) {
        self.nodes[id.0].additional_usage = text.to_string();
        self.mark_dirty(id);
    }

    /// Sets the arguments to process, without the program name.
    pub fn set_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self.mark_all_dirty();
    }

    /// Takes program name and arguments from the process environment.
    pub fn set_args_from_env(&mut self) {
        let mut args = std::env::args();
        if let Some(argv0) = args.next() {
            if self.settings.program_name.is_none() {
                self.program_name = program_from_argv0(&argv0);
            }
        }
        self.set_args(args);
    }

    /// The arguments to process.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Replaces the message table of `id` and every scope below it.
    pub fn set_translation(&mut self, id: ScopeId, translation: Translation) {
        let shared = Arc::new(translation);
        for scope in self.subtree(id) {
            self.nodes[scope.0].translation = Arc::clone(&shared);
            self.mark_dirty(scope);
        }
    }

    /// Turns zero defaults on or off for every scope.
    pub fn set_populate_all(&mut self, populate_all: bool) {
        self.settings.populate_all = populate_all;
        self.mark_all_dirty();
    }

    /// Chooses between failing on and collecting unknown options.
    pub fn set_error_on_unknown(&mut self, error_on_unknown: bool) {
        self.settings.error_on_unknown = error_on_unknown;
    }

    /// Usage detail: 0 plain, 1 defaults, 2 types, 3 types and defaults.
    pub fn set_help_type(&mut self, help_type: u8) {
        self.settings.help_type = help_type;
    }

    pub fn set_show_prefix_on_help(&mut self, show: bool) {
        self.settings.show_prefix_on_help = show;
    }

    pub fn set_version(&mut self, version: &str) {
        self.settings.version = version.to_string();
    }

    /// License texts; the first entry is the short license.
    pub fn set_license(&mut self, license: Vec<String>) {
        self.settings.license = license;
    }

    pub fn set_program_name(&mut self, name: &str) {
        self.program_name = name.to_string();
    }

    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Directory relative paths are resolved against; defaults to the
    /// process working directory at compile time.
    pub fn set_working_dir(&mut self, dir: impl Into<PathBuf>) {
        self.working_dir = Some(dir.into());
        self.mark_all_dirty();
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    /// Compiles every dirty scope, children before parents.
    ///
    /// A recompiled scope's values are reset to its defaults. Clean scopes
    /// are left untouched, so calling this twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the first [`DeclarationError`], naming the scope path.
    pub fn prepare(&mut self) -> std::result::Result<(), DeclarationError> {
        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_default(),
        };
        for id in self.post_order(ScopeId::ROOT) {
            if self.nodes[id.0].compiled.is_some() {
                continue;
            }
            let scope_path = self.scope(id).full_prefix();
            let ctx = CompileContext {
                is_root: id == ScopeId::ROOT,
                scope_path: &scope_path,
                populate_all: self.settings.populate_all,
                cwd: &cwd,
            };
            let compiled = compile(&self.nodes[id.0].options, &ctx)?;
            debug!(scope = %scope_path, options = self.nodes[id.0].options.len(), "compiled scope");
            let node = &mut self.nodes[id.0];
            node.values = compiled.defaults.clone();
            node.remainder.clear();
            node.unused.clear();
            node.compiled = Some(compiled);
        }
        Ok(())
    }

    /// Whether every scope is compiled.
    pub fn is_prepared(&self) -> bool {
        self.nodes.iter().all(|node| node.compiled.is_some())
    }

    /// `id` and every scope below it, parents before children.
    pub(crate) fn pre_order(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.values().rev().copied());
        }
        out
    }

    /// `id` and every scope below it, children before parents.
    pub(crate) fn post_order(&self, id: ScopeId) -> Vec<ScopeId> {
        fn walk(tree: &ParamTree, id: ScopeId, out: &mut Vec<ScopeId>) {
            for child in tree.nodes[id.0].children.values() {
                walk(tree, *child, out);
            }
            out.push(id);
        }
        let mut out = Vec::new();
        walk(self, id, &mut out);
        out
    }

    fn subtree(&self, id: ScopeId) -> Vec<ScopeId> {
        self.pre_order(id)
    }

    /// Read access to a scope.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn scope(&self, id: ScopeId) -> Scope<'_> {
        assert!(id.0 < self.nodes.len(), "scope id out of range");
        Scope { tree: self, id }
    }

    /// Read access to the root scope.
    pub fn root(&self) -> Scope<'_> {
        self.scope(ScopeId::ROOT)
    }

    /// Every scope id, parents before children.
    pub fn scope_ids(&self) -> Vec<ScopeId> {
        self.pre_order(ScopeId::ROOT)
    }

    /// Finds a scope by dotted path (`alpha.gamma` or `global.alpha.gamma`).
    pub fn find(&self, path: &str) -> Option<ScopeId> {
        let path = path.trim();
        let rest = match path.strip_prefix(GLOBAL_SCOPE) {
            Some("") => return Some(ScopeId::ROOT),
            Some(rest) => rest.strip_prefix('.')?,
            None if path.is_empty() => return Some(ScopeId::ROOT),
            None => path,
        };
        let mut current = ScopeId::ROOT;
        for part in rest.split('.') {
            current = *self.nodes[current.0].children.get(part)?;
        }
        Some(current)
    }

    /// Binds `value` to `name` in the scope's own map.
    pub fn set(&mut self, id: ScopeId, name: &str, value: impl Into<Value>) {
        self.nodes[id.0].values.insert(name.to_string(), value.into());
    }

    /// Removes `name` from the scope's own map.
    pub fn remove(&mut self, id: ScopeId, name: &str) -> Option<Value> {
        self.nodes[id.0].values.remove(name)
    }

    pub(crate) fn node(&self, id: ScopeId) -> &ScopeNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: ScopeId) -> &mut ScopeNode {
        &mut self.nodes[id.0]
    }
}

/// Read-only view of one scope.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    tree: &'a ParamTree,
    id: ScopeId,
}

impl<'a> Scope<'a> {
    fn node(&self) -> &'a ScopeNode {
        &self.tree.nodes[self.id.0]
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Own scope name (`global` for the root).
    pub fn prefix(&self) -> &'a str {
        &self.node().prefix
    }

    /// Dotted path of the ancestors (`global.alpha`); empty for the root.
    pub fn parents(&self) -> String {
        match self.parent() {
            Some(parent) => parent.full_prefix(),
            None => String::new(),
        }
    }

    /// Dotted path including this scope (`global.alpha.gamma`).
    pub fn full_prefix(&self) -> String {
        let parents = self.parents();
        if parents.is_empty() {
            self.prefix().to_string()
        } else {
            format!("{parents}.{}", self.prefix())
        }
    }

    /// Dotted path without the root (`alpha.gamma`); empty for the root.
    pub fn part_prefix(&self) -> String {
        let full = self.full_prefix();
        match full.strip_prefix(GLOBAL_SCOPE) {
            Some(rest) => rest.trim_start_matches('.').to_string(),
            None => full,
        }
    }

    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    pub fn parent(&self) -> Option<Scope<'a>> {
        self.node().parent.map(|id| Scope {
            tree: self.tree,
            id,
        })
    }

    /// Direct children in insertion order.
    pub fn children(self) -> impl Iterator<Item = Scope<'a>> {
        let tree = self.tree;
        self.node()
            .children
            .values()
            .map(move |id| Scope { tree, id: *id })
    }

    /// Direct child by name.
    pub fn child(&self, name: &str) -> Option<Scope<'a>> {
        let id = *self.node().children.get(name)?;
        Some(Scope {
            tree: self.tree,
            id,
        })
    }

    /// The declared options.
    pub fn definition(&self) -> &'a OptionMap {
        &self.node().options
    }

    pub fn option(&self, name: &str) -> Option<&'a OptionSchema> {
        self.node().options.get(name)
    }

    pub fn description(&self) -> &'a str {
        &self.node().description
    }

    pub fn translation(&self) -> &'a Translation {
        &self.node().translation
    }

    /// Value of `name`: own map first, then each ancestor, nearest first.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let mut current = Some(*self);
        while let Some(scope) = current {
            if let Some(value) = scope.node().values.get(name) {
                return Some(value);
            }
            current = scope.parent();
        }
        None
    }

    /// Like [`get`](Self::get), then depth-first through the whole tree
    /// from the root.
    pub fn search(&self, name: &str) -> Option<&'a Value> {
        let tree = self.tree;
        self.get(name).or_else(|| {
            tree.pre_order(ScopeId::ROOT)
                .into_iter()
                .find_map(|id| tree.nodes[id.0].values.get(name))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names visible in this scope (own and inherited), sorted.
    pub fn keys(&self) -> Vec<&'a str> {
        let mut keys = BTreeSet::new();
        let mut current = Some(*self);
        while let Some(scope) = current {
            keys.extend(scope.node().values.keys().map(String::as_str));
            current = scope.parent();
        }
        keys.into_iter().collect()
    }

    /// Visible values, sorted by name; own values shadow inherited ones.
    pub fn items(&self) -> Vec<(&'a str, &'a Value)> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
            .collect()
    }

    /// Values bound in this scope itself.
    pub fn own_values(&self) -> &'a BTreeMap<String, Value> {
        &self.node().values
    }

    pub fn is_own_key(&self, name: &str) -> bool {
        self.node().values.contains_key(name)
    }

    pub fn is_inherited(&self, name: &str) -> bool {
        !self.is_own_key(name)
    }

    /// Number of visible names.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Command-line spellings of an option, e.g. `-h, --help`.
    ///
    /// With `dotted` long tokens show the scope (`--[alpha.]help`). With
    /// `parents` an option not declared here is looked up in the ancestors,
    /// and long tokens are always dotted.
    pub fn command_line_spellings(&self, name: &str, dotted: bool, parents: bool) -> String {
        let dotted = dotted || parents;
        let fallback = || {
            if parents {
                self.parent()
                    .map(|parent| parent.command_line_spellings(name, dotted, parents))
                    .unwrap_or_default()
            } else {
                String::new()
            }
        };
        let Some(option) = self.option(name) else {
            return fallback();
        };

        let scope = if dotted {
            format!("[{}.]", self.prefix())
        } else {
            String::new()
        };
        let spellings: Vec<String> = option
            .short
            .iter()
            .map(|c| format!("-{c}"))
            .chain(option.long.iter().map(|l| format!("--{scope}{l}")))
            .collect();
        if spellings.is_empty() {
            return fallback();
        }
        spellings.join(", ")
    }

    /// Compiled token table, if the scope is prepared.
    pub fn token_table(&self) -> Option<&'a TokenTable> {
        self.node().compiled.as_ref().map(|compiled| &compiled.tokens)
    }

    /// Long options as passed to the tokenizer; empty until prepared.
    pub fn long_options(&self) -> &'a [String] {
        self.token_table().map(TokenTable::long_options).unwrap_or_default()
    }

    /// Short options as passed to the tokenizer; empty until prepared.
    pub fn short_options(&self) -> Vec<String> {
        self.token_table()
            .map(TokenTable::short_options)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argscope_core::OptionType;

    fn tree() -> (ParamTree, ScopeId, ScopeId) {
        let mut root = OptionMap::new();
        root.insert("Shared".into(), OptionSchema::with_value(None, Some("shared"), OptionType::Text));
        let mut tree = ParamTree::new(root);
        let alpha = tree.add_child(ScopeId::ROOT, " Alpha ", OptionMap::new()).unwrap();
        let gamma = tree.add_child(alpha, "gamma", OptionMap::new()).unwrap();
        (tree, alpha, gamma)
    }

    #[test]
    fn test_prefix_paths() {
        let (tree, alpha, gamma) = tree();
        let gamma = tree.scope(gamma);
        assert_eq!(gamma.prefix(), "gamma");
        assert_eq!(gamma.full_prefix(), "global.alpha.gamma");
        assert_eq!(gamma.part_prefix(), "alpha.gamma");
        assert_eq!(gamma.parents(), "global.alpha");
        assert_eq!(tree.root().parents(), "");
        assert_eq!(tree.root().part_prefix(), "");
        assert_eq!(tree.find("alpha.gamma"), Some(gamma.id()));
        assert_eq!(tree.find("global.alpha"), Some(alpha));
        assert_eq!(tree.find("global"), Some(ScopeId::ROOT));
        assert_eq!(tree.find("beta"), None);
    }

    #[test]
    fn test_child_names_are_validated() {
        let (mut tree, _, _) = tree();
        let err = tree.add_child(ScopeId::ROOT, "alpha", OptionMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "[global] prefix 'alpha' is already used");
        assert!(tree.add_child(ScopeId::ROOT, "Global", OptionMap::new()).is_err());
        assert!(tree.add_child(ScopeId::ROOT, "  ", OptionMap::new()).is_err());
    }

    #[test]
    fn test_lookup_falls_back_to_ancestors() {
        let (mut tree, alpha, gamma) = tree();
        tree.set(ScopeId::ROOT, "x", 1);
        tree.set(alpha, "x", 2);
        tree.set(alpha, "y", "a");
        tree.set(gamma, "z", true);

        let g = tree.scope(gamma);
        assert_eq!(g.get("x"), Some(&Value::Int(2)));
        assert_eq!(g.get("y"), Some(&Value::from("a")));
        assert!(g.is_own_key("z"));
        assert!(g.is_inherited("x"));
        assert_eq!(g.keys(), vec!["x", "y", "z"]);
        assert_eq!(g.len(), 3);
        assert_eq!(tree.root().get("z"), None);
        assert_eq!(tree.root().search("z"), Some(&Value::Bool(true)));

        tree.remove(alpha, "x");
        assert_eq!(tree.scope(gamma).get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_prepare_is_lazy_and_resets_values() {
        let (mut tree, alpha, _) = tree();
        tree.prepare().unwrap();
        assert!(tree.is_prepared());
        assert_eq!(tree.root().get("Shared"), Some(&Value::from("")));

        tree.set(ScopeId::ROOT, "Shared", "kept");
        tree.prepare().unwrap();
        assert_eq!(tree.root().get("Shared"), Some(&Value::from("kept")));

        tree.set_description(alpha, "changed");
        assert!(!tree.is_prepared());
        tree.prepare().unwrap();
        assert_eq!(tree.root().get("Shared"), Some(&Value::from("kept")));
    }

    #[test]
    fn test_declaration_errors_name_the_scope() {
        let (mut tree, _, gamma) = tree();
        let mut options = OptionMap::new();
        options.insert("G".into(), OptionSchema::new(OptionType::GlobalExport).with_long("ge"));
        tree.set_schema(gamma, options);
        let err = tree.prepare().unwrap_err();
        assert_eq!(err.scope(), "global.alpha.gamma");
    }

    #[test]
    fn test_translation_broadcast_stops_at_subtree() {
        let (mut tree, alpha, gamma) = tree();
        tree.set_translation(alpha, Translation::german());
        assert_eq!(tree.scope(gamma).translation(), &Translation::german());
        assert_eq!(tree.root().translation(), &Translation::english());
    }

    #[test]
    fn test_command_line_spellings() {
        let mut root = OptionMap::new();
        root.insert(
            "Help".into(),
            OptionSchema::new(OptionType::Help).with_short("h?").with_long("help"),
        );
        let mut tree = ParamTree::new(root);
        let alpha = tree.add_child(ScopeId::ROOT, "alpha", OptionMap::new()).unwrap();

        assert_eq!(tree.root().command_line_spellings("Help", false, false), "-h, -?, --help");
        assert_eq!(
            tree.root().command_line_spellings("Help", true, false),
            "-h, -?, --[global.]help"
        );
        assert_eq!(tree.scope(alpha).command_line_spellings("Help", false, false), "");
        assert_eq!(
            tree.scope(alpha).command_line_spellings("Help", false, true),
            "-h, -?, --[global.]help"
        );
    }
}
