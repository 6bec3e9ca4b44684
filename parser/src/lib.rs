//! GNU-style option parsing with hierarchical scopes.
//!
//! A [`ParamTree`] holds a root scope named `global` and any number of
//! named child scopes, each declaring its own options. All scopes read the
//! same argument vector; a child's options can be addressed explicitly as
//! `--alpha.name`, and a child sees every value bound in its ancestors.
//!
//! # Main entry points
//!
//! - [`ParamTree::process`]: tokenize, validate and assign the arguments,
//!   returning an [`Outcome`] that is terminal when a help, license or
//!   export option was given.
//! - [`ParamTree::from_document`]: build a tree from a JSON declaration
//!   document.
//! - [`ParamTree::import_json`] and [`ParamTree::export_tree`]: move values
//!   to and from JSON.
//! - [`ParamTree::usage`]: the usage text of a scope and its children.
//! - [`ParamTree::lint_tokens`] and [`ParamTree::param_report`]: developer
//!   diagnostics.
//! - [`Getopt`]: the underlying scanner, usable on its own.
//!
//! # Example
//!
//! ```
//! use argscope::{OptionMap, OptionSchema, OptionType, ParamTree, Value};
//!
//! let mut options = OptionMap::new();
//! options.insert(
//!     "Verbose".into(),
//!     OptionSchema::new(OptionType::Counter).with_short("v").with_long("verbose"),
//! );
//! options.insert(
//!     "Port".into(),
//!     OptionSchema::with_value(Some("p"), Some("port"), OptionType::Int)
//!         .with_limits(Some(Value::Int(1)), Some(Value::Int(65535)))
//!         .with_default(8080),
//! );
//!
//! let mut tree = ParamTree::new(options);
//! tree.set_args(["-vv", "--po", "443", "input.txt"]);
//! tree.process().unwrap();
//!
//! assert_eq!(tree.root().get("Verbose"), Some(&Value::Int(2)));
//! assert_eq!(tree.root().get("Port"), Some(&Value::Int(443)));
//! assert_eq!(tree.remainder(), vec!["input.txt"]);
//! ```

mod check;
mod compile;
mod config;
mod error;
mod getopt;
mod help;
mod net;
mod process;
mod report;
mod transfer;
mod tree;

pub use argscope_core::{
    DeclarationError, DeclarationKeys, GLOBAL_SCOPE, IpFamily, MessageKey, ModeCodes, OptionMap,
    OptionSchema, OptionType, ParamError, ScopeDeclaration, Translation, ValidationError, Value,
    parse_declaration,
};
pub use compile::TokenTable;
pub use config::{Language, ParserSettings};
pub use error::{Error, Result};
pub use getopt::{Getopt, Tokens};
pub use net::{local_addresses, resolve_address, resolve_local_address};
pub use process::{Outcome, TerminalAction, TerminalKind};
pub use report::{LintFinding, LintReport, ReportOptions, Severity};
pub use transfer::to_pretty_json;
pub use tree::{ParamTree, Scope, ScopeId};
