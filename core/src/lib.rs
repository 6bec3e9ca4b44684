//! Core types for declaring scoped command-line options.
//!
//! This crate holds everything about an option declaration that needs no
//! I/O:
//!
//! - [`OptionSchema`] and [`OptionType`]: one option, its tokens, type,
//!   limits and default.
//! - [`Value`]: a resolved, typed value as stored in a scope.
//! - [`parse_declaration`] and [`ScopeDeclaration`]: compact declaration
//!   documents with remappable [`DeclarationKeys`] and [`ModeCodes`].
//! - [`validate_options`]: structural checks (duplicate tokens, root-only
//!   types, ill-typed defaults).
//! - [`Translation`]: message tables for every user-facing string.
//! - [`DeclarationError`] and [`ParamError`]: the two error kinds.
//!
//! The `argscope` crate builds the tokenizer and the scope tree on top.
//!
//! # Example
//!
//! ```
//! use argscope_core::*;
//!
//! let mut options = OptionMap::new();
//! options.insert(
//!     "Verbose".into(),
//!     OptionSchema::new(OptionType::Counter).with_short("v").with_long("verbose"),
//! );
//! options.insert(
//!     "Port".into(),
//!     OptionSchema::with_value(Some("p"), Some("port"), OptionType::Int)
//!         .with_limits(Some(Value::Int(1)), Some(Value::Int(65535))),
//! );
//!
//! assert!(validate_options(&options, true).is_empty());
//! assert_eq!(options["Port"].spellings(), vec!["-p", "--port"]);
//! ```

mod declaration;
mod error;
mod translation;
mod types;
mod validate;

pub use declaration::{DeclarationKeys, ModeCodes, ScopeDeclaration, parse_declaration};
pub use error::{DeclarationError, ParamError};
pub use translation::{MessageKey, Translation};
pub use types::*;
pub use validate::{
    LimitCheck, ValidationError, check_limits, validate_child_name, validate_options,
};
