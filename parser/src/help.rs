//! Usage text rendering.
//!
//! A [`HelpLayout`] is computed when a scope is compiled: one row per
//! option plus the widths of the short and long columns. Rendering turns it
//! into the text printed for a help option. Each option occupies as many
//! lines as it has short tokens, long tokens or description lines (plus one
//! for the type/default line), columns padded to the widest token of the
//! scope.

use argscope_core::{DeclarationError, MessageKey, OptionMap, OptionType, Translation, Value};

use crate::tree::{ParamTree, ScopeId};

const CHILD_RULE: &str = "------------------------------";

/// Display data of one option.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UsageRow {
    pub short: Vec<char>,
    pub long: Vec<String>,
    pub option_type: OptionType,
    pub takes_value: bool,
    pub default: Option<Value>,
    pub lower: Option<Value>,
    pub upper: Option<Value>,
    pub description: String,
}

/// Rows and column widths of a scope's usage block.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct HelpLayout {
    pub rows: Vec<UsageRow>,
    /// 1 when any option has a short token, else 0.
    pub short_width: usize,
    /// Length of the longest long token.
    pub long_width: usize,
}

impl HelpLayout {
    pub fn build(options: &OptionMap) -> Self {
        let mut layout = HelpLayout::default();
        for option in options.values() {
            if !option.short.is_empty() {
                layout.short_width = 1;
            }
            for long in &option.long {
                layout.long_width = layout.long_width.max(long.chars().count());
            }
            layout.rows.push(UsageRow {
                short: option.short.clone(),
                long: option.long.clone(),
                option_type: option.option_type,
                takes_value: option.needs_value(),
                default: option.default.clone(),
                lower: option.lower.clone(),
                upper: option.upper.clone(),
                description: option.description.clone().unwrap_or_default(),
            });
        }
        layout
    }
}

/// Scope-level texts surrounding the option rows.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UsageHeader<'a> {
    pub program: &'a str,
    pub version: &'a str,
    pub description: &'a str,
    pub additional_usage: &'a str,
    /// Own scope name for children, `None` for the root.
    pub child_prefix: Option<&'a str>,
}

fn quoted(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Int(i) => *i == 0,
        Value::Float(f) => *f == 0.0,
        Value::Text(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
    }
}

fn limit_text(row: &UsageRow) -> String {
    match (&row.lower, &row.upper) {
        (None, None) => String::new(),
        (None, Some(hi)) => format!("(... {})", quoted(hi)),
        (Some(lo), None) => format!("({} ...)", quoted(lo)),
        (Some(lo), Some(hi)) => format!("({} ... {})", quoted(lo), quoted(hi)),
    }
}

fn shown_default(row: &UsageRow) -> Value {
    if let Some(default) = &row.default {
        return default.clone();
    }
    match row.option_type {
        OptionType::Int => Value::Int(0),
        OptionType::Bool => Value::Bool(false),
        OptionType::Float => Value::Float(0.0),
        _ => Value::Text(String::new()),
    }
}

/// Pads or truncates `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

fn render_row(
    out: &mut String,
    row: &UsageRow,
    layout: &HelpLayout,
    child_prefix: Option<&str>,
    help_type: u8,
    tr: &Translation,
) {
    let show_type = matches!(help_type, 2 | 3);
    let show_default = matches!(help_type, 1 | 3);

    let value_word = tr.get(MessageKey::HelpValue);
    let param = if row.takes_value {
        value_word.to_string()
    } else {
        " ".repeat(value_word.chars().count())
    };

    let mut limits = limit_text(row);
    if show_type && !limits.is_empty() {
        limits.insert(0, ' ');
    }
    let default = Some(shown_default(row)).filter(|d| show_default || !is_falsy(d));
    let mut detail = match default {
        None => limits,
        Some(d) if limits.is_empty() => {
            format!("{}: {}", tr.get(MessageKey::HelpDefault), quoted(&d))
        }
        Some(d) => format!("{limits}, {}: {}", tr.get(MessageKey::HelpDefault), quoted(&d)),
    };

    let mut text: Vec<String> = row.description.lines().map(str::to_string).collect();
    let lines = row.short.len().max(row.long.len()).max(text.len() + 1);
    if show_type {
        if !detail.is_empty() && !detail.starts_with(' ') {
            detail.insert(0, ' ');
        }
        text.insert(0, format!("Type: {}{detail}", tr.get(row.option_type.label_key())));
    } else if !detail.is_empty() {
        text.insert(0, detail);
    }

    let short_col = layout.short_width + 4;
    let mut long_col = layout.long_width + 5;
    if let Some(prefix) = child_prefix {
        long_col += prefix.chars().count() + 3;
    }
    let long_cell = long_col + param.chars().count() + 2;

    for i in 0..lines {
        let mut line = String::from("\n   ");
        match row.short.get(i) {
            Some(c) => line.push_str(&fit(&format!("-{c}"), short_col)),
            None => line.push_str(&" ".repeat(short_col)),
        }
        let mut long = match row.long.get(i) {
            Some(l) => {
                let scoped = match child_prefix {
                    Some(prefix) => format!("[{prefix}.]{l}"),
                    None => l.clone(),
                };
                if row.takes_value {
                    format!("--{scoped}=")
                } else {
                    format!("--{scoped}")
                }
            }
            None => " ".repeat(long_col),
        };
        if i == 0 {
            long.push_str(&param);
        }
        line.push_str(&fit(&long, long_cell));
        line.push_str(text.get(i).map_or(" ", String::as_str));
        if !line.trim().is_empty() {
            out.push_str(&line);
        }
    }
    out.push('\n');
}

/// Renders the usage block of a single scope.
pub(crate) fn render_scope(
    layout: &HelpLayout,
    header: &UsageHeader<'_>,
    help_type: u8,
    tr: &Translation,
) -> String {
    let description = if header.description.is_empty() {
        String::new()
    } else {
        format!("{}\n", header.description)
    };

    let mut out = match header.child_prefix {
        Some(_) => format!("\n{description}"),
        None => {
            let version = if header.version.is_empty() {
                String::new()
            } else {
                format!("{} {}\n", tr.get(MessageKey::HelpVersion), header.version)
            };
            let call = format!(
                "{} {} {}",
                header.program,
                tr.get(MessageKey::HelpOptionInline),
                header.additional_usage
            );
            format!(
                "{version}{}\n\n    {}\n\n{description}{}\n",
                tr.get(MessageKey::HelpUsage),
                call.trim_end(),
                tr.get(MessageKey::HelpOptions)
            )
        }
    };

    for row in &layout.rows {
        render_row(&mut out, row, layout, header.child_prefix, help_type, tr);
    }
    out
}

/// Appends a child's usage block, indented by four spaces.
pub(crate) fn append_child(out: &mut String, part_prefix: &str, child_usage: &str, show_header: bool) {
    if show_header {
        out.push_str(&format!("\n    {CHILD_RULE}\n    {part_prefix}\n    {CHILD_RULE}\n"));
    } else {
        out.push('\n');
    }
    for line in child_usage.lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
}

impl ParamTree {
    /// Usage text of a scope and every scope below it.
    ///
    /// # Errors
    ///
    /// Returns the [`DeclarationError`] of a scope that does not compile.
    pub fn usage(&mut self, id: ScopeId) -> Result<String, DeclarationError> {
        self.prepare()?;
        Ok(self.render_usage(id))
    }

    pub(crate) fn render_usage(&self, id: ScopeId) -> String {
        let scope = self.scope(id);
        let node = self.node(id);
        let built;
        let layout = match &node.compiled {
            Some(compiled) => &compiled.layout,
            None => {
                built = HelpLayout::build(&node.options);
                &built
            }
        };
        let header = UsageHeader {
            program: &self.program_name,
            version: &self.settings.version,
            description: &node.description,
            additional_usage: &node.additional_usage,
            child_prefix: (!scope.is_root()).then_some(node.prefix.as_str()),
        };
        let mut out = render_scope(layout, &header, self.settings.help_type, &node.translation);
        for child in scope.children() {
            let child_usage = self.render_usage(child.id());
            append_child(&mut out, &child.part_prefix(), &child_usage, self.settings.show_prefix_on_help);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argscope_core::OptionSchema;

    fn layout() -> HelpLayout {
        let mut options = OptionMap::new();
        options.insert(
            "Port".into(),
            OptionSchema::with_value(Some("p"), Some("port"), OptionType::Int)
                .with_limits(Some(Value::Int(1)), Some(Value::Int(9)))
                .with_description("Port to use"),
        );
        options.insert(
            "Help".into(),
            OptionSchema::new(OptionType::Help)
                .with_short("h")
                .with_long("help")
                .with_description("Show help"),
        );
        HelpLayout::build(&options)
    }

    fn root_header() -> UsageHeader<'static> {
        UsageHeader {
            program: "tool",
            version: "",
            description: "",
            additional_usage: "",
            child_prefix: None,
        }
    }

    #[test]
    fn test_layout_widths() {
        let layout = layout();
        assert_eq!(layout.short_width, 1);
        assert_eq!(layout.long_width, 4);
        assert!(layout.rows[0].takes_value);
        assert!(!layout.rows[1].takes_value);
    }

    #[test]
    fn test_root_header() {
        let tr = Translation::english();
        let text = render_scope(&HelpLayout::default(), &root_header(), 0, &tr);
        assert_eq!(text, "Usage:\n\n    tool [OPTIONS ...]\n\nOptions:\n");

        let header = UsageHeader {
            version: "1.2",
            description: "Does things",
            additional_usage: "FILE",
            ..root_header()
        };
        let text = render_scope(&HelpLayout::default(), &header, 0, &tr);
        assert_eq!(
            text,
            "Version: 1.2\nUsage:\n\n    tool [OPTIONS ...] FILE\n\nDoes things\nOptions:\n"
        );
    }

    #[test]
    fn test_rows_show_tokens_limits_and_description() {
        let tr = Translation::english();
        let text = render_scope(&layout(), &root_header(), 0, &tr);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[4], "Options:");
        assert_eq!(lines[6], "   -p   --port=value    (1 ... 9)");
        assert_eq!(lines[7], format!("{}Port to use", " ".repeat(24)));
        assert_eq!(lines[9], "   -h   --help          Show help");
    }

    #[test]
    fn test_help_type_three_shows_type_and_default() {
        let tr = Translation::english();
        let text = render_scope(&layout(), &root_header(), 3, &tr);
        assert!(text.contains("Type: integer (1 ... 9), Default: 0"), "{text}");
        assert!(text.contains("Type: help Default: ''"), "{text}");
    }

    #[test]
    fn test_child_rows_are_prefixed() {
        let tr = Translation::english();
        let header = UsageHeader {
            child_prefix: Some("alpha"),
            ..root_header()
        };
        let text = render_scope(&layout(), &header, 0, &tr);
        assert!(text.starts_with('\n'));
        assert!(text.contains("--[alpha.]port=value"), "{text}");
    }

    #[test]
    fn test_append_child_indents() {
        let mut out = String::from("root\n");
        append_child(&mut out, "alpha", "\na\nb\n", true);
        assert_eq!(
            out,
            format!("root\n\n    {CHILD_RULE}\n    alpha\n    {CHILD_RULE}\n    \n    a\n    b\n")
        );
    }

    #[test]
    fn test_tree_usage_nests_children() {
        let mut root = OptionMap::new();
        root.insert(
            "Help".into(),
            OptionSchema::new(OptionType::Help).with_short("h").with_long("help"),
        );
        let mut alpha = OptionMap::new();
        alpha.insert("Auto".into(), OptionSchema::flag(None, Some("auto")));
        let mut tree = ParamTree::new(root);
        tree.set_program_name("tool");
        let child = tree.add_child(ScopeId::ROOT, "alpha", alpha).unwrap();
        tree.set_description(child, "Alpha things");

        let text = tree.usage(ScopeId::ROOT).unwrap();
        assert!(text.starts_with("Usage:\n\n    tool [OPTIONS ...]\n"), "{text}");
        assert!(text.contains(&format!("    {CHILD_RULE}\n    alpha\n")), "{text}");
        assert!(text.contains("    Alpha things\n"), "{text}");
        assert!(text.contains("--[alpha.]auto"), "{text}");
        assert_eq!(tree.usage(ScopeId::ROOT).unwrap(), text);
    }
}
