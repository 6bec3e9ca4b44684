//! End-to-end processing: tokenizing, scoping, validation, terminal options
//! and JSON round trips through a whole scope tree.

use std::fs;

use argscope::{
    MessageKey, OptionMap, OptionSchema, OptionType, Outcome, ParamTree, ParserSettings, ScopeId,
    TerminalKind, Value,
};
use serde_json::json;

fn param_key(err: &argscope::Error) -> MessageKey {
    err.as_param()
        .map(|e| e.key())
        .unwrap_or_else(|| panic!("expected a parameter error, got {err}"))
}

fn counter() -> OptionMap {
    let mut options = OptionMap::new();
    options.insert(
        "Verbose".into(),
        OptionSchema::new(OptionType::Counter).with_short("v").with_long("verbose"),
    );
    options
}

fn run(options: OptionMap, args: &[&str]) -> argscope::Result<ParamTree> {
    let mut tree = ParamTree::new(options);
    tree.set_args(args.iter().copied());
    tree.process()?;
    Ok(tree)
}

fn scoped_tree() -> (ParamTree, ScopeId) {
    let mut root = OptionMap::new();
    root.insert(
        "Auto".into(),
        OptionSchema::flag(Some("a"), Some("auto")).needing_value(),
    );
    root.insert(
        "Help".into(),
        OptionSchema::new(OptionType::Help).with_short("h").with_long("help"),
    );
    root.insert(
        "Dump".into(),
        OptionSchema::new(OptionType::GlobalExport).with_long("dump"),
    );
    let mut alpha = OptionMap::new();
    alpha.insert(
        "DoAuto".into(),
        OptionSchema::flag(None, Some("auto")).needing_value(),
    );
    alpha.insert(
        "Count".into(),
        OptionSchema::with_value(Some("c"), Some("count"), OptionType::Int).with_default(1),
    );
    alpha.insert(
        "Save".into(),
        OptionSchema::new(OptionType::Export).with_long("save"),
    );
    alpha.insert(
        "Load".into(),
        OptionSchema::new(OptionType::Import).with_long("load"),
    );
    let mut tree = ParamTree::new(root);
    tree.set_program_name("tool");
    let alpha = tree.add_child(ScopeId::ROOT, "alpha", alpha).unwrap();
    (tree, alpha)
}

#[test]
fn test_duplicate_token_fails_to_compile() {
    let mut options = counter();
    options.insert("Other".into(), OptionSchema::flag(Some("v"), None));
    let err = run(options, &[]).unwrap_err();
    let declaration = err.as_declaration().expect("declaration error");
    assert_eq!(declaration.scope(), "global");
    assert!(err.to_string().contains("double short value"), "{err}");
}

#[test]
fn test_long_prefix_abbreviation() {
    let mut options = counter();
    options.insert("Version".into(), OptionSchema::flag(None, Some("version")));

    let tree = run(options.clone(), &["--verb=4", "--versi"]).unwrap();
    assert_eq!(tree.root().get("Verbose"), Some(&Value::Int(4)));
    assert_eq!(tree.root().get("Version"), Some(&Value::Bool(true)));

    let err = run(options, &["--ver"]).unwrap_err();
    assert_eq!(param_key(&err), MessageKey::ParNoUniquePrefix);
}

#[test]
fn test_limits_are_inclusive() {
    let mut options = OptionMap::new();
    options.insert(
        "Port".into(),
        OptionSchema::with_value(None, Some("port"), OptionType::Int)
            .with_limits(Some(Value::Int(1)), Some(Value::Int(10))),
    );
    options.insert(
        "Ratio".into(),
        OptionSchema::with_value(None, Some("ratio"), OptionType::Float)
            .with_limits(Some(Value::Float(0.5)), Some(Value::Float(1.5))),
    );

    let tree = run(options.clone(), &["--port=1", "--ratio=1.5"]).unwrap();
    assert_eq!(tree.root().get("Port"), Some(&Value::Int(1)));
    assert_eq!(tree.root().get("Ratio"), Some(&Value::Float(1.5)));
    assert!(run(options.clone(), &["--port=10", "--ratio=0.5"]).is_ok());

    let cases = [
        (["--port=0"], MessageKey::LessLow),
        (["--port=11"], MessageKey::HigherUp),
        (["--ratio=0.4"], MessageKey::LessLow),
        (["--ratio=1.6"], MessageKey::HigherUp),
        (["--port=ten"], MessageKey::NoInt),
    ];
    for (args, key) in cases {
        let err = run(options.clone(), &args).unwrap_err();
        assert_eq!(param_key(&err), key, "{args:?}");
    }
}

#[test]
fn test_bool_coercion() {
    let mut options = OptionMap::new();
    options.insert(
        "Auto".into(),
        OptionSchema::flag(None, Some("auto")).needing_value(),
    );
    for raw in ["Y", "yes", "1", "True"] {
        let arg = format!("--auto={raw}");
        let tree = run(options.clone(), &[arg.as_str()]).unwrap();
        assert_eq!(tree.root().get("Auto"), Some(&Value::Bool(true)), "{raw}");
    }
    for raw in ["n", "0", "false"] {
        let arg = format!("--auto={raw}");
        let tree = run(options.clone(), &[arg.as_str()]).unwrap();
        assert_eq!(tree.root().get("Auto"), Some(&Value::Bool(false)), "{raw}");
    }
    for raw in ["", "maybe", " y"] {
        let arg = format!("--auto={raw}");
        let err = run(options.clone(), &[arg.as_str()]).unwrap_err();
        assert_eq!(param_key(&err), MessageKey::NoBool, "{raw}");
    }
}

#[test]
fn test_counter_short_adds_long_replaces() {
    let tree = run(counter(), &["-vvv"]).unwrap();
    assert_eq!(tree.root().get("Verbose"), Some(&Value::Int(3)));

    let tree = run(counter(), &["--verbose=5", "--verbose=2"]).unwrap();
    assert_eq!(tree.root().get("Verbose"), Some(&Value::Int(2)));

    let tree = run(counter(), &["-v", "--verbose=5", "-v"]).unwrap();
    assert_eq!(tree.root().get("Verbose"), Some(&Value::Int(6)));
}

#[test]
fn test_counter_increments_respect_limits() {
    let mut options = counter();
    options.insert(
        "Verbose".into(),
        OptionSchema::new(OptionType::Counter)
            .with_short("v")
            .with_long("verbose")
            .with_limits(Some(Value::Int(0)), Some(Value::Int(2))),
    );

    let tree = run(options.clone(), &["-vv"]).unwrap();
    assert_eq!(tree.root().get("Verbose"), Some(&Value::Int(2)));

    let err = run(options.clone(), &["--verbose=3"]).unwrap_err();
    assert_eq!(param_key(&err), MessageKey::HigherUp);

    let err = run(options.clone(), &["-vvvvv"]).unwrap_err();
    assert_eq!(param_key(&err), MessageKey::HigherUp);
    assert!(err.to_string().contains("Value '3' for parameter -v"), "{err}");

    let err = run(options, &["--verbose=2", "-v"]).unwrap_err();
    assert_eq!(param_key(&err), MessageKey::HigherUp);
}

#[test]
fn test_dotted_options_target_one_scope() {
    let (mut tree, alpha) = scoped_tree();

    tree.set_args(["--auto=yes"]);
    tree.process().unwrap();
    assert_eq!(tree.root().get("Auto"), Some(&Value::Bool(true)));
    assert_eq!(tree.scope(alpha).get("DoAuto"), Some(&Value::Bool(true)));

    tree.set_args(["--alpha.auto=yes"]);
    tree.process().unwrap();
    assert_eq!(tree.root().get("Auto"), Some(&Value::Bool(false)));
    assert_eq!(tree.scope(alpha).get("DoAuto"), Some(&Value::Bool(true)));

    tree.set_args(["--alpha.auto=yes", "--global.auto=no"]);
    tree.process().unwrap();
    assert_eq!(tree.root().get("Auto"), Some(&Value::Bool(false)));
    assert_eq!(tree.scope(alpha).get("DoAuto"), Some(&Value::Bool(true)));
}

#[test]
fn test_child_reads_through_to_parent() {
    let (mut tree, alpha) = scoped_tree();
    tree.set_args(["-a", "yes", "--alpha.count=3"]);
    tree.process().unwrap();
    let alpha = tree.scope(alpha);
    assert_eq!(alpha.get("Auto"), Some(&Value::Bool(true)));
    assert!(alpha.is_inherited("Auto"));
    assert_eq!(alpha.get("Count"), Some(&Value::Int(3)));
    assert_eq!(tree.root().get("Count"), None);
    assert_eq!(tree.root().search("Count"), Some(&Value::Int(3)));
}

#[test]
fn test_wrongly_dotted_option_is_a_prefix_error() {
    let (mut tree, _) = scoped_tree();
    tree.set_args(["--alpha.auto.x=yes"]);
    let err = tree.process().unwrap_err();
    assert_eq!(param_key(&err), MessageKey::PrefixError);
}

#[test]
fn test_required_option_names_its_spellings() {
    let mut options = OptionMap::new();
    options.insert(
        "Name".into(),
        OptionSchema::with_value(Some("n"), Some("name"), OptionType::Text).required(),
    );
    let err = run(options.clone(), &[]).unwrap_err();
    assert_eq!(param_key(&err), MessageKey::OptionRequired);
    assert_eq!(err.to_string(), "Name (-n, --name) required but not given");

    let tree = run(options, &["-n", "box"]).unwrap();
    assert_eq!(tree.root().get("Name"), Some(&Value::from("box")));
}

#[test]
fn test_required_option_of_a_child_is_dotted() {
    let mut tree = ParamTree::new(OptionMap::new());
    let mut options = OptionMap::new();
    options.insert(
        "Name".into(),
        OptionSchema::with_value(None, Some("name"), OptionType::Text).required(),
    );
    tree.add_child(ScopeId::ROOT, "beta", options).unwrap();
    let err = tree.process().unwrap_err();
    assert_eq!(err.to_string(), "Name (--[beta.]name) required but not given");
}

#[test]
fn test_unknown_option_fails_before_assignment() {
    let mut options = counter();
    options.insert(
        "Count".into(),
        OptionSchema::with_value(None, Some("count"), OptionType::Int),
    );
    let mut tree = ParamTree::new(options);
    tree.set_args(["--count=3", "--bogus"]);
    let err = tree.process().unwrap_err();
    assert_eq!(param_key(&err), MessageKey::UndefinedOptionSingle);
    assert_eq!(err.to_string(), "option '--bogus' not recognized");
    assert_eq!(tree.root().get("Count"), Some(&Value::Int(0)));

    tree.set_args(["--bogus", "-x"]);
    let err = tree.process().unwrap_err();
    assert_eq!(param_key(&err), MessageKey::UndefinedOptionMultiple);
    assert_eq!(err.to_string(), "options '--bogus', '-x' not recognized");

    tree.set_error_on_unknown(false);
    tree.set_args(["--count=3", "--bogus", "file.txt"]);
    assert_eq!(tree.process().unwrap(), Outcome::Completed);
    assert_eq!(tree.unused_args(), vec!["--bogus"]);
    assert_eq!(tree.remainder(), vec!["file.txt"]);
    assert_eq!(tree.root().get("Count"), Some(&Value::Int(3)));
}

#[test]
fn test_option_claimed_by_a_sibling_is_not_unknown() {
    let (mut tree, alpha) = scoped_tree();
    tree.set_args(["-c", "5"]);
    tree.process().unwrap();
    assert!(tree.unused_args().is_empty());
    assert_eq!(tree.scope(alpha).get("Count"), Some(&Value::Int(5)));
}

#[test]
fn test_help_renders_the_whole_tree() {
    let (mut tree, _) = scoped_tree();
    tree.set_args(["--alpha.count=99", "--he"]);
    let outcome = tree.process().unwrap();
    let actions = outcome.actions();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].kind, TerminalKind::Help);
    assert_eq!(actions[0].scope, "global");
    assert!(actions[0].text.starts_with("Usage:\n\n    tool [OPTIONS ...]\n"));
    assert!(actions[0].text.contains("--[alpha.]count"), "{}", actions[0].text);
    assert_eq!(actions[0].text, tree.usage(ScopeId::ROOT).unwrap());
}

#[test]
fn test_license_options() {
    let mut options = OptionMap::new();
    options.insert(
        "License".into(),
        OptionSchema::new(OptionType::License).with_long("license"),
    );
    options.insert(
        "Full".into(),
        OptionSchema::new(OptionType::FullLicense).with_long("full-license"),
    );
    let mut tree = ParamTree::new(options);
    tree.set_license(vec!["MIT".into(), "Permission is hereby granted".into()]);

    tree.set_args(["--license"]);
    assert_eq!(tree.process().unwrap().output(), "MIT");
    tree.set_args(["--full-license", "--license"]);
    let outcome = tree.process().unwrap();
    assert_eq!(outcome.actions()[0].kind, TerminalKind::FullLicense);
    assert_eq!(outcome.output(), "MIT\nPermission is hereby granted");
}

#[test]
fn test_export_then_import_round_trip() {
    let (mut tree, alpha) = scoped_tree();
    tree.set_args(["--alpha.count=7", "--alpha.auto=no", "--save"]);
    let outcome = tree.process().unwrap();
    let action = &outcome.actions()[0];
    assert_eq!(action.kind, TerminalKind::Export);
    assert_eq!(action.scope, "global.alpha");
    let exported: serde_json::Value = serde_json::from_str(&action.text).unwrap();
    assert_eq!(exported, json!({"Count": 7, "DoAuto": false}));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alpha.json");
    fs::write(&path, &action.text).unwrap();

    let (mut fresh, fresh_alpha) = scoped_tree();
    fresh.set_args([format!("--load={}", path.display())]);
    assert_eq!(fresh.process().unwrap(), Outcome::Completed);
    assert_eq!(
        fresh.scope(fresh_alpha).own_values(),
        tree.scope(alpha).own_values()
    );
}

fn media_tree() -> (ParamTree, ScopeId) {
    let mut media = OptionMap::new();
    media.insert(
        "Ratio".into(),
        OptionSchema::with_value(None, Some("ratio"), OptionType::Float),
    );
    media.insert(
        "Title".into(),
        OptionSchema::with_value(None, Some("title"), OptionType::Text),
    );
    media.insert(
        "Cache".into(),
        OptionSchema::with_value(None, Some("cache"), OptionType::Path),
    );
    media.insert(
        "Tags".into(),
        OptionSchema::with_value(Some("t"), Some("tag"), OptionType::Text).allow_multiple(),
    );
    media.insert(
        "Save".into(),
        OptionSchema::new(OptionType::Export).with_long("save"),
    );
    media.insert(
        "Load".into(),
        OptionSchema::new(OptionType::Import).with_long("load"),
    );
    let mut tree = ParamTree::new(OptionMap::new());
    let media = tree.add_child(ScopeId::ROOT, "media", media).unwrap();
    (tree, media)
}

#[test]
fn test_round_trip_keeps_every_scalar_type_and_list_order() {
    let dir = tempfile::tempdir().unwrap();
    let (mut tree, media) = media_tree();
    tree.set_working_dir(dir.path());
    tree.set_args([
        "--ratio=2.5",
        "--title=Night Shift",
        "--cache=cache/thumbs",
        "-t",
        "zeta",
        "--tag=alpha",
        "--tag",
        "mid",
        "--save",
    ]);
    let outcome = tree.process().unwrap();
    let action = &outcome.actions()[0];
    assert_eq!(action.kind, TerminalKind::Export);

    let exported: serde_json::Value = serde_json::from_str(&action.text).unwrap();
    assert_eq!(exported["Ratio"], json!(2.5));
    assert_eq!(exported["Title"], json!("Night Shift"));
    assert_eq!(exported["Tags"], json!(["zeta", "alpha", "mid"]));
    let cache = exported["Cache"].as_str().unwrap();
    assert!(cache.ends_with("thumbs"), "{cache}");
    assert!(std::path::Path::new(cache).is_absolute(), "{cache}");

    let path = dir.path().join("media.json");
    fs::write(&path, &action.text).unwrap();

    let (mut fresh, fresh_media) = media_tree();
    fresh.set_args([format!("--load={}", path.display())]);
    assert_eq!(fresh.process().unwrap(), Outcome::Completed);
    assert_eq!(
        fresh.scope(fresh_media).own_values(),
        tree.scope(media).own_values()
    );
    assert_eq!(
        fresh.scope(fresh_media).get("Tags"),
        Some(&Value::List(vec![
            Value::from("zeta"),
            Value::from("alpha"),
            Value::from("mid"),
        ]))
    );
    assert_eq!(fresh.scope(fresh_media).get("Ratio"), Some(&Value::Float(2.5)));
}

fn restorable_tree() -> (ParamTree, ScopeId) {
    let (mut tree, alpha) = scoped_tree();
    let mut root = OptionMap::new();
    root.insert(
        "Auto".into(),
        OptionSchema::flag(Some("a"), Some("auto")).needing_value(),
    );
    root.insert(
        "Restore".into(),
        OptionSchema::new(OptionType::GlobalImport).with_long("restore"),
    );
    tree.set_schema(ScopeId::ROOT, root);
    (tree, alpha)
}

#[test]
fn test_global_import_from_the_command_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all.json");
    fs::write(
        &path,
        r#"{"global": {"Auto": true}, "alpha": {"Count": 6, "DoAuto": true}}"#,
    )
    .unwrap();

    let (mut tree, alpha) = restorable_tree();
    tree.set_args([format!("--restore={}", path.display())]);
    assert_eq!(tree.process().unwrap(), Outcome::Completed);
    assert_eq!(tree.root().get("Auto"), Some(&Value::Bool(true)));
    assert_eq!(tree.scope(alpha).get("Count"), Some(&Value::Int(6)));
    assert_eq!(tree.scope(alpha).get("DoAuto"), Some(&Value::Bool(true)));
}

#[test]
fn test_global_import_rejects_values_outside_limits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all.json");
    fs::write(&path, r#"{"alpha": {"Count": 50}}"#).unwrap();

    let (mut tree, alpha) = restorable_tree();
    let mut limited = OptionMap::new();
    limited.insert(
        "Count".into(),
        OptionSchema::with_value(Some("c"), Some("count"), OptionType::Int)
            .with_limits(Some(Value::Int(1)), Some(Value::Int(10))),
    );
    tree.set_schema(alpha, limited);
    tree.set_working_dir(dir.path());
    tree.set_args(["--restore", "all.json"]);
    let err = tree.process().unwrap_err();
    assert_eq!(param_key(&err), MessageKey::HigherUp);
    assert!(err.to_string().contains("imported from"), "{err}");
}

#[test]
fn test_command_line_overrides_import() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alpha.json");
    fs::write(&path, r#"{"Count": 4, "DoAuto": true}"#).unwrap();

    let (mut tree, alpha) = scoped_tree();
    tree.set_working_dir(dir.path());
    tree.set_args(["--load", "alpha.json", "--alpha.count=9"]);
    tree.process().unwrap();
    assert_eq!(tree.scope(alpha).get("Count"), Some(&Value::Int(9)));
    assert_eq!(tree.scope(alpha).get("DoAuto"), Some(&Value::Bool(true)));
}

#[test]
fn test_missing_import_file_is_reported() {
    let (mut tree, _) = scoped_tree();
    tree.set_working_dir(std::env::temp_dir());
    tree.set_args(["--load=does-not-exist.json"]);
    let err = tree.process().unwrap_err();
    assert_eq!(param_key(&err), MessageKey::PathNoFile);
}

#[test]
fn test_global_export_is_keyed_by_scope() {
    let (mut tree, _) = scoped_tree();
    tree.set_args(["--alpha.count=2", "--dump"]);
    let outcome = tree.process().unwrap();
    assert_eq!(outcome.actions()[0].kind, TerminalKind::GlobalExport);
    let exported: serde_json::Value = serde_json::from_str(&outcome.output()).unwrap();
    assert_eq!(
        exported,
        json!({"global": {"Auto": false}, "alpha": {"Count": 2, "DoAuto": false}})
    );
}

#[test]
fn test_prepare_is_idempotent() {
    let (mut tree, alpha) = scoped_tree();
    tree.prepare().unwrap();
    let tokens = tree.scope(alpha).token_table().cloned();
    let usage = tree.usage(ScopeId::ROOT).unwrap();

    tree.prepare().unwrap();
    assert_eq!(tree.scope(alpha).token_table().cloned(), tokens);
    assert_eq!(tree.usage(ScopeId::ROOT).unwrap(), usage);
}

#[test]
fn test_tree_from_declaration_document() {
    let document = json!({
        "Def": {
            "Verbose": {"m": "C", "s": "v", "l": "verbose"},
            "Help": {"m": "H", "s": "h", "l": "help"},
        },
        "Children": {
            "Net": {
                "Desc": "Network settings",
                "Def": {
                    "Port": {"m": "i", "l": "port", "o": true, "v": 8080, "L": 1, "U": 65535},
                },
            },
        },
    });
    let settings = ParserSettings {
        program_name: Some("daemon".into()),
        ..ParserSettings::default()
    };
    let mut tree = ParamTree::from_document(&document, settings).unwrap();
    let net = tree.find("net").unwrap();
    tree.set_args(["-vv", "--net.port", "443"]);
    tree.process().unwrap();
    assert_eq!(tree.root().get("Verbose"), Some(&Value::Int(2)));
    assert_eq!(tree.scope(net).get("Port"), Some(&Value::Int(443)));
    assert_eq!(tree.scope(net).description(), "Network settings");
}
