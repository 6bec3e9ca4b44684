use std::fs;
use std::path::{Path, PathBuf};

use argscope::{Outcome, ParamTree, ParserSettings, ReportOptions};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

/// Output format of the `run` subcommand.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "argscope")]
#[command(about = "Drive scoped option schemas against command lines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process an argument vector and print the resolved values.
    Run(RunArgs),
    /// Print the usage text of a schema.
    Usage(UsageArgs),
    /// Report tokens declared in more than one scope.
    Lint(LintArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Declaration document (JSON or YAML).
    #[arg(long)]
    schema: PathBuf,
    /// Parser settings file (YAML).
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Program name shown in usage text.
    #[arg(long)]
    prog: Option<String>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Collect unknown options instead of failing.
    #[arg(long)]
    allow_unknown: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to process (after `--`).
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct UsageArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Dotted path of the scope to describe (default: the whole tree).
    #[arg(long)]
    scope: Option<String>,
}

#[derive(Debug, Args)]
struct LintArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Also list used and free tokens.
    #[arg(long)]
    overview: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run_process(args),
        Command::Usage(args) => run_usage(args),
        Command::Lint(args) => run_lint(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn read_document(path: &Path) -> Result<serde_json::Value, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&text)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))
    } else {
        serde_yaml::from_str(&text)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))
    }
}

fn build_tree(args: &SchemaArgs) -> Result<ParamTree, String> {
    let mut settings = match &args.settings {
        Some(path) => ParserSettings::load(path)
            .map_err(|err| format!("Failed to load settings '{}': {err}", path.display()))?,
        None => ParserSettings::default(),
    };
    if let Some(prog) = &args.prog {
        settings.program_name = Some(prog.clone());
    }
    if settings.program_name.is_none() {
        settings.program_name = args
            .schema
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }

    let document = read_document(&args.schema)?;
    let tree = ParamTree::from_document(&document, settings).map_err(|err| err.to_string())?;
    debug!(scopes = tree.scope_ids().len(), "loaded schema");
    Ok(tree)
}

fn run_process(args: RunArgs) -> Result<(), String> {
    let mut tree = build_tree(&args.schema)?;
    if args.allow_unknown {
        tree.set_error_on_unknown(false);
    }
    tree.set_args(args.args);

    match tree.process().map_err(|err| err.to_string())? {
        Outcome::Terminal(actions) => {
            for action in actions {
                println!("{}", action.text);
            }
        }
        Outcome::Completed => match args.format {
            CliOutputFormat::Json => {
                let document = serde_json::json!({
                    "values": tree.export_tree(),
                    "remainder": tree.remainder(),
                    "unused": tree.unused_args(),
                });
                let text = argscope::to_pretty_json(&document)
                    .map_err(|err| format!("Failed to serialize output: {err}"))?;
                println!("{text}");
            }
            CliOutputFormat::Table => {
                print!("{}", tree.param_report(&ReportOptions::default()));
            }
        },
    }
    Ok(())
}

fn run_usage(args: UsageArgs) -> Result<(), String> {
    let mut tree = build_tree(&args.schema)?;
    let id = match &args.scope {
        Some(path) => tree
            .find(path)
            .ok_or_else(|| format!("No scope named '{path}'"))?,
        None => argscope::ScopeId::ROOT,
    };
    let text = tree.usage(id).map_err(|err| err.to_string())?;
    print!("{text}");
    Ok(())
}

fn run_lint(args: LintArgs) -> Result<(), String> {
    let mut tree = build_tree(&args.schema)?;
    let report = tree.lint_tokens().map_err(|err| err.to_string())?;
    if args.overview {
        let overview = tree.overview().map_err(|err| err.to_string())?;
        println!("{overview}\n");
    }
    if report.is_clean() {
        println!("No reused tokens.");
    } else {
        print!("{report}");
    }
    if report.has_problems() {
        return Err("schema has conflicting tokens".to_string());
    }
    Ok(())
}
