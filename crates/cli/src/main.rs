//! tagver CLI - command-line driver for the GitFlow-aware semantic version
//! calculation engine.

mod gix_repository;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use tagver::{Configuration, ContextOptions, TagVerError, Verbosity};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

use gix_repository::GixRepository;

shadow_rs::shadow!(build);
const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// tagver - GitFlow-aware semantic version calculation
#[derive(Parser, Debug, Clone)]
#[command(name = "tagver")]
#[command(about = "Calculate a GitFlow-aware semantic version from repository history")]
#[command(version = CLI_VERSION)]
struct Args {
    /// Working directory to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    working_directory: PathBuf,

    /// YAML config overlay to apply, in ascending precedence order. May be
    /// repeated; the last file given wins over earlier ones.
    #[arg(short = 'c', long = "config")]
    config: Vec<PathBuf>,

    /// Calculate the version as though this branch were checked out.
    #[arg(long = "branch")]
    branch: Option<String>,

    /// Calculate the version as though this commit were checked out.
    #[arg(long = "commit")]
    commit: Option<String>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also print the step-by-step reasoning trace.
    #[arg(long = "explain", action = clap::ArgAction::SetTrue)]
    explain: bool,

    /// Verbosity level (quiet, normal, verbose, debug, trace).
    #[arg(long = "verbosity", env = "TAGVER_VERBOSITY", value_parser = parse_verbosity)]
    verbosity: Option<Verbosity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_verbosity(s: &str) -> Result<Verbosity, String> {
    s.parse::<Verbosity>().map_err(|e| e.to_string())
}

fn main() {
    let args = Args::parse();

    let level = match args.verbosity.unwrap_or_default() {
        Verbosity::Quiet => tracing::Level::ERROR,
        Verbosity::Normal => tracing::Level::WARN,
        Verbosity::Verbose => tracing::Level::INFO,
        Verbosity::Debug => tracing::Level::DEBUG,
        Verbosity::Trace => tracing::Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a tracing subscriber was already installed");
    }

    match run(&args) {
        Ok(()) => exit(0),
        Err(err) => {
            error!("{err}");
            exit(2);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    debug!(working_directory = %args.working_directory.display(), "resolving repository");
    let repo = GixRepository::discover(&args.working_directory)?;

    let config = load_config(args)?;

    let options = ContextOptions {
        target_branch: args.branch.clone(),
        commit_sha: args.commit.clone(),
    };

    let result = tagver::calculate(&repo, &config, &options, args.explain)
        .map_err(|e: TagVerError| anyhow::anyhow!(e))?;
    let branch_key = config
        .match_branch_key(&result.branch_name)?
        .unwrap_or_else(|| "unknown".to_string());
    let effective = config.effective_configuration_for(&branch_key)?;
    let variables = tagver::format_output(&result, &effective);

    info!(version = %result.version.semver(), branch = %result.branch_name, "version calculated");

    match args.format {
        OutputFormat::Text => print_text(&variables, args.explain, &result),
        OutputFormat::Json => print_json(&variables, args.explain, &result)?,
    }

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<Configuration> {
    let mut builder = Configuration::builder();
    for path in &args.config {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config file {}: {e}", path.display()))?;
        builder = builder.with_yaml_overlay(&yaml)?;
    }
    Ok(builder.build()?)
}

fn print_text(variables: &BTreeMap<String, String>, explain: bool, result: &tagver::VersionResult) {
    println!("{}", variables["SemVer"]);
    if explain {
        println!("{}", result.explanation);
    }
}

fn print_json(
    variables: &BTreeMap<String, String>,
    explain: bool,
    result: &tagver::VersionResult,
) -> anyhow::Result<()> {
    let mut output = serde_json::Map::new();
    for (key, value) in variables {
        output.insert(key.clone(), serde_json::Value::String(value.clone()));
    }
    if explain {
        let lines: Vec<serde_json::Value> = result
            .explanation
            .lines()
            .iter()
            .map(|l| serde_json::Value::String(l.clone()))
            .collect();
        output.insert("Explanation".to_string(), serde_json::Value::Array(lines));
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[allow(dead_code)]
fn long_version() -> String {
    format!(
        "{version}\ncommit: {commit} ({date})\nbuild: {build}\nrustc: {rustc}",
        version = CLI_VERSION,
        commit = build::SHORT_COMMIT,
        date = build::COMMIT_DATE,
        build = build::BUILD_TIME,
        rustc = build::RUST_VERSION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parses_from_value_enum() {
        use clap::ValueEnum;
        assert_eq!(OutputFormat::from_str("json", true), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("text", true), Ok(OutputFormat::Text));
    }

    #[test]
    fn verbosity_parses_known_levels() {
        assert_eq!(parse_verbosity("debug").unwrap(), Verbosity::Debug);
        assert!(parse_verbosity("not-a-level").is_err());
    }
}
