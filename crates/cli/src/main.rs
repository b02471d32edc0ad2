// lexcanon CLI - lexicon validation and alt-spelling consolidation

mod exit_codes;
mod fetch;
mod policy;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use lexcanon_engine::{DiagnosticKind, LexiconError, LexiconPolicy, MisspellingPolicy, Report};
use lexcanon_io::{report, tsv};

use exit_codes::{EXIT_FETCH_NO_SOURCE, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "lexcanon")]
#[command(about = "Validate a TSV lexicon and consolidate alternate spellings")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by `validate` and `create`.
#[derive(clap::Args)]
struct RunArgs {
    /// Lexicon file (omit to fetch the latest edition first)
    file: Option<PathBuf>,

    /// Prior revision to compare root status against
    #[arg(long, value_name = "PRIOR")]
    exist: Option<PathBuf>,

    /// Misspelling policy: strict (fatal) or draft (tag)
    #[arg(long, value_name = "POLICY")]
    policy: Option<MisspellingPolicy>,

    /// Policy file (default: <config dir>/lexcanon/policy.toml)
    #[arg(long, env = "LEXCANON_CONFIG")]
    config: Option<PathBuf>,

    /// Sheet export URL used when FILE is omitted
    #[arg(long)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a lexicon without writing anything
    #[command(after_help = "\
Examples:
  lexcanon validate lexicon.txt
  lexcanon validate lexicon.txt --exist previous.txt
  lexcanon validate lexicon.txt --policy draft --json
  lexcanon validate --url 'https://docs.example.com/pub?output=tsv'")]
    Validate {
        #[command(flatten)]
        run: RunArgs,

        /// Print the result as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Consolidate alt spellings and write the report files
    #[command(after_help = "\
Examples:
  lexcanon create lexicon.txt
  lexcanon create lexicon.txt --exist previous.txt --out-dir report/
  lexcanon create --config policy.toml --policy draft")]
    Create {
        #[command(flatten)]
        run: RunArgs,

        /// Directory for out.tsv, new_definitions.txt and autosuggestions.tsv
        #[arg(long, short = 'o', default_value = ".")]
        out_dir: PathBuf,
    },

    /// Download the published sheet and write the latest edition
    #[command(after_help = "\
Examples:
  lexcanon fetch --url 'https://docs.example.com/pub?output=tsv'
  lexcanon fetch --out edition.txt")]
    Fetch {
        /// Sheet export URL (default: [source] url from the policy file)
        #[arg(long)]
        url: Option<String>,

        /// Output file (default: [source] output from the policy file)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Policy file (default: <config dir>/lexcanon/policy.toml)
        #[arg(long, env = "LEXCANON_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Engine failure with its registry exit code.
    pub fn lexicon(err: &LexiconError) -> Self {
        let hint = err
            .diagnostics()
            .iter()
            .any(|d| d.kind == DiagnosticKind::Misspelling)
            .then(|| "use --policy draft to report misspellings as tags".to_string());
        Self { code: exit_codes::lexicon_exit_code(err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("LEXCANON_COMMIT"), ")",
            "\nengine:  lexcanon-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("LEXCANON_TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("LEXCANON_COMMIT"), ")",
            "\nengine:  lexcanon-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("LEXCANON_TARGET"),
        )
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate { run, json } => cmd_validate(run, json),
        Commands::Create { run, out_dir } => cmd_create(run, out_dir),
        Commands::Fetch { url, out, config } => cmd_fetch(url, out, config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Shared input handling
// ============================================================================

/// Lexicon text plus optional prior revision text, after fetching if needed.
struct Inputs {
    lexicon: String,
    prior: Option<String>,
}

fn read_text(path: &Path) -> Result<String, CliError> {
    if !path.exists() {
        return Err(CliError::args(format!("file not found: {}", path.display())));
    }
    tsv::read_lexicon(path).map_err(|e| CliError::io(e.to_string()))
}

/// Source URL from the flag, else from the policy file.
fn source_url(flag: Option<&str>, policy: &LexiconPolicy) -> Result<url::Url, CliError> {
    match flag {
        Some(raw) => fetch::parse_source_url(raw).map_err(CliError::args),
        None => match policy.source.url.as_deref() {
            // already checked when the policy was loaded
            Some(raw) => fetch::parse_source_url(raw).map_err(CliError::args),
            None => Err(CliError {
                code: EXIT_FETCH_NO_SOURCE,
                message: "no lexicon file given and no source URL configured".to_string(),
                hint: Some("pass FILE, --url, or set [source] url in policy.toml".to_string()),
            }),
        },
    }
}

fn load_inputs(args: &RunArgs, policy: &LexiconPolicy) -> Result<Inputs, CliError> {
    let path = match &args.file {
        Some(path) => path.clone(),
        None => {
            let url = source_url(args.url.as_deref(), policy)?;
            let out = PathBuf::from(&policy.source.output);
            let count = fetch::fetch_latest_edition(&url, &out)?;
            eprintln!("fetched {} word(s) into {}", count, out.display());
            out
        }
    };

    let lexicon = read_text(&path)?;
    let prior = args.exist.as_deref().map(read_text).transpose()?;
    Ok(Inputs { lexicon, prior })
}

fn run_pipeline(args: &RunArgs) -> Result<Result<Report, LexiconError>, CliError> {
    let policy = policy::load_policy(args.config.as_deref(), args.policy)?;
    let inputs = load_inputs(args, &policy)?;
    Ok(lexcanon_engine::run(&inputs.lexicon, inputs.prior.as_deref(), &policy))
}

fn print_warnings(report: &Report) {
    for warning in &report.warnings {
        log::warn!("{warning}");
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(args: RunArgs, json: bool) -> Result<(), CliError> {
    let outcome = run_pipeline(&args)?;

    if json {
        let value = match &outcome {
            Ok(report) => serde_json::json!({
                "ok": true,
                "summary": report.summary,
                "warnings": report.warnings,
            }),
            Err(err) => {
                let text = err.to_string();
                let headline = text.lines().next().unwrap_or_default();
                serde_json::json!({
                    "ok": false,
                    "error": headline,
                    "diagnostics": err.diagnostics(),
                })
            }
        };
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError { code: exit_codes::EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{text}");

        // the JSON already carries the details
        return outcome.map(|_| ()).map_err(|err| CliError {
            message: String::new(),
            hint: None,
            ..CliError::lexicon(&err)
        });
    }

    let report = outcome.map_err(|err| CliError::lexicon(&err))?;
    print_warnings(&report);
    let s = &report.summary;
    println!(
        "ok: {} word(s), {} entr{}, {} warning(s), {} row(s) would change",
        s.words,
        s.entries,
        if s.entries == 1 { "y" } else { "ies" },
        report.warnings.len(),
        s.changed_rows,
    );
    Ok(())
}

// ============================================================================
// create
// ============================================================================

fn cmd_create(args: RunArgs, out_dir: PathBuf) -> Result<(), CliError> {
    let report = run_pipeline(&args)?.map_err(|err| CliError::lexicon(&err))?;
    print_warnings(&report);

    let files = report::write_report(&report, &out_dir).map_err(|e| {
        CliError::io(e.to_string()).with_hint("check that --out-dir is writable")
    })?;

    print!("{}", report::new_definitions_log(&report));
    eprintln!(
        "wrote {}, {}, {}",
        files.out.display(),
        files.new_definitions.display(),
        files.autosuggestions.display(),
    );
    Ok(())
}

// ============================================================================
// fetch
// ============================================================================

fn cmd_fetch(url: Option<String>, out: Option<PathBuf>, config: Option<PathBuf>) -> Result<(), CliError> {
    let policy = policy::load_policy(config.as_deref(), None)?;
    let url = source_url(url.as_deref(), &policy)?;
    let out = out.unwrap_or_else(|| PathBuf::from(&policy.source.output));

    let count = fetch::fetch_latest_edition(&url, &out)?;
    println!("Total: {count}");
    Ok(())
}
