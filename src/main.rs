mod cli;

use anyhow::{Context, Result};
use budget_insight::{load_path, Insight, InsightConfig, InsightEngine, RecordSet, VERSION};
use cli::{Args, Command, OutputFormat};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse_args();

    if args.init_config {
        return handle_init_config();
    }

    let mut config = InsightConfig::resolve(args.config.as_deref())?;
    if let Some(fallback) = args.fallback {
        config.insight.fallback = fallback;
    }

    init_logging(&args.log_filter(&config.logging.level));
    info!("Budget Insight v{}", VERSION);
    debug!("Arguments: {:?}", args);

    let engine = InsightEngine::with_fallback(config.insight.fallback);

    match args.command {
        Some(Command::Ask {
            data,
            question,
            format,
        }) => run_ask(&engine, &data, &question, format),
        Some(Command::Chat { data }) => run_chat(&engine, &data),
        None => {
            eprintln!("❌ No command given.");
            eprintln!("   Run: budget-insight ask --data <FILE> \"<QUESTION>\"");
            eprintln!("   or:  budget-insight chat --data <FILE>");
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: write a default budget-insight.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(budget_insight::config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", path.display());
        std::process::exit(1);
    }

    std::fs::write(path, InsightConfig::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created {} with default settings.", path.display());
    Ok(())
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// Load the data file, or report "could not load data" and exit 1.
fn load_or_exit(path: &Path) -> RecordSet {
    match load_path(path) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

fn run_ask(engine: &InsightEngine, data: &Path, question: &str, format: OutputFormat) -> Result<()> {
    let records = load_or_exit(data);

    match engine.ask(question, &records) {
        Ok(insight) => print_insight(&insight, format),
        Err(e) => {
            eprintln!("⚠️  {}", e);
            std::process::exit(1);
        }
    }
}

fn print_insight(insight: &Insight, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", insight.narrative),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(insight).context("Failed to serialize insight")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn run_chat(engine: &InsightEngine, data: &Path) -> Result<()> {
    let mut records = load_or_exit(data);

    println!("📊 Loaded {} budget records from {}", records.len(), data.display());
    println!("   Ask a question, `:load <file>` to switch data, `:quit` to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read question")? == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == ":quit" || input == ":q" {
            break;
        }

        if let Some(path) = input.strip_prefix(":load") {
            let path = Path::new(path.trim());
            match load_path(path) {
                Ok(new_records) => {
                    records = new_records;
                    println!("📊 Loaded {} budget records from {}\n", records.len(), path.display());
                }
                // keep answering from the previous upload
                Err(e) => {
                    warn!("reload failed: {}", e);
                    println!("❌ {}\n", e);
                }
            }
            continue;
        }

        match engine.ask(input, &records) {
            Ok(insight) => println!("{}\n", insight.narrative),
            Err(e) => println!("⚠️  {}\n", e),
        }
    }

    println!("👋 Bye");
    Ok(())
}
