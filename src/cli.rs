use clap::{ArgAction, Parser, Subcommand};
use nu_plugin_siteplan::algo::classifier::response_rows;
use nu_plugin_siteplan::algo::config::{self, Config};
use nu_plugin_siteplan::error::{Result, SiteplanError};
use nu_plugin_siteplan::logging;
use nu_plugin_siteplan::ops::{self, ClassifierSource};
use serde_json::Value;
use std::io::{self, Read};

#[derive(Parser)]
#[command(
    name = "siteplan",
    version,
    about = "Keyword site-architecture planner: Theme > Pillar > Page"
)]
struct Cli {
    /// Start as an MCP (Model Context Protocol) server on stdio.
    /// AI assistants (Claude Desktop, Cursor, etc.) connect via JSON-RPC.
    #[cfg(feature = "mcp")]
    #[arg(long, exclusive = true)]
    mcp: bool,

    /// Start as an LSP (Language Server Protocol) server on stdio.
    /// Editors (VS Code, Zed, Neovim, etc.) connect via JSON-RPC.
    #[cfg(feature = "lsp")]
    #[arg(long, exclusive = true)]
    lsp: bool,

    /// Path to a JSON config file (overrides $SITEPLAN_CONFIG and the XDG file)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Logs go to stderr
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse pasted keyword text (keyword<TAB or comma>volume per line) from stdin
    Parse {
        /// Parse the bundled sample list instead of stdin
        #[arg(long)]
        sample: bool,
    },
    /// Classify a keyword batch (JSON on stdin) and reattach input volumes
    Analyze {
        /// Classifier command line; receives the batch as JSON on stdin
        #[arg(short, long, conflicts_with = "response")]
        classifier: Option<String>,
        /// File holding an already-produced classifier response (JSON array)
        #[arg(short, long)]
        response: Option<String>,
        /// Treat stdin as pasted keyword text instead of JSON
        #[arg(long)]
        text: bool,
        /// Replace the stored result set in this SQLite file on success
        /// (needs the `cache` feature)
        #[arg(long)]
        store: Option<String>,
    },
    /// Overwrite record volumes (JSON on stdin) with the input batch volumes
    Reattach {
        /// JSON file with the `{term, volume}` input batch
        #[arg(short, long)]
        inputs: String,
    },
    /// Build the Theme > Pillar > Page tree from records on stdin
    Tree {
        /// Intent filter: all, product, collection, article, unknown
        #[arg(short, long, default_value = "all")]
        filter: String,
    },
    /// Cluster health per theme
    Health {
        /// Intent filter: all, product, collection, article, unknown
        #[arg(short, long, default_value = "all")]
        filter: String,
    },
    /// Flat keyword table: filter by intent and sort by one column
    Table {
        /// Intent filter: all, product, collection, article, unknown
        #[arg(short, long, default_value = "all")]
        filter: String,
        /// Sort key: keyword, volume, confidenceScore
        #[arg(short, long, default_value = "volume")]
        sort: String,
        /// Sort direction: asc, desc
        #[arg(short, long, default_value = "desc")]
        direction: String,
    },
    /// Next table sort state after selecting a column
    #[command(name = "sort-toggle")]
    SortToggle {
        /// Column being selected
        select: String,
        /// Current sort key
        #[arg(long, default_value = "volume")]
        key: String,
        /// Current sort direction
        #[arg(long, default_value = "desc")]
        direction: String,
    },
    /// Overview counters and intent distribution
    Summary,
    /// Render records as CSV
    Export,
    /// Print the stored result set
    #[cfg(feature = "cache")]
    Results {
        /// SQLite store path
        #[arg(long)]
        store: String,
    },
    /// Print the stored result set's metadata only
    #[cfg(feature = "cache")]
    Info {
        /// SQLite store path
        #[arg(long)]
        store: String,
    },
    /// Delete the stored result set
    #[cfg(feature = "cache")]
    Clear {
        /// SQLite store path
        #[arg(long)]
        store: String,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let config = match config::resolve_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // ── MCP server mode ─────────────────────────────────────────────────
    #[cfg(feature = "mcp")]
    if cli.mcp {
        serve(nu_plugin_siteplan::mcp::serve_stdio(config), "MCP");
        return;
    }

    // ── LSP server mode ─────────────────────────────────────────────────
    #[cfg(feature = "lsp")]
    if cli.lsp {
        serve(nu_plugin_siteplan::lsp::serve_stdio(config), "LSP");
        return;
    }

    // ── Normal subcommand dispatch ──────────────────────────────────────
    let Some(command) = cli.command else {
        eprintln!("No subcommand provided. Run `siteplan --help` for usage.");
        std::process::exit(1);
    };

    if let Err(e) = dispatch(command, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(any(feature = "mcp", feature = "lsp"))]
fn serve<F>(server: F, name: &str)
where
    F: std::future::Future<Output = std::result::Result<(), Box<dyn std::error::Error>>>,
{
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(server) {
        eprintln!("{name} server error: {e}");
        std::process::exit(1);
    }
}

fn dispatch(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Parse { sample } => {
            let parsed = if sample {
                ops::op_sample()
            } else {
                ops::op_parse(&read_stdin()?)
            };
            print_json(&parsed)
        }
        Commands::Analyze {
            classifier,
            response,
            text,
            store,
        } => {
            let inputs = if text {
                as_rows(ops::op_parse(&read_stdin()?))
            } else {
                read_stdin_json()?
            };
            let output = match (classifier, response) {
                (Some(line), _) => ops::op_analyze(
                    &inputs,
                    ClassifierSource::Command(&line),
                    config,
                    store.as_deref(),
                )?,
                (None, Some(path)) => {
                    let response = read_json_value(&path)?;
                    let rows = response_rows(&response)?;
                    ops::op_analyze(
                        &inputs,
                        ClassifierSource::Precomputed(rows),
                        config,
                        store.as_deref(),
                    )?
                }
                (None, None) => {
                    return Err(SiteplanError::invalid(
                        "analyze needs --classifier <command> or --response <file>",
                    ))
                }
            };
            print_json(&output)
        }
        Commands::Reattach { inputs } => {
            let inputs = read_json_file(&inputs)?;
            print_json(&ops::op_reattach(&inputs, &read_stdin_json()?)?)
        }
        Commands::Tree { filter } => print_json(&ops::op_tree(&read_stdin_json()?, &filter, config)?),
        Commands::Health { filter } => {
            print_json(&ops::op_health(&read_stdin_json()?, &filter, config)?)
        }
        Commands::Table {
            filter,
            sort,
            direction,
        } => print_json(&ops::op_table(&read_stdin_json()?, &filter, &sort, &direction)?),
        Commands::SortToggle {
            select,
            key,
            direction,
        } => print_json(&ops::op_sort_toggle(&key, &direction, &select)?),
        Commands::Summary => print_json(&ops::op_summary(&read_stdin_json()?, config)?),
        Commands::Export => {
            println!("{}", ops::op_export_csv(&read_stdin_json()?));
            Ok(())
        }
        #[cfg(feature = "cache")]
        Commands::Results { store } => print_json(&ops::op_results(&store)?),
        #[cfg(feature = "cache")]
        Commands::Info { store } => print_json(&ops::op_info(&store)?),
        #[cfg(feature = "cache")]
        Commands::Clear { store } => print_json(&ops::op_clear(&store)?),
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| SiteplanError::io("<stdin>", e))?;
    Ok(buf)
}

fn as_rows(parsed: Value) -> Vec<Value> {
    match parsed {
        Value::Array(arr) => arr,
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

fn read_stdin_json() -> Result<Vec<Value>> {
    let buf = read_stdin()?;
    if buf.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(as_rows(serde_json::from_str(&buf)?))
}

fn read_json_value(path: &str) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| SiteplanError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

fn read_json_file(path: &str) -> Result<Vec<Value>> {
    Ok(as_rows(read_json_value(path)?))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
