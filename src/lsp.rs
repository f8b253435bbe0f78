//! LSP (Language Server Protocol) server for siteplan.
//!
//! Exposes every operation in `ops` as a custom `workspace/executeCommand`
//! so that editors (VS Code, Zed, Neovim, etc.) can invoke them over stdio.
//!
//! Start with: `siteplan --lsp`
//!
//! ## Commands
//!
//! All commands accept a single JSON object argument and return JSON results:
//!
//! | Command                 | Description                                      |
//! |-------------------------|--------------------------------------------------|
//! | `siteplan.parse`        | Parse pasted keyword text into `{term, volume}`  |
//! | `siteplan.sample`       | The bundled sample keyword list, parsed          |
//! | `siteplan.analyze`      | Classify a batch and reattach input volumes      |
//! | `siteplan.reattach`     | Reattach input volumes to classified records     |
//! | `siteplan.tree`         | Theme > Pillar > Page tree with health labels    |
//! | `siteplan.health`       | Cluster health per theme                         |
//! | `siteplan.table`        | Flat table, filtered by intent and sorted        |
//! | `siteplan.sort_toggle`  | Next sort state after selecting a column         |
//! | `siteplan.summary`      | Overview counters and intent distribution        |
//! | `siteplan.export`       | CSV rendering of the records                     |
//! | `siteplan.results`      | Stored result set (`cache` builds)               |
//! | `siteplan.info`         | Stored result metadata only (`cache` builds)     |
//! | `siteplan.clear`        | Delete the stored result set (`cache` builds)    |

use serde_json::{json, Value};
use tower_lsp::jsonrpc::{Error as RpcError, Result as RpcResult};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use crate::algo::classifier::response_rows;
use crate::algo::config::Config;
use crate::error::{Result, SiteplanError};
use crate::ops::{self, ClassifierSource};

// ── Constants ───────────────────────────────────────────────────────────────

const COMMAND_PARSE: &str = "siteplan.parse";
const COMMAND_SAMPLE: &str = "siteplan.sample";
const COMMAND_ANALYZE: &str = "siteplan.analyze";
const COMMAND_REATTACH: &str = "siteplan.reattach";
const COMMAND_TREE: &str = "siteplan.tree";
const COMMAND_HEALTH: &str = "siteplan.health";
const COMMAND_TABLE: &str = "siteplan.table";
const COMMAND_SORT_TOGGLE: &str = "siteplan.sort_toggle";
const COMMAND_SUMMARY: &str = "siteplan.summary";
const COMMAND_EXPORT: &str = "siteplan.export";
#[cfg(feature = "cache")]
const COMMAND_RESULTS: &str = "siteplan.results";
#[cfg(feature = "cache")]
const COMMAND_INFO: &str = "siteplan.info";
#[cfg(feature = "cache")]
const COMMAND_CLEAR: &str = "siteplan.clear";

const ALL_COMMANDS: &[&str] = &[
    COMMAND_PARSE,
    COMMAND_SAMPLE,
    COMMAND_ANALYZE,
    COMMAND_REATTACH,
    COMMAND_TREE,
    COMMAND_HEALTH,
    COMMAND_TABLE,
    COMMAND_SORT_TOGGLE,
    COMMAND_SUMMARY,
    COMMAND_EXPORT,
    #[cfg(feature = "cache")]
    COMMAND_RESULTS,
    #[cfg(feature = "cache")]
    COMMAND_INFO,
    #[cfg(feature = "cache")]
    COMMAND_CLEAR,
];

// ── Server struct ───────────────────────────────────────────────────────────

pub struct SiteplanLsp {
    client: Client,
    config: Config,
}

impl SiteplanLsp {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }
}

// ── LanguageServer impl ─────────────────────────────────────────────────────

#[tower_lsp::async_trait]
impl LanguageServer for SiteplanLsp {
    async fn initialize(&self, _: InitializeParams) -> RpcResult<InitializeResult> {
        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "siteplan".into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
            capabilities: ServerCapabilities {
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: ALL_COMMANDS.iter().map(|s| s.to_string()).collect(),
                    work_done_progress_options: WorkDoneProgressOptions {
                        work_done_progress: Some(false),
                    },
                }),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::NONE,
                )),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(
                MessageType::INFO,
                format!(
                    "siteplan LSP server v{} ready, {} commands registered",
                    env!("CARGO_PKG_VERSION"),
                    ALL_COMMANDS.len()
                ),
            )
            .await;
    }

    async fn shutdown(&self) -> RpcResult<()> {
        Ok(())
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> RpcResult<Option<Value>> {
        let cmd = params.command.as_str();

        let arg = params
            .arguments
            .into_iter()
            .next()
            .unwrap_or(Value::Object(serde_json::Map::new()));

        let result = dispatch(cmd, &arg, &self.config);

        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let msg = e.to_string();
                self.client.log_message(MessageType::ERROR, &msg).await;
                Err(RpcError::invalid_params(msg))
            }
        }
    }
}

// ── Entry point ─────────────────────────────────────────────────────────────

/// Start the LSP server on stdio. Called from `cli.rs` when `--lsp` is passed.
pub async fn serve_stdio(config: Config) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(move |client| SiteplanLsp::new(client, config));
    Server::new(stdin, stdout, socket).serve(service).await;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
//  Thin command dispatchers: extract params, delegate to ops::op_*
// ═══════════════════════════════════════════════════════════════════════════

fn dispatch(cmd: &str, arg: &Value, config: &Config) -> Result<Value> {
    match cmd {
        COMMAND_PARSE => Ok(ops::op_parse(get_required_str(arg, "text")?)),
        COMMAND_SAMPLE => Ok(ops::op_sample()),
        COMMAND_ANALYZE => exec_analyze(arg, config),
        COMMAND_REATTACH => ops::op_reattach(&get_array(arg, "keywords")?, &get_records(arg)?),
        COMMAND_TREE => ops::op_tree(&get_records(arg)?, get_str(arg, "filter", "all"), config),
        COMMAND_HEALTH => {
            ops::op_health(&get_records(arg)?, get_str(arg, "filter", "all"), config)
        }
        COMMAND_TABLE => ops::op_table(
            &get_records(arg)?,
            get_str(arg, "filter", "all"),
            get_str(arg, "sort", "volume"),
            get_str(arg, "direction", "desc"),
        ),
        COMMAND_SORT_TOGGLE => ops::op_sort_toggle(
            get_str(arg, "key", "volume"),
            get_str(arg, "direction", "desc"),
            get_required_str(arg, "select")?,
        ),
        COMMAND_SUMMARY => ops::op_summary(&get_records(arg)?, config),
        COMMAND_EXPORT => Ok(json!({"csv": ops::op_export_csv(&get_records(arg)?)})),
        #[cfg(feature = "cache")]
        COMMAND_RESULTS => ops::op_results(get_required_str(arg, "store")?),
        #[cfg(feature = "cache")]
        COMMAND_INFO => ops::op_info(get_required_str(arg, "store")?),
        #[cfg(feature = "cache")]
        COMMAND_CLEAR => ops::op_clear(get_required_str(arg, "store")?),
        _ => Err(SiteplanError::invalid(format!("Unknown command: {cmd}"))),
    }
}

fn exec_analyze(arg: &Value, config: &Config) -> Result<Value> {
    let keywords = get_array(arg, "keywords")?;
    let store = arg.get("store").and_then(|v| v.as_str());
    if let Some(line) = arg.get("classifier").and_then(|v| v.as_str()) {
        return ops::op_analyze(&keywords, ClassifierSource::Command(line), config, store);
    }
    match arg.get("response").filter(|v| !v.is_null()) {
        Some(response) => ops::op_analyze(
            &keywords,
            ClassifierSource::Precomputed(response_rows(response)?),
            config,
            store,
        ),
        None => Err(SiteplanError::invalid(
            "Missing 'classifier' (command line) or 'response' (JSON array)",
        )),
    }
}

fn get_array(arg: &Value, key: &str) -> Result<Vec<Value>> {
    arg.get(key)
        .and_then(|v| v.as_array())
        .cloned()
        .ok_or_else(|| SiteplanError::invalid(format!("Missing required field '{key}' (JSON array)")))
}

fn get_records(arg: &Value) -> Result<Vec<Value>> {
    get_array(arg, "records")
}

fn get_str<'a>(arg: &'a Value, key: &str, default: &'a str) -> &'a str {
    arg.get(key).and_then(|v| v.as_str()).unwrap_or(default)
}

fn get_required_str<'a>(arg: &'a Value, key: &str) -> Result<&'a str> {
    arg.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SiteplanError::invalid(format!("Missing required string field '{key}'")))
}
