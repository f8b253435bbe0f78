//! MCP (Model Context Protocol) server for siteplan.
//!
//! Exposes every operation in `ops` as an MCP tool so that AI assistants
//! (Claude Desktop, Cursor, etc.) can invoke them over stdio JSON-RPC.
//!
//! Start with: `siteplan --mcp`

use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRouter},
    handler::server::wrapper::Parameters,
    model::*,
    service::RequestContext,
    tool, tool_router, ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::algo::classifier::response_rows;
use crate::algo::config::Config;
use crate::error::SiteplanError;
use crate::ops::{self, ClassifierSource};

// ── Parameter structs ───────────────────────────────────────────────────────
// Each struct maps 1:1 with a CLI subcommand. `JsonSchema` is required by
// rmcp so that the tool's input schema is auto-generated for the AI client.

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ParseParams {
    /// Pasted keyword text: one `keyword<TAB or comma>volume` per line.
    pub text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeParams {
    /// Keyword batch: `{term, volume}` objects or bare strings (max 100 by default).
    pub keywords: Vec<Value>,
    /// Classifier command line. Receives the batch as JSON on stdin and must
    /// print a JSON array of classified records.
    pub classifier: Option<String>,
    /// Already-produced classifier response (array, or object with `results`).
    pub response: Option<Value>,
    /// SQLite file that receives the result set on success (`cache` builds only).
    pub store: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReattachParams {
    /// The `{term, volume}` input batch.
    pub keywords: Vec<Value>,
    /// Classified records whose volumes should be replaced.
    pub records: Vec<Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FilterParams {
    /// Classified records (output of `analyze`).
    pub records: Vec<Value>,
    /// Intent filter: "all", "product", "collection", "article", "unknown".
    #[serde(default = "default_filter")]
    pub filter: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TableParams {
    /// Classified records (output of `analyze`).
    pub records: Vec<Value>,
    /// Intent filter: "all", "product", "collection", "article", "unknown".
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Sort key: "keyword", "volume", "confidenceScore" (default: "volume").
    #[serde(default = "default_sort")]
    pub sort: String,
    /// Sort direction: "asc" or "desc" (default: "desc").
    #[serde(default = "default_direction")]
    pub direction: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SortToggleParams {
    /// Column being selected.
    pub select: String,
    /// Current sort key (default: "volume").
    #[serde(default = "default_sort")]
    pub key: String,
    /// Current sort direction (default: "desc").
    #[serde(default = "default_direction")]
    pub direction: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecordsParams {
    /// Classified records (output of `analyze`).
    pub records: Vec<Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StoreParams {
    /// Path to the SQLite result store.
    pub store: String,
}

// ── Default helpers ─────────────────────────────────────────────────────────

fn default_filter() -> String {
    "all".into()
}
fn default_sort() -> String {
    "volume".into()
}
fn default_direction() -> String {
    "desc".into()
}

// ── Shared helpers ──────────────────────────────────────────────────────────

fn json_text(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

fn to_mcp_error(e: SiteplanError) -> McpError {
    match e {
        SiteplanError::InvalidArgument { .. }
        | SiteplanError::EmptyInput
        | SiteplanError::TooManyKeywords { .. } => McpError::invalid_params(e.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn join_error(e: tokio::task::JoinError) -> McpError {
    McpError::internal_error(format!("task join error: {e}"), None)
}

fn success(value: &Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(json_text(value))]))
}

// ── MCP Server ──────────────────────────────────────────────────────────────

/// The MCP server struct: the resolved config and the generated tool router.
#[derive(Clone)]
pub struct SiteplanMcp {
    config: Config,
    #[allow(dead_code)] // accessed at runtime by the #[tool_router] macro
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SiteplanMcp {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }

    // ── parse ───────────────────────────────────────────────────────────

    #[tool(
        name = "parse",
        description = "Parse pasted keyword text into `{term, volume}` rows. Each line is split on tabs or commas; the first field is the keyword, the second (digits only) is the monthly search volume. Blank lines are dropped."
    )]
    async fn parse(&self, params: Parameters<ParseParams>) -> Result<CallToolResult, McpError> {
        success(&ops::op_parse(&params.0.text))
    }

    #[tool(
        name = "sample",
        description = "Return the bundled sample keyword list as parsed `{term, volume}` rows."
    )]
    async fn sample(&self) -> Result<CallToolResult, McpError> {
        success(&ops::op_sample())
    }

    // ── analyze ─────────────────────────────────────────────────────────

    #[tool(
        name = "analyze",
        description = "Classify a keyword batch and reattach each keyword's input volume. Provide either `classifier` (a command that reads the batch as JSON on stdin and prints classified records) or `response` (records already produced by a classifier). Empty batches and batches over the limit are rejected before classification."
    )]
    async fn analyze(&self, params: Parameters<AnalyzeParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let config = self.config.clone();
        let result = tokio::task::spawn_blocking(move || -> crate::error::Result<Value> {
            match (p.classifier.as_deref(), p.response.as_ref()) {
                (Some(line), _) => ops::op_analyze(
                    &p.keywords,
                    ClassifierSource::Command(line),
                    &config,
                    p.store.as_deref(),
                ),
                (None, Some(response)) => ops::op_analyze(
                    &p.keywords,
                    ClassifierSource::Precomputed(response_rows(response)?),
                    &config,
                    p.store.as_deref(),
                ),
                (None, None) => Err(SiteplanError::invalid(
                    "analyze needs `classifier` or `response`",
                )),
            }
        })
        .await
        .map_err(join_error)?
        .map_err(to_mcp_error)?;
        success(&result)
    }

    #[tool(
        name = "reattach",
        description = "Replace the volume of each classified record with the volume of the matching input keyword (exact match first, then case-insensitive, else 0)."
    )]
    async fn reattach(&self, params: Parameters<ReattachParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = ops::op_reattach(&p.keywords, &p.records).map_err(to_mcp_error)?;
        success(&result)
    }

    // ── views ───────────────────────────────────────────────────────────

    #[tool(
        name = "tree",
        description = "Build the Theme > Pillar > Page site tree. Themes are ordered by total volume, pages by their primary keyword's volume; synonyms are folded under their canonical page. Each theme carries a cluster health label."
    )]
    async fn tree(&self, params: Parameters<FilterParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = ops::op_tree(&p.records, &p.filter, &self.config).map_err(to_mcp_error)?;
        success(&result)
    }

    #[tool(
        name = "health",
        description = "Cluster health per theme: strong (5+ distinct pages), medium (3-4), weak (fewer)."
    )]
    async fn health(&self, params: Parameters<FilterParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = ops::op_health(&p.records, &p.filter, &self.config).map_err(to_mcp_error)?;
        success(&result)
    }

    #[tool(
        name = "table",
        description = "Flat keyword table: keep records matching the intent filter, then stable-sort by keyword, volume, or confidenceScore."
    )]
    async fn table(&self, params: Parameters<TableParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = ops::op_table(&p.records, &p.filter, &p.sort, &p.direction)
            .map_err(to_mcp_error)?;
        success(&result)
    }

    #[tool(
        name = "sort_toggle",
        description = "Next table sort state: selecting the current key flips the direction, a new key starts descending."
    )]
    async fn sort_toggle(
        &self,
        params: Parameters<SortToggleParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result =
            ops::op_sort_toggle(&p.key, &p.direction, &p.select).map_err(to_mcp_error)?;
        success(&result)
    }

    #[tool(
        name = "summary",
        description = "Overview counters (keywords, total volume, themes, pillars, pages, hub pages) plus the keyword count per intent."
    )]
    async fn summary(&self, params: Parameters<RecordsParams>) -> Result<CallToolResult, McpError> {
        let result = ops::op_summary(&params.0.records, &self.config).map_err(to_mcp_error)?;
        success(&result)
    }

    #[tool(
        name = "export",
        description = "Render classified records as CSV text with a header row."
    )]
    async fn export(&self, params: Parameters<RecordsParams>) -> Result<CallToolResult, McpError> {
        let csv = ops::op_export_csv(&params.0.records);
        Ok(CallToolResult::success(vec![Content::text(csv)]))
    }

    // ── result store ────────────────────────────────────────────────────

    #[tool(
        name = "results",
        description = "Read the result set stored by the last successful `analyze` with a `store` path. Returns null when the store is empty."
    )]
    async fn results(&self, params: Parameters<StoreParams>) -> Result<CallToolResult, McpError> {
        let store = params.0.store;
        let result = tokio::task::spawn_blocking(move || stored_results(&store))
            .await
            .map_err(join_error)?
            .map_err(to_mcp_error)?;
        success(&result)
    }

    #[tool(
        name = "info",
        description = "Metadata of the stored result set (input hash, counts, version, created_at) without the records. Returns null when the store is empty."
    )]
    async fn info(&self, params: Parameters<StoreParams>) -> Result<CallToolResult, McpError> {
        let store = params.0.store;
        let result = tokio::task::spawn_blocking(move || stored_info(&store))
            .await
            .map_err(join_error)?
            .map_err(to_mcp_error)?;
        success(&result)
    }

    #[tool(name = "clear", description = "Delete the stored result set.")]
    async fn clear(&self, params: Parameters<StoreParams>) -> Result<CallToolResult, McpError> {
        let store = params.0.store;
        let result = tokio::task::spawn_blocking(move || clear_results(&store))
            .await
            .map_err(join_error)?
            .map_err(to_mcp_error)?;
        success(&result)
    }
}

#[cfg(feature = "cache")]
fn stored_results(store: &str) -> crate::error::Result<Value> {
    ops::op_results(store)
}

#[cfg(feature = "cache")]
fn stored_info(store: &str) -> crate::error::Result<Value> {
    ops::op_info(store)
}

#[cfg(feature = "cache")]
fn clear_results(store: &str) -> crate::error::Result<Value> {
    ops::op_clear(store)
}

#[cfg(not(feature = "cache"))]
fn stored_results(_store: &str) -> crate::error::Result<Value> {
    Err(SiteplanError::invalid("built without the `cache` feature"))
}

#[cfg(not(feature = "cache"))]
fn stored_info(_store: &str) -> crate::error::Result<Value> {
    Err(SiteplanError::invalid("built without the `cache` feature"))
}

#[cfg(not(feature = "cache"))]
fn clear_results(_store: &str) -> crate::error::Result<Value> {
    Err(SiteplanError::invalid("built without the `cache` feature"))
}

// ── ServerHandler glue ──────────────────────────────────────────────────────

impl ServerHandler for SiteplanMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Keyword site-architecture planner. Tools: parse, sample, analyze, reattach, \
                 tree, health, table, sort_toggle, summary, export, results, info, clear. \
                 Run `analyze` once, then pass its records to the view tools."
                    .into(),
            ),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "siteplan".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Siteplan".into()),
                description: Some(
                    "Keyword site-architecture planner: Theme > Pillar > Page".into(),
                ),
                icons: None,
                website_url: None,
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: Default::default(),
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_context = ToolCallContext::new(self, request, context);
        async move { self.tool_router.call(tool_context).await }
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tool_router.get(name).cloned()
    }
}

// ── Entry point ─────────────────────────────────────────────────────────────

/// Start the MCP server on stdio. Called from `cli.rs` when `--mcp` is passed.
pub async fn serve_stdio(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let server = SiteplanMcp::new(config);
    let transport = rmcp::transport::io::stdio();
    let service = server.serve(transport).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP serve error");
    })?;
    service.waiting().await?;
    Ok(())
}
