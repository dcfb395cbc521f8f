//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes an analysis session over stdio: load review tables, chart word
//! frequencies, drill into the comments behind a word, and manage the
//! session's stop words. Each tool delegates to `review-lens-core`.
//!
//! One server owns one [`Session`]. Loaded rows and user stop words persist
//! across tool calls until the connection closes.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use camino::Utf8PathBuf;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use review_lens_core::{
    AnalysisError, CategorySelector, Config, FileOutcome, Highlighter, Markup, RecordFilter, Scope,
    Session, SessionOptions,
};

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `load_files` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct LoadFilesParams {
    /// Paths of review tables (CSV or spreadsheet workbooks) to load.
    pub paths: Vec<String>,
    /// Drop previously loaded rows first.
    #[serde(default)]
    pub replace: bool,
}

/// Filters shared by `analyze` and `show_comments`.
#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct FilterParams {
    /// Keep only comments containing this text.
    pub keyword: Option<String>,
    /// Category selectors: "all", "suggestion", "negative".
    #[serde(default)]
    pub categories: Vec<String>,
}

impl FilterParams {
    fn to_filter(&self) -> Result<RecordFilter, McpError> {
        let categories = self
            .categories
            .iter()
            .map(|c| CategorySelector::from_str(c))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid_params)?;
        let mut filter = RecordFilter::new().with_categories(categories);
        if let Some(ref keyword) = self.keyword {
            filter = filter.with_keyword(keyword.clone());
        }
        Ok(filter)
    }
}

/// Parameters for the `analyze` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AnalyzeParams {
    /// Record filters.
    #[serde(flatten)]
    pub filter: FilterParams,
    /// Scopes to report: "overall", "low-score", "suggestion", "negative". Omit for all.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Words per scope.
    pub top_n: Option<usize>,
}

/// Parameters for the `show_comments` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ShowCommentsParams {
    /// Word to look up.
    pub word: String,
    /// Scope the word was picked from. Defaults to "overall".
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Record filters, normally the same as the `analyze` call.
    #[serde(flatten)]
    pub filter: FilterParams,
    /// Highlight markup: "html" or "plain". Defaults to "html".
    #[serde(default = "default_markup")]
    pub markup: String,
}

fn default_scope() -> String {
    Scope::Overall.as_str().to_string()
}

fn default_markup() -> String {
    "html".to_string()
}

/// Parameters for the `add_stop_words` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddStopWordsParams {
    /// Words separated by spaces, commas, 、 or semicolons.
    pub words: String,
}

/// Parameters for the `remove_stop_word` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct RemoveStopWordParams {
    /// The user stop word to remove.
    pub word: String,
}

/// Parameters for the `list_stop_words` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ListStopWordsParams {
    /// List only user words, not the built-in set.
    #[serde(default)]
    pub user_only: bool,
}

#[derive(Serialize)]
struct LoadSummary<'a> {
    files: &'a [FileOutcome],
    total_rows: usize,
}

#[derive(Serialize)]
struct RenderedComment<'a> {
    comment: &'a str,
    source: &'a str,
    highlighted: String,
}

#[derive(Serialize)]
struct StopWordsSummary<'a> {
    user: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effective: Option<Vec<&'a str>>,
}

fn invalid_params(e: AnalysisError) -> McpError {
    McpError::invalid_params(e.to_string(), None)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))
}

/// MCP server holding one analysis session.
#[derive(Clone)]
pub struct ReviewServer {
    session: Arc<Mutex<Session>>,
    top_n: usize,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

impl Default for ReviewServer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[tool_router]
impl ReviewServer {
    /// Create a server whose session follows `config`.
    pub fn new(config: Config) -> Self {
        let mut session = Session::new(SessionOptions::from_config(&config));
        for word in &config.stop_words {
            session.stop_words_mut().add(word);
        }
        Self::with_session(session, config.top_n)
    }

    /// Create a server around an existing session.
    pub fn with_session(session: Session, top_n: usize) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            top_n,
            tool_router: Self::tool_router(),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>, McpError> {
        self.session
            .lock()
            .map_err(|_| McpError::internal_error("session lock poisoned", None))
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
        });

        let text = if params.format == "json" {
            to_json(&info)?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        tracing::info!(tool = "get_info", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Load review tables into the session.
    #[tool(
        description = "Load review tables (CSV or xlsx/xls/ods) into the session. Each file is reported separately; a bad file does not block the others."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", files = params.paths.len()))]
    fn load_files(
        &self,
        Parameters(params): Parameters<LoadFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "load_files", replace = params.replace, "executing MCP tool");

        let paths: Vec<Utf8PathBuf> = params.paths.iter().map(Utf8PathBuf::from).collect();
        let mut session = self.session()?;
        if params.replace {
            session.clear_dataset();
        }
        let outcomes = session.load_files(&paths, |_| {});
        let summary = LoadSummary {
            files: &outcomes,
            total_rows: session.dataset().len(),
        };

        tracing::info!(tool = "load_files", rows = summary.total_rows, "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(to_json(&summary)?)]))
    }

    /// Word frequencies per scope.
    #[tool(
        description = "Count words in the loaded comments. Returns review statistics, per-route summaries, and the top words for the overall, low-score, suggestion, and negative scopes."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn analyze(
        &self,
        Parameters(params): Parameters<AnalyzeParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "analyze", keyword = ?params.filter.keyword, "executing MCP tool");

        let filter = params.filter.to_filter()?;
        let scopes = params
            .scopes
            .iter()
            .map(|s| Scope::from_str(s))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid_params)?;

        let session = self.session()?;
        let analysis = session.analyze(&filter);
        let mut report = analysis.report(params.top_n.unwrap_or(self.top_n));
        if !scopes.is_empty() {
            report.scopes.retain(|s| scopes.contains(&s.scope));
        }

        tracing::info!(
            tool = "analyze",
            matched = report.stats.matched_reviews,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(to_json(&report)?)]))
    }

    /// Comments behind one word.
    #[tool(
        description = "List the deduplicated comments containing a word within a scope, with the word highlighted and the source file of each comment."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", word = %params.word))]
    fn show_comments(
        &self,
        Parameters(params): Parameters<ShowCommentsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "show_comments", scope = %params.scope, "executing MCP tool");

        let filter = params.filter.to_filter()?;
        let scope = Scope::from_str(&params.scope).map_err(invalid_params)?;
        let markup = Markup::from_str(&params.markup).map_err(invalid_params)?;
        let highlighter = Highlighter::new(markup);

        let session = self.session()?;
        let analysis = session.analyze(&filter);
        let comments = analysis.comments_for(scope, &params.word);
        let rendered: Vec<RenderedComment<'_>> = comments
            .iter()
            .map(|o| RenderedComment {
                comment: &o.comment,
                source: &o.source,
                highlighted: highlighter.render(o, &[params.word.as_str()]),
            })
            .collect();

        tracing::info!(tool = "show_comments", count = rendered.len(), "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(to_json(&rendered)?)]))
    }

    /// Add user stop words.
    #[tool(description = "Add stop words to the session. Accepts several words separated by spaces, commas, or 、.")]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn add_stop_words(
        &self,
        Parameters(params): Parameters<AddStopWordsParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let added = session.stop_words_mut().add_many(&params.words);

        tracing::info!(tool = "add_stop_words", added, "MCP tool completed");
        let json = serde_json::json!({
            "added": added,
            "user": session.stop_words().user_words().collect::<Vec<_>>(),
        });
        Ok(CallToolResult::success(vec![Content::text(to_json(&json)?)]))
    }

    /// Remove one user stop word.
    #[tool(description = "Remove a user stop word from the session. Built-in stop words cannot be removed.")]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", word = %params.word))]
    fn remove_stop_word(
        &self,
        Parameters(params): Parameters<RemoveStopWordParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let removed = session.stop_words_mut().remove(&params.word);

        tracing::info!(tool = "remove_stop_word", removed, "MCP tool completed");
        let json = serde_json::json!({ "removed": removed });
        Ok(CallToolResult::success(vec![Content::text(to_json(&json)?)]))
    }

    /// Remove all user stop words.
    #[tool(description = "Remove every user stop word from the session.")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn clear_stop_words(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let cleared = session.stop_words().user_len();
        session.stop_words_mut().clear();

        tracing::info!(tool = "clear_stop_words", cleared, "MCP tool completed");
        let json = serde_json::json!({ "cleared": cleared });
        Ok(CallToolResult::success(vec![Content::text(to_json(&json)?)]))
    }

    /// Show the stop-word set.
    #[tool(description = "List the session's stop words: user words and, unless user_only, the full effective set.")]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn list_stop_words(
        &self,
        Parameters(params): Parameters<ListStopWordsParams>,
    ) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let stop_words = session.stop_words();
        let summary = StopWordsSummary {
            user: stop_words.user_words().collect(),
            effective: (!params.user_only).then(|| stop_words.effective()),
        };
        Ok(CallToolResult::success(vec![Content::text(to_json(&summary)?)]))
    }
}

#[tool_handler]
impl ServerHandler for ReviewServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Call load_files first, then analyze and show_comments to drill into words.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}
