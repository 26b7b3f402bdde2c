//! MCP Server Implementation
//!
//! Handles MCP protocol requests and routes them to the viewer session.

use super::protocol::*;
use super::resources::{get_all_resources, read_resource};
use super::tools::{self, get_all_tools};
use super::transport::{Incoming, LineTransport};
use crate::error::{ServerError, ServerResult};
use crate::render::{expand_all, outline_entries, render_display, render_outline};
use faulttree_core::{Fetcher, NodeId, ViewerSession};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "faulttree";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server - handles protocol messages
pub struct McpServer<F> {
    session: Arc<ViewerSession<F>>,
    initialized: bool,
}

impl<F: Fetcher> McpServer<F> {
    /// The session must already hold a fully built tree
    pub fn new(session: Arc<ViewerSession<F>>) -> Self {
        Self {
            session,
            initialized: false,
        }
    }

    pub fn session(&self) -> &Arc<ViewerSession<F>> {
        &self.session
    }

    /// Run the MCP server event loop over stdio
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.serve(&mut LineTransport::stdio()).await
    }

    /// Serve requests until the client closes its end
    pub async fn serve<R, W>(&mut self, transport: &mut LineTransport<R, W>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("MCP server starting...");

        loop {
            match transport.read().await? {
                Incoming::Request(request) => {
                    if let Some(response) = self.handle_request(request).await {
                        transport.write(&response).await?;
                    }
                }
                Incoming::Malformed(reason) => {
                    let response = JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Parse error: {}", reason)),
                    );
                    transport.write(&response).await?;
                }
                Incoming::Eof => {
                    tracing::info!("Client disconnected");
                    return Ok(());
                }
            }
        }
    }

    /// Handle a JSON-RPC request; notifications get no response
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!("Handling request: {}", request.method);

        if request.is_notification() {
            if request.method == "notifications/initialized" {
                self.initialized = true;
            }
            return None;
        }

        let id = request.id;
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::from_result(id, &PingResult {}),
            "tools/list" => JsonRpcResponse::from_result(
                id,
                &ToolsListResult {
                    tools: get_all_tools(),
                },
            ),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => JsonRpcResponse::from_result(
                id,
                &ResourcesListResult {
                    resources: get_all_resources(),
                },
            ),
            "resources/read" => self.handle_resources_read(id, request.params),
            _ => JsonRpcResponse::error(id, JsonRpcError::method_not_found(&request.method)),
        };

        Some(response)
    }

    fn handle_initialize(&mut self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!("Client: {} {:?}", client.name, client.version);
        }
        self.initialized = true;

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                resources: ListCapability::default(),
                tools: ListCapability::default(),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };

        JsonRpcResponse::from_result(id, &result)
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                );
            }
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        let tool_result = match self.execute_tool(&params.name, params.arguments).await {
            Ok(result) => ToolCallResult {
                content: vec![ToolResultContent::Text {
                    text: serde_json::to_string_pretty(&result)
                        .unwrap_or_else(|_| result.to_string()),
                }],
                is_error: None,
            },
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", params.name, e);
                ToolCallResult {
                    content: vec![ToolResultContent::Text {
                        text: format!("Error: {}", e),
                    }],
                    is_error: Some(true),
                }
            }
        };

        JsonRpcResponse::from_result(id, &tool_result)
    }

    fn handle_resources_read(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ResourceReadParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                );
            }
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        match read_resource(&params.uri, &self.session) {
            Ok(result) => JsonRpcResponse::from_result(id, &result),
            Err(e) => JsonRpcResponse::error(id, e.into()),
        }
    }

    /// Execute a tool by name against the session
    async fn execute_tool(&self, name: &str, args: Option<Value>) -> ServerResult<Value> {
        let args = args.unwrap_or(Value::Object(serde_json::Map::new()));
        let tree = self.session.tree();

        match name {
            tools::OUTLINE => {
                let expand = args
                    .get("expandAll")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                let view = if expand {
                    expand_all(tree)
                } else {
                    self.session.view()
                };

                Ok(serde_json::json!({
                    "text": render_outline(tree, &view),
                    "rows": outline_entries(tree, &view),
                    "noResults": view.no_results,
                }))
            }

            tools::NODE => {
                let id = node_id_arg(&args)?;
                let node = tree
                    .get(&id)
                    .ok_or_else(|| ServerError::NodeNotFound(id.to_string()))?;
                let children: Vec<Value> = node
                    .children()
                    .iter()
                    .filter_map(|c| tree.get(c))
                    .map(|c| serde_json::json!({ "id": c.id, "title": c.title }))
                    .collect();

                Ok(serde_json::json!({
                    "node": node,
                    "parent": tree.parent(&id).map(|p| &p.id),
                    "children": children,
                    "effectiveNote": self.session.resolver().effective_note(&id),
                }))
            }

            tools::SELECT => {
                let id = node_id_arg(&args)?;
                let outcome = self.session.select(&id).await;
                let display = self.session.display();

                Ok(serde_json::json!({
                    "outcome": outcome,
                    "text": render_display(tree, &display),
                    "display": display,
                }))
            }

            tools::TOGGLE => {
                let id = node_id_arg(&args)?;
                if !tree.contains(&id) {
                    return Err(ServerError::NodeNotFound(id.to_string()));
                }
                let expanded = self.session.toggle(&id);
                Ok(serde_json::json!({ "id": id, "expanded": expanded }))
            }

            tools::SEARCH => {
                let query = args
                    .get("query")
                    .and_then(|v| v.as_str())
                    .ok_or(ServerError::MissingArgument("query"))?;
                let result = self.session.apply_filter(query);
                let matches: Vec<Value> = result
                    .matches
                    .iter()
                    .filter_map(|id| tree.get(id))
                    .map(|n| serde_json::json!({ "id": n.id, "title": n.title }))
                    .collect();

                Ok(serde_json::json!({
                    "query": result.query,
                    "matches": matches,
                    "visibleCount": result.visible.len(),
                    "noResults": result.no_results(),
                    "text": render_outline(tree, &self.session.view()),
                }))
            }

            _ => Err(ServerError::UnknownTool(name.to_string())),
        }
    }
}

fn node_id_arg(args: &Value) -> ServerResult<NodeId> {
    args.get("id")
        .or_else(|| args.get("nodeId"))
        .and_then(|v| v.as_str())
        .map(NodeId::from)
        .ok_or(ServerError::MissingArgument("id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use faulttree_core::DirFetcher;

    const MAIN: &str = r#"[
        {"title": "Hydraulics", "note": "Release pressure first", "children": [
            {"title": "Pump seal leak", "file": "/detail/seal.json"},
            {"title": "Valve stuck", "measures": "Clean\nReassemble", "rootCause": "Debris"}
        ]},
        {"title": "Motor overheating", "file": "detail/missing.json"}
    ]"#;

    async fn server() -> (tempfile::TempDir, McpServer<DirFetcher>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("detail")).unwrap();
        std::fs::write(dir.path().join("main.json"), MAIN).unwrap();
        std::fs::write(
            dir.path().join("detail/seal.json"),
            r#"{"measures": "Replace seal", "rootCause": "Wear"}"#,
        )
        .unwrap();

        let session = ViewerSession::load(DirFetcher::new(dir.path()), "main.json")
            .await
            .unwrap();
        (dir, McpServer::new(Arc::new(session)))
    }

    fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(serde_json::json!(id)),
            method: method.to_string(),
            params: Some(params),
        }
    }

    async fn call_tool(server: &mut McpServer<DirFetcher>, name: &str, args: Value) -> (Value, bool) {
        let response = server
            .handle_request(request(
                1,
                "tools/call",
                serde_json::json!({"name": name, "arguments": args}),
            ))
            .await
            .unwrap();
        let result = response.result.unwrap();
        let is_error = result["isError"].as_bool().unwrap_or(false);
        let text = result["content"][0]["text"].as_str().unwrap().to_string();
        if is_error {
            (Value::String(text), true)
        } else {
            (serde_json::from_str(&text).unwrap(), false)
        }
    }

    #[tokio::test]
    async fn test_initialize() {
        let (_dir, mut server) = server().await;
        let response = server
            .handle_request(request(1, "initialize", serde_json::json!({})))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "faulttree");
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let (_dir, mut server) = server().await;
        let notification = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: "notifications/initialized".to_string(),
            params: None,
        };
        assert!(server.handle_request(notification).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let (_dir, mut server) = server().await;
        let response = server
            .handle_request(request(3, "tools/destroy", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_select_external_leaf_inherits_note() {
        let (_dir, mut server) = server().await;
        let (value, is_error) =
            call_tool(&mut server, tools::SELECT, serde_json::json!({"id": "root-0-0"})).await;

        assert!(!is_error);
        assert_eq!(value["outcome"], "resolved");
        assert_eq!(value["display"]["note"], "Release pressure first");
        assert_eq!(value["display"]["panel"]["state"], "detail");
        assert_eq!(value["display"]["panel"]["content"]["measures"], "Replace seal");
    }

    #[tokio::test]
    async fn test_select_missing_file_reports_failure() {
        let (_dir, mut server) = server().await;
        let (value, _) =
            call_tool(&mut server, tools::SELECT, serde_json::json!({"id": "root-1"})).await;

        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["display"]["panel"]["state"], "failed");
        assert!(value["text"]
            .as_str()
            .unwrap()
            .contains("Failed to load fault details."));
    }

    #[tokio::test]
    async fn test_select_unknown_is_ignored() {
        let (_dir, mut server) = server().await;
        let (value, is_error) =
            call_tool(&mut server, tools::SELECT, serde_json::json!({"id": "root-5"})).await;
        assert!(!is_error);
        assert_eq!(value["outcome"], "ignored");
    }

    #[tokio::test]
    async fn test_search_then_outline() {
        let (_dir, mut server) = server().await;
        let (value, _) =
            call_tool(&mut server, tools::SEARCH, serde_json::json!({"query": "VALVE"})).await;

        assert_eq!(value["matches"][0]["id"], "root-0-1");
        assert_eq!(value["visibleCount"], 2);
        assert_eq!(value["noResults"], false);

        let (outline, _) = call_tool(&mut server, tools::OUTLINE, serde_json::json!({})).await;
        assert_eq!(
            outline["text"],
            "- Hydraulics  [root-0]\n  * Valve stuck  [root-0-1]\n"
        );
    }

    #[tokio::test]
    async fn test_search_without_query_is_a_tool_error() {
        let (_dir, mut server) = server().await;
        let (value, is_error) = call_tool(&mut server, tools::SEARCH, serde_json::json!({})).await;
        assert!(is_error);
        assert_eq!(value, "Error: Missing 'query' parameter");
    }

    #[tokio::test]
    async fn test_node_lookup() {
        let (_dir, mut server) = server().await;
        let (value, _) =
            call_tool(&mut server, tools::NODE, serde_json::json!({"id": "root-0-1"})).await;

        assert_eq!(value["node"]["title"], "Valve stuck");
        assert_eq!(value["node"]["kind"], "inline_leaf");
        assert_eq!(value["parent"], "root-0");
        assert_eq!(value["effectiveNote"], "Release pressure first");

        let (err, is_error) =
            call_tool(&mut server, tools::NODE, serde_json::json!({"id": "root-8"})).await;
        assert!(is_error);
        assert_eq!(err, "Error: Node not found: root-8");
    }

    #[tokio::test]
    async fn test_toggle() {
        let (_dir, mut server) = server().await;
        let (value, _) =
            call_tool(&mut server, tools::TOGGLE, serde_json::json!({"id": "root-0"})).await;
        assert_eq!(value["expanded"], true);
        let (value, _) =
            call_tool(&mut server, tools::TOGGLE, serde_json::json!({"id": "root-0"})).await;
        assert_eq!(value["expanded"], false);
    }

    #[tokio::test]
    async fn test_read_unknown_resource() {
        let (_dir, mut server) = server().await;
        let response = server
            .handle_request(request(
                4,
                "resources/read",
                serde_json::json!({"uri": "faulttree://nope"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, JsonRpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_read_tree_resource() {
        let (_dir, mut server) = server().await;
        let response = server
            .handle_request(request(
                5,
                "resources/read",
                serde_json::json!({"uri": crate::mcp::resources::TREE_URI}),
            ))
            .await
            .unwrap();
        let text = response.result.unwrap()["contents"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        let nodes: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(nodes.as_array().unwrap().len(), 4);
        assert_eq!(nodes[0]["kind"], "category");
    }

    #[tokio::test]
    async fn test_serve_over_buffers() {
        let (_dir, mut server) = server().await;
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            "not json\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );
        let mut transport = LineTransport::new(input.as_bytes(), Vec::new());

        server.serve(&mut transport).await.unwrap();

        let out = String::from_utf8(transport.into_writer()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"id\":1"));
        assert!(lines[1].contains("-32700"));
        assert!(lines[2].contains(tools::SEARCH));
    }
}
