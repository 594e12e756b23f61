//! Capability registry: the MCP layer on top of the dispatcher.
//!
//! The registry holds tools, resources, and prompts together with their
//! handlers, derives the advertised capability set from what was
//! registered, and wires the MCP methods onto a [`Dispatcher`].
//!
//! # Error policy
//!
//! A failing tool handler is reported in-band: the call succeeds with
//! `isError: true` and the failure text as content, so the calling model can
//! see it. Failing resource and prompt handlers are reported as JSON-RPC
//! internal errors.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{BoxError, MethodError};
use crate::logging::LogControl;
use crate::mcp::dispatcher::{parse_params, to_result, Dispatcher};
use crate::mcp::protocol::RpcError;
use crate::mcp::types::{
    methods, Arguments, EmptyResult, GetPromptParams, GetPromptResult, Implementation,
    InitializeParams, InitializeResult, ListPromptsResult, ListResourcesResult, ListToolsResult,
    LoggingCapabilities, PaginatedParams, Prompt, PromptArguments, PromptCapabilities,
    ReadResourceParams, ReadResourceResult, Resource, ResourceCapabilities, ServerCapabilities,
    SetLevelParams, Tool, ToolCallParams, ToolCallResult, ToolCapabilities, MCP_PROTOCOL_VERSION,
};

/// Executes a tool.
pub type ToolHandler =
    Arc<dyn Fn(&Arguments) -> Result<ToolCallResult, BoxError> + Send + Sync>;

/// Reads a resource by URI.
pub type ResourceHandler =
    Arc<dyn Fn(&str) -> Result<ReadResourceResult, BoxError> + Send + Sync>;

/// Resolves a prompt.
pub type PromptHandler =
    Arc<dyn Fn(&PromptArguments) -> Result<GetPromptResult, BoxError> + Send + Sync>;

#[derive(Default)]
struct Entries {
    tools: IndexMap<String, Tool>,
    tool_handlers: IndexMap<String, ToolHandler>,
    resources: IndexMap<String, Resource>,
    resource_handlers: IndexMap<String, ResourceHandler>,
    prompts: IndexMap<String, Prompt>,
    prompt_handlers: IndexMap<String, PromptHandler>,
}

/// Registered tools, resources, and prompts.
pub struct Registry {
    server_info: Implementation,
    instructions: Option<String>,
    log: LogControl,
    entries: RwLock<Entries>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.read();
        f.debug_struct("Registry")
            .field("server_info", &self.server_info)
            .field("tools", &entries.tools.len())
            .field("resources", &entries.resources.len())
            .field("prompts", &entries.prompts.len())
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(server_info: Implementation, log: LogControl) -> Self {
        Self {
            server_info,
            instructions: None,
            log,
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Sets the instructions returned from `initialize`.
    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        self.instructions = Some(instructions.into());
    }

    /// Returns the server name and version.
    #[must_use]
    pub const fn server_info(&self) -> &Implementation {
        &self.server_info
    }

    /// Returns the injected log control.
    #[must_use]
    pub const fn log_control(&self) -> &LogControl {
        &self.log
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- Registration ----

    /// Adds a tool, replacing any tool with the same name.
    pub fn register_tool<F>(&self, tool: Tool, handler: F)
    where
        F: Fn(&Arguments) -> Result<ToolCallResult, BoxError> + Send + Sync + 'static,
    {
        let name = tool.name.clone();
        let mut entries = self.write();
        entries.tools.insert(name.clone(), tool);
        entries.tool_handlers.insert(name.clone(), Arc::new(handler));
        info!(tool = %name, "Registered tool");
    }

    /// Adds a resource, replacing any resource with the same URI.
    pub fn register_resource<F>(&self, resource: Resource, handler: F)
    where
        F: Fn(&str) -> Result<ReadResourceResult, BoxError> + Send + Sync + 'static,
    {
        let uri = resource.uri.clone();
        let mut entries = self.write();
        entries.resources.insert(uri.clone(), resource);
        entries.resource_handlers.insert(uri.clone(), Arc::new(handler));
        info!(uri = %uri, "Registered resource");
    }

    /// Adds a prompt, replacing any prompt with the same name.
    pub fn register_prompt<F>(&self, prompt: Prompt, handler: F)
    where
        F: Fn(&PromptArguments) -> Result<GetPromptResult, BoxError> + Send + Sync + 'static,
    {
        let name = prompt.name.clone();
        let mut entries = self.write();
        entries.prompts.insert(name.clone(), prompt);
        entries.prompt_handlers.insert(name.clone(), Arc::new(handler));
        info!(prompt = %name, "Registered prompt");
    }

    /// Returns all registered tools in registration order.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.read().tools.values().cloned().collect()
    }

    /// Returns all registered resources in registration order.
    #[must_use]
    pub fn resources(&self) -> Vec<Resource> {
        self.read().resources.values().cloned().collect()
    }

    /// Returns all registered prompts in registration order.
    #[must_use]
    pub fn prompts(&self) -> Vec<Prompt> {
        self.read().prompts.values().cloned().collect()
    }

    /// Derives the capability set from the current contents.
    ///
    /// Lists never change after startup, so `listChanged` is always false.
    #[must_use]
    pub fn capabilities(&self) -> ServerCapabilities {
        let entries = self.read();
        ServerCapabilities {
            tools: (!entries.tools.is_empty()).then(ToolCapabilities::default),
            resources: (!entries.resources.is_empty()).then(ResourceCapabilities::default),
            prompts: (!entries.prompts.is_empty()).then(PromptCapabilities::default),
            logging: Some(LoggingCapabilities::default()),
        }
    }

    // ---- Wiring ----

    /// Computes the capability set and registers the MCP methods on
    /// `dispatcher`.
    ///
    /// Method families are registered only if the matching capability is
    /// present at this point; a family that was empty stays unroutable
    /// (`MethodNotFound`) even if entries are added later.
    pub fn wire(self: &Arc<Self>, dispatcher: &mut Dispatcher) -> ServerCapabilities {
        let capabilities = self.capabilities();

        let advertised = capabilities.clone();
        let registry = Arc::clone(self);
        dispatcher.register_method(methods::INITIALIZE, move |params| {
            registry.handle_initialize(params, &advertised)
        });
        route(dispatcher, self, methods::PING, Self::handle_ping);

        if capabilities.tools.is_some() {
            route(dispatcher, self, methods::TOOLS_LIST, Self::handle_tools_list);
            route(dispatcher, self, methods::TOOLS_CALL, Self::handle_tools_call);
        }

        if capabilities.resources.is_some() {
            route(dispatcher, self, methods::RESOURCES_LIST, Self::handle_resources_list);
            route(dispatcher, self, methods::RESOURCES_READ, Self::handle_resources_read);
        }

        if capabilities.prompts.is_some() {
            route(dispatcher, self, methods::PROMPTS_LIST, Self::handle_prompts_list);
            route(dispatcher, self, methods::PROMPTS_GET, Self::handle_prompts_get);
        }

        route(
            dispatcher,
            self,
            methods::NOTIFICATION_INITIALIZED,
            Self::handle_initialized,
        );
        route(dispatcher, self, methods::LOGGING_SET_LEVEL, Self::handle_set_level);

        capabilities
    }

    // ---- Lifecycle ----

    fn handle_initialize(
        &self,
        params: Option<&Value>,
        capabilities: &ServerCapabilities,
    ) -> Result<Value, MethodError> {
        let request: InitializeParams = parse_params(params, "initialize")?;

        info!(
            client = %request.client_info.name,
            client_version = %request.client_info.version,
            protocol_version = %request.protocol_version,
            "Client initializing"
        );

        to_result(&InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION,
            capabilities: capabilities.clone(),
            server_info: self.server_info.clone(),
            instructions: self.instructions.clone(),
        })
    }

    fn handle_ping(&self, _params: Option<&Value>) -> Result<Value, MethodError> {
        to_result(&EmptyResult {})
    }

    fn handle_initialized(&self, _params: Option<&Value>) -> Result<Value, MethodError> {
        info!("Client initialized successfully");
        Ok(Value::Null)
    }

    fn handle_set_level(&self, params: Option<&Value>) -> Result<Value, MethodError> {
        let request: SetLevelParams = parse_params(params, "logging")?;

        self.log
            .set_level(request.level.to_level_filter())
            .map_err(MethodError::other)?;
        info!(level = ?request.level, "Log level updated");

        to_result(&EmptyResult {})
    }

    // ---- Tools ----

    fn handle_tools_list(&self, params: Option<&Value>) -> Result<Value, MethodError> {
        parse_page(params, "tools list")?;
        let tools = self.tools();
        info!(count = tools.len(), "Listing tools");
        to_result(&ListToolsResult { tools })
    }

    fn handle_tools_call(&self, params: Option<&Value>) -> Result<Value, MethodError> {
        let request: ToolCallParams = parse_params(params, "tool call")?;

        let handler = self.read().tool_handlers.get(&request.name).cloned();
        let Some(handler) = handler else {
            warn!(tool = %request.name, "Tool not found");
            return Err(RpcError::invalid_params(format!("Tool '{}' not found", request.name)).into());
        };

        let arguments = request.arguments.unwrap_or_default();
        let shown = Value::Object(arguments.clone());
        info!(tool = %request.name, arguments = %shown, "Calling tool");

        let result = match handler(&arguments) {
            Ok(result) => {
                info!(tool = %request.name, "Tool executed successfully");
                result
            }
            Err(e) => {
                error!(tool = %request.name, error = %e, "Tool execution failed");
                ToolCallResult::error(e.to_string())
            }
        };

        to_result(&result)
    }

    // ---- Resources ----

    fn handle_resources_list(&self, params: Option<&Value>) -> Result<Value, MethodError> {
        parse_page(params, "resources list")?;
        to_result(&ListResourcesResult {
            resources: self.resources(),
        })
    }

    fn handle_resources_read(&self, params: Option<&Value>) -> Result<Value, MethodError> {
        let request: ReadResourceParams = parse_params(params, "resource read")?;

        let handler = self.read().resource_handlers.get(&request.uri).cloned();
        let Some(handler) = handler else {
            warn!(uri = %request.uri, "Resource not found");
            return Err(RpcError::invalid_params(format!("Resource '{}' not found", request.uri)).into());
        };

        let result = handler(&request.uri).map_err(|e| {
            error!(uri = %request.uri, error = %e, "Resource read failed");
            RpcError::internal("Failed to read resource").with_data(e.to_string())
        })?;

        to_result(&result)
    }

    // ---- Prompts ----

    fn handle_prompts_list(&self, params: Option<&Value>) -> Result<Value, MethodError> {
        parse_page(params, "prompts list")?;
        to_result(&ListPromptsResult {
            prompts: self.prompts(),
        })
    }

    fn handle_prompts_get(&self, params: Option<&Value>) -> Result<Value, MethodError> {
        let request: GetPromptParams = parse_params(params, "prompt get")?;

        let handler = self.read().prompt_handlers.get(&request.name).cloned();
        let Some(handler) = handler else {
            warn!(prompt = %request.name, "Prompt not found");
            return Err(RpcError::invalid_params(format!("Prompt '{}' not found", request.name)).into());
        };

        let arguments = request.arguments.unwrap_or_default();
        let result = handler(&arguments).map_err(|e| {
            error!(prompt = %request.name, error = %e, "Prompt resolution failed");
            RpcError::internal("Failed to get prompt").with_data(e.to_string())
        })?;

        to_result(&result)
    }
}

/// Registers a registry method on the dispatcher.
/// Parses list params. Absent or `null` params mean the first page; lists
/// are returned whole, so a cursor is only logged.
fn parse_page(params: Option<&Value>, context: &str) -> Result<PaginatedParams, RpcError> {
    let page = match params {
        None | Some(Value::Null) => PaginatedParams::default(),
        Some(_) => parse_params(params, context)?,
    };
    if let Some(cursor) = &page.cursor {
        debug!(cursor = %cursor, "Ignoring pagination cursor");
    }
    Ok(page)
}

fn route<F>(dispatcher: &mut Dispatcher, registry: &Arc<Registry>, method: &str, handler: F)
where
    F: Fn(&Registry, Option<&Value>) -> Result<Value, MethodError> + Send + Sync + 'static,
{
    let registry = Arc::clone(registry);
    dispatcher.register_method(method, move |params| handler(registry.as_ref(), params));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{ErrorCode, JsonRpcRequest, JsonRpcResponse};
    use crate::mcp::types::{Content, PromptMessage, Role};
    use serde_json::json;
    use tracing::level_filters::LevelFilter;

    fn registry() -> Registry {
        Registry::new(
            Implementation::new("test-server", "1.2.3"),
            LogControl::detached(LevelFilter::INFO),
        )
    }

    fn wired(registry: Registry) -> (Arc<Registry>, Dispatcher) {
        let registry = Arc::new(registry);
        let mut dispatcher = Dispatcher::new();
        registry.wire(&mut dispatcher);
        (registry, dispatcher)
    }

    fn call(dispatcher: &Dispatcher, method: &str, params: Value) -> JsonRpcResponse {
        dispatcher.handle_request(&JsonRpcRequest::new(1, method, Some(params)))
    }

    fn code(response: &JsonRpcResponse) -> Option<ErrorCode> {
        response.error.as_ref().and_then(RpcError::kind)
    }

    fn with_store_entries() -> Registry {
        let registry = registry();
        registry.register_tool(Tool::new("alpha", "first"), |_| Ok(ToolCallResult::text("from alpha")));
        registry.register_tool(Tool::new("beta", "second"), |args| {
            Ok(ToolCallResult::text(format!("beta got {}", Value::Object(args.clone()))))
        });
        registry.register_tool(Tool::new("broken", "always fails"), |_| {
            Err("backend unavailable".into())
        });
        registry.register_resource(
            Resource {
                uri: "store://catalogue".to_string(),
                name: "Catalogue".to_string(),
                description: None,
                mime_type: Some("text/plain".to_string()),
            },
            |uri| Ok(ReadResourceResult::text(uri, None, "3 products")),
        );
        registry.register_resource(
            Resource {
                uri: "store://broken".to_string(),
                name: "Broken".to_string(),
                description: None,
                mime_type: None,
            },
            |_| Err("disk error".into()),
        );
        registry.register_prompt(
            Prompt {
                name: "greet".to_string(),
                description: None,
                arguments: Vec::new(),
            },
            |args| {
                let who = args.get("name").map_or("stranger", String::as_str);
                Ok(GetPromptResult {
                    description: None,
                    messages: vec![PromptMessage {
                        role: Role::User,
                        content: Content::text(format!("Hello, {who}")),
                    }],
                })
            },
        );
        registry.register_prompt(
            Prompt {
                name: "broken".to_string(),
                description: None,
                arguments: Vec::new(),
            },
            |_| Err("template missing".into()),
        );
        registry
    }

    #[test]
    fn empty_registry_advertises_only_logging() {
        let caps = registry().capabilities();
        assert!(caps.tools.is_none());
        assert!(caps.resources.is_none());
        assert!(caps.prompts.is_none());
        assert!(caps.logging.is_some());
    }

    #[test]
    fn capabilities_follow_contents() {
        let registry = registry();
        registry.register_tool(Tool::new("ping", ""), |_| Ok(ToolCallResult::text("pong")));
        let caps = registry.capabilities();
        assert_eq!(caps.tools, Some(ToolCapabilities { list_changed: false }));
        assert!(caps.resources.is_none());
        assert!(caps.prompts.is_none());
    }

    #[test]
    fn registration_replaces_by_key() {
        let registry = registry();
        registry.register_tool(Tool::new("t", "old"), |_| Ok(ToolCallResult::text("old")));
        registry.register_tool(Tool::new("t", "new"), |_| Ok(ToolCallResult::text("new")));

        let tools = registry.tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].description, "new");

        let (_, dispatcher) = wired(registry);
        let response = call(&dispatcher, "tools/call", json!({"name": "t"}));
        assert_eq!(response.result.unwrap()["content"][0]["text"], json!("new"));
    }

    #[test]
    fn empty_families_are_not_routed() {
        let (_, dispatcher) = wired(registry());
        for method in ["tools/list", "tools/call", "resources/list", "prompts/get"] {
            let response = call(&dispatcher, method, json!({}));
            assert_eq!(code(&response), Some(ErrorCode::MethodNotFound), "{method}");
        }
        assert!(dispatcher.has_method("initialize"));
        assert!(dispatcher.has_method("ping"));
        assert!(dispatcher.has_method("logging/setLevel"));
        assert!(dispatcher.has_method("notifications/initialized"));
    }

    #[test]
    fn initialize_reports_server_and_capabilities() {
        let mut registry = with_store_entries();
        registry.set_instructions("Be nice.");
        let (_, dispatcher) = wired(registry);

        let response = call(
            &dispatcher,
            "initialize",
            json!({
                "protocolVersion": "2025-11-25",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0.0"}
            }),
        );
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], json!(MCP_PROTOCOL_VERSION));
        assert_eq!(result["serverInfo"], json!({"name": "test-server", "version": "1.2.3"}));
        assert_eq!(result["instructions"], json!("Be nice."));
        assert_eq!(result["capabilities"]["tools"], json!({"listChanged": false}));
        assert_eq!(
            result["capabilities"]["resources"],
            json!({"subscribe": false, "listChanged": false})
        );
        assert_eq!(result["capabilities"]["logging"], json!({}));
    }

    #[test]
    fn initialize_rejects_malformed_params() {
        let (_, dispatcher) = wired(registry());
        let response = call(&dispatcher, "initialize", json!("not an object"));
        assert_eq!(code(&response), Some(ErrorCode::InvalidParams));
    }

    #[test]
    fn ping_returns_empty_object() {
        let (_, dispatcher) = wired(registry());
        let response = dispatcher.handle_request(&JsonRpcRequest::new(1, "ping", None));
        assert_eq!(response.result, Some(json!({})));
    }

    #[test]
    fn tools_list_returns_every_tool() {
        let (_, dispatcher) = wired(with_store_entries());
        let response = dispatcher.handle_request(&JsonRpcRequest::new(1, "tools/list", None));
        let result = response.result.unwrap();
        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["alpha", "beta", "broken"]);
    }

    #[test]
    fn list_methods_accept_cursor_and_reject_non_objects() {
        let registry = with_store_entries();
        registry.register_resource(
            Resource {
                uri: "store://catalogue".to_string(),
                name: "Catalogue".to_string(),
                description: None,
                mime_type: None,
            },
            |uri| Ok(ReadResourceResult::text(uri, None, "")),
        );
        registry.register_prompt(
            Prompt {
                name: "recommend".to_string(),
                description: None,
                arguments: Vec::new(),
            },
            |_| {
                Ok(GetPromptResult {
                    description: None,
                    messages: Vec::new(),
                })
            },
        );
        let (_, dispatcher) = wired(registry);

        for method in ["tools/list", "resources/list", "prompts/list"] {
            let response = call(&dispatcher, method, json!({"cursor": "next"}));
            assert!(response.error.is_none(), "{method}");

            let response = call(&dispatcher, method, Value::Null);
            assert!(response.error.is_none(), "{method}");

            let response = call(&dispatcher, method, json!([1, 2]));
            assert_eq!(code(&response), Some(ErrorCode::InvalidParams), "{method}");

            let response = call(&dispatcher, method, json!({"cursor": 7}));
            assert_eq!(code(&response), Some(ErrorCode::InvalidParams), "{method}");
        }
    }

    #[test]
    fn tools_call_routes_by_name() {
        let (_, dispatcher) = wired(with_store_entries());

        let response = call(&dispatcher, "tools/call", json!({"name": "alpha"}));
        assert_eq!(
            response.result.unwrap(),
            json!({"content": [{"type": "text", "text": "from alpha"}]})
        );

        let response = call(
            &dispatcher,
            "tools/call",
            json!({"name": "beta", "arguments": {"q": 1}}),
        );
        assert_eq!(
            response.result.unwrap()["content"][0]["text"],
            json!(r#"beta got {"q":1}"#)
        );
    }

    #[test]
    fn tools_call_unknown_name_is_invalid_params() {
        let (_, dispatcher) = wired(with_store_entries());
        let response = call(&dispatcher, "tools/call", json!({"name": "gamma"}));
        assert_eq!(code(&response), Some(ErrorCode::InvalidParams));
    }

    #[test]
    fn tools_call_malformed_params_is_invalid_params() {
        let (_, dispatcher) = wired(with_store_entries());
        let response = call(&dispatcher, "tools/call", json!({"arguments": {}}));
        assert_eq!(code(&response), Some(ErrorCode::InvalidParams));
    }

    #[test]
    fn tool_failure_is_reported_in_band() {
        let (_, dispatcher) = wired(with_store_entries());
        let response = call(&dispatcher, "tools/call", json!({"name": "broken"}));

        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], json!(true));
        assert_eq!(result["content"][0]["text"], json!("backend unavailable"));
    }

    #[test]
    fn resources_list_and_read() {
        let (_, dispatcher) = wired(with_store_entries());

        let response = call(&dispatcher, "resources/list", json!({}));
        assert_eq!(response.result.unwrap()["resources"].as_array().unwrap().len(), 2);

        let response = call(&dispatcher, "resources/read", json!({"uri": "store://catalogue"}));
        assert_eq!(
            response.result.unwrap(),
            json!({"contents": [{"uri": "store://catalogue", "text": "3 products"}]})
        );
    }

    #[test]
    fn resource_failure_is_internal_error() {
        let (_, dispatcher) = wired(with_store_entries());

        let response = call(&dispatcher, "resources/read", json!({"uri": "store://broken"}));
        assert_eq!(code(&response), Some(ErrorCode::InternalError));
        assert!(response.result.is_none());

        let response = call(&dispatcher, "resources/read", json!({"uri": "store://nowhere"}));
        assert_eq!(code(&response), Some(ErrorCode::InvalidParams));
    }

    #[test]
    fn prompts_get_and_failure() {
        let (_, dispatcher) = wired(with_store_entries());

        let response = call(
            &dispatcher,
            "prompts/get",
            json!({"name": "greet", "arguments": {"name": "Ada"}}),
        );
        assert_eq!(
            response.result.unwrap()["messages"][0],
            json!({"role": "user", "content": {"type": "text", "text": "Hello, Ada"}})
        );

        let response = call(&dispatcher, "prompts/get", json!({"name": "broken"}));
        assert_eq!(code(&response), Some(ErrorCode::InternalError));

        let response = call(&dispatcher, "prompts/list", json!({}));
        assert_eq!(response.result.unwrap()["prompts"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn set_level_updates_log_control() {
        let (registry, dispatcher) = wired(registry());

        let response = call(&dispatcher, "logging/setLevel", json!({"level": "debug"}));
        assert_eq!(response.result, Some(json!({})));
        assert_eq!(registry.log_control().level(), LevelFilter::DEBUG);

        let response = call(&dispatcher, "logging/setLevel", json!({"level": "critical"}));
        assert!(response.error.is_none());
        assert_eq!(registry.log_control().level(), LevelFilter::ERROR);
    }

    #[test]
    fn set_level_rejects_unknown_level() {
        let (registry, dispatcher) = wired(registry());
        let response = call(&dispatcher, "logging/setLevel", json!({"level": "loud"}));
        assert_eq!(code(&response), Some(ErrorCode::InvalidParams));
        assert_eq!(registry.log_control().level(), LevelFilter::INFO);
    }

    #[test]
    fn late_registration_is_not_routed() {
        let (registry, dispatcher) = wired(registry());
        registry.register_tool(Tool::new("late", ""), |_| Ok(ToolCallResult::text("late")));

        assert_eq!(registry.tools().len(), 1);
        let response = call(&dispatcher, "tools/call", json!({"name": "late"}));
        assert_eq!(code(&response), Some(ErrorCode::MethodNotFound));
    }
}
