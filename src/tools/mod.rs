//! Built-in tools.
//!
//! Store tools (products, cart, orders) live with the backend client; the
//! server itself only ships a liveness check.

use crate::error::BoxError;
use crate::mcp::types::{Arguments, Tool, ToolCallResult};
use crate::mcp::McpServer;

/// Definition of the `ping` tool.
#[must_use]
pub fn ping_tool() -> Tool {
    Tool::new("ping", "A simple ping tool that returns pong.")
}

/// Handler for the `ping` tool.
///
/// # Errors
///
/// Never fails.
pub fn ping(_arguments: &Arguments) -> Result<ToolCallResult, BoxError> {
    Ok(ToolCallResult::text("pong"))
}

/// Registers every built-in tool on `server`.
pub fn register_builtin(server: &McpServer) {
    server.register_tool(ping_tool(), ping);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogControl;
    use crate::mcp::types::Content;

    #[test]
    fn ping_returns_pong() {
        let result = ping(&Arguments::new()).unwrap();
        assert!(!result.is_error);
        assert_eq!(result.content, vec![Content::text("pong")]);
    }

    #[test]
    fn ping_schema_is_empty_object() {
        let tool = ping_tool();
        assert_eq!(tool.name, "ping");
        assert_eq!(tool.input_schema.kind, "object");
        assert!(tool.input_schema.properties.is_empty());
    }

    #[test]
    fn builtin_tools_register() {
        let server = McpServer::new("store", "0.1.0", LogControl::default());
        register_builtin(&server);
        assert_eq!(server.list_tools(), vec![ping_tool()]);
    }
}
