//! MCP server facade.
//!
//! [`McpServer`] composes a [`Registry`] and a [`Dispatcher`]:
//!
//! 1. **Registration**: collaborators add tools, resources, and prompts
//! 2. **Wiring**: capabilities are computed and MCP methods are bound, once
//! 3. **Serving**: the transport loop runs until input closes or a shutdown
//!    signal arrives
//!
//! Wiring consumes the server, so methods can only be bound once and the
//! resulting dispatch table is immutable.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::info;

use crate::error::BoxError;
use crate::logging::LogControl;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::registry::Registry;
use crate::mcp::transport::{LineTransport, StdioTransport};
use crate::mcp::types::{
    Arguments, GetPromptResult, Implementation, Prompt, PromptArguments, ReadResourceResult,
    Resource, Tool, ToolCallResult,
};

/// The MCP server.
#[derive(Debug)]
pub struct McpServer {
    registry: Registry,
}

impl McpServer {
    /// Creates a server identifying itself as `name`/`version`.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>, log: LogControl) -> Self {
        Self {
            registry: Registry::new(Implementation::new(name, version), log),
        }
    }

    /// Sets the natural-language instructions returned from `initialize`.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.registry.set_instructions(instructions);
        self
    }

    /// Returns the server name and version.
    #[must_use]
    pub const fn server_info(&self) -> &Implementation {
        self.registry.server_info()
    }

    /// Registers a tool.
    pub fn register_tool<F>(&self, tool: Tool, handler: F)
    where
        F: Fn(&Arguments) -> Result<ToolCallResult, BoxError> + Send + Sync + 'static,
    {
        self.registry.register_tool(tool, handler);
    }

    /// Registers a resource.
    pub fn register_resource<F>(&self, resource: Resource, handler: F)
    where
        F: Fn(&str) -> Result<ReadResourceResult, BoxError> + Send + Sync + 'static,
    {
        self.registry.register_resource(resource, handler);
    }

    /// Registers a prompt.
    pub fn register_prompt<F>(&self, prompt: Prompt, handler: F)
    where
        F: Fn(&PromptArguments) -> Result<GetPromptResult, BoxError> + Send + Sync + 'static,
    {
        self.registry.register_prompt(prompt, handler);
    }

    /// Returns all registered tools.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry.tools()
    }

    /// Computes capabilities and binds every MCP method, consuming the server.
    #[must_use]
    pub fn into_dispatcher(self) -> Dispatcher {
        let registry = Arc::new(self.registry);
        let mut dispatcher = Dispatcher::new();
        let capabilities = registry.wire(&mut dispatcher);

        info!(
            tools = capabilities.tools.is_some(),
            resources = capabilities.resources.is_some(),
            prompts = capabilities.prompts.is_some(),
            "MCP methods wired"
        );

        dispatcher
    }

    /// Wires the server and runs it over `transport` until end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the transport fails.
    pub async fn serve<R, W>(self, transport: &mut LineTransport<R, W>) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.into_dispatcher().serve(transport).await
    }

    /// Wires the server and runs it over stdin/stdout.
    ///
    /// Returns cleanly when stdin closes or on SIGINT/SIGTERM (Ctrl+C on
    /// Windows).
    ///
    /// # Errors
    ///
    /// Returns an error if reading stdin fails or signal handlers cannot be
    /// installed.
    pub async fn serve_stdio(self) -> io::Result<()> {
        info!(
            server = %self.server_info().name,
            version = %self.server_info().version,
            "Starting MCP server over stdio"
        );

        let dispatcher = self.into_dispatcher();
        let mut transport = StdioTransport::stdio();

        tokio::select! {
            result = dispatcher.serve(&mut transport) => result,
            signal = shutdown_signal() => {
                info!(signal = signal?, "Received shutdown signal, stopping");
                Ok(())
            }
        }
    }
}

/// Resolves when the process is asked to stop.
#[cfg(unix)]
async fn shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => Ok("SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

/// Resolves when the process is asked to stop.
#[cfg(windows)]
async fn shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
