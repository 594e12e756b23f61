//! mcp-server-store: Model Context Protocol server for an online store
//!
//! This library provides the protocol core of an MCP server: a
//! newline-delimited JSON-RPC 2.0 transport, a method dispatcher, and a
//! registry of tools, resources, and prompts that collaborators plug into.
//!
//! # Architecture
//!
//! - **Wire codec**: one JSON-RPC message per line, fixed error taxonomy
//! - **Dispatcher**: method table, validation, sequential read/dispatch/write loop
//! - **Registry**: MCP methods, capability negotiation, handler invocation
//! - **Server facade**: registration API and one-shot wiring
//!
//! Tool implementations that talk to the store backend are collaborators;
//! they only need to implement the handler signatures in [`mcp::registry`].
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`logging`] — Logging setup and runtime level control
//! - [`mcp`] — MCP protocol implementation
//! - [`tools`] — Built-in tools

pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod tools;
