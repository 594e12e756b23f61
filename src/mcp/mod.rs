//! Model Context Protocol (MCP) server implementation.
//!
//! The server communicates over stdio using newline-delimited JSON-RPC 2.0
//! messages. Layers, leaves first:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       McpServer (facade)                     │
//! │                                                             │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    │
//! │   │  Transport  │───▶│ Dispatcher  │───▶│  Registry   │    │
//! │   │   (lines)   │    │  (methods)  │    │ (tools etc.)│    │
//! │   └─────────────┘    └─────────────┘    └─────────────┘    │
//! │          │                  │                  │            │
//! │          ▼                  ▼                  ▼            │
//! │   ┌─────────────────────────────────────────────────┐      │
//! │   │          Wire codec (protocol, types)           │      │
//! │   └─────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation reports MCP protocol version 2025-11-25.

pub mod dispatcher;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod transport;
pub mod types;

pub use dispatcher::Dispatcher;
pub use protocol::{JsonRpcRequest, JsonRpcResponse, RequestId, RpcError};
pub use registry::Registry;
pub use server::McpServer;
pub use transport::{LineTransport, StdioTransport};
pub use types::MCP_PROTOCOL_VERSION;
