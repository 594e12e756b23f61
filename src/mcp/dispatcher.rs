//! JSON-RPC method dispatch and the read/dispatch/write loop.
//!
//! The dispatcher knows nothing about MCP. It maps method names to handlers,
//! validates requests, turns handler failures into protocol errors, and
//! drives a [`LineTransport`] one message at a time.

use std::collections::HashMap;
use std::io;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::error::MethodError;
use crate::mcp::protocol::{decode_request, JsonRpcRequest, JsonRpcResponse, RpcError};
use crate::mcp::transport::LineTransport;

/// A method handler. Receives the raw `params` payload.
pub type MethodHandler = Box<dyn Fn(Option<&Value>) -> Result<Value, MethodError> + Send + Sync>;

/// Method name to handler table.
#[derive(Default)]
pub struct Dispatcher {
    methods: HashMap<String, MethodHandler>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Dispatcher").field("methods", &names).finish()
    }
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method`, replacing any previous handler.
    pub fn register_method<F>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(Option<&Value>) -> Result<Value, MethodError> + Send + Sync + 'static,
    {
        let method = method.into();
        tracing::debug!(method = %method, "Registered method");
        self.methods.insert(method, Box::new(handler));
    }

    /// Returns `true` if a handler is registered for `method`.
    #[must_use]
    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Handles one request and builds its response.
    ///
    /// The response is built for notifications too; the caller decides
    /// whether to send it.
    #[must_use]
    pub fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(method = %request.method, id = ?request.id, "Handling request");

        if let Err(error) = request.validate() {
            return JsonRpcResponse::failure(request.id.clone(), error);
        }

        let Some(handler) = self.methods.get(&request.method) else {
            tracing::warn!(method = %request.method, "Method not found");
            return JsonRpcResponse::failure(
                request.id.clone(),
                RpcError::method_not_found(&request.method),
            );
        };

        match handler(request.params.as_ref()) {
            Ok(result) => JsonRpcResponse::success(request.id.clone(), result),
            Err(error) => {
                let error = error.into_rpc_error();
                tracing::debug!(
                    method = %request.method,
                    code = error.code,
                    error = %error.message,
                    "Request failed"
                );
                JsonRpcResponse::failure(request.id.clone(), error)
            }
        }
    }

    /// Handles one raw input line, returning the response to write, if any.
    #[must_use]
    pub fn handle_line(&self, line: &[u8]) -> Option<JsonRpcResponse> {
        match decode_request(line) {
            Ok(request) => {
                let response = self.handle_request(&request);
                if request.is_notification() {
                    tracing::debug!(method = %request.method, "Notification handled");
                    None
                } else {
                    Some(response)
                }
            }
            Err(response) => {
                tracing::error!(error = ?response.error, "Failed to decode request");
                Some(response)
            }
        }
    }

    /// Runs the read/dispatch/write loop until end of stream.
    ///
    /// Messages are processed strictly in order; each response is flushed
    /// before the next line is read.
    ///
    /// A response that cannot be written is logged and the loop moves on to
    /// the next line.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the transport fails. End of stream is a
    /// clean exit.
    pub async fn serve<R, W>(&self, transport: &mut LineTransport<R, W>) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("JSON-RPC loop started");

        loop {
            let line = match transport.read_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::info!("Input closed, JSON-RPC loop stopped");
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read request");
                    return Err(e);
                }
            };

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            tracing::trace!(request = %String::from_utf8_lossy(&line), "Read request");

            if let Some(response) = self.handle_line(&line) {
                if let Err(e) = transport.write_response(&response).await {
                    tracing::error!(error = %e, id = ?response.id, "Failed to write response");
                }
            }
        }
    }
}

/// Deserialises method parameters, mapping failures to `InvalidParams`.
///
/// Missing parameters are treated as JSON `null`.
///
/// # Errors
///
/// Returns an `InvalidParams` error naming `context` if the payload does
/// not match `T`.
pub fn parse_params<T: DeserializeOwned>(
    params: Option<&Value>,
    context: &str,
) -> Result<T, RpcError> {
    let result = match params {
        Some(value) => T::deserialize(value),
        None => T::deserialize(&Value::Null),
    };
    result.map_err(|e| {
        RpcError::invalid_params(format!("Invalid {context} params")).with_data(e.to_string())
    })
}

/// Serialises a handler result.
///
/// # Errors
///
/// Returns [`MethodError::Other`] if serialisation fails.
pub fn to_result<T: Serialize>(value: &T) -> Result<Value, MethodError> {
    serde_json::to_value(value).map_err(MethodError::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{ErrorCode, RequestId};
    use serde::Deserialize;
    use serde_json::json;

    fn echo_dispatcher() -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_method("echo", |params| Ok(params.cloned().unwrap_or(Value::Null)));
        dispatcher.register_method("fail/rpc", |_| Err(RpcError::invalid_params("nope").into()));
        dispatcher.register_method("fail/other", |_| Err(MethodError::other("exploded")));
        dispatcher
    }

    fn error_code(response: &JsonRpcResponse) -> i32 {
        response.error.as_ref().map(|e| e.code).unwrap()
    }

    #[test]
    fn routes_to_registered_handler() {
        let dispatcher = echo_dispatcher();
        let request = JsonRpcRequest::new(1, "echo", Some(json!({"a": 1})));
        let response = dispatcher.handle_request(&request);

        assert_eq!(response.id, Some(RequestId::from(1)));
        assert_eq!(response.result, Some(json!({"a": 1})));
        assert!(response.error.is_none());
    }

    #[test]
    fn last_registration_wins() {
        let mut dispatcher = echo_dispatcher();
        dispatcher.register_method("echo", |_| Ok(json!("replaced")));
        let response = dispatcher.handle_request(&JsonRpcRequest::new(1, "echo", None));
        assert_eq!(response.result, Some(json!("replaced")));
    }

    #[test]
    fn unknown_method() {
        let dispatcher = echo_dispatcher();
        let response = dispatcher.handle_request(&JsonRpcRequest::new(2, "nope", None));
        assert_eq!(error_code(&response), ErrorCode::MethodNotFound.code());
        assert_eq!(response.id, Some(RequestId::from(2)));
    }

    #[test]
    fn invalid_version_short_circuits() {
        let dispatcher = echo_dispatcher();
        let mut request = JsonRpcRequest::new("x", "echo", None);
        request.jsonrpc = "1.0".to_string();

        let response = dispatcher.handle_request(&request);
        assert_eq!(error_code(&response), ErrorCode::InvalidRequest.code());
        assert_eq!(response.id, Some(RequestId::String("x".to_string())));
    }

    #[test]
    fn rpc_errors_pass_through_and_others_become_internal() {
        let dispatcher = echo_dispatcher();

        let response = dispatcher.handle_request(&JsonRpcRequest::new(1, "fail/rpc", None));
        assert_eq!(error_code(&response), ErrorCode::InvalidParams.code());
        assert_eq!(response.error.unwrap().message, "nope");

        let response = dispatcher.handle_request(&JsonRpcRequest::new(2, "fail/other", None));
        assert_eq!(error_code(&response), ErrorCode::InternalError.code());
    }

    #[test]
    fn notifications_get_no_response() {
        let dispatcher = echo_dispatcher();
        assert!(dispatcher
            .handle_line(br#"{"jsonrpc":"2.0","method":"echo","params":{"x":1}}"#)
            .is_none());
        assert!(dispatcher
            .handle_line(br#"{"jsonrpc":"2.0","method":"missing"}"#)
            .is_none());
    }

    #[test]
    fn malformed_line_gets_parse_error() {
        let dispatcher = echo_dispatcher();
        let response = dispatcher.handle_line(b"{oops").unwrap();
        assert_eq!(error_code(&response), ErrorCode::ParseError.code());
        assert_eq!(response.id, None);
    }

    #[test]
    fn parse_params_reports_invalid_params() {
        #[derive(Debug, Deserialize)]
        struct Named {
            #[allow(dead_code)]
            name: String,
        }

        let err = parse_params::<Named>(Some(&json!({"name": 3})), "test").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams.code());
        assert_eq!(err.message, "Invalid test params");

        assert!(parse_params::<Named>(None, "test").is_err());
    }

    #[tokio::test]
    async fn serve_processes_lines_in_order() {
        let dispatcher = echo_dispatcher();
        let input: &[u8] = b"{\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"params\":1,\"id\":1}\n\
            \n\
            not json\n\
            {\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"params\":2}\n\
            {\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"params\":3,\"id\":3}\n";
        let mut transport = LineTransport::new(input, Vec::new());

        dispatcher.serve(&mut transport).await.unwrap();

        let (_, output) = transport.into_parts();
        let responses: Vec<JsonRpcResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].result, Some(json!(1)));
        assert_eq!(error_code(&responses[1]), ErrorCode::ParseError.code());
        assert_eq!(responses[2].result, Some(json!(3)));
        assert_eq!(responses[2].id, Some(RequestId::from(3)));
    }

    /// Fails the first write, then records everything.
    #[derive(Default)]
    struct FlakyWriter {
        failed: bool,
        written: Vec<u8>,
    }

    impl tokio::io::AsyncWrite for FlakyWriter {
        fn poll_write(
            mut self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &[u8],
        ) -> std::task::Poll<io::Result<usize>> {
            if !self.failed {
                self.failed = true;
                return std::task::Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "pipe closed",
                )));
            }
            self.written.extend_from_slice(buf);
            std::task::Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn serve_continues_after_write_error() {
        let dispatcher = echo_dispatcher();
        let input: &[u8] = b"{\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"params\":1,\"id\":1}\n\
            {\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"params\":2,\"id\":2}\n";
        let mut transport = LineTransport::new(input, FlakyWriter::default());

        dispatcher.serve(&mut transport).await.unwrap();

        let (_, writer) = transport.into_parts();
        let output = String::from_utf8(writer.written).unwrap();
        let responses: Vec<JsonRpcResponse> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, Some(RequestId::from(2)));
        assert_eq!(responses[0].result, Some(json!(2)));
    }

    #[tokio::test]
    async fn serve_surfaces_read_errors() {
        let dispatcher = echo_dispatcher();
        let mock = tokio_test::io::Builder::new()
            .read(b"{\"jsonrpc\":\"2.0\",\"method\":\"echo\"}\n")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut transport = LineTransport::new(tokio::io::BufReader::new(mock), Vec::new());

        let err = dispatcher.serve(&mut transport).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}
