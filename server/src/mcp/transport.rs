//! MCP Transport Layer
//!
//! Newline-delimited JSON-RPC 2.0 over any async reader/writer pair; stdio in
//! production, in-memory buffers in tests.

use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// One line read from the client
#[derive(Debug)]
pub enum Incoming {
    Request(JsonRpcRequest),
    /// Line that is not a JSON-RPC request
    Malformed(String),
    Eof,
}

/// Line-delimited JSON-RPC transport
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

impl LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read the next request, skipping blank lines
    pub async fn read(&mut self) -> io::Result<Incoming> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(Incoming::Eof);
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            return Ok(match serde_json::from_str(line) {
                Ok(request) => Incoming::Request(request),
                Err(e) => {
                    tracing::error!("Failed to parse JSON-RPC request: {}", e);
                    Incoming::Malformed(e.to_string())
                }
            });
        }
    }

    /// Write one response followed by a newline
    pub async fn write(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::JsonRpcError;

    #[tokio::test]
    async fn test_reads_requests_and_skips_blank_lines() {
        let input = b"\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n\n" as &[u8];
        let mut transport = LineTransport::new(input, Vec::new());

        match transport.read().await.unwrap() {
            Incoming::Request(request) => assert_eq!(request.method, "ping"),
            other => panic!("Expected request, got {other:?}"),
        }
        assert!(matches!(transport.read().await.unwrap(), Incoming::Eof));
    }

    #[tokio::test]
    async fn test_malformed_line() {
        let mut transport = LineTransport::new(b"{oops\n" as &[u8], Vec::new());
        assert!(matches!(
            transport.read().await.unwrap(),
            Incoming::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn test_write_appends_newline() {
        let mut transport = LineTransport::new(b"" as &[u8], Vec::new());
        let response = JsonRpcResponse::error(
            Some(serde_json::json!(1)),
            JsonRpcError::invalid_params("bad"),
        );
        transport.write(&response).await.unwrap();

        let out = String::from_utf8(transport.into_writer()).unwrap();
        assert!(out.ends_with('\n'));
        assert!(out.contains("-32602"));
    }

    #[tokio::test]
    async fn test_exact_frames_over_mock_io() {
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"jsonrpc\":\"2.0\",\"id\":1,")
            .read(b"\"method\":\"ping\"}\n")
            .build();
        let writer = tokio_test::io::Builder::new()
            .write(br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"bad"}}"#)
            .write(b"\n")
            .build();
        let mut transport = LineTransport::new(BufReader::new(reader), writer);

        assert!(matches!(transport.read().await.unwrap(), Incoming::Request(_)));
        transport
            .write(&JsonRpcResponse::error(
                Some(serde_json::json!(1)),
                JsonRpcError::invalid_params("bad"),
            ))
            .await
            .unwrap();
        assert!(matches!(transport.read().await.unwrap(), Incoming::Eof));
    }
}
