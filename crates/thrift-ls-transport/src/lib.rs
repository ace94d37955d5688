//! LSP transport layer: `Content-Length` framing over `BufRead`/`Write`.
//!
//! The LSP Base Protocol frames each message as
//! `Content-Length: N\r\n\r\n<N bytes of UTF-8 JSON>`. [`read_message`]
//! returns `Ok(None)` on EOF and on malformed frames (the server keeps
//! running); only I/O failures are `Err`.

use std::io::{self, BufRead, Read, Write};
use thrift_ls_protocol::{JsonRpcRequest, JsonRpcResponse};

/// Result of reading one frame.
#[derive(Debug)]
pub enum Frame {
    /// A parsed request or notification.
    Request(JsonRpcRequest),
    /// The body was not valid JSON-RPC; the raw parse error message is
    /// attached so the server can answer with `-32700`.
    Malformed(String),
}

/// Reads one LSP frame.
///
/// Returns `Ok(None)` on a clean EOF or a header section without a valid
/// `Content-Length`.
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<Frame>> {
    let mut content_length: Option<usize> = None;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None); // EOF
        }
        let line = line.trim_end();
        if line.is_empty() {
            break; // end of headers
        }
        if let Some((key, value)) = line.split_once(": ") {
            if key.eq_ignore_ascii_case("Content-Length") {
                content_length = value.parse().ok();
            }
        }
    }

    let Some(length) = content_length else {
        return Ok(None);
    };

    let mut content = vec![0u8; length];
    let mut read = 0;
    while read < length {
        match reader.read(&mut content[read..])? {
            0 => return Ok(None), // unexpected EOF mid-body
            n => read += n,
        }
    }

    match serde_json::from_slice(&content) {
        Ok(request) => Ok(Some(Frame::Request(request))),
        Err(err) => Ok(Some(Frame::Malformed(err.to_string()))),
    }
}

/// Writes a response with framing and flushes.
pub fn write_message<W: Write>(writer: &mut W, response: &JsonRpcResponse) -> io::Result<()> {
    let content = serde_json::to_string(response)?;
    write!(writer, "Content-Length: {}\r\n\r\n{}", content.len(), content)?;
    writer.flush()
}

/// Writes a notification with framing and flushes.
pub fn write_notification<W: Write>(
    writer: &mut W,
    method: &str,
    params: serde_json::Value,
) -> io::Result<()> {
    let notification = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
    });
    let content = serde_json::to_string(&notification)?;
    write!(writer, "Content-Length: {}\r\n\r\n{}", content.len(), content)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::BufReader;

    fn frame(body: &str) -> Vec<u8> {
        format!("Content-Length: {}\r\n\r\n{}", body.len(), body).into_bytes()
    }

    #[test]
    fn reads_a_framed_request() {
        let bytes = frame(r#"{"jsonrpc":"2.0","id":1,"method":"shutdown"}"#);
        let mut reader = BufReader::new(bytes.as_slice());
        match read_message(&mut reader).unwrap() {
            Some(Frame::Request(request)) => assert_eq!(request.method, "shutdown"),
            other => panic!("expected request, got {other:?}"),
        }
        assert!(read_message(&mut reader).unwrap().is_none());
    }

    #[test]
    fn reads_consecutive_frames() {
        let mut bytes = frame(r#"{"jsonrpc":"2.0","method":"a"}"#);
        bytes.extend(frame(r#"{"jsonrpc":"2.0","method":"b"}"#));
        let mut reader = BufReader::new(bytes.as_slice());
        let methods: Vec<String> = std::iter::from_fn(|| {
            match read_message(&mut reader).unwrap() {
                Some(Frame::Request(r)) => Some(r.method),
                _ => None,
            }
        })
        .collect();
        assert_eq!(methods, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn malformed_body_is_reported_not_fatal() {
        let bytes = frame("{not json");
        let mut reader = BufReader::new(bytes.as_slice());
        assert!(matches!(read_message(&mut reader).unwrap(), Some(Frame::Malformed(_))));
    }

    #[test]
    fn missing_content_length_yields_none() {
        let bytes = b"X-Header: 1\r\n\r\n".to_vec();
        let mut reader = BufReader::new(bytes.as_slice());
        assert!(read_message(&mut reader).unwrap().is_none());
    }

    #[test]
    fn write_round_trip() {
        let mut out = Vec::new();
        let response = JsonRpcResponse::reply(Some(1.into()), Ok(serde_json::Value::Null));
        write_message(&mut out, &response).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Content-Length: "));
        assert!(text.contains("\r\n\r\n{"));

        let mut out = Vec::new();
        write_notification(&mut out, "textDocument/publishDiagnostics", serde_json::json!({}))
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("publishDiagnostics"));
    }
}
