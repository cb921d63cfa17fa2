use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Reason phrase for the status codes this server emits
pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Error",
    }
}

/// Body of a control-endpoint response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// A complete control-endpoint response, ready to serialize
#[derive(Debug, Clone, PartialEq)]
pub struct ControlResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ControlResponse {
    pub fn json(status: u16, value: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(value),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Text(body.into()),
        }
    }

    pub fn ok_text() -> Self {
        Self::text(200, "OK")
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not Found")
    }

    fn content_type(&self) -> &'static str {
        match self.body {
            ResponseBody::Json(_) => "application/json",
            ResponseBody::Text(_) => "text/plain",
        }
    }

    fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            ResponseBody::Json(value) => value.to_string().into_bytes(),
            ResponseBody::Text(text) => text.clone().into_bytes(),
        }
    }

    /// Write the response over the socket. Every control response carries
    /// the permissive CORS header and an exact Content-Length.
    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let body = self.body_bytes();
        let head = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Content-Length: {}\r\n\
             \r\n",
            self.status,
            status_text(self.status),
            self.content_type(),
            body.len()
        );

        writer.write_all(head.as_bytes()).await?;
        writer.write_all(&body).await?;
        writer.flush().await
    }
}
