use crate::error::RequestError;
use std::collections::HashMap;

/// The first line of an HTTP request. Nothing beyond it is ever parsed;
/// headers and body are read off the socket and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub path: String,
    pub version: String,
}

impl RequestLine {
    /// Parse `METHOD PATH VERSION` from one line.
    ///
    /// Fewer than two whitespace-separated tokens is malformed and closes
    /// the connection with no response. A missing version token is
    /// tolerated.
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        let mut tokens = line.split_whitespace();

        let method = tokens.next().ok_or(RequestError::MalformedRequestLine)?;
        let path = tokens.next().ok_or(RequestError::MalformedRequestLine)?;
        let version = tokens.next().unwrap_or("");

        Ok(Self {
            method: method.to_string(),
            path: path.to_string(),
            version: version.to_string(),
        })
    }

    /// The path with any query string stripped
    pub fn route(&self) -> &str {
        split_path_query(&self.path).0
    }

    /// Query parameters parsed from the path, if any
    pub fn query_params(&self) -> HashMap<String, String> {
        match split_path_query(&self.path).1 {
            Some(query) => parse_query(query),
            None => HashMap::new(),
        }
    }
}

/// Split a request path at the first `?`
pub fn split_path_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((route, query)) => (route, Some(query)),
        None => (path, None),
    }
}

/// Parse a query string: pairs split on `&`, key/value on the first `=`.
/// A duplicate key is overwritten by its last occurrence; pairs without a
/// `=` are ignored.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            params.insert(key.to_string(), value.to_string());
        }
    }
    params
}

/// Look up a float parameter. A value that fails to parse is treated the
/// same as a missing key.
pub fn float_param(params: &HashMap<String, String>, key: &str) -> Option<f32> {
    params.get(key).and_then(|value| value.parse().ok())
}
