//! HTTP request pipeline.
//!
//! Commands describe what they want as a [`Request`], the [`Client`] turns it
//! into a [`PreparedRequest`] against the configured target, hands it to a
//! [`Transport`] and normalizes failing responses into [`ClientError`]s.

use crate::config::Config;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors produced while talking to the control plane
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got a response (DNS, refused connection, timeout...)
    #[error("{0}")]
    Transport(String),

    /// The server answered with a status >= 400
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Unable to parse the server response: {0}")]
    Decode(#[from] serde_json::Error),

    /// An error reported inside a streamed progress response
    #[error("{0}")]
    Remote(String),

    #[error("Failed to encode request body: {0}")]
    Encode(serde_json::Error),
}

impl ClientError {
    /// Status code of a server error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP methods used by the control plane API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Literal bytes, e.g. a unit count or a space separated variable list
    Raw(Vec<u8>),
    /// An already serialized JSON document
    Json(Vec<u8>),
}

impl Body {
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Body::Raw(bytes.into())
    }

    /// Serialize a value to JSON. Field order follows the value's
    /// `Serialize` impl, so structs keep their declaration order.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ClientError> {
        serde_json::to_vec(value)
            .map(Body::Json)
            .map_err(ClientError::Encode)
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Body::Raw(bytes) | Body::Json(bytes) => bytes,
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            Body::Raw(_) => "text/plain",
            Body::Json(_) => "application/json",
        }
    }
}

/// A resource-relative request built by a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter; parameters keep insertion order
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn raw_body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::raw(bytes));
        self
    }

    pub fn json_body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ClientError> {
        self.body = Some(Body::json(value)?);
        Ok(self)
    }

    /// Encoded query string without the leading `?`
    pub fn query_string(&self) -> String {
        encode_query(&self.query)
    }
}

/// Build a request in one call
pub fn build(method: Method, path: &str, query: &[(&str, &str)], body: Option<Body>) -> Request {
    let mut request = Request::new(method, path);
    for (key, value) in query {
        request = request.query(*key, *value);
    }
    request.body = body;
    request
}

/// URL-encode ordered key/value pairs as `k1=v1&k2=v2`
pub fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a query string back into ordered pairs
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let unescape = |part: &str| {
        let part = part.replace('+', " ");
        match urlencoding::decode(&part) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => part.clone(),
        }
    };

    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (unescape(key), unescape(value)),
            None => (unescape(pair), String::new()),
        })
        .collect()
}

/// A request resolved against the target, ready for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub path: String,
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether there is nothing to decode (empty body or 204)
    pub fn is_empty(&self) -> bool {
        self.status == 204 || self.body.iter().all(|b| b.is_ascii_whitespace())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        decode(&self.body)
    }
}

/// Decode a JSON body. Unknown fields are ignored; defaults for missing
/// fields come from the target type's serde attributes.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    Ok(serde_json::from_slice(body)?)
}

/// Something that can perform one HTTP round trip
pub trait Transport {
    fn round_trip(&self, request: &PreparedRequest) -> Result<Response, ClientError>;
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn round_trip(&self, request: &PreparedRequest) -> Result<Response, ClientError> {
        (**self).round_trip(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn round_trip(&self, request: &PreparedRequest) -> Result<Response, ClientError> {
        (**self).round_trip(request)
    }
}

/// Production transport backed by reqwest's blocking client
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self, ClientError> {
        let mut builder = reqwest::blocking::Client::builder();
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn round_trip(&self, request: &PreparedRequest) -> Result<Response, ClientError> {
        let mut builder = self.client.request(request.method.into(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Response::new(status, body.to_vec()))
    }
}

/// Client for the control plane API
pub struct Client {
    transport: Box<dyn Transport>,
    target: String,
    token: Option<String>,
}

impl Client {
    pub fn new(transport: impl Transport + 'static, target: impl Into<String>) -> Self {
        let target: String = target.into();
        Self {
            transport: Box::new(transport),
            target: target.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Build a client using the HTTP transport and the configured target
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.target.timeout_secs)?;
        let client = Self::new(transport, config.target_url());
        Ok(match &config.auth.token {
            Some(token) if !token.is_empty() => client.with_token(token.clone()),
            _ => client,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Resolve a request against the target and attach headers
    pub fn prepare(&self, request: &Request) -> PreparedRequest {
        let query = request.query_string();
        let mut url = format!("{}{}", self.target, request.path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        let mut headers = Vec::new();
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("bearer {}", token)));
        }
        if let Some(body) = &request.body {
            headers.push(("Content-Type".to_string(), body.content_type().to_string()));
        }

        PreparedRequest {
            method: request.method,
            url,
            path: request.path.clone(),
            query,
            headers,
            body: request
                .body
                .as_ref()
                .map(|b| b.bytes().to_vec())
                .unwrap_or_default(),
        }
    }

    /// Send a request. Statuses >= 400 become [`ClientError::Server`] with
    /// the response body as message.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let prepared = self.prepare(request);
        debug!("Sending request to {}", prepared.url);

        let response = self.transport.round_trip(&prepared)?;
        debug!("Server answered with status {}", response.status);

        if response.status >= 400 {
            let message = response.text().trim_end_matches(['\n', '\r']).to_string();
            return Err(ClientError::Server {
                status: response.status,
                message,
            });
        }

        Ok(response)
    }

    /// Send a request and decode its JSON body
    pub fn send_json<T: DeserializeOwned>(&self, request: &Request) -> Result<T, ClientError> {
        self.send(request)?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client, StaticTransport};
    use serde::Deserialize;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Accept one connection, answer it with `response` and hand back the
    /// raw request text
    fn one_shot_server(response: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                        .map(|(_, value)| value.trim().parse::<usize>().unwrap())
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + length || n == 0 {
                        break;
                    }
                } else if n == 0 {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (addr, handle)
    }

    #[test]
    fn test_query_keeps_caller_order() {
        let request = Request::put("/swap")
            .query("app1", "app1")
            .query("app2", "app2")
            .query("force", "false");
        assert_eq!(request.query_string(), "app1=app1&app2=app2&force=false");
    }

    #[test]
    fn test_query_round_trip() {
        let pairs = vec![
            ("app".to_string(), "my app".to_string()),
            ("filter".to_string(), "a=b&c".to_string()),
            ("empty".to_string(), String::new()),
            ("unicode".to_string(), "café".to_string()),
        ];
        let encoded = encode_query(&pairs);
        assert!(!encoded.contains(' '));
        assert_eq!(parse_query(&encoded), pairs);
    }

    #[test]
    fn test_build_with_raw_body() {
        let request = build(
            Method::Put,
            "/apps/radio/units",
            &[],
            Some(Body::raw("3")),
        );
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.body, Some(Body::Raw(b"3".to_vec())));
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_json_body_keeps_field_order() {
        #[derive(Serialize)]
        struct Payload<'a> {
            name: &'a str,
            platform: &'a str,
        }

        let request = Request::post("/apps")
            .json_body(&Payload {
                name: "ble",
                platform: "django",
            })
            .unwrap();
        assert_eq!(
            request.body.unwrap().bytes(),
            br#"{"name":"ble","platform":"django"}"#
        );
    }

    #[test]
    fn test_prepare_resolves_url_and_headers() {
        let fake = Rc::new(StaticTransport::ok(""));
        let client = Client::new(Rc::clone(&fake), "http://paas.test/").with_token("t0k3n");
        let prepared = client.prepare(
            &Request::get("/services/instances")
                .query("app", "app1")
                .raw_body("x"),
        );

        assert_eq!(prepared.url, "http://paas.test/services/instances?app=app1");
        assert_eq!(prepared.path, "/services/instances");
        assert_eq!(prepared.query, "app=app1");
        assert_eq!(prepared.header("authorization"), Some("bearer t0k3n"));
        assert_eq!(prepared.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_no_auth_header_without_token() {
        let fake = Rc::new(StaticTransport::ok(""));
        let client = client(Rc::clone(&fake));
        client.send(&Request::get("/apps")).unwrap();

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].header("Authorization").is_none());
    }

    #[test]
    fn test_server_error_carries_trimmed_body() {
        let fake = Rc::new(StaticTransport::new(412, "Invalid cname\n"));
        let err = client(fake).send(&Request::post("/apps/x/cname")).unwrap_err();

        assert_eq!(err.status(), Some(412));
        assert_eq!(err.to_string(), "Invalid cname");
    }

    #[test]
    fn test_transport_error_is_passed_through() {
        struct Refused;
        impl Transport for Refused {
            fn round_trip(&self, _: &PreparedRequest) -> Result<Response, ClientError> {
                Err(ClientError::Transport("connection refused".to_string()))
            }
        }

        let err = client(Refused).send(&Request::get("/apps")).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_http_transport_connection_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = Client::new(HttpTransport::new(1).unwrap(), format!("http://127.0.0.1:{}", port));

        let err = client.send(&Request::get("/apps")).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn test_http_transport_round_trip() {
        let (addr, server) = one_shot_server(
            "HTTP/1.1 412 Precondition Failed\r\nContent-Length: 17\r\nConnection: close\r\n\r\nApps are unequal.",
        );
        let client = Client::new(HttpTransport::new(5).unwrap(), addr).with_token("t0k3n");
        let prepared = client.prepare(&Request::put("/apps/blog/units").query("force", "true").raw_body("3"));

        let response = HttpTransport::new(5).unwrap().round_trip(&prepared).unwrap();
        assert_eq!(response.status, 412);
        assert_eq!(response.text(), "Apps are unequal.");

        let raw = server.join().unwrap();
        assert!(raw.starts_with("PUT /apps/blog/units?force=true HTTP/1.1\r\n"));
        let lower = raw.to_ascii_lowercase();
        assert!(lower.contains("\r\nauthorization: bearer t0k3n\r\n"));
        assert!(lower.contains("\r\ncontent-type: text/plain\r\n"));
        assert!(raw.ends_with("\r\n\r\n3"));
    }

    #[test]
    fn test_http_transport_server_error_through_client() {
        let (addr, server) = one_shot_server(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 14\r\nConnection: close\r\n\r\nApp not found\n",
        );
        let client = Client::new(HttpTransport::new(5).unwrap(), addr);

        let err = client.send(&Request::delete("/apps/ghost")).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "App not found");
        assert!(server.join().unwrap().starts_with("DELETE /apps/ghost HTTP/1.1\r\n"));
    }

    #[test]
    fn test_decode_tolerates_unknown_and_missing_fields() {
        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct Partial {
            name: String,
            count: u32,
        }

        let parsed: Partial = decode(br#"{"name":"x","extra":[1,2,3]}"#).unwrap();
        assert_eq!(parsed.name, "x");
        assert_eq!(parsed.count, 0);
    }

    #[test]
    fn test_decode_error_on_malformed_json() {
        let err = decode::<Vec<String>>(b"{not json").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
        assert!(err.to_string().starts_with("Unable to parse the server response"));
    }

    #[test]
    fn test_response_is_empty() {
        assert!(Response::new(200, "").is_empty());
        assert!(Response::new(200, " \n").is_empty());
        assert!(Response::new(204, "[]").is_empty());
        assert!(!Response::new(200, "[]").is_empty());
    }
}
