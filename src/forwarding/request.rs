//! Forwarded request model and its classification tags.

use std::fmt;
use thiserror::Error;

/// HTTP method of a forwarded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
}

impl HttpMethod {
    /// Returns the method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
        }
    }

    /// Returns whether the method creates a resource.
    #[must_use]
    pub const fn is_creation(self) -> bool {
        matches!(self, Self::Post)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognised HTTP method token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported HTTP method: {0}")]
pub struct ParseHttpMethodError(pub String);

impl TryFrom<&str> for HttpMethod {
    type Error = ParseHttpMethodError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(ParseHttpMethodError(value.to_owned())),
        }
    }
}

/// Logical request type assigned by the dispatch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// Opens a new session.
    StartSession,
    /// Closes the current session.
    StopSession,
    /// Any other command within a session.
    Regular,
}

/// A request on its way to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedRequest {
    method: HttpMethod,
    request_type: RequestType,
    path: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl ForwardedRequest {
    /// Creates a request with no headers and an empty body.
    #[must_use]
    pub fn new(method: HttpMethod, request_type: RequestType, path: impl Into<String>) -> Self {
        Self {
            method,
            request_type,
            path: path.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the logical request type.
    #[must_use]
    pub const fn request_type(&self) -> RequestType {
        self.request_type
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns whether this request opens a session.
    #[must_use]
    pub const fn is_session_creation(&self) -> bool {
        self.method.is_creation() && matches!(self.request_type, RequestType::StartSession)
    }

    /// Returns whether this request closes a session.
    #[must_use]
    pub const fn is_session_termination(&self) -> bool {
        matches!(self.method, HttpMethod::Delete)
            && matches!(self.request_type, RequestType::StopSession)
    }
}
