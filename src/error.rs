use http::{Method, StatusCode};
use thiserror::Error;

/// A pattern string rejected at registration time.
///
/// These are configuration errors: a router that fails to build should be
/// treated as fatal at startup, not retried per request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
	#[error("unterminated `{{` in token `{0}`")]
	UnterminatedBrace(String),

	#[error("empty parameter name in token `{0}`")]
	EmptyParamName(String),

	#[error("`**` must be the final token of a pattern")]
	WildcardAllNotLast,

	#[error("optional parameter `{0}` may only be followed by optional parameters or `**`")]
	OptionalNotTrailing(String),

	#[error("dynamic marker inside literal token `{0}`")]
	MarkerInLiteral(String),
}

/// Why a request matched no route.
///
/// Variants are declared in reporting priority order, lowest first: when
/// several candidate routes fail for different reasons, the highest-ranked
/// classification wins.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResolveErrorKind {
	/// No registered pattern accounts for this host and path.
	#[error("not found")]
	NotFound,

	/// A pattern's shape matched but a required parameter value was empty.
	#[error("bad request")]
	BadRequest,

	/// Some pattern matched on host and path but none accepted the method.
	#[error("method not allowed")]
	MethodNotAllowed,
}

impl ResolveErrorKind {
	/// The HTTP status this classification maps to.
	pub fn status(&self) -> StatusCode {
		match self {
			ResolveErrorKind::NotFound => StatusCode::NOT_FOUND,
			ResolveErrorKind::BadRequest => StatusCode::BAD_REQUEST,
			ResolveErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
		}
	}
}

/// A classified resolution failure, carrying the request it was produced for.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {method} {host}{path}")]
pub struct ResolveError {
	pub kind: ResolveErrorKind,
	pub method: Method,
	pub host: String,
	pub path: String,
}
