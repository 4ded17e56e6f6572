use crate::error::{PatternError, ResolveErrorKind};
use http::Method;
use std::collections::HashMap;

/// Captured parameter bindings, name to decoded value.
pub type Params = HashMap<String, String>;

/// One `/`- or `.`-delimited unit of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	/// Must equal the corresponding segment exactly.
	Literal(String),
	/// `*`: consumes exactly one segment, value discarded.
	Wildcard,
	/// `**`: consumes the remainder of the segments. Terminal.
	WildcardAll,
	/// `{name}` or `{name?}`: captures one segment under `name`.
	Param { name: String, optional: bool },
}

/// The immutable, compiled form of one registered route.
///
/// Compiled once at registration from a raw pattern string; owned by the
/// bucket it is appended to and never mutated or removed afterwards.
#[derive(Debug, Clone)]
pub struct Route<H> {
	/// Host tokens stored reversed, rightmost label first, so matching
	/// proceeds from the top-level domain inward.
	pub(crate) host_tokens: Vec<Token>,
	/// Longest literal path prefix, slashes trimmed. The bucket key.
	pub(crate) static_key: String,
	/// Path tokens following the static prefix.
	pub(crate) path_tokens: Vec<Token>,
	/// Accepted methods; `None` accepts any.
	pub(crate) methods: Option<Vec<Method>>,
	pub(crate) handler: H,
}

impl<H> Route<H> {
	/// Compiles `pattern` into a route.
	///
	/// The portion before the first `/`, if any, is the host pattern, split
	/// on `.`. The rest is the path pattern: everything before the first
	/// `{` or `*`, trimmed back to the preceding `/`, becomes the static
	/// key; the remainder is split on `/` into tokens.
	pub(crate) fn new(methods: Option<Vec<Method>>, pattern: &str, handler: H) -> Result<Self, PatternError> {
		let (host, path) = match pattern.find('/') {
			None => (pattern, ""),
			Some(0) => ("", pattern),
			Some(i) => (&pattern[..i], &pattern[i..]),
		};

		let mut host_tokens = if host.is_empty() {
			Vec::new()
		} else {
			parse_tokens(host, '.')?
		};
		host_tokens.reverse();
		// Validated in match order, i.e. reversed: `**` as the leftmost
		// label consumes any remaining subdomains.
		validate(&host_tokens)?;

		let (static_key, path_tokens) = match path.find(|c| c == '{' || c == '*') {
			None => (trim_slashes(path).to_owned(), Vec::new()),
			Some(marker) => {
				let boundary = path[..marker].rfind('/').map(|i| i + 1).unwrap_or(0);
				let tokens = parse_tokens(trim_slashes(&path[boundary..]), '/')?;
				validate(&tokens)?;
				(trim_slashes(&path[..boundary]).to_owned(), tokens)
			}
		};

		Ok(Self {
			host_tokens,
			static_key,
			path_tokens,
			methods,
			handler,
		})
	}

	/// Matches `host` and the dynamic remainder of the path (`rest`, the
	/// part following the static key, slashes trimmed) against this route,
	/// returning the captured bindings.
	pub(crate) fn match_request(&self, host: &str, rest: &str) -> Result<Params, ResolveErrorKind> {
		let mut params = Params::new();

		if !self.host_tokens.is_empty() {
			let mut labels: Vec<&str> = strip_port(host).split('.').collect();
			labels.reverse();

			// Any host mismatch classifies as not-found.
			if match_tokens(&self.host_tokens, &labels, &mut params).is_err() {
				return Err(ResolveErrorKind::NotFound);
			}
		}

		// Fully static route: the bucket lookup already compared the path.
		if self.path_tokens.is_empty() && rest.is_empty() {
			return Ok(params);
		}

		let actual: Vec<&str> = rest.split('/').collect();
		match_tokens(&self.path_tokens, &actual, &mut params)?;
		Ok(params)
	}

	pub(crate) fn accepts(&self, method: &Method) -> bool {
		match &self.methods {
			None => true,
			Some(methods) => methods.contains(method),
		}
	}
}

/// Matches a compiled token sequence against actual segments, inserting
/// captured bindings into `params`.
///
/// Note that splitting an empty remainder yields one empty segment, so a
/// required parameter facing the bare root classifies as a bad request
/// (present but empty) rather than not-found (absent).
pub(crate) fn match_tokens(
	pattern: &[Token],
	actual: &[&str],
	params: &mut Params,
) -> Result<(), ResolveErrorKind> {
	for (i, token) in pattern.iter().enumerate() {
		// The path ran out before the pattern did.
		if i == actual.len() {
			return match token {
				Token::WildcardAll => Ok(()),
				Token::Param { optional: true, .. } => Ok(()),
				_ => Err(ResolveErrorKind::NotFound),
			};
		}

		match token {
			Token::Literal(text) => {
				if actual[i] != text {
					return Err(ResolveErrorKind::NotFound);
				}
			}
			Token::Wildcard => {}
			Token::WildcardAll => return Ok(()),
			Token::Param { name, optional } => {
				let value = actual[i];
				if !value.is_empty() {
					params.insert(name.clone(), value.to_owned());
				} else if !*optional {
					return Err(ResolveErrorKind::BadRequest);
				}
			}
		}
	}

	// Every actual segment must have been consumed.
	if pattern.len() == actual.len() {
		Ok(())
	} else {
		Err(ResolveErrorKind::NotFound)
	}
}

fn parse_tokens(segment: &str, delimiter: char) -> Result<Vec<Token>, PatternError> {
	segment.split(delimiter).map(parse_token).collect()
}

fn parse_token(raw: &str) -> Result<Token, PatternError> {
	if raw == "*" {
		return Ok(Token::Wildcard);
	}

	if raw == "**" {
		return Ok(Token::WildcardAll);
	}

	if let Some(inner) = raw.strip_prefix('{') {
		let inner = inner
			.strip_suffix('}')
			.ok_or_else(|| PatternError::UnterminatedBrace(raw.to_owned()))?;
		let (name, optional) = match inner.strip_suffix('?') {
			Some(name) => (name, true),
			None => (inner, false),
		};

		if name.is_empty() {
			return Err(PatternError::EmptyParamName(raw.to_owned()));
		}

		return Ok(Token::Param {
			name: name.to_owned(),
			optional,
		});
	}

	if raw.contains(|c| c == '{' || c == '}' || c == '*') {
		return Err(PatternError::MarkerInLiteral(raw.to_owned()));
	}

	Ok(Token::Literal(raw.to_owned()))
}

fn validate(tokens: &[Token]) -> Result<(), PatternError> {
	let mut trailing_optional: Option<&str> = None;

	for (i, token) in tokens.iter().enumerate() {
		match token {
			Token::WildcardAll => {
				if i + 1 != tokens.len() {
					return Err(PatternError::WildcardAllNotLast);
				}
			}
			Token::Param { name, optional: true } => trailing_optional = Some(name),
			_ => {
				if let Some(name) = trailing_optional {
					return Err(PatternError::OptionalNotTrailing(name.to_owned()));
				}
			}
		}
	}

	Ok(())
}

/// Trims at most one leading and one trailing slash.
pub(crate) fn trim_slashes(s: &str) -> &str {
	let s = s.strip_prefix('/').unwrap_or(s);
	s.strip_suffix('/').unwrap_or(s)
}

fn strip_port(host: &str) -> &str {
	match host.rfind(':') {
		Some(i) => &host[..i],
		None => host,
	}
}
