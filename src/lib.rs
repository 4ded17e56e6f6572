//! A bucket-hashed HTTP router with host patterns, wildcards and named
//! parameters, built on hyper.
//!
//! Patterns are compiled at registration into a static bucket key plus token
//! sequences for the host and the dynamic part of the path. Resolution hashes
//! the request path to a single bucket and tries its routes in registration
//! order; the first route whose host, path and method all match wins.
//!
//! ```
//! use http::Method;
//! use lath::{ResolveErrorKind, RouterBuilder};
//!
//! # fn main() -> Result<(), lath::PatternError> {
//! let mut builder = RouterBuilder::default();
//! builder
//! 	.get("/users/{id}", 1)?
//! 	.post("/users/{id}", 2)?
//! 	.all("{tenant}.example.com/admin/**", 3)?;
//! let router = builder.build();
//!
//! let found = router.resolve(&Method::GET, "example.com", "/users/42").unwrap();
//! assert_eq!(*found.handler, 1);
//! assert_eq!(found.params["id"], "42");
//!
//! let denied = router.resolve(&Method::DELETE, "example.com", "/users/42").unwrap_err();
//! assert_eq!(denied.kind, ResolveErrorKind::MethodNotAllowed);
//! # Ok(())
//! # }
//! ```
//!
//! Pattern grammar: `{name}` captures one segment; `{name?}` may be omitted
//! at the end of the path; `*` matches exactly one segment; `**` matches the
//! remainder and must come last. A host pattern, if any, precedes the first
//! `/` and uses the same grammar split on `.`, matched from the top-level
//! domain inward. Exactly one leading and one trailing slash are
//! insignificant on both patterns and paths.
//!
//! A request that matches no route resolves to a classified error, not-found,
//! bad-request or method-not-allowed, carrying the attempted method, host and
//! path. Malformed patterns are rejected when registered.
//!
//! With the `hyper` feature enabled, `HttpRouter` serves a built router as a
//! hyper service.

#[cfg(feature = "hyper")]
mod http;
#[cfg(feature = "hyper")]
pub use self::http::*;

/// Classified registration-time and request-time errors.
pub mod error;

/// Pattern compilation and token matching.
pub mod route;

/// Contains the core structs of the router.
///
/// Use the RouterBuilder to create a Router; resolve requests against it, or
/// pass it to hyper via HttpRouter.
pub mod router;

pub use error::*;
pub use route::*;
pub use router::*;
