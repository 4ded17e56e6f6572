use crate::error::{PatternError, ResolveError, ResolveErrorKind};
use crate::route::{trim_slashes, Params, Route};
use http::Method;
use std::collections::HashMap;

type Buckets<H> = HashMap<String, Vec<Route<H>>>;

/// A successful resolution: the matched route's handler and the captured
/// parameter bindings. Owned by the single in-flight request.
#[derive(Debug)]
pub struct Match<'r, H> {
	pub handler: &'r H,
	pub params: Params,
}

/// Accumulates routes, then builds an immutable [`Router`].
///
/// Registration methods compile the pattern eagerly, so a malformed pattern
/// fails here rather than at request time.
#[derive(Debug)]
pub struct RouterBuilder<H> {
	buckets: Buckets<H>,
}

impl<H> Default for RouterBuilder<H> {
	fn default() -> Self {
		Self {
			buckets: Buckets::default(),
		}
	}
}

impl<H> RouterBuilder<H> {
	/// Registers `handler` under `pattern` for the given methods, `None`
	/// accepting any method. Routes sharing a static prefix are tried in
	/// registration order.
	pub fn route(
		&mut self,
		methods: Option<&[Method]>,
		pattern: &str,
		handler: H,
	) -> Result<&mut Self, PatternError> {
		let route = Route::new(methods.map(<[Method]>::to_vec), pattern, handler)?;
		self.buckets
			.entry(route.static_key.clone())
			.or_insert_with(Vec::new)
			.push(route);
		Ok(self)
	}

	/// Registers a route accepting any method.
	pub fn all(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError> {
		self.route(None, pattern, handler)
	}

	pub fn get(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError> {
		self.route(Some(&[Method::GET]), pattern, handler)
	}

	pub fn post(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError> {
		self.route(Some(&[Method::POST]), pattern, handler)
	}

	pub fn put(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError> {
		self.route(Some(&[Method::PUT]), pattern, handler)
	}

	pub fn delete(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError> {
		self.route(Some(&[Method::DELETE]), pattern, handler)
	}

	pub fn build(self) -> Router<H> {
		Router {
			buckets: self.buckets,
		}
	}
}

/// Compiled routes, bucketed by static key.
///
/// Immutable once built, so it may be read concurrently by any number of
/// in-flight requests without locking.
#[derive(Debug)]
pub struct Router<H> {
	buckets: Buckets<H>,
}

impl<H> Router<H> {
	/// Resolves a request to the first fully matching route, in registration
	/// order within the candidate bucket.
	///
	/// On failure the error classification is ranked across all candidates:
	/// method-not-allowed beats bad-request beats not-found.
	pub fn resolve(&self, method: &Method, host: &str, path: &str) -> Result<Match<'_, H>, ResolveError> {
		let trimmed = trim_slashes(path);
		let mut denial = ResolveErrorKind::NotFound;

		if let Some((routes, rest)) = self.bucket(trimmed) {
			for route in routes {
				match route.match_request(host, rest) {
					Ok(params) => {
						if route.accepts(method) {
							return Ok(Match {
								handler: &route.handler,
								params,
							});
						}
						denial = denial.max(ResolveErrorKind::MethodNotAllowed);
					}
					Err(kind) => denial = denial.max(kind),
				}
			}
		}

		Err(ResolveError {
			kind: denial,
			method: method.clone(),
			host: host.to_owned(),
			path: path.to_owned(),
		})
	}

	/// Finds the bucket under the longest registered segment-prefix of the
	/// trimmed path, along with the remaining dynamic part of the path.
	///
	/// Lookups are exact per prefix; routes bucketed under a different
	/// static prefix are never consulted.
	fn bucket<'r, 'p>(&'r self, trimmed: &'p str) -> Option<(&'r [Route<H>], &'p str)> {
		let mut key = trimmed;

		loop {
			if let Some(routes) = self.buckets.get(key) {
				let rest = &trimmed[key.len()..];
				let rest = rest.strip_prefix('/').unwrap_or(rest);
				return Some((routes, rest));
			}

			match key.rfind('/') {
				Some(i) => key = &key[..i],
				None if key.is_empty() => return None,
				None => key = "",
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn router(routes: &[(Option<Method>, &str)]) -> Router<usize> {
		let mut builder = RouterBuilder::default();
		for (id, (method, pattern)) in routes.iter().enumerate() {
			let methods = method.as_ref().map(std::slice::from_ref);
			builder.route(methods, pattern, id).unwrap();
		}
		builder.build()
	}

	fn resolve<'r>(
		router: &'r Router<usize>,
		method: Method,
		path: &str,
	) -> Result<Match<'r, usize>, ResolveError> {
		router.resolve(&method, "localhost", path)
	}

	#[test]
	fn literal_route_matches_exact_path() {
		let router = router(&[(None, "/static1/static2")]);
		let m = resolve(&router, Method::GET, "/static1/static2").unwrap();
		assert_eq!(*m.handler, 0);
		assert!(m.params.is_empty());
	}

	#[test]
	fn trailing_slash_is_insignificant() {
		// Pattern/path pairs from every combination of one trailing or
		// leading slash difference.
		let cases = [
			("/static1/static2/", "/static1/static2"),
			("/static1/static2", "/static1/static2/"),
			("/{p1}/static1/", "/param1/static1"),
			("/{p1}/static1", "/param1/static1/"),
			("/static1/{p1}/", "/static1/param1"),
			("/static1/{p1}", "/static1/param1/"),
			("/static1/{o1?}/{o2?}/", "/static1"),
			("localhost/static1/{o1?}/{o2?}/", "/static1"),
		];

		for (pattern, path) in &cases {
			let router = router(&[(None, pattern)]);
			assert!(
				resolve(&router, Method::GET, path).is_ok(),
				"pattern {} should match {}",
				pattern,
				path
			);
		}
	}

	#[test]
	fn empty_required_param_is_bad_request() {
		let router = router(&[(None, "/{id}")]);
		let err = resolve(&router, Method::GET, "/").unwrap_err();
		assert_eq!(err.kind, ResolveErrorKind::BadRequest);
	}

	#[test]
	fn absent_optional_params_leave_names_unbound() {
		let router = router(&[(None, "/static1/{p1}/{o1?}/{o2?}")]);
		let m = resolve(&router, Method::GET, "/static1/param1").unwrap();
		assert_eq!(m.params["p1"], "param1");
		assert!(!m.params.contains_key("o1"));
		assert!(!m.params.contains_key("o2"));
	}

	#[test]
	fn wildcard_all_matches_any_suffix() {
		let router = router(&[(None, "/a/**")]);
		for path in &["/a", "/a/b", "/a/b/c/d"] {
			assert!(resolve(&router, Method::GET, path).is_ok(), "{}", path);
		}
	}

	#[test]
	fn single_wildcard_requires_exactly_one_segment() {
		let router = router(&[(None, "/a/*/c")]);
		assert!(resolve(&router, Method::GET, "/a/b/c").is_ok());
		assert_eq!(
			resolve(&router, Method::GET, "/a/c").unwrap_err().kind,
			ResolveErrorKind::NotFound
		);
		assert_eq!(
			resolve(&router, Method::GET, "/a/b/d/c").unwrap_err().kind,
			ResolveErrorKind::NotFound
		);
	}

	#[test]
	fn catch_all_routes_everything() {
		let router = router(&[(None, "/**")]);
		assert!(resolve(&router, Method::GET, "/").is_ok());
		assert!(resolve(&router, Method::GET, "/anything/here").is_ok());
	}

	#[test]
	fn root_route_does_not_match_other_paths() {
		let router = router(&[(None, "/")]);
		let err = resolve(&router, Method::GET, "/other").unwrap_err();
		assert_eq!(err.kind, ResolveErrorKind::NotFound);
	}

	#[test]
	fn complex_pattern_binds_all_params() {
		let router = router(&[(None, "/static1/{p1}/static3/*/{p2}/{o?}/**")]);
		let m = resolve(&router, Method::GET, "/static1/v1/static3/x/v2/opt/y/z").unwrap();
		assert_eq!(m.params["p1"], "v1");
		assert_eq!(m.params["p2"], "v2");
		assert_eq!(m.params["o"], "opt");
	}

	#[test]
	fn wildcard_then_optional_tolerates_short_path() {
		let router = router(&[(None, "/static1/*/{opt?}")]);
		assert!(resolve(&router, Method::GET, "/static1").is_ok());
	}

	#[test]
	fn method_filtering_selects_per_method_handlers() {
		let router = router(&[
			(Some(Method::GET), "/static1/static2"),
			(Some(Method::POST), "/static1/static2"),
		]);

		let get = resolve(&router, Method::GET, "/static1/static2").unwrap();
		assert_eq!(*get.handler, 0);

		let post = resolve(&router, Method::POST, "/static1/static2").unwrap();
		assert_eq!(*post.handler, 1);

		let err = resolve(&router, Method::DELETE, "/static1/static2").unwrap_err();
		assert_eq!(err.kind, ResolveErrorKind::MethodNotAllowed);
	}

	#[test]
	fn method_mismatch_on_static_route_is_method_not_allowed() {
		let router = router(&[(Some(Method::POST), "/static1/static2/")]);
		let err = resolve(&router, Method::GET, "/static1/static2").unwrap_err();
		assert_eq!(err.kind, ResolveErrorKind::MethodNotAllowed);
	}

	#[test]
	fn first_registered_full_match_wins() {
		let router = router(&[(None, "/x/{a}"), (None, "/x/{b}")]);
		let m = resolve(&router, Method::GET, "/x/v").unwrap();
		assert_eq!(*m.handler, 0);
		assert_eq!(m.params["a"], "v");
	}

	#[test]
	fn method_not_allowed_outranks_other_denials() {
		let router = router(&[
			(Some(Method::POST), "/p/{id}"),
			(Some(Method::GET), "/p/{id}/z"),
		]);
		let err = resolve(&router, Method::GET, "/p/abc").unwrap_err();
		assert_eq!(err.kind, ResolveErrorKind::MethodNotAllowed);
	}

	#[test]
	fn bad_request_outranks_not_found() {
		let router = router(&[(None, "/p/*/z"), (None, "/p/{id}")]);
		let err = resolve(&router, Method::GET, "/p/").unwrap_err();
		assert_eq!(err.kind, ResolveErrorKind::BadRequest);
	}

	#[test]
	fn host_pattern_binds_label() {
		let mut builder = RouterBuilder::default();
		builder.all("{sub}.example.com/x", 0).unwrap();
		let router = builder.build();

		let m = router
			.resolve(&Method::GET, "anything.example.com", "/x")
			.unwrap();
		assert_eq!(m.params["sub"], "anything");

		assert_eq!(
			router
				.resolve(&Method::GET, "example.com", "/x")
				.unwrap_err()
				.kind,
			ResolveErrorKind::NotFound
		);
	}

	#[test]
	fn host_param_binds_without_path_params() {
		let mut builder = RouterBuilder::default();
		builder.all("{domain}/", 0).unwrap();
		let router = builder.build();

		let m = router.resolve(&Method::GET, "localhost", "/").unwrap();
		assert_eq!(m.params["domain"], "localhost");
	}

	#[test]
	fn wrong_host_is_not_found() {
		let router = router(&[(None, "wronghost/static1/{o1?}/{o2?}/")]);
		let err = resolve(&router, Method::GET, "/static1").unwrap_err();
		assert_eq!(err.kind, ResolveErrorKind::NotFound);
	}

	#[test]
	fn host_port_is_ignored() {
		let mut builder = RouterBuilder::default();
		builder.all("localhost/static1", 0).unwrap();
		let router = builder.build();

		assert!(router
			.resolve(&Method::GET, "localhost:8080", "/static1")
			.is_ok());
	}

	#[test]
	fn longest_registered_prefix_owns_the_request() {
		// Once a bucket exists for the longest prefix, shorter-prefix
		// buckets are not consulted, even a catch-all.
		let router = router(&[(None, "/**"), (None, "/foo")]);
		assert!(resolve(&router, Method::GET, "/foo").is_ok());
		let err = resolve(&router, Method::GET, "/foo/bar").unwrap_err();
		assert_eq!(err.kind, ResolveErrorKind::NotFound);
	}

	#[test]
	fn denial_reports_the_request() {
		let router = router(&[(None, "/")]);
		let err = resolve(&router, Method::GET, "/missing").unwrap_err();
		assert_eq!(err.method, Method::GET);
		assert_eq!(err.host, "localhost");
		assert_eq!(err.path, "/missing");
		assert_eq!(err.to_string(), "not found: GET localhost/missing");
	}
}
