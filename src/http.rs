use crate::{Match, Params, ResolveError, Router};
use anyhow::{Error, Result};
use hyper::{
	body::Body,
	header::HOST,
	http::response::Builder,
	service::Service,
};
use std::{
	convert::Infallible,
	future::{ready, Future, Ready},
	pin::Pin,
	sync::Arc,
	task::{Context, Poll},
};
use tracing::{debug, error};

pub use hyper;

pub use hyper::http::response::Builder as ResponseBuilder;
pub type Request = hyper::Request<Body>;
pub type Response = Result<hyper::Response<Body>>;

/// The boxed future a route handler returns.
pub type RouteFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// A route handler: captured parameters plus the request, producing a
/// response future.
pub type Handler = fn(Params, Request) -> RouteFuture;

fn default_error_handler(e: Error) -> hyper::Response<Body> {
	Builder::default()
		.status(500)
		.body(e.to_string().into())
		.unwrap()
}

fn default_denied_handler(err: &ResolveError) -> hyper::Response<Body> {
	Builder::default()
		.status(err.kind.status())
		.body(Body::empty())
		.unwrap()
}

/// A function that can convert an error returned by a handler into a response.
pub type ErrorHandler = fn(e: Error) -> hyper::Response<Body>;

/// A function that turns a classified resolution failure into a response.
pub type DeniedHandler = fn(err: &ResolveError) -> hyper::Response<Body>;

type InnerRouter = Router<Handler>;

/// Serves a [`Router`] over hyper, mapping classified resolution failures to
/// 404, 400 and 405 responses.
pub struct HttpRouter {
	router: Arc<InnerRouter>,
	internal_error: ErrorHandler,
	denied: DeniedHandler,
}

impl From<InnerRouter> for HttpRouter {
	fn from(inner: InnerRouter) -> Self {
		Self {
			router: Arc::new(inner),
			internal_error: default_error_handler,
			denied: default_denied_handler,
		}
	}
}

impl HttpRouter {
	/// Replaces the handler for errors returned by route handlers.
	pub fn internal_error_handler(mut self, handler: ErrorHandler) -> Self {
		self.internal_error = handler;
		self
	}

	/// Replaces the handler for requests that resolve to no route.
	pub fn denied_handler(mut self, handler: DeniedHandler) -> Self {
		self.denied = handler;
		self
	}
}

impl<T> Service<T> for HttpRouter {
	type Response = RouteHandler;
	type Error = Infallible;
	type Future = Ready<Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, _: &mut Context) -> Poll<Result<(), Self::Error>> {
		Poll::Ready(Ok(()))
	}

	fn call(&mut self, _: T) -> Self::Future {
		let router = Arc::clone(&self.router);
		let internal_error = self.internal_error;
		let denied = self.denied;

		ready(Ok(RouteHandler {
			router,
			internal_error,
			denied,
		}))
	}
}

/// Responsible for handling the actual HTTP requests from hyper.
pub struct RouteHandler {
	router: Arc<InnerRouter>,
	internal_error: ErrorHandler,
	denied: DeniedHandler,
}

impl Service<Request> for RouteHandler {
	type Response = hyper::Response<Body>;
	type Error = Infallible;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

	fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		Poll::Ready(Ok(()))
	}

	fn call(&mut self, req: Request) -> Self::Future {
		let method = req.method().clone();
		let host = req
			.headers()
			.get(HOST)
			.and_then(|value| value.to_str().ok())
			.or_else(|| req.uri().host())
			.unwrap_or_default()
			.to_owned();
		let path = req.uri().path().to_owned();

		match self.router.resolve(&method, &host, &path) {
			Ok(Match { handler, params }) => {
				let fut = handler(params, req);
				let err = self.internal_error;
				Box::pin(async move {
					Ok(fut.await.unwrap_or_else(|e| {
						error!("handler error: {:#}", e);
						err(e)
					}))
				})
			}
			Err(e) => {
				debug!(%method, %host, %path, kind = %e.kind, "no route");
				let response = (self.denied)(&e);
				Box::pin(async { Ok(response) })
			}
		}
	}
}
