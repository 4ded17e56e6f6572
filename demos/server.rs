use lath::{
	hyper::Server, Handler, HttpRouter, Params, Request, ResponseBuilder, RouteFuture,
	RouterBuilder,
};

fn greet(params: Params, _req: Request) -> RouteFuture {
	Box::pin(async move {
		let name = params.get("name").cloned().unwrap_or_else(|| "world".to_owned());
		Ok(ResponseBuilder::default().body(format!("hello, {}\n", name).into())?)
	})
}

fn catch_all(_params: Params, req: Request) -> RouteFuture {
	Box::pin(async move {
		let body = format!("nothing at {}\n", req.uri().path());
		Ok(ResponseBuilder::default().status(404).body(body.into())?)
	})
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	let addr = ([127, 0, 0, 1], 3000).into();

	let mut builder = RouterBuilder::default();
	builder
		.get("/greet/{name?}", greet as Handler)?
		.all("/**", catch_all as Handler)?;
	let router = HttpRouter::from(builder.build());

	let server = Server::bind(&addr).serve(router);
	println!("Listening on http://{}", addr);

	server.await?;
	Ok(())
}
