use bytes::Bytes;
use http_body_util::{BodyExt, Full, combinators::BoxBody};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use oasgraph::OpenApiRequestValidator;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;

const SPECIFICATION: &str = "demos/hyper-validation/petstore.yaml";

fn full(message: impl Into<Bytes>) -> BoxBody<Bytes, hyper::Error> {
    Full::new(message.into())
        .map_err(|never| match never {})
        .boxed()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));

    let listener = TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    let validator = OpenApiRequestValidator::builder()
        .file(SPECIFICATION)
        .base_path_from_servers()
        .require_parameters()
        .build()?;
    let enforce = std::env::var("OASGRAPH_ENFORCE").is_ok_and(|value| value == "1");
    let validation_service = ValidationService {
        validator: Arc::new(validator),
        enforce,
    };
    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);

        let service = validation_service.clone();
        tokio::task::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                println!("Error serving connection: {:?}", err);
            }
        });
    }
}

/// Validates each request, then either rejects it or hands it to the downstream handler.
#[derive(Clone)]
pub struct ValidationService {
    pub validator: Arc<OpenApiRequestValidator>,
    pub enforce: bool,
}

fn downstream(operation_id: Option<&str>) -> Response<BoxBody<Bytes, hyper::Error>> {
    let message = format!("handled by {}\n", operation_id.unwrap_or("unnamed operation"));
    Response::new(full(message))
}

impl Service<Request<Incoming>> for ValidationService {
    type Response = Response<BoxBody<Bytes, hyper::Error>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move {
            let response = match service.validator.validate_request(&req) {
                Ok(resolved) => downstream(resolved.operation_id()),
                Err(err) if service.enforce => {
                    println!("Rejected {} {}: {}", req.method(), req.uri(), err);
                    let mut response = Response::new(full(format!("{}\n", err)));
                    *response.status_mut() = err.status_code();
                    response
                }
                Err(err) => {
                    println!("Would reject {} {}: {}", req.method(), req.uri(), err);
                    downstream(None)
                }
            };
            Ok(response)
        })
    }
}
