//! Router and HTTP/1.1 server.
//!
//! # Rust Learning Note
//!
//! This module shows how to serve HTTP with **hyper** directly instead
//! of a full web framework.
//!
//! ## The Pieces
//!
//! 1. `TcpListener::accept()` hands us one socket per client
//! 2. `TokioIo` adapts the tokio socket to hyper's I/O traits
//! 3. `service_fn` turns an async closure into a hyper `Service`
//! 4. `http1::Builder::serve_connection` drives one connection to completion
//!
//! Every connection runs in its own tokio task, so slow clients do not
//! block each other. The route table is read-only once serving starts
//! and is shared between tasks through an `Arc`.
//!
//! ## Shutdown
//!
//! One `CancellationToken` is shared by the accept loop and every
//! connection task. Cancelling it stops accepting and asks each open
//! connection to close once its in-flight request is answered. Idle
//! keep-alive connections close right away. A `TaskTracker` lets
//! [`ServerHandle::shutdown`] wait until the last connection is gone.

use crate::{request::HttpRequest, response::HttpResponse};
use futures::future::{BoxFuture, FutureExt};
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use svcreg_common::{Error, Result};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Pause after a failed `accept()` so errors like EMFILE do not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

type Handler = Arc<dyn Fn(HttpRequest) -> BoxFuture<'static, HttpResponse> + Send + Sync>;

/// Route table keyed by method and exact path.
///
/// # Example
/// ```
/// use svcreg_http::{HttpResponse, HttpServer, StatusCode};
///
/// let mut server = HttpServer::new();
/// server
///     .get("/ping", |_req| async { HttpResponse::text(StatusCode::OK, "pong") })
///     .post("/echo", |req| async move {
///         HttpResponse::json(StatusCode::OK, &req.body)
///     });
/// assert_eq!(server.route_count(), 2);
/// ```
#[derive(Clone, Default)]
pub struct HttpServer {
    routes: HashMap<Method, HashMap<String, Handler>>,
}

impl HttpServer {
    /// Creates a server with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` on exactly `path`.
    ///
    /// There is no pattern matching and no trailing-slash normalization:
    /// `/services` and `/services/` are different routes. Registering the
    /// same `(method, path)` again replaces the earlier handler.
    pub fn route<F, Fut>(&mut self, method: Method, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResponse> + Send + 'static,
    {
        let path = path.into();
        debug!("Registering route {} {}", method, path);

        let handler: Handler = Arc::new(move |request| handler(request).boxed());
        self.routes.entry(method).or_default().insert(path, handler);
        self
    }

    pub fn get<F, Fut>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResponse> + Send + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    pub fn post<F, Fut>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResponse> + Send + 'static,
    {
        self.route(Method::POST, path, handler)
    }

    pub fn put<F, Fut>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResponse> + Send + 'static,
    {
        self.route(Method::PUT, path, handler)
    }

    pub fn delete<F, Fut>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResponse> + Send + 'static,
    {
        self.route(Method::DELETE, path, handler)
    }

    /// Number of registered `(method, path)` pairs.
    pub fn route_count(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    /// Routes a single request and produces its response.
    ///
    /// This does not need a socket, which makes it the entry point for
    /// testing handlers in-process.
    pub async fn dispatch<B>(&self, request: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: fmt::Display,
    {
        let (parts, body) = request.into_parts();
        let method = parts.method;
        let path = parts.uri.path().to_string();

        let body = if method == Method::POST || method == Method::PUT {
            Some(read_json_body(body).await)
        } else {
            None
        };

        let handler = self
            .routes
            .get(&method)
            .and_then(|routes| routes.get(&path))
            .cloned();

        let Some(handler) = handler else {
            debug!("No route for {} {}", method, path);
            return HttpResponse::not_found().into_hyper();
        };

        let request = HttpRequest {
            method: method.clone(),
            path: path.clone(),
            query: HttpRequest::parse_query(parts.uri.query()),
            headers: parts.headers,
            body,
        };

        // Run the handler call inside the future so a panic while building
        // the future is caught too.
        let outcome = AssertUnwindSafe(async move { handler(request).await })
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(_) => {
                error!("Handler for {} {} panicked", method, path);
                HttpResponse::internal_error()
            }
        };

        debug!("{} {} -> {}", method, path, response.status);
        response.into_hyper()
    }

    /// Binds `addr` and starts serving in a background task.
    ///
    /// Port `0` picks a free port; use [`ServerHandle::local_addr`] to
    /// find out which one.
    pub async fn listen(self, addr: impl ToSocketAddrs) -> Result<ServerHandle> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server listening on {}", local_addr);

        let router = Arc::new(self);
        let cancel_token = CancellationToken::new();
        let connections = TaskTracker::new();
        let task = tokio::spawn(accept_loop(
            listener,
            router,
            cancel_token.clone(),
            connections.clone(),
        ));

        Ok(ServerHandle {
            local_addr,
            cancel_token,
            connections,
            task,
        })
    }
}

impl fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut routes: Vec<String> = self
            .routes
            .iter()
            .flat_map(|(method, paths)| paths.keys().map(move |path| format!("{} {}", method, path)))
            .collect();
        routes.sort();

        f.debug_struct("HttpServer").field("routes", &routes).finish()
    }
}

/// Handle to a running server.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    cancel_token: CancellationToken,
    connections: TaskTracker,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `http://` URL for the bound address.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Token that stops the server when cancelled.
    ///
    /// Useful when the code that decides to stop is not the code holding
    /// the handle; pair it with [`wait`](Self::wait).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Stops the server and waits until every connection is closed.
    ///
    /// In-flight requests are answered first; no new request is served
    /// once this returns.
    pub async fn shutdown(self) -> Result<()> {
        info!("Stopping HTTP server on {}", self.local_addr);
        self.cancel_token.cancel();
        self.wait().await
    }

    /// Waits for the server to stop, which happens once the cancellation
    /// token is cancelled.
    pub async fn wait(self) -> Result<()> {
        let accept_result = self
            .task
            .await
            .map_err(|e| Error::Internal(format!("HTTP server task failed: {}", e)));

        self.connections.close();
        self.connections.wait().await;
        debug!("All connections on {} closed", self.local_addr);

        accept_result
    }
}

async fn accept_loop(
    listener: TcpListener,
    router: Arc<HttpServer>,
    cancel_token: CancellationToken,
    connections: TaskTracker,
) {
    loop {
        let (stream, peer) = tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!("Accept loop cancelled");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            },
        };

        connections.spawn(serve_connection(
            stream,
            peer,
            Arc::clone(&router),
            cancel_token.clone(),
        ));
    }
}

/// Serves one client until it disconnects or the server is cancelled.
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Arc<HttpServer>,
    cancel_token: CancellationToken,
) {
    let service = service_fn(move |request: Request<Incoming>| {
        let router = Arc::clone(&router);
        async move { Ok::<_, Infallible>(router.dispatch(request).await) }
    });

    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        _ = cancel_token.cancelled() => {
            debug!("Closing connection from {}", peer);
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };

    if let Err(e) = result {
        debug!("Error serving connection from {}: {}", peer, e);
    }
}

/// Buffers the body and parses it as JSON, falling back to `{}`.
async fn read_json_body<B>(body: B) -> Value
where
    B: Body,
    B::Error: fmt::Display,
{
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return empty_object();
        }
    };

    if bytes.is_empty() {
        return empty_object();
    }

    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        debug!("Ignoring malformed JSON body: {}", e);
        empty_object()
    })
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
