//! HTTP request handlers and routing.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use log::{error, info};

use crate::parser::{HttpRequest, Method};
use crate::server::{HttpResponse, Error, StatusCode};

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// Type alias for a handler function that takes an HttpRequest and returns a HandlerFuture.
pub type HandlerFn = Arc<dyn Fn(HttpRequest) -> HandlerFuture + Send + Sync>;

/// An exact-match route table from `(method, path)` to handler.
///
/// Built once before the server starts and shared read-only by every
/// connection afterwards.
#[derive(Clone, Default)]
pub struct Router {
    routes: HashMap<Method, HashMap<String, HandlerFn>>,
}

impl Router {
    /// Create an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` and `path`.
    ///
    /// Fails with [`Error::DuplicateRoute`] if the pair is already taken.
    pub fn add_route<F, Fut>(&mut self, method: Method, path: impl Into<String>, handler: F) -> Result<(), Error>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        let path = path.into();
        let paths = self.routes.entry(method.clone()).or_default();
        if paths.contains_key(&path) {
            return Err(Error::DuplicateRoute(method, path));
        }

        let handler: HandlerFn = Arc::new(move |req: HttpRequest| -> HandlerFuture {
            Box::pin(handler(req))
        });
        paths.insert(path, handler);
        Ok(())
    }

    /// Builder form of [`Router::add_route`].
    pub fn route<F, Fut>(mut self, method: Method, path: impl Into<String>, handler: F) -> Result<Self, Error>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(method, path, handler)?;
        Ok(self)
    }

    /// Find the handler registered for exactly this method and path.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&HandlerFn> {
        self.routes.get(method)?.get(path)
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered `(method, path)` pairs, sorted for stable output.
    pub fn endpoints(&self) -> Vec<(Method, String)> {
        let mut endpoints: Vec<(Method, String)> = self
            .routes
            .iter()
            .flat_map(|(method, paths)| paths.keys().map(move |path| (method.clone(), path.clone())))
            .collect();
        endpoints.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.to_string().cmp(&b.0.to_string())));
        endpoints
    }

    /// Log every registered endpoint.
    pub fn log_endpoints(&self) {
        info!("Registered endpoints:");
        for (method, path) in self.endpoints() {
            info!("  {method} {path}");
        }
    }

    /// Run the matching handler, or answer 404 with an empty body.
    ///
    /// A handler error becomes a 500 response; it does not end the connection.
    pub async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        let Some(handler) = self.lookup(&request.method, request.route_path()) else {
            return HttpResponse::new(StatusCode::NotFound);
        };

        let method = request.method.clone();
        let path = request.path.clone();
        match handler(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Handler for {method} {path} failed: {e}");
                HttpResponse::new(StatusCode::InternalServerError)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Internal server error: {e}"))
            }
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("endpoints", &self.endpoints())
            .finish()
    }
}
