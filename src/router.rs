//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. The router knows nothing
//! about resources: [`Api::into_router`](crate::Api::into_router) flattens the
//! resource tree into plain `method + path → handler` registrations.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Usually produced by [`Api::into_router`](crate::Api::into_router); it can
/// also be assembled by hand with [`Router::on`].
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Registers a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax, the same syntax resource templates
    /// compose to.
    ///
    /// ```rust
    /// # use arbor::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// # fn main() -> Result<(), arbor::Error> {
    /// Router::new()
    ///     .on(Method::Get,  "/users/{id}", get_user)?
    ///     .on(Method::Post, "/users",      create_user)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Result<Self, Error> {
        self.insert(method, path, handler.into_boxed_handler())?;
        Ok(self)
    }

    pub(crate) fn insert(
        &mut self,
        method: Method,
        path: &str,
        handler: BoxedHandler,
    ) -> Result<(), Error> {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .map_err(|source| Error::Route { path: path.to_owned(), source })
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Routes one request and produces one response.
    ///
    /// Methods with no place in the document get `405`; known methods on an
    /// unregistered path get `404`. The server calls this once the body is
    /// collected; it can be called directly to exercise a router in-process.
    ///
    /// ```rust
    /// # use arbor::{Method, Request, Router};
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), arbor::Error> {
    /// let router = Router::new().on(Method::Get, "/ping", |_req: Request| async { "pong" })?;
    /// let req = http::Request::get("/ping").body(bytes::Bytes::new()).unwrap();
    /// assert_eq!(router.handle(req).await.body(), b"pong");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn handle(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();
        let Ok(method) = Method::try_from(&parts.method) else {
            return Response::status(StatusCode::METHOD_NOT_ALLOWED);
        };

        let path = parts.uri.path();
        match self.lookup(method, path) {
            Some((handler, params)) => {
                let req = Request::new(method, path.to_owned(), parts.headers, body, params);
                handler.call(req).await
            }
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
