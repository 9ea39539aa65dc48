//! Middleware layer.
//!
//! Middleware is attached to a resource's routing [`Scope`](crate::Scope) and
//! wraps every operation served at that resource *and below it*. It is the
//! place for cross-cutting concerns: tracing, request ids, auth-header checks.
//!
//! A middleware is any function of the shape
//!
//! ```text
//! async fn name(req: Request, next: Next) -> impl IntoResponse
//! ```
//!
//! Call `next.run(req).await` to continue down the chain, or return early
//! without calling it.
//!
//! Built-in:
//! - [`trace`]: per-request span with method, path, status, latency

mod trace;

pub use self::trace::trace;

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The rest of the chain: inner middleware followed by the operation handler.
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    /// Runs the remaining chain for `req`.
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}

#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

/// Implemented for every valid middleware function. Sealed.
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

struct FnMiddleware<F>(F);

impl<F, Fut, R> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// One middleware in front of the next handler in the chain.
struct Layered {
    middleware: BoxedMiddleware,
    next: BoxedHandler,
}

impl ErasedHandler for Layered {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Next { inner: Arc::clone(&self.next) };
        self.middleware.call(req, next)
    }
}

/// Wraps `handler` so that `stack[0]` runs first and `stack[len - 1]` runs
/// directly before the handler.
pub(crate) fn wrap(handler: BoxedHandler, stack: &[BoxedMiddleware]) -> BoxedHandler {
    stack.iter().rev().fold(handler, |next, mw| {
        Arc::new(Layered { middleware: Arc::clone(mw), next })
    })
}
