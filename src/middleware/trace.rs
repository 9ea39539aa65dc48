use std::time::Instant;

use tracing::{info, info_span, Instrument};

use super::Next;
use crate::request::Request;
use crate::response::Response;

/// Opens an `info` span per request and logs status and latency when the
/// response is ready.
///
/// ```rust,no_run
/// use arbor::{Api, middleware};
///
/// let mut api = Api::new("Users", "1.0.0");
/// api.resource(&["/users"]).add_middleware(middleware::trace);
/// ```
pub async fn trace(req: Request, next: Next) -> Response {
    let span = info_span!("request", method = %req.method(), path = %req.path());
    let start = Instant::now();

    let res = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| {
        info!(
            status = res.status_code().as_u16(),
            latency_us = start.elapsed().as_micros() as u64,
            "request completed"
        );
    });
    res
}
