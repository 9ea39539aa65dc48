//! The top-level API: document metadata plus the base of the resource tree.
//!
//! ```rust
//! use arbor::{Api, Param, Request, Response, ResponseDef};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), arbor::Error> {
//! let mut api = Api::new("Notes", "1.0.0").description("A tiny notes service");
//!
//! let notes = api.resource(&["/notes"]);
//! notes.add_tags(&["notes"]);
//! let listing = ResponseDef::json(200, "Notes", json!({ "type": "array" }));
//! notes.get("list-notes", "List notes", vec![listing]).handler(list_notes);
//!
//! notes.sub_resource(&["id"])
//!     .get("get-note", "Fetch a note", vec![ResponseDef::new(404, "No such note")])
//!     .param(Param::path("id", "Note id"));
//!
//! assert_eq!(api.openapi()["paths"]["/notes"]["get"]["tags"], json!(["notes"]));
//!
//! let router = api.into_router()?;
//! # drop(router);
//! # Ok(())
//! # }
//!
//! async fn list_notes(_req: Request) -> Response {
//!     Response::json(b"[]".to_vec())
//! }
//! ```

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::document::Document;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{self, BoxedMiddleware, Middleware};
use crate::request::Request;
use crate::resource::Resource;
use crate::response::Response;
use crate::router::Router;

const OPENAPI_VERSION: &str = "3.0.3";

/// A server entry in the document's `servers` list.
#[derive(Clone, Debug, PartialEq, Serialize)]
struct ServerEntry {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Serialize)]
struct Info<'a> {
    title: &'a str,
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// The top-level OpenAPI object.
#[derive(Serialize)]
struct OpenApiObject<'a> {
    openapi: &'static str,
    info: Info<'a>,
    #[serde(skip_serializing_if = "<[ServerEntry]>::is_empty")]
    servers: &'a [ServerEntry],
    paths: Document,
}

/// An API description rooted at an empty base path.
#[derive(Debug)]
pub struct Api {
    title: String,
    version: String,
    description: Option<String>,
    servers: Vec<ServerEntry>,
    docs_path: String,
    root: Resource,
}

impl Api {
    /// A new API served with its document at `/openapi.json`.
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            title: title.to_owned(),
            version: version.to_owned(),
            description: None,
            servers: Vec::new(),
            docs_path: "/openapi.json".to_owned(),
            root: Resource::new(""),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Adds a `servers` entry. An empty description is left out.
    pub fn server(mut self, url: &str, description: &str) -> Self {
        let description = (!description.is_empty()).then(|| description.to_owned());
        self.servers.push(ServerEntry { url: url.to_owned(), description });
        self
    }

    /// Where the compiled document is served once mounted.
    pub fn docs_path(mut self, path: &str) -> Self {
        self.docs_path = path.to_owned();
        self
    }

    /// Creates a top-level resource. Same rules as [`Resource::sub_resource`]
    /// applied to the empty base path.
    pub fn resource(&mut self, parts: &[&str]) -> &mut Resource {
        self.root.sub_resource(parts)
    }

    /// The base resource. Tags added here reach resources created afterwards;
    /// middleware added here wraps every route, the document route included.
    pub fn root(&self) -> &Resource { &self.root }
    pub fn root_mut(&mut self) -> &mut Resource { &mut self.root }

    /// Shorthand for `root_mut().add_middleware(mw)`.
    pub fn add_middleware(&mut self, mw: impl Middleware) -> &mut Self {
        self.root.add_middleware(mw);
        self
    }

    /// The complete OpenAPI document.
    ///
    /// Operations on the base resource itself are listed under `/`, the path
    /// they are routed at.
    pub fn openapi(&self) -> Value {
        let mut paths = self.root.to_openapi();
        paths.rename_path("", "/");
        debug!(paths = paths.len(), "compiled resource tree");

        let object = OpenApiObject {
            openapi: OPENAPI_VERSION,
            info: Info {
                title: &self.title,
                version: &self.version,
                description: self.description.as_deref(),
            },
            servers: &self.servers,
            paths,
        };
        serde_json::to_value(object).unwrap_or_else(|e| {
            error!("document serialisation failed: {e}");
            Value::Null
        })
    }

    /// Freezes the tree and turns it into a [`Router`].
    ///
    /// The document is compiled once, here, and served at the docs path.
    /// Every operation with a handler is registered at its resource's path,
    /// wrapped in the middleware of its own scope and every ancestor scope,
    /// outermost first. Operations without a handler stay in the document only.
    pub fn into_router(self) -> Result<Router, Error> {
        let mut router = Router::new();

        let docs = docs_handler(&self.openapi());
        let root_stack = self.root.scope().middleware().to_vec();
        router.insert(Method::Get, &self.docs_path, middleware::wrap(docs, &root_stack))?;
        debug!(path = %self.docs_path, "document route mounted");

        let mut routes = 0;
        mount(&mut router, &self.root, &[], &mut routes)?;

        info!(title = %self.title, routes, "api mounted");
        Ok(router)
    }
}

fn mount(
    router: &mut Router,
    node: &Resource,
    inherited: &[BoxedMiddleware],
    routes: &mut usize,
) -> Result<(), Error> {
    let mut stack = inherited.to_vec();
    stack.extend(node.scope().middleware().iter().map(Arc::clone));

    let path = node.scope().route_path();
    for op in node.operations() {
        match op.boxed_handler() {
            Some(handler) => {
                let handler = middleware::wrap(Arc::clone(handler), &stack);
                router.insert(op.method(), path, handler)?;
                *routes += 1;
                debug!(method = %op.method(), path, id = op.id(), "route mounted");
            }
            None => warn!(
                method = %op.method(),
                path,
                id = op.id(),
                "operation has no handler, documented only"
            ),
        }
    }

    for sub in node.children() {
        mount(router, sub, &stack, routes)?;
    }
    Ok(())
}

/// Serves `doc` pre-serialised. If serialisation fails, every request gets `500`.
fn docs_handler(doc: &Value) -> BoxedHandler {
    let body = match serde_json::to_vec(doc) {
        Ok(bytes) => Some(Bytes::from(bytes)),
        Err(e) => {
            warn!("document serialisation failed: {e}");
            None
        }
    };

    (move |_req: Request| {
        let body = body.clone();
        async move {
            match body {
                Some(bytes) => Response::json(bytes),
                None => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
            }
        }
    })
    .into_boxed_handler()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::operation::ResponseDef;

    #[test]
    fn document_wraps_paths_with_info_and_servers() {
        let mut api = Api::new("Pets", "2.1.0")
            .description("Pet store")
            .server("https://api.example.com", "production")
            .server("http://localhost:3000", "");
        api.resource(&["/pets"])
            .get("list-pets", "List pets", vec![ResponseDef::new(200, "OK")]);

        assert_eq!(
            api.openapi(),
            json!({
                "openapi": "3.0.3",
                "info": { "title": "Pets", "version": "2.1.0", "description": "Pet store" },
                "servers": [
                    { "url": "https://api.example.com", "description": "production" },
                    { "url": "http://localhost:3000" }
                ],
                "paths": {
                    "/pets": {
                        "get": {
                            "operationId": "list-pets",
                            "description": "List pets",
                            "responses": { "200": { "description": "OK" } }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn empty_api_has_empty_paths_and_no_servers() {
        let doc = Api::new("Empty", "0.0.1").openapi();
        assert_eq!(doc["paths"], json!({}));
        assert!(doc.get("servers").is_none());
        assert!(doc["info"].get("description").is_none());
    }

    #[test]
    fn root_tags_reach_later_resources_only() {
        let mut api = Api::new("T", "1");
        api.resource(&["/before"]).get("b", "", Vec::new());
        api.root_mut().add_tags(&["all"]);
        api.resource(&["/after"]).get("a", "", Vec::new());

        let doc = api.openapi();
        assert!(doc["paths"]["/before"]["get"].get("tags").is_none());
        assert_eq!(doc["paths"]["/after"]["get"]["tags"], json!(["all"]));
    }

    async fn call(router: &Router, method: http::Method, path: &str) -> Response {
        let req = http::Request::builder().method(method).uri(path).body(Bytes::new()).unwrap();
        router.handle(req).await
    }

    #[tokio::test]
    async fn mounted_router_serves_document_and_handlers() {
        let mut api = Api::new("T", "1").docs_path("/spec.json");
        let item = api.resource(&["/items", "id"]);
        item.get("get-item", "", Vec::new())
            .handler(|req: Request| async move { req.param("id").unwrap_or("").to_owned() });
        item.delete("delete-item", "", Vec::new());
        let expected = api.openapi();

        let router = api.into_router().unwrap();
        let spec = call(&router, http::Method::GET, "/spec.json").await;
        assert_eq!(spec.status_code(), StatusCode::OK);
        assert_eq!(spec.header("content-type"), Some("application/json"));
        assert_eq!(serde_json::from_slice::<Value>(spec.body()).ok(), Some(expected));

        assert_eq!(call(&router, http::Method::GET, "/items/7").await.body(), b"7");
        // documented only, so not routed
        let res = call(&router, http::Method::DELETE, "/items/7").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        let res = call(&router, http::Method::GET, "/openapi.json").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn base_operations_are_documented_where_they_are_routed() {
        let mut api = Api::new("T", "1");
        api.root_mut()
            .get("index", "Landing page", vec![ResponseDef::new(200, "OK")])
            .handler(|_req: Request| async { "hi" });
        api.resource(&["/about"]).get("about", "", Vec::new());

        let doc = api.openapi();
        let keys: Vec<&str> = doc["paths"].as_object()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys, ["/about", "/"]);
        assert_eq!(doc["paths"]["/"]["get"]["operationId"], json!("index"));

        let router = api.into_router().unwrap();
        let res = call(&router, http::Method::GET, "/").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"hi");
    }

    #[test]
    fn base_operation_overrides_slash_resource_in_document() {
        let mut api = Api::new("T", "1");
        api.resource(&["/"]).get("slash", "", Vec::new());
        api.resource(&["/"]).post("create", "", Vec::new());
        api.root_mut().get("base", "", Vec::new());

        let doc = api.openapi();
        assert_eq!(doc["paths"].as_object().map(|m| m.len()), Some(1));
        assert_eq!(doc["paths"]["/"]["get"]["operationId"], json!("base"));
        assert_eq!(doc["paths"]["/"]["post"]["operationId"], json!("create"));
    }

    #[test]
    fn conflicting_docs_path_is_reported() {
        let mut api = Api::new("T", "1");
        api.resource(&["/openapi.json"])
            .get("shadow", "", Vec::new())
            .handler(|_req: Request| async { "x" });

        assert!(matches!(api.into_router(), Err(Error::Route { .. })));
    }
}
