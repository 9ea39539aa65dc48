//! # arbor
//!
//! Declare an HTTP API as a tree of resources, attach operations to any node,
//! and get the OpenAPI description of the whole tree for free.
//!
//! ## The model
//!
//! - A [`Resource`] is a path template. `sub_resource(&["/users", "id"])`
//!   nests `/users/{id}` under it: parts starting with `/` are literal, any
//!   other part is a parameter.
//! - An [`Operation`] is one method on one resource, with an id, a
//!   description, parameters, responses and optionally a handler.
//! - Tags are copied into a sub-resource (and into an operation) when it is
//!   created.
//! - [`Resource::to_openapi`] folds the tree into a [`Document`] keyed by path
//!   and lowercase method. It never fails.
//!
//! Routing, middleware and serving sit on top: [`Api::into_router`] mounts
//! every operation that has a handler on a `matchit` radix tree, and
//! [`Server`] runs it on tokio + hyper with graceful shutdown.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use arbor::{middleware, Api, Param, Request, Response, ResponseDef, Server, StatusCode};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), arbor::Error> {
//!     let mut api = Api::new("Users", "1.0.0");
//!     api.add_middleware(middleware::trace);
//!
//!     let users = api.resource(&["/users"]);
//!     users.add_tags(&["users"]);
//!     users.post("create-user", "Create a user", vec![ResponseDef::new(201, "Created")])
//!         .handler(create_user);
//!
//!     users.sub_resource(&["id"])
//!         .get("get-user", "Fetch a user", vec![
//!             ResponseDef::json(200, "The user", json!({ "type": "object" })),
//!         ])
//!         .param(Param::path("id", "User id"))
//!         .handler(get_user);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(api.into_router()?).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .no_body()
//! }
//! ```

mod api;
mod document;
mod error;
mod handler;
mod method;
mod operation;
mod request;
mod resource;
mod response;
mod router;
mod scope;
mod server;

pub mod middleware;

pub use api::Api;
pub use document::Document;
pub use error::Error;
pub use handler::Handler;
pub use http::StatusCode;
pub use method::Method;
pub use middleware::{Middleware, Next};
pub use operation::{Operation, Param, ParamLocation, ResponseDef};
pub use request::Request;
pub use resource::{compose_template, Resource};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use scope::Scope;
pub use server::Server;
