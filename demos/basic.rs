//! Minimal arbor example: a users resource with a nested item resource,
//! request tracing, and the generated document.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/openapi.json
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/users/42

use arbor::{middleware, Api, Param, Request, Response, ResponseDef, Server, StatusCode};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), arbor::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let user_schema = json!({
        "type": "object",
        "properties": { "id": { "type": "string" }, "name": { "type": "string" } }
    });

    let mut api = Api::new("Users", "1.0.0")
        .description("CRUD-style demo")
        .server("http://localhost:3000", "local");
    api.add_middleware(middleware::trace);

    let users = api.resource(&["/users"]);
    users.add_tags(&["users"]);

    let created = ResponseDef::new(201, "Created").header("location");
    users
        .post("create-user", "Create a user", vec![created])
        .response(ResponseDef::new(400, "Empty body"))
        .handler(create_user);

    let user = users.sub_resource(&["id"]);
    user.get("get-user", "Fetch a user", vec![ResponseDef::json(200, "The user", user_schema)])
        .param(Param::path("id", "User id"))
        .handler(get_user);
    user.delete("delete-user", "Delete a user", vec![ResponseDef::new(204, "Deleted")])
        .param(Param::path("id", "User id"))
        .handler(delete_user);

    Server::bind("0.0.0.0:3000")?.serve(api.into_router()?).await
}

async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#)
}

async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}
