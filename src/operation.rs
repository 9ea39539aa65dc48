//! Operations: one HTTP method bound to one resource.
//!
//! An [`Operation`] is what the document compiler places under
//! `paths[<resource path>][<method>]`. Everything on it besides the method is
//! description: the compiler takes the fragment from [`Operation::to_fragment`]
//! and never looks inside.

use std::fmt;
use std::ops::Not;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

// ── Param ─────────────────────────────────────────────────────────────────────

/// Where a parameter is read from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParamLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path   => "path",
            Self::Query  => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

/// A documented operation parameter.
///
/// ```rust
/// use arbor::Param;
/// use serde_json::json;
///
/// Param::path("id", "User identifier");
/// Param::query("limit", "Page size")
///     .schema(json!({ "type": "integer", "default": 20 }));
/// Param::header("x-request-id", "Correlation id").required(true);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Param {
    name: String,
    #[serde(rename = "in")]
    location: ParamLocation,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    required: bool,
    schema: Value,
}

impl Param {
    fn new(name: &str, location: ParamLocation, description: &str, required: bool) -> Self {
        Self {
            name: name.to_owned(),
            location,
            description: description.to_owned(),
            required,
            schema: json!({ "type": "string" }),
        }
    }

    /// A path parameter. Always required.
    pub fn path(name: &str, description: &str) -> Self {
        Self::new(name, ParamLocation::Path, description, true)
    }

    pub fn query(name: &str, description: &str) -> Self {
        Self::new(name, ParamLocation::Query, description, false)
    }

    pub fn header(name: &str, description: &str) -> Self {
        Self::new(name, ParamLocation::Header, description, false)
    }

    pub fn cookie(name: &str, description: &str) -> Self {
        Self::new(name, ParamLocation::Cookie, description, false)
    }

    /// Ignored for path parameters, which stay required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required || self.location == ParamLocation::Path;
        self
    }

    /// Replaces the default `{"type": "string"}` schema.
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn location(&self) -> ParamLocation { self.location }
}

// ── ResponseDef ───────────────────────────────────────────────────────────────

/// A schema wrapper, used both for a body media type and for a header.
#[derive(Clone, Debug, PartialEq, Serialize)]
struct SchemaRef {
    schema: Value,
}

/// A documented response of an operation.
///
/// ```rust
/// use arbor::ResponseDef;
/// use serde_json::json;
///
/// ResponseDef::json(200, "The user", json!({ "$ref": "#/components/schemas/User" }));
/// ResponseDef::new(204, "Deleted");
/// ResponseDef::new(201, "Created").header("location");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResponseDef {
    #[serde(skip)]
    status: u16,
    description: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    content: IndexMap<String, SchemaRef>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    headers: IndexMap<String, SchemaRef>,
}

impl ResponseDef {
    /// A response without a body.
    pub fn new(status: u16, description: &str) -> Self {
        Self {
            status,
            description: description.to_owned(),
            content: IndexMap::new(),
            headers: IndexMap::new(),
        }
    }

    /// A response with an `application/json` body described by `schema`.
    pub fn json(status: u16, description: &str, schema: Value) -> Self {
        Self::new(status, description).content("application/json", schema)
    }

    /// Adds a body media type. A repeated content type replaces the schema.
    pub fn content(mut self, content_type: &str, schema: Value) -> Self {
        self.content.insert(content_type.to_owned(), SchemaRef { schema });
        self
    }

    /// Documents a string-typed response header by name.
    pub fn header(mut self, name: &str) -> Self {
        let schema = json!({ "type": "string" });
        self.headers.insert(name.to_owned(), SchemaRef { schema });
        self
    }

    pub fn status(&self) -> u16 { self.status }
}

/// The serialised shape of an [`Operation`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationObject<'a> {
    operation_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Not::not")]
    deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<&'a [Param]>,
    responses: IndexMap<String, &'a ResponseDef>,
}

// ── Operation ─────────────────────────────────────────────────────────────────

/// One HTTP operation attached to a [`Resource`](crate::Resource).
///
/// Returned by `Resource::operation` (and the `get`/`post`/… shorthands) as a
/// handle for further decoration. Each setter returns the handle again.
pub struct Operation {
    method: Method,
    id: String,
    summary: Option<String>,
    description: String,
    tags: Vec<String>,
    params: Vec<Param>,
    responses: Vec<ResponseDef>,
    deprecated: bool,
    handler: Option<BoxedHandler>,
}

impl Operation {
    /// `tags` is the owning resource's tag set at the moment of creation.
    pub(crate) fn new(
        method: Method,
        id: &str,
        description: &str,
        tags: Vec<String>,
        responses: Vec<ResponseDef>,
    ) -> Self {
        Self {
            method,
            id: id.to_owned(),
            summary: None,
            description: description.to_owned(),
            tags,
            params: Vec::new(),
            responses,
            deprecated: false,
            handler: None,
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn id(&self) -> &str { &self.id }
    pub fn tags(&self) -> &[String] { &self.tags }
    pub fn params(&self) -> &[Param] { &self.params }
    pub fn responses(&self) -> &[ResponseDef] { &self.responses }

    pub fn summary(&mut self, summary: &str) -> &mut Self {
        self.summary = Some(summary.to_owned());
        self
    }

    pub fn description(&mut self, description: &str) -> &mut Self {
        self.description = description.to_owned();
        self
    }

    pub fn param(&mut self, param: Param) -> &mut Self {
        self.params.push(param);
        self
    }

    pub fn response(&mut self, response: ResponseDef) -> &mut Self {
        self.responses.push(response);
        self
    }

    /// Appends tags to this operation only.
    pub fn add_tags(&mut self, names: &[&str]) -> &mut Self {
        self.tags.extend(names.iter().map(|n| (*n).to_owned()));
        self
    }

    pub fn deprecated(&mut self) -> &mut Self {
        self.deprecated = true;
        self
    }

    /// Sets the function that serves this operation once the tree is mounted.
    /// Operations without one are documented but not routed.
    pub fn handler(&mut self, handler: impl Handler) -> &mut Self {
        self.handler = Some(handler.into_boxed_handler());
        self
    }

    pub(crate) fn boxed_handler(&self) -> Option<&BoxedHandler> {
        self.handler.as_ref()
    }

    /// The OpenAPI operation object for this operation.
    ///
    /// Responses are keyed by status code in declaration order; a repeated
    /// status keeps the last definition.
    pub fn to_fragment(&self) -> Value {
        let object = OperationObject {
            operation_id: &self.id,
            summary: self.summary.as_deref(),
            description: &self.description,
            tags: (!self.tags.is_empty()).then_some(self.tags.as_slice()),
            deprecated: self.deprecated,
            parameters: (!self.params.is_empty()).then_some(self.params.as_slice()),
            responses: self.responses.iter().map(|r| (r.status.to_string(), r)).collect(),
        };
        serde_json::to_value(object).unwrap_or_else(|e| {
            warn!(id = %self.id, "operation fragment not serialisable: {e}");
            Value::Null
        })
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("method", &self.method)
            .field("id", &self.id)
            .field("tags", &self.tags)
            .field("handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fragment_has_openapi_shape() {
        let mut op = Operation::new(
            Method::Get,
            "get-user",
            "Fetch one user",
            vec!["users".to_owned()],
            vec![ResponseDef::json(200, "The user", json!({ "type": "object" }))],
        );
        op.summary("Get user")
            .param(Param::path("id", "User id"))
            .response(ResponseDef::new(404, "Not found"));

        assert_eq!(
            op.to_fragment(),
            json!({
                "operationId": "get-user",
                "summary": "Get user",
                "description": "Fetch one user",
                "tags": ["users"],
                "parameters": [
                    { "name": "id", "in": "path", "description": "User id",
                      "required": true, "schema": { "type": "string" } }
                ],
                "responses": {
                    "200": {
                        "description": "The user",
                        "content": { "application/json": { "schema": { "type": "object" } } }
                    },
                    "404": { "description": "Not found" }
                }
            })
        );
    }

    #[test]
    fn empty_lists_are_omitted_but_responses_kept() {
        let op = Operation::new(Method::Delete, "drop", "", Vec::new(), Vec::new());
        assert_eq!(
            op.to_fragment(),
            json!({ "operationId": "drop", "description": "", "responses": {} })
        );
    }

    #[test]
    fn deprecated_and_response_headers() {
        let mut op = Operation::new(Method::Post, "create", "Create", Vec::new(), Vec::new());
        op.deprecated().response(ResponseDef::new(201, "Created").header("location"));

        let frag = op.to_fragment();
        assert_eq!(frag["deprecated"], json!(true));
        assert_eq!(
            frag["responses"]["201"]["headers"],
            json!({ "location": { "schema": { "type": "string" } } })
        );
    }

    #[test]
    fn path_params_stay_required() {
        let p = serde_json::to_value(Param::path("id", "").required(false)).ok();
        assert_eq!(p, Some(json!({
            "name": "id", "in": "path", "required": true, "schema": { "type": "string" }
        })));

        let q = Param::query("q", "Search").required(true);
        assert_eq!(serde_json::to_value(&q).ok().map(|v| v["required"].clone()), Some(json!(true)));
        assert_eq!(q.location(), ParamLocation::Query);
    }

    #[test]
    fn cookie_params_serialise_their_location() {
        let p = Param::cookie("session", "Session id");
        assert_eq!(serde_json::to_value(&p).ok().map(|v| v["in"].clone()), Some(json!("cookie")));
        assert_eq!(p.location().as_str(), "cookie");
    }

    #[test]
    fn response_content_types_accumulate_and_repeated_status_keeps_last() {
        let mut op = Operation::new(Method::Get, "feed", "", Vec::new(), Vec::new());
        op.response(ResponseDef::new(200, "stale"))
            .response(ResponseDef::new(304, "Not modified"))
            .response(
                ResponseDef::json(200, "Feed", json!({ "type": "array" }))
                    .content("application/xml", json!({ "type": "string" })),
            );

        assert_eq!(
            op.to_fragment()["responses"],
            json!({
                "200": {
                    "description": "Feed",
                    "content": {
                        "application/json": { "schema": { "type": "array" } },
                        "application/xml": { "schema": { "type": "string" } }
                    }
                },
                "304": { "description": "Not modified" }
            })
        );
    }

    #[test]
    fn operation_tags_extend_snapshot() {
        let mut op = Operation::new(Method::Get, "x", "", vec!["a".to_owned()], Vec::new());
        op.add_tags(&["b"]);
        assert_eq!(op.tags(), ["a", "b"]);
    }
}
