//! Resource trees.
//!
//! A [`Resource`] is a node in the path hierarchy of an API. It owns the
//! operations declared directly on it and the sub-resources created from it.
//! Compiling the root with [`Resource::to_openapi`] folds the whole tree into
//! one [`Document`].
//!
//! ```rust
//! use arbor::{Resource, ResponseDef};
//!
//! let mut api = Resource::new("");
//! let users = api.sub_resource(&["/users"]);
//! users.add_tags(&["users"]);
//! users.get("list-users", "List users", vec![ResponseDef::new(200, "OK")]);
//!
//! let user = users.sub_resource(&["id"]);
//! user.delete("delete-user", "Delete a user", vec![ResponseDef::new(204, "Deleted")]);
//!
//! let doc = api.to_openapi();
//! assert!(doc.get("/users", "get").is_some());
//! assert!(doc.get("/users/{id}", "delete").is_some());
//! ```

use tracing::debug;

use crate::document::Document;
use crate::method::Method;
use crate::middleware::Middleware;
use crate::operation::{Operation, ResponseDef};
use crate::scope::Scope;

/// Builds the path template suffix for a sub-resource.
///
/// Parts starting with `/` are literal segments and are appended verbatim.
/// Any other non-empty part is a parameter name and becomes `/{name}`. Empty
/// parts contribute nothing.
///
/// ```rust
/// use arbor::compose_template;
///
/// assert_eq!(compose_template(&["/users", "id", "", "/posts"]), "/users/{id}/posts");
/// ```
pub fn compose_template(parts: &[&str]) -> String {
    let mut template = String::new();
    for part in parts {
        if part.is_empty() {
            continue;
        }
        if part.starts_with('/') {
            template.push_str(part);
        } else {
            template.push_str("/{");
            template.push_str(part);
            template.push('}');
        }
    }
    template
}

/// A node in the resource tree.
#[derive(Debug)]
pub struct Resource {
    path: String,
    scope: Scope,
    children: Vec<Resource>,
    operations: Vec<Operation>,
    tags: Vec<String>,
}

impl Resource {
    /// A root resource at `path`, typically `""` or a base such as `"/v1"`.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            scope: Scope::root(path.clone()),
            path,
            children: Vec::new(),
            operations: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// The full path template from the document root to this resource.
    pub fn path(&self) -> &str { &self.path }
    pub fn tags(&self) -> &[String] { &self.tags }
    pub fn children(&self) -> &[Resource] { &self.children }
    pub fn operations(&self) -> &[Operation] { &self.operations }
    pub fn scope(&self) -> &Scope { &self.scope }

    /// Creates a resource nested under this one and returns it.
    ///
    /// The child's path is this path followed by [`compose_template`] of
    /// `parts`. The child receives a copy of the tags this resource has *right
    /// now*; tags added here afterwards do not reach it.
    pub fn sub_resource(&mut self, parts: &[&str]) -> &mut Resource {
        let suffix = compose_template(parts);
        let sub = Resource {
            path: format!("{}{suffix}", self.path),
            scope: self.scope.sub_scope(&suffix),
            children: Vec::new(),
            operations: Vec::new(),
            tags: self.tags.clone(),
        };
        debug!(path = %sub.path, "resource created");

        let idx = self.children.len();
        self.children.push(sub);
        &mut self.children[idx]
    }

    /// Declares an operation on this resource and returns it for decoration.
    ///
    /// The operation starts with a copy of this resource's current tags.
    pub fn operation(
        &mut self,
        method: Method,
        id: &str,
        description: &str,
        responses: Vec<ResponseDef>,
    ) -> &mut Operation {
        debug!(%method, path = %self.path, id, "operation declared");
        let op = Operation::new(method, id, description, self.tags.clone(), responses);

        let idx = self.operations.len();
        self.operations.push(op);
        &mut self.operations[idx]
    }

    pub fn get(
        &mut self,
        id: &str,
        description: &str,
        responses: Vec<ResponseDef>,
    ) -> &mut Operation {
        self.operation(Method::Get, id, description, responses)
    }

    pub fn post(
        &mut self,
        id: &str,
        description: &str,
        responses: Vec<ResponseDef>,
    ) -> &mut Operation {
        self.operation(Method::Post, id, description, responses)
    }

    pub fn put(
        &mut self,
        id: &str,
        description: &str,
        responses: Vec<ResponseDef>,
    ) -> &mut Operation {
        self.operation(Method::Put, id, description, responses)
    }

    pub fn patch(
        &mut self,
        id: &str,
        description: &str,
        responses: Vec<ResponseDef>,
    ) -> &mut Operation {
        self.operation(Method::Patch, id, description, responses)
    }

    pub fn delete(
        &mut self,
        id: &str,
        description: &str,
        responses: Vec<ResponseDef>,
    ) -> &mut Operation {
        self.operation(Method::Delete, id, description, responses)
    }

    pub fn head(
        &mut self,
        id: &str,
        description: &str,
        responses: Vec<ResponseDef>,
    ) -> &mut Operation {
        self.operation(Method::Head, id, description, responses)
    }

    /// Appends tags used for documentation. Duplicates are kept.
    pub fn add_tags(&mut self, names: &[&str]) -> &mut Self {
        self.tags.extend(names.iter().map(|n| (*n).to_owned()));
        self
    }

    /// Adds middleware for requests at this resource's path, including every
    /// sub-resource.
    pub fn add_middleware(&mut self, mw: impl Middleware) -> &mut Self {
        self.scope.add_middleware(mw);
        self
    }

    /// Compiles this subtree into a path document.
    ///
    /// Children are compiled and merged first, in creation order, so on a
    /// collision between children the later one wins. This resource's own
    /// operations are set last and win over anything a descendant produced
    /// at the same path and method.
    pub fn to_openapi(&self) -> Document {
        let mut doc = Document::new();

        for sub in &self.children {
            doc.merge(sub.to_openapi());
        }

        for op in &self.operations {
            doc.set(&self.path, op.method().lowercase(), op.to_fragment());
        }

        doc
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn ok() -> Vec<ResponseDef> {
        vec![ResponseDef::new(200, "OK")]
    }

    #[test]
    fn parameter_part_becomes_braced_segment() {
        let mut root = Resource::new("/a");
        assert_eq!(root.sub_resource(&["id"]).path(), "/a/{id}");
    }

    #[test]
    fn literal_part_is_appended_verbatim() {
        let mut root = Resource::new("/a");
        assert_eq!(root.sub_resource(&["/b"]).path(), "/a/b");
    }

    #[test]
    fn mixed_parts_keep_their_order() {
        let mut root = Resource::new("/a");
        assert_eq!(root.sub_resource(&["/b", "id"]).path(), "/a/b/{id}");
        assert_eq!(root.sub_resource(&["id", "/b"]).path(), "/a/{id}/b");
    }

    #[test]
    fn empty_parts_are_ignored() {
        let mut root = Resource::new("/a");
        let with_empties = root.sub_resource(&["", "id", ""]).path().to_owned();
        let plain = root.sub_resource(&["id"]).path().to_owned();
        assert_eq!(with_empties, plain);

        assert_eq!(root.sub_resource(&[]).path(), "/a");
        assert_eq!(compose_template(&["", ""]), "");
    }

    #[test]
    fn child_path_does_not_depend_on_siblings() {
        let mut root = Resource::new("/r");
        root.sub_resource(&["/x", "id"]);
        root.sub_resource(&["/y"]);
        let third = root.sub_resource(&["/x", "id"]);
        assert_eq!(third.path(), format!("/r{}", compose_template(&["/x", "id"])));
    }

    #[test]
    fn nested_children_extend_parent_path() {
        let mut root = Resource::new("");
        let users = root.sub_resource(&["/users"]);
        let user = users.sub_resource(&["user_id"]);
        let posts = user.sub_resource(&["/posts", "post_id"]);
        assert_eq!(posts.path(), "/users/{user_id}/posts/{post_id}");
        assert_eq!(posts.scope().template(), "/users/{user_id}/posts/{post_id}");
    }

    #[test]
    fn tags_are_snapshotted_at_child_creation() {
        let mut root = Resource::new("");
        root.add_tags(&["x"]);
        root.sub_resource(&["/c1"]);
        root.add_tags(&["y"]);
        root.sub_resource(&["/c2"]);

        assert_eq!(root.children()[0].tags(), ["x"]);
        assert_eq!(root.children()[1].tags(), ["x", "y"]);
        assert_eq!(root.tags(), ["x", "y"]);
    }

    #[test]
    fn child_tags_do_not_leak_to_parent() {
        let mut root = Resource::new("");
        root.add_tags(&["x"]);
        root.sub_resource(&["/c"]).add_tags(&["z"]);
        assert_eq!(root.tags(), ["x"]);
        assert_eq!(root.children()[0].tags(), ["x", "z"]);
    }

    #[test]
    fn duplicate_tags_are_kept() {
        let mut root = Resource::new("");
        root.add_tags(&["x", "x"]).add_tags(&["x"]);
        assert_eq!(root.tags(), ["x", "x", "x"]);
    }

    #[test]
    fn operations_snapshot_resource_tags() {
        let mut root = Resource::new("");
        root.add_tags(&["a"]);
        root.get("early", "", ok());
        root.add_tags(&["b"]);
        root.post("late", "", ok());

        assert_eq!(root.operations()[0].tags(), ["a"]);
        assert_eq!(root.operations()[1].tags(), ["a", "b"]);
    }

    #[test]
    fn operations_keep_call_order() {
        let mut root = Resource::new("/r");
        root.put("p", "", ok());
        root.get("g", "", ok());
        root.head("h", "", ok());
        let ids: Vec<_> = root.operations().iter().map(Operation::id).collect();
        assert_eq!(ids, ["p", "g", "h"]);
    }

    #[test]
    fn empty_tree_compiles_to_empty_document() {
        let mut root = Resource::new("");
        root.sub_resource(&["/a"]).sub_resource(&["id"]);
        root.add_tags(&["unused"]);
        assert!(root.to_openapi().is_empty());
        assert!(Resource::new("").to_openapi().is_empty());
    }

    #[test]
    fn root_and_child_operations_land_on_their_paths() {
        let mut root = Resource::new("");
        root.sub_resource(&["/"]).get("index", "Index", ok());
        root.sub_resource(&["/items"]).post("create-item", "Create", ok());

        let doc = root.to_openapi();
        assert_eq!(doc.len(), 2);
        let methods = |path| {
            doc.methods(path).map(|m| m.keys().map(String::as_str).collect::<Vec<_>>())
        };
        assert_eq!(methods("/"), Some(vec!["get"]));
        assert_eq!(methods("/items"), Some(vec!["post"]));
    }

    #[test]
    fn later_sibling_wins_on_collision() {
        let mut root = Resource::new("");
        root.sub_resource(&["/dup"]).get("first", "", ok());
        root.sub_resource(&["/dup"]).get("second", "", ok());

        let doc = root.to_openapi();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("/dup", "get").map(|f| f["operationId"].clone()), Some(json!("second")));
    }

    #[test]
    fn own_operation_wins_over_descendant() {
        // child at /a declares GET, and so does a grandchild whose parts add
        // nothing, so both resolve to /a
        let mut root = Resource::new("");
        let child = root.sub_resource(&["/a"]);
        child.sub_resource(&[""]).get("grandchild", "", ok());
        child.get("child", "", ok());

        let doc = root.to_openapi();
        assert_eq!(doc.get("/a", "get").map(|f| f["operationId"].clone()), Some(json!("child")));
    }

    #[test]
    fn repeated_method_on_one_resource_keeps_last() {
        let mut root = Resource::new("/r");
        root.get("one", "", ok());
        root.get("two", "", ok());
        let doc = root.to_openapi();
        assert_eq!(doc.get("/r", "get").map(|f| f["operationId"].clone()), Some(json!("two")));
    }

    #[test]
    fn compile_is_repeatable() {
        let mut root = Resource::new("");
        root.sub_resource(&["/a"]).get("a", "", ok());
        root.sub_resource(&["/b", "id"]).delete("b", "", ok());
        assert_eq!(root.to_openapi(), root.to_openapi());
        assert_eq!(
            root.to_openapi().paths().collect::<Vec<_>>(),
            ["/a", "/b/{id}"]
        );
    }
}
