//! Routing scopes.
//!
//! A [`Scope`] is the router-side half of a resource: the template it is
//! mounted at and the middleware registered on it. Resources carry one each
//! and hand it back to the router when the tree is mounted. Nothing on the
//! resource side looks inside.

use std::fmt;

use crate::middleware::{BoxedMiddleware, Middleware};

/// A nested dispatch scope.
pub struct Scope {
    template: String,
    middleware: Vec<BoxedMiddleware>,
}

impl Scope {
    /// A top-level scope mounted at `template`.
    pub fn root(template: impl Into<String>) -> Self {
        Self { template: template.into(), middleware: Vec::new() }
    }

    /// A scope nested under this one at `suffix`.
    ///
    /// The child starts with no middleware of its own. The parent's
    /// middleware still wraps it: the chain is assembled from every ancestor
    /// scope when the tree is mounted, so middleware added to a parent later
    /// applies to existing children too.
    pub fn sub_scope(&self, suffix: &str) -> Self {
        Self::root(format!("{}{suffix}", self.template))
    }

    /// Registers middleware on this scope. Runs after middleware registered
    /// earlier on the same scope and after everything on ancestor scopes.
    pub fn add_middleware(&mut self, mw: impl Middleware) {
        self.middleware.push(mw.into_boxed_middleware());
    }

    /// The full template this scope is mounted at.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The path to register with the radix tree; the empty base template
    /// is served at `/`.
    pub(crate) fn route_path(&self) -> &str {
        if self.template.is_empty() { "/" } else { &self.template }
    }

    pub(crate) fn middleware(&self) -> &[BoxedMiddleware] {
        &self.middleware
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("template", &self.template)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}
