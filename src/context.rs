//! Per-request metadata passed explicitly to every handler.

/// What one request carries into the CRUD layer: the raw requested
/// identifier (if any), the caller's role names, and whether the request
/// only wants a row count. The store handle and permission checker are
/// separate handler arguments, never ambient state.
#[derive(Debug, Default, Clone)]
pub struct RequestContext {
    /// Raw identifier string from the request path, e.g. "5" or "1,2" for
    /// composite keys.
    pub resource_id: Option<String>,
    pub roles: Vec<String>,
    /// Marks a count-only request: find-many returns the total instead of rows.
    pub counting: bool,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_counting(mut self, counting: bool) -> Self {
        self.counting = counting;
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
