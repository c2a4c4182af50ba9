//! Permission checking: a fixed action set evaluated against request roles.

use crate::context::RequestContext;
use std::collections::{HashMap, HashSet};

/// The four actions a CRUD handler can be gated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Answers allow/deny for one action given the request's roles. Handlers
/// receive a checker explicitly; nothing here is global.
pub trait PermissionChecker: Send + Sync {
    fn allows(&self, action: Action, ctx: &RequestContext) -> bool;
}

/// Allows every action. The default for resources without a policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct Anyone;

impl PermissionChecker for Anyone {
    fn allows(&self, _action: Action, _ctx: &RequestContext) -> bool {
        true
    }
}

/// Role-table policy: per-action allow and deny lists, deny wins.
/// Actions with no allow rule are denied.
#[derive(Debug, Default, Clone)]
pub struct RolePolicy {
    allowed: HashMap<Action, HashSet<String>>,
    denied: HashMap<Action, HashSet<String>>,
}

impl RolePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, action: Action, roles: &[&str]) -> Self {
        let entry = self.allowed.entry(action).or_default();
        entry.extend(roles.iter().map(|r| r.to_string()));
        self
    }

    pub fn deny(mut self, action: Action, roles: &[&str]) -> Self {
        let entry = self.denied.entry(action).or_default();
        entry.extend(roles.iter().map(|r| r.to_string()));
        self
    }

    /// Grant only `Read` to the given roles.
    pub fn read_only(self, roles: &[&str]) -> Self {
        self.allow(Action::Read, roles)
    }

    /// Grant all four actions to the given roles.
    pub fn full_access(self, roles: &[&str]) -> Self {
        self.allow(Action::Read, roles)
            .allow(Action::Create, roles)
            .allow(Action::Update, roles)
            .allow(Action::Delete, roles)
    }
}

impl PermissionChecker for RolePolicy {
    fn allows(&self, action: Action, ctx: &RequestContext) -> bool {
        if let Some(denied) = self.denied.get(&action) {
            if ctx.roles.iter().any(|r| denied.contains(r)) {
                return false;
            }
        }
        match self.allowed.get(&action) {
            Some(allowed) => ctx.roles.iter().any(|r| allowed.contains(r)),
            None => false,
        }
    }
}
