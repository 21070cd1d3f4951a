//! Centralized route authorization.
//!
//! Guarding is a pure predicate over the session: no per-page checks, one
//! policy table, one evaluation function. Denied navigation never yields
//! the guarded content, only a redirect target.

use crate::session::Session;

/// Authorization requirement attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Public,
    Authenticated,
    AdminOnly,
}

/// Result of evaluating a policy against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    RedirectToLogin,
    RedirectHome,
}

impl GuardOutcome {
    pub fn is_allowed(self) -> bool {
        matches!(self, GuardOutcome::Allow)
    }
}

/// Evaluate `policy` for an optional session.
///
/// An unauthenticated visitor on any guarded route is sent to the login
/// page. An authenticated non-admin on an admin-only route is sent home.
pub fn evaluate(policy: AccessPolicy, session: Option<&Session>) -> GuardOutcome {
    match policy {
        AccessPolicy::Public => GuardOutcome::Allow,
        AccessPolicy::Authenticated => match session {
            Some(_) => GuardOutcome::Allow,
            None => GuardOutcome::RedirectToLogin,
        },
        AccessPolicy::AdminOnly => match session {
            None => GuardOutcome::RedirectToLogin,
            Some(s) if s.is_admin() => GuardOutcome::Allow,
            Some(_) => GuardOutcome::RedirectHome,
        },
    }
}

/// Policy table for the application's routes.
pub fn policy_for_route(path: &str) -> AccessPolicy {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return AccessPolicy::Public;
    }

    if path == "/admin" || path.starts_with("/admin/") {
        return AccessPolicy::AdminOnly;
    }
    if path == "/create-post" || path == "/edit-post" || path.starts_with("/edit-post/") {
        return AccessPolicy::Authenticated;
    }

    // Post details, login, register and the 404 fallback are public.
    AccessPolicy::Public
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};

    fn session(role: Role) -> Session {
        Session {
            user: User {
                id: "u1".into(),
                name: "Alice".into(),
                email: "alice@example.com".into(),
                role,
            },
            token: "tok".into(),
        }
    }

    #[test]
    fn unauthenticated_visitor_is_redirected_to_login() {
        assert_eq!(
            evaluate(AccessPolicy::Authenticated, None),
            GuardOutcome::RedirectToLogin
        );
        assert_eq!(
            evaluate(AccessPolicy::AdminOnly, None),
            GuardOutcome::RedirectToLogin
        );
        assert!(!evaluate(AccessPolicy::Authenticated, None).is_allowed());
    }

    #[test]
    fn regular_user_is_redirected_home_from_admin_routes() {
        let s = session(Role::User);
        assert_eq!(
            evaluate(AccessPolicy::AdminOnly, Some(&s)),
            GuardOutcome::RedirectHome
        );
        assert_eq!(
            evaluate(AccessPolicy::Authenticated, Some(&s)),
            GuardOutcome::Allow
        );
    }

    #[test]
    fn admin_passes_every_policy() {
        let s = session(Role::Admin);
        for policy in [
            AccessPolicy::Public,
            AccessPolicy::Authenticated,
            AccessPolicy::AdminOnly,
        ] {
            assert!(evaluate(policy, Some(&s)).is_allowed());
        }
    }

    #[test]
    fn public_routes_allow_anyone() {
        assert!(evaluate(AccessPolicy::Public, None).is_allowed());
    }

    #[test]
    fn route_table_matches_application_layout() {
        assert_eq!(policy_for_route("/"), AccessPolicy::Public);
        assert_eq!(policy_for_route("/posts/abc123"), AccessPolicy::Public);
        assert_eq!(policy_for_route("/login"), AccessPolicy::Public);
        assert_eq!(policy_for_route("/register"), AccessPolicy::Public);
        assert_eq!(policy_for_route("/create-post"), AccessPolicy::Authenticated);
        assert_eq!(
            policy_for_route("/edit-post/abc123"),
            AccessPolicy::Authenticated
        );
        // A prefix is not a match: unknown sibling paths stay public.
        assert_eq!(policy_for_route("/edit-postscript"), AccessPolicy::Public);
        assert_eq!(policy_for_route("/create-posts"), AccessPolicy::Public);
        assert_eq!(
            policy_for_route("/admin/dashboard"),
            AccessPolicy::AdminOnly
        );
        assert_eq!(policy_for_route("/admin/users"), AccessPolicy::AdminOnly);
        assert_eq!(policy_for_route("/admin/comments/"), AccessPolicy::AdminOnly);
        assert_eq!(policy_for_route("/no-such-page"), AccessPolicy::Public);
    }
}
