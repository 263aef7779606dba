//! Per-route access decisions.
//!
//! Precedence: public prefix → allow; role-restricted prefix → require the
//! role authority; anything else → require any authenticated principal.
//! Only role authorities gate paths; permission authorities are for handlers.

use crate::api::v1::extractors::AuthCtx;
use crate::config::RolePathRule;
use crate::services::auth::authority::role_authority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RoleGate {
    prefix: String,
    authority: String,
}

#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    public_prefixes: Vec<String>,
    role_gates: Vec<RoleGate>,
}

impl AccessPolicy {
    pub fn new(public_prefixes: Vec<String>, role_rules: &[RolePathRule]) -> Self {
        let role_gates = role_rules
            .iter()
            .map(|r| RoleGate {
                prefix: r.prefix.clone(),
                authority: role_authority(&r.role),
            })
            .collect();

        Self {
            public_prefixes,
            role_gates,
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes
            .iter()
            .any(|prefix| path_matches(path, prefix))
    }

    /// The authority required by the first matching role rule, if any.
    pub fn required_authority(&self, path: &str) -> Option<&str> {
        self.role_gates
            .iter()
            .find(|gate| path_matches(path, &gate.prefix))
            .map(|gate| gate.authority.as_str())
    }

    pub fn decide(&self, path: &str, auth: Option<&AuthCtx>) -> Decision {
        if self.is_public(path) {
            return Decision::Allow;
        }

        let Some(auth) = auth else {
            return Decision::Unauthenticated;
        };

        match self.required_authority(path) {
            Some(authority) if !auth.has_authority(authority) => Decision::Forbidden,
            _ => Decision::Allow,
        }
    }
}

/// Segment-aware prefix match: `/api-docs` covers `/api-docs` and
/// `/api-docs/...` but not `/api-docsx`. A prefix ending in `/` also covers
/// the bare path without the trailing slash.
pub fn path_matches(path: &str, prefix: &str) -> bool {
    if let Some(base) = prefix.strip_suffix('/') {
        return path == base || path.starts_with(prefix);
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::default_policy;
    use std::collections::BTreeSet;

    fn ctx(authorities: &[&str]) -> AuthCtx {
        AuthCtx::new(
            "someone".into(),
            authorities.iter().map(|a| a.to_string()).collect::<BTreeSet<_>>(),
        )
    }

    #[test]
    fn prefix_matching_respects_segments() {
        assert!(path_matches("/api-docs", "/api-docs"));
        assert!(path_matches("/api-docs/swagger-config", "/api-docs"));
        assert!(!path_matches("/api-docsx", "/api-docs"));

        assert!(path_matches("/api/v1/auth/login", "/api/v1/auth/"));
        assert!(path_matches("/api/v1/auth", "/api/v1/auth/"));
        assert!(!path_matches("/api/v1/authx", "/api/v1/auth/"));

        assert!(path_matches("/swagger-ui.html", "/swagger-ui.html"));
        assert!(path_matches("/swagger-ui/index.html", "/swagger-ui"));
    }

    #[test]
    fn public_paths_allow_everyone() {
        let policy = default_policy();
        assert_eq!(policy.decide("/api/v1/auth/login", None), Decision::Allow);
        assert_eq!(policy.decide("/swagger-ui/index.html", None), Decision::Allow);
        assert_eq!(policy.decide("/health", Some(&ctx(&[]))), Decision::Allow);
    }

    #[test]
    fn role_gate_requires_role_authority() {
        let policy = default_policy();
        let path = "/api/v1/admin/principals/alice";

        assert_eq!(policy.decide(path, None), Decision::Unauthenticated);
        assert_eq!(
            policy.decide(path, Some(&ctx(&["ROLE_USER", "READ_USERS"]))),
            Decision::Forbidden
        );
        assert_eq!(
            policy.decide(path, Some(&ctx(&["ROLE_ADMIN"]))),
            Decision::Allow
        );
    }

    #[test]
    fn role_gate_comparison_is_exact() {
        let policy = default_policy();
        assert_eq!(
            policy.decide("/api/v1/admin/x", Some(&ctx(&["ADMIN", "role_admin"]))),
            Decision::Forbidden
        );
    }

    #[test]
    fn default_rule_requires_authentication_only() {
        let policy = default_policy();
        assert_eq!(policy.decide("/api/v1/me", None), Decision::Unauthenticated);
        assert_eq!(policy.decide("/api/v1/me", Some(&ctx(&[]))), Decision::Allow);
    }

    #[test]
    fn role_rule_names_are_uppercased() {
        let rules = vec![RolePathRule {
            prefix: "/reports".into(),
            role: "auditor".into(),
        }];
        let policy = AccessPolicy::new(vec![], &rules);
        assert_eq!(policy.required_authority("/reports/q1"), Some("ROLE_AUDITOR"));
        assert_eq!(policy.required_authority("/other"), None);
    }
}
