use std::collections::BTreeSet;

use serde::Serialize;

/// The caller's own identity as seen by the auth pipeline.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub authorities: BTreeSet<String>,
}

/// Admin view of a stored principal. The secret hash is never exposed.
#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub username: String,
    pub role: String,
    pub authorities: BTreeSet<String>,
}
