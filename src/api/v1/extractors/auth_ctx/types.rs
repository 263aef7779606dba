/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - interceptor が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - リクエスト単位で生成・破棄される。プロセス全体で共有・キャッシュしない
 */
use std::collections::BTreeSet;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `identifier` はトークンの `sub` (= username) をそのまま保持する
/// - `authorities` は `ROLE_<NAME>` と permission 名の集合 (空集合もあり得る)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub identifier: String,
    pub authorities: BTreeSet<String>,
}

impl AuthCtx {
    pub fn new(identifier: String, authorities: BTreeSet<String>) -> Self {
        Self {
            identifier,
            authorities,
        }
    }

    /// Exact, case-sensitive membership check.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}
