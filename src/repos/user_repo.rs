/*
 * Responsibility
 * - users / roles / permissions テーブルから認証に必要な情報だけを読む
 * - CredentialStore の Postgres 実装
 * - スキーマ管理 (migration) は扱わない
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::credentials::{
    BoxFuture, CredentialStore, Permission, Principal, Role,
};

#[derive(Debug, FromRow)]
pub struct PrincipalRow {
    pub username: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub role_id: i64,
    pub role_name: String,
}

impl PrincipalRow {
    pub fn into_principal(self, permission_names: Vec<String>) -> Principal {
        Principal {
            identifier: self.username,
            secret_hash: self.password_hash,
            role: Role {
                name: self.role_name,
                permissions: permission_names
                    .into_iter()
                    .map(|name| Permission { name })
                    .collect(),
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_principal(&self, username: &str) -> RepoResult<Option<Principal>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT
                u.username,
                u.password,
                r.id AS role_id,
                r.name AS role_name
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let permissions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permission
            FROM permissions
            WHERE role_id = $1
            ORDER BY id
            "#,
        )
        .bind(row.role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        Ok(Some(row.into_principal(permissions)))
    }
}

impl CredentialStore for PgCredentialStore {
    fn find_by_identifier<'a>(
        &'a self,
        identifier: &'a str,
    ) -> BoxFuture<'a, RepoResult<Option<Principal>>> {
        Box::pin(self.find_principal(identifier))
    }
}
