use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{StoreError, StoreResult, UserId, UserRole};

/// Registry account. Only identity and roles matter to moderation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub roles: Vec<UserRole>,
    /// External identity (GitHub account id); `None` for service accounts
    pub github_id: Option<String>,
}

impl User {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub roles: Vec<UserRole>,
    pub github_id: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    roles: Vec<String>,
    github_id: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|r| {
                r.parse::<UserRole>().map_err(|_| {
                    StoreError::Integrity(format!("User {} has unknown role {}", row.id, r))
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(User {
            id: row.id,
            username: row.username,
            roles,
            github_id: row.github_id,
        })
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl User {
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    /// Find a service account (no external identity) by username
    pub async fn find_service_account(username: &str, pool: &PgPool) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users WHERE username = $1 AND github_id IS NULL ORDER BY id LIMIT 1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    pub async fn create(input: NewUser, pool: &PgPool) -> StoreResult<Self> {
        let roles: Vec<String> = input.roles.iter().map(|r| r.to_string()).collect();
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, roles, github_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&input.username)
        .bind(&roles)
        .bind(&input.github_id)
        .fetch_one(pool)
        .await?;

        User::try_from(row)
    }
}
