//! PostgreSQL account repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{AccountStore, DbPool};
use crate::error::AppResult;
use crate::models::{Account, NewAccount, Profile};

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, full_name, phone, college, course, \
     graduation_year, password_changed_at, last_login_at, last_logout_at, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub college: Option<String>,
    pub course: Option<String>,
    pub graduation_year: Option<i32>,
    pub password_changed_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_logout_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            profile: Profile {
                full_name: row.full_name,
                phone: row.phone,
                college: row.college,
                course: row.course,
                graduation_year: row.graduation_year,
            },
            password_changed_at: row.password_changed_at,
            last_login_at: row.last_login_at,
            last_logout_at: row.last_logout_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `AccountStore` backed by the `accounts` table.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: NewAccount) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO accounts (id, email, password_hash, full_name, phone, college, course,
                                  graduation_year, password_changed_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9, $9)
            ON CONFLICT (email) DO NOTHING
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.profile.full_name)
        .bind(&account.profile.phone)
        .bind(&account.profile.college)
        .bind(&account.profile.course)
        .bind(account.profile.graduation_year)
        .bind(account.created_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let r = sqlx::query(
            "UPDATE accounts SET password_hash = $1, password_changed_at = $2, updated_at = $2 WHERE id = $3",
        )
        .bind(password_hash)
        .bind(changed_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected() > 0)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let r = sqlx::query("UPDATE accounts SET last_login_at = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }

    async fn record_logout(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let r = sqlx::query("UPDATE accounts SET last_logout_at = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        profile: Profile,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE accounts SET
                full_name       = COALESCE($1, full_name),
                phone           = COALESCE($2, phone),
                college         = COALESCE($3, college),
                course          = COALESCE($4, course),
                graduation_year = COALESCE($5, graduation_year),
                updated_at      = $6
            WHERE id = $7
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(profile.full_name)
        .bind(profile.phone)
        .bind(profile.college)
        .bind(profile.course)
        .bind(profile.graduation_year)
        .bind(at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }
}
