//! Student account record and its public views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Login key form: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Optional student profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[validate(length(min = 1, max = 120, message = "Full name must be 1-120 characters"))]
    pub full_name: Option<String>,
    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "College must be at most 200 characters"))]
    pub college: Option<String>,
    #[validate(length(max = 200, message = "Course must be at most 200 characters"))]
    pub course: Option<String>,
    #[validate(range(min = 1950, max = 2100, message = "Graduation year must be between 1950 and 2100"))]
    pub graduation_year: Option<i32>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl Profile {
    /// Trim text fields; blank strings count as absent.
    pub fn normalized(self) -> Self {
        Self {
            full_name: trimmed(self.full_name),
            phone: trimmed(self.phone),
            college: trimmed(self.college),
            course: trimmed(self.course),
            graduation_year: self.graduation_year,
        }
    }

    /// Overwrite the fields that `update` carries; keep the rest.
    pub fn merge(&mut self, update: Profile) {
        if update.full_name.is_some() {
            self.full_name = update.full_name;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
        if update.college.is_some() {
            self.college = update.college;
        }
        if update.course.is_some() {
            self.course = update.course;
        }
        if update.graduation_year.is_some() {
            self.graduation_year = update.graduation_year;
        }
    }
}

/// Persisted account. `password_hash` never leaves the server.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
    pub password_changed_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_logout_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload; the email must already be normalized and the password hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    pub fn into_account(self) -> Account {
        Account {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            profile: self.profile,
            password_changed_at: self.created_at,
            last_login_at: None,
            last_logout_at: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Short form returned alongside a token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            full_name: account.profile.full_name.clone(),
        }
    }
}

/// Full account without the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    #[serde(flatten)]
    pub profile: Profile,
    pub password_changed_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_logout_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            profile: account.profile,
            password_changed_at: account.password_changed_at,
            last_login_at: account.last_login_at,
            last_logout_at: account.last_logout_at,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
