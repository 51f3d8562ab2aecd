//! Authentication: password hashing, JWT, account endpoints.

mod handlers;
mod jwt;
mod password;

pub use handlers::{change_password, login, logout, me, register, update_me};
pub use handlers::{AccountResponse, AuthResponse, MessageResponse};
pub use jwt::{Claims, Identity, JwtSecret, TokenError};
pub use password::{HashScheme, PasswordHasher, DEFAULT_BCRYPT_COST, MAX_PASSWORD_BYTES};
