//! 认证模块 - 管理员 JWT 认证
//!
//! 单管理员模型：凭据来自环境配置（argon2 哈希），登录换取 JWT，
//! 受保护的 handler 通过 [`CurrentUser`] extractor 校验。

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};

/// The authenticated administrator attached to a request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
        }
    }
}

/// Verify a password against an argon2 PHC hash
pub fn verify_password(hash: &str, password: &str) -> Result<bool, argon2::password_hash::Error> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHash, PasswordVerifier},
    };

    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password with argon2 (used by deployment tooling and tests)
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password(&hash, "s3cret").unwrap());
        assert!(!verify_password(&hash, "wrong").unwrap());
    }
}
