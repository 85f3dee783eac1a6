use anyhow::{Context as _, anyhow};
use argon2::password_hash::{PasswordHasher as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;

use crate::domain::repository::PasswordHasher;
use crate::error::SiteError;

/// Argon2id hasher. Hashing is CPU-bound, so it runs on the blocking pool.
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Custom cost parameters (memory in KiB). Tests use small ones.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> anyhow::Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| anyhow!("invalid argon2 params: {e}"))?;
        Ok(Self { params })
    }
}

fn hash_blocking(params: Params, password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, password: &str) -> Result<String, SiteError> {
        let params = self.params.clone();
        let password = password.to_owned();
        let digest = tokio::task::spawn_blocking(move || hash_blocking(params, &password))
            .await
            .context("join password hashing task")??;
        Ok(digest)
    }
}
