use crate::StoreError;
use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub service_key: SecretString,
    pub base_url: String,
    pub photo_bucket: String,
}

impl Config {
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, StoreError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url = get("CARE_STORE_URL")
            .ok_or_else(|| StoreError::Config("CARE_STORE_URL missing".into()))?;
        let key = get("CARE_STORE_SERVICE_KEY")
            .ok_or_else(|| StoreError::Config("CARE_STORE_SERVICE_KEY missing".into()))?;
        let photo_bucket = get("CARE_STORE_PHOTO_BUCKET").unwrap_or_else(|| "residents".into());
        Ok(Self {
            service_key: SecretString::new(key.into()),
            base_url,
            photo_bucket,
        })
    }
}
