use tracing::debug;
use crate::pin::store::KeyValueStore;
use crate::utils::PinResult;

/// Store key the team pages have always used for the PIN.
pub const DEFAULT_PIN_STORAGE_KEY: &str = "pfc_team_pin";

/// Team PINs are exactly this many ASCII letters or digits.
pub const PIN_LENGTH: usize = 6;

/// Saves, loads and clears the team PIN under a single store key.
pub struct PinManager<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PinManager<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn with_default_key(store: S) -> Self {
        Self::new(store, DEFAULT_PIN_STORAGE_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persists `pin` if it is valid. Returns `false` without touching the store otherwise.
    pub async fn save(&self, pin: &str) -> PinResult<bool> {
        if !Self::is_valid_pin(pin) {
            return Ok(false);
        }

        self.store.set(&self.key, pin).await?;
        debug!("Team PIN saved for auto-fill");
        Ok(true)
    }

    pub async fn get(&self) -> PinResult<Option<String>> {
        self.store.get(&self.key).await
    }

    pub async fn clear(&self) -> PinResult<()> {
        self.store.remove(&self.key).await?;
        debug!("Team PIN cleared");
        Ok(())
    }

    pub fn is_valid_pin(pin: &str) -> bool {
        pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}
