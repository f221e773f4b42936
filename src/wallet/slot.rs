//! Injection point for the wallet provider capability.

use std::sync::{Arc, RwLock};

use crate::wallet::provider::WalletProvider;

/// Host-side slot a wallet provider gets injected into.
///
/// Plays the role a `window.ethereum` global plays for a page: the embedding
/// environment may populate it at any point, including well after startup, and
/// may clear it again when the wallet goes away. Discovery polls it; session
/// transitions re-read it instead of assuming an earlier poll still holds.
#[derive(Default)]
pub struct ProviderSlot {
    inner: RwLock<Option<Arc<dyn WalletProvider>>>,
}

impl ProviderSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a provider, replacing any previous one.
    pub fn inject(&self, provider: Arc<dyn WalletProvider>) {
        *self.inner.write().expect("provider slot lock poisoned") = Some(provider);
        tracing::debug!("Wallet provider injected");
    }

    /// Remove the provider, as when a wallet extension is disabled.
    pub fn clear(&self) {
        *self.inner.write().expect("provider slot lock poisoned") = None;
    }

    /// Current provider, if one is installed.
    pub fn get(&self) -> Option<Arc<dyn WalletProvider>> {
        self.inner.read().expect("provider slot lock poisoned").clone()
    }

    /// Whether a provider is currently installed.
    pub fn is_present(&self) -> bool {
        self.inner.read().expect("provider slot lock poisoned").is_some()
    }
}

impl std::fmt::Debug for ProviderSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSlot")
            .field("present", &self.is_present())
            .finish()
    }
}
