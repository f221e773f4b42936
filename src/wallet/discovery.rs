//! Provider discovery with a bounded wait.
//!
//! Injection timing is the host's business: a wallet may appear before this
//! process starts, milliseconds after, or never. Startup therefore races a
//! short presence poll against a timeout instead of blocking until someone
//! installs a wallet.

use std::time::Duration;

use tokio::time::{interval, timeout};

use crate::wallet::slot::ProviderSlot;

/// Fixed interval between presence checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default window before discovery gives up.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1200);

/// Wait until `slot` holds a provider or `window` elapses, whichever is first.
///
/// Returns whether a provider was present when the wait ended. Absence is a
/// valid terminal outcome, not an error; downstream transitions must re-check
/// the slot rather than assume this result still holds.
pub async fn wait_for_provider(slot: &ProviderSlot, window: Duration) -> bool {
    let found = timeout(window, async {
        let mut ticker = interval(POLL_INTERVAL);
        loop {
            ticker.tick().await;
            if slot.is_present() {
                return;
            }
        }
    })
    .await
    .is_ok();

    if found {
        tracing::info!("Wallet provider detected");
    } else {
        tracing::warn!(
            window_ms = window.as_millis() as u64,
            "No wallet provider appeared within the discovery window"
        );
    }
    found
}
