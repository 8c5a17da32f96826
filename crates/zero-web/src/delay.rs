//! Browser timer for retry backoff

use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;
use zero_core::Delay;

/// [`Delay`] backed by `setTimeout`
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserDelay;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Delay for BrowserDelay {
    async fn sleep(&self, duration: Duration) {
        let (tx, rx) = oneshot::channel::<()>();
        leptos::prelude::set_timeout(
            move || {
                let _ = tx.send(());
            },
            duration,
        );
        let _ = rx.await;
    }
}
