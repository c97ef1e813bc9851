use async_trait::async_trait;
use std::time::Duration;

/// Runtime-neutral pause between polls.
#[async_trait(?Send)]
pub trait Delay {
    async fn delay(&self, duration: Duration);
}

/// Returns immediately. For hosts that pace polling themselves, and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

#[async_trait(?Send)]
impl Delay for NoDelay {
    async fn delay(&self, _duration: Duration) {}
}

#[cfg(feature = "tokio")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[cfg(feature = "tokio")]
#[async_trait(?Send)]
impl Delay for TokioDelay {
    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
