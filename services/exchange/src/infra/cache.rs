use std::future::Future;
use std::time::Duration;

use anyhow::Context as _;
use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::PendingClaimCache;
use crate::domain::types::{PENDING_CLAIM_TTL_SECS, PendingIdentity};
use crate::error::ExchangeServiceError;

#[derive(Clone)]
pub struct RedisPendingClaimCache {
    pub pool: Pool,
    pub timeout: Duration,
}

fn pending_claim_key(claim_id: &str) -> String {
    format!("pending_claim:{claim_id}")
}

impl RedisPendingClaimCache {
    /// Run one Redis round-trip under the upstream timeout.
    async fn bounded<T, F>(&self, op: F) -> Result<T, ExchangeServiceError>
    where
        F: Future<Output = Result<T, ExchangeServiceError>>,
    {
        tokio::time::timeout(self.timeout, op).await.map_err(|_| {
            tracing::warn!("redis call timed out");
            ExchangeServiceError::UpstreamUnavailable
        })?
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, ExchangeServiceError> {
        self.pool.get().await.map_err(|e| {
            tracing::warn!(error = %e, "redis pool unavailable");
            ExchangeServiceError::UpstreamUnavailable
        })
    }
}

impl PendingClaimCache for RedisPendingClaimCache {
    async fn put(
        &self,
        claim_id: &str,
        identity: &PendingIdentity,
    ) -> Result<(), ExchangeServiceError> {
        let payload = serde_json::to_vec(identity).context("encode pending identity")?;
        self.bounded(async {
            let mut conn = self.conn().await?;
            let (): () = conn
                .set_ex(pending_claim_key(claim_id), payload, PENDING_CLAIM_TTL_SECS)
                .await
                .context("store pending claim")?;
            Ok(())
        })
        .await
    }

    async fn get(&self, claim_id: &str) -> Result<Option<PendingIdentity>, ExchangeServiceError> {
        let raw: Option<Vec<u8>> = self
            .bounded(async {
                let mut conn = self.conn().await?;
                let value: Option<Vec<u8>> = conn
                    .get(pending_claim_key(claim_id))
                    .await
                    .context("load pending claim")?;
                Ok(value)
            })
            .await?;
        raw.map(|bytes| serde_json::from_slice(&bytes).context("decode pending identity"))
            .transpose()
            .map_err(ExchangeServiceError::from)
    }

    async fn remove(&self, claim_id: &str) -> Result<(), ExchangeServiceError> {
        self.bounded(async {
            let mut conn = self.conn().await?;
            let (): () = conn
                .del(pending_claim_key(claim_id))
                .await
                .context("drop pending claim")?;
            Ok(())
        })
        .await
    }
}
