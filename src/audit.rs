//! Purchase audit trail
//!
//! One JSON object per line in `<state_dir>/entitle/audit.log`, written only
//! when `general.audit_log` is set (the default).

use crate::config::{schema::Config, ConfigManager};
use crate::service::{ProductPurchased, PurchaseStream};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::warn;

/// Event name recorded for purchases that granted ownership
pub const PURCHASE_COMPLETED: &str = "purchase.completed";

#[derive(Debug, Serialize)]
struct AuditEntry<'a, T: Serialize> {
    timestamp: DateTime<Utc>,
    event: &'a str,
    data: &'a T,
}

/// Append-only JSON-lines audit log
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
}

impl AuditLog {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
        }
    }

    /// Record one event
    ///
    /// Write failures only warn: the purchase being audited has already
    /// happened.
    pub async fn record<T: Serialize>(&self, event: &str, data: &T) {
        if !self.enabled {
            return;
        }

        let entry = AuditEntry {
            timestamp: Utc::now(),
            event,
            data,
        };

        match serde_json::to_string(&entry) {
            Ok(line) => {
                if let Err(e) = self.append_line(&line).await {
                    warn!(path = %self.path.display(), error = %e, "Audit write failed");
                }
            }
            Err(e) => warn!(event, error = %e, "Audit event not serializable"),
        }
    }

    /// Record every purchase already queued on the stream
    ///
    /// Returns how many were written.
    pub async fn drain_purchases(&self, stream: &mut PurchaseStream) -> usize {
        let mut recorded = 0;
        loop {
            let purchase: ProductPurchased = match stream.try_recv() {
                Ok(purchase) => purchase,
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "Audit fell behind purchase notifications");
                    continue;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            };

            self.record(PURCHASE_COMPLETED, &purchase).await;
            recorded += 1;
        }
        recorded
    }

    async fn append_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::PurchaseEvents;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn audit_in(dir: &TempDir, enabled: bool) -> AuditLog {
        AuditLog {
            enabled,
            path: dir.path().join("state").join("audit.log"),
        }
    }

    async fn lines(audit: &AuditLog) -> Vec<serde_json::Value> {
        let content = tokio::fs::read_to_string(&audit.path).await.unwrap();
        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn records_json_line() {
        let dir = TempDir::new().unwrap();
        let audit = audit_in(&dir, true);

        audit
            .record(PURCHASE_COMPLETED, &serde_json::json!({"product_id": "sub_premium"}))
            .await;

        let entries = lines(&audit).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["event"], PURCHASE_COMPLETED);
        assert_eq!(entries[0]["data"]["product_id"], "sub_premium");
        assert!(entries[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn drains_queued_purchases() {
        let dir = TempDir::new().unwrap();
        let audit = audit_in(&dir, true);
        let events = PurchaseEvents::new(8);
        let mut stream = events.subscribe();

        let attempt_id = Uuid::new_v4();
        events.emit(ProductPurchased::new("sub_premium", attempt_id));
        events.emit(ProductPurchased::new("lifetime", Uuid::new_v4()));

        assert_eq!(audit.drain_purchases(&mut stream).await, 2);

        let entries = lines(&audit).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["data"]["attempt_id"], attempt_id.to_string());
        assert_eq!(entries[1]["data"]["product_id"], "lifetime");
    }

    #[tokio::test]
    async fn disabled_log_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let audit = audit_in(&dir, false);

        audit.record(PURCHASE_COMPLETED, &serde_json::json!({})).await;

        assert!(!audit.path.exists());
    }
}
