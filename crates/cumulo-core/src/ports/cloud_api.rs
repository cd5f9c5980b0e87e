//! CloudApi port - コントロールプレーン API の抽象化
//!
//! # 設計原則
//! - ワイヤ形式・認証は実装の詳細（このクレートでは規定しない）
//! - 読み取り系はリソースレコードを直接返す
//! - 変更系は NotificationHandle を返す（バックエンドは非同期）
//! - 待機エンジンが依存するのは `poll_notification` だけ

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ApiError, Application, Database, Environment, NotificationHandle, NotificationId, Tag};

/// Control-plane API client port.
///
/// v1 ships an in-memory implementation for development and tests; this trait
/// is the seam for a real HTTP client later. The client instance is always
/// passed in explicitly — there is no ambient/global client.
#[async_trait]
pub trait CloudApi: Send + Sync {
    // --- read operations (synchronous request/response) ---

    async fn list_applications(&self) -> Result<Vec<Application>, ApiError>;

    async fn list_environments(&self, app_uuid: &str) -> Result<Vec<Environment>, ApiError>;

    async fn list_databases(&self, app_uuid: &str) -> Result<Vec<Database>, ApiError>;

    async fn list_tags(&self, app_uuid: &str) -> Result<Vec<Tag>, ApiError>;

    // --- mutations (asynchronous: return a handle to wait on) ---

    async fn create_tag(
        &self,
        app_uuid: &str,
        name: &str,
        color: &str,
    ) -> Result<NotificationHandle, ApiError>;

    async fn delete_tag(&self, app_uuid: &str, name: &str)
    -> Result<NotificationHandle, ApiError>;

    // --- status polling ---

    /// Fetch the raw status payload for one notification.
    ///
    /// Returns the payload as-is; classification into a
    /// [`TaskStatus`](crate::domain::TaskStatus) belongs to the
    /// [`StatusPoller`](crate::wait::StatusPoller), not the transport.
    async fn poll_notification(&self, id: &NotificationId) -> Result<Value, ApiError>;
}
