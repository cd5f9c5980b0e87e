//! Error taxonomy for control-plane calls.
//!
//! # 分類
//! - Transport: 接続失敗・TLS エラーなど（ポーリング中は unknown 扱い）
//! - Timeout: 1 リクエスト分の予算切れ（全体のタイムアウトとは別物）
//! - Malformed: レスポンスは返ったが解釈できない
//! - NotFound: 存在しないリソースへの参照

use thiserror::Error;

/// Error returned by a [`CloudApi`](crate::ports::CloudApi) operation.
///
/// Only the read path surfaces these to the operator directly. On the polling
/// path every variant is degraded to `TaskStatus::Unknown` and retried — a
/// flaky network must never masquerade as a failed backend task.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request exceeded its per-call budget")]
    Timeout,

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Short classification label attached when a poll degrades to `unknown`.
    pub fn cause_label(&self) -> String {
        match self {
            ApiError::Transport(msg) => format!("transport: {msg}"),
            ApiError::Timeout => "request timeout".to_string(),
            ApiError::Malformed(msg) => format!("malformed: {msg}"),
            ApiError::NotFound(what) => format!("not found: {what}"),
        }
    }
}
