//! cumulo-core
//!
//! Core building blocks for the Cumulo CLI.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（handle, status, outcome, resource, errors）
//! - **ports**: 抽象化レイヤー（CloudApi）
//! - **wait**: 待機エンジン（StatusPoller, BackoffPolicy, TaskWaiter）
//! - **app**: アプリケーションロジック（MutatingCommand, Dispatcher）
//! - **impls**: 実装（InMemoryCloudApi など開発用）
//!
//! The one piece with real engineering risk lives in [`wait`]: converting a
//! notification handle from an asynchronous mutation into exactly one
//! terminal [`WaitOutcome`](domain::WaitOutcome), under a timeout budget,
//! with exponential backoff and cooperative cancellation. Everything else is
//! request/response glue around it.

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod wait;
