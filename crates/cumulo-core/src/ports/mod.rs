//! Ports - 抽象化レイヤー
//!
//! コントロールプレーンへのインターフェースを trait として定義し、
//! 実装の詳細（HTTP、認証、ワイヤ形式）を隠蔽します。
//! テストでは scripted な実装に差し替え可能です。

pub mod cloud_api;

pub use self::cloud_api::CloudApi;
