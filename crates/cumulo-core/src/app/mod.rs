//! App - アプリケーション層
//!
//! ports と waiting engine を組み合わせてコマンド実行を実装します。
//!
//! # 主要コンポーネント
//! - **MutatingCommand**: mutate-then-wait コマンドの capability trait
//! - **Dispatcher**: submit → wait → WaitOutcome の一連の流れ

pub mod commands;
pub mod dispatcher;

pub use self::commands::{CreateTag, DeleteTag, MutatingCommand};
pub use self::dispatcher::Dispatcher;
