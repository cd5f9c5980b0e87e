//! InMemoryCloudApi - 開発・テスト用のコントロールプレーン実装
//!
//! ワイヤ形式と認証はこのクレートの範囲外なので、v1 の実行可能な実装は
//! インメモリです。変更系は ULID ベースの notification を発行し、
//! ポーリングに対して台本どおりのステータス列を返します。
//!
//! # 実装詳細
//! - HashMap によるリソーステーブル（app_uuid ごと）
//! - notification ごとの VecDeque<Value>（最後の 1 件は永遠に返り続ける）
//! - Mutex は await を跨がない（ロックはメソッド内で完結）

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use ulid::Ulid;

use crate::domain::{
    ApiError, Application, Database, Environment, NotificationHandle, NotificationId, Tag,
};
use crate::ports::CloudApi;

#[derive(Default)]
struct State {
    applications: Vec<Application>,
    environments: HashMap<String, Vec<Environment>>,
    databases: HashMap<String, Vec<Database>>,
    tags: HashMap<String, Vec<Tag>>,

    /// Raw payload script per notification. The last entry is terminal and
    /// is never popped: re-polling a finished task keeps reporting the same
    /// terminal status.
    notifications: HashMap<NotificationId, VecDeque<Value>>,

    /// When set, the next mutation is not applied and its notification
    /// script ends in `failed` with this reason.
    fail_next: Option<String>,
}

impl State {
    fn require_app(&self, app_uuid: &str) -> Result<(), ApiError> {
        if self.applications.iter().any(|a| a.uuid == app_uuid) {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("application {app_uuid}")))
        }
    }

    /// Install a fresh notification with the standard lifecycle script.
    fn mint_notification(&mut self, script: Vec<Value>) -> NotificationHandle {
        let id = NotificationId::new(Ulid::new().to_string());
        self.notifications.insert(id.clone(), script.into());
        NotificationHandle::new(id, Utc::now())
    }
}

/// In-memory [`CloudApi`] implementation.
///
/// Mutations take effect immediately and install a pending → in-progress →
/// completed script on the minted notification, so a waiter observes the
/// same shape of lifecycle a real control plane produces.
#[derive(Default)]
pub struct InMemoryCloudApi {
    state: Mutex<State>,
}

impl InMemoryCloudApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small fixture the CLI demo and tests share.
    pub fn with_demo_data() -> Self {
        let api = Self::new();
        api.seed_application(Application {
            uuid: "a47ac10b-58cc-4372-a567-0e02b2c3d470".into(),
            name: "acme-site".into(),
            hosting_id: "devcloud:acme".into(),
        });
        api.seed_environment(
            "a47ac10b-58cc-4372-a567-0e02b2c3d470",
            Environment {
                uuid: "24-a47ac10b".into(),
                label: "Dev".into(),
                name: "dev".into(),
                domains: vec!["dev.acme.example".into()],
                vcs_path: "master".into(),
                vcs_url: Some("acme@vcs.example:acme.git".into()),
                flags: Default::default(),
            },
        );
        api.seed_environment(
            "a47ac10b-58cc-4372-a567-0e02b2c3d470",
            Environment {
                uuid: "32-a47ac10b".into(),
                label: "Production".into(),
                name: "prod".into(),
                domains: vec!["www.acme.example".into(), "acme.example".into()],
                vcs_path: "tags/2026-08-0".into(),
                vcs_url: Some("acme@vcs.example:acme.git".into()),
                flags: crate::domain::EnvironmentFlags {
                    livedev: false,
                    production_mode: true,
                },
            },
        );
        api.seed_database("a47ac10b-58cc-4372-a567-0e02b2c3d470", Database {
            name: "acme_main".into(),
        });
        api.seed_tag("a47ac10b-58cc-4372-a567-0e02b2c3d470", Tag {
            name: "team-web".into(),
            color: "orange".into(),
        });
        api
    }

    pub fn seed_application(&self, app: Application) {
        let mut state = self.state.lock().unwrap();
        state.applications.push(app);
    }

    pub fn seed_environment(&self, app_uuid: &str, env: Environment) {
        let mut state = self.state.lock().unwrap();
        state
            .environments
            .entry(app_uuid.to_string())
            .or_default()
            .push(env);
    }

    pub fn seed_database(&self, app_uuid: &str, db: Database) {
        let mut state = self.state.lock().unwrap();
        state
            .databases
            .entry(app_uuid.to_string())
            .or_default()
            .push(db);
    }

    pub fn seed_tag(&self, app_uuid: &str, tag: Tag) {
        let mut state = self.state.lock().unwrap();
        state.tags.entry(app_uuid.to_string()).or_default().push(tag);
    }

    pub fn first_application_uuid(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.applications.first().map(|a| a.uuid.clone())
    }

    /// Make the next mutation report backend failure with `reason`.
    pub fn fail_next_mutation(&self, reason: &str) {
        let mut state = self.state.lock().unwrap();
        state.fail_next = Some(reason.to_string());
    }

    /// Install an arbitrary payload script for a notification (tests).
    pub fn install_notification(&self, id: NotificationId, script: Vec<Value>) {
        let mut state = self.state.lock().unwrap();
        state.notifications.insert(id, script.into());
    }

    fn standard_script() -> Vec<Value> {
        vec![
            json!({ "status": "pending" }),
            json!({ "status": "in-progress" }),
            json!({ "status": "completed" }),
        ]
    }

    fn failure_script(reason: &str) -> Vec<Value> {
        vec![json!({ "status": "failed", "message": reason })]
    }
}

#[async_trait]
impl CloudApi for InMemoryCloudApi {
    async fn list_applications(&self) -> Result<Vec<Application>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state.applications.clone())
    }

    async fn list_environments(&self, app_uuid: &str) -> Result<Vec<Environment>, ApiError> {
        let state = self.state.lock().unwrap();
        state.require_app(app_uuid)?;
        Ok(state.environments.get(app_uuid).cloned().unwrap_or_default())
    }

    async fn list_databases(&self, app_uuid: &str) -> Result<Vec<Database>, ApiError> {
        let state = self.state.lock().unwrap();
        state.require_app(app_uuid)?;
        Ok(state.databases.get(app_uuid).cloned().unwrap_or_default())
    }

    async fn list_tags(&self, app_uuid: &str) -> Result<Vec<Tag>, ApiError> {
        let state = self.state.lock().unwrap();
        state.require_app(app_uuid)?;
        Ok(state.tags.get(app_uuid).cloned().unwrap_or_default())
    }

    async fn create_tag(
        &self,
        app_uuid: &str,
        name: &str,
        color: &str,
    ) -> Result<NotificationHandle, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.require_app(app_uuid)?;

        if let Some(reason) = state.fail_next.take() {
            return Ok(state.mint_notification(Self::failure_script(&reason)));
        }

        state.tags.entry(app_uuid.to_string()).or_default().push(Tag {
            name: name.to_string(),
            color: color.to_string(),
        });
        Ok(state.mint_notification(Self::standard_script()))
    }

    async fn delete_tag(
        &self,
        app_uuid: &str,
        name: &str,
    ) -> Result<NotificationHandle, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.require_app(app_uuid)?;

        if let Some(reason) = state.fail_next.take() {
            return Ok(state.mint_notification(Self::failure_script(&reason)));
        }

        if let Some(tags) = state.tags.get_mut(app_uuid) {
            tags.retain(|t| t.name != name);
        }
        Ok(state.mint_notification(Self::standard_script()))
    }

    async fn poll_notification(&self, id: &NotificationId) -> Result<Value, ApiError> {
        let mut state = self.state.lock().unwrap();
        let script = state
            .notifications
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(format!("notification {id}")))?;

        // Pop until the last entry; the terminal payload repeats forever.
        if script.len() > 1 {
            Ok(script.pop_front().unwrap_or_else(|| json!({})))
        } else {
            Ok(script.front().cloned().unwrap_or_else(|| json!({})))
        }
    }
}
