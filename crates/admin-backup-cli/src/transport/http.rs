//! Module connector over HTTP.
//!
//! Module calls are form POSTs to `ajax-module-connector.php`. The panel
//! checks that the `wikidot_token7` form field matches the cookie of the
//! same name, so one random token is generated per connector and sent both
//! ways. Each call is a single attempt bounded by the client timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use admin_backup::{BackupError, BackupResult, ModuleParams, ModuleTransport};
use async_trait::async_trait;
use reqwest::header::COOKIE;
use serde_json::Value;
use url::Url;

pub const CONNECTOR_PATH: &str = "ajax-module-connector.php";

const USER_AGENT: &str = concat!("admin-backup/", env!("CARGO_PKG_VERSION"));

pub struct WikidotConnector {
    client: reqwest::Client,
    base_url: Url,
    session_id: String,
    token: String,
    callback_index: AtomicU64,
}

fn transport_error(e: impl std::fmt::Display) -> BackupError {
    BackupError::Transport(e.to_string())
}

impl WikidotConnector {
    pub fn new(
        base_url: Url,
        session_id: impl Into<String>,
        timeout_ms: u64,
    ) -> BackupResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            base_url,
            session_id: session_id.into(),
            token: uuid::Uuid::new_v4().simple().to_string(),
            callback_index: AtomicU64::new(0),
        })
    }

    fn cookie(&self) -> String {
        format!("wikidot_token7={}; WIKIDOT_SESSION_ID={}", self.token, self.session_id)
    }

    fn endpoint(&self) -> BackupResult<Url> {
        self.base_url.join(CONNECTOR_PATH).map_err(transport_error)
    }

    /// Form fields for one call. Module parameters cannot override the
    /// connector's own fields.
    fn form(&self, module: &str, params: &ModuleParams) -> Vec<(String, String)> {
        let index = self.callback_index.fetch_add(1, Ordering::Relaxed);
        let mut form: Vec<(String, String)> = params
            .iter()
            .filter(|(k, _)| !matches!(*k, "moduleName" | "wikidot_token7" | "callbackIndex"))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        form.push(("moduleName".into(), module.into()));
        form.push(("wikidot_token7".into(), self.token.clone()));
        form.push(("callbackIndex".into(), index.to_string()));
        form
    }
}

#[async_trait]
impl ModuleTransport for WikidotConnector {
    async fn module_call(&self, module: &str, params: &ModuleParams) -> BackupResult<Value> {
        let response = self
            .client
            .post(self.endpoint()?)
            .header(COOKIE, self.cookie())
            .form(&self.form(module, params))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackupError::Transport(format!("{module}: HTTP {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| BackupError::InvalidResponse(format!("{module}: {e}")))
    }

    async fn fetch_asset(&self, url: &str) -> BackupResult<Vec<u8>> {
        // Absolute URLs replace the base entirely.
        let url = self.base_url.join(url).map_err(transport_error)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport_error)?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        tracing::debug!("downloaded {url} ({} bytes)", bytes.len());
        Ok(bytes.to_vec())
    }
}
