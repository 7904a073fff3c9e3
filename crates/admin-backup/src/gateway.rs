//! Module gateway: the only path from the pipeline to the admin panel.
//!
//! Every read goes through a named module call. The gateway validates the
//! status envelope and offers the response either raw or as a parsed markup
//! fragment. Plan-gating detection lives here and nowhere else, so a future
//! move to an explicit capability flag touches one function.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{BackupError, BackupResult, ModuleParams};

/// Substring the panel renders in place of a settings form when the site's
/// plan does not include the feature.
pub const UPGRADE_REQUIRED_MARKER: &str = "upgrade-required";

/// The I/O capability supplied by the host.
///
/// Implementations perform exactly one attempt per call; retries, if any,
/// belong to the host and not to this pipeline.
#[async_trait]
pub trait ModuleTransport: Send + Sync {
    /// Issue a module call and return the raw JSON envelope.
    async fn module_call(&self, module: &str, params: &ModuleParams) -> BackupResult<Value>;

    /// Download a binary asset referenced from a module's markup.
    async fn fetch_asset(&self, url: &str) -> BackupResult<Vec<u8>>;
}

/// A decoded module response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleResponse {
    /// Module that produced this response.
    #[serde(skip)]
    pub module: String,
    /// Envelope status; anything but `ok` is a failure.
    pub status: String,
    /// Markup fragment to redisplay.
    #[serde(default)]
    pub body: String,
    /// Error explanation the panel attaches to non-ok envelopes.
    #[serde(default)]
    pub message: Option<String>,
    /// Module-specific side-channel fields.
    #[serde(flatten)]
    pub auxiliary: Map<String, Value>,
}

impl ModuleResponse {
    /// Decode a raw envelope without checking its status.
    pub fn from_envelope(module: &str, raw: Value) -> BackupResult<Self> {
        let mut response: ModuleResponse = serde_json::from_value(raw).map_err(|e| {
            BackupError::InvalidResponse(format!("{module}: {e}"))
        })?;
        response.module = module.to_string();
        Ok(response)
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Parse the body into a navigable markup tree.
    pub fn markup(&self) -> Html {
        Html::parse_fragment(&self.body)
    }

    /// Deserialize a required auxiliary field.
    pub fn aux<T: DeserializeOwned>(&self, field: &str) -> BackupResult<T> {
        match self.auxiliary.get(field) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Err(BackupError::MissingAuxiliary {
                module: self.module.clone(),
                field: field.to_string(),
            }),
        }
    }

    /// Deserialize an auxiliary field that may be absent or null.
    pub fn aux_opt<T: DeserializeOwned>(&self, field: &str) -> BackupResult<Option<T>> {
        match self.auxiliary.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }

    fn requires_upgrade(&self) -> bool {
        self.body.contains(UPGRADE_REQUIRED_MARKER)
    }
}

/// Outcome of a plan-gated call.
#[derive(Debug)]
pub enum Availability<T> {
    Available(T),
    /// The site's plan does not include this feature. Not an error.
    Unavailable,
}

impl<T> Availability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    /// Transform the available value with a fallible decoder.
    pub fn try_map<U>(self, f: impl FnOnce(T) -> BackupResult<U>) -> BackupResult<Availability<U>> {
        match self {
            Availability::Available(value) => f(value).map(Availability::Available),
            Availability::Unavailable => Ok(Availability::Unavailable),
        }
    }
}

/// Issues module calls through an injected transport.
#[derive(Clone)]
pub struct ModuleGateway {
    transport: Arc<dyn ModuleTransport>,
}

impl ModuleGateway {
    pub fn new(transport: Arc<dyn ModuleTransport>) -> Self {
        Self { transport }
    }

    /// Call a module and validate its status envelope. Single attempt.
    pub async fn call(&self, module: &str, params: &ModuleParams) -> BackupResult<ModuleResponse> {
        debug!("module call {module} {params:?}");
        let raw = self.transport.module_call(module, params).await?;
        let response = ModuleResponse::from_envelope(module, raw)?;
        if !response.is_ok() {
            return Err(BackupError::RemoteCallFailed {
                module: module.to_string(),
                status: response.status,
                message: response.message,
            });
        }
        Ok(response)
    }

    /// Call a module and parse its body as markup.
    pub async fn call_markup(&self, module: &str, params: &ModuleParams) -> BackupResult<Html> {
        Ok(self.call(module, params).await?.markup())
    }

    /// Call a plan-gated module; an upgrade prompt yields `Unavailable`.
    pub async fn call_markup_optional(
        &self,
        module: &str,
        params: &ModuleParams,
    ) -> BackupResult<Availability<Html>> {
        let response = self.call(module, params).await?;
        if response.requires_upgrade() {
            debug!("{module} requires an upgraded plan");
            return Ok(Availability::Unavailable);
        }
        Ok(Availability::Available(response.markup()))
    }

    /// Download a binary asset.
    pub async fn fetch_asset(&self, url: &str) -> BackupResult<Vec<u8>> {
        debug!("fetching asset {url}");
        self.transport.fetch_asset(url).await
    }
}
