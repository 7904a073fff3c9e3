//! In-memory transport for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::gateway::{ModuleGateway, ModuleTransport};
use crate::types::{BackupError, BackupResult, ModuleParams};

#[derive(Default)]
struct Script {
    responses: HashMap<String, Value>,
    assets: HashMap<String, Vec<u8>>,
    calls: Vec<(String, ModuleParams)>,
}

/// Replays canned envelopes keyed by module name and parameters.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

fn key(module: &str, params: &ModuleParams) -> String {
    let mut key = module.to_string();
    for (k, v) in params.iter() {
        key.push_str(&format!("|{k}={v}"));
    }
    key
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, module: &str, envelope: Value) -> Self {
        self.respond_with(module, &ModuleParams::new(), envelope)
    }

    pub fn respond_with(self, module: &str, params: &ModuleParams, envelope: Value) -> Self {
        self.script
            .lock()
            .unwrap()
            .responses
            .insert(key(module, params), envelope);
        self
    }

    pub fn respond_body(self, module: &str, body: &str) -> Self {
        self.respond(module, json!({"status": "ok", "body": body}))
    }

    pub fn asset(self, url: &str, bytes: &[u8]) -> Self {
        self.script
            .lock()
            .unwrap()
            .assets
            .insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn calls(&self) -> Vec<(String, ModuleParams)> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn gateway(&self) -> ModuleGateway {
        ModuleGateway::new(Arc::new(self.clone()))
    }
}

#[async_trait]
impl ModuleTransport for ScriptedTransport {
    async fn module_call(&self, module: &str, params: &ModuleParams) -> BackupResult<Value> {
        let mut script = self.script.lock().unwrap();
        script.calls.push((module.to_string(), params.clone()));
        script
            .responses
            .get(&key(module, params))
            .or_else(|| script.responses.get(module))
            .cloned()
            .ok_or_else(|| BackupError::Transport(format!("no scripted response for {module}")))
    }

    async fn fetch_asset(&self, url: &str) -> BackupResult<Vec<u8>> {
        self.script
            .lock()
            .unwrap()
            .assets
            .get(url)
            .cloned()
            .ok_or_else(|| BackupError::Transport(format!("no scripted asset for {url}")))
    }
}
