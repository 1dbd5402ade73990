use std::sync::{Mutex, PoisonError};

/// Collects the frontend scripts apps ask the host to load.
pub trait ScriptManager: Send + Sync {
    fn add_script(&self, app_id: &str, script: &str);

    /// Queued scripts as `app/script`, in the order first requested.
    fn scripts(&self) -> Vec<String>;
}

#[derive(Debug, Default)]
pub struct DefaultScriptManager {
    scripts: Mutex<Vec<String>>,
}

impl DefaultScriptManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScriptManager for DefaultScriptManager {
    fn add_script(&self, app_id: &str, script: &str) {
        let entry = format!("{}/{}", app_id, script);
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        if !scripts.contains(&entry) {
            scripts.push(entry);
        }
    }

    fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
