use appkit_core::config::ConfigData;
use appkit_core::container::{Container, FromContainer};
use appkit_core::kernel::constants::INIT_PARAMS_SERVICE;
use appkit_core::kernel::error::Result;
use appkit_core::managers::Capability;
use serde_json::{Value, json};

/// Default for the `blacklisted_files` init param.
pub const DEFAULT_BLACKLISTED_FILES: &[&str] = &[".htaccess"];

/// Capability document of the files app.
#[derive(Debug, Clone, PartialEq)]
pub struct FilesCapabilities {
    blacklisted_files: Vec<String>,
}

impl FilesCapabilities {
    pub fn new(blacklisted_files: Vec<String>) -> Self {
        Self { blacklisted_files }
    }
}

impl FromContainer for FilesCapabilities {
    fn from_container(container: &Container) -> Result<Self> {
        let params = container.resolve_as::<ConfigData>(INIT_PARAMS_SERVICE)?;
        let default = DEFAULT_BLACKLISTED_FILES.iter().map(|f| f.to_string()).collect();
        Ok(Self::new(params.get_or("blacklisted_files", default)))
    }
}

impl Capability for FilesCapabilities {
    fn capabilities(&self) -> Result<Value> {
        Ok(json!({
            "files": {
                "bigfilechunking": true,
                "blacklisted_files": self.blacklisted_files,
            }
        }))
    }
}
