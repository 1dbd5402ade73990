/// Application name
pub const APP_NAME: &str = "appkit";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Namespace of the host (server) container; identifiers there are unqualified
pub const HOST_NAMESPACE: &str = "";

/// Built-in app service holding the app id as `String`
pub const APP_NAME_SERVICE: &str = "AppName";

/// Built-in app service holding the app's init params as `ConfigData`
pub const INIT_PARAMS_SERVICE: &str = "InitParams";

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "info";
