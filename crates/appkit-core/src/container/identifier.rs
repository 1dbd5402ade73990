use std::borrow::Borrow;
use std::fmt;

/// Separator between an app namespace and a local service name.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Opaque, namespaced service identifier (`files::TagService`).
///
/// Identifiers compare by their full string form. An identifier without a
/// namespace is "unqualified"; containers qualify it with their own
/// namespace before lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(String);

impl ServiceId {
    /// Create an identifier from its raw string form.
    pub fn new(id: impl Into<String>) -> Self {
        ServiceId(id.into())
    }

    /// Create an identifier for `name` inside `namespace`.
    ///
    /// A `name` that is already qualified is kept verbatim.
    pub fn qualified(namespace: &str, name: &str) -> Self {
        if name.contains(NAMESPACE_SEPARATOR) || namespace.is_empty() {
            ServiceId(name.to_string())
        } else {
            ServiceId(format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name))
        }
    }

    /// The namespace part, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once(NAMESPACE_SEPARATOR).map(|(ns, _)| ns)
    }

    /// The local name, without namespace.
    pub fn local_name(&self) -> &str {
        self.0
            .split_once(NAMESPACE_SEPARATOR)
            .map(|(_, name)| name)
            .unwrap_or(&self.0)
    }

    pub fn is_qualified(&self) -> bool {
        self.0.contains(NAMESPACE_SEPARATOR)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        ServiceId::new(id)
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        ServiceId(id)
    }
}

impl Borrow<str> for ServiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
