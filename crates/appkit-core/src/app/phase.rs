use std::fmt;

/// Lifecycle phase of an app.
///
/// Phases only move forward, one step at a time:
/// `Constructed -> Registered -> Booted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecyclePhase {
    /// The app object exists; nothing has been declared yet.
    Constructed,
    /// `register` ran: factories, capabilities and listeners are declared.
    Registered,
    /// `boot` ran.
    Booted,
}

impl LifecyclePhase {
    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<LifecyclePhase> {
        match self {
            LifecyclePhase::Constructed => Some(LifecyclePhase::Registered),
            LifecyclePhase::Registered => Some(LifecyclePhase::Booted),
            LifecyclePhase::Booted => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::Constructed => "constructed",
            LifecyclePhase::Registered => "registered",
            LifecyclePhase::Booted => "booted",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
