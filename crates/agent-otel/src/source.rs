//! Identity of the runtime object an event originated from.
//!
//! Host runtimes report sources in two shapes: a bare display-name string, or
//! a richer identity carrying an optional name plus module/class labels.
//! [`Source`] makes that polymorphism explicit; absence of any field degrades
//! to a fallback label rather than failing the logging call.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Fallback label used when a source exposes no usable name.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// A fully described source: an agent, wrapper, or client instance.
#[derive(Debug, Clone, Default)]
pub struct NamedSource {
    /// Opaque instance identity assigned by the host runtime.
    pub id: u64,
    /// Display name, if the instance has one.
    pub name: Option<String>,
    /// Module / namespace label of the instance's type.
    pub module: Option<String>,
    /// Class / kind label of the instance's type.
    pub class: Option<String>,
    /// Wrapper id of the instance's model client, if it has one.
    pub wrapper_id: Option<u64>,
}

impl NamedSource {
    /// Build a named source from its id and display name.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Attach module and class labels.
    pub fn with_labels(mut self, module: impl Into<String>, class: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self.class = Some(class.into());
        self
    }

    /// Attach the wrapper id of the instance's model client.
    pub fn with_wrapper(mut self, wrapper_id: u64) -> Self {
        self.wrapper_id = Some(wrapper_id);
        self
    }
}

/// Polymorphic event source: either a raw display-name string or a named
/// runtime instance.
#[derive(Debug, Clone)]
pub enum Source {
    /// A bare string standing in for a source (e.g. `"user_proxy"`).
    Raw(String),
    /// An agent-like identity with optional name and type labels.
    Named(NamedSource),
}

impl Source {
    /// Build a raw string source.
    pub fn raw(s: impl Into<String>) -> Self {
        Source::Raw(s.into())
    }

    /// Opaque identity for correlation: the instance id for named sources, a
    /// stable hash of the string for raw sources.
    pub fn source_id(&self) -> u64 {
        match self {
            Source::Named(n) => n.id,
            Source::Raw(s) => {
                let mut h = DefaultHasher::new();
                s.hash(&mut h);
                h.finish()
            }
        }
    }

    /// Display name, if one is present.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Source::Raw(s) => Some(s.as_str()),
            Source::Named(n) => n.name.as_deref(),
        }
    }

    /// Module / namespace label, if one is present.
    pub fn module_label(&self) -> Option<&str> {
        match self {
            Source::Raw(_) => None,
            Source::Named(n) => n.module.as_deref(),
        }
    }

    /// Class / kind label, if one is present.
    pub fn class_label(&self) -> Option<&str> {
        match self {
            Source::Raw(_) => None,
            Source::Named(n) => n.class.as_deref(),
        }
    }

    /// Name used in emitted records: the display name, or the raw value, or
    /// [`UNKNOWN_SOURCE`] when nothing is available.
    pub fn resolved_name(&self) -> &str {
        self.display_name().unwrap_or(UNKNOWN_SOURCE)
    }

    /// Wrapper id of the source's model client, if known.
    pub fn wrapper_id(&self) -> Option<u64> {
        match self {
            Source::Raw(_) => None,
            Source::Named(n) => n.wrapper_id,
        }
    }

    /// Whether this source represents an agent-like runtime instance (and so
    /// carries module/class fields and a span in generic events).
    pub fn is_agent_like(&self) -> bool {
        matches!(self, Source::Named(_))
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Source::raw(s)
    }
}

impl From<NamedSource> for Source {
    fn from(n: NamedSource) -> Self {
        Source::Named(n)
    }
}
