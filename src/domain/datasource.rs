// Datasource reference domain model
use serde::{Deserialize, Serialize};

/// A reference to a configured data backend as it appears in a dashboard
/// save model: either a bare name string or a `{uid, type}` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSourceRef {
    Name(String),
    Uid {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uid: Option<String>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        plugin_type: Option<String>,
    },
}

impl DataSourceRef {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn by_uid(uid: impl Into<String>, plugin_type: Option<String>) -> Self {
        Self::Uid {
            uid: Some(uid.into()),
            plugin_type,
        }
    }

    /// The identifier a registry lookup should use: uid when present,
    /// otherwise the name. Empty refs yield `None`.
    pub fn lookup_key(&self) -> Option<&str> {
        match self {
            Self::Name(name) if !name.is_empty() => Some(name),
            Self::Name(_) => None,
            Self::Uid { uid, .. } => uid.as_deref().filter(|u| !u.is_empty()),
        }
    }

    /// Best human-readable identification available without a registry.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) if !name.is_empty() => Some(name),
            Self::Name(_) => None,
            Self::Uid { uid, .. } => uid.as_deref().filter(|u| !u.is_empty()),
        }
    }

    /// True for refs that are already a `${...}` template expression.
    pub fn is_template(&self) -> bool {
        self.textual_form().is_some_and(|s| s.starts_with("${"))
    }

    /// True for built-in backends of the form `-- Mixed --`, which are
    /// never rewritten on export.
    pub fn is_builtin(&self) -> bool {
        self.textual_form()
            .is_some_and(|s| s.starts_with("--") && s.ends_with("--"))
    }

    /// A ref is portable if an exported document can carry it unchanged.
    pub fn is_portable(&self) -> bool {
        self.is_template() || self.is_builtin() || self.lookup_key().is_none()
    }

    fn textual_form(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Uid { uid, .. } => uid.as_deref(),
        }
    }
}
