use thiserror::Error;

/// Command-level failures. None of these corrupt cluster state, and nothing
/// in the simulation is fatal: broken states stay reachable back to healthy
/// via further commands.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists { kind: String, name: String },

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("unknown command verb \"{0}\"")]
    UnknownVerb(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
}

impl SimError {
    pub fn not_found(kind: &str, name: &str) -> Self {
        SimError::NotFound {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }

    pub fn already_exists(kind: &str, name: &str) -> Self {
        SimError::AlreadyExists {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SimError {
    fn from(err: serde_yaml::Error) -> Self {
        SimError::InvalidManifest(err.to_string())
    }
}
