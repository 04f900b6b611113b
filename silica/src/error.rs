use std::fmt;

/// Error produced by an engine while loading a resource for an attribute.
pub type LoadError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AssetKind {
    Image,
    Sound,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => write!(f, "image"),
            AssetKind::Sound => write!(f, "sound"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AttributeError {
    #[error("could not load {kind} \"{path}\": {source}")]
    Asset {
        kind: AssetKind,
        path: String,
        #[source]
        source: LoadError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("control {control}: attribute {key}: {source}")]
    Attribute {
        control: String,
        key: String,
        #[source]
        source: AttributeError,
    },
    #[error("control {control} has no checked texture and no default is configured")]
    MissingCheckedVisual { control: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error(transparent)]
    Yaml(#[from] serde_yml::Error),
    #[error("control definitions must be a mapping of control names")]
    NotAMapping,
    #[error("definition of control {0} must be a mapping of attributes")]
    ControlNotAMapping(String),
}
