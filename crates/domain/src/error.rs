//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ZoneHubError`] via `#[from]`.

/// Top-level error for zonehub operations.
#[derive(Debug, thiserror::Error)]
pub enum ZoneHubError {
    /// The zone layout or an action registration is invalid.
    #[error("configuration error")]
    Configuration(#[from] ConfigurationError),

    /// A referenced zone, device or item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),
}

/// Fatal, load-time errors. Startup aborts when one is returned.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigurationError {
    /// A name field is empty.
    #[error("name must not be empty")]
    EmptyName,

    /// An action descriptor does not declare any triggering event.
    #[error("action `{action}` does not declare any event")]
    NoEvents { action: &'static str },

    /// A second instance of an action type flagged as unique was registered.
    #[error("action `{action}` allows a single instance, already registered in zone `{zone}`")]
    DuplicateUniqueAction { action: &'static str, zone: String },

    /// The zone name filter of an action is not a valid regular expression.
    #[error("invalid zone name pattern `{pattern}`: {reason}")]
    InvalidZoneNamePattern { pattern: String, reason: String },

    /// A numeric range is empty or inverted.
    #[error("invalid range for `{name}`: min {min} must be lower than max {max}")]
    InvalidRange { name: String, min: f64, max: f64 },

    /// A required constructor parameter is missing or out of bounds.
    #[error("missing or invalid parameter `{0}`")]
    MissingParameter(&'static str),

    /// Two zones share the same name.
    #[error("zone `{0}` is declared twice")]
    DuplicateZone(String),

    /// Two devices of the same zone share the same primary item.
    #[error("item `{item}` is used by more than one device in zone `{zone}`")]
    DuplicateDeviceItem { zone: String, item: String },

    /// A time window could not be parsed.
    #[error("invalid time range `{0}`, expected `HH:MM-HH:MM`")]
    InvalidTimeRange(String),

    /// An action was registered against a zone that does not exist.
    #[error("unknown zone `{0}`")]
    UnknownZone(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
