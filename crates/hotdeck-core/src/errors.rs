use thiserror::Error;

/// Result type alias using HotbarError
pub type Result<T> = std::result::Result<T, HotbarError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and reporting at the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// API misuse, e.g. loading a store twice
    Usage,
    /// A schema migration step failed; the whole upgrade was aborted
    Migration,
    /// Malformed input to an operation (empty uid/name, duplicate id)
    Validation,
    /// Slot index outside the hotbar bounds
    Range,
    /// Attempt to remove the only remaining hotbar
    CannotRemoveLast,
    NotFound,
    /// A schema tag or declared version is not a valid semantic version
    InvalidVersion,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Usage => "ERR_USAGE",
            ExErrorKind::Migration => "ERR_MIGRATION",
            ExErrorKind::Validation => "ERR_VALIDATION",
            ExErrorKind::Range => "ERR_RANGE",
            ExErrorKind::CannotRemoveLast => "ERR_CANNOT_REMOVE_LAST",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidVersion => "ERR_INVALID_VERSION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus optional context
/// (operation, store, hotbar) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    store: Option<String>,
    hotbar_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            store: None,
            hotbar_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add store name context
    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// Add hotbar ID context
    pub fn with_hotbar_id(mut self, id: impl Into<String>) -> Self {
        self.hotbar_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn store(&self) -> Option<&str> {
        self.store.as_deref()
    }

    pub fn hotbar_id(&self) -> Option<&str> {
        self.hotbar_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(store) = &self.store {
            write!(f, " (store: {})", store)?;
        }
        if let Some(hotbar_id) = &self.hotbar_id {
            write!(f, " (hotbar_id: {})", hotbar_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for in-memory hotbar operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HotbarError {
    /// Entity reference rejected at insertion time
    #[error("Invalid entity reference: {field} {reason}")]
    InvalidEntityRef { field: String, reason: String },

    /// Slot index is negative, fractional or not below the capacity
    #[error("Slot index {value} is out of range 0..{capacity}")]
    SlotIndexOutOfRange { value: String, capacity: usize },

    /// Restack could not find an empty slot inside the hotbar bounds
    #[error("No empty slot reachable when restacking from {from} to {to}")]
    NoEmptySlot { from: usize, to: usize },

    /// The collection must keep at least one hotbar
    #[error("Cannot remove the last hotbar: {hotbar_id}")]
    CannotRemoveLastHotbar { hotbar_id: String },

    #[error("Hotbar not found: {hotbar_id}")]
    HotbarNotFound { hotbar_id: String },

    #[error("Hotbar already exists: {hotbar_id}")]
    DuplicateHotbarId { hotbar_id: String },

    /// Hotbar names must not be empty or whitespace-only
    #[error("Invalid hotbar name: {reason}")]
    InvalidHotbarName { reason: String },
}

impl HotbarError {
    /// Classify this error in the canonical taxonomy
    pub fn kind(&self) -> ExErrorKind {
        match self {
            HotbarError::InvalidEntityRef { .. }
            | HotbarError::DuplicateHotbarId { .. }
            | HotbarError::InvalidHotbarName { .. } => ExErrorKind::Validation,
            HotbarError::SlotIndexOutOfRange { .. } | HotbarError::NoEmptySlot { .. } => {
                ExErrorKind::Range
            }
            HotbarError::CannotRemoveLastHotbar { .. } => ExErrorKind::CannotRemoveLast,
            HotbarError::HotbarNotFound { .. } => ExErrorKind::NotFound,
        }
    }
}

impl From<HotbarError> for ExError {
    fn from(err: HotbarError) -> Self {
        let ex = ExError::new(err.kind()).with_message(err.to_string());
        match &err {
            HotbarError::CannotRemoveLastHotbar { hotbar_id }
            | HotbarError::HotbarNotFound { hotbar_id }
            | HotbarError::DuplicateHotbarId { hotbar_id } => ex.with_hotbar_id(hotbar_id.clone()),
            _ => ex,
        }
    }
}
