use thiserror::Error;

/// Loading the slide set failed. The previously loaded set stays in place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Repository returned {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Committing an edit failed. The draft is left untouched so the operator can
/// retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("No slot selected for editing")]
    NoSlotSelected,

    #[error("Invalid slot {0} (expected 1-5)")]
    InvalidSlot(u32),

    #[error("Invalid field: {0}")]
    Validation(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Repository returned {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Login returned {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    Poisoned,

    #[error("Failed to create data directory: {0}")]
    Io(#[from] std::io::Error),
}

/// The carousel event loop is gone; commands can no longer be delivered.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Carousel has stopped")]
pub struct CarouselStopped;
