use crate::app::LudexError;

/// Three-state value published to observers of an asynchronous load.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn as_success(&self) -> Option<&T> {
        match self {
            Resource::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Resource::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> From<Result<T, LudexError>> for Resource<T> {
    fn from(result: Result<T, LudexError>) -> Self {
        match result {
            Ok(value) => Resource::Success(value),
            Err(e) => Resource::Error(e.to_string()),
        }
    }
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Resource::Loading
    }
}
