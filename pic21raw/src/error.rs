//!
//! # Layout Result and Error Types
//!

// Local Imports
pub use crate::utils::{self, ErrorContext};

/// # [LayoutError] Result Type
pub type LayoutResult<T> = Result<T, LayoutError>;

///
/// # Layout Error Enumeration
///
pub enum LayoutError {
    /// Invalid generator parameter, e.g. a non-positive width or unknown style.
    /// Names the offending parameter.
    InvalidParameter { param: String, message: String },
    /// Framework-level failure: duplicate port names, missing instances, hierarchy cycles
    Framework {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Error Exporting to Foreign Format
    Export {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Boxed External Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized Error, with String Message
    Str(String),
    /// # [Ptr] Locking
    /// Caused by trouble with a [Ptr]: either deadlock, or panic while holding a lock.
    /// Generally caused by a [std::sync::PoisonError], which is not forwardable due to lifetime constraints.
    ///
    /// [Ptr]: crate::utils::Ptr
    PtrLock,
}
impl LayoutError {
    /// Create a [LayoutError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create an error-variant [Result] of our [LayoutError::Str] variant from anything String-convertible
    pub fn fail<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::msg(s))
    }
    /// Create a [LayoutError::InvalidParameter]
    pub fn param(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
    /// Create a [LayoutError::Framework] with an empty context-stack
    pub fn framework(message: impl Into<String>) -> Self {
        Self::Framework {
            message: message.into(),
            stack: Vec::new(),
        }
    }
    /// Boolean indication of whether this is an [LayoutError::InvalidParameter] naming `param`
    pub fn is_invalid_param(&self, param: &str) -> bool {
        matches!(self, Self::InvalidParameter { param: p, .. } if p == param)
    }
}
impl std::fmt::Debug for LayoutError {
    /// Display a [LayoutError]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LayoutError::InvalidParameter { param, message } => {
                write!(f, "Invalid Parameter `{}`: {}", param, message)
            }
            LayoutError::Framework { message, stack } => {
                write!(f, "Framework Error: \n - {} \n - {:?}", message, stack)
            }
            LayoutError::Export { message, stack } => {
                write!(f, "Export Error: \n - {} \n - {:?}", message, stack)
            }
            LayoutError::Boxed(err) => err.fmt(f),
            LayoutError::Str(err) => err.fmt(f),
            LayoutError::PtrLock => write!(f, "[std::sync::PoisonError]"),
        }
    }
}
impl std::fmt::Display for LayoutError {
    /// Display a [LayoutError]
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Boxed(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<String> for LayoutError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for LayoutError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl From<utils::ser::Error> for LayoutError {
    fn from(e: utils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<gds21::GdsError> for LayoutError {
    fn from(e: gds21::GdsError) -> Self {
        // [gds21::GdsError] may hold non-`Send` boxed errors. Keep its message only.
        Self::Export {
            message: format!("GDSII Error: {}", e),
            stack: Vec::new(),
        }
    }
}
impl<T> From<std::sync::PoisonError<T>> for LayoutError {
    fn from(_e: std::sync::PoisonError<T>) -> Self {
        Self::PtrLock
    }
}
impl<T: std::error::Error + Send + Sync + 'static> From<Box<T>> for LayoutError {
    fn from(e: Box<T>) -> Self {
        Self::Boxed(e)
    }
}
