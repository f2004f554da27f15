//!
//! # Error-Helper Utilities
//!
//! Shared failure plumbing for the layout tree-walkers
//! (hierarchy flattening, stream export, and the like).
//!
//! ```rust
//! use pic21utils::error::{ErrorHelper, Unwrapper};
//!
//! /// A walker which tags its failures with the cell it was visiting
//! struct Walker {
//!     cell: String,
//! }
//! impl ErrorHelper for Walker {
//!     type Error = String;
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("{} (while visiting `{}`)", msg.into(), self.cell)
//!     }
//! }
//! impl Walker {
//!     fn visit(&self) -> Result<i32, String> {
//!         let width = Some(5).unwrapper(self, "missing width")?;
//!         self.assert(width > 0, "width must be positive")?;
//!         Ok(width)
//!     }
//! }
//! ```
//!

///
/// # ErrorHelper
///
/// Implemented by walkers holding some internal state (e.g. a context stack)
/// worth reporting upon failure, which they inject in the required `err` method.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
}

///
/// # Unwrapper
///
/// Post-fix [ErrorHelper] handling for missing values:
/// `opt.unwrapper(helper, "message")?` fails through `helper`, with its context attached.
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper;
}

impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        match self {
            Some(t) => Ok(t),
            None => helper.fail(msg),
        }
    }
}
