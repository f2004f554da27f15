//!
//! # Enum-String Mapping Module
//!
//! Defines the [enumstr] macro and paired [EnumStr] trait,
//! for enums whose variants are selected by keyword strings,
//! such as heater styles given as `"snake"` or `"split"` in configuration files.
//!
//! ```rust
//! use pic21utils::{enumstr, EnumStr};
//!
//! enumstr!(
//!     /// # Port Facing
//!     Facing {
//!         In: "in",
//!         Out: "out",
//!     }
//! );
//! assert_eq!(Facing::from_str("out"), Some(Facing::Out));
//! assert_eq!(Facing::In.to_str(), "in");
//! ```
//!

///
/// # String-Enumeration Trait
///
/// * `to_str` converts a variant to its keyword.
/// * `from_str` does the opposite, returning [None] for unrecognized keywords.
/// * `keywords` lists every recognized keyword, for error messages.
///
pub trait EnumStr: std::marker::Sized {
    fn to_str(&self) -> &'static str;
    fn from_str(txt: &str) -> Option<Self>;
    fn keywords() -> &'static [&'static str];
}

///
/// # Enum-String Pairing Macro
///
/// Creates a fieldless `enum` which:
/// * Implements [EnumStr] for conversions to and from its keywords
/// * Implements [std::fmt::Display], writing its keyword
/// * Derives `serde::{Serialize, Deserialize}`, (de)serializing as its keyword
///
/// The invoking crate must depend on `serde`.
///
#[macro_export]
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: literal ),* $(,)?
    }) => {
        $(#[$meta])*
        #[allow(dead_code)]
        #[derive(Clone, Copy, Debug, ::serde::Deserialize, ::serde::Serialize, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $( #[doc=$strval]
               #[serde(rename = $strval)]
                $variant ),*
        }
        impl $crate::EnumStr for $enum_name {
            /// Convert a variant to its paired (static) keyword.
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval),*,
                }
            }
            /// Create from a keyword. Comparison is case *sensitive*.
            fn from_str(txt: &str) -> Option<Self> {
                match txt {
                    $( $strval => Some(Self::$variant)),*,
                    _ => None,
                }
            }
            fn keywords() -> &'static [&'static str] {
                &[$( $strval ),*]
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", $crate::EnumStr::to_str(self))
            }
        }
    }
}
