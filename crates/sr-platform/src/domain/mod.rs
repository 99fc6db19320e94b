//! Domain Entities
//!
//! Core domain models for the show platform. Every show-side entity is
//! soft-deletable and carries audit timestamps.

/// Declares a fieldless enum stored and transmitted by variant name.
///
/// Parsing is case-insensitive; unknown names are a validation error.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::PlatformError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        crate::error::PlatformError::validation(format!(
                            "Invalid {}: {}",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }
    };
}

pub mod show;
pub mod division;
pub mod show_class;
pub mod entry;
pub mod result;
pub mod user_model_object;
pub mod user;

pub use show::{Show, ShowStatus, ShowType, ShowFormat};
pub use division::{Division, DivisionType};
pub use show_class::{
    ShowClass, BreedCategory, FinishType, PerformanceType, CollectibilityType,
    Gender, AgeCategory, ColorRestriction, ScaleCategory,
};
pub use entry::{Entry, EntryStatus};
pub use result::ShowResult;
pub use user_model_object::UserModelObject;
pub use user::{ApplicationUser, RefreshToken, Role};

/// Parse an optional variant name, treating blank strings as absent.
pub(crate) fn parse_optional<T>(value: Option<&str>) -> crate::error::Result<Option<T>>
where
    T: std::str::FromStr<Err = crate::error::PlatformError>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some),
        None => Ok(None),
    }
}

/// Parse a variant name, falling back to the default when absent or unknown.
pub(crate) fn parse_or_default<T>(value: Option<&str>) -> T
where
    T: std::str::FromStr + Default,
{
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}
