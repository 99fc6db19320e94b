//! Typed clients for the platform API
//!
//! Each client is a thin wrapper over [`AuthenticatedClient`]; cloning one is
//! cheap and shares the underlying session.

mod divisions;
mod entries;
mod identity;
mod results;
mod roles;
mod show_classes;
mod show_holder;
mod shows;
mod user_model_objects;
mod users;

pub use divisions::DivisionsClient;
pub use entries::EntriesClient;
pub use identity::{IdentityClient, RegisteredUser};
pub use results::ResultsClient;
pub use roles::RolesClient;
pub use show_classes::ShowClassesClient;
pub use show_holder::ShowHolderClient;
pub use shows::ShowsClient;
pub use user_model_objects::UserModelObjectsClient;
pub use users::UsersClient;

/// Percent-encode a value for use as one path segment.
pub(crate) fn segment(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'@' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::segment;

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("rider@showring.test"), "rider@showring.test");
        assert_eq!(segment("Show Holder"), "Show%20Holder");
        assert_eq!(segment("a/b?c#d"), "a%2Fb%3Fc%23d");
    }
}
