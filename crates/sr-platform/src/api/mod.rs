//! API Layer
//!
//! REST API endpoints for the platform.
//! Identity endpoints live under `/identity`, everything else under `/api`.

pub mod common;
pub mod middleware;
pub mod openapi;

pub mod identity;

// Show management
pub mod shows;
pub mod show_holder;
pub mod divisions;
pub mod show_classes;
pub mod entries;
pub mod results;
pub mod user_model_objects;

// Admin APIs
pub mod roles;
pub mod users;

pub use common::*;
pub use middleware::{AppState, Authenticated, OptionalAuth};
pub use openapi::PlatformApiDoc;

pub use identity::{IdentityState, identity_router};

pub use shows::{ShowsState, shows_router};
pub use show_holder::{ShowHolderState, show_holder_router};
pub use divisions::{DivisionsState, divisions_router};
pub use show_classes::{ShowClassesState, show_classes_router};
pub use entries::{EntriesState, entries_router};
pub use results::{ResultsState, results_router};
pub use user_model_objects::{UserModelObjectsState, user_model_objects_router};

pub use roles::{RolesState, roles_router};
pub use users::{UsersState, users_router};
