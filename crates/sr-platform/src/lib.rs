//! Showring Platform
//!
//! Core platform providing:
//! - Show, division, class, entry and result management
//! - Model horse records owned by competitors
//! - Identity (registration, login, refresh token rotation)
//! - Role-based authorization policies

pub mod domain;
pub mod repository;
pub mod service;
pub mod api;
pub mod error;
pub mod app;

pub use domain::*;
pub use error::PlatformError;
pub use app::Platform;
