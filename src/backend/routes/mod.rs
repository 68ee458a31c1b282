//! Routes grouped by who may call them. Paths are relative to `/api`.

/// Reads and sign-in endpoints open to anonymous visitors.
pub mod public;

/// Endpoints behind the `AuthUser` middleware.
pub mod authenticated;

/// Back-office endpoints. Every handler takes `AdminUser`.
pub mod admin;
