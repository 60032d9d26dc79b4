/// Resolves the calling identity from request headers
pub mod auth;
/// Maps domain errors to HTTP responses
pub mod error_handling;
