//! Authentication boundary.
//!
//! Authentication itself is an external collaborator; this module only
//! validates the JWTs it issues (shared HS256 secret) to learn which
//! account is calling. Ownership checks happen per handler.

pub mod jwt;
