//! Cached FatSecret access tokens.

pub mod cache;
pub mod record;
pub mod secret;
