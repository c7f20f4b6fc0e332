//! Token models, the single-slot token cache, and the clock used to judge expiry.

pub mod clock;
pub mod token;

pub use clock::*;
pub use token::{cache::*, record::*, secret::*};
