//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so the HTTP layer can
//! serialize/deserialize without depending on entity layouts.

pub mod arc;
pub mod story;
pub mod world;

pub use arc::*;
pub use story::*;
pub use world::*;
