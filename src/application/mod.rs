//! Application layer - Use cases orchestrating the domain
//!
//! - Ports: traits for the completion endpoint and the stores
//! - Services: story management, snapshot assembly, chapter generation
//! - DTOs: request and response bodies for the HTTP surface

pub mod dto;
pub mod ports;
pub mod services;
