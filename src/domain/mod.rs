//! Domain Layer
//!
//! The vocabulary of a deployment, free of process spawning and network I/O.
//!
//! ## Structure
//!
//! - `value_objects/` - Stage identifiers and probe classifications
//! - `ports/` - Interfaces the infrastructure layer implements (remote session, event sink)

pub mod ports;
pub mod value_objects;
