//! Data Models
//!
//! Serializable types shared by services, storage and the binary.

pub mod reservation;
pub mod response;
pub mod settings;

pub use reservation::*;
pub use response::*;
pub use settings::*;
