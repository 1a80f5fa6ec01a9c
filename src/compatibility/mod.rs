pub mod config;
pub mod harmony;
pub mod mashability;
pub mod result;
pub mod scoring;
pub mod tempo;


pub use config::*;
pub use result::*;
pub use scoring::CompatibilityScoring;
