pub mod masterplan;
pub mod patcher;

pub use masterplan::*;
pub use patcher::PlanPatcher;
