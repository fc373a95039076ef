//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod effects;
pub mod remote;
pub mod speech;

pub use effects::*;
pub use remote::*;
pub use speech::*;
