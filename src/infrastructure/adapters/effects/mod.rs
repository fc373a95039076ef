//! Effects Adapter - 音效处理实现

mod passthrough;

pub use passthrough::PassthroughEffects;
