//! Remote Adapter - 远程合成客户端实现

mod fake_synthesis_client;
mod http_synthesis_client;

pub use fake_synthesis_client::{FakeRemoteBehavior, FakeSynthesisClient};
pub use http_synthesis_client::*;
