//! Speech Adapter - 本地语音能力实现

mod command_speech_engine;
mod fake_speech_engine;

pub use command_speech_engine::{CommandSpeechConfig, CommandSpeechEngine};
pub use fake_speech_engine::{FakeSpeechBehavior, FakeSpeechEngine};
