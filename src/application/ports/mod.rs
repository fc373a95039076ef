//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_effects;
mod object_store;
mod remote_synthesis;
mod speech_capability;

pub use audio_effects::{AudioEffects, AudioEffectsPort, EffectsError};
pub use object_store::{Collection, ObjectStorePort, RecordStoreExt, StoreError, StoredRecord};
pub use remote_synthesis::{
    RemoteAudio, RemoteError, RemoteSynthesisPort, RemoteSynthesisRequest,
};
pub use speech_capability::{LocalVoice, SpeechCapabilityPort, SpeechError, Utterance};
