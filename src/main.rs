//! VoxLabs - 命令行入口
//!
//! 组装存储、音效、本地语音引擎与远程合成客户端，
//! 并以子命令形式暴露音色管理、合成与键值存储操作。

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use voxlabs::application::ports::SpeechCapabilityPort;
use voxlabs::application::{AudioSource, DispatcherConfig, SynthesisRequest};
use voxlabs::config::{load_config_from_path, print_config, AppConfig};
use voxlabs::domain::voice::VoiceId;
use voxlabs::infrastructure::adapters::{
    CommandSpeechConfig, CommandSpeechEngine, HttpSynthesisClient, HttpSynthesisClientConfig,
    PassthroughEffects,
};
use voxlabs::infrastructure::persistence::{SledObjectStore, SledStoreConfig};
use voxlabs::{KeyValueStore, SynthesisDispatcher, VoiceRegistry};

/// VoxLabs 音色管理与语音合成 CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to voxlabs.toml / voxlabs.local.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone a voice from a reference audio sample
    Clone {
        /// Reference audio file
        #[arg(short, long)]
        audio: PathBuf,

        /// Display name of the voice
        #[arg(short, long)]
        name: String,
    },

    /// List cloned voices
    Voices,

    /// Show details of a cloned voice
    Show {
        /// Voice identifier
        id: String,
    },

    /// Remove a cloned voice
    Remove {
        /// Voice identifier
        id: String,
    },

    /// Synthesize text (local engine first, remote service as fallback)
    Speak {
        /// Text to speak
        text: String,

        /// Voice reference (local voice name or cloned voice id)
        #[arg(short, long)]
        voice: Option<String>,

        #[arg(long)]
        speed: Option<f32>,

        #[arg(long)]
        pitch: Option<f32>,

        #[arg(long)]
        energy: Option<f32>,

        #[arg(long)]
        emotion: Option<String>,

        #[arg(long)]
        language: Option<String>,

        /// Write returned audio bytes to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List voices of the local speech engine
    LocalVoices,

    /// Save a value (JSON, or plain text) under a key
    KvSet { key: String, value: String },

    /// Load the value stored under a key
    KvGet { key: String },

    /// Delete a key
    KvDelete { key: String },

    /// List stored keys
    KvList,

    /// Show store and remote service status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config_from_path(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    print_config(&config);

    let app = App::build(&config)?;
    app.run(cli.command).await
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("warn,voxlabs={}", config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

struct App {
    store: Arc<SledObjectStore>,
    registry: VoiceRegistry,
    entries: KeyValueStore,
    dispatcher: SynthesisDispatcher,
}

impl App {
    fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let store_config = if config.store.temporary {
            SledStoreConfig::temporary()
        } else {
            SledStoreConfig::new(&config.store.path)
        };
        let store = SledObjectStore::new(store_config).arc();
        let effects = Arc::new(PassthroughEffects::new());

        let local: Option<Arc<dyn SpeechCapabilityPort>> = if config.speech.enabled {
            Some(Arc::new(CommandSpeechEngine::new(CommandSpeechConfig {
                program: config.speech.program.clone(),
                default_voice: config.speech.default_voice.clone(),
            })))
        } else {
            None
        };

        let remote = Arc::new(
            HttpSynthesisClient::new(
                HttpSynthesisClientConfig::new(&config.synthesis.api_url)
                    .with_timeout(config.synthesis.timeout_secs),
            )
            .context("Failed to create synthesis client")?,
        );

        let dispatcher = SynthesisDispatcher::new(
            DispatcherConfig {
                offline: config.synthesis.offline,
                default_emotion: config.synthesis.default_emotion.clone(),
                default_language: config.synthesis.default_language.clone(),
            },
            local,
            remote,
            effects.clone(),
        );

        Ok(Self {
            registry: VoiceRegistry::new(store.clone(), effects),
            entries: KeyValueStore::new(store.clone()),
            dispatcher,
            store,
        })
    }

    async fn run(&self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Clone { audio, name } => {
                let sample = tokio::fs::read(&audio)
                    .await
                    .with_context(|| format!("Failed to read {}", audio.display()))?;
                let id = self.registry.clone_voice(sample, &name).await?;
                println!("{}", id);
            }
            Commands::Voices => {
                for voice in self.registry.list().await? {
                    println!(
                        "{}\t{}\t{}",
                        voice.id,
                        voice.name,
                        voice.created_at.to_rfc3339()
                    );
                }
            }
            Commands::Show { id } => {
                let id = VoiceId::parse(id)?;
                let record = self
                    .registry
                    .get(&id)
                    .await?
                    .ok_or_else(|| voxlabs::VoxError::not_found("Voice", id.as_str()))?;
                println!("id:         {}", record.id());
                println!("name:       {}", record.name());
                println!("created_at: {}", record.created_at_iso());
                println!("audio:      {} bytes", record.audio_payload().len());
            }
            Commands::Remove { id } => {
                let id = VoiceId::parse(id)?;
                self.registry.remove(&id).await?;
            }
            Commands::Speak {
                text,
                voice,
                speed,
                pitch,
                energy,
                emotion,
                language,
                output,
            } => {
                let request = SynthesisRequest {
                    text,
                    voice,
                    speed,
                    pitch,
                    energy,
                    emotion,
                    language,
                };
                let handle = self.dispatcher.synthesize(request).await?;
                match handle.source {
                    AudioSource::Spoken => println!("spoken locally ({})", handle.id),
                    AudioSource::Locator(url) => println!("{}", url),
                    AudioSource::Buffer { data, content_type } => match output {
                        Some(path) => {
                            tokio::fs::write(&path, &data)
                                .await
                                .with_context(|| format!("Failed to write {}", path.display()))?;
                            println!("{} ({}, {} bytes)", path.display(), content_type, data.len());
                        }
                        None => println!(
                            "received {} bytes of {}; pass --output to save them",
                            data.len(),
                            content_type
                        ),
                    },
                }
            }
            Commands::LocalVoices => {
                for voice in self.dispatcher.list_available_voices().await {
                    println!(
                        "{}\t{}\t{}",
                        voice.identifier,
                        voice.name,
                        voice.language.unwrap_or_default()
                    );
                }
            }
            Commands::KvSet { key, value } => {
                let data = serde_json::from_str::<serde_json::Value>(&value)
                    .unwrap_or(serde_json::Value::String(value));
                self.entries.save(&key, &data).await?;
            }
            Commands::KvGet { key } => {
                let value: serde_json::Value = self
                    .entries
                    .load(&key)
                    .await?
                    .ok_or_else(|| voxlabs::VoxError::not_found("Entry", key.as_str()))?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            Commands::KvDelete { key } => {
                self.entries.delete(&key).await?;
            }
            Commands::KvList => {
                for key in self.entries.list().await? {
                    println!("{}", key);
                }
            }
            Commands::Status => {
                let handle = self.store.open().await?;
                println!("store schema:  v{}", handle.schema_version());
                println!("store size:    {} bytes", handle.size_on_disk()?);
                println!("voices:        {}", self.registry.list().await?.len());
                println!("entries:       {}", self.entries.list().await?.len());
                println!(
                    "local voices:  {}",
                    self.dispatcher.list_available_voices().await.len()
                );
                println!(
                    "remote:        {}",
                    if self.dispatcher.remote_available().await {
                        "reachable"
                    } else {
                        "unreachable"
                    }
                );
            }
        }
        Ok(())
    }
}
