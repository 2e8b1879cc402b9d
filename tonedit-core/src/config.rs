use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::sync::SyncOptions;
use tonedit_types::SynthModel;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default, rename = "Midi")]
    midi: MidiConfig,
    #[serde(default, rename = "Synth")]
    synth: SynthConfig,
    #[serde(default, rename = "Logging")]
    logging: LoggingConfig,
    #[serde(default, rename = "Expert")]
    expert: ExpertConfig,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct MidiConfig {
    in_port: Option<String>,
    out_port: Option<String>,
    channel: Option<u8>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct SynthConfig {
    model: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct LoggingConfig {
    level: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct ExpertConfig {
    send_delay_ms: Option<u64>,
    sync_timeout_ms: Option<u64>,
    resync_delay_ms: Option<u64>,
    ack_timeout_ms: Option<u64>,
    log_sysex: Option<bool>,
}

pub struct Config {
    midi: MidiConfig,
    synth: SynthConfig,
    logging: LoggingConfig,
    expert: ExpertConfig,
}

impl Config {
    /// Embedded defaults merged with the user file, if any.
    pub fn load() -> Self {
        let mut config = Self::embedded();
        if let Some(path) = user_config_path() {
            if path.exists() {
                config.merge_file(&path);
            }
        }
        config
    }

    /// Embedded defaults merged with an explicit file.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Self::embedded();
        config.merge_file(path);
        config
    }

    /// Parse a complete configuration from a string.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(Self::from_file(file))
    }

    fn embedded() -> Self {
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        Self::from_file(base)
    }

    fn from_file(file: ConfigFile) -> Self {
        Config {
            midi: file.midi,
            synth: file.synth,
            logging: file.logging,
            expert: file.expert,
        }
    }

    fn merge_file(&mut self, path: &Path) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                Ok(user) => self.merge(user),
                Err(e) => {
                    log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                }
            },
            Err(e) => {
                log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
            }
        }
    }

    fn merge(&mut self, user: ConfigFile) {
        merge_midi(&mut self.midi, user.midi);
        if user.synth.model.is_some() {
            self.synth.model = user.synth.model;
        }
        if user.logging.level.is_some() {
            self.logging.level = user.logging.level;
        }
        merge_expert(&mut self.expert, user.expert);
    }

    /// Configured input port name; `None` when unset or blank.
    pub fn in_port(&self) -> Option<&str> {
        non_blank(self.midi.in_port.as_deref())
    }

    pub fn out_port(&self) -> Option<&str> {
        non_blank(self.midi.out_port.as_deref())
    }

    /// 0-based MIDI channel (the file stores 1-16).
    pub fn channel(&self) -> u8 {
        self.midi.channel.unwrap_or(1).clamp(1, 16) - 1
    }

    pub fn model(&self) -> SynthModel {
        self.synth
            .model
            .as_deref()
            .and_then(SynthModel::parse)
            .unwrap_or_default()
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.logging
            .level
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(log::LevelFilter::Warn)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.expert.send_delay_ms.unwrap_or(30).min(1000))
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.expert.sync_timeout_ms.unwrap_or(5000).max(100))
    }

    pub fn resync_delay(&self) -> Duration {
        Duration::from_millis(self.expert.resync_delay_ms.unwrap_or(2000))
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.expert.ack_timeout_ms.unwrap_or(4000).max(100))
    }

    pub fn log_sysex(&self) -> bool {
        self.expert.log_sysex.unwrap_or(false)
    }

    /// Orchestrator settings derived from this configuration.
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            model: self.model(),
            channel: self.channel(),
            send_delay: self.send_delay(),
            sync_timeout: self.sync_timeout(),
            resync_delay: self.resync_delay(),
            ack_timeout: self.ack_timeout(),
            log_sysex: self.log_sysex(),
        }
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tonedit").join("config.toml"))
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn merge_midi(base: &mut MidiConfig, user: MidiConfig) {
    if user.in_port.is_some() {
        base.in_port = user.in_port;
    }
    if user.out_port.is_some() {
        base.out_port = user.out_port;
    }
    if user.channel.is_some() {
        base.channel = user.channel;
    }
}

fn merge_expert(base: &mut ExpertConfig, user: ExpertConfig) {
    if user.send_delay_ms.is_some() {
        base.send_delay_ms = user.send_delay_ms;
    }
    if user.sync_timeout_ms.is_some() {
        base.sync_timeout_ms = user.sync_timeout_ms;
    }
    if user.resync_delay_ms.is_some() {
        base.resync_delay_ms = user.resync_delay_ms;
    }
    if user.ack_timeout_ms.is_some() {
        base.ack_timeout_ms = user.ack_timeout_ms;
    }
    if user.log_sysex.is_some() {
        base.log_sysex = user.log_sysex;
    }
}
