//! Notifications from the orchestrator to the presentation layer.

use std::time::Duration;

/// How long a status message stays up unless the caller says otherwise.
pub const STATUS_DURATION: Duration = Duration::from_secs(3);

/// Who caused a model change. Front ends use this to avoid echoing
/// device-originated selections back to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    Device,
    User,
}

/// Parameter panel that needs redrawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Main,
    Advanced,
    Dsp(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToneEvent {
    Status { text: String, duration: Duration },
    Error(String),
    /// Raw traffic, only emitted when sysex logging is enabled.
    Log(String),
    ToneNameChanged(String),
    ParameterPanelDirty(Panel),
    /// Every request of the last synchronize has been answered.
    FullSyncComplete,
    /// The synchronize watcher gave up with requests still unanswered.
    SyncIncomplete { pending: usize },
    InstrumentSelected { id: Option<u16>, source: UpdateSource },
    DspModuleSelected { block: u8, module: Option<u8>, source: UpdateSource },
    BulkDownloaded { slot: u16, data: Vec<u8> },
    BulkUploaded { slot: u16 },
}

impl ToneEvent {
    pub fn status(text: impl Into<String>) -> Self {
        ToneEvent::Status {
            text: text.into(),
            duration: STATUS_DURATION,
        }
    }
}
