use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

/// Sequencer lifecycle events, delivered over the event channel.
#[derive(Clone, Debug, Serialize)]
pub enum SequencerEvent {
    /// An evaluation cycle started.
    CycleStarted {
        form_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A non-empty evaluator response was published to the store.
    EvaluationPublished {
        form_id: String,
        form_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The dynamic-value fetch cascade started.
    FetchCascadeStarted {
        form_id: String,
        field_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The dynamic-value fetch cascade finished and its merge was published.
    FetchCascadeFinished {
        form_id: String,
        failed_fields: usize,
        timestamp: DateTime<Utc>,
    },

    /// An evaluation cycle completed, cascade included.
    CycleFinished {
        form_id: String,
        timestamp: DateTime<Utc>,
    },

    /// An evaluation cycle failed.
    CycleFailed {
        form_id: String,
        error: String,
        detail: Option<Value>,
        timestamp: DateTime<Utc>,
    },
}

/// 事件发送器
pub type EventSender = mpsc::UnboundedSender<SequencerEvent>;

/// 事件接收器
pub type EventReceiver = mpsc::UnboundedReceiver<SequencerEvent>;

/// 创建事件通道
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
