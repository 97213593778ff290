pub mod data_tree;
pub mod event_bus;
pub mod http_client;
pub mod sequencer;
pub mod signals;
pub mod state_store;

pub use data_tree::{lookup_path, DataTree, EntityState, InMemoryDataTree};
pub use event_bus::{create_event_channel, EventReceiver, EventSender, SequencerEvent};
pub use http_client::{HttpClientProvider, HttpPoolConfig};
pub use sequencer::{RequestSequencer, SequencerConfig, SequencerDeps};
pub use signals::ReadinessSignals;
pub use state_store::{InMemoryStateStore, StateStore, StateUpdate};
