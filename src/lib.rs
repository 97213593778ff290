//! # Formflow — Form Evaluation Sequencing Engine
//!
//! `formflow` serializes form evaluation requests for a low-code application
//! builder and resolves dynamically-computed field values (dropdown options,
//! trigger values) from a backend plugin API. It provides:
//!
//! - **Request sequencing**: at most one evaluation cycle in flight at a
//!   time; requests submitted meanwhile are queued and replayed in strict
//!   arrival order. The unit of serialization is one request plus all of its
//!   cascading dynamic-value fetches.
//! - **Dynamic value resolution**: fields flagged as fetchable are resolved
//!   one at a time against the plugin API, with parameter values remapped
//!   from `{{...}}` binding expressions into the entity's evaluated
//!   configuration tree.
//! - **Trigger listening**: a fault-tolerant listener gated on a one-time
//!   start signal, dispatching evaluation triggers fire-and-forget.
//! - **Host seams**: the evaluation function, state container, reactive data
//!   tree, plugin API, and error sink are all traits the host implements;
//!   in-memory reference implementations ship for embedding and tests.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use formflow::{
//!     DynamicValueFetcher, EvaluationListener, HttpPluginApi, HttpPoolConfig,
//!     InMemoryDataTree, InMemoryStateStore, ReadinessSignals, RequestSequencer,
//!     SequencerConfig, SequencerDeps, TracingReporter, TriggerAction,
//! };
//!
//! # fn evaluator() -> Arc<dyn formflow::Evaluator> { unimplemented!() }
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(InMemoryStateStore::new());
//!     let tree = Arc::new(InMemoryDataTree::new());
//!     let api = Arc::new(
//!         HttpPluginApi::new("https://host/api", HttpPoolConfig::default()).unwrap(),
//!     );
//!     let fetcher = Arc::new(DynamicValueFetcher::new(api, tree, store.clone()));
//!
//!     let sequencer = Arc::new(RequestSequencer::spawn(
//!         SequencerDeps {
//!             evaluator: evaluator(),
//!             store,
//!             fetcher,
//!             signals: Arc::new(ReadinessSignals::new()),
//!             reporter: Arc::new(TracingReporter),
//!             events: None,
//!         },
//!         SequencerConfig::default(),
//!     ));
//!
//!     let (triggers, rx) = formflow::create_trigger_channel();
//!     let listener = EvaluationListener::new(rx, sequencer, Arc::new(TracingReporter));
//!     tokio::spawn(listener.run());
//!
//!     triggers.send(TriggerAction::Start).unwrap();
//! }
//! ```

pub mod api;
pub mod core;
pub mod error;
pub mod evaluation;
pub mod fetch;

pub use crate::api::listener::{
    create_trigger_channel, EvaluationListener, TriggerAction, TriggerReceiver, TriggerSender,
};
pub use crate::core::data_tree::{lookup_path, DataTree, EntityState, InMemoryDataTree};
pub use crate::core::event_bus::{
    create_event_channel, EventReceiver, EventSender, SequencerEvent,
};
pub use crate::core::http_client::{HttpClientProvider, HttpPoolConfig};
pub use crate::core::sequencer::{RequestSequencer, SequencerConfig, SequencerDeps};
pub use crate::core::signals::ReadinessSignals;
pub use crate::core::state_store::{InMemoryStateStore, StateStore, StateUpdate};
pub use crate::error::{ErrorReporter, EvaluationError, FetchError, SubmitError, TracingReporter};
pub use crate::evaluation::evaluator::Evaluator;
pub use crate::evaluation::schema::{
    ConditionalOutput, DynamicValues, DynamicValuesConfig, EvaluationOutput, EvaluationRequest,
    FormEvaluationState,
};
pub use crate::fetch::{
    DynamicValueFetcher, HttpPluginApi, PluginApi, TriggerRequest, TriggerResponse,
};
