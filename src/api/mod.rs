pub mod listener;

pub use listener::{
    create_trigger_channel, EvaluationListener, TriggerAction, TriggerReceiver, TriggerSender,
};
