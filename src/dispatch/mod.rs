//! Turn dispatch — the decision procedure at the heart of the assistant.

pub mod dispatcher;
pub mod types;

pub use dispatcher::{
    ADDRESS_ENTITY, INTENT_RECALL_ADDRESS, INTENT_REMEMBER_ADDRESS, TurnDispatcher,
};
pub use types::{ResponseKind, TurnResponse};
