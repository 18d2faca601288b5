#![doc(html_root_url = "https://docs.rs/smsgate/latest")]
//! SMS gateway core driving a `gammu-json` helper process.
//!
//! A [`Gateway`] polls an attached GSM modem through the helper on a fixed
//! cadence: each cycle retrieves stored messages, flushes owed deletions,
//! and transmits the outbound queue. Multi-part (concatenated) SMS are
//! reassembled across polls, with segment persistence delegated to the
//! embedder or held in a built-in in-memory store. Lifecycle events reach
//! the embedding application through registered handlers.

pub mod config;
pub mod error;
pub mod gateway;
mod hooks;
pub mod message;
mod pipeline;
pub mod reassembly;
pub mod runner;
pub mod store;

pub use config::GatewayConfig;
pub use error::{ErrorScope, GatewayError, HandlerError};
pub use gateway::Gateway;
pub use message::{
    CompositeId, Location, Message, Outbound, Segment, SendCallback, TransmitOutcome,
};
pub use reassembly::{reassemble, PollIndex, ReassemblyError, SlotIndex};
pub use runner::{CommandRunner, GammuRunner, RunnerError};
pub use store::{MemoryStore, Persistence, SegmentStore};
