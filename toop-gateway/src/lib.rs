//! TOOP Gateway - request/reply correlation over the message exchange
//!
//! Outbound lookups are sent fire-and-forget through a [`MessageTransport`]
//! and parked in a [`PendingRequestTable`] until [`InboundHandler`] delivers
//! the matching reply or the deadline passes.

mod activity;
mod correlator;
mod dispatch;
mod eprocurement;
mod inbound;
mod message;
mod pending;
mod transport;

pub use activity::*;
pub use correlator::*;
pub use dispatch::*;
pub use eprocurement::{SAMPLE_DOCUMENT_ID, SAMPLE_LEGAL_PERSON_ID};
pub use inbound::*;
pub use message::*;
pub use pending::*;
pub use transport::*;
