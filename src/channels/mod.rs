//! Inbound channel: where envelopes come from and how they are dispatched.

pub mod dispatcher;
pub mod framing;
pub mod inbound;

pub use dispatcher::{DispatchSettings, handle_envelope, spawn_dispatcher};
pub use framing::take_envelopes;
pub use inbound::{FileSource, InboundSource};
