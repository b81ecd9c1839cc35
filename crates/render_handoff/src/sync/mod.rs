//! Synchronization between the control thread and the render thread
//!
//! - **`frame_state`**: the data both threads share
//! - **`rendezvous`**: the handshake that decides who may touch it

pub mod frame_state;
pub mod rendezvous;

pub use frame_state::SharedFrameState;
pub use rendezvous::{ExclusiveAccess, Handoff, Rendezvous};
