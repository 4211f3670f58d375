//! Async host for one running level.
//!
//! The runtime owns a [`sim_core::Map`] on a background worker task, advances
//! it on a fixed tick interval, and fans outbound notifications out to
//! subscribers. Consumers build a [`Runtime`], start it, and talk to the
//! level through the cloneable [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder and configuration
//! - [`api`] exposes the handle and error types clients interact with
//! - [`events`] defines what subscribers receive
//! - [`logging`] installs the tracing subscriber for binaries and tests
pub mod api;
pub mod events;
pub mod logging;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{OutboundEvent, Recipient};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
