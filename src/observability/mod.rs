//! Observability for the schema engine
//!
//! Structured JSON logging of schema lifecycle and fill outcomes.
//! Logging is read-only: it never changes what an operation returns.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
