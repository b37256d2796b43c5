//! Observable engine events
//!
//! Events are explicit and typed; each one carries a fixed severity.

use std::fmt;

use super::logger::Severity;

/// Observable events in the schema engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A schema was declared and installed in a registry
    SchemaBuilt,
    /// A concurrently built schema lost the install race and was dropped
    SchemaBuildDiscarded,
    /// An instance forked its private copy of the shared schema
    SchemaForked,
    /// A registry dropped every cached schema
    RegistryCleared,
    /// A fill pass was committed to the instance
    FillCommitted,
    /// A fill pass failed and the instance was left untouched
    FillRolledBack,
    /// A `try_parse` swallowed a recoverable error
    ParseRejected,
}

impl Event {
    /// Returns the event name as written to the log
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaBuilt => "SCHEMA_BUILT",
            Event::SchemaBuildDiscarded => "SCHEMA_BUILD_DISCARDED",
            Event::SchemaForked => "SCHEMA_FORKED",
            Event::RegistryCleared => "REGISTRY_CLEARED",
            Event::FillCommitted => "FILL_COMMITTED",
            Event::FillRolledBack => "FILL_ROLLED_BACK",
            Event::ParseRejected => "PARSE_REJECTED",
        }
    }

    /// Returns the severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SchemaBuilt | Event::RegistryCleared => Severity::Info,
            Event::SchemaBuildDiscarded
            | Event::SchemaForked
            | Event::FillCommitted
            | Event::FillRolledBack
            | Event::ParseRejected => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
