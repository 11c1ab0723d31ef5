//! Observability
//!
//! Structured JSON-lines logging of store, catalog and operation events.
//! Logging never fails an operation.
//!
//! ```ignore
//! use assetreg::observability::{log_event_with_fields, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Warn);
//! log_event_with_fields(Event::AssetPut, &[("key", "samplePerson:Maria")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event at its default severity
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log an event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.default_severity(), event.as_str(), fields);
}

/// Log an event with fields at an explicit severity
pub fn log_event_at(event: Event, severity: Severity, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}
