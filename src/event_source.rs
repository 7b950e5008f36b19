//! Boundary to the trace ingestion backend
//!
//! The backend that parses raw tracer output sits behind the [`EventSource`]
//! trait: it enumerates the runtime-bound entities seen in the session and
//! composes one time-ordered raw table per trace category. Tables are
//! produced fresh per query; caching, if any, is the source's concern.
//!
//! [`StaticEventSource`] is the in-memory implementation used by this crate's
//! tests and by embedders that load a preprocessed session snapshot (the
//! whole struct round-trips through serde).

use serde::{Deserialize, Serialize};

use crate::record::Records;
use crate::value_objects::{PublisherValue, SubscriptionCallbackValue, TimerCallbackValue};

/// Per-category access to a captured trace session
pub trait EventSource {
    /// Timer callbacks observed in the session
    fn timer_callbacks(&self) -> Vec<TimerCallbackValue>;

    /// Subscription callbacks observed in the session
    fn subscription_callbacks(&self) -> Vec<SubscriptionCallbackValue>;

    /// Publisher instantiations observed in the session
    fn publishers(&self) -> Vec<PublisherValue>;

    /// Raw callback execution table (timer and subscription alike),
    /// time-ordered, keyed by the callback object column
    fn compose_callback_records(&self) -> Records;

    /// Raw publish event table, keyed by the publisher handle column
    fn compose_publish_records(&self) -> Records;

    /// Raw inter-process communication table, keyed by publisher handle and
    /// callback object
    fn compose_inter_proc_comm_records(&self) -> Records;

    /// Raw intra-process communication table, keyed by publisher handle and
    /// the intra-process callback object
    fn compose_intra_proc_comm_records(&self) -> Records;

    /// Raw variable-passing table, already correlated write-end to
    /// read-start, keyed by the write/read callback object columns
    fn compose_variable_passing_records(&self) -> Records;

    /// Identifier of the middleware implementation in use
    fn rmw_implementation(&self) -> String;
}

/// In-memory event source over owned tables and bound values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticEventSource {
    pub timer_callbacks: Vec<TimerCallbackValue>,
    pub subscription_callbacks: Vec<SubscriptionCallbackValue>,
    pub publishers: Vec<PublisherValue>,
    pub callback_records: Records,
    pub publish_records: Records,
    pub inter_proc_comm_records: Records,
    pub intra_proc_comm_records: Records,
    pub variable_passing_records: Records,
    pub rmw_implementation: String,
}

impl StaticEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a session snapshot previously serialized with serde_json
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl EventSource for StaticEventSource {
    fn timer_callbacks(&self) -> Vec<TimerCallbackValue> {
        self.timer_callbacks.clone()
    }

    fn subscription_callbacks(&self) -> Vec<SubscriptionCallbackValue> {
        self.subscription_callbacks.clone()
    }

    fn publishers(&self) -> Vec<PublisherValue> {
        self.publishers.clone()
    }

    fn compose_callback_records(&self) -> Records {
        self.callback_records.clone()
    }

    fn compose_publish_records(&self) -> Records {
        self.publish_records.clone()
    }

    fn compose_inter_proc_comm_records(&self) -> Records {
        self.inter_proc_comm_records.clone()
    }

    fn compose_intra_proc_comm_records(&self) -> Records {
        self.intra_proc_comm_records.clone()
    }

    fn compose_variable_passing_records(&self) -> Records {
        self.variable_passing_records.clone()
    }

    fn rmw_implementation(&self) -> String {
        self.rmw_implementation.clone()
    }
}
