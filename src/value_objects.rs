//! Value objects describing the traced callback graph
//!
//! Two families live here. The *struct values* come from the static
//! architecture model: they name logical entities (callbacks, publishers,
//! node paths) and carry no runtime state. The *bound values* come from the
//! trace session: they pair a logical entity with the runtime handle(s) that
//! represented it while the trace was captured.
//!
//! Handles are opaque integers the traced runtime may reuse for different
//! logical entities over a session's lifetime, so a handle on its own
//! identifies nothing; only membership in an entity's resolved handle set
//! does.

use serde::{Deserialize, Serialize};

/// Opaque runtime identifier for a callback, publisher, or subscription
pub type Handle = u64;

/// Timer callback as declared by the architecture model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerCallbackStruct {
    pub node_name: String,
    pub symbol: String,
    pub period_ns: u64,
    pub publish_topic_names: Option<Vec<String>>,
    pub callback_name: String,
}

/// Subscription callback as declared by the architecture model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCallbackStruct {
    pub node_name: String,
    pub symbol: String,
    pub subscribe_topic_name: String,
    pub publish_topic_names: Option<Vec<String>>,
    pub callback_name: String,
}

/// Either kind of callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackStruct {
    Timer(TimerCallbackStruct),
    Subscription(SubscriptionCallbackStruct),
}

impl CallbackStruct {
    pub fn node_name(&self) -> &str {
        match self {
            CallbackStruct::Timer(cb) => &cb.node_name,
            CallbackStruct::Subscription(cb) => &cb.node_name,
        }
    }

    pub fn callback_name(&self) -> &str {
        match self {
            CallbackStruct::Timer(cb) => &cb.callback_name,
            CallbackStruct::Subscription(cb) => &cb.callback_name,
        }
    }
}

/// Logical publisher; may be instantiated more than once during a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherStruct {
    pub node_name: String,
    pub topic_name: String,
}

/// One publisher-to-subscription edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationStruct {
    pub publisher: PublisherStruct,
    pub subscribe_callback: SubscriptionCallbackStruct,
}

impl CommunicationStruct {
    pub fn topic_name(&self) -> &str {
        &self.publisher.topic_name
    }
}

/// Hand-off of a member variable from one callback to another within a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariablePassingStruct {
    pub callback_write: CallbackStruct,
    pub callback_read: CallbackStruct,
}

/// One step of a node path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hop {
    Callback(CallbackStruct),
    VariablePassing(VariablePassingStruct),
}

/// How messages are correlated across a node path
///
/// `CallbackChain` paths can be resolved hop by hop; the other contexts force
/// the coarser unique-stamp correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageContext {
    CallbackChain,
    InheritUniqueStamp,
    UseLatestMessage,
}

/// Ordered hop sequence of one path through a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePathStruct {
    pub node_name: String,
    pub subscribe_topic_name: Option<String>,
    pub publish_topic_name: Option<String>,
    pub chain: Vec<Hop>,
    pub message_context: MessageContext,
}

impl NodePathStruct {
    /// Callback hops of the chain, in order, skipping variable passings
    pub fn callbacks(&self) -> Vec<&CallbackStruct> {
        self.chain
            .iter()
            .filter_map(|hop| match hop {
                Hop::Callback(cb) => Some(cb),
                Hop::VariablePassing(_) => None,
            })
            .collect()
    }
}

/// Timer callback bound to the handle observed in the trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerCallbackValue {
    pub node_name: String,
    pub callback_name: String,
    pub symbol: String,
    pub period_ns: u64,
    pub callback_object: Handle,
}

/// Subscription callback bound to its trace handles
///
/// The intra-process handle exists only when the subscription was ever taken
/// through the intra-process path; otherwise it is `None` and must stay out
/// of the resolved handle set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCallbackValue {
    pub node_name: String,
    pub callback_name: String,
    pub symbol: String,
    pub subscribe_topic_name: String,
    pub callback_object: Handle,
    pub callback_object_intra: Option<Handle>,
}

/// One runtime instantiation of a logical publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherValue {
    pub node_name: String,
    pub topic_name: String,
    pub publisher_handle: Handle,
}
