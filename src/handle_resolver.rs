//! Resolution of logical entities to their runtime handle sets
//!
//! The traced runtime reuses handle values, so correlation works by
//! membership: a logical entity resolves to the finite set of handles that
//! ever represented it during the captured session. The resolver recomputes
//! that set per call from the event source's enumerations; entities the
//! session never saw are a configuration error, not "no data".

use fnv::FnvHashSet;
use thiserror::Error;

use crate::event_source::EventSource;
use crate::value_objects::{
    CallbackStruct, Handle, PublisherStruct, SubscriptionCallbackStruct, TimerCallbackStruct,
};

/// Errors for entity resolution against the trace session
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("callback not found in trace session: {node_name}/{callback_name}")]
    CallbackNotFound {
        node_name: String,
        callback_name: String,
    },

    #[error("publisher not found in trace session: {node_name} {topic_name}")]
    PublisherNotFound {
        node_name: String,
        topic_name: String,
    },
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Per-call resolver over an event source's entity enumerations
pub struct HandleResolver<'a, S: EventSource> {
    source: &'a S,
}

impl<'a, S: EventSource> HandleResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// All handles that ever identified `callback`
    ///
    /// A timer callback has exactly one; a subscription callback has its
    /// inter-process handle and, when present, its intra-process handle. An
    /// absent intra handle is omitted, never included as a null entry.
    pub fn callback_objects(&self, callback: &CallbackStruct) -> Result<FnvHashSet<Handle>> {
        match callback {
            CallbackStruct::Timer(cb) => {
                Ok(FnvHashSet::from_iter([self.timer_callback_object(cb)?]))
            }
            CallbackStruct::Subscription(cb) => {
                let mut objects = FnvHashSet::default();
                objects.insert(self.subscription_callback_object_inter(cb)?);
                if let Some(intra) = self.subscription_callback_object_intra(cb)? {
                    objects.insert(intra);
                }
                Ok(objects)
            }
        }
    }

    /// The single handle of a timer callback
    pub fn timer_callback_object(&self, callback: &TimerCallbackStruct) -> Result<Handle> {
        self.source
            .timer_callbacks()
            .iter()
            .find(|value| {
                value.node_name == callback.node_name
                    && value.callback_name == callback.callback_name
            })
            .map(|value| value.callback_object)
            .ok_or_else(|| ResolveError::CallbackNotFound {
                node_name: callback.node_name.clone(),
                callback_name: callback.callback_name.clone(),
            })
    }

    /// The inter-process handle of a subscription callback
    pub fn subscription_callback_object_inter(
        &self,
        callback: &SubscriptionCallbackStruct,
    ) -> Result<Handle> {
        self.find_subscription(callback)
            .map(|value| value.callback_object)
    }

    /// The intra-process handle of a subscription callback, when it has one
    pub fn subscription_callback_object_intra(
        &self,
        callback: &SubscriptionCallbackStruct,
    ) -> Result<Option<Handle>> {
        self.find_subscription(callback)
            .map(|value| value.callback_object_intra)
    }

    /// Handles of every runtime instantiation of `publisher`
    pub fn publisher_handles(&self, publisher: &PublisherStruct) -> Result<FnvHashSet<Handle>> {
        let handles: FnvHashSet<Handle> = self
            .source
            .publishers()
            .iter()
            .filter(|value| {
                value.node_name == publisher.node_name && value.topic_name == publisher.topic_name
            })
            .map(|value| value.publisher_handle)
            .collect();
        if handles.is_empty() {
            return Err(ResolveError::PublisherNotFound {
                node_name: publisher.node_name.clone(),
                topic_name: publisher.topic_name.clone(),
            });
        }
        Ok(handles)
    }

    fn find_subscription(
        &self,
        callback: &SubscriptionCallbackStruct,
    ) -> Result<crate::value_objects::SubscriptionCallbackValue> {
        self.source
            .subscription_callbacks()
            .into_iter()
            .find(|value| {
                value.node_name == callback.node_name
                    && value.callback_name == callback.callback_name
            })
            .ok_or_else(|| ResolveError::CallbackNotFound {
                node_name: callback.node_name.clone(),
                callback_name: callback.callback_name.clone(),
            })
    }
}
