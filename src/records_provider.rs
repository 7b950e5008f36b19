//! Per-entity latency records
//!
//! The provider turns raw per-category tables into entity-scoped ones: it
//! resolves an entity's handle set, then keeps only the raw rows whose handle
//! columns are members of that set. Rows carrying a null handle column never
//! match. Tables keep their native column names at this layer; hop
//! qualification happens in the chain builder.

use fnv::FnvHashSet;

use crate::chain::{self, ChainError};
use crate::column_names;
use crate::event_source::EventSource;
use crate::handle_resolver::{HandleResolver, Result as ResolveResult};
use crate::record::{Record, Records};
use crate::value_objects::{
    CallbackStruct, CommunicationStruct, Handle, NodePathStruct, PublisherStruct,
    VariablePassingStruct,
};

/// Entity-scoped record tables over one trace session
pub struct RecordsProvider<S: EventSource> {
    source: S,
}

impl<S: EventSource> RecordsProvider<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Execution records of one callback
    ///
    /// Raw callback rows are shared by every callback in the session; only
    /// rows whose callback object lies in `callback`'s resolved handle set
    /// survive.
    pub fn callback_records(&self, callback: &CallbackStruct) -> ResolveResult<Records> {
        let resolver = HandleResolver::new(&self.source);
        let objects = resolver.callback_objects(callback)?;
        let raw = self.source.compose_callback_records();
        let records = filter_by_handles(&raw, column_names::CALLBACK_OBJECT, &objects);
        tracing::debug!(
            callback = callback.callback_name(),
            rows = records.len(),
            raw_rows = raw.len(),
            "filtered callback records"
        );
        Ok(records)
    }

    /// Publish records of one logical publisher, across all of its runtime
    /// instantiations
    pub fn publish_records(&self, publisher: &PublisherStruct) -> ResolveResult<Records> {
        let resolver = HandleResolver::new(&self.source);
        let handles = resolver.publisher_handles(publisher)?;
        let raw = self.source.compose_publish_records();
        Ok(filter_by_handles(
            &raw,
            column_names::PUBLISHER_HANDLE,
            &handles,
        ))
    }

    /// Records linking a write callback's completion to a read callback's
    /// start
    ///
    /// The event source supplies the hand-off already correlated; this layer
    /// only restricts the table to the given callback pair.
    pub fn variable_passing_records(
        &self,
        variable_passing: &VariablePassingStruct,
    ) -> ResolveResult<Records> {
        let resolver = HandleResolver::new(&self.source);
        let write_objects = resolver.callback_objects(&variable_passing.callback_write)?;
        let read_objects = resolver.callback_objects(&variable_passing.callback_read)?;
        let raw = self.source.compose_variable_passing_records();
        Ok(raw.filter(|row| {
            member(row, column_names::CALLBACK_OBJECT_WRITE, &write_objects)
                && member(row, column_names::CALLBACK_OBJECT_READ, &read_objects)
        }))
    }

    /// Inter-process delivery records of one communication edge
    pub fn inter_proc_comm_records(
        &self,
        communication: &CommunicationStruct,
    ) -> ResolveResult<Records> {
        let resolver = HandleResolver::new(&self.source);
        let publisher_handles = resolver.publisher_handles(&communication.publisher)?;
        let callback_object =
            resolver.subscription_callback_object_inter(&communication.subscribe_callback)?;
        let raw = self.source.compose_inter_proc_comm_records();
        Ok(raw.filter(|row| {
            member(row, column_names::PUBLISHER_HANDLE, &publisher_handles)
                && row.get(column_names::CALLBACK_OBJECT) == Some(callback_object)
        }))
    }

    /// Intra-process delivery records of one communication edge
    ///
    /// Empty when the subscription callback has no intra-process handle; a
    /// null callback object never matches.
    pub fn intra_proc_comm_records(
        &self,
        communication: &CommunicationStruct,
    ) -> ResolveResult<Records> {
        let resolver = HandleResolver::new(&self.source);
        let publisher_handles = resolver.publisher_handles(&communication.publisher)?;
        let callback_object =
            resolver.subscription_callback_object_intra(&communication.subscribe_callback)?;
        let raw = self.source.compose_intra_proc_comm_records();
        Ok(raw.filter(|row| {
            member(row, column_names::PUBLISHER_HANDLE, &publisher_handles)
                && callback_object.is_some()
                && row.get(column_names::CALLBACK_OBJECT) == callback_object
        }))
    }

    /// Whether this communication edge was ever delivered intra-process
    pub fn is_intra_process_communication(
        &self,
        communication: &CommunicationStruct,
    ) -> ResolveResult<bool> {
        Ok(self.intra_proc_comm_records(communication)?.has_data())
    }

    /// End-to-end latency table of one node path
    ///
    /// Runs the callback-chain strategy and, when the chain cannot be
    /// structurally resolved, the coarser unique-stamp correlation.
    pub fn node_records(&self, node_path: &NodePathStruct) -> Result<Records, ChainError> {
        match chain::callback_chain_records(self, node_path) {
            Ok(records) => Ok(records),
            Err(ChainError::Unsupported { reason }) => {
                tracing::debug!(
                    node = %node_path.node_name,
                    %reason,
                    "callback chain unsupported, falling back to unique-stamp correlation"
                );
                chain::inherit_unique_stamp_records(self, node_path)
            }
            Err(err) => Err(err),
        }
    }

    /// Identifier of the middleware implementation in use
    pub fn rmw_implementation(&self) -> String {
        self.source.rmw_implementation()
    }
}

fn filter_by_handles(raw: &Records, column: &str, handles: &FnvHashSet<Handle>) -> Records {
    raw.filter(|row| member(row, column, handles))
}

fn member(row: &Record, column: &str, handles: &FnvHashSet<Handle>) -> bool {
    row.get(column).is_some_and(|handle| handles.contains(&handle))
}
