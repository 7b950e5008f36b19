//! Chain stitching: per-hop tables into one end-to-end latency table
//!
//! The primary strategy walks a node path's hop sequence, qualifies each
//! hop's column names so hop-local columns never collide, and folds the hop
//! tables left to right with equi-joins. The column qualifier is the owning
//! callback's name; a variable-passing hop qualifies its write-end column
//! with the write callback's name and its read-start column with the read
//! callback's name, so adjacent hop tables share exactly one junction column.
//!
//! Paths the primary strategy cannot structurally resolve report
//! [`ChainError::Unsupported`]; the provider then retries with the fallback
//! here, which correlates callback hops on the per-message stamp carried
//! unchanged along the path instead of each hop's own timestamps.

use thiserror::Error;

use crate::column_names;
use crate::event_source::EventSource;
use crate::handle_resolver::ResolveError;
use crate::record::{Records, RecordsError};
use crate::records_provider::RecordsProvider;
use crate::value_objects::{CallbackStruct, Hop, MessageContext, NodePathStruct};

/// Errors for end-to-end chain construction
#[derive(Error, Debug)]
pub enum ChainError {
    /// The hop sequence or the per-hop tables lack the structure the
    /// callback-chain strategy needs; recoverable by the unique-stamp
    /// fallback
    #[error("unsupported callback chain: {reason}")]
    Unsupported { reason: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Records(#[from] RecordsError),
}

pub type Result<T> = std::result::Result<T, ChainError>;

fn unsupported(reason: impl Into<String>) -> ChainError {
    ChainError::Unsupported {
        reason: reason.into(),
    }
}

/// Primary strategy: qualified per-hop tables folded with equi-joins
///
/// A single-hop path returns the hop's native table unmodified. Multi-hop
/// paths qualify every column of every hop table before joining.
pub fn callback_chain_records<S: EventSource>(
    provider: &RecordsProvider<S>,
    path: &NodePathStruct,
) -> Result<Records> {
    validate_chain(path)?;

    if path.chain.len() == 1 {
        return hop_records(provider, &path.chain[0]);
    }

    let mut accumulated = qualified_hop_records(provider, &path.chain[0])?;
    for hop in &path.chain[1..] {
        let next = qualified_hop_records(provider, hop)?;
        // A hop table missing its junction column (e.g. a callback table
        // without an end timestamp) is a structural prerequisite failure of
        // this strategy, not an invariant violation: report it as
        // unsupported so the caller can fall back.
        accumulated = accumulated.join(&next).map_err(|err| match err {
            RecordsError::NoSharedColumn { left, right } => unsupported(format!(
                "hop tables share no junction column to join on \
                 (accumulated: {left:?}, next hop: {right:?})"
            )),
        })?;
    }
    Ok(accumulated)
}

/// Fallback strategy: callback hops correlated on the propagated message
/// stamp
///
/// Variable-passing hops carry no message stamp and are skipped; the result
/// attributes latency only to the callback hops. Every callback hop's table
/// must carry the message timestamp column.
pub fn inherit_unique_stamp_records<S: EventSource>(
    provider: &RecordsProvider<S>,
    path: &NodePathStruct,
) -> Result<Records> {
    let callbacks = path.callbacks();
    if callbacks.is_empty() {
        return Err(unsupported("path has no callback hop to correlate"));
    }

    let mut tables = Vec::with_capacity(callbacks.len());
    for callback in &callbacks {
        let records = provider.callback_records(callback)?;
        if !records
            .column_names()
            .iter()
            .any(|c| c == column_names::MESSAGE_TIMESTAMP)
        {
            return Err(unsupported(format!(
                "callback {} carries no {} column",
                callback.callback_name(),
                column_names::MESSAGE_TIMESTAMP
            )));
        }
        tables.push(qualify_except_stamp(&records, callback));
    }

    let mut iter = tables.into_iter();
    let mut accumulated = iter.next().unwrap_or_default();
    for next in iter {
        accumulated = accumulated.join(&next)?;
    }
    Ok(accumulated)
}

/// The chain must be a non-empty alternation of callbacks and variable
/// passings whose write/read endpoints agree with their neighbors, under a
/// callback-chain message context.
fn validate_chain(path: &NodePathStruct) -> Result<()> {
    if path.message_context != MessageContext::CallbackChain {
        return Err(unsupported(format!(
            "message context {:?} does not describe a callback chain",
            path.message_context
        )));
    }
    if path.chain.is_empty() {
        return Err(unsupported("path has an empty hop sequence"));
    }

    for pair in path.chain.windows(2) {
        match (&pair[0], &pair[1]) {
            (Hop::Callback(upstream), Hop::VariablePassing(vp)) => {
                if vp.callback_write.callback_name() != upstream.callback_name() {
                    return Err(unsupported(format!(
                        "variable passing writes from {} but follows {}",
                        vp.callback_write.callback_name(),
                        upstream.callback_name()
                    )));
                }
            }
            (Hop::VariablePassing(vp), Hop::Callback(downstream)) => {
                if vp.callback_read.callback_name() != downstream.callback_name() {
                    return Err(unsupported(format!(
                        "variable passing reads into {} but precedes {}",
                        vp.callback_read.callback_name(),
                        downstream.callback_name()
                    )));
                }
            }
            (Hop::Callback(_), Hop::Callback(_)) => {
                return Err(unsupported(
                    "adjacent callback hops without a variable passing between them",
                ));
            }
            (Hop::VariablePassing(_), Hop::VariablePassing(_)) => {
                return Err(unsupported("adjacent variable-passing hops"));
            }
        }
    }
    Ok(())
}

fn hop_records<S: EventSource>(provider: &RecordsProvider<S>, hop: &Hop) -> Result<Records> {
    match hop {
        Hop::Callback(cb) => Ok(provider.callback_records(cb)?),
        Hop::VariablePassing(vp) => Ok(provider.variable_passing_records(vp)?),
    }
}

fn qualified_hop_records<S: EventSource>(
    provider: &RecordsProvider<S>,
    hop: &Hop,
) -> Result<Records> {
    let records = hop_records(provider, hop)?;
    Ok(qualify(&records, hop))
}

/// Prefix every column with its hop qualifier
///
/// Callback hops qualify all columns with the callback name. Variable
/// passings split the junction columns between their endpoints and qualify
/// everything else with the `<write>-<read>` pair, which is deterministic and
/// cannot collide with a callback name qualifier.
fn qualify(records: &Records, hop: &Hop) -> Records {
    match hop {
        Hop::Callback(cb) => {
            let name = cb.callback_name();
            records.map_columns(|column| format!("{name}/{column}"))
        }
        Hop::VariablePassing(vp) => {
            let write = vp.callback_write.callback_name();
            let read = vp.callback_read.callback_name();
            records.map_columns(|column| match column {
                column_names::CALLBACK_END_TIMESTAMP => format!("{write}/{column}"),
                column_names::CALLBACK_START_TIMESTAMP => format!("{read}/{column}"),
                _ => format!("{write}-{read}/{column}"),
            })
        }
    }
}

/// Qualify a callback hop's columns, leaving the shared message stamp as the
/// junction column
fn qualify_except_stamp(records: &Records, callback: &CallbackStruct) -> Records {
    let name = callback.callback_name();
    records.map_columns(|column| {
        if column == column_names::MESSAGE_TIMESTAMP {
            column.to_string()
        } else {
            format!("{name}/{column}")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::value_objects::{TimerCallbackStruct, VariablePassingStruct};

    fn timer(name: &str) -> CallbackStruct {
        CallbackStruct::Timer(TimerCallbackStruct {
            node_name: "/node".to_string(),
            symbol: "symbol".to_string(),
            period_ns: 10,
            publish_topic_names: None,
            callback_name: name.to_string(),
        })
    }

    fn path(chain: Vec<Hop>, context: MessageContext) -> NodePathStruct {
        NodePathStruct {
            node_name: "/node".to_string(),
            subscribe_topic_name: None,
            publish_topic_name: None,
            chain,
            message_context: context,
        }
    }

    #[test]
    fn test_validate_rejects_non_chain_context() {
        let p = path(
            vec![Hop::Callback(timer("cb0"))],
            MessageContext::InheritUniqueStamp,
        );
        assert!(matches!(
            validate_chain(&p).unwrap_err(),
            ChainError::Unsupported { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_empty_and_non_alternating_chains() {
        let empty = path(vec![], MessageContext::CallbackChain);
        assert!(validate_chain(&empty).is_err());

        let adjacent = path(
            vec![Hop::Callback(timer("cb0")), Hop::Callback(timer("cb1"))],
            MessageContext::CallbackChain,
        );
        assert!(validate_chain(&adjacent).is_err());
    }

    #[test]
    fn test_validate_rejects_mismatched_variable_passing_endpoints() {
        let p = path(
            vec![
                Hop::Callback(timer("cb0")),
                Hop::VariablePassing(VariablePassingStruct {
                    callback_write: timer("cb9"),
                    callback_read: timer("cb1"),
                }),
                Hop::Callback(timer("cb1")),
            ],
            MessageContext::CallbackChain,
        );
        assert!(matches!(
            validate_chain(&p).unwrap_err(),
            ChainError::Unsupported { .. }
        ));
    }

    #[test]
    fn test_qualify_callback_hop_prefixes_every_column() {
        let records = Records::new(
            vec![Record::from_iter([
                (column_names::CALLBACK_START_TIMESTAMP, Some(0)),
                (column_names::CALLBACK_END_TIMESTAMP, Some(1)),
            ])],
            vec![
                column_names::CALLBACK_START_TIMESTAMP.to_string(),
                column_names::CALLBACK_END_TIMESTAMP.to_string(),
            ],
        );
        let qualified = qualify(&records, &Hop::Callback(timer("cb0")));
        assert_eq!(
            qualified.column_names(),
            &[
                "cb0/callback_start_timestamp",
                "cb0/callback_end_timestamp",
            ]
        );
    }

    #[test]
    fn test_qualify_variable_passing_splits_junction_columns() {
        let records = Records::new(
            vec![],
            vec![
                column_names::CALLBACK_END_TIMESTAMP.to_string(),
                column_names::CALLBACK_START_TIMESTAMP.to_string(),
                column_names::CALLBACK_OBJECT_WRITE.to_string(),
            ],
        );
        let hop = Hop::VariablePassing(VariablePassingStruct {
            callback_write: timer("cb0"),
            callback_read: timer("cb1"),
        });
        let qualified = qualify(&records, &hop);
        assert_eq!(
            qualified.column_names(),
            &[
                "cb0/callback_end_timestamp",
                "cb1/callback_start_timestamp",
                "cb0-cb1/callback_object_write",
            ]
        );
    }
}
