//! End-to-end node path reconstruction over an in-memory trace session
//!
//! These tests run the full stack (chain builder, records provider, handle
//! resolver, record tables) against a `StaticEventSource`, the way an
//! embedder would after loading a preprocessed session.

use anyhow::Result;

use restitch::chain::ChainError;
use restitch::column_names;
use restitch::value_objects::{
    CallbackStruct, Hop, MessageContext, NodePathStruct, TimerCallbackStruct, TimerCallbackValue,
    VariablePassingStruct,
};
use restitch::{Record, Records, RecordsProvider, StaticEventSource};

const CB0_OBJECT: u64 = 5;
const CB1_OBJECT: u64 = 8;

fn timer_struct(name: &str) -> CallbackStruct {
    CallbackStruct::Timer(TimerCallbackStruct {
        node_name: "/node".to_string(),
        symbol: "symbol".to_string(),
        period_ns: 10,
        publish_topic_names: None,
        callback_name: name.to_string(),
    })
}

fn timer_value(name: &str, object: u64) -> TimerCallbackValue {
    TimerCallbackValue {
        node_name: "/node".to_string(),
        callback_name: name.to_string(),
        symbol: "symbol".to_string(),
        period_ns: 10,
        callback_object: object,
    }
}

fn callback_row(object: u64, start: u64, end: u64) -> Record {
    Record::from_iter([
        (column_names::CALLBACK_OBJECT, Some(object)),
        (column_names::CALLBACK_START_TIMESTAMP, Some(start)),
        (column_names::CALLBACK_END_TIMESTAMP, Some(end)),
    ])
}

fn callback_columns() -> Vec<String> {
    vec![
        column_names::CALLBACK_OBJECT.to_string(),
        column_names::CALLBACK_START_TIMESTAMP.to_string(),
        column_names::CALLBACK_END_TIMESTAMP.to_string(),
    ]
}

/// Session with two timer callbacks handing a variable from cb0 to cb1
fn chained_session() -> StaticEventSource {
    let mut source = StaticEventSource::new();
    source.timer_callbacks = vec![timer_value("cb0", CB0_OBJECT), timer_value("cb1", CB1_OBJECT)];
    source.callback_records = Records::new(
        vec![
            callback_row(CB0_OBJECT, 0, 1),
            callback_row(CB1_OBJECT, 2, 3),
            callback_row(CB0_OBJECT, 2, 3),
            callback_row(CB1_OBJECT, 4, 5),
        ],
        callback_columns(),
    );
    source.variable_passing_records = Records::new(
        vec![
            Record::from_iter([
                (column_names::CALLBACK_OBJECT_WRITE, Some(CB0_OBJECT)),
                (column_names::CALLBACK_OBJECT_READ, Some(CB1_OBJECT)),
                (column_names::CALLBACK_END_TIMESTAMP, Some(1)),
                (column_names::CALLBACK_START_TIMESTAMP, Some(2)),
            ]),
            Record::from_iter([
                (column_names::CALLBACK_OBJECT_WRITE, Some(CB0_OBJECT)),
                (column_names::CALLBACK_OBJECT_READ, Some(CB1_OBJECT)),
                (column_names::CALLBACK_END_TIMESTAMP, Some(3)),
                (column_names::CALLBACK_START_TIMESTAMP, Some(4)),
            ]),
        ],
        vec![
            column_names::CALLBACK_OBJECT_WRITE.to_string(),
            column_names::CALLBACK_OBJECT_READ.to_string(),
            column_names::CALLBACK_END_TIMESTAMP.to_string(),
            column_names::CALLBACK_START_TIMESTAMP.to_string(),
        ],
    );
    source
}

fn variable_passing() -> VariablePassingStruct {
    VariablePassingStruct {
        callback_write: timer_struct("cb0"),
        callback_read: timer_struct("cb1"),
    }
}

fn path(chain: Vec<Hop>) -> NodePathStruct {
    NodePathStruct {
        node_name: "/node".to_string(),
        subscribe_topic_name: None,
        publish_topic_name: None,
        chain,
        message_context: MessageContext::CallbackChain,
    }
}

#[test]
fn test_single_callback_hop_returns_native_records() -> Result<()> {
    let provider = RecordsProvider::new(chained_session());
    let single = path(vec![Hop::Callback(timer_struct("cb0"))]);

    let records = provider.node_records(&single)?;
    let expect = provider.callback_records(&timer_struct("cb0"))?;
    assert_eq!(records, expect);
    assert_eq!(records.len(), 2);
    // no qualification happened
    assert!(records
        .column_names()
        .iter()
        .all(|c| !c.contains('/')));
    Ok(())
}

#[test]
fn test_single_variable_passing_hop_returns_native_records() -> Result<()> {
    let provider = RecordsProvider::new(chained_session());
    let single = path(vec![Hop::VariablePassing(variable_passing())]);

    let records = provider.node_records(&single)?;
    let expect = provider.variable_passing_records(&variable_passing())?;
    assert_eq!(records, expect);
    assert_eq!(records.len(), 2);
    Ok(())
}

#[test]
fn test_multi_hop_chain_stitches_matching_executions() -> Result<()> {
    let provider = RecordsProvider::new(chained_session());
    let chained = path(vec![
        Hop::Callback(timer_struct("cb0")),
        Hop::VariablePassing(variable_passing()),
        Hop::Callback(timer_struct("cb1")),
    ]);

    let records = provider.node_records(&chained)?;
    assert_eq!(records.len(), 2);

    let stamps: Vec<[Option<u64>; 4]> = records
        .data()
        .iter()
        .map(|row| {
            [
                row.get("cb0/callback_start_timestamp"),
                row.get("cb0/callback_end_timestamp"),
                row.get("cb1/callback_start_timestamp"),
                row.get("cb1/callback_end_timestamp"),
            ]
        })
        .collect();
    assert!(stamps.contains(&[Some(0), Some(1), Some(2), Some(3)]));
    assert!(stamps.contains(&[Some(2), Some(3), Some(4), Some(5)]));

    // every column is hop-qualified in a multi-hop chain
    assert!(records.column_names().iter().all(|c| c.contains('/')));
    Ok(())
}

#[test]
fn test_unsupported_chain_falls_back_to_unique_stamp_correlation() -> Result<()> {
    let mut source = chained_session();
    // no variable passing recorded between the callbacks, but the message
    // stamp survives the hand-off
    source.variable_passing_records = Records::empty();
    source.callback_records = Records::new(
        vec![
            Record::from_iter([
                (column_names::CALLBACK_OBJECT, Some(CB0_OBJECT)),
                (column_names::CALLBACK_START_TIMESTAMP, Some(0)),
                (column_names::CALLBACK_END_TIMESTAMP, Some(1)),
                (column_names::MESSAGE_TIMESTAMP, Some(100)),
            ]),
            Record::from_iter([
                (column_names::CALLBACK_OBJECT, Some(CB1_OBJECT)),
                (column_names::CALLBACK_START_TIMESTAMP, Some(2)),
                (column_names::CALLBACK_END_TIMESTAMP, Some(3)),
                (column_names::MESSAGE_TIMESTAMP, Some(100)),
            ]),
            Record::from_iter([
                (column_names::CALLBACK_OBJECT, Some(CB0_OBJECT)),
                (column_names::CALLBACK_START_TIMESTAMP, Some(4)),
                (column_names::CALLBACK_END_TIMESTAMP, Some(5)),
                (column_names::MESSAGE_TIMESTAMP, Some(101)),
            ]),
            Record::from_iter([
                (column_names::CALLBACK_OBJECT, Some(CB1_OBJECT)),
                (column_names::CALLBACK_START_TIMESTAMP, Some(6)),
                (column_names::CALLBACK_END_TIMESTAMP, Some(7)),
                (column_names::MESSAGE_TIMESTAMP, Some(101)),
            ]),
        ],
        {
            let mut columns = callback_columns();
            columns.push(column_names::MESSAGE_TIMESTAMP.to_string());
            columns
        },
    );
    let provider = RecordsProvider::new(source);

    // adjacent callback hops cannot be chained by the primary strategy
    let adjacent = path(vec![
        Hop::Callback(timer_struct("cb0")),
        Hop::Callback(timer_struct("cb1")),
    ]);

    let records = provider.node_records(&adjacent)?;
    assert_eq!(records.len(), 2);
    for row in records.data() {
        let start = row.get("cb0/callback_start_timestamp").unwrap();
        let end = row.get("cb1/callback_end_timestamp").unwrap();
        assert_eq!(end - start, 3);
        assert!(row.get(column_names::MESSAGE_TIMESTAMP).is_some());
    }
    Ok(())
}

#[test]
fn test_hop_table_missing_junction_column_falls_back() -> Result<()> {
    // callback tables carry the message stamp but no end timestamp, so the
    // qualified hop tables share no junction column with the hand-off table
    let mut source = chained_session();
    source.callback_records = Records::new(
        vec![
            Record::from_iter([
                (column_names::CALLBACK_OBJECT, Some(CB0_OBJECT)),
                (column_names::CALLBACK_START_TIMESTAMP, Some(0)),
                (column_names::MESSAGE_TIMESTAMP, Some(100)),
            ]),
            Record::from_iter([
                (column_names::CALLBACK_OBJECT, Some(CB1_OBJECT)),
                (column_names::CALLBACK_START_TIMESTAMP, Some(2)),
                (column_names::MESSAGE_TIMESTAMP, Some(100)),
            ]),
            Record::from_iter([
                (column_names::CALLBACK_OBJECT, Some(CB0_OBJECT)),
                (column_names::CALLBACK_START_TIMESTAMP, Some(4)),
                (column_names::MESSAGE_TIMESTAMP, Some(101)),
            ]),
            Record::from_iter([
                (column_names::CALLBACK_OBJECT, Some(CB1_OBJECT)),
                (column_names::CALLBACK_START_TIMESTAMP, Some(6)),
                (column_names::MESSAGE_TIMESTAMP, Some(101)),
            ]),
        ],
        vec![
            column_names::CALLBACK_OBJECT.to_string(),
            column_names::CALLBACK_START_TIMESTAMP.to_string(),
            column_names::MESSAGE_TIMESTAMP.to_string(),
        ],
    );
    let provider = RecordsProvider::new(source);

    let chained = path(vec![
        Hop::Callback(timer_struct("cb0")),
        Hop::VariablePassing(variable_passing()),
        Hop::Callback(timer_struct("cb1")),
    ]);

    // the stamp correlation stitches what the callback chain cannot join
    let records = provider.node_records(&chained)?;
    assert_eq!(records.len(), 2);
    let starts: Vec<(Option<u64>, Option<u64>)> = records
        .data()
        .iter()
        .map(|row| {
            (
                row.get("cb0/callback_start_timestamp"),
                row.get("cb1/callback_start_timestamp"),
            )
        })
        .collect();
    assert!(starts.contains(&(Some(0), Some(2))));
    assert!(starts.contains(&(Some(4), Some(6))));
    Ok(())
}

#[test]
fn test_fallback_without_message_stamp_surfaces_unsupported() {
    let provider = RecordsProvider::new(chained_session());
    let adjacent = path(vec![
        Hop::Callback(timer_struct("cb0")),
        Hop::Callback(timer_struct("cb1")),
    ]);

    let err = provider.node_records(&adjacent).unwrap_err();
    assert!(matches!(err, ChainError::Unsupported { .. }));
}

#[test]
fn test_unknown_callback_in_path_is_not_recovered_by_fallback() {
    let provider = RecordsProvider::new(chained_session());
    let unknown = path(vec![Hop::Callback(timer_struct("no_such_callback"))]);

    let err = provider.node_records(&unknown).unwrap_err();
    assert!(matches!(err, ChainError::Resolve(_)));
}
