//! Raw JSON shapes emitted by the `gammu-json` helper and their
//! transformation into typed records.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

use super::{
    composite::Message,
    id::{CompositeId, Location},
    segment::Segment,
};

/// One element of the helper's `retrieve` output array.
#[derive(Debug, Deserialize)]
pub(crate) struct RawMessage {
    pub location: u32,
    pub from: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub udh: Option<u32>,
    #[serde(default = "default_part")]
    pub segment: u32,
    #[serde(default = "default_part")]
    pub total_segments: u32,
    pub timestamp: String,
    #[serde(default)]
    pub smsc_timestamp: Option<String>,
}

const fn default_part() -> u32 { 1 }

/// The helper's `delete` output: a per-location verdict map under `detail`.
#[derive(Debug, Deserialize)]
pub(crate) struct DeleteReport {
    pub detail: HashMap<String, String>,
}

/// Failure to turn one raw record into a typed one.
///
/// Transform failures are scoped to the offending record; sibling records in
/// the same `retrieve` batch are unaffected.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransformError {
    /// The record did not match the expected message object shape.
    #[error("malformed message record: {0}")]
    Shape(#[from] serde_json::Error),
    /// A timestamp field could not be parsed.
    #[error("unparseable timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },
}

/// A transformed inbound record, routed by part count.
#[derive(Debug)]
pub(crate) enum Incoming {
    /// Non-concatenated message, deliverable as-is.
    Single(Message),
    /// One part of a concatenated message, bound for reassembly.
    Part(Segment),
}

/// Transform one element of the `retrieve` output into a typed record.
pub(crate) fn transform(record: serde_json::Value) -> Result<Incoming, TransformError> {
    let raw: RawMessage = serde_json::from_value(record)?;
    let timestamp = parse_timestamp(&raw.timestamp)?;
    let smsc_timestamp = raw
        .smsc_timestamp
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;
    let location = Location::new(raw.location);

    if raw.total_segments <= 1 {
        return Ok(Incoming::Single(Message::single(
            location,
            raw.from,
            raw.content,
            timestamp,
            smsc_timestamp,
        )));
    }

    let id = CompositeId::new(raw.from.clone(), raw.udh, raw.total_segments);
    Ok(Incoming::Part(Segment {
        location: Some(location),
        from: raw.from,
        content: raw.content,
        udh: raw.udh,
        sequence: raw.segment,
        total: raw.total_segments,
        timestamp,
        smsc_timestamp,
        id,
    }))
}

/// Parse the helper's wall-clock timestamps.
///
/// `gammu-json` renders instants as `YYYY-MM-DD HH:MM:SS`; the ISO-8601
/// `T`-separated variant and fractional seconds are accepted as well.
pub(crate) fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TransformError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|source| TransformError::Timestamp {
            value: value.to_owned(),
            source,
        })
}
