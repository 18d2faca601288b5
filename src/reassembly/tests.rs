use chrono::{NaiveDate, NaiveDateTime};
use rstest::rstest;

use super::*;
use crate::message::{CompositeId, Location, Segment};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, day)
        .expect("valid date")
        .and_hms_opt(hour, 0, 0)
        .expect("valid time")
}

fn group(total: u32) -> CompositeId { CompositeId::new("+15551234", Some(7), total) }

fn segment(sequence: u32, total: u32, content: &str, timestamp: NaiveDateTime) -> Segment {
    Segment {
        location: Some(Location::new(10 + sequence)),
        from: "+15551234".into(),
        content: content.into(),
        udh: Some(7),
        sequence,
        total,
        timestamp,
        smsc_timestamp: None,
        id: group(total),
    }
}

#[test]
fn incomplete_group_returns_none() {
    let trigger = segment(1, 3, "a", at(1, 9));
    let result = reassemble(&trigger, &[]).expect("no structural error");
    assert!(result.is_none());
}

#[test]
fn complete_group_concatenates_in_slot_order() {
    let first = segment(1, 2, "Hello ", at(1, 9));
    let second = segment(2, 2, "world", at(1, 10));

    let message = reassemble(&second, &[first.clone()])
        .expect("no structural error")
        .expect("group is complete");

    assert_eq!(message.content, "Hello world");
    assert_eq!(
        message.locations,
        vec![Location::new(11), Location::new(12)]
    );
    assert_eq!(message.parts, vec![first, second]);
    assert_eq!(message.timestamp, at(1, 10));
    assert_eq!(message.id, Some(group(2)));
}

#[rstest]
#[case(&[1, 2, 3])]
#[case(&[3, 1, 2])]
#[case(&[2, 3, 1])]
fn composite_is_order_independent(#[case] order: &[u32]) {
    let parts: Vec<_> = order
        .iter()
        .map(|&sequence| segment(sequence, 3, &format!("p{sequence}"), at(1, sequence)))
        .collect();
    let (trigger, peers) = parts.split_last().expect("three parts");

    let message = reassemble(trigger, peers)
        .expect("no structural error")
        .expect("group is complete");

    assert_eq!(message.content, "p1p2p3");
    assert_eq!(
        message.locations,
        vec![Location::new(11), Location::new(12), Location::new(13)]
    );
}

#[test]
fn newer_duplicate_wins_its_slot() {
    let stale = segment(1, 2, "old", at(1, 9));
    let fresh = segment(1, 2, "new", at(2, 9));
    let second = segment(2, 2, "!", at(1, 9));

    let message = reassemble(&second, &[fresh.clone(), stale])
        .expect("no structural error")
        .expect("group is complete");

    assert_eq!(message.content, "new!");
    assert_eq!(message.parts[0], fresh);
    assert!(message.timestamp >= at(2, 9));
}

#[test]
fn trigger_wins_timestamp_ties() {
    let peer = segment(1, 2, "peer copy", at(1, 9));
    let mut trigger = segment(1, 2, "trigger copy", at(1, 9));
    trigger.location = Some(Location::new(40));

    let mut slots = SlotIndex::new(group(2), 2);
    assert!(slots.insert(&peer));
    assert!(slots.insert(&trigger));
    assert!(slots.insert(&segment(2, 2, "", at(1, 9))));

    let message = slots.into_message().expect("complete group");
    assert_eq!(message.parts[0].content, "trigger copy");
}

#[test]
fn stale_duplicate_leaves_slot_unchanged() {
    let fresh = segment(1, 2, "new", at(2, 9));
    let stale = segment(1, 2, "old", at(1, 9));

    let mut slots = SlotIndex::new(group(2), 2);
    assert!(slots.insert(&fresh));
    // Accepted, but must not displace the newer occupant.
    assert!(slots.insert(&stale));
    assert_eq!(slots.len(), 1);
    assert!(slots.insert(&segment(2, 2, "", at(1, 9))));
    let message = slots.into_message().expect("complete group");
    assert_eq!(message.parts[0].content, "new");
}

#[test]
fn foreign_and_out_of_range_peers_are_rejected() {
    let mut slots = SlotIndex::new(group(2), 2);

    let mut foreign = segment(1, 2, "x", at(1, 9));
    foreign.id = CompositeId::new("+15559999", Some(7), 2);
    assert!(!slots.insert(&foreign));

    let wrong_total = segment(1, 3, "x", at(1, 9));
    assert!(!slots.insert(&wrong_total));

    let mut out_of_range = segment(1, 2, "x", at(1, 9));
    out_of_range.sequence = 3;
    assert!(!slots.insert(&out_of_range));

    let mut zero = segment(1, 2, "x", at(1, 9));
    zero.sequence = 0;
    assert!(!slots.insert(&zero));

    assert!(slots.is_empty());
}

#[test]
fn inconsistent_peers_do_not_block_the_group() {
    let first = segment(1, 2, "Hello ", at(1, 9));
    let mut foreign = segment(2, 2, "ignored", at(1, 9));
    foreign.id = CompositeId::new("+15559999", Some(9), 2);
    let trigger = segment(2, 2, "world", at(1, 9));

    let message = reassemble(&trigger, &[first, foreign])
        .expect("no structural error")
        .expect("group is complete");
    assert_eq!(message.content, "Hello world");
}

#[test]
fn missing_first_slot_fails_materialization() {
    let mut slots = SlotIndex::new(group(2), 2);
    assert!(slots.insert(&segment(2, 2, "world", at(1, 9))));
    let err = slots.into_message().expect_err("slot 1 is missing");
    assert!(matches!(err, ReassemblyError::MissingFirstSegment { .. }));
}

#[test]
fn missing_later_slot_fails_materialization() {
    let mut slots = SlotIndex::new(group(3), 3);
    assert!(slots.insert(&segment(1, 3, "a", at(1, 9))));
    assert!(slots.insert(&segment(3, 3, "c", at(1, 9))));
    let err = slots.into_message().expect_err("slot 2 is missing");
    assert_eq!(
        err,
        ReassemblyError::MissingSegment {
            id: group(3),
            sequence: 2,
        }
    );
}

#[test]
fn smsc_timestamp_takes_the_latest_present_value() {
    let mut first = segment(1, 2, "a", at(1, 9));
    first.smsc_timestamp = Some(at(1, 11));
    let mut second = segment(2, 2, "b", at(1, 9));
    second.smsc_timestamp = Some(at(2, 8));

    let message = reassemble(&second, &[first])
        .expect("no structural error")
        .expect("group is complete");
    assert_eq!(message.smsc_timestamp, Some(at(2, 8)));
}

#[test]
fn cleared_locations_are_absent_from_the_composite() {
    let mut first = segment(1, 2, "a", at(1, 9));
    first.location = None;
    let second = segment(2, 2, "b", at(1, 9));

    let message = reassemble(&second, &[first])
        .expect("no structural error")
        .expect("group is complete");
    assert_eq!(message.locations, vec![Location::new(12)]);
}

#[test]
fn poll_index_covers_recorded_groups() {
    let first = segment(1, 2, "a", at(1, 9));
    let second = segment(2, 2, "b", at(1, 9));
    let message = reassemble(&second, &[first])
        .expect("no structural error")
        .expect("group is complete");

    let mut index = PollIndex::new();
    assert!(!index.covers(&group(2)));
    index.record(&message);
    assert!(index.covers(&group(2)));
    assert_eq!(index.len(), 1);
    assert!(!index.covers(&CompositeId::new("+15559999", Some(7), 2)));
}
