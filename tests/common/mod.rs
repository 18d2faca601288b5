//! Shared fixtures: a scripted stand-in for the `gammu-json` helper and
//! record builders for its `retrieve` output.
#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use smsgate::{CommandRunner, GatewayConfig, RunnerError};

/// Helper fake that answers each phase from a scripted queue, or with a
/// benign default: `retrieve` returns no messages, `send` confirms every
/// message, `delete` acknowledges every location.
#[derive(Default)]
pub struct ScriptedRunner {
    retrieve: Mutex<VecDeque<Result<Value, RunnerError>>>,
    send: Mutex<VecDeque<Result<Value, RunnerError>>>,
    delete: Mutex<VecDeque<Result<Value, RunnerError>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn push_retrieve(&self, response: Value) {
        self.retrieve.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_retrieve_error(&self, error: RunnerError) {
        self.retrieve.lock().unwrap().push_back(Err(error));
    }

    pub fn push_send(&self, response: Value) {
        self.send.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_send_error(&self, error: RunnerError) {
        self.send.lock().unwrap().push_back(Err(error));
    }

    pub fn push_delete(&self, response: Value) {
        self.delete.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_delete_error(&self, error: RunnerError) {
        self.delete.lock().unwrap().push_back(Err(error));
    }

    /// Every invocation so far, as raw argument vectors.
    pub fn calls(&self) -> Vec<Vec<String>> { self.calls.lock().unwrap().clone() }

    /// Invocations of one phase command.
    pub fn calls_for(&self, command: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|args| args.first().is_some_and(|first| first == command))
            .collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, args: &[String]) -> Result<Value, RunnerError> {
        self.calls.lock().unwrap().push(args.to_vec());
        let command = args.first().map(String::as_str).unwrap_or_default();
        match command {
            "retrieve" => self
                .retrieve
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(json!([]))),
            "send" => self.send.lock().unwrap().pop_front().unwrap_or_else(|| {
                let sent = (args.len() - 1) / 2;
                Ok(Value::Array(
                    (1..=sent)
                        .map(|index| json!({ "index": index, "result": "success" }))
                        .collect(),
                ))
            }),
            "delete" => self.delete.lock().unwrap().pop_front().unwrap_or_else(|| {
                let detail: serde_json::Map<_, _> = args[1..]
                    .iter()
                    .map(|location| (location.clone(), json!("ok")))
                    .collect();
                Ok(json!({ "detail": detail }))
            }),
            other => panic!("unexpected helper command {other:?}"),
        }
    }
}

/// Config tuned for scripted tests.
pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        interval: Duration::from_millis(10),
        ..GatewayConfig::default()
    }
}

pub const TS: &str = "2026-03-01 09:00:00";

/// A single-part `retrieve` record.
pub fn single(location: u32, from: &str, content: &str) -> Value {
    json!({
        "location": location,
        "from": from,
        "content": content,
        "segment": 1,
        "total_segments": 1,
        "timestamp": TS,
    })
}

/// One part of a concatenated `retrieve` record.
pub fn part(location: u32, from: &str, content: &str, udh: u32, segment: u32, total: u32) -> Value {
    json!({
        "location": location,
        "from": from,
        "content": content,
        "udh": udh,
        "segment": segment,
        "total_segments": total,
        "timestamp": TS,
    })
}

/// The tail of a `delete` argv, sorted numerically for stable assertions.
pub fn sorted_locations(args: &[String]) -> Vec<u32> {
    let mut locations: Vec<u32> = args[1..]
        .iter()
        .map(|arg| arg.parse().expect("numeric location"))
        .collect();
    locations.sort_unstable();
    locations
}
