//! Point-in-time statistics aggregators over the EVE log.
//!
//! Every aggregator is a pure function: it re-reads a bounded window of the
//! log from disk (see [`crate::window`]), decodes each line (see
//! [`crate::models::EveRecord`]), and folds the matching records into its
//! result shape. No state is kept between calls, so concurrent requests
//! never share mutable structures. Undecodable lines are skipped; an empty
//! or absent log produces the empty result shape.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::EveRecord;
use crate::window::read_window;

/// Lines scanned for alert signature ranking.
const SIGNATURE_WINDOW: usize = 5000;
/// Lines scanned for DNS and TLS rankings.
const PROTOCOL_WINDOW: usize = 2000;
/// Lines scanned for performance counter extraction.
const STATS_WINDOW: usize = 500;
/// Maximum entries returned by any ranking.
const TOP_LIMIT: usize = 10;

/// A ranked list of labels and their occurrence counts.
///
/// `labels` and `values` are parallel, sorted by count descending. Ties keep
/// the order in which labels were first encountered during the scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopCounts {
    /// Ranked labels, most frequent first.
    pub labels: Vec<String>,
    /// Occurrence count for each label.
    pub values: Vec<u64>,
}

/// The engine's performance counters at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountersSnapshot {
    /// Timestamp of the `stats` record the counters were taken from.
    pub timestamp: Option<String>,
    /// Capture-layer counters (`stats.capture`).
    pub capture: Value,
    /// Decoder counters (`stats.decoder`).
    pub decoder: Value,
    /// Flow-engine counters (`stats.flow`).
    pub flow: Value,
    /// Application-layer counters (`stats.app_layer`).
    pub app_layer: Value,
}

/// Chronological capture-volume series for charting packet loss.
///
/// The three vectors are parallel; an entry exists only for `stats` records
/// that carried a timestamp and both kernel counters. Partial records are
/// dropped entirely so the series never contains null points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureHistory {
    /// Record timestamps, oldest first.
    pub timestamps: Vec<String>,
    /// `stats.capture.kernel_packets` per record.
    pub packets: Vec<u64>,
    /// `stats.capture.kernel_drops` per record.
    pub drops: Vec<u64>,
}

/// Ranks the top alert signatures in the most recent window of the log.
///
/// Counts `alert.signature` across `alert` events; records without a
/// signature are skipped.
///
/// # Errors
///
/// Returns an error only for I/O failures other than the log being absent.
pub fn top_signatures(path: &Path) -> io::Result<TopCounts> {
    let window = read_window(path, SIGNATURE_WINDOW)?;
    let keys = decoded(&window)
        .filter(|record| record.is_type("alert"))
        .filter_map(|record| nested_string(&record, &["alert", "signature"]));
    Ok(rank(keys))
}

/// Ranks the top DNS query names in the most recent window of the log.
///
/// Only `dns` events that are queries (`dns.type == "query"`) and carry a
/// `dns.rrname` are counted.
///
/// # Errors
///
/// Returns an error only for I/O failures other than the log being absent.
pub fn top_dns(path: &Path) -> io::Result<TopCounts> {
    let window = read_window(path, PROTOCOL_WINDOW)?;
    let keys = decoded(&window)
        .filter(|record| record.is_type("dns"))
        .filter(|record| {
            record.nested(&["dns", "type"]).and_then(Value::as_str) == Some("query")
        })
        .filter_map(|record| nested_string(&record, &["dns", "rrname"]));
    Ok(rank(keys))
}

/// Ranks the top TLS server names (SNI) in the most recent window of the log.
///
/// # Errors
///
/// Returns an error only for I/O failures other than the log being absent.
pub fn top_tls_sni(path: &Path) -> io::Result<TopCounts> {
    let window = read_window(path, PROTOCOL_WINDOW)?;
    let keys = decoded(&window)
        .filter(|record| record.is_type("tls"))
        .filter_map(|record| nested_string(&record, &["tls", "sni"]));
    Ok(rank(keys))
}

/// Extracts the counters of the chronologically last `stats` record.
///
/// Returns `Ok(None)` when the window holds no `stats` record at all; this
/// is distinct from counters that are present but zero, and callers report
/// it as "not found" rather than as an empty snapshot. Sub-sections missing
/// from the record default to an empty object.
///
/// # Errors
///
/// Returns an error only for I/O failures other than the log being absent.
pub fn latest_counters(path: &Path) -> io::Result<Option<CountersSnapshot>> {
    let window = read_window(path, STATS_WINDOW)?;
    let Some(record) = window
        .iter()
        .rev()
        .filter_map(|line| EveRecord::decode(line))
        .find(|record| record.is_type("stats"))
    else {
        return Ok(None);
    };

    Ok(Some(CountersSnapshot {
        timestamp: record.timestamp.clone(),
        capture: section(&record, "capture"),
        decoder: section(&record, "decoder"),
        flow: section(&record, "flow"),
        app_layer: section(&record, "app_layer"),
    }))
}

/// Builds the capture-volume time series from the most recent window.
///
/// # Errors
///
/// Returns an error only for I/O failures other than the log being absent.
pub fn capture_history(path: &Path) -> io::Result<CaptureHistory> {
    let window = read_window(path, STATS_WINDOW)?;
    let mut history = CaptureHistory::default();

    for record in decoded(&window).filter(|record| record.is_type("stats")) {
        let Some(timestamp) = record.timestamp.clone() else {
            continue;
        };
        let packets = record
            .nested(&["stats", "capture", "kernel_packets"])
            .and_then(Value::as_u64);
        let drops = record
            .nested(&["stats", "capture", "kernel_drops"])
            .and_then(Value::as_u64);
        let (Some(packets), Some(drops)) = (packets, drops) else {
            continue;
        };

        history.timestamps.push(timestamp);
        history.packets.push(packets);
        history.drops.push(drops);
    }

    Ok(history)
}

/// Decodes a window's lines, silently dropping the undecodable ones.
fn decoded(window: &[String]) -> impl Iterator<Item = EveRecord> + '_ {
    window.iter().filter_map(|line| EveRecord::decode(line))
}

fn nested_string(record: &EveRecord, path: &[&str]) -> Option<String> {
    record
        .nested(path)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Extracts one `stats.*` sub-section, defaulting to an empty object.
fn section(record: &EveRecord, name: &str) -> Value {
    record
        .nested(&["stats", name])
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

/// Counts keys and returns the top entries by count descending.
///
/// Counting is insertion-ordered and the sort is stable, so equal counts
/// rank in first-encountered order.
fn rank(keys: impl Iterator<Item = String>) -> TopCounts {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counted: Vec<(String, u64)> = Vec::new();

    for key in keys {
        if let Some(&slot) = index.get(&key) {
            counted[slot].1 += 1;
        } else {
            index.insert(key.clone(), counted.len());
            counted.push((key, 1));
        }
    }

    counted.sort_by(|a, b| b.1.cmp(&a.1));
    counted.truncate(TOP_LIMIT);

    let mut top = TopCounts::default();
    for (label, count) in counted {
        top.labels.push(label);
        top.values.push(count);
    }
    top
}
