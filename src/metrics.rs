//! Utilization derived from two resource-accounting snapshots.
//!
//! The engine reports cumulative counters. A percentage needs two readings:
//! the CPU share is the workload's tick delta over the whole system's tick
//! delta, scaled by the number of cores.

use serde::Serialize;

/// One point-in-time reading of a workload's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceSnapshot {
    /// Cumulative CPU ticks consumed by the workload.
    pub cpu_usage: u64,
    /// Cumulative CPU ticks for the whole system.
    pub system_usage: u64,
    /// Number of cores the workload may use.
    pub core_count: u32,
    /// Memory currently in use, in bytes.
    pub memory_usage: u64,
    /// Memory limit in bytes; 0 means unlimited or unset.
    pub memory_limit: u64,
}

/// Normalised utilization for a single reading pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UtilizationReport {
    /// CPU use as a percentage of one core, summed over cores.
    #[serde(rename = "cpuUsage")]
    pub cpu_percent: f64,
    /// Memory in use, in bytes.
    #[serde(rename = "memoryUsage")]
    pub memory_usage: u64,
    /// Memory limit in bytes.
    #[serde(rename = "memoryLimit")]
    pub memory_limit: u64,
    /// Memory use as a percentage of the limit.
    #[serde(rename = "memoryPct")]
    pub memory_percent: f64,
}

/// Derive utilization from a chronologically ordered snapshot pair.
///
/// CPU percent is 0 whenever either delta is zero or negative. Memory
/// figures come from `current`; memory percent is 0 when the limit is 0.
/// This never fails.
#[must_use]
pub fn decode_utilization(
    previous: &ResourceSnapshot,
    current: &ResourceSnapshot,
) -> UtilizationReport {
    UtilizationReport {
        cpu_percent: cpu_percent(previous, current),
        memory_usage: current.memory_usage,
        memory_limit: current.memory_limit,
        memory_percent: ratio_percent(current.memory_usage, current.memory_limit),
    }
}

fn cpu_percent(previous: &ResourceSnapshot, current: &ResourceSnapshot) -> f64 {
    let usage_delta = current.cpu_usage.checked_sub(previous.cpu_usage);
    let system_delta = current.system_usage.checked_sub(previous.system_usage);
    match (usage_delta, system_delta) {
        (Some(usage), Some(system)) if usage > 0 && system > 0 => {
            scale_by_cores(ratio_percent(usage, system), current.core_count)
        }
        _ => 0.0,
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "percentages are inherently floating point; counters stay well inside f64 precision"
)]
fn ratio_percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64 * 100.0
}

#[expect(
    clippy::float_arithmetic,
    reason = "percentages are inherently floating point"
)]
fn scale_by_cores(percent: f64, core_count: u32) -> f64 {
    percent * f64::from(core_count)
}
