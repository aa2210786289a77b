//! Point-in-time utilization from one resource-accounting record.

use bollard::models::{ContainerCpuStats, ContainerStatsResponse};
use bollard::query_parameters::StatsOptionsBuilder;

use super::EngineConnector;
use super::client::ContainerStatsClient;
use crate::error::{DockliteError, EngineError};
use crate::metrics::{ResourceSnapshot, UtilizationReport, decode_utilization};

impl EngineConnector {
    /// Read one accounting record for a container and decode it.
    ///
    /// The engine pairs each record with the previous sample, so a single
    /// non-streaming request yields both snapshots.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::OperationFailed` if the engine rejects the
    /// request and `EngineError::StatsUnavailable` when it returns no record.
    pub async fn get_utilization_async<C: ContainerStatsClient>(
        client: &C,
        container_id: &str,
    ) -> Result<UtilizationReport, DockliteError> {
        let options = StatsOptionsBuilder::new()
            .stream(false)
            .one_shot(false)
            .build();
        let record = client
            .stats_snapshot(container_id, options)
            .await
            .map_err(|error| {
                DockliteError::from(EngineError::OperationFailed {
                    operation: "stats",
                    container_id: String::from(container_id),
                    message: error.to_string(),
                })
            })?
            .ok_or_else(|| EngineError::StatsUnavailable {
                container_id: String::from(container_id),
            })?;

        let (previous, current) = snapshots(&record);
        Ok(decode_utilization(&previous, &current))
    }
}

/// Split a record into its previous and current snapshots.
fn snapshots(record: &ContainerStatsResponse) -> (ResourceSnapshot, ResourceSnapshot) {
    let memory = record.memory_stats.as_ref();
    let memory_usage = memory.and_then(|stats| stats.usage).unwrap_or(0);
    let memory_limit = memory.and_then(|stats| stats.limit).unwrap_or(0);

    let previous = ResourceSnapshot {
        memory_usage,
        memory_limit,
        ..cpu_snapshot(record.precpu_stats.as_ref())
    };
    let current = ResourceSnapshot {
        memory_usage,
        memory_limit,
        ..cpu_snapshot(record.cpu_stats.as_ref())
    };
    (previous, current)
}

fn cpu_snapshot(stats: Option<&ContainerCpuStats>) -> ResourceSnapshot {
    let Some(cpu) = stats else {
        return ResourceSnapshot {
            core_count: 1,
            ..ResourceSnapshot::default()
        };
    };
    let usage = cpu.cpu_usage.as_ref();
    ResourceSnapshot {
        cpu_usage: usage.and_then(|u| u.total_usage).unwrap_or(0),
        system_usage: cpu.system_cpu_usage.unwrap_or(0),
        core_count: core_count(cpu),
        ..ResourceSnapshot::default()
    }
}

/// Per-CPU vector length, else online CPUs, else 1.
fn core_count(cpu: &ContainerCpuStats) -> u32 {
    cpu.cpu_usage
        .as_ref()
        .and_then(|usage| usage.percpu_usage.as_ref())
        .filter(|per_cpu| !per_cpu.is_empty())
        .and_then(|per_cpu| u32::try_from(per_cpu.len()).ok())
        .or_else(|| cpu.online_cpus.filter(|count| *count > 0))
        .unwrap_or(1)
}
