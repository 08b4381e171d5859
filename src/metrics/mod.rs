//! System utilization shown next to the activity data. Nothing in [crate::engine] depends on it.

use anyhow::{anyhow, Result};
use serde::Serialize;
use sysinfo::System;

use crate::utils::percentage::Percentage;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsReading {
    pub cpu: Percentage,
    pub memory: Percentage,
}

/// Contract for reading utilization of the machine.
#[cfg_attr(test, mockall::automock)]
pub trait SystemMetrics {
    /// Average usage across all cores.
    fn cpu_usage(&mut self) -> Result<Percentage>;

    fn memory_usage(&mut self) -> Result<Percentage>;
}

/// Takes both readings. Fails if either of them fails.
pub fn read_metrics(metrics: &mut dyn SystemMetrics) -> Result<MetricsReading> {
    Ok(MetricsReading {
        cpu: metrics.cpu_usage()?,
        memory: metrics.memory_usage()?,
    })
}

pub struct SysinfoMetrics {
    system: System,
}

impl SysinfoMetrics {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SysinfoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetrics for SysinfoMetrics {
    fn cpu_usage(&mut self) -> Result<Percentage> {
        // Usage is computed between two refreshes, the first one alone always reports 0.
        self.system.refresh_cpu_usage();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self.system.refresh_cpu_usage();
        let usage = self.system.global_cpu_usage() as f64;
        Percentage::new_opt(usage.min(100.)).ok_or_else(|| anyhow!("Illegal cpu usage {usage}"))
    }

    fn memory_usage(&mut self) -> Result<Percentage> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return Err(anyhow!("Total memory is unavailable"));
        }
        let used = self.system.used_memory();
        Percentage::new_opt(used as f64 / total as f64 * 100.)
            .ok_or_else(|| anyhow!("Illegal memory usage {used}/{total}"))
    }
}
