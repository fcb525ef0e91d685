use serde::Serialize;
use std::time::Instant;
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

/// Timing (and, when monitoring is on, resident memory) of one conversion phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseStat {
    pub phase: String,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,
}

#[cfg(feature = "cli")]
pub struct ConversionMonitor {
    system: Option<Mutex<System>>,
    pid: Option<Pid>,
    peak_memory: Mutex<u64>,
}

#[cfg(feature = "cli")]
impl ConversionMonitor {
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self {
                system: None,
                pid: None,
                peak_memory: Mutex::new(0),
            };
        }

        let mut system = System::new_with_specifics(RefreshKind::everything());
        system.refresh_all();

        Self {
            system: Some(Mutex::new(system)),
            pid: sysinfo::get_current_pid().ok(),
            peak_memory: Mutex::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.system.is_some() && self.pid.is_some()
    }

    fn sample_memory_mb(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self.system.as_ref()?.lock().ok()?;
        system.refresh_all();
        let memory_mb = system.process(pid)?.memory() / 1024 / 1024;

        let mut peak = self.peak_memory.lock().ok()?;
        if memory_mb > *peak {
            *peak = memory_mb;
        }
        Some(memory_mb)
    }

    pub fn peak_memory_mb(&self) -> Option<u64> {
        if !self.is_enabled() {
            return None;
        }
        self.peak_memory.lock().ok().map(|peak| *peak)
    }

    pub fn record(&self, phase: &str, started: Instant) -> PhaseStat {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let memory_mb = self.sample_memory_mb();

        match memory_mb {
            Some(memory) => {
                tracing::info!("📊 {} - {}ms, Memory: {}MB", phase, elapsed_ms, memory)
            }
            None => tracing::debug!("{} finished in {}ms", phase, elapsed_ms),
        }

        PhaseStat {
            phase: phase.to_string(),
            elapsed_ms,
            memory_mb,
        }
    }
}

#[cfg(feature = "cli")]
impl std::fmt::Debug for ConversionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionMonitor")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

// Without the cli feature only timings are recorded
#[cfg(not(feature = "cli"))]
#[derive(Debug)]
pub struct ConversionMonitor;

#[cfg(not(feature = "cli"))]
impl ConversionMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn peak_memory_mb(&self) -> Option<u64> {
        None
    }

    pub fn record(&self, phase: &str, started: Instant) -> PhaseStat {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::debug!("{} finished in {}ms", phase, elapsed_ms);
        PhaseStat {
            phase: phase.to_string(),
            elapsed_ms,
            memory_mb: None,
        }
    }
}

impl Default for ConversionMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
