use crate::metrics::process::GpuInfo;
use std::collections::HashMap;

#[cfg(feature = "nvml")]
use log::{debug, info};
#[cfg(feature = "nvml")]
use nvml_wrapper::Nvml;

/// NVIDIA GPU queries through NVML.
///
/// Without the `nvml` feature, or when the driver library cannot be loaded,
/// every query reports "not available".
pub struct GpuQuery {
    #[cfg(feature = "nvml")]
    nvml: Option<Nvml>,
}

impl Default for GpuQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "nvml")]
impl GpuQuery {
    pub fn new() -> Self {
        let nvml = match Nvml::init() {
            Ok(nvml) => Some(nvml),
            Err(e) => {
                info!("GPU info not available: {e}");
                None
            }
        };
        Self { nvml }
    }

    pub fn list_gpus(&self) -> Option<Vec<GpuInfo>> {
        let nvml = self.nvml.as_ref()?;
        let count = nvml.device_count().ok()?;
        let gpus = (0..count)
            .filter_map(|index| {
                let device = nvml.device_by_index(index).ok()?;
                let memory = device.memory_info().ok();
                Some(GpuInfo {
                    id: index,
                    name: device.name().unwrap_or_default(),
                    load_percent: device
                        .utilization_rates()
                        .map(|u| u.gpu as f32)
                        .unwrap_or(0.0),
                    memory_used_mb: memory.as_ref().map_or(0.0, |m| to_mb(m.used)),
                    memory_total_mb: memory.as_ref().map_or(0.0, |m| to_mb(m.total)),
                })
            })
            .collect();
        Some(gpus)
    }

    /// Every pid running on a device is attributed that device's load.
    pub fn process_loads(&self) -> HashMap<u32, f32> {
        let mut loads = HashMap::new();
        let Some(nvml) = self.nvml.as_ref() else {
            return loads;
        };
        let count = nvml.device_count().unwrap_or(0);
        for index in 0..count {
            let Ok(device) = nvml.device_by_index(index) else {
                continue;
            };
            let load = device
                .utilization_rates()
                .map(|u| u.gpu as f32)
                .unwrap_or(0.0);
            let compute = device.running_compute_processes().unwrap_or_default();
            let graphics = device.running_graphics_processes().unwrap_or_default();
            for process in compute.iter().chain(&graphics) {
                loads.insert(process.pid, load);
            }
        }
        debug!("GPU loads for {} processes", loads.len());
        loads
    }
}

#[cfg(feature = "nvml")]
fn to_mb(bytes: u64) -> f32 {
    bytes as f32 / (1024.0 * 1024.0)
}

#[cfg(not(feature = "nvml"))]
impl GpuQuery {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list_gpus(&self) -> Option<Vec<GpuInfo>> {
        None
    }

    pub fn process_loads(&self) -> HashMap<u32, f32> {
        HashMap::new()
    }
}

/// Text for the performance tab's GPU label.
pub fn gpu_label(gpus: Option<&[GpuInfo]>) -> String {
    match gpus {
        Some(gpus) if !gpus.is_empty() => gpus
            .iter()
            .map(|gpu| {
                format!(
                    "GPU {} ({}): {:.2}% | VRAM used: {:.0}/{:.0} MB",
                    gpu.id, gpu.name, gpu.load_percent, gpu.memory_used_mb, gpu.memory_total_mb
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => "GPU info not available".to_string(),
    }
}
