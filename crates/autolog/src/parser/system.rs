use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::traits::*;
use super::value::{lookup, scalar_at};

/// Top-level key that marks a line as a system configuration record.
pub const SYSTEM_CONFIG_KEY: &str = "windows";

/// Value shown for every snapshot entry before a config line has been seen.
pub const NOT_AVAILABLE: &str = "N/A";

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub const LABEL_WINDOWS_VERSION: &str = "Windows Version";
pub const LABEL_CPU_NAME: &str = "CPU Name";
pub const LABEL_CPU_CORES: &str = "CPU Cores";
pub const LABEL_MEMORY: &str = "Memory Ram";
pub const LABEL_DRIVES: &str = "Hard Drive Details";
pub const LABEL_MANUFACTURER: &str = "Computer Manufacturer";
pub const LABEL_MODEL: &str = "Computer Model";

/// Snapshot labels in display order.
pub const SNAPSHOT_LABELS: [&str; 7] = [
    LABEL_WINDOWS_VERSION,
    LABEL_CPU_NAME,
    LABEL_CPU_CORES,
    LABEL_MEMORY,
    LABEL_DRIVES,
    LABEL_MANUFACTURER,
    LABEL_MODEL,
];

/// Format a byte count as gibibytes with two decimals, e.g. `"2.00 GB"`.
pub fn format_gib(bytes: f64) -> String {
    format!("{:.2} GB", bytes / BYTES_PER_GIB)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageDevice {
    pub interface_type: String,
    /// Size already formatted with [`format_gib`]
    pub size: String,
    pub status: String,
}

impl StorageDevice {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let size_bytes = obj.get("size")?.as_f64()?;
        Some(Self {
            interface_type: scalar_at(obj, &["interface_type"])?,
            size: format_gib(size_bytes),
            status: scalar_at(obj, &["status"])?,
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "Type: {}, Size: {}, Status: {}",
            self.interface_type, self.size, self.status
        )
    }
}

/// Machine identity captured from the system configuration line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemConfigRecord {
    pub windows_version: String,
    pub cpu_name: String,
    pub cpu_cores: String,
    /// Total memory formatted with [`format_gib`]
    pub memory: String,
    pub drives: Vec<StorageDevice>,
    pub manufacturer: String,
    pub model: String,
}

impl SystemConfigRecord {
    /// Build from a payload. `None` when any expected field is missing or mistyped.
    pub fn from_payload(payload: &Map<String, Value>) -> Option<Self> {
        let memory_bytes = lookup(payload, &["mem", "capacity"])?.as_f64()?;
        let drives = payload
            .get("hdd")?
            .as_array()?
            .iter()
            .map(StorageDevice::from_value)
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            windows_version: scalar_at(payload, &["windows", "version"])?,
            cpu_name: scalar_at(payload, &["cpu", "name"])?,
            cpu_cores: scalar_at(payload, &["cpu", "number_of_cores"])?,
            memory: format_gib(memory_bytes),
            drives,
            manufacturer: scalar_at(payload, &["computer", "manufacturer"])?,
            model: scalar_at(payload, &["computer", "model"])?,
        })
    }

    /// One summary line per storage device, newline separated.
    pub fn drive_details(&self) -> String {
        self.drives
            .iter()
            .map(StorageDevice::summary)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn snapshot(&self) -> SystemConfigSnapshot {
        SystemConfigSnapshot::from(self)
    }
}

/// Flat label → value view consumed by the display layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemConfigSnapshot {
    entries: Vec<(&'static str, String)>,
}

impl Default for SystemConfigSnapshot {
    fn default() -> Self {
        Self {
            entries: SNAPSHOT_LABELS
                .iter()
                .map(|label| (*label, NOT_AVAILABLE.to_string()))
                .collect(),
        }
    }
}

impl From<&SystemConfigRecord> for SystemConfigSnapshot {
    fn from(record: &SystemConfigRecord) -> Self {
        Self {
            entries: vec![
                (LABEL_WINDOWS_VERSION, record.windows_version.clone()),
                (LABEL_CPU_NAME, record.cpu_name.clone()),
                (LABEL_CPU_CORES, record.cpu_cores.clone()),
                (LABEL_MEMORY, record.memory.clone()),
                (LABEL_DRIVES, record.drive_details()),
                (LABEL_MANUFACTURER, record.manufacturer.clone()),
                (LABEL_MODEL, record.model.clone()),
            ],
        }
    }
}

impl SystemConfigSnapshot {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(l, v)| (*l, v.as_str()))
    }
}

/// Recognizes the system configuration line.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemConfigExtractor;

impl PayloadExtractor for SystemConfigExtractor {
    type Output = SystemConfigRecord;

    fn extract(&self, line: ParsedLine) -> Extraction<SystemConfigRecord> {
        if !line.contains_key(SYSTEM_CONFIG_KEY) {
            return Extraction::NotApplicable(line);
        }

        match SystemConfigRecord::from_payload(&line.payload) {
            Some(record) => Extraction::Matched(record),
            None => {
                debug!(timestamp = %line.timestamp, "system config line is incomplete, treating as activity");
                Extraction::NotApplicable(line)
            }
        }
    }
}
