// memory.rs - Available memory detection for chunk auto-sizing

/// Fallback when no memory information can be read (4 GiB)
pub const FALLBACK_MEMORY_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Where the available-memory figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemorySource {
    /// cgroups v2 memory.max minus memory.current
    CgroupsV2,
    /// /proc/meminfo MemAvailable
    ProcMeminfo,
    Fallback,
}

#[derive(Debug, Clone, Copy)]
pub struct AvailableMemory {
    pub bytes: u64,
    pub source: MemorySource,
}

impl AvailableMemory {
    pub fn describe(&self) -> String {
        let source = match self.source {
            MemorySource::CgroupsV2 => "cgroup headroom",
            MemorySource::ProcMeminfo => "MemAvailable",
            MemorySource::Fallback => "fallback",
        };
        format!("{:.1} GiB ({})", self.bytes as f64 / (1u64 << 30) as f64, source)
    }
}

/// `MemAvailable` in bytes from the contents of /proc/meminfo
pub fn parse_meminfo_available(content: &str) -> Option<u64> {
    content
        .lines()
        .find(|line| line.starts_with("MemAvailable:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb * 1024)
}

/// cgroups v2 limit; `max` means unlimited
fn parse_cgroup_limit(content: &str) -> Option<u64> {
    let value = content.trim();
    if value == "max" {
        None
    } else {
        value.parse().ok()
    }
}

/// Headroom left under a cgroups v2 limit. Usage is taken from
/// `memory.current`; when it cannot be read the whole limit is returned.
fn cgroup_available(max: &str, current: Option<&str>) -> Option<u64> {
    let limit = parse_cgroup_limit(max)?;
    let used = current
        .and_then(|c| c.trim().parse::<u64>().ok())
        .unwrap_or(0);
    Some(limit.saturating_sub(used))
}

/// Detect available memory: the smaller of the cgroups v2 headroom and
/// `MemAvailable`, falling back to 4 GiB.
pub fn detect_available_memory() -> AvailableMemory {
    let meminfo = std::fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|c| parse_meminfo_available(&c));
    let current = std::fs::read_to_string("/sys/fs/cgroup/memory.current").ok();
    let cgroup = std::fs::read_to_string("/sys/fs/cgroup/memory.max")
        .ok()
        .and_then(|max| cgroup_available(&max, current.as_deref()));

    match (cgroup, meminfo) {
        (Some(limit), Some(avail)) if limit < avail => AvailableMemory {
            bytes: limit,
            source: MemorySource::CgroupsV2,
        },
        (_, Some(avail)) => AvailableMemory {
            bytes: avail,
            source: MemorySource::ProcMeminfo,
        },
        (Some(limit), None) => AvailableMemory {
            bytes: limit,
            source: MemorySource::CgroupsV2,
        },
        (None, None) => AvailableMemory {
            bytes: FALLBACK_MEMORY_BYTES,
            source: MemorySource::Fallback,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meminfo() {
        let content = "MemTotal:       16318712 kB\nMemFree:         1209324 kB\nMemAvailable:    8159356 kB\n";
        assert_eq!(parse_meminfo_available(content), Some(8159356 * 1024));
        assert_eq!(parse_meminfo_available("MemTotal: 10 kB\n"), None);
        assert_eq!(parse_meminfo_available("MemAvailable: lots kB\n"), None);
    }

    #[test]
    fn test_parse_cgroup_limit() {
        assert_eq!(parse_cgroup_limit("max\n"), None);
        assert_eq!(parse_cgroup_limit("2147483648\n"), Some(2147483648));
    }

    #[test]
    fn test_cgroup_available_subtracts_usage() {
        assert_eq!(
            cgroup_available("2147483648\n", Some("1073741824\n")),
            Some(1073741824)
        );
        assert_eq!(cgroup_available("2147483648\n", None), Some(2147483648));
        assert_eq!(cgroup_available("2147483648\n", Some("garbage")), Some(2147483648));
        assert_eq!(cgroup_available("1000\n", Some("4096\n")), Some(0));
        assert_eq!(cgroup_available("max\n", Some("1073741824\n")), None);
    }

    #[test]
    fn test_detect_is_positive() {
        let memory = detect_available_memory();
        assert!(memory.bytes > 0);
        assert!(memory.describe().contains("GiB"));
    }
}
