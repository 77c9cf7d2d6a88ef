//! Resource models and create specs for the controller API subset the CLI
//! drives.

use serde::{Deserialize, Serialize};

/// Generic list envelope returned by collection endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ResourceList<T> {
    #[serde(default)]
    pub items: Vec<T>,
}

// =============================================================================
// Tenancy
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantCreateSpec {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectCreateSpec {
    pub name: String,
}

// =============================================================================
// Storage
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistentDisk {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub flavor: String,

    #[serde(default)]
    pub capacity_gb: u64,

    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskCreateSpec {
    pub name: String,
    pub flavor: String,
    pub capacity_gb: u64,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

// =============================================================================
// Compute
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vm {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub flavor: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub source_image_id: String,

    /// Address of the host the VM is placed on, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VmCreateSpec {
    pub name: String,
    pub flavor: String,
    pub source_image_id: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attached_disks: Vec<AttachedDiskSpec>,
}

/// Disk created together with a VM.
#[derive(Debug, Clone, Serialize)]
pub struct AttachedDiskSpec {
    pub name: String,
    pub flavor: String,
    pub capacity_gb: u64,
    pub boot_disk: bool,
}

// =============================================================================
// Infrastructure
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub address: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostCreateSpec {
    pub address: String,
    pub username: String,
    pub password: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
