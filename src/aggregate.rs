//! Correlates the five feeds into one record per thin device.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::error::Result;
use crate::parse::{DeviceCapacity, StorageGroup};
use crate::policy::FastPolicy;
use crate::pool::{self, PoolTech, UNPOOLED};

/// Everything the report knows about one thin device.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThinDevice {
    pub name: String,
    pub total_gb: f64,
    pub allocated_gb: f64,
    pub written_gb: Option<f64>,

    /// Allocated GB per pool, including the `N/A` pseudo pool.
    pub pool_allocations: IndexMap<String, f64>,

    /// Storage groups in discovery order. Duplicates are kept.
    pub storage_groups: Vec<String>,
    pub bound_pool: Option<String>,
    pub fast_group: Option<String>,
    pub fast_policy: Option<FastPolicy>,
}

impl ThinDevice {
    fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Allocated GB in `pool`, zero if the device has nothing there.
    #[must_use]
    pub fn allocated_in(&self, pool: &str) -> f64 {
        self.pool_allocations.get(pool).copied().unwrap_or_default()
    }
}

/// Thin devices in capacity feed order, plus the pools to report on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregate {
    devices: IndexMap<String, ThinDevice>,
    pools: Vec<String>,
}

impl Aggregate {
    /// Merges capacity, binding, storage group and FAST association data.
    ///
    /// Storage group members missing from the capacity feed are skipped.
    /// FAST-managed groups without an association resolve to
    /// [`FastPolicy::Unresolved`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DataConsistency`] if a device is allocated in
    /// a pool the pool inventory does not list.
    pub fn build(
        capacities: &[DeviceCapacity],
        groups: &[StorageGroup],
        associations: &HashMap<String, String>,
        pool_techs: &HashMap<String, PoolTech>,
    ) -> Result<Self> {
        let mut devices: IndexMap<String, ThinDevice> = IndexMap::new();
        let mut seen_pools = IndexSet::new();

        for capacity in capacities {
            let device = devices
                .entry(capacity.name.clone())
                .or_insert_with(|| ThinDevice::new(&capacity.name));

            device.total_gb = capacity.total_gb;
            device.allocated_gb = capacity.allocated_gb;
            device.written_gb = capacity.written_gb;

            for allocation in &capacity.pools {
                if allocation.pool != UNPOOLED {
                    seen_pools.insert(allocation.pool.as_str());
                }

                device
                    .pool_allocations
                    .insert(allocation.pool.clone(), allocation.allocated_gb);

                if allocation.bound {
                    device.bound_pool = Some(allocation.pool.clone());
                }
            }
        }

        for group in groups {
            let policy = group.fast_managed.then(|| {
                associations.get(&group.name).map_or_else(
                    || {
                        warn!(sg = %group.name, "no FAST policy association");
                        FastPolicy::Unresolved
                    },
                    |name| FastPolicy::Named(name.clone()),
                )
            });

            for member in &group.devices {
                // members can outlive their device in the SYMAPI database
                let Some(device) = devices.get_mut(member) else {
                    debug!(sg = %group.name, device = %member, "skipping");
                    continue;
                };

                device.storage_groups.push(group.name.clone());

                if let Some(policy) = &policy {
                    device.fast_group = Some(group.name.clone());
                    device.fast_policy = Some(policy.clone());
                }
            }
        }

        let pools = pool::order_pools(seen_pools, pool_techs)?;

        debug!(devices = devices.len(), pools = pools.len(), "aggregated");

        Ok(Self { devices, pools })
    }

    /// Devices in first-seen order.
    pub fn devices(&self) -> impl Iterator<Item = &ThinDevice> {
        self.devices.values()
    }

    #[must_use]
    pub fn device(&self, name: &str) -> Option<&ThinDevice> {
        self.devices.get(name)
    }

    /// Pools in column order.
    #[must_use]
    pub fn pools(&self) -> &[String] {
        &self.pools
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
