use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::handle::SlotHandle;
use crate::table::ChannelTable;

/// Registry of device instances, each owning one [`ChannelTable`].
///
/// An explicitly constructed object rather than process-wide state, so
/// embedders and tests get isolated registries with a clear init/teardown
/// lifecycle. Instance tables are created lazily on first open and removed
/// only by [`teardown_all`](Self::teardown_all).
#[derive(Debug)]
pub struct SlotRegistry {
    config: RelayConfig,
    instances: RwLock<HashMap<u32, Arc<ChannelTable>>>,
}

impl SlotRegistry {
    /// Create a registry with validated configuration.
    pub fn new(config: RelayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            instances: RwLock::new(HashMap::new()),
        })
    }

    /// Create a registry with the default bounds (128-byte messages,
    /// 256 instances).
    pub fn with_defaults() -> Self {
        Self {
            config: RelayConfig::default(),
            instances: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Open a handle against an instance, lazily creating its channel
    /// table on first use. The handle starts with no channel selected.
    pub fn open(&self, instance_id: u32) -> Result<SlotHandle> {
        let table = self.get_or_create(instance_id)?;
        debug!(instance = instance_id, "handle opened");
        Ok(SlotHandle::new(table))
    }

    /// Lazy, idempotent instance lookup.
    pub fn get_or_create(&self, instance_id: u32) -> Result<Arc<ChannelTable>> {
        if instance_id >= self.config.max_instances {
            return Err(RelayError::TooManyInstances {
                instance: instance_id,
                max: self.config.max_instances,
            });
        }

        if let Some(table) = self.read_instances().get(&instance_id) {
            return Ok(Arc::clone(table));
        }

        let mut instances = self.write_instances();
        Ok(Arc::clone(instances.entry(instance_id).or_insert_with(
            || {
                debug!(instance = instance_id, "creating instance table");
                Arc::new(ChannelTable::new(instance_id, self.config.message_capacity))
            },
        )))
    }

    /// Number of instances created so far.
    pub fn instance_count(&self) -> usize {
        self.read_instances().len()
    }

    /// Clear every instance table, then the registry itself.
    ///
    /// Must be the last operation on this registry: callers are responsible
    /// for ensuring no handle is still in use when this runs.
    pub fn teardown_all(&self) {
        let mut instances = self.write_instances();
        for table in instances.values() {
            table.clear();
        }
        let dropped = instances.len();
        instances.clear();
        info!(instances = dropped, "registry torn down");
    }

    fn read_instances(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<u32, Arc<ChannelTable>>> {
        match self.instances.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_instances(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<u32, Arc<ChannelTable>>> {
        match self.instances.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
