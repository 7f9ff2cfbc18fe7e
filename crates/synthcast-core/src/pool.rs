//! Engine pool.
//!
//! A pooled host owns a fixed set of engine slots, built once at startup.
//! Requests borrow a slot for the length of one render. An unpooled host
//! builds a fresh engine for every request instead and discards it after.

use crate::slot::{EngineSlot, SlotGuard};
use crate::{CoreError, Result};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};
use synthcast_plugin::PluginInstance;

/// Builds one engine. Used to fill the pool and, in unpooled mode, per request.
pub type PluginFactory =
    Arc<dyn Fn() -> synthcast_plugin::Result<Box<dyn PluginInstance>> + Send + Sync>;

pub enum InstancePool {
    Pooled(Vec<EngineSlot>),
    Unpooled(PluginFactory),
}

impl InstancePool {
    /// Loads `size` engines up front. Any load failure aborts construction.
    pub fn pooled(factory: &PluginFactory, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(CoreError::InvalidConfig(
                "pooled mode needs at least one slot".into(),
            ));
        }

        let slots = (0..size)
            .map(|index| -> Result<EngineSlot> {
                let engine = factory()?;
                tracing::debug!(slot = index, "Engine slot ready");
                Ok(EngineSlot::new(index, engine))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(InstancePool::Pooled(slots))
    }

    pub fn unpooled(factory: PluginFactory) -> Self {
        InstancePool::Unpooled(factory)
    }

    pub fn is_unpooled(&self) -> bool {
        matches!(self, InstancePool::Unpooled(_))
    }

    /// Number of slots (0 when unpooled).
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slots(&self) -> &[EngineSlot] {
        match self {
            InstancePool::Pooled(slots) => slots,
            InstancePool::Unpooled(_) => &[],
        }
    }

    /// One pass over the slots in pool order. Never blocks.
    pub fn try_acquire(&self) -> Result<Option<Lease<'_>>> {
        match self {
            InstancePool::Pooled(slots) => Ok(slots.iter().find_map(|slot| {
                slot.try_lock().map(|guard| Lease::Pooled {
                    slot: slot.index(),
                    guard,
                })
            })),
            InstancePool::Unpooled(factory) => Ok(Some(Lease::Ephemeral(factory()?))),
        }
    }

    /// Sweeps the pool until a slot is free, sleeping `backoff` between
    /// sweeps. Gives up with `CoreError::Timeout` once `timeout` has elapsed;
    /// a sleep never runs past the deadline.
    pub fn acquire(&self, timeout: Duration, backoff: Duration) -> Result<Lease<'_>> {
        let start = Instant::now();
        let deadline = start + timeout;
        let mut sweeps = 0u32;

        loop {
            if let Some(lease) = self.try_acquire()? {
                if sweeps > 0 {
                    tracing::trace!(sweeps, "Acquired engine after waiting");
                }
                return Ok(lease);
            }
            sweeps += 1;

            let now = Instant::now();
            if now >= deadline {
                let waited_ms = now.duration_since(start).as_millis() as u64;
                tracing::warn!(waited_ms, slots = self.len(), "No free engine slot");
                return Err(CoreError::Timeout { waited_ms });
            }
            std::thread::sleep(backoff.min(deadline - now));
        }
    }
}

impl std::fmt::Debug for InstancePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstancePool::Pooled(slots) => f.debug_tuple("Pooled").field(slots).finish(),
            InstancePool::Unpooled(_) => f.write_str("Unpooled"),
        }
    }
}

/// Exclusive use of one engine for the length of a render.
pub enum Lease<'a> {
    /// Borrowed from a pool slot; released on drop.
    Pooled { slot: usize, guard: SlotGuard<'a> },
    /// Built for this request; destroyed on drop.
    Ephemeral(Box<dyn PluginInstance>),
}

impl Lease<'_> {
    pub fn slot(&self) -> Option<usize> {
        match self {
            Lease::Pooled { slot, .. } => Some(*slot),
            Lease::Ephemeral(_) => None,
        }
    }
}

impl Deref for Lease<'_> {
    type Target = dyn PluginInstance;

    fn deref(&self) -> &Self::Target {
        match self {
            Lease::Pooled { guard, .. } => &***guard,
            Lease::Ephemeral(engine) => &**engine,
        }
    }
}

impl DerefMut for Lease<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Lease::Pooled { guard, .. } => &mut ***guard,
            Lease::Ephemeral(engine) => &mut **engine,
        }
    }
}
