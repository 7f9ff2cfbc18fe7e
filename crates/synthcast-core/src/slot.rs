//! Mutually-exclusive holder for one engine.

use parking_lot::{Mutex, MutexGuard};
use synthcast_plugin::PluginInstance;

/// Exclusive access to a slot's engine. Dropping it releases the slot.
pub type SlotGuard<'a> = MutexGuard<'a, Box<dyn PluginInstance>>;

/// One pooled engine behind a lock.
///
/// `try_lock` never blocks; the pool sweeps slots with it. A panic while the
/// guard is held does not poison the slot, so the next holder still gets the
/// engine (the render pipeline resets it before use).
pub struct EngineSlot {
    index: usize,
    engine: Mutex<Box<dyn PluginInstance>>,
}

impl EngineSlot {
    pub fn new(index: usize, engine: Box<dyn PluginInstance>) -> Self {
        Self {
            index,
            engine: Mutex::new(engine),
        }
    }

    /// Position in the pool.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn try_lock(&self) -> Option<SlotGuard<'_>> {
        self.engine.try_lock()
    }

    /// Blocks until the slot is free.
    pub fn lock(&self) -> SlotGuard<'_> {
        self.engine.lock()
    }

    pub fn is_locked(&self) -> bool {
        self.engine.is_locked()
    }
}

impl std::fmt::Debug for EngineSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSlot")
            .field("index", &self.index)
            .field("locked", &self.is_locked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthcast_plugin::{BuiltinKind, BuiltinSynth};

    fn slot() -> EngineSlot {
        EngineSlot::new(3, Box::new(BuiltinSynth::new(BuiltinKind::Poly)))
    }

    #[test]
    fn test_try_lock_is_exclusive() {
        let slot = slot();
        let guard = slot.try_lock();
        assert!(guard.is_some());
        assert!(slot.is_locked());
        assert!(slot.try_lock().is_none());

        drop(guard);
        assert!(!slot.is_locked());
        assert!(slot.try_lock().is_some());
    }

    #[test]
    fn test_guard_reaches_engine() {
        let slot = slot();
        assert_eq!(slot.index(), 3);

        let mut guard = slot.lock();
        guard.set_program(2);
        drop(guard);

        assert_eq!(slot.lock().current_program(), 2);
    }

    #[test]
    fn test_slot_is_shareable_across_threads() {
        let slot = std::sync::Arc::new(slot());
        let guard = slot.lock();

        let other = slot.clone();
        let handle = std::thread::spawn(move || other.try_lock().is_none());
        assert!(handle.join().unwrap());

        drop(guard);
    }
}
