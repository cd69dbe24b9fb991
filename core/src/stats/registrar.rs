//! Statistics Regisration

use super::StatsAccumulator;
use std::sync::{Mutex, OnceLock};

/// Callback that flushes one thread's statistics into the accumulator.
pub type StatFn = fn(&mut StatsAccumulator);

/// Return the global statistics registrar.
pub fn stats_registrar() -> &'static Mutex<StatsRegistrar> {
    static DATA: OnceLock<Mutex<StatsRegistrar>> = OnceLock::new();
    DATA.get_or_init(|| Mutex::new(StatsRegistrar::default()))
}

/// Registers callback functions for statistics.
#[derive(Default)]
pub struct StatsRegistrar {
    /// Callback functions.
    stat_funcs: Vec<StatFn>,
}

impl StatsRegistrar {
    /// Register a callback function for reporting statistics. Registering
    /// the same function twice has no effect.
    ///
    /// * `func` - A callback function that takes a `StatsAccumulator` to report statistics.
    pub fn register_stat_func(&mut self, func: StatFn) {
        if !self.stat_funcs.iter().any(|&f| f as usize == func as usize) {
            self.stat_funcs.push(func);
        }
    }

    /// Returns the number of registered callbacks.
    pub fn len(&self) -> usize {
        self.stat_funcs.len()
    }

    /// Returns true if no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.stat_funcs.is_empty()
    }

    /// Call all callback functions for reporting statistics.
    ///
    /// * `accum` - The accumulator receiving the calling thread's values.
    pub fn call_stat_funcs(&self, accum: &mut StatsAccumulator) {
        for func in self.stat_funcs.iter() {
            func(accum);
        }
    }
}
