//! I²C bus providers.
//!
//! - [`LinuxBusProvider`] opens `/dev/i2c-N` through `linux-embedded-hal`
//!   (feature `linux-i2c`).
//! - [`SimulatedBusProvider`] hands out in-memory buses that record every
//!   write.  Used on hosts without the feature and by the test suite.
//!
//! Each provider caches one bus per number so controllers on the same bus
//! share a single handle.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use log::debug;

use crate::app::ports::{BusProvider, SharedBus};

// ── Simulated bus ─────────────────────────────────────────────

/// In-memory I²C master.  Clones share the same write log.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBus {
    writes: Arc<Mutex<Vec<(u8, Vec<u8>)>>>,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(address, bytes)` write so far, oldest first.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.log().clone()
    }

    pub fn clear(&self) {
        self.log().clear();
    }

    /// Most recent write to `address`.
    pub fn last_write_to(&self, address: u8) -> Option<Vec<u8>> {
        self.log()
            .iter()
            .rev()
            .find(|(a, _)| *a == address)
            .map(|(_, bytes)| bytes.clone())
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<(u8, Vec<u8>)>> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ErrorType for SimulatedBus {
    type Error = Infallible;
}

impl I2c<SevenBitAddress> for SimulatedBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut log = self.log();
        for op in operations {
            match op {
                Operation::Write(bytes) => log.push((address, bytes.to_vec())),
                // Registers read back as zero.
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}

/// Provider of [`SimulatedBus`]es, keyed by bus number.
#[derive(Default)]
pub struct SimulatedBusProvider {
    buses: HashMap<u8, (SimulatedBus, SharedBus)>,
}

impl SimulatedBusProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspection handle for bus `id`, if it has been opened.
    pub fn handle(&self, id: u8) -> Option<SimulatedBus> {
        self.buses.get(&id).map(|(bus, _)| bus.clone())
    }
}

impl BusProvider for SimulatedBusProvider {
    fn bus(&mut self, id: u8) -> anyhow::Result<SharedBus> {
        let (_, shared) = self.buses.entry(id).or_insert_with(|| {
            debug!("i2c-{}: simulated", id);
            let bus = SimulatedBus::new();
            let shared: SharedBus = Arc::new(Mutex::new(bus.clone()));
            (bus, shared)
        });
        Ok(Arc::clone(shared))
    }
}

// ── Linux i2c-dev ─────────────────────────────────────────────

#[cfg(feature = "linux-i2c")]
pub use linux::LinuxBusProvider;

#[cfg(feature = "linux-i2c")]
mod linux {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use anyhow::Context;
    use linux_embedded_hal::I2cdev;
    use log::info;

    use crate::app::ports::{BusProvider, SharedBus};

    #[derive(Default)]
    pub struct LinuxBusProvider {
        buses: HashMap<u8, SharedBus>,
    }

    impl LinuxBusProvider {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl BusProvider for LinuxBusProvider {
        fn bus(&mut self, id: u8) -> anyhow::Result<SharedBus> {
            if let Some(bus) = self.buses.get(&id) {
                return Ok(Arc::clone(bus));
            }
            let path = format!("/dev/i2c-{id}");
            let dev = I2cdev::new(&path).with_context(|| format!("opening {path}"))?;
            info!("i2c-{}: opened {}", id, path);
            let bus: SharedBus = Arc::new(Mutex::new(dev));
            self.buses.insert(id, Arc::clone(&bus));
            Ok(bus)
        }
    }
}

/// The provider used by the service binary.
pub fn default_provider() -> Box<dyn BusProvider> {
    #[cfg(feature = "linux-i2c")]
    {
        Box::new(LinuxBusProvider::new())
    }
    #[cfg(not(feature = "linux-i2c"))]
    {
        log::warn!("Built without `linux-i2c`; outputs go to a simulated bus");
        Box::new(SimulatedBusProvider::new())
    }
}
