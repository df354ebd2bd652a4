//! Shared generator instances and the process-wide entry point functions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::clock::SystemClock;
use crate::error::Error;
use crate::random::{Purpose, RandomSource, SystemRandom};
use crate::v6::{Uuid6Option, V6Generator};
use crate::v7::{Uuid7Option, V7Generator};
use crate::Uuid;

type SharedV6 = Arc<Mutex<V6Generator<SystemClock, SystemRandom>>>;
type SharedV7 = Arc<Mutex<V7Generator<SystemClock, SystemRandom>>>;

/// One generator per configuration.
///
/// Monotonic order is a per-instance guarantee, so every call site using the
/// same configuration must reach the same generator instance; the registry
/// owns that mapping. Construct one at application startup and share it, or
/// use the module-level functions backed by the process-wide instance.
///
/// Each cached generator sits behind its own lock, and a `generate` call
/// holds that lock for the whole candidate-build-and-check cycle; concurrent
/// callers of one configuration serialize there.
#[derive(Default)]
pub struct GeneratorRegistry {
    v6: Mutex<HashMap<Uuid6Option, SharedV6>>,
    v7: Mutex<HashMap<Uuid7Option, SharedV7>>,
    v4_rng: Mutex<Option<SystemRandom>>,
}

impl GeneratorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a UUIDv6 object with the default configuration.
    pub fn uuid6(&self) -> Result<Uuid, Error> {
        self.uuid6_with(Uuid6Option::default())
    }

    /// Generates a UUIDv6 object, routing to the cached generator for
    /// `option`.
    pub fn uuid6_with(&self, option: Uuid6Option) -> Result<Uuid, Error> {
        let generator = {
            let mut map = self.v6.lock().expect("newnewid: could not lock generator map");
            Arc::clone(map.entry(option).or_insert_with(|| {
                tracing::debug!(?option, "creating v6 generator");
                Arc::new(Mutex::new(V6Generator::new(
                    option,
                    SystemClock,
                    SystemRandom::default(),
                )))
            }))
        };
        let mut generator = generator.lock().expect("newnewid: could not lock generator");
        generator.generate()
    }

    /// Generates a UUIDv7 object with the default configuration (method 1,
    /// 12-bit counter).
    pub fn uuid7(&self) -> Result<Uuid, Error> {
        self.uuid7_with(Uuid7Option::default())
    }

    /// Generates a UUIDv7 object, routing to the cached generator for
    /// `option`.
    pub fn uuid7_with(&self, option: Uuid7Option) -> Result<Uuid, Error> {
        let generator = {
            let mut map = self.v7.lock().expect("newnewid: could not lock generator map");
            Arc::clone(map.entry(option).or_insert_with(|| {
                tracing::debug!(?option, "creating v7 generator");
                Arc::new(Mutex::new(V7Generator::new(
                    option,
                    SystemClock,
                    SystemRandom::default(),
                )))
            }))
        };
        let mut generator = generator.lock().expect("newnewid: could not lock generator");
        generator.generate()
    }

    /// Generates a UUIDv4 object.
    pub fn uuid4(&self) -> Uuid {
        let mut rng = self.v4_rng.lock().expect("newnewid: could not lock generator");
        let rng = rng.get_or_insert_with(SystemRandom::default);
        let mut bytes = rng.random_bits(128, Purpose::RandomField).to_be_bytes();
        bytes[6] = 0x40 | (bytes[6] >> 4);
        bytes[8] = 0x80 | (bytes[8] >> 2);
        Uuid::from(bytes)
    }
}

/// A thin wrapper to reset the state when the process ID changes (i.e.,
/// upon Unix forks).
struct GlobalRegistry {
    #[cfg(unix)]
    pid: u32,
    registry: Arc<GeneratorRegistry>,
}

impl Default for GlobalRegistry {
    fn default() -> Self {
        Self {
            #[cfg(unix)]
            pid: std::process::id(),
            registry: Arc::new(GeneratorRegistry::new()),
        }
    }
}

impl GlobalRegistry {
    /// Returns the inner registry, resetting it on Unix if the process ID
    /// has changed, to prevent forked processes from sharing entropy state.
    fn get(&mut self) -> Arc<GeneratorRegistry> {
        #[cfg(unix)]
        if self.pid != std::process::id() {
            *self = Default::default();
        }
        Arc::clone(&self.registry)
    }
}

/// Returns the process-wide registry, creating one if none exists. The
/// handle is cloned out so the short-lived global lock is never held across
/// a generation call.
fn global_registry() -> Arc<GeneratorRegistry> {
    static G: OnceLock<Mutex<GlobalRegistry>> = OnceLock::new();
    G.get_or_init(Default::default)
        .lock()
        .expect("newnewid: could not lock global registry")
        .get()
}

/// Generates a UUIDv6 object with the default configuration.
///
/// This function employs a process-wide generator per configuration and
/// guarantees the process-wide monotonic order of UUIDs generated under one
/// configuration.
pub fn uuid6() -> Result<Uuid, Error> {
    global_registry().uuid6()
}

/// Generates a UUIDv6 object with an explicit configuration.
pub fn uuid6_with(option: Uuid6Option) -> Result<Uuid, Error> {
    global_registry().uuid6_with(option)
}

/// Generates a UUIDv7 object with the default configuration (method 1,
/// 12-bit counter).
///
/// This function employs a process-wide generator per configuration and
/// guarantees the process-wide monotonic order of UUIDs generated under one
/// configuration.
///
/// # Examples
///
/// ```rust
/// let uuid = newnewid::uuid7()?;
/// println!("{}", uuid); // e.g., "017f22e2-79b0-7cc3-98c4-dc0c0c07398f"
/// println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
/// # Ok::<(), newnewid::Error>(())
/// ```
pub fn uuid7() -> Result<Uuid, Error> {
    global_registry().uuid7()
}

/// Generates a UUIDv7 object with an explicit configuration.
///
/// # Examples
///
/// ```rust
/// use newnewid::METHOD_2_MONOTONIC_RANDOM_62_BITS;
///
/// let uuid = newnewid::uuid7_with(METHOD_2_MONOTONIC_RANDOM_62_BITS)?;
/// println!("{}", uuid);
/// # Ok::<(), newnewid::Error>(())
/// ```
pub fn uuid7_with(option: Uuid7Option) -> Result<Uuid, Error> {
    global_registry().uuid7_with(option)
}

/// Generates a UUIDv7 object whose payload advances like a ULID random
/// part (method 2 with an increment of exactly one).
pub fn ulid_compatible() -> Result<Uuid, Error> {
    global_registry().uuid7_with(crate::v7::ULID_COMPATIBLE)
}

/// Generates a UUIDv4 object.
pub fn uuid4() -> Uuid {
    global_registry().uuid4()
}

/// Returns the Nil UUID (all bits zero).
pub fn nil_uuid() -> Uuid {
    Uuid::NIL
}

/// Returns the Max UUID (all bits one).
pub fn max_uuid() -> Uuid {
    Uuid::MAX
}
