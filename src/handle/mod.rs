//! Generic handle shared by every handle family.
//!
//! A [`BaseHandle`] carries the identity sentinel, a process-unique
//! [`HandleId`], and two stores: string options and opaque typed data.
//! Specialized handles embed a `BaseHandle` as their first field and
//! implement [`Handle`], which gives them the generic capability set.

mod id;
mod store;

pub use id::{HandleId, ParseHandleIdError};
pub use store::{DataStore, OptionStore};

use tracing::{debug, error};

use crate::error::CliError;
use crate::Result;

/// Identity sentinel stored in every live handle.
pub const CLICON_MAGIC: u32 = 0x99aa_fabe;

/// Sentinel written into a handle when it is torn down.
const DEAD_MAGIC: u32 = 0;

/// The generic handle: identity plus option and data stores.
#[derive(Debug)]
pub struct BaseHandle {
    pub(crate) magic: u32,
    id: HandleId,
    options: OptionStore,
    data: DataStore,
}

impl BaseHandle {
    /// Create a live handle with empty stores.
    pub fn new() -> Self {
        let handle = Self {
            magic: CLICON_MAGIC,
            id: HandleId::new(),
            options: OptionStore::new(),
            data: DataStore::new(),
        };
        debug!(handle = %handle.id, "handle initialized");
        handle
    }

    /// Check the identity sentinel.
    pub fn check(&self) -> Result<()> {
        if self.magic == CLICON_MAGIC {
            Ok(())
        } else {
            Err(CliError::InvalidHandle {
                expected: CLICON_MAGIC,
                found: self.magic,
            })
        }
    }

    /// Whether the sentinel is intact.
    pub fn is_valid(&self) -> bool {
        self.magic == CLICON_MAGIC
    }

    /// Assert the identity sentinel.
    ///
    /// # Panics
    ///
    /// Panics if the sentinel is wrong. A bad sentinel means the caller
    /// holds a torn-down or corrupted handle; there is nothing to recover.
    #[track_caller]
    pub fn assert_valid(&self) {
        if let Err(err) = self.check() {
            error!(handle = %self.id, error = %err, "handle identity check failed");
            panic!("{}", err);
        }
    }

    /// The handle's identity.
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Tear the handle down: release both stores and invalidate the sentinel.
    pub(crate) fn exit(&mut self) {
        self.assert_valid();
        self.options.clear();
        self.data.clear();
        self.magic = DEAD_MAGIC;
        debug!(handle = %self.id, "handle torn down");
    }
}

impl Default for BaseHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// The "is-a generic handle" capability.
///
/// Implementors expose their embedded [`BaseHandle`]; the provided methods
/// check identity before every store access.
pub trait Handle {
    /// The embedded generic handle.
    fn base(&self) -> &BaseHandle;

    /// The embedded generic handle, mutably.
    fn base_mut(&mut self) -> &mut BaseHandle;

    /// Recoverable identity check for callers crossing a trust boundary.
    fn check(&self) -> Result<()> {
        self.base().check()
    }

    /// The handle's identity.
    fn id(&self) -> HandleId {
        let base = self.base();
        base.assert_valid();
        base.id()
    }

    /// Option store.
    fn options(&self) -> &OptionStore {
        let base = self.base();
        base.assert_valid();
        &base.options
    }

    /// Option store, mutably.
    fn options_mut(&mut self) -> &mut OptionStore {
        let base = self.base_mut();
        base.assert_valid();
        &mut base.options
    }

    /// Data store.
    fn data(&self) -> &DataStore {
        let base = self.base();
        base.assert_valid();
        &base.data
    }

    /// Data store, mutably.
    fn data_mut(&mut self) -> &mut DataStore {
        let base = self.base_mut();
        base.assert_valid();
        &mut base.data
    }
}

impl Handle for BaseHandle {
    fn base(&self) -> &BaseHandle {
        self
    }

    fn base_mut(&mut self) -> &mut BaseHandle {
        self
    }
}
