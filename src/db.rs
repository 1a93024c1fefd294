//! LMDB storage for role and feature bitmasks
//!
//! The layout is additive: later versions may add databases or meta keys
//! but never reinterpret existing ones, so data written by one version is
//! read by the next without migration.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use heed::types::{Str, U64};
use heed::{BoxedError, BytesDecode, BytesEncode, Database, Env, EnvOpenOptions, RoTxn};
use tracing::debug;

use crate::config::Config;
use crate::constants::DEFAULT_MAP_SIZE;
use crate::error::Result;
use crate::mask::Mask;
use crate::tx::Tx;

/// Stores a [`Mask`] as 32 big-endian bytes.
pub enum MaskCodec {}

impl<'a> BytesEncode<'a> for MaskCodec {
    type EItem = Mask;

    fn bytes_encode(item: &'a Mask) -> std::result::Result<Cow<'a, [u8]>, BoxedError> {
        Ok(Cow::Owned(item.to_be_bytes().to_vec()))
    }
}

impl<'a> BytesDecode<'a> for MaskCodec {
    type DItem = Mask;

    fn bytes_decode(bytes: &'a [u8]) -> std::result::Result<Mask, BoxedError> {
        Mask::from_be_slice(bytes).map_err(|e| Box::new(e) as BoxedError)
    }
}

// Database type aliases
pub type RoleDb = Database<U64<byteorder::BigEndian>, MaskCodec>;
pub type FeatureDb = Database<Str, MaskCodec>;
pub type MetaDb = Database<Str, U64<byteorder::BigEndian>>;

// Keys in the `features` and `meta` databases
pub(crate) const FEATURES_KEY: &str = "features";
pub(crate) const INITIALIZED_KEY: &str = "initialized";
pub(crate) const IMPLEMENTATION_KEY: &str = "implementation";

/// All database handles
pub struct Dbs {
    /// operator id -> role mask
    pub roles: RoleDb,
    /// "features" -> feature mask
    pub features: FeatureDb,
    /// "initialized" -> initializer version, "implementation" -> proxy target version
    pub meta: MetaDb,
}

/// An opened LMDB environment holding one access-control instance.
pub struct Storage {
    env: Env,
    dbs: Dbs,
    path: PathBuf,
}

impl Storage {
    /// Open (or create) storage at `path` with the default map size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, DEFAULT_MAP_SIZE)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open_with(&config.db_path, config.map_size)
    }

    pub fn open_with(path: impl AsRef<Path>, map_size: usize) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        // SAFETY: LMDB requires no other processes access this path concurrently during open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(3)
                .open(path)?
        };
        let mut tx = env.write_txn()?;
        let dbs = Dbs {
            roles: env.create_database(&mut tx, Some("roles"))?,
            features: env.create_database(&mut tx, Some("features"))?,
            meta: env.create_database(&mut tx, Some("meta"))?,
        };
        tx.commit()?;
        debug!(path = %path.display(), "storage opened");
        Ok(Storage { env, dbs, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute a read-only operation
    #[inline]
    pub(crate) fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        f(&self.dbs, &self.env.read_txn()?)
    }

    /// Run `f` in a single write transaction. Commits on `Ok`; on `Err`
    /// the transaction is dropped and nothing is written.
    pub(crate) fn transact<T, F: FnOnce(&mut Tx) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = Tx::new(self.env.write_txn()?, &self.dbs);
        let r = f(&mut tx)?;
        tx.commit()?;
        Ok(r)
    }

    /// Clear all databases (for testing)
    pub fn clear_all(&self) -> Result<()> {
        self.transact(|tx| tx.clear())
    }
}
