use soroban_sdk::{contracttype, symbol_short, xdr::ToXdr, Address, Bytes, BytesN, Env, Symbol};

use crate::{derive, extend_persistent, ContractError};

// ── Storage key constants ───────────────────────────────────────────────────

const LOCK: Symbol = symbol_short!("LOCK");

const NATIVE_SEED: &[u8] = b"timelock_native";
const TOKEN_SEED: &[u8] = b"timelock_token";

// ── Types ───────────────────────────────────────────────────────────────────

/// The two kinds of asset a lock can hold.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssetClass {
    NativeCoin,
    FungibleToken,
}

impl AssetClass {
    fn seed(&self) -> &'static [u8] {
        match self {
            AssetClass::NativeCoin => NATIVE_SEED,
            AssetClass::FungibleToken => TOKEN_SEED,
        }
    }
}

/// Reference to a record slot. There is exactly one slot per
/// (owner, asset class) pair.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockRef {
    pub owner: Address,
    pub asset_class: AssetClass,
}

impl LockRef {
    pub fn new(owner: Address, asset_class: AssetClass) -> Self {
        Self { owner, asset_class }
    }

    /// Derived address of the record slot. Seeds the vault derivation.
    pub fn record_address(&self, env: &Env) -> BytesN<32> {
        let seeds = [
            Bytes::from_slice(env, self.asset_class.seed()),
            self.owner.clone().to_xdr(env),
        ];
        derive::canonical_address(env, &seeds)
    }
}

/// A live timelock.
///
/// Every field is fixed at creation. The record leaves storage when the lock
/// is withdrawn, so a slot either holds a live record or nothing.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimelockRecord {
    /// Sole identity allowed to withdraw.
    pub owner: Address,
    pub asset_class: AssetClass,
    /// Asset contract held by the vault. For `NativeCoin` this is the
    /// native asset contract bound at deployment.
    pub token: Address,
    /// Quantity deposited at creation.
    pub amount: i128,
    pub created_timestamp: u64,
    /// Earliest ledger timestamp at which withdrawal is allowed.
    pub unlock_timestamp: u64,
    pub is_initialized: bool,
    pub record_address: BytesN<32>,
    pub vault: BytesN<32>,
    pub vault_bump: u32,
    /// Token sub-account of the vault; `None` for native locks.
    pub vault_token_account: Option<BytesN<32>>,
}

impl TimelockRecord {
    pub fn lock_ref(&self) -> LockRef {
        LockRef::new(self.owner.clone(), self.asset_class.clone())
    }

    pub fn is_unlocked(&self, now: u64) -> bool {
        now >= self.unlock_timestamp
    }
}

// ── Storage helpers ─────────────────────────────────────────────────────────

fn lock_key(lock: &LockRef) -> (Symbol, LockRef) {
    (LOCK, lock.clone())
}

/// Retrieve the live record in a slot, returning `None` when the slot is
/// empty or holds a closed record.
pub fn load(env: &Env, lock: &LockRef) -> Option<TimelockRecord> {
    let key = lock_key(lock);
    let record: TimelockRecord = env.storage().persistent().get(&key)?;
    if !record.is_initialized {
        return None;
    }
    extend_persistent(env, &key);
    Some(record)
}

pub fn require_live(env: &Env, lock: &LockRef) -> Result<TimelockRecord, ContractError> {
    load(env, lock).ok_or(ContractError::RecordNotFound)
}

/// Refuse to create a record in an occupied slot.
pub fn ensure_vacant(env: &Env, lock: &LockRef) -> Result<(), ContractError> {
    if load(env, lock).is_some() {
        return Err(ContractError::AlreadyInitialized);
    }
    Ok(())
}

/// Persist a record under its slot key.
pub fn store(env: &Env, record: &TimelockRecord) {
    let key = lock_key(&record.lock_ref());
    env.storage().persistent().set(&key, record);
    extend_persistent(env, &key);
}

/// Close a slot. A later lock for the same pair starts from an empty slot.
pub fn close(env: &Env, lock: &LockRef) {
    env.storage().persistent().remove(&lock_key(lock));
}
