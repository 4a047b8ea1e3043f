#![no_std]

mod custody;
mod derive;
pub mod events;
mod record;
mod validation;

pub use custody::{Vault, VaultAddresses};
pub use record::{AssetClass, LockRef, TimelockRecord};

use soroban_sdk::{
    contract, contractimpl, log, symbol_short, Address, BytesN, Env, IntoVal, Symbol, Val,
};

/// Storage keys for the contract
const NATIVE: Symbol = symbol_short!("NATIVE");

/// Contract errors
///
/// Codes are part of the public interface: callers branch on them, in
/// particular on `TimeNotExpired`, which is the only retriable failure.
#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    NotConfigured = 1,
    AlreadyInitialized = 2,
    InvalidUnlockTime = 3,
    InsufficientFunds = 4,
    InvalidAmount = 5,
    InvalidTokenAccount = 6,
    Unauthorized = 7,
    OwnerMismatch = 8,
    AddressMismatch = 9,
    TimeNotExpired = 10,
    RecordNotFound = 11,
    VaultNotFound = 12,
    VaultBalanceMismatch = 13,
    AddressSpaceExhausted = 14,
    DepositMismatch = 15,
}

/// Keep a persistent entry alive for as long as the network allows.
pub(crate) fn extend_persistent<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    let max_ttl = env.storage().max_ttl();
    env.storage()
        .persistent()
        .extend_ttl(key, max_ttl / 2, max_ttl);
}

fn extend_instance(env: &Env) {
    let max_ttl = env.storage().max_ttl();
    env.storage().instance().extend_ttl(max_ttl / 2, max_ttl);
}

#[contract]
pub struct TimelockContract;

#[contractimpl]
impl TimelockContract {
    /// Bind the contract to the network's native asset contract.
    ///
    /// Runs once, atomically with deployment. The native asset is the token
    /// used for `NativeCoin` locks and is refused as a `FungibleToken`.
    pub fn __constructor(env: Env, native_asset: Address) {
        env.storage().instance().set(&NATIVE, &native_asset);
        extend_instance(&env);

        events::publish_configured(&env, native_asset);
    }

    /// Get the native asset contract address
    pub fn native_asset(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&NATIVE)
            .ok_or(ContractError::NotConfigured)
    }

    /// Lock `amount` of the native coin for `owner` until `unlock_timestamp`.
    pub fn initialize_native_lock(
        env: Env,
        owner: Address,
        amount: i128,
        unlock_timestamp: u64,
    ) -> Result<TimelockRecord, ContractError> {
        let native = Self::native_asset(env.clone())?;
        let lock = LockRef::new(owner, AssetClass::NativeCoin);
        lock_funds(&env, lock, native, amount, unlock_timestamp)
    }

    /// Lock `amount` of `token` for `owner` until `unlock_timestamp`.
    pub fn initialize_token_lock(
        env: Env,
        owner: Address,
        token: Address,
        amount: i128,
        unlock_timestamp: u64,
    ) -> Result<TimelockRecord, ContractError> {
        let native = Self::native_asset(env.clone())?;
        validation::validate_token(&env, &token, &native)?;
        let lock = LockRef::new(owner, AssetClass::FungibleToken);
        lock_funds(&env, lock, token, amount, unlock_timestamp)
    }

    /// Release a matured lock to its owner and close both record and vault.
    ///
    /// `vault` is the caller's view of the custody address. It is checked
    /// against the address re-derived from the record and never used to
    /// route funds.
    ///
    /// Fails with `TimeNotExpired` while the ledger time is before the
    /// unlock timestamp; callers retry after that point.
    pub fn withdraw(
        env: Env,
        caller: Address,
        lock: LockRef,
        vault: BytesN<32>,
    ) -> Result<i128, ContractError> {
        caller.require_auth();

        let record = record::require_live(&env, &lock)?;
        if caller != record.owner {
            log!(&env, "withdrawal attempted by non-owner", caller);
            return Err(ContractError::Unauthorized);
        }

        custody::verify_vault_address(&env, &record, &vault)?;

        let now = env.ledger().timestamp();
        if !record.is_unlocked(now) {
            log!(
                &env,
                "withdrawal attempted before unlock time",
                now,
                record.unlock_timestamp
            );
            return Err(ContractError::TimeNotExpired);
        }

        let released = custody::release(&env, &record, &record.owner)?;
        record::close(&env, &lock);

        events::publish_withdrawn(&env, &record, released, now);

        Ok(released)
    }

    /// Get the live record for a lock
    pub fn get_lock(env: Env, lock: LockRef) -> Result<TimelockRecord, ContractError> {
        record::require_live(&env, &lock)
    }

    /// Check whether a live record occupies the lock's slot
    pub fn has_lock(env: Env, lock: LockRef) -> bool {
        record::load(&env, &lock).is_some()
    }

    /// Whether the ledger time has reached the lock's unlock timestamp
    pub fn is_unlocked(env: Env, lock: LockRef) -> Result<bool, ContractError> {
        let record = record::require_live(&env, &lock)?;
        Ok(record.is_unlocked(env.ledger().timestamp()))
    }

    /// Custody addresses for a lock.
    ///
    /// For a live lock these are the addresses bound at creation; otherwise
    /// they are the addresses the next `initialize_*_lock` would use.
    pub fn derive_vault(env: Env, lock: LockRef) -> Result<VaultAddresses, ContractError> {
        match record::load(&env, &lock) {
            Some(record) => Ok(VaultAddresses::from_record(&record)),
            None => custody::derive_vault(&env, &lock),
        }
    }

    /// Get a vault by its derived address
    pub fn get_vault(env: Env, vault: BytesN<32>) -> Result<Vault, ContractError> {
        custody::load(&env, &vault).ok_or(ContractError::VaultNotFound)
    }

    /// Balance held by a vault; zero once the vault is closed
    pub fn vault_balance(env: Env, vault: BytesN<32>) -> i128 {
        custody::balance(&env, &vault)
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }
}

fn lock_funds(
    env: &Env,
    lock: LockRef,
    token: Address,
    amount: i128,
    unlock_timestamp: u64,
) -> Result<TimelockRecord, ContractError> {
    lock.owner.require_auth();

    record::ensure_vacant(env, &lock)?;

    let now = env.ledger().timestamp();
    validation::validate_amount(amount)?;
    validation::validate_unlock_time(now, unlock_timestamp)?;

    let addresses = custody::derive_vault(env, &lock)?;
    custody::receive(env, &addresses, &lock, &token, &lock.owner, amount)?;

    let record = TimelockRecord {
        owner: lock.owner.clone(),
        asset_class: lock.asset_class.clone(),
        token,
        amount,
        created_timestamp: now,
        unlock_timestamp,
        is_initialized: true,
        record_address: addresses.record_address,
        vault: addresses.vault,
        vault_bump: addresses.vault_bump,
        vault_token_account: addresses.token_account,
    };
    record::store(env, &record);

    events::publish_locked(env, &record);

    Ok(record)
}
