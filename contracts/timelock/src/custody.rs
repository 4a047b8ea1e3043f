//! Vault custody.
//!
//! Locked funds are held by this contract's own address and partitioned into
//! vaults, one per record, each at an address derived from the record slot.
//! A vault's balance is credited only by [`receive`] and debited only by
//! [`release`]; tokens sent to the contract by any other route are never
//! attributed to a vault.

use soroban_sdk::{contracttype, log, symbol_short, token, Address, Bytes, BytesN, Env, Symbol};

use crate::record::{LockRef, TimelockRecord};
use crate::{derive, extend_persistent, ContractError};

const VAULT: Symbol = symbol_short!("VAULT");

const VAULT_SEED: &[u8] = b"vault";
const VAULT_TOKEN_SEED: &[u8] = b"vault_token_account";

/// Custody addresses bound to one record slot.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultAddresses {
    pub record_address: BytesN<32>,
    pub vault: BytesN<32>,
    pub vault_bump: u32,
    /// Derived identifier for `FungibleToken` locks only. It holds no
    /// balance; custody is always the contract address.
    pub token_account: Option<BytesN<32>>,
}

impl VaultAddresses {
    pub fn from_record(record: &TimelockRecord) -> Self {
        Self {
            record_address: record.record_address.clone(),
            vault: record.vault.clone(),
            vault_bump: record.vault_bump,
            token_account: record.vault_token_account.clone(),
        }
    }
}

/// A funded vault.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vault {
    pub address: BytesN<32>,
    pub token_account: Option<BytesN<32>>,
    /// The only record this vault pays out to.
    pub lock: LockRef,
    pub asset: Address,
    pub balance: i128,
}

fn vault_key(address: &BytesN<32>) -> (Symbol, BytesN<32>) {
    (VAULT, address.clone())
}

fn vault_seeds(env: &Env, record_address: &BytesN<32>) -> [Bytes; 2] {
    [
        Bytes::from_slice(env, VAULT_SEED),
        Bytes::from_array(env, &record_address.to_array()),
    ]
}

fn token_account_address(env: &Env, vault: &BytesN<32>) -> BytesN<32> {
    let seeds = [
        Bytes::from_slice(env, VAULT_TOKEN_SEED),
        Bytes::from_array(env, &vault.to_array()),
    ];
    derive::canonical_address(env, &seeds)
}

/// Derive fresh custody addresses for a lock, skipping any candidate that
/// already holds a vault.
pub fn derive_vault(env: &Env, lock: &LockRef) -> Result<VaultAddresses, ContractError> {
    let record_address = lock.record_address(env);
    let seeds = vault_seeds(env, &record_address);
    let (vault, vault_bump) = derive::find_address(env, &seeds, |candidate| {
        !env.storage().persistent().has(&vault_key(candidate))
    })?;

    let token_account = match lock.asset_class {
        crate::AssetClass::NativeCoin => None,
        crate::AssetClass::FungibleToken => Some(token_account_address(env, &vault)),
    };

    Ok(VaultAddresses {
        record_address,
        vault,
        vault_bump,
        token_account,
    })
}

/// Reject a caller-supplied vault address unless it is the one re-derived
/// from the record's slot and stored bump.
pub fn verify_vault_address(
    env: &Env,
    record: &TimelockRecord,
    supplied: &BytesN<32>,
) -> Result<(), ContractError> {
    let record_address = record.lock_ref().record_address(env);
    let expected = derive::create_address(
        env,
        &vault_seeds(env, &record_address),
        record.vault_bump,
    );

    if record.record_address != record_address || record.vault != expected || *supplied != expected
    {
        return Err(ContractError::AddressMismatch);
    }

    if let Some(token_account) = &record.vault_token_account {
        if *token_account != token_account_address(env, &expected) {
            return Err(ContractError::AddressMismatch);
        }
    }

    Ok(())
}

/// Move `amount` of `asset` from `from` into a new vault.
///
/// This is the vault's only inbound path. A vault that already exists cannot
/// be credited again.
pub fn receive(
    env: &Env,
    addresses: &VaultAddresses,
    lock: &LockRef,
    asset: &Address,
    from: &Address,
    amount: i128,
) -> Result<Vault, ContractError> {
    let key = vault_key(&addresses.vault);
    if env.storage().persistent().has(&key) {
        return Err(ContractError::OwnerMismatch);
    }

    let client = token::Client::new(env, asset);
    if client.balance(from) < amount {
        return Err(ContractError::InsufficientFunds);
    }

    // Vaults of one asset share the contract balance: the amount that
    // arrives must equal the amount recorded.
    let custody = env.current_contract_address();
    let before = client.balance(&custody);
    client.transfer(from, &custody, &amount);
    let received = client.balance(&custody) - before;
    if received != amount {
        log!(env, "token delivered less than requested", amount, received);
        return Err(ContractError::DepositMismatch);
    }

    let vault = Vault {
        address: addresses.vault.clone(),
        token_account: addresses.token_account.clone(),
        lock: lock.clone(),
        asset: asset.clone(),
        balance: amount,
    };
    env.storage().persistent().set(&key, &vault);
    extend_persistent(env, &key);

    Ok(vault)
}

/// Pay a record's full amount out of its vault to `to` and close the vault.
pub fn release(env: &Env, record: &TimelockRecord, to: &Address) -> Result<i128, ContractError> {
    let key = vault_key(&record.vault);
    let vault = load(env, &record.vault).ok_or(ContractError::VaultNotFound)?;

    if vault.lock != record.lock_ref() || vault.asset != record.token {
        return Err(ContractError::OwnerMismatch);
    }
    if vault.balance != record.amount {
        return Err(ContractError::VaultBalanceMismatch);
    }

    token::Client::new(env, &vault.asset).transfer(
        &env.current_contract_address(),
        to,
        &vault.balance,
    );
    env.storage().persistent().remove(&key);

    Ok(vault.balance)
}

/// Retrieve a vault, returning `None` when it does not exist or is closed.
pub fn load(env: &Env, address: &BytesN<32>) -> Option<Vault> {
    let key = vault_key(address);
    let vault = env.storage().persistent().get(&key)?;
    extend_persistent(env, &key);
    Some(vault)
}

pub fn balance(env: &Env, address: &BytesN<32>) -> i128 {
    load(env, address).map(|vault| vault.balance).unwrap_or(0)
}
