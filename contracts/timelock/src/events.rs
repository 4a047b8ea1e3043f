use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env};

use crate::record::{AssetClass, TimelockRecord};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfiguredEvent {
    pub native_asset: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockedEvent {
    pub owner: Address,
    pub asset_class: AssetClass,
    pub token: Address,
    pub amount: i128,
    pub unlock_timestamp: u64,
    pub vault: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub owner: Address,
    pub asset_class: AssetClass,
    pub token: Address,
    pub amount: i128,
    pub vault: BytesN<32>,
    pub timestamp: u64,
}

pub fn publish_configured(env: &Env, native_asset: Address) {
    env.events()
        .publish((symbol_short!("CONFIG"),), ConfiguredEvent { native_asset });
}

pub fn publish_locked(env: &Env, record: &TimelockRecord) {
    env.events().publish(
        (symbol_short!("LOCKED"), record.owner.clone()),
        LockedEvent {
            owner: record.owner.clone(),
            asset_class: record.asset_class.clone(),
            token: record.token.clone(),
            amount: record.amount,
            unlock_timestamp: record.unlock_timestamp,
            vault: record.vault.clone(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, record: &TimelockRecord, amount: i128, timestamp: u64) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), record.owner.clone()),
        WithdrawnEvent {
            owner: record.owner.clone(),
            asset_class: record.asset_class.clone(),
            token: record.token.clone(),
            amount,
            vault: record.vault.clone(),
            timestamp,
        },
    );
}
