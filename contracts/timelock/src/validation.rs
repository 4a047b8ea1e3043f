use soroban_sdk::{token, Address, Env};

use crate::ContractError;

/// Locked amounts must be strictly positive.
pub fn validate_amount(amount: i128) -> Result<(), ContractError> {
    if amount <= 0 {
        return Err(ContractError::InvalidAmount);
    }
    Ok(())
}

/// The unlock point must lie strictly after the ledger time of creation.
pub fn validate_unlock_time(now: u64, unlock_timestamp: u64) -> Result<(), ContractError> {
    if unlock_timestamp <= now {
        return Err(ContractError::InvalidUnlockTime);
    }
    Ok(())
}

/// A token lock may not hold the native asset (that is a native lock) or
/// point at this contract, and `token` must answer the token interface.
pub fn validate_token(env: &Env, token: &Address, native: &Address) -> Result<(), ContractError> {
    let custody = env.current_contract_address();
    if token == native || *token == custody {
        return Err(ContractError::InvalidTokenAccount);
    }

    match token::Client::new(env, token).try_balance(&custody) {
        Ok(Ok(_)) => Ok(()),
        _ => Err(ContractError::InvalidTokenAccount),
    }
}
