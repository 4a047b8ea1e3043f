//! Deterministic address derivation.
//!
//! Addresses are SHA-256 digests over a fixed namespace, this contract's own
//! address, an ordered list of seeds and a bump. Nothing outside the contract
//! can choose one, so custody locations are always recomputed rather than
//! taken from callers.

use soroban_sdk::{xdr::ToXdr, Bytes, BytesN, Env};

use crate::ContractError;

const NAMESPACE: &[u8] = b"timelock/derived-address/v1";

/// First bump tried by [`find_address`].
pub const CANONICAL_BUMP: u32 = 255;

/// Address for `seeds` at a known `bump`.
pub fn create_address(env: &Env, seeds: &[Bytes], bump: u32) -> BytesN<32> {
    let mut preimage = Bytes::from_slice(env, NAMESPACE);
    preimage.append(&env.current_contract_address().to_xdr(env));
    for seed in seeds {
        // Length prefix keeps ["ab", "c"] and ["a", "bc"] apart.
        preimage.extend_from_slice(&seed.len().to_be_bytes());
        preimage.append(seed);
    }
    preimage.extend_from_slice(&bump.to_be_bytes());

    env.crypto().sha256(&preimage).to_bytes()
}

/// Address for `seeds` at [`CANONICAL_BUMP`].
pub fn canonical_address(env: &Env, seeds: &[Bytes]) -> BytesN<32> {
    create_address(env, seeds, CANONICAL_BUMP)
}

/// Search bumps from [`CANONICAL_BUMP`] down to zero and return the first
/// candidate `is_vacant` accepts, together with its bump.
pub fn find_address<F>(
    env: &Env,
    seeds: &[Bytes],
    is_vacant: F,
) -> Result<(BytesN<32>, u32), ContractError>
where
    F: Fn(&BytesN<32>) -> bool,
{
    for bump in (0..=CANONICAL_BUMP).rev() {
        let candidate = create_address(env, seeds, bump);
        if is_vacant(&candidate) {
            return Ok((candidate, bump));
        }
    }

    Err(ContractError::AddressSpaceExhausted)
}
