#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, BytesN, Env,
};
use timelock::{AssetClass, ContractError, LockRef, TimelockContract, TimelockContractClient};

#[derive(Arbitrary, Debug)]
enum Op {
    Lock {
        owner: bool,
        token: bool,
        amount: i64,
        unlock_offset: i32,
    },
    Withdraw {
        by_owner: bool,
        owner: bool,
        token: bool,
        forge_vault: bool,
    },
    Advance(u16),
}

#[derive(Arbitrary, Debug)]
struct Input {
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_000_000);

    let native_sac = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let token_sac = env.register_stellar_asset_contract_v2(Address::generate(&env));

    let contract_id = env.register(TimelockContract, (native_sac.address(),));
    let client = TimelockContractClient::new(&env, &contract_id);

    let owners = [Address::generate(&env), Address::generate(&env)];
    let outsider = Address::generate(&env);
    for sac in [&native_sac, &token_sac] {
        let minter = token::StellarAssetClient::new(&env, &sac.address());
        for owner in &owners {
            minter.mint(owner, &(i64::MAX as i128));
        }
    }
    let custody = [
        token::Client::new(&env, &native_sac.address()),
        token::Client::new(&env, &token_sac.address()),
    ];

    for op in input.ops.into_iter().take(32) {
        let now = env.ledger().timestamp();
        match op {
            Op::Lock {
                owner,
                token,
                amount,
                unlock_offset,
            } => {
                let owner = &owners[owner as usize];
                let amount = i128::from(amount);
                let unlock_at = now.saturating_add_signed(i64::from(unlock_offset));
                let result = if token {
                    client.try_initialize_token_lock(owner, &token_sac.address(), &amount, &unlock_at)
                } else {
                    client.try_initialize_native_lock(owner, &amount, &unlock_at)
                };

                if let Ok(Ok(record)) = result {
                    assert!(amount > 0);
                    assert!(record.unlock_timestamp > record.created_timestamp);
                    assert_eq!(client.vault_balance(&record.vault), amount);
                }
            }
            Op::Withdraw {
                by_owner,
                owner,
                token,
                forge_vault,
            } => {
                let owner = &owners[owner as usize];
                let class = if token {
                    AssetClass::FungibleToken
                } else {
                    AssetClass::NativeCoin
                };
                let lock = LockRef::new(owner.clone(), class);
                let caller = if by_owner { owner.clone() } else { outsider.clone() };
                let live = client.try_get_lock(&lock).ok().and_then(Result::ok);
                let vault = match (&live, forge_vault) {
                    (Some(record), false) => record.vault.clone(),
                    _ => BytesN::from_array(&env, &[0xAB; 32]),
                };

                let result = client.try_withdraw(&caller, &lock, &vault);
                match (live, result) {
                    (Some(record), Ok(Ok(released))) => {
                        assert!(by_owner && !forge_vault);
                        assert!(now >= record.unlock_timestamp);
                        assert_eq!(released, record.amount);
                        assert!(!client.has_lock(&lock));
                        assert_eq!(client.vault_balance(&record.vault), 0);
                    }
                    (Some(record), Err(Ok(error))) => {
                        assert!(client.has_lock(&lock));
                        assert_eq!(client.vault_balance(&record.vault), record.amount);
                        if !by_owner {
                            assert_eq!(error, ContractError::Unauthorized);
                        } else if now < record.unlock_timestamp && !forge_vault {
                            assert_eq!(error, ContractError::TimeNotExpired);
                        }
                    }
                    (None, result) => {
                        assert_eq!(result, Err(Ok(ContractError::RecordNotFound)));
                    }
                    (Some(_), other) => panic!("unexpected withdraw outcome: {other:?}"),
                }
            }
            Op::Advance(seconds) => {
                env.ledger().set_timestamp(now + u64::from(seconds));
            }
        }

        // Custody holds exactly the sum of live vaults.
        for (index, class) in [AssetClass::NativeCoin, AssetClass::FungibleToken]
            .into_iter()
            .enumerate()
        {
            let locked: i128 = owners
                .iter()
                .filter_map(|owner| client.try_get_lock(&LockRef::new(owner.clone(), class.clone())).ok())
                .filter_map(Result::ok)
                .map(|record| record.amount)
                .sum();
            assert_eq!(custody[index].balance(&contract_id), locked);
        }
    }
});
