extern crate std;

use soroban_sdk::{testutils::Address as _, Address, Env};

use crate::{ContractError, StakingRewardsContract, StakingRewardsContractClient};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn setup() -> (Env, StakingRewardsContractClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();

    let stake_token = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let reward_token = env.register_stellar_asset_contract_v2(Address::generate(&env));

    let contract_id = env.register(StakingRewardsContract, ());
    let client = StakingRewardsContractClient::new(&env, &contract_id);

    let owner = Address::generate(&env);
    client.initialize(&owner, &stake_token.address(), &reward_token.address());

    (env, client, owner)
}

// ── Propose / accept ─────────────────────────────────────────────────────────

#[test]
fn test_propose_and_accept_owner() {
    let (env, client, owner) = setup();
    let successor = Address::generate(&env);

    client.propose_owner(&owner, &successor);
    assert_eq!(client.pending_owner(), Some(successor.clone()));
    // Ownership does not move until accepted.
    assert_eq!(client.owner(), owner);

    client.accept_owner(&successor);
    assert_eq!(client.owner(), successor);
    assert_eq!(client.pending_owner(), None);
}

#[test]
fn test_new_owner_controls_duration() {
    let (env, client, owner) = setup();
    let successor = Address::generate(&env);

    client.propose_owner(&owner, &successor);
    client.accept_owner(&successor);

    client.set_rewards_duration(&successor, &3_600);
    assert_eq!(client.duration(), 3_600);

    match client.try_set_rewards_duration(&owner, &7_200) {
        Err(Ok(e)) => assert_eq!(e, ContractError::NotAuthorized),
        _ => unreachable!("Expected NotAuthorized error"),
    }
}

#[test]
fn test_non_owner_cannot_propose() {
    let (env, client, _owner) = setup();
    let intruder = Address::generate(&env);

    match client.try_propose_owner(&intruder, &intruder) {
        Err(Ok(e)) => assert_eq!(e, ContractError::NotAuthorized),
        _ => unreachable!("Expected NotAuthorized error"),
    }
    assert_eq!(client.pending_owner(), None);
}

#[test]
fn test_wrong_address_cannot_accept() {
    let (env, client, owner) = setup();
    let successor = Address::generate(&env);
    let intruder = Address::generate(&env);

    client.propose_owner(&owner, &successor);

    match client.try_accept_owner(&intruder) {
        Err(Ok(e)) => assert_eq!(e, ContractError::NotAuthorized),
        _ => unreachable!("Expected NotAuthorized error"),
    }
    assert_eq!(client.owner(), owner);
}

#[test]
fn test_accept_without_proposal_fails() {
    let (env, client, _owner) = setup();
    let someone = Address::generate(&env);

    match client.try_accept_owner(&someone) {
        Err(Ok(e)) => assert_eq!(e, ContractError::NoPendingOwner),
        _ => unreachable!("Expected NoPendingOwner error"),
    }
}

// ── Cancel ───────────────────────────────────────────────────────────────────

#[test]
fn test_cancel_owner_transfer() {
    let (env, client, owner) = setup();
    let successor = Address::generate(&env);

    client.propose_owner(&owner, &successor);
    client.cancel_owner_transfer(&owner);
    assert_eq!(client.pending_owner(), None);

    match client.try_accept_owner(&successor) {
        Err(Ok(e)) => assert_eq!(e, ContractError::NoPendingOwner),
        _ => unreachable!("Expected NoPendingOwner error"),
    }
}

#[test]
fn test_cancel_without_proposal_fails() {
    let (_env, client, owner) = setup();

    match client.try_cancel_owner_transfer(&owner) {
        Err(Ok(e)) => assert_eq!(e, ContractError::NoPendingOwner),
        _ => unreachable!("Expected NoPendingOwner error"),
    }
}

#[test]
fn test_non_owner_cannot_cancel() {
    let (env, client, owner) = setup();
    let successor = Address::generate(&env);
    client.propose_owner(&owner, &successor);

    match client.try_cancel_owner_transfer(&successor) {
        Err(Ok(e)) => assert_eq!(e, ContractError::NotAuthorized),
        _ => unreachable!("Expected NotAuthorized error"),
    }
    assert_eq!(client.pending_owner(), Some(successor));
}
