use anchor_lang::prelude::*;

#[event]
pub struct ProgramInitialized {
    pub authority: Pubkey,
    pub stake_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub reward_rate: u64,
    pub timestamp: i64,
}

#[event]
pub struct VaultInitialized {
    pub user: Pubkey,
    pub vault: Pubkey,
    pub token_account: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct Staked {
    pub user: Pubkey,
    pub amount: u64,
    pub staked_amount: u64,
    pub total_staked: u64,
    pub timestamp: i64,
}

#[event]
pub struct Unstaked {
    pub user: Pubkey,
    pub amount: u64,
    pub staked_amount: u64,
    pub total_staked: u64,
    pub timestamp: i64,
}

#[event]
pub struct YieldAccrued {
    pub user: Pubkey,
    pub reward_debt: u64,
    pub timestamp: i64,
}

#[event]
pub struct RewardsClaimed {
    pub user: Pubkey,
    pub amount: u64,
    pub mint: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct VaultAuthoritySet {
    pub user: Pubkey,
    pub vault: Pubkey,
    pub token_account: Pubkey,
    pub timestamp: i64,
}
