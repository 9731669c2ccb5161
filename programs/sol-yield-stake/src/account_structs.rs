use crate::error::*;
use crate::guard::get_program_data_address;
use crate::state::*;
use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

#[derive(Accounts)]
pub struct InitializeProgram<'info> {
    // init_if_needed so a second call reaches the handler and fails with AlreadyInitialized
    #[account(
        init_if_needed,
        payer = authority,
        space = GlobalState::LEN,
        seeds = [GLOBAL_SEED],
        bump
    )]
    pub global_state: Account<'info, GlobalState>,

    /// CHECK: This is a PDA that acts as the reward mint authority, validated by seeds constraint.
    /// Every reward mint is signed with these seeds; nothing else can mint rewards.
    #[account(
        seeds = [REWARD_AUTHORITY_SEED],
        bump
    )]
    pub reward_mint_authority: UncheckedAccount<'info>,

    pub stake_mint: Account<'info, Mint>,

    #[account(mut)]
    pub reward_mint: Account<'info, Mint>,

    #[account(mut)]
    pub authority: Signer<'info>,

    /// CHECK: This is the program data account that contains the update authority
    #[account(
        constraint = program_data.key() == get_program_data_address(&crate::id()) @ CustomErrorCode::InvalidProgramData
    )]
    pub program_data: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(
        seeds = [GLOBAL_SEED],
        bump = global_state.bump
    )]
    pub global_state: Account<'info, GlobalState>,

    #[account(
        init_if_needed,
        payer = user,
        space = Vault::LEN,
        seeds = [VAULT_SEED, user.key().as_ref()],
        bump
    )]
    pub vault: Account<'info, Vault>,

    /// Stake-mint account the user will later hand over to the vault.
    /// Mint and owner are checked in the handler, after the already-initialized check.
    pub vault_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Stake<'info> {
    #[account(
        mut,
        seeds = [GLOBAL_SEED],
        bump = global_state.bump
    )]
    pub global_state: Account<'info, GlobalState>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.owner.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        address = vault.token_account @ CustomErrorCode::InvalidVaultTokenAccount,
        constraint = vault_token_account.owner == vault.custody_owner(vault.key()) @ CustomErrorCode::InvalidVaultAuthority
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_stake_account.mint == global_state.stake_mint @ CustomErrorCode::InvalidMint,
        constraint = user_stake_account.owner == user.key() @ CustomErrorCode::InvalidTokenOwner,
        constraint = user_stake_account.key() != vault_token_account.key() @ CustomErrorCode::InvalidVaultTokenAccount
    )]
    pub user_stake_account: Account<'info, TokenAccount>,

    pub user: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct Unstake<'info> {
    #[account(
        mut,
        seeds = [GLOBAL_SEED],
        bump = global_state.bump
    )]
    pub global_state: Account<'info, GlobalState>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.owner.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        address = vault.token_account @ CustomErrorCode::InvalidVaultTokenAccount,
        constraint = vault_token_account.owner == vault.custody_owner(vault.key()) @ CustomErrorCode::InvalidVaultAuthority
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_stake_account.mint == global_state.stake_mint @ CustomErrorCode::InvalidMint,
        constraint = user_stake_account.owner == user.key() @ CustomErrorCode::InvalidTokenOwner,
        constraint = user_stake_account.key() != vault_token_account.key() @ CustomErrorCode::InvalidVaultTokenAccount
    )]
    pub user_stake_account: Account<'info, TokenAccount>,

    pub user: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

// Accrual checkpoint: writes the vault, so it is not a read-only view.
#[derive(Accounts)]
pub struct GetYield<'info> {
    #[account(
        seeds = [GLOBAL_SEED],
        bump = global_state.bump
    )]
    pub global_state: Account<'info, GlobalState>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.owner.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    pub user: Signer<'info>,
}

#[derive(Accounts)]
pub struct ClaimRewards<'info> {
    #[account(
        seeds = [GLOBAL_SEED],
        bump = global_state.bump
    )]
    pub global_state: Account<'info, GlobalState>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.owner.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    /// CHECK: This is a PDA that acts as the reward mint authority, validated by seeds constraint
    #[account(
        seeds = [REWARD_AUTHORITY_SEED],
        bump = global_state.reward_mint_authority_bump
    )]
    pub reward_mint_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        address = global_state.reward_mint @ CustomErrorCode::InvalidMint,
        constraint = reward_mint.mint_authority == Some(reward_mint_authority.key()).into() @ CustomErrorCode::InvalidRewardAuthority
    )]
    pub reward_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = user_reward_account.mint == reward_mint.key() @ CustomErrorCode::InvalidMint,
        constraint = user_reward_account.owner == user.key() @ CustomErrorCode::InvalidTokenOwner
    )]
    pub user_reward_account: Account<'info, TokenAccount>,

    pub user: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct SetVaultAuthority<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.owner.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    // The current owner is checked in the handler so a repeat call reports AlreadySet.
    #[account(
        mut,
        address = vault.token_account @ CustomErrorCode::InvalidVaultTokenAccount
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub user: Signer<'info>,

    pub token_program: Program<'info, Token>,
}
