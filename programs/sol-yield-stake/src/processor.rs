use crate::account_structs::*;
use crate::error::*;
use crate::events::*;
use crate::guard::validate_program_update_authority;
use crate::state::{CustodySigner, REWARD_AUTHORITY_SEED, VAULT_SEED};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::spl_token::instruction::AuthorityType;
use anchor_spl::token::{self, MintTo, SetAuthority, Transfer};

/*
# Accrue-then-mutate

Every handler that touches a vault reads the clock once and passes that reading
into the vault's state transition (see state.rs). The transition first brings
`reward_debt` up to `now` using the balance that was in force since the last
checkpoint, and only then applies its own balance change. Rewards are therefore
always earned on the balance actually held during each interval.

All preconditions are checked before any field is written, and any error
(including a failed token CPI) reverts the whole instruction, so no operation is
ever observably half applied.
 */

pub fn initialize_program(ctx: Context<InitializeProgram>) -> Result<()> {
    validate_program_update_authority(&ctx.accounts.program_data, &ctx.accounts.authority)?;
    let now = Clock::get()?.unix_timestamp;

    ctx.accounts.global_state.initialize(
        ctx.accounts.authority.key(),
        ctx.accounts.stake_mint.key(),
        ctx.accounts.reward_mint.key(),
        ctx.bumps.global_state,
        ctx.bumps.reward_mint_authority,
        now,
    )?;

    // Reward custody: the reward mint must end up minted only by the reward authority PDA.
    // Hand it over if the signer still holds it, leave it alone if already done.
    let reward_mint_authority = ctx.accounts.reward_mint_authority.key();
    match ctx.accounts.reward_mint.mint_authority {
        COption::Some(current) if current == reward_mint_authority => {}
        COption::Some(current) if current == ctx.accounts.authority.key() => {
            token::set_authority(
                CpiContext::new(
                    ctx.accounts.token_program.to_account_info(),
                    SetAuthority {
                        account_or_mint: ctx.accounts.reward_mint.to_account_info(),
                        current_authority: ctx.accounts.authority.to_account_info(),
                    },
                ),
                AuthorityType::MintTokens,
                Some(reward_mint_authority),
            )?;
        }
        _ => return Err(CustomErrorCode::InvalidRewardAuthority.into()),
    }

    let global = &ctx.accounts.global_state;
    msg!(
        "Program initialized: stake mint {}, reward mint {}, reward rate {}",
        global.stake_mint,
        global.reward_mint,
        global.reward_rate
    );

    emit!(ProgramInitialized {
        authority: global.authority,
        stake_mint: global.stake_mint,
        reward_mint: global.reward_mint,
        reward_rate: global.reward_rate,
        timestamp: now,
    });

    Ok(())
}

pub fn initialize_vault(ctx: Context<InitializeVault>) -> Result<()> {
    require!(
        !ctx.accounts.vault.is_initialized(),
        CustomErrorCode::AlreadyInitialized
    );
    require_keys_eq!(
        ctx.accounts.vault_token_account.mint,
        ctx.accounts.global_state.stake_mint,
        CustomErrorCode::InvalidMint
    );
    require_keys_eq!(
        ctx.accounts.vault_token_account.owner,
        ctx.accounts.user.key(),
        CustomErrorCode::InvalidTokenOwner
    );

    let now = Clock::get()?.unix_timestamp;
    let user = ctx.accounts.user.key();
    let token_account = ctx.accounts.vault_token_account.key();
    ctx.accounts
        .vault
        .initialize(user, token_account, ctx.bumps.vault, now)?;

    msg!("Vault initialized for {}", user);

    emit!(VaultInitialized {
        user,
        vault: ctx.accounts.vault.key(),
        token_account,
        timestamp: now,
    });

    Ok(())
}

pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
    ctx.accounts.vault.require_owner(ctx.accounts.user.key())?;
    let now = Clock::get()?.unix_timestamp;
    let reward_rate = ctx.accounts.global_state.reward_rate;

    ctx.accounts.vault.stake(amount, reward_rate, now)?;

    let cpi_accounts = Transfer {
        from: ctx.accounts.user_stake_account.to_account_info(),
        to: ctx.accounts.vault_token_account.to_account_info(),
        authority: ctx.accounts.user.to_account_info(),
    };
    token::transfer(
        CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts),
        amount,
    )?;

    let global = &mut ctx.accounts.global_state;
    global.add_stake(amount, now)?;

    let vault = &ctx.accounts.vault;
    msg!(
        "User {} staked {}, vault balance {}, reward debt {}",
        vault.owner,
        amount,
        vault.staked_amount,
        vault.reward_debt
    );

    emit!(Staked {
        user: vault.owner,
        amount,
        staked_amount: vault.staked_amount,
        total_staked: global.total_staked,
        timestamp: now,
    });

    Ok(())
}

pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
    ctx.accounts.vault.require_owner(ctx.accounts.user.key())?;
    let now = Clock::get()?.unix_timestamp;
    let reward_rate = ctx.accounts.global_state.reward_rate;

    ctx.accounts.vault.unstake(amount, reward_rate, now)?;

    let token_program = ctx.accounts.token_program.to_account_info();
    match ctx.accounts.vault.custody_signer() {
        CustodySigner::Vault => {
            let owner = ctx.accounts.vault.owner;
            let seeds: &[&[u8]] = &[VAULT_SEED, owner.as_ref(), &[ctx.accounts.vault.bump]];
            let signer = &[&seeds[..]];
            let cpi_accounts = Transfer {
                from: ctx.accounts.vault_token_account.to_account_info(),
                to: ctx.accounts.user_stake_account.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            };
            token::transfer(
                CpiContext::new_with_signer(token_program, cpi_accounts, signer),
                amount,
            )?;
        }
        // Legacy balance still in a user-owned custody account: the owner signs directly.
        CustodySigner::Owner => {
            let cpi_accounts = Transfer {
                from: ctx.accounts.vault_token_account.to_account_info(),
                to: ctx.accounts.user_stake_account.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            };
            token::transfer(CpiContext::new(token_program, cpi_accounts), amount)?;
        }
    }

    let global = &mut ctx.accounts.global_state;
    global.remove_stake(amount, now)?;

    let vault = &ctx.accounts.vault;
    msg!(
        "User {} unstaked {}, vault balance {}, reward debt {}",
        vault.owner,
        amount,
        vault.staked_amount,
        vault.reward_debt
    );

    emit!(Unstaked {
        user: vault.owner,
        amount,
        staked_amount: vault.staked_amount,
        total_staked: global.total_staked,
        timestamp: now,
    });

    Ok(())
}

/// Side-effecting query: commits the accrual checkpoint and returns the full
/// unclaimed reward balance.
pub fn get_yield(ctx: Context<GetYield>) -> Result<u64> {
    ctx.accounts.vault.require_owner(ctx.accounts.user.key())?;
    let now = Clock::get()?.unix_timestamp;
    let reward_rate = ctx.accounts.global_state.reward_rate;

    let vault = &mut ctx.accounts.vault;
    let reward_debt = vault.accrue(reward_rate, now)?;

    msg!("Yield for {}: {}", vault.owner, reward_debt);

    emit!(YieldAccrued {
        user: vault.owner,
        reward_debt,
        timestamp: now,
    });

    Ok(reward_debt)
}

pub fn claim_rewards(ctx: Context<ClaimRewards>) -> Result<u64> {
    ctx.accounts.vault.require_owner(ctx.accounts.user.key())?;
    let now = Clock::get()?.unix_timestamp;
    let reward_rate = ctx.accounts.global_state.reward_rate;

    let amount = ctx.accounts.vault.claim(reward_rate, now)?;

    let seeds: &[&[u8]] = &[
        REWARD_AUTHORITY_SEED,
        &[ctx.accounts.global_state.reward_mint_authority_bump],
    ];
    let signer = &[&seeds[..]];
    let cpi_accounts = MintTo {
        mint: ctx.accounts.reward_mint.to_account_info(),
        to: ctx.accounts.user_reward_account.to_account_info(),
        authority: ctx.accounts.reward_mint_authority.to_account_info(),
    };
    token::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            cpi_accounts,
            signer,
        ),
        amount,
    )?;

    msg!("User {} claimed {} rewards", ctx.accounts.vault.owner, amount);

    emit!(RewardsClaimed {
        user: ctx.accounts.vault.owner,
        amount,
        mint: ctx.accounts.reward_mint.key(),
        timestamp: now,
    });

    Ok(amount)
}

pub fn set_vault_authority(ctx: Context<SetVaultAuthority>) -> Result<()> {
    ctx.accounts.vault.require_owner(ctx.accounts.user.key())?;
    require!(
        !ctx.accounts.vault.authority_set,
        CustomErrorCode::AlreadySet
    );
    let now = Clock::get()?.unix_timestamp;
    require_keys_eq!(
        ctx.accounts.vault_token_account.owner,
        ctx.accounts.user.key(),
        CustomErrorCode::InvalidTokenOwner
    );

    let vault_key = ctx.accounts.vault.key();
    token::set_authority(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            SetAuthority {
                account_or_mint: ctx.accounts.vault_token_account.to_account_info(),
                current_authority: ctx.accounts.user.to_account_info(),
            },
        ),
        AuthorityType::AccountOwner,
        Some(vault_key),
    )?;

    ctx.accounts.vault.mark_authority_set()?;

    msg!(
        "Token account {} handed over to vault {}",
        ctx.accounts.vault_token_account.key(),
        vault_key
    );

    emit!(VaultAuthoritySet {
        user: ctx.accounts.vault.owner,
        vault: vault_key,
        token_account: ctx.accounts.vault_token_account.key(),
        timestamp: now,
    });

    Ok(())
}
