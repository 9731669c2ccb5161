pub mod account_structs;
/// # sol yield stake - Linear Yield Staking Vault
///
/// ## Business Process Flow
///
/// 1. Initial Setup:
///    - Admin creates two token types: Stake and Reward, each with its own decimals
///    - Program upgrade authority initializes the global registry with both mints
///    - Reward mint authority is handed to the program's reward authority PDA
///
/// 2. User Staking Flow:
///    a. Vault Setup:
///       - User creates a per-user vault, naming a stake-mint token account
///         that will hold the staked tokens
///       - User hands control of that token account to the vault PDA (one time);
///         staking is rejected until this is done
///
///    b. Staking:
///       - Pending reward is accrued on the old balance first
///       - Stake tokens move into the vault's token account
///       - Vault balance and the global total grow by the same amount
///
/// 3. Rewards:
///    - Reward accrues linearly: staked * rate * seconds / PRECISION
///    - The default rate pays 10% of stake per 365-day year
///    - get_yield checkpoints accrual and returns the unclaimed balance
///    - claim_rewards mints the whole unclaimed balance as fresh reward tokens
///
/// 4. Withdrawal Flow:
///    - Pending reward is accrued, then stake tokens return to the user
///    - The vault PDA signs once custody has been handed over; a legacy balance
///      still held in a user-owned account is returned with the user signing
///
/// Security is maintained through PDAs (Program Derived Addresses) and strict
/// token authority controls. All token operations are atomic and validated
/// through Solana's transaction model.
pub mod error;
pub mod events;
mod guard;
pub mod processor;
pub mod state;


use account_structs::*;
use anchor_lang::prelude::*;

declare_id!("D2V7nV2Qutubh1oD21rGX7qtUcoDc8YsHmgpaiVHvWnw");

#[program]
pub mod sol_yield_stake {
    use super::*;

    /// Creates the global registry with the default reward rate and takes
    /// over minting authority of the reward mint. Upgrade authority only.
    pub fn initialize_program(ctx: Context<InitializeProgram>) -> Result<()> {
        processor::initialize_program(ctx)
    }

    /// Creates the caller's vault, recording the token account that will custody stake.
    pub fn initialize_vault(ctx: Context<InitializeVault>) -> Result<()> {
        processor::initialize_vault(ctx)
    }

    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        processor::stake(ctx, amount)
    }

    pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
        processor::unstake(ctx, amount)
    }

    /// Not a pure view: commits the accrual checkpoint to the vault before
    /// returning the full unclaimed reward.
    pub fn get_yield(ctx: Context<GetYield>) -> Result<u64> {
        processor::get_yield(ctx)
    }

    /// Mints all accrued reward to the caller and resets the vault's reward debt.
    /// Fails with NothingToClaim when there is nothing to mint.
    pub fn claim_rewards(ctx: Context<ClaimRewards>) -> Result<u64> {
        processor::claim_rewards(ctx)
    }

    /// Irreversibly hands the custody token account over to the vault PDA.
    pub fn set_vault_authority(ctx: Context<SetVaultAuthority>) -> Result<()> {
        processor::set_vault_authority(ctx)
    }
}
