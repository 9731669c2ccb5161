use crate::error::CustomErrorCode;
use anchor_lang::prelude::*;

pub const GLOBAL_SEED: &[u8] = b"global";
pub const VAULT_SEED: &[u8] = b"vault";
pub const REWARD_AUTHORITY_SEED: &[u8] = b"reward_authority";

pub const SECONDS_PER_YEAR: u128 = 365 * 24 * 60 * 60;
pub const BASIS_POINTS: u128 = 10_000;

/// Fixed-point scale of `reward_rate`. The rate is stored as an annual rate in
/// basis points, so dividing by `BASIS_POINTS * SECONDS_PER_YEAR` yields the
/// reward per staked unit per second.
pub const PRECISION: u128 = BASIS_POINTS * SECONDS_PER_YEAR;

pub const DEFAULT_REWARD_RATE: u64 = 1_000; // 10% per year

#[account]
pub struct GlobalState {
    pub authority: Pubkey,
    pub stake_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub reward_rate: u64,
    pub total_staked: u64,
    pub last_update_time: i64,
    pub bump: u8,
    pub reward_mint_authority_bump: u8,
}

impl GlobalState {
    pub const LEN: usize = 8 + 32 + 32 + 32 + 8 + 8 + 8 + 1 + 1;

    pub fn is_initialized(&self) -> bool {
        self.authority != Pubkey::default()
    }

    pub fn initialize(
        &mut self,
        authority: Pubkey,
        stake_mint: Pubkey,
        reward_mint: Pubkey,
        bump: u8,
        reward_mint_authority_bump: u8,
        now: i64,
    ) -> Result<()> {
        require!(!self.is_initialized(), CustomErrorCode::AlreadyInitialized);
        require_keys_neq!(
            stake_mint,
            reward_mint,
            CustomErrorCode::StakeAndRewardMintCannotBeSame
        );

        self.authority = authority;
        self.stake_mint = stake_mint;
        self.reward_mint = reward_mint;
        self.reward_rate = DEFAULT_REWARD_RATE;
        self.total_staked = 0;
        self.last_update_time = now;
        self.bump = bump;
        self.reward_mint_authority_bump = reward_mint_authority_bump;
        Ok(())
    }

    pub fn add_stake(&mut self, amount: u64, now: i64) -> Result<()> {
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(CustomErrorCode::ArithmeticOverflow)?;
        self.last_update_time = self.last_update_time.max(now);
        Ok(())
    }

    pub fn remove_stake(&mut self, amount: u64, now: i64) -> Result<()> {
        self.total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(CustomErrorCode::ArithmeticOverflow)?;
        self.last_update_time = self.last_update_time.max(now);
        Ok(())
    }
}

#[account]
pub struct Vault {
    pub owner: Pubkey,
    pub token_account: Pubkey, // custody account for the stake mint
    pub staked_amount: u64,
    pub reward_debt: u64, // accrued but unclaimed reward, in reward mint units
    pub last_reward_time: i64,
    pub authority_set: bool,
    pub bump: u8,
}

impl Vault {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 8 + 8 + 1 + 1;

    pub fn is_initialized(&self) -> bool {
        self.owner != Pubkey::default()
    }

    pub fn initialize(
        &mut self,
        owner: Pubkey,
        token_account: Pubkey,
        bump: u8,
        now: i64,
    ) -> Result<()> {
        require!(!self.is_initialized(), CustomErrorCode::AlreadyInitialized);

        self.owner = owner;
        self.token_account = token_account;
        self.staked_amount = 0;
        self.reward_debt = 0;
        self.last_reward_time = now;
        self.authority_set = false;
        self.bump = bump;
        Ok(())
    }

    /// Reward debt and checkpoint time as they would be after accruing up to `now`.
    /// Nothing is written, so callers can validate everything before committing.
    fn checkpoint(&self, reward_rate: u64, now: i64) -> Result<(u64, i64)> {
        let elapsed = elapsed_seconds(self.last_reward_time, now);
        let pending = calculate_pending_reward(self.staked_amount, reward_rate, elapsed)?;
        let reward_debt = self
            .reward_debt
            .checked_add(pending)
            .ok_or(CustomErrorCode::ArithmeticOverflow)?;
        Ok((reward_debt, self.last_reward_time.max(now)))
    }

    /// Accrues pending reward into `reward_debt` and advances the checkpoint.
    /// Returns the full unclaimed balance.
    pub fn accrue(&mut self, reward_rate: u64, now: i64) -> Result<u64> {
        let (reward_debt, last_reward_time) = self.checkpoint(reward_rate, now)?;
        self.reward_debt = reward_debt;
        self.last_reward_time = last_reward_time;
        Ok(reward_debt)
    }

    /// Stake is only credited once the vault PDA controls the custody account,
    /// otherwise the owner could move the tokens out and stake them again.
    pub fn stake(&mut self, amount: u64, reward_rate: u64, now: i64) -> Result<()> {
        require!(amount > 0, CustomErrorCode::InsufficientStake);
        require!(self.authority_set, CustomErrorCode::CustodyNotTransferred);
        let staked_amount = self
            .staked_amount
            .checked_add(amount)
            .ok_or(CustomErrorCode::ArithmeticOverflow)?;
        let (reward_debt, last_reward_time) = self.checkpoint(reward_rate, now)?;

        self.reward_debt = reward_debt;
        self.last_reward_time = last_reward_time;
        self.staked_amount = staked_amount;
        Ok(())
    }

    pub fn unstake(&mut self, amount: u64, reward_rate: u64, now: i64) -> Result<()> {
        require!(
            amount > 0 && amount <= self.staked_amount,
            CustomErrorCode::InsufficientStake
        );
        let (reward_debt, last_reward_time) = self.checkpoint(reward_rate, now)?;

        self.reward_debt = reward_debt;
        self.last_reward_time = last_reward_time;
        self.staked_amount -= amount;
        Ok(())
    }

    /// Accrues, then hands out the whole unclaimed balance and zeroes it.
    pub fn claim(&mut self, reward_rate: u64, now: i64) -> Result<u64> {
        let (reward_debt, last_reward_time) = self.checkpoint(reward_rate, now)?;
        require!(reward_debt > 0, CustomErrorCode::NothingToClaim);

        self.reward_debt = 0;
        self.last_reward_time = last_reward_time;
        Ok(reward_debt)
    }

    pub fn mark_authority_set(&mut self) -> Result<()> {
        require!(!self.authority_set, CustomErrorCode::AlreadySet);
        self.authority_set = true;
        Ok(())
    }

    pub fn require_owner(&self, signer: Pubkey) -> Result<()> {
        require_keys_eq!(self.owner, signer, CustomErrorCode::Unauthorized);
        Ok(())
    }

    /// Who signs transfers out of the custody account.
    pub fn custody_signer(&self) -> CustodySigner {
        if self.authority_set {
            CustodySigner::Vault
        } else {
            CustodySigner::Owner
        }
    }

    /// Expected owner of the custody token account given the vault's address.
    pub fn custody_owner(&self, vault_key: Pubkey) -> Pubkey {
        match self.custody_signer() {
            CustodySigner::Vault => vault_key,
            CustodySigner::Owner => self.owner,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustodySigner {
    /// Custody handed over: the vault PDA signs with its seeds.
    Vault,
    /// Legacy balance in a user-owned account: the owner signs.
    Owner,
}

/// Seconds elapsed since the last checkpoint. A clock at or behind it counts as zero.
pub fn elapsed_seconds(last_reward_time: i64, now: i64) -> u64 {
    if now <= last_reward_time {
        return 0;
    }
    now.saturating_sub(last_reward_time) as u64
}

/// floor(staked_amount * reward_rate * elapsed_seconds / PRECISION)
pub fn calculate_pending_reward(
    staked_amount: u64,
    reward_rate: u64,
    elapsed_seconds: u64,
) -> Result<u64> {
    let pending = (staked_amount as u128)
        .checked_mul(reward_rate as u128)
        .ok_or(CustomErrorCode::ArithmeticOverflow)?
        .checked_mul(elapsed_seconds as u128)
        .ok_or(CustomErrorCode::ArithmeticOverflow)?
        / PRECISION;

    u64::try_from(pending).map_err(|_| CustomErrorCode::ArithmeticOverflow.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    const YEAR: u64 = SECONDS_PER_YEAR as u64;

    fn assert_error<T: std::fmt::Debug>(result: Result<T>, code: CustomErrorCode) {
        assert_eq!(result.unwrap_err(), Error::from(code));
    }

    fn new_vault(now: i64) -> Vault {
        let mut vault = Vault {
            owner: Pubkey::default(),
            token_account: Pubkey::default(),
            staked_amount: 0,
            reward_debt: 0,
            last_reward_time: 0,
            authority_set: false,
            bump: 0,
        };
        vault
            .initialize(Pubkey::new_unique(), Pubkey::new_unique(), 254, now)
            .unwrap();
        vault
    }

    fn custodied_vault(now: i64) -> Vault {
        let mut vault = new_vault(now);
        vault.mark_authority_set().unwrap();
        vault
    }

    #[test]
    fn test_default_rate_yields_ten_percent_per_year() {
        let reward = calculate_pending_reward(100_000_000, DEFAULT_REWARD_RATE, YEAR).unwrap();
        assert_eq!(reward, 10_000_000);
    }

    #[test]
    fn test_reward_is_linear_in_stake_and_time() {
        let half_year = calculate_pending_reward(100_000_000, DEFAULT_REWARD_RATE, YEAR / 2).unwrap();
        let double_stake = calculate_pending_reward(200_000_000, DEFAULT_REWARD_RATE, YEAR).unwrap();
        assert_eq!(half_year, 5_000_000);
        assert_eq!(double_stake, 20_000_000);
    }

    #[test]
    fn test_reward_rounds_down() {
        // 1 unit for one day earns a tiny fraction, which floors to zero
        assert_eq!(calculate_pending_reward(1, DEFAULT_REWARD_RATE, 86_400).unwrap(), 0);
        // 1_000 units for one year: exactly 100
        assert_eq!(calculate_pending_reward(1_000, DEFAULT_REWARD_RATE, YEAR).unwrap(), 100);
        // 999 units for one year: 99.9 floors to 99
        assert_eq!(calculate_pending_reward(999, DEFAULT_REWARD_RATE, YEAR).unwrap(), 99);
    }

    #[test]
    fn test_zero_inputs_accrue_nothing() {
        assert_eq!(calculate_pending_reward(0, DEFAULT_REWARD_RATE, YEAR).unwrap(), 0);
        assert_eq!(calculate_pending_reward(100_000_000, DEFAULT_REWARD_RATE, 0).unwrap(), 0);
        assert_eq!(calculate_pending_reward(100_000_000, 0, YEAR).unwrap(), 0);
    }

    #[test]
    fn test_reward_overflow_is_rejected() {
        assert_error(
            calculate_pending_reward(u64::MAX, u64::MAX, u64::MAX),
            CustomErrorCode::ArithmeticOverflow,
        );
        // product fits in u128 but the quotient does not fit in u64
        assert_error(
            calculate_pending_reward(u64::MAX, 10_000, 100 * YEAR),
            CustomErrorCode::ArithmeticOverflow,
        );
    }

    #[test]
    fn test_large_stake_over_decades_fits() {
        // 1 billion tokens at 9 decimals held for 50 years
        let stake = 1_000_000_000u64 * 1_000_000_000;
        let reward = calculate_pending_reward(stake, DEFAULT_REWARD_RATE, 50 * YEAR).unwrap();
        assert_eq!(reward, stake / 10 * 50);
    }

    #[test]
    fn test_elapsed_seconds_never_negative() {
        assert_eq!(elapsed_seconds(100, 160), 60);
        assert_eq!(elapsed_seconds(100, 100), 0);
        assert_eq!(elapsed_seconds(100, 40), 0);
        assert_eq!(elapsed_seconds(i64::MIN, i64::MAX), i64::MAX as u64);
    }

    #[test]
    fn test_vault_initialize_twice_fails_and_keeps_state() {
        let mut vault = custodied_vault(1_000);
        vault.stake(500, DEFAULT_REWARD_RATE, 1_000).unwrap();
        let owner = vault.owner;

        assert_error(
            vault.initialize(Pubkey::new_unique(), Pubkey::new_unique(), 1, 2_000),
            CustomErrorCode::AlreadyInitialized,
        );
        assert_eq!(vault.owner, owner);
        assert_eq!(vault.staked_amount, 500);
        assert_eq!(vault.last_reward_time, 1_000);
    }

    #[test]
    fn test_accrue_commits_checkpoint() {
        let mut vault = custodied_vault(0);
        vault.stake(100_000_000, DEFAULT_REWARD_RATE, 0).unwrap();

        let total = vault.accrue(DEFAULT_REWARD_RATE, YEAR as i64).unwrap();
        assert_eq!(total, 10_000_000);
        assert_eq!(vault.reward_debt, 10_000_000);
        assert_eq!(vault.last_reward_time, YEAR as i64);

        // returns the full unclaimed balance, not only the new delta
        let total = vault.accrue(DEFAULT_REWARD_RATE, YEAR as i64 * 2).unwrap();
        assert_eq!(total, 20_000_000);
    }

    #[test]
    fn test_accrue_ignores_clock_going_backwards() {
        let mut vault = custodied_vault(1_000);
        vault.stake(100_000_000, DEFAULT_REWARD_RATE, 1_000).unwrap();

        assert_eq!(vault.accrue(DEFAULT_REWARD_RATE, 500).unwrap(), 0);
        assert_eq!(vault.last_reward_time, 1_000);
    }

    #[test]
    fn test_stake_accrues_on_old_balance_first() {
        let mut vault = custodied_vault(0);
        vault.stake(100_000_000, DEFAULT_REWARD_RATE, 0).unwrap();
        vault.stake(100_000_000, DEFAULT_REWARD_RATE, YEAR as i64).unwrap();

        // first year earned on 100M only
        assert_eq!(vault.reward_debt, 10_000_000);
        assert_eq!(vault.staked_amount, 200_000_000);

        vault.accrue(DEFAULT_REWARD_RATE, YEAR as i64 * 2).unwrap();
        assert_eq!(vault.reward_debt, 30_000_000);
    }

    #[test]
    fn test_stake_zero_fails() {
        let mut vault = custodied_vault(0);
        assert_error(
            vault.stake(0, DEFAULT_REWARD_RATE, 10),
            CustomErrorCode::InsufficientStake,
        );
        assert_eq!(vault.last_reward_time, 0);
    }

    #[test]
    fn test_stake_overflow_leaves_vault_untouched() {
        let mut vault = custodied_vault(0);
        vault.stake(u64::MAX, 0, 0).unwrap();
        assert_error(
            vault.stake(1, 0, 100),
            CustomErrorCode::ArithmeticOverflow,
        );
        assert_eq!(vault.staked_amount, u64::MAX);
        assert_eq!(vault.last_reward_time, 0);
    }

    #[test]
    fn test_unstake_bounds() {
        let mut vault = custodied_vault(0);
        vault.stake(1_000, DEFAULT_REWARD_RATE, 0).unwrap();

        assert_error(
            vault.unstake(0, DEFAULT_REWARD_RATE, 10),
            CustomErrorCode::InsufficientStake,
        );
        assert_error(
            vault.unstake(1_001, DEFAULT_REWARD_RATE, 10),
            CustomErrorCode::InsufficientStake,
        );
        assert_eq!(vault.staked_amount, 1_000);
        assert_eq!(vault.last_reward_time, 0);

        vault.unstake(1_000, DEFAULT_REWARD_RATE, 10).unwrap();
        assert_eq!(vault.staked_amount, 0);
        assert_eq!(vault.last_reward_time, 10);
    }

    #[test]
    fn test_unstake_accrues_before_reducing_balance() {
        let mut vault = custodied_vault(0);
        vault.stake(100_000_000, DEFAULT_REWARD_RATE, 0).unwrap();
        vault.unstake(100_000_000, DEFAULT_REWARD_RATE, YEAR as i64).unwrap();

        assert_eq!(vault.reward_debt, 10_000_000);
        assert_eq!(vault.staked_amount, 0);
    }

    #[test]
    fn test_claim_returns_debt_and_resets() {
        let mut vault = custodied_vault(0);
        vault.stake(100_000_000, DEFAULT_REWARD_RATE, 0).unwrap();

        let claimed = vault.claim(DEFAULT_REWARD_RATE, YEAR as i64).unwrap();
        assert_eq!(claimed, 10_000_000);
        assert_eq!(vault.reward_debt, 0);
        assert_eq!(vault.last_reward_time, YEAR as i64);
    }

    #[test]
    fn test_claim_with_nothing_accrued_fails() {
        let mut vault = custodied_vault(0);
        vault.stake(1, DEFAULT_REWARD_RATE, 0).unwrap();

        assert_error(
            vault.claim(DEFAULT_REWARD_RATE, 60),
            CustomErrorCode::NothingToClaim,
        );
        // the checkpoint is not advanced, so sub-unit accrual is not lost
        assert_eq!(vault.last_reward_time, 0);
    }

    #[test]
    fn test_authority_can_only_be_set_once() {
        let mut vault = new_vault(0);
        let vault_key = Pubkey::new_unique();
        assert_eq!(vault.custody_owner(vault_key), vault.owner);

        vault.mark_authority_set().unwrap();
        assert!(vault.authority_set);
        assert_eq!(vault.custody_owner(vault_key), vault_key);

        assert_error(vault.mark_authority_set(), CustomErrorCode::AlreadySet);
        assert!(vault.authority_set);
    }

    #[test]
    fn test_stake_requires_custody_handover() {
        let mut vault = new_vault(0);
        assert_error(
            vault.stake(100_000_000, DEFAULT_REWARD_RATE, 10),
            CustomErrorCode::CustodyNotTransferred,
        );
        assert_eq!(vault.staked_amount, 0);
        assert_eq!(vault.last_reward_time, 0);

        vault.mark_authority_set().unwrap();
        vault.stake(100_000_000, DEFAULT_REWARD_RATE, 10).unwrap();
        assert_eq!(vault.staked_amount, 100_000_000);
    }

    #[test]
    fn test_require_owner() {
        let vault = new_vault(0);
        vault.require_owner(vault.owner).unwrap();
        assert_error(
            vault.require_owner(Pubkey::new_unique()),
            CustomErrorCode::Unauthorized,
        );
    }

    #[test]
    fn test_custody_signer_follows_handover() {
        let mut vault = new_vault(0);
        assert_eq!(vault.custody_signer(), CustodySigner::Owner);

        vault.mark_authority_set().unwrap();
        assert_eq!(vault.custody_signer(), CustodySigner::Vault);
    }

    #[test]
    fn test_legacy_balance_unstakes_through_owner() {
        // balance credited before custody handover existed; it must still be withdrawable
        let mut vault = new_vault(0);
        vault.staked_amount = 1_000;
        assert_eq!(vault.custody_signer(), CustodySigner::Owner);

        vault.unstake(400, DEFAULT_REWARD_RATE, 10).unwrap();
        assert_eq!(vault.staked_amount, 600);
        assert_eq!(vault.custody_signer(), CustodySigner::Owner);
    }

    #[test]
    fn test_global_initialize() {
        let mut global = GlobalState {
            authority: Pubkey::default(),
            stake_mint: Pubkey::default(),
            reward_mint: Pubkey::default(),
            reward_rate: 0,
            total_staked: 0,
            last_update_time: 0,
            bump: 0,
            reward_mint_authority_bump: 0,
        };
        let mint = Pubkey::new_unique();

        assert_error(
            global.initialize(Pubkey::new_unique(), mint, mint, 255, 254, 7),
            CustomErrorCode::StakeAndRewardMintCannotBeSame,
        );
        assert!(!global.is_initialized());

        global
            .initialize(Pubkey::new_unique(), mint, Pubkey::new_unique(), 255, 254, 7)
            .unwrap();
        assert_eq!(global.reward_rate, DEFAULT_REWARD_RATE);
        assert_eq!(global.total_staked, 0);
        assert_eq!(global.last_update_time, 7);

        assert_error(
            global.initialize(Pubkey::new_unique(), mint, Pubkey::new_unique(), 255, 254, 8),
            CustomErrorCode::AlreadyInitialized,
        );
        assert_eq!(global.last_update_time, 7);
    }
}
