use anchor_lang::prelude::*;

#[error_code]
pub enum CustomErrorCode {
    #[msg("Account is already initialized")]
    AlreadyInitialized = 1,
    #[msg("Insufficient staked amount")]
    InsufficientStake = 2,
    #[msg("Vault authority already set")]
    AlreadySet = 3,
    #[msg("No rewards available to claim")]
    NothingToClaim = 4,
    #[msg("Signer is not the vault owner")]
    Unauthorized = 5,
    #[msg("Arithmetic overflow")]
    ArithmeticOverflow = 6,

    #[msg("Invalid mint provided")]
    InvalidMint = 7,
    #[msg("Invalid token owner")]
    InvalidTokenOwner = 8,
    #[msg("Vault token account does not match the vault")]
    InvalidVaultTokenAccount = 9,
    #[msg("Invalid vault authority")]
    InvalidVaultAuthority = 10,
    #[msg("Reward mint authority mismatch")]
    InvalidRewardAuthority = 11,
    #[msg("Stake and reward mint cannot be the same")]
    StakeAndRewardMintCannotBeSame = 12,
    #[msg("Custody token account has not been handed over to the vault")]
    CustodyNotTransferred = 13,

    #[msg("ProgramData account did not match expected PDA.")]
    InvalidProgramData = 16,
    #[msg("Program has no upgrade authority (set to None).")]
    NoUpgradeAuthority = 17,
    #[msg("Signer is not the upgrade authority.")]
    InvalidUpgradeAuthority = 18,
}
