use crate::error::CustomErrorCode;
use anchor_lang::prelude::*;

#[allow(deprecated)]
use anchor_lang::solana_program::bpf_loader_upgradeable::{self, UpgradeableLoaderState};

/// Address of this program's ProgramData account under the upgradeable loader.
pub fn get_program_data_address(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[program_id.as_ref()], &bpf_loader_upgradeable::id()).0
}

/// Only the program's upgrade authority may create the global registry, so nobody
/// can front-run deployment with their own reward mint.
pub fn validate_program_update_authority(
    program_data_account: &UncheckedAccount,
    authority: &Signer,
) -> Result<()> {
    let program_data = program_data_account
        .try_borrow_data()
        .map_err(|_| CustomErrorCode::InvalidProgramData)?;

    let loader_state = bincode::deserialize::<UpgradeableLoaderState>(&program_data)
        .map_err(|_| CustomErrorCode::InvalidProgramData)?;

    let UpgradeableLoaderState::ProgramData {
        upgrade_authority_address,
        ..
    } = loader_state
    else {
        return Err(CustomErrorCode::InvalidProgramData.into());
    };

    let update_authority =
        upgrade_authority_address.ok_or(CustomErrorCode::NoUpgradeAuthority)?;
    require_keys_eq!(
        authority.key(),
        update_authority,
        CustomErrorCode::InvalidUpgradeAuthority
    );
    Ok(())
}
