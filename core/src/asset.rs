use soroban_sdk::xdr::{
    AccountId, AlphaNum12, AlphaNum4, Asset, AssetCode12, AssetCode4, PublicKey, Uint256,
};
use stellar_strkey::Strkey;

use crate::errors::AdaptorError;

/// Fractional decimal digits of every ledger asset, native and issued alike.
pub const DECIMALS: u32 = 7;

/// Name and symbol reported for the native asset.
pub const NATIVE_CODE: &str = "XLM";

/// Check an asset descriptor the way the ledger does before admitting it.
///
/// Codes are ASCII alphanumeric, padded with trailing zeros only. Four-byte
/// codes carry 1-4 characters, twelve-byte codes carry 5-12.
pub fn validate_asset(asset: &Asset) -> Result<(), AdaptorError> {
    match asset {
        Asset::Native => Ok(()),
        Asset::CreditAlphanum4(a) => {
            let len = code_len(&a.asset_code.0)?;
            if len == 0 {
                return Err(AdaptorError::MalformedIdentifier(
                    "asset code is empty".to_string(),
                ));
            }
            Ok(())
        }
        Asset::CreditAlphanum12(a) => {
            let len = code_len(&a.asset_code.0)?;
            if len < 5 {
                return Err(AdaptorError::MalformedIdentifier(format!(
                    "alphanum12 asset code must have 5-12 characters, found {}",
                    len
                )));
            }
            Ok(())
        }
    }
}

// Length of a zero-padded code, rejecting interior NULs and non-alphanumerics.
fn code_len(code: &[u8]) -> Result<usize, AdaptorError> {
    let mut len = 0;
    let mut padding = false;
    for &b in code {
        if b == 0 {
            padding = true;
        } else if padding {
            return Err(AdaptorError::MalformedIdentifier(
                "asset code has characters after padding".to_string(),
            ));
        } else if !b.is_ascii_alphanumeric() {
            return Err(AdaptorError::MalformedIdentifier(format!(
                "asset code contains invalid byte 0x{:02x}",
                b
            )));
        } else {
            len += 1;
        }
    }
    Ok(len)
}

/// Build a credit asset, picking the 4- or 12-byte form from the code length.
pub fn credit_asset(code: &str, issuer: AccountId) -> Result<Asset, AdaptorError> {
    let bytes = code.as_bytes();
    let asset = match bytes.len() {
        1..=4 => {
            let mut buf = [0u8; 4];
            buf[..bytes.len()].copy_from_slice(bytes);
            Asset::CreditAlphanum4(AlphaNum4 {
                asset_code: AssetCode4(buf),
                issuer,
            })
        }
        5..=12 => {
            let mut buf = [0u8; 12];
            buf[..bytes.len()].copy_from_slice(bytes);
            Asset::CreditAlphanum12(AlphaNum12 {
                asset_code: AssetCode12(buf),
                issuer,
            })
        }
        n => {
            return Err(AdaptorError::MalformedIdentifier(format!(
                "asset code must have 1-12 characters, found {}",
                n
            )))
        }
    };
    validate_asset(&asset)?;
    Ok(asset)
}

/// Code of a credit asset without padding; `None` for native.
pub fn asset_code(asset: &Asset) -> Option<String> {
    let raw: &[u8] = match asset {
        Asset::Native => return None,
        Asset::CreditAlphanum4(a) => &a.asset_code.0,
        Asset::CreditAlphanum12(a) => &a.asset_code.0,
    };
    let trimmed: Vec<u8> = raw.iter().copied().take_while(|b| *b != 0).collect();
    Some(String::from_utf8_lossy(&trimmed).into_owned())
}

pub fn asset_issuer(asset: &Asset) -> Option<&AccountId> {
    match asset {
        Asset::Native => None,
        Asset::CreditAlphanum4(a) => Some(&a.issuer),
        Asset::CreditAlphanum12(a) => Some(&a.issuer),
    }
}

/// Text form of an asset: `native` or `CODE:ISSUER`.
pub fn asset_to_string(asset: &Asset) -> String {
    match (asset_code(asset), asset_issuer(asset)) {
        (Some(code), Some(issuer)) => format!("{}:{}", code, account_to_strkey(issuer)),
        _ => "native".to_string(),
    }
}

/// Parse `native` or `CODE:ISSUER`.
pub fn parse_asset(s: &str) -> Result<Asset, AdaptorError> {
    if s.eq_ignore_ascii_case("native") {
        return Ok(Asset::Native);
    }
    let (code, issuer) = s.split_once(':').ok_or_else(|| {
        AdaptorError::MalformedIdentifier(format!(
            "expected `native` or `CODE:ISSUER`, found `{}`",
            s
        ))
    })?;
    let issuer = account_from_strkey(issuer)?;
    credit_asset(code, issuer)
}

pub fn account_to_strkey(account: &AccountId) -> String {
    let PublicKey::PublicKeyTypeEd25519(Uint256(bytes)) = &account.0;
    Strkey::PublicKeyEd25519(stellar_strkey::ed25519::PublicKey(*bytes)).to_string()
}

pub fn account_from_strkey(s: &str) -> Result<AccountId, AdaptorError> {
    match Strkey::from_string(s) {
        Ok(Strkey::PublicKeyEd25519(pk)) => Ok(AccountId(PublicKey::PublicKeyTypeEd25519(
            Uint256(pk.0),
        ))),
        Ok(_) => Err(AdaptorError::InvalidAccount(format!(
            "`{}` is not an account public key",
            s
        ))),
        Err(e) => Err(AdaptorError::InvalidAccount(format!("`{}`: {}", s, e))),
    }
}

#[cfg(test)]
pub(crate) fn test_account(seed: u8) -> AccountId {
    AccountId(PublicKey::PublicKeyTypeEd25519(Uint256([seed; 32])))
}
