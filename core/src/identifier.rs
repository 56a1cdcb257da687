use sha2::{Digest, Sha256};
use soroban_sdk::xdr::{Asset, Limits, ReadXdr, WriteXdr};
use stellar_strkey::Strkey;

use crate::asset::validate_asset;
use crate::codec::from_base64;
use crate::errors::AdaptorError;

/// Opaque identity a caller addresses: a general contract or the adaptor of
/// an asset. Adaptors have no stored state; the asset is their whole identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContractIdentifier {
    Contract(i64),
    AssetAdaptor(Asset),
}

/// Where a call addressed to a `ContractIdentifier` goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    Contract(i64),
    AssetAdaptor(Asset),
}

/// Identifier of the adaptor for `asset`.
pub fn adaptor_for(asset: &Asset) -> ContractIdentifier {
    ContractIdentifier::AssetAdaptor(asset.clone())
}

pub fn resolve(identifier: &ContractIdentifier) -> Result<ResolvedTarget, AdaptorError> {
    match identifier {
        ContractIdentifier::Contract(handle) => Ok(ResolvedTarget::Contract(*handle)),
        ContractIdentifier::AssetAdaptor(asset) => {
            validate_asset(asset)?;
            Ok(ResolvedTarget::AssetAdaptor(asset.clone()))
        }
    }
}

pub fn resolve_bytes(bytes: &[u8]) -> Result<ResolvedTarget, AdaptorError> {
    let identifier = ContractIdentifier::from_xdr(bytes, Limits::none())
        .map_err(|e| AdaptorError::MalformedIdentifier(e.to_string()))?;
    resolve(&identifier)
}

pub fn resolve_base64(encoded: &str) -> Result<ResolvedTarget, AdaptorError> {
    let identifier: ContractIdentifier = from_base64(encoded)
        .map_err(|e| AdaptorError::MalformedIdentifier(e.to_string()))?;
    resolve(&identifier)
}

fn network_id(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

impl ContractIdentifier {
    /// 32-byte id of this identifier on the network named by `network_passphrase`.
    pub fn contract_id(&self, network_passphrase: &str) -> Result<[u8; 32], AdaptorError> {
        let preimage = self.to_xdr(Limits::none())?;
        let mut h = Sha256::new();
        h.update(network_id(network_passphrase));
        h.update(&preimage);
        Ok(h.finalize().into())
    }

    /// `C...` strkey form of `contract_id`.
    pub fn contract_strkey(&self, network_passphrase: &str) -> Result<String, AdaptorError> {
        let id = self.contract_id(network_passphrase)?;
        Ok(Strkey::Contract(stellar_strkey::Contract(id)).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{credit_asset, test_account};
    use crate::codec::to_base64;
    use soroban_sdk::xdr::{AlphaNum4, AssetCode4};

    const TESTNET: &str = "Test SDF Network ; September 2015";

    #[test]
    fn test_adaptor_for_is_deterministic() {
        assert_eq!(adaptor_for(&Asset::Native), adaptor_for(&Asset::Native));
        let usd = credit_asset("USD", test_account(9)).unwrap();
        let eur = credit_asset("EUR", test_account(9)).unwrap();
        let usd_other_issuer = credit_asset("USD", test_account(8)).unwrap();
        assert_ne!(adaptor_for(&usd), adaptor_for(&eur));
        assert_ne!(adaptor_for(&usd), adaptor_for(&usd_other_issuer));
        assert_ne!(adaptor_for(&usd), adaptor_for(&Asset::Native));
    }

    #[test]
    fn test_resolve_dispatches_by_variant() {
        assert_eq!(
            resolve(&ContractIdentifier::Contract(12)).unwrap(),
            ResolvedTarget::Contract(12)
        );
        let usd = credit_asset("USD", test_account(9)).unwrap();
        assert_eq!(
            resolve(&adaptor_for(&usd)).unwrap(),
            ResolvedTarget::AssetAdaptor(usd)
        );
    }

    #[test]
    fn test_resolve_rejects_malformed_asset() {
        let bad = ContractIdentifier::AssetAdaptor(Asset::CreditAlphanum4(AlphaNum4 {
            asset_code: AssetCode4([0; 4]),
            issuer: test_account(9),
        }));
        assert!(matches!(
            resolve(&bad).unwrap_err(),
            AdaptorError::MalformedIdentifier(_)
        ));
    }

    #[test]
    fn test_resolve_wire_forms() {
        let id = adaptor_for(&Asset::Native);
        let bytes = id.to_xdr(Limits::none()).unwrap();
        assert_eq!(resolve_bytes(&bytes).unwrap(), ResolvedTarget::AssetAdaptor(Asset::Native));
        assert_eq!(
            resolve_base64(&to_base64(&id).unwrap()).unwrap(),
            ResolvedTarget::AssetAdaptor(Asset::Native)
        );
        assert!(matches!(
            resolve_bytes(&[0, 0, 0, 9]).unwrap_err(),
            AdaptorError::MalformedIdentifier(_)
        ));
        assert!(matches!(
            resolve_base64("%%%").unwrap_err(),
            AdaptorError::MalformedIdentifier(_)
        ));
    }

    #[test]
    fn test_contract_id_depends_on_network_and_asset() {
        let native = adaptor_for(&Asset::Native);
        let usd = adaptor_for(&credit_asset("USD", test_account(9)).unwrap());
        assert_eq!(native.contract_id(TESTNET).unwrap(), native.contract_id(TESTNET).unwrap());
        assert_ne!(native.contract_id(TESTNET).unwrap(), usd.contract_id(TESTNET).unwrap());
        assert_ne!(
            native.contract_id(TESTNET).unwrap(),
            native.contract_id("Public Global Stellar Network ; September 2015").unwrap()
        );
        let strkey = native.contract_strkey(TESTNET).unwrap();
        assert!(strkey.starts_with('C'));
        assert_eq!(strkey.len(), 56);
    }
}
