//! XDR wire format of the allowance entry and contract identifiers.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use soroban_sdk::xdr::{AccountId, Asset, Error, Limited, Limits, ReadXdr, WriteXdr};

use crate::allowance::{AllowanceKey, AllowanceRecord};
use crate::errors::AdaptorError;
use crate::identifier::ContractIdentifier;
use crate::ledger::LedgerEntryType;

const IDENTIFIER_CONTRACT: i32 = 0;
const IDENTIFIER_ASSET_ADAPTOR: i32 = 1;

impl WriteXdr for AllowanceRecord {
    fn write_xdr<W: Write>(&self, w: &mut Limited<W>) -> Result<(), Error> {
        self.extension_version.write_xdr(w)?;
        self.owner.write_xdr(w)?;
        self.spender.write_xdr(w)?;
        self.asset.write_xdr(w)?;
        self.amount.write_xdr(w)
    }
}

impl ReadXdr for AllowanceRecord {
    fn read_xdr<R: Read>(r: &mut Limited<R>) -> Result<Self, Error> {
        let extension_version = i32::read_xdr(r)?;
        if extension_version != 0 {
            return Err(Error::Invalid);
        }
        let record = Self {
            extension_version,
            owner: AccountId::read_xdr(r)?,
            spender: AccountId::read_xdr(r)?,
            asset: Asset::read_xdr(r)?,
            amount: i64::read_xdr(r)?,
        };
        if record.amount < 0 {
            return Err(Error::Invalid);
        }
        Ok(record)
    }
}

/// Encoded as the `ALLOWANCE` arm of the ledger key union.
impl WriteXdr for AllowanceKey {
    fn write_xdr<W: Write>(&self, w: &mut Limited<W>) -> Result<(), Error> {
        LedgerEntryType::Allowance.discriminant().write_xdr(w)?;
        self.owner.write_xdr(w)?;
        self.spender.write_xdr(w)?;
        self.asset.write_xdr(w)
    }
}

impl ReadXdr for AllowanceKey {
    fn read_xdr<R: Read>(r: &mut Limited<R>) -> Result<Self, Error> {
        if i32::read_xdr(r)? != LedgerEntryType::Allowance.discriminant() {
            return Err(Error::Invalid);
        }
        Ok(Self {
            owner: AccountId::read_xdr(r)?,
            spender: AccountId::read_xdr(r)?,
            asset: Asset::read_xdr(r)?,
        })
    }
}

impl WriteXdr for ContractIdentifier {
    fn write_xdr<W: Write>(&self, w: &mut Limited<W>) -> Result<(), Error> {
        match self {
            Self::Contract(handle) => {
                IDENTIFIER_CONTRACT.write_xdr(w)?;
                handle.write_xdr(w)
            }
            Self::AssetAdaptor(asset) => {
                IDENTIFIER_ASSET_ADAPTOR.write_xdr(w)?;
                asset.write_xdr(w)
            }
        }
    }
}

impl ReadXdr for ContractIdentifier {
    fn read_xdr<R: Read>(r: &mut Limited<R>) -> Result<Self, Error> {
        match i32::read_xdr(r)? {
            IDENTIFIER_CONTRACT => Ok(Self::Contract(i64::read_xdr(r)?)),
            IDENTIFIER_ASSET_ADAPTOR => Ok(Self::AssetAdaptor(Asset::read_xdr(r)?)),
            _ => Err(Error::Invalid),
        }
    }
}

pub fn to_base64<T: WriteXdr>(value: &T) -> Result<String, AdaptorError> {
    Ok(BASE64.encode(value.to_xdr(Limits::none())?))
}

pub fn from_base64<T: ReadXdr>(encoded: &str) -> Result<T, AdaptorError> {
    let bytes = BASE64.decode(encoded.trim())?;
    Ok(T::from_xdr(bytes, Limits::none())?)
}
