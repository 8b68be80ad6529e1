use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

const DID_SCHEME: &str = "did";
const ETHR_METHOD: &str = "ethr";
const ADDRESS_HEX_DIGITS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("malformed key address '{0}'")]
    MalformedAddress(String),
    #[error("expected 'did' prefix in '{0}'")]
    BadPrefix(String),
    #[error("expected 'ethr' method in '{0}'")]
    BadMethod(String),
}

/// An `ethr` decentralized identifier, backed by a 20 byte hex key address.
///
/// Accepts both `did:ethr:0x…` and the bare `0x…` address. The address keeps the casing it was
/// parsed with, while equality and hashing fold case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EthrDid(String);

impl EthrDid {
    /// Parse a bare key address (`0x` followed by exactly 40 hex digits, any case).
    /// ```
    /// # use selective_disclosure::core::identifier::EthrDid;
    /// let did = EthrDid::from_key_address("0x0123456789012345678901234567890123456789").unwrap();
    ///
    /// assert_eq!(did.did(), "did:ethr:0x0123456789012345678901234567890123456789");
    /// ```
    pub fn from_key_address(address: &str) -> Result<Self, IdentifierError> {
        let digits = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .ok_or_else(|| IdentifierError::MalformedAddress(address.to_owned()))?;

        if digits.len() != ADDRESS_HEX_DIGITS || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdentifierError::MalformedAddress(address.to_owned()));
        }

        Ok(Self(address.to_owned()))
    }

    /// Parse a `did:ethr:<address>` identifier.
    pub fn from_did(did: &str) -> Result<Self, IdentifierError> {
        let mut segments = did.splitn(3, ':');

        if segments.next() != Some(DID_SCHEME) {
            return Err(IdentifierError::BadPrefix(did.to_owned()));
        }
        if segments.next() != Some(ETHR_METHOD) {
            return Err(IdentifierError::BadMethod(did.to_owned()));
        }

        Self::from_key_address(segments.next().unwrap_or_default())
    }

    pub fn did(&self) -> String {
        format!("{DID_SCHEME}:{ETHR_METHOD}:{}", self.0)
    }

    pub fn key_address(&self) -> &str {
        &self.0
    }
}

impl FromStr for EthrDid {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(':') {
            Self::from_did(s)
        } else {
            Self::from_key_address(s)
        }
    }
}

impl TryFrom<String> for EthrDid {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EthrDid> for String {
    fn from(value: EthrDid) -> Self {
        value.did()
    }
}

impl fmt::Display for EthrDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DID_SCHEME}:{ETHR_METHOD}:{}", self.0)
    }
}

impl PartialEq for EthrDid {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for EthrDid {}

impl Hash for EthrDid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_ascii_lowercase().hash(state)
    }
}
