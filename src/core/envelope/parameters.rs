use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::{identifier::EthrDid, object::wire_fields};

use super::{
    claim::VcBody,
    specs::{UserInfoSpec, VerifiableSpec},
};

pub const TYPE: &str = "type";
pub const SHARE_REQ: &str = "shareReq";
pub const SHARE_RESP: &str = "shareResp";
pub const SHARE_REQ_PROPOSAL: &str = "shareReqProposal";
pub const FWD_REQ: &str = "fwdReq";

/// Structured claim specs. Entries may be `null`, which reads as an empty spec.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClaimsSpecs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifiable: Option<IndexMap<String, Option<VerifiableSpec>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<IndexMap<String, Option<UserInfoSpec>>>,
}

/// An `iat` value: any JSON number of seconds, rounded up.
///
/// With whole-second clocks, `now < ceil(iat)` holds exactly when `now < iat`.
#[derive(Deserialize)]
#[serde(transparent)]
struct IssuedAtSeconds(f64);

/// An `exp` value: any JSON number of seconds, rounded down.
#[derive(Deserialize)]
#[serde(transparent)]
struct ExpireAtSeconds(f64);

impl From<IssuedAtSeconds> for i64 {
    fn from(value: IssuedAtSeconds) -> Self {
        value.0.ceil() as i64
    }
}

impl From<ExpireAtSeconds> for i64 {
    fn from(value: ExpireAtSeconds) -> Self {
        value.0.floor() as i64
    }
}

wire_fields! {
    Issuer(EthrDid) => "iss";
    Subject(EthrDid) => "sub";
    IssuedAt(i64 as IssuedAtSeconds) => "iat";
    ExpireAt(i64 as ExpireAtSeconds) => "exp";
    Callback(String) => "callback";
    Claims(ClaimsSpecs) => "claims";
    /// Legacy form of own claims: keys only.
    Requested(Vec<String>) => "requested";
    /// Verified claim titles in a request, disclosed claim tokens in a response.
    Verified(Vec<String>) => "verified";
    /// Token of the request a response answers.
    RequestToken(String) => "req";
    Own(BTreeMap<String, String>) => "own";
    Vc(VcBody) => "vc";
    Forwarded(String) => "forwarded";
}
