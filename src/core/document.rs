use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::{
    envelope::{Category, ClaimData, DisclosureSpecs, Preview, ResponseBody, VerifiedClaim},
    identifier::EthrDid,
};

/// A request for own and verified claims, along with the token it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectiveDisclosureRequest {
    pub specs: DisclosureSpecs,
    pub jwt: String,
}

/// A proposal of claims to be requested, along with the token it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectiveDisclosureProposal {
    pub specs: DisclosureSpecs,
    pub jwt: String,
}

/// A response to a [SelectiveDisclosureRequest], along with the token it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectiveDisclosureResponse {
    pub body: ResponseBody,
    pub jwt: String,
}

impl Deref for SelectiveDisclosureRequest {
    type Target = DisclosureSpecs;

    fn deref(&self) -> &Self::Target {
        &self.specs
    }
}

impl Deref for SelectiveDisclosureProposal {
    type Target = DisclosureSpecs;

    fn deref(&self) -> &Self::Target {
        &self.specs
    }
}

impl Deref for SelectiveDisclosureResponse {
    type Target = ResponseBody;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

/// Classification of well-known claims, derived from title and data only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpecialFlag {
    Email { address: String },
    Phone { number: String },
}

impl SpecialFlag {
    pub fn extract(title: &str, data: &ClaimData) -> Option<Self> {
        let value = |key: &str| data.get(key).filter(|v| !v.is_empty()).cloned();

        match title.to_lowercase().as_str() {
            "email" => value("email").map(|address| Self::Email { address }),
            "phone" | "telefono" => value("phoneNumber").map(|number| Self::Phone { number }),
            _ => None,
        }
    }
}

/// A parsed claim, owning the claims it wraps.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialDocument {
    pub issuer: EthrDid,
    pub subject: EthrDid,
    pub title: String,
    pub category: Option<Category>,
    pub preview: Option<Preview>,
    pub data: ClaimData,
    pub issued_at: Option<i64>,
    pub expire_at: Option<i64>,
    pub jwt: String,
    pub nested: Vec<CredentialDocument>,
    pub special_flag: Option<SpecialFlag>,
}

impl CredentialDocument {
    pub(crate) fn new(claim: VerifiedClaim, jwt: String, nested: Vec<CredentialDocument>) -> Self {
        let special_flag = SpecialFlag::extract(&claim.title, &claim.data);
        Self {
            issuer: claim.issuer,
            subject: claim.subject,
            title: claim.title,
            category: claim.category,
            preview: claim.preview,
            data: claim.data,
            issued_at: claim.issued_at,
            expire_at: claim.expire_at,
            jwt,
            nested,
            special_flag,
        }
    }

    /// This document followed by its direct nested documents.
    pub fn flatten(&self) -> impl Iterator<Item = &CredentialDocument> {
        std::iter::once(self).chain(self.nested.iter())
    }
}

/// The typed result of parsing a token.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedJwt {
    Request(SelectiveDisclosureRequest),
    Response(SelectiveDisclosureResponse),
    Proposal(SelectiveDisclosureProposal),
    Credential(CredentialDocument),
}

impl ParsedJwt {
    pub fn jwt(&self) -> &str {
        match self {
            Self::Request(r) => &r.jwt,
            Self::Response(r) => &r.jwt,
            Self::Proposal(p) => &p.jwt,
            Self::Credential(c) => &c.jwt,
        }
    }

    pub fn into_credential(self) -> Option<CredentialDocument> {
        match self {
            Self::Credential(c) => Some(c),
            _ => None,
        }
    }
}
