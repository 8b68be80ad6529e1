use std::collections::BTreeMap;

use anyhow::{bail, Error};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{
    error::ParseError,
    identifier::EthrDid,
    object::{ShapeCheck, UntypedObject},
};

use super::parameters::{ExpireAt, IssuedAt, Issuer, Subject, Vc};

const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// String-keyed claim values.
pub type ClaimData = BTreeMap<String, String>;

/// Semantic category of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Education,
    LivingPlace,
    Finance,
    Identity,
}

/// Hint for how a claim should be previewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    #[serde(rename = "type", deserialize_with = "whole_number")]
    pub kind: i64,
    pub fields: Vec<String>,
}

/// Any JSON number, rounded down.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    f64::deserialize(deserializer).map(|n| n.floor() as i64)
}

/// The value stored under a claim title in `credentialSubject`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectClaim {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ClaimData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
}

/// A `credentialSubject` holding exactly one claim, keyed by its title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, SubjectClaim>",
    into = "BTreeMap<String, SubjectClaim>"
)]
pub struct CredentialSubject {
    pub title: String,
    pub claim: SubjectClaim,
}

impl TryFrom<BTreeMap<String, SubjectClaim>> for CredentialSubject {
    type Error = Error;

    fn try_from(map: BTreeMap<String, SubjectClaim>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            bail!("expected exactly one claim title, found {}", map.len())
        }
        let Some((title, claim)) = map.into_iter().next() else {
            bail!("expected exactly one claim title, found none")
        };
        Ok(Self { title, claim })
    }
}

impl From<CredentialSubject> for BTreeMap<String, SubjectClaim> {
    fn from(value: CredentialSubject) -> Self {
        BTreeMap::from([(value.title, value.claim)])
    }
}

/// The `vc` member of a claim token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcBody {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(rename = "credentialSubject")]
    pub credential_subject: CredentialSubject,
}

/// A decoded claim token, before its wrapped tokens are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedClaim {
    pub issuer: EthrDid,
    pub subject: EthrDid,
    pub title: String,
    pub category: Option<Category>,
    pub preview: Option<Preview>,
    pub data: ClaimData,
    /// Nested claim tokens, keyed by an issuer chosen name, in token order.
    pub wrapped: IndexMap<String, String>,
    pub issued_at: Option<i64>,
    pub expire_at: Option<i64>,
}

impl TryFrom<&UntypedObject> for VerifiedClaim {
    type Error = ParseError;

    fn try_from(object: &UntypedObject) -> Result<Self, Self::Error> {
        let mut check = ShapeCheck::new("VerifiedClaim", object);
        let issuer = check.required::<Issuer>();
        let subject = check.required::<Subject>();
        let vc = check.required::<Vc>();
        let issued_at = check.optional::<IssuedAt>().map(|t| t.0);
        let expire_at = check.optional::<ExpireAt>().map(|t| t.0);

        let (Some(Issuer(issuer)), Some(Subject(subject)), Some(Vc(vc))) = (issuer, subject, vc)
        else {
            return Err(check.into_error());
        };
        check.finish()?;

        let CredentialSubject { title, claim } = vc.credential_subject;
        Ok(Self {
            issuer,
            subject,
            title,
            category: claim.category,
            preview: claim.preview,
            data: claim.data.unwrap_or_default(),
            wrapped: claim.wrapped.unwrap_or_default(),
            issued_at,
            expire_at,
        })
    }
}

impl TryFrom<VerifiedClaim> for UntypedObject {
    type Error = Error;

    fn try_from(value: VerifiedClaim) -> Result<Self, Self::Error> {
        let mut object = UntypedObject::default();
        object.insert(Issuer(value.issuer))?;
        object.insert(Subject(value.subject))?;
        object.insert(Vc(VcBody {
            context: vec![CREDENTIALS_V1_CONTEXT.to_owned()],
            types: vec![VERIFIABLE_CREDENTIAL_TYPE.to_owned()],
            credential_subject: CredentialSubject {
                title: value.title,
                claim: SubjectClaim {
                    data: Some(value.data),
                    wrapped: (!value.wrapped.is_empty()).then_some(value.wrapped),
                    category: value.category,
                    preview: value.preview,
                },
            },
        }))?;
        object.insert_opt(value.issued_at.map(IssuedAt))?;
        object.insert_opt(value.expire_at.map(ExpireAt))?;
        Ok(object)
    }
}
