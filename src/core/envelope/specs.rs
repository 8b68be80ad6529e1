use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{
    error::ParseError,
    identifier::EthrDid,
    object::{ShapeCheck, UntypedObject},
};

use super::parameters::{
    Callback, Claims, ClaimsSpecs, ExpireAt, IssuedAt, Issuer, Requested, Verified, TYPE,
};

/// How a requested own (unsigned) claim should be treated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfoSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub essential: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One acceptable issuer for a requested verified claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerSelector {
    pub did: EthrDid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// How a requested verified claim should be selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiableSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub essential: Option<bool>,
    /// Issuers accepted for this claim; any issuer when absent.
    #[serde(rename = "iss", skip_serializing_if = "Option::is_none")]
    pub issuer_selector: Option<Vec<IssuerSelector>>,
    /// Exact token required for this claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl UserInfoSpec {
    pub fn is_essential(&self) -> bool {
        self.essential.unwrap_or(false)
    }
}

impl VerifiableSpec {
    pub fn is_essential(&self) -> bool {
        self.essential.unwrap_or(false)
    }
}

/// Body shared by disclosure requests and proposals.
#[derive(Debug, Clone, PartialEq)]
pub struct DisclosureSpecs {
    pub issuer: EthrDid,
    /// Requested own claims, in request order.
    pub own_claims: IndexMap<String, UserInfoSpec>,
    /// Requested verified claims by title, in request order.
    pub verified_claims: IndexMap<String, VerifiableSpec>,
    pub issued_at: Option<i64>,
    pub expire_at: Option<i64>,
    pub callback: Option<String>,
}

impl DisclosureSpecs {
    /// Decode a specs body tagged with the `discriminator` literal.
    ///
    /// Legacy `requested`/`verified` key lists and the structured `claims` maps are merged, with
    /// structured entries winning on key collision.
    pub fn decode(
        object: &UntypedObject,
        discriminator: &str,
        context: &'static str,
    ) -> Result<Self, ParseError> {
        let mut check = ShapeCheck::new(context, object);
        check.literal(TYPE, discriminator);
        let issuer = check.required::<Issuer>();
        let claims = check.optional::<Claims>().map(|c| c.0).unwrap_or_default();
        let requested = check.optional::<Requested>().map(|r| r.0);
        let verified = check.optional::<Verified>().map(|v| v.0);
        let issued_at = check.optional::<IssuedAt>().map(|t| t.0);
        let expire_at = check.optional::<ExpireAt>().map(|t| t.0);
        let callback = check.optional::<Callback>().map(|c| c.0);

        let Some(Issuer(issuer)) = issuer else {
            return Err(check.into_error());
        };
        check.finish()?;

        Ok(Self {
            issuer,
            own_claims: merge_specs(requested, claims.user_info),
            verified_claims: merge_specs(verified, claims.verifiable),
            issued_at,
            expire_at,
            callback,
        })
    }

    /// Encode as a specs body tagged with `discriminator`, in structured `claims` form.
    pub fn encode(self, discriminator: &str) -> anyhow::Result<UntypedObject> {
        let mut object = UntypedObject::default();
        object.0.insert(TYPE.to_owned(), discriminator.into());
        object.insert(Issuer(self.issuer))?;
        object.insert_opt(self.callback.map(Callback))?;
        object.insert(Claims(ClaimsSpecs {
            verifiable: Some(
                self.verified_claims
                    .into_iter()
                    .map(|(k, v)| (k, Some(v)))
                    .collect(),
            ),
            user_info: Some(
                self.own_claims
                    .into_iter()
                    .map(|(k, v)| (k, Some(v)))
                    .collect(),
            ),
        }))?;
        object.insert_opt(self.issued_at.map(IssuedAt))?;
        object.insert_opt(self.expire_at.map(ExpireAt))?;
        Ok(object)
    }
}

fn merge_specs<S: Default>(
    legacy: Option<Vec<String>>,
    structured: Option<IndexMap<String, Option<S>>>,
) -> IndexMap<String, S> {
    let mut merged: IndexMap<String, S> = legacy
        .unwrap_or_default()
        .into_iter()
        .map(|key| (key, S::default()))
        .collect();
    for (key, spec) in structured.unwrap_or_default() {
        merged.insert(key, spec.unwrap_or_default());
    }
    merged
}
