use crate::core::{
    error::ParseError,
    identifier::EthrDid,
    object::{ShapeCheck, UntypedObject},
};

use super::{
    claim::ClaimData,
    parameters::{
        ExpireAt, IssuedAt, Own, RequestToken, Subject, Verified, SHARE_RESP, TYPE,
    },
};

/// Body of a disclosure response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseBody {
    /// Recipient of the response, i.e. the issuer of the request.
    pub subject: EthrDid,
    /// Token of the request being answered.
    pub request_token: String,
    /// Unsigned claims disclosed directly.
    pub own_claims: ClaimData,
    /// Tokens of the disclosed verified claims.
    pub verified_claims: Vec<String>,
    pub issued_at: Option<i64>,
    pub expire_at: Option<i64>,
}

impl TryFrom<&UntypedObject> for ResponseBody {
    type Error = ParseError;

    fn try_from(object: &UntypedObject) -> Result<Self, Self::Error> {
        let mut check = ShapeCheck::new("SelectiveDisclosureResponse", object);
        check.literal(TYPE, SHARE_RESP);
        let subject = check.required::<Subject>();
        let request_token = check.required::<RequestToken>();
        let own_claims = check.optional::<Own>().map(|o| o.0).unwrap_or_default();
        let verified_claims = check.optional::<Verified>().map(|v| v.0).unwrap_or_default();
        let issued_at = check.optional::<IssuedAt>().map(|t| t.0);
        let expire_at = check.optional::<ExpireAt>().map(|t| t.0);

        let (Some(Subject(subject)), Some(RequestToken(request_token))) = (subject, request_token)
        else {
            return Err(check.into_error());
        };
        check.finish()?;

        Ok(Self {
            subject,
            request_token,
            own_claims,
            verified_claims,
            issued_at,
            expire_at,
        })
    }
}

impl TryFrom<ResponseBody> for UntypedObject {
    type Error = anyhow::Error;

    fn try_from(value: ResponseBody) -> Result<Self, Self::Error> {
        let mut object = UntypedObject::default();
        object.0.insert(TYPE.to_owned(), SHARE_RESP.into());
        object.insert(Subject(value.subject))?;
        object.insert(RequestToken(value.request_token))?;
        object.insert(Own(value.own_claims))?;
        object.insert(Verified(value.verified_claims))?;
        object.insert_opt(value.issued_at.map(IssuedAt))?;
        object.insert_opt(value.expire_at.map(ExpireAt))?;
        Ok(object)
    }
}
