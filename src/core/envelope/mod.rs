//! Mapping between compact wire payloads and typed envelopes.
//!
//! Four public envelope kinds exist, plus a forwarding wrapper:
//!
//! | kind     | discriminator                          |
//! |----------|----------------------------------------|
//! | request  | `"type": "shareReq"`                   |
//! | response | `"type": "shareResp"`                  |
//! | proposal | `"type": "shareReqProposal"`           |
//! | claim    | no `type`, carries a `vc` member       |
//! | forward  | `"type": "fwdReq"` with `forwarded`    |

use anyhow::{bail, Context};
use base64::prelude::*;
use serde_json::Value as Json;

use super::{
    error::ParseError,
    object::{TypedParameter, UntypedObject},
};

use self::parameters::{
    ExpireAt, Forwarded, IssuedAt, Vc, FWD_REQ, SHARE_REQ, SHARE_REQ_PROPOSAL, SHARE_RESP, TYPE,
};

pub mod claim;
pub mod parameters;
pub mod response;
pub mod specs;

pub use claim::{Category, ClaimData, Preview, VerifiedClaim};
pub use response::ResponseBody;
pub use specs::{DisclosureSpecs, IssuerSelector, UserInfoSpec, VerifiableSpec};

/// A transparent wrapper around another token, parsed in its place.
#[derive(Debug, Clone, PartialEq)]
pub struct Forwarding {
    pub forwarded: String,
    pub issued_at: Option<i64>,
    pub expire_at: Option<i64>,
}

/// A decoded envelope, before any token is attached or nested token resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Request(DisclosureSpecs),
    Response(ResponseBody),
    Proposal(DisclosureSpecs),
    Claim(VerifiedClaim),
    Forwarding(Forwarding),
}

impl Envelope {
    /// Decode a JSON payload into its envelope kind.
    pub fn decode(payload: Json) -> Result<Self, ParseError> {
        let object = UntypedObject::try_from(payload)?;

        match object.get_raw(TYPE).and_then(Json::as_str) {
            Some(SHARE_REQ) => {
                DisclosureSpecs::decode(&object, SHARE_REQ, "SelectiveDisclosureRequest")
                    .map(Self::Request)
            }
            Some(SHARE_REQ_PROPOSAL) => DisclosureSpecs::decode(
                &object,
                SHARE_REQ_PROPOSAL,
                "SelectiveDisclosureProposal",
            )
            .map(Self::Proposal),
            Some(SHARE_RESP) => ResponseBody::try_from(&object).map(Self::Response),
            Some(FWD_REQ) => Forwarding::try_from(&object).map(Self::Forwarding),
            _ if object.contains_key(Vc::KEY) => {
                VerifiedClaim::try_from(&object).map(Self::Claim)
            }
            _ => {
                let value = object
                    .get_raw(TYPE)
                    .map_or_else(|| "undefined".to_owned(), Json::to_string);
                Err(ParseError::shape(format!(
                    "Invalid value {value} supplied to Envelope/{TYPE}: expected one of \
                     \"{SHARE_REQ}\", \"{SHARE_RESP}\", \"{SHARE_REQ_PROPOSAL}\", \"{FWD_REQ}\" \
                     or a verifiable credential"
                )))
            }
        }
    }

    /// Encode into the wire payload; the inverse of [Envelope::decode].
    pub fn encode(self) -> anyhow::Result<Json> {
        let object: UntypedObject = match self {
            Self::Request(specs) => specs.encode(SHARE_REQ),
            Self::Proposal(specs) => specs.encode(SHARE_REQ_PROPOSAL),
            Self::Response(body) => body.try_into(),
            Self::Claim(claim) => claim.try_into(),
            Self::Forwarding(forwarding) => forwarding.try_into(),
        }
        .context("unable to encode envelope")?;
        Ok(object.into())
    }

    pub fn issued_at(&self) -> Option<i64> {
        match self {
            Self::Request(specs) | Self::Proposal(specs) => specs.issued_at,
            Self::Response(body) => body.issued_at,
            Self::Claim(claim) => claim.issued_at,
            Self::Forwarding(forwarding) => forwarding.issued_at,
        }
    }

    pub fn expire_at(&self) -> Option<i64> {
        match self {
            Self::Request(specs) | Self::Proposal(specs) => specs.expire_at,
            Self::Response(body) => body.expire_at,
            Self::Claim(claim) => claim.expire_at,
            Self::Forwarding(forwarding) => forwarding.expire_at,
        }
    }
}

impl TryFrom<&UntypedObject> for Forwarding {
    type Error = ParseError;

    fn try_from(object: &UntypedObject) -> Result<Self, Self::Error> {
        let mut check = super::object::ShapeCheck::new("ForwardedRequest", object);
        check.literal(TYPE, FWD_REQ);
        let forwarded = check.required::<Forwarded>();
        let issued_at = check.optional::<IssuedAt>().map(|t| t.0);
        let expire_at = check.optional::<ExpireAt>().map(|t| t.0);

        let Some(Forwarded(forwarded)) = forwarded else {
            return Err(check.into_error());
        };
        check.finish()?;

        Ok(Self {
            forwarded,
            issued_at,
            expire_at,
        })
    }
}

impl TryFrom<Forwarding> for UntypedObject {
    type Error = anyhow::Error;

    fn try_from(value: Forwarding) -> Result<Self, Self::Error> {
        let mut object = UntypedObject::default();
        object.0.insert(TYPE.to_owned(), FWD_REQ.into());
        object.insert(Forwarded(value.forwarded))?;
        object.insert_opt(value.issued_at.map(IssuedAt))?;
        object.insert_opt(value.expire_at.map(ExpireAt))?;
        Ok(object)
    }
}

/// Decode the payload of a compact JWT without checking its signature.
pub fn decode_payload(jwt: &str) -> Result<Json, ParseError> {
    decode_segment(jwt).map_err(ParseError::TokenDecode)
}

fn decode_segment(jwt: &str) -> anyhow::Result<Json> {
    let mut segments = jwt.split('.');
    let (Some(_header), Some(payload)) = (segments.next(), segments.next()) else {
        bail!("token is not a compact JWT")
    };

    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .context("jwt payload was not valid base64url")?;

    serde_json::from_slice(&bytes).context("jwt payload was not valid json")
}

/// Encode a payload as an unsecured (`alg: none`) compact JWT.
///
/// Useful as the signing input for [ResponseSigner](crate::holder::response::ResponseSigner)
/// implementations and in tests.
pub fn encode_unsigned(payload: &Json) -> String {
    let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = BASE64_URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{payload}.")
}
