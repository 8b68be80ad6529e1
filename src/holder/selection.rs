use tracing::debug;

use crate::core::{
    document::CredentialDocument,
    envelope::{ClaimData, DisclosureSpecs, VerifiableSpec},
    identifier::EthrDid,
};

use super::{identity::Identity, synonyms::own_claim_value};

/// Claims chosen to answer a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseClaims {
    pub own_claims: ClaimData,
    pub verified_claims: Vec<CredentialDocument>,
    /// Essential own claim keys and verified claim titles that could not be satisfied, own claims
    /// first.
    pub missing_required: Vec<String>,
}

impl ResponseClaims {
    pub fn is_complete(&self) -> bool {
        self.missing_required.is_empty()
    }
}

/// Select the own and verified claims that answer `request`.
///
/// Only documents whose subject is `own_did` are considered, along with the documents they
/// directly wrap. Missing claims are not an error unless the request marks them essential, in
/// which case they are listed in [ResponseClaims::missing_required].
pub fn select_response_claims(
    own_did: &EthrDid,
    request: &DisclosureSpecs,
    documents: &[CredentialDocument],
    identity: &Identity,
) -> ResponseClaims {
    let mut selected = ResponseClaims::default();

    for (key, spec) in &request.own_claims {
        match own_claim_value(key, identity) {
            Some(value) => {
                selected.own_claims.insert(key.clone(), value);
            }
            None if spec.is_essential() => selected.missing_required.push(key.clone()),
            None => debug!(%key, "own claim unavailable"),
        }
    }

    let pool: Vec<&CredentialDocument> = documents
        .iter()
        .filter(|document| &document.subject == own_did)
        .flat_map(CredentialDocument::flatten)
        .collect();

    for (title, spec) in &request.verified_claims {
        let found = pool
            .iter()
            .find(|candidate| satisfies(candidate, title, spec));
        match found {
            Some(document) => selected.verified_claims.push((*document).clone()),
            None if spec.is_essential() => selected.missing_required.push(title.clone()),
            None => debug!(%title, "verified claim unavailable"),
        }
    }

    selected
}

fn satisfies(candidate: &CredentialDocument, title: &str, spec: &VerifiableSpec) -> bool {
    if candidate.title != title {
        return false;
    }
    if let Some(jwt) = &spec.jwt {
        if &candidate.jwt != jwt {
            return false;
        }
    }
    match &spec.issuer_selector {
        Some(issuers) => issuers.iter().any(|selector| selector.did == candidate.issuer),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::core::envelope::{IssuerSelector, UserInfoSpec};

    const HOLDER: &str = "did:ethr:0x1111111111111111111111111111111111111111";
    const OTHER: &str = "did:ethr:0x2222222222222222222222222222222222222222";
    const ISSUER: &str = "did:ethr:0x3333333333333333333333333333333333333333";

    fn did(s: &str) -> EthrDid {
        s.parse().unwrap()
    }

    fn document(subject: &str, title: &str, jwt: &str) -> CredentialDocument {
        CredentialDocument {
            issuer: did(ISSUER),
            subject: did(subject),
            title: title.into(),
            category: None,
            preview: None,
            data: ClaimData::from([(title.to_owned(), "value".to_owned())]),
            issued_at: None,
            expire_at: None,
            jwt: jwt.into(),
            nested: vec![],
            special_flag: None,
        }
    }

    fn request(verified: &[(&str, VerifiableSpec)]) -> DisclosureSpecs {
        DisclosureSpecs {
            issuer: did(ISSUER),
            own_claims: IndexMap::new(),
            verified_claims: verified
                .iter()
                .map(|(t, s)| (t.to_string(), s.clone()))
                .collect(),
            issued_at: None,
            expire_at: None,
            callback: None,
        }
    }

    #[test]
    fn ignores_documents_of_other_subjects() {
        let essential = VerifiableSpec {
            essential: Some(true),
            ..Default::default()
        };
        let request = request(&[("degree", essential)]);
        let documents = [document(OTHER, "degree", "a.b.c")];

        let selected =
            select_response_claims(&did(HOLDER), &request, &documents, &Identity::default());
        assert!(selected.verified_claims.is_empty());
        assert_eq!(selected.missing_required, vec!["degree".to_owned()]);
    }

    #[test]
    fn includes_direct_nested_documents_only() {
        let mut inner = document(HOLDER, "inner", "i.i.i");
        inner.nested.push(document(HOLDER, "deepest", "d.d.d"));
        let mut outer = document(HOLDER, "outer", "o.o.o");
        outer.nested.push(inner);

        let request = request(&[
            ("inner", VerifiableSpec::default()),
            ("deepest", VerifiableSpec::default()),
        ]);
        let selected = select_response_claims(&did(HOLDER), &request, &[outer], &Identity::default());

        let titles: Vec<_> = selected.verified_claims.iter().map(|d| &d.title).collect();
        assert_eq!(titles, ["inner"]);
        assert!(selected.is_complete());
    }

    #[test]
    fn jwt_selector_pins_the_token() {
        let spec = VerifiableSpec {
            jwt: Some("second.b.c".into()),
            ..Default::default()
        };
        let request = request(&[("degree", spec)]);
        let documents = [
            document(HOLDER, "degree", "first.b.c"),
            document(HOLDER, "degree", "second.b.c"),
        ];

        let selected =
            select_response_claims(&did(HOLDER), &request, &documents, &Identity::default());
        assert_eq!(selected.verified_claims[0].jwt, "second.b.c");
    }

    #[test]
    fn unmatched_issuer_selector_is_missing_when_essential() {
        let spec = VerifiableSpec {
            essential: Some(true),
            issuer_selector: Some(vec![IssuerSelector {
                did: did(OTHER),
                url: None,
            }]),
            ..Default::default()
        };
        let request = request(&[("degree", spec)]);
        let documents = [document(HOLDER, "degree", "a.b.c")];

        let selected =
            select_response_claims(&did(HOLDER), &request, &documents, &Identity::default());
        assert!(selected.verified_claims.is_empty());
        assert_eq!(selected.missing_required, vec!["degree".to_owned()]);
    }

    #[test]
    fn missing_own_claims_come_first() {
        let mut request = request(&[(
            "degree",
            VerifiableSpec {
                essential: Some(true),
                ..Default::default()
            },
        )]);
        request.own_claims.insert(
            "dni".into(),
            UserInfoSpec {
                essential: Some(true),
                reason: None,
            },
        );
        request
            .own_claims
            .insert("floor".into(), UserInfoSpec::default());

        let selected = select_response_claims(&did(HOLDER), &request, &[], &Identity::default());
        assert!(selected.own_claims.is_empty());
        assert_eq!(
            selected.missing_required,
            vec!["dni".to_owned(), "degree".to_owned()]
        );
    }
}
