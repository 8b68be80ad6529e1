use selective_disclosure::{
    config::Config,
    core::document::{ParsedJwt, SpecialFlag},
    parse::{unverified_parse, unverified_parse_at, Parser},
    ParseError,
};
use serde_json::json;


use mock::{
    badly_signed, claim, did, forward, parser, request, reshaped, token, Call, MockVerifier,
    HOLDER, ISSUER_A, ISSUER_B, REQUESTER,
};

#[tokio::test]
async fn request_with_legacy_and_structured_claims() {
    let mut payload = request(json!({
        "user_info": { "dni": { "essential": true } },
        "verifiable": { "license": null }
    }));
    payload["requested"] = json!(["dni", "email"]);
    let jwt = token(payload);

    let ParsedJwt::Request(parsed) = parser().parse(&jwt, None).await.unwrap() else {
        panic!("expected a request")
    };

    assert_eq!(parsed.jwt, jwt);
    assert_eq!(parsed.issuer, did(REQUESTER));
    assert_eq!(parsed.own_claims.len(), 2);
    assert!(parsed.own_claims["dni"].is_essential());
    assert!(!parsed.own_claims["email"].is_essential());
    assert!(!parsed.verified_claims["license"].is_essential());
    assert_eq!(
        parsed.callback.as_deref(),
        Some("https://requester.example/callback")
    );
}

#[tokio::test]
async fn claim_resolves_wrapped_claims() {
    let inner_a = token(claim(ISSUER_A, "Email", json!({ "email": "ana@example.com" }), &[]));
    let inner_b = token(claim(ISSUER_B, "Phone", json!({ "phoneNumber": "" }), &[]));
    let outer = token(claim(
        ISSUER_A,
        "Identity",
        json!({ "name": "Ana" }),
        &[("a", inner_a.clone()), ("b", inner_b.clone())],
    ));

    let parser = parser();
    let ParsedJwt::Credential(document) = parser.parse(&outer, None).await.unwrap() else {
        panic!("expected a credential")
    };

    assert_eq!(document.title, "Identity");
    assert_eq!(document.subject, did(HOLDER));
    assert_eq!(document.nested.len(), 2);
    assert_eq!(document.nested[0].jwt, inner_a);
    assert_eq!(
        document.nested[0].special_flag,
        Some(SpecialFlag::Email {
            address: "ana@example.com".into()
        })
    );
    assert_eq!(document.nested[1].issuer, did(ISSUER_B));
    assert_eq!(document.nested[1].special_flag, None);
    assert_eq!(document.flatten().count(), 3);

    assert_eq!(parser_calls(&parser), vec![Call::Credential; 3]);

    let unverified = unverified_parse(&outer).unwrap();
    assert_eq!(unverified, ParsedJwt::Credential(document));
}

#[tokio::test]
async fn nested_documents_keep_token_order() {
    let zeta = token(claim(ISSUER_B, "Zeta", json!({}), &[]));
    let alpha = token(claim(ISSUER_B, "Alpha", json!({}), &[]));
    let outer = token(claim(
        ISSUER_A,
        "Identity",
        json!({}),
        &[("z", zeta.clone()), ("a", alpha.clone())],
    ));

    let ParsedJwt::Credential(document) = parser().parse(&outer, None).await.unwrap() else {
        panic!("expected a credential")
    };
    let nested: Vec<_> = document.nested.iter().map(|d| &d.jwt).collect();
    assert_eq!(nested, vec![&zeta, &alpha]);
}

#[tokio::test]
async fn claim_wrapping_a_request_fails() {
    let outer = token(claim(
        ISSUER_A,
        "Identity",
        json!({}),
        &[
            ("a", token(claim(ISSUER_A, "Email", json!({}), &[]))),
            ("b", token(request(json!({})))),
        ],
    ));

    assert!(matches!(
        unverified_parse(&outer),
        Err(ParseError::NonCredentialWrap)
    ));
    assert!(matches!(
        parser().parse(&outer, None).await,
        Err(ParseError::NonCredentialWrap)
    ));
}

#[tokio::test]
async fn forwarding_is_transparent() {
    let credential = token(claim(ISSUER_A, "Degree", json!({ "level": "BSc" }), &[]));
    let forwarded = token(forward(&token(forward(&credential))));

    let parser = parser();
    let direct = parser.parse(&credential, None).await.unwrap();
    let via_forward = parser.parse(&forwarded, None).await.unwrap();
    assert_eq!(direct, via_forward);
    assert_eq!(via_forward.jwt(), credential);

    let mut expired = claim(ISSUER_A, "Degree", json!({}), &[]);
    expired["exp"] = json!(1);
    let expired = token(expired);
    assert!(matches!(
        unverified_parse(&expired),
        Err(ParseError::AfterExpiry { expected: 1, .. })
    ));
    assert!(matches!(
        parser.parse(&token(forward(&expired)), None).await,
        Err(ParseError::AfterExpiry { expected: 1, .. })
    ));
}

#[tokio::test]
async fn forwarding_token_is_verified_as_an_envelope() {
    let credential = token(claim(ISSUER_A, "Degree", json!({}), &[]));
    let forwarded = token(forward(&credential));

    let parser = parser();
    parser.parse(&forwarded, Some(&did(HOLDER))).await.unwrap();
    assert_eq!(
        parser_calls(&parser),
        vec![
            Call::Envelope {
                audience: Some(HOLDER.into())
            },
            Call::Credential
        ]
    );
}

#[tokio::test]
async fn audience_is_checked_by_the_verifier() {
    let mut payload = request(json!({}));
    payload["aud"] = json!(REQUESTER);
    let jwt = token(payload);

    let parser = parser();
    assert!(matches!(
        parser.parse(&jwt, Some(&did(HOLDER))).await,
        Err(ParseError::Verification(_))
    ));
    assert!(parser.parse(&jwt, Some(&did(REQUESTER))).await.is_ok());
    assert!(parser.parse(&jwt, None).await.is_ok());
}

#[tokio::test]
async fn invalid_tokens_fail_before_verification() {
    let parser = parser();

    assert!(matches!(
        parser.parse("not a token", None).await,
        Err(ParseError::TokenDecode(_))
    ));

    let mut expired = request(json!({}));
    expired["exp"] = json!(1);
    assert!(matches!(
        parser.parse(&badly_signed(expired), None).await,
        Err(ParseError::AfterExpiry { expected: 1, .. })
    ));

    let shapeless = token(json!({ "type": "shareReq", "iss": 42 }));
    assert!(matches!(
        parser.parse(&shapeless, None).await,
        Err(ParseError::ShapeDecode { .. })
    ));

    assert!(parser_calls(&parser).is_empty());
}

#[tokio::test]
async fn nested_verification_failure_fails_the_claim() {
    let outer = token(claim(
        ISSUER_A,
        "Identity",
        json!({}),
        &[("a", badly_signed(claim(ISSUER_A, "Email", json!({}), &[])))],
    ));
    assert!(unverified_parse(&outer).is_ok());
    assert!(matches!(
        parser().parse(&outer, None).await,
        Err(ParseError::Verification(_))
    ));
}

#[tokio::test]
async fn first_failing_sibling_in_token_order_wins() {
    let unsigned = badly_signed(claim(ISSUER_A, "Email", json!({}), &[]));
    let misshapen = reshaped(claim(ISSUER_B, "Phone", json!({}), &[]));
    let wrapping = |first: &str, second: &str| {
        token(claim(
            ISSUER_A,
            "Identity",
            json!({}),
            &[("a", first.to_owned()), ("b", second.to_owned())],
        ))
    };

    let outer = wrapping(&unsigned, &misshapen);
    assert!(unverified_parse(&outer).is_ok());
    assert!(matches!(
        parser().parse(&outer, None).await,
        Err(ParseError::Verification(_))
    ));

    let outer = wrapping(&misshapen, &unsigned);
    assert!(unverified_parse(&outer).is_ok());
    assert!(matches!(
        parser().parse(&outer, None).await,
        Err(ParseError::ShapeDecode { .. })
    ));
}

#[test]
fn fractional_timestamps_are_whole_seconds() {
    let mut payload = request(json!({}));
    payload["iat"] = json!(1000.5);
    payload["exp"] = json!(2.0005e3);
    let jwt = token(payload);

    assert!(unverified_parse_at(&jwt, 1001, 16).is_ok());
    assert!(unverified_parse_at(&jwt, 2000, 16).is_ok());
    assert!(matches!(
        unverified_parse_at(&jwt, 1000, 16),
        Err(ParseError::BeforeIssuance {
            expected: 1001,
            current: 1000
        })
    ));
    assert!(matches!(
        unverified_parse_at(&jwt, 2001, 16),
        Err(ParseError::AfterExpiry {
            expected: 2000,
            current: 2001
        })
    ));
}

#[tokio::test]
async fn unusable_resolver_endpoint() {
    let parser = Parser::new(MockVerifier::default(), Config::new("not a url"));
    let jwt = token(request(json!({})));

    assert!(matches!(
        parser.parse(&jwt, None).await,
        Err(ParseError::ResolverCreation(_))
    ));
}

#[tokio::test]
async fn deep_forwarding_hits_the_depth_bound() {
    let mut jwt = token(claim(ISSUER_A, "Degree", json!({}), &[]));
    for _ in 0..5 {
        jwt = token(forward(&jwt));
    }

    assert!(unverified_parse_at(&jwt, 0, 5).is_ok());
    assert!(matches!(
        unverified_parse_at(&jwt, 0, 4),
        Err(ParseError::RecursionLimit { limit: 4 })
    ));

    let config = Config::new(mock::RESOLVER).with_max_depth(4);
    let parser = Parser::new(MockVerifier::default(), config);
    assert!(matches!(
        parser.parse(&jwt, None).await,
        Err(ParseError::RecursionLimit { limit: 4 })
    ));
}

#[tokio::test]
async fn clock_drives_the_validity_window() {
    let mut payload = request(json!({}));
    payload["iat"] = json!(1000);
    payload["exp"] = json!(2000);
    let jwt = token(payload);

    let at = |now: fn() -> i64| {
        Parser::new(MockVerifier::default(), Config::new(mock::RESOLVER)).with_clock(now)
    };

    assert!(at(|| 1000).parse(&jwt, None).await.is_ok());
    assert!(at(|| 2000).parse(&jwt, None).await.is_ok());
    assert!(matches!(
        at(|| 999).parse(&jwt, None).await,
        Err(ParseError::BeforeIssuance {
            expected: 1000,
            current: 999
        })
    ));
    assert!(matches!(
        at(|| 2001).unverified_parse(&jwt),
        Err(ParseError::AfterExpiry {
            expected: 2000,
            current: 2001
        })
    ));
}

fn parser_calls(parser: &Parser<MockVerifier>) -> Vec<Call> {
    parser.verifier().calls()
}
