//! Property tests for credential resolution and route guarding.
//!
//! These exercise cross-module invariants: the gate never lets an anonymous
//! caller through a protected route, and tokens never leak through `Debug`.

use proptest::prelude::*;
use tribute_gateway::{
    AccessDecision, AccessGate, Credential, CredentialResolver, Envelope, RequestContext,
    RouteRequirement, Sanitizer, SlugSanitizer, Tainted,
};

// Strategy: tokens shaped like compact JWTs
fn arb_token() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9_-]{8,40}\\.[A-Za-z0-9_-]{8,40}").unwrap()
}

// Strategy: optional role names
fn arb_role() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("administrator".to_string())),
        Just(Some("editor".to_string())),
        Just(Some("subscriber".to_string())),
    ]
}

fn arb_credential() -> impl Strategy<Value = Credential> {
    prop_oneof![
        prop::strategy::LazyJust::new(Credential::absent),
        (arb_token(), arb_role()).prop_map(|(token, role)| {
            let credential = Credential::bearer(token);
            match role {
                Some(role) => credential.with_role(role),
                None => credential,
            }
        }),
    ]
}

proptest! {
    /// Property: public routes allow everyone
    #[test]
    fn public_route_always_allows(credential in arb_credential()) {
        let gate = AccessGate::new("/login");
        prop_assert_eq!(gate.authorize(&credential, &RouteRequirement::Public), AccessDecision::Allow);
    }

    /// Property: anonymous callers on protected routes are redirected, never allowed
    #[test]
    fn anonymous_protected_route_redirects(role in "[a-z]{3,12}") {
        let gate = AccessGate::new("/login");
        let anonymous = Credential::absent();

        for requirement in [RouteRequirement::RequiresAuth, RouteRequirement::role(role)] {
            prop_assert_eq!(
                gate.authorize(&anonymous, &requirement),
                AccessDecision::RedirectTo("/login".to_string())
            );
        }
    }

    /// Property: a present credential always passes `RequiresAuth`
    #[test]
    fn present_credential_passes_requires_auth(token in arb_token()) {
        let gate = AccessGate::new("/login");
        let decision = gate.authorize(&Credential::bearer(token), &RouteRequirement::RequiresAuth);
        prop_assert!(decision.is_allowed());
    }

    /// Property: a role requirement allows exactly the matching role
    #[test]
    fn role_requirement_matches_exactly(token in arb_token(), role in arb_role()) {
        let gate = AccessGate::new("/login");
        let mut credential = Credential::bearer(token);
        if let Some(role) = &role {
            credential = credential.with_role(role.clone());
        }

        let decision = gate.authorize(&credential, &RouteRequirement::role("administrator"));
        if role.as_deref() == Some("administrator") {
            prop_assert_eq!(decision, AccessDecision::Allow);
        } else {
            prop_assert_eq!(decision, AccessDecision::Reject(403));
        }
    }

    /// Property: whitespace-only tokens resolve to an absent credential
    #[test]
    fn whitespace_tokens_are_absent(ws in "[ \t]{0,8}") {
        let mut ctx = RequestContext::new("req-prop");
        ctx.add_cookie("auth_token", ws.clone());
        ctx.add_header("Authorization", format!("Bearer {}", ws));

        let credential = CredentialResolver::default().resolve(&ctx);
        prop_assert!(!credential.is_present());
    }

    /// Property: resolved tokens never appear in debug output
    #[test]
    fn debug_never_leaks_token(token in arb_token()) {
        let mut ctx = RequestContext::new("req-prop");
        ctx.add_cookie("jwt", token.clone());

        let credential = CredentialResolver::default().resolve(&ctx);
        prop_assert!(credential.is_present());
        let debug = format!("{:?}", credential);
        prop_assert!(!debug.contains(&token));
    }

    /// Property: the first configured cookie wins
    #[test]
    fn first_cookie_key_wins(a in arb_token(), b in arb_token()) {
        let mut ctx = RequestContext::new("req-prop");
        ctx.add_cookie("auth_token", a.clone());
        ctx.add_cookie("jwt", b);

        let credential = CredentialResolver::default().resolve(&ctx);
        prop_assert_eq!(credential.raw().map(|s| s.expose_secret().as_str()), Some(a.as_str()));
    }

    /// Property: sanitized slugs are lowercase and URL-safe
    #[test]
    fn sanitized_slugs_are_url_safe(input in ".{0,64}") {
        if let Ok(slug) = SlugSanitizer::default().sanitize(Tainted::new(input)) {
            let slug = slug.into_inner();
            prop_assert!(!slug.is_empty());
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }

    /// Property: envelopes carry data xor error
    #[test]
    fn envelope_is_data_xor_error(status in 100u16..600, message in ".{0,32}") {
        let ok = Envelope::success(status, serde_json::json!({"m": message.clone()}));
        prop_assert!(ok.is_ok() && ok.data().is_some() && ok.error().is_none());

        let failed = Envelope::failure(status, message);
        prop_assert!(!failed.is_ok() && failed.data().is_none());
        prop_assert!(failed.error().is_some_and(|e| !e.is_empty()));
    }
}
