//! Property-based tests for clauseease-api
//!
//! Covers account field validation, token handling and report filenames.

use clauseease_api::auth::jwt::{extract_bearer_token, generate_access_token, validate_access_token};
use clauseease_api::auth::password::{validate_email, validate_password_strength, validate_username};
use clauseease_api::handlers::documents::report_filename;
use proptest::prelude::*;

const SECRET: &str = "property-test-secret";

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================================
    // Username Validation
    // ============================================================

    #[test]
    fn usernames_of_word_characters_are_accepted(name in "[A-Za-z0-9_]{3,20}") {
        prop_assert!(validate_username(&name).is_ok());
    }

    #[test]
    fn usernames_outside_length_bounds_are_rejected(
        name in prop_oneof!["[a-z]{0,2}", "[a-z]{21,40}"]
    ) {
        prop_assert!(validate_username(&name).is_err());
    }

    #[test]
    fn usernames_with_other_characters_are_rejected(
        head in "[a-z]{2,8}",
        bad in "[ !@#$%^&*.-]",
        tail in "[a-z]{1,8}"
    ) {
        let name = format!("{}{}{}", head, bad, tail);
        prop_assert!(validate_username(&name).is_err());
    }

    // ============================================================
    // Password and Email Validation
    // ============================================================

    #[test]
    fn strong_passwords_are_accepted(
        upper in "[A-Z]{1,4}",
        lower in "[a-z]{6,10}",
        digits in "[0-9]{1,4}"
    ) {
        let password = format!("{}{}{}", upper, lower, digits);
        prop_assert!(validate_password_strength(&password).is_ok());
    }

    #[test]
    fn passwords_without_digits_are_rejected(password in "[A-Za-z]{8,30}") {
        prop_assert!(validate_password_strength(&password).is_err());
    }

    #[test]
    fn short_passwords_are_rejected(password in "[A-Za-z0-9]{0,7}") {
        prop_assert!(validate_password_strength(&password).is_err());
    }

    #[test]
    fn well_formed_emails_are_accepted(
        local in "[a-z]{1,20}",
        domain in "[a-z]{2,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(validate_email(&email).is_ok());
    }

    #[test]
    fn emails_without_at_sign_are_rejected(email in "[a-z.]{5,30}") {
        prop_assert!(validate_email(&email).is_err());
    }

    // ============================================================
    // Tokens
    // ============================================================

    #[test]
    fn tokens_roundtrip_their_claims(
        user_id in 1i64..1_000_000,
        username in "[A-Za-z0-9_]{3,20}",
        session in "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        now in 1_600_000_000i64..2_000_000_000
    ) {
        let token = generate_access_token(user_id, &username, &session, now, SECRET).unwrap();
        let claims = validate_access_token(&token, SECRET, now).unwrap();
        prop_assert_eq!(claims.sub, user_id);
        prop_assert_eq!(claims.username, username);
        prop_assert_eq!(claims.sid, session);
    }

    #[test]
    fn tokens_do_not_validate_under_another_secret(other in "[a-z]{8,32}") {
        prop_assume!(other != SECRET);
        let token = generate_access_token(1, "ann", "s", 1_700_000_000, SECRET).unwrap();
        prop_assert!(validate_access_token(&token, &other, 1_700_000_000).is_err());
    }

    #[test]
    fn bearer_prefix_is_required(token in "[A-Za-z0-9._-]{1,64}") {
        let header = format!("Bearer {}", token);
        prop_assert_eq!(extract_bearer_token(Some(header.as_str())), Some(token.clone()));
        prop_assert_eq!(extract_bearer_token(Some(token.as_str())), None);
    }

    // ============================================================
    // Report Filenames
    // ============================================================

    #[test]
    fn report_filenames_are_header_safe(name in "\\PC{0,40}") {
        let filename = report_filename(&name);
        prop_assert!(filename.ends_with("-report.json"));
        prop_assert!(filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')));
    }
}
