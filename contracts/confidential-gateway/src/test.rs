#![cfg(test)]

//! Unit tests for the confidential gateway.
//!
//! The coprocessor and KMS are played by two `SigningKey`s, so every proof
//! here is a real BLS12-381 Schnorr signature checked by the host.

use crate::testutils::{encode_cleartexts, handle_from_seed, SigningKey};
use crate::{
    g1_generator, is_canonical_g1, ConfidentialGateway, ConfidentialGatewayClient, GatewayError,
    ORIGIN_INPUT, ORIGIN_RANDOM,
};
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{vec, Address, Bytes, BytesN, Env, Vec};

// ════════════════════════════════════════════════════════════════════════════
//  Test Helpers
// ════════════════════════════════════════════════════════════════════════════

const COPROCESSOR_SEED: u32 = 0xC0_F0;
const KMS_SEED: u32 = 0x4B_45;

fn setup_test() -> (
    Env,
    ConfidentialGatewayClient<'static>,
    SigningKey,
    SigningKey,
    Address,
) {
    let env = Env::default();
    env.mock_all_auths();

    env.ledger().set(soroban_sdk::testutils::LedgerInfo {
        timestamp: 1_700_000_000,
        protocol_version: 25,
        sequence_number: 100,
        network_id: Default::default(),
        base_reserve: 10,
        min_temp_entry_ttl: u32::MAX / 2,
        min_persistent_entry_ttl: u32::MAX / 2,
        max_entry_ttl: u32::MAX / 2,
    });

    let coprocessor = SigningKey::from_seed(COPROCESSOR_SEED);
    let kms = SigningKey::from_seed(KMS_SEED);

    let admin = Address::generate(&env);
    let contract_id = env.register(
        ConfidentialGateway,
        (&admin, &coprocessor.public_key(&env), &kms.public_key(&env)),
    );
    let client = ConfidentialGatewayClient::new(&env, &contract_id);

    (env, client, coprocessor, kms, admin)
}

fn assert_gateway_error<T, E>(
    result: &Result<Result<T, E>, Result<GatewayError, soroban_sdk::InvokeError>>,
    expected: GatewayError,
) {
    match result {
        Err(Ok(actual)) => assert_eq!(*actual, expected),
        _ => panic!("expected contract error {:?}", expected),
    }
}

/// Register `handle` for (app, user) under `context` with a valid proof.
fn register(
    env: &Env,
    client: &ConfidentialGatewayClient,
    coprocessor: &SigningKey,
    app: &Address,
    user: &Address,
    context: u32,
    handle: &BytesN<32>,
) -> bool {
    let proof = coprocessor.sign_input(env, handle, context, app, user);
    client.register_input(app, user, &context, handle, &proof)
}

// ════════════════════════════════════════════════════════════════════════════
//  Input admission
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_register_input_valid_proof() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let user = Address::generate(&env);
    let handle = handle_from_seed(&env, 1);

    assert!(register(&env, &client, &coprocessor, &app, &user, 7, &handle));

    assert!(client.is_allowed(&handle, &app));
    assert!(client.is_allowed(&handle, &user));
    assert!(!client.is_allowed(&handle, &Address::generate(&env)));

    let record = client.get_handle(&handle).unwrap();
    assert_eq!(record.origin, ORIGIN_INPUT);
    assert_eq!(record.app, app);
    assert_eq!(record.ledger, 100);
}

#[test]
fn test_register_input_replayed_handle_rejected() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let user = Address::generate(&env);
    let handle = handle_from_seed(&env, 1);

    assert!(register(&env, &client, &coprocessor, &app, &user, 7, &handle));
    // Same tuple, same valid proof: still refused the second time.
    assert!(!register(&env, &client, &coprocessor, &app, &user, 7, &handle));
    // A fresh proof for a different context does not help either.
    assert!(!register(&env, &client, &coprocessor, &app, &user, 8, &handle));
}

#[test]
fn test_register_input_proof_bound_to_other_user_fails() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let alice = Address::generate(&env);
    let mallory = Address::generate(&env);
    let handle = handle_from_seed(&env, 2);

    let proof = coprocessor.sign_input(&env, &handle, 7, &app, &alice);
    assert!(!client.register_input(&app, &mallory, &7, &handle, &proof));
    assert!(!client.is_allowed(&handle, &mallory));
    assert!(client.get_handle(&handle).is_none());

    // The rightful owner can still submit it afterwards.
    assert!(client.register_input(&app, &alice, &7, &handle, &proof));
}

#[test]
fn test_register_input_proof_bound_to_other_context_fails() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let user = Address::generate(&env);
    let handle = handle_from_seed(&env, 3);

    let proof = coprocessor.sign_input(&env, &handle, 1, &app, &user);
    assert!(!client.register_input(&app, &user, &2, &handle, &proof));
}

#[test]
fn test_register_input_proof_bound_to_other_app_fails() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let other_app = Address::generate(&env);
    let user = Address::generate(&env);
    let handle = handle_from_seed(&env, 4);

    let proof = coprocessor.sign_input(&env, &handle, 1, &app, &user);
    assert!(!client.register_input(&other_app, &user, &1, &handle, &proof));
}

#[test]
fn test_register_input_signed_by_wrong_key_fails() {
    let (env, client, _coprocessor, kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let user = Address::generate(&env);
    let handle = handle_from_seed(&env, 5);

    let proof = kms.sign_input(&env, &handle, 1, &app, &user);
    assert!(!client.register_input(&app, &user, &1, &handle, &proof));
}

#[test]
fn test_register_input_tampered_response_fails() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let user = Address::generate(&env);
    let handle = handle_from_seed(&env, 6);

    let proof = coprocessor.sign_input(&env, &handle, 1, &app, &user);
    let mut tampered = proof.slice(0..127);
    let last = proof.get(127).unwrap_or(0);
    tampered.push_back(last ^ 0x01);

    assert!(!client.register_input(&app, &user, &1, &handle, &tampered));
}

#[test]
fn test_register_input_wrong_length_fails() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let user = Address::generate(&env);
    let handle = handle_from_seed(&env, 7);

    let proof = coprocessor.sign_input(&env, &handle, 1, &app, &user);
    assert!(!client.register_input(&app, &user, &1, &handle, &proof.slice(0..96)));
    assert!(!client.register_input(&app, &user, &1, &handle, &Bytes::new(&env)));
}

#[test]
fn test_register_input_flagged_nonce_point_rejected() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let user = Address::generate(&env);
    let handle = handle_from_seed(&env, 9);

    let proof = coprocessor.sign_input(&env, &handle, 1, &app, &user);
    let mut flagged = Bytes::from_array(&env, &[proof.get(0).unwrap_or(0) | 0x80]);
    flagged.append(&proof.slice(1..128));

    assert!(!client.register_input(&app, &user, &1, &handle, &flagged));
    assert!(client.get_handle(&handle).is_none());
}

#[test]
fn test_canonical_g1_encoding() {
    let env = Env::default();
    let generator = g1_generator(&env).to_bytes().to_array();
    assert!(is_canonical_g1(&generator));

    let mut compressed = generator;
    compressed[0] |= 0x80;
    assert!(!is_canonical_g1(&compressed));

    let mut sorted = generator;
    sorted[0] |= 0x20;
    assert!(!is_canonical_g1(&sorted));

    let mut infinity = [0u8; 96];
    infinity[0] = 0x40;
    assert!(is_canonical_g1(&infinity));
    infinity[95] = 1;
    assert!(!is_canonical_g1(&infinity));

    // x = p is out of range.
    let mut unreduced = generator;
    unreduced[..48].copy_from_slice(&[
        0x1a, 0x01, 0x11, 0xea, 0x39, 0x7f, 0xe6, 0x9a, 0x4b, 0x1b, 0xa7, 0xb6,
        0x43, 0x4b, 0xac, 0xd7, 0x64, 0x77, 0x4b, 0x84, 0xf3, 0x85, 0x12, 0xbf,
        0x67, 0x30, 0xd2, 0xa0, 0xf6, 0xb0, 0xf6, 0x24, 0x1e, 0xab, 0xff, 0xfe,
        0xb1, 0x53, 0xff, 0xff, 0xb9, 0xfe, 0xff, 0xff, 0xff, 0xff, 0xaa, 0xab,
    ]);
    assert!(!is_canonical_g1(&unreduced));
}

#[test]
fn test_register_input_off_curve_nonce_point_is_not_admitted() {
    let (env, client, _coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let user = Address::generate(&env);
    let handle = handle_from_seed(&env, 10);

    // Reduced coordinates, but not a curve point: the host refuses it.
    let garbage = Bytes::from_array(&env, &[1u8; 128]);
    assert!(client
        .try_register_input(&app, &user, &1, &handle, &garbage)
        .is_err());
    assert!(client.get_handle(&handle).is_none());
}

#[test]
fn test_register_input_zero_handle_rejected() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let user = Address::generate(&env);
    let zero = BytesN::from_array(&env, &[0u8; 32]);

    assert!(!register(&env, &client, &coprocessor, &app, &user, 1, &zero));
}

#[test]
fn test_rotated_coprocessor_key_invalidates_old_signer() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let user = Address::generate(&env);

    let rotated = SigningKey::from_seed(0x0BAD_CAFE);
    client.set_coprocessor_key(&rotated.public_key(&env));
    assert_eq!(client.get_coprocessor_key(), rotated.public_key(&env));

    let handle = handle_from_seed(&env, 8);
    assert!(!register(&env, &client, &coprocessor, &app, &user, 1, &handle));
    assert!(register(&env, &client, &rotated, &app, &user, 1, &handle));
}

// ════════════════════════════════════════════════════════════════════════════
//  Confidential random
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_generate_random_grants_app_only() {
    let (env, client, _coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);

    let handle = client.generate_random(&app, &1, &100);
    assert_ne!(handle, BytesN::from_array(&env, &[0u8; 32]));
    assert!(client.is_allowed(&handle, &app));
    assert!(!client.is_allowed(&handle, &Address::generate(&env)));

    let record = client.get_handle(&handle).unwrap();
    assert_eq!(record.origin, ORIGIN_RANDOM);
    assert_eq!(record.app, app);
}

#[test]
fn test_generate_random_handles_are_distinct() {
    let (env, client, _coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);

    let first = client.generate_random(&app, &1, &100);
    let second = client.generate_random(&app, &1, &100);
    assert_ne!(first, second);
}

#[test]
fn test_generate_random_invalid_range() {
    let (env, client, _coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);

    let result = client.try_generate_random(&app, &100, &1);
    assert_gateway_error(&result, GatewayError::InvalidRange);

    // Degenerate single-value range is allowed.
    client.generate_random(&app, &5, &5);
}

// ════════════════════════════════════════════════════════════════════════════
//  Access control
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_allow_shares_held_handle() {
    let (env, client, _coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let viewer = Address::generate(&env);

    let handle = client.generate_random(&app, &1, &100);
    assert!(!client.is_allowed(&handle, &viewer));
    client.allow(&app, &handle, &viewer);
    assert!(client.is_allowed(&handle, &viewer));
}

#[test]
fn test_allow_requires_holder() {
    let (env, client, _coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let stranger = Address::generate(&env);

    let handle = client.generate_random(&app, &1, &100);
    let result = client.try_allow(&stranger, &handle, &stranger);
    assert_gateway_error(&result, GatewayError::HandleNotAllowed);

    let unknown = handle_from_seed(&env, 99);
    let result = client.try_allow(&app, &unknown, &stranger);
    assert_gateway_error(&result, GatewayError::HandleNotAllowed);
}

// ════════════════════════════════════════════════════════════════════════════
//  Decryption requests
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_request_decryption_assigns_increasing_ids() {
    let (env, client, _coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);

    let a = client.generate_random(&app, &1, &100);
    let b = client.generate_random(&app, &1, &100);

    let first = client.request_decryption(&app, &vec![&env, a.clone()]);
    let second = client.request_decryption(&app, &vec![&env, a.clone(), b.clone()]);
    assert_eq!(first, 1);
    assert_eq!(second, 2);

    let request = client.get_request(&second);
    assert_eq!(request.app, app);
    assert_eq!(request.handles, vec![&env, a, b]);
    assert_eq!(request.ledger, 100);
}

#[test]
fn test_request_decryption_empty_batch() {
    let (env, client, _coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);

    let result = client.try_request_decryption(&app, &Vec::new(&env));
    assert_gateway_error(&result, GatewayError::EmptyRequest);
}

#[test]
fn test_request_decryption_requires_access_to_every_handle() {
    let (env, client, _coprocessor, _kms, _admin) = setup_test();
    let app = Address::generate(&env);
    let other_app = Address::generate(&env);

    let mine = client.generate_random(&app, &1, &100);
    let theirs = client.generate_random(&other_app, &1, &100);

    let result = client.try_request_decryption(&app, &vec![&env, mine, theirs]);
    assert_gateway_error(&result, GatewayError::HandleNotAllowed);
}

#[test]
fn test_get_request_not_found() {
    let (_env, client, _coprocessor, _kms, _admin) = setup_test();
    let result = client.try_get_request(&42);
    assert_gateway_error(&result, GatewayError::RequestNotFound);
}

// ════════════════════════════════════════════════════════════════════════════
//  Decryption verification
// ════════════════════════════════════════════════════════════════════════════

fn pending_request(
    env: &Env,
    client: &ConfidentialGatewayClient,
) -> (u64, Vec<BytesN<32>>, Bytes) {
    let app = Address::generate(env);
    let a = client.generate_random(&app, &1, &100);
    let b = client.generate_random(&app, &1, &100);
    let handles = vec![env, a, b];
    let request_id = client.request_decryption(&app, &handles);
    (request_id, handles, encode_cleartexts(env, &[50, 42]))
}

#[test]
fn test_verify_decryption_valid_proof() {
    let (env, client, _coprocessor, kms, _admin) = setup_test();
    let (request_id, handles, cleartexts) = pending_request(&env, &client);

    let proof = kms.sign_decryption(&env, request_id, &handles, &cleartexts);
    assert_eq!(proof.len(), 128);
    assert!(client.verify_decryption(&request_id, &handles, &cleartexts, &proof));
    // Verification is a pure check and can be repeated.
    assert!(client.verify_decryption(&request_id, &handles, &cleartexts, &proof));
}

#[test]
fn test_verify_decryption_altered_cleartexts_fail() {
    let (env, client, _coprocessor, kms, _admin) = setup_test();
    let (request_id, handles, cleartexts) = pending_request(&env, &client);

    let proof = kms.sign_decryption(&env, request_id, &handles, &cleartexts);
    let forged = encode_cleartexts(&env, &[50, 50]);
    assert!(!client.verify_decryption(&request_id, &handles, &forged, &proof));
}

#[test]
fn test_verify_decryption_other_request_id_fails() {
    let (env, client, _coprocessor, kms, _admin) = setup_test();
    let (first_id, handles, cleartexts) = pending_request(&env, &client);
    let app = Address::generate(&env);
    let h = client.generate_random(&app, &1, &100);
    let second_id = client.request_decryption(&app, &vec![&env, h]);

    let proof = kms.sign_decryption(&env, first_id, &handles, &cleartexts);
    assert!(!client.verify_decryption(&second_id, &handles, &cleartexts, &proof));
}

#[test]
fn test_verify_decryption_handle_mismatch_fails() {
    let (env, client, _coprocessor, kms, _admin) = setup_test();
    let (request_id, handles, cleartexts) = pending_request(&env, &client);

    let swapped = vec![
        &env,
        handles.get(1).unwrap(),
        handles.get(0).unwrap(),
    ];
    // Even a genuine KMS signature over the swapped batch is refused.
    let proof = kms.sign_decryption(&env, request_id, &swapped, &cleartexts);
    assert!(!client.verify_decryption(&request_id, &swapped, &cleartexts, &proof));
}

#[test]
fn test_verify_decryption_unknown_request_fails() {
    let (env, client, _coprocessor, kms, _admin) = setup_test();
    let handles = vec![&env, handle_from_seed(&env, 1)];
    let cleartexts = encode_cleartexts(&env, &[1]);

    let proof = kms.sign_decryption(&env, 77, &handles, &cleartexts);
    assert!(!client.verify_decryption(&77, &handles, &cleartexts, &proof));
}

#[test]
fn test_verify_decryption_coprocessor_signature_fails() {
    let (env, client, coprocessor, _kms, _admin) = setup_test();
    let (request_id, handles, cleartexts) = pending_request(&env, &client);

    let proof = coprocessor.sign_decryption(&env, request_id, &handles, &cleartexts);
    assert!(!client.verify_decryption(&request_id, &handles, &cleartexts, &proof));
}

// ════════════════════════════════════════════════════════════════════════════
//  Admin
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_admin_and_key_rotation() {
    let (env, client, _coprocessor, kms, admin) = setup_test();
    assert_eq!(client.get_admin(), admin);
    assert_eq!(client.get_kms_key(), kms.public_key(&env));

    let new_admin = Address::generate(&env);
    client.set_admin(&new_admin);
    assert_eq!(client.get_admin(), new_admin);

    let (request_id, handles, cleartexts) = pending_request(&env, &client);
    let rotated = SigningKey::from_seed(0x5EED);
    client.set_kms_key(&rotated.public_key(&env));

    let stale = kms.sign_decryption(&env, request_id, &handles, &cleartexts);
    let fresh = rotated.sign_decryption(&env, request_id, &handles, &cleartexts);
    assert!(!client.verify_decryption(&request_id, &handles, &cleartexts, &stale));
    assert!(client.verify_decryption(&request_id, &handles, &cleartexts, &fresh));
}
