#![no_std]

//! # Confidential Gateway
//!
//! On-ledger endpoint of the confidential coprocessor and its decryption
//! oracle (KMS). Consuming contracts never see plaintext: they hold opaque
//! 32-byte ciphertext handles and ask the gateway to admit, share, randomize
//! and finally reveal them.
//!
//! | Operation            | Signed by   | Digest tag |
//! |----------------------|-------------|------------|
//! | `register_input`     | coprocessor | `CGI1`     |
//! | `verify_decryption`  | KMS         | `CGD1`     |
//!
//! ## Signatures
//!
//! Both off-ledger services sign with a Schnorr key on BLS12-381 G1:
//!
//! ```text
//! P  = sk · G                                   (public key, 96 bytes)
//! R  = k · G                                    (nonce commitment)
//! e  = keccak256(R || P || digest || "CGS1")    (Fiat-Shamir challenge)
//! z  = k + e · sk   (mod r)
//! signature = R(96) || z(32)                    = 128 bytes
//! ```
//!
//! Verification accepts iff `z·G == R + e·P`.
//!
//! ## Input binding
//!
//! ```text
//! input_digest = keccak256(handle || context_be4 || app || user || "CGI1")
//! ```
//!
//! `app` is the consuming contract instance, `user` the submitter and
//! `context` an app-defined scope (the guess game passes its game id). A
//! handle is admitted at most once, so a captured ciphertext cannot be
//! replayed into another game, another user or another contract.
//!
//! ## Decryption binding
//!
//! ```text
//! decryption_digest = keccak256(request_id_be8 || handle_0 || ... || handle_n
//!                               || cleartexts || "CGD1")
//! ```
//!
//! The handles must equal the batch recorded by `request_decryption`.

use soroban_sdk::crypto::bls12_381::{Fr, G1Affine};
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Bytes, BytesN,
    Env, Vec,
};

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

// ═══════════════════════════════════════════════════════════════════════════════
//  Error codes
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum GatewayError {
    AdminNotSet = 1,
    KeyNotSet = 2,
    HandleNotAllowed = 3,
    EmptyRequest = 4,
    RequestNotFound = 5,
    InvalidRange = 6,
}

/// Reason codes published in `EvInputRejected` and `EvVerifyFailed`.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VerifyFailure {
    ProofWrongLength = 1,
    PointNotInSubgroup = 2,
    SignatureMismatch = 3,
    HandleAlreadyRegistered = 4,
    HandleMismatch = 5,
    RequestNotFound = 6,
    ZeroHandle = 7,
    MalformedPoint = 8,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvInputRegistered {
    pub handle: BytesN<32>,
    pub app: Address,
    pub user: Address,
}

#[contractevent]
pub struct EvInputRejected {
    pub handle: BytesN<32>,
    pub reason: u32,
}

/// Picked up by the coprocessor, which derives the hidden value off-ledger.
#[contractevent]
pub struct EvRandomGenerated {
    pub handle: BytesN<32>,
    pub app: Address,
    pub min: u32,
    pub max: u32,
}

#[contractevent]
pub struct EvAccessGranted {
    pub handle: BytesN<32>,
    pub account: Address,
}

/// Picked up by the KMS relayer, which answers through the app's callback.
#[contractevent]
pub struct EvDecryptionRequested {
    pub request_id: u64,
    pub app: Address,
    pub handles: Vec<BytesN<32>>,
}

#[contractevent]
pub struct EvDecryptionVerified {
    pub request_id: u64,
}

#[contractevent]
pub struct EvVerifyFailed {
    pub request_id: u64,
    pub reason: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Records & storage keys
// ═══════════════════════════════════════════════════════════════════════════════

pub const ORIGIN_INPUT: u32 = 1;
pub const ORIGIN_RANDOM: u32 = 2;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HandleRecord {
    pub origin: u32,
    pub app: Address,
    pub ledger: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionRequest {
    pub app: Address,
    pub handles: Vec<BytesN<32>>,
    pub ledger: u32,
}

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Admin,
    CoprocessorKey,
    KmsKey,
    NextRequestId,
    RandomNonce,
    Handle(BytesN<32>),
    Acl(BytesN<32>, Address),
    Request(u64),
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

const INPUT_TAG: [u8; 4] = *b"CGI1";
const RANDOM_TAG: [u8; 4] = *b"CGR1";
const DECRYPTION_TAG: [u8; 4] = *b"CGD1";
const SIGNATURE_TAG: [u8; 4] = *b"CGS1";

/// R(96) || z(32)
pub const SIGNATURE_LEN: u32 = 128;

const LEDGER_RATE_SECS: u32 = 5;

// Handles, grants and requests live as long as the games that reference them.
const RECORD_TTL_SECONDS: u32 = 120 * 24 * 60 * 60;
const RECORD_TTL_LEDGERS: u32 = RECORD_TTL_SECONDS / LEDGER_RATE_SECS;

const INSTANCE_TTL_LEDGERS: u32 = 30 * 24 * 60 * 60 / LEDGER_RATE_SECS;

/// BLS12-381 G1 generator, uncompressed.
const G1_GENERATOR: [u8; 96] = [
    0x17, 0xf1, 0xd3, 0xa7, 0x31, 0x97, 0xd7, 0x94, 0x26, 0x95, 0x63, 0x8c,
    0x4f, 0xa9, 0xac, 0x0f, 0xc3, 0x68, 0x8c, 0x4f, 0x97, 0x74, 0xb9, 0x05,
    0xa1, 0x4e, 0x3a, 0x3f, 0x17, 0x1b, 0xac, 0x58, 0x6c, 0x55, 0xe8, 0x3f,
    0xf9, 0x7a, 0x1a, 0xef, 0xfb, 0x3a, 0xf0, 0x0a, 0xdb, 0x22, 0xc6, 0xbb,
    0x08, 0xb3, 0xf4, 0x81, 0xe3, 0xaa, 0xa0, 0xf1, 0xa0, 0x9e, 0x30, 0xed,
    0x74, 0x1d, 0x8a, 0xe4, 0xfc, 0xf5, 0xe0, 0x95, 0xd5, 0xd0, 0x0a, 0xf6,
    0x00, 0xdb, 0x18, 0xcb, 0x2c, 0x04, 0xb3, 0xed, 0xd0, 0x3c, 0xc7, 0x44,
    0xa2, 0x88, 0x8a, 0xe4, 0x0c, 0xaa, 0x23, 0x29, 0x46, 0xc5, 0xe7, 0xe1,
];

/// BLS12-381 base field modulus p, big-endian.
const FP_MODULUS: [u8; 48] = [
    0x1a, 0x01, 0x11, 0xea, 0x39, 0x7f, 0xe6, 0x9a, 0x4b, 0x1b, 0xa7, 0xb6,
    0x43, 0x4b, 0xac, 0xd7, 0x64, 0x77, 0x4b, 0x84, 0xf3, 0x85, 0x12, 0xbf,
    0x67, 0x30, 0xd2, 0xa0, 0xf6, 0xb0, 0xf6, 0x24, 0x1e, 0xab, 0xff, 0xfe,
    0xb1, 0x53, 0xff, 0xff, 0xb9, 0xfe, 0xff, 0xff, 0xff, 0xff, 0xaa, 0xab,
];

// Flag bits in the first byte of a serialized G1 point.
const FLAG_COMPRESSED: u8 = 0x80;
const FLAG_INFINITY: u8 = 0x40;
const FLAG_SORT: u8 = 0x20;

/// Uncompressed encoding with both coordinates reduced mod p, or the
/// canonical point at infinity. Says nothing about the curve equation: an
/// off-curve point still traps in the host.
pub fn is_canonical_g1(bytes: &[u8; 96]) -> bool {
    let flags = bytes[0] & (FLAG_COMPRESSED | FLAG_INFINITY | FLAG_SORT);
    if flags & (FLAG_COMPRESSED | FLAG_SORT) != 0 {
        return false;
    }
    if flags & FLAG_INFINITY != 0 {
        return bytes[0] == FLAG_INFINITY && bytes[1..].iter().all(|b| *b == 0);
    }
    bytes[..48] < FP_MODULUS[..] && bytes[48..] < FP_MODULUS[..]
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Digests (shared with off-ledger signers)
// ═══════════════════════════════════════════════════════════════════════════════

pub fn g1_generator(env: &Env) -> G1Affine {
    G1Affine::from_array(env, &G1_GENERATOR)
}

/// `keccak256(handle || context_be4 || app || user || "CGI1")`
pub fn input_digest(
    env: &Env,
    handle: &BytesN<32>,
    context: u32,
    app: &Address,
    user: &Address,
) -> BytesN<32> {
    let mut preimage = Bytes::from_array(env, &handle.to_array());
    preimage.append(&Bytes::from_array(env, &context.to_be_bytes()));
    preimage.append(&app.to_string().to_bytes());
    preimage.append(&user.to_string().to_bytes());
    preimage.append(&Bytes::from_array(env, &INPUT_TAG));
    env.crypto().keccak256(&preimage).into()
}

/// `keccak256(request_id_be8 || handles... || cleartexts || "CGD1")`
pub fn decryption_digest(
    env: &Env,
    request_id: u64,
    handles: &Vec<BytesN<32>>,
    cleartexts: &Bytes,
) -> BytesN<32> {
    let mut preimage = Bytes::from_array(env, &request_id.to_be_bytes());
    for handle in handles.iter() {
        preimage.append(&Bytes::from_array(env, &handle.to_array()));
    }
    preimage.append(cleartexts);
    preimage.append(&Bytes::from_array(env, &DECRYPTION_TAG));
    env.crypto().keccak256(&preimage).into()
}

/// `e = Fr(keccak256(R || P || digest || "CGS1"))`
pub fn schnorr_challenge(
    env: &Env,
    r_point: &G1Affine,
    public_key: &G1Affine,
    digest: &BytesN<32>,
) -> Fr {
    let mut preimage = Bytes::from_array(env, &r_point.to_bytes().to_array());
    preimage.append(&Bytes::from_array(env, &public_key.to_bytes().to_array()));
    preimage.append(&Bytes::from_array(env, &digest.to_array()));
    preimage.append(&Bytes::from_array(env, &SIGNATURE_TAG));
    let e_hash: BytesN<32> = env.crypto().keccak256(&preimage).into();
    Fr::from_bytes(e_hash)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct ConfidentialGateway;

#[contractimpl]
impl ConfidentialGateway {
    pub fn __constructor(
        env: Env,
        admin: Address,
        coprocessor_key: BytesN<96>,
        kms_key: BytesN<96>,
    ) {
        let storage = env.storage().instance();
        storage.set(&StorageKey::Admin, &admin);
        storage.set(&StorageKey::CoprocessorKey, &coprocessor_key);
        storage.set(&StorageKey::KmsKey, &kms_key);
        storage.set(&StorageKey::NextRequestId, &1u64);
        storage.set(&StorageKey::RandomNonce, &0u64);
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Confidential inputs
    // ───────────────────────────────────────────────────────────────────────────

    /// Admit a user-encrypted handle for `app`.
    ///
    /// Returns `false` (and publishes `EvInputRejected`) when the handle was
    /// seen before or the coprocessor signature does not cover exactly this
    /// `(handle, context, app, user)` tuple. On success both `app` and `user`
    /// are granted access to the handle.
    pub fn register_input(
        env: Env,
        app: Address,
        user: Address,
        context: u32,
        handle: BytesN<32>,
        proof: Bytes,
    ) -> Result<bool, GatewayError> {
        app.require_auth();

        let coprocessor_key = Self::load_coprocessor_key(&env)?;

        if handle.to_array() == [0u8; 32] {
            return Ok(Self::reject_input(&env, handle, VerifyFailure::ZeroHandle));
        }
        if env
            .storage()
            .persistent()
            .has(&StorageKey::Handle(handle.clone()))
        {
            return Ok(Self::reject_input(
                &env,
                handle,
                VerifyFailure::HandleAlreadyRegistered,
            ));
        }

        let digest = input_digest(&env, &handle, context, &app, &user);
        if let Err(reason) = Self::verify_schnorr(&env, &coprocessor_key, &digest, &proof) {
            return Ok(Self::reject_input(&env, handle, reason));
        }

        Self::write_handle(&env, &handle, ORIGIN_INPUT, &app);
        Self::grant(&env, &handle, &app);
        Self::grant(&env, &handle, &user);

        EvInputRegistered { handle, app, user }.publish(&env);
        Ok(true)
    }

    /// Draw a fresh confidential value in `[min, max]` for `app`.
    ///
    /// Only the handle is produced on-ledger. The coprocessor derives the
    /// hidden value from it and the KMS is the only party able to reveal it.
    pub fn generate_random(
        env: Env,
        app: Address,
        min: u32,
        max: u32,
    ) -> Result<BytesN<32>, GatewayError> {
        app.require_auth();
        if min > max {
            return Err(GatewayError::InvalidRange);
        }

        let nonce: u64 = env
            .storage()
            .instance()
            .get(&StorageKey::RandomNonce)
            .unwrap_or(0)
            + 1;
        env.storage().instance().set(&StorageKey::RandomNonce, &nonce);

        let mut preimage = app.to_string().to_bytes();
        preimage.append(&Bytes::from_array(&env, &nonce.to_be_bytes()));
        preimage.append(&Bytes::from_array(
            &env,
            &env.prng().gen_range::<u64>(0..=u64::MAX).to_be_bytes(),
        ));
        preimage.append(&Bytes::from_array(
            &env,
            &env.prng().gen_range::<u64>(0..=u64::MAX).to_be_bytes(),
        ));
        preimage.append(&Bytes::from_array(&env, &min.to_be_bytes()));
        preimage.append(&Bytes::from_array(&env, &max.to_be_bytes()));
        preimage.append(&Bytes::from_array(&env, &RANDOM_TAG));
        let handle: BytesN<32> = env.crypto().keccak256(&preimage).into();

        Self::write_handle(&env, &handle, ORIGIN_RANDOM, &app);
        Self::grant(&env, &handle, &app);
        Self::bump_instance(&env);

        EvRandomGenerated {
            handle: handle.clone(),
            app,
            min,
            max,
        }
        .publish(&env);
        Ok(handle)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Access control
    // ───────────────────────────────────────────────────────────────────────────

    /// Share a handle `app` already holds with `account`.
    pub fn allow(
        env: Env,
        app: Address,
        handle: BytesN<32>,
        account: Address,
    ) -> Result<(), GatewayError> {
        app.require_auth();
        if !Self::has_access(&env, &handle, &app) {
            return Err(GatewayError::HandleNotAllowed);
        }
        Self::grant(&env, &handle, &account);
        Ok(())
    }

    pub fn is_allowed(env: Env, handle: BytesN<32>, account: Address) -> bool {
        Self::has_access(&env, &handle, &account)
    }

    pub fn get_handle(env: Env, handle: BytesN<32>) -> Option<HandleRecord> {
        env.storage().persistent().get(&StorageKey::Handle(handle))
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Decryption oracle
    // ───────────────────────────────────────────────────────────────────────────

    /// Queue a batched public decryption. Returns immediately with the
    /// request id; the KMS answers later through the app's own callback.
    pub fn request_decryption(
        env: Env,
        app: Address,
        handles: Vec<BytesN<32>>,
    ) -> Result<u64, GatewayError> {
        app.require_auth();
        if handles.is_empty() {
            return Err(GatewayError::EmptyRequest);
        }
        for handle in handles.iter() {
            if !Self::has_access(&env, &handle, &app) {
                return Err(GatewayError::HandleNotAllowed);
            }
        }

        let request_id: u64 = env
            .storage()
            .instance()
            .get(&StorageKey::NextRequestId)
            .unwrap_or(1);
        env.storage()
            .instance()
            .set(&StorageKey::NextRequestId, &(request_id + 1));

        let key = StorageKey::Request(request_id);
        env.storage().persistent().set(
            &key,
            &DecryptionRequest {
                app: app.clone(),
                handles: handles.clone(),
                ledger: env.ledger().sequence(),
            },
        );
        env.storage()
            .persistent()
            .extend_ttl(&key, RECORD_TTL_LEDGERS, RECORD_TTL_LEDGERS);
        Self::bump_instance(&env);

        EvDecryptionRequested {
            request_id,
            app,
            handles,
        }
        .publish(&env);
        Ok(request_id)
    }

    /// Check a KMS answer for `request_id`.
    ///
    /// `handles` must equal the recorded batch and `proof` must be the KMS
    /// signature over the decryption digest of `(request_id, handles,
    /// cleartexts)`. The caller's identity plays no part.
    pub fn verify_decryption(
        env: Env,
        request_id: u64,
        handles: Vec<BytesN<32>>,
        cleartexts: Bytes,
        proof: Bytes,
    ) -> Result<bool, GatewayError> {
        let kms_key = Self::load_kms_key(&env)?;

        let request: DecryptionRequest = match env
            .storage()
            .persistent()
            .get(&StorageKey::Request(request_id))
        {
            Some(request) => request,
            None => {
                return Ok(Self::reject_decryption(
                    &env,
                    request_id,
                    VerifyFailure::RequestNotFound,
                ))
            }
        };
        if request.handles != handles {
            return Ok(Self::reject_decryption(
                &env,
                request_id,
                VerifyFailure::HandleMismatch,
            ));
        }

        let digest = decryption_digest(&env, request_id, &handles, &cleartexts);
        if let Err(reason) = Self::verify_schnorr(&env, &kms_key, &digest, &proof) {
            return Ok(Self::reject_decryption(&env, request_id, reason));
        }

        EvDecryptionVerified { request_id }.publish(&env);
        Ok(true)
    }

    pub fn get_request(env: Env, request_id: u64) -> Result<DecryptionRequest, GatewayError> {
        env.storage()
            .persistent()
            .get(&StorageKey::Request(request_id))
            .ok_or(GatewayError::RequestNotFound)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Admin
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_admin(env: Env) -> Result<Address, GatewayError> {
        Self::load_admin(&env)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), GatewayError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage().instance().set(&StorageKey::Admin, &new_admin);
        Ok(())
    }

    pub fn get_coprocessor_key(env: Env) -> Result<BytesN<96>, GatewayError> {
        Self::load_coprocessor_key(&env)
    }

    pub fn set_coprocessor_key(env: Env, key: BytesN<96>) -> Result<(), GatewayError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage().instance().set(&StorageKey::CoprocessorKey, &key);
        Ok(())
    }

    pub fn get_kms_key(env: Env) -> Result<BytesN<96>, GatewayError> {
        Self::load_kms_key(&env)
    }

    pub fn set_kms_key(env: Env, key: BytesN<96>) -> Result<(), GatewayError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage().instance().set(&StorageKey::KmsKey, &key);
        Ok(())
    }

    pub fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), GatewayError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.deployer().update_current_contract_wasm(new_wasm_hash);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Schnorr verification (BLS12-381 G1)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Accept iff `z·G == R + e·P` for `signature = R(96) || z(32)`.
    ///
    /// A canonically encoded but off-curve `R` traps in the host; consuming
    /// contracts call the gateway through `try_*` and treat that as rejection.
    fn verify_schnorr(
        env: &Env,
        public_key: &BytesN<96>,
        digest: &BytesN<32>,
        signature: &Bytes,
    ) -> Result<(), VerifyFailure> {
        if signature.len() != SIGNATURE_LEN {
            return Err(VerifyFailure::ProofWrongLength);
        }

        let pk_bytes = public_key.to_array();
        let r_bytes = Self::extract_g1(signature, 0);
        if !is_canonical_g1(&pk_bytes) || !is_canonical_g1(&r_bytes) {
            return Err(VerifyFailure::MalformedPoint);
        }

        let bls = env.crypto().bls12_381();

        let pk_point = G1Affine::from_array(env, &pk_bytes);
        let r_point = G1Affine::from_array(env, &r_bytes);
        let z = Self::extract_fr(env, signature, 96);

        if !bls.g1_is_in_subgroup(&pk_point) || !bls.g1_is_in_subgroup(&r_point) {
            return Err(VerifyFailure::PointNotInSubgroup);
        }

        let e = schnorr_challenge(env, &r_point, &pk_point, digest);

        let lhs = bls.g1_mul(&g1_generator(env), &z);
        let e_times_pk = bls.g1_mul(&pk_point, &e);
        let rhs = bls.g1_add(&r_point, &e_times_pk);

        if lhs.to_bytes() != rhs.to_bytes() {
            return Err(VerifyFailure::SignatureMismatch);
        }
        Ok(())
    }

    fn extract_g1(data: &Bytes, offset: u32) -> [u8; 96] {
        let mut arr = [0u8; 96];
        for (i, byte) in arr.iter_mut().enumerate() {
            *byte = data.get(offset + i as u32).unwrap_or(0);
        }
        arr
    }

    fn extract_fr(env: &Env, data: &Bytes, offset: u32) -> Fr {
        let mut arr = [0u8; 32];
        for (i, byte) in arr.iter_mut().enumerate() {
            *byte = data.get(offset + i as u32).unwrap_or(0);
        }
        Fr::from_bytes(BytesN::<32>::from_array(env, &arr))
    }

    fn reject_input(env: &Env, handle: BytesN<32>, reason: VerifyFailure) -> bool {
        EvInputRejected {
            handle,
            reason: reason as u32,
        }
        .publish(env);
        false
    }

    fn reject_decryption(env: &Env, request_id: u64, reason: VerifyFailure) -> bool {
        EvVerifyFailed {
            request_id,
            reason: reason as u32,
        }
        .publish(env);
        false
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Storage
    // ═══════════════════════════════════════════════════════════════════════════

    fn has_access(env: &Env, handle: &BytesN<32>, account: &Address) -> bool {
        env.storage()
            .persistent()
            .get(&StorageKey::Acl(handle.clone(), account.clone()))
            .unwrap_or(false)
    }

    fn grant(env: &Env, handle: &BytesN<32>, account: &Address) {
        let key = StorageKey::Acl(handle.clone(), account.clone());
        env.storage().persistent().set(&key, &true);
        env.storage()
            .persistent()
            .extend_ttl(&key, RECORD_TTL_LEDGERS, RECORD_TTL_LEDGERS);

        EvAccessGranted {
            handle: handle.clone(),
            account: account.clone(),
        }
        .publish(env);
    }

    fn write_handle(env: &Env, handle: &BytesN<32>, origin: u32, app: &Address) {
        let key = StorageKey::Handle(handle.clone());
        env.storage().persistent().set(
            &key,
            &HandleRecord {
                origin,
                app: app.clone(),
                ledger: env.ledger().sequence(),
            },
        );
        env.storage()
            .persistent()
            .extend_ttl(&key, RECORD_TTL_LEDGERS, RECORD_TTL_LEDGERS);
    }

    fn bump_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_LEDGERS, INSTANCE_TTL_LEDGERS);
    }

    fn load_admin(env: &Env) -> Result<Address, GatewayError> {
        env.storage()
            .instance()
            .get(&StorageKey::Admin)
            .ok_or(GatewayError::AdminNotSet)
    }

    fn load_coprocessor_key(env: &Env) -> Result<BytesN<96>, GatewayError> {
        env.storage()
            .instance()
            .get(&StorageKey::CoprocessorKey)
            .ok_or(GatewayError::KeyNotSet)
    }

    fn load_kms_key(env: &Env) -> Result<BytesN<96>, GatewayError> {
        env.storage()
            .instance()
            .get(&StorageKey::KmsKey)
            .ok_or(GatewayError::KeyNotSet)
    }
}

#[cfg(test)]
mod test;
