//! Off-ledger signer for tests: stands in for the coprocessor and the KMS.

use crate::{decryption_digest, g1_generator, input_digest, schnorr_challenge};
use soroban_sdk::crypto::bls12_381::Fr;
use soroban_sdk::{Address, Bytes, BytesN, Env, Vec};

pub struct SigningKey {
    secret: [u8; 32],
}

impl SigningKey {
    /// Deterministic key from a non-zero seed.
    pub fn from_seed(seed: u32) -> Self {
        let mut secret = [0u8; 32];
        secret[28..].copy_from_slice(&seed.max(1).to_be_bytes());
        secret[0] = 0x0c;
        Self { secret }
    }

    fn secret_fr(&self, env: &Env) -> Fr {
        Fr::from_bytes(BytesN::from_array(env, &self.secret))
    }

    pub fn public_key(&self, env: &Env) -> BytesN<96> {
        let bls = env.crypto().bls12_381();
        bls.g1_mul(&g1_generator(env), &self.secret_fr(env)).to_bytes()
    }

    /// `R(96) || z(32)` over `digest`, with a nonce derived from the secret.
    pub fn sign(&self, env: &Env, digest: &BytesN<32>) -> Bytes {
        let bls = env.crypto().bls12_381();
        let g = g1_generator(env);
        let sk = self.secret_fr(env);

        let mut nonce_preimage = Bytes::from_array(env, &self.secret);
        nonce_preimage.append(&Bytes::from_array(env, &digest.to_array()));
        let mut k_bytes = env.crypto().keccak256(&nonce_preimage).to_array();
        // keep the nonce below the group order
        k_bytes[0] &= 0x3f;
        let k = Fr::from_bytes(BytesN::from_array(env, &k_bytes));

        let r_point = bls.g1_mul(&g, &k);
        let pk_point = bls.g1_mul(&g, &sk);
        let e = schnorr_challenge(env, &r_point, &pk_point, digest);
        let z = bls.fr_add(&k, &bls.fr_mul(&e, &sk));

        let mut signature = Bytes::from_array(env, &r_point.to_bytes().to_array());
        signature.append(&Bytes::from_array(env, &z.to_bytes().to_array()));
        signature
    }

    pub fn sign_input(
        &self,
        env: &Env,
        handle: &BytesN<32>,
        context: u32,
        app: &Address,
        user: &Address,
    ) -> Bytes {
        self.sign(env, &input_digest(env, handle, context, app, user))
    }

    pub fn sign_decryption(
        &self,
        env: &Env,
        request_id: u64,
        handles: &Vec<BytesN<32>>,
        cleartexts: &Bytes,
    ) -> Bytes {
        self.sign(
            env,
            &decryption_digest(env, request_id, handles, cleartexts),
        )
    }
}

/// Cleartexts as the KMS returns them: one big-endian `u32` per handle.
pub fn encode_cleartexts(env: &Env, values: &[u32]) -> Bytes {
    let mut out = Bytes::new(env);
    for value in values {
        out.append(&Bytes::from_array(env, &value.to_be_bytes()));
    }
    out
}

/// A distinct ciphertext handle, as a client-side encryptor would produce.
pub fn handle_from_seed(env: &Env, seed: u32) -> BytesN<32> {
    let mut preimage = Bytes::from_array(env, b"ciphertext");
    preimage.append(&Bytes::from_array(env, &seed.to_be_bytes()));
    env.crypto().keccak256(&preimage).into()
}
