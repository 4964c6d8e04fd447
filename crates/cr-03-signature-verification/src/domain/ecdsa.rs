//! # ECDSA Verification (secp256k1)
//!
//! Recovers the signer of a prehashed message and rejects the non-canonical
//! encodings that would let one authorization be replayed in a second form.
//! Scalar comparisons go through `subtle`.

use super::entities::EcdsaSignature;
use super::errors::SignatureError;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use shared_types::{keccak256, Address, Hash};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// secp256k1 group order `n`.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// `n / 2`, the EIP-2 upper bound for `s` (exclusive).
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

// =============================================================================
// SIGNER RECOVERY
// =============================================================================

/// Recover the signer of `digest`, rejecting non-canonical signatures.
///
/// Checks run in order: `r` and `s` in `[1, n-1]`, `s` in the lower half of
/// the order (EIP-2), recovery id, public key recovery.
///
/// # Errors
///
/// `InvalidFormat`, `MalleableSignature`, `InvalidRecoveryId` or
/// `RecoveryFailed`.
pub fn recover_signer(digest: &Hash, signature: &EcdsaSignature) -> Result<Address, SignatureError> {
    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }
    recover_address(digest, signature)
}

/// [`recover_signer`], then require the signer to be `expected`.
///
/// # Errors
///
/// Any [`recover_signer`] error, or `SignerMismatch`.
pub fn check_signer(
    digest: &Hash,
    signature: &EcdsaSignature,
    expected: Address,
) -> Result<Address, SignatureError> {
    let actual = recover_signer(digest, signature)?;
    if actual != expected {
        return Err(SignatureError::SignerMismatch { expected, actual });
    }
    Ok(actual)
}

/// Public key recovery without the canonical-form checks.
///
/// # Errors
///
/// `InvalidRecoveryId`, `InvalidFormat` or `RecoveryFailed`.
pub fn recover_address(digest: &Hash, signature: &EcdsaSignature) -> Result<Address, SignatureError> {
    let recovery_id = parse_recovery_id(signature.v)?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&signature.r);
    compact[32..].copy_from_slice(&signature.s);
    let parsed = Signature::from_slice(&compact);
    compact.zeroize();

    let sig = parsed.map_err(|_| SignatureError::InvalidFormat)?;
    VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map(|key| address_from_pubkey(&key))
        .map_err(|_| SignatureError::RecoveryFailed)
}

/// Address of a secp256k1 key: the last 20 bytes of the Keccak-256 of the
/// uncompressed point without its `0x04` tag.
#[must_use]
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let point = public_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address::new(address)
}

// =============================================================================
// SCALAR CHECKS (constant time)
// =============================================================================

/// `value < bound` as big-endian 256-bit integers, without early exit.
fn ct_less_than(value: &[u8; 32], bound: &[u8; 32]) -> Choice {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);
    for (v, b) in value.iter().zip(bound) {
        let undecided = !(less | greater);
        less |= undecided & Choice::from(u8::from(v < b));
        greater |= undecided & Choice::from(u8::from(v > b));
    }
    less
}

/// `s < n/2`, strictly.
fn is_low_s(s: &[u8; 32]) -> bool {
    ct_less_than(s, &SECP256K1_HALF_ORDER).into()
}

/// `0 < scalar < n`.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let is_zero = scalar
        .iter()
        .fold(Choice::from(1u8), |acc, byte| acc & byte.ct_eq(&0u8));
    (!is_zero & ct_less_than(scalar, &SECP256K1_ORDER)).into()
}

/// Accepts both raw (0, 1) and Ethereum-offset (27, 28) recovery ids.
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };
    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

/// `n - s`, the other valid `s` for the same `r`.
#[must_use]
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let diff = i16::from(SECP256K1_ORDER[i]) - i16::from(s[i]) - borrow;
        borrow = i16::from(diff < 0);
        out[i] = (diff + 256 * borrow) as u8;
    }
    out
}

// =============================================================================
// TEST HELPERS
// =============================================================================

/// Key generation and signing for tests.
///
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers {
    use super::*;
    use crate::authorization::policy_digest;
    use crate::domain::entities::SIGNATURE_LENGTH;
    use k256::ecdsa::SigningKey;

    /// Generate a new ECDSA keypair.
    pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = *signing_key.verifying_key();
        (signing_key, verifying_key)
    }

    /// Sign a message hash with a private key, normalized to low S.
    pub fn sign(message_hash: &Hash, private_key: &SigningKey) -> EcdsaSignature {
        let (sig, recid) = private_key
            .sign_prehash_recoverable(message_hash)
            .expect("signing failed");

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        let s_normalized = if is_low_s(&s) { s } else { invert_s(&s) };

        // Flipping S flips the recovery id
        let v = if s_normalized == s {
            recid.to_byte() + 27
        } else if recid.to_byte() == 0 {
            28
        } else {
            27
        };

        EcdsaSignature {
            r,
            s: s_normalized,
            v,
        }
    }

    /// Address a proposer holding `key` is identified by.
    pub fn proposer_address(key: &SigningKey) -> Address {
        address_from_pubkey(key.verifying_key())
    }

    /// 65-byte authorization of `policy_module` by `key`.
    pub fn sign_policy(policy_module: &[u8], key: &SigningKey) -> [u8; SIGNATURE_LENGTH] {
        sign(&policy_digest(policy_module), key).to_bytes()
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
