//! Public signing key handling
//!
//! Operators configure the GPG public keys used to sign release checksum
//! manifests as a serialised JSON document of armored keys. Package responses
//! carry each key along with its hexadecimal key ID so that clients can match
//! the key against the issuer of a checksum signature.

use crate::core::error::{RegistryError, RegistryResult};
use crate::core::types::{PublicSigningKey, PublicSigningKeys, SigningKeyInput, SigningKeysInput};
use pgp::types::KeyTrait;
use pgp::{Deserializable, SignedPublicKey};

/// Extract the key ID from an ASCII armored OpenPGP public key block and
/// return it as an uppercase hexadecimal string.
pub fn extract_hex_key_id(armored_public_key: &str) -> RegistryResult<String> {
    let (key, _headers) = SignedPublicKey::from_string(armored_public_key)
        .map_err(|e| RegistryError::InvalidKey(e.to_string()))?;

    Ok(hex::encode_upper(key.key_id()))
}

/// Parse the serialised signing keys document and derive the key ID for every
/// key, preserving input order.
///
/// Fails if no document is provided, if it lists no keys, or if any single key
/// cannot be parsed; a partial key set is never returned.
pub fn prepare_signing_keys(serialised: Option<&str>) -> RegistryResult<PublicSigningKeys> {
    let serialised = match serialised.map(str::trim) {
        Some(serialised) if !serialised.is_empty() => serialised,
        _ => return Err(RegistryError::MissingSigningKeys),
    };

    let input: SigningKeysInput = serde_json::from_str(serialised)?;
    if input.keys.is_empty() {
        return Err(RegistryError::MissingSigningKeys);
    }

    let gpg = input
        .keys
        .into_iter()
        .map(|key| {
            let key_id = extract_hex_key_id(&key.public_key)?;
            Ok(PublicSigningKey {
                key_id,
                public_key: key.public_key,
            })
        })
        .collect::<RegistryResult<Vec<_>>>()?;

    Ok(PublicSigningKeys { gpg })
}

/// Serialise armored public keys into the document format read by
/// [`prepare_signing_keys`].
pub fn build_signing_keys_document(public_keys: Vec<String>) -> RegistryResult<String> {
    let input = SigningKeysInput {
        keys: public_keys
            .into_iter()
            .map(|public_key| SigningKeyInput { public_key })
            .collect(),
    };

    Ok(serde_json::to_string(&input)?)
}
