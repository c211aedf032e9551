use base64::{URL_SAFE_NO_PAD, decode_config};
use thiserror::Error;

/// Uncompressed P-256 point: 0x04 followed by X and Y.
pub const APPLICATION_SERVER_KEY_LEN: usize = 65;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VapidKeyError {
    #[error("no VAPID public key configured")]
    Missing,
    #[error("VAPID public key is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("VAPID public key must be 65 bytes, got {0}")]
    Length(usize),
    #[error("VAPID public key is not an uncompressed P-256 point")]
    Point,
}

/// Decodes a VAPID public key into the bytes handed to `subscribe`.
/// Accepts both the URL-safe and the standard alphabet, padded or not.
pub fn decode_application_server_key(key: &str) -> Result<Vec<u8>, VapidKeyError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(VapidKeyError::Missing);
    }
    let normalized: String = key
        .trim_end_matches('=')
        .chars()
        .map(|ch| match ch {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = decode_config(normalized, URL_SAFE_NO_PAD)?;
    if bytes.len() != APPLICATION_SERVER_KEY_LEN {
        return Err(VapidKeyError::Length(bytes.len()));
    }
    if bytes[0] != 0x04 {
        return Err(VapidKeyError::Point);
    }
    Ok(bytes)
}

#[cfg(not(target_arch = "wasm32"))]
pub use generate::{VapidCredentials, generate_vapid_credentials};

#[cfg(not(target_arch = "wasm32"))]
mod generate {
    use base64::{URL_SAFE_NO_PAD, encode_config};
    use jwt_simple::prelude::ES256KeyPair;
    use rand::rngs::OsRng;
    use rand::{CryptoRng, RngCore};

    /// Key pair for the push sender. The public half goes into the page
    /// configuration, the private half stays with whoever sends pushes.
    #[derive(Debug, Clone)]
    pub struct VapidCredentials {
        pub private_key: String,
        pub public_key: String,
    }

    pub fn generate_vapid_credentials() -> Result<VapidCredentials, web_push::WebPushError> {
        let mut rng = OsRng;
        generate_vapid_credentials_with_rng(&mut rng)
    }

    pub(crate) fn generate_vapid_credentials_with_rng<R: RngCore + CryptoRng>(
        rng: &mut R,
    ) -> Result<VapidCredentials, web_push::WebPushError> {
        let key_pair = generate_es256_keypair_with_rng(rng);
        let private_key = encode_config(key_pair.to_bytes(), URL_SAFE_NO_PAD);
        let public_key =
            web_push::VapidSignatureBuilder::from_base64_no_sub(&private_key, URL_SAFE_NO_PAD)?
                .get_public_key();

        Ok(VapidCredentials {
            private_key,
            public_key: encode_config(public_key, URL_SAFE_NO_PAD),
        })
    }

    fn generate_es256_keypair_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> ES256KeyPair {
        let mut key_bytes = [0u8; 32];
        loop {
            rng.fill_bytes(&mut key_bytes);
            if let Ok(key_pair) = ES256KeyPair::from_bytes(&key_bytes) {
                return key_pair;
            }
        }
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::generate::generate_vapid_credentials_with_rng;
    use super::*;
    use crate::ports::fakes::SAMPLE_VAPID_PUBLIC_KEY;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generate_vapid_credentials_with_rng__should_return_expected_fixture() {
        // Given
        let mut rng = StdRng::from_seed([7u8; 32]);

        // When
        let credentials =
            generate_vapid_credentials_with_rng(&mut rng).expect("credentials should generate");

        // Then
        assert_eq!(
            credentials.private_key,
            "9pKJeIXAyyCj5M0QagsVvDYHlPF-cymJCbB5iHPsdEE"
        );
        assert_eq!(credentials.public_key, SAMPLE_VAPID_PUBLIC_KEY);
    }

    #[test]
    fn decode_application_server_key__should_accept_generated_keys() {
        // Given
        let mut rng = StdRng::from_seed([42u8; 32]);
        let credentials = generate_vapid_credentials_with_rng(&mut rng).expect("generate");

        // When
        let bytes = decode_application_server_key(&credentials.public_key).expect("decode");

        // Then
        assert_eq!(bytes.len(), APPLICATION_SERVER_KEY_LEN);
        assert_eq!(bytes[0], 0x04);
    }

    #[test]
    fn decode_application_server_key__should_accept_standard_alphabet_with_padding() {
        // Given
        let standard = format!("{}=", SAMPLE_VAPID_PUBLIC_KEY.replace('-', "+").replace('_', "/"));

        // When
        let bytes = decode_application_server_key(&standard).expect("decode");

        // Then
        assert_eq!(
            bytes,
            decode_application_server_key(SAMPLE_VAPID_PUBLIC_KEY).expect("decode")
        );
    }

    #[test]
    fn decode_application_server_key__should_reject_bad_keys() {
        // Then
        assert_eq!(
            decode_application_server_key("  "),
            Err(VapidKeyError::Missing)
        );
        assert!(matches!(
            decode_application_server_key("not base64!"),
            Err(VapidKeyError::Encoding(_))
        ));
        assert_eq!(
            decode_application_server_key("AAAA"),
            Err(VapidKeyError::Length(3))
        );
        let wrong_prefix = base64::encode_config([0x02u8; 65], URL_SAFE_NO_PAD);
        assert_eq!(
            decode_application_server_key(&wrong_prefix),
            Err(VapidKeyError::Point)
        );
    }
}
