mod delivery;
pub mod vapid;

use base64::{URL_SAFE_NO_PAD, encode_config};

pub use delivery::{RemoteDelivery, deliver_record};

/// Encodes subscription key material the way browsers report it.
pub fn encode_key(bytes: &[u8]) -> String {
    encode_config(bytes, URL_SAFE_NO_PAD)
}
