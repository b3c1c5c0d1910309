use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const CODE_LENGTH: usize = 8;

/// Derives the verification number for a registration number.
///
/// First [`CODE_LENGTH`] hex characters of HMAC-SHA256(secret, reg_no),
/// uppercased. Called at seed time only, lookups compare stored values.
pub fn derive_code(secret: &str, reg_no: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(reg_no.as_bytes());

    let digest = hex::encode(mac.finalize().into_bytes());

    digest[..CODE_LENGTH].to_uppercase()
}
