use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};

const TOKEN_BYTES: usize = 32;

/// Create a session token returned on successful login.
///
/// Tokens are not persisted; 32 bytes from the OS RNG, base64url encoded.
pub fn generate() -> Result<String, rand::Error> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}
