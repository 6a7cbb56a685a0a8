use rand::Rng;
use shared::domain::ReferenceCode;

pub const REFERENCE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const REFERENCE_LEN: usize = 8;

/// Human-readable tracking token. Not suitable as a secret.
pub fn generate_reference_code() -> ReferenceCode {
    generate_reference_code_with(&mut rand::thread_rng())
}

pub fn generate_reference_code_with<R: Rng + ?Sized>(rng: &mut R) -> ReferenceCode {
    let code: String = (0..REFERENCE_LEN)
        .map(|_| char::from(REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())]))
        .collect();
    ReferenceCode(code)
}

pub fn is_reference_code(candidate: &str) -> bool {
    candidate.len() == REFERENCE_LEN && candidate.bytes().all(|b| REFERENCE_ALPHABET.contains(&b))
}
