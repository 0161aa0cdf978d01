use sha2::{Digest, Sha256};
use uuid::Uuid;

const PREFIX: &str = "TKZ";
// Hex characters of the digest kept in the code.
const DIGEST_CHARS: usize = 16;

/// Generates the ticket code printed on an order's QR code, e.g.
/// `TKZ-3F9A0C21D4E7B615`. The digest mixes a random UUID with the order's
/// owner and schedule, so two codes never depend on caller input alone.
pub fn generate_ticket_code(user_id: i32, schedule_id: i32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(user_id.to_be_bytes());
    hasher.update(schedule_id.to_be_bytes());
    let digest = hasher.finalize();

    let mut code = String::with_capacity(PREFIX.len() + 1 + DIGEST_CHARS);
    code.push_str(PREFIX);
    code.push('-');
    for byte in digest.iter().take(DIGEST_CHARS / 2) {
        code.push_str(&format!("{:02X}", byte));
    }
    code
}
