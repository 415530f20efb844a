use huddle_core::{RoomId, RoomKind};
use rand::Rng;

pub const ROOM_TOKEN_LEN: usize = 9;
const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_EXPLICIT_ID_LEN: usize = 64;

/// Fresh id of the form `TAG-XXXXXXXXX`. Uniqueness is enforced by the registry.
pub fn generate_room_id(kind: RoomKind) -> RoomId {
    let mut rng = rand::thread_rng();
    let token: String = (0..ROOM_TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect();
    RoomId::compose(kind, &token)
}

/// Caller-supplied ids must be short, printable and free of separators other than `-`.
pub fn is_valid_room_id(id: &RoomId) -> bool {
    let id = id.as_str();
    !id.is_empty()
        && id.len() <= MAX_EXPLICIT_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
