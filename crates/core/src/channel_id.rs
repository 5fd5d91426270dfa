use nanoid::nanoid;

pub const CHANNEL_ID_LENGTH: usize = 8;

pub const CHANNEL_ID_ALPHABET: [char; 62] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l',
    'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4',
    '5', '6', '7', '8', '9',
];

/// How many fresh ids registration tries before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 8;

pub fn new_channel_id() -> String {
    nanoid!(CHANNEL_ID_LENGTH, &CHANNEL_ID_ALPHABET)
}

/// True when `candidate` has the channel id length and only alphabet characters.
pub fn validate_id(candidate: &str) -> bool {
    candidate.len() == CHANNEL_ID_LENGTH
        && candidate.chars().all(|c| CHANNEL_ID_ALPHABET.contains(&c))
}
