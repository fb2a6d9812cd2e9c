//! Generated tenant passwords.

use rand_core::{OsRng, RngCore};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Bytes at or above this would favour the start of the alphabet.
const ACCEPT_BELOW: usize = 256 / ALPHABET.len() * ALPHABET.len();

pub const GENERATED_LEN: usize = 8;

/// An 8-character lowercase alphanumeric password.
pub fn generate_password() -> String {
  let mut out = String::with_capacity(GENERATED_LEN);
  let mut buf = [0u8; 16];
  while out.len() < GENERATED_LEN {
    OsRng.fill_bytes(&mut buf);
    let wanted = GENERATED_LEN - out.len();
    out.extend(buf.iter().filter_map(|b| pick(*b)).take(wanted));
  }
  out
}

fn pick(byte: u8) -> Option<char> {
  let byte = byte as usize;
  (byte < ACCEPT_BELOW).then(|| ALPHABET[byte % ALPHABET.len()] as char)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shape() {
    for _ in 0..64 {
      let p = generate_password();
      assert_eq!(p.len(), GENERATED_LEN);
      assert!(p.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    }
  }

  #[test]
  fn every_character_is_equally_reachable() {
    let mut hits = [0usize; 36];
    for byte in 0..=u8::MAX {
      if let Some(c) = pick(byte) {
        let i = ALPHABET.iter().position(|a| *a as char == c).unwrap();
        hits[i] += 1;
      }
    }
    assert!(hits.iter().all(|n| *n == 7));
    assert_eq!(pick(251), Some('9'));
    assert_eq!(pick(252), None);
    assert_eq!(pick(255), None);
  }
}
