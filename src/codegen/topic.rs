//! Keccak-256 derived values: event topics and checksummed address literals.

use sha3::{Digest, Keccak256};

use crate::config::{Address, Signature, Topic};

pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Topic-0 of an event: Keccak-256 of its canonical signature.
pub fn event_topic(event: &Signature) -> Topic {
    Topic(keccak256(event.canonical().as_bytes()))
}

/// EIP-55 mixed-case form. The compiler rejects address literals whose
/// letter case does not match this checksum.
pub fn checksum_address(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_topic() {
        let sig = Signature::parse("Transfer(address,address,uint256)").unwrap();
        assert_eq!(
            event_topic(&sig).to_string(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn topic_ignores_whitespace_in_input() {
        let a = Signature::parse("Transfer(address, address, uint256)").unwrap();
        let b = Signature::parse("Transfer(address,address,uint256)").unwrap();
        assert_eq!(event_topic(&a), event_topic(&b));
    }

    #[test]
    fn eip55_checksum() {
        let addr = Address::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            checksum_address(&addr),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
        let addr = Address::parse("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        assert_eq!(
            checksum_address(&addr),
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
    }

    #[test]
    fn digit_only_address_is_unchanged() {
        let addr = Address::parse(&format!("0x{}", "11".repeat(20))).unwrap();
        assert_eq!(checksum_address(&addr), format!("0x{}", "11".repeat(20)));
    }
}
