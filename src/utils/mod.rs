mod url_encode;

pub use url_encode::url_encode_bytes;
use rand::Rng;

/// A 20-byte peer id: the client prefix (cut to 20 bytes) followed by random bytes.
pub fn generate_peer_id(prefix: &str) -> [u8; 20] {
	let mut peer_id = [0u8; 20];
	let prefix = &prefix.as_bytes()[..prefix.len().min(20)];
	peer_id[..prefix.len()].copy_from_slice(prefix);

	let mut rng = rand::thread_rng();
	rng.fill(&mut peer_id[prefix.len()..]);
	peer_id
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_peer_id_keeps_prefix() {
		let id = generate_peer_id("-TM0001-");
		assert_eq!(&id[..8], b"-TM0001-");
	}

	#[test]
	fn test_peer_id_is_random() {
		assert_ne!(generate_peer_id("-TM0001-"), generate_peer_id("-TM0001-"));
	}

	#[test]
	fn test_long_prefix_is_cut() {
		let prefix = "x".repeat(30);
		assert_eq!(generate_peer_id(&prefix), [b'x'; 20]);
	}
}
