// lib.rs - Library interface for the tormeta CLI

pub mod bencode;
pub mod config;
pub mod torrent;
pub mod tracker;
pub mod utils;

// Re-export commonly used types for easier testing
pub use bencode::{bvalue_to_json, decode, decode_bencode, encode_bvalue, BValue, DecodeError, ErrorKind};
pub use config::Config;
pub use torrent::{FileEntry, Layout, MetainfoError, Torrent};
pub use tracker::{TrackerError, TrackerQuery, TrackerResponse};
pub use utils::{generate_peer_id, url_encode_bytes};

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_to_json(input: &str) -> Result<serde_json::Value, DecodeError> {
        decode(input.as_bytes()).map(|value| bvalue_to_json(&value))
    }

    #[test]
    fn test_decode_simple_bencode() {
        // Test simple integer
        assert_eq!(decode_to_json("i42e").unwrap(), serde_json::json!(42));

        // Test simple string
        assert_eq!(decode_to_json("4:test").unwrap(), serde_json::json!("test"));

        // Test simple list
        assert_eq!(decode_to_json("li1ei2ee").unwrap(), serde_json::json!([1, 2]));

        // Test simple dictionary
        assert_eq!(decode_to_json("d3:fooi42ee").unwrap(), serde_json::json!({"foo": 42}));
    }

    #[test]
    fn test_decode_invalid_bencode() {
        // incomplete dictionary
        assert_eq!(
            decode_to_json("d").unwrap_err().kind,
            ErrorKind::UnmatchedDelimiter { delimiter: 'd' }
        );

        // incomplete string
        assert_eq!(decode_to_json("4:ab").unwrap_err().kind, ErrorKind::InvalidStringLength);

        // garbage
        assert_eq!(decode_to_json("garbage").unwrap_err().kind, ErrorKind::InvalidString);
    }

    #[test]
    fn test_torrent_to_tracker_query() {
        let raw = b"d8:announce19:http://tracker.test4:infod5:filesld6:lengthi7e4:pathl1:aeed6:lengthi5e4:pathl1:beee4:name3:dir12:piece lengthi4e6:pieces0:ee";
        let torrent = Torrent::from_bytes(raw).unwrap();
        let query = TrackerQuery::started(torrent.total_length(), 6881);

        assert_eq!(query.left, 12);
        let url = tracker::announce_url(
            &torrent.announce,
            &torrent.info_hash,
            &generate_peer_id("-TM0001-"),
            &query,
        )
        .unwrap();
        assert!(url.starts_with("http://tracker.test?info_hash="));
        assert!(url.contains(&url_encode_bytes(&torrent.info_hash)));
    }

    #[test]
    fn test_canonical_torrent_round_trips() {
        let raw = b"d8:announce19:http://tracker.test7:comment2:hi4:infod6:lengthi10e4:name5:a.txt12:piece lengthi16384e6:pieces20:AAAAAAAAAAAAAAAAAAAAee";
        assert_eq!(encode_bvalue(&decode(raw).unwrap()), raw.to_vec());
    }
}
