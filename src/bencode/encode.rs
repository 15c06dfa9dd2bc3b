use serde_json::{Value, json};
use super::BValue;

/// Encode a `BValue` back into a bencoded `Vec<u8>`.
///
/// Dictionary keys come out in raw byte order, so canonical input re-encodes
/// byte for byte.
pub fn encode_bvalue(value: &BValue) -> Vec<u8> {
	let mut out: Vec<u8> = Vec::new();
	encode_into(value, &mut out);
	out
}

fn encode_into(value: &BValue, out: &mut Vec<u8>) {
	match value {
		BValue::Integer(i) => {
			out.push(b'i');
			out.extend_from_slice(i.to_string().as_bytes());
			out.push(b'e');
		}
		BValue::ByteString(bytes) => encode_bytes(bytes, out),
		BValue::List(items) => {
			out.push(b'l');
			for item in items {
				encode_into(item, out);
			}
			out.push(b'e');
		}
		BValue::Dict(dict) => {
			out.push(b'd');
			// BTreeMap iterates in key order
			for (key, val) in dict {
				encode_bytes(key, out);
				encode_into(val, out);
			}
			out.push(b'e');
		}
	}
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
	out.extend_from_slice(bytes.len().to_string().as_bytes());
	out.push(b':');
	out.extend_from_slice(bytes);
}

/// Convert a `BValue` into JSON (using Serde JSON `Value`).
///
/// - `Integer(i)` => JSON number
/// - `ByteString(bytes)` => Attempt UTF-8; if invalid, store hex in `\"_bytes_hex\"`.
/// - `List(...)` => JSON array
/// - `Dict(...)` => JSON object, keys decoded lossily
pub fn bvalue_to_json(bv: &BValue) -> Value {
	match bv {
		BValue::Integer(i) => json!(i),
		BValue::ByteString(bytes) => match std::str::from_utf8(bytes) {
			Ok(text) => Value::String(text.to_string()),
			Err(_) => json!({ "_bytes_hex": hex::encode(bytes) }),
		},
		BValue::List(items) => Value::Array(items.iter().map(bvalue_to_json).collect()),
		BValue::Dict(map) => {
			let mut json_map = serde_json::Map::new();
			for (k, v) in map {
				json_map.insert(String::from_utf8_lossy(k).into_owned(), bvalue_to_json(v));
			}
			Value::Object(json_map)
		}
	}
}


#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use super::*;
	use crate::bencode::decode;

	#[test]
	fn test_encode_scalars() {
		assert_eq!(encode_bvalue(&BValue::Integer(42)), b"i42e");
		assert_eq!(encode_bvalue(&BValue::Integer(-7)), b"i-7e");
		assert_eq!(encode_bvalue(&BValue::Integer(0)), b"i0e");
		assert_eq!(encode_bvalue(&BValue::from("spam")), b"4:spam");
		assert_eq!(encode_bvalue(&BValue::from("")), b"0:");
	}

	#[test]
	fn test_encode_list_keeps_order() {
		let list = BValue::List(vec![BValue::Integer(2), BValue::from("a"), BValue::Integer(1)]);
		assert_eq!(encode_bvalue(&list), b"li2e1:ai1ee");
	}

	#[test]
	fn test_encode_dict_sorts_keys_by_raw_bytes() {
		let mut map = BTreeMap::new();
		map.insert(b"zeta".to_vec(), BValue::Integer(1));
		map.insert(b"Alpha".to_vec(), BValue::Integer(2));
		map.insert(vec![0xc3, 0xa9], BValue::Integer(3));
		map.insert(b"alpha".to_vec(), BValue::Integer(4));

		let encoded = encode_bvalue(&BValue::Dict(map));
		assert_eq!(encoded, b"d5:Alphai2e5:alphai4e4:zetai1e2:\xc3\xa9i3ee".to_vec());
	}

	#[test]
	fn test_round_trip_canonical_input() {
		let samples: [&[u8]; 6] = [
			b"i0e",
			b"i-12345e",
			b"0:",
			b"le",
			b"de",
			b"d8:announce3:url4:infod5:filesld6:lengthi3e4:pathl1:a1:beee4:name1:xee",
		];
		for sample in samples {
			let value = decode(sample).unwrap();
			assert_eq!(encode_bvalue(&value), sample.to_vec());
		}
	}

	#[test]
	fn test_integer_round_trip() {
		for n in [0, 1, -1, 9, -10, 1 << 40, i64::MAX, i64::MIN] {
			let encoded = encode_bvalue(&BValue::Integer(n));
			assert_eq!(decode(&encoded).unwrap(), BValue::Integer(n));
		}
	}

	#[test]
	fn test_byte_string_round_trip() {
		let samples: [&[u8]; 5] = [b"", b":", b"e", b"1:ae", &[0x00, 0xff, 0x80, b'd']];
		for sample in samples {
			let value = BValue::ByteString(sample.to_vec());
			assert_eq!(decode(&encode_bvalue(&value)).unwrap(), value);
		}
	}

	#[test]
	fn test_unsorted_input_encodes_sorted() {
		let value = decode(b"d1:bi1e1:ai2ee").unwrap();
		assert_eq!(encode_bvalue(&value), b"d1:ai2e1:bi1ee");
	}

	#[test]
	fn test_bvalue_to_json() {
		let value = decode(b"d3:fooli1e4:spame3:raw2:\xff\xfee").unwrap();
		assert_eq!(
			bvalue_to_json(&value),
			json!({ "foo": [1, "spam"], "raw": { "_bytes_hex": "fffe" } })
		);
	}
}
