use std::net::{Ipv4Addr, SocketAddrV4};

use bytes::Bytes;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::bencode::{decode, BValue, DecodeError};
use crate::utils::url_encode_bytes;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tracker responded with HTTP status {0}")]
    Status(u16),

    #[error("could not build tracker query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    #[error("tracker response bencode {0}")]
    Decode(#[from] DecodeError),

    #[error("tracker failure: {0}")]
    Failure(String),

    #[error("malformed tracker response: {0}")]
    Malformed(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    Started,
}

/// The plain (text) announce parameters. `info_hash` and `peer_id` are raw
/// bytes and get appended separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerQuery {
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub compact: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
}

impl TrackerQuery {
    /// First announce of a fresh download: nothing transferred, everything left.
    pub fn started(left: u64, port: u16) -> Self {
        TrackerQuery {
            port,
            uploaded: 0,
            downloaded: 0,
            left,
            compact: 1,
            event: Some(Event::Started),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerResponse {
    pub interval: u64, // seconds between announces
    pub min_interval: Option<u64>,
    pub tracker_id: Option<String>,
    pub complete: Option<u64>,   // seeders
    pub incomplete: Option<u64>, // leechers
    pub warning_message: Option<String>,
    pub peers: Vec<SocketAddrV4>,
}

/// Builds the full announce URL.
pub fn announce_url(
    announce: &str,
    info_hash: &[u8; 20],
    peer_id: &[u8; 20],
    query: &TrackerQuery,
) -> Result<String, TrackerError> {
    let params = serde_urlencoded::to_string(query)?;
    // some trackers carry a passkey in the announce URL already
    let separator = if announce.contains('?') { '&' } else { '?' };

    Ok(format!(
        "{announce}{separator}info_hash={info_hash}&peer_id={peer_id}&{params}",
        info_hash = url_encode_bytes(info_hash),
        peer_id = url_encode_bytes(peer_id),
    ))
}

/// Announces to the tracker's `announce` URL and returns its parsed response.
pub async fn announce(
    client: &Client,
    announce: &str,
    info_hash: &[u8; 20],
    peer_id: &[u8; 20],
    query: &TrackerQuery,
) -> Result<TrackerResponse, TrackerError> {
    let url = announce_url(announce, info_hash, peer_id, query)?;
    debug!("announcing to {url}");

    let response = client.get(&url).send().await?;
    if response.status() != StatusCode::OK {
        return Err(TrackerError::Status(response.status().as_u16()));
    }

    let body: Bytes = response.bytes().await?;
    debug!("tracker answered with {} bytes", body.len());

    let parsed = TrackerResponse::from_bytes(&body)?;
    info!(
        "tracker returned {} peers, next announce in {}s",
        parsed.peers.len(),
        parsed.interval
    );
    Ok(parsed)
}

impl TrackerResponse {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TrackerError> {
        let value = decode(bytes)?;
        Self::from_bvalue(&value)
    }

    /// Reads the top-level dictionary of a tracker response.
    pub fn from_bvalue(value: &BValue) -> Result<Self, TrackerError> {
        if value.as_dict().is_none() {
            return Err(TrackerError::Malformed("response is not a dictionary"));
        }

        // Check if the tracker returned a failure reason.
        if let Some(reason) = value.get("failure reason") {
            let reason = reason
                .as_bytes()
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_else(|| format!("<{}>", reason.type_name()));
            return Err(TrackerError::Failure(reason));
        }

        let interval = value
            .get("interval")
            .and_then(BValue::as_integer)
            .ok_or(TrackerError::Malformed("missing 'interval'"))?;
        let interval =
            u64::try_from(interval).map_err(|_| TrackerError::Malformed("negative 'interval'"))?;

        let warning_message = optional_text(value, "warning message");
        if let Some(warning) = &warning_message {
            warn!("tracker warning: {warning}");
        }

        Ok(TrackerResponse {
            interval,
            min_interval: optional_count(value, "min interval"),
            tracker_id: optional_text(value, "tracker id"),
            complete: optional_count(value, "complete"),
            incomplete: optional_count(value, "incomplete"),
            warning_message,
            peers: parse_peers_from_bvalue(value)?,
        })
    }
}

/// Optional non-negative integers are advisory; bad ones are dropped.
fn optional_count(value: &BValue, key: &str) -> Option<u64> {
    let field = value.get(key)?;
    let count = field.as_integer().and_then(|i| u64::try_from(i).ok());
    if count.is_none() {
        warn!("ignoring malformed '{key}' in tracker response");
    }
    count
}

fn optional_text(value: &BValue, key: &str) -> Option<String> {
    value
        .get(key)?
        .as_bytes()
        .map(|b| String::from_utf8_lossy(b).into_owned())
}

/// Extracts either a "compact" or "non-compact" list of peers.
fn parse_peers_from_bvalue(value: &BValue) -> Result<Vec<SocketAddrV4>, TrackerError> {
    // The "peers" key can be a ByteString (compact) or a List of Dicts (non-compact).
    let peers_val = value
        .get("peers")
        .ok_or(TrackerError::Malformed("missing 'peers'"))?;

    match peers_val {
        // Compact mode: each peer is 6 bytes: [IP(4), Port(2)]
        BValue::ByteString(bytes) => {
            if bytes.len() % 6 != 0 {
                return Err(TrackerError::Malformed("compact peers length is not a multiple of 6"));
            }

            Ok(bytes
                .chunks_exact(6)
                .map(|chunk| {
                    let ip = Ipv4Addr::new(chunk[0], chunk[1], chunk[2], chunk[3]);
                    let port = u16::from_be_bytes([chunk[4], chunk[5]]);
                    SocketAddrV4::new(ip, port)
                })
                .collect())
        }
        // Non-compact: a List of dicts, each with "ip" and "port"
        BValue::List(list) => {
            let mut result = Vec::new();
            for item in list {
                let ip = item
                    .get("ip")
                    .and_then(BValue::as_str)
                    .and_then(|ip| ip.parse::<Ipv4Addr>().ok());
                let port = item
                    .get("port")
                    .and_then(BValue::as_integer)
                    .and_then(|port| u16::try_from(port).ok());

                match (ip, port) {
                    (Some(ip), Some(port)) => result.push(SocketAddrV4::new(ip, port)),
                    _ => debug!("skipping unusable peer entry {item:?}"),
                }
            }
            Ok(result)
        }
        _ => Err(TrackerError::Malformed("'peers' is neither a string nor a list")),
    }
}
