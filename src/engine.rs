// src/engine.rs
use std::time::Duration;

use anyhow::Context;
use log::info;
use reqwest::Client;

use tormeta::bencode::{bvalue_to_json, decode};
use tormeta::config::Config;
use tormeta::torrent::{Layout, Torrent};
use tormeta::tracker::{self, TrackerQuery};
use tormeta::utils;

use crate::Command;

pub async fn use_command(command: Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Decode { value } => {
            let decoded = decode(value.as_bytes())?;
            println!("{}", serde_json::to_string(&bvalue_to_json(&decoded))?);
        }
        Command::Info { torrent } => {
            let torrent = Torrent::from_file(&torrent)
                .with_context(|| format!("reading {}", torrent.display()))?;
            print_info(&torrent);
        }
        Command::Peers { torrent } => {
            let torrent = Torrent::from_file(&torrent)
                .with_context(|| format!("reading {}", torrent.display()))?;

            let http_client = Client::builder()
                .timeout(Duration::from_secs(config.request_timeout))
                .build()?;
            let peer_id = utils::generate_peer_id(&config.peer_id_prefix);
            let query = TrackerQuery::started(torrent.total_length(), config.listen_port);

            info!("announcing '{}' to {}", torrent.name(), torrent.announce);
            let response = tracker::announce(
                &http_client,
                &torrent.announce,
                &torrent.info_hash,
                &peer_id,
                &query,
            )
            .await
            .with_context(|| format!("announcing to {}", torrent.announce))?;

            for peer in &response.peers {
                println!("{}", peer);
            }
        }
    }

    Ok(())
}

fn print_info(torrent: &Torrent) {
    println!("Tracker URL: {}", torrent.announce);
    println!("Info Hash: {}", torrent.info_hash_hex());
    if let Some(date) = torrent.creation_date {
        println!("Creation Date: {}", date);
    }
    if let Some(created_by) = &torrent.created_by {
        println!("Created By: {}", created_by);
    }
    if let Some(comment) = &torrent.comment {
        println!("Comment: {}", comment);
    }

    match &torrent.layout {
        Layout::SingleFile { name, length, .. } => {
            println!("File Name: {}", name);
            println!("Length: {}", length);
        }
        Layout::MultiFile { name, files, .. } => {
            println!("Directory: {}", name);
            println!("Total Length: {}", torrent.total_length());
            for file in files {
                println!("  {} ({} bytes)", file.path.join("/"), file.length);
            }
        }
    }

    println!("Piece Length: {}", torrent.piece_length());
    println!("Number of Pieces: {}", torrent.pieces().len());
    for piece_hash in torrent.pieces() {
        println!("{}", hex::encode(piece_hash));
    }
}
