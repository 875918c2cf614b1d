//! Debug tool for appearance presets
//! Dumps the container header and JSON payload of a .sc4cart file and
//! reports exactly why a damaged file is rejected.

use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use sc4_cartographer::persistence::{self, FORMAT_VERSION, PRESET_EXTENSION};

fn main() -> ExitCode {
    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: debug_preset <file.sc4cart>");
        return ExitCode::FAILURE;
    };

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Cannot read {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };
    println!("File: {} ({} bytes)", path, bytes.len());
    if Path::new(&path).extension().map_or(true, |e| e != PRESET_EXTENSION) {
        println!("Note: file does not have the .{} extension", PRESET_EXTENSION);
    }

    let (header, payload) = match persistence::read_header(&bytes) {
        Ok(parts) => parts,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };
    println!("Version:  {} (supported: {})", header.version, FORMAT_VERSION);
    println!("Payload:  {} bytes", header.payload_len);
    let digest: String = header.digest.iter().map(|b| format!("{:02x}", b)).collect();
    println!("Digest:   {}", digest);
    println!("Actual:   {}", blake3::hash(payload).to_hex());

    println!();
    match serde_json::from_slice::<serde_json::Value>(payload) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", String::from_utf8_lossy(payload)),
        },
        Err(_) => println!("{}", String::from_utf8_lossy(payload)),
    }
    println!();

    match persistence::deserialize(&bytes) {
        Ok(model) => {
            println!(
                "OK: segment {} px, {} visible layers",
                model.grid_segment_size,
                model.visible_layers.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(error: &sc4_cartographer::CartographerError) {
    match error.malformed_kind() {
        Some(kind) => eprintln!("Malformed preset: {:?}", kind),
        None => eprintln!("Error: {}", error),
    }
}
