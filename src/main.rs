// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use atril::search;
use atril::store::{self, FsTextStore, TextStore};
use atril::{app, viewer};

fn print_usage() {
    println!("ATRIL - Terminal Lyrics Manager");
    println!();
    println!("Usage: atril [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --data-dir <PATH>   Use PATH for songs, setlists, and settings");
    println!("  --list-songs        List saved songs and exit");
    println!("  --search <QUERY>    Search lrclib.net and print the results");
    println!("  --help              Show this help message");
    println!();
    println!("Run with no options to start the full-screen interface.");
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("atril"))
        .unwrap_or_else(|| PathBuf::from(".atril"))
}

/// Pull `--data-dir <PATH>` out of the argument list, if present.
fn take_data_dir(args: &mut Vec<String>) -> Result<PathBuf> {
    if let Some(pos) = args.iter().position(|a| a == "--data-dir") {
        if pos + 1 >= args.len() {
            anyhow::bail!("--data-dir requires a path");
        }
        let path = PathBuf::from(args.remove(pos + 1));
        args.remove(pos);
        return Ok(path);
    }
    Ok(default_data_dir())
}

fn init_logging(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let log_file = File::create(data_dir.join("atril.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn list_songs(data_dir: &Path) -> Result<()> {
    let songs = FsTextStore::open(data_dir.join("songs"))?;
    let keys = songs.list()?;
    if keys.is_empty() {
        println!("No saved songs in {}", data_dir.display());
        return Ok(());
    }
    for key in &keys {
        println!("{}", store::display_name(key));
    }
    println!();
    println!("{} song(s)", keys.len());
    Ok(())
}

async fn search_once(query: &str) -> Result<()> {
    println!("Searching lrclib.net for \"{}\"...", query);
    let client = reqwest::Client::new();
    let hits = search::search(&client, query).await?;
    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for hit in &hits {
        let lyrics = if hit.lyrics_or_placeholder() == viewer::PLACEHOLDER_TEXT {
            "no lyrics"
        } else {
            "lyrics available"
        };
        println!("{}  [{}]", hit.display_name(), lyrics);
    }
    println!();
    println!("{} result(s)", hits.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let data_dir = take_data_dir(&mut args)?;

    if args.is_empty() {
        init_logging(&data_dir)?;
        return app::run(data_dir).await;
    }

    match args[0].as_str() {
        "--list-songs" => {
            list_songs(&data_dir)?;
        }
        "--search" => {
            if args.len() < 2 {
                eprintln!("Error: --search requires a query");
                std::process::exit(1);
            }
            search_once(&args[1]).await?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[0]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
