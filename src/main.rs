use std::env;
use std::path::Path;
use std::process;

use log::error;

mod auth;
mod boot;
mod config;
mod export;
mod import;
mod models;
mod normalize;
mod store;

use config::Config;
use store::{ChallengeFilter, StoreError};

const USAGE: &str = "usage: folioctl [summary | export <dir>]";

fn main() {
    env_logger::init();

    let config = Config::from_env();
    let args: Vec<String> = env::args().skip(1).collect();

    if let Err(e) = run(&config, &args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(config: &Config, args: &[String]) -> Result<(), StoreError> {
    let (mode, store) = boot::run(config)?;

    match args.first().map(String::as_str) {
        None | Some("summary") => {
            let snapshot = store.snapshot()?;
            println!("mode:         {:?}", mode);
            println!("challenges:   {}", snapshot.challenges.len());
            println!("certificates: {}", snapshot.certificates.len());
            println!("projects:     {}", snapshot.projects.len());
            println!("research:     {}", snapshot.research.len());
            println!("gallery:      {}", snapshot.gallery.len());

            let page = store.challenge_list(&ChallengeFilter::default(), 1, config.page_size)?;
            println!();
            println!(
                "latest challenges (page {}/{}):",
                page.page,
                page.total.div_ceil(config.page_size).max(1)
            );
            for challenge in &page.items {
                println!(
                    "  [{}] {} ({}, {})",
                    if challenge.published { "x" } else { " " },
                    challenge.title,
                    challenge.category,
                    challenge.platform
                );
            }
            Ok(())
        }
        Some("export") => {
            let dir = args.get(1).map(String::as_str).ok_or_else(|| {
                StoreError::Validation("export needs a target directory".into())
            })?;
            let snapshot = store.snapshot()?;
            export::write_bundle(&snapshot, Path::new(dir))?;
            println!("exported {} challenges to {}", snapshot.challenges.len(), dir);
            Ok(())
        }
        Some(other) => {
            eprintln!("unknown command: {}", other);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    }
}
