use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use snack_sync::pipelines::collection::CollectionOptions;
use snack_sync::pipelines::seed::SeedOptions;
use snack_sync::pipelines::sync::SyncOptions;
use snack_sync::{AppConfig, SyncError};

const USAGE: &str = "\
Usage: snack-sync <command> [options]

Commands:
  sync        --board <id> --from-list <id> [--move-to <id>] [--push]
  push        --file <path>
  recommend   [--top <n>]
  collection  --from-list <id> --name <name> [--comment <text>]
              [--valid-through <date>] [--id <id>]
  seed        --board <id> --to-list <id> --file <path>

Set RUST_LOG=debug for verbose messages.";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        "sync" => run_sync(&config, &args[1..]).await,
        "push" => run_push(&config, &args[1..]).await,
        "recommend" => run_recommend(&config, &args[1..]).await,
        "collection" => run_collection(&config, &args[1..]).await,
        "seed" => run_seed(&config, &args[1..]).await,
        other => {
            eprintln!("unknown command '{other}'\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run_sync(config: &AppConfig, args: &[String]) -> Result<ExitCode, SyncError> {
    let Some(board_id) = flag_value(args, "--board") else {
        return usage_error("sync requires --board");
    };
    let Some(from_list) = flag_value(args, "--from-list") else {
        return usage_error("sync requires --from-list");
    };

    let options = SyncOptions {
        board_id,
        from_list,
        move_to: flag_value(args, "--move-to"),
        push: has_flag(args, "--push"),
    };

    let outcomes = snack_sync::sync_cards(config, &options).await?;
    for outcome in &outcomes {
        println!("{:<14} {}", format!("{:?}", outcome.state), outcome.record.headline);
    }
    println!("{} cards processed", outcomes.len());
    Ok(ExitCode::SUCCESS)
}

async fn run_push(config: &AppConfig, args: &[String]) -> Result<ExitCode, SyncError> {
    let Some(file) = flag_value(args, "--file") else {
        return usage_error("push requires --file");
    };

    let pushed = snack_sync::push_records_file(config, &PathBuf::from(file)).await?;
    println!("{pushed} records pushed");
    Ok(ExitCode::SUCCESS)
}

async fn run_recommend(config: &AppConfig, args: &[String]) -> Result<ExitCode, SyncError> {
    let top_n = match flag_value(args, "--top") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => return usage_error("--top requires a positive number"),
        },
        None => 3,
    };

    let pushed = snack_sync::recompute_recommendations(config, top_n).await?;
    println!("recommendations pushed for {pushed} facts");
    Ok(ExitCode::SUCCESS)
}

async fn run_collection(config: &AppConfig, args: &[String]) -> Result<ExitCode, SyncError> {
    let Some(from_list) = flag_value(args, "--from-list") else {
        return usage_error("collection requires --from-list");
    };
    let Some(name) = flag_value(args, "--name") else {
        return usage_error("collection requires --name");
    };

    let options = CollectionOptions {
        from_list,
        name,
        comment: flag_value(args, "--comment").unwrap_or_default(),
        valid_through: flag_value(args, "--valid-through").unwrap_or_default(),
        id: flag_value(args, "--id"),
    };

    let collection = snack_sync::push_collection(config, &options).await?;
    println!(
        "collection '{}' pushed with {} facts",
        collection.name,
        collection.facts.len()
    );
    Ok(ExitCode::SUCCESS)
}

async fn run_seed(config: &AppConfig, args: &[String]) -> Result<ExitCode, SyncError> {
    let Some(board_id) = flag_value(args, "--board") else {
        return usage_error("seed requires --board");
    };
    let Some(to_list) = flag_value(args, "--to-list") else {
        return usage_error("seed requires --to-list");
    };
    let Some(file) = flag_value(args, "--file") else {
        return usage_error("seed requires --file");
    };

    let options = SeedOptions { board_id, to_list };
    let created = snack_sync::seed_board(config, &options, &PathBuf::from(file)).await?;
    println!("{created} cards created");
    Ok(ExitCode::SUCCESS)
}

fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|index| args.get(index + 1))
        .cloned()
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

fn usage_error(message: &str) -> Result<ExitCode, SyncError> {
    eprintln!("{message}\n\n{USAGE}");
    Ok(ExitCode::from(2))
}
