use anyhow::{anyhow, Context, Result};
use crossterm::style::Stylize;
use jobscout::config::Config;
use jobscout::logging::{get_log_buffer, init_tracing};
use jobscout::utils::app_paths::AppPaths;
use jobscout::{FileStore, JobBoard};
use std::sync::Arc;
use std::time::Duration;

mod table_display;

use table_display::{display_history, display_jobs};

fn print_help() {
    println!("{}", "jobscout - search mock job listings and keep the good ones".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  jobscout [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}         - Print captured log lines after the command", "--verbose".green());
    println!("  {} - Write a commented config file with defaults", "--generate-config".green());
    println!("  {}            - Show this help", "--help".green());
    println!();
    println!("{}", "Commands:".yellow());
    println!("  {} - Search and remember the query", "search <keyword> [location]".green());
    println!("  {}                     - Show the last search results", "results".green());
    println!("  {}                  - Save or unsave the n-th result", "toggle <n>".green());
    println!("  {}                       - List saved jobs", "saved".green());
    println!("  {}                  - Remove the n-th saved job", "unsave <n>".green());
    println!("  {}                     - List recent searches", "history".green());
    println!("  {}                   - Repeat the n-th recent search", "rerun <n>".green());
    println!("  {}                 - Forget all saved jobs", "clear-saved".green());
    println!("  {}               - Forget all recent searches", "clear-history".green());
    println!("  {}                   - Forget everything", "clear-all".green());
    println!();
}

/// Parse a 1-based position argument into a 0-based index.
fn parse_position(arg: Option<&String>, what: &str) -> Result<usize> {
    let raw = arg.ok_or_else(|| anyhow!("Missing {} number", what))?;
    let position: usize = raw
        .parse()
        .with_context(|| format!("'{}' is not a valid {} number", raw, what))?;
    if position == 0 {
        return Err(anyhow!("{} numbers start at 1", what));
    }
    Ok(position - 1)
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Error creating config directory")?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .context("Error writing config file")?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

fn open_board(config: &Config) -> Result<JobBoard> {
    let path = match &config.storage.path {
        Some(path) => path.clone(),
        None => AppPaths::store_file()?,
    };
    tracing::debug!(target: "system", "Using store {:?}", path);

    let store = FileStore::new(path).with_quota(config.storage.quota_bytes);
    Ok(JobBoard::new(Arc::new(store), config))
}

fn run(command: &str, rest: &[String], config: &Config) -> Result<()> {
    let mut board = open_board(config)?;

    match command {
        "search" => {
            let keyword = rest.first().map(String::as_str).unwrap_or_default();
            let location = rest.get(1).map(String::as_str).unwrap_or_default();
            if keyword.trim().is_empty() {
                return Err(anyhow!("Please enter a keyword to search"));
            }

            println!("{}", "Searching...".dark_grey());
            std::thread::sleep(Duration::from_millis(config.search.simulated_latency_ms));
            board.search(keyword, location)?;
            display_jobs(board.last_results(), |id| board.is_saved(id));
        }
        "results" => display_jobs(board.last_results(), |id| board.is_saved(id)),
        "toggle" => {
            let index = parse_position(rest.first(), "result")?;
            match board.toggle_result(index) {
                Some((job, true)) => println!("{} {}", "Saved".green(), job.title),
                Some((job, false)) => println!("{} {}", "Removed".yellow(), job.title),
                None => return Err(anyhow!("No result #{} in the last search", index + 1)),
            }
        }
        "saved" => display_jobs(board.saved().jobs(), |_| true),
        "unsave" => {
            let index = parse_position(rest.first(), "saved job")?;
            let job = board
                .saved()
                .jobs()
                .get(index)
                .cloned()
                .ok_or_else(|| anyhow!("No saved job #{}", index + 1))?;
            board.toggle_saved(job.clone());
            println!("{} {}", "Removed".yellow(), job.title);
        }
        "history" => display_history(board.history()),
        "rerun" => {
            let index = parse_position(rest.first(), "search")?;
            std::thread::sleep(Duration::from_millis(config.search.simulated_latency_ms));
            if board.rerun(index)?.is_none() {
                return Err(anyhow!("No recent search #{}", index + 1));
            }
            display_jobs(board.last_results(), |id| board.is_saved(id));
        }
        "clear-saved" => {
            board.clear_saved();
            println!("{}", "Saved jobs cleared.".green());
        }
        "clear-history" => {
            board.clear_history();
            println!("{}", "Search history cleared.".green());
        }
        "clear-all" => {
            board.clear_all();
            println!("{}", "All local data cleared.".green());
        }
        other => {
            print_help();
            return Err(anyhow!("Unknown command '{}'", other));
        }
    }

    Ok(())
}

/// `help` only counts as the command word; search terms may contain it.
fn wants_help(args: &[String]) -> bool {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return true;
    }
    match args.iter().find(|a| !a.starts_with("--")) {
        Some(command) => command == "help",
        None => args.is_empty(),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if wants_help(&args) {
        print_help();
        return Ok(());
    }

    if args.contains(&"--generate-config".to_string()) {
        return generate_config();
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Ignoring unreadable config:".yellow(), e);
            Config::default()
        }
    };
    init_tracing(&config.logging.level);

    let verbose = args.contains(&"--verbose".to_string());
    let positional: Vec<String> = args.into_iter().filter(|a| a != "--verbose").collect();
    let (command, rest) = positional
        .split_first()
        .ok_or_else(|| anyhow!("Missing command"))?;

    let result = run(command, rest, &config);

    if verbose {
        if let Some(buffer) = get_log_buffer() {
            for entry in buffer.all() {
                eprintln!("{}", entry.format_for_display().dark_grey());
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_help_only_as_command_word() {
        assert!(wants_help(&args(&[])));
        assert!(wants_help(&args(&["help"])));
        assert!(wants_help(&args(&["--verbose", "help"])));
        assert!(wants_help(&args(&["search", "--help"])));

        assert!(!wants_help(&args(&["search", "help"])));
        assert!(!wants_help(&args(&["search", "rust", "help"])));
        assert!(!wants_help(&args(&["--verbose", "history"])));
    }

    #[test]
    fn test_parse_position_is_one_based() {
        assert_eq!(parse_position(Some(&"1".to_string()), "result").unwrap(), 0);
        assert!(parse_position(Some(&"0".to_string()), "result").is_err());
        assert!(parse_position(Some(&"x".to_string()), "result").is_err());
        assert!(parse_position(None, "result").is_err());
    }
}
