use clap::{value_parser, Arg, ArgMatches, Command};
use color_eyre::Result;
use std::net::IpAddr;
use std::sync::Arc;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    api::ProxyClient,
    config::{FileConfigStore, ProxyConfig},
    http,
    tui::{run_tui, App},
};
use application::TodoSync;
use domain::{Priority, PriorityFilter, TodoId};
use ports::ConfigStore;

const SERVER_ENV: &str = "TODO_RELAY_SERVER";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("serve", serve_matches)) => {
            init_stderr_logging(tracing::Level::DEBUG);
            run_serve(serve_matches).await?;
        }
        Some(("todos", todos_matches)) => {
            init_stderr_logging(tracing::Level::INFO);
            let sync = connect(&matches).await?;
            run_todos(sync, todos_matches).await?;
        }
        Some(("tui", _)) | None => {
            // The terminal belongs to the UI, so logs go to a file
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open("todo-relay.log")?;

            tracing_subscriber::fmt()
                .with_writer(log_file)
                .with_max_level(tracing::Level::DEBUG)
                .init();

            let sync = connect(&matches).await?;
            if let Err(e) = run_tui(App::new(sync)).await {
                eprintln!("Application error: {e}");
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("Unknown command");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn cli() -> Command {
    let priority_arg = Arg::new("priority")
        .long("priority")
        .short('p')
        .value_name("PRIORITY")
        .help("low, medium or high")
        .default_value("low")
        .value_parser(|s: &str| s.parse::<Priority>());

    Command::new("todo-relay")
        .version("0.1.0")
        .about("A small to-do manager: terminal UI, CLI and HTTP proxy")
        .long_about("A small to-do manager.\n\nThe `serve` command runs a proxy in front of a hosted edge function (SUPABASE_URL and SUPABASE_ANON_KEY must be set).\nThe UI and the `todos` commands talk to that proxy.")
        .arg(
            Arg::new("server")
                .long("server")
                .value_name("URL")
                .help("Proxy base URL (can also be set via TODO_RELAY_SERVER env var)")
                .global(true),
        )
        .subcommand(Command::new("tui").about("Run the interactive UI (default)"))
        .subcommand(
            Command::new("serve")
                .about("Run the proxy server")
                .arg(
                    Arg::new("port")
                        .long("port")
                        .value_name("PORT")
                        .help("Port to listen on (overrides PORT)")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .value_name("ADDR")
                        .help("Address to bind (default 0.0.0.0)")
                        .value_parser(value_parser!(IpAddr)),
                ),
        )
        .subcommand(
            Command::new("todos")
                .about("To-Do operations, printed as JSON")
                .subcommand_required(true)
                .subcommand(
                    Command::new("list").about("List To-Dos").arg(
                        Arg::new("filter")
                            .long("filter")
                            .short('f')
                            .value_name("PRIORITY")
                            .help("all, low, medium or high")
                            .default_value("all")
                            .value_parser(|s: &str| s.parse::<PriorityFilter>()),
                    ),
                )
                .subcommand(
                    Command::new("add")
                        .about("Add a To-Do")
                        .arg(Arg::new("text").required(true).index(1))
                        .arg(priority_arg.clone()),
                )
                .subcommand(
                    Command::new("update")
                        .about("Replace the text and priority of a To-Do")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .index(1)
                                .value_parser(|s: &str| s.parse::<TodoId>()),
                        )
                        .arg(Arg::new("text").required(true).index(2))
                        .arg(priority_arg),
                )
                .subcommand(
                    Command::new("delete").about("Delete a To-Do").arg(
                        Arg::new("id")
                            .required(true)
                            .index(1)
                            .value_parser(|s: &str| s.parse::<TodoId>()),
                    ),
                ),
        )
}

fn init_stderr_logging(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

async fn run_serve(matches: &ArgMatches) -> Result<()> {
    let mut config = ProxyConfig::from_env()?;

    if let Some(port) = matches.get_one::<u16>("port") {
        config = config.with_port(*port);
    }
    if let Some(bind) = matches.get_one::<IpAddr>("bind") {
        config = config.with_bind(*bind);
    }

    tracing::debug!("Starting proxy with {:?}", config);
    http::serve(config).await?;
    Ok(())
}

/// Loads the client config, applies any server override, and builds the sync layer.
async fn connect(matches: &ArgMatches) -> Result<TodoSync> {
    let config_store = FileConfigStore::new()?;
    let mut config = config_store.load_config().await?;

    let server = matches
        .get_one::<String>("server")
        .cloned()
        .or_else(|| std::env::var(SERVER_ENV).ok());

    if let Some(server) = server {
        config.server_url = server;
        config_store.save_config(&config).await?;
    }

    let client = ProxyClient::new(&config.server_url)?;
    Ok(TodoSync::new(Arc::new(client)))
}

async fn run_todos(mut sync: TodoSync, matches: &ArgMatches) -> Result<()> {
    let mut filter = PriorityFilter::All;

    let acknowledged = match matches.subcommand() {
        Some(("list", list_matches)) => {
            if let Some(selected) = list_matches.get_one::<PriorityFilter>("filter") {
                filter = *selected;
            }
            sync.refresh().await;
            true
        }
        Some(("add", add_matches)) => {
            let text = add_matches
                .get_one::<String>("text")
                .map(String::as_str)
                .unwrap_or_default();
            let priority = add_matches
                .get_one::<Priority>("priority")
                .copied()
                .unwrap_or_default();
            sync.create(text, priority).await
        }
        Some(("update", update_matches)) => {
            let id = update_matches
                .get_one::<TodoId>("id")
                .copied()
                .unwrap_or(TodoId(0));
            let text = update_matches
                .get_one::<String>("text")
                .map(String::as_str)
                .unwrap_or_default();
            let priority = update_matches
                .get_one::<Priority>("priority")
                .copied()
                .unwrap_or_default();
            sync.update(id, text, priority).await
        }
        Some(("delete", delete_matches)) => {
            let id = delete_matches
                .get_one::<TodoId>("id")
                .copied()
                .unwrap_or(TodoId(0));
            sync.delete(id).await
        }
        _ => {
            eprintln!("Unknown todos subcommand");
            std::process::exit(1);
        }
    };

    if let Some(error) = sync.error() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
    if !acknowledged {
        eprintln!("The server did not acknowledge the request (see log output above)");
        std::process::exit(1);
    }

    let json = serde_json::to_string_pretty(&sync.visible(filter))?;
    println!("{json}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todos_args(args: &[&str]) -> clap::error::Result<ArgMatches> {
        let mut argv = vec!["todo-relay", "todos"];
        argv.extend_from_slice(args);
        cli().try_get_matches_from(argv)
    }

    #[test]
    fn test_ids_parse_as_todo_ids() {
        let matches = todos_args(&["delete", "42"]).unwrap();
        let (_, delete) = matches.subcommand().unwrap().1.subcommand().unwrap();
        assert_eq!(delete.get_one::<TodoId>("id"), Some(&TodoId(42)));

        assert!(todos_args(&["delete", "abc"]).is_err());
        assert!(todos_args(&["update", "x1", "Edited"]).is_err());
    }

    #[test]
    fn test_list_filter_and_priority_flags() {
        let matches = todos_args(&["list", "--filter", "HIGH"]).unwrap();
        let (_, list) = matches.subcommand().unwrap().1.subcommand().unwrap();
        assert_eq!(
            list.get_one::<PriorityFilter>("filter"),
            Some(&PriorityFilter::Only(Priority::High))
        );

        let matches = todos_args(&["list"]).unwrap();
        let (_, list) = matches.subcommand().unwrap().1.subcommand().unwrap();
        assert_eq!(list.get_one::<PriorityFilter>("filter"), Some(&PriorityFilter::All));

        assert!(todos_args(&["list", "--filter", "urgent"]).is_err());
        assert!(todos_args(&["add", "Buy milk", "--priority", "urgent"]).is_err());
    }
}
