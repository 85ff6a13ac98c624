// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use campus_api::Client;
use campus_app::{Confirm, ScreenKind, ViewMode};
use config::Config;
use runtime::{Backend, Runtime, SessionStore, StdinConfirm, ViewRequest};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    logging::init(options.verbose);

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `campus --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let backend = if options.demo {
        Backend::Demo
    } else {
        let client = Client::new(config.base_url(), config.timeout()?).with_context(|| {
            format!(
                "invalid [api] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?;
        let store = SessionStore::new(config::session_path()?);
        let session = store.load()?;
        tracing::debug!(
            path = %store.path().display(),
            signed_in = session.is_authenticated(),
            "session loaded"
        );
        Backend::Api {
            client,
            session,
            store,
        }
    };
    if options.check_only {
        return Ok(());
    }

    let mut runtime = Runtime::new(backend, config.page_size());
    let account_only = options.screen.is_none() && (options.logout || options.login.is_some());
    if options.logout {
        runtime.logout()?;
    }
    if let Some((email, password)) = &options.login {
        runtime.login(email, password)?;
    }

    let result = if account_only {
        Ok(())
    } else {
        let screen = options.screen.unwrap_or(runtime.state().active_screen);
        let request = ViewRequest {
            search: options.search.clone(),
            filters: options.filters.clone(),
            sorts: options.sorts.clone(),
            view_mode: if options.grid {
                ViewMode::Grid
            } else {
                config.default_view()
            },
            page: options.page,
            set_status: options.set_status.clone(),
            delete: options.delete.clone(),
        };
        let mut assume_yes = |_: &str| true;
        let mut ask = StdinConfirm;
        let confirm: &mut dyn Confirm = if options.assume_yes {
            &mut assume_yes
        } else {
            &mut ask
        };
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        runtime.show(screen, &request, confirm, &mut out)
    };

    if let Some(status) = &runtime.state().status_line {
        eprintln!("{status}");
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    screen: Option<ScreenKind>,
    search: Option<String>,
    filters: Vec<(String, String)>,
    sorts: Vec<String>,
    grid: bool,
    page: Option<u32>,
    demo: bool,
    verbose: bool,
    login: Option<(String, String)>,
    logout: bool,
    set_status: Option<(i64, String)>,
    delete: Vec<i64>,
    assume_yes: bool,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

impl CliOptions {
    fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            screen: None,
            search: None,
            filters: Vec::new(),
            sorts: Vec::new(),
            grid: false,
            page: None,
            demo: false,
            verbose: false,
            login: None,
            logout: false,
            set_status: None,
            delete: Vec::new(),
            assume_yes: false,
            print_config_path: false,
            print_example: false,
            check_only: false,
            show_help: false,
        }
    }
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions::new(default_config_path);

    let mut iter = args.into_iter().map(|arg| arg.as_ref().to_owned());
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str, what: &str| next_value(&mut iter, flag, what);
        match arg.as_str() {
            "--config" => {
                options.config_path = PathBuf::from(value_for("--config", "a file path")?);
            }
            "--search" => {
                options.search = Some(value_for("--search", "a search term")?);
            }
            "--filter" => {
                let raw = value_for("--filter", "FIELD=VALUE")?;
                let (field, value) = raw.split_once('=').ok_or_else(|| {
                    anyhow!("--filter expects FIELD=VALUE, got {raw:?} (for example status=pending)")
                })?;
                options
                    .filters
                    .push((field.trim().to_owned(), value.trim().to_owned()));
            }
            "--sort" => {
                options.sorts.push(value_for("--sort", "a field path")?);
            }
            "--grid" => {
                options.grid = true;
            }
            "--page" => {
                let raw = value_for("--page", "a page number")?;
                let page = raw
                    .parse::<u32>()
                    .ok()
                    .filter(|page| *page >= 1)
                    .ok_or_else(|| anyhow!("--page expects a page number from 1, got {raw:?}"))?;
                options.page = Some(page);
            }
            "--demo" => {
                options.demo = true;
            }
            "--verbose" | "-v" => {
                options.verbose = true;
            }
            "--login" => {
                let email = value_for("--login", "EMAIL PASSWORD")?;
                let password = value_for("--login", "EMAIL PASSWORD")?;
                options.login = Some((email, password));
            }
            "--logout" => {
                options.logout = true;
            }
            "--set-status" => {
                let id = parse_id("--set-status", &value_for("--set-status", "ID STATUS")?)?;
                let status = value_for("--set-status", "ID STATUS")?;
                options.set_status = Some((id, status));
            }
            "--delete" => {
                let id = parse_id("--delete", &value_for("--delete", "an id")?)?;
                options.delete.push(id);
            }
            "--yes" | "-y" => {
                options.assume_yes = true;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            flag if flag.starts_with('-') => {
                bail!("unknown argument {flag:?}; run with --help to see supported options");
            }
            screen => {
                if options.screen.is_some() {
                    bail!("only one screen can be shown at a time, got extra {screen:?}");
                }
                options.screen = Some(ScreenKind::parse(screen).ok_or_else(|| {
                    let names: Vec<&str> =
                        ScreenKind::ALL.iter().map(|kind| kind.as_str()).collect();
                    anyhow!(
                        "unknown screen {screen:?}; use one of: {}",
                        names.join(", ")
                    )
                })?);
            }
        }
    }

    Ok(options)
}

fn next_value(iter: &mut impl Iterator<Item = String>, flag: &str, what: &str) -> Result<String> {
    iter.next()
        .ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn parse_id(flag: &str, raw: &str) -> Result<i64> {
    raw.parse()
        .with_context(|| format!("{flag} expects a numeric id, got {raw:?}"))
}

fn print_help() {
    println!("campus <screen> [options]");
    println!("  screens:");
    for screen in ScreenKind::ALL {
        println!("    {:<12} {}", screen.as_str(), screen.label());
    }
    println!("  --search <text>          Case-insensitive search over the screen's text fields");
    println!("  --filter <field=value>   Exact-match filter; repeat to combine, `all` clears");
    println!("  --sort <field>           Sort key; repeat the same key to sort descending");
    println!("  --grid                   Render cards instead of a table");
    println!("  --page <n>               Page of students or teachers to load (from 1)");
    println!("  --set-status <id> <s>    Change an application's status (admissions)");
    println!("  --delete <id>            Delete a record; repeat to delete several at once");
    println!("  --yes                    Skip delete confirmation");
    println!("  --login <email> <pass>   Sign in and store the session");
    println!("  --logout                 Forget the stored session");
    println!("  --demo                   Use built-in sample data instead of the API");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and session, then exit");
    println!("  --verbose                Log requests and view changes to stderr");
    println!("  --help                   Show this help");
}
