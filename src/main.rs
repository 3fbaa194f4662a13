// src/main.rs

//! The command-line entry point: one session operation per invocation, with state carried
//! between invocations by the persisted session record.

use anyhow::{Result, anyhow};
use navgate::config::Config;
use navgate::core::acl::{Role, UserPatch};
use navgate::core::guard::Navigation;
use navgate::core::menu::{MenuNode, role_permissions};
use navgate::core::session::FileStorage;
use navgate::{LoginOutcome, NavShell};
use std::env;
use std::path::Path;
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::{filter::EnvFilter, prelude::*};

const USAGE: &str = "Usage: navgate [--config path] <command>

Commands:
  login <username> <secret> [from]   sign in, optionally resuming at <from>
  logout                             sign out
  whoami                             show the signed-in identity
  menu                               show the menu visible to the signed-in identity
  navigate <path>                    run the route guard for <path>
  permissions [role]                 show derived permission keys
  users                              list the identity catalog
  add-user <username> <secret> [role]
  enable <id> | disable <id>";

fn main() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let mut args: Vec<String> = env::args().skip(1).collect();

    if args.contains(&"--version".to_string()) {
        println!("NavGate version {VERSION}");
        return Ok(());
    }

    // Determine the configuration path. Without --config, use "navgate.toml" if present,
    // otherwise the built-in defaults.
    let config_flag = args.iter().position(|arg| arg == "--config");
    let config = match config_flag {
        Some(i) => {
            let Some(path) = args.get(i + 1).cloned() else {
                eprintln!("--config flag requires a value");
                std::process::exit(1);
            };
            args.drain(i..=i + 1);
            load_config(&path)
        }
        None if Path::new("navgate.toml").exists() => load_config("navgate.toml"),
        None => Config::default(),
    };

    // Get log level from env var or config.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::registry()
        .with(EnvFilter::new(log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .compact() // Use the compact, single-line format.
                .with_ansi(true) // Enable ANSI color codes for log levels.
                .with_writer(std::io::stderr),
        )
        .init();

    let mut shell = NavShell::from_config(&config)?;
    if let Err(e) = run_command(&mut shell, &args) {
        error!("Command failed: {}", e);
        return Err(e);
    }
    Ok(())
}

fn load_config(path: &str) -> Config {
    // The shell cannot run without a valid configuration.
    match Config::from_file(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from \"{path}\": {e:#}");
            std::process::exit(1);
        }
    }
}

fn run_command(shell: &mut NavShell<FileStorage>, args: &[String]) -> Result<()> {
    let arg = |i: usize| args.get(i).map(String::as_str);
    match arg(0) {
        Some("login") => {
            let (Some(username), Some(secret)) = (arg(1), arg(2)) else {
                return Err(anyhow!("login requires <username> <secret>"));
            };
            match shell.login(username, secret, arg(3))? {
                LoginOutcome::Accepted { destination } => {
                    println!("Signed in. Continue at {destination}");
                }
                LoginOutcome::Rejected => {
                    println!("Wrong username or secret, or the account is disabled.");
                }
            }
        }
        Some("logout") => {
            let login_path = shell.logout()?;
            println!("Signed out. Continue at {login_path}");
        }
        Some("whoami") => match shell.current() {
            Some(user) => println!(
                "{} ({}) role={} email={}",
                user.username, user.display_name, user.role, user.email
            ),
            None => println!("Not signed in."),
        },
        Some("menu") => {
            let menu = shell.menu();
            if menu.is_empty() {
                println!("(no menu: not signed in)");
            }
            print_menu(menu.nodes(), 0);
        }
        Some("navigate") => {
            let path = arg(1).ok_or_else(|| anyhow!("navigate requires <path>"))?;
            match shell.settle(path) {
                Navigation::Render { path } => println!("render {path}"),
                Navigation::Redirect { to, from, reason } => match from {
                    Some(from) => println!("redirect to {to} ({reason:?}, from {from})"),
                    None => println!("redirect to {to} ({reason:?})"),
                },
            }
        }
        Some("permissions") => match arg(1) {
            Some(name) => {
                let role = Role::from_str(name).map_err(|_| anyhow!("unknown role '{name}'"))?;
                println!("{}: {}", role, shell.permissions(role).join(", "));
            }
            None => {
                for (role, keys) in role_permissions(shell.full_menu()) {
                    println!("{:<12} {}", role.as_ref(), keys.join(", "));
                }
            }
        },
        Some("users") => {
            for user in shell.store().users() {
                println!(
                    "{:<38} {:<12} {:<12} {:<8} last_login={}",
                    user.id,
                    user.username,
                    user.role.as_ref(),
                    if user.active { "active" } else { "disabled" },
                    user.last_login
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
        }
        Some("add-user") => {
            let (Some(username), Some(secret)) = (arg(1), arg(2)) else {
                return Err(anyhow!("add-user requires <username> <secret>"));
            };
            let mut patch = UserPatch::new().username(username).password(secret);
            if let Some(name) = arg(3) {
                let role = Role::from_str(name).map_err(|_| anyhow!("unknown role '{name}'"))?;
                patch = patch.role(role);
            }
            let user = shell.store_mut().upsert_user(patch)?;
            println!("Created {} with id {}", user.username, user.id);
        }
        Some(cmd @ ("enable" | "disable")) => {
            let id = arg(1).ok_or_else(|| anyhow!("{cmd} requires <id>"))?;
            shell.store_mut().toggle_user_status(id, cmd == "enable")?;
            println!("{id} {cmd}d");
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
    Ok(())
}

fn print_menu(nodes: &[MenuNode], depth: usize) {
    for node in nodes {
        println!("{}{} {} [{}]", "  ".repeat(depth), node.label, node.path, node.key);
        print_menu(&node.children, depth + 1);
    }
}
