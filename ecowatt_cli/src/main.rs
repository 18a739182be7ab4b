//! # EcoWatt CLI Application
//!
//! Line-oriented shell over the cable sizing engine. Every command that
//! changes a field recomputes the result and prints it. The session picks
//! up the active project's cable inputs and a fresh load audit hand-off on
//! start, and `save` writes back into the shared project store.
//!
//! Logs go to stderr (`RUST_LOG` or `log_filter` in `ecowatt.toml`), so
//! stdout carries only results.

mod config;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ecowatt_core::bridge::{HandoffStatus, SystemClock};
use ecowatt_core::calculations::cable::InputMode;
use ecowatt_core::project::ProjectManager;
use ecowatt_core::session::{CableField, CableSession};
use ecowatt_core::store::FileStore;
use ecowatt_core::tables::{ConductorMaterial, StandardCatalog};

use config::CliConfig;

type Manager = ProjectManager<FileStore, SystemClock>;

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_filter);
    let freshness = match config.freshness_policy() {
        Ok(policy) => policy,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "invalid hand-off window");
            return ExitCode::FAILURE;
        }
    };

    let store = match FileStore::open(&config.store_path, config.user_id.clone()) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "cannot open project store");
            return ExitCode::FAILURE;
        }
    };
    let mut manager = ProjectManager::new(store, SystemClock);
    let mut session = CableSession::new(StandardCatalog::reference());

    match session.restore_from_project(&manager) {
        Ok(true) => println!("Restored cable inputs from the active project."),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "ignoring unreadable cable payload"),
    }

    match freshness.read(manager.store(), manager.clock()) {
        Ok(status @ HandoffStatus::Accepted(_)) => {
            if session.import_handoff(status) {
                println!("Load power prefilled from the load audit.");
            }
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "cannot read audit hand-off"),
    }

    println!("EcoWatt CLI - Cable & Protection Sizing");
    println!("=======================================");
    println!("Type 'help' for commands.");
    println!();
    print_result(&session);

    let stdin = io::stdin();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        match run_command(line.trim(), &mut session, &mut manager) {
            Flow::Continue => {}
            Flow::Quit => break,
        }
    }

    info!("session ended");
    ExitCode::SUCCESS
}

enum Flow {
    Continue,
    Quit,
}

fn run_command(line: &str, session: &mut CableSession, manager: &mut Manager) -> Flow {
    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (line, ""),
    };

    match command.to_lowercase().as_str() {
        "" => {}
        "help" | "?" => print_help(),
        "quit" | "exit" | "q" => return Flow::Quit,
        "show" => print_result(session),
        "json" => match serde_json::to_string_pretty(session.outcome()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: {}", e),
        },
        "mode" => match InputMode::from_str_flexible(argument) {
            Ok(mode) => {
                session.set_mode(mode);
                print_result(session);
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        "material" | "mat" => match ConductorMaterial::from_str_flexible(argument) {
            Ok(material) => {
                session.set_material(material);
                print_result(session);
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        "save" => save(session, manager),
        "new" => match manager.start_project(argument) {
            Ok(project) => println!("Started project \"{}\" (id {}).", project.name, project.id),
            Err(e) => eprintln!("Error: {}", e),
        },
        "projects" => list_projects(manager),
        "load" => match argument.parse::<i64>() {
            Ok(id) => load(id, session, manager),
            Err(_) => eprintln!("Error: expected a project id"),
        },
        other => match CableField::from_str_flexible(other) {
            Ok(field) => {
                session.set_field(field, argument);
                print_result(session);
            }
            Err(_) => eprintln!("Unknown command '{}'. Type 'help' for commands.", other),
        },
    }
    Flow::Continue
}

fn save(session: &CableSession, manager: &mut Manager) {
    let saved = session.save_to_project(manager).and_then(|_| manager.save_active());
    match saved {
        Ok(project) => println!("Project \"{}\" saved.", project.name),
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_recoverable() {
                eprintln!("The store is in use; try again in a moment.");
            }
        }
    }
}

fn load(id: i64, session: &mut CableSession, manager: &mut Manager) {
    match manager.load_project(id) {
        Ok(project) => {
            println!("Loaded project \"{}\".", project.name);
            match session.restore_from_project(manager) {
                Ok(true) => print_result(session),
                Ok(false) => println!("(no cable inputs saved in this project)"),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn list_projects(manager: &Manager) {
    match manager.all_projects() {
        Ok(projects) if projects.is_empty() => println!("No saved projects."),
        Ok(projects) => {
            for project in projects {
                println!(
                    "  {}  {:<30} {}",
                    project.id,
                    project.name,
                    project.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn print_result(session: &CableSession) {
    let fields = session.fields();
    let display = session.display();
    let badge = session
        .value_source()
        .badge()
        .map(|b| format!(" {}", b))
        .unwrap_or_default();

    println!("Input:");
    println!("  Voltage:   {} V", fields.voltage);
    println!("  Load:      {} {}{}", fields.value, fields.mode.unit(), badge);
    println!("  Distance:  {} m (one way)", fields.distance);
    println!("  Drop:      {} %", fields.drop_percent);
    println!("  Material:  {}", fields.material);
    println!();
    println!("  Cable:     {}", display.cable_size);
    if !display.criteria.is_empty() {
        println!("             {}", display.criteria);
    }
    println!("  Device:    {}", display.fuse);
    if let Some(result) = session.outcome().result() {
        if !result.device.standard {
            println!("             (above the standard range, rounded up)");
        }
    }
    println!("  Loss:      {}", display.loss_or_placeholder());
    if let Some(sentence) = &display.loss_comparison {
        println!("             {}", sentence);
    }
    if let Some(e) = session.error() {
        println!("  Error:     {}", e);
    }
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  voltage <V>        system voltage");
    println!("  value <W|A>        load power or current");
    println!("  mode watts|amps    what the value means");
    println!("  distance <m>       one-way cable length");
    println!("  drop <%>           allowed voltage drop");
    println!("  material cu|al     conductor material");
    println!("  show               print the result");
    println!("  json               print the full result as JSON");
    println!("  new <name>         start a new project");
    println!("  save               save cable inputs into the active project");
    println!("  projects           list saved projects");
    println!("  load <id>          open a saved project");
    println!("  quit               leave");
}
