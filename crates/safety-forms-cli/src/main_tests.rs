// crates/safety-forms-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and store seeding commands.
// Purpose: Ensure commands parse as documented and user seeding persists.
// Dependencies: safety-forms-cli main helpers
// ============================================================================

//! ## Overview
//! Parses representative command lines and runs `config validate` and
//! `user add` against temporary config files.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use safety_forms_config::LogLevel;
use safety_forms_config::SafetyFormsConfig;
use safety_forms_core::FormService;
use safety_forms_server::build_form_store;
use tempfile::TempDir;
use tracing::Level;

use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::ConfigValidateCommand;
use super::UserAddCommand;
use super::UserCommand;
use super::command_config_validate;
use super::command_user_add;
use super::tracing_level;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn write_config(dir: &Path, db: &Path) -> PathBuf {
    let path = dir.join("safety-forms.toml");
    let body = format!("[store]\ntype = \"sqlite\"\npath = {:?}\n", db.display().to_string());
    fs::write(&path, body).unwrap();
    path
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn serve_accepts_config_and_bind_overrides() {
    let cli = Cli::try_parse_from([
        "safety-forms",
        "serve",
        "--config",
        "forms.toml",
        "--bind",
        "0.0.0.0:8080",
    ])
    .unwrap();
    let Commands::Serve(command) = cli.command else {
        panic!("expected serve command");
    };
    assert_eq!(command.config, Some(PathBuf::from("forms.toml")));
    assert_eq!(command.bind.as_deref(), Some("0.0.0.0:8080"));
}

#[test]
fn user_add_requires_all_fields() {
    let missing = Cli::try_parse_from(["safety-forms", "user", "add", "--nombre", "ana"]);
    assert!(missing.is_err());

    let cli = Cli::try_parse_from([
        "safety-forms",
        "user",
        "add",
        "--nombre",
        "ana",
        "--password",
        "secreta",
        "--rol",
        "admin",
    ])
    .unwrap();
    let Commands::User {
        command: UserCommand::Add(command),
    } = cli.command
    else {
        panic!("expected user add command");
    };
    assert_eq!(command.nombre, "ana");
    assert_eq!(command.rol, "admin");
    assert!(command.config.is_none());
}

#[test]
fn config_validate_parses() {
    let cli = Cli::try_parse_from(["safety-forms", "config", "validate"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommand::Validate(_)
        }
    ));
}

#[test]
fn log_levels_map_to_tracing_levels() {
    assert_eq!(tracing_level(LogLevel::Trace), Level::TRACE);
    assert_eq!(tracing_level(LogLevel::Info), Level::INFO);
    assert_eq!(tracing_level(LogLevel::Error), Level::ERROR);
}

// ============================================================================
// SECTION: Commands
// ============================================================================

#[test]
fn config_validate_reports_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[server]\nbind = \"nowhere\"\n").unwrap();
    let err = command_config_validate(&ConfigValidateCommand {
        config: Some(path),
    })
    .unwrap_err();
    assert!(err.to_string().contains("config load failed"));
}

#[test]
fn user_add_persists_user_for_login() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("forms.db");
    let config_path = write_config(dir.path(), &db);
    command_user_add(&UserAddCommand {
        nombre: "ana".to_string(),
        password: "secreta".to_string(),
        rol: "admin".to_string(),
        config: Some(config_path.clone()),
    })
    .unwrap();

    let config = SafetyFormsConfig::load(Some(&config_path)).unwrap();
    let service = FormService::new(build_form_store(&config.store).unwrap());
    let user = service.login(Some("ana"), Some("secreta")).unwrap();
    assert_eq!(user.rol, "admin");
}

#[test]
fn user_add_rejects_blank_password() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), &dir.path().join("forms.db"));
    let err = command_user_add(&UserAddCommand {
        nombre: "ana".to_string(),
        password: "  ".to_string(),
        rol: "admin".to_string(),
        config: Some(config_path),
    })
    .unwrap_err();
    assert!(err.to_string().contains("failed to add user"));
}
