//! CLI smoke entry point.
//!
//! # Responsibility
//! - Resolve the configured backend the same way an application would.
//! - Run one create/patch/delete round trip and print each result.

use log::error;
use std::error::Error;
use std::process::ExitCode;
use userstore_core::{
    core_version, init_logging, Settings, UserCreate, UserRepositoryFactory, UserUpdate,
};

fn main() -> ExitCode {
    // Missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("userstore: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;
    init_logging(&settings.log_level, settings.log_dir.as_deref())?;

    let mut factory = UserRepositoryFactory::resolve(&settings)?;
    println!("userstore version={} backend={}", core_version(), factory.kind());

    factory.with_repository(|repo| {
        let created = repo.create(&UserCreate::new("A", "B", "ab", "a@b.c"))?;
        println!("create -> {created:?}");

        let patched = repo.patch(
            created.id,
            &UserUpdate {
                username: Some("ab2".to_string()),
                ..UserUpdate::default()
            },
        )?;
        println!("patch  -> {patched:?}");

        println!("list   -> {} user(s)", repo.list()?.len());
        println!("delete -> {}", repo.delete(created.id)?);
        println!("get    -> {:?}", repo.get(created.id)?);
        println!("delete -> {}", repo.delete(created.id)?);
        Ok(())
    })?;

    Ok(())
}
