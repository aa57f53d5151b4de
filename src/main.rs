mod api;
mod cli;
mod config;
mod core;
mod prelude;
mod render;

use std::io::{self, Write as _};

use clap::Parser;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{ApiError, Session, Sunrun},
    cli::{Args, Command, DebugCommand},
    config::Config,
    prelude::*,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::read_from(&args.config)?;

    match args.command {
        Command::Login(login_args) => {
            let phone = login_args
                .phone
                .or_else(|| config.phone.clone())
                .context("no phone number: pass `--phone` or set `SUNPOLL_PHONE`")?;
            ensure!(config::validate_phone(&phone), "not a US phone number: `{phone}`");
            let phone = config::format_phone(&phone);

            let mut api = Sunrun::try_new(Session::default())?;
            let challenge = match api.request_challenge(&phone).await {
                Ok(challenge) => challenge,
                Err(ApiError::Network(error)) => {
                    bail!("cannot reach the Sunrun gateway: {error}")
                }
                Err(error) => bail!("failed to request a passcode: {error}"),
            };
            let verified = loop {
                let code = prompt("Passcode from SMS: ")?;
                match api.verify_challenge(&challenge, &phone, code.trim()).await {
                    Ok(verified) => break verified,
                    Err(ApiError::Auth(error)) => {
                        error!(%error, "Passcode rejected, try again");
                    }
                    Err(ApiError::Network(error)) => {
                        bail!("cannot reach the Sunrun gateway: {error}")
                    }
                    Err(error) => bail!("unexpected gateway failure: {error}"),
                }
            };
            Config {
                phone: Some(phone),
                access_token: Some(verified.access_token),
                prospect_id: Some(verified.prospect_id),
                pto_date: verified.pto_date,
            }
            .write_to(&args.config)?;
            info!(path = %args.config.display(), "Credentials stored");
            Ok(())
        }

        Command::Snapshot => {
            let api = try_new_authenticated(&config)?;
            println!("{}", render::render_snapshot(&api.get_latest_data().await?));
            Ok(())
        }

        Command::Poll(poll_args) => {
            let api = try_new_authenticated(&config)?;
            let mut interval = time::interval(Duration::from_secs(poll_args.interval_secs));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match api.get_latest_data().await {
                    Ok(snapshot) => println!("{}", render::render_snapshot(&snapshot)),
                    Err(ApiError::Auth(error)) => {
                        // One-time passcodes need a human, so no silent re-auth.
                        bail!("session expired ({error}): run `sunpoll login` and poll again")
                    }
                    Err(error) => {
                        warn!(%error, "Poll failed, previously shown data stays current");
                    }
                }
            }
        }

        Command::Check => {
            let api = try_new_authenticated(&config)?;
            if api.test_connection().await {
                info!("Credentials accepted");
                Ok(())
            } else {
                bail!("credentials rejected: run `sunpoll login`")
            }
        }

        Command::Debug(debug_args) => {
            let api = try_new_authenticated(&config)?;
            match debug_args.command {
                DebugCommand::Cumulative => {
                    for record in api.get_cumulative_production(None, None).await? {
                        info!(?record, "Daily record");
                    }
                }
                DebugCommand::Minute => {
                    for point in api.get_site_production_minute(None, None).await? {
                        info!(?point, "Telemetry point");
                    }
                }
                DebugCommand::Offerings => {
                    let profile = api.get_product_offerings().await?;
                    info!(?profile, "Product offerings");
                }
            }
            Ok(())
        }
    }
}

fn try_new_authenticated(config: &Config) -> Result<Sunrun> {
    let session = Session::new(config.access_token.clone(), config.prospect_id.clone());
    ensure!(
        session.access_token().is_some() && session.prospect_id().is_some(),
        "not logged in yet: run `sunpoll login` first",
    );
    Sunrun::try_new(session)
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
