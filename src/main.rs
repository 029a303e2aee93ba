use std::{sync::Arc, time::Duration};

use anyhow::Context;
use centurion::{
    appsettings::AppSettings,
    audio::{AlarmPlayback, TerminalToneSink},
    console::{self, Command},
    scheduling::{Clock, SystemClock, spawn_ticker},
    session::Session,
    sponsored,
    storage::{JsonFileStore, ProfileStorage, spawn_persistence_worker},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::load().context("Failed to load settings")?;

    let store = Arc::new(
        JsonFileStore::open(&settings.storage.data_dir)
            .await
            .context("Failed to open storage directory")?,
    );
    let profile = ProfileStorage::new(store.clone()).load_profile().await;
    let persistence = spawn_persistence_worker(store, Duration::from_millis(settings.storage.debounce_ms));

    let player = Arc::new(AlarmPlayback::new(
        Arc::new(TerminalToneSink::new(settings.alarm.terminal_bell)),
        Duration::from_millis(settings.alarm.duration_ms),
        Duration::from_millis(settings.alarm.loop_interval_ms),
    ));
    let mut session = Session::new(profile, player, persistence.clone(), &settings);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cancellation_token = CancellationToken::new();
    let mut ticks = spawn_ticker(
        Arc::clone(&clock),
        Duration::from_millis(settings.ticker.interval_ms),
        cancellation_token.clone(),
    );
    let mut pool = if settings.sponsored.enabled {
        sponsored::spawn_pool_refresher(
            sponsored::select_source(&settings.sponsored),
            settings.sponsored.pool_size,
            Duration::from_millis(settings.sponsored.initial_delay_ms),
            Duration::from_secs(settings.sponsored.refresh_secs),
            cancellation_token.clone(),
        )
    } else {
        watch::channel(Vec::new()).1
    };
    let mut pool_open = settings.sponsored.enabled;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    if session.birth_date().is_none() {
        println!("{}", console::render_progress(None, session.navigator().current()));
    }
    println!("Type `help` for commands.");

    loop {
        tokio::select! {
            Some(tick) = ticks.recv() => {
                let report = session.on_tick(tick);
                for fired in &report.fired {
                    println!("{}", console::render_fired(fired));
                }
            }
            changed = pool.changed(), if pool_open => {
                if changed.is_err() {
                    pool_open = false;
                    continue;
                }
                let items = pool.borrow_and_update().clone();
                let items = sponsored::or_placeholders(items, settings.sponsored.pool_size, session.language());
                session.replace_sponsored_pool(items);
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match line.parse::<Command>() {
                        Ok(Command::Quit) => break,
                        Ok(command) => println!(
                            "{}",
                            console::execute(&mut session, command, clock.as_ref(), settings.sponsored.pool_size)
                        ),
                        Err(error) => println!("{}", error),
                    },
                    Ok(None) => {
                        log::info!("Console input closed");
                        stdin_open = false;
                    }
                    Err(error) => {
                        log::warn!("Failed to read console input. [error = {}]", error);
                        stdin_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted");
                break;
            }
        }
    }

    cancellation_token.cancel();
    session.dismiss_alarm();
    persistence.flush().await;
    log::info!("Shut down cleanly");

    Ok(())
}
