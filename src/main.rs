use std::{env, error::Error, path::PathBuf, sync::Arc};

use pandora::{config::PandoraConfig, logging::PandoraLogger, server::Server};
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();
    #[cfg(debug_assertions)]
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .init();
    #[cfg(not(debug_assertions))]
    env_logger::init();

    let config_file = match dotenvy::var("PANDORA_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => env::current_dir()?.join("settings.toml"),
    };
    let config = PandoraConfig::load_or_init(&config_file)?;

    let (stop, _) = broadcast::channel(1);
    let server = Server::bind(config, Arc::new(PandoraLogger)).await?;
    let stopped = stop.subscribe();
    let task = tokio::spawn(async move {
        if let Err(e) = server.run(stopped).await {
            log::error!("{e}");
        }
    });

    {
        use futures::future::{select_all, FutureExt};
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        let sigint_fut = sigint.recv().boxed();
        let sigterm_fut = sigterm.recv().boxed();

        let _ = select_all([sigint_fut, sigterm_fut]).await;
        log::info!("Received signal, stopping...");
        stop.send(())?;
    }
    task.await?;
    Ok(())
}
