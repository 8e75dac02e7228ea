use kalinka::{LifecycleHandlers, Metadata, SessionBuilder, SessionConfig, UrlResolver};
use std::time::Duration;

/// Print every state and volume change pushed by a Kalinka server
///
/// Usage: `cargo run --example state-monitor -- <host> <port>`, or set
/// `KALINKA_HOST` and `KALINKA_PORT`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let config = match (args.get(1), args.get(2)) {
        (Some(host), Some(port)) => SessionConfig::for_host(host, port.parse()?),
        _ => SessionConfig::from_env()?,
    };
    let urls = UrlResolver::new(&config.base_url)?;

    println!("Monitoring {} (Ctrl+C to quit)\n", config.base_url);

    let mut session = SessionBuilder::new(config)
        .with_state_handler(move |state| {
            let title = state
                .current_track
                .as_ref()
                .map(|track| {
                    let metadata = Metadata::from_track(track);
                    let artwork = metadata
                        .artwork
                        .as_deref()
                        .map(|path| urls.abs(path))
                        .unwrap_or_else(|| "-".to_string());
                    format!("{} - {} [{}]", metadata.artist, metadata.title, artwork)
                })
                .unwrap_or_else(|| "(no track)".to_string());
            println!(
                "{:<10} #{:<3} {:>8.1}s  {}",
                format!("{:?}", state.state),
                state.index,
                Duration::from_millis(state.position).as_secs_f64(),
                title
            );
        })
        .with_volume_handler(|volume| println!("volume     {}", volume))
        .with_playback_mode_handler(|mode| println!("mode       {:?}", mode))
        .with_lifecycle_handlers(
            LifecycleHandlers::new()
                .with_connected(|| println!("-- connected"))
                .with_disconnected(|| println!("-- disconnected"))
                .with_stopped(|| println!("-- session ended")),
        )
        .start()?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = session.wait() => {}
    }
    session.stop().await;
    Ok(())
}
