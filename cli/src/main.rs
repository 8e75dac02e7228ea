mod app;
mod view;
mod widget;

use std::fs::File;
use std::io;

use kalinka::SessionConfig;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use app::App;

const LOG_FILE: &str = "kalinka-cli.log";

fn main() -> io::Result<()> {
  init_logging();

  let config = match config_from_args() {
    Ok(config) => config,
    Err(message) => {
      eprintln!("{}", message);
      eprintln!("usage: cli <host> <port>   (or set KALINKA_HOST and KALINKA_PORT)");
      std::process::exit(2);
    }
  };

  let runtime = tokio::runtime::Runtime::new()?;
  let mut app = {
    let _guard = runtime.enter();
    App::connect(config).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
  };

  let mut terminal = ratatui::init();
  let app_result = app.run(&mut terminal);
  ratatui::restore();

  runtime.block_on(app.shutdown());
  app_result
}

fn config_from_args() -> Result<SessionConfig, String> {
  let args: Vec<String> = std::env::args().skip(1).collect();
  match args.as_slice() {
    [host, port] => {
      let port = port
        .parse::<u16>()
        .map_err(|e| format!("invalid port '{}': {}", port, e))?;
      let config = SessionConfig::for_host(host, port);
      config.validate()?;
      Ok(config)
    }
    [] => SessionConfig::from_env(),
    _ => Err("expected a host and a port".to_string()),
  }
}

// The terminal belongs to the UI, so logs go to a file
fn init_logging() {
  let config = ConfigBuilder::new()
    .add_filter_allow_str("kalinka")
    .add_filter_allow_str("cli")
    .build();
  if let Ok(file) = File::create(LOG_FILE) {
    let _ = WriteLogger::init(LevelFilter::Debug, config, file);
  }
}
