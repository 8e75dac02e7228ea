use ratatui::text::{ Line, Text };

const LOGO: [&str; 5] = [
  "█▄▀ ▄▀█ █   █ █▄ █ █▄▀ ▄▀█",
  "█ █ █▀█ █▄▄ █ █ ▀█ █ █ █▀█",
  "",
  "remote control",
  "",
];

pub fn logo() -> Text<'static> {
  Text::from(LOGO.iter().map(|line| Line::raw(*line)).collect::<Vec<_>>())
}

pub fn height() -> u16 {
  LOGO.len() as u16
}
