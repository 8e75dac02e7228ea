use ratatui::{
  layout::{ Alignment, Constraint, Layout, Rect },
  style::{ Color, Modifier, Style },
  text::{ Line, Span },
  widgets::{ Gauge, LineGauge, Paragraph },
  Frame,
};

use kalinka::{ Metadata, PlayState };

use crate::app::{ App, Link };
use crate::widget::{ logo, util::{ format_ms, vertically_centered_layout } };

const WIDTH: u16 = 60;
const HELP: &str = "space play/pause  n/p skip  ←/→ seek  +/- volume  s stop  q quit";

pub fn draw(frame: &mut Frame, app: &App) {
  let area = centered_column(frame.area(), WIDTH);
  let rows = vertically_centered_layout(area, &[logo::height(), 2, 1, 1, 1, 1, 1, 1, 1]);

  frame.render_widget(Paragraph::new(logo::logo()).alignment(Alignment::Center), rows[0]);

  let metadata = app.state.current_track.as_ref().map(Metadata::from_track);
  let (title, subtitle) = match &metadata {
    Some(metadata) => (
      metadata.title.clone(),
      format!("{} · {}", metadata.artist, metadata.album),
    ),
    None => ("Nothing queued".to_string(), String::new()),
  };
  let track = Paragraph::new(vec![
    Line::styled(title, Style::default().add_modifier(Modifier::BOLD)),
    Line::raw(subtitle),
  ])
  .alignment(Alignment::Center);
  frame.render_widget(track, rows[1]);

  frame.render_widget(Paragraph::new(status_line(app)).alignment(Alignment::Center), rows[3]);

  let duration = app.state.duration_ms();
  let ratio = duration
    .filter(|d| *d > 0)
    .map(|d| app.state.position as f64 / d as f64)
    .unwrap_or(0.0)
    .clamp(0.0, 1.0);
  let label = match duration {
    Some(d) => format!("{} / {}", format_ms(app.state.position), format_ms(d)),
    None => format_ms(app.state.position),
  };
  let progress = Gauge::default()
    .gauge_style(Style::default().fg(Color::Cyan))
    .ratio(ratio)
    .label(label);
  frame.render_widget(progress, rows[4]);

  frame.render_widget(volume_gauge(app), rows[6]);

  let help = Paragraph::new(Line::styled(HELP, Style::default().fg(Color::DarkGray)))
    .alignment(Alignment::Center);
  frame.render_widget(help, rows[8]);
}

fn status_line(app: &App) -> Line<'static> {
  let (symbol, label) = match app.state.state {
    PlayState::Playing => ("▶", "Playing"),
    PlayState::Paused => ("⏸", "Paused"),
    PlayState::Stopped => ("■", "Stopped"),
    PlayState::Buffering => ("…", "Buffering"),
    PlayState::Error => ("!", "Error"),
    PlayState::SkipNext => ("⏭", "Skipping"),
    PlayState::SkipPrev => ("⏮", "Skipping"),
    PlayState::Seeking => ("↔", "Seeking"),
  };

  let label_style = if app.state.state.is_transitional() {
    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
  } else {
    Style::default().fg(Color::Yellow)
  };

  let mut spans = vec![
    Span::styled(format!("{} {}", symbol, label), label_style),
    Span::raw(format!("  track {}", app.state.index + 1)),
  ];
  if app.mode.shuffle {
    spans.push(Span::raw("  shuffle"));
  }
  if app.mode.repeat_one {
    spans.push(Span::raw("  repeat one"));
  } else if app.mode.repeat_all {
    spans.push(Span::raw("  repeat all"));
  }
  if app.link == Link::Reconnecting {
    spans.push(Span::styled("  reconnecting", Style::default().fg(Color::Red)));
  }
  Line::from(spans)
}

fn volume_gauge(app: &App) -> LineGauge<'static> {
  let (ratio, label) = match app.volume {
    Some(volume) => ((volume as f64 / 100.0).clamp(0.0, 1.0), format!("volume {:>3}", volume)),
    None => (0.0, "volume  --".to_string()),
  };
  LineGauge::default()
    .filled_style(Style::default().fg(Color::Green))
    .ratio(ratio)
    .label(label)
}

fn centered_column(area: Rect, width: u16) -> Rect {
  let [_, column, _] = Layout::horizontal([
    Constraint::Min(0),
    Constraint::Length(width.min(area.width)),
    Constraint::Min(0),
  ])
  .areas(area);
  column
}
