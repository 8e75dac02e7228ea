use ratatui::layout::{ Constraint, Layout, Rect };

/// Stack rows of fixed height in the vertical middle of `area`
pub fn vertically_centered_layout(area: Rect, heights: &[u16]) -> Vec<Rect> {
  let offset: u16 = heights.iter().sum();
  let padding = area.height.saturating_sub(offset) / 2;

  let outer = Layout::vertical([
    Constraint::Length(padding),
    Constraint::Length(offset.min(area.height)),
    Constraint::Min(0),
  ])
  .split(area);

  Layout::vertical(heights.iter().map(|height| Constraint::Length(*height)))
    .split(outer[1])
    .to_vec()
}

/// `m:ss`, or `h:mm:ss` past the hour
pub fn format_ms(ms: u64) -> String {
  let total = ms / 1000;
  let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
  if hours > 0 {
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
  } else {
    format!("{}:{:02}", minutes, seconds)
  }
}
