use ratatui::{
  layout::Alignment,
  text::Text,
  widgets::Paragraph,
  Frame,
};

use crate::app::Link;
use crate::widget::{ logo, util::vertically_centered_layout };

pub fn draw(frame: &mut Frame, base_url: &str, link: Link) {
  let body = match link {
    Link::Connecting => format!("connecting to {}...", base_url),
    Link::Connected => format!("waiting for {}...", base_url),
    Link::Reconnecting => format!("lost {}, reconnecting...", base_url),
    Link::Ended => format!("{} is unreachable. press q to quit", base_url),
  };

  let rows = vertically_centered_layout(frame.area(), &[logo::height(), 1]);

  let logo_paragraph = Paragraph::new(logo::logo()).alignment(Alignment::Center);
  frame.render_widget(logo_paragraph, rows[0]);

  let body_paragraph = Paragraph::new(Text::from(body)).alignment(Alignment::Center);
  frame.render_widget(body_paragraph, rows[1]);
}
