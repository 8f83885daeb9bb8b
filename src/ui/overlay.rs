use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::celebration::Celebration;
use crate::util::centered_offset;

const POPUP_WIDTH: u16 = 40;
const POPUP_HEIGHT: u16 = 7;

const COLORS: [Color; 7] = [
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::Green,
    Color::Red,
    Color::Blue,
    Color::LightYellow,
];

/// Easter egg popup with the celebration particles drawn over everything
pub fn render(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(POPUP_WIDTH, POPUP_HEIGHT, area);
    Clear.render(popup, buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    block.render(popup, buf);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    Paragraph::new(vec![
        Line::default(),
        Line::from(Span::styled("Easter Egg Found!", bold.fg(Color::Yellow))),
        Line::from("You found the secret code!"),
    ])
    .alignment(Alignment::Center)
    .render(inner, buf);

    if inner.height > 4 {
        let banner = celebration.banner;
        let x = inner.x + centered_offset(banner, inner.width);
        buf.set_string(x, inner.y + 4, banner, bold.fg(Color::Magenta));
    }

    render_particles(celebration, area, buf);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_particles(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    for particle in &celebration.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let x = particle.x as u16;
        let y = particle.y as u16;
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = COLORS[particle.color_index % COLORS.len()];
        let alpha = 1.0 - (particle.age / particle.max_age);
        let style = if particle.is_letter() || alpha > 0.7 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if alpha > 0.3 {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}
