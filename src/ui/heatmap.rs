use chrono::Datelike;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Widget},
};

use crate::contributions::{bucket, weeks, ContributionDay};

const CELL: &str = "■";
/// Columns per week: the square plus a gap
const COLUMN_WIDTH: u16 = 2;

const LEVEL_COLORS: [Color; 5] = [
    Color::DarkGray,
    Color::Rgb(14, 68, 41),
    Color::Rgb(0, 109, 50),
    Color::Rgb(38, 166, 65),
    Color::Rgb(57, 211, 83),
];

pub fn level_color(level: u8) -> Color {
    LEVEL_COLORS[bucket(level) as usize]
}

/// Week columns, newest on the right; older weeks are cut when the area is narrow
pub fn render(days: &[ContributionDay], area: Rect, buf: &mut Buffer) {
    let active = days.iter().filter(|d| d.level > 0).count();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!("Contributions · {active} active days"),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    block.render(area, buf);

    let columns = weeks(days);
    let fits = (inner.width / COLUMN_WIDTH) as usize;
    let skip = columns.len().saturating_sub(fits);

    for (col, week) in columns.iter().skip(skip).enumerate() {
        let x = inner.x + col as u16 * COLUMN_WIDTH;
        for day in week {
            let row = day.date.weekday().num_days_from_sunday() as u16;
            if row >= inner.height {
                continue;
            }
            if let Some(cell) = buf.cell_mut((x, inner.y + row)) {
                cell.set_symbol(CELL);
                cell.set_style(Style::default().fg(level_color(day.level)));
            }
        }
    }
}
