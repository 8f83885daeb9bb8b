pub mod heatmap;
pub mod overlay;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use webbrowser::Browser;

use crate::app::App;
use crate::typing::TypingState;

const HORIZONTAL_MARGIN: u16 = 2;
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 20;
const KONAMI_HINT: &str = "Try the Konami Code: ↑↑↓↓←→←→BA";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            Paragraph::new(Span::styled(
                "Terminal too small - resize to see the zone",
                Style::default().fg(Color::Yellow),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(5), // stat cards
                Constraint::Length(9), // heatmap
                Constraint::Min(7),    // typing test
                Constraint::Length(2), // footer
            ])
            .split(area);

        render_header(self, chunks[0], buf);
        render_cards(self, chunks[1], buf);
        heatmap::render(&self.contributions, chunks[2], buf);
        render_typing(self, chunks[3], buf);
        render_footer(self, chunks[4], buf);

        if self.detector.is_triggered() {
            overlay::render(&self.celebration, area, buf);
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn card(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, bold()))
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let header = Line::from(vec![
        Span::styled(app.profile.value.display_name.clone(), bold().fg(Color::Cyan)),
        Span::styled("  ·  interactive zone", Style::default().add_modifier(Modifier::DIM)),
    ]);
    Paragraph::new(header).render(area, buf);
}

fn render_cards(app: &App, area: Rect, buf: &mut Buffer) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let visitors = match app.visitors {
        Some(count) => vec![
            Line::from(Span::styled(count.to_string(), bold().fg(Color::Green))),
            Line::from("people stopped by"),
        ],
        None => vec![Line::from(Span::styled(
            "counting…",
            Style::default().add_modifier(Modifier::DIM),
        ))],
    };
    Paragraph::new(visitors)
        .alignment(Alignment::Center)
        .block(card("Visitors".to_string()))
        .render(cols[0], buf);

    let stats = &app.profile.value;
    let source = if app.profile_loading {
        "loading".to_string()
    } else {
        app.profile.source.to_string()
    };
    let lines = vec![
        stat_line("Repos", stats.repo_count),
        stat_line("Followers", stats.follower_count),
        stat_line("Stars", stats.star_count),
    ];
    Paragraph::new(lines)
        .block(card(format!("@{} · {source}", stats.handle)))
        .render(cols[1], buf);

    let xp = app.xp();
    Gauge::default()
        .block(card(format!("Level {}", xp.level)))
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .percent(xp.progress as u16)
        .label(format!("{}%", xp.progress))
        .render(cols[2], buf);
}

fn stat_line(label: &'static str, value: u64) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{label:<10}")),
        Span::styled(value.to_string(), bold()),
    ])
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let typing = &app.typing;
    let dim = Style::default().add_modifier(Modifier::DIM);
    let green = bold().fg(Color::Green);
    let red = bold().fg(Color::Red);

    let typed: Vec<char> = typing.typed.chars().collect();
    let mut spans = Vec::with_capacity(typing.reference.len() + 1);
    for (i, expected) in typing.reference.chars().enumerate() {
        let span = match typed.get(i) {
            Some(&got) if got == expected => Span::styled(expected.to_string(), green),
            Some(&got) => Span::styled(
                match got {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red,
            ),
            None if i == typed.len() && typing.is_active() => Span::styled(
                expected.to_string(),
                dim.add_modifier(Modifier::UNDERLINED),
            ),
            None => Span::styled(expected.to_string(), dim),
        };
        spans.push(span);
    }
    let overflow: String = typed.iter().skip(typing.reference.chars().count()).collect();
    if !overflow.is_empty() {
        spans.push(Span::styled(overflow, red));
    }

    let status = Line::from(vec![
        Span::styled(format!("{}s", typing.remaining_secs), bold().fg(Color::Yellow)),
        Span::raw(format!(
            "  ·  {} wpm  ·  {}% accuracy  ·  {}% done",
            typing.wpm,
            typing.accuracy,
            typing.progress_percent()
        )),
    ]);

    let hint = match typing.state() {
        TypingState::Inactive => "(s)tart",
        TypingState::Active => "type the sentence · (esc) stop",
        TypingState::Finished => "(s) try again",
    };
    let mut footer = vec![Span::styled(hint, Style::default().add_modifier(Modifier::ITALIC))];
    let history = &app.history;
    if let (Some(last), Some(best), Some(avg)) =
        (history.last(), history.best(), history.average())
    {
        let attempts = match history.attempts() {
            1 => "1 attempt".to_owned(),
            n => format!("{n} attempts"),
        };
        footer.push(Span::styled(
            format!("  ·  last {last} · best {best} · avg {avg:.0} wpm over {attempts}"),
            dim,
        ));
    }

    let text = vec![
        Line::from(spans),
        Line::default(),
        status,
        Line::from(footer),
    ];

    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(card(format!("Typing Test · {}", typing.state())))
        .render(area, buf);
}

fn render_footer(app: &App, area: Rect, buf: &mut Buffer) {
    let mut links: Vec<Span> = app
        .config
        .social_links
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, link)| Span::raw(format!("({}) {}  ", i + 1, link.label)))
        .collect();
    if Browser::is_available() {
        links.push(Span::raw("(g) profile  "));
    }
    links.push(Span::raw("(q)uit"));

    let lines = vec![
        Line::from(links),
        Line::from(Span::styled(
            KONAMI_HINT,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}
