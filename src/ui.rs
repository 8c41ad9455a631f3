pub mod playfield;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use tapthru::{SessionSnapshot, Status};

use crate::{
    ui::playfield::{label, Projection},
    App,
};

const HORIZONTAL_MARGIN: u16 = 2;
const ORANGE: Color = Color::Rgb(255, 165, 0);

/// Splits the screen into status line, stats line, legend and playfield
pub fn layout(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // status
            Constraint::Length(1), // points / time / auto play
            Constraint::Length(1), // legend
            Constraint::Min(3),    // playfield
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

fn playfield_block() -> Block<'static> {
    Block::default().borders(Borders::ALL).title("Playfield")
}

/// Cell area points are drawn into for a screen of size `area`
pub fn playfield_inner(area: Rect) -> Rect {
    playfield_block().inner(layout(area)[3])
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.controller.snapshot();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let [status_area, stats_area, legend_area, field_area] = layout(area);

        let status_style = match snapshot.status {
            Status::Won => bold_style.fg(Color::Green),
            Status::Lost => bold_style.fg(Color::Red),
            Status::Ready | Status::Running => bold_style,
        };
        Paragraph::new(Span::styled(snapshot.status.to_string(), status_style))
            .render(status_area, buf);

        // outside a round the line shows the amount the next round will use
        let amount = match snapshot.status {
            Status::Running => snapshot.amount,
            Status::Ready | Status::Won | Status::Lost => self.config.points,
        };
        let stats = Line::from(vec![
            Span::raw("Points: "),
            Span::styled(amount.to_string(), bold_style),
            Span::raw("   Time: "),
            Span::styled(format!("{:.1}s", snapshot.elapsed_secs()), bold_style),
            Span::raw("   Next: "),
            Span::styled(next_label(&snapshot), bold_style),
            Span::raw("   Auto Play: "),
            Span::styled(
                if snapshot.auto_play_enabled { "ON" } else { "OFF" },
                bold_style,
            ),
        ]);
        Paragraph::new(stats).render(stats_area, buf);

        let legend = match snapshot.status {
            Status::Ready => "(s)tart / (+/-) points / (esc)ape",
            Status::Running => "click the points in order / (r)estart / (a)uto play / (esc)ape",
            Status::Won | Status::Lost => "(r)estart / (+/-) points / (esc)ape",
        };
        Paragraph::new(Span::styled(legend, italic_style))
            .alignment(Alignment::Left)
            .render(legend_area, buf);

        let block = playfield_block();
        let inner = block.inner(field_area);
        block.render(field_area, buf);
        let projection = Projection::new(inner, self.controller.bounds());
        render_points(&snapshot, projection, inner, buf);
    }
}

fn next_label(snapshot: &SessionSnapshot) -> String {
    if snapshot.status == Status::Ready || snapshot.next_expected > snapshot.amount {
        "-".to_string()
    } else {
        snapshot.next_expected.to_string()
    }
}

fn render_points(
    snapshot: &SessionSnapshot,
    projection: Projection,
    inner: Rect,
    buf: &mut Buffer,
) {
    if inner.is_empty() {
        return;
    }
    // highest number first so lower numbers end up on top
    for point in snapshot.points.iter().rev() {
        let (col, row) = projection.to_cell(point.location);
        let style = if point.clicked {
            let style = Style::default().fg(Color::White).bg(ORANGE);
            if point.opacity < 50 {
                style.add_modifier(Modifier::DIM)
            } else {
                style
            }
        } else {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        };
        buf.set_string(col, row, label(point.number), style);

        if point.clicked && row + 1 < inner.bottom() {
            let remaining = format!("{:.2}s", point.remaining_decay as f64 / 100.0);
            buf.set_string(col, row + 1, remaining, Style::default().fg(ORANGE));
        }
    }
}
