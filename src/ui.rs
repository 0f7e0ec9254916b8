use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{
        canvas::{Canvas, Circle as CanvasCircle, Points},
        Block, Paragraph, Widget,
    },
};

use kreis::layout::{Circle, Rgb};
use kreis::session::{Outcome, Phase};

use crate::App;

const HELP_LINE: &str =
    "arrows: move body  tab: switch  a/d: add/drop  [ ]: rotate  - =: scale  h/j/k/l: shift  , . < >: blob band  esc: quit";

fn tint(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.session.phase {
            Phase::EndScreen => render_end_screen(self, area, buf),
            _ => render_field(self, area, buf),
        }
    }
}

/// Menu and rounds share one look: a HUD strip, the projected field, and the
/// operator help line.
fn render_field(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let hud = match app.session.phase {
        Phase::GameLoop => format!(
            "Time {:>4.1}s   Score {}   Round {}/{}",
            app.session.round.seconds_remaining.max(0.0),
            app.session.score,
            app.session.round.index.min(app.session.config.rounds),
            app.session.config.rounds,
        ),
        _ => format!(
            "KREIS - stand in the circles   players: {}",
            app.session.players
        ),
    };
    Paragraph::new(hud)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    // Outcome feedback floods the whole field between rounds.
    let background = match (app.session.in_outcome_pause(), app.session.last_outcome) {
        (true, Some(Outcome::Success)) => Color::Green,
        (true, Some(Outcome::Failure)) => Color::Red,
        _ => Color::Black,
    };
    render_canvas(app, chunks[1], buf, background);

    Paragraph::new(HELP_LINE)
        .style(Style::default().add_modifier(Modifier::DIM))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}

fn render_canvas(app: &App, area: Rect, buf: &mut Buffer, background: Color) {
    let width = app.session.config.display_width;
    let height = app.session.config.display_height;

    // Display space has y growing downward; the canvas grows upward.
    let markers: Vec<(f64, f64)> = app
        .points
        .iter()
        .filter_map(|p| p.position())
        .map(|p| (p.x, height - p.y))
        .collect();

    Canvas::default()
        .block(Block::default().style(Style::default().bg(background)))
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for circle in &app.session.circles {
                draw_circle(ctx, circle, height);
            }
            ctx.draw(&Points {
                coords: &markers,
                color: Color::White,
            });
        })
        .render(area, buf);
}

fn draw_circle(ctx: &mut ratatui::widgets::canvas::Context, circle: &Circle, height: f64) {
    let y = height - circle.center.y;
    ctx.draw(&CanvasCircle {
        x: circle.center.x,
        y,
        radius: circle.radius,
        color: tint(circle.color),
    });
    let style = Style::default()
        .fg(tint(circle.color))
        .add_modifier(Modifier::BOLD);
    ctx.print(circle.center.x, y, Line::styled(circle.label(), style));
}

fn render_end_screen(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let mut lines = vec![Line::styled(
        format!("Score: {}", app.session.score),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    if app.session.new_highscore {
        lines.push(Line::styled(
            "New Highscore!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        lines.push(Line::from(format!(
            "Highscore: {}",
            app.session.highscore
        )));
    }
    lines.push(Line::from("step into the circle to play again"));

    Paragraph::new(lines)
        .block(Block::default().style(Style::default().bg(Color::Rgb(0, 0, 100))))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    render_canvas(app, chunks[1], buf, Color::Rgb(0, 0, 100));

    Paragraph::new(HELP_LINE)
        .style(Style::default().add_modifier(Modifier::DIM))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}
