use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Row, Table};

use crate::app::App;
use crate::sampler::MetricSample;

/// Background colours cycled over table rows.
const ROW_BACKGROUNDS: [Color; 2] = [Color::Reset, Color::DarkGray];

/// Border rows plus the header row drawn around the table body.
const TABLE_CHROME: u16 = 3;

const BYTES_PER_GB: f64 = 1e9;

// ── Severity ────────────────────────────────────────────────

/// Load band used to colour a gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warn,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warn => "warn",
            Severity::Critical => "critical",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Severity::Ok => Color::Green,
            Severity::Warn => Color::Yellow,
            Severity::Critical => Color::Red,
        }
    }
}

/// `< 40` is ok, `40..70` is warn, `>= 70` is critical. A non-finite
/// reading draws an empty gauge, so it is ok too.
pub fn classify(percent: f64) -> Severity {
    if !percent.is_finite() || percent < 40.0 {
        Severity::Ok
    } else if percent < 70.0 {
        Severity::Warn
    } else {
        Severity::Critical
    }
}

// ── Labels ──────────────────────────────────────────────────

pub fn cpu_label(percent: f64) -> String {
    format!("{percent:.2}%")
}

pub fn memory_label(sample: &MetricSample) -> String {
    format!(
        "{:.2}% ({:.2}GB/{:.2}GB)",
        sample.mem_used_percent,
        sample.mem_used_bytes as f64 / BYTES_PER_GB,
        sample.mem_total_bytes as f64 / BYTES_PER_GB,
    )
}

/// Gauge fill for `percent`, clamped to `0.0..=1.0`.
fn gauge_ratio(percent: f64) -> f64 {
    if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Style for the `index`-th row of the visible window.
pub fn row_style(index: usize) -> Style {
    Style::default().bg(ROW_BACKGROUNDS[index % ROW_BACKGROUNDS.len()])
}

// ── Layout ──────────────────────────────────────────────────

struct Areas {
    memory: Rect,
    cpu: Rect,
    table: Rect,
}

fn layout(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    let gauges = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    Areas {
        memory: gauges[0],
        cpu: gauges[1],
        table: rows[1],
    }
}

/// Number of process rows that fit in the table for a terminal of `area`.
pub fn visible_rows(area: Rect) -> usize {
    usize::from(layout(area).table.height.saturating_sub(TABLE_CHROME))
}

// ── Drawing ─────────────────────────────────────────────────

/// Paints the whole dashboard: two gauges over the process table.
pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout(f.area());

    draw_gauge(
        f,
        areas.memory,
        " Memory Usage ",
        app.sample.mem_used_percent,
        memory_label(&app.sample),
    );
    draw_gauge(
        f,
        areas.cpu,
        " CPU Usage ",
        app.sample.cpu_percent,
        cpu_label(app.sample.cpu_percent),
    );
    draw_process_table(f, app, areas.table);
}

fn draw_gauge(f: &mut Frame, area: Rect, title: &str, percent: f64, label: String) {
    let gauge = Gauge::default()
        .block(bordered(title))
        .gauge_style(Style::default().fg(classify(percent).color()))
        .ratio(gauge_ratio(percent))
        .label(Span::styled(label, Style::default().fg(Color::White)));

    f.render_widget(gauge, area);
}

fn draw_process_table(f: &mut Frame, app: &App, area: Rect) {
    let view = app.visible();

    let header = Row::new(view.header).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = view
        .rows
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Row::new(vec![
                p.pid.to_string(),
                p.name.clone(),
                format!("{:.2}%", p.cpu_percent),
                format!("{:.2}%", p.mem_percent),
            ])
            .style(row_style(i))
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let position = if app.processes.is_empty() {
        String::from(" no processes ")
    } else {
        let first = app.viewport.offset() + 1;
        let last = app.viewport.offset() + view.rows.len();
        format!(" {first}-{last} of {} ", app.processes.len())
    };

    let table = Table::new(rows, widths).header(header).block(
        bordered(" Running Processes ")
            .title_bottom(Line::from(position).left_aligned())
            .title_bottom(Line::from(" q: quit  ↑/↓: scroll ").right_aligned()),
    );

    f.render_widget(table, area);
}

// ── Helpers ─────────────────────────────────────────────────

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Command;
    use crate::rank::rank;
    use crate::sampler::ProcessRow;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn render(app: &App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn tasks(len: usize) -> Vec<ProcessRow> {
        (0..len)
            .map(|i| ProcessRow {
                pid: 1000 + i as u32,
                name: format!("task{i:02}"),
                cpu_percent: (len - i) as f64,
                mem_percent: 0.5,
            })
            .collect()
    }

    #[test]
    fn severity_bands() {
        assert_eq!(classify(0.0), Severity::Ok);
        assert_eq!(classify(39.99), Severity::Ok);
        assert_eq!(classify(40.0), Severity::Warn);
        assert_eq!(classify(69.99), Severity::Warn);
        assert_eq!(classify(70.0), Severity::Critical);
        assert_eq!(classify(100.0), Severity::Critical);
        assert_eq!(classify(70.0).as_str(), "critical");
        assert_eq!(classify(40.0).as_str(), "warn");
        assert_eq!(classify(10.0).as_str(), "ok");
    }

    #[test]
    fn non_finite_reading_is_ok() {
        assert_eq!(classify(f64::NAN), Severity::Ok);
        assert_eq!(classify(f64::INFINITY), Severity::Ok);
        assert_eq!(classify(f64::NEG_INFINITY), Severity::Ok);
        assert_eq!(gauge_ratio(f64::NAN), 0.0);
    }

    #[test]
    fn cpu_gauge_at_85_percent() {
        assert_eq!(classify(85.0).as_str(), "critical");
        assert_eq!(classify(85.0).color(), Color::Red);
        assert_eq!(cpu_label(85.0), "85.00%");
    }

    #[test]
    fn memory_gauge_at_25_percent() {
        let sample = MetricSample {
            mem_used_percent: 25.0,
            mem_used_bytes: 4_000_000_000,
            mem_total_bytes: 16_000_000_000,
            ..MetricSample::default()
        };
        assert_eq!(memory_label(&sample), "25.00% (4.00GB/16.00GB)");
        assert_eq!(classify(sample.mem_used_percent).as_str(), "ok");
    }

    #[test]
    fn gauge_ratio_is_clamped() {
        assert_eq!(gauge_ratio(-5.0), 0.0);
        assert_eq!(gauge_ratio(50.0), 0.5);
        assert_eq!(gauge_ratio(250.0), 1.0);
        assert_eq!(gauge_ratio(f64::NAN), 0.0);
    }

    #[test]
    fn rows_alternate_background() {
        assert_ne!(row_style(0), row_style(1));
        assert_eq!(row_style(0), row_style(2));
        assert_eq!(row_style(1), row_style(3));
    }

    #[test]
    fn taller_terminal_fits_more_rows() {
        let small = visible_rows(Rect::new(0, 0, 80, 24));
        let large = visible_rows(Rect::new(0, 0, 80, 60));
        assert!(small > 0);
        assert!(large > small);
        assert_eq!(visible_rows(Rect::new(0, 0, 10, 2)), 0);
    }

    #[test]
    fn renders_gauges_and_table() {
        let mut app = App::new(visible_rows(Rect::new(0, 0, 100, 30)));
        app.publish_sample(MetricSample {
            cpu_percent: 85.0,
            mem_used_percent: 25.0,
            mem_used_bytes: 4_000_000_000,
            mem_total_bytes: 16_000_000_000,
            ..MetricSample::default()
        });
        app.publish_processes(rank(tasks(5), 50));

        let buf = render(&app, 100, 30);
        let text = buffer_text(&buf);

        assert!(text.contains("Memory Usage"));
        assert!(text.contains("CPU Usage"));
        assert!(text.contains("Running Processes"));
        assert!(text.contains("85.00%"));
        assert!(text.contains("25.00% (4.00GB/16.00GB)"));
        assert!(text.contains("PID"));
        assert!(text.contains("Memory%"));
        assert!(text.contains("task00"));
        assert!(text.contains("task04"));
        assert!(text.contains("1-5 of 5"));

        // gauge fills: memory (left half) green, CPU (right half) red
        let fill = |from: u16, to: u16| {
            (0..buf.area.height).find_map(|y| {
                (from..to)
                    .map(|x| &buf[(x, y)])
                    .find(|c| c.symbol() == "█")
                    .map(|c| c.fg)
            })
        };
        assert_eq!(fill(0, 50), Some(Color::Green));
        assert_eq!(fill(50, 100), Some(Color::Red));
    }

    #[test]
    fn renders_scrolled_window() {
        let area = Rect::new(0, 0, 80, 30);
        let rows = visible_rows(area);
        let mut app = App::new(rows);
        app.publish_processes(rank(tasks(40), 50));
        for _ in 0..3 {
            app.apply(Command::ScrollDown);
        }

        let text = buffer_text(&render(&app, area.width, area.height));
        assert!(!text.contains("task02"));
        assert!(text.contains("task03"));
        assert!(text.contains(&format!("task{:02}", 3 + rows - 1)));
        assert!(!text.contains(&format!("task{:02}", 3 + rows)));
        assert!(text.contains(&format!("4-{} of 40", 3 + rows)));
    }

    #[test]
    fn empty_table_renders() {
        let app = App::new(10);
        let text = buffer_text(&render(&app, 80, 24));
        assert!(text.contains("no processes"));
        assert!(text.contains("0.00%"));
    }
}
