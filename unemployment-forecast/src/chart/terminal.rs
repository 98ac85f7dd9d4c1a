//! Terminal rendering of the history/forecast chart.

use std::io;
use std::time::Duration;

use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};
use thiserror::Error;
use tracing::info;

use super::data::ChartData;

const TITLE: &str = " Unemployment Rate: History and Forecast ";
const AXIS_DATE_FORMAT: &str = "%d/%m/%Y";
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),
}

pub type ChartResult<T> = Result<T, ChartError>;

/// Draw the chart and a key hint into `frame`.
pub fn draw_chart(frame: &mut Frame, data: &ChartData) {
    let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(frame.area());
    render_chart(frame, chunks[0], data);

    let hint = Paragraph::new(" q / Esc / Enter: close").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, chunks[1]);
}

/// Render the chart widget into `area`.
pub fn render_chart(frame: &mut Frame, area: Rect, data: &ChartData) {
    let mut datasets = vec![
        Dataset::default()
            .name("Historical")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&data.historical),
        Dataset::default()
            .name("Forecast")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&data.predicted),
    ];

    if let Some(connector) = &data.connector {
        datasets.push(
            Dataset::default()
                .name("Transition")
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Blue))
                .data(&connector.points),
        );
    }

    let x_labels: Vec<Span> = data
        .x_labels(AXIS_DATE_FORMAT)
        .into_iter()
        .map(Span::raw)
        .collect();
    let y_labels: Vec<Span> = data.y_labels().into_iter().map(Span::raw).collect();

    let chart = Chart::new(datasets)
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(TITLE.bold()),
        )
        .x_axis(
            Axis::default()
                .title("Date")
                .style(Style::default().fg(Color::Gray))
                .bounds(data.x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Rate (%)")
                .style(Style::default().fg(Color::Gray))
                .bounds(data.y_bounds)
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

/// Show the chart full screen and block until the user closes it.
pub fn show_chart(data: &ChartData) -> ChartResult<()> {
    info!("Displaying chart (press q, Esc or Enter to continue)");

    enable_raw_mode()?;
    let result = (|| -> ChartResult<()> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        run_chart(&mut terminal, data)
    })();

    // Restore on every path, reporting the first error.
    let restored = restore_terminal();
    result.and(restored)
}

/// Leave raw mode and the alternate screen, and show the cursor.
///
/// Safe to call when the terminal was never set up.
pub fn restore_terminal() -> ChartResult<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

fn run_chart<B: Backend>(terminal: &mut Terminal<B>, data: &ChartData) -> ChartResult<()> {
    loop {
        terminal.draw(|frame| draw_chart(frame, data))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    _ => {}
                }
            }
        }
    }
    Ok(())
}
