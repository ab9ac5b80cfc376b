//! Terminal rendering for trade data
//!
//! Widgets are drawn into an off-screen ratatui buffer and emitted as plain
//! lines, so output works the same on a terminal and through a pipe.

mod sparkline;
mod tables;

pub use sparkline::TrendSparkline;
pub use tables::{
    commodity_table, country_table, forecast_rows, forecast_table, overview_paragraph,
    quarterly_table, table_height, trend_lines,
};

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Width used when the terminal size is unknown
const FALLBACK_WIDTH: u16 = 80;

/// Renders `widget` into a `width` x `height` buffer and returns its rows
///
/// Trailing blanks are trimmed from each row.
pub fn render_lines<W: Widget>(widget: W, width: u16, height: u16) -> Vec<String> {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    widget.render(area, &mut buf);
    buffer_lines(&buf)
}

/// Converts every row of `buf` to text
fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            let line: String = (area.left()..area.right())
                .filter_map(|x| buf.cell((x, y)).map(|cell| cell.symbol()))
                .collect();
            line.trim_end().to_string()
        })
        .collect()
}

/// Current terminal width, or a sensible default when not on a terminal
pub fn terminal_width() -> u16 {
    crossterm::terminal::size()
        .map(|(width, _)| width)
        .unwrap_or(FALLBACK_WIDTH)
        .max(20)
}

/// Renders `widget` at terminal width and prints it to stdout
pub fn print_widget<W: Widget>(widget: W, height: u16) {
    for line in render_lines(widget, terminal_width(), height) {
        println!("{}", line);
    }
}
