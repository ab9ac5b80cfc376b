//! Trend sparkline widget for inline visualization

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different magnitudes (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A one-line sparkline of a quarterly series
pub struct TrendSparkline<'a> {
    /// Value per quarter, oldest first
    values: &'a [f64],
    /// Value mapped to the tallest block
    max_value: f64,
    /// Highlighted position (index into values)
    marker: Option<usize>,
    style: Style,
    marker_style: Style,
}

impl<'a> TrendSparkline<'a> {
    /// Creates a sparkline scaled to the largest value in `values`
    pub fn new(values: &'a [f64]) -> Self {
        let max_value = values.iter().copied().fold(0.0_f64, f64::max);
        Self {
            values,
            max_value,
            marker: None,
            style: Style::default().fg(Color::Cyan),
            marker_style: Style::default().fg(Color::Yellow),
        }
    }

    /// Scales against a fixed maximum instead, so two series share a scale
    pub fn max_value(mut self, max_value: f64) -> Self {
        self.max_value = max_value;
        self
    }

    /// Highlights the most recent value
    pub fn mark_latest(mut self) -> Self {
        self.marker = self.values.len().checked_sub(1);
        self
    }

    fn value_to_block(&self, value: f64) -> char {
        if self.max_value <= 0.0 {
            return BLOCKS[0];
        }
        let normalized = (value / self.max_value).clamp(0.0, 1.0);
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

impl<'a> Widget for TrendSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        // Keep the most recent quarters when the area is too narrow.
        let skip = self.values.len().saturating_sub(width);

        for (i, value) in self.values.iter().enumerate().skip(skip) {
            let block = self.value_to_block(*value);
            let x = area.x + (i - skip) as u16;
            let y = area.y;

            let style = if self.marker == Some(i) {
                self.marker_style
            } else {
                self.style
            };

            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(block).set_style(style);
            }
        }
    }
}
