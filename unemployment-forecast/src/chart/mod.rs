//! Chart module.
//!
//! Builds the plot geometry for historical and predicted rates and renders
//! it in the terminal.

pub mod data;
pub mod terminal;

pub use data::{ChartData, Connector};
pub use terminal::{draw_chart, render_chart, restore_terminal, show_chart, ChartError, ChartResult};
