//! The accelerator and BDF accelerator tables.

use super::{metrics::Metric, Error, TableFormat};
use crate::font_data::Cursor;

/// Font-wide flags and bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accelerator {
    pub no_overlap: bool,
    pub constant_metrics: bool,
    pub terminal_font: bool,
    pub constant_width: bool,
    pub ink_inside: bool,
    pub ink_metrics: bool,
    pub draw_right_to_left: bool,
    pub font_ascent: i32,
    pub font_descent: i32,
    pub max_overlap: i32,
    pub min_bounds: Metric,
    pub max_bounds: Metric,
    /// Equal to `min_bounds` unless the table carries separate ink bounds.
    pub ink_min_bounds: Metric,
    /// Equal to `max_bounds` unless the table carries separate ink bounds.
    pub ink_max_bounds: Metric,
}

/// Parses an accelerator table, positioned after the format word.
pub(super) fn parse(cursor: &mut Cursor, format: TableFormat) -> Result<Accelerator, Error> {
    let order = format.byte_order();
    let flags = cursor.read_bytes(8)?;
    let flag = |i: usize| flags[i] == 1;
    let font_ascent = cursor.read_i32(order)?;
    let font_descent = cursor.read_i32(order)?;
    let max_overlap = cursor.read_i32(order)?;
    let min_bounds = Metric::read(cursor, false, order)?;
    let max_bounds = Metric::read(cursor, false, order)?;
    let (ink_min_bounds, ink_max_bounds) = if format.has_ink_bounds() {
        (
            Metric::read(cursor, false, order)?,
            Metric::read(cursor, false, order)?,
        )
    } else {
        (min_bounds, max_bounds)
    };
    Ok(Accelerator {
        no_overlap: flag(0),
        constant_metrics: flag(1),
        terminal_font: flag(2),
        constant_width: flag(3),
        ink_inside: flag(4),
        ink_metrics: flag(5),
        draw_right_to_left: flag(6),
        font_ascent,
        font_descent,
        max_overlap,
        min_bounds,
        max_bounds,
        ink_min_bounds,
        ink_max_bounds,
    })
}
