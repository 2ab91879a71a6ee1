//! Buffered cell grid with differential flushing.
//!
//! The canvas owns a dense row-major grid of [`Cell`]s plus a parallel frame
//! cache holding the sequence last emitted for every cell. Writes only touch
//! the grid; [`Canvas::flush`] serializes the dirty cells, drops the ones whose
//! sequence matches the cache and hands the rest to the sink in one payload.

use compact_str::CompactString;
use gridpaint_core::{ColorSpec, Rgb};
use tracing::{debug, debug_span, trace};

use super::cell::{Attributes, Cell};
use super::sequences;
use super::sink::{Sink, TerminalSink};
use crate::error::CanvasError;

/// Width used when neither the config nor the sink provides one.
pub const DEFAULT_WIDTH: u16 = 80;

/// Height used when neither the config nor the sink provides one.
pub const DEFAULT_HEIGHT: u16 = 24;

/// Construction options for a [`Canvas`].
///
/// `width` and `height` override the size reported by the sink.
#[derive(Debug, Clone)]
pub struct CanvasConfig<S> {
    /// Destination for the escape sequences.
    pub sink: S,
    /// Grid width in columns.
    pub width: Option<u16>,
    /// Grid height in rows.
    pub height: Option<u16>,
}

impl<S: Sink> CanvasConfig<S> {
    /// Config for `sink` with the size taken from the sink.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            width: None,
            height: None,
        }
    }

    /// Fix the grid width.
    #[must_use]
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Fix the grid height.
    #[must_use]
    pub fn height(mut self, height: u16) -> Self {
        self.height = Some(height);
        self
    }
}

impl Default for CanvasConfig<TerminalSink> {
    fn default() -> Self {
        Self::new(TerminalSink::new())
    }
}

/// Colors and attributes applied to future writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Paint {
    /// Foreground color, `None` for the terminal default.
    pub foreground: Option<Rgb>,
    /// Background color, `None` for the terminal default.
    pub background: Option<Rgb>,
    /// Display attributes.
    pub attributes: Attributes,
}

/// Virtual terminal frame that emits only what changed.
///
/// Mutators return `&mut Self` so calls can be chained:
///
/// ```
/// use gridpaint_terminal::{Canvas, CanvasConfig};
///
/// let config = CanvasConfig::new(Vec::<u8>::new()).width(20).height(10);
/// let mut canvas = Canvas::with_config(config);
/// canvas.move_to(2, 1).foreground("red")?.bold(true).write("hi");
/// canvas.flush()?;
/// # Ok::<(), gridpaint_terminal::CanvasError>(())
/// ```
#[derive(Debug)]
pub struct Canvas<S: Sink = TerminalSink> {
    sink: S,
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    /// Sequence last emitted per cell index; empty until first emitted.
    last_frame: Vec<CompactString>,
    cursor_x: i32,
    cursor_y: i32,
    paint: Paint,
    /// Reused between flushes.
    payload: String,
}

impl Canvas<TerminalSink> {
    /// Canvas on standard output, sized to the terminal.
    #[must_use]
    pub fn create() -> Self {
        Self::with_config(CanvasConfig::default())
    }
}

impl<S: Sink> Canvas<S> {
    /// Canvas on `sink`, sized from the sink.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self::with_config(CanvasConfig::new(sink))
    }

    /// Canvas from an explicit config.
    ///
    /// Missing dimensions come from [`Sink::size`], then fall back to
    /// [`DEFAULT_WIDTH`] × [`DEFAULT_HEIGHT`].
    #[must_use]
    pub fn with_config(config: CanvasConfig<S>) -> Self {
        let CanvasConfig {
            sink,
            width,
            height,
        } = config;
        let reported = if width.is_none() || height.is_none() {
            sink.size()
        } else {
            None
        };
        let width = width
            .or(reported.map(|(w, _)| w))
            .unwrap_or(DEFAULT_WIDTH);
        let height = height
            .or(reported.map(|(_, h)| h))
            .unwrap_or(DEFAULT_HEIGHT);

        debug!(width, height, from_sink = reported.is_some(), "canvas created");

        let size = usize::from(width) * usize::from(height);
        let mut cells = Vec::with_capacity(size);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(x, y));
            }
        }

        Self {
            sink,
            width,
            height,
            cells,
            last_frame: vec![CompactString::default(); size],
            cursor_x: 0,
            cursor_y: 0,
            paint: Paint::default(),
            payload: String::new(),
        }
    }

    /// Grid width in columns.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in rows.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Current cursor position; may lie outside the grid.
    #[must_use]
    pub const fn cursor(&self) -> (i32, i32) {
        (self.cursor_x, self.cursor_y)
    }

    /// Paint state applied to the next write.
    #[must_use]
    pub const fn paint(&self) -> Paint {
        self.paint
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// All cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at `(x, y)`, if inside the grid.
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[self.pointer(x, y)])
        } else {
            None
        }
    }

    /// Number of cells waiting for the next flush.
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_modified()).count()
    }

    /// Convert `(x, y)` to a linear cell index.
    #[must_use]
    pub fn pointer(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    /// Linear index of the cursor, if the cursor is inside the grid.
    #[must_use]
    pub fn cursor_pointer(&self) -> Option<usize> {
        self.index_of(self.cursor_x, self.cursor_y)
    }

    /// Convert a linear cell index to `(x, y)`.
    #[must_use]
    pub fn xy_from_pointer(&self, pointer: usize) -> (u16, u16) {
        let width = usize::from(self.width);
        ((pointer % width) as u16, (pointer / width) as u16)
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        let x = u16::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u16::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(self.pointer(x, y))
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Write `text` at the cursor using the current paint state.
    ///
    /// Every character advances the cursor one column, whether or not it
    /// landed inside the grid. Characters outside the grid are dropped and
    /// the cursor never wraps to the next row.
    pub fn write(&mut self, text: &str) -> &mut Self {
        let Paint {
            foreground,
            background,
            attributes,
        } = self.paint;

        for ch in text.chars() {
            if let Some(idx) = self.index_of(self.cursor_x, self.cursor_y) {
                self.cells[idx]
                    .set_symbol(ch)
                    .set_background_rgb(background)
                    .set_foreground_rgb(foreground)
                    .set_attributes(attributes)
                    .set_modified(true);
            }
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
        self
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    /// Move the cursor up by `rows`.
    pub fn up(&mut self, rows: i32) -> &mut Self {
        self.cursor_y = self.cursor_y.saturating_sub(rows);
        self
    }

    /// Move the cursor down by `rows`.
    pub fn down(&mut self, rows: i32) -> &mut Self {
        self.cursor_y = self.cursor_y.saturating_add(rows);
        self
    }

    /// Move the cursor right by `columns`.
    pub fn right(&mut self, columns: i32) -> &mut Self {
        self.cursor_x = self.cursor_x.saturating_add(columns);
        self
    }

    /// Move the cursor left by `columns`.
    pub fn left(&mut self, columns: i32) -> &mut Self {
        self.cursor_x = self.cursor_x.saturating_sub(columns);
        self
    }

    /// Move the cursor relative to its current position.
    pub fn move_by(&mut self, dx: i32, dy: i32) -> &mut Self {
        if dx < 0 {
            self.left(dx.saturating_neg());
        } else if dx > 0 {
            self.right(dx);
        }

        if dy < 0 {
            self.up(dy.saturating_neg());
        } else if dy > 0 {
            self.down(dy);
        }
        self
    }

    /// Place the cursor at `(x, y)`.
    pub fn move_to(&mut self, x: i32, y: i32) -> &mut Self {
        self.cursor_x = x;
        self.cursor_y = y;
        self
    }

    // =========================================================================
    // Paint
    // =========================================================================

    /// Set the foreground for future writes; `"none"` or `false` disables it.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Color`] if the color cannot be parsed. The
    /// paint state is left unchanged in that case.
    pub fn foreground(&mut self, color: impl Into<ColorSpec>) -> Result<&mut Self, CanvasError> {
        self.paint.foreground = color.into().resolve_rgb()?;
        Ok(self)
    }

    /// Set the background for future writes; `"none"` or `false` disables it.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Color`] if the color cannot be parsed. The
    /// paint state is left unchanged in that case.
    pub fn background(&mut self, color: impl Into<ColorSpec>) -> Result<&mut Self, CanvasError> {
        self.paint.background = color.into().resolve_rgb()?;
        Ok(self)
    }

    fn toggle(&mut self, attribute: Attributes, on: bool) -> &mut Self {
        self.paint.attributes = self.paint.attributes.set(attribute, on);
        self
    }

    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.toggle(Attributes::BOLD, on)
    }

    pub fn dim(&mut self, on: bool) -> &mut Self {
        self.toggle(Attributes::DIM, on)
    }

    pub fn underlined(&mut self, on: bool) -> &mut Self {
        self.toggle(Attributes::UNDERLINED, on)
    }

    pub fn blink(&mut self, on: bool) -> &mut Self {
        self.toggle(Attributes::BLINK, on)
    }

    pub fn reverse(&mut self, on: bool) -> &mut Self {
        self.toggle(Attributes::REVERSE, on)
    }

    pub fn hidden(&mut self, on: bool) -> &mut Self {
        self.toggle(Attributes::HIDDEN, on)
    }

    // =========================================================================
    // Erase
    // =========================================================================

    /// Reset every cell in the inclusive rectangle `(x1, y1)..=(x2, y2)`.
    ///
    /// The part of the rectangle outside the grid is ignored.
    pub fn erase(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> &mut Self {
        let x_start = x1.max(0);
        let y_start = y1.max(0);
        let x_end = x2.min(i32::from(self.width) - 1);
        let y_end = y2.min(i32::from(self.height) - 1);

        for y in y_start..=y_end {
            for x in x_start..=x_end {
                if let Some(idx) = self.index_of(x, y) {
                    self.cells[idx].reset();
                }
            }
        }
        self
    }

    fn last_column(&self) -> i32 {
        i32::from(self.width) - 1
    }

    fn last_row(&self) -> i32 {
        i32::from(self.height) - 1
    }

    /// Erase from the cursor to the end of its row.
    pub fn erase_to_end(&mut self) -> &mut Self {
        let (x, y) = self.cursor();
        self.erase(x, y, self.last_column(), y)
    }

    /// Erase from the start of the cursor row up to the cursor.
    pub fn erase_to_start(&mut self) -> &mut Self {
        let (x, y) = self.cursor();
        self.erase(0, y, x, y)
    }

    /// Erase the cursor row and everything below it.
    pub fn erase_to_down(&mut self) -> &mut Self {
        let y = self.cursor_y;
        self.erase(0, y, self.last_column(), self.last_row())
    }

    /// Erase everything above the cursor row, and the row itself.
    pub fn erase_to_up(&mut self) -> &mut Self {
        let y = self.cursor_y;
        self.erase(0, 0, self.last_column(), y)
    }

    /// Erase the cursor row.
    pub fn erase_line(&mut self) -> &mut Self {
        let y = self.cursor_y;
        self.erase(0, y, self.last_column(), y)
    }

    /// Erase the whole grid.
    pub fn erase_screen(&mut self) -> &mut Self {
        self.erase(0, 0, self.last_column(), self.last_row())
    }

    // =========================================================================
    // Flush
    // =========================================================================

    /// Emit the cells that changed since the last flush.
    ///
    /// Every dirty cell is serialized and compared with the sequence last
    /// emitted at its index; only differing sequences go out, concatenated in
    /// grid order in a single sink write. Nothing is written when nothing
    /// differs. Dirty flags and the frame cache are updated before the sink
    /// is called and stay updated if the write fails.
    ///
    /// Returns the number of cells emitted.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Io`] if the sink write fails.
    pub fn flush(&mut self) -> Result<usize, CanvasError> {
        let _span = debug_span!("gridpaint.flush", width = self.width, height = self.height)
            .entered();

        self.payload.clear();
        let mut dirty = 0usize;
        let mut emitted = 0usize;

        for (cell, cached) in self.cells.iter_mut().zip(self.last_frame.iter_mut()) {
            if !cell.is_modified() {
                continue;
            }
            dirty += 1;
            cell.set_modified(false);

            let start = self.payload.len();
            cell.write_sequence(&mut self.payload)
                .map_err(|_| std::io::Error::other("cell serialization failed"))?;
            let sequence = &self.payload[start..];

            if sequence == cached.as_str() {
                self.payload.truncate(start);
            } else {
                cached.clear();
                cached.push_str(sequence);
                emitted += 1;
            }
        }

        trace!(dirty, emitted, bytes = self.payload.len(), "flush scanned");

        if !self.payload.is_empty() {
            self.sink.write(self.payload.as_bytes())?;
        }
        Ok(emitted)
    }

    /// Forget what was emitted and mark every cell dirty.
    ///
    /// The next flush repaints the whole grid. Use after anything that
    /// changed the real terminal behind the canvas's back, such as
    /// [`Canvas::reset`] or [`Canvas::restore_screen`].
    pub fn invalidate(&mut self) -> &mut Self {
        for cached in &mut self.last_frame {
            cached.clear();
        }
        for cell in &mut self.cells {
            cell.set_modified(true);
        }
        self
    }

    // =========================================================================
    // Immediate operations
    // =========================================================================

    fn emit(
        &mut self,
        operation: &'static str,
        sequence: &'static str,
    ) -> Result<&mut Self, CanvasError> {
        trace!(operation, "immediate");
        self.sink.write(sequence.as_bytes())?;
        Ok(self)
    }

    /// Save the screen contents (switch to the alternate screen).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Io`] if the sink write fails.
    pub fn save_screen(&mut self) -> Result<&mut Self, CanvasError> {
        self.emit("save_screen", sequences::SAVE_SCREEN)
    }

    /// Restore the screen saved by [`Canvas::save_screen`].
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Io`] if the sink write fails.
    pub fn restore_screen(&mut self) -> Result<&mut Self, CanvasError> {
        self.emit("restore_screen", sequences::RESTORE_SCREEN)
    }

    /// # Errors
    ///
    /// Returns [`CanvasError::Io`] if the sink write fails.
    pub fn hide_cursor(&mut self) -> Result<&mut Self, CanvasError> {
        self.emit("hide_cursor", sequences::HIDE_CURSOR)
    }

    /// # Errors
    ///
    /// Returns [`CanvasError::Io`] if the sink write fails.
    pub fn show_cursor(&mut self) -> Result<&mut Self, CanvasError> {
        self.emit("show_cursor", sequences::SHOW_CURSOR)
    }

    /// Reset the terminal itself. The grid and frame cache are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Io`] if the sink write fails.
    pub fn reset(&mut self) -> Result<&mut Self, CanvasError> {
        self.emit("reset", sequences::TERMINAL_RESET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direct::WriterSink;

    fn canvas(width: u16, height: u16) -> Canvas<Vec<u8>> {
        Canvas::with_config(CanvasConfig::new(Vec::new()).width(width).height(height))
    }

    fn output(canvas: &Canvas<Vec<u8>>) -> String {
        String::from_utf8(canvas.sink().clone()).unwrap()
    }

    #[test]
    fn test_canvas_creation() {
        let c = canvas(20, 10);
        assert_eq!(c.width(), 20);
        assert_eq!(c.height(), 10);
        assert_eq!(c.cells().len(), 200);
        assert_eq!(c.cursor(), (0, 0));
        assert_eq!(c.paint(), Paint::default());
        assert_eq!(c.dirty_count(), 0);
    }

    #[test]
    fn test_cells_know_their_position() {
        let c = canvas(7, 3);
        for (i, cell) in c.cells().iter().enumerate() {
            assert_eq!((cell.x(), cell.y()), c.xy_from_pointer(i));
        }
    }

    #[test]
    fn test_size_from_sink() {
        let c = Canvas::new(WriterSink::new(Vec::<u8>::new()).with_size(132, 43));
        assert_eq!((c.width(), c.height()), (132, 43));
    }

    #[test]
    fn test_size_config_overrides_sink() {
        let sink = WriterSink::new(Vec::<u8>::new()).with_size(132, 43);
        let c = Canvas::with_config(CanvasConfig::new(sink).width(40));
        assert_eq!((c.width(), c.height()), (40, 43));
    }

    #[test]
    fn test_size_fallback() {
        let c = Canvas::new(Vec::<u8>::new());
        assert_eq!((c.width(), c.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
    }

    #[test]
    fn test_pointer_mapping() {
        let c = canvas(10, 5);
        assert_eq!(c.pointer(0, 0), 0);
        assert_eq!(c.pointer(5, 0), 5);
        assert_eq!(c.pointer(0, 1), 10);
        assert_eq!(c.pointer(5, 2), 25);
        assert_eq!(c.xy_from_pointer(25), (5, 2));
        assert_eq!(c.xy_from_pointer(49), (9, 4));
    }

    #[test]
    fn test_cursor_pointer() {
        let mut c = canvas(10, 5);
        c.move_to(3, 2);
        assert_eq!(c.cursor_pointer(), Some(23));
        c.move_to(-1, 2);
        assert_eq!(c.cursor_pointer(), None);
        c.move_to(10, 0);
        assert_eq!(c.cursor_pointer(), None);
    }

    #[test]
    fn test_write_updates_cells_and_cursor() {
        let mut c = canvas(20, 10);
        c.move_to(2, 3).write("abc");
        assert_eq!(c.cursor(), (5, 3));
        assert_eq!(c.cell(2, 3).unwrap().symbol(), 'a');
        assert_eq!(c.cell(4, 3).unwrap().symbol(), 'c');
        assert_eq!(c.dirty_count(), 3);
    }

    #[test]
    fn test_write_applies_paint() {
        let mut c = canvas(20, 10);
        c.foreground("red").unwrap().background("#000080").unwrap().underlined(true);
        c.write("x");
        let cell = c.cell(0, 0).unwrap();
        assert_eq!(cell.foreground(), Some(Rgb::new(255, 0, 0)));
        assert_eq!(cell.background(), Some(Rgb::new(0, 0, 128)));
        assert_eq!(cell.attributes(), Attributes::UNDERLINED);
    }

    #[test]
    fn test_write_clips_without_wrapping() {
        let mut c = canvas(4, 2);
        c.move_to(2, 0).write("wxyz");
        assert_eq!(c.cursor(), (6, 0));
        assert_eq!(c.cell(2, 0).unwrap().symbol(), 'w');
        assert_eq!(c.cell(3, 0).unwrap().symbol(), 'x');
        // Nothing spilled into the next row
        assert!(c.cell(0, 1).unwrap().is_blank());
        assert_eq!(c.dirty_count(), 2);
    }

    #[test]
    fn test_write_from_negative_column() {
        let mut c = canvas(4, 2);
        c.move_to(-2, 1).write("abcd");
        assert_eq!(c.cursor(), (2, 1));
        assert_eq!(c.cell(0, 1).unwrap().symbol(), 'c');
        assert_eq!(c.cell(1, 1).unwrap().symbol(), 'd');
        assert_eq!(c.dirty_count(), 2);
    }

    #[test]
    fn test_write_outside_rows_is_dropped() {
        let mut c = canvas(4, 2);
        c.move_to(0, 5).write("ab");
        assert_eq!(c.dirty_count(), 0);
        assert_eq!(c.cursor(), (2, 5));
    }

    #[test]
    fn test_cursor_movement() {
        let mut c = canvas(10, 10);
        c.move_to(5, 5).up(2).right(3).down(1).left(4);
        assert_eq!(c.cursor(), (4, 4));
        c.move_by(-10, 3);
        assert_eq!(c.cursor(), (-6, 7));
        c.move_by(0, 0);
        assert_eq!(c.cursor(), (-6, 7));
        c.move_by(6, -7);
        assert_eq!(c.cursor(), (0, 0));
    }

    #[test]
    fn test_cursor_saturates() {
        let mut c = canvas(10, 10);
        c.move_to(i32::MAX, i32::MIN).right(1).up(1);
        assert_eq!(c.cursor(), (i32::MAX, i32::MIN));
        c.move_by(i32::MIN, 0);
        assert_eq!(c.cursor().0, 0);
    }

    #[test]
    fn test_paint_does_not_touch_cells() {
        let mut c = canvas(5, 5);
        c.write("a");
        c.bold(true).dim(true).foreground("blue").unwrap();
        let cell = c.cell(0, 0).unwrap();
        assert!(cell.attributes().is_empty());
        assert_eq!(cell.foreground(), None);
    }

    #[test]
    fn test_attribute_toggles() {
        let mut c = canvas(5, 5);
        c.bold(true)
            .dim(true)
            .underlined(true)
            .blink(true)
            .reverse(true)
            .hidden(true);
        assert_eq!(c.paint().attributes.sgr_codes().count(), 6);
        c.bold(false).hidden(false);
        let attrs = c.paint().attributes;
        assert!(!attrs.contains(Attributes::BOLD));
        assert!(!attrs.contains(Attributes::HIDDEN));
        assert!(attrs.contains(Attributes::REVERSE));
    }

    #[test]
    fn test_color_none_disables() {
        let mut c = canvas(5, 5);
        c.foreground("red").unwrap().foreground("none").unwrap();
        assert_eq!(c.paint().foreground, None);
        c.background("white").unwrap().background(false).unwrap();
        assert_eq!(c.paint().background, None);
    }

    #[test]
    fn test_bad_color_keeps_paint() {
        let mut c = canvas(5, 5);
        c.foreground("green").unwrap();
        let err = c.foreground("greenish").unwrap_err();
        assert!(matches!(err, CanvasError::Color(_)));
        assert_eq!(c.paint().foreground, Some(Rgb::new(0, 128, 0)));
    }

    #[test]
    fn test_flush_writes_changed_cells_in_order() {
        let mut c = canvas(20, 10);
        c.write("test");
        let emitted = c.flush().unwrap();
        assert_eq!(emitted, 4);
        assert_eq!(
            output(&c),
            "\x1b[1;1ft\x1b[0m\x1b[1;2fe\x1b[0m\x1b[1;3fs\x1b[0m\x1b[1;4ft\x1b[0m"
        );
        assert_eq!(c.dirty_count(), 0);
    }

    #[test]
    fn test_flush_empty_writes_nothing() {
        let mut c = canvas(20, 10);
        assert_eq!(c.flush().unwrap(), 0);
        assert!(c.sink().is_empty());
    }

    #[test]
    fn test_identical_rewrite_is_free() {
        let mut c = canvas(20, 10);
        c.write("same").flush().unwrap();
        let first = c.sink().len();
        assert!(first > 0);

        c.move_to(0, 0).write("same");
        assert_eq!(c.dirty_count(), 4);
        assert_eq!(c.flush().unwrap(), 0);
        assert_eq!(c.sink().len(), first);
    }

    #[test]
    fn test_flush_emits_only_changes() {
        let mut c = canvas(20, 10);
        c.write("abcd").flush().unwrap();
        c.sink_mut().clear();

        c.move_to(0, 0).write("abXd");
        assert_eq!(c.flush().unwrap(), 1);
        assert_eq!(output(&c), "\x1b[1;3fX\x1b[0m");
    }

    #[test]
    fn test_flush_order_is_row_major() {
        let mut c = canvas(3, 3);
        c.move_to(2, 2).write("z");
        c.move_to(0, 0).write("a");
        c.move_to(1, 1).write("m");
        c.flush().unwrap();
        assert_eq!(
            output(&c),
            "\x1b[1;1fa\x1b[0m\x1b[2;2fm\x1b[0m\x1b[3;3fz\x1b[0m"
        );
    }

    #[test]
    fn test_erase_resets_rectangle() {
        let mut c = canvas(5, 5);
        for y in 0..5 {
            c.move_to(0, y).write("#####");
        }
        c.flush().unwrap();

        c.erase(1, 1, 3, 2);
        assert_eq!(c.dirty_count(), 6);
        assert!(c.cell(1, 1).unwrap().is_blank());
        assert!(c.cell(3, 2).unwrap().is_blank());
        assert_eq!(c.cell(0, 1).unwrap().symbol(), '#');
        assert_eq!(c.cell(4, 2).unwrap().symbol(), '#');
        assert_eq!(c.flush().unwrap(), 6);
    }

    #[test]
    fn test_erase_clips_to_grid() {
        let mut c = canvas(5, 5);
        c.erase(-10, -10, 100, 100);
        assert_eq!(c.dirty_count(), 25);

        let mut c = canvas(5, 5);
        c.erase(6, 0, 9, 4);
        assert_eq!(c.dirty_count(), 0);

        let mut c = canvas(5, 5);
        c.erase(3, 3, 1, 1);
        assert_eq!(c.dirty_count(), 0);
    }

    #[test]
    fn test_erase_does_not_wrap_rows() {
        // Column 5 on a 5-wide grid must not alias column 0 of the next row
        let mut c = canvas(5, 5);
        c.erase(5, 1, 5, 1);
        assert_eq!(c.dirty_count(), 0);
    }

    #[test]
    fn test_erase_derived_rectangles() {
        let dirty_after = |f: fn(&mut Canvas<Vec<u8>>)| {
            let mut c = canvas(10, 6);
            c.move_to(4, 2);
            f(&mut c);
            c.dirty_count()
        };

        assert_eq!(dirty_after(|c| { c.erase_to_end(); }), 6);
        assert_eq!(dirty_after(|c| { c.erase_to_start(); }), 5);
        assert_eq!(dirty_after(|c| { c.erase_to_down(); }), 40);
        assert_eq!(dirty_after(|c| { c.erase_to_up(); }), 30);
        assert_eq!(dirty_after(|c| { c.erase_line(); }), 10);
        assert_eq!(dirty_after(|c| { c.erase_screen(); }), 60);
    }

    #[test]
    fn test_erase_line_with_cursor_off_grid() {
        let mut c = canvas(10, 6);
        c.move_to(0, 9).erase_line();
        assert_eq!(c.dirty_count(), 0);
    }

    #[test]
    fn test_invalidate_repaints_everything() {
        let mut c = canvas(4, 2);
        c.write("ab").flush().unwrap();
        c.sink_mut().clear();

        c.invalidate();
        assert_eq!(c.dirty_count(), 8);
        assert_eq!(c.flush().unwrap(), 8);
        assert!(output(&c).starts_with("\x1b[1;1fa\x1b[0m"));
    }

    #[test]
    fn test_immediate_operations() {
        let mut c = canvas(4, 2);
        c.save_screen()
            .unwrap()
            .hide_cursor()
            .unwrap()
            .show_cursor()
            .unwrap()
            .restore_screen()
            .unwrap()
            .reset()
            .unwrap();
        assert_eq!(output(&c), "\x1b[?47h\x1b[?25l\x1b[?25h\x1b[?47l\x1bc");
    }

    #[test]
    fn test_immediate_operations_bypass_grid() {
        let mut c = canvas(4, 2);
        c.write("ab");
        c.hide_cursor().unwrap();
        assert_eq!(output(&c), "\x1b[?25l");
        assert_eq!(c.dirty_count(), 2);
    }

    #[test]
    fn test_into_sink() {
        let mut c = canvas(4, 2);
        c.write("q").flush().unwrap();
        let bytes = c.into_sink();
        assert_eq!(bytes, b"\x1b[1;1fq\x1b[0m");
    }

    #[test]
    fn test_chained_write_and_flush() {
        let mut c = canvas(10, 2);
        c.move_to(1, 1)
            .background("rgb(1, 2, 3)")
            .unwrap()
            .reverse(true)
            .write("r");
        c.flush().unwrap();
        assert_eq!(output(&c), "\x1b[2;2f\x1b[48;2;1;2;3m\x1b[7mr\x1b[0m");
    }
}
