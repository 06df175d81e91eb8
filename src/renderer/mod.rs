pub mod drawable;

use std::{
    io::{self, stdout, Write},
    panic, thread,
};

use cmouse::{array::Array2D, Dims};
use crossterm::{
    event::Event, execute, style::ContentStyle, terminal, QueueableCommand, SynchronizedUpdate,
};
use unicode_width::UnicodeWidthChar;

pub struct Renderer {
    size: Dims,
    shown: GBuffer,
    hidden: GBuffer,
    full_redraw: bool,
}

impl Renderer {
    pub fn new() -> io::Result<Self> {
        let size: Dims = terminal::size()?.into();

        let mut ren = Renderer {
            size,
            shown: GBuffer::new(size),
            hidden: GBuffer::new(size),
            full_redraw: true,
        };

        ren.turn_on()?;

        Ok(ren)
    }

    fn turn_on(&mut self) -> io::Result<()> {
        self.register_panic_hook();

        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            crossterm::cursor::Hide,
            terminal::EnterAlternateScreen,
        )?;

        self.on_resize(None)
    }

    fn turn_off(&mut self) -> io::Result<()> {
        self.unregister_panic_hook();

        execute!(
            stdout(),
            crossterm::cursor::Show,
            terminal::LeaveAlternateScreen,
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn register_panic_hook(&self) {
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            // best effort, the panic message matters more
            let _ = execute!(
                stdout(),
                terminal::LeaveAlternateScreen,
                crossterm::cursor::Show,
            );
            let _ = terminal::disable_raw_mode();

            prev(info)
        }));
    }

    fn unregister_panic_hook(&self) {
        if !thread::panicking() {
            let _ = panic::take_hook();
        }
    }

    fn on_resize(&mut self, size: Option<Dims>) -> io::Result<()> {
        self.size = match size {
            Some(size) => size,
            None => terminal::size()?.into(),
        };
        self.shown.resize(self.size);
        self.hidden.resize(self.size);
        self.full_redraw = true;
        Ok(())
    }

    pub fn on_event(&mut self, event: &Event) -> io::Result<()> {
        if let Event::Resize(x, y) = event {
            self.on_resize(Some((*x, *y).into()))?;
        }
        Ok(())
    }

    pub fn frame(&mut self) -> &mut GBuffer {
        &mut self.hidden
    }

    /// Writes lines that changed since the last frame to the terminal and swaps buffers.
    pub fn show(&mut self) -> io::Result<()> {
        let mut tty = stdout();

        tty.sync_update(|tty| {
            use crossterm::style;

            let mut style = ContentStyle::default();
            tty.queue(style::ResetColor)?;

            for y in 0..self.size.1.max(0) as usize {
                if self.hidden.line(y) == self.shown.line(y) && !self.full_redraw {
                    continue;
                }

                tty.queue(crossterm::cursor::MoveTo(0, y as u16))?;

                for cell in self.hidden.line(y).unwrap_or_default() {
                    if style != cell.style {
                        if style.background_color != cell.style.background_color {
                            tty.queue(style::SetBackgroundColor(
                                cell.style.background_color.unwrap_or(style::Color::Reset),
                            ))?;
                        }
                        if style.foreground_color != cell.style.foreground_color {
                            tty.queue(style::SetForegroundColor(
                                cell.style.foreground_color.unwrap_or(style::Color::Reset),
                            ))?;
                        }
                        style = cell.style;
                    }
                    tty.queue(style::Print(cell.character))?;
                }
            }

            tty.flush()?;
            self.full_redraw = false;

            io::Result::Ok(())
        })??;

        std::mem::swap(&mut self.shown, &mut self.hidden);
        self.hidden.clear(ContentStyle::default());

        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = self.turn_off();
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Cell {
    pub character: char,
    pub style: ContentStyle,
}

impl Cell {
    pub fn styled(character: char, style: ContentStyle) -> Self {
        Cell { character, style }
    }

    pub fn empty() -> Self {
        Cell::styled(' ', ContentStyle::default())
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

/// Off-screen character buffer, one [`Cell`] per terminal column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GBuffer(Array2D<Cell>);

impl GBuffer {
    pub fn new(size: Dims) -> Self {
        GBuffer(Array2D::new_dims(Cell::empty(), size).unwrap_or_else(empty_buffer))
    }

    pub fn size(&self) -> Dims {
        self.0.size()
    }

    pub fn resize(&mut self, new_size: Dims) {
        if self.size() != new_size {
            *self = GBuffer::new(new_size);
        }
    }

    pub fn contains(&self, pos: Dims) -> bool {
        self.0.contains(pos)
    }

    pub fn clear(&mut self, style: ContentStyle) {
        self.0.fill(Cell::styled(' ', style));
    }

    pub fn get(&self, pos: Dims) -> Option<&Cell> {
        self.0.get(pos)
    }

    pub fn line(&self, y: usize) -> Option<&[Cell]> {
        self.0.row(y)
    }

    /// Puts a character at `pos`, wide characters are replaced, since every cell is one
    /// column. Returns the number of columns used, zero if `pos` is outside of the buffer.
    pub fn put_char(&mut self, pos: Dims, character: char, style: ContentStyle) -> usize {
        let character = match character.width() {
            Some(1) => character,
            _ => '?',
        };

        match self.0.get_mut(pos) {
            Some(cell) => {
                *cell = Cell::styled(character, style);
                1
            }
            None => 0,
        }
    }

    /// Text content of the line, without styles and trailing spaces.
    pub fn line_text(&self, y: usize) -> String {
        self.line(y)
            .unwrap_or_default()
            .iter()
            .map(|cell| cell.character)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    pub fn write(&self, to: &mut impl Write, colored: bool) -> io::Result<()> {
        for y in 0..self.size().1.max(0) as usize {
            if colored {
                for cell in self.line(y).unwrap_or_default() {
                    write!(to, "{}", cell.style.apply(cell.character))?;
                }
                writeln!(to)?;
            } else {
                writeln!(to, "{}", self.line_text(y))?;
            }
        }
        Ok(())
    }
}

fn empty_buffer() -> Array2D<Cell> {
    Array2D::new(Cell::empty(), 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_char_clips() {
        let mut buf = GBuffer::new(Dims(3, 2));
        assert_eq!(buf.put_char(Dims(0, 0), 'a', ContentStyle::default()), 1);
        assert_eq!(buf.put_char(Dims(3, 0), 'b', ContentStyle::default()), 0);
        assert_eq!(buf.put_char(Dims(0, -1), 'c', ContentStyle::default()), 0);
        assert_eq!(buf.line_text(0), "a");
        assert_eq!(buf.line_text(1), "");
    }

    #[test]
    fn wide_chars_are_replaced() {
        let mut buf = GBuffer::new(Dims(2, 1));
        buf.put_char(Dims(0, 0), '字', ContentStyle::default());
        assert_eq!(buf.get(Dims(0, 0)).map(|c| c.character), Some('?'));
    }

    #[test]
    fn write_plain() {
        let mut buf = GBuffer::new(Dims(2, 2));
        buf.put_char(Dims(1, 0), '#', ContentStyle::default());
        buf.put_char(Dims(0, 1), '@', ContentStyle::default());

        let mut out = Vec::new();
        buf.write(&mut out, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), " #\n@\n");
    }

    #[test]
    fn resize_clears() {
        let mut buf = GBuffer::new(Dims(2, 2));
        buf.put_char(Dims(0, 0), 'x', ContentStyle::default());
        buf.resize(Dims(2, 2));
        assert_eq!(buf.line_text(0), "x");
        buf.resize(Dims(4, 1));
        assert_eq!(buf.size(), Dims(4, 1));
        assert_eq!(buf.line_text(0), "");
    }
}
