//! Terminal front end: alternate-screen output and keyboard/resize input

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::Print,
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, BufWriter, Stdout, Write};
use std::time::Duration;

/// Rows kept free below the frame: one for the colour reset, one for status
const STATUS_ROWS: u16 = 2;

/// Character cells available to the frame in a terminal of the given size
fn frame_area(columns: u16, rows: u16) -> (u16, u16) {
    (columns, rows.saturating_sub(STATUS_ROWS))
}

/// Something the frame driver has to react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Key(KeyEvent),
    /// The frame area changed; see [`TerminalDisplay::get_size`]
    Resize,
}

/// Raw-mode alternate screen, restored on drop
pub struct TerminalDisplay {
    area: (u16, u16),
    out: BufWriter<Stdout>,
}

impl TerminalDisplay {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = BufWriter::new(stdout());
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;

        let (columns, rows) = terminal::size()?;
        Ok(Self {
            area: frame_area(columns, rows),
            out,
        })
    }

    /// Size of the frame area in character cells
    pub fn get_size(&self) -> (usize, usize) {
        (self.area.0 as usize, self.area.1 as usize)
    }

    /// Draw one frame followed by the status line.
    ///
    /// Every line is placed with an explicit cursor move, so a line wider than
    /// the terminal is clipped instead of shifting the rest of the frame.
    pub fn render(&mut self, content: &str, status: &str) -> io::Result<()> {
        let mut row: u16 = 0;
        for line in content.lines() {
            queue!(self.out, cursor::MoveTo(0, row), Print(line))?;
            row = row.saturating_add(1);
        }
        queue!(
            self.out,
            Clear(ClearType::FromCursorDown),
            cursor::MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            Print(status)
        )?;
        self.out.flush()
    }

    /// Wait up to `timeout` for a key press or a resize
    pub fn poll_input(&mut self, timeout: Duration) -> io::Result<Option<Input>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => Ok(Some(Input::Key(key))),
            Event::Resize(columns, rows) => {
                let area = frame_area(columns, rows);
                if area == self.area {
                    return Ok(None);
                }
                self.area = area;
                Ok(Some(Input::Resize))
            }
            _ => Ok(None),
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, EnableLineWrap, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Key actions for the simulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    Quit,
    ToggleStarfield,
    TogglePlanets,
    ToggleDisk,
    ToggleLensing,
    MassUp,
    MassDown,
    DiskGrow,
    DiskShrink,
    OrbitLeft,
    OrbitRight,
    OrbitUp,
    OrbitDown,
    ZoomIn,
    ZoomOut,
    Reset,
    Pause,
}

/// Parse keyboard input into actions
pub fn parse_key_event(event: KeyEvent) -> Action {
    match event.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('1') => Action::ToggleStarfield,
        KeyCode::Char('2') => Action::TogglePlanets,
        KeyCode::Char('3') => Action::ToggleDisk,
        KeyCode::Char('4') => Action::ToggleLensing,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::MassUp,
        KeyCode::Char('-') => Action::MassDown,
        KeyCode::Char(']') => Action::DiskGrow,
        KeyCode::Char('[') => Action::DiskShrink,
        KeyCode::Left => Action::OrbitLeft,
        KeyCode::Right => Action::OrbitRight,
        KeyCode::Up => Action::OrbitUp,
        KeyCode::Down => Action::OrbitDown,
        KeyCode::Char('w') => Action::ZoomIn,
        KeyCode::Char('s') => Action::ZoomOut,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char(' ') => Action::Pause,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_parse_key_event_quit() {
        assert_eq!(parse_key_event(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(parse_key_event(key(KeyCode::Esc)), Action::Quit);
    }

    #[test]
    fn test_parse_key_event_toggles() {
        assert_eq!(parse_key_event(key(KeyCode::Char('1'))), Action::ToggleStarfield);
        assert_eq!(parse_key_event(key(KeyCode::Char('2'))), Action::TogglePlanets);
        assert_eq!(parse_key_event(key(KeyCode::Char('3'))), Action::ToggleDisk);
        assert_eq!(parse_key_event(key(KeyCode::Char('4'))), Action::ToggleLensing);
    }

    #[test]
    fn test_parse_key_event_mass() {
        assert_eq!(parse_key_event(key(KeyCode::Char('+'))), Action::MassUp);
        assert_eq!(parse_key_event(key(KeyCode::Char('='))), Action::MassUp);
        assert_eq!(parse_key_event(key(KeyCode::Char('-'))), Action::MassDown);
    }

    #[test]
    fn test_parse_key_event_disk() {
        assert_eq!(parse_key_event(key(KeyCode::Char(']'))), Action::DiskGrow);
        assert_eq!(parse_key_event(key(KeyCode::Char('['))), Action::DiskShrink);
    }

    #[test]
    fn test_parse_key_event_camera() {
        assert_eq!(parse_key_event(key(KeyCode::Left)), Action::OrbitLeft);
        assert_eq!(parse_key_event(key(KeyCode::Up)), Action::OrbitUp);
        assert_eq!(parse_key_event(key(KeyCode::Char('w'))), Action::ZoomIn);
        assert_eq!(parse_key_event(key(KeyCode::Char('s'))), Action::ZoomOut);
    }

    #[test]
    fn test_parse_key_event_reset() {
        assert_eq!(parse_key_event(key(KeyCode::Char('r'))), Action::Reset);
    }

    #[test]
    fn test_frame_area_reserves_status_rows() {
        assert_eq!(frame_area(80, 24), (80, 22));
        assert_eq!(frame_area(80, 1), (80, 0));
    }

    #[test]
    fn test_parse_key_event_none() {
        assert_eq!(parse_key_event(key(KeyCode::Char('x'))), Action::None);
    }
}
