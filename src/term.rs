#![forbid(unsafe_code)]

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, MoveToNextLine, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};

use crate::app::Console;
use crate::ui::{CHROME_ROWS, MIN_PANEL_WIDTH};

/// Status lines kept clear below the panels.
const STATUS_ROWS: usize = 3;

/// Raw-mode console on the alternate screen; restores the terminal on drop.
pub struct TerminalConsole {
    out: Stdout,
    last_frame: Vec<String>,
}

impl TerminalConsole {
    pub fn enter() -> io::Result<Self> {
        let mut out = io::stdout();
        enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(Self {
            out,
            last_frame: Vec::new(),
        })
    }

    fn next_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(key);
                }
            }
        }
    }

    /// Redraws the last frame with `prompt` on the line below it.
    fn show_prompt(&mut self, prompt: &str) -> io::Result<()> {
        let frame = std::mem::take(&mut self.last_frame);
        self.draw(&frame)?;
        queue!(self.out, MoveToNextLine(1), Clear(ClearType::CurrentLine), Print(prompt), Show)?;
        self.out.flush()
    }
}

impl Drop for TerminalConsole {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Arrow keys, Enter and Backspace map onto the letter commands.
fn command_char(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some('q'),
        KeyCode::Char(ch) => Some(ch),
        KeyCode::Up => Some('w'),
        KeyCode::Down => Some('s'),
        KeyCode::Left => Some('a'),
        KeyCode::Right => Some('d'),
        KeyCode::Enter => Some('o'),
        KeyCode::Backspace => Some('p'),
        _ => None,
    }
}

/// Panel width that fits two panels and the separator into `columns`.
pub fn panel_width_for(columns: u16) -> usize {
    (usize::from(columns).saturating_sub(3) / 2).max(MIN_PANEL_WIDTH)
}

pub fn default_panel_width() -> usize {
    terminal::size().map(|(cols, _)| panel_width_for(cols)).unwrap_or(60)
}

impl Console for TerminalConsole {
    fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        queue!(self.out, Hide, MoveTo(0, 0), Clear(ClearType::All))?;
        for (row, line) in lines.iter().enumerate() {
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            queue!(self.out, MoveTo(0, row), Print(line))?;
        }
        self.out.flush()?;
        self.last_frame = lines.to_vec();
        Ok(())
    }

    fn read_key(&mut self) -> io::Result<char> {
        loop {
            let key = self.next_key()?;
            if let Some(ch) = command_char(key) {
                return Ok(ch);
            }
        }
    }

    fn read_line(&mut self, label: &str) -> io::Result<Option<String>> {
        let mut value = String::new();
        loop {
            self.show_prompt(&format!("{label}{value}"))?;
            let key = self.next_key()?;
            match key.code {
                KeyCode::Enter => return Ok(Some(value)),
                KeyCode::Esc => return Ok(None),
                KeyCode::Backspace => {
                    value.pop();
                }
                KeyCode::Char(ch) => value.push(ch),
                _ => {}
            }
        }
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.show_prompt(&format!("{question} "))?;
        let key = self.next_key()?;
        Ok(matches!(key.code, KeyCode::Char('y' | 'Y')))
    }

    fn view_height(&self) -> Option<usize> {
        let (_, rows) = terminal::size().ok()?;
        // panel header row plus room for status lines
        let reserved = CHROME_ROWS + 1 + STATUS_ROWS;
        Some(usize::from(rows).saturating_sub(reserved).max(1))
    }
}
