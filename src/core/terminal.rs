/// Terminal setup and teardown around a game session
use std::io::stdout;

use anyhow::Result;
use crossterm::event::{
    DisableFocusChange, EnableFocusChange, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::supports_keyboard_enhancement;
use ratatui::DefaultTerminal;
use tracing::{info, warn};

/// Owns the raw-mode alternate screen. Dropping it puts the terminal back,
/// on the error path too.
pub struct TerminalSession {
    pub terminal: DefaultTerminal,
    enhanced: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        let mut session = Self { terminal: ratatui::init(), enhanced: false };
        // Release events are only reported under the keyboard enhancement protocol.
        match supports_keyboard_enhancement() {
            Ok(true) => {
                execute!(
                    stdout(),
                    PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
                )?;
                session.enhanced = true;
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "could not query keyboard enhancement support"),
        }
        execute!(stdout(), EnableFocusChange)?;
        info!(enhanced = session.enhanced, "terminal ready");
        Ok(session)
    }

    /// Whether key releases will arrive as events.
    pub fn reports_releases(&self) -> bool {
        self.enhanced
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableFocusChange);
        if self.enhanced {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        ratatui::restore();
    }
}
