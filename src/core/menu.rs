use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Centred sub-rectangle of at most `w` x `h` cells.
pub fn centered(area: Rect, w: u16, h: u16) -> Rect {
    let w = w.min(area.width);
    let h = h.min(area.height);
    Rect::new(area.x + (area.width - w) / 2, area.y + (area.height - h) / 2, w, h)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Start,
    Help,
    Credits,
    Quit,
}

impl MenuEntry {
    pub const ALL: [MenuEntry; 4] = [MenuEntry::Start, MenuEntry::Help, MenuEntry::Credits, MenuEntry::Quit];

    fn label(self) -> &'static str {
        match self {
            MenuEntry::Start => "Start",
            MenuEntry::Help => "Help",
            MenuEntry::Credits => "Credits",
            MenuEntry::Quit => "Quit",
        }
    }
}

/// Info panel shown beside the menu. At most one is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Help,
    Credits,
}

/// What the menu wants the game to do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Start,
    Quit,
}

const HELP_TEXT: &str = "Collect every glowing crystal to escape.\n\n\
    W A S D / arrows  move\n\
    L                 lantern on/off\n\
    Esc               pause\n\n\
    The lantern drains while lit and recharges while off.\n\
    Its light shrinks as the battery runs down.\n\
    Stay out of the pits.";

const CREDITS_TEXT: &str = "Caverna\n\n\
    A small cave crawler for the terminal.\n\
    Built with ratatui and crossterm.";

#[derive(Debug, Default)]
pub struct MenuState {
    pub selected: usize,
    pub panel: Option<Panel>,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_entry(&self) -> MenuEntry {
        MenuEntry::ALL[self.selected]
    }

    /// Opens `panel`, or closes it when it is already open. Opening one closes the other.
    pub fn toggle_panel(&mut self, panel: Panel) {
        self.panel = if self.panel == Some(panel) { None } else { Some(panel) };
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Option<MenuAction> {
        match code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(MenuEntry::ALL.len() - 1),
            KeyCode::Enter => return self.activate(self.selected_entry()),
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                's' => return self.activate(MenuEntry::Start),
                'h' => return self.activate(MenuEntry::Help),
                'c' => return self.activate(MenuEntry::Credits),
                'q' => return Some(MenuAction::Quit),
                _ => {}
            },
            KeyCode::Esc if self.panel.is_some() => self.panel = None,
            KeyCode::Esc => return Some(MenuAction::Quit),
            _ => {}
        }
        None
    }

    fn activate(&mut self, entry: MenuEntry) -> Option<MenuAction> {
        match entry {
            MenuEntry::Start => Some(MenuAction::Start),
            MenuEntry::Help => {
                self.toggle_panel(Panel::Help);
                None
            }
            MenuEntry::Credits => {
                self.toggle_panel(Panel::Credits);
                None
            }
            MenuEntry::Quit => Some(MenuAction::Quit),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let width = if self.panel.is_some() { 72 } else { 32 };
        let overlay = centered(area, width, 14);
        f.render_widget(Clear, overlay);

        let [menu_area, panel_area] = if self.panel.is_some() {
            Layout::horizontal([Constraint::Length(28), Constraint::Min(0)]).areas(overlay)
        } else {
            Layout::horizontal([Constraint::Min(0), Constraint::Length(0)]).areas(overlay)
        };

        let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(2)]).split(menu_area);

        let items: Vec<ListItem> = MenuEntry::ALL
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == self.selected {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let marker = if i == self.selected { "▶" } else { " " };
                ListItem::new(format!(" {marker} {}", entry.label())).style(style)
            })
            .collect();

        f.render_widget(
            List::new(items).block(Block::default().title(" CAVERNA ").borders(Borders::ALL)),
            chunks[0],
        );
        f.render_widget(
            Paragraph::new("[↑/↓] Move  [Enter] Select\n[S] Start  [Q] Quit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray)),
            chunks[1],
        );

        if let Some(panel) = self.panel {
            let (title, text) = match panel {
                Panel::Help => (" HELP ", HELP_TEXT),
                Panel::Credits => (" CREDITS ", CREDITS_TEXT),
            };
            f.render_widget(
                Paragraph::new(text)
                    .wrap(Wrap { trim: false })
                    .block(Block::default().title(title).borders(Borders::ALL)),
                panel_area,
            );
        }
    }
}
