use color_eyre::Result;
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use super::{
    event::{AppEvent, EventHandler},
    widgets::TextInput,
};
use crate::application::TodoSync;
use crate::domain::{validate_todo_text, Priority, PriorityFilter, Todo, TodoId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Splash,
    Main,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusedPane {
    Input,
    TaskList,
}

/// Local copy of a task while it is being edited. Discarded on cancel.
struct EditState {
    id: TodoId,
    input: TextInput,
    priority: Priority,
}

pub struct App {
    sync: TodoSync,

    mode: AppMode,
    focused_pane: FocusedPane,

    // New task controls
    input: TextInput,
    new_priority: Priority,

    filter: PriorityFilter,
    editing: Option<EditState>,
    task_list_state: TableState,
}

impl App {
    pub fn new(sync: TodoSync) -> Self {
        let mut app = Self {
            sync,
            mode: AppMode::Splash,
            focused_pane: FocusedPane::Input,
            input: TextInput::new(),
            new_priority: Priority::Low,
            filter: PriorityFilter::All,
            editing: None,
            task_list_state: TableState::default(),
        };
        app.input.set_focused(true);
        app
    }

    pub async fn initialize(&mut self) {
        self.sync.initialize().await;
        self.clamp_selection();
    }

    fn visible_ids(&self) -> Vec<TodoId> {
        self.sync.visible(self.filter).iter().map(|t| t.id).collect()
    }

    fn selected_todo(&self) -> Option<Todo> {
        let index = self.task_list_state.selected()?;
        self.sync.visible(self.filter).get(index).map(|t| (*t).clone())
    }

    // Keep the selection inside the visible rows after a refresh or filter change.
    fn clamp_selection(&mut self) {
        let len = self.visible_ids().len();
        if len == 0 {
            self.task_list_state.select(None);
        } else {
            let index = self.task_list_state.selected().unwrap_or(0).min(len - 1);
            self.task_list_state.select(Some(index));
        }
    }

    fn set_focus(&mut self, pane: FocusedPane) {
        self.focused_pane = pane;
        self.input.set_focused(pane == FocusedPane::Input);
    }

    fn active_input(&mut self) -> Option<&mut TextInput> {
        if let Some(edit) = self.editing.as_mut() {
            return Some(&mut edit.input);
        }
        if self.focused_pane == FocusedPane::Input {
            return Some(&mut self.input);
        }
        None
    }

    fn next_task(&mut self) {
        let len = self.visible_ids().len();
        if len == 0 {
            return;
        }
        let i = match self.task_list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.task_list_state.select(Some(i));
    }

    fn previous_task(&mut self) {
        let len = self.visible_ids().len();
        if len == 0 {
            return;
        }
        let i = match self.task_list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.task_list_state.select(Some(i));
    }

    async fn submit_new_todo(&mut self) {
        let text = self.input.text().to_string();
        if text.trim().is_empty() {
            return;
        }
        self.sync.create(&text, self.new_priority).await;
        self.input.clear();
        self.clamp_selection();
    }

    fn start_edit(&mut self) {
        if let Some(todo) = self.selected_todo() {
            let mut input = TextInput::with_text(&todo.todo);
            input.set_focused(true);
            self.editing = Some(EditState {
                id: todo.id,
                input,
                priority: todo.priority,
            });
        }
    }

    async fn save_edit(&mut self) {
        let Some(edit) = self.editing.as_ref() else {
            return;
        };
        if edit.input.text().trim().is_empty() {
            return;
        }

        let (id, text, priority) = (edit.id, edit.input.text().to_string(), edit.priority);
        let acknowledged = self.sync.update(id, &text, priority).await;

        // Text rejected before sending stays open for correction
        if !acknowledged && validate_todo_text(&text).is_err() {
            return;
        }
        self.editing = None;
        self.clamp_selection();
    }

    async fn delete_selected(&mut self) {
        if let Some(todo) = self.selected_todo() {
            self.sync.delete(todo.id).await;
            self.clamp_selection();
        }
    }

    /// Applies one event. Returns true when the app should exit.
    pub async fn handle_event(&mut self, event: AppEvent) -> Result<bool> {
        match self.mode {
            AppMode::Splash => {
                match event {
                    AppEvent::Quit => return Ok(true),
                    AppEvent::Tick => {}
                    _ => self.mode = AppMode::Main,
                }
                return Ok(false);
            }
            AppMode::Help => {
                match event {
                    AppEvent::Quit => return Ok(true),
                    AppEvent::Tick => {}
                    _ => self.mode = AppMode::Main,
                }
                return Ok(false);
            }
            AppMode::Main => {}
        }

        match event {
            AppEvent::Quit => return Ok(true),
            AppEvent::Tick => {}

            AppEvent::Refresh => {
                self.sync.refresh().await;
                self.clamp_selection();
            }

            AppEvent::CycleFilter => {
                self.filter = self.filter.next();
                self.clamp_selection();
            }

            AppEvent::CyclePriority => match self.editing.as_mut() {
                Some(edit) => edit.priority = edit.priority.next(),
                None => self.new_priority = self.new_priority.next(),
            },

            AppEvent::Tab => {
                if self.editing.is_none() {
                    let next = match self.focused_pane {
                        FocusedPane::Input => FocusedPane::TaskList,
                        FocusedPane::TaskList => FocusedPane::Input,
                    };
                    self.set_focus(next);
                }
            }

            AppEvent::Cancel => {
                if self.editing.is_some() {
                    self.editing = None;
                } else if self.focused_pane == FocusedPane::Input {
                    self.set_focus(FocusedPane::TaskList);
                }
            }

            AppEvent::Enter => {
                if self.editing.is_some() {
                    self.save_edit().await;
                } else if self.focused_pane == FocusedPane::Input {
                    self.submit_new_todo().await;
                } else {
                    self.start_edit();
                }
            }

            AppEvent::NextTask => {
                if self.editing.is_none() {
                    self.next_task();
                }
            }

            AppEvent::PreviousTask => {
                if self.editing.is_none() {
                    self.previous_task();
                }
            }

            AppEvent::Character(c) => {
                if let Some(input) = self.active_input() {
                    input.insert_char(c);
                    return Ok(false);
                }

                match c {
                    'q' => return Ok(true),
                    'j' => self.next_task(),
                    'k' => self.previous_task(),
                    'e' => self.start_edit(),
                    'd' => self.delete_selected().await,
                    'f' => {
                        self.filter = self.filter.next();
                        self.clamp_selection();
                    }
                    'p' => self.new_priority = self.new_priority.next(),
                    'r' => {
                        self.sync.refresh().await;
                        self.clamp_selection();
                    }
                    '?' => self.mode = AppMode::Help,
                    'a' | 'i' | '/' => self.set_focus(FocusedPane::Input),
                    _ => {}
                }
            }

            AppEvent::Backspace => {
                if let Some(input) = self.active_input() {
                    input.delete_char();
                }
            }
            AppEvent::Delete => {
                if let Some(input) = self.active_input() {
                    input.delete_forward();
                }
            }
            AppEvent::CursorLeft => {
                if let Some(input) = self.active_input() {
                    input.move_left();
                }
            }
            AppEvent::CursorRight => {
                if let Some(input) = self.active_input() {
                    input.move_right();
                }
            }
            AppEvent::CursorHome => {
                if let Some(input) = self.active_input() {
                    input.move_home();
                }
            }
            AppEvent::CursorEnd => {
                if let Some(input) = self.active_input() {
                    input.move_end();
                }
            }
        }

        Ok(false)
    }

    pub fn render(&mut self, frame: &mut Frame) {
        if self.mode == AppMode::Splash {
            self.render_splash(frame);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(3), // Input + priority
                Constraint::Length(1), // Filter
                Constraint::Min(0),    // List
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        let title = Paragraph::new("What are we doing today?")
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(title, chunks[0]);

        self.render_input_row(frame, chunks[1]);
        self.render_filter(frame, chunks[2]);
        self.render_task_list(frame, chunks[3]);
        self.render_status_bar(frame, chunks[4]);

        if self.mode == AppMode::Help {
            self.render_help(frame);
        }
    }

    fn render_splash(&self, frame: &mut Frame) {
        let area = Self::centered_rect(60, 40, frame.area());
        let lines = vec![
            Line::from(Span::styled(
                "Oi!",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Get productive"),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to start",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_input_row(&self, frame: &mut Frame, area: Rect) {
        let row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(14)])
            .split(area);

        self.input.render(frame, row[0], "New To-Do", "Add a new to-do");

        let priority = Paragraph::new(Span::styled(
            self.new_priority.label(),
            Style::default().fg(priority_color(self.new_priority)),
        ))
        .block(
            Block::default()
                .title("Priority")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Gray)),
        );
        frame.render_widget(priority, row[1]);
    }

    fn render_filter(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled("Filter by Priority: ", Style::default().fg(Color::Gray)),
            Span::styled(
                self.filter.label(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_task_list(&mut self, frame: &mut Frame, area: Rect) {
        let visible = self.sync.visible(self.filter);

        let border_style = if self.focused_pane == FocusedPane::TaskList {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };
        let block = Block::default()
            .title(format!("To-Dos ({})", visible.len()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut notices = Vec::new();
        if self.sync.is_loading() {
            notices.push(Line::styled("Loading...", Style::default().fg(Color::Gray)));
        }
        if let Some(error) = self.sync.error() {
            notices.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
        }
        if !self.sync.is_loading() && visible.is_empty() {
            notices.push(Line::styled(
                "No tasks available",
                Style::default().fg(Color::Gray),
            ));
        }

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(notices.len() as u16), Constraint::Min(0)])
            .split(inner);
        frame.render_widget(Paragraph::new(notices).wrap(Wrap { trim: true }), parts[0]);

        let rows: Vec<Row> = visible
            .iter()
            .map(|todo| match &self.editing {
                Some(edit) if edit.id == todo.id => Row::new(vec![
                    Cell::from(edit.priority.label())
                        .style(Style::default().fg(priority_color(edit.priority))),
                    Cell::from(Line::from(vec![
                        Span::styled(
                            edit.input.text().to_string(),
                            Style::default()
                                .fg(Color::Yellow)
                                .add_modifier(Modifier::UNDERLINED),
                        ),
                        Span::styled(
                            "  [Enter: Save | Esc: Cancel]",
                            Style::default().fg(Color::DarkGray),
                        ),
                    ])),
                ]),
                _ => Row::new(vec![
                    Cell::from(todo.priority.label())
                        .style(Style::default().fg(priority_color(todo.priority))),
                    Cell::from(todo.todo.as_str()),
                ]),
            })
            .collect();

        let table = Table::new(rows, [Constraint::Length(8), Constraint::Min(20)])
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");

        frame.render_stateful_widget(table, parts[1], &mut self.task_list_state);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let help_text = if self.editing.is_some() {
            "Enter: save | Esc: cancel | Shift+Tab: priority"
        } else {
            match self.focused_pane {
                FocusedPane::Input => {
                    "Enter: add | Shift+Tab: priority | Tab: list | Ctrl+F: filter | Ctrl+C: quit"
                }
                FocusedPane::TaskList => {
                    "j/k: move | e: edit | d: delete | f: filter | a: add | r: refresh | ?: help | q: quit"
                }
            }
        };

        let synced = self
            .sync
            .last_synced()
            .map(|at| {
                format!(
                    "synced {}",
                    at.with_timezone(&chrono::Local).format("%H:%M:%S")
                )
            })
            .unwrap_or_else(|| "not synced".to_string());

        let line = Line::from(vec![
            Span::styled(help_text, Style::default().fg(Color::DarkGray)),
            Span::raw("  "),
            Span::styled(synced, Style::default().fg(Color::Gray)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let popup_area = Self::centered_rect(60, 70, frame.area());

        frame.render_widget(Clear, popup_area);

        let help_text = [
            "To-Do Help",
            "",
            "Adding:",
            "  Type in the input  - Text of the new to-do (3-100 characters)",
            "  Shift+Tab          - Cycle priority (low/medium/high)",
            "  Enter              - Add",
            "",
            "List:",
            "  j/k or Up/Down     - Move selection",
            "  e or Enter         - Edit selected",
            "  d                  - Delete selected",
            "  f or Ctrl+F        - Cycle priority filter",
            "  r or Ctrl+R        - Refresh from server",
            "",
            "Editing:",
            "  Enter              - Save",
            "  Esc                - Cancel",
            "",
            "General:",
            "  Tab                - Switch between input and list",
            "  ?                  - Show this help",
            "  q                  - Quit (from the list)",
            "  Ctrl+C             - Force quit",
            "",
            "Press any key to close this help",
        ]
        .join("\n");

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().title("Help").borders(Borders::ALL))
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    }
}

pub async fn run_tui(mut app: App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app).await;

    // Restore the terminal even when the loop failed
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    app.initialize().await;

    let mut event_handler = EventHandler::new();

    loop {
        terminal.draw(|frame| app.render(frame))?;

        let event = event_handler.next_event().await?;
        if app.handle_event(event).await? || event_handler.should_quit() {
            break;
        }
    }

    Ok(())
}
