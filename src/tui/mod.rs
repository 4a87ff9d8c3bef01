//! Interactive terminal form.
//!
//! Renders the [`FormController`] state and maps key presses onto its
//! actions. Network actions run on spawned tasks and come back through the
//! event channel, so the screen keeps redrawing while a request is out.

pub mod event;
pub mod toast;

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Config;
use crate::form::{FormController, ValidationState};
use crate::net::LookupClient;
use crate::notify::Severity;
use crate::render;

use self::event::{Completion, Event, EventHandler, Outcome};
use self::toast::ToastSink;

const TICK_RATE: Duration = Duration::from_millis(250);
const TOAST_WIDTH: u16 = 48;
const TOAST_HEIGHT: u16 = 4;

/// Terminal form state.
pub struct App {
    pub form: FormController,
    pub toasts: ToastSink,
    pub should_quit: bool,
    client: LookupClient,
}

impl App {
    pub fn new(client: LookupClient, toast_life: Duration) -> Self {
        Self {
            form: FormController::new(),
            toasts: ToastSink::new(toast_life),
            should_quit: false,
            client,
        }
    }

    /// The task yields whether its completion reached the form.
    fn spawn_resolve_self(&mut self, tx: &UnboundedSender<Event>) -> JoinHandle<bool> {
        let id = self.form.begin_resolve_self();
        debug!(request = %id, "get server address");
        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = Outcome::SelfAddress(client.resolve_self().await);
            post(&tx, Completion { id, outcome })
        })
    }

    fn spawn_lookup(&mut self, tx: &UnboundedSender<Event>) -> JoinHandle<bool> {
        let (id, address) = self.form.begin_lookup(&mut self.toasts);
        debug!(request = %id, address = %address, "get address info");
        let client = self.client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = Outcome::Lookup(client.lookup(&address).await);
            post(&tx, Completion { id, outcome })
        })
    }

    fn complete(&mut self, completion: Completion) {
        match completion.outcome {
            Outcome::SelfAddress(result) => {
                self.form
                    .apply_resolve_self(completion.id, result, &mut self.toasts)
            }
            Outcome::Lookup(result) => {
                self.form
                    .apply_lookup(completion.id, result, &mut self.toasts)
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, tx: &UnboundedSender<Event>) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,

            KeyCode::Enter => {
                self.form.confirm();
            }
            KeyCode::F(2) => {
                self.spawn_resolve_self(tx);
            }
            KeyCode::Char('s') if ctrl => {
                self.spawn_resolve_self(tx);
            }
            KeyCode::F(3) => {
                self.spawn_lookup(tx);
            }
            KeyCode::Char('l') if ctrl => {
                self.spawn_lookup(tx);
            }

            KeyCode::Backspace => {
                let mut text = self.form.address().to_string();
                text.pop();
                self.form.edit(text);
            }
            KeyCode::Char(c) if !ctrl => {
                let mut text = self.form.address().to_string();
                text.push(c);
                self.form.edit(text);
            }
            _ => {}
        }
    }
}

/// Hand a finished request back to the draw loop. The send fails only once
/// the form has closed, and then the result is discarded.
fn post(tx: &UnboundedSender<Event>, completion: Completion) -> bool {
    let id = completion.id;
    match tx.send(Event::Completed(completion)) {
        Ok(()) => true,
        Err(_) => {
            debug!(request = %id, "form closed, dropping completion");
            false
        }
    }
}

/// Run the interactive form until the user quits.
pub async fn run(config: &Config, client: LookupClient) -> anyhow::Result<()> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;

    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let mut app = App::new(client, config.toast_life());

    let result = match EventHandler::new(TICK_RATE) {
        Ok(mut events) => run_event_loop(&mut terminal, &mut app, &mut events).await,
        Err(e) => Err(e),
    };

    // Restore terminal regardless of success/failure.
    let _ = disable_raw_mode();
    let _ = io::stdout().execute(LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    info!(pending = app.form.pending(), "form closed");
    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        app.toasts.expire(Instant::now());
        terminal.draw(|frame| draw(frame, app))?;

        if app.should_quit {
            return Ok(());
        }

        match events.next().await {
            Some(Event::Key(key)) => app.handle_key(key, &events.sender()),
            Some(Event::Completed(completion)) => app.complete(completion),
            // ratatui redraws at the new size on the next pass
            Some(Event::Resize(cols, rows)) => debug!(cols, rows, "terminal resized"),
            Some(Event::Tick) => {}
            None => app.should_quit = true,
        }
    }
}

fn draw(frame: &mut Frame, app: &App) {
    let [input_area, error_area, info_area, help_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(4),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let border = match app.form.validation() {
        ValidationState::Invalid => Style::default().fg(Color::Red),
        ValidationState::Valid => Style::default().fg(Color::Green),
        ValidationState::Unchecked => Style::default(),
    };
    let input = Paragraph::new(app.form.address()).block(
        Block::bordered()
            .title(" IP Address ")
            .title_bottom(" Enter a valid IPV4 address ")
            .border_style(border),
    );
    frame.render_widget(input, input_area);
    let typed = app.form.address().chars().count() as u16;
    frame.set_cursor_position((
        (input_area.x + 1).saturating_add(typed).min(input_area.right().saturating_sub(2)),
        input_area.y + 1,
    ));

    if let Some(message) = app.form.inline_error() {
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::Red))),
            error_area,
        );
    }

    let lines: Vec<Line> = match app.form.info() {
        Some(record) => render::describe(record)
            .into_iter()
            .flat_map(|p| [Line::from(p), Line::default()])
            .collect(),
        None => vec![Line::from(render::NO_INFO)],
    };
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::bordered().title(" IP information ")),
        info_area,
    );

    let mut help = vec![Span::styled(
        "Enter confirm | F2 server IP | F3 IP information | Esc quit",
        Style::default().add_modifier(Modifier::DIM),
    )];
    if app.form.pending() > 0 {
        help.push(Span::raw(format!("  ({} pending)", app.form.pending())));
    }
    frame.render_widget(Paragraph::new(Line::from(help)), help_area);

    draw_toasts(frame, app);
}

fn draw_toasts(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let width = TOAST_WIDTH.min(area.width);
    let mut y = area.y;

    for toast in app.toasts.visible() {
        if y + TOAST_HEIGHT > area.bottom() {
            break;
        }
        let rect = Rect::new(area.right() - width, y, width, TOAST_HEIGHT);
        let color = match toast.severity {
            Severity::Success => Color::Green,
            Severity::Info => Color::Cyan,
            Severity::Warn => Color::Yellow,
            Severity::Error => Color::Red,
        };
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(toast.message.as_str())
                .wrap(Wrap { trim: true })
                .block(
                    Block::bordered()
                        .title(format!(" {} ", toast.severity.summary()))
                        .border_style(Style::default().fg(color)),
                ),
            rect,
        );
        y += TOAST_HEIGHT;
    }
}
