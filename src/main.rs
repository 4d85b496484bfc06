use std::io;
use std::time::Instant;

use crossterm::cursor::SetCursorStyle;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

mod app;
mod config;
mod editor;
mod events;
mod lookup;
mod suggest;
mod text_layout;
mod theme;
mod ui;

use app::App;
use config::Config;
use events::AppEvent;
use lookup::LookupAdapter;
use theme::Theme;

const MAX_ADAPTER_EVENTS_PER_LOOP: usize = 128;
const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LaunchOptions {
    endpoint: Option<String>,
    config_path: Option<String>,
}

fn main() -> io::Result<()> {
    let launch_options = parse_launch_options(std::env::args().skip(1))?;
    let mut config = Config::load_or_default(
        launch_options
            .config_path
            .as_deref()
            .unwrap_or(DEFAULT_CONFIG_FILE),
    );
    if let Some(endpoint) = launch_options.endpoint {
        config.endpoint = endpoint;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetCursorStyle::SteadyBar
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    let theme = Theme::load_or_default("theme.toml");

    let result = run_app(&mut terminal, App::new(&config), &config, &theme);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        SetCursorStyle::DefaultUserShape,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn parse_launch_options<I>(args: I) -> io::Result<LaunchOptions>
where
    I: IntoIterator<Item = String>,
{
    let mut options = LaunchOptions::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--endpoint" => {
                let Some(value) = iter.next() else {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "--endpoint requires a URL",
                    ));
                };
                options.endpoint = Some(value);
            }
            "--config" => {
                let Some(value) = iter.next() else {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "--config requires a file path",
                    ));
                };
                options.config_path = Some(value);
            }
            unknown => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unknown argument `{unknown}`"),
                ));
            }
        }
    }
    Ok(options)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    config: &Config,
    theme: &Theme,
) -> io::Result<()> {
    let lookup_adapter = LookupAdapter::new(config.endpoint.clone());

    while app.running {
        for event in lookup_adapter.drain_events_limited(MAX_ADAPTER_EVENTS_PER_LOOP) {
            app.on_lookup_event(event);
        }
        if let Some(request) = app.suggestions_mut().take_due_lookup(Instant::now()) {
            lookup_adapter.send_lookup(request.generation, request.query);
        }

        terminal.draw(|frame| ui::render(frame, &app, theme))?;

        let size = terminal.size()?;
        let screen = Rect::new(0, 0, size.width, size.height);
        let width = ui::composer_text_width(screen);
        let now = Instant::now();
        match events::next_event()? {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Quit => app.quit(),
            AppEvent::NextPane => app.next_pane(now),
            AppEvent::PrevPane => app.prev_pane(now),
            AppEvent::MoveUp => app.move_up(),
            AppEvent::MoveDown => {
                let max_scroll = ui::log_max_scroll(screen, &app);
                app.move_down(max_scroll);
            }
            AppEvent::CursorLeft => app.cursor_left(width, now),
            AppEvent::CursorRight => app.cursor_right(width, now),
            AppEvent::CursorHome => app.cursor_home(width, now),
            AppEvent::CursorEnd => app.cursor_end(width, now),
            AppEvent::InputChar(c) => app.input_char(c, width, now),
            AppEvent::Backspace => app.backspace(width, now),
            AppEvent::DeleteForward => app.delete_forward(width, now),
            AppEvent::Submit => app.submit(width, now),
            AppEvent::Cancel => app.cancel(now),
            AppEvent::MouseScrollUp => app.scroll_log_up(),
            AppEvent::MouseScrollDown => {
                let max_scroll = ui::log_max_scroll(screen, &app);
                app.scroll_log_down(max_scroll);
            }
            AppEvent::MouseLeftClick(column, row) => {
                if let Some(row_idx) = ui::popup_row_hit(screen, &app, column, row) {
                    app.accept_popup_row(row_idx, width, now);
                } else if let Some(offset) = ui::composer_click_offset(screen, &app, column, row) {
                    app.click_composer(offset, width, now);
                } else if let Some(pane) = ui::pane_hit_test(screen, &app, column, row) {
                    app.active_pane = pane;
                }
            }
        }
    }

    Ok(())
}
