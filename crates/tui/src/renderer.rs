use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use barrage_core::{Director, OverlayOptions, Stage, StageHost, SystemClock, svg};
use barrage_protocol::{Comment, Point, RenderCommand, ThemeToken, Viewport};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};
use unicode_width::UnicodeWidthChar;

/// The only container the terminal host can resolve.
pub const SCREEN_CONTAINER: &str = "#screen";

/// Surface units per terminal cell. With the default 0.08 px/ms speed a
/// bullet crosses ten columns per second.
const CELL_WIDTH: f64 = 8.0;
const CELL_HEIGHT: f64 = 16.0;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const SNAPSHOT_FILE: &str = "barrage-snapshot.svg";
const KEY_HELP: &str = "space pause | v show/hide | r replay | s snapshot | q quit";

type TuiDirector = Director<Stage<SystemClock>, SystemClock>;

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::BulletText => Color::White,
        ThemeToken::BulletAccent => Color::LightYellow,
        ThemeToken::BulletMuted => Color::Gray,
        ThemeToken::BulletHeld => Color::LightGreen,
        ThemeToken::OverlayBackground => Color::Black,
        ThemeToken::HeaderBackground => Color::DarkGray,
        ThemeToken::HeaderText => Color::White,
    }
}

/// Content area below the one-line header.
fn content_area(area: Rect) -> Rect {
    Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1))
}

fn stage_size(area: Rect) -> (f64, f64) {
    (
        f64::from(area.width) * CELL_WIDTH,
        f64::from(area.height) * CELL_HEIGHT,
    )
}

fn viewport_for(area: Rect) -> Viewport {
    Viewport::new(f64::from(area.width), f64::from(area.height))
}

pub fn run_tui(comments: &[Comment], options: OverlayOptions) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = play(&mut terminal, comments, options);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn play(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    comments: &[Comment],
    options: OverlayOptions,
) -> Result<()> {
    let size = terminal.size()?;
    let mut area = content_area(Rect::new(0, 0, size.width, size.height));
    let (width, height) = stage_size(area);

    let clock = SystemClock::new();
    let mut host = StageHost::new(clock)
        .with_container(SCREEN_CONTAINER, width, height)
        .with_glyph_size(CELL_WIDTH, CELL_HEIGHT);
    let mut director: TuiDirector = Director::new(&mut host, options, clock)?;
    director.push_comments(comments.iter().cloned());

    loop {
        director.tick();

        let size = terminal.size()?;
        let next_area = content_area(Rect::new(0, 0, size.width, size.height));
        if next_area != area {
            area = next_area;
            let (width, height) = stage_size(area);
            director.surface_mut().resize(width, height);
        }

        let viewport = viewport_for(area);
        let cmds = director.surface_mut().render(&viewport);
        terminal.draw(|frame| draw(frame, &director, &cmds, area))?;

        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char(' ') => {
                        if director.is_playing() {
                            director.pause();
                        } else {
                            director.start();
                        }
                    }
                    KeyCode::Char('v') => {
                        if director.is_visible() {
                            director.hide();
                        } else {
                            director.show();
                        }
                    }
                    KeyCode::Char('r') => director.push_comments(comments.iter().cloned()),
                    KeyCode::Char('s') => save_snapshot(&mut director)?,
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        let point = Point::new(
                            f64::from(mouse.column) - f64::from(area.x),
                            f64::from(mouse.row) - f64::from(area.y),
                        );
                        director.surface_mut().hold_at(&viewport, point);
                    }
                    MouseEventKind::Up(MouseButton::Left) => director.surface_mut().release_all(),
                    _ => {}
                },
                _ => {}
            }
        }
    }

    Ok(())
}

/// Write the current frame, in surface units, as an SVG file.
fn save_snapshot(director: &mut TuiDirector) -> Result<()> {
    let stage = director.surface_mut();
    let (width, height) = (stage.width(), stage.height());
    let cmds = stage.render(&Viewport::new(width, height));
    std::fs::write(SNAPSHOT_FILE, svg::render_svg(&cmds, width, height, true))?;
    tracing::info!(path = SNAPSHOT_FILE, "saved snapshot");
    Ok(())
}

fn draw(frame: &mut Frame, director: &TuiDirector, cmds: &[RenderCommand], area: Rect) {
    let full = frame.area();

    let state = if director.is_playing() { "playing" } else { "paused" };
    let header = Block::default()
        .title(format!(
            " barrage | {state} | {} on screen | {} queued | {KEY_HELP} ",
            director.surface().len(),
            director.queue().len(),
        ))
        .style(
            Style::default()
                .fg(theme_to_color(ThemeToken::HeaderText))
                .bg(theme_to_color(ThemeToken::HeaderBackground)),
        );
    frame.render_widget(header, Rect::new(0, 0, full.width, 1));

    let block = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(theme_to_color(ThemeToken::OverlayBackground)));
    frame.render_widget(block, area);

    let buf = frame.buffer_mut();
    for cmd in cmds {
        let RenderCommand::DrawText {
            position,
            text,
            color,
            ..
        } = cmd
        else {
            continue;
        };

        let row = position.y.floor();
        if row < 0.0 || row >= f64::from(area.height) {
            continue;
        }
        let y = area.y + row as u16;
        let fg = theme_to_color(*color);

        // Bullets enter from the right and leave on the left, so the text
        // is often only partly on screen.
        let mut col = position.x.round() as i64;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as i64;
            if col >= 0 && col + w <= i64::from(area.width) {
                let x = area.x + col as u16;
                buf[(x, y)]
                    .set_char(ch)
                    .set_fg(fg)
                    .set_bg(theme_to_color(ThemeToken::OverlayBackground));
            }
            col += w;
            if col >= i64::from(area.width) {
                break;
            }
        }
    }
}
