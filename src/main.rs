use clap::Parser;
use env_logger::Env;
use log::{error, info};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use holotopics::{App, AppError, Config, KeyPress, LineKind, Vec2};

#[tokio::main]
async fn main() {
    let config = Config::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str())).init();

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(read_terminal_lines(tx));

    let code = match tokio::task::block_in_place(|| run(&config, rx)) {
        Ok(()) => 0,
        Err(err) => {
            error!("{}", err);
            1
        }
    };
    // the stdin reader may still be parked on a read; don't wait for it
    std::process::exit(code);
}

async fn read_terminal_lines(tx: UnboundedSender<String>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                error!("stdin: {}", err);
                break;
            }
        }
    }
}

fn run(config: &Config, mut lines: UnboundedReceiver<String>) -> Result<(), AppError> {
    let catalog = config.load_catalog()?;
    let mut app = App::new(config, catalog);

    let mut window = Window::new(
        "HOLOTOPICS - conversation kiosk",
        config.width,
        config.height,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(config.fps as usize);

    println!("\nholotopics: click a sector, or type commands here (try HELP)\n");

    let mut mouse_was_down = false;
    let mut printed = 0;

    while window.is_open() {
        while let Ok(line) = lines.try_recv() {
            app.terminal_line_submitted(&line);
        }

        for key in window.get_keys_pressed(KeyRepeat::No) {
            if let Some(press) = map_key(key) {
                app.key_pressed(press);
            }
        }

        if let Some((x, y)) = window.get_mouse_pos(MouseMode::Discard) {
            let pos = Vec2::new(x as f64, y as f64);
            app.pointer_moved(pos);
            let down = window.get_mouse_down(MouseButton::Left);
            if down && !mouse_was_down {
                app.pointer_clicked(pos);
            }
            mouse_was_down = down;
        }

        let (w, h) = window.get_size();
        app.surface_resized(w, h);

        let (w, h) = app.size();
        window.update_with_buffer(app.frame(), w, h)?;

        printed = echo_transcript(&app, printed);
    }

    info!(
        "window closed after {} ms, {} questions locked",
        app.now_ms(),
        app.session().locked_total()
    );
    Ok(())
}

/// Mirror new transcript lines to stdout. Returns how many have been printed.
fn echo_transcript(app: &App, printed: usize) -> usize {
    let output = app.terminal().output();
    let start = if output.len() < printed { 0 } else { printed };
    for line in &output[start..] {
        match line.kind {
            LineKind::Error => eprintln!("{}", line.text),
            _ => println!("{}", line.text),
        }
    }
    output.len()
}

fn map_key(key: Key) -> Option<KeyPress> {
    Some(match key {
        Key::Escape => KeyPress::Escape,
        Key::Key1 => KeyPress::Digit(1),
        Key::Key2 => KeyPress::Digit(2),
        Key::Key3 => KeyPress::Digit(3),
        Key::Key4 => KeyPress::Digit(4),
        Key::Key5 => KeyPress::Digit(5),
        Key::M => KeyPress::ToggleStarMap,
        Key::Equal | Key::NumPadPlus => KeyPress::ZoomIn,
        Key::Minus | Key::NumPadMinus => KeyPress::ZoomOut,
        Key::Key0 | Key::NumPad0 => KeyPress::ZoomReset,
        Key::Left => KeyPress::Left,
        Key::Right => KeyPress::Right,
        Key::Up => KeyPress::Up,
        Key::Down => KeyPress::Down,
        Key::E => KeyPress::EndSession,
        Key::Backspace => KeyPress::Backspace,
        _ => return None,
    })
}
