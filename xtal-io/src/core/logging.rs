use std::io::Write;

use chrono::Local;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

pub use log::{debug, error, info, trace, warn};

const DEFAULT_FILTER: &str = "xtal_io=info,session_demo=info";

// Windowing crates log every platform hiccup at info
const NOISY_MODULES: &[&str] = &["winit", "sctk", "calloop"];

pub fn init_logger() {
    init_logger_with(DEFAULT_FILTER);
}

/// Colored stderr logger. `RUST_LOG` wins over `default_filter`.
pub fn init_logger_with(default_filter: &str) {
    let mut builder =
        Builder::from_env(Env::default().default_filter_or(default_filter));
    for module in NOISY_MODULES {
        builder.filter_module(module, LevelFilter::Warn);
    }

    builder.format(|_buf, record| {
        let writer = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = writer.buffer();
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(level_color(record.level())));

        write!(buffer, "{} ", Local::now().format("%H:%M:%S%.3f"))?;
        buffer.set_color(&spec)?;
        let module_path = record.module_path().unwrap_or("<unknown>");
        write!(buffer, "[{}][{}]", record.level(), module_path)?;
        buffer.reset()?;
        writeln!(buffer, " {}", record.args())?;
        writer.print(&buffer)?;
        Ok(())
    });

    let _ = builder.try_init();
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Trace => Color::Cyan,
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
    }
}
