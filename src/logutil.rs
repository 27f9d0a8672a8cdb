//! Logging setup and helpers for keeping file-sourced strings out of trouble in logs.

use std::io::Write;

/// Escape a string read from a config file or the saves directory for single-line logging.
///
/// Control characters become `\n`, `\r`, `\t` or `\xNN`; backslashes are doubled and
/// anything past 200 characters is cut with an ellipsis.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 200;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write as _;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Mask a secret, keeping only its length visible.
pub fn redact(secret: &str) -> String {
    format!("<redacted:{} chars>", secret.chars().count())
}

/// Install `env_logger` with the `<timestamp> [LEVEL] message` line format.
///
/// `verbosity` 0 is Info, 1 Debug, 2+ Trace. With a log file, lines are appended there
/// and echoed to the console only when stdout is a terminal.
pub fn init_logging(verbosity: u8, file: Option<&str>) {
    let mut builder = env_logger::Builder::new();
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);

    let log_file = file.and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match log_file {
        Some(f) => {
            let sink = std::sync::Mutex::new(f);
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let line = format!(
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                );
                if let Ok(mut guard) = sink.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                writeln!(
                    fmt,
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                )
            });
        }
    }
    let _ = builder.try_init();
}
