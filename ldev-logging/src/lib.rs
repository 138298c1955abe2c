use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::MakeWriter, prelude::*, registry, EnvFilter};

// --- Custom "Tee" Writer ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A, B> Write for Tee<A, B>
where
    A: Write,
    B: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B, W1, W2> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a, Writer = W1>,
    B: MakeWriter<'a, Writer = W2>,
    W1: Write + 'a,
    W2: Write + 'a,
{
    type Writer = Tee<W1, W2>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

/// Where log records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    None,
}

/// Logging settings read from `LDEV_LOG_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub output: LogOutput,
    pub json: bool,
    pub file_path: PathBuf,
    /// Set by `--debug`: `level` wins over `RUST_LOG`.
    pub force_level: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            output: LogOutput::Console,
            json: false,
            file_path: PathBuf::from("/tmp/ldev.log"),
            force_level: false,
        }
    }
}

impl LogSettings {
    /// Build settings from a variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let output = match lookup("LDEV_LOG_OUTPUT").as_deref() {
            Some("file") => LogOutput::File,
            Some("both") => LogOutput::Both,
            Some("none") => LogOutput::None,
            _ => LogOutput::Console,
        };
        Self {
            level: lookup("LDEV_LOG_LEVEL").unwrap_or(defaults.level),
            output,
            json: lookup("LDEV_LOG_FORMAT").as_deref() == Some("json"),
            file_path: lookup("LDEV_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.file_path),
            force_level: false,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Raise the level to `debug` (the `--debug` flag).
    pub fn with_debug(mut self, debug: bool) -> Self {
        if debug {
            self.level = "debug".to_string();
            self.force_level = true;
        }
        self
    }

    /// Filter directives to install. `RUST_LOG` applies unless the level was forced.
    pub fn filter_directives(&self, rust_log: Option<String>) -> String {
        match rust_log.filter(|d| !d.trim().is_empty()) {
            Some(directives) if !self.force_level => directives,
            _ => self.level.clone(),
        }
    }
}

/// Initializes the global tracing subscriber.
///
/// Console output goes to stderr. The returned guard must be held for the
/// life of the process when file output is enabled, or buffered records are lost.
pub fn init_subscriber(settings: &LogSettings) -> Option<WorkerGuard> {
    let directives = settings.filter_directives(env::var(EnvFilter::DEFAULT_ENV).ok());
    let env_filter =
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let subscriber = registry().with(env_filter);

    let log_path = settings.file_path.as_path();
    let log_dir = log_path.parent().unwrap_or_else(|| Path::new("/tmp"));
    let log_filename = log_path.file_name().unwrap_or("ldev.log".as_ref());

    let mut guard: Option<WorkerGuard> = None;
    let result = match settings.output {
        LogOutput::Both => {
            let file_appender = tracing_appender::rolling::daily(log_dir, log_filename);
            let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
            guard = Some(_guard);

            let tee_writer = MakeTee {
                make_a: io::stderr,
                make_b: non_blocking,
            };
            let fmt_layer = tracing_subscriber::fmt::layer().with_writer(tee_writer);
            if settings.json {
                subscriber.with(fmt_layer.json()).try_init()
            } else {
                subscriber.with(fmt_layer.compact()).try_init()
            }
        }
        LogOutput::Console => {
            let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);
            if settings.json {
                subscriber.with(fmt_layer.json()).try_init()
            } else {
                subscriber.with(fmt_layer.compact()).try_init()
            }
        }
        LogOutput::File => {
            let file_appender = tracing_appender::rolling::daily(log_dir, log_filename);
            let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
            guard = Some(_guard);

            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            if settings.json {
                subscriber.with(fmt_layer.json()).try_init()
            } else {
                subscriber.with(fmt_layer).try_init()
            }
        }
        LogOutput::None => return None,
    };

    if result.is_err() {
        // Already installed (tests, embedding); keep the existing subscriber.
        return None;
    }
    guard
}
