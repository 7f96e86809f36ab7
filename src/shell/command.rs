//! External process execution.
//!
//! Package managers are spawned directly (no intermediate shell) so that
//! group names and paths reach them exactly as given.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of executing an external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed because it exceeded its timeout.
    pub timed_out: bool,
}

/// A program invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// Executable name or path.
    pub program: OsString,

    /// Arguments, passed verbatim.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Kill the process after this long (None = no timeout).
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Create a spec for `program` with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Append arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render as a single display line, e.g. `uv sync --group dev`.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|a| {
            if a.is_empty() || a.contains(char::is_whitespace) {
                format!("'{}'", a)
            } else {
                a.clone()
            }
        }));
        parts.join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Output line from command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Callback for streaming output.
pub type OutputCallback = Box<dyn Fn(OutputLine) + Send>;

/// Execute a command, capturing its output without streaming.
pub fn execute(spec: &CommandSpec) -> io::Result<CommandResult> {
    execute_streaming(spec, Box::new(|_| {}))
}

/// Execute a command with streaming output.
///
/// Every line is passed to `callback` as it arrives and is also collected
/// into the returned [`CommandResult`]. Spawn failures are returned as the
/// underlying [`io::Error`] so callers can tell "not found" from "failed".
pub fn execute_streaming(spec: &CommandSpec, callback: OutputCallback) -> io::Result<CommandResult> {
    let start = Instant::now();
    // A timeout too large to represent is no deadline at all.
    let deadline = spec.timeout.and_then(|t| start.checked_add(t));

    let mut cmd = spec.to_command();
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn()?;
    tracing::debug!("spawned {} (pid {})", spec.display(), child.id());

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("child stderr was not captured"))?;

    let (tx, rx) = mpsc::channel();
    let stdout_handle = spawn_reader(stdout, tx.clone(), OutputLine::Stdout);
    let stderr_handle = spawn_reader(stderr, tx, OutputLine::Stderr);

    let mut captured = Captured::default();
    let mut timed_out = false;
    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => captured.push(line, &callback),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        if past(deadline) {
            kill(&mut child);
            timed_out = true;
            break;
        }
    }

    let status = if timed_out {
        // Grandchildren may still hold the pipes open, so the readers are
        // left to finish on their own.
        child.wait()?
    } else {
        let _ = stdout_handle.join();
        let _ = stderr_handle.join();
        let (status, killed) = wait_until(&mut child, deadline)?;
        timed_out = killed;
        status
    };

    for line in rx.try_iter() {
        captured.push(line, &callback);
    }

    let duration = start.elapsed();
    Ok(CommandResult {
        exit_code: status.code(),
        stdout: captured.stdout,
        stderr: captured.stderr,
        duration,
        success: status.success() && !timed_out,
        timed_out,
    })
}

#[derive(Default)]
struct Captured {
    stdout: String,
    stderr: String,
}

impl Captured {
    fn push(&mut self, line: OutputLine, callback: &OutputCallback) {
        let (buf, text) = match &line {
            OutputLine::Stdout(text) => (&mut self.stdout, text),
            OutputLine::Stderr(text) => (&mut self.stderr, text),
        };
        buf.push_str(text);
        buf.push('\n');
        callback(line);
    }
}

fn spawn_reader<R>(
    source: R,
    tx: mpsc::Sender<OutputLine>,
    wrap: fn(String) -> OutputLine,
) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(wrap(decode_line(&buf))).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!("output reader stopped: {}", e);
                    break;
                }
            }
        }
    })
}

/// Decode one raw output line, dropping the line terminator.
///
/// Tools may print text in a non-UTF-8 locale; invalid bytes become U+FFFD
/// so the stream keeps being drained.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

fn kill(child: &mut Child) {
    // The child may already have exited; that is not an error here.
    if let Err(e) = child.kill() {
        tracing::debug!("kill failed: {}", e);
    }
}

/// Wait for the child, killing it once `deadline` passes.
///
/// Returns the exit status and whether the child was killed.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> io::Result<(ExitStatus, bool)> {
    if deadline.is_none() {
        return Ok((child.wait()?, false));
    }
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if past(deadline) {
            kill(child);
            return Ok((child.wait()?, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").args(["-c", script])
    }

    #[test]
    fn execute_successful_command() {
        let result = execute(&sh("echo hello")).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
        assert!(!result.timed_out);
    }

    #[test]
    fn execute_failing_command() {
        let result = execute(&sh("exit 3")).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_with_env() {
        let mut spec = sh("echo $MY_VAR");
        spec.env.insert("MY_VAR".to_string(), "my_value".to_string());

        let result = execute(&spec).unwrap();

        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = execute(&sh("pwd").cwd(temp.path())).unwrap();

        assert!(result.success);
        let name = temp.path().file_name().unwrap().to_string_lossy();
        assert!(result.stdout.contains(name.as_ref()));
    }

    #[test]
    fn missing_program_is_not_found() {
        let err = execute(&CommandSpec::new("definitely-not-a-real-program-xyz")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn streaming_sees_both_streams() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let lines_clone = Arc::clone(&lines);
        let callback: OutputCallback = Box::new(move |line| {
            lines_clone.lock().unwrap().push(line);
        });

        let result =
            execute_streaming(&sh("echo out; echo err >&2"), callback).unwrap();

        assert!(result.success);
        assert!(result.stderr.contains("err"));
        let captured = lines.lock().unwrap();
        assert!(captured.contains(&OutputLine::Stdout("out".to_string())));
        assert!(captured.contains(&OutputLine::Stderr("err".to_string())));
    }

    #[test]
    fn timeout_kills_the_child() {
        let spec = sh("exec sleep 5").timeout(Some(Duration::from_millis(200)));

        let result = execute(&spec).unwrap();

        assert!(result.timed_out);
        assert!(!result.success);
        assert!(result.duration < Duration::from_secs(5));
    }

    #[test]
    fn non_utf8_output_keeps_the_stream_open() {
        let script = "printf 'Building wheel caf\\351\\n' >&2; sleep 0.3; \
                      i=0; while [ $i -lt 200 ]; do echo \"line $i\" >&2; i=$((i+1)); done; exit 0";

        let result = execute(&sh(script)).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stderr.contains("Building wheel caf\u{FFFD}"));
        assert!(result.stderr.contains("line 199"));
    }

    #[test]
    fn huge_timeout_means_no_deadline() {
        let spec = sh("exit 0").timeout(Some(Duration::from_secs(u64::MAX)));

        let result = execute(&spec).unwrap();

        assert!(result.success);
        assert!(!result.timed_out);
    }

    #[test]
    fn decode_line_strips_terminators() {
        assert_eq!(decode_line(b"resolved\r\n"), "resolved");
        assert_eq!(decode_line(b"resolved\n"), "resolved");
        assert_eq!(decode_line(b"no newline"), "no newline");
        assert_eq!(decode_line(b"caf\xe9"), "caf\u{FFFD}");
    }

    #[test]
    fn display_quotes_whitespace() {
        let spec = CommandSpec::new("uv").args(["sync", "--group", "my group"]);
        assert_eq!(spec.display(), "uv sync --group 'my group'");
    }
}
