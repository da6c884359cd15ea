use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use query::MatchQuery;
use Result;

/// How often a timed call checks whether the interpreter has exited.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The two streams an interpreter run produces.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Response {
    pub output: String,
    pub errors: String,
}

impl Response {
    pub fn new<O: Into<String>, E: Into<String>>(output: O, errors: E) -> Response {
        Response {
            output: output.into(),
            errors: errors.into(),
        }
    }

    /// Anything at all on the error stream fails the whole call, and the
    /// failure carries that text unchanged. Otherwise the output stream is
    /// the result.
    pub fn into_result(self) -> Result<String> {
        if self.errors.is_empty() {
            Ok(self.output)
        } else {
            Err(self.errors.into())
        }
    }
}

/// Something that can run query text and hand back what it printed.
/// `Err` is reserved for failing to run at all; a query the interpreter
/// rejects comes back as a `Response` with a non-empty error stream.
pub trait Interpreter {
    fn run(&self, query: &str) -> Result<Response>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Path of the interpreter executable.
    pub program: String,
    /// Extra arguments placed before the query.
    pub args: Vec<String>,
    /// Output format selector passed with `-o`.
    pub format: String,
    /// Kill the interpreter if it runs longer than this. No limit if unset.
    pub timeout_ms: Option<u64>,
}

impl Default for InterpreterConfig {
    fn default() -> InterpreterConfig {
        InterpreterConfig {
            program: "graql.sh".to_string(),
            args: vec![],
            format: "json".to_string(),
            timeout_ms: None,
        }
    }
}

/// Runs each query as `<program> <args..> -e <query> -o <format>` in a
/// fresh child process.
#[derive(Debug, Clone)]
pub struct ProcessInterpreter {
    config: InterpreterConfig,
}

impl ProcessInterpreter {
    pub fn new() -> ProcessInterpreter {
        ProcessInterpreter::from_config(InterpreterConfig::default())
    }

    pub fn from_config(config: InterpreterConfig) -> ProcessInterpreter {
        ProcessInterpreter { config }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> ProcessInterpreter {
        let millis = timeout
            .as_secs()
            .saturating_mul(1000)
            .saturating_add(u64::from(timeout.subsec_millis()));
        self.config.timeout_ms = Some(millis);
        self
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    fn command(&self, query: &str) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .arg("-e")
            .arg(query)
            .arg("-o")
            .arg(&self.config.format)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for ProcessInterpreter {
    fn default() -> ProcessInterpreter {
        ProcessInterpreter::new()
    }
}

impl Interpreter for ProcessInterpreter {
    fn run(&self, query: &str) -> Result<Response> {
        let mut child = self.command(query).spawn().map_err(|e| {
            format!("could not start interpreter '{}': {}", self.config.program, e)
        })?;

        // Both pipes are drained while we wait, so a child that writes a
        // lot to either one never blocks on a full pipe.
        let output = drain(child.stdout.take());
        let errors = drain(child.stderr.take());

        let status = match self.config.timeout_ms {
            Some(millis) => {
                match wait_timeout(&mut child, Duration::from_millis(millis))? {
                    Some(status) => status,
                    None => {
                        warn!("interpreter timed out after {} ms; killed", millis);
                        // The reader threads are left to finish on their own:
                        // a grandchild may still hold the pipes open.
                        return Err(format!("interpreter timed out after {} ms", millis).into());
                    }
                }
            }
            None => match child.wait() {
                Ok(status) => status,
                Err(e) => {
                    release(&mut child);
                    return Err(e.into());
                }
            },
        };

        let response = Response::new(collect(output)?, collect(errors)?);

        if !status.success() && response.errors.is_empty() {
            warn!("interpreter exited with {} but reported no errors", status);
        }

        Ok(response)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn collect(handle: thread::JoinHandle<io::Result<String>>) -> Result<String> {
    match handle.join() {
        Ok(read) => Ok(read?),
        Err(_) => Err("interpreter pipe reader panicked".into()),
    }
}

/// Kills and reaps the child, logging rather than returning failures.
fn release(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("failed to kill interpreter: {}", e);
    }
    if let Err(e) = child.wait() {
        warn!("failed to reap interpreter: {}", e);
    }
}

/// Waits for the child until `timeout` elapses. On expiry the child is
/// killed and reaped, and `None` is returned. A timeout too large to
/// represent as a deadline means waiting without one.
fn wait_timeout(child: &mut Child, timeout: Duration) -> Result<Option<ExitStatus>> {
    let deadline = match Instant::now().checked_add(timeout) {
        Some(deadline) => deadline,
        None => {
            return match child.wait() {
                Ok(status) => Ok(Some(status)),
                Err(e) => {
                    release(child);
                    Err(e.into())
                }
            }
        }
    };
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => (),
            Err(e) => {
                release(child);
                return Err(e.into());
            }
        }

        if Instant::now() >= deadline {
            release(child);
            return Ok(None);
        }

        thread::sleep(POLL_INTERVAL);
    }
}

/// Submits queries to an interpreter and turns its response into a
/// result: the raw output on success, the verbatim error text on failure.
pub struct Conn<I> {
    interpreter: I,
}

impl<I: Interpreter> Conn<I> {
    pub fn new(interpreter: I) -> Conn<I> {
        Conn { interpreter }
    }

    pub fn execute(&self, query: &MatchQuery) -> Result<String> {
        self.execute_str(&query.to_string())
    }

    pub fn execute_str(&self, query: &str) -> Result<String> {
        debug!("submitting query: {}", query);
        self.interpreter.run(query)?.into_result()
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }
}

impl Conn<ProcessInterpreter> {
    pub fn from_config(config: InterpreterConfig) -> Conn<ProcessInterpreter> {
        Conn::new(ProcessInterpreter::from_config(config))
    }
}
