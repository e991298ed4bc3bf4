//! Query loop serving predictions from loaded artifacts.

use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::bundle::ArtifactBundle;
use crate::errors::{ProdcatError, Result};
use crate::predictor::Predictor;

/// Input that terminates the query loop, compared case-insensitively.
pub const EXIT_SENTINEL: &str = "exit";

const PROMPT: &str = "Enter a product name: ";
const SEPARATOR: &str = "----------------------------------------";

/// State of a [`PredictionService`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceState {
    Idle,
    ArtifactsLoaded,
    Predicting,
    Stopped,
}

/// Serves one query at a time until the caller sends [`EXIT_SENTINEL`] or the input ends.
///
/// # Examples
///
/// ```no_run
/// use std::io::{stdin, stdout};
///
/// use prodcat::PredictionService;
///
/// let mut service = PredictionService::new().interactive(true);
/// service.load_dir("model").unwrap();
/// service.run(stdin().lock(), stdout().lock()).unwrap();
/// ```
#[derive(Debug)]
pub struct PredictionService {
    predictor: Option<Predictor>,
    state: ServiceState,
    interactive: bool,
}

impl PredictionService {
    /// Creates a service with no artifacts.
    pub const fn new() -> Self {
        Self {
            predictor: None,
            state: ServiceState::Idle,
            interactive: false,
        }
    }

    /// Prints prompts and decorated answers when `yes` is `true`; otherwise one label per line.
    pub fn interactive(mut self, yes: bool) -> Self {
        self.interactive = yes;
        self
    }

    pub const fn state(&self) -> ServiceState {
        self.state
    }

    /// Loads artifacts from a bundle directory.
    ///
    /// # Errors
    ///
    /// See [`ArtifactBundle::read_dir`] and [`PredictionService::load`].
    pub fn load_dir<P>(&mut self, dir: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        self.load(ArtifactBundle::read_dir(dir)?)
    }

    /// Loads artifacts.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::InvalidArgument`] will be returned if the service already stopped, and
    /// [`ProdcatError::ArtifactMismatch`] if the feature layout cannot be compiled.
    pub fn load(&mut self, bundle: ArtifactBundle) -> Result<()> {
        if self.state == ServiceState::Stopped {
            return Err(ProdcatError::invalid_argument(
                "bundle",
                "the service has stopped",
            ));
        }
        let predictor = Predictor::new(bundle)?;
        info!(
            run_id = predictor.run_id(),
            n_indicators = predictor.features().n_indicators(),
            "artifacts loaded"
        );
        self.predictor = Some(predictor);
        self.state = ServiceState::ArtifactsLoaded;
        Ok(())
    }

    /// Answers a single query.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::InvalidArgument`] will be returned if no artifacts are loaded or the
    /// service has stopped. Prediction errors are returned as is.
    pub fn predict(&mut self, title: &str) -> Result<&str> {
        if self.state == ServiceState::Stopped {
            return Err(ProdcatError::invalid_argument(
                "title",
                "the service has stopped",
            ));
        }
        let predictor = self.predictor.as_ref().ok_or_else(|| {
            ProdcatError::invalid_argument("title", "artifacts are not loaded")
        })?;
        self.state = ServiceState::Predicting;
        predictor.predict(title)
    }

    /// Runs the query loop.
    ///
    /// Each line of `input` is one title. Only line endings are stripped, so whitespace-only
    /// lines are classified like any other title. Lines that are not valid UTF-8 are logged and
    /// skipped.
    ///
    /// # Returns
    ///
    /// The number of answered queries.
    ///
    /// # Errors
    ///
    /// I/O errors and unrecoverable prediction errors stop the loop and are returned. Recoverable
    /// errors are logged and the loop moves on to the next query.
    pub fn run<R, W>(&mut self, mut input: R, mut output: W) -> Result<usize>
    where
        R: BufRead,
        W: Write,
    {
        if self.predictor.is_none() {
            return Err(ProdcatError::invalid_argument(
                "input",
                "artifacts are not loaded",
            ));
        }
        if self.interactive {
            writeln!(output, "Type '{EXIT_SENTINEL}' at any point to stop.")?;
            writeln!(output)?;
        }
        let mut n_answered = 0;
        let mut buf = vec![];
        loop {
            if self.interactive {
                write!(output, "{PROMPT}")?;
                output.flush()?;
            }
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                debug!("end of input");
                break;
            }
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "query skipped: not valid UTF-8");
                    continue;
                }
            };
            let title = line.trim_end_matches(['\n', '\r']);
            if title.eq_ignore_ascii_case(EXIT_SENTINEL) {
                if self.interactive {
                    writeln!(output, "Exiting...")?;
                }
                break;
            }
            let interactive = self.interactive;
            match self.predict(title) {
                Ok(label) => {
                    if interactive {
                        writeln!(output, "Predicted category: {label}")?;
                        writeln!(output, "{SEPARATOR}")?;
                    } else {
                        writeln!(output, "{label}")?;
                    }
                    n_answered += 1;
                }
                Err(e) if e.is_recoverable() => warn!(title, error = %e, "query skipped"),
                Err(e) => return Err(e),
            }
        }
        output.flush()?;
        self.state = ServiceState::Stopped;
        info!(n_answered, "service stopped");
        Ok(n_answered)
    }
}

impl Default for PredictionService {
    fn default() -> Self {
        Self::new()
    }
}
