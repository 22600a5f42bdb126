//! Driving the external TeX compiler.

use std::{
    ffi::OsString,
    fs::OpenOptions,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    time::{Duration, Instant},
};

use eyre::WrapErr;
use log::{debug, info, warn};

/// Extensions of the files a TeX run leaves next to its input.
pub const AUXILIARY_EXTENSIONS: [&str; 6] = ["aux", "snm", "out", "log", "toc", "nav"];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

// A run that times out is retried this many times before giving up.
const RETRIES: usize = 1;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

enum Outcome {
    Exited(ExitStatus),
    TimedOut,
}

#[derive(Clone, Debug)]
pub struct TexCompiler {
    program: OsString,
    args: Vec<OsString>,
    timeout: Duration,
}

impl TexCompiler {
    /// A compiler invoked as `<program> -interaction=nonstopmode -halt-on-error <file>.tex`.
    pub fn new(program: impl Into<OsString>) -> Self {
        TexCompiler {
            program: program.into(),
            args: vec!["-interaction=nonstopmode".into(), "-halt-on-error".into()],
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the arguments passed before the input file name.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run_once(&self, dir: &Path, tex_file: &str) -> eyre::Result<Outcome> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(tex_file)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .wrap_err_with(|| format!("Unable to run {:?}. Is it installed?", self.program))?;
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Outcome::Exited(status));
            }
            if Instant::now() >= deadline {
                child.kill()?;
                child.wait()?;
                return Ok(Outcome::TimedOut);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Compile `dir/tex_file` and return the path of the produced PDF.
    ///
    /// A run exceeding the timeout is killed, its log is truncated and it is retried once.
    pub fn compile(&self, dir: &Path, tex_file: &str) -> eyre::Result<PathBuf> {
        let stem = Path::new(tex_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| eyre::eyre!("{tex_file:?} has no file stem"))?;
        let log_path = dir.join(format!("{stem}.log"));
        for attempt in 0..=RETRIES {
            info!(
                "Running {:?} on {tex_file} (attempt {} of {})",
                self.program,
                attempt + 1,
                RETRIES + 1
            );
            match self.run_once(dir, tex_file)? {
                Outcome::Exited(status) if status.success() => {
                    let pdf = dir.join(format!("{stem}.pdf"));
                    eyre::ensure!(
                        pdf.is_file(),
                        "{:?} succeeded but didn't produce {pdf:?}",
                        self.program
                    );
                    return Ok(pdf);
                }
                Outcome::Exited(status) => {
                    eyre::bail!(
                        "{:?} failed on {tex_file} ({status}), see {log_path:?}",
                        self.program
                    );
                }
                Outcome::TimedOut => {
                    warn!(
                        "{:?} timed out after {:?} on {tex_file}",
                        self.program, self.timeout
                    );
                    truncate(&log_path)?;
                }
            }
        }
        eyre::bail!(
            "{:?} timed out {} times on {tex_file}",
            self.program,
            RETRIES + 1
        )
    }
}

fn truncate(path: &Path) -> eyre::Result<()> {
    if path.exists() {
        OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .wrap_err_with(|| format!("Unable to truncate {path:?}"))?;
        debug!("Truncated {path:?}");
    }
    Ok(())
}

/// Delete the compiler's auxiliary files in `dir`, returning how many were removed.
pub fn remove_auxiliary_files(dir: &Path, keep_log: bool) -> eyre::Result<usize> {
    let mut removed = 0;
    for entry in dir
        .read_dir()
        .wrap_err_with(|| format!("Error reading directory {dir:?}"))?
    {
        let path = entry?.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !AUXILIARY_EXTENSIONS.contains(&ext) || (keep_log && ext == "log") || !path.is_file() {
            continue;
        }
        std::fs::remove_file(&path).wrap_err_with(|| format!("Unable to remove {path:?}"))?;
        removed += 1;
    }
    Ok(removed)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn fake(script: &str) -> TexCompiler {
        // `sh -c <script> <file>.tex` sees the input file as $0.
        TexCompiler::new("sh").with_args(["-c", script])
    }

    #[test]
    fn success() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fake(r#"touch "${0%.tex}.pdf""#)
            .compile(dir.path(), "deck.tex")
            .unwrap();
        assert_eq!(pdf, dir.path().join("deck.pdf"));
    }

    #[test]
    fn failure_points_at_log() {
        let dir = tempfile::tempdir().unwrap();
        let err = fake(r#"echo oops > "${0%.tex}.log"; exit 3"#)
            .compile(dir.path(), "deck.tex")
            .unwrap_err();
        assert!(err.to_string().contains("deck.log"), "{err}");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("deck.log")).unwrap(),
            "oops\n"
        );
    }

    #[test]
    fn success_without_pdf() {
        let dir = tempfile::tempdir().unwrap();
        assert!(fake("true").compile(dir.path(), "deck.tex").is_err());
    }

    #[test]
    fn missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let err = TexCompiler::new("sevare-no-such-compiler")
            .compile(dir.path(), "deck.tex")
            .unwrap_err();
        assert!(err.to_string().contains("installed"), "{err}");
    }

    #[test]
    fn timeout_retries_once_and_truncates_log() {
        let dir = tempfile::tempdir().unwrap();
        let err = fake(r#"echo run >> attempts; echo partial > "${0%.tex}.log"; exec sleep 10"#)
            .with_timeout(Duration::from_millis(300))
            .compile(dir.path(), "deck.tex")
            .unwrap_err();
        assert!(err.to_string().contains("timed out 2 times"), "{err}");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("attempts")).unwrap(),
            "run\nrun\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("deck.log")).unwrap(),
            ""
        );
    }

    #[test]
    fn retry_after_timeout_can_succeed() {
        let dir = tempfile::tempdir().unwrap();
        // The first run hangs, the second finds the marker and finishes.
        let pdf = fake(r#"if [ -e marker ]; then touch "${0%.tex}.pdf"; else touch marker; exec sleep 10; fi"#)
            .with_timeout(Duration::from_millis(300))
            .compile(dir.path(), "deck.tex")
            .unwrap();
        assert!(pdf.is_file());
    }

    #[test]
    fn cleanup() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "deck.tex", "deck.pdf", "deck.aux", "deck.log", "deck.nav", "deck.snm", "deck.toc",
            "deck.out", "notes",
        ] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        assert_eq!(remove_auxiliary_files(dir.path(), true).unwrap(), 5);
        assert!(dir.path().join("deck.log").exists());
        assert_eq!(remove_auxiliary_files(dir.path(), false).unwrap(), 1);
        let mut left: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        left.sort();
        assert_eq!(left, ["deck.pdf", "deck.tex", "notes"]);
    }
}
