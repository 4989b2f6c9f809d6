//! Presenting rendered figures.

use std::{
    io,
    path::Path,
    process::{Command, ExitStatus},
};

use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while handing a figure to the system viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The opener program couldn't be started.
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: &'static str,
        #[source]
        source: io::Error,
    },
    /// The opener exited unsuccessfully.
    #[error("`{program}` exited with {status}")]
    Exit {
        program: &'static str,
        status: ExitStatus,
    },
}

/// How a saved figure is shown once written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Viewer {
    /// Figures are only written to disk.
    #[default]
    Headless,
    /// Figures are opened with the platform's default application; the call blocks until the
    /// opener returns.
    System,
}

impl Viewer {
    /// Shows the figure at `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// use smallworld::viewer::Viewer;
    ///
    /// // Headless viewing never touches the file.
    /// assert!(Viewer::Headless.show(Path::new("missing.svg")).is_ok());
    /// ```
    pub fn show(&self, path: &Path) -> Result<(), ViewerError> {
        match self {
            Self::Headless => {
                debug!(path = %path.display(), "headless, not showing figure");
                Ok(())
            }
            Self::System => {
                let (program, args) = opener();
                info!(path = %path.display(), program, "showing figure");

                let status = Command::new(program)
                    .args(args)
                    .arg(path)
                    .status()
                    .map_err(|source| ViewerError::Launch { program, source })?;

                if status.success() {
                    Ok(())
                } else {
                    Err(ViewerError::Exit { program, status })
                }
            }
        }
    }
}

/// The platform's "open with default application" command and the arguments preceding the path.
fn opener() -> (&'static str, &'static [&'static str]) {
    const MACOS: &[&str] = &["-W"];
    const WINDOWS: &[&str] = &["/C", "start", "/WAIT", ""];
    const UNIX: &[&str] = &[];

    if cfg!(target_os = "macos") {
        // -W waits for the application to quit.
        ("open", MACOS)
    } else if cfg!(target_os = "windows") {
        ("cmd", WINDOWS)
    } else {
        ("xdg-open", UNIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_is_default() {
        assert_eq!(Viewer::default(), Viewer::Headless);
    }

    #[test]
    fn headless_show_is_a_no_op() {
        let result = Viewer::Headless.show(Path::new("does/not/exist.png"));

        assert!(result.is_ok());
    }

    #[test]
    fn opener_is_known() {
        let (program, _) = opener();

        assert!(!program.is_empty());
    }
}
