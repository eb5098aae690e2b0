//! External interpreter helpers: locate, validate, version-check and run scripts

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::settings::{ToolkitConfig, WINDOWED_INTERPRETER};

/// Run `script` with `interpreter`, passing each argument as its own path, and
/// wait for it to exit.
///
/// # Errors
/// Returns [`Error::PythonLaunch`] if the interpreter cannot be started and
/// [`Error::ProcessFailed`] if the script exits unsuccessfully.
pub fn execute_script<P: AsRef<Path>>(interpreter: &Path, script: &Path, args: &[P]) -> Result<()> {
    tracing::debug!(
        "Running {} {} ({} args)",
        interpreter.display(),
        script.display(),
        args.len()
    );

    let status = Command::new(interpreter)
        .arg(script)
        .args(args.iter().map(AsRef::as_ref))
        .status()
        .map_err(|source| Error::PythonLaunch {
            interpreter: interpreter.to_path_buf(),
            source,
        })?;

    if !status.success() {
        return Err(Error::ProcessFailed {
            script: script.to_path_buf(),
            code: status.code(),
        });
    }
    Ok(())
}

/// Accept a user-selected interpreter executable.
///
/// The windowed interpreter is taken as-is; any other executable is swapped
/// for the windowed interpreter next to it, if there is one. The accepted path
/// is stored in `config`.
pub fn change_path(config: &mut ToolkitConfig, selected: &Path) -> Option<PathBuf> {
    let is_windowed = selected
        .file_name()
        .is_some_and(|name| name.eq_ignore_ascii_case(WINDOWED_INTERPRETER));

    let accepted = if is_windowed {
        selected.to_path_buf()
    } else {
        let sibling = selected.parent()?.join(WINDOWED_INTERPRETER);
        if !sibling.is_file() {
            tracing::warn!("No {WINDOWED_INTERPRETER} next to {}", selected.display());
            return None;
        }
        sibling
    };

    tracing::info!("Python path set to {}", accepted.display());
    config.python_path.clone_from(&accepted);
    Some(accepted)
}

/// Console interpreter matching a windowed one (`pythonw.exe` -> `python.exe`)
pub fn console_interpreter(interpreter: &Path) -> PathBuf {
    let is_windowed = interpreter
        .file_name()
        .is_some_and(|name| name.eq_ignore_ascii_case("pythonw.exe"));
    if is_windowed {
        interpreter.with_file_name("python.exe")
    } else {
        interpreter.to_path_buf()
    }
}

/// Check that `interpreter --version` reports `required`.
///
/// Both output streams are searched, older interpreters print the version on
/// stderr. Launch failures are logged and count as a mismatch.
pub fn check_version(interpreter: &Path, required: &str) -> bool {
    let console = console_interpreter(interpreter);
    match Command::new(&console).arg("--version").output() {
        Ok(output) => {
            let mut version_info = String::from_utf8_lossy(&output.stdout).into_owned();
            version_info.push_str(&String::from_utf8_lossy(&output.stderr));
            tracing::debug!("{} reports {}", console.display(), version_info.trim());
            version_info.contains(required)
        }
        Err(e) => {
            tracing::error!("Failed to run {} --version: {e}", console.display());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_interpreter() {
        assert_eq!(
            console_interpreter(Path::new("C:/Python311/pythonw.exe")),
            PathBuf::from("C:/Python311/python.exe")
        );
        assert_eq!(
            console_interpreter(Path::new("/usr/bin/python3")),
            PathBuf::from("/usr/bin/python3")
        );
    }

    #[test]
    fn test_change_path_accepts_windowed_interpreter() {
        let mut config = ToolkitConfig::default();
        let selected = PathBuf::from("/opt/python").join(WINDOWED_INTERPRETER);
        assert_eq!(change_path(&mut config, &selected), Some(selected.clone()));
        assert_eq!(config.python_path, selected);
    }

    #[test]
    fn test_change_path_uses_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ToolkitConfig::default();
        let original = config.python_path.clone();
        let selected = dir.path().join("some-tool.exe");

        assert_eq!(change_path(&mut config, &selected), None);
        assert_eq!(config.python_path, original);

        std::fs::write(dir.path().join(WINDOWED_INTERPRETER), b"").unwrap();
        assert_eq!(
            change_path(&mut config, &selected),
            Some(dir.path().join(WINDOWED_INTERPRETER))
        );
    }

    #[test]
    fn test_missing_interpreter() {
        let missing = Path::new("/definitely/not/here/python");
        assert!(matches!(
            execute_script(missing, Path::new("fbrb.py"), &["a.fbrb"]),
            Err(Error::PythonLaunch { .. })
        ));
        assert!(!check_version(missing, "Python 3.11"));
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_script_passes_paths() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("copy.sh");
        std::fs::write(&script, "cp \"$1\" \"$2\"\n").unwrap();
        let source = dir.path().join("in file.txt");
        let target = dir.path().join("out file.txt");
        std::fs::write(&source, b"payload").unwrap();

        execute_script(Path::new("/bin/sh"), &script, &[&source, &target]).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"payload");
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_script_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "exit 3\n").unwrap();

        let err = execute_script::<&Path>(Path::new("/bin/sh"), &script, &[]).unwrap_err();
        assert!(matches!(err, Error::ProcessFailed { code: Some(3), .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_version_reads_both_streams() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("python3");
        std::fs::write(&fake, "#!/bin/sh\necho \"Python 3.11.9\" >&2\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(check_version(&fake, "Python 3.11"));
        assert!(!check_version(&fake, "Python 3.12"));
    }
}
