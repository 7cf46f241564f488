use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// Specification for a command to execute.
///
/// Every external tool invocation goes through `CommandSpec` rather than a
/// shell string, so arguments cross trust boundaries as discrete elements.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub env: Option<HashMap<OsString, OsString>>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Human-readable rendering for logs and error messages (not shell-escaped).
    #[must_use]
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        if let Some(ref env) = self.env {
            for (key, value) in env {
                cmd.env(key, value);
            }
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chain_preserves_args_as_discrete_elements() {
        let cmd = CommandSpec::new("nm")
            .arg("-g")
            .args(["--defined-only", "libfoo.so"])
            .cwd("/workspace")
            .env("LC_ALL", "C");

        assert_eq!(cmd.program, OsString::from("nm"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/workspace")));
    }

    #[test]
    fn shell_metacharacters_are_preserved_not_interpreted() {
        let cmd = CommandSpec::new("echo").arg("$(whoami)").arg("a;b|c");
        assert_eq!(cmd.args[0], OsString::from("$(whoami)"));
        assert_eq!(cmd.args[1], OsString::from("a;b|c"));
    }

    #[test]
    fn display_joins_program_and_args() {
        let cmd = CommandSpec::new("cc").arg("-o").arg("probe");
        assert_eq!(cmd.display(), "cc -o probe");
    }
}
