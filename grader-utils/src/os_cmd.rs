use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvVar {
    /// Copied from the spawning process at spawn time, if present there.
    Inherit(OsString),
    Set(OsString, OsString),
}

/// An argv plus environment, resolved into a real process by the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsCmd {
    pub bin: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<EnvVar>,
}

impl OsCmd {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(&mut self, a: impl Into<OsString>) -> &mut Self {
        self.args.push(a.into());
        self
    }

    pub fn arg_if(&mut self, cond: bool, a: impl Into<OsString>) -> &mut Self {
        if cond {
            self.arg(a)
        } else {
            self
        }
    }

    pub fn args<I>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn inherit_env(&mut self, k: impl Into<OsString>) -> &mut Self {
        self.env.push(EnvVar::Inherit(k.into()));
        self
    }

    pub fn add_env(&mut self, k: impl Into<OsString>, v: impl AsRef<OsStr>) -> &mut Self {
        self.env.push(EnvVar::Set(k.into(), v.as_ref().to_owned()));
        self
    }

    /// `bin` followed by `args`.
    pub fn argv(&self) -> impl Iterator<Item = &OsStr> + '_ {
        std::iter::once(self.bin.as_os_str()).chain(self.args.iter().map(OsString::as_os_str))
    }
}

impl fmt::Display for OsCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for a in self.argv() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;

            let a = a.to_string_lossy();
            if a.is_empty() || a.contains(char::is_whitespace) {
                write!(f, "{:?}", a)?;
            } else {
                f.write_str(&a)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_spaced_args() {
        let mut cmd = OsCmd::new("javac");
        cmd.arg("-encoding").arg("UTF-8").arg_if(false, "-g").arg("My File.java");
        assert_eq!(cmd.to_string(), r#"javac -encoding UTF-8 "My File.java""#);
        assert_eq!(cmd.argv().count(), 4);
    }

    #[test]
    fn env_order_is_kept() {
        let mut cmd = OsCmd::new("python3");
        cmd.inherit_env("PATH").add_env("PYTHONDONTWRITEBYTECODE", "1");
        assert_eq!(
            cmd.env,
            vec![
                EnvVar::Inherit("PATH".into()),
                EnvVar::Set("PYTHONDONTWRITEBYTECODE".into(), "1".into()),
            ]
        );
    }
}
