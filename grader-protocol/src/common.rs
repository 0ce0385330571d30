use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "py", alias = "python3")]
    Python,
    Java,
    #[serde(alias = "c++", alias = "cxx")]
    Cpp,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0:?}")]
pub struct ParseLanguageError(pub String);

impl Language {
    pub const ALL: [Language; 3] = [Language::Python, Language::Java, Language::Cpp];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    pub fn needs_compile(self) -> bool {
        !matches!(self, Language::Python)
    }
}

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" | "python3" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "cpp" | "c++" | "cxx" => Ok(Language::Cpp),
            _ => Err(ParseLanguageError(s.to_owned())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of user code to be executed once against one stdin payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub problem_id: Option<u64>,
    pub language: Language,
    pub source_code: String,
    #[serde(default)]
    pub stdin: String,
}

impl Submission {
    pub fn new(language: Language, source_code: impl Into<String>) -> Self {
        Self {
            problem_id: None,
            language,
            source_code: source_code.into(),
            stdin: String::new(),
        }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = stdin.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictKind {
    Accepted,
    WrongAnswer,
    CompileError,
    RuntimeError,
    TimeLimitExceeded,
    InternalError,
}

impl VerdictKind {
    /// Judge0 status id.
    pub fn status_id(self) -> u32 {
        match self {
            VerdictKind::Accepted => 3,
            VerdictKind::WrongAnswer => 4,
            VerdictKind::TimeLimitExceeded => 5,
            VerdictKind::CompileError => 6,
            VerdictKind::RuntimeError => 11,
            VerdictKind::InternalError => 13,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            VerdictKind::Accepted => "AC",
            VerdictKind::WrongAnswer => "WA",
            VerdictKind::CompileError => "CE",
            VerdictKind::RuntimeError => "RE",
            VerdictKind::TimeLimitExceeded => "TLE",
            VerdictKind::InternalError => "IE",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            VerdictKind::Accepted => "Accepted",
            VerdictKind::WrongAnswer => "Wrong Answer",
            VerdictKind::CompileError => "Compilation Error",
            VerdictKind::RuntimeError => "Runtime Error",
            VerdictKind::TimeLimitExceeded => "Time Limit Exceeded",
            VerdictKind::InternalError => "Internal Error",
        }
    }

    /// `false` only for failures of the judging infrastructure itself.
    pub fn is_user_caused(self) -> bool {
        !matches!(self, VerdictKind::InternalError)
    }
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub kind: VerdictKind,
    pub status_id: u32,
    pub stdout: String,
    pub stderr: String,
    pub message: String,
    pub time: f64, // seconds
}

impl Verdict {
    fn new(kind: VerdictKind, stdout: String, stderr: String, time: f64) -> Self {
        Self {
            kind,
            status_id: kind.status_id(),
            stdout,
            stderr,
            message: kind.message().to_owned(),
            time,
        }
    }

    pub fn accepted(stdout: impl Into<String>, time: f64) -> Self {
        Self::new(VerdictKind::Accepted, stdout.into(), String::new(), time)
    }

    pub fn wrong_answer(stdout: impl Into<String>, time: f64) -> Self {
        Self::new(VerdictKind::WrongAnswer, stdout.into(), String::new(), time)
    }

    pub fn compile_error(diagnostics: impl Into<String>) -> Self {
        Self::new(VerdictKind::CompileError, String::new(), diagnostics.into(), 0.0)
    }

    pub fn runtime_error(
        stdout: impl Into<String>,
        diagnostics: impl Into<String>,
        time: f64,
    ) -> Self {
        Self::new(VerdictKind::RuntimeError, stdout.into(), diagnostics.into(), time)
    }

    pub fn time_limit_exceeded(time: f64) -> Self {
        Self::new(VerdictKind::TimeLimitExceeded, String::new(), String::new(), time)
    }

    pub fn internal_error(diagnostics: impl Into<String>) -> Self {
        Self::new(VerdictKind::InternalError, String::new(), diagnostics.into(), 0.0)
    }

    pub fn is_accepted(&self) -> bool {
        self.kind == VerdictKind::Accepted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub status: String,
    pub score: u32,
    pub passed_count: u32,
    pub total_count: u32,
    pub message: String,
    pub verdicts: Vec<Verdict>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_aliases() {
        assert_eq!("Python3".parse::<Language>(), Ok(Language::Python));
        assert_eq!(" c++ ".parse::<Language>(), Ok(Language::Cpp));
        assert_eq!("JAVA".parse::<Language>(), Ok(Language::Java));
        assert!("brainfuck".parse::<Language>().is_err());

        let lang: Language = serde_json::from_str(r#""py""#).unwrap();
        assert_eq!(lang, Language::Python);
    }

    #[test]
    fn submission_json() {
        let json = r#"{"problemId": 7, "language": "cpp", "sourceCode": "int main(){}"}"#;
        let sub: Submission = serde_json::from_str(json).unwrap();
        assert_eq!(sub.problem_id, Some(7));
        assert_eq!(sub.language, Language::Cpp);
        assert_eq!(sub.stdin, "");
    }

    #[test]
    fn verdict_json() {
        let verdict = Verdict::time_limit_exceeded(2.0);
        let value = serde_json::to_value(&verdict).unwrap();
        assert_eq!(value["kind"], "TimeLimitExceeded");
        assert_eq!(value["statusId"], 5);
        assert_eq!(value["message"], "Time Limit Exceeded");
    }
}
