#![deny(clippy::all)]

pub mod common;

pub use self::common::{
    GradeReport, Language, ParseLanguageError, Submission, TestCase, Verdict, VerdictKind,
};
