#![feature(error_generic_member_access)]
#![deny(missing_docs)]

//! Error handling for RSF.
//!
//! Every fallible operation in the workspace returns an [`RsfResult`]. Errors carry a
//! message and a captured [`Backtrace`], and are built with the [`rsf_err`] and [`rsf_bail`]
//! macros.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{fmt, io};

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for RSF.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum RsfError {
    /// Field annotations are malformed or inconsistent. Raised while resolving a schema,
    /// never while encoding or decoding values.
    #[error("schema error: {0}\nBacktrace:\n{1}")]
    Schema(ErrString, Backtrace),
    /// A value's runtime shape does not match its resolved schema.
    #[error("unsupported type: {0}\nBacktrace:\n{1}")]
    UnsupportedType(ErrString, Backtrace),
    /// A read found no bytes at all. At a block boundary this is the normal end of input.
    #[error("end of stream: {0}\nBacktrace:\n{1}")]
    EndOfStream(ErrString, Backtrace),
    /// The stream ended part way through a field.
    #[error("truncated field: {0}\nBacktrace:\n{1}")]
    Truncated(ErrString, Backtrace),
    /// A length or marker read from the stream is internally inconsistent.
    #[error("malformed field: {0}\nBacktrace:\n{1}")]
    MalformedField(ErrString, Backtrace),
    /// The source cannot seek, or the requested offset is out of range.
    #[error("seek error: {0}\nBacktrace:\n{1}")]
    Seek(ErrString, Backtrace),
    /// A block is too large to be described by a 4-byte length.
    #[error("length overflow: {0}\nBacktrace:\n{1}")]
    LengthOverflow(ErrString, Backtrace),
    /// An invalid argument was provided.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// The underlying byte source or sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<RsfError>),
}

impl RsfError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        RsfError::Context(msg.into(), Box::new(self))
    }

    /// The innermost error, looking through any [`RsfError::Context`] wrappers.
    pub fn root(&self) -> &RsfError {
        match self {
            RsfError::Context(_, inner) => inner.root(),
            other => other,
        }
    }

    /// True for both flavors of running out of input: a clean [`RsfError::EndOfStream`]
    /// and a mid-field [`RsfError::Truncated`].
    pub fn is_end_of_stream(&self) -> bool {
        matches!(
            self.root(),
            RsfError::EndOfStream(..) | RsfError::Truncated(..)
        )
    }

    /// True only when the input ran out on a field boundary.
    pub fn is_clean_end_of_stream(&self) -> bool {
        matches!(self.root(), RsfError::EndOfStream(..))
    }

    /// True if this is a schema resolution error.
    pub fn is_schema(&self) -> bool {
        matches!(self.root(), RsfError::Schema(..))
    }

    /// True if a value did not match its schema.
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self.root(), RsfError::UnsupportedType(..))
    }

    /// True if a field read from the stream was inconsistent.
    pub fn is_malformed(&self) -> bool {
        matches!(self.root(), RsfError::MalformedField(..))
    }

    /// True if a seek was rejected.
    pub fn is_seek(&self) -> bool {
        matches!(self.root(), RsfError::Seek(..))
    }
}

impl Debug for RsfError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return [`RsfError`]s as their error type.
pub type RsfResult<T> = Result<T, RsfError>;

/// A convenient macro for creating an [`RsfError`].
#[macro_export]
macro_rules! rsf_err {
    (Io: $($tts:tt)*) => {{
        let err_string = format!($($tts)*);
        $crate::__private::must_use(
            $crate::RsfError::from(std::io::Error::other(err_string))
        )
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::RsfError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    ($variant:ident: $err:expr $(,)?) => {
        $crate::__private::must_use(
            $crate::RsfError::$variant($err)
        )
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::rsf_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning an [`RsfError`].
#[macro_export]
macro_rules! rsf_bail {
    ($($tt:tt)+) => {
        return Err($crate::rsf_err!($($tt)+))
    };
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub const fn must_use(error: crate::RsfError) -> crate::RsfError {
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_stream_flavors() {
        let clean = rsf_err!(EndOfStream: "no bytes at offset {}", 12);
        assert!(clean.is_end_of_stream());
        assert!(clean.is_clean_end_of_stream());

        let truncated = rsf_err!(Truncated: "needed {} bytes, found {}", 4, 2);
        assert!(truncated.is_end_of_stream());
        assert!(!truncated.is_clean_end_of_stream());
    }

    #[test]
    fn context_is_transparent_to_predicates() {
        let err = rsf_err!(MalformedField: "bad length").with_context("reading array");
        assert!(err.is_malformed());
        assert!(err.to_string().starts_with("reading array: malformed field: bad length"));
    }

    #[test]
    fn io_errors_convert() {
        fn fails() -> RsfResult<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))?;
            Ok(())
        }
        assert!(matches!(fails().unwrap_err(), RsfError::Io(_)));
    }

    #[test]
    fn bail_returns_early() {
        fn check(width: usize) -> RsfResult<usize> {
            if width == 0 {
                rsf_bail!(Schema: "fixed string width must be positive");
            }
            Ok(width)
        }
        assert_eq!(check(10).unwrap(), 10);
        assert!(check(0).unwrap_err().is_schema());
    }
}
