//! [`Error`]-related definitions.

use std::fmt;

use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::{error::AsKind, ErrorKind};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// GraphQL API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Message shown instead of the details of an infrastructure failure.
    const UNAVAILABLE_MESSAGE: &'static str =
        "Service is temporarily unavailable";

    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] of the provided [`ErrorKind`].
    ///
    /// The `msg` is dropped for [`ErrorKind::StoreUnavailable`].
    #[must_use]
    pub fn of_kind(kind: ErrorKind, msg: &impl ToString) -> Self {
        use http::StatusCode as S;
        use ErrorKind as K;

        let (code, status_code) = match kind {
            K::Unauthenticated => ("UNAUTHENTICATED", S::UNAUTHORIZED),
            K::InvalidCredential => ("INVALID_CREDENTIAL", S::UNAUTHORIZED),
            K::Forbidden => ("FORBIDDEN", S::FORBIDDEN),
            K::NotFound => ("NOT_FOUND", S::NOT_FOUND),
            K::Conflict => ("CONFLICT", S::CONFLICT),
            K::InvalidArgument => ("INVALID_ARGUMENT", S::BAD_REQUEST),
            K::InvalidTransition => {
                ("INVALID_TRANSITION", S::UNPROCESSABLE_ENTITY)
            }
            K::StoreUnavailable => {
                ("STORE_UNAVAILABLE", S::SERVICE_UNAVAILABLE)
            }
        };
        let message = if kind == K::StoreUnavailable {
            Self::UNAVAILABLE_MESSAGE.to_owned()
        } else {
            msg.to_string()
        };
        Self {
            code,
            status_code,
            message,
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let mut ext = juniper::Object::with_capacity(1);
        drop(
            ext.add_field("code", juniper::Value::scalar(self.code.to_owned())),
        );
        drop(
            ext.add_field(
                "backtrace",
                juniper::Value::list(
                    self.backtrace
                        .iter()
                        .flat_map(|trace| trace.iter())
                        .map(|frame| juniper::Value::scalar(frame.to_string()))
                        .collect(),
                ),
            ),
        );
        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error;

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: Sized,
    {
        self.as_error()
    }
}

impl<E> AsError for Traced<E>
where
    E: AsKind + fmt::Display,
{
    fn as_error(&self) -> Error {
        let err = self.as_ref();
        let kind = err.kind();
        if kind == ErrorKind::StoreUnavailable {
            tracing::error!("{self}");
        }

        let mut error = Error::of_kind(kind, err);
        error.backtrace = Some(self.trace().clone());
        error
    }
}

#[cfg(test)]
mod spec {
    use service::ErrorKind;

    use super::Error;

    #[test]
    fn store_details_are_hidden() {
        let err = Error::of_kind(
            ErrorKind::StoreUnavailable,
            &"connection refused at 10.0.0.5:5432",
        );

        assert_eq!(err.code, "STORE_UNAVAILABLE");
        assert_eq!(err.status_code, http::StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.message.contains("10.0.0.5"));
    }

    #[test]
    fn kinds_have_distinct_codes() {
        let kinds = [
            ErrorKind::Unauthenticated,
            ErrorKind::InvalidCredential,
            ErrorKind::Forbidden,
            ErrorKind::NotFound,
            ErrorKind::Conflict,
            ErrorKind::InvalidArgument,
            ErrorKind::InvalidTransition,
            ErrorKind::StoreUnavailable,
        ];
        let mut codes = kinds
            .iter()
            .map(|k| Error::of_kind(*k, &"").code)
            .collect::<Vec<_>>();
        codes.sort_unstable();
        codes.dedup();

        assert_eq!(codes.len(), kinds.len());
        assert_eq!(
            Error::of_kind(ErrorKind::Forbidden, &"nope").message,
            "nope",
        );
    }
}
