//! Canonical tagged result for collaborator calls.
//!
//! The backend is inconsistent about result tags (`ok`/`err` on some methods,
//! `Ok`/`Err` on others). Both spellings decode into [`TaggedResult`] at the
//! transport boundary so protocol code only ever sees `Result<T, FundError>`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FundError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaggedResult<T> {
    #[serde(rename = "ok", alias = "Ok")]
    Ok(T),
    #[serde(rename = "err", alias = "Err")]
    Err(ErrorPayload),
}

/// Error payload: a bare message or a `{ "message": .. }` record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    Text(String),
    Record { message: String },
}

impl ErrorPayload {
    pub fn into_message(self) -> String {
        match self {
            Self::Text(message) | Self::Record { message } => message,
        }
    }
}

impl<T> TaggedResult<T> {
    pub fn into_result(self) -> Result<T, FundError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Err(payload) => Err(FundError::from_backend_message(payload.into_message())),
        }
    }
}

impl<T> From<TaggedResult<T>> for Result<T, FundError> {
    fn from(tagged: TaggedResult<T>) -> Self {
        tagged.into_result()
    }
}

/// Deserialize an optional value that may arrive as `null`, as the bare
/// value, or in candid's JSON form as a zero- or one-element array.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_optional")]`.
pub fn deserialize_optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr<T> {
        Wrapped(Vec<T>),
        Plain(Option<T>),
    }

    Ok(match Repr::<T>::deserialize(deserializer)? {
        Repr::Wrapped(values) => values.into_iter().next(),
        Repr::Plain(value) => value,
    })
}
