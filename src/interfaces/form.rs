use crate::domain::params::{ParameterSet, is_param_name};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("form body is empty")]
    Empty,
    #[error("`{0}` is not a valid parameter name")]
    InvalidKey(String),
}

/// Decodes an `application/x-www-form-urlencoded` body.
///
/// Gateway parameter names are plain identifiers, so any other key means the
/// body was not a form in the first place.
pub fn decode(body: &str) -> Result<ParameterSet, FormError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(FormError::Empty);
    }

    let mut params = ParameterSet::new();
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        if !is_param_name(&key) {
            return Err(FormError::InvalidKey(key.into_owned()));
        }
        params.insert(key.into_owned(), value.into_owned());
    }
    Ok(params)
}
