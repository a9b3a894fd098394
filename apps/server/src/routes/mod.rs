use actix_web::{error, web};

use crate::error::AppError;

mod apis;
mod health;
mod monitoring;

macros_utils::routes! {
    load health,
    load apis,
    load monitoring,
}

/// Malformed JSON bodies get the same envelope as every other failure
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| error::Error::from(AppError::BadRequest(err.to_string())))
}
