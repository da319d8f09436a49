use std::borrow::Cow;

use axum::extract::FromRequest;
use country_cache_core::CountryUpdate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::ApiError;

/// JSON extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query string of `GET /countries`.
#[derive(Debug, Default, Deserialize)]
pub struct CountryQueryParams {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

/// Body of `PUT /countries/{name}`. Every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CountryUpdateRequest {
    #[validate(custom(function = "not_blank"))]
    pub capital: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub region: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub population: Option<i64>,
    #[validate(custom(function = "not_blank"))]
    pub currency_code: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub exchange_rate: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    pub estimated_gdp: Option<Decimal>,
    #[validate(custom(function = "not_blank"))]
    pub flag_url: Option<String>,
}

impl CountryUpdateRequest {
    pub fn into_update(self) -> CountryUpdate {
        CountryUpdate {
            capital: self.capital,
            region: self.region,
            population: self.population,
            currency_code: self.currency_code,
            exchange_rate: self.exchange_rate,
            estimated_gdp: self.estimated_gdp,
            flag_url: self.flag_url,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(
            ValidationError::new("negative").with_message(Cow::Borrowed("must not be negative")),
        );
    }
    Ok(())
}
