//! Builds listing criteria from raw request parameters.

use super::countries_model::{CountryQuery, CountrySort, SortDirection, SortField};
use crate::errors::{Error, Result};

impl SortField {
    /// Parses a sortable field name, case-insensitively. The snake_case
    /// spelling of camelCase fields is accepted as well.
    pub fn parse(field: &str) -> Option<Self> {
        match field.to_ascii_lowercase().as_str() {
            "name" => Some(SortField::Name),
            "population" => Some(SortField::Population),
            "estimatedgdp" | "estimated_gdp" => Some(SortField::EstimatedGdp),
            "region" => Some(SortField::Region),
            "currencycode" | "currency_code" => Some(SortField::CurrencyCode),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Population => "population",
            SortField::EstimatedGdp => "estimatedGdp",
            SortField::Region => "region",
            SortField::CurrencyCode => "currencyCode",
        }
    }
}

impl CountrySort {
    /// Parses `field`, `field_asc` or `field_desc`. The suffix is
    /// case-insensitive and the direction defaults to ascending.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let lowered = spec.to_ascii_lowercase();
        let (field, direction) = if lowered.ends_with("_asc") {
            (&spec[..spec.len() - 4], SortDirection::Asc)
        } else if lowered.ends_with("_desc") {
            (&spec[..spec.len() - 5], SortDirection::Desc)
        } else {
            (spec, SortDirection::Asc)
        };

        let field = SortField::parse(field)
            .ok_or_else(|| Error::InvalidArgument(format!("Invalid sort field: {}", spec)))?;
        Ok(CountrySort { field, direction })
    }
}

impl CountryQuery {
    /// Normalises optional request parameters: blank filters and a blank
    /// sort are treated as absent.
    pub fn from_params(
        region: Option<&str>,
        currency: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Self> {
        let sort = match non_blank(sort) {
            Some(spec) => Some(CountrySort::parse(&spec)?),
            None => None,
        };
        Ok(CountryQuery {
            region: non_blank(region),
            currency: non_blank(currency),
            sort,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
