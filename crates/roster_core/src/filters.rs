use crate::{Resource, ValidationError};

pub const MAX_PAGE_SIZE: u32 = 100;

/// Checks a filter edit before it becomes part of a query key and returns the
/// value to store: trimmed, with statuses in their canonical spelling.
///
/// Empty values always pass: they clear the filter.
pub fn validate_filter(
    resource: Resource,
    name: &str,
    value: &str,
) -> Result<String, ValidationError> {
    if !resource.filters().contains(&name) {
        return Err(ValidationError::UnknownFilter {
            resource: resource.name().to_string(),
            name: name.to_string(),
        });
    }
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    match name {
        "status" => resource
            .statuses()
            .iter()
            .find(|status| status.eq_ignore_ascii_case(value))
            .map(|status| status.to_string())
            .ok_or_else(|| ValidationError::InvalidStatus {
                resource: resource.name().to_string(),
                value: value.to_string(),
            }),
        "year" => {
            if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
                Ok(value.to_string())
            } else {
                Err(ValidationError::InvalidYear(value.to_string()))
            }
        }
        _ => Ok(value.to_string()),
    }
}

pub fn validate_page_size(value: u32) -> Result<(), ValidationError> {
    if (1..=MAX_PAGE_SIZE).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPageSize {
            value,
            max: MAX_PAGE_SIZE,
        })
    }
}

/// Splits `name=value` as typed on a command line. The value may be empty.
pub fn parse_filter_assignment(raw: &str) -> Result<(String, String), ValidationError> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| ValidationError::MalformedFilter(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::MalformedFilter(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_checked_against_resource() {
        assert_eq!(
            validate_filter(Resource::Students, "status", " Approved "),
            Ok("approved".to_string())
        );
        assert_eq!(
            validate_filter(Resource::Centers, "status", "approved"),
            Err(ValidationError::InvalidStatus {
                resource: "centers".to_string(),
                value: "approved".to_string(),
            })
        );
    }

    #[test]
    fn unknown_filter_is_rejected() {
        assert!(matches!(
            validate_filter(Resource::Centers, "course", "bca"),
            Err(ValidationError::UnknownFilter { .. })
        ));
    }

    #[test]
    fn year_needs_four_digits() {
        assert!(validate_filter(Resource::Students, "year", "2024").is_ok());
        assert!(validate_filter(Resource::Students, "year", "24").is_err());
        assert!(validate_filter(Resource::Students, "year", "").is_ok());
    }

    #[test]
    fn filter_assignment_allows_empty_value() {
        assert_eq!(
            parse_filter_assignment("search=").unwrap(),
            ("search".to_string(), String::new())
        );
        assert!(parse_filter_assignment("search").is_err());
        assert!(parse_filter_assignment("=x").is_err());
    }
}
