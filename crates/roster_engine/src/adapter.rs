use roster_core::{Page, Pagination, Record, Resource};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{FailureKind, FetchError};

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPagination {
    #[serde(alias = "page")]
    current_page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default, alias = "totalItems", alias = "total")]
    total_count: u64,
    has_next_page: bool,
    #[serde(default)]
    has_prev_page: bool,
    #[serde(default)]
    limit: u32,
}

impl From<RawPagination> for Pagination {
    fn from(raw: RawPagination) -> Self {
        Pagination {
            current_page: raw.current_page,
            total_pages: raw.total_pages,
            total_count: raw.total_count,
            has_next_page: raw.has_next_page,
            has_prev_page: raw.has_prev_page,
            limit: raw.limit,
        }
    }
}

fn decode_error(message: impl Into<String>) -> FetchError {
    FetchError::new(FailureKind::Decode, message)
}

/// Maps a `{ data: { <resource>: [...], pagination: {...} } }` body to a page.
pub fn decode_page(resource: Resource, body: &[u8]) -> Result<Page<Record>, FetchError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|err| decode_error(err.to_string()))?;
    let mut data = envelope
        .data
        .ok_or_else(|| decode_error("response has no data object"))?;

    let raw_items = match data.remove(resource.name()) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(decode_error(format!("data.{resource} is not a list"))),
        None => return Err(decode_error(format!("response has no data.{resource}"))),
    };
    let raw_pagination = data
        .remove("pagination")
        .ok_or_else(|| decode_error("response has no data.pagination"))?;
    let pagination: Pagination = serde_json::from_value::<RawPagination>(raw_pagination)
        .map_err(|err| decode_error(format!("bad pagination: {err}")))?
        .into();

    let items = raw_items
        .iter()
        .enumerate()
        .map(|(index, item)| record_from_json(item, pagination.current_page, index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page::new(items, pagination))
}

fn record_from_json(item: &Value, page: u32, index: usize) -> Result<Record, FetchError> {
    let object = item
        .as_object()
        .ok_or_else(|| decode_error(format!("item {index} on page {page} is not an object")))?;

    let id = ["_id", "id"]
        .iter()
        .find_map(|name| object.get(*name).and_then(scalar_text))
        .unwrap_or_else(|| format!("{page}-{index}"));

    let mut record = Record::new(id);
    for (name, value) in object {
        match value {
            Value::Object(nested) => {
                for (inner, inner_value) in nested {
                    if let Some(text) = scalar_text(inner_value) {
                        record.fields.insert(format!("{name}.{inner}"), text);
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    record.fields.insert(name.clone(), text);
                }
            }
        }
    }
    Ok(record)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Extracts the human readable message from a JSON error body.
pub fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|name| value.get(*name).and_then(Value::as_str))
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn decodes_students_page() {
        let raw = body(json!({
            "success": true,
            "data": {
                "students": [
                    {"_id": "65a1", "name": "Asha Rao", "registrationNo": "REG-001", "year": 2024,
                     "course": {"name": "DCA", "code": "D1"}, "documents": ["a.pdf"], "photo": null},
                    {"id": 7, "name": "Vikram"}
                ],
                "pagination": {"currentPage": 1, "totalPages": 3, "totalCount": 25,
                               "hasNextPage": true, "hasPrevPage": false, "limit": 10}
            }
        }));

        let page = decode_page(Resource::Students, &raw).unwrap();
        assert_eq!(
            page.pagination,
            Pagination {
                current_page: 1,
                total_pages: 3,
                total_count: 25,
                has_next_page: true,
                has_prev_page: false,
                limit: 10,
            }
        );
        assert_eq!(
            page.items[0],
            Record::new("65a1")
                .with_field("_id", "65a1")
                .with_field("name", "Asha Rao")
                .with_field("registrationNo", "REG-001")
                .with_field("year", "2024")
                .with_field("course.name", "DCA")
                .with_field("course.code", "D1")
        );
        assert_eq!(page.items[1].id, "7");
    }

    #[test]
    fn missing_items_field_is_decode_error() {
        let raw = body(json!({"data": {"bills": [], "pagination": {"currentPage": 1, "hasNextPage": false}}}));
        let err = decode_page(Resource::Students, &raw).unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
    }

    #[test]
    fn pagination_aliases_and_defaults() {
        let raw = body(json!({"data": {"centers": [{"name": "North"}],
                                        "pagination": {"page": 2, "totalItems": 11, "hasNextPage": false}}}));
        let page = decode_page(Resource::Centers, &raw).unwrap();
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.pagination.total_count, 11);
        assert_eq!(page.items[0].id, "2-0");
    }

    #[test]
    fn server_message_prefers_message_field() {
        assert_eq!(
            server_message(br#"{"success":false,"message":"Token expired"}"#),
            Some("Token expired".to_string())
        );
        assert_eq!(server_message(br#"{"error":"Forbidden"}"#), Some("Forbidden".to_string()));
        assert_eq!(server_message(b"<html>502</html>"), None);
        assert_eq!(server_message(br#"{"message":"  "}"#), None);
    }
}
