use roster_core::{QueryKey, Resource};
use serde_json::{Map, Value};

use crate::ApiContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Parameters go in the query string.
    Get,
    /// Parameters go in a JSON body.
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
}

pub fn endpoint_for(resource: Resource) -> Endpoint {
    match resource {
        Resource::Students => Endpoint {
            method: Method::Get,
            path: "students",
        },
        Resource::Bills => Endpoint {
            method: Method::Post,
            path: "bills/list",
        },
        Resource::Centers => Endpoint {
            method: Method::Get,
            path: "centers",
        },
    }
}

/// Request parameters in a stable order: page, limit, filters by name, then
/// the center scope for center users.
pub fn request_params(key: &QueryKey, page: u32, context: &ApiContext) -> Vec<(String, String)> {
    let mut params = vec![
        ("page".to_string(), page.to_string()),
        ("limit".to_string(), key.limit().to_string()),
    ];
    params.extend(
        key.filters()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );
    if key.resource() != Resource::Centers {
        if let Some(center_id) = context.scoped_center_id() {
            params.push(("centerId".to_string(), center_id.to_string()));
        }
    }
    params
}

/// JSON body for POST endpoints. `page` and `limit` are sent as numbers.
pub fn json_body(params: &[(String, String)]) -> Value {
    let mut body = Map::new();
    for (name, value) in params {
        let value = match name.as_str() {
            "page" | "limit" => value
                .parse::<u64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::from(value.as_str())),
            _ => Value::from(value.as_str()),
        };
        body.insert(name.clone(), value);
    }
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_are_ordered_and_scoped() {
        let context = ApiContext::new("http://localhost/api")
            .unwrap()
            .with_center("C-9");
        let key = QueryKey::new(Resource::Bills, 20)
            .with_filter("status", "paid")
            .with_filter("search", "rao");

        let params = request_params(&key, 3, &context);
        let names: Vec<&str> = params.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["page", "limit", "search", "status", "centerId"]);
        assert_eq!(
            json_body(&params),
            json!({"page": 3, "limit": 20, "search": "rao", "status": "paid", "centerId": "C-9"})
        );
    }

    #[test]
    fn centers_are_never_scoped() {
        let context = ApiContext::new("http://localhost").unwrap().with_center("C-9");
        let params = request_params(&QueryKey::new(Resource::Centers, 10), 1, &context);
        assert!(params.iter().all(|(name, _)| name != "centerId"));
    }
}
