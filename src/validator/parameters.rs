use crate::error::RequestValidationError;
use crate::model::{OpenApi, ParameterLocation};
use crate::types::RequestParts;
use crate::validator::{RequestCheck, ResolvedOperation};
use http::HeaderMap;
use http::header::COOKIE;
use percent_encoding::percent_decode_str;
use std::collections::HashSet;

/// Rejects requests that omit a required parameter.
///
/// Only presence is checked, values are not validated against their schemas.
/// Header and cookie parameters are skipped when the request carries no headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredParameterCheck;

impl RequiredParameterCheck {
    pub fn new() -> Self {
        Self
    }
}

/// Percent-decoded names of the query pairs.
fn query_parameter_names(query: &str) -> HashSet<String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let key = pair.split_once('=').map_or(pair, |(key, _)| key);
            if key.is_empty() {
                log::warn!("Invalid query parameter: {}", pair);
                return None;
            }
            Some(percent_decode_str(key).decode_utf8_lossy().to_string())
        })
        .collect()
}

fn cookie_names(headers: &HeaderMap) -> HashSet<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|cookie| {
            let name = cookie.split_once('=').map_or(cookie, |(name, _)| name).trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

impl RequestCheck for RequiredParameterCheck {
    fn name(&self) -> &'static str {
        "required-parameters"
    }

    fn check(
        &self,
        document: &OpenApi,
        resolved: &ResolvedOperation<'_>,
        request: &RequestParts<'_>,
    ) -> Result<(), RequestValidationError> {
        let parameters = resolved
            .path_item
            .effective_parameters(resolved.operation, document.components())
            .map_err(|source| RequestValidationError::Reference {
                path: resolved.template.to_string(),
                source,
            })?;

        let query = query_parameter_names(request.query.unwrap_or_default());
        let cookies = request.headers.map(cookie_names);

        for parameter in parameters {
            if !parameter.is_required() && parameter.location != ParameterLocation::Path {
                continue;
            }
            let present = match parameter.location {
                ParameterLocation::Query => query.contains(&parameter.name),
                ParameterLocation::Path => resolved.path_parameters.contains_key(&parameter.name),
                ParameterLocation::Header => match request.headers {
                    Some(headers) => headers.contains_key(parameter.name.as_str()),
                    None => continue,
                },
                ParameterLocation::Cookie => match &cookies {
                    Some(cookies) => cookies.contains(&parameter.name),
                    None => continue,
                },
            };
            if !present {
                log::debug!(
                    "Missing required {} parameter {} for {}",
                    parameter.location,
                    parameter.name,
                    resolved.template
                );
                return Err(RequestValidationError::RequiredParameterMissing {
                    name: parameter.name.clone(),
                    location: parameter.location.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::error::RequestValidationError;
    use crate::model::OpenApi;
    use crate::validator::OpenApiRequestValidator;
    use crate::validator::parameters::{RequiredParameterCheck, cookie_names, query_parameter_names};
    use http::header::COOKIE;
    use http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
    use serde_json::json;

    fn validator() -> OpenApiRequestValidator {
        let document: OpenApi = serde_json::from_value(json!({
            "openapi": "3.1.0",
            "info": { "title": "Petstore", "version": "1.0.0" },
            "paths": {
                "/pets": {
                    "parameters": [
                        { "$ref": "#/components/parameters/tenant" }
                    ],
                    "get": {
                        "operationId": "listPets",
                        "parameters": [
                            { "name": "limit", "in": "query", "required": true },
                            { "name": "tags", "in": "query" },
                            { "name": "session", "in": "cookie", "required": true }
                        ]
                    }
                },
                "/pets/{petId}": {
                    "get": {
                        "operationId": "showPetById",
                        "parameters": [
                            { "name": "petId", "in": "path", "required": true }
                        ]
                    }
                }
            },
            "components": {
                "parameters": {
                    "tenant": { "name": "X-Tenant", "in": "header", "required": true }
                }
            }
        }))
        .unwrap();
        OpenApiRequestValidator::from_parts(document, None, 0, vec![Box::new(RequiredParameterCheck)])
    }

    #[test]
    fn test_query_parameter_names() {
        let names = query_parameter_names("limit=10&tag%20name=a&flag&=orphan&&");
        assert!(names.contains("limit"));
        assert!(names.contains("tag name"));
        assert!(names.contains("flag"));
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_cookie_names() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=abc; theme=dark"));
        let names = cookie_names(&headers);
        assert!(names.contains("session"));
        assert!(names.contains("theme"));
    }

    #[test]
    fn test_missing_required_query_parameter() {
        let err = validator().validate("GET", "/pets?tags=a").unwrap_err();
        assert_eq!(
            err,
            RequestValidationError::RequiredParameterMissing {
                name: "limit".to_string(),
                location: "query".to_string(),
            }
        );
        assert_eq!(err.to_string(), "missing the required query parameter \"limit\"");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_header_and_cookie_skipped_without_headers() {
        let v = validator();
        let resolved = v.validate("GET", "/pets?limit=5").unwrap();
        assert_eq!(resolved.operation_id(), Some("listPets"));
    }

    #[test]
    fn test_headers_are_checked_when_present() {
        let validator = validator();
        let request = Request::builder()
            .method(Method::GET)
            .uri("/pets?limit=5")
            .header("x-tenant", "acme")
            .body(())
            .unwrap();
        if let Err(RequestValidationError::RequiredParameterMissing { name, location }) =
            validator.validate_request(&request)
        {
            assert_eq!(name, "session");
            assert_eq!(location, "cookie");
        } else {
            panic!("Expected RequestValidationError::RequiredParameterMissing");
        }

        let request = Request::builder()
            .method(Method::GET)
            .uri("/pets?limit=5")
            .header("cookie", "session=abc")
            .body(())
            .unwrap();
        if let Err(RequestValidationError::RequiredParameterMissing { name, .. }) =
            validator.validate_request(&request)
        {
            assert_eq!(name, "X-Tenant");
        } else {
            panic!("Expected RequestValidationError::RequiredParameterMissing");
        }

        let request = Request::builder()
            .method(Method::GET)
            .uri("/pets?limit=5")
            .header("X-Tenant", "acme")
            .header("cookie", "session=abc")
            .body(())
            .unwrap();
        assert!(validator.validate_request(&request).is_ok());
    }

    #[test]
    fn test_path_parameters_are_captured() {
        assert!(validator().validate("GET", "/pets/12").is_ok());
    }
}
