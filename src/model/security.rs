use crate::error::StructuralError;
use crate::model::{Component, Components, ObjectOrReference, ObjectShape};
use crate::validate::{Context, Validate, require};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Where an API key is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// A security scheme usable by operations. Only modelled and validated, never enforced.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "apiKey")]
    ApiKey {
        #[serde(default)]
        name: String,
        #[serde(rename = "in")]
        location: ApiKeyLocation,
        #[serde(default)]
        description: Option<String>,
    },
    #[serde(rename = "http")]
    Http {
        #[serde(default)]
        scheme: String,
        #[serde(default, rename = "bearerFormat")]
        bearer_format: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
    #[serde(rename = "mutualTLS")]
    MutualTls {
        #[serde(default)]
        description: Option<String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        flows: OAuthFlows,
        #[serde(default)]
        description: Option<String>,
    },
    #[serde(rename = "openIdConnect")]
    OpenIdConnect {
        #[serde(default, rename = "openIdConnectUrl")]
        open_id_connect_url: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl Validate for SecurityScheme {
    fn validate(&self) -> Result<(), StructuralError> {
        match self {
            SecurityScheme::ApiKey { name, .. } => require("name", name),
            SecurityScheme::Http { scheme, .. } => require("scheme", scheme),
            SecurityScheme::MutualTls { .. } => Ok(()),
            SecurityScheme::OAuth2 { flows, .. } => flows.validate().context("flows"),
            SecurityScheme::OpenIdConnect {
                open_id_connect_url,
                ..
            } => require("openIdConnectUrl", open_id_connect_url),
        }
    }
}

impl ObjectShape for SecurityScheme {
    const KIND: &'static str = "securityScheme";
    const OBJECT_FIELDS: &'static [&'static str] = &["type"];
}

impl Component for SecurityScheme {
    const SECTION: &'static str = "securitySchemes";

    fn registry(components: &Components) -> &BTreeMap<String, ObjectOrReference<Self>> {
        &components.security_schemes
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    #[serde(default)]
    pub implicit: Option<OAuthFlow>,
    #[serde(default)]
    pub password: Option<OAuthFlow>,
    #[serde(default)]
    pub client_credentials: Option<OAuthFlow>,
    #[serde(default)]
    pub authorization_code: Option<OAuthFlow>,
}

impl Validate for OAuthFlows {
    fn validate(&self) -> Result<(), StructuralError> {
        let flows = [
            ("implicit", &self.implicit, true, false),
            ("password", &self.password, false, true),
            ("clientCredentials", &self.client_credentials, false, true),
            ("authorizationCode", &self.authorization_code, true, true),
        ];
        for (label, flow, needs_authorization, needs_token) in flows {
            if let Some(flow) = flow {
                flow.require_urls(needs_authorization, needs_token)
                    .context(label)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(default)]
    pub authorization_url: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
}

impl OAuthFlow {
    fn require_urls(&self, authorization: bool, token: bool) -> Result<(), StructuralError> {
        if authorization {
            require(
                "authorizationUrl",
                self.authorization_url.as_deref().unwrap_or_default(),
            )?;
        }
        if token {
            require("tokenUrl", self.token_url.as_deref().unwrap_or_default())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::model::{ApiKeyLocation, ObjectOrReference, SecurityScheme};
    use crate::validate::Validate;
    use serde_json::json;

    fn scheme(value: serde_json::Value) -> SecurityScheme {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_api_key_scheme() {
        let parsed = scheme(json!({ "type": "apiKey", "name": "api_key", "in": "header" }));
        if let SecurityScheme::ApiKey { name, location, .. } = &parsed {
            assert_eq!(name, "api_key");
            assert_eq!(*location, ApiKeyLocation::Header);
        } else {
            panic!("Expected SecurityScheme::ApiKey");
        }
        assert!(parsed.validate().is_ok());

        let unnamed = scheme(json!({ "type": "apiKey", "in": "query" }));
        assert_eq!(unnamed.validate().unwrap_err().to_string(), "name is required");
    }

    #[test]
    fn test_http_and_open_id_schemes() {
        assert!(scheme(json!({ "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }))
            .validate()
            .is_ok());
        assert_eq!(
            scheme(json!({ "type": "http" })).validate().unwrap_err().to_string(),
            "scheme is required"
        );
        assert_eq!(
            scheme(json!({ "type": "openIdConnect" }))
                .validate()
                .unwrap_err()
                .to_string(),
            "openIdConnectUrl is required"
        );
        assert!(scheme(json!({ "type": "mutualTLS" })).validate().is_ok());
    }

    #[test]
    fn test_unknown_scheme_type_fails_to_load() {
        assert!(serde_json::from_value::<SecurityScheme>(json!({ "type": "kerberos" })).is_err());
    }

    #[test]
    fn test_oauth_flow_urls() {
        let parsed = scheme(json!({
            "type": "oauth2",
            "flows": {
                "implicit": {
                    "authorizationUrl": "https://example.com/api/oauth/dialog",
                    "scopes": { "write:pets": "modify pets", "read:pets": "read pets" }
                },
                "authorizationCode": {
                    "authorizationUrl": "https://example.com/api/oauth/dialog",
                    "tokenUrl": "https://example.com/api/oauth/token",
                    "scopes": {}
                }
            }
        }));
        assert!(parsed.validate().is_ok());

        let missing_token = scheme(json!({
            "type": "oauth2",
            "flows": {
                "clientCredentials": { "scopes": {} }
            }
        }));
        assert_eq!(
            missing_token.validate().unwrap_err().to_string(),
            "invalid flows: invalid clientCredentials: tokenUrl is required"
        );
    }

    #[test]
    fn test_scheme_reference() {
        let reference = serde_json::from_value::<ObjectOrReference<SecurityScheme>>(json!({
            "$ref": "#/components/securitySchemes/api_key"
        }))
        .unwrap();
        assert!(reference.as_reference().is_some());
    }
}
