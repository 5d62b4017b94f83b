use std::time::Duration;

use duration_str::deserialize_option_duration;
use serde::{Deserialize, Deserializer, de::Error as _};
use url::Url;

/// Configuration for CORS (Cross-Origin Resource Sharing)
#[derive(Clone, Default, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// If false (or not defined), credentials are not allowed in requests
    pub allow_credentials: bool,
    /// Origins from which we allow requests
    pub allow_origins: Option<AnyOrArray<Url>>,
    /// Maximum time between OPTIONS and the next request
    #[serde(deserialize_with = "deserialize_option_duration")]
    pub max_age: Option<Duration>,
    /// HTTP methods allowed to the endpoint.
    pub allow_methods: Option<AnyOrArray<HttpMethod>>,
    /// Headers allowed in incoming requests
    pub allow_headers: Option<AnyOrArray<String>>,
}

/// Either the string `"any"` or an explicit list of values.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyOrArray<T> {
    /// Allow any value.
    Any,
    /// Allow the listed values only.
    Explicit(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for AnyOrArray<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Keyword(String),
            List(Vec<T>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Keyword(s) if s == "any" => Ok(AnyOrArray::Any),
            Raw::Keyword(s) => Err(D::Error::custom(format!(r#"expected "any" or an array, found "{s}""#))),
            Raw::List(values) => Ok(AnyOrArray::Explicit(values)),
        }
    }
}

/// Represents a standard HTTP method.
#[derive(Debug, PartialEq, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// The GET method requests a representation of the specified resource.
    Get,
    /// The POST method submits an entity to the specified resource.
    Post,
    /// The PUT method replaces all current representations of the target resource.
    Put,
    /// The DELETE method deletes the specified resource.
    Delete,
    /// The HEAD method asks for a GET response without the response body.
    Head,
    /// The OPTIONS method describes the communication options for the target resource.
    Options,
    /// The PATCH method applies partial modifications to a resource.
    Patch,
}

impl From<HttpMethod> for http::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Options => http::Method::OPTIONS,
            HttpMethod::Patch => http::Method::PATCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_any_keyword() {
        let config: CorsConfig = toml::from_str(r#"allow_origins = "any""#).unwrap();
        assert_eq!(config.allow_origins, Some(AnyOrArray::Any));
    }

    #[test]
    fn origins_explicit_list() {
        let config: CorsConfig = toml::from_str(r#"allow_origins = ["https://app.example.com"]"#).unwrap();

        let Some(AnyOrArray::Explicit(origins)) = config.allow_origins else {
            panic!("expected explicit origin list");
        };

        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0].as_str(), "https://app.example.com/");
    }

    #[test]
    fn origins_invalid_keyword() {
        let result: Result<CorsConfig, _> = toml::from_str(r#"allow_origins = "all""#);
        assert!(result.is_err());
    }

    #[test]
    fn methods_uppercase() {
        let config: CorsConfig = toml::from_str(r#"allow_methods = ["GET", "POST"]"#).unwrap();

        assert_eq!(
            config.allow_methods,
            Some(AnyOrArray::Explicit(vec![HttpMethod::Get, HttpMethod::Post]))
        );
    }

    #[test]
    fn max_age_duration_string() {
        let config: CorsConfig = toml::from_str(r#"max_age = "60s""#).unwrap();
        assert_eq!(config.max_age, Some(Duration::from_secs(60)));
    }
}
