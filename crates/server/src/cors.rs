use config::{AnyOrArray, CorsConfig};
use http::{HeaderName, HeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

pub(super) fn generate(
    CorsConfig {
        allow_credentials,
        allow_origins,
        max_age,
        allow_methods,
        allow_headers,
    }: &CorsConfig,
) -> CorsLayer {
    let mut cors_layer = CorsLayer::new().allow_credentials(*allow_credentials);

    if let Some(allow_origins) = allow_origins {
        cors_layer = cors_layer.allow_origin(match allow_origins {
            AnyOrArray::Any => AllowOrigin::any(),
            AnyOrArray::Explicit(origins) => {
                let origins = origins
                    .iter()
                    .map(|origin| {
                        let origin = &origin[..url::Position::BeforePath];
                        HeaderValue::from_str(origin).expect("must be ascii")
                    })
                    .collect::<Vec<_>>();

                AllowOrigin::list(origins)
            }
        });
    }

    if let Some(allow_methods) = allow_methods {
        cors_layer = cors_layer.allow_methods(match allow_methods {
            AnyOrArray::Any => AllowMethods::any(),
            AnyOrArray::Explicit(methods) => {
                let methods = methods.iter().map(|method| http::Method::from(*method)).collect::<Vec<_>>();

                AllowMethods::list(methods)
            }
        });
    }

    if let Some(allow_headers) = allow_headers {
        cors_layer = cors_layer.allow_headers(match allow_headers {
            AnyOrArray::Any => AllowHeaders::any(),
            AnyOrArray::Explicit(headers) => {
                let headers = headers
                    .iter()
                    .filter_map(|header| header.parse::<HeaderName>().ok())
                    .collect::<Vec<_>>();

                AllowHeaders::list(headers)
            }
        });
    }

    if let Some(max_age) = max_age {
        cors_layer = cors_layer.max_age(*max_age);
    }

    cors_layer
}
