/*
 * Licensed to the Apache Software Foundation (ASF) under one or more
 * contributor license agreements.  See the NOTICE file distributed with
 * this work for additional information regarding copyright ownership.
 * The ASF licenses this file to You under the Apache License, Version 2.0
 * (the "License"); you may not use this file except in compliance with
 * the License.  You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::api::SwaggerApi;
use crate::error::SwaggerError;
use crate::request::{parse_pairs, RequestParams, ValidatedParams};
use axum::{
    body::{to_bytes, Body},
    extract::{RawPathParams, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;

impl IntoResponse for SwaggerError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[derive(Clone)]
struct ResourceContext {
    api: Arc<SwaggerApi>,
    resource_id: Arc<str>,
}

/// Wraps `route` so every request to it is validated as `resource_id`.
///
/// Handlers receive the coerced parameters through `Extension<ValidatedParams>`.
pub fn validated<S>(
    api: Arc<SwaggerApi>,
    resource_id: impl Into<String>,
    route: MethodRouter<S>,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let resource_id: String = resource_id.into();
    if !api.index().contains(&resource_id) {
        log::warn!("resource '{resource_id}' is not declared in the swagger spec, it will not be validated");
    }
    let context = ResourceContext {
        api,
        resource_id: resource_id.into(),
    };
    route.layer(from_fn_with_state(context, validate))
}

async fn validate(
    State(context): State<ResourceContext>,
    path_params: Option<RawPathParams>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_lowercase();
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, context.api.body_limit()).await {
        Ok(body) => body,
        Err(e) => {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Failed to read request body: {e}"),
            )
                .into_response()
        }
    };

    let params = RequestParams {
        method: method.clone(),
        path: path_params
            .iter()
            .flat_map(|params| params.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        query: parse_pairs(parts.uri.query().unwrap_or_default()),
        headers: header_fields(&parts.headers),
        ..Default::default()
    };
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let params = match params.with_body(content_type, &body) {
        Ok(params) => params,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}")).into_response(),
    };

    let validated = match context.api.validate_parameters(&context.resource_id, &params) {
        Ok(validated) => validated,
        Err(e) => return e.into_response(),
    };

    let mut request = Request::from_parts(parts, Body::from(body));
    request.extensions_mut().insert(ValidatedParams(validated));

    let response = next.run(request).await;
    if !context.api.validates_responses() {
        return response;
    }

    let status = response.status().as_u16();
    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, context.api.body_limit()).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read response body: {e}"),
            )
                .into_response()
        }
    };

    if let Err(e) = context
        .api
        .validate_response(&context.resource_id, &method, status, &bytes)
    {
        return e.into_response();
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn header_fields(headers: &HeaderMap) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for (name, value) in headers.iter() {
        if let Ok(value) = value.to_str() {
            fields
                .entry(name.as_str().to_string())
                .or_insert_with(|| value.to_string());
        }
    }
    fields
}

/// Router serving the raw spec at the configured docs path; empty when disabled.
pub fn docs_router<S>(api: &SwaggerApi) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let Some(path) = api.docs_path() else {
        return Router::new();
    };
    let spec: Arc<str> = Arc::from(api.spec());
    let content_type = api.spec_content_type();

    Router::new().route(
        &path,
        get(move || {
            let spec = Arc::clone(&spec);
            async move { ([(header::CONTENT_TYPE, content_type)], spec.to_string()) }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SwaggerConfig;
    use axum::Extension;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SPEC: &str = r#"
swagger: '2.0'
info:
  title: Order API
  version: 1.0.0
paths:
  /orders:
    x-resource: OrderList
    post:
      parameters:
        - name: order
          in: body
          schema:
            type: object
            required: [item]
            properties:
              item:
                type: string
              quantity:
                type: integer
                default: 1
      responses:
        '201':
          description: Created
          schema:
            type: object
            required: [item, quantity]
"#;

    fn app(validate_responses: bool) -> Router {
        let config = SwaggerConfig::new("memory://orders.yaml")
            .with_validate_responses(validate_responses)
            .with_body_limit(64);
        let api = Arc::new(SwaggerApi::from_spec(SPEC, config).unwrap());
        Router::new()
            .route(
                "/orders",
                validated(api.clone(), "OrderList", axum::routing::post(create_order)),
            )
            .merge(docs_router(&api))
    }

    async fn create_order(Extension(params): Extension<ValidatedParams>) -> Response {
        let body = params.body().cloned().unwrap_or_default();
        (StatusCode::CREATED, Json(body)).into_response()
    }

    fn post_json(body: Value) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/orders")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_body_defaults_are_applied() {
        let response = app(true)
            .oneshot(post_json(json!({"item": "book"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"item": "book", "quantity": 1}));
    }

    #[tokio::test]
    async fn test_body_missing_required_field() {
        let response = app(true).oneshot(post_json(json!({}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let response = app(true)
            .oneshot(post_json(json!({"item": "x".repeat(100)})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_docs_router() {
        let response = app(true)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/_docs/swagger.yaml")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], SPEC.as_bytes());
    }
}
