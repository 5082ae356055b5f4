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
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    web::{self, Bytes, BytesMut},
    Error, HttpMessage, HttpRequest, HttpResponse, ResponseError,
};
use futures_util::{future::LocalBoxFuture, StreamExt};
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

impl ResponseError for SwaggerError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}

/// Resource-level middleware validating requests and responses of one resource.
///
/// # example
///
/// ```rust,ignore
/// use actix_web::{web, App, HttpResponse};
/// use swagger_rs::request::actix_web::SwaggerValidation;
/// use swagger_rs::request::ValidatedParams;
///
/// async fn get_pet(params: ValidatedParams) -> HttpResponse {
///     HttpResponse::Ok().json(serde_json::json!({"id": params.get("pet_id")}))
/// }
///
/// let app = App::new().service(
///     web::resource("/pets/{pet_id}")
///         .wrap(SwaggerValidation::new(api.clone(), "app.resources.Pet"))
///         .route(web::get().to(get_pet)),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SwaggerValidation {
    api: Arc<SwaggerApi>,
    resource_id: Arc<str>,
}

impl SwaggerValidation {
    pub fn new(api: Arc<SwaggerApi>, resource_id: impl Into<String>) -> Self {
        let resource_id: String = resource_id.into();
        if !api.index().contains(&resource_id) {
            log::warn!("resource '{resource_id}' is not declared in the swagger spec, it will not be validated");
        }
        Self {
            api,
            resource_id: resource_id.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SwaggerValidation
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = SwaggerValidationMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SwaggerValidationMiddleware {
            service: Rc::new(service),
            api: Arc::clone(&self.api),
            resource_id: Arc::clone(&self.resource_id),
        }))
    }
}

pub struct SwaggerValidationMiddleware<S> {
    service: Rc<S>,
    api: Arc<SwaggerApi>,
    resource_id: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for SwaggerValidationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let api = Arc::clone(&self.api);
        let resource_id = Arc::clone(&self.resource_id);

        Box::pin(async move {
            let method = req.method().as_str().to_lowercase();
            let (http_req, payload) = req.into_parts();

            let body = if should_extract_body(&http_req) {
                match extract_body(payload, api.body_limit()).await {
                    Ok(body) => body,
                    Err(e) => return Ok(ServiceResponse::from_err(e, http_req)),
                }
            } else {
                Bytes::new()
            };

            let request = match request_params(&http_req, &method, &body) {
                Ok(request) => request,
                Err(e) => {
                    let error = actix_web::error::ErrorBadRequest(format!("invalid JSON body: {e}"));
                    return Ok(ServiceResponse::from_err(error, http_req));
                }
            };

            let params = match api.validate_parameters(&resource_id, &request) {
                Ok(params) => params,
                Err(e) => return Ok(ServiceResponse::from_err(e, http_req)),
            };

            let service_req = ServiceRequest::from_parts(http_req, Payload::from(body));
            service_req
                .extensions_mut()
                .insert(ValidatedParams(params));

            let res = service.call(service_req).await?;
            if !api.validates_responses() {
                return Ok(res.map_into_boxed_body());
            }

            let status = res.status().as_u16();
            let (http_req, res) = res.into_parts();
            let (res, body) = res.into_parts();
            let bytes = match actix_web::body::to_bytes_limited(body, api.body_limit()).await {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(e)) => {
                    let e: Box<dyn std::error::Error> = e.into();
                    let error = actix_web::error::ErrorInternalServerError(e.to_string());
                    return Ok(ServiceResponse::from_err(error, http_req));
                }
                Err(_) => {
                    let error = actix_web::error::ErrorInternalServerError(format!(
                        "response body exceeds {} bytes",
                        api.body_limit()
                    ));
                    return Ok(ServiceResponse::from_err(error, http_req));
                }
            };

            if let Err(e) = api.validate_response(&resource_id, &method, status, &bytes) {
                return Ok(ServiceResponse::from_err(e, http_req));
            }

            Ok(ServiceResponse::new(http_req, res.set_body(bytes)).map_into_boxed_body())
        })
    }
}

fn should_extract_body(req: &HttpRequest) -> bool {
    req.headers().contains_key(header::CONTENT_LENGTH)
        || req.headers().contains_key(header::TRANSFER_ENCODING)
}

async fn extract_body(mut payload: Payload, limit: usize) -> Result<Bytes, Error> {
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            actix_web::error::ErrorBadRequest(format!("Error reading request chunk: {e}"))
        })?;
        if body.len() + chunk.len() > limit {
            return Err(actix_web::error::ErrorPayloadTooLarge(format!(
                "request body exceeds {limit} bytes"
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

fn request_params(
    req: &HttpRequest,
    method: &str,
    body: &[u8],
) -> Result<RequestParams, serde_json::Error> {
    let mut headers = HashMap::new();
    for (name, value) in req.headers().iter() {
        if let Ok(value) = value.to_str() {
            headers
                .entry(name.as_str().to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    let request = RequestParams {
        method: method.to_string(),
        path: req
            .match_info()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        query: parse_pairs(req.query_string()),
        headers,
        ..Default::default()
    };

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    request.with_body(content_type, body)
}

/// Serves the raw spec at the configured docs path, if enabled.
pub fn docs_resource(api: &SwaggerApi) -> Option<actix_web::Resource> {
    let path = api.docs_path()?;
    let spec: Arc<str> = Arc::from(api.spec());
    let content_type = api.spec_content_type();

    Some(web::resource(path).route(web::get().to(move || {
        let spec = Arc::clone(&spec);
        async move {
            HttpResponse::Ok()
                .content_type(content_type)
                .body(spec.to_string())
        }
    })))
}

impl actix_web::FromRequest for ValidatedParams {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<ValidatedParams>() {
            Some(params) => ready(Ok(params.clone())),
            None => ready(Err(actix_web::error::ErrorInternalServerError(
                "validated parameters not found - ensure SwaggerValidation wraps this resource",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SwaggerConfig;
    use actix_web::{
        test::{self, TestRequest},
        App,
    };
    use serde_json::{json, Value};

    const SPEC: &str = r#"
swagger: '2.0'
info:
  title: Pet API
  version: 1.0.0
paths:
  /pets/{pet_id}:
    x-resource: Pet
    parameters:
      - name: pet_id
        in: path
        type: integer
        required: true
    get:
      parameters:
        - name: verbose
          in: query
          type: boolean
          required: false
      responses:
        200:
          description: A pet
          schema:
            type: object
            required: [id, name]
            properties:
              id:
                type: integer
              name:
                type: string
"#;

    fn api(validate_responses: bool) -> Arc<SwaggerApi> {
        let config = SwaggerConfig::new("memory://pets.yaml")
            .with_validate_responses(validate_responses);
        Arc::new(SwaggerApi::from_spec(SPEC, config).unwrap())
    }

    async fn get_pet(params: ValidatedParams) -> HttpResponse {
        HttpResponse::Ok().json(json!({
            "id": params.get("pet_id"),
            "name": "rex",
            "verbose": params.get("verbose"),
        }))
    }

    async fn broken_pet() -> HttpResponse {
        HttpResponse::Ok().json(json!({"id": "not-a-number"}))
    }

    #[actix_web::test]
    async fn test_valid_request_is_coerced() {
        let api = api(true);
        let app = test::init_service(
            App::new().service(
                web::resource("/pets/{pet_id}")
                    .wrap(SwaggerValidation::new(api.clone(), "Pet"))
                    .route(web::get().to(get_pet)),
            ),
        )
        .await;

        let req = TestRequest::get().uri("/pets/42?verbose=YES").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], json!(42));
        assert_eq!(body["verbose"], json!(true));
    }

    #[actix_web::test]
    async fn test_invalid_parameter_is_rejected() {
        let api = api(true);
        let app = test::init_service(
            App::new().service(
                web::resource("/pets/{pet_id}")
                    .wrap(SwaggerValidation::new(api.clone(), "Pet"))
                    .route(web::get().to(get_pet)),
            ),
        )
        .await;

        let req = TestRequest::get().uri("/pets/abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], json!("parameter_validation"));
    }

    #[actix_web::test]
    async fn test_contract_violation_is_server_error() {
        let app = test::init_service(
            App::new().service(
                web::resource("/pets/{pet_id}")
                    .wrap(SwaggerValidation::new(api(true), "Pet"))
                    .route(web::get().to(broken_pet)),
            ),
        )
        .await;

        let req = TestRequest::get().uri("/pets/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], json!("response_validation"));
    }

    #[actix_web::test]
    async fn test_response_validation_disabled() {
        let app = test::init_service(
            App::new().service(
                web::resource("/pets/{pet_id}")
                    .wrap(SwaggerValidation::new(api(false), "Pet"))
                    .route(web::get().to(broken_pet)),
            ),
        )
        .await;

        let req = TestRequest::get().uri("/pets/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_oversized_body_is_rejected() {
        let config = SwaggerConfig::new("memory://pets.yaml").with_body_limit(16);
        let api = Arc::new(SwaggerApi::from_spec(SPEC, config).unwrap());
        let app = test::init_service(
            App::new().service(
                web::resource("/pets/{pet_id}")
                    .wrap(SwaggerValidation::new(api, "Pet"))
                    .route(web::get().to(get_pet)),
            ),
        )
        .await;

        let req = TestRequest::get()
            .uri("/pets/1")
            .set_payload(vec![b'x'; 64])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn test_docs_resource_serves_raw_spec() {
        let api = api(true);
        let docs = docs_resource(&api).unwrap();
        let app = test::init_service(App::new().service(docs)).await;

        let req = TestRequest::get().uri("/_docs/swagger.yaml").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, Bytes::from(SPEC));
    }

    #[test]
    fn test_should_extract_body() {
        let req = TestRequest::post()
            .append_header((header::CONTENT_LENGTH, "100"))
            .to_http_request();
        assert!(should_extract_body(&req));

        let req = TestRequest::get().to_http_request();
        assert!(!should_extract_body(&req));

        let req = TestRequest::post()
            .append_header((header::TRANSFER_ENCODING, "chunked"))
            .to_http_request();
        assert!(should_extract_body(&req));
    }
}
