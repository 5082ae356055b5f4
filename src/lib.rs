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

//! Swagger-driven validation for resource-routed HTTP services.
//!
//! Path-items of a swagger 2.0 document name the resource that serves them
//! through the `x-resource` extension. [`SwaggerApi`] indexes them once and then
//! validates inbound parameters (with primitive coercion) and outbound
//! responses for a given resource identifier.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod observability;
pub mod request;
pub mod validator;

pub use api::SwaggerApi;
pub use config::SwaggerConfig;
pub use error::SwaggerError;
pub use request::RequestParams;
