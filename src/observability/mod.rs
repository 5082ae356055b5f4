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

use crate::error::SwaggerError;
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Request,
    Response,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Request => f.write_str("request"),
            Stage::Response => f.write_str("response"),
        }
    }
}

pub struct ValidationMetrics {
    start_time: Instant,
    resource: String,
    method: String,
    stage: Stage,
}

impl ValidationMetrics {
    pub fn new(resource: &str, method: &str, stage: Stage) -> Self {
        Self {
            start_time: Instant::now(),
            resource: resource.to_string(),
            method: method.to_lowercase(),
            stage,
        }
    }

    pub fn record_success(self) {
        let duration_ms = self.start_time.elapsed().as_millis();
        let timestamp = chrono::Utc::now().timestamp_millis();

        log::info!(
            "swagger_validation resource=\"{}\" method=\"{}\" stage=\"{}\" success=true duration_ms={} timestamp={}",
            self.resource,
            self.method,
            self.stage,
            duration_ms,
            timestamp
        );
    }

    /// Response-side failures are logged at error level: the service broke its own contract.
    pub fn record_failure(self, error: &SwaggerError) {
        let duration_ms = self.start_time.elapsed().as_millis();
        let timestamp = chrono::Utc::now().timestamp_millis();
        let level = match self.stage {
            Stage::Request => log::Level::Warn,
            Stage::Response => log::Level::Error,
        };

        log::log!(
            level,
            "swagger_validation resource=\"{}\" method=\"{}\" stage=\"{}\" success=false duration_ms={} error=\"{}\" timestamp={}",
            self.resource,
            self.method,
            self.stage,
            duration_ms,
            error,
            timestamp
        );
    }

    /// Logs the outcome and hands it back.
    pub fn record<T>(self, outcome: Result<T, SwaggerError>) -> Result<T, SwaggerError> {
        match &outcome {
            Ok(_) => self.record_success(),
            Err(error) => self.record_failure(error),
        }
        outcome
    }
}

pub fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
