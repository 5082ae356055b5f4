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

use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use url::Url;

/// Reads the raw swagger document named by `spec_url`.
///
/// Accepts `file://` URLs, bare filesystem paths and, with the `remote`
/// feature, `http(s)://` URLs.
pub async fn fetch(spec_url: &str) -> Result<String> {
    match Url::parse(spec_url) {
        Ok(url) if url.scheme() == "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| anyhow!("'{spec_url}' is not a usable file URL"))?;
            read_file(&path)
        }
        Ok(url) if matches!(url.scheme(), "http" | "https") => fetch_remote(url).await,
        // A windows drive letter parses as a one-letter scheme.
        Ok(url) if url.scheme().len() == 1 => read_file(Path::new(spec_url)),
        Ok(url) => bail!("unsupported spec url scheme '{}'", url.scheme()),
        Err(url::ParseError::RelativeUrlWithoutBase) => read_file(Path::new(spec_url)),
        Err(e) => Err(anyhow::Error::new(e).context(format!("invalid spec url '{spec_url}'"))),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read '{}'", path.display()))
}

#[cfg(feature = "remote")]
async fn fetch_remote(url: Url) -> Result<String> {
    log::debug!("fetching swagger spec from {url}");
    let response = reqwest::get(url.clone())
        .await
        .with_context(|| format!("request to '{url}' failed"))?
        .error_for_status()?;
    Ok(response.text().await?)
}

#[cfg(not(feature = "remote"))]
async fn fetch_remote(url: Url) -> Result<String> {
    bail!("fetching '{url}' requires the `remote` feature")
}
