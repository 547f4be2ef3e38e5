//! HTTP command strategies: REST, SOAP, legacy CGI, and the
//! BACnet-over-HTTP dialect some management systems accept.

use super::{strategy_failed, ControlContext, ControlStrategy, SUCCESS_STATUSES};
use crate::catalog::{CGI_ALL_OFF_PATHS, REST_ALL_OFF_PATHS, SOAP_ALL_OFF_BODY, SOAP_ENDPOINT};
use crate::errors::LightsOutError;
use crate::model::DiscoveredController;
use async_trait::async_trait;
use log::debug;
use serde_json::json;

/// Bulk all-off through the candidate REST endpoints
pub struct RestAllOff;

#[async_trait]
impl ControlStrategy for RestAllOff {
    fn id(&self) -> &'static str {
        "rest-all-off"
    }

    async fn execute(
        &self,
        ctx: &ControlContext,
        controller: &DiscoveredController,
    ) -> Result<(), LightsOutError> {
        let base = controller.http_base();
        for (path, is_post) in REST_ALL_OFF_PATHS {
            let url = format!("{}{}", base, path);
            let request = if *is_post {
                ctx.prepare(ctx.http.post(&url))
                    .json(&json!({"state": "off", "command": "all_off"}))
            } else {
                ctx.prepare(ctx.http.get(&url))
            };
            match request.send().await {
                Ok(response) if SUCCESS_STATUSES.contains(&response.status().as_u16()) => {
                    debug!("all-off accepted at {}", url);
                    return Ok(());
                }
                Ok(response) => {
                    debug!("{} answered {}", url, response.status());
                }
                Err(e) => {
                    debug!("{} unreachable: {}", url, e);
                }
            }
        }
        Err(strategy_failed(self.id(), "no REST endpoint accepted the command"))
    }
}

/// Bulk all-off as a SOAP TurnOffAllLights action
pub struct SoapAllOff;

#[async_trait]
impl ControlStrategy for SoapAllOff {
    fn id(&self) -> &'static str {
        "soap-all-off"
    }

    async fn execute(
        &self,
        ctx: &ControlContext,
        controller: &DiscoveredController,
    ) -> Result<(), LightsOutError> {
        let url = format!("{}{}", controller.http_base(), SOAP_ENDPOINT);
        let response = ctx
            .prepare(ctx.http.post(&url))
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(SOAP_ALL_OFF_BODY)
            .send()
            .await
            .map_err(|e| strategy_failed(self.id(), e.to_string()))?;
        if response.status().as_u16() == 200 {
            Ok(())
        } else {
            Err(strategy_failed(
                self.id(),
                format!("SOAP endpoint answered {}", response.status()),
            ))
        }
    }
}

/// Legacy CGI command interface found on older embedded controllers
pub struct SimpleHttpCgi;

#[async_trait]
impl ControlStrategy for SimpleHttpCgi {
    fn id(&self) -> &'static str {
        "simple-http-cgi"
    }

    async fn execute(
        &self,
        ctx: &ControlContext,
        controller: &DiscoveredController,
    ) -> Result<(), LightsOutError> {
        let base = controller.http_base();
        for path in CGI_ALL_OFF_PATHS {
            let url = format!("{}{}", base, path);
            match ctx.prepare(ctx.http.get(&url)).send().await {
                Ok(response) if response.status().as_u16() == 200 => return Ok(()),
                Ok(_) | Err(_) => continue,
            }
        }
        Err(strategy_failed(self.id(), "no CGI endpoint accepted the command"))
    }
}

/// BACnet-shaped write-property command tunneled over HTTP.
/// Some management systems expose this dialect on /bacnet/command.
pub struct BacnetOverHttp;

#[async_trait]
impl ControlStrategy for BacnetOverHttp {
    fn id(&self) -> &'static str {
        "bacnet-over-http"
    }

    async fn execute(
        &self,
        ctx: &ControlContext,
        controller: &DiscoveredController,
    ) -> Result<(), LightsOutError> {
        let url = format!("{}/bacnet/command", controller.http_base());
        let body = json!({
            "objectType": "binaryOutput",
            "objectInstance": "all",
            "property": "presentValue",
            "value": "inactive",
        });
        let response = ctx
            .prepare(ctx.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| strategy_failed(self.id(), e.to_string()))?;
        if response.status().as_u16() == 200 {
            Ok(())
        } else {
            Err(strategy_failed(
                self.id(),
                format!("endpoint answered {}", response.status()),
            ))
        }
    }
}
