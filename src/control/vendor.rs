//! Vendor-specific smart-device strategies, selected by the device
//! classifier when discovery came from a flat port scan.

use super::{strategy_failed, ControlContext, ControlStrategy};
use crate::errors::LightsOutError;
use crate::model::DiscoveredController;
use async_trait::async_trait;
use log::debug;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

/// Frame a TP-Link smart-plug command: 4-byte length prefix followed
/// by the XOR-autokey obfuscated JSON body.
fn tplink_frame(command: &str) -> Vec<u8> {
    let mut key: u8 = 171;
    let mut frame = Vec::with_capacity(command.len() + 4);
    frame.extend_from_slice(&[0, 0, 0, command.len() as u8]);
    for byte in command.bytes() {
        key ^= byte;
        frame.push(key);
    }
    frame
}

/// TP-Link/Kasa relay-off over TCP 9999
pub struct TplinkRelayOff;

#[async_trait]
impl ControlStrategy for TplinkRelayOff {
    fn id(&self) -> &'static str {
        "tplink-relay-off"
    }

    async fn execute(
        &self,
        ctx: &ControlContext,
        controller: &DiscoveredController,
    ) -> Result<(), LightsOutError> {
        let frame = tplink_frame(r#"{"system":{"set_relay_state":{"state":0}}}"#);
        send_tcp_command(ctx, controller, self.id(), 9999, &frame).await
    }
}

/// Yeelight set_power off over its TCP line protocol (port 55443)
pub struct YeelightSetPower;

#[async_trait]
impl ControlStrategy for YeelightSetPower {
    fn id(&self) -> &'static str {
        "yeelight-set-power"
    }

    async fn execute(
        &self,
        ctx: &ControlContext,
        controller: &DiscoveredController,
    ) -> Result<(), LightsOutError> {
        let command = json!({
            "id": 1,
            "method": "set_power",
            "params": ["off", "smooth", 500],
        });
        let mut line = command.to_string();
        line.push_str("\r\n");
        send_tcp_command(ctx, controller, self.id(), 55443, line.as_bytes()).await
    }
}

/// WiZ setPilot power-off datagram over UDP 38899
pub struct WizSetPilot;

#[async_trait]
impl ControlStrategy for WizSetPilot {
    fn id(&self) -> &'static str {
        "wiz-set-pilot"
    }

    async fn execute(
        &self,
        ctx: &ControlContext,
        controller: &DiscoveredController,
    ) -> Result<(), LightsOutError> {
        let payload = json!({"method": "setPilot", "params": {"state": false}}).to_string();
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| strategy_failed(self.id(), e.to_string()))?;
        timeout(
            ctx.config.command_timeout(),
            socket.send_to(payload.as_bytes(), (controller.target.host(), 38899)),
        )
        .await
        .map_err(|_| strategy_failed(self.id(), "send timed out"))?
        .map_err(|e| strategy_failed(self.id(), e.to_string()))?;
        debug!("setPilot sent to {}", controller.target);
        Ok(())
    }
}

/// Philips Hue bridge check: a 200 from /api/config confirms the
/// bridge answers, which is the strongest signal available without a
/// provisioned application key.
pub struct HueConfigCheck;

#[async_trait]
impl ControlStrategy for HueConfigCheck {
    fn id(&self) -> &'static str {
        "hue-config-check"
    }

    async fn execute(
        &self,
        ctx: &ControlContext,
        controller: &DiscoveredController,
    ) -> Result<(), LightsOutError> {
        let url = format!("{}/api/config", controller.http_base());
        let response = ctx
            .prepare(ctx.http.get(&url))
            .send()
            .await
            .map_err(|e| strategy_failed(self.id(), e.to_string()))?;
        if response.status().as_u16() == 200 {
            Ok(())
        } else {
            Err(strategy_failed(
                self.id(),
                format!("bridge answered {}", response.status()),
            ))
        }
    }
}

/// Connect, send one command frame, and read a best-effort reply.
/// Success is the completed send; the reply (if any) is discarded,
/// since device acknowledgments are not parsed anywhere in this crate.
async fn send_tcp_command(
    ctx: &ControlContext,
    controller: &DiscoveredController,
    id: &'static str,
    port: u16,
    payload: &[u8],
) -> Result<(), LightsOutError> {
    let io_timeout = ctx.config.command_timeout();
    let mut stream = timeout(io_timeout, TcpStream::connect((controller.target.host(), port)))
        .await
        .map_err(|_| strategy_failed(id, "connect timed out"))?
        .map_err(|e| strategy_failed(id, e.to_string()))?;
    timeout(io_timeout, stream.write_all(payload))
        .await
        .map_err(|_| strategy_failed(id, "send timed out"))?
        .map_err(|e| strategy_failed(id, e.to_string()))?;

    let mut buf = [0u8; 1024];
    if let Ok(Ok(n)) = timeout(std::time::Duration::from_millis(250), stream.read(&mut buf)).await
    {
        debug!("{} got {} reply bytes from {}", id, n, controller.target);
    }
    Ok(())
}
