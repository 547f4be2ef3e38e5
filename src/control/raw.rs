//! Raw best-effort command frames.
//!
//! Each descriptor pairs a fixed opaque payload with its conventional
//! port and transport. Payloads are not built from or validated
//! against the real protocol specifications; the success signal is
//! transport completion only (the send finished without error), which
//! mirrors the probe policy for connectionless transports.

use super::{strategy_failed, ControlContext, ControlStrategy};
use crate::catalog::{BACNET_WRITE_PROPERTY, KNX_GROUP_WRITE, MODBUS_WRITE_COIL, MQTT_PUBLISH};
use crate::errors::LightsOutError;
use crate::model::{DiscoveredController, Transport};
use async_trait::async_trait;
use log::debug;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

/// A named raw command: fixed payload, fixed port, fixed transport
pub struct RawCommand {
    id: &'static str,
    port: u16,
    transport: Transport,
    payload: &'static [u8],
}

impl RawCommand {
    pub fn new(id: &'static str, port: u16, transport: Transport, payload: &'static [u8]) -> Self {
        Self {
            id,
            port,
            transport,
            payload,
        }
    }

    /// Modbus TCP write-single-coil frame on port 502
    pub fn modbus_write_coil() -> Self {
        Self::new("modbus-write-coil", 502, Transport::Tcp, MODBUS_WRITE_COIL)
    }

    /// KNXnet/IP group-write datagram on port 3671
    pub fn knx_group_write() -> Self {
        Self::new("knx-group-write", 3671, Transport::Udp, KNX_GROUP_WRITE)
    }

    /// BACnet/IP write-property datagram on port 47808
    pub fn bacnet_write_property() -> Self {
        Self::new(
            "bacnet-write-property",
            47808,
            Transport::Udp,
            BACNET_WRITE_PROPERTY,
        )
    }

    /// MQTT frame carrying the all-off topic on port 1883
    pub fn mqtt_publish() -> Self {
        Self::new("mqtt-publish", 1883, Transport::Tcp, MQTT_PUBLISH)
    }
}

#[async_trait]
impl ControlStrategy for RawCommand {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn execute(
        &self,
        ctx: &ControlContext,
        controller: &DiscoveredController,
    ) -> Result<(), LightsOutError> {
        let host = controller.target.host();
        let io_timeout = ctx.config.command_timeout();
        match self.transport {
            Transport::Tcp | Transport::Http => {
                let mut stream = timeout(io_timeout, TcpStream::connect((host, self.port)))
                    .await
                    .map_err(|_| strategy_failed(self.id, "connect timed out"))?
                    .map_err(|e| strategy_failed(self.id, e.to_string()))?;
                timeout(io_timeout, stream.write_all(self.payload))
                    .await
                    .map_err(|_| strategy_failed(self.id, "send timed out"))?
                    .map_err(|e| strategy_failed(self.id, e.to_string()))?;
                // Connection dropped here; it is never reused.
            }
            Transport::Udp => {
                let socket = UdpSocket::bind("0.0.0.0:0")
                    .await
                    .map_err(|e| strategy_failed(self.id, e.to_string()))?;
                timeout(io_timeout, socket.send_to(self.payload, (host, self.port)))
                    .await
                    .map_err(|_| strategy_failed(self.id, "send timed out"))?
                    .map_err(|e| strategy_failed(self.id, e.to_string()))?;
            }
        }
        debug!("{} frame sent to {}:{}", self.id, host, self.port);
        Ok(())
    }
}
