use crate::catalog::STATUS_PATHS;
use crate::config::ControlConfig;
use crate::model::{ProtocolSpec, Target, Transport};
use log::{debug, trace};
use std::time::Duration;
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

/// Test reachability of one target under one catalog entry.
///
/// Never returns an error: every transport failure (timeout, refused,
/// unreachable, resolution failure) maps to `false`.
pub async fn probe(
    client: &reqwest::Client,
    target: &Target,
    spec: &ProtocolSpec,
    config: &ControlConfig,
) -> bool {
    let reachable = match spec.transport {
        Transport::Tcp => probe_tcp(target.host(), spec.port, config.probe_timeout()).await,
        Transport::Udp => probe_udp(target.host(), spec.port, config.probe_timeout()).await,
        Transport::Http => {
            let base = format!("http://{}:{}", target.host(), spec.port);
            probe_http(client, &base, STATUS_PATHS, config).await
        }
    };
    trace!(
        "probe {}:{} ({}) -> {}",
        target,
        spec.port,
        spec.name,
        reachable
    );
    reachable
}

/// TCP reachability: connection established within the timeout
pub async fn probe_tcp(host: &str, port: u16, connect_timeout: Duration) -> bool {
    matches!(
        timeout(connect_timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// UDP reachability: send one probe datagram and report reachable once
/// the send succeeds. Connectionless transports give no delivery
/// confirmation, so this is a reachability assumption, not a confirmed
/// response; no reply is awaited on purpose.
pub async fn probe_udp(host: &str, port: u16, send_timeout: Duration) -> bool {
    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(s) => s,
        Err(e) => {
            debug!("udp probe socket bind failed: {}", e);
            return false;
        }
    };
    matches!(
        timeout(send_timeout, socket.send_to(&[0x00], (host, port))).await,
        Ok(Ok(_))
    )
}

/// HTTP reachability: any well-known path answering 200
pub async fn probe_http(
    client: &reqwest::Client,
    base: &str,
    paths: &[&str],
    config: &ControlConfig,
) -> bool {
    for path in paths {
        let url = format!("{}{}", base, path);
        let mut request = client.get(&url).timeout(config.http_timeout());
        if let Some(creds) = &config.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }
        match request.send().await {
            Ok(response) if response.status().as_u16() == 200 => return true,
            Ok(_) => continue,
            Err(e) => {
                trace!("http probe {} failed: {}", url, e);
                continue;
            }
        }
    }
    false
}
