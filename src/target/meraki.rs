// Meraki Dashboard API v1 client
//
// Thin blocking wrapper over `reqwest::blocking::Client` covering the four
// endpoints the migration needs: switch routing interfaces (SVIs) and
// switch ports, each listed and written per device serial.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;
use tracing::{debug, trace};

use super::{PortSettings, PortState, SviSettings, TargetPlatform};
use crate::{AllowedVlans, MigrationError, SwitchportMode};

pub const DEFAULT_BASE_URL: &str = "https://api.meraki.com/api/v1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutingInterface {
    interface_id: String,
    vlan_id: Option<u16>,
    subnet: Option<String>,
    default_gateway: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoutingInterfaceBody<'a> {
    name: &'a str,
    subnet: String,
    interface_ip: String,
    vlan_id: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_gateway: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwitchPort {
    port_id: String,
    name: Option<String>,
    enabled: Option<bool>,
    #[serde(rename = "type")]
    port_type: Option<String>,
    vlan: Option<u16>,
    voice_vlan: Option<u16>,
    allowed_vlans: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwitchPortBody<'a> {
    name: &'a str,
    enabled: bool,
    #[serde(rename = "type")]
    port_type: String,
    vlan: u16,
    /// `Some(None)` sends an explicit null, clearing a stale voice VLAN.
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_vlan: Option<Option<u16>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_vlans: Option<String>,
}

/// Meraki answers errors as `{"errors": ["..."]}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    errors: Vec<String>,
}

pub struct MerakiClient {
    http: Client,
    base_url: String,
}

impl MerakiClient {
    pub fn new(api_key: &SecretString, base_url: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .context("Meraki API key contains characters not allowed in an HTTP header")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("cat2meraki/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        method: &str,
        path: &str,
    ) -> Result<T> {
        debug!("{method} {path}");

        let transport = |message: String| MigrationError::TargetTransport {
            method: method.to_string(),
            path: path.to_string(),
            message,
        };

        let resp = builder.send().map_err(|e| transport(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().map_err(|e| transport(e.to_string()))?;
        trace!(%status, body = %body, "{method} {path}");

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) if !parsed.errors.is_empty() => parsed.errors.join("; "),
                _ => body.chars().take(200).collect(),
            };
            return Err(MigrationError::TargetRequest {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(serde_json::from_str(&body)
            .map_err(|e| transport(format!("unexpected response body: {e}")))?)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.http.get(self.url(path)), "GET", path)
    }

    fn list_routing_interfaces(&self, serial: &str) -> Result<Vec<RoutingInterface>> {
        self.get(&format!("/devices/{serial}/switch/routing/interfaces"))
    }
}

fn port_state(port: SwitchPort) -> Option<PortState> {
    let Ok(port_id) = port.port_id.parse::<u32>() else {
        // module ports such as `1_C9300-NM-8X_1` have no ordinal number
        debug!(port = %port.port_id, "skipping non-numeric Meraki port");
        return None;
    };

    let trunk = port
        .port_type
        .as_deref()
        .is_some_and(|t| t.eq_ignore_ascii_case("trunk"));

    let settings = if trunk {
        PortSettings {
            name: port.name.unwrap_or_default(),
            mode: SwitchportMode::Trunk,
            data_vlan: None,
            voice_vlan: None,
            native_vlan: Some(port.vlan.unwrap_or(1)),
            allowed_vlans: Some(
                port.allowed_vlans
                    .as_deref()
                    .and_then(|list| list.parse::<AllowedVlans>().ok())
                    .unwrap_or_default(),
            ),
            shutdown: !port.enabled.unwrap_or(true),
        }
    } else {
        PortSettings {
            name: port.name.unwrap_or_default(),
            mode: SwitchportMode::Access,
            data_vlan: Some(port.vlan.unwrap_or(1)),
            voice_vlan: port.voice_vlan,
            native_vlan: None,
            allowed_vlans: None,
            shutdown: !port.enabled.unwrap_or(true),
        }
    };

    Some(PortState { port_id, settings })
}

fn port_body(port: &PortSettings) -> SwitchPortBody<'_> {
    match port.mode {
        SwitchportMode::Access => SwitchPortBody {
            name: &port.name,
            enabled: !port.shutdown,
            port_type: port.mode.to_string(),
            vlan: port.data_vlan.unwrap_or(1),
            voice_vlan: Some(port.voice_vlan),
            allowed_vlans: None,
        },
        SwitchportMode::Trunk => SwitchPortBody {
            name: &port.name,
            enabled: !port.shutdown,
            port_type: port.mode.to_string(),
            vlan: port.native_vlan.unwrap_or(1),
            voice_vlan: None,
            allowed_vlans: Some(
                port.allowed_vlans
                    .as_ref()
                    .map_or_else(|| "all".to_string(), ToString::to_string),
            ),
        },
    }
}

/// An interface routes to `gateway` when it already uses it as default
/// gateway or its subnet contains it.
fn reaches_gateway(iface: &RoutingInterface, gateway: Ipv4Addr) -> bool {
    let is_gateway = iface
        .default_gateway
        .as_deref()
        .and_then(|gw| Ipv4Addr::from_str(gw).ok())
        == Some(gateway);
    let in_subnet = iface
        .subnet
        .as_deref()
        .and_then(|cidr| Ipv4Net::from_str(cidr).ok())
        .is_some_and(|net| net.contains(&gateway));
    is_gateway || in_subnet
}

impl TargetPlatform for MerakiClient {
    fn create_or_update_svi(&mut self, serial: &str, svi: &SviSettings) -> Result<()> {
        let body = RoutingInterfaceBody {
            name: &svi.name,
            subnet: svi.subnet().to_string(),
            interface_ip: svi.interface_ip.to_string(),
            vlan_id: svi.vlan_id,
            default_gateway: svi.default_gateway.map(|gw| gw.to_string()),
        };

        let existing = self
            .list_routing_interfaces(serial)?
            .into_iter()
            .find(|iface| iface.vlan_id == Some(svi.vlan_id));

        let _: serde_json::Value = match existing {
            Some(iface) => {
                let path = format!(
                    "/devices/{serial}/switch/routing/interfaces/{}",
                    iface.interface_id
                );
                self.send(self.http.put(self.url(&path)).json(&body), "PUT", &path)?
            }
            None => {
                let path = format!("/devices/{serial}/switch/routing/interfaces");
                self.send(self.http.post(self.url(&path)).json(&body), "POST", &path)?
            }
        };
        Ok(())
    }

    fn set_port_config(&mut self, serial: &str, port_id: u32, port: &PortSettings) -> Result<()> {
        let path = format!("/devices/{serial}/switch/ports/{port_id}");
        let body = port_body(port);
        let _: serde_json::Value =
            self.send(self.http.put(self.url(&path)).json(&body), "PUT", &path)?;
        Ok(())
    }

    fn list_switch_ports(&mut self, serial: &str) -> Result<Vec<PortState>> {
        let ports: Vec<SwitchPort> = self.get(&format!("/devices/{serial}/switch/ports"))?;
        Ok(ports.into_iter().filter_map(port_state).collect())
    }

    fn check_gateway_reachable(&mut self, serials: &[String], gateway: Ipv4Addr) -> Result<bool> {
        for serial in serials {
            for iface in self.list_routing_interfaces(serial)? {
                if reaches_gateway(&iface, gateway) {
                    debug!(%serial, interface = %iface.interface_id, "default gateway already configured");
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
