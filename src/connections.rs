//! # Connection Extractor
//!
//! Folds cutsheet rows into a symmetric device → port → peer map.

use crate::fields::{Field, Side};
use crate::table::{Row, Table};
use std::collections::BTreeMap;

/// Ports of one device, each mapped to its `"<peer-device>:<peer-port>"` descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DevicePorts {
    pub ports: BTreeMap<String, String>,
}

/// Symmetric connection graph keyed by device name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionMap {
    devices: BTreeMap<String, DevicePorts>,
}

/// One cabled endpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Endpoint<'a> {
    device: &'a str,
    port: &'a str,
}

impl<'a> Endpoint<'a> {
    fn from_row(row: &Row<'a>, side: Side) -> Option<Self> {
        Some(Endpoint {
            device: row.field(side, Field::Name)?,
            port: row.field(side, Field::Port)?,
        })
    }

    fn descriptor(&self) -> String {
        format!("{}:{}", self.device, self.port)
    }
}

impl ConnectionMap {
    /// Records the cable `a` ↔ `b` in both directions. A port seen again is
    /// overwritten by the later cable.
    pub fn connect(&mut self, a_device: &str, a_port: &str, b_device: &str, b_port: &str) {
        let a = Endpoint { device: a_device, port: a_port };
        let b = Endpoint { device: b_device, port: b_port };
        self.insert(a, b);
        self.insert(b, a);
    }

    fn insert(&mut self, local: Endpoint, peer: Endpoint) {
        self.devices
            .entry(local.device.to_owned())
            .or_default()
            .ports
            .insert(local.port.to_owned(), peer.descriptor());
    }

    /// Number of distinct devices with at least one connection.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Devices in ascending name order.
    pub fn devices(&self) -> impl Iterator<Item = (&str, &DevicePorts)> {
        self.devices.iter().map(|(name, ports)| (name.as_str(), ports))
    }

    pub fn device(&self, name: &str) -> Option<&DevicePorts> {
        self.devices.get(name)
    }

    /// Peer descriptor cabled to `port` of `device`.
    pub fn peer(&self, device: &str, port: &str) -> Option<&str> {
        self.devices.get(device)?.ports.get(port).map(String::as_str)
    }
}

/// Builds the connection map of `table`. Rows missing either endpoint's name
/// or port are skipped.
pub fn extract_connections(table: &Table) -> ConnectionMap {
    let mut connections = ConnectionMap::default();
    for row in table.rows() {
        let (Some(a), Some(b)) = (Endpoint::from_row(&row, Side::A), Endpoint::from_row(&row, Side::B)) else {
            continue;
        };
        connections.connect(a.device, a.port, b.device, b.port);
    }
    connections
}
