//! # Topology Builder
//!
//! Folds cutsheet rows into building → rack → rack unit → occupant. Each row
//! places up to two devices, one per endpoint.

use crate::fields::{Field, Side};
use crate::table::{Row, Table};
use std::collections::BTreeMap;

/// Rack units of one rack, label → occupant descriptor.
pub type RackUnits = BTreeMap<String, String>;

/// Racks of one building keyed by rack identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Building {
    pub racks: BTreeMap<String, RackUnits>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopologyMap {
    buildings: BTreeMap<String, Building>,
}

/// Where one endpoint sits and what it is.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Placement<'a> {
    building: &'a str,
    rack: &'a str,
    rack_unit: &'a str,
    name: &'a str,
    kind: &'a str,
    platform: Option<&'a str>,
}

impl<'a> Placement<'a> {
    /// `None` unless building, rack, rack unit and name are all present.
    fn from_row(row: &Row<'a>, side: Side) -> Option<Self> {
        Some(Placement {
            building: row.field(side, Field::Building)?,
            rack: row.field(side, Field::Rack)?,
            rack_unit: row.field(side, Field::RackUnit)?,
            name: row.field(side, Field::Name)?,
            kind: row.field(side, Field::Type).unwrap_or_default(),
            platform: row.field(side, Field::Platform),
        })
    }
}

/// `"<rack> (<platform>)"`, or the bare rack name without a platform.
pub fn rack_identifier(rack: &str, platform: Option<&str>) -> String {
    match platform {
        Some(platform) => format!("{rack} ({platform})"),
        None => rack.to_owned(),
    }
}

/// `"<name> (<type>)"`; the parentheses stay even when the type is blank.
pub fn occupant(name: &str, kind: &str) -> String {
    format!("{name} ({kind})")
}

impl TopologyMap {
    /// Puts `occupant` at the given coordinate, replacing whatever was there.
    pub fn place(&mut self, building: &str, rack_id: &str, rack_unit: &str, occupant: String) {
        self.buildings
            .entry(building.to_owned())
            .or_default()
            .racks
            .entry(rack_id.to_owned())
            .or_default()
            .insert(rack_unit.to_owned(), occupant);
    }

    /// Buildings in ascending name order.
    pub fn buildings(&self) -> impl Iterator<Item = (&str, &Building)> {
        self.buildings.iter().map(|(name, building)| (name.as_str(), building))
    }

    pub fn building(&self, name: &str) -> Option<&Building> {
        self.buildings.get(name)
    }

    pub fn occupant(&self, building: &str, rack_id: &str, rack_unit: &str) -> Option<&str> {
        self.buildings
            .get(building)?
            .racks
            .get(rack_id)?
            .get(rack_unit)
            .map(String::as_str)
    }

    /// Distinct racks summed over all buildings. Rack units are not counted.
    pub fn rack_count(&self) -> usize {
        self.buildings.values().map(|building| building.racks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

/// Builds the topology of `table`, skipping each endpoint that lacks a
/// building, rack, rack unit or name.
pub fn build_topology(table: &Table) -> TopologyMap {
    let mut topology = TopologyMap::default();
    for row in table.rows() {
        for side in Side::BOTH {
            if let Some(placement) = Placement::from_row(&row, side) {
                topology.place(
                    placement.building,
                    &rack_identifier(placement.rack, placement.platform),
                    placement.rack_unit,
                    occupant(placement.name, placement.kind),
                );
            }
        }
    }
    topology
}
