//! Cutsheet column names.
//!
//! Every logical field of a connection endpoint maps to a short, ordered list of
//! header spellings. Lookups take the first candidate whose cell is non-empty.

/// One side of a recorded cable run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];
}

/// Per-endpoint fields a cutsheet row may carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Port,
    Building,
    Rack,
    RackUnit,
    Type,
    Platform,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Port,
        Field::Building,
        Field::Rack,
        Field::RackUnit,
        Field::Type,
        Field::Platform,
    ];
}

/// Header spellings for `field` on `side`, in preference order.
pub const fn candidates(side: Side, field: Field) -> &'static [&'static str] {
    match (side, field) {
        (Side::A, Field::Name) => &["DeviceA Name", "DeviceA Host Name"],
        (Side::A, Field::Port) => &["DeviceA Port"],
        (Side::A, Field::Building) => &["DeviceA Building"],
        (Side::A, Field::Rack) => &["DeviceA Rack"],
        (Side::A, Field::RackUnit) => &["DeviceA RU"],
        (Side::A, Field::Type) => &["DeviceA Type"],
        (Side::A, Field::Platform) => &["DeviceA RackPlatform"],
        (Side::B, Field::Name) => &["DeviceB Name", "DeviceB Host Name"],
        (Side::B, Field::Port) => &["DeviceB Port"],
        (Side::B, Field::Building) => &["DeviceB Building"],
        (Side::B, Field::Rack) => &["DeviceB Rack"],
        (Side::B, Field::RackUnit) => &["DeviceB RU"],
        (Side::B, Field::Type) => &["DeviceB Type"],
        (Side::B, Field::Platform) => &["DeviceB RackPlatform"],
    }
}

/// `true` when `cell`, trimmed, is one of the known header spellings.
pub fn is_known_header(cell: &str) -> bool {
    let cell = cell.trim();
    Side::BOTH
        .iter()
        .flat_map(|side| Field::ALL.iter().map(move |field| candidates(*side, *field)))
        .any(|names| names.contains(&cell))
}

/// `true` when any cell of `row` is a known header spelling.
pub fn names_known_header(row: &[String]) -> bool {
    row.iter().any(|cell| is_known_header(cell))
}
