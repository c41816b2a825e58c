use serde::{Deserialize, Serialize};

/// Static description of a clinic location.
///
/// Configuration data, not a lifecycle entity: the set of clinics is
/// closed and compiled in, and descriptors are only used to enumerate
/// the roster and to label the slots created for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClinicDescriptor {
    /// Stable code stored in the database
    pub code: &'static str,
    /// Human-readable display name
    pub name: &'static str,
    /// Street address, used in slot notes
    pub address: &'static str,
    /// Latitude/longitude of the location
    pub coordinates: (f64, f64),
}

/// The closed set of clinic locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clinic {
    Downtown,
    Riverside,
    /// Open only on the weekly special day (Sunday)
    Hillside,
}

const DOWNTOWN: ClinicDescriptor = ClinicDescriptor {
    code: "downtown",
    name: "Downtown Clinic",
    address: "212 Harbor Street",
    coordinates: (40.7158, -74.0031),
};

const RIVERSIDE: ClinicDescriptor = ClinicDescriptor {
    code: "riverside",
    name: "Riverside Clinic",
    address: "48 Mill Road",
    coordinates: (40.8009, -73.9712),
};

const HILLSIDE: ClinicDescriptor = ClinicDescriptor {
    code: "hillside",
    name: "Hillside Clinic",
    address: "7 Orchard Lane",
    coordinates: (40.7441, -73.9190),
};

impl Clinic {
    /// Every configured clinic, in roster order.
    pub const ALL: [Clinic; 3] = [Clinic::Downtown, Clinic::Riverside, Clinic::Hillside];

    pub fn descriptor(&self) -> &'static ClinicDescriptor {
        match self {
            Clinic::Downtown => &DOWNTOWN,
            Clinic::Riverside => &RIVERSIDE,
            Clinic::Hillside => &HILLSIDE,
        }
    }

    /// Stable code as stored in the database.
    pub fn code(&self) -> &'static str {
        self.descriptor().code
    }

    /// Looks up a clinic by its stored code.
    ///
    /// Returns `None` for codes no longer (or never) configured; callers
    /// decide whether that is an error or a row to skip.
    pub fn from_code(code: &str) -> Option<Clinic> {
        Clinic::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Display label combining name and address, used as the note on
    /// materialized slots.
    pub fn label(&self) -> String {
        let d = self.descriptor();
        format!("{}, {}", d.name, d.address)
    }
}

impl std::fmt::Display for Clinic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
