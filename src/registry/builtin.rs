//! Built-in obsolete field table.

/// Advisory the built-in table is taken from.
pub const NOTE: &str = "SAP Note 2267246";

/// Obsolete fields per table, in advisory order.
pub static OBSOLETE_FIELDS: &[(&str, &[&str])] = &[
    (
        "MARC",
        &[
            "MEGRU", "USEQU", "ALTSL", "MDACH", "DPLFS", "DPLPU", "DPLHO", "FHORI",
        ],
    ),
    ("MARD", &["DISKZ", "LSOBS", "LMINB", "LBSTF"]),
];
