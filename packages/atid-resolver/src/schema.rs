//! Fixed local catalog schema.

use atid_core::query::{col, ColumnRef, QueryBuilder};
use atid_core::Engine;

pub const OBJECTS: &str = "TBL_STELLAROBJECTS";
pub const NAMES: &str = "TBL_NAMES";

pub const OBJECT_ID: &str = "OBJECT_ID";
pub const NAME: &str = "NAME";
pub const RA: &str = "RA";
pub const DEC: &str = "DEC";
pub const PM_RA: &str = "PM_RA";
pub const PM_DEC: &str = "PM_DEC";
pub const PARALLAX: &str = "PARALLAX";
pub const RADIAL_VELOCITY: &str = "RADIAL_VELOCITY";
pub const CATALOG: &str = "CATALOG";
pub const OBJECT_TYPE: &str = "OBJECT_TYPE";
pub const CONSTELLATION: &str = "CONSTELLATION";
pub const SPECTRAL_TYPE: &str = "SPECTRAL_TYPE";

/// Columns of `TBL_STELLAROBJECTS`, in table order.
pub const OBJECT_COLUMNS: [&str; 12] = [
    OBJECT_ID,
    NAME,
    RA,
    DEC,
    PM_RA,
    PM_DEC,
    PARALLAX,
    RADIAL_VELOCITY,
    CATALOG,
    OBJECT_TYPE,
    CONSTELLATION,
    SPECTRAL_TYPE,
];

/// Columns of `TBL_NAMES`.
pub const NAME_COLUMNS: [&str; 2] = [OBJECT_ID, NAME];

/// Builder with the catalog vocabulary registered.
pub fn builder(engine: Engine) -> QueryBuilder {
    let mut qb = QueryBuilder::new(engine);
    for column in OBJECT_COLUMNS {
        qb.register_column(OBJECTS, column);
    }
    for column in NAME_COLUMNS {
        qb.register_column(NAMES, column);
    }
    qb
}

/// Every object column, qualified.
pub fn object_columns() -> Vec<ColumnRef> {
    OBJECT_COLUMNS.iter().map(|c| col(OBJECTS, c)).collect()
}

pub fn object(column: &str) -> ColumnRef {
    col(OBJECTS, column)
}

pub fn alias(column: &str) -> ColumnRef {
    col(NAMES, column)
}
