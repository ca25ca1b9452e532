//! Outbound query scripts.
//!
//! A script is three lines: an output directive, the record format naming
//! the seven reply fields and one query clause.

use std::fmt;

use atid_core::{BoxRegion, ConeRegion};

/// Output directive suppressing console and script echo.
pub const OUTPUT_DIRECTIVE: &str = "output console=off script=off";

/// Record format: identifier, RA, Dec, pmRA, pmDec, parallax, radial velocity.
pub const RECORD_FORMAT: &str =
    r#"format object "%IDLIST(1);%COO(A);%COO(D);%PM(A);%PM(D);%PLX(V);%RV(V)""#;

/// Object type filter applied to region queries.
pub const STAR_FILTER: &str = "maintypes=star";

/// What the script asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptQuery {
    /// Identifier lookup
    Id(String),
    /// Rectangular region by center and extent
    Box(BoxRegion),
    /// Circular region
    Cone(ConeRegion),
}

impl ScriptQuery {
    /// Query clause line.
    pub fn clause(&self) -> String {
        match self {
            Self::Id(name) => format!("query id {}", sanitize_name(name)),
            Self::Box(region) => format!(
                "query sample region(BOX, {} {}, {}d {}d) & {}",
                format_degrees(region.center.ra_deg),
                format_signed_degrees(region.center.dec_deg),
                format_degrees(region.width),
                format_degrees(region.height),
                STAR_FILTER
            ),
            Self::Cone(region) => format!(
                "query sample region(CIRCLE, {} {}, {}d) & {}",
                format_degrees(region.center.ra_deg),
                format_signed_degrees(region.center.dec_deg),
                format_degrees(region.radius),
                STAR_FILTER
            ),
        }
    }
}

/// Complete script text.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    query: ScriptQuery,
}

impl Script {
    pub fn new(query: ScriptQuery) -> Self {
        Self { query }
    }

    pub fn by_name(name: &str) -> Self {
        Self::new(ScriptQuery::Id(name.to_string()))
    }

    pub fn in_box(region: BoxRegion) -> Self {
        Self::new(ScriptQuery::Box(region))
    }

    pub fn in_cone(region: ConeRegion) -> Self {
        Self::new(ScriptQuery::Cone(region))
    }

    pub fn query(&self) -> &ScriptQuery {
        &self.query
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{OUTPUT_DIRECTIVE}")?;
        writeln!(f, "{RECORD_FORMAT}")?;
        write!(f, "{}", self.query.clause())
    }
}

/// Collapses control characters and runs of whitespace so a name cannot
/// start a new script line.
fn sanitize_name(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_degrees(value: f64) -> String {
    format!("{value:.6}")
}

fn format_signed_degrees(value: f64) -> String {
    format!("{value:+.6}")
}
