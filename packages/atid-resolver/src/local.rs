//! Queries against the local object catalog.
//!
//! Positions are stored in degrees. Cone searches narrow the rows with a
//! declination band and one or two RA ranges, then keep the rows whose exact
//! separation is within the radius.

use atid_core::driver::Row;
use atid_core::error::ConnectionError;
use atid_core::query::{Predicate, QueryBuilder, Statement};
use atid_core::{
    AstronomicalTarget, CatalogConnection, ConeRegion, ConnectionStatus, CoordinateWindow,
    SkyCoord,
};

use crate::schema::{self, alias, object};

/// Object catalog reached through one catalog connection.
#[derive(Debug)]
pub struct LocalCatalog {
    connection: CatalogConnection,
}

impl LocalCatalog {
    /// Wraps a connection. The connection may still be closed.
    pub fn new(connection: CatalogConnection) -> Self {
        Self { connection }
    }

    pub fn slot(&self) -> &str {
        self.connection.slot()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_open()
    }

    pub fn connection(&self) -> &CatalogConnection {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut CatalogConnection {
        &mut self.connection
    }

    /// Looks up an object by its catalog name, then by alias.
    pub fn find_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<AstronomicalTarget>, ConnectionError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let mut qb = self.builder()?;
        qb.select(schema::object_columns())
            .from(schema::OBJECTS)
            .where_(Predicate::eq(object(schema::NAME), name))
            .order_by(object(schema::OBJECT_ID));
        if let Some(target) = self.first_target(&qb.build()?)? {
            return Ok(Some(target));
        }

        qb.reset_query();
        qb.select(schema::object_columns())
            .from(schema::NAMES)
            .join(
                schema::OBJECTS,
                alias(schema::OBJECT_ID),
                object(schema::OBJECT_ID),
            )
            .where_(Predicate::eq(alias(schema::NAME), name))
            .order_by(object(schema::OBJECT_ID));
        self.first_target(&qb.build()?)
    }

    /// Objects within `radius` degrees of `center`.
    pub fn find_in_cone(
        &mut self,
        center: SkyCoord,
        radius: f64,
    ) -> Result<Vec<AstronomicalTarget>, ConnectionError> {
        let cone = ConeRegion::new(center, radius);
        let (dec_min, dec_max) = cone.dec_band();
        let ra_ranges = cone
            .ra_ranges()
            .into_iter()
            .map(|(low, high)| Predicate::between(object(schema::RA), low, high))
            .collect();

        let mut qb = self.builder()?;
        qb.select(schema::object_columns())
            .from(schema::OBJECTS)
            .where_(Predicate::between(object(schema::DEC), dec_min, dec_max))
            .where_(Predicate::Any(ra_ranges))
            .order_by(object(schema::OBJECT_ID));

        let targets = self.targets(&qb.build()?)?;
        Ok(targets
            .into_iter()
            .filter(|t| cone.contains(&t.coordinates))
            .collect())
    }

    /// Objects inside the window spanned by two opposite corners.
    pub fn find_in_box(
        &mut self,
        top_left: SkyCoord,
        bottom_right: SkyCoord,
    ) -> Result<Vec<AstronomicalTarget>, ConnectionError> {
        let window = CoordinateWindow::from_corners(top_left, bottom_right);

        let mut qb = self.builder()?;
        qb.select(schema::object_columns())
            .from(schema::OBJECTS)
            .where_(Predicate::between(
                object(schema::RA),
                window.left(),
                window.right(),
            ))
            .where_(Predicate::between(
                object(schema::DEC),
                window.bottom(),
                window.top(),
            ))
            .order_by(object(schema::OBJECT_ID));
        self.targets(&qb.build()?)
    }

    fn builder(&self) -> Result<QueryBuilder, ConnectionError> {
        match self.connection.engine() {
            Some(engine) => Ok(schema::builder(engine)),
            None => Err(ConnectionError::NotOpen {
                slot: self.slot().to_string(),
            }),
        }
    }

    fn first_target(
        &mut self,
        statement: &Statement,
    ) -> Result<Option<AstronomicalTarget>, ConnectionError> {
        Ok(self.targets(statement)?.into_iter().next())
    }

    fn targets(
        &mut self,
        statement: &Statement,
    ) -> Result<Vec<AstronomicalTarget>, ConnectionError> {
        let rows = self.connection.query(statement)?;
        Ok(rows.iter().filter_map(row_to_target).collect())
    }
}

/// Maps an object row. Rows without a name or position are skipped.
fn row_to_target(row: &Row) -> Option<AstronomicalTarget> {
    let name = row.get_text(schema::NAME)?;
    let (Some(ra), Some(dec)) = (row.get_f64(schema::RA), row.get_f64(schema::DEC)) else {
        tracing::debug!("Skipping catalog row '{}' without a position", name);
        return None;
    };

    let mut target = AstronomicalTarget::new(name, SkyCoord::new(ra, dec))
        .with_proper_motion(row.get_f64(schema::PM_RA), row.get_f64(schema::PM_DEC))
        .with_parallax(row.get_f64(schema::PARALLAX))
        .with_radial_velocity(row.get_f64(schema::RADIAL_VELOCITY));
    target.catalog = row.get_text(schema::CATALOG);
    target.object_type = row.get_text(schema::OBJECT_TYPE);
    target.constellation = row.get_text(schema::CONSTELLATION);
    target.spectral_type = row.get_text(schema::SPECTRAL_TYPE);
    Some(target)
}
