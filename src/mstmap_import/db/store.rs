use std::path::Path;

use flexstr::{SharedStr as FlexStr, ToSharedStr};
use rusqlite::{Connection, OptionalExtension, Transaction};
use thiserror::Error;

use crate::types::{AnalysisId, CvId, CvtermId, FeatureId, FeatureMapId, OrganismId};

use super::schema;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

fn translate(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(message))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                StoreError::UniqueViolation(message),
        other => StoreError::Sqlite(other),
    }
}

#[derive(Clone, Debug)]
pub struct OrganismRecord {
    pub organism_id: OrganismId,
    pub genus: FlexStr,
    pub species: FlexStr,
}

#[derive(Clone, Debug)]
pub struct FeatureMapRecord {
    pub featuremap_id: FeatureMapId,
    pub name: FlexStr,
    pub description: Option<FlexStr>,
    pub unittype_id: CvtermId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapPositionRecord {
    pub linkage_group: FlexStr,
    pub marker: FlexStr,
    pub position: f64,
}

// Connection owner. All reads and writes of an import run go through one
// ChadoTx so the whole aggregate commits or rolls back together.
pub struct ChadoStore {
    conn: Connection,
}

impl ChadoStore {
    pub fn open(path: &Path) -> Result<ChadoStore, StoreError> {
        ChadoStore::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<ChadoStore, StoreError> {
        ChadoStore::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<ChadoStore, StoreError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        // a concurrent import holding the write lock fails this one with
        // SQLITE_BUSY instead of blocking forever
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(ChadoStore { conn })
    }

    pub fn create_tables(&mut self) -> Result<(), StoreError> {
        schema::make_chado_tables(&mut self.conn)?;
        Ok(())
    }

    pub fn transaction(&mut self) -> Result<ChadoTx<'_>, StoreError> {
        Ok(ChadoTx { tx: self.conn.transaction()? })
    }
}

pub struct ChadoTx<'conn> {
    tx: Transaction<'conn>,
}

impl ChadoTx<'_> {
    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn organism_by_id(&self, organism_id: OrganismId)
        -> Result<Option<OrganismRecord>, StoreError>
    {
        let record = self.tx.query_row(
            "SELECT organism_id, genus, species FROM organism WHERE organism_id = ?1",
            [organism_id],
            |row| {
                Ok(OrganismRecord {
                    organism_id: row.get(0)?,
                    genus: row.get::<_, String>(1)?.to_shared_str(),
                    species: row.get::<_, String>(2)?.to_shared_str(),
                })
            }).optional()?;
        Ok(record)
    }

    pub fn insert_organism(&self, genus: &str, species: &str, common_name: Option<&str>)
        -> Result<OrganismId, StoreError>
    {
        self.tx.execute(
            "INSERT INTO organism (genus, species, common_name) VALUES (?1, ?2, ?3)",
            (genus, species, common_name)).map_err(translate)?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn find_or_create_cv(&self, name: &str) -> Result<CvId, StoreError> {
        let existing = self.tx.query_row(
            "SELECT cv_id FROM cv WHERE name = ?1",
            [name], |row| row.get(0)).optional()?;
        if let Some(cv_id) = existing {
            return Ok(cv_id);
        }
        self.tx.execute("INSERT INTO cv (name) VALUES (?1)", [name])
            .map_err(translate)?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn find_or_create_cvterm(&self, cv_name: &str, term_name: &str)
        -> Result<CvtermId, StoreError>
    {
        let cv_id = self.find_or_create_cv(cv_name)?;
        let existing = self.tx.query_row(
            "SELECT cvterm_id FROM cvterm WHERE cv_id = ?1 AND name = ?2",
            (cv_id, term_name), |row| row.get(0)).optional()?;
        if let Some(cvterm_id) = existing {
            return Ok(cvterm_id);
        }
        self.tx.execute(
            "INSERT INTO cvterm (cv_id, name) VALUES (?1, ?2)",
            (cv_id, term_name)).map_err(translate)?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn cvterm_name(&self, cvterm_id: CvtermId) -> Result<Option<FlexStr>, StoreError> {
        let name = self.tx.query_row(
            "SELECT name FROM cvterm WHERE cvterm_id = ?1",
            [cvterm_id], |row| row.get::<_, String>(0)).optional()?;
        Ok(name.map(|name| name.to_shared_str()))
    }

    // "IS" rather than "=" so a NULL description matches a NULL description
    pub fn analysis_by_natural_key(&self, program: &str, programversion: &str,
                                   description: Option<&str>)
        -> Result<Option<AnalysisId>, StoreError>
    {
        let analysis_id = self.tx.query_row(
            "SELECT analysis_id FROM analysis
              WHERE program = ?1 AND programversion = ?2 AND description IS ?3",
            (program, programversion, description), |row| row.get(0)).optional()?;
        Ok(analysis_id)
    }

    pub fn insert_analysis(&self, program: &str, programversion: &str,
                           description: Option<&str>, timeexecuted: &str)
        -> Result<AnalysisId, StoreError>
    {
        self.tx.execute(
            "INSERT INTO analysis (program, programversion, description, timeexecuted)
             VALUES (?1, ?2, ?3, ?4)",
            (program, programversion, description, timeexecuted)).map_err(translate)?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn insert_featuremap(&self, name: &str, description: Option<&str>,
                             unittype_id: CvtermId)
        -> Result<FeatureMapId, StoreError>
    {
        self.tx.execute(
            "INSERT INTO featuremap (name, description, unittype_id) VALUES (?1, ?2, ?3)",
            (name, description, unittype_id)).map_err(translate)?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn insert_featuremapprop(&self, featuremap_id: FeatureMapId, type_id: CvtermId,
                                 value: &str, rank: i64)
        -> Result<(), StoreError>
    {
        self.tx.execute(
            "INSERT INTO featuremapprop (featuremap_id, type_id, value, rank)
             VALUES (?1, ?2, ?3, ?4)",
            (featuremap_id, type_id, value, rank)).map_err(translate)?;
        Ok(())
    }

    pub fn find_or_create_feature(&self, organism_id: OrganismId, type_id: CvtermId,
                                  uniquename: &str, name: Option<&str>)
        -> Result<FeatureId, StoreError>
    {
        let existing = self.tx.query_row(
            "SELECT feature_id FROM feature
              WHERE organism_id = ?1 AND uniquename = ?2 AND type_id = ?3",
            (organism_id, uniquename, type_id), |row| row.get(0)).optional()?;
        if let Some(feature_id) = existing {
            return Ok(feature_id);
        }
        self.tx.execute(
            "INSERT INTO feature (organism_id, type_id, uniquename, name)
             VALUES (?1, ?2, ?3, ?4)",
            (organism_id, type_id, uniquename, name)).map_err(translate)?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn insert_featurepos(&self, featuremap_id: FeatureMapId, feature_id: FeatureId,
                             map_feature_id: FeatureId, mappos: f64)
        -> Result<(), StoreError>
    {
        self.tx.execute(
            "INSERT INTO featurepos (featuremap_id, feature_id, map_feature_id, mappos)
             VALUES (?1, ?2, ?3, ?4)",
            (featuremap_id, feature_id, map_feature_id, mappos)).map_err(translate)?;
        Ok(())
    }

    pub fn link_featuremap_analysis(&self, featuremap_id: FeatureMapId,
                                    analysis_id: AnalysisId)
        -> Result<(), StoreError>
    {
        self.tx.execute(
            "INSERT INTO featuremap_analysis (featuremap_id, analysis_id) VALUES (?1, ?2)",
            (featuremap_id, analysis_id)).map_err(translate)?;
        Ok(())
    }

    pub fn featuremap_by_name(&self, name: &str)
        -> Result<Option<FeatureMapRecord>, StoreError>
    {
        let record = self.tx.query_row(
            "SELECT featuremap_id, name, description, unittype_id
               FROM featuremap WHERE name = ?1",
            [name],
            |row| {
                Ok(FeatureMapRecord {
                    featuremap_id: row.get(0)?,
                    name: row.get::<_, String>(1)?.to_shared_str(),
                    description: row.get::<_, Option<String>>(2)?
                        .map(|d| d.to_shared_str()),
                    unittype_id: row.get(3)?,
                })
            }).optional()?;
        Ok(record)
    }

    pub fn featuremap_count(&self, name: &str) -> Result<i64, StoreError> {
        let count = self.tx.query_row(
            "SELECT count(*) FROM featuremap WHERE name = ?1",
            [name], |row| row.get(0))?;
        Ok(count)
    }

    pub fn analysis_count(&self, program: &str) -> Result<i64, StoreError> {
        let count = self.tx.query_row(
            "SELECT count(*) FROM analysis WHERE program = ?1",
            [program], |row| row.get(0))?;
        Ok(count)
    }

    pub fn featuremapprop_value(&self, featuremap_id: FeatureMapId, type_name: &str)
        -> Result<Option<FlexStr>, StoreError>
    {
        let value = self.tx.query_row(
            "SELECT p.value FROM featuremapprop p
               JOIN cvterm t ON t.cvterm_id = p.type_id
              WHERE p.featuremap_id = ?1 AND t.name = ?2",
            (featuremap_id, type_name), |row| row.get::<_, String>(0)).optional()?;
        Ok(value.map(|value| value.to_shared_str()))
    }

    pub fn analyses_for_map(&self, featuremap_id: FeatureMapId)
        -> Result<Vec<AnalysisId>, StoreError>
    {
        let mut statement = self.tx.prepare(
            "SELECT analysis_id FROM featuremap_analysis
              WHERE featuremap_id = ?1 ORDER BY analysis_id")?;
        let analysis_ids = statement
            .query_map([featuremap_id], |row| row.get(0))?
            .collect::<Result<Vec<AnalysisId>, _>>()?;
        Ok(analysis_ids)
    }

    // Positions in insertion order, which is map order within each group.
    pub fn positions_for_map(&self, featuremap_id: FeatureMapId)
        -> Result<Vec<MapPositionRecord>, StoreError>
    {
        let mut statement = self.tx.prepare(
            "SELECT grp.name, marker.name, fp.mappos
               FROM featurepos fp
               JOIN feature marker ON marker.feature_id = fp.feature_id
               JOIN feature grp ON grp.feature_id = fp.map_feature_id
              WHERE fp.featuremap_id = ?1
              ORDER BY fp.featurepos_id")?;
        let positions = statement
            .query_map([featuremap_id], |row| {
                Ok(MapPositionRecord {
                    linkage_group: row.get::<_, String>(0)?.to_shared_str(),
                    marker: row.get::<_, String>(1)?.to_shared_str(),
                    position: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<MapPositionRecord>, _>>()?;
        Ok(positions)
    }
}
