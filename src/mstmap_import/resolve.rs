use chrono::Utc;
use tracing::debug;

use crate::config::ImportConfig;
use crate::db::ChadoTx;
use crate::errors::{ImportError, UnresolvedReference};
use crate::form::ImportRequest;
use crate::types::{AnalysisId, CvtermId, OrganismId};

#[derive(Clone, Debug)]
pub struct ResolvedMetadata {
    pub organism_id: OrganismId,
    pub unittype_id: CvtermId,
    pub analysis_id: AnalysisId,
    pub analysis_reused: bool,
}

// Turns the request's references into catalog ids. Organisms are curated
// data and must already exist; unit types are a small closed vocabulary and
// may be created on first use; an analysis with the same natural key is
// reused so re-importing the same provenance never duplicates it.
pub struct Resolver<'a, 'conn> {
    tx: &'a ChadoTx<'conn>,
    config: &'a ImportConfig,
}

impl<'a, 'conn> Resolver<'a, 'conn> {
    pub fn new(tx: &'a ChadoTx<'conn>, config: &'a ImportConfig) -> Resolver<'a, 'conn> {
        Resolver { tx, config }
    }

    pub fn resolve(&self, request: &ImportRequest) -> Result<ResolvedMetadata, ImportError> {
        let mut unresolved = vec![];

        if self.tx.organism_by_id(request.organism_id)?.is_none() {
            unresolved.push(UnresolvedReference {
                field: "organism_organism_id",
                value: request.organism_id.to_string(),
            });
        }

        if !unresolved.is_empty() {
            return Err(ImportError::ReferenceNotFound(unresolved));
        }

        let unittype_id = self.tx.find_or_create_cvterm(
            &self.config.unittype_cv_name, &request.unittype_name)?;

        let description = request.analysis_description.as_deref();
        let existing = self.tx.analysis_by_natural_key(
            &request.analysis_program, &request.analysis_programversion, description)?;

        let (analysis_id, analysis_reused) = match existing {
            Some(analysis_id) => {
                debug!(analysis_id, "reusing analysis with matching provenance");
                (analysis_id, true)
            }
            None => {
                let timeexecuted = Utc::now().to_rfc3339();
                let analysis_id = self.tx.insert_analysis(
                    &request.analysis_program, &request.analysis_programversion,
                    description, &timeexecuted)?;
                (analysis_id, false)
            }
        };

        Ok(ResolvedMetadata {
            organism_id: request.organism_id,
            unittype_id,
            analysis_id,
            analysis_reused,
        })
    }
}
