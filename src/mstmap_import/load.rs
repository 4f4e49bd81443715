use tracing::debug;

use crate::config::ImportConfig;
use crate::db::{ChadoTx, StoreError};
use crate::errors::ImportError;
use crate::form::ImportRequest;
use crate::import::CancelToken;
use crate::mstmap::LinkageGroup;
use crate::resolve::ResolvedMetadata;
use crate::types::{AnalysisId, FeatureMapId};

#[derive(Serialize, Clone, Debug)]
pub struct ImportOutcome {
    pub featuremap_id: FeatureMapId,
    pub analysis_id: AnalysisId,
    pub group_count: usize,
    pub marker_count: usize,
}

// Writes the featuremap aggregate through the transaction it is given:
// the map row, its properties, one linkage-group feature per group, one
// marker feature and featurepos row per position, and the analysis link.
// Nothing is committed here; the orchestrator owns the commit.
pub struct MapLoader<'a, 'conn> {
    tx: &'a ChadoTx<'conn>,
    config: &'a ImportConfig,
}

impl<'a, 'conn> MapLoader<'a, 'conn> {
    pub fn new(tx: &'a ChadoTx<'conn>, config: &'a ImportConfig) -> MapLoader<'a, 'conn> {
        MapLoader { tx, config }
    }

    pub fn load(&self, request: &ImportRequest, metadata: &ResolvedMetadata,
                groups: &[LinkageGroup], cancel: &CancelToken)
        -> Result<ImportOutcome, ImportError>
    {
        let description = request.featuremap_description.as_deref();
        let featuremap_id = match self.tx.insert_featuremap(
            &request.featuremap_name, description, metadata.unittype_id) {
            Ok(featuremap_id) => featuremap_id,
            Err(StoreError::UniqueViolation(message))
                if message.contains("featuremap.name") =>
            {
                return Err(ImportError::DuplicateMap(request.featuremap_name.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        self.store_map_properties(request, featuremap_id)?;

        let group_type_id = self.tx.find_or_create_cvterm(
            &self.config.feature_type_cv_name, &self.config.linkage_group_type)?;
        let marker_type_id = self.tx.find_or_create_cvterm(
            &self.config.feature_type_cv_name, &self.config.marker_type)?;

        let mut marker_count = 0;

        for group in groups {
            if cancel.is_cancelled() {
                return Err(ImportError::Cancelled);
            }

            // scope the group feature to the map so two maps for one
            // organism can both have an "lg0"
            let group_uniquename =
                format!("{}_{}", request.featuremap_name, group.name);
            let group_feature_id = self.tx.find_or_create_feature(
                metadata.organism_id, group_type_id,
                &group_uniquename, Some(group.name.as_str()))?;

            for marker_position in &group.positions {
                let marker_feature_id = self.tx.find_or_create_feature(
                    metadata.organism_id, marker_type_id,
                    &marker_position.marker, Some(marker_position.marker.as_str()))?;
                self.tx.insert_featurepos(featuremap_id, marker_feature_id,
                                          group_feature_id, marker_position.position)?;
                marker_count += 1;
            }

            debug!(group = group.name.as_str(), markers = group.positions.len(),
                   "stored linkage group");
        }

        self.tx.link_featuremap_analysis(featuremap_id, metadata.analysis_id)?;

        Ok(ImportOutcome {
            featuremap_id,
            analysis_id: metadata.analysis_id,
            group_count: groups.len(),
            marker_count,
        })
    }

    fn store_map_properties(&self, request: &ImportRequest, featuremap_id: FeatureMapId)
        -> Result<(), ImportError>
    {
        let mut properties: Vec<(&str, String)> =
            vec![("map_type", request.map_type.to_string())];
        if let Some(ref pop_type) = request.pop_type {
            properties.push(("population_type", pop_type.to_string()));
        }
        if let Some(pop_size) = request.pop_size {
            properties.push(("population_size", pop_size.to_string()));
        }
        if let Some(ref pub_map_name) = request.pub_map_name {
            properties.push(("published_map_name", pub_map_name.to_string()));
        }

        for (type_name, value) in properties {
            let type_id = self.tx.find_or_create_cvterm(
                &self.config.property_cv_name, type_name)?;
            self.tx.insert_featuremapprop(featuremap_id, type_id, &value, 0)?;
        }

        Ok(())
    }
}
