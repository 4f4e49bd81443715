use std::fs::File;
use std::io::BufReader;

use flexstr::SharedStr as FlexStr;

use crate::types::CvName;

// Vocabulary names the importer writes against. The defaults match the cvs
// and term names a stock Tripal chado install provides, so a configuration
// file is only needed for sites that renamed them.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ImportConfig {
    // cv holding map unit types ("cM", "bp", ...)
    pub unittype_cv_name: CvName,
    // cv holding featuremap property types (map_type, population_type, ...)
    pub property_cv_name: CvName,
    // cv holding feature types
    pub feature_type_cv_name: CvName,
    pub linkage_group_type: FlexStr,
    pub marker_type: FlexStr,
}

impl Default for ImportConfig {
    fn default() -> ImportConfig {
        ImportConfig {
            unittype_cv_name: "featuremap_units".into(),
            property_cv_name: "featuremap_property".into(),
            feature_type_cv_name: "sequence".into(),
            linkage_group_type: "linkage_group".into(),
            marker_type: "genetic_marker".into(),
        }
    }
}

impl ImportConfig {
    pub fn read(config_file_name: &str) -> ImportConfig {
        let file = match File::open(config_file_name) {
            Ok(file) => file,
            Err(err) => {
                panic!("Failed to read {}: {}\n", config_file_name, err)
            }
        };
        let reader = BufReader::new(file);

        match serde_json::from_reader(reader) {
            Ok(config) => config,
            Err(err) => {
                panic!("failed to parse {}: {}", config_file_name, err)
            },
        }
    }
}
