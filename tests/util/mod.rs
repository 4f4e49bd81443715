use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use mstmap_import::db::ChadoStore;
use mstmap_import::types::OrganismId;

#[allow(dead_code)]
pub fn make_test_store() -> ChadoStore {
    let mut store = ChadoStore::open_in_memory().unwrap();
    store.create_tables().unwrap();
    store
}

#[allow(dead_code)]
pub fn seed_organism(store: &mut ChadoStore) -> OrganismId {
    let tx = store.transaction().unwrap();
    let organism_id = tx.insert_organism("Lens", "culinaris", Some("lentil")).unwrap();
    tx.commit().unwrap();
    organism_id
}

// The required fields plus nothing else; tests add or remove entries as
// each scenario needs.
#[allow(dead_code)]
pub fn make_request_fields(featuremap_name: &str, organism_id: OrganismId)
    -> HashMap<String, String>
{
    let mut fields = HashMap::new();
    fields.insert("featuremap_name".to_owned(), featuremap_name.to_owned());
    fields.insert("organism_organism_id".to_owned(), organism_id.to_string());
    fields.insert("featuremap_unittype_name".to_owned(), "cM".to_owned());
    fields.insert("map_type".to_owned(), "linkage".to_owned());
    fields.insert("analysis_program".to_owned(), "MSTmap".to_owned());
    fields.insert("analysis_programversion".to_owned(), "unknown".to_owned());
    fields
}

#[allow(dead_code)]
pub fn read_map_file(file_name: &str) -> BufReader<File> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push(file_name);
    let file = File::open(&path)
        .unwrap_or_else(|err| panic!("failed to open {}: {}", path.display(), err));
    BufReader::new(file)
}
