use thiserror::Error;

use crate::db::StoreError;
use crate::form::ValidationReport;
use crate::mstmap::MstParseError;
use crate::types::MapName;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub field: &'static str,
    pub value: String,
}

// One variant per failure class; everything run() can return is here, so
// callers never see a raw rusqlite or io error.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("missing or invalid submission fields: {0}")]
    Validation(ValidationReport),
    #[error("malformed MSTmap input: {0}")]
    MalformedInput(#[from] MstParseError),
    #[error("input contains no linkage groups")]
    EmptyMap,
    #[error("unresolved references: {}", format_unresolved(.0))]
    ReferenceNotFound(Vec<UnresolvedReference>),
    #[error("a featuremap named {0:?} already exists")]
    DuplicateMap(MapName),
    #[error("import cancelled before commit")]
    Cancelled,
    #[error("storage failure: {0}")]
    Persistence(#[from] StoreError),
}

fn format_unresolved(references: &[UnresolvedReference]) -> String {
    let described = references.iter()
        .map(|reference| format!("{}={}", reference.field, reference.value));
    itertools::join(described, ", ")
}
