use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::config::ImportConfig;
use crate::db::ChadoStore;
use crate::errors::ImportError;
use crate::form::{self, ImportRequest, ValidationReport};
use crate::load::{ImportOutcome, MapLoader};
use crate::mstmap::MstMapReader;
use crate::resolve::Resolver;

// Caller-supplied cancellation signal. A cancelled run abandons its
// transaction, so no partial aggregate becomes visible.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MstImporter {
    config: ImportConfig,
}

impl MstImporter {
    pub fn new(config: ImportConfig) -> MstImporter {
        MstImporter { config }
    }

    // Side effect free; drives the form's required-field display.
    pub fn validate_and_describe(&self, fields: &HashMap<String, String>)
        -> ValidationReport
    {
        form::validate_submission(fields)
    }

    pub fn run<R: BufRead>(&self, store: &mut ChadoStore,
                           fields: &HashMap<String, String>, reader: R)
        -> Result<ImportOutcome, ImportError>
    {
        self.run_with_cancel(store, fields, reader, &CancelToken::new())
    }

    // Validation and parsing complete before the transaction is opened, so
    // any failure up to that point never touches the store. From the first
    // insert onwards all writes live in one transaction and become visible
    // only at commit().
    pub fn run_with_cancel<R: BufRead>(&self, store: &mut ChadoStore,
                                       fields: &HashMap<String, String>, reader: R,
                                       cancel: &CancelToken)
        -> Result<ImportOutcome, ImportError>
    {
        let request = ImportRequest::from_fields(fields)
            .map_err(ImportError::Validation)?;

        let groups = MstMapReader::new(reader)
            .collect::<Result<Vec<_>, _>>()?;
        if groups.is_empty() {
            return Err(ImportError::EmptyMap);
        }
        debug!(groups = groups.len(), "parsed linkage groups");

        if cancel.is_cancelled() {
            return Err(ImportError::Cancelled);
        }

        let tx = store.transaction()?;

        let metadata = Resolver::new(&tx, &self.config).resolve(&request)?;

        let outcome = MapLoader::new(&tx, &self.config)
            .load(&request, &metadata, &groups, cancel)?;

        if cancel.is_cancelled() {
            return Err(ImportError::Cancelled);
        }

        tx.commit()?;

        info!(featuremap_id = outcome.featuremap_id,
              analysis_id = outcome.analysis_id,
              groups = outcome.group_count,
              markers = outcome.marker_count,
              "imported map {:?}", request.featuremap_name.as_str());

        Ok(outcome)
    }
}
