use rusqlite::Connection;

// The subset of the chado schema the importer touches. Column names and
// natural keys follow chado; types are the SQLite equivalents. The UNIQUE
// constraint on featuremap.name is what turns a concurrent duplicate import
// into a constraint failure instead of a race.
const CHADO_TABLE_DDL: &[&str] = &[
    "CREATE TABLE organism (
        organism_id   INTEGER PRIMARY KEY,
        genus         TEXT NOT NULL,
        species       TEXT NOT NULL,
        abbreviation  TEXT,
        common_name   TEXT,
        UNIQUE (genus, species)
     )",
    "CREATE TABLE cv (
        cv_id  INTEGER PRIMARY KEY,
        name   TEXT NOT NULL UNIQUE
     )",
    "CREATE TABLE cvterm (
        cvterm_id   INTEGER PRIMARY KEY,
        cv_id       INTEGER NOT NULL REFERENCES cv (cv_id),
        name        TEXT NOT NULL,
        definition  TEXT,
        UNIQUE (cv_id, name)
     )",
    "CREATE TABLE feature (
        feature_id   INTEGER PRIMARY KEY,
        organism_id  INTEGER NOT NULL REFERENCES organism (organism_id),
        type_id      INTEGER NOT NULL REFERENCES cvterm (cvterm_id),
        uniquename   TEXT NOT NULL,
        name         TEXT,
        UNIQUE (organism_id, uniquename, type_id)
     )",
    "CREATE TABLE featuremap (
        featuremap_id  INTEGER PRIMARY KEY,
        name           TEXT NOT NULL UNIQUE,
        description    TEXT,
        unittype_id    INTEGER NOT NULL REFERENCES cvterm (cvterm_id)
     )",
    "CREATE TABLE featuremapprop (
        featuremapprop_id  INTEGER PRIMARY KEY,
        featuremap_id      INTEGER NOT NULL REFERENCES featuremap (featuremap_id),
        type_id            INTEGER NOT NULL REFERENCES cvterm (cvterm_id),
        value              TEXT,
        rank               INTEGER NOT NULL DEFAULT 0,
        UNIQUE (featuremap_id, type_id, rank)
     )",
    "CREATE TABLE featurepos (
        featurepos_id   INTEGER PRIMARY KEY,
        featuremap_id   INTEGER NOT NULL REFERENCES featuremap (featuremap_id),
        feature_id      INTEGER NOT NULL REFERENCES feature (feature_id),
        map_feature_id  INTEGER NOT NULL REFERENCES feature (feature_id),
        mappos          REAL NOT NULL
     )",
    "CREATE TABLE analysis (
        analysis_id     INTEGER PRIMARY KEY,
        name            TEXT,
        description     TEXT,
        program         TEXT NOT NULL,
        programversion  TEXT NOT NULL,
        algorithm       TEXT,
        sourcename      TEXT,
        timeexecuted    TEXT NOT NULL
     )",
    // the featuremap <-> analysis association; see DESIGN.md
    "CREATE TABLE featuremap_analysis (
        featuremap_analysis_id  INTEGER PRIMARY KEY,
        featuremap_id           INTEGER NOT NULL REFERENCES featuremap (featuremap_id),
        analysis_id             INTEGER NOT NULL REFERENCES analysis (analysis_id),
        UNIQUE (featuremap_id, analysis_id)
     )",
];

pub fn make_chado_tables(conn: &mut Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;

    for ddl in CHADO_TABLE_DDL.iter() {
        tx.execute(ddl, ())?;
    }

    tx.commit()?;

    Ok(())
}
