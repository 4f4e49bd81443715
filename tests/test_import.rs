extern crate mstmap_import;

mod util;

use std::io::Cursor;

use mstmap_import::errors::ImportError;
use mstmap_import::import::{CancelToken, MstImporter};
use mstmap_import::mstmap::{parse_linkage_groups, MstParseError};

use util::{make_request_fields, make_test_store, read_map_file, seed_organism};

#[test]
fn test_run_creates_map_and_analysis() {
    let mut store = make_test_store();
    let organism_id = seed_organism(&mut store);
    let fields = make_request_fields("Lazy Map", organism_id);

    let importer = MstImporter::default();
    let outcome = importer
        .run(&mut store, &fields, read_map_file("single_linkage_group_mst.txt"))
        .unwrap();

    assert_eq!(outcome.group_count, 1);
    assert_eq!(outcome.marker_count, 4);

    let tx = store.transaction().unwrap();
    let map = tx.featuremap_by_name("Lazy Map").unwrap()
        .expect("no featuremap record for Lazy Map");
    assert_eq!(map.featuremap_id, outcome.featuremap_id);
    assert_eq!(tx.cvterm_name(map.unittype_id).unwrap().unwrap(), "cM");
    assert_eq!(tx.featuremapprop_value(map.featuremap_id, "map_type").unwrap().unwrap(),
               "linkage");
    assert_eq!(tx.analysis_count("MSTmap").unwrap(), 1);
    assert_eq!(tx.analyses_for_map(map.featuremap_id).unwrap(),
               vec![outcome.analysis_id]);
}

#[test]
fn test_optional_fields_become_map_properties() {
    let mut store = make_test_store();
    let organism_id = seed_organism(&mut store);
    let mut fields = make_request_fields("Detailed Map", organism_id);
    fields.insert("pub_map_name".to_owned(), "Lc 2024 consensus".to_owned());
    fields.insert("pop_type".to_owned(), "F2".to_owned());
    fields.insert("pop_size".to_owned(), "94".to_owned());
    fields.insert("featuremap_description".to_owned(), "an F2 linkage map".to_owned());

    let importer = MstImporter::default();
    let outcome = importer
        .run(&mut store, &fields, read_map_file("single_linkage_group_mst.txt"))
        .unwrap();

    let tx = store.transaction().unwrap();
    let map = tx.featuremap_by_name("Detailed Map").unwrap().unwrap();
    assert_eq!(map.description.as_deref(), Some("an F2 linkage map"));
    assert_eq!(tx.featuremapprop_value(outcome.featuremap_id, "population_type")
               .unwrap().unwrap(), "F2");
    assert_eq!(tx.featuremapprop_value(outcome.featuremap_id, "population_size")
               .unwrap().unwrap(), "94");
    assert_eq!(tx.featuremapprop_value(outcome.featuremap_id, "published_map_name")
               .unwrap().unwrap(), "Lc 2024 consensus");
}

#[test]
fn test_missing_fields_fail_before_the_store_is_touched() {
    let mut store = make_test_store();
    let organism_id = seed_organism(&mut store);
    let mut fields = make_request_fields("No Map", organism_id);
    fields.remove("featuremap_name");
    fields.remove("analysis_program");

    let importer = MstImporter::default();

    let report = importer.validate_and_describe(&fields);
    let mut problem_fields = report.problem_fields();
    problem_fields.sort();
    assert_eq!(problem_fields, vec!["analysis_program", "featuremap_name"]);

    let result = importer.run(&mut store, &fields,
                              Cursor::new("group lg0\nm1 0.0\n"));
    match result {
        Err(ImportError::Validation(report)) => {
            assert_eq!(report.problems.len(), 2);
        }
        other => panic!("expected a validation failure, got {:?}", other),
    }

    let tx = store.transaction().unwrap();
    assert_eq!(tx.featuremap_count("No Map").unwrap(), 0);
    assert_eq!(tx.analysis_count("MSTmap").unwrap(), 0);
}

#[test]
fn test_unknown_organism_creates_nothing() {
    let mut store = make_test_store();
    let fields = make_request_fields("Orphan Map", 4242);

    let importer = MstImporter::default();
    let result = importer.run(&mut store, &fields,
                              read_map_file("single_linkage_group_mst.txt"));

    match result {
        Err(ImportError::ReferenceNotFound(references)) => {
            assert_eq!(references.len(), 1);
            assert_eq!(references[0].field, "organism_organism_id");
            assert_eq!(references[0].value, "4242");
        }
        other => panic!("expected an unresolved organism, got {:?}", other),
    }

    let tx = store.transaction().unwrap();
    assert_eq!(tx.featuremap_count("Orphan Map").unwrap(), 0);
    assert_eq!(tx.analysis_count("MSTmap").unwrap(), 0);
}

#[test]
fn test_duplicate_map_name_is_rejected() {
    let mut store = make_test_store();
    let organism_id = seed_organism(&mut store);
    let fields = make_request_fields("Lazy Map", organism_id);

    let importer = MstImporter::default();
    importer.run(&mut store, &fields,
                 read_map_file("single_linkage_group_mst.txt")).unwrap();

    let result = importer.run(&mut store, &fields,
                              read_map_file("single_linkage_group_mst.txt"));
    match result {
        Err(ImportError::DuplicateMap(name)) => assert_eq!(name, "Lazy Map"),
        other => panic!("expected a duplicate map failure, got {:?}", other),
    }

    let tx = store.transaction().unwrap();
    assert_eq!(tx.featuremap_count("Lazy Map").unwrap(), 1);
}

#[test]
fn test_same_provenance_reuses_the_analysis() {
    let mut store = make_test_store();
    let organism_id = seed_organism(&mut store);
    let importer = MstImporter::default();

    let first = importer
        .run(&mut store, &make_request_fields("Map One", organism_id),
             read_map_file("single_linkage_group_mst.txt"))
        .unwrap();
    let second = importer
        .run(&mut store, &make_request_fields("Map Two", organism_id),
             read_map_file("single_linkage_group_mst.txt"))
        .unwrap();

    assert_ne!(first.featuremap_id, second.featuremap_id);
    assert_eq!(first.analysis_id, second.analysis_id);

    let tx = store.transaction().unwrap();
    assert_eq!(tx.analysis_count("MSTmap").unwrap(), 1);
}

#[test]
fn test_positions_round_trip() {
    let mut store = make_test_store();
    let organism_id = seed_organism(&mut store);
    let fields = make_request_fields("Round Trip Map", organism_id);

    let importer = MstImporter::default();
    let outcome = importer
        .run(&mut store, &fields, read_map_file("two_linkage_groups_mst.txt"))
        .unwrap();

    let parsed = parse_linkage_groups(read_map_file("two_linkage_groups_mst.txt")).unwrap();
    let expected: Vec<(String, String, f64)> = parsed.iter()
        .flat_map(|group| {
            group.positions.iter().map(|position| {
                (group.name.to_string(), position.marker.to_string(), position.position)
            })
        })
        .collect();

    let tx = store.transaction().unwrap();
    let stored: Vec<(String, String, f64)> =
        tx.positions_for_map(outcome.featuremap_id).unwrap().iter()
        .map(|record| {
            (record.linkage_group.to_string(), record.marker.to_string(), record.position)
        })
        .collect();

    assert_eq!(stored, expected);
}

#[test]
fn test_empty_file_is_not_an_importable_map() {
    let mut store = make_test_store();
    let organism_id = seed_organism(&mut store);
    let fields = make_request_fields("Empty Map", organism_id);

    let importer = MstImporter::default();
    let result = importer.run(&mut store, &fields,
                              Cursor::new("; no groups in here\n\n"));

    assert!(matches!(result, Err(ImportError::EmptyMap)));

    let tx = store.transaction().unwrap();
    assert_eq!(tx.featuremap_count("Empty Map").unwrap(), 0);
}

#[test]
fn test_malformed_file_reports_the_offending_line() {
    let mut store = make_test_store();
    let organism_id = seed_organism(&mut store);
    let fields = make_request_fields("Broken Map", organism_id);

    let importer = MstImporter::default();
    let result = importer.run(&mut store, &fields,
                              Cursor::new("group lg0\nm1 zero\n"));

    match result {
        Err(ImportError::MalformedInput(
            MstParseError::InvalidPosition { line_number, token })) => {
            assert_eq!(line_number, 2);
            assert_eq!(token, "zero");
        }
        other => panic!("expected a malformed input failure, got {:?}", other),
    }

    let tx = store.transaction().unwrap();
    assert_eq!(tx.featuremap_count("Broken Map").unwrap(), 0);
}

#[test]
fn test_cancelled_run_leaves_no_trace() {
    let mut store = make_test_store();
    let organism_id = seed_organism(&mut store);
    let fields = make_request_fields("Cancelled Map", organism_id);

    let cancel = CancelToken::new();
    cancel.cancel();

    let importer = MstImporter::default();
    let result = importer.run_with_cancel(
        &mut store, &fields,
        read_map_file("single_linkage_group_mst.txt"), &cancel);

    assert!(matches!(result, Err(ImportError::Cancelled)));

    let tx = store.transaction().unwrap();
    assert_eq!(tx.featuremap_count("Cancelled Map").unwrap(), 0);
    assert_eq!(tx.analysis_count("MSTmap").unwrap(), 0);
}
