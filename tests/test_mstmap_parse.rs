extern crate mstmap_import;

mod util;

use mstmap_import::mstmap::{parse_linkage_groups, MstMapReader, MstParseError};
use util::read_map_file;

#[test]
fn test_parse_single_group_file() {
    let groups = parse_linkage_groups(read_map_file("single_linkage_group_mst.txt")).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "lg0");

    let markers: Vec<&str> = groups[0].positions.iter()
        .map(|position| position.marker.as_str())
        .collect();
    assert_eq!(markers, vec!["m1", "m2", "m3", "m4"]);
    assert_eq!(groups[0].positions[0].position, 0.0);
    assert_eq!(groups[0].positions[3].position, 12.274);
}

#[test]
fn test_parse_two_group_file() {
    let groups = parse_linkage_groups(read_map_file("two_linkage_groups_mst.txt")).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "lg0");
    assert_eq!(groups[0].positions.len(), 3);
    assert_eq!(groups[1].name, "lg1");
    assert_eq!(groups[1].positions.len(), 4);

    // equal neighbouring positions are allowed, the order is non-decreasing
    assert_eq!(groups[1].positions[1].position, groups[1].positions[2].position);
}

#[test]
fn test_parsing_is_deterministic() {
    let first = parse_linkage_groups(read_map_file("two_linkage_groups_mst.txt")).unwrap();
    let second = parse_linkage_groups(read_map_file("two_linkage_groups_mst.txt")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_groups_arrive_lazily() {
    let mut reader = MstMapReader::new(read_map_file("two_linkage_groups_mst.txt"));

    let first = reader.next().unwrap().unwrap();
    assert_eq!(first.name, "lg0");
    let second = reader.next().unwrap().unwrap();
    assert_eq!(second.name, "lg1");
    assert!(reader.next().is_none());
    // non-restartable: the sequence stays finished
    assert!(reader.next().is_none());
}

#[test]
fn test_bad_position_cites_the_line() {
    let text = "group lg0\nm1\t0.0\nm2\ttwelve\n";
    let err = parse_linkage_groups(std::io::Cursor::new(text)).unwrap_err();

    match err {
        MstParseError::InvalidPosition { line_number, token } => {
            assert_eq!(line_number, 3);
            assert_eq!(token, "twelve");
        }
        other => panic!("expected InvalidPosition, got: {}", other),
    }
}
