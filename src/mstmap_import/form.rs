use std::collections::HashMap;
use std::fmt;

use flexstr::{SharedStr as FlexStr, ToSharedStr};

use crate::types::{MapName, MapTypeName, OrganismId, ProgramName, UnitTypeName};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRule {
    Text,
    Integer,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub rule: FieldRule,
}

// The submission fields, named as the Tripal form hands them over. The
// required set matches the chado columns that cannot be null: analysis
// program and version, the owning organism, and the map's name, type and
// unit type.
pub const SUBMISSION_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "featuremap_name", required: true, rule: FieldRule::Text },
    FieldSpec { name: "pub_map_name", required: false, rule: FieldRule::Text },
    FieldSpec { name: "organism_organism_id", required: true, rule: FieldRule::Integer },
    FieldSpec { name: "featuremap_unittype_name", required: true, rule: FieldRule::Text },
    FieldSpec { name: "map_type", required: true, rule: FieldRule::Text },
    FieldSpec { name: "pop_type", required: false, rule: FieldRule::Text },
    FieldSpec { name: "pop_size", required: false, rule: FieldRule::Integer },
    FieldSpec { name: "analysis_program", required: true, rule: FieldRule::Text },
    FieldSpec { name: "analysis_programversion", required: true, rule: FieldRule::Text },
    FieldSpec { name: "analysis_description", required: false, rule: FieldRule::Text },
    FieldSpec { name: "featuremap_description", required: false, rule: FieldRule::Text },
];

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    NotAnInteger,
}

impl FieldProblem {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldProblem::Missing => "missing",
            FieldProblem::NotAnInteger => "not an integer",
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldStatus {
    pub field: &'static str,
    pub problem: FieldProblem,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub problems: Vec<FieldStatus>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn problem_fields(&self) -> Vec<&'static str> {
        self.problems.iter().map(|status| status.field).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let described = self.problems.iter()
            .map(|status| format!("{} ({})", status.field, status.problem.describe()));
        write!(f, "{}", itertools::join(described, ", "))
    }
}

pub fn validate_submission(values: &HashMap<String, String>) -> ValidationReport {
    let mut problems = vec![];

    for spec in SUBMISSION_FIELDS.iter() {
        let value = values.get(spec.name).map(String::as_str).unwrap_or("").trim();

        if value.is_empty() {
            if spec.required {
                problems.push(FieldStatus {
                    field: spec.name,
                    problem: FieldProblem::Missing,
                });
            }
            continue;
        }

        if spec.rule == FieldRule::Integer && value.parse::<i64>().is_err() {
            problems.push(FieldStatus {
                field: spec.name,
                problem: FieldProblem::NotAnInteger,
            });
        }
    }

    ValidationReport { problems }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ImportRequest {
    pub featuremap_name: MapName,
    pub pub_map_name: Option<FlexStr>,
    pub organism_id: OrganismId,
    pub unittype_name: UnitTypeName,
    pub map_type: MapTypeName,
    pub pop_type: Option<FlexStr>,
    pub pop_size: Option<i64>,
    pub analysis_program: ProgramName,
    pub analysis_programversion: FlexStr,
    pub analysis_description: Option<FlexStr>,
    pub featuremap_description: Option<FlexStr>,
}

impl ImportRequest {
    pub fn from_fields(values: &HashMap<String, String>)
        -> Result<ImportRequest, ValidationReport>
    {
        let report = validate_submission(values);
        if !report.is_ok() {
            return Err(report);
        }

        let get = |name: &str| {
            values.get(name).map(|value| value.trim()).filter(|value| !value.is_empty())
        };

        // validate_submission() has checked presence and integer syntax
        Ok(ImportRequest {
            featuremap_name: get("featuremap_name").unwrap_or("").to_shared_str(),
            pub_map_name: get("pub_map_name").map(ToSharedStr::to_shared_str),
            organism_id: get("organism_organism_id")
                .and_then(|value| value.parse().ok()).unwrap_or(0),
            unittype_name: get("featuremap_unittype_name").unwrap_or("").to_shared_str(),
            map_type: get("map_type").unwrap_or("").to_shared_str(),
            pop_type: get("pop_type").map(ToSharedStr::to_shared_str),
            pop_size: get("pop_size").and_then(|value| value.parse().ok()),
            analysis_program: get("analysis_program").unwrap_or("").to_shared_str(),
            analysis_programversion: get("analysis_programversion").unwrap_or("").to_shared_str(),
            analysis_description: get("analysis_description").map(ToSharedStr::to_shared_str),
            featuremap_description: get("featuremap_description").map(ToSharedStr::to_shared_str),
        })
    }
}

#[cfg(test)]
fn fields_from(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(name, value)| (name.to_string(), value.to_string())).collect()
}

#[test]
fn test_validate_all_required_present() {
    let fields = fields_from(&[
        ("featuremap_name", "Map 1"),
        ("organism_organism_id", "1"),
        ("featuremap_unittype_name", "cM"),
        ("map_type", "linkage"),
        ("analysis_program", "MSTmap"),
        ("analysis_programversion", "unknown"),
    ]);
    assert!(validate_submission(&fields).is_ok());
}

#[test]
fn test_validate_reports_every_missing_field() {
    let report = validate_submission(&HashMap::new());
    let mut missing = report.problem_fields();
    missing.sort();
    assert_eq!(missing,
               vec!["analysis_program", "analysis_programversion",
                    "featuremap_name", "featuremap_unittype_name",
                    "map_type", "organism_organism_id"]);
}

#[test]
fn test_validate_blank_counts_as_missing() {
    let fields = fields_from(&[("featuremap_name", "   ")]);
    let report = validate_submission(&fields);
    assert!(report.problem_fields().contains(&"featuremap_name"));
}

#[test]
fn test_validate_integer_rule() {
    let mut fields = fields_from(&[
        ("featuremap_name", "Map 1"),
        ("organism_organism_id", "one"),
        ("featuremap_unittype_name", "cM"),
        ("map_type", "linkage"),
        ("analysis_program", "MSTmap"),
        ("analysis_programversion", "unknown"),
    ]);
    fields.insert("pop_size".to_string(), "ninety".to_string());

    let report = validate_submission(&fields);
    let mut bad = report.problem_fields();
    bad.sort();
    assert_eq!(bad, vec!["organism_organism_id", "pop_size"]);
    assert!(report.problems.iter()
            .all(|status| status.problem == FieldProblem::NotAnInteger));
}

#[test]
fn test_request_from_fields() {
    let fields = fields_from(&[
        ("featuremap_name", "Map 1"),
        ("organism_organism_id", "7"),
        ("featuremap_unittype_name", "cM"),
        ("map_type", "linkage"),
        ("pop_size", "94"),
        ("analysis_program", "MSTmap"),
        ("analysis_programversion", "unknown"),
    ]);
    let request = ImportRequest::from_fields(&fields).unwrap();
    assert_eq!(request.featuremap_name, "Map 1");
    assert_eq!(request.organism_id, 7);
    assert_eq!(request.pop_size, Some(94));
    assert_eq!(request.pub_map_name, None);
}
