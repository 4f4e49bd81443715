use flexstr::SharedStr as FlexStr;

pub type MarkerName = FlexStr;
pub type LinkageGroupName = FlexStr;
pub type MapName = FlexStr;
pub type MapTypeName = FlexStr;
pub type UnitTypeName = FlexStr;
pub type CvName = FlexStr;
pub type ProgramName = FlexStr;

pub type OrganismId = i64;
pub type CvId = i64;
pub type CvtermId = i64;
pub type FeatureId = i64;
pub type FeatureMapId = i64;
pub type AnalysisId = i64;
