//! Questions over a lab staff directory.
//!
//! Each line of the directory describes one person with 8 `;` separated
//! fields: name, phone, office, organization, position, hdr, team1, team2.
//! `hdr` is the only boolean column, true when the person holds a
//! habilitation. A person without a second team has the sentinel `NA` in
//! `team2`.

use std::path::Path;

use crate::{
    common::error::Result,
    core::types::{DataType, Value},
    expr::{col, lit},
    frame::{
        column_def::ColumnDef,
        dataframe::{DataFrame, GroupedResult, count_ratio},
        schema::Schema,
    },
    plan::logical::{JoinType, count},
    session::Session,
};

pub const COLUMNS: [&str; 8] = [
    "name",
    "phone",
    "office",
    "organization",
    "position",
    "hdr",
    "team1",
    "team2",
];

pub fn schema() -> Schema {
    COLUMNS
        .iter()
        .map(|&name| {
            let data_type = if name == "hdr" {
                DataType::Bool
            } else {
                DataType::Text
            };
            ColumnDef::new(name, data_type, false)
        })
        .collect()
}

/// Loads a directory file with the session's delimiter and header settings.
pub fn load(session: &Session, path: impl AsRef<Path>) -> Result<DataFrame> {
    session.read_delimited(path, schema())
}

/// Name and first team of everyone in R2.
pub fn r2_members(people: &DataFrame) -> Result<DataFrame> {
    people
        .filter(col("organization").eq("R2"))?
        .select(&["name", "team1"])
}

pub fn r2_by_position(people: &DataFrame) -> Result<DataFrame> {
    people
        .filter(col("organization").eq("R2"))?
        .select(&["name", "position"])?
        .order_by("position", true)
}

pub fn count_by_hdr(people: &DataFrame) -> Result<GroupedResult> {
    people.group_by("hdr")?.count()
}

pub fn hdr_count(people: &DataFrame) -> Result<usize> {
    people.filter(col("hdr"))?.count()
}

pub fn people_per_organization(people: &DataFrame) -> Result<GroupedResult> {
    people.select(&["organization"])?.group_by("organization")?.count()
}

pub fn insa_staff(people: &DataFrame) -> Result<usize> {
    people
        .select(&["organization"])?
        .filter(col("organization").eq("INSA"))?
        .count()
}

/// Lecturers (MC) with STAT as first or second team.
pub fn stat_lecturers(people: &DataFrame) -> Result<usize> {
    people
        .select(&["position", "team1", "team2"])?
        .filter(col("team1").eq("STAT") | col("team2").eq("STAT"))?
        .filter(col("position").eq("MC"))?
        .count()
}

pub fn hdr_lecturers_and_researchers(people: &DataFrame) -> Result<usize> {
    people
        .select(&["position", "hdr"])?
        .filter(col("position").eq("MC") | col("position").eq("CR"))?
        .filter(col("hdr"))?
        .count()
}

/// Doctoral students per habilitation holder.
pub fn supervision_ratio(people: &DataFrame) -> Result<f64> {
    let students = people
        .select(&["position"])?
        .filter(col("position").eq("DOC"))?;
    let supervisors = people.select(&["hdr"])?.filter(col("hdr"))?;

    count_ratio(&students, &supervisors)
}

fn teams_of(people: &DataFrame, sentinel: &str) -> Result<Vec<(Value, i64)>> {
    people
        .select(&["team1", "team2"])?
        .value_counts(&["team1", "team2"], &[Value::from(sentinel)])
}

/// Habilitation holders per team, counting both team columns.
pub fn hdr_per_team(people: &DataFrame, sentinel: &str) -> Result<Vec<(Value, i64)>> {
    teams_of(&people.filter(col("hdr"))?, sentinel)
}

pub fn doc_per_team(people: &DataFrame, sentinel: &str) -> Result<Vec<(Value, i64)>> {
    teams_of(&people.filter(col("position").eq("DOC"))?, sentinel)
}

pub fn doc_per_organization(people: &DataFrame) -> Result<GroupedResult> {
    people
        .filter(col("position").eq("DOC"))?
        .group_by("organization")?
        .count()
}

/// The first entry of a sorted value count.
pub fn team_with_most(counts: &[(Value, i64)]) -> Option<&Value> {
    counts.first().map(|(team, _)| team)
}

/// Habilitation holders per first team, joined with the second team counts.
///
/// Columns are `team1`, `count1`, `count2` and `total`, highest total first.
/// Teams that never appear as a second team get `count2 = 0`.
pub fn hdr_team_totals(people: &DataFrame, sentinel: &str) -> Result<DataFrame> {
    let first = people
        .select(&["position", "team1", "hdr"])?
        .filter(col("hdr"))?
        .group_by("team1")?
        .agg(&[count("position").alias("count1")])?
        .into_frame();
    let second = people
        .select(&["position", "team2", "hdr"])?
        .filter(col("hdr"))?
        .filter(col("team2").not_eq(lit(sentinel)))?
        .group_by("team2")?
        .agg(&[count("team2").alias("count2")])?
        .into_frame();

    first
        .join(&second, "team1", "team2", JoinType::Left)?
        .fill_null(0)?
        .drop(&["team2"])?
        .with_column("total", col("count1") + col("count2"))?
        .order_by("total", false)
}

pub fn ananum_students(people: &DataFrame) -> Result<DataFrame> {
    people
        .filter(col("position").eq("DOC") & col("team1").eq("ANANUM"))?
        .select(&["name"])
}

/// Research directors and researchers (DR, CR).
pub fn researchers(people: &DataFrame) -> Result<DataFrame> {
    people
        .select(&["name", "organization", "position"])?
        .filter(col("position").eq("DR") | col("position").eq("CR"))
}

/// CNRS staff who are neither DR nor CR, counted by position.
pub fn cnrs_staff_by_position(people: &DataFrame) -> Result<GroupedResult> {
    people
        .select(&["name", "organization", "position"])?
        .filter(col("organization").eq("CNRS"))?
        .filter(col("position").not_eq("DR") & col("position").not_eq("CR"))?
        .group_by("position")?
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FrameError, SessionConfig};

    const SAMPLE: &str = "\
Ada Lune;+3300;101;R2;MC;True;STAT;NA
Bo Rive;+3301;102;R2;DOC;False;STAT;GA
Cy Mont;+3302;103;INSA;PR;True;GA;STAT
Di Val;+3303;104;CNRS;DR;True;EDP;NA
Eli Pont;+3304;105;CNRS;IE;False;EDP;NA
Fa Roc;+3305;106;R1;DOC;False;ANANUM;NA
";

    fn people() -> DataFrame {
        Session::new(SessionConfig::default())
            .read_delimited_str(SAMPLE, schema())
            .unwrap()
    }

    #[test]
    fn test_schema() {
        let schema = schema();
        assert_eq!(schema.len(), 8);
        assert_eq!(schema.columns[5].data_type, DataType::Bool);
        assert_eq!(schema.columns[7].data_type, DataType::Text);
    }

    #[test]
    fn test_r2_queries() {
        let members = r2_members(&people()).unwrap().collect().unwrap();
        assert_eq!(
            members.column_values("name").unwrap(),
            vec![Value::from("Ada Lune"), Value::from("Bo Rive")]
        );

        let ordered = r2_by_position(&people()).unwrap().collect().unwrap();
        assert_eq!(
            ordered.column_values("position").unwrap(),
            vec![Value::from("DOC"), Value::from("MC")]
        );
    }

    #[test]
    fn test_counts() {
        let people = people();
        assert_eq!(hdr_count(&people).unwrap(), 3);
        assert_eq!(insa_staff(&people).unwrap(), 1);
        assert_eq!(stat_lecturers(&people).unwrap(), 1);
        assert_eq!(hdr_lecturers_and_researchers(&people).unwrap(), 1);

        let by_hdr = count_by_hdr(&people).unwrap().collect_map().unwrap();
        assert_eq!(by_hdr[&Value::Bool(true)], Value::Int64(3));
        assert_eq!(by_hdr[&Value::Bool(false)], Value::Int64(3));
    }

    #[test]
    fn test_supervision_ratio() {
        let ratio = supervision_ratio(&people()).unwrap();
        assert!((ratio - 2.0 / 3.0).abs() < 1e-12);

        let nobody = people().filter(col("hdr").is_false()).unwrap();
        assert!(matches!(
            supervision_ratio(&nobody),
            Err(FrameError::DivisionByZero)
        ));
    }

    #[test]
    fn test_per_team() {
        let hdr = hdr_per_team(&people(), "NA").unwrap();
        assert_eq!(
            hdr,
            vec![
                (Value::from("STAT"), 2),
                (Value::from("EDP"), 1),
                (Value::from("GA"), 1)
            ]
        );
        assert_eq!(team_with_most(&hdr), Some(&Value::from("STAT")));

        let doc = doc_per_team(&people(), "NA").unwrap();
        assert_eq!(
            doc,
            vec![
                (Value::from("ANANUM"), 1),
                (Value::from("GA"), 1),
                (Value::from("STAT"), 1)
            ]
        );
        assert_eq!(team_with_most(&[]), None);
    }

    #[test]
    fn test_hdr_team_totals() {
        let totals = hdr_team_totals(&people(), "NA").unwrap();
        assert_eq!(
            totals.schema().names().collect::<Vec<_>>(),
            vec!["team1", "count1", "count2", "total"]
        );
        let rows = totals.collect().unwrap();
        assert_eq!(
            rows.column_values("team1").unwrap(),
            vec![Value::from("STAT"), Value::from("GA"), Value::from("EDP")]
        );
        assert_eq!(
            rows.column_values("total").unwrap(),
            vec![Value::Int64(2), Value::Int64(1), Value::Int64(1)]
        );
    }

    #[test]
    fn test_lists() {
        let students = ananum_students(&people()).unwrap().collect().unwrap();
        assert_eq!(
            students.column_values("name").unwrap(),
            vec![Value::from("Fa Roc")]
        );

        assert_eq!(researchers(&people()).unwrap().count().unwrap(), 1);

        let cnrs = cnrs_staff_by_position(&people())
            .unwrap()
            .collect_map()
            .unwrap();
        assert_eq!(cnrs.len(), 1);
        assert_eq!(cnrs[&Value::from("IE")], Value::Int64(1));

        let per_org = people_per_organization(&people())
            .unwrap()
            .collect_map()
            .unwrap();
        assert_eq!(per_org[&Value::from("CNRS")], Value::Int64(2));

        let doc_org = doc_per_organization(&people())
            .unwrap()
            .collect_map()
            .unwrap();
        assert_eq!(doc_org[&Value::from("R1")], Value::Int64(1));
    }
}
