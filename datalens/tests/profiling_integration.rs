//! End-to-end profiling: load, summarize, classify and generate insights.

use datalens::analyzers::{ColumnClassification, DatasetProfiler};
use datalens::config::InsightConfig;
use datalens::insights::InsightEngine;
use datalens::sources::{DataLoader, SourceInput};

const CUSTOMERS_CSV: &str = "\
age,city,signup
23,Paris,2024-01-01
35,Lyon,2024-01-02
41,Nice,2024-01-03
29,Paris,2024-01-04
52,Lyon,2024-01-05
38,Nice,2024-01-06
27,Paris,2024-01-07
45,Lyon,2024-01-08
33,Nice,2024-01-09
60,Paris,2024-01-10
";

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_customer_scenario() {
    let dataset = DataLoader::default()
        .load(SourceInput::bytes("customers.csv", CUSTOMERS_CSV.as_bytes().to_vec()))
        .unwrap();
    let summary = DatasetProfiler::default().summarize(&dataset).unwrap();

    assert_eq!(summary.row_count, 10);
    assert_eq!(summary.column_count, 3);
    assert_eq!(summary.missing_total, 0);
    assert_eq!(summary.duplicate_rows, 0);
    assert_eq!(
        summary.column_types,
        ColumnClassification {
            numeric: names(&["age"]),
            categorical: names(&["city"]),
            datetime: names(&["signup"]),
            unclassified: Vec::new(),
        }
    );

    let insights = InsightEngine::default()
        .generate_all(&dataset, &summary)
        .unwrap();
    let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();
    assert!(titles.contains(&"Excellent Data Quality"));
    assert!(titles.contains(&"Time Series Analysis Possible"));
    assert!(!titles.contains(&"Correlation Analysis Recommended"));
}

#[test]
fn test_csv_round_trip_keeps_summary() {
    let loader = DataLoader::default();
    let csv = "id,score,team,note\n1,3.5,red,\n2,,blue,late\n3,4.5,red,\n1,3.5,red,\n";
    let original = loader
        .load(SourceInput::bytes("scores.csv", csv.as_bytes().to_vec()))
        .unwrap();

    let mut exported = Vec::new();
    original.write_csv(&mut exported).unwrap();
    let reloaded = loader
        .load(SourceInput::bytes("scores.csv", exported))
        .unwrap();

    let profiler = DatasetProfiler::default();
    let before = profiler.summarize(&original).unwrap();
    let after = profiler.summarize(&reloaded).unwrap();

    assert_eq!(after.row_count, before.row_count);
    assert_eq!(after.column_count, before.column_count);
    assert_eq!(after.missing_total, before.missing_total);
    assert_eq!(after.duplicate_rows, before.duplicate_rows);
    assert_eq!(after.column_types, before.column_types);
    assert_eq!(before.missing_total, 4);
    assert_eq!(before.duplicate_rows, 1);
}

#[test]
fn test_high_cardinality_text_is_unclassified() {
    let mut csv = String::from("id,comment\n");
    for i in 0..60 {
        csv.push_str(&format!("{i},comment number {i}\n"));
    }
    let dataset = DataLoader::default()
        .load(SourceInput::bytes("comments.csv", csv.into_bytes()))
        .unwrap();

    let summary = DatasetProfiler::default().summarize(&dataset).unwrap();
    assert_eq!(summary.column_types.numeric, names(&["id"]));
    assert_eq!(summary.column_types.unclassified, names(&["comment"]));

    let wider = DatasetProfiler::builder().max_categories(100).build();
    let summary = wider.summarize(&dataset).unwrap();
    assert_eq!(summary.column_types.categorical, names(&["comment"]));
}

#[test]
fn test_header_only_file() {
    let dataset = DataLoader::default()
        .load(SourceInput::bytes("empty.csv", b"a,b,c\n".to_vec()))
        .unwrap();
    let summary = DatasetProfiler::default().summarize(&dataset).unwrap();

    assert_eq!(summary.row_count, 0);
    assert_eq!(summary.column_count, 3);
    assert_eq!(summary.missing_percentage(), 0.0);
    assert_eq!(summary.duplicate_percentage(), 0.0);

    let titles: Vec<String> = InsightEngine::default()
        .generate_all(&dataset, &summary)
        .unwrap()
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(titles[0], "Excellent Data Quality");
    assert!(titles.contains(&"Small Dataset".to_string()));
}

#[test]
fn test_missing_values_and_details() {
    let csv = "a,b,c\n1,,x\n2,,\n3,4,y\n";
    let dataset = DataLoader::default()
        .load(SourceInput::bytes("gaps.csv", csv.as_bytes().to_vec()))
        .unwrap();
    let profiler = DatasetProfiler::from_config(&InsightConfig::default());

    let report = profiler.missing_values(&dataset);
    let columns: Vec<&str> = report.entries.iter().map(|e| e.column.as_str()).collect();
    assert_eq!(columns, vec!["b", "c"]);
    assert_eq!(report.entries[0].missing_count, 2);

    let details = profiler.column_details(&dataset).unwrap();
    assert_eq!(details[0].unique_count, 3);
    assert_eq!(details[0].null_count, 0);
    assert_eq!(details[1].non_null_count, 1);
}
