//! End-to-end reporting tests over a loaded store.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;

use labtrack_core::db::Database;
use labtrack_core::ingest::{load_persons, load_tests, LoadOptions};
use labtrack_core::kpi::{AggOp, KpiError, PersonField, Reports, SortOrder, TestField};
use labtrack_core::models::{Category, LabResult, LabTest};
use labtrack_core::query;

const PERSON_HEADER: &str = "id,nombre,apellidos,gender,fnac,telefono,rol,especialidad";
const TEST_HEADER: &str =
    "nombre,fecha,estado,observaciones,calificacion,categoria_id,cliente_id,personal_id";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

/// A store with two clients, two staff, one category, and a spread of tests
/// loaded through the real upload path.
fn setup_loaded_db() -> Database {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_category(&Category {
        id: Some(1),
        name: "PCR".into(),
    })
    .unwrap();

    let persons = format!(
        "{}\n1,Ana,Pérez,female,04/20/1992,555,cliente,\n2,Juan,Mora,male,02/02/1988,555,cliente,\n3,Marta,Soto,female,08/09/1980,555,personal,\n4,Luis,Vega,male,03/03/1979,555,personal,\n",
        PERSON_HEADER
    );
    load_persons(&mut db, "personas.csv", persons.as_bytes()).unwrap();
    // Store-assigned ids: Ana 1, Juan 2, Marta 3, Luis 4

    let tests = format!(
        "{}\nPrueba COVID,06/10/2024,entregado,N/a,8,1,1,3\nPrueba COVID,06/14/2024,entregado,N/a,9,1,1,3\nPrueba COVID,06/15/2024,pendiente,N/a,7,1,1,4\nHemograma,06/15/2024,pendiente,N/a,6,1,2,3\nHemograma,03/05/2024,entregado,N/a,10,1,2,4\n",
        TEST_HEADER
    );
    let mut rng = StdRng::seed_from_u64(99);
    load_tests(
        &mut db,
        "tests.csv",
        tests.as_bytes(),
        &LoadOptions::default(),
        &mut rng,
    )
    .unwrap();

    db
}

#[test]
fn test_monthly_volume_shape() {
    let db = setup_loaded_db();
    let series = Reports::new(&db).monthly_volume(today()).unwrap();

    assert_eq!(series.len(), 12);
    // All five loaded tests are in 2024: four in June, one in March
    assert_eq!(series.data[5], 4.0);
    assert_eq!(series.data[2], 1.0);
    assert_eq!(series.total(), db.count_tests().unwrap() as f64);
    assert_eq!(series.labels[5], "Junio");
}

#[test]
fn test_weekly_volume_shape() {
    let db = setup_loaded_db();
    let series = Reports::new(&db).weekly_volume(today()).unwrap();

    assert_eq!(series.len(), 7);
    assert_eq!(series.labels[0], "2024-06-09");
    assert_eq!(series.labels[6], "2024-06-15");
    // 06-10, 06-14, and the two 06-15 rows fall in the window
    assert_eq!(series.total(), 4.0);
}

#[test]
fn test_weekly_volume_by_name_covers_all_names() {
    let db = setup_loaded_db();
    let multi = Reports::new(&db).weekly_volume_by_name(today()).unwrap();

    assert_eq!(multi.labels.len(), 7);
    let labels: Vec<&str> = multi.datasets.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Prueba COVID", "Hemograma"]);

    // Every dataset is zero-filled to the full window width
    for dataset in &multi.datasets {
        assert_eq!(dataset.data.len(), 7);
    }
}

#[test]
fn test_share_by_name_percentages() {
    let db = setup_loaded_db();
    let series = Reports::new(&db).share_by_name().unwrap();

    assert!((series.total() - 100.0).abs() < 1e-9);
    assert_eq!(series.labels, vec!["Prueba COVID", "Hemograma"]);
    assert_eq!(series.data, vec![60.0, 40.0]);
}

#[test]
fn test_share_is_all_zero_on_empty_store() {
    let db = Database::open_in_memory().unwrap();
    let series = Reports::new(&db).share_by_name().unwrap();
    assert!(series.data.iter().all(|&v| v == 0.0));

    // Averages degrade to 0 as well, never an error
    assert_eq!(Reports::new(&db).average_rating().unwrap(), 0.0);
    let split = Reports::new(&db).average_rating_by_sex().unwrap();
    assert_eq!((split.masculine, split.feminine), (0.0, 0.0));
}

#[test]
fn test_average_rating_split() {
    let db = setup_loaded_db();
    let reports = Reports::new(&db);

    // (8 + 9 + 7 + 6 + 10) / 5 = 8.0
    assert_eq!(reports.average_rating().unwrap(), 8.0);

    let split = reports.average_rating_by_sex().unwrap();
    // Ana (femenino): 8, 9, 7 -> 8.0; Juan (masculino): 6, 10 -> 8.0
    assert_eq!(split.feminine, 8.0);
    assert_eq!(split.masculine, 8.0);
}

#[test]
fn test_turnaround_whole_days() {
    let db = setup_loaded_db();
    let series = Reports::new(&db).turnaround_by_name().unwrap();

    assert_eq!(series.labels, vec!["Hemograma", "Prueba COVID"]);
    for value in &series.data {
        assert_eq!(value.fract(), 0.0, "turnaround must be whole days");
        assert!(*value >= 0.0);
    }
}

#[test]
fn test_rankings() {
    let db = setup_loaded_db();
    let reports = Reports::new(&db);

    let top = reports.top_requested(5).unwrap();
    assert_eq!(top.labels[0], "Prueba COVID");
    assert_eq!(top.data[0], 3.0);

    let bottom = reports.least_requested(5).unwrap();
    assert_eq!(bottom.labels[0], "Hemograma");
}

#[test]
fn test_age_buckets() {
    let db = setup_loaded_db();
    let series = Reports::new(&db).tests_by_age(today()).unwrap();

    // Ana is 32 (3 tests), Juan 36 (2 tests); range zero-filled between
    assert_eq!(series.labels.first().map(String::as_str), Some("32"));
    assert_eq!(series.labels.last().map(String::as_str), Some("36"));
    assert_eq!(series.len(), 5);
    assert_eq!(series.total(), 5.0);
    assert_eq!(series.data[1], 0.0);
}

#[test]
fn test_grouped_by_field_and_rejection() {
    let db = setup_loaded_db();
    let reports = Reports::new(&db);

    let by_status = reports
        .tests_grouped_by_field(TestField::resolve("estado").unwrap())
        .unwrap();
    assert_eq!(by_status.labels, vec!["entregado", "pendiente"]);
    assert_eq!(by_status.data, vec![3.0, 2.0]);

    let err = TestField::resolve("no_such_field").unwrap_err();
    match err {
        KpiError::UnknownField { entity, name } => {
            assert_eq!(entity, "test");
            assert_eq!(name, "no_such_field");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_adhoc_gateway_contract() {
    let db = setup_loaded_db();
    let reports = Reports::new(&db);

    // sum counts rows per group
    let by_role = reports
        .adhoc_person_query(
            PersonField::resolve("rol").unwrap(),
            AggOp::resolve("sum").unwrap(),
            SortOrder::parse_lenient("asc"),
        )
        .unwrap();
    assert_eq!(by_role.data, vec![2.0, 2.0]);

    // avg over a text-valued field is rejected at validation
    let err = reports
        .adhoc_person_query(
            PersonField::resolve("sexo").unwrap(),
            AggOp::resolve("avg").unwrap(),
            SortOrder::parse_lenient("desc"),
        )
        .unwrap_err();
    assert!(matches!(err, KpiError::NonNumericField(_)));

    // unknown operations never reach the store
    assert!(matches!(
        AggOp::resolve("median"),
        Err(KpiError::InvalidOperation(_))
    ));
}

#[test]
fn test_collaborator_boundary_over_loaded_store() {
    let db = setup_loaded_db();

    let output = query::execute_query(
        &db,
        "SELECT name, COUNT(*) FROM lab_tests GROUP BY name ORDER BY name",
    )
    .unwrap();
    assert_eq!(output.rows.len(), 2);
    assert_eq!(output.rows[0][0], serde_json::json!("Hemograma"));

    // Mutations are rejected and the store is untouched
    assert!(query::execute_query(&db, "DELETE FROM lab_tests").is_err());
    assert_eq!(db.count_tests().unwrap(), 5);

    // The lenient wrapper degrades to empty output
    assert!(query::execute_query_or_empty(&db, "DROP TABLE lab_tests").is_empty());
}

#[test]
fn test_delivery_invariant_holds_for_directly_built_rows() {
    // The schema itself enforces delivery >= requested even when rows skip
    // the loader.
    let mut db = setup_loaded_db();
    let requested = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let test = LabTest {
        id: None,
        name: "Manual".into(),
        requested_date: requested,
        delivery_date: requested - Duration::days(1),
        status: "pendiente".into(),
        observations: None,
        rating: 5,
        category_id: None,
        client_id: 1,
        staff_id: 3,
    };
    let result = LabResult {
        id: None,
        test_id: None,
        result: "Indeterminado".into(),
        date: requested,
        observations: None,
        interpretation: "No se pudo interpretar el resultado".into(),
        details: "Datos insuficientes para el análisis.".into(),
        image_path: None,
    };
    assert!(db.insert_test_with_result(&test, &result).is_err());
}
