mod test_support;

use serde_json::json;
use test_support::{open_workspace, request_err, request_ok, seed_dataset, spawn_sidecar, temp_dir};

#[test]
fn query_test_returns_rows_and_canonical_form() {
    let (mut child, mut stdin, mut reader, _ws) = open_workspace("sqltester-query-test");

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "query.test",
        json!({ "sql": "SELECT name, dept FROM employees WHERE salary < 100 ORDER BY id" }),
    );
    assert_eq!(r["columns"], json!(["name", "dept"]));
    assert_eq!(r["rowCount"], json!(2));
    assert_eq!(r["rows"], json!([["Bob", "ops"], ["Dee", null]]));
    assert_eq!(r["canonical"], json!("Bob\tops\nDee"));

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "query.test",
        json!({ "sql": "SELECT name FROM employees WHERE 0" }),
    );
    assert_eq!(r["rowCount"], json!(0));
    assert_eq!(r["canonical"], json!(""));

    let (code, error) = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "query.test",
        json!({ "sql": "SELECT * FROM nowhere" }),
    );
    assert_eq!(code, "query_failed");
    assert!(error["message"].as_str().unwrap_or("").contains("nowhere"));

    let (code, _) = request_err(&mut stdin, &mut reader, "4", "query.test", json!({ "sql": "" }));
    assert_eq!(code, "bad_params");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn dataset_path_can_live_outside_the_workspace() {
    let workspace = temp_dir("sqltester-query-ws");
    let dataset = temp_dir("sqltester-query-dataset").join("practice.db");
    seed_dataset(&dataset);

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({
            "path": workspace.to_string_lossy(),
            "datasetPath": dataset.to_string_lossy()
        }),
    );
    assert_eq!(selected["datasetPresent"], json!(true));

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "query.test",
        json!({ "sql": "SELECT COUNT(*) FROM employees" }),
    );
    assert_eq!(r["canonical"], json!("4"));

    drop(stdin);
    let _ = child.wait();
}
