use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crmkit_api_client::ApiClient;
use crmkit_core::{Credential, ErrorMetadata, NoOpNotifier, PipelineError};
use crmkit_import::{
    render_template, BulkSubmitter, CsvBatch, ImportProfile, ImportSession, CUSTOMERS, LEADS,
    USER_LEADS,
};
use mockito::Matcher;

fn customers_csv(rows: usize) -> String {
    let mut text = String::from("full_name,email,phone_number\n");
    for i in 0..rows {
        text.push_str(&format!("Customer {i},customer{i}@example.com,90000000{i}\n"));
    }
    text
}

fn submitter(api_url: &str) -> BulkSubmitter {
    BulkSubmitter::new(ApiClient::new(Duration::from_secs(10)).unwrap(), api_url)
        .with_notifier(Arc::new(NoOpNotifier))
}

#[test]
fn test_missing_column_is_reported_by_name() {
    let mut session = ImportSession::new(CUSTOMERS);
    let err = session
        .load("full_name,email\nAsha,asha@example.com\n".as_bytes())
        .unwrap_err();

    assert_eq!(
        err,
        PipelineError::CsvSchemaInvalid {
            missing: vec!["phone_number".to_string()],
        }
    );
    assert_eq!(err.client_message(), "Missing column(s): phone_number");
    assert!(session.preview().is_empty());
}

#[test]
fn test_leads_require_status_column() {
    let err = CsvBatch::parse_str(&customers_csv(2), LEADS.required_headers).unwrap_err();
    assert_eq!(
        err,
        PipelineError::CsvSchemaInvalid {
            missing: vec!["lead_status".to_string()],
        }
    );
}

#[tokio::test]
async fn test_seven_rows_preview_five_and_submit_seven() {
    let mut server = mockito::Server::new_async().await;

    let mut session = ImportSession::new(CUSTOMERS);
    session.load(customers_csv(7).as_bytes()).unwrap();
    assert_eq!(session.preview().len(), 5);
    assert_eq!(session.preview()[4]["full_name"], "Customer 4");
    assert_eq!(session.row_count(), 7);

    let expected_rows: Vec<serde_json::Value> = (0..7)
        .map(|i| {
            serde_json::json!({
                "full_name": format!("Customer {i}"),
                "email": format!("customer{i}@example.com"),
                "phone_number": format!("90000000{i}"),
            })
        })
        .collect();
    let mock = server
        .mock("POST", "/api/customers/bulk")
        .match_header("authorization", "Bearer firebase-id-token")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({ "customers": expected_rows })))
        .with_status(200)
        .with_body(r#"{"inserted":7}"#)
        .expect(1)
        .create_async()
        .await;

    let summary = session
        .submit(
            &submitter(&server.url()),
            &Credential::bearer("firebase-id-token"),
        )
        .await
        .unwrap();

    assert_eq!(summary.submitted, 7);
    assert_eq!(summary.profile, "customers");
    assert_eq!(session.row_count(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_user_leads_use_their_own_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/leads/bulk-user")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "leads": [{ "lead_status": "New" }]
        })))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let batch = CsvBatch::parse_str(
        "full_name,email,phone_number,lead_status\nRavi,ravi@example.com,91,New\n",
        USER_LEADS.required_headers,
    )
    .unwrap();
    submitter(&server.url())
        .submit(&USER_LEADS, &batch, &Credential::bearer("t"))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_message_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/leads/bulk")
        .with_status(400)
        .with_body(r#"{"message":"Duplicate email: a@x.io"}"#)
        .create_async()
        .await;

    let batch = CsvBatch::parse_str(
        "full_name,email,phone_number,lead_status\nA,a@x.io,1,New\n",
        LEADS.required_headers,
    )
    .unwrap();
    let err = submitter(&server.url())
        .submit(&LEADS, &batch, &Credential::bearer("t"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PipelineError::BulkSubmitFailed {
            status: Some(400),
            message: "Duplicate email: a@x.io".to_string(),
        }
    );
    assert_eq!(err.client_message(), "Duplicate email: a@x.io");
}

#[tokio::test]
async fn test_header_only_file_never_reaches_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut session = ImportSession::new(CUSTOMERS);
    session.load(customers_csv(0).as_bytes()).unwrap();
    let err = session
        .submit(&submitter(&server.url()), &Credential::bearer("t"))
        .await
        .unwrap_err();

    assert_eq!(err, PipelineError::NothingToSubmit);
    assert_eq!(err.client_message(), "Choose a CSV first");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unloaded_session_has_nothing_to_submit() {
    let mut session = ImportSession::new(LEADS);
    let err = session
        .submit(&submitter("http://127.0.0.1:1"), &Credential::bearer("t"))
        .await
        .unwrap_err();
    assert_eq!(err, PipelineError::NothingToSubmit);
}

#[test]
fn test_parses_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(customers_csv(3).as_bytes()).unwrap();

    let batch = CsvBatch::from_path(file.path(), &CUSTOMERS).unwrap();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.headers(), ["full_name", "email", "phone_number"]);
}

#[test]
fn test_missing_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CsvBatch::from_path(dir.path().join("absent.csv"), &CUSTOMERS).unwrap_err();
    assert!(matches!(err, PipelineError::CsvParseError(_)));
}

#[test]
fn test_every_template_satisfies_its_profile() {
    for profile in ImportProfile::all() {
        let text = render_template(profile).unwrap();
        let batch = CsvBatch::parse_str(&text, profile.required_headers).unwrap();
        assert_eq!(batch.len(), profile.sample_rows.len(), "{}", profile);
    }

    let customers = CsvBatch::parse_str(
        &render_template(&CUSTOMERS).unwrap(),
        CUSTOMERS.required_headers,
    )
    .unwrap();
    assert_eq!(customers.rows()[0]["address"], "221B Baker Street, Apt 4");
}
