//! Handler tests against a mock REANA server.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reana_cli::cli::{ListArgs, LogsArgs, SecretsAddArgs, StartArgs, StatusArgs};
use reana_cli::commands::{
    ListCommand, LogsCommand, SecretsAddCommand, StartCommand, StatusCommand,
};
use reana_cli::{CliError, Context, ReanaClient};

fn client_for(server: &MockServer) -> ReanaClient {
    let context = Context {
        server_url: server.uri(),
        access_token: "secret-token".to_owned(),
        verify_tls: false,
    };
    ReanaClient::new(&context).expect("client")
}

fn list_args() -> ListArgs {
    ListArgs {
        filter: Vec::new(),
        format: None,
        json: false,
        show_deleted_runs: false,
        sort: "created".to_owned(),
        ascending: false,
        include_workspace_size: false,
        include_duration: false,
        human_readable: false,
        page: None,
        size: None,
    }
}

#[tokio::test]
async fn list_renders_default_columns_and_authenticates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows"))
        .and(query_param("access_token", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "0c0735ae-6714-4e9f-a4ba-20a7d7a5ba5a",
                    "name": "my_workflow",
                    "run_number": "23",
                    "created": "2022-08-09T11:00:00",
                    "status": "finished",
                    "progress": {
                        "run_started_at": "2022-08-09T11:01:00",
                        "run_finished_at": "2022-08-09T12:00:00"
                    }
                },
                {
                    "id": "3a2e1de7-1546-4b83-a527-c42ce470e73d",
                    "name": "my_workflow2",
                    "run_number": "12",
                    "created": "2022-08-10T17:14:12",
                    "status": "running",
                    "progress": {
                        "run_started_at": "2022-08-10T18:04:52",
                        "run_finished_at": null
                    }
                }
            ],
            "total": 2
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut out = Vec::new();
    ListCommand::new(&client)
        .execute(&mut out, &list_args())
        .await
        .expect("list");

    let text = String::from_utf8(out).expect("utf8");
    let mut lines = text.lines();
    let header = lines.next().expect("header");
    assert_eq!(
        header.split_whitespace().collect::<Vec<_>>(),
        ["NAME", "RUN_NUMBER", "CREATED", "STARTED", "ENDED", "STATUS"]
    );
    // Sorted by creation time, newest first.
    let first_row = lines.next().expect("row");
    assert_eq!(
        first_row.split_whitespace().collect::<Vec<_>>(),
        [
            "my_workflow2",
            "12",
            "2022-08-10T17:14:12",
            "2022-08-10T18:04:52",
            "-",
            "running"
        ]
    );
}

#[tokio::test]
async fn list_passes_status_filters_and_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows"))
        .and(query_param("status", "running"))
        .and(query_param("search", r#"{"name":["test"]}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [], "total": 0})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut args = list_args();
    args.filter = vec!["status=running".to_owned(), "name=test".to_owned()];
    let mut out = Vec::new();
    ListCommand::new(&client)
        .execute(&mut out, &args)
        .await
        .expect("list");
}

#[tokio::test]
async fn status_translates_not_found_to_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows/ghost/status"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "REANA_WORKON is set to ghost, but that workflow does not exist."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let args = StatusArgs { format: None, json: false, verbose: false };
    let mut out = Vec::new();
    let err = StatusCommand::new(&client)
        .execute(&mut out, "ghost", &args)
        .await
        .expect_err("must fail");
    match err {
        CliError::Server { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("does not exist"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_status_code_is_reported_with_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows/myanalysis/logs"))
        .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let args = LogsArgs { filter: Vec::new(), json: false, follow: false, interval: 10 };
    let mut out = Vec::new();
    let err = LogsCommand::new(&client)
        .execute(&mut out, "myanalysis", &args)
        .await
        .expect_err("must fail");
    assert!(err.to_string().contains("418"));
    assert!(err.to_string().contains("teapot"));
}

#[tokio::test]
async fn start_drops_unknown_parameters_with_a_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows/myanalysis/parameters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "0c0735ae-6714-4e9f-a4ba-20a7d7a5ba5a",
            "name": "myanalysis",
            "type": "serial",
            "parameters": {"events": 1000}
        })))
        .mount(&server)
        .await;
    // The outgoing body must not contain the unknown parameter.
    Mock::given(method("PUT"))
        .and(path("/api/workflows/myanalysis/status"))
        .and(query_param("status", "start"))
        .and(body_json(json!({"input_parameters": {"events": "500"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Workflow submitted",
            "workflow_id": "0c0735ae-6714-4e9f-a4ba-20a7d7a5ba5a",
            "workflow_name": "myanalysis",
            "status": "running"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let args = StartArgs {
        parameters: vec!["events=500".to_owned(), "luminosity=3".to_owned()],
        options: Vec::new(),
        follow: false,
        check_interval: 5,
    };
    let mut out = Vec::new();
    StartCommand::new(&client)
        .execute(&mut out, "myanalysis", &args)
        .await
        .expect("start");

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("WARNING"));
    assert!(text.contains("luminosity"));
    assert!(text.contains("myanalysis is running"));
}

#[tokio::test]
async fn start_rejects_unknown_operational_options_before_submitting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows/myanalysis/parameters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "0c0735ae-6714-4e9f-a4ba-20a7d7a5ba5a",
            "name": "myanalysis",
            "type": "serial",
            "parameters": {}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let args = StartArgs {
        parameters: Vec::new(),
        options: vec!["TURBO=on".to_owned()],
        follow: false,
        check_interval: 5,
    };
    let mut out = Vec::new();
    let err = StartCommand::new(&client)
        .execute(&mut out, "myanalysis", &args)
        .await
        .expect_err("must fail");
    assert!(matches!(err, CliError::Validation(_)));
    assert!(err.to_string().contains("TURBO"));
}

#[tokio::test]
async fn follow_exits_after_terminal_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows/myanalysis/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflow_id": "0c0735ae-6714-4e9f-a4ba-20a7d7a5ba5a",
            "logs": {"workflow_logs": "all done\n", "job_logs": {}},
            "live_logs_enabled": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/workflows/myanalysis/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "0c0735ae-6714-4e9f-a4ba-20a7d7a5ba5a",
            "name": "myanalysis",
            "run_number": "1",
            "created": "2022-08-10T17:14:12",
            "status": "finished"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let args = LogsArgs { filter: Vec::new(), json: false, follow: true, interval: 1 };
    let mut out = Vec::new();
    LogsCommand::new(&client)
        .execute(&mut out, "myanalysis", &args)
        .await
        .expect("follow");

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("all done"));
    assert!(text.contains("myanalysis has finished"));
}

#[tokio::test]
async fn follow_fails_when_live_logs_are_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workflows/myanalysis/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflow_id": "0c0735ae-6714-4e9f-a4ba-20a7d7a5ba5a",
            "logs": {"job_logs": {}},
            "live_logs_enabled": false
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let args = LogsArgs { filter: Vec::new(), json: false, follow: true, interval: 1 };
    let mut out = Vec::new();
    let err = LogsCommand::new(&client)
        .execute(&mut out, "myanalysis", &args)
        .await
        .expect_err("must fail");
    assert!(err.to_string().contains("Live logs are not enabled"));
}

#[tokio::test]
async fn secrets_add_conflict_reports_existing_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/secrets"))
        .and(query_param("overwrite", "false"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!(["FOO"])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let args = SecretsAddArgs {
        env: vec!["FOO=bar".to_owned()],
        file: Vec::new(),
        overwrite: false,
    };
    let mut out = Vec::new();
    let err = SecretsAddCommand::new(&client)
        .execute(&mut out, &args)
        .await
        .expect_err("must fail");
    match err {
        CliError::Server { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Secrets FOO already exist. No secrets were added.");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_reports_the_host() {
    let context = Context {
        server_url: "https://reana.invalid".to_owned(),
        access_token: "token".to_owned(),
        verify_tls: false,
    };
    let client = ReanaClient::new(&context).expect("client");
    let err = client.ping().await.expect_err("must fail");
    assert!(err.to_string().contains("'reana.invalid' not found"));
}
