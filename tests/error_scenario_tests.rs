/// エラーシナリオテスト
///
/// 様々なエラー状況でのライブラリの動作をテストします：
/// 1. ステータスコードによる成功/失敗の境界
/// 2. 404の扱い（None になる操作とエラーになる操作）
/// 3. 接続エラー
/// 4. 不正なレスポンスボディ
/// 5. スキーマキャッシュの初期化失敗
use atlassian_client::insight::{
    InsightObjectTypeId, InsightObjectTypeOperator, InsightSchemaId, InsightSchemaOperator,
    ObjectAttributeValue,
};
use atlassian_client::{
    Auth, Error, InsightClient, InsightObjectOperator, IssueTypeOperator, JiraClient, JiraConfig,
    ProjectOperator, UserOperator,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: String) -> JiraConfig {
    JiraConfig::new(
        base_url,
        Auth::Basic {
            username: "test@example.com".to_string(),
            api_token: "test_token".to_string(),
        },
    )
    .unwrap()
}

async fn mount_status(server: &MockServer, path_str: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_status_399_is_success_and_400_is_error() {
    // Given: 399と400を返すエンドポイント
    let server = MockServer::start().await;
    mount_status(&server, "/rest/api/2/edge/399", 399, "edge").await;
    mount_status(&server, "/rest/api/2/edge/400", 400, "Bad request body").await;
    let context = JiraClient::new(config(server.uri())).unwrap().context();

    // When: それぞれ呼び出す
    let ok = context
        .execute_rest_call("GET", "/rest/api/2/edge/399", &[], None, None)
        .await;
    let error = context
        .execute_rest_call("GET", "/rest/api/2/edge/400", &[], None, None)
        .await;

    // Then: 400以上だけがエラーで、ボディがメッセージになる
    let ok = ok.unwrap();
    assert_eq!(ok.status_code, 399);
    assert_eq!(ok.body, "edge");
    let error = error.unwrap_err();
    assert_eq!(error, Error::http(400, "Bad request body"));
}

#[tokio::test]
async fn test_server_error_is_propagated() {
    let server = MockServer::start().await;
    mount_status(&server, "/rest/api/2/project", 503, "maintenance").await;

    let error = JiraClient::new(config(server.uri()))
        .unwrap()
        .projects()
        .get_projects()
        .await
        .unwrap_err();

    assert_eq!(error.category(), "HTTP-ERROR");
    assert_eq!(error.status_code(), Some(503));
    assert_eq!(error.message(), "maintenance");
}

#[tokio::test]
async fn test_not_found_lookups_return_none() {
    // Given: すべて404を返すサーバー
    let server = MockServer::start().await;
    mount_status(&server, "/rest/api/2/project/1", 404, "missing").await;
    mount_status(&server, "/rest/insight/1.0/objectschema/9", 404, "missing").await;
    mount_status(&server, "/rest/insight/1.0/objecttype/9", 404, "missing").await;

    // When: 単一取得系の操作を呼ぶ
    let jira = JiraClient::new(config(server.uri())).unwrap();
    let insight = InsightClient::new(config(server.uri())).unwrap();
    let project = jira.projects().get_project(1).await.unwrap();
    let schema = insight.schemas().get_schema(InsightSchemaId(9)).await.unwrap();
    let object_type = insight
        .object_types()
        .get_object_type(InsightObjectTypeId(9))
        .await
        .unwrap();

    // Then: エラーではなく None
    assert!(project.is_none());
    assert!(schema.is_none());
    assert!(object_type.is_none());
}

#[tokio::test]
async fn test_not_found_on_list_is_error() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "/rest/api/2/issue/createmeta/1/issuetypes",
        404,
        "project missing",
    )
    .await;

    let error = JiraClient::new(config(server.uri()))
        .unwrap()
        .issue_types()
        .get_issue_types(1)
        .await
        .unwrap_err();

    assert!(error.is_not_found());
    assert_eq!(error.status_code(), Some(404));
}

#[tokio::test]
async fn test_connection_failure_is_http_error_without_status() {
    // Given: 停止済みのサーバーのURL
    let base_url = {
        let server = MockServer::start().await;
        server.uri()
    };

    // When: 通信する
    let error = JiraClient::new(config(base_url))
        .unwrap()
        .projects()
        .get_projects()
        .await
        .unwrap_err();

    // Then: ステータスなしのHTTPエラー
    assert_eq!(error.category(), "HTTP-ERROR");
    assert_eq!(error.status_code(), None);
    assert!(!error.message().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/project"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let error = JiraClient::new(config(server.uri()))
        .unwrap()
        .projects()
        .get_projects()
        .await
        .unwrap_err();

    assert!(matches!(error, Error::JsonParsing(_)));
}

#[tokio::test]
async fn test_unknown_role_actor_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/project/TEST/role"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Robots": format!("{}/rest/api/2/project/TEST/role/7", server.uri())
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/project/TEST/role/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "name": "Robots",
            "actors": [{"id": 1, "name": "bot", "type": "atlassian-robot-role-actor"}]
        })))
        .mount(&server)
        .await;

    let error = JiraClient::new(config(server.uri()))
        .unwrap()
        .users()
        .get_users_by_project_key("TEST")
        .await
        .unwrap_err();

    assert_eq!(error.category(), "Unknown actor type");
    assert_eq!(error.status_code(), Some(404));
}

#[tokio::test]
async fn test_schema_cache_init_failure_is_reported_on_use() {
    // Given: スキーマ一覧が失敗するサーバー
    let server = MockServer::start().await;
    mount_status(&server, "/rest/insight/1.0/objectschema/list", 500, "insight down").await;
    let insight = InsightClient::new(config(server.uri())).unwrap();

    // When: 初期化に失敗した後で名前による作成を試す
    let init_error = insight.init().await.unwrap_err();
    let create_error = insight
        .objects()
        .create_object_by_attribute_names(
            InsightObjectTypeId(7),
            vec![(
                "Name".to_string(),
                vec![ObjectAttributeValue::value("web-01")],
            )],
        )
        .await
        .unwrap_err();

    // Then: 初期化時と同じエラーが返り、作成リクエストは送られない
    assert_eq!(init_error, Error::http(500, "insight down"));
    assert_eq!(create_error, init_error);
    assert!(!insight.schema_cache().is_initialized().await);
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| request.method.as_str() == "GET"));
}

#[tokio::test]
async fn test_missing_root_object_type_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/insight/1.0/objectschema/1/objecttypes/flat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(vec![])))
        .mount(&server)
        .await;

    let error = InsightClient::new(config(server.uri()))
        .unwrap()
        .object_types()
        .get_object_types_by_schema_and_root_object_type(
            InsightSchemaId(1),
            InsightObjectTypeId(42),
        )
        .await
        .unwrap_err();

    assert!(error.is_not_found());
    assert_eq!(error.message(), "Object type with id 42 was not found");
}
