use std::time::Duration;

use talentflow_backend::{
    client::{ApiClient, JobsView, KanbanBoard, RetryPolicy},
    dto::candidate_dto::CreateCandidatePayload,
    dto::job_dto::{CreateJobPayload, JobListQuery},
    middleware::chaos::ChaosConfig,
    models::job::JobStatus,
    models::stage::Stage,
    routes, AppState,
};

async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    pool
}

/// Serve the API for `pool` on an ephemeral port and return its base URL.
async fn spawn_server(pool: sqlx::SqlitePool, chaos: ChaosConfig) -> String {
    let app = routes::api_router(AppState::new(pool), chaos);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        delay: Duration::from_millis(20),
    }
}

fn job_payload(title: &str) -> CreateJobPayload {
    CreateJobPayload {
        title: title.to_string(),
        slug: None,
        description: String::new(),
        status: Some(JobStatus::Active),
        tags: Vec::new(),
    }
}

#[tokio::test]
async fn kanban_move_commits_against_a_healthy_server() {
    let pool = test_pool().await;
    let base_url = spawn_server(pool, ChaosConfig::disabled()).await;
    let api = ApiClient::new(base_url).with_retry_policy(fast_retry());

    let job = api.create_job(&job_payload("Backend Engineer")).await.unwrap();
    let candidate = api
        .create_candidate(&CreateCandidatePayload {
            name: "Jane Smith".to_string(),
            email: "jane.smith@example.com".to_string(),
            phone: String::new(),
            job_id: job.id,
            stage: None,
        })
        .await
        .unwrap();

    let board = KanbanBoard::new(api.clone());
    board.load().await.unwrap();
    assert_eq!(board.candidates_in(Stage::Applied).len(), 1);

    board
        .move_candidate(candidate.id, Stage::Interview)
        .await
        .unwrap();
    assert_eq!(board.candidates_in(Stage::Interview).len(), 1);
    assert_eq!(board.error(), None);

    // The server agrees with the local view.
    let fetched = api.get_candidate(candidate.id).await.unwrap();
    assert_eq!(fetched.current_stage, Stage::Interview);
    let history = api.get_candidate_history(candidate.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].from_stage, Some(Stage::Applied));
    assert_eq!(history[1].to_stage, Stage::Interview);

    // Dropping a card back onto its own column never hits the server.
    board
        .move_candidate(candidate.id, Stage::Interview)
        .await
        .unwrap();
    assert_eq!(api.get_candidate_history(candidate.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn failed_kanban_move_rolls_back_with_no_residual_history() {
    let pool = test_pool().await;
    let healthy_url = spawn_server(pool.clone(), ChaosConfig::disabled()).await;
    let failing_url = spawn_server(pool, ChaosConfig::always_failing()).await;

    let healthy = ApiClient::new(healthy_url).with_retry_policy(fast_retry());
    let job = healthy.create_job(&job_payload("Backend Engineer")).await.unwrap();
    let candidate = healthy
        .create_candidate(&CreateCandidatePayload {
            name: "Jane Smith".to_string(),
            email: "jane.smith@example.com".to_string(),
            phone: String::new(),
            job_id: job.id,
            stage: None,
        })
        .await
        .unwrap();

    // Reads pass through the chaos layer; only writes fail.
    let flaky = ApiClient::new(failing_url).with_retry_policy(fast_retry());
    let board = KanbanBoard::with_error_ttl(flaky, Duration::from_millis(200));
    board.load().await.unwrap();

    let result = board.move_candidate(candidate.id, Stage::Interview).await;
    assert!(result.is_err());

    // After the coordinator settles the candidate is back where it started.
    let local = board.candidate(candidate.id).unwrap();
    assert_eq!(local.current_stage, Stage::Applied);
    assert!(board.error().is_some());

    let fetched = healthy.get_candidate(candidate.id).await.unwrap();
    assert_eq!(fetched.current_stage, Stage::Applied);
    let history = healthy.get_candidate_history(candidate.id).await.unwrap();
    assert_eq!(history.len(), 1);

    // The transient error clears on its own.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(board.error(), None);
}

#[tokio::test]
async fn jobs_view_reorders_optimistically_and_rolls_back_archive_failures() {
    let pool = test_pool().await;
    let healthy_url = spawn_server(pool.clone(), ChaosConfig::disabled()).await;
    let failing_url = spawn_server(pool, ChaosConfig::always_failing()).await;

    let healthy = ApiClient::new(healthy_url).with_retry_policy(fast_retry());
    let a = healthy.create_job(&job_payload("A")).await.unwrap();
    let b = healthy.create_job(&job_payload("B")).await.unwrap();
    let c = healthy.create_job(&job_payload("C")).await.unwrap();

    let view = JobsView::new(healthy.clone());
    view.load(&JobListQuery::default()).await.unwrap();

    view.reorder(vec![c.id, a.id, b.id]).await.unwrap();
    let local: Vec<(uuid::Uuid, i64)> = view.jobs().iter().map(|j| (j.id, j.order)).collect();
    assert_eq!(local, vec![(c.id, 0), (a.id, 1), (b.id, 2)]);

    let listed = healthy.get_jobs(&JobListQuery::default()).await.unwrap();
    let orders: Vec<(uuid::Uuid, i64)> = listed.data.iter().map(|j| (j.id, j.order)).collect();
    assert_eq!(orders, vec![(c.id, 0), (a.id, 1), (b.id, 2)]);

    // Archive toggle against the failing server rolls back.
    let flaky = ApiClient::new(failing_url).with_retry_policy(fast_retry());
    let flaky_view = JobsView::with_error_ttl(flaky, Duration::from_millis(200));
    flaky_view.load(&JobListQuery::default()).await.unwrap();

    let result = flaky_view.toggle_archive(a.id).await;
    assert!(result.is_err());
    let job_a = flaky_view
        .jobs()
        .into_iter()
        .find(|j| j.id == a.id)
        .unwrap();
    assert_eq!(job_a.status, JobStatus::Active);
    assert!(flaky_view.error().is_some());

    let server_side = healthy.get_job(a.id).await.unwrap();
    assert_eq!(server_side.status, JobStatus::Active);
}
