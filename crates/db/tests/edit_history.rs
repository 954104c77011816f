//! Integration tests for the append-only edit history and snapshot undo.

use chrono::Utc;
use sqlx::PgPool;

use siteforge_core::history::EditAttempt;
use siteforge_db::models::project::CreateProject;
use siteforge_db::repositories::ProjectRepo;

const DOC_V1: &str = "<!DOCTYPE html>\n<html><body>v1</body></html>";
const DOC_V2: &str = "<!DOCTYPE html>\n<html><body>v2</body></html>";
const DOC_V3: &str = "<!DOCTYPE html>\n<html><body>v3</body></html>";

async fn generated_project(pool: &PgPool) -> siteforge_db::models::project::Project {
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            owner_id: 1,
            owner_email: "owner@example.com".to_string(),
            plan: "starter".to_string(),
            initial_tokens: 500,
        },
    )
    .await
    .unwrap();
    ProjectRepo::begin_generation(pool, project.id).await.unwrap();
    ProjectRepo::complete_generation(pool, project.id, DOC_V1)
        .await
        .unwrap()
        .unwrap()
}

fn success(request: &str, snapshot: &str) -> EditAttempt {
    EditAttempt::success(Utc::now(), request.to_string(), 50, snapshot.to_string())
}

#[sqlx::test]
async fn successful_edit_replaces_document_and_appends_record(pool: PgPool) {
    let project = generated_project(&pool).await;

    let updated = ProjectRepo::apply_successful_edit(
        &pool,
        project.id,
        DOC_V2,
        success("darker header", DOC_V1),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.document.as_deref(), Some(DOC_V2));
    assert_eq!(updated.document_version, 2);

    let history = updated.history().unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].succeeded);
    assert_eq!(history[0].document_snapshot.as_deref(), Some(DOC_V1));
}

#[sqlx::test]
async fn failed_attempt_touches_only_the_history(pool: PgPool) {
    let project = generated_project(&pool).await;

    ProjectRepo::record_failed_attempt(
        &pool,
        project.id,
        EditAttempt::failure(
            Utc::now(),
            "impossible request".to_string(),
            "model returned invalid output".to_string(),
        ),
    )
    .await
    .unwrap();

    let reloaded = ProjectRepo::find_by_id(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.document.as_deref(), Some(DOC_V1));
    assert_eq!(reloaded.document_version, 1);

    let history = reloaded.history().unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history[0].succeeded);
    assert!(history[0].document_snapshot.is_none());
}

#[sqlx::test]
async fn undo_walks_back_through_distinct_snapshots(pool: PgPool) {
    let project = generated_project(&pool).await;

    ProjectRepo::apply_successful_edit(&pool, project.id, DOC_V2, success("edit one", DOC_V1))
        .await
        .unwrap();
    ProjectRepo::apply_successful_edit(&pool, project.id, DOC_V3, success("edit two", DOC_V2))
        .await
        .unwrap();

    // First undo restores the pre-edit-two document.
    let after_first = ProjectRepo::undo_last_edit(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_first.document.as_deref(), Some(DOC_V2));
    assert_eq!(after_first.history().unwrap().len(), 1);

    // Second undo restores the original generation, not the same point.
    let after_second = ProjectRepo::undo_last_edit(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_second.document.as_deref(), Some(DOC_V1));
    assert!(after_second.history().unwrap().is_empty());

    // Nothing left to undo.
    assert!(ProjectRepo::undo_last_edit(&pool, project.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test]
async fn undo_skips_failed_attempts(pool: PgPool) {
    let project = generated_project(&pool).await;

    ProjectRepo::apply_successful_edit(&pool, project.id, DOC_V2, success("edit", DOC_V1))
        .await
        .unwrap();
    ProjectRepo::record_failed_attempt(
        &pool,
        project.id,
        EditAttempt::failure(Utc::now(), "bad".to_string(), "timeout".to_string()),
    )
    .await
    .unwrap();

    let undone = ProjectRepo::undo_last_edit(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(undone.document.as_deref(), Some(DOC_V1));
    assert!(undone.history().unwrap().is_empty());
}

#[sqlx::test]
async fn undo_without_any_success_reports_nothing_to_undo(pool: PgPool) {
    let project = generated_project(&pool).await;
    assert!(ProjectRepo::undo_last_edit(&pool, project.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test]
async fn undo_does_not_touch_token_balance(pool: PgPool) {
    let project = generated_project(&pool).await;
    ProjectRepo::debit_tokens(&pool, project.id, 50).await.unwrap();
    ProjectRepo::apply_successful_edit(&pool, project.id, DOC_V2, success("edit", DOC_V1))
        .await
        .unwrap();

    let undone = ProjectRepo::undo_last_edit(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(undone.token_balance, 450, "undo never refunds tokens");
}
