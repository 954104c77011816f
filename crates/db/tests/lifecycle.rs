//! Integration tests for lifecycle transitions as conditional UPDATEs.
//!
//! Status only ever moves along the defined edges; a guard that fails
//! returns `None` and leaves the row untouched.

use sqlx::PgPool;

use siteforge_core::status::ProjectStatus;
use siteforge_db::models::invoice::CreateInvoice;
use siteforge_db::models::media_asset::CreateMediaAsset;
use siteforge_db::models::project::CreateProject;
use siteforge_db::repositories::{InvoiceRepo, MediaAssetRepo, ProjectRepo};

fn new_project() -> CreateProject {
    CreateProject {
        owner_id: 1,
        owner_email: "owner@example.com".to_string(),
        plan: "standard".to_string(),
        initial_tokens: 500,
    }
}

const DOC: &str = "<!DOCTYPE html>\n<html><body>site</body></html>";

/// Drive a fresh project through Draft -> Processing -> Generated.
async fn generated_project(pool: &PgPool) -> siteforge_db::models::project::Project {
    let project = ProjectRepo::create(pool, &new_project()).await.unwrap();
    ProjectRepo::begin_generation(pool, project.id)
        .await
        .unwrap()
        .expect("draft project starts generation");
    ProjectRepo::complete_generation(pool, project.id, DOC)
        .await
        .unwrap()
        .expect("processing project completes")
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn begin_generation_moves_draft_to_processing(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project()).await.unwrap();
    assert_eq!(project.status(), ProjectStatus::Draft);

    let processing = ProjectRepo::begin_generation(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(processing.status(), ProjectStatus::Processing);
}

#[sqlx::test]
async fn generation_happens_at_most_once(pool: PgPool) {
    let project = generated_project(&pool).await;
    assert_eq!(project.status(), ProjectStatus::Generated);
    assert!(project.generated_once);
    assert_eq!(project.document_version, 1);
    assert_eq!(project.document.as_deref(), Some(DOC));

    // A second automatic generation is rejected by the guard.
    let again = ProjectRepo::begin_generation(&pool, project.id).await.unwrap();
    assert!(again.is_none());
}

#[sqlx::test]
async fn concurrent_begin_generation_has_one_winner(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project()).await.unwrap();

    let (a, b) = tokio::join!(
        ProjectRepo::begin_generation(&pool, project.id),
        ProjectRepo::begin_generation(&pool, project.id),
    );
    let winners = [a.unwrap(), b.unwrap()]
        .into_iter()
        .flatten()
        .count();
    assert_eq!(winners, 1, "exactly one request may enter Processing");
}

#[sqlx::test]
async fn failed_generation_reverts_to_draft(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project()).await.unwrap();
    ProjectRepo::begin_generation(&pool, project.id).await.unwrap();

    assert!(ProjectRepo::fail_generation(&pool, project.id).await.unwrap());

    let reloaded = ProjectRepo::find_by_id(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status(), ProjectStatus::Draft);
    assert!(reloaded.document.is_none());
    assert_eq!(reloaded.document_version, 0);
    assert!(!reloaded.generated_once);
}

#[sqlx::test]
async fn complete_generation_requires_processing(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project()).await.unwrap();
    let completed = ProjectRepo::complete_generation(&pool, project.id, DOC)
        .await
        .unwrap();
    assert!(completed.is_none());
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn publish_unpublish_republish(pool: PgPool) {
    let project = generated_project(&pool).await;

    let published = ProjectRepo::publish(&pool, project.id, "bluebird-bakery")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(published.status(), ProjectStatus::Published);
    assert_eq!(published.subdomain.as_deref(), Some("bluebird-bakery"));
    let first_publish = published.published_at.unwrap();

    // Publishing an already-published project is rejected.
    assert!(ProjectRepo::publish(&pool, project.id, "other")
        .await
        .unwrap()
        .is_none());

    // Republish only refreshes the timestamp.
    let republished = ProjectRepo::republish(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(republished.status(), ProjectStatus::Published);
    assert!(republished.published_at.unwrap() >= first_publish);
    assert_eq!(republished.subdomain.as_deref(), Some("bluebird-bakery"));

    let unpublished = ProjectRepo::unpublish(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unpublished.status(), ProjectStatus::Generated);
    assert!(unpublished.published_at.is_none());
}

#[sqlx::test]
async fn domain_verification_refines_published_to_live(pool: PgPool) {
    let project = generated_project(&pool).await;
    ProjectRepo::publish(&pool, project.id, "bluebird-bakery")
        .await
        .unwrap();

    // No custom domain attached yet: verification cannot apply.
    assert!(ProjectRepo::mark_domain_verified(&pool, project.id)
        .await
        .unwrap()
        .is_none());

    ProjectRepo::set_custom_domain(&pool, project.id, "bluebird.example")
        .await
        .unwrap();
    let live = ProjectRepo::mark_domain_verified(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.status(), ProjectStatus::Live);
    assert!(live.domain_verified_at.is_some());

    let resolved = ProjectRepo::find_by_host(&pool, "bluebird.example")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, project.id);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn cancel_remembers_prior_status_and_reactivate_restores_it(pool: PgPool) {
    let project = generated_project(&pool).await;
    ProjectRepo::publish(&pool, project.id, "bluebird-bakery")
        .await
        .unwrap();

    let cancelled = ProjectRepo::cancel(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(cancelled.status(), ProjectStatus::Cancelled);
    assert_eq!(cancelled.prior_status_id, Some(ProjectStatus::Published.id()));
    assert!(cancelled.cancelled_at.is_some());

    // Cancelling twice is rejected.
    assert!(ProjectRepo::cancel(&pool, project.id).await.unwrap().is_none());

    ProjectRepo::mark_milestone_sent(&pool, project.id, 7).await.unwrap();

    let reactivated = ProjectRepo::reactivate(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reactivated.status(), ProjectStatus::Published);
    assert!(reactivated.cancelled_at.is_none());
    assert!(reactivated.sent_reminder_milestones.is_empty());
}

#[sqlx::test]
async fn milestone_marking_is_idempotent(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project()).await.unwrap();
    ProjectRepo::cancel(&pool, project.id).await.unwrap();

    assert!(ProjectRepo::mark_milestone_sent(&pool, project.id, 30).await.unwrap());
    assert!(!ProjectRepo::mark_milestone_sent(&pool, project.id, 30).await.unwrap());

    let reloaded = ProjectRepo::find_by_id(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.sent_reminder_milestones, vec![30]);
}

#[sqlx::test]
async fn hard_delete_cascades_to_dependent_records(pool: PgPool) {
    let project = generated_project(&pool).await;

    MediaAssetRepo::create(
        &pool,
        &CreateMediaAsset {
            project_id: project.id,
            storage_key: format!("projects/{}/hero.png", project.id),
            url: "https://cdn.example/hero.png".to_string(),
            content_type: "image/png".to_string(),
            width: Some(1200),
            height: Some(800),
        },
    )
    .await
    .unwrap();
    InvoiceRepo::create(
        &pool,
        &CreateInvoice {
            project_id: project.id,
            event_type: "checkout.completed".to_string(),
            external_reference: "evt_123".to_string(),
            tokens_granted: 500,
            amount_cents: Some(1900),
        },
    )
    .await
    .unwrap();

    assert!(ProjectRepo::hard_delete(&pool, project.id).await.unwrap());
    assert!(!ProjectRepo::hard_delete(&pool, project.id).await.unwrap());

    assert!(ProjectRepo::find_by_id(&pool, project.id).await.unwrap().is_none());
    let assets = MediaAssetRepo::list_by_project(&pool, project.id).await.unwrap();
    assert!(assets.is_empty());
    let invoices = InvoiceRepo::list_by_project(&pool, project.id).await.unwrap();
    assert!(invoices.is_empty());
}
