mod common;

use common::{orders, TestContext};
use uuid::Uuid;
use workspace_api::services::{ProjectUpdate, WorkspaceError};

#[tokio::test]
async fn projects_append_in_creation_order() {
    let ctx = TestContext::new();
    let user = ctx.user("alice").await;

    for name in ["One", "Two", "Three"] {
        ctx.project(user, name).await;
    }

    let projects = ctx.service.list_projects(user).await.unwrap();
    let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["One", "Two", "Three"]);
    assert_eq!(orders(&projects, |p| p.display_order), [0, 1, 2]);
}

#[tokio::test]
async fn create_project_requires_a_known_user_and_a_name() {
    let ctx = TestContext::new();
    let err = ctx.service.create_project(4242, "Orphan").await.unwrap_err();
    assert!(matches!(err, WorkspaceError::NotFound { .. }));

    let user = ctx.user("alice").await;
    let err = ctx.service.create_project(user, "   ").await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Validation(_)));
}

#[tokio::test]
async fn duplicate_project_names_are_rejected_per_user() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;

    ctx.project(alice, "Shared").await;
    let err = ctx.service.create_project(alice, "Shared").await.unwrap_err();
    assert!(matches!(err, WorkspaceError::DuplicateName { .. }));

    // Another user may reuse the name
    ctx.project(bob, "Shared").await;
}

#[tokio::test]
async fn rename_to_a_sibling_name_is_rejected() {
    let ctx = TestContext::new();
    let user = ctx.user("alice").await;
    ctx.project(user, "First").await;
    let second = ctx.project(user, "Second").await;

    let update = ProjectUpdate {
        name: Some("First".to_string()),
        ..Default::default()
    };
    let err = ctx.service.update_project(user, second.id, update).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::DuplicateName { .. }));

    let update = ProjectUpdate {
        name: Some("Renamed".to_string()),
        is_expanded: Some(true),
    };
    let updated = ctx.service.update_project(user, second.id, update).await.unwrap();
    assert_eq!(updated.name, "Renamed");
    assert!(updated.is_expanded);
    assert_eq!(updated.display_order, 1);
}

#[tokio::test]
async fn deleting_a_project_closes_the_gap() {
    let ctx = TestContext::new();
    let user = ctx.user("alice").await;
    let a = ctx.project(user, "A").await;
    let b = ctx.project(user, "B").await;
    let c = ctx.project(user, "C").await;
    ctx.page(user, b.id, "Inside B").await;

    ctx.service.delete_project(user, b.id).await.unwrap();

    let projects = ctx.service.list_projects(user).await.unwrap();
    let ids: Vec<_> = projects.iter().map(|p| p.id).collect();
    assert_eq!(ids, [a.id, c.id]);
    assert_eq!(orders(&projects, |p| p.display_order), [0, 1]);

    let err = ctx.service.list_pages(user, b.id).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::NotFound { .. }));
}

#[tokio::test]
async fn reorder_assigns_positions_from_the_list() {
    let ctx = TestContext::new();
    let user = ctx.user("alice").await;
    let a = ctx.project(user, "A").await;
    let b = ctx.project(user, "B").await;
    let c = ctx.project(user, "C").await;

    let reordered = ctx.service.reorder_projects(user, &[c.id, a.id, b.id]).await.unwrap();
    let ids: Vec<_> = reordered.iter().map(|p| p.id).collect();
    assert_eq!(ids, [c.id, a.id, b.id]);
    assert_eq!(orders(&reordered, |p| p.display_order), [0, 1, 2]);

    let listed = ctx.service.list_projects(user).await.unwrap();
    assert_eq!(listed, reordered);
}

#[tokio::test]
async fn reorder_rejects_partial_foreign_and_unknown_lists() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let a = ctx.project(alice, "A").await;
    let b = ctx.project(alice, "B").await;
    let foreign = ctx.project(bob, "Bob's").await;

    let err = ctx.service.reorder_projects(alice, &[b.id]).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::InvalidOrder(_)));

    let err = ctx.service.reorder_projects(alice, &[b.id, a.id, a.id]).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::InvalidOrder(_)));

    let err = ctx
        .service
        .reorder_projects(alice, &[b.id, a.id, foreign.id])
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::NotOwner { .. }));

    let err = ctx
        .service
        .reorder_projects(alice, &[b.id, Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::NotFound { .. }));

    // Nothing was written by the failed attempts
    let listed = ctx.service.list_projects(alice).await.unwrap();
    assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), [a.id, b.id]);
}

#[tokio::test]
async fn activating_a_project_deactivates_its_siblings() {
    let ctx = TestContext::new();
    let user = ctx.user("alice").await;
    let a = ctx.project(user, "A").await;
    let b = ctx.project(user, "B").await;

    ctx.service.activate_project(user, a.id).await.unwrap();
    let activated = ctx.service.activate_project(user, b.id).await.unwrap();
    assert!(activated.is_active);

    let projects = ctx.service.list_projects(user).await.unwrap();
    let active: Vec<_> = projects.iter().filter(|p| p.is_active).map(|p| p.id).collect();
    assert_eq!(active, [b.id]);
}

#[tokio::test]
async fn other_users_projects_are_off_limits() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice").await;
    let mallory = ctx.user("mallory").await;
    let project = ctx.project(alice, "Private").await;

    let err = ctx.service.delete_project(mallory, project.id).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Unauthorized(_)));

    let err = ctx.service.activate_project(mallory, project.id).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Unauthorized(_)));

    assert!(ctx.service.list_projects(mallory).await.unwrap().is_empty());
    assert_eq!(ctx.service.list_projects(alice).await.unwrap().len(), 1);
}
