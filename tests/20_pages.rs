mod common;

use common::{orders, TestContext};
use workspace_api::services::{PageUpdate, WorkspaceError};

#[tokio::test]
async fn pages_append_within_their_project() {
    let ctx = TestContext::new();
    let user = ctx.user("alice").await;
    let left = ctx.project(user, "Left").await;
    let right = ctx.project(user, "Right").await;

    ctx.page(user, left.id, "L1").await;
    ctx.page(user, right.id, "R1").await;
    ctx.page(user, left.id, "L2").await;

    let pages = ctx.service.list_pages(user, left.id).await.unwrap();
    assert_eq!(pages.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["L1", "L2"]);
    assert_eq!(orders(&pages, |p| p.display_order), [0, 1]);

    let pages = ctx.service.list_pages(user, right.id).await.unwrap();
    assert_eq!(orders(&pages, |p| p.display_order), [0]);
}

#[tokio::test]
async fn page_names_are_unique_within_a_project() {
    let ctx = TestContext::new();
    let (user, project, page) = ctx.seeded("alice").await;
    let other = ctx.project(user, "Other").await;

    let err = ctx.service.create_page(user, project.id, &page.name).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::DuplicateName { .. }));

    ctx.page(user, other.id, &page.name).await;

    let second = ctx.page(user, project.id, "Second").await;
    let update = PageUpdate {
        name: Some(page.name.clone()),
    };
    let err = ctx.service.update_page(user, second.id, update).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::DuplicateName { .. }));
}

#[tokio::test]
async fn deleting_a_page_compacts_and_removes_its_tabs() {
    let ctx = TestContext::new();
    let (user, project, first) = ctx.seeded("alice").await;
    let second = ctx.page(user, project.id, "Second").await;
    let third = ctx.page(user, project.id, "Third").await;
    let tab = ctx.tab(user, second.id, "Snow", "snow_load").await;

    ctx.service.delete_page(user, second.id).await.unwrap();

    let pages = ctx.service.list_pages(user, project.id).await.unwrap();
    assert_eq!(pages.iter().map(|p| p.id).collect::<Vec<_>>(), [first.id, third.id]);
    assert_eq!(orders(&pages, |p| p.display_order), [0, 1]);

    let err = ctx.service.get_tab_data(user, tab.id).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::NotFound { .. }));
}

#[tokio::test]
async fn moving_a_page_appends_to_the_target_and_compacts_the_source() {
    let ctx = TestContext::new();
    let user = ctx.user("alice").await;
    let source = ctx.project(user, "Source").await;
    let target = ctx.project(user, "Target").await;
    let a = ctx.page(user, source.id, "A").await;
    let b = ctx.page(user, source.id, "B").await;
    let c = ctx.page(user, source.id, "C").await;
    ctx.page(user, target.id, "Existing").await;
    ctx.service.activate_page(user, a.id).await.unwrap();
    let tab = ctx.tab(user, a.id, "Wind", "wind_load").await;

    let moved = ctx.service.move_page(user, a.id, target.id).await.unwrap();
    assert_eq!(moved.project_id, target.id);
    assert_eq!(moved.display_order, 1);
    assert!(!moved.is_active);

    let source_pages = ctx.service.list_pages(user, source.id).await.unwrap();
    assert_eq!(source_pages.iter().map(|p| p.id).collect::<Vec<_>>(), [b.id, c.id]);
    assert_eq!(orders(&source_pages, |p| p.display_order), [0, 1]);

    let target_pages = ctx.service.list_pages(user, target.id).await.unwrap();
    assert_eq!(orders(&target_pages, |p| p.display_order), [0, 1]);

    // Tabs travel with the page
    let tabs = ctx.service.list_tabs(user, a.id).await.unwrap();
    assert_eq!(tabs.iter().map(|t| t.id).collect::<Vec<_>>(), [tab.id]);
}

#[tokio::test]
async fn moving_into_the_same_project_changes_nothing() {
    let ctx = TestContext::new();
    let (user, project, first) = ctx.seeded("alice").await;
    ctx.page(user, project.id, "Second").await;

    let moved = ctx.service.move_page(user, first.id, project.id).await.unwrap();
    assert_eq!(moved, first);

    let pages = ctx.service.list_pages(user, project.id).await.unwrap();
    assert_eq!(pages[0].id, first.id);
    assert_eq!(orders(&pages, |p| p.display_order), [0, 1]);
}

#[tokio::test]
async fn moving_onto_a_name_clash_is_rejected() {
    let ctx = TestContext::new();
    let (user, source, page) = ctx.seeded("alice").await;
    let target = ctx.project(user, "Target").await;
    ctx.page(user, target.id, &page.name).await;

    let err = ctx.service.move_page(user, page.id, target.id).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::DuplicateName { .. }));

    let pages = ctx.service.list_pages(user, source.id).await.unwrap();
    assert_eq!(pages.iter().map(|p| p.id).collect::<Vec<_>>(), [page.id]);
}

#[tokio::test]
async fn pages_cannot_move_into_another_users_project() {
    let ctx = TestContext::new();
    let (alice, _, page) = ctx.seeded("alice").await;
    let (_, bobs_project, _) = ctx.seeded("bob").await;

    let err = ctx.service.move_page(alice, page.id, bobs_project.id).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Unauthorized(_)));
}

#[tokio::test]
async fn reorder_pages_rejects_pages_of_another_project() {
    let ctx = TestContext::new();
    let (user, project, first) = ctx.seeded("alice").await;
    let second = ctx.page(user, project.id, "Second").await;
    let elsewhere = ctx.project(user, "Elsewhere").await;
    let stray = ctx.page(user, elsewhere.id, "Stray").await;

    let err = ctx
        .service
        .reorder_pages(user, project.id, &[second.id, stray.id])
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::NotOwner { .. }));

    let pages = ctx.service.reorder_pages(user, project.id, &[second.id, first.id]).await.unwrap();
    assert_eq!(pages.iter().map(|p| p.id).collect::<Vec<_>>(), [second.id, first.id]);
    assert_eq!(orders(&pages, |p| p.display_order), [0, 1]);
}

#[tokio::test]
async fn activating_a_page_leaves_other_projects_alone() {
    let ctx = TestContext::new();
    let (user, project, first) = ctx.seeded("alice").await;
    let second = ctx.page(user, project.id, "Second").await;
    let other = ctx.project(user, "Other").await;
    let other_page = ctx.page(user, other.id, "Other page").await;

    ctx.service.activate_page(user, other_page.id).await.unwrap();
    ctx.service.activate_page(user, first.id).await.unwrap();
    ctx.service.activate_page(user, second.id).await.unwrap();

    let pages = ctx.service.list_pages(user, project.id).await.unwrap();
    assert_eq!(pages.iter().filter(|p| p.is_active).map(|p| p.id).collect::<Vec<_>>(), [second.id]);

    let others = ctx.service.list_pages(user, other.id).await.unwrap();
    assert!(others[0].is_active);
}
