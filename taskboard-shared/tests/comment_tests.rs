/// Comment threads and the end-to-end collaboration flow.

mod common;

use common::{ctx, project_with, register, services};
use taskboard_shared::models::comment::NewComment;
use taskboard_shared::models::task::NewTask;
use taskboard_shared::CoreError;
use uuid::Uuid;

fn comment(task_id: Uuid, content: &str) -> NewComment {
    NewComment {
        task_id: Some(task_id),
        content: Some(content.to_string()),
    }
}

#[tokio::test]
async fn test_thread_is_ordered_oldest_first() {
    let services = services();
    let pm = register(&services, "pm", "project_manager").await;
    let ada = register(&services, "ada", "team_member").await;
    let project = project_with(&services, &pm, &[&ada]).await;
    let task = services
        .tasks
        .create(
            &ctx(&pm),
            NewTask {
                title: Some("Discuss".to_string()),
                project_id: Some(project.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    for (author, text) in [(&pm, "first"), (&ada, "second"), (&pm, "third")] {
        services
            .comments
            .create(&ctx(author), comment(task.id, text))
            .await
            .unwrap();
    }

    let thread = services.comments.list_for_task(task.id).await.unwrap();
    let contents: Vec<&str> = thread.iter().map(|c| c.comment.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
    assert_eq!(thread[1].username.as_deref(), Some("ada"));
}

#[tokio::test]
async fn test_create_validation() {
    let services = services();
    let ada = register(&services, "ada", "team_member").await;

    let missing_task = NewComment {
        task_id: None,
        content: Some("hi".to_string()),
    };
    assert!(matches!(
        services.comments.create(&ctx(&ada), missing_task).await,
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        services
            .comments
            .create(&ctx(&ada), comment(Uuid::new_v4(), "   "))
            .await,
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        services
            .comments
            .create(&ctx(&ada), comment(Uuid::new_v4(), "hi"))
            .await,
        Err(CoreError::NotFound { entity: "Task", .. })
    ));
    assert!(matches!(
        services.comments.list_for_task(Uuid::new_v4()).await,
        Err(CoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_is_author_or_admin() {
    let services = services();
    let admin = register(&services, "root", "admin").await;
    let ada = register(&services, "ada", "team_member").await;
    let bob = register(&services, "bob", "team_member").await;
    let project = project_with(&services, &admin, &[&ada, &bob]).await;
    let task = services
        .tasks
        .create(
            &ctx(&ada),
            NewTask {
                title: Some("Design review".to_string()),
                project_id: Some(project.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let first = services
        .comments
        .create(&ctx(&ada), comment(task.id, "mine"))
        .await
        .unwrap();
    let second = services
        .comments
        .create(&ctx(&ada), comment(task.id, "also mine"))
        .await
        .unwrap();

    assert!(matches!(
        services.comments.delete(&ctx(&bob), first.id).await,
        Err(CoreError::Forbidden(_))
    ));
    services.comments.delete(&ctx(&ada), first.id).await.unwrap();
    services.comments.delete(&ctx(&admin), second.id).await.unwrap();

    assert!(services.comments.list_for_task(task.id).await.unwrap().is_empty());
    assert!(matches!(
        services.comments.delete(&ctx(&admin), second.id).await,
        Err(CoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_task_delete_removes_thread() {
    let services = services();
    let pm = register(&services, "pm", "project_manager").await;
    let project = project_with(&services, &pm, &[]).await;
    let task = services
        .tasks
        .create(
            &ctx(&pm),
            NewTask {
                title: Some("Temp".to_string()),
                project_id: Some(project.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let note = services
        .comments
        .create(&ctx(&pm), comment(task.id, "note"))
        .await
        .unwrap();

    services.tasks.delete(&ctx(&pm), task.id).await.unwrap();

    assert!(matches!(
        services.comments.delete(&ctx(&pm), note.id).await,
        Err(CoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_admin_moderates_member_comment() {
    let services = services();

    // A is a team member, B an admin
    let a = register(&services, "alice", "team_member").await;
    let b = register(&services, "boss", "admin").await;

    let project = project_with(&services, &b, &[&a]).await;

    let task = services
        .tasks
        .create(
            &ctx(&a),
            NewTask {
                title: Some("Own task".to_string()),
                project_id: Some(project.id),
                assigned_to: Some(a.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(task.assigned_to, Some(a.id));

    let note = services
        .comments
        .create(&ctx(&a), comment(task.id, "started on this"))
        .await
        .unwrap();

    services.comments.delete(&ctx(&b), note.id).await.unwrap();

    let thread = services.comments.list_for_task(task.id).await.unwrap();
    assert!(thread.iter().all(|c| c.comment.id != note.id));
}
