mod common;

use assert_matches::assert_matches;

use volunteer_match::error::AppError;
use volunteer_match::models::{
    CreateProject, ProjectFilter, ProjectStatus, UpdateProject, UserProjectStatus,
};
use volunteer_match::queue::EmailBody;
use volunteer_match::repositories::{OrganizationStore, ProjectStore, UserProjectStore};

use common::{Factory, TestApp};

#[tokio::test]
async fn test_create_project_notifies_each_subscriber() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let mut subscribers = Vec::new();
    for _ in 0..3 {
        subscribers.push(factory.create_volunteer(true).await);
    }
    factory.create_volunteer(false).await;

    let project = app
        .projects
        .create_project(&CreateProject::new("Cleanup Drive", org.id))
        .await
        .unwrap();

    assert_eq!(project.name, "Cleanup Drive");
    assert_eq!(project.status, ProjectStatus::Active);
    assert!(project.remote);
    assert_eq!(app.projects.find_projects().await.unwrap().len(), 1);

    let org = OrganizationStore::find_by_id(&app.store, org.id)
        .await
        .unwrap()
        .unwrap();
    assert!(org.project_updated_time.is_some());

    let emails = app.sent_emails().await;
    assert_eq!(emails.len(), 3);

    let mut recipients: Vec<&str> = emails.iter().map(|e| e.to.as_str()).collect();
    recipients.sort();
    let mut expected: Vec<&str> = subscribers.iter().map(|u| u.email.as_str()).collect();
    expected.sort();
    assert_eq!(recipients, expected);

    for email in &emails {
        assert_eq!(email.subject, "Code for Social Good: New Project Notification");
        let EmailBody::Text { body } = &email.body else {
            panic!("expected a text body");
        };
        assert!(body.ends_with(&format!(
            "http://dev.code4socialgood.org/project/view/{}",
            project.id
        )));
    }
}

#[tokio::test]
async fn test_create_project_is_idempotent_per_organization() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    factory.create_volunteer(true).await;

    let first = app
        .projects
        .create_project(&CreateProject::new("Cleanup Drive", org.id))
        .await
        .unwrap();
    let emails_after_first = app.sent_emails().await.len();

    let mut again = CreateProject::new("Cleanup Drive", org.id);
    again.description = Some("Different text".to_string());
    let second = app.projects.create_project(&again).await.unwrap();

    assert_eq!(second, first);
    assert_eq!(app.projects.find_projects().await.unwrap().len(), 1);
    assert_eq!(app.sent_emails().await.len(), emails_after_first);

    // Same name under another organization is a different project
    let other = factory.create_organization("Harbor Friends").await;
    let third = app
        .projects
        .create_project(&CreateProject::new("Cleanup Drive", other.id))
        .await
        .unwrap();
    assert_ne!(third.id, first.id);
}

#[tokio::test]
async fn test_create_project_rejects_bad_input() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;

    let result = app
        .projects
        .create_project(&CreateProject::new("", org.id))
        .await;
    assert_matches!(result, Err(AppError::Validation(_)));

    let result = app
        .projects
        .create_project(&CreateProject::new("Cleanup Drive", 9999))
        .await;
    assert_matches!(result, Err(AppError::NotFound(_)));

    assert!(app.projects.find_projects().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_subscribers_without_email_are_skipped() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let first = factory.create_user_with_email("", true, None).await;
    let second = factory.create_user_with_email("", true, None).await;
    assert_ne!(first.id, second.id);
    let subscriber = factory.create_volunteer(true).await;

    app.projects
        .create_project(&CreateProject::new("Cleanup Drive", org.id))
        .await
        .unwrap();

    let emails = app.sent_emails().await;
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, subscriber.email);
}

#[tokio::test]
async fn test_draft_created_for_organization_without_projects() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    factory.create_volunteer(true).await;

    let drafts = app
        .projects
        .find_by_organization(org.id, Some(ProjectStatus::New))
        .await
        .unwrap();

    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].status, ProjectStatus::New);
    assert!(drafts[0].remote);
    assert_eq!(drafts[0].organization_id, org.id);

    // Asking again returns the same draft
    let again = app
        .projects
        .find_by_organization(org.id, Some(ProjectStatus::New))
        .await
        .unwrap();
    assert_eq!(again, drafts);

    // Drafts are not announced
    assert!(app.sent_emails().await.is_empty());
}

#[tokio::test]
async fn test_concurrent_draft_requests_share_one_draft() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;

    let (a, b) = tokio::join!(
        app.projects
            .find_by_organization(org.id, Some(ProjectStatus::New)),
        app.projects
            .find_by_organization(org.id, Some(ProjectStatus::New)),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.len(), 1);
    assert_eq!(a, b);
    assert_eq!(app.projects.find_projects().await.unwrap(), a);
}

#[tokio::test]
async fn test_other_statuses_do_not_create_drafts() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let active = factory.create_project(&org, "Cleanup Drive").await;

    let all = app.projects.find_by_organization(org.id, None).await.unwrap();
    assert_eq!(all, vec![active.clone()]);

    let closed = app
        .projects
        .find_by_organization(org.id, Some(ProjectStatus::Closed))
        .await
        .unwrap();
    assert!(closed.is_empty());

    assert_eq!(app.projects.find_projects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_draft_for_unknown_organization_is_not_found() {
    let app = TestApp::new();

    let result = app
        .projects
        .find_by_organization(9999, Some(ProjectStatus::New))
        .await;
    assert_matches!(result, Err(AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_project() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let project = factory.create_project(&org, "Cleanup Drive").await;

    let mut update = UpdateProject::from(project.clone());
    update.name = "River Cleanup".to_string();
    update.status = ProjectStatus::Closed;
    update.remote = false;
    update.city = Some("Portland".to_string());

    let updated = app.projects.update_project(&update).await.unwrap().unwrap();
    assert_eq!(updated.name, "River Cleanup");
    assert_eq!(updated.status, ProjectStatus::Closed);
    assert!(!updated.remote);
    assert_eq!(updated.city.as_deref(), Some("Portland"));
    assert!(updated.updated_at >= project.updated_at);

    let stored = app.projects.find_by_id(project.id).await.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_update_unknown_project_returns_none() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let project = factory.create_project(&org, "Cleanup Drive").await;

    let mut update = UpdateProject::from(project);
    update.id = 9999;

    assert!(app.projects.update_project(&update).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_project_removes_bookmarks_and_skills() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let project = factory.create_project(&org, "Cleanup Drive").await;
    let skill = factory.create_skill("Logistics").await;
    factory.tag_project(&project, &skill, 1).await;
    let user = factory.create_volunteer(false).await;

    app.applications
        .record_application(user.id, project.id, Some("B"))
        .await
        .unwrap();

    app.projects.delete_project(project.id).await.unwrap();

    assert_matches!(
        app.projects.find_by_id(project.id).await,
        Err(AppError::NotFound(_))
    );
    assert!(app.store.find_by_project(project.id).await.unwrap().is_empty());
    assert_eq!(app.store.project_skill_count(project.id).await, 0);
}

#[tokio::test]
async fn test_delete_unknown_project_is_noop() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    factory.create_project(&org, "Cleanup Drive").await;

    app.projects.delete_project(9999).await.unwrap();
    assert_eq!(app.projects.find_projects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_project_with_application_history_is_refused() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let project = factory.create_project(&org, "Cleanup Drive").await;
    let skill = factory.create_skill("Logistics").await;
    factory.tag_project(&project, &skill, 1).await;
    let user = factory.create_volunteer(false).await;

    app.applications
        .record_application(user.id, project.id, Some("B"))
        .await
        .unwrap();
    app.applications
        .record_application(user.id, project.id, Some("C"))
        .await
        .unwrap();

    let result = app.projects.delete_project(project.id).await;
    assert_matches!(result, Err(AppError::Referenced(_)));
    assert!(app.projects.find_by_id(project.id).await.is_ok());

    // Nothing was removed by the refused delete
    let rows = app.store.find_by_project(project.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .any(|up| up.status == UserProjectStatus::Bookmarked));
    assert_eq!(app.store.project_skill_count(project.id).await, 1);
}

#[tokio::test]
async fn test_find_by_id_and_name() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let project = factory.create_project(&org, "Cleanup Drive").await;

    assert_eq!(app.projects.find_by_id(project.id).await.unwrap(), project);
    assert_matches!(
        app.projects.find_by_id(9999).await,
        Err(AppError::NotFound(_))
    );

    assert_eq!(
        app.projects.find_by_name("Cleanup Drive").await.unwrap(),
        Some(project)
    );
    assert!(app.projects.find_by_name("Missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_projects_newest_first() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let first = factory.create_project(&org, "First").await;
    let second = factory.create_project(&org, "Second").await;

    let ids: Vec<i32> = app
        .projects
        .find_projects()
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_search_filters() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let cleanup = factory.create_project(&org, "River Cleanup").await;
    let website = factory.create_project(&org, "Website Redesign").await;
    let tutoring = factory.create_project(&org, "Math Tutoring").await;

    let design = factory.create_skill("Design").await;
    factory.tag_project(&website, &design, 1).await;

    let mut onsite = UpdateProject::from(tutoring.clone());
    onsite.remote = false;
    app.projects.update_project(&onsite).await.unwrap();

    let by_keyword = app
        .projects
        .search(
            &ProjectFilter {
                keyword: Some("cLeAnUp".to_string()),
                ..Default::default()
            },
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_keyword.content, vec![cleanup.clone()]);

    let by_skill = app
        .projects
        .search(
            &ProjectFilter {
                skills: Some(vec![design.id]),
                ..Default::default()
            },
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_skill.total_elements, 1);
    assert_eq!(by_skill.content[0].id, website.id);

    let by_remote = app
        .projects
        .search(
            &ProjectFilter {
                remote: Some(false),
                ..Default::default()
            },
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_remote.content.len(), 1);
    assert_eq!(by_remote.content[0].id, tutoring.id);
}

#[tokio::test]
async fn test_search_pagination() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let mut created = Vec::new();
    for i in 0..5 {
        created.push(factory.create_project(&org, &format!("Project {}", i)).await);
    }

    let page = app
        .projects
        .search(&ProjectFilter::default(), Some(1), Some(2))
        .await
        .unwrap();
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page, 1);
    let ids: Vec<i32> = page.content.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![created[2].id, created[1].id]);

    let unpaged = app
        .projects
        .search(&ProjectFilter::default(), None, None)
        .await
        .unwrap();
    assert_eq!(unpaged.content.len(), 5);
    assert_eq!(unpaged.total_pages, 1);
}

#[tokio::test]
async fn test_search_page_past_the_end_is_empty() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    factory.create_project(&org, "Cleanup Drive").await;

    let page = app
        .projects
        .search(&ProjectFilter::default(), Some(u64::MAX), Some(2))
        .await
        .unwrap();
    assert!(page.content.is_empty());
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.page, u64::MAX);
}

#[tokio::test]
async fn test_job_titles_in_display_order() {
    let app = TestApp::new();
    app.store.add_job_title("Developer", 2).await;
    app.store.add_job_title("Designer", 1).await;

    let names: Vec<String> = app
        .projects
        .find_job_titles()
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.name)
        .collect();
    assert_eq!(names, vec!["Designer", "Developer"]);
}

#[tokio::test]
async fn test_save_image() {
    let app = TestApp::new();
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    let project = factory.create_project(&org, "Cleanup Drive").await;

    app.projects
        .save_image(project.id, Some("https://cdn.example.org/p.png"))
        .await
        .unwrap();
    let stored = ProjectStore::find_by_id(&app.store, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.image_url.as_deref(), Some("https://cdn.example.org/p.png"));

    app.projects.save_image(project.id, None).await.unwrap();
    let stored = app.projects.find_by_id(project.id).await.unwrap();
    assert!(stored.image_url.is_none());

    assert_matches!(
        app.projects.save_image(9999, None).await,
        Err(AppError::NotFound(_))
    );
}

#[tokio::test]
async fn test_refused_notification_keeps_project_and_other_subscribers() {
    let (app, queue) = TestApp::with_flaky_queue(1);
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    for _ in 0..3 {
        factory.create_volunteer(true).await;
    }

    let project = app
        .projects
        .create_project(&CreateProject::new("Cleanup Drive", org.id))
        .await
        .unwrap();

    assert_eq!(app.projects.find_by_id(project.id).await.unwrap(), project);
    let org = OrganizationStore::find_by_id(&app.store, org.id)
        .await
        .unwrap()
        .unwrap();
    assert!(org.project_updated_time.is_some());

    assert_eq!(queue.attempts(), 3);
    assert_eq!(app.sent_emails().await.len(), 2);
}

#[tokio::test]
async fn test_queue_outage_does_not_fail_project_creation() {
    let (app, queue) = TestApp::with_flaky_queue(usize::MAX);
    let factory = Factory::new(&app.store);
    let org = factory.create_organization("Riverside Trust").await;
    factory.create_volunteer(true).await;
    factory.create_volunteer(true).await;

    let project = app
        .projects
        .create_project(&CreateProject::new("Cleanup Drive", org.id))
        .await
        .unwrap();

    assert_eq!(app.projects.find_projects().await.unwrap(), vec![project]);
    assert_eq!(queue.attempts(), 2);
    assert!(app.sent_emails().await.is_empty());
}
