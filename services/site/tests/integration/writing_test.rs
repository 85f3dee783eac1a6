use chrono::{Duration, Utc};

use wrantle_domain::pagination::PageRequest;
use wrantle_domain::writing::WritingStatus;
use wrantle_site::error::SiteError;
use wrantle_site::usecase::writing::{
    CreateWritingUseCase, DeleteWritingUseCase, ListDraftWritingsUseCase,
    ListPublishedWritingsUseCase, ShowWritingUseCase, UpdateWritingUseCase, WritingInput,
};

use crate::helpers::{MockUserRepo, MockWritingRepo, editor, staff_only, test_user, test_writing};

// ── create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_draft_with_derived_slug() {
    let author = editor();
    let repo = MockWritingRepo::empty();
    let writings = repo.writings_handle();

    let uc = CreateWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: repo,
    };
    let writing = uc
        .execute(
            author.id,
            WritingInput {
                title: Some("Rust at Wrantle: Year One".into()),
                content: Some("<p>Hello</p>".into()),
                downloadable_files: Some(vec!["report.pdf".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(writing.slug, "rust-at-wrantle-year-one");
    assert_eq!(writing.status, WritingStatus::Draft);
    assert_eq!(writing.user_id, author.id, "author is the acting user");
    assert!(writing.published_at.is_none());
    assert_eq!(writings.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_keep_published_at_as_given() {
    let author = editor();
    let when = Utc::now() + Duration::days(3);
    let uc = CreateWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: MockWritingRepo::empty(),
    };

    let writing = uc
        .execute(
            author.id,
            WritingInput {
                title: Some("Scheduled".into()),
                status: Some("published".into()),
                published_at: Some(Some(when.to_rfc3339())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(writing.status, WritingStatus::Published);
    assert_eq!(writing.published_at, Some(when));
    assert!(!writing.is_visible(Utc::now()), "scheduled writing is not yet visible");
}

#[tokio::test]
async fn should_transliterate_accented_title_into_slug() {
    let author = editor();
    let uc = CreateWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: MockWritingRepo::empty(),
    };

    let writing = uc
        .execute(
            author.id,
            WritingInput {
                title: Some("Café Résumé".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(writing.slug, "cafe-resume");
}

#[tokio::test]
async fn should_report_unparsable_published_at_as_field_error() {
    let author = editor();
    let repo = MockWritingRepo::empty();
    let writings = repo.writings_handle();
    let uc = CreateWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: repo,
    };

    let result = uc
        .execute(
            author.id,
            WritingInput {
                title: Some("Scheduled".into()),
                published_at: Some(Some("next tuesday".into())),
                ..Default::default()
            },
        )
        .await;

    match result {
        Err(SiteError::Validation(errors)) => {
            assert_eq!(errors.messages("published_at"), ["is invalid"]);
        }
        other => panic!("expected Validation, got {other:?}"),
    }
    assert!(writings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_title_without_slug_characters() {
    let author = editor();
    let uc = CreateWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: MockWritingRepo::empty(),
    };

    let result = uc
        .execute(
            author.id,
            WritingInput {
                title: Some("!!!".into()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(SiteError::Validation(ref e)) if e.has("slug")));
}

#[tokio::test]
async fn should_surface_duplicate_slug() {
    let author = editor();
    let existing = test_writing(author.id, "hello-world", WritingStatus::Draft, None);
    let uc = CreateWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: MockWritingRepo::new(vec![existing]),
    };

    let result = uc
        .execute(
            author.id,
            WritingInput {
                title: Some("Hello, World!".into()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(SiteError::SlugTaken)));
}

#[tokio::test]
async fn should_forbid_create_without_both_privileges() {
    let staff = staff_only();
    let admin_only = test_user("admin@wrantle.com", false, true);
    let repo = MockWritingRepo::empty();
    let writings = repo.writings_handle();
    let uc = CreateWritingUseCase {
        users: MockUserRepo::new(vec![staff.clone(), admin_only.clone()]),
        writings: repo,
    };

    for actor in [staff.id, admin_only.id] {
        let result = uc
            .execute(
                actor,
                WritingInput {
                    title: Some("Nope".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(SiteError::Forbidden)));
    }
    assert!(writings.lock().unwrap().is_empty());
}

// ── update ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_regenerate_slug_only_when_title_changes() {
    let author = editor();
    let mut existing = test_writing(author.id, "custom-slug", WritingStatus::Draft, None);
    existing.title = "Original".into();
    let uc = UpdateWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: MockWritingRepo::new(vec![existing]),
    };

    let same_title = uc
        .execute(
            author.id,
            "custom-slug",
            WritingInput {
                title: Some("Original".into()),
                content: Some("New body".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same_title.slug, "custom-slug");
    assert_eq!(same_title.content, "New body");

    let renamed = uc
        .execute(
            author.id,
            "custom-slug",
            WritingInput {
                title: Some("Brand New Title".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.slug, "brand-new-title");
}

#[tokio::test]
async fn should_publish_on_update() {
    let author = editor();
    let existing = test_writing(author.id, "draft-post", WritingStatus::Draft, None);
    let repo = MockWritingRepo::new(vec![existing]);
    let writings = repo.writings_handle();
    let uc = UpdateWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: repo,
    };
    let when = Utc::now() - Duration::minutes(1);

    uc.execute(
        author.id,
        "draft-post",
        WritingInput {
            status: Some("published".into()),
            published_at: Some(Some(when.to_rfc3339())),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let stored = &writings.lock().unwrap()[0];
    assert_eq!(stored.status, WritingStatus::Published);
    assert!(stored.is_visible(Utc::now()));
}

#[tokio::test]
async fn should_clear_nullable_fields_on_explicit_null() {
    let author = editor();
    let mut existing = test_writing(
        author.id,
        "scheduled",
        WritingStatus::Published,
        Some(Utc::now() + Duration::days(1)),
    );
    existing.excerpt = Some("Teaser".into());
    existing.featured_image = Some("hero.png".into());
    let repo = MockWritingRepo::new(vec![existing]);
    let writings = repo.writings_handle();
    let uc = UpdateWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: repo,
    };

    // Absent fields are untouched.
    uc.execute(author.id, "scheduled", WritingInput::default())
        .await
        .unwrap();
    assert!(writings.lock().unwrap()[0].excerpt.is_some());

    uc.execute(
        author.id,
        "scheduled",
        WritingInput {
            published_at: Some(None),
            excerpt: Some(None),
            featured_image: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let stored = &writings.lock().unwrap()[0];
    assert_eq!(stored.published_at, None);
    assert_eq!(stored.excerpt, None);
    assert_eq!(stored.featured_image, None);
}

#[tokio::test]
async fn should_return_not_found_when_updating_missing_slug() {
    let author = editor();
    let uc = UpdateWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: MockWritingRepo::empty(),
    };

    let result = uc
        .execute(author.id, "missing", WritingInput::default())
        .await;
    assert!(matches!(result, Err(SiteError::WritingNotFound)));
}

// ── show ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_hide_unpublished_writings_from_visitors() {
    let author = editor();
    let draft = test_writing(author.id, "draft-post", WritingStatus::Draft, None);
    let scheduled = test_writing(
        author.id,
        "scheduled-post",
        WritingStatus::Published,
        Some(Utc::now() + Duration::days(1)),
    );
    let uc = ShowWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: MockWritingRepo::new(vec![draft, scheduled]),
    };

    for slug in ["draft-post", "scheduled-post"] {
        let anonymous = uc.execute(None, slug).await;
        assert!(
            matches!(anonymous, Err(SiteError::WritingNotFound)),
            "{slug} must be hidden from anonymous visitors"
        );
        let as_editor = uc.execute(Some(author.id), slug).await.unwrap();
        assert_eq!(as_editor.slug, slug);
    }
}

#[tokio::test]
async fn should_show_published_writing_to_everyone() {
    let author = editor();
    let published = test_writing(
        author.id,
        "live-post",
        WritingStatus::Published,
        Some(Utc::now() - Duration::hours(1)),
    );
    let reader = test_user("reader@example.com", false, false);
    let uc = ShowWritingUseCase {
        users: MockUserRepo::new(vec![author, reader.clone()]),
        writings: MockWritingRepo::new(vec![published]),
    };

    assert!(uc.execute(None, "live-post").await.is_ok());
    assert!(uc.execute(Some(reader.id), "live-post").await.is_ok());
}

// ── list ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_only_visible_writings_newest_first() {
    let author = editor();
    let now = Utc::now();
    let uc = ListPublishedWritingsUseCase {
        writings: MockWritingRepo::new(vec![
            test_writing(author.id, "older", WritingStatus::Published, Some(now - Duration::days(2))),
            test_writing(author.id, "draft", WritingStatus::Draft, Some(now - Duration::days(1))),
            test_writing(author.id, "newer", WritingStatus::Published, Some(now - Duration::hours(1))),
            test_writing(author.id, "future", WritingStatus::Published, Some(now + Duration::days(1))),
            test_writing(author.id, "undated", WritingStatus::Published, None),
        ]),
    };

    let listed = uc.execute(PageRequest::default()).await.unwrap();
    let slugs: Vec<&str> = listed.iter().map(|w| w.slug.as_str()).collect();
    assert_eq!(slugs, ["newer", "older"]);
}

#[tokio::test]
async fn should_list_drafts_for_editors_only() {
    let author = editor();
    let staff = staff_only();
    let uc = ListDraftWritingsUseCase {
        users: MockUserRepo::new(vec![author.clone(), staff.clone()]),
        writings: MockWritingRepo::new(vec![
            test_writing(author.id, "draft", WritingStatus::Draft, None),
            test_writing(author.id, "live", WritingStatus::Published, Some(Utc::now())),
        ]),
    };

    let drafts = uc.execute(author.id, PageRequest::default()).await.unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].slug, "draft");

    let result = uc.execute(staff.id, PageRequest::default()).await;
    assert!(matches!(result, Err(SiteError::Forbidden)));
}

// ── delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_writing_by_slug() {
    let author = editor();
    let repo = MockWritingRepo::new(vec![test_writing(
        author.id,
        "gone",
        WritingStatus::Draft,
        None,
    )]);
    let writings = repo.writings_handle();
    let uc = DeleteWritingUseCase {
        users: MockUserRepo::new(vec![author.clone()]),
        writings: repo,
    };

    uc.execute(author.id, "gone").await.unwrap();
    assert!(writings.lock().unwrap().is_empty());

    let again = uc.execute(author.id, "gone").await;
    assert!(matches!(again, Err(SiteError::WritingNotFound)));
}
