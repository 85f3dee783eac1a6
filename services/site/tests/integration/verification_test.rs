use chrono::{Duration, Utc};

use wrantle_domain::verification::{VerificationType, is_well_formed_code};
use wrantle_site::domain::types::VERIFICATION_CODE_CREATED;
use wrantle_site::error::SiteError;
use wrantle_site::usecase::verification::{
    RequestVerificationInput, RequestVerificationUseCase, VerifyCodeInput, VerifyCodeUseCase,
};

use crate::helpers::{MockUserRepo, MockVerificationCodeRepo, test_code, test_user};

fn request_usecase(
    users: &MockUserRepo,
) -> (
    RequestVerificationUseCase<MockUserRepo, MockVerificationCodeRepo>,
    MockVerificationCodeRepo,
) {
    let codes = MockVerificationCodeRepo::new(users.users_handle());
    let uc = RequestVerificationUseCase {
        users: users.clone(),
        codes: codes.clone(),
        org_domain: "wrantle.com".to_owned(),
    };
    (uc, codes)
}

#[tokio::test]
async fn should_issue_code_and_mail_event_for_org_address() {
    let user = test_user("user@wrantle.com", false, false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let (uc, codes) = request_usecase(&users);

    let before = Utc::now();
    let issued = uc
        .execute(RequestVerificationInput {
            user_id: user.id,
            verification_type: VerificationType::Staff,
        })
        .await
        .unwrap();

    let stored = codes.codes.lock().unwrap();
    assert_eq!(stored.len(), 1, "expected exactly one verification code");
    assert_eq!(stored[0].user_id, user.id);
    assert_eq!(stored[0].verification_type, VerificationType::Staff);
    assert!(is_well_formed_code(&stored[0].code), "got {:?}", stored[0].code);
    assert!(stored[0].used_at.is_none());
    assert!(issued.expires_at >= before + Duration::minutes(30));
    assert!(issued.expires_at <= Utc::now() + Duration::minutes(30));

    let events = codes.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, VERIFICATION_CODE_CREATED);
    assert_eq!(events[0].payload["email"], "user@wrantle.com");
    assert_eq!(events[0].payload["code"], stored[0].code.as_str());
    assert_eq!(events[0].payload["verification_type"], "staff");
}

#[tokio::test]
async fn should_refuse_addresses_outside_org_domain() {
    let user = test_user("user@example.com", false, false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let (uc, codes) = request_usecase(&users);

    let result = uc
        .execute(RequestVerificationInput {
            user_id: user.id,
            verification_type: VerificationType::Admin,
        })
        .await;

    assert!(
        matches!(result, Err(SiteError::IneligibleDomain(ref d)) if d == "wrantle.com"),
        "expected IneligibleDomain, got {result:?}"
    );
    assert!(codes.codes.lock().unwrap().is_empty());
    assert!(codes.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_refuse_lookalike_domains() {
    let user = test_user("user@notwrantle.com", false, false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let (uc, _codes) = request_usecase(&users);

    let result = uc
        .execute(RequestVerificationInput {
            user_id: user.id,
            verification_type: VerificationType::Staff,
        })
        .await;

    assert!(matches!(result, Err(SiteError::IneligibleDomain(_))));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_user() {
    let users = MockUserRepo::empty();
    let (uc, _codes) = request_usecase(&users);

    let result = uc
        .execute(RequestVerificationInput {
            user_id: uuid::Uuid::new_v4(),
            verification_type: VerificationType::Staff,
        })
        .await;

    assert!(matches!(result, Err(SiteError::UserNotFound)));
}

#[tokio::test]
async fn should_keep_earlier_codes_valid_after_new_request() {
    let user = test_user("user@wrantle.com", false, false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let (uc, codes) = request_usecase(&users);

    for _ in 0..2 {
        uc.execute(RequestVerificationInput {
            user_id: user.id,
            verification_type: VerificationType::Staff,
        })
        .await
        .unwrap();
    }

    let now = Utc::now();
    let stored = codes.codes.lock().unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|c| c.is_active(now)));
}

#[tokio::test]
async fn should_grant_staff_once_and_reject_reuse() {
    let user = test_user("user@wrantle.com", false, false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let (request, codes) = request_usecase(&users);

    request
        .execute(RequestVerificationInput {
            user_id: user.id,
            verification_type: VerificationType::Staff,
        })
        .await
        .unwrap();
    let issued = codes.codes.lock().unwrap()[0].code.clone();

    let verify = VerifyCodeUseCase { codes };

    // Wrong but well-formed code.
    let wrong = if issued == "000000" { "FFFFFF" } else { "000000" };
    let result = verify
        .execute(VerifyCodeInput {
            user_id: user.id,
            verification_type: VerificationType::Staff,
            code: wrong.to_owned(),
        })
        .await;
    assert!(matches!(result, Err(SiteError::InvalidVerificationCode)));
    assert!(!users.users.lock().unwrap()[0].is_staff);

    verify
        .execute(VerifyCodeInput {
            user_id: user.id,
            verification_type: VerificationType::Staff,
            code: issued.clone(),
        })
        .await
        .unwrap();
    {
        let stored_user = &users.users.lock().unwrap()[0];
        assert!(stored_user.is_staff);
        assert!(!stored_user.is_admin, "staff code must not grant admin");
        assert!(verify.codes.codes.lock().unwrap()[0].used_at.is_some());
    }

    let result = verify
        .execute(VerifyCodeInput {
            user_id: user.id,
            verification_type: VerificationType::Staff,
            code: issued,
        })
        .await;
    assert!(
        matches!(result, Err(SiteError::InvalidVerificationCode)),
        "second submission must fail, got {result:?}"
    );
}

#[tokio::test]
async fn should_grant_admin_for_admin_code() {
    let user = test_user("user@wrantle.com", true, false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let codes = MockVerificationCodeRepo::new(users.users_handle());
    codes
        .codes
        .lock()
        .unwrap()
        .push(test_code(user.id, VerificationType::Admin, "A1B2C3"));

    VerifyCodeUseCase { codes }
        .execute(VerifyCodeInput {
            user_id: user.id,
            verification_type: VerificationType::Admin,
            code: " A1B2C3\n".to_owned(),
        })
        .await
        .unwrap();

    let stored_user = &users.users.lock().unwrap()[0];
    assert!(stored_user.is_staff && stored_user.is_admin);
}

#[tokio::test]
async fn should_reject_code_for_other_type() {
    let user = test_user("user@wrantle.com", false, false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let codes = MockVerificationCodeRepo::new(users.users_handle());
    codes
        .codes
        .lock()
        .unwrap()
        .push(test_code(user.id, VerificationType::Staff, "A1B2C3"));

    let result = VerifyCodeUseCase { codes }
        .execute(VerifyCodeInput {
            user_id: user.id,
            verification_type: VerificationType::Admin,
            code: "A1B2C3".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(SiteError::InvalidVerificationCode)));
    assert!(!users.users.lock().unwrap()[0].is_admin);
}

#[tokio::test]
async fn should_reject_expired_code() {
    let user = test_user("user@wrantle.com", false, false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let codes = MockVerificationCodeRepo::new(users.users_handle());
    let mut expired = test_code(user.id, VerificationType::Staff, "A1B2C3");
    expired.expires_at = Utc::now() - Duration::seconds(1);
    codes.codes.lock().unwrap().push(expired);

    let result = VerifyCodeUseCase { codes }
        .execute(VerifyCodeInput {
            user_id: user.id,
            verification_type: VerificationType::Staff,
            code: "A1B2C3".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(SiteError::InvalidVerificationCode)));
    assert!(!users.users.lock().unwrap()[0].is_staff);
}

#[tokio::test]
async fn should_reject_another_users_code() {
    let owner = test_user("owner@wrantle.com", false, false);
    let other = test_user("other@wrantle.com", false, false);
    let users = MockUserRepo::new(vec![owner.clone(), other.clone()]);
    let codes = MockVerificationCodeRepo::new(users.users_handle());
    codes
        .codes
        .lock()
        .unwrap()
        .push(test_code(owner.id, VerificationType::Staff, "A1B2C3"));

    let result = VerifyCodeUseCase { codes }
        .execute(VerifyCodeInput {
            user_id: other.id,
            verification_type: VerificationType::Staff,
            code: "A1B2C3".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(SiteError::InvalidVerificationCode)));
}

#[tokio::test]
async fn should_reject_malformed_codes_without_lookup() {
    let user = test_user("user@wrantle.com", false, false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let codes = MockVerificationCodeRepo::new(users.users_handle());
    codes
        .codes
        .lock()
        .unwrap()
        .push(test_code(user.id, VerificationType::Staff, "A1B2C3"));
    let verify = VerifyCodeUseCase { codes };

    for submitted in ["", "a1b2c3", "A1B2C", "A1B2C3D", "G1B2C3"] {
        let result = verify
            .execute(VerifyCodeInput {
                user_id: user.id,
                verification_type: VerificationType::Staff,
                code: submitted.to_owned(),
            })
            .await;
        assert!(
            matches!(result, Err(SiteError::InvalidVerificationCode)),
            "{submitted:?} should be rejected"
        );
    }
    assert!(verify.codes.codes.lock().unwrap()[0].used_at.is_none());
}
