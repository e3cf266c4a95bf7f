//! Integration specifications for the job post lifecycle.
//!
//! Scenarios run through the public service facade and the HTTP router so
//! authorization, optimistic preconditions, syndication teardown, and outbox
//! events are validated end to end.

mod common {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use hireboard::infra::{InMemoryJobPostRepository, InMemoryOutbox, RecordingSyndication};
    use hireboard::workflows::billing::Paise;
    use hireboard::workflows::jobs::domain::{
        AgencyCategory, AgencyInvoiceType, JobPost, JobStatus, JobType, NewJobPost, Platform,
    };
    use hireboard::workflows::jobs::repository::JobPostRepository;
    use hireboard::workflows::jobs::JobWorkflowService;
    use hireboard::workflows::types::{CompanyId, EntityId, JobPostId, UserId};

    pub(super) const OWNER: UserId = UserId(10);
    pub(super) const ADMIN: UserId = UserId(1);

    pub(super) type Service =
        JobWorkflowService<InMemoryJobPostRepository, RecordingSyndication, InMemoryOutbox>;

    pub(super) fn draft_post(id: u64) -> JobPost {
        let skills: BTreeSet<EntityId> = [EntityId(5), EntityId(7)].into_iter().collect();
        JobPost::draft(NewJobPost {
            id: JobPostId(id),
            title: "Senior Backend Engineer".to_string(),
            user: OWNER,
            company: CompanyId(3),
            job_type: JobType::FullTime,
            major_skill: EntityId(5),
            skills,
            location: [EntityId(100)].into_iter().collect(),
            edu_qualification: BTreeSet::new(),
            industry: BTreeSet::new(),
            functional_area: BTreeSet::new(),
            syndicate_to: vec![Platform::Facebook, Platform::Linkedin],
            agency_amount: Some(Paise::from_rupees(100_000)),
            agency_category: Some(AgencyCategory {
                name: "Standard".to_string(),
                percentage: 10.0,
            }),
            agency_invoice_type: AgencyInvoiceType::OneTime,
        })
        .expect("valid draft")
    }

    pub(super) fn seeded_post(id: u64, status: JobStatus) -> JobPost {
        let mut post = draft_post(id);
        post.status = status;
        post
    }

    pub(super) fn build_service() -> (
        Arc<Service>,
        Arc<InMemoryJobPostRepository>,
        Arc<RecordingSyndication>,
        Arc<InMemoryOutbox>,
    ) {
        let repository = Arc::new(InMemoryJobPostRepository::default());
        let syndication = Arc::new(RecordingSyndication::default());
        let outbox = Arc::new(InMemoryOutbox::default());
        let service = Arc::new(JobWorkflowService::new(
            repository.clone(),
            syndication.clone(),
            outbox.clone(),
        ));
        (service, repository, syndication, outbox)
    }

    pub(super) fn seed(repository: &InMemoryJobPostRepository, post: JobPost) -> JobPostId {
        let id = post.id;
        repository.insert(post).expect("seed post");
        id
    }
}

mod lifecycle {
    use super::common::*;
    use hireboard::infra::RecordingSyndication;
    use hireboard::workflows::jobs::domain::{JobAction, JobStatus, Platform};
    use hireboard::workflows::jobs::events::DomainEvent;
    use hireboard::workflows::jobs::repository::{JobPostRepository, RepositoryError};
    use hireboard::workflows::jobs::WorkflowError;
    use hireboard::workflows::types::{Actor, UserId};

    #[test]
    fn submit_moves_draft_to_pending_for_the_owner() {
        let (service, repository, _, _) = build_service();
        let id = seed(&repository, draft_post(1));

        let outcome = service
            .submit(id, &Actor::recruiter(OWNER))
            .expect("owner submits");
        assert_eq!(outcome.status, JobStatus::Pending);

        let history = service.transitions(id).expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].from, JobStatus::Draft);
        assert_eq!(history[0].to, JobStatus::Pending);
        assert_eq!(history[0].actor, OWNER);
    }

    #[test]
    fn foreign_recruiter_is_rejected_without_side_effects() {
        let (service, repository, syndication, outbox) = build_service();
        let id = seed(&repository, draft_post(1));

        let err = service
            .submit(id, &Actor::recruiter(UserId(99)))
            .expect_err("not the owner");
        assert!(matches!(err, WorkflowError::PermissionDenied(UserId(99))));

        assert_eq!(service.fetch_post(id).expect("post").status, JobStatus::Draft);
        assert!(service.transitions(id).expect("history").is_empty());
        assert!(syndication.calls().is_empty());
        assert!(outbox.events().is_empty());
    }

    #[test]
    fn publish_toggle_round_trips_and_tears_down_syndication() {
        let (service, repository, syndication, outbox) = build_service();
        let id = seed(&repository, seeded_post(1, JobStatus::Pending));
        let admin = Actor::admin(ADMIN);

        let outcome = service.toggle_publish(id, &admin).expect("publish");
        assert_eq!(outcome.status, JobStatus::Published);
        assert_eq!(
            outbox.events(),
            vec![DomainEvent::JobPublished {
                job_post: id,
                platforms: vec![Platform::Facebook, Platform::Linkedin],
            }]
        );
        assert!(syndication.calls().is_empty());

        let outcome = service.toggle_publish(id, &admin).expect("roll back");
        assert_eq!(outcome.status, JobStatus::Pending);
        // Both syndicated copies are retracted synchronously on the way down.
        let retracted: Vec<_> = syndication
            .calls()
            .into_iter()
            .filter(|(_, _, op)| *op == "retract")
            .collect();
        assert_eq!(retracted.len(), 2);
    }

    #[test]
    fn publish_toggle_requires_admin() {
        let (service, repository, _, _) = build_service();
        let id = seed(&repository, seeded_post(1, JobStatus::Pending));

        let err = service
            .toggle_publish(id, &Actor::recruiter(OWNER))
            .expect_err("owner is not a moderator");
        assert!(matches!(err, WorkflowError::PermissionDenied(_)));
    }

    #[test]
    fn approve_moves_published_to_live_and_notifies_recruiter() {
        let (service, repository, _, outbox) = build_service();
        let id = seed(&repository, seeded_post(1, JobStatus::Published));

        let outcome = service.approve(id, &Actor::admin(ADMIN)).expect("approve");
        assert_eq!(outcome.status, JobStatus::Live);
        assert!(outbox.events().contains(&DomainEvent::JobLive {
            job_post: id,
            recruiter: OWNER,
        }));
    }

    #[test]
    fn live_expired_toggle_retracts_only_when_expiring() {
        let (service, repository, syndication, outbox) = build_service();
        let id = seed(&repository, seeded_post(1, JobStatus::Live));
        let admin = Actor::admin(ADMIN);

        let outcome = service.toggle_live_expired(id, &admin).expect("expire");
        assert_eq!(outcome.status, JobStatus::Expired);
        assert_eq!(syndication.calls().len(), 2);
        assert!(outbox.events().contains(&DomainEvent::JobExpired {
            job_post: id,
            recruiter: OWNER,
        }));

        let outcome = service.toggle_live_expired(id, &admin).expect("revive");
        assert_eq!(outcome.status, JobStatus::Live);
        // No further retraction on the way back up.
        assert_eq!(syndication.calls().len(), 2);
    }

    #[test]
    fn deactivate_then_enable_restores_the_previous_status() {
        let (service, repository, _, _) = build_service();
        let id = seed(&repository, seeded_post(1, JobStatus::Live));
        let owner = Actor::recruiter(OWNER);

        let outcome = service.deactivate(id, &owner).expect("deactivate");
        assert_eq!(outcome.status, JobStatus::Disabled);
        assert_eq!(outcome.previous_status, Some(JobStatus::Live));
        assert!(service.fetch_post(id).expect("post").closed_on.is_some());

        let outcome = service.enable(id, &owner).expect("enable");
        assert_eq!(outcome.status, JobStatus::Live);
        assert_eq!(outcome.previous_status, None);
        assert!(service.fetch_post(id).expect("post").closed_on.is_none());
    }

    #[test]
    fn enable_falls_back_to_draft_when_no_previous_status_was_recorded() {
        let (service, repository, _, _) = build_service();
        let mut post = seeded_post(1, JobStatus::Disabled);
        post.previous_status = None;
        let id = seed(&repository, post);

        let outcome = service
            .enable(id, &Actor::recruiter(OWNER))
            .expect("enable");
        assert_eq!(outcome.status, JobStatus::Draft);
    }

    #[test]
    fn deactivating_a_disabled_post_is_an_invalid_transition() {
        let (service, repository, _, _) = build_service();
        let id = seed(&repository, seeded_post(1, JobStatus::Disabled));

        let err = service
            .deactivate(id, &Actor::recruiter(OWNER))
            .expect_err("already disabled");
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition {
                from: JobStatus::Disabled,
                ..
            }
        ));
    }

    #[test]
    fn enable_republishes_visible_posts() {
        let (service, repository, _, outbox) = build_service();
        let mut post = seeded_post(1, JobStatus::Disabled);
        post.previous_status = Some(JobStatus::Published);
        let id = seed(&repository, post);

        service
            .enable(id, &Actor::recruiter(OWNER))
            .expect("enable");
        assert!(matches!(
            outbox.events().as_slice(),
            [DomainEvent::JobPublished { .. }]
        ));
    }

    #[test]
    fn mark_hired_records_the_agency_message() {
        let (service, repository, _, _) = build_service();
        let id = seed(&repository, seeded_post(1, JobStatus::Live));

        let outcome = service
            .mark_hired(id, "Placement confirmed".to_string(), &Actor::recruiter(OWNER))
            .expect("hire");
        assert_eq!(outcome.status, JobStatus::Hired);
        assert_eq!(
            repository.hire_message(id).expect("message"),
            Some("Placement confirmed".to_string())
        );
    }

    #[test]
    fn hard_delete_is_admin_only_and_retracts_first() {
        let (service, repository, syndication, _) = build_service();
        let id = seed(&repository, seeded_post(1, JobStatus::Published));

        let err = service
            .hard_delete(id, &Actor::recruiter(OWNER))
            .expect_err("owners cannot purge");
        assert!(matches!(err, WorkflowError::PermissionDenied(_)));

        service
            .hard_delete(id, &Actor::admin(ADMIN))
            .expect("admin purge");
        assert!(matches!(
            service.fetch_post(id),
            Err(WorkflowError::NotFound(_))
        ));
        assert_eq!(syndication.calls().len(), 2);
    }

    #[test]
    fn syndication_failures_never_abort_the_transition() {
        let (service, repository, syndication, _) = build_service();
        let id = seed(&repository, seeded_post(1, JobStatus::Live));
        syndication.set_failing(true);

        let outcome = service
            .deactivate(id, &Actor::recruiter(OWNER))
            .expect("deactivate despite transport failure");
        assert_eq!(outcome.status, JobStatus::Disabled);
    }

    #[test]
    fn concurrent_status_change_is_a_conflict() {
        let (_, repository, _, _) = build_service();
        seed(&repository, seeded_post(1, JobStatus::Live));

        let stale = seeded_post(1, JobStatus::Pending);
        let err = repository
            .update_if_status(stale, JobStatus::Pending)
            .expect_err("status moved underneath");
        assert!(matches!(
            err,
            RepositoryError::StatusConflict {
                expected: JobStatus::Pending,
                found: JobStatus::Live,
            }
        ));
    }

    #[test]
    fn dispatch_covers_every_action() {
        let (service, repository, _, _) = build_service();
        let id = seed(&repository, draft_post(1));
        let admin = Actor::admin(ADMIN);

        service
            .change_status(id, JobAction::Submit, &Actor::recruiter(OWNER))
            .expect("submit");
        service
            .change_status(id, JobAction::TogglePublish, &admin)
            .expect("publish");
        service
            .change_status(id, JobAction::Approve, &admin)
            .expect("approve");
        service
            .change_status(
                id,
                JobAction::MarkHired {
                    message: "done".to_string(),
                },
                &Actor::recruiter(OWNER),
            )
            .expect("hire");
        assert_eq!(
            service.fetch_post(id).expect("post").status,
            JobStatus::Hired
        );
        assert_eq!(service.transitions(id).expect("history").len(), 4);
    }

    #[test]
    fn syndication_fake_records_publish_and_retract() {
        use hireboard::workflows::jobs::events::SyndicationService;
        use hireboard::workflows::types::JobPostId;

        let syndication = RecordingSyndication::default();
        syndication
            .publish(JobPostId(1), Platform::Twitter)
            .expect("publish");
        syndication
            .retract(JobPostId(1), Platform::Twitter)
            .expect("retract");
        assert_eq!(
            syndication.calls(),
            vec![
                (JobPostId(1), Platform::Twitter, "publish"),
                (JobPostId(1), Platform::Twitter, "retract"),
            ]
        );
    }
}

mod relay {
    use super::common::*;
    use std::sync::Arc;

    use hireboard::infra::{RecordingNotifier, RecordingSyndication};
    use hireboard::workflows::jobs::domain::{JobStatus, Platform};
    use hireboard::workflows::jobs::SyndicationRelay;
    use hireboard::workflows::types::Actor;

    #[test]
    fn drained_events_reach_syndication_and_notifications() {
        let (service, repository, _, outbox) = build_service();
        let id = seed(&repository, seeded_post(1, JobStatus::Pending));
        let admin = Actor::admin(ADMIN);

        service.toggle_publish(id, &admin).expect("publish");
        service.approve(id, &admin).expect("approve");

        let downstream = Arc::new(RecordingSyndication::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let relay = SyndicationRelay::new(downstream.clone(), notifier.clone());
        relay.deliver_all(&outbox.drain());

        let published: Vec<_> = downstream
            .calls()
            .into_iter()
            .filter(|(_, _, op)| *op == "publish")
            .map(|(_, platform, _)| platform)
            .collect();
        assert_eq!(published, vec![Platform::Facebook, Platform::Linkedin]);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "job_post_live");
        assert_eq!(sent[0].1, vec![OWNER]);

        assert!(outbox.events().is_empty());
    }
}

mod router {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use hireboard::workflows::jobs::domain::JobStatus;
    use hireboard::workflows::jobs::jobs_router;
    use hireboard::workflows::jobs::repository::JobPostRepository;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn seeded_router(status: JobStatus) -> axum::Router {
        let (service, repository, _, _) = build_service();
        repository.insert(seeded_post(7, status)).expect("seed");
        jobs_router(service)
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&payload).expect("serialize")))
            .expect("request")
    }

    #[tokio::test]
    async fn status_endpoint_applies_the_requested_action() {
        let router = seeded_router(JobStatus::Draft);
        let payload = json!({
            "action": { "kind": "submit" },
            "actor": { "id": OWNER, "role": "recruiter" },
        });

        let response = router
            .oneshot(post_json("/api/v1/jobs/7/status", payload))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("status"), Some(&json!("pending")));
    }

    #[tokio::test]
    async fn unauthorized_actor_gets_403() {
        let router = seeded_router(JobStatus::Pending);
        let payload = json!({
            "action": { "kind": "toggle_publish" },
            "actor": { "id": OWNER, "role": "recruiter" },
        });

        let response = router
            .oneshot(post_json("/api/v1/jobs/7/status", payload))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn invalid_transition_gets_422() {
        let router = seeded_router(JobStatus::Live);
        let payload = json!({
            "action": { "kind": "submit" },
            "actor": { "id": OWNER, "role": "recruiter" },
        });

        let response = router
            .oneshot(post_json("/api/v1/jobs/7/status", payload))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_post_gets_404() {
        let router = seeded_router(JobStatus::Draft);
        let payload = json!({
            "actor": { "id": ADMIN, "role": "admin" },
        });

        let response = router
            .oneshot(post_json("/api/v1/jobs/999/deactivate", payload))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deactivate_and_transitions_endpoints_round_trip() {
        let router = seeded_router(JobStatus::Live);
        let payload = json!({
            "actor": { "id": OWNER, "role": "recruiter" },
        });

        let response = router
            .clone()
            .oneshot(post_json("/api/v1/jobs/7/deactivate", payload))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let outcome: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(outcome.get("status"), Some(&json!("disabled")));
        assert_eq!(outcome.get("previous_status"), Some(&json!("live")));

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/jobs/7/transitions")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 4096).await.expect("body");
        let records: Value = serde_json::from_slice(&body).expect("json");
        let records = records.as_array().expect("array");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("to"), Some(&json!("disabled")));
    }

    #[tokio::test]
    async fn delete_endpoint_purges_the_post() {
        let router = seeded_router(JobStatus::Expired);
        let payload = json!({
            "actor": { "id": ADMIN, "role": "admin" },
        });

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/v1/jobs/7")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&payload).expect("serialize")))
            .expect("request");

        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/jobs/7/transitions")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let records: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(records, json!([]));
    }
}
