#![forbid(unsafe_code)]

use fo_core::ids::CompanyId;
use fo_core::recurrence::OccurrenceSlot;
use fo_core::status::{JobPriority, JobStatus, JobType};
use fo_storage::{
    JobCreateRequest, JobSetStatusRequest, JobUpdateRequest, SqliteStore, StoreError,
    TeamAssignmentAddRequest,
};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("fo_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn setup(test_name: &str) -> (SqliteStore, CompanyId) {
    let dir = temp_dir(test_name);
    let store = SqliteStore::open(&dir).expect("open store");
    let company = CompanyId::try_new("acme-plumbing".to_string()).expect("company id");
    (store, company)
}

fn create_request(title: &str) -> JobCreateRequest {
    JobCreateRequest {
        title: title.to_string(),
        description: Some("Replace the water heater".to_string()),
        priority: JobPriority::High,
        job_type: Some(JobType::Installation),
        property_id: "prop_001".to_string(),
        customer_id: Some("cust_001".to_string()),
        assigned_to: None,
        scheduled_start_ms: None,
        scheduled_end_ms: None,
        total_amount_cents: 45_000,
        notes: None,
        created_by: "user_owner".to_string(),
    }
}

#[test]
fn create_assigns_id_number_and_quoted_status() {
    let (mut store, company) = setup("create_basic");

    let job = store
        .job_create(&company, create_request("Water heater install"))
        .expect("create job");

    assert_eq!(job.status, JobStatus::Quoted);
    assert!(job.id.starts_with("job_"));
    assert!(job.number.starts_with("JOB-"));
    assert!(job.number.ends_with("-001"));
    assert_eq!(job.total_amount_cents, 45_000);
    assert!(job.actual_start_ms.is_none());

    let fetched = store
        .job_get(&company, &job.id)
        .expect("get job")
        .expect("job exists");
    assert_eq!(fetched.number, job.number);
    assert_eq!(fetched.title, "Water heater install");
}

#[test]
fn create_rejects_blank_title_and_negative_money() {
    let (mut store, company) = setup("create_invalid");

    let mut request = create_request("  ");
    let err = store.job_create(&company, request.clone()).unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));

    request.title = "ok".to_string();
    request.total_amount_cents = -1;
    let err = store.job_create(&company, request).unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn numbers_increment_per_company() {
    let (mut store, company) = setup("numbers_increment");

    let first = store
        .job_create(&company, create_request("First"))
        .expect("create first");
    let second = store
        .job_create(&company, create_request("Second"))
        .expect("create second");
    assert!(first.number.ends_with("-001"));
    assert!(second.number.ends_with("-002"));

    // A different company starts its own sequence.
    let other = CompanyId::try_new("other-co".to_string()).expect("company id");
    let job = store
        .job_create(&other, create_request("Other first"))
        .expect("create other");
    assert!(job.number.ends_with("-001"));
}

#[test]
fn set_status_stamps_actual_times() {
    let (mut store, company) = setup("status_stamps");
    let job = store
        .job_create(&company, create_request("Repair"))
        .expect("create");

    let started = store
        .job_set_status(
            &company,
            &job.id,
            JobSetStatusRequest {
                status: JobStatus::InProgress,
                scheduled_start_ms: None,
                scheduled_end_ms: None,
                reason: None,
                actor_id: "user_tech".to_string(),
            },
        )
        .expect("start");
    assert_eq!(started.status, JobStatus::InProgress);
    let start_stamp = started.actual_start_ms.expect("actual_start stamped");
    assert!(started.actual_end_ms.is_none());

    let completed = store
        .job_set_status(
            &company,
            &job.id,
            JobSetStatusRequest {
                status: JobStatus::Completed,
                scheduled_start_ms: None,
                scheduled_end_ms: None,
                reason: None,
                actor_id: "user_tech".to_string(),
            },
        )
        .expect("complete");
    assert_eq!(completed.actual_start_ms, Some(start_stamp));
    assert!(completed.actual_end_ms.is_some());
}

#[test]
fn cancel_appends_reason_to_notes() {
    let (mut store, company) = setup("cancel_reason");
    let mut request = create_request("Doomed job");
    request.notes = Some("Customer prefers mornings".to_string());
    let job = store.job_create(&company, request).expect("create");

    let cancelled = store
        .job_set_status(
            &company,
            &job.id,
            JobSetStatusRequest {
                status: JobStatus::Cancelled,
                scheduled_start_ms: None,
                scheduled_end_ms: None,
                reason: Some("customer moved away".to_string()),
                actor_id: "user_owner".to_string(),
            },
        )
        .expect("cancel");

    let notes = cancelled.notes.expect("notes present");
    assert!(notes.starts_with("Customer prefers mornings"));
    assert!(notes.ends_with("[CANCELLED]: customer moved away"));
}

#[test]
fn set_status_persists_schedule_supplied_with_request() {
    let (mut store, company) = setup("status_schedule");
    let job = store
        .job_create(&company, create_request("Schedule me"))
        .expect("create");

    let scheduled = store
        .job_set_status(
            &company,
            &job.id,
            JobSetStatusRequest {
                status: JobStatus::Scheduled,
                scheduled_start_ms: Some(1_700_000_000_000),
                scheduled_end_ms: Some(1_700_003_600_000),
                reason: None,
                actor_id: "user_owner".to_string(),
            },
        )
        .expect("schedule");
    assert_eq!(scheduled.scheduled_start_ms, Some(1_700_000_000_000));
    assert_eq!(scheduled.scheduled_end_ms, Some(1_700_003_600_000));
}

#[test]
fn update_merges_partial_fields() {
    let (mut store, company) = setup("update_partial");
    let job = store
        .job_create(&company, create_request("Original title"))
        .expect("create");

    let updated = store
        .job_update(
            &company,
            &job.id,
            JobUpdateRequest {
                priority: Some(JobPriority::Urgent),
                assigned_to: Some("user_tech".to_string()),
                ..JobUpdateRequest::default()
            },
        )
        .expect("update");

    assert_eq!(updated.title, "Original title");
    assert_eq!(updated.priority, JobPriority::Urgent);
    assert_eq!(updated.assigned_to.as_deref(), Some("user_tech"));
    assert_eq!(updated.total_amount_cents, 45_000);
}

#[test]
fn insert_occurrences_copies_seed_fields() {
    let (mut store, company) = setup("occurrences");
    let seed = store
        .job_create(&company, create_request("Quarterly filter swap"))
        .expect("create seed");

    let slots = vec![
        OccurrenceSlot {
            ordinal: 2,
            total: 3,
            title: "Quarterly filter swap (2/3)".to_string(),
            scheduled_start_ms: 1_710_000_000_000,
            scheduled_end_ms: None,
        },
        OccurrenceSlot {
            ordinal: 3,
            total: 3,
            title: "Quarterly filter swap (3/3)".to_string(),
            scheduled_start_ms: 1_717_800_000_000,
            scheduled_end_ms: None,
        },
    ];
    let created = store
        .job_insert_occurrences(&company, &seed.id, &slots)
        .expect("insert occurrences");

    assert_eq!(created.len(), 2);
    for (slot, job) in slots.iter().zip(&created) {
        assert_eq!(job.title, slot.title);
        assert_eq!(job.scheduled_start_ms, Some(slot.scheduled_start_ms));
        assert_eq!(job.status, seed.status);
        assert_eq!(job.property_id, seed.property_id);
        assert_eq!(job.total_amount_cents, seed.total_amount_cents);
        assert_ne!(job.id, seed.id);
        assert_ne!(job.number, seed.number);
    }
    assert!(created[0].number.ends_with("-002"));
    assert!(created[1].number.ends_with("-003"));
}

#[test]
fn insert_occurrences_unknown_seed_fails() {
    let (mut store, company) = setup("occurrences_unknown");
    let err = store
        .job_insert_occurrences(&company, "job_999999", &[])
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownId));
}

#[test]
fn detail_collects_relations() {
    let (mut store, company) = setup("detail_relations");
    let job = store
        .job_create(&company, create_request("With crew"))
        .expect("create");

    store
        .team_assignment_add(
            &company,
            TeamAssignmentAddRequest {
                job_id: job.id.clone(),
                user_id: "user_tech".to_string(),
                role: "lead".to_string(),
            },
        )
        .expect("assign");

    let detail = store.job_detail(&company, &job.id).expect("detail");
    assert_eq!(detail.team_assignments.len(), 1);
    assert_eq!(detail.team_assignments[0].user_id, "user_tech");
    assert!(detail.invoices.is_empty());

    let ctx = detail.transition_context();
    assert_eq!(ctx.team_assignments, vec!["user_tech".to_string()]);
}

#[test]
fn delete_removes_job_and_audit_trail() {
    let (mut store, company) = setup("delete_job");
    let job = store
        .job_create(&company, create_request("Temporary"))
        .expect("create");

    store.job_delete(&company, &job.id).expect("delete");
    assert!(store.job_get(&company, &job.id).expect("get").is_none());
    assert!(
        store
            .audit_tail(&company, &job.id, 10)
            .expect("tail")
            .is_empty()
    );

    let err = store.job_delete(&company, &job.id).unwrap_err();
    assert!(matches!(err, StoreError::UnknownId));
}

#[test]
fn audit_tail_records_lifecycle_newest_first() {
    let (mut store, company) = setup("audit_tail");
    let job = store
        .job_create(&company, create_request("Audited"))
        .expect("create");
    store
        .job_set_status(
            &company,
            &job.id,
            JobSetStatusRequest {
                status: JobStatus::InProgress,
                scheduled_start_ms: None,
                scheduled_end_ms: None,
                reason: None,
                actor_id: "user_tech".to_string(),
            },
        )
        .expect("start");

    let tail = store.audit_tail(&company, &job.id, 10).expect("tail");
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].action, "status_change");
    assert_eq!(tail[1].action, "created");
    assert_eq!(tail[0].actor_id.as_deref(), Some("user_tech"));
    let meta = tail[0].meta_json.as_deref().expect("meta json");
    assert!(meta.contains("\"from\":\"quoted\""));
    assert!(meta.contains("\"to\":\"in_progress\""));
}

#[test]
fn company_scoping_hides_other_companies() {
    let (mut store, company) = setup("company_scope");
    let job = store
        .job_create(&company, create_request("Mine"))
        .expect("create");

    let other = CompanyId::try_new("rival-co".to_string()).expect("company id");
    assert!(store.job_get(&other, &job.id).expect("get").is_none());
    let err = store.job_detail(&other, &job.id).unwrap_err();
    assert!(matches!(err, StoreError::UnknownId));
}
