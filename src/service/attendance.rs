use crate::auth::identity::Tenant;
use crate::error::AppError;
use crate::model::attendance::{
    Attendance, AttendanceStatus, MarkAttendanceRequest, NewAttendance, OverallStats,
};
use crate::store::Store;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::info;

/// Validates a sitting and stores it with its details as one unit.
///
/// Every reference is checked before anything is written, so a bad student
/// id or status leaves the store untouched. A sitting for the same date,
/// batch and subject replaces the earlier one.
pub async fn mark(
    store: &dyn Store,
    tenant: Tenant,
    req: MarkAttendanceRequest,
) -> Result<Attendance, AppError> {
    let batch = store
        .find_batch(tenant.institute_id, req.batch_id)
        .await?
        .ok_or_else(|| AppError::not_found("Batch"))?;

    if let Some(subject_id) = req.subject_id {
        store
            .find_subject(subject_id)
            .await?
            .ok_or_else(|| AppError::not_found("Subject"))?;
    }

    let mut seen = HashSet::with_capacity(req.attendance_details.len());
    let mut details = Vec::with_capacity(req.attendance_details.len());
    for entry in &req.attendance_details {
        store
            .find_student(tenant.institute_id, entry.student_id)
            .await?
            .ok_or_else(|| AppError::not_found("Student"))?;

        let status = AttendanceStatus::from_str(entry.status.trim()).map_err(|_| {
            AppError::InvalidArgument(format!("Unknown attendance status: {}", entry.status))
        })?;

        if !seen.insert(entry.student_id) {
            return Err(AppError::InvalidArgument(format!(
                "Student {} listed more than once",
                entry.student_id
            )));
        }
        details.push((entry.student_id, status));
    }

    let saved = store
        .save_attendance(NewAttendance {
            date: req.attendance_date,
            batch_id: batch.id,
            subject_id: req.subject_id,
            institute_id: tenant.institute_id,
            details,
        })
        .await?;

    info!(
        attendance_id = saved.id,
        batch_id = saved.batch_id,
        date = %saved.date,
        entries = saved.details.len(),
        "Attendance marked"
    );
    Ok(saved)
}

/// Sittings of the tenant on a date, narrowed by batch and subject when given.
pub async fn by_date(
    store: &dyn Store,
    tenant: Tenant,
    date: NaiveDate,
    batch_id: Option<u64>,
    subject_id: Option<u64>,
) -> Result<Vec<Attendance>, AppError> {
    let records = store.attendance_on(tenant.institute_id, date).await?;
    Ok(records
        .into_iter()
        .filter(|a| batch_id.map_or(true, |id| a.batch_id == id))
        .filter(|a| subject_id.map_or(true, |id| a.subject_id == Some(id)))
        .collect())
}

fn rate(present: i64, total: i64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let pct = present as f64 * 100.0 / total as f64;
    Some((pct * 100.0).round() / 100.0)
}

pub async fn overall_stats(
    store: &dyn Store,
    tenant: Tenant,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<OverallStats, AppError> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(AppError::InvalidArgument(
                "from must not be after to".to_string(),
            ));
        }
    }

    let total_students = store.count_students(tenant.institute_id).await?;
    let total_batches = store.count_batches(tenant.institute_id).await?;
    let counts = store.status_counts(tenant.institute_id, from, to).await?;

    Ok(OverallStats {
        total_students,
        total_batches,
        total_records: counts.total,
        present_count: counts.present,
        attendance_rate: rate(counts.present, counts.total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceDetailRequest;
    use crate::model::batch::BatchInput;
    use crate::model::student::StudentInput;
    use crate::model::subject::SubjectInput;
    use crate::service::subject;
    use crate::store::InMemoryStore;

    const A: Tenant = Tenant { institute_id: 1 };
    const B: Tenant = Tenant { institute_id: 2 };

    struct Fixture {
        store: InMemoryStore,
        batch: u64,
        other_batch: u64,
        subject: u64,
        students: Vec<u64>,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let batch_input = |name: &str| BatchInput {
            name: name.to_string(),
            description: None,
        };
        let batch = store.insert_batch(1, &batch_input("Morning")).await.unwrap().id;
        let other_batch = store.insert_batch(1, &batch_input("Evening")).await.unwrap().id;
        let subject = store
            .insert_subject(&SubjectInput {
                name: "Physics".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id;

        let mut students = Vec::new();
        for name in ["Asha", "Ravi", "Meera"] {
            let student = store
                .insert_student(
                    1,
                    &StudentInput {
                        name: name.to_string(),
                        batch_ids: vec![batch],
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            students.push(student.id);
        }

        Fixture {
            store,
            batch,
            other_batch,
            subject,
            students,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn request(
        batch_id: u64,
        subject_id: Option<u64>,
        date: NaiveDate,
        entries: &[(u64, &str)],
    ) -> MarkAttendanceRequest {
        MarkAttendanceRequest {
            batch_id,
            subject_id,
            attendance_date: date,
            attendance_details: entries
                .iter()
                .map(|(student_id, status)| AttendanceDetailRequest {
                    student_id: *student_id,
                    status: status.to_string(),
                })
                .collect(),
        }
    }

    #[actix_web::test]
    async fn marks_one_record_with_one_detail_per_entry() {
        let f = fixture().await;
        let entries: Vec<(u64, &str)> = f
            .students
            .iter()
            .zip(["PRESENT", "ABSENT", "LATE"])
            .map(|(id, s)| (*id, s))
            .collect();

        let saved = mark(&f.store, A, request(f.batch, Some(f.subject), day(15), &entries))
            .await
            .unwrap();

        assert_eq!(saved.institute_id, A.institute_id);
        assert_eq!(saved.details.len(), 3);
        assert_eq!(saved.details[1].status, AttendanceStatus::Absent);
        assert_eq!(by_date(&f.store, A, day(15), None, None).await.unwrap(), vec![saved]);
    }

    #[actix_web::test]
    async fn unknown_student_persists_nothing() {
        let f = fixture().await;
        let req = request(
            f.batch,
            None,
            day(15),
            &[(f.students[0], "PRESENT"), (9_999, "PRESENT")],
        );

        let err = mark(&f.store, A, req).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(by_date(&f.store, A, day(15), None, None).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn unrecognised_status_persists_nothing() {
        let f = fixture().await;
        let req = request(
            f.batch,
            None,
            day(15),
            &[(f.students[0], "PRESENT"), (f.students[1], "MAYBE")],
        );

        let err = mark(&f.store, A, req).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(by_date(&f.store, A, day(15), None, None).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn repeated_student_is_rejected() {
        let f = fixture().await;
        let req = request(
            f.batch,
            None,
            day(15),
            &[(f.students[0], "PRESENT"), (f.students[0], "ABSENT")],
        );
        let err = mark(&f.store, A, req).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[actix_web::test]
    async fn missing_batch_or_subject_is_not_found() {
        let f = fixture().await;
        let no_batch = mark(&f.store, A, request(9_999, None, day(15), &[])).await;
        assert!(matches!(no_batch.unwrap_err(), AppError::NotFound(_)));

        let no_subject = mark(&f.store, A, request(f.batch, Some(9_999), day(15), &[])).await;
        assert!(matches!(no_subject.unwrap_err(), AppError::NotFound(_)));

        let foreign = mark(&f.store, B, request(f.batch, None, day(15), &[])).await;
        assert!(matches!(foreign.unwrap_err(), AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn re_marking_the_same_sitting_replaces_it() {
        let f = fixture().await;
        let first = mark(
            &f.store,
            A,
            request(f.batch, Some(f.subject), day(15), &[(f.students[0], "ABSENT")]),
        )
        .await
        .unwrap();
        let second = mark(
            &f.store,
            A,
            request(f.batch, Some(f.subject), day(15), &[(f.students[0], "PRESENT")]),
        )
        .await
        .unwrap();

        assert_ne!(first.id, second.id);
        let stored = by_date(&f.store, A, day(15), None, None).await.unwrap();
        assert_eq!(stored, vec![second]);
    }

    #[actix_web::test]
    async fn subject_with_sittings_cannot_be_deleted() {
        let f = fixture().await;
        let physics = mark(
            &f.store,
            A,
            request(f.batch, Some(f.subject), day(15), &[(f.students[0], "PRESENT")]),
        )
        .await
        .unwrap();
        mark(&f.store, A, request(f.batch, None, day(15), &[(f.students[1], "ABSENT")]))
            .await
            .unwrap();

        let err = subject::delete(&f.store, f.subject).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let general = mark(
            &f.store,
            A,
            request(f.batch, None, day(15), &[(f.students[1], "PRESENT")]),
        )
        .await
        .unwrap();

        let stored = by_date(&f.store, A, day(15), Some(f.batch), None).await.unwrap();
        assert_eq!(stored, vec![physics.clone(), general]);
        assert_eq!(stored[0].details, physics.details);
        assert!(subject::get(&f.store, f.subject).await.is_ok());
    }

    #[actix_web::test]
    async fn concurrent_marks_of_one_sitting_keep_a_single_record() {
        let f = fixture().await;
        let marks = ["PRESENT", "ABSENT", "LATE", "LEAVE"].map(|status| {
            mark(
                &f.store,
                A,
                request(f.batch, Some(f.subject), day(15), &[(f.students[0], status)]),
            )
        });
        let results = futures::future::join_all(marks).await;
        assert!(results.iter().all(|r| r.is_ok()));

        let stored = by_date(&f.store, A, day(15), Some(f.batch), Some(f.subject))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].details.len(), 1);
    }

    #[actix_web::test]
    async fn filters_by_batch_and_subject() {
        let f = fixture().await;
        let with_subject = mark(
            &f.store,
            A,
            request(f.batch, Some(f.subject), day(15), &[(f.students[0], "PRESENT")]),
        )
        .await
        .unwrap();
        let without_subject = mark(&f.store, A, request(f.batch, None, day(15), &[]))
            .await
            .unwrap();
        let other = mark(&f.store, A, request(f.other_batch, None, day(15), &[]))
            .await
            .unwrap();

        let morning = by_date(&f.store, A, day(15), Some(f.batch), None).await.unwrap();
        assert_eq!(morning, vec![with_subject.clone(), without_subject]);

        let physics = by_date(&f.store, A, day(15), None, Some(f.subject)).await.unwrap();
        assert_eq!(physics, vec![with_subject]);

        let evening = by_date(&f.store, A, day(15), Some(f.other_batch), Some(f.subject))
            .await
            .unwrap();
        assert!(evening.is_empty());
        assert_eq!(
            by_date(&f.store, A, day(15), Some(f.other_batch), None).await.unwrap(),
            vec![other]
        );

        assert!(by_date(&f.store, B, day(15), None, None).await.unwrap().is_empty());
        assert!(by_date(&f.store, A, day(16), None, None).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn stats_compute_a_real_rate_over_the_range() {
        let f = fixture().await;
        mark(
            &f.store,
            A,
            request(
                f.batch,
                None,
                day(10),
                &[
                    (f.students[0], "PRESENT"),
                    (f.students[1], "PRESENT"),
                    (f.students[2], "ABSENT"),
                ],
            ),
        )
        .await
        .unwrap();
        mark(
            &f.store,
            A,
            request(f.batch, None, day(20), &[(f.students[0], "LEAVE")]),
        )
        .await
        .unwrap();

        let all = overall_stats(&f.store, A, None, None).await.unwrap();
        assert_eq!(all.total_students, 3);
        assert_eq!(all.total_batches, 2);
        assert_eq!(all.total_records, 4);
        assert_eq!(all.present_count, 2);
        assert_eq!(all.attendance_rate, Some(50.0));

        let early = overall_stats(&f.store, A, Some(day(1)), Some(day(10))).await.unwrap();
        assert_eq!(early.total_records, 3);
        assert_eq!(early.attendance_rate, Some(66.67));

        let empty = overall_stats(&f.store, B, None, None).await.unwrap();
        assert_eq!(empty.total_students, 0);
        assert_eq!(empty.attendance_rate, None);

        let backwards = overall_stats(&f.store, A, Some(day(20)), Some(day(10))).await;
        assert!(matches!(backwards.unwrap_err(), AppError::InvalidArgument(_)));
    }
}
