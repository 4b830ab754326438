//! Persistence for accounts, rosters, batches, subjects and attendance.
//!
//! Every student, batch and attendance accessor takes the owning institute
//! id; a row owned by another institute is indistinguishable from a missing
//! one. Subjects are shared and unscoped.

use crate::error::AppError;
use crate::model::attendance::{Attendance, NewAttendance, StatusCounts};
use crate::model::batch::{Batch, BatchInput};
use crate::model::student::{Student, StudentInput, StudentStatus};
use crate::model::subject::{Subject, SubjectInput};
use crate::model::user::{NewUser, UpdateProfile, User};
use async_trait::async_trait;
use chrono::NaiveDate;

pub mod memory;
pub mod mysql;

pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

pub type StoreResult<T> = Result<T, AppError>;

pub(crate) const SUBJECT_IN_USE: &str = "Subject is referenced by attendance";
pub(crate) const SITTING_BUSY: &str = "Attendance for this sitting is being marked concurrently";

#[async_trait]
pub trait Store: Send + Sync {
    // ---------- accounts ----------
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user(&self, id: u64) -> StoreResult<Option<User>>;
    /// Fails with Conflict when the email is already registered.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn list_institutes(&self) -> StoreResult<Vec<User>>;
    async fn list_managers(&self, institute_id: u64) -> StoreResult<Vec<User>>;
    /// Overwrites name, email and mobile. Conflict when the email belongs to another account.
    async fn update_user(&self, id: u64, profile: &UpdateProfile) -> StoreResult<Option<User>>;
    /// Removes the account; for an institute also its managers and everything it owns.
    async fn delete_user(&self, id: u64) -> StoreResult<bool>;
    async fn all_emails(&self) -> StoreResult<Vec<String>>;

    // ---------- students ----------
    async fn list_students(&self, institute_id: u64) -> StoreResult<Vec<Student>>;
    async fn find_student(&self, institute_id: u64, id: u64) -> StoreResult<Option<Student>>;
    async fn find_students_by_roll_no(
        &self,
        institute_id: u64,
        roll_no: &str,
    ) -> StoreResult<Vec<Student>>;
    /// New students always start ACTIVE.
    async fn insert_student(&self, institute_id: u64, input: &StudentInput) -> StoreResult<Student>;
    async fn update_student(
        &self,
        institute_id: u64,
        id: u64,
        input: &StudentInput,
    ) -> StoreResult<Option<Student>>;
    async fn set_student_status(
        &self,
        institute_id: u64,
        id: u64,
        status: StudentStatus,
    ) -> StoreResult<Option<Student>>;
    async fn delete_student(&self, institute_id: u64, id: u64) -> StoreResult<bool>;
    async fn count_students(&self, institute_id: u64) -> StoreResult<i64>;

    // ---------- batches ----------
    async fn list_batches(&self, institute_id: u64) -> StoreResult<Vec<Batch>>;
    async fn find_batch(&self, institute_id: u64, id: u64) -> StoreResult<Option<Batch>>;
    async fn insert_batch(&self, institute_id: u64, input: &BatchInput) -> StoreResult<Batch>;
    async fn update_batch(
        &self,
        institute_id: u64,
        id: u64,
        input: &BatchInput,
    ) -> StoreResult<Option<Batch>>;
    async fn delete_batch(&self, institute_id: u64, id: u64) -> StoreResult<bool>;
    async fn count_batches(&self, institute_id: u64) -> StoreResult<i64>;
    /// Set insert; linking twice is a no-op.
    async fn link_subject(&self, batch_id: u64, subject_id: u64) -> StoreResult<()>;
    /// Set remove; unlinking an absent pair is a no-op.
    async fn unlink_subject(&self, batch_id: u64, subject_id: u64) -> StoreResult<()>;
    async fn batch_subjects(&self, batch_id: u64) -> StoreResult<Vec<Subject>>;

    // ---------- subjects ----------
    async fn list_subjects(&self) -> StoreResult<Vec<Subject>>;
    async fn find_subject(&self, id: u64) -> StoreResult<Option<Subject>>;
    async fn insert_subject(&self, input: &SubjectInput) -> StoreResult<Subject>;
    async fn update_subject(&self, id: u64, input: &SubjectInput) -> StoreResult<Option<Subject>>;
    /// Unlinks the subject from its batches. Fails with Conflict while any
    /// attendance sitting still refers to it.
    async fn delete_subject(&self, id: u64) -> StoreResult<bool>;

    // ---------- attendance ----------
    /// Persists the sitting and its details atomically, replacing any earlier
    /// sitting with the same (institute, date, batch, subject). A concurrent
    /// mark of the same sitting may fail with Conflict; retrying replaces it.
    async fn save_attendance(&self, record: NewAttendance) -> StoreResult<Attendance>;
    async fn attendance_on(&self, institute_id: u64, date: NaiveDate)
    -> StoreResult<Vec<Attendance>>;
    async fn status_counts(
        &self,
        institute_id: u64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> StoreResult<StatusCounts>;
}
