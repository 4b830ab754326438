use super::{SITTING_BUSY, SUBJECT_IN_USE, Store, StoreResult};
use crate::error::AppError;
use crate::model::attendance::{
    Attendance, AttendanceDetail, AttendanceStatus, NewAttendance, StatusCounts,
};
use crate::model::batch::{Batch, BatchInput};
use crate::model::role::Role;
use crate::model::student::{Student, StudentInput, StudentStatus};
use crate::model::subject::{Subject, SubjectInput};
use crate::model::user::{NewUser, UpdateProfile, User};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::TryStreamExt;
use sqlx::{FromRow, MySql, MySqlPool, Transaction};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

const USER_COLUMNS: &str = "id, email, password_hash, name, role, mobile, institute_id";
const STUDENT_COLUMNS: &str =
    "id, name, roll_no, mobile, email, address, dob, gender, stream, status, institute_id";
const BATCH_COLUMNS: &str = "id, name, description, institute_id";

#[derive(FromRow)]
struct UserSql {
    id: u64,
    email: String,
    password_hash: String,
    name: Option<String>,
    role: String,
    mobile: Option<String>,
    institute_id: Option<u64>,
}

impl TryFrom<UserSql> for User {
    type Error = AppError;

    fn try_from(row: UserSql) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).map_err(|_| {
            AppError::DataIntegrity(format!("user {} has unknown role {:?}", row.id, row.role))
        })?;
        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            role,
            mobile: row.mobile,
            institute_id: row.institute_id,
        })
    }
}

#[derive(FromRow)]
struct StudentSql {
    id: u64,
    name: String,
    roll_no: Option<String>,
    mobile: Option<String>,
    email: Option<String>,
    address: Option<String>,
    dob: Option<NaiveDate>,
    gender: Option<String>,
    stream: Option<String>,
    status: String,
    institute_id: u64,
}

impl StudentSql {
    fn into_student(self, batch_ids: Vec<u64>) -> StoreResult<Student> {
        let status = StudentStatus::from_str(&self.status).map_err(|_| {
            AppError::DataIntegrity(format!("student {} has unknown status {:?}", self.id, self.status))
        })?;
        Ok(Student {
            id: self.id,
            name: self.name,
            roll_no: self.roll_no,
            mobile: self.mobile,
            email: self.email,
            address: self.address,
            dob: self.dob,
            gender: self.gender,
            stream: self.stream,
            status,
            institute_id: self.institute_id,
            batch_ids,
        })
    }
}

#[derive(FromRow)]
struct BatchSql {
    id: u64,
    name: String,
    description: Option<String>,
    institute_id: u64,
}

impl BatchSql {
    fn into_batch(self, subject_ids: Vec<u64>) -> Batch {
        Batch {
            id: self.id,
            name: self.name,
            description: self.description,
            institute_id: self.institute_id,
            subject_ids,
        }
    }
}

#[derive(FromRow)]
struct AttendanceSql {
    id: u64,
    date: NaiveDate,
    batch_id: u64,
    subject_id: Option<u64>,
    institute_id: u64,
}

#[derive(FromRow)]
struct DetailSql {
    id: u64,
    attendance_id: u64,
    student_id: u64,
    status: String,
}

/// Maps a unique-key violation to Conflict, anything else to a database error.
fn conflict_on_duplicate(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message.to_string());
        }
    }
    AppError::from(e)
}

fn conflict_on_reference(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict(message.to_string());
        }
    }
    AppError::from(e)
}

fn group_pairs(pairs: Vec<(u64, u64)>) -> HashMap<u64, Vec<u64>> {
    let mut grouped: HashMap<u64, Vec<u64>> = HashMap::new();
    for (owner, member) in pairs {
        grouped.entry(owner).or_default().push(member);
    }
    grouped
}

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// student_id -> batch ids for every student of the institute
    async fn memberships(&self, institute_id: u64) -> StoreResult<HashMap<u64, Vec<u64>>> {
        let pairs = sqlx::query_as::<_, (u64, u64)>(
            r#"
            SELECT sb.student_id, sb.batch_id
            FROM student_batches sb
            JOIN students s ON s.id = sb.student_id
            WHERE s.institute_id = ?
            ORDER BY sb.batch_id
            "#,
        )
        .bind(institute_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_pairs(pairs))
    }

    /// batch_id -> subject ids for every batch of the institute
    async fn subject_links(&self, institute_id: u64) -> StoreResult<HashMap<u64, Vec<u64>>> {
        let pairs = sqlx::query_as::<_, (u64, u64)>(
            r#"
            SELECT bs.batch_id, bs.subject_id
            FROM batch_subjects bs
            JOIN batches b ON b.id = bs.batch_id
            WHERE b.institute_id = ?
            ORDER BY bs.subject_id
            "#,
        )
        .bind(institute_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_pairs(pairs))
    }

    async fn hydrate_students(
        &self,
        institute_id: u64,
        rows: Vec<StudentSql>,
    ) -> StoreResult<Vec<Student>> {
        let mut memberships = self.memberships(institute_id).await?;
        rows.into_iter()
            .map(|row| {
                let batch_ids = memberships.remove(&row.id).unwrap_or_default();
                row.into_student(batch_ids)
            })
            .collect()
    }

    async fn replace_memberships(
        tx: &mut Transaction<'_, MySql>,
        student_id: u64,
        batch_ids: &[u64],
    ) -> StoreResult<()> {
        sqlx::query("DELETE FROM student_batches WHERE student_id = ?")
            .bind(student_id)
            .execute(&mut **tx)
            .await?;

        for batch_id in batch_ids {
            sqlx::query("INSERT IGNORE INTO student_batches (student_id, batch_id) VALUES (?, ?)")
                .bind(student_id)
                .bind(batch_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        sqlx::query_as::<_, UserSql>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user(&self, id: u64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, UserSql>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let id = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, name, role, mobile, institute_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.mobile)
        .bind(user.institute_id)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_duplicate(e, "Email already exists"))?
        .last_insert_id();

        debug!(user_id = id, role = %user.role, "User row inserted");

        Ok(User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            mobile: user.mobile,
            institute_id: user.institute_id,
        })
    }

    async fn list_institutes(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY id");
        sqlx::query_as::<_, UserSql>(&sql)
            .bind(Role::Institute.as_str())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn list_managers(&self, institute_id: u64) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = ? AND institute_id = ? ORDER BY id"
        );
        sqlx::query_as::<_, UserSql>(&sql)
            .bind(Role::Manager.as_str())
            .bind(institute_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn update_user(&self, id: u64, profile: &UpdateProfile) -> StoreResult<Option<User>> {
        sqlx::query("UPDATE users SET name = ?, email = ?, mobile = ? WHERE id = ?")
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.mobile)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_duplicate(e, "Email already exists"))?;

        self.find_user(id).await
    }

    async fn delete_user(&self, id: u64) -> StoreResult<bool> {
        // managers and owned rows go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn all_emails(&self) -> StoreResult<Vec<String>> {
        let mut rows = sqlx::query_scalar::<_, String>("SELECT email FROM users").fetch(&self.pool);

        let mut emails = Vec::new();
        while let Some(email) = rows.try_next().await? {
            emails.push(email);
        }
        Ok(emails)
    }

    async fn list_students(&self, institute_id: u64) -> StoreResult<Vec<Student>> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE institute_id = ? ORDER BY id");
        let rows = sqlx::query_as::<_, StudentSql>(&sql)
            .bind(institute_id)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate_students(institute_id, rows).await
    }

    async fn find_student(&self, institute_id: u64, id: u64) -> StoreResult<Option<Student>> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ? AND institute_id = ?");
        let Some(row) = sqlx::query_as::<_, StudentSql>(&sql)
            .bind(id)
            .bind(institute_id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let batch_ids = sqlx::query_scalar::<_, u64>(
            "SELECT batch_id FROM student_batches WHERE student_id = ? ORDER BY batch_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        row.into_student(batch_ids).map(Some)
    }

    async fn find_students_by_roll_no(
        &self,
        institute_id: u64,
        roll_no: &str,
    ) -> StoreResult<Vec<Student>> {
        let sql = format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE institute_id = ? AND roll_no = ? ORDER BY id"
        );
        let rows = sqlx::query_as::<_, StudentSql>(&sql)
            .bind(institute_id)
            .bind(roll_no)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate_students(institute_id, rows).await
    }

    async fn insert_student(&self, institute_id: u64, input: &StudentInput) -> StoreResult<Student> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO students
                (name, roll_no, mobile, email, address, dob, gender, stream, status, institute_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.roll_no)
        .bind(&input.mobile)
        .bind(&input.email)
        .bind(&input.address)
        .bind(input.dob)
        .bind(&input.gender)
        .bind(&input.stream)
        .bind(StudentStatus::Active.as_str())
        .bind(institute_id)
        .execute(&mut *tx)
        .await?
        .last_insert_id();

        Self::replace_memberships(&mut tx, id, &input.batch_ids).await?;
        tx.commit().await?;

        self.find_student(institute_id, id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("student {id} vanished after insert")))
    }

    async fn update_student(
        &self,
        institute_id: u64,
        id: u64,
        input: &StudentInput,
    ) -> StoreResult<Option<Student>> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_scalar::<_, u64>(
            "SELECT id FROM students WHERE id = ? AND institute_id = ? FOR UPDATE",
        )
        .bind(id)
        .bind(institute_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE students
            SET name = ?, roll_no = ?, mobile = ?, email = ?, address = ?,
                dob = ?, gender = ?, stream = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(&input.roll_no)
        .bind(&input.mobile)
        .bind(&input.email)
        .bind(&input.address)
        .bind(input.dob)
        .bind(&input.gender)
        .bind(&input.stream)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        Self::replace_memberships(&mut tx, id, &input.batch_ids).await?;
        tx.commit().await?;

        self.find_student(institute_id, id).await
    }

    async fn set_student_status(
        &self,
        institute_id: u64,
        id: u64,
        status: StudentStatus,
    ) -> StoreResult<Option<Student>> {
        sqlx::query("UPDATE students SET status = ? WHERE id = ? AND institute_id = ?")
            .bind(status.as_str())
            .bind(id)
            .bind(institute_id)
            .execute(&self.pool)
            .await?;

        self.find_student(institute_id, id).await
    }

    async fn delete_student(&self, institute_id: u64, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = ? AND institute_id = ?")
            .bind(id)
            .bind(institute_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_students(&self, institute_id: u64) -> StoreResult<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students WHERE institute_id = ?")
            .bind(institute_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn list_batches(&self, institute_id: u64) -> StoreResult<Vec<Batch>> {
        let sql = format!("SELECT {BATCH_COLUMNS} FROM batches WHERE institute_id = ? ORDER BY id");
        let rows = sqlx::query_as::<_, BatchSql>(&sql)
            .bind(institute_id)
            .fetch_all(&self.pool)
            .await?;

        let mut links = self.subject_links(institute_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let subject_ids = links.remove(&row.id).unwrap_or_default();
                row.into_batch(subject_ids)
            })
            .collect())
    }

    async fn find_batch(&self, institute_id: u64, id: u64) -> StoreResult<Option<Batch>> {
        let sql = format!("SELECT {BATCH_COLUMNS} FROM batches WHERE id = ? AND institute_id = ?");
        let Some(row) = sqlx::query_as::<_, BatchSql>(&sql)
            .bind(id)
            .bind(institute_id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let subject_ids = sqlx::query_scalar::<_, u64>(
            "SELECT subject_id FROM batch_subjects WHERE batch_id = ? ORDER BY subject_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_batch(subject_ids)))
    }

    async fn insert_batch(&self, institute_id: u64, input: &BatchInput) -> StoreResult<Batch> {
        let id = sqlx::query("INSERT INTO batches (name, description, institute_id) VALUES (?, ?, ?)")
            .bind(&input.name)
            .bind(&input.description)
            .bind(institute_id)
            .execute(&self.pool)
            .await?
            .last_insert_id();

        Ok(Batch {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            institute_id,
            subject_ids: Vec::new(),
        })
    }

    async fn update_batch(
        &self,
        institute_id: u64,
        id: u64,
        input: &BatchInput,
    ) -> StoreResult<Option<Batch>> {
        sqlx::query("UPDATE batches SET name = ?, description = ? WHERE id = ? AND institute_id = ?")
            .bind(&input.name)
            .bind(&input.description)
            .bind(id)
            .bind(institute_id)
            .execute(&self.pool)
            .await?;

        self.find_batch(institute_id, id).await
    }

    async fn delete_batch(&self, institute_id: u64, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM batches WHERE id = ? AND institute_id = ?")
            .bind(id)
            .bind(institute_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_batches(&self, institute_id: u64) -> StoreResult<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM batches WHERE institute_id = ?")
            .bind(institute_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn link_subject(&self, batch_id: u64, subject_id: u64) -> StoreResult<()> {
        sqlx::query("INSERT IGNORE INTO batch_subjects (batch_id, subject_id) VALUES (?, ?)")
            .bind(batch_id)
            .bind(subject_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn unlink_subject(&self, batch_id: u64, subject_id: u64) -> StoreResult<()> {
        sqlx::query("DELETE FROM batch_subjects WHERE batch_id = ? AND subject_id = ?")
            .bind(batch_id)
            .bind(subject_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn batch_subjects(&self, batch_id: u64) -> StoreResult<Vec<Subject>> {
        let subjects = sqlx::query_as::<_, Subject>(
            r#"
            SELECT s.id, s.name, s.code, s.description
            FROM subjects s
            JOIN batch_subjects bs ON bs.subject_id = s.id
            WHERE bs.batch_id = ?
            ORDER BY s.id
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(subjects)
    }

    async fn list_subjects(&self) -> StoreResult<Vec<Subject>> {
        let subjects =
            sqlx::query_as::<_, Subject>("SELECT id, name, code, description FROM subjects ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(subjects)
    }

    async fn find_subject(&self, id: u64) -> StoreResult<Option<Subject>> {
        let subject =
            sqlx::query_as::<_, Subject>("SELECT id, name, code, description FROM subjects WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(subject)
    }

    async fn insert_subject(&self, input: &SubjectInput) -> StoreResult<Subject> {
        let id = sqlx::query("INSERT INTO subjects (name, code, description) VALUES (?, ?, ?)")
            .bind(&input.name)
            .bind(&input.code)
            .bind(&input.description)
            .execute(&self.pool)
            .await?
            .last_insert_id();

        Ok(Subject {
            id,
            name: input.name.clone(),
            code: input.code.clone(),
            description: input.description.clone(),
        })
    }

    async fn update_subject(&self, id: u64, input: &SubjectInput) -> StoreResult<Option<Subject>> {
        sqlx::query("UPDATE subjects SET name = ?, code = ?, description = ? WHERE id = ?")
            .bind(&input.name)
            .bind(&input.code)
            .bind(&input.description)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_subject(id).await
    }

    async fn delete_subject(&self, id: u64) -> StoreResult<bool> {
        // batch links cascade; attendance restricts
        let result = sqlx::query("DELETE FROM subjects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_reference(e, SUBJECT_IN_USE))?;
        Ok(result.rows_affected() > 0)
    }

    async fn save_attendance(&self, record: NewAttendance) -> StoreResult<Attendance> {
        let mut tx = self.pool.begin().await?;

        // marks of one batch run one at a time; uq_attendance_sitting backs this up
        let locked: Option<u64> =
            sqlx::query_scalar("SELECT id FROM batches WHERE id = ? AND institute_id = ? FOR UPDATE")
                .bind(record.batch_id)
                .bind(record.institute_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::not_found("Batch"));
        }

        // same sitting marked again: the new record replaces the old one
        let replaced = sqlx::query(
            r#"
            DELETE FROM attendance
            WHERE institute_id = ? AND date = ? AND batch_id = ? AND subject_key = COALESCE(?, 0)
            "#,
        )
        .bind(record.institute_id)
        .bind(record.date)
        .bind(record.batch_id)
        .bind(record.subject_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let id = sqlx::query(
            "INSERT INTO attendance (date, batch_id, subject_id, institute_id) VALUES (?, ?, ?, ?)",
        )
        .bind(record.date)
        .bind(record.batch_id)
        .bind(record.subject_id)
        .bind(record.institute_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_duplicate(e, SITTING_BUSY))?
        .last_insert_id();

        let mut details = Vec::with_capacity(record.details.len());
        for (student_id, status) in &record.details {
            let detail_id = sqlx::query(
                "INSERT INTO attendance_details (attendance_id, student_id, status) VALUES (?, ?, ?)",
            )
            .bind(id)
            .bind(student_id)
            .bind(status.as_str())
            .execute(&mut *tx)
            .await?
            .last_insert_id();

            details.push(AttendanceDetail {
                id: detail_id,
                student_id: *student_id,
                status: *status,
            });
        }

        tx.commit().await?;
        debug!(attendance_id = id, replaced, details = details.len(), "Attendance committed");

        Ok(Attendance {
            id,
            date: record.date,
            batch_id: record.batch_id,
            subject_id: record.subject_id,
            institute_id: record.institute_id,
            details,
        })
    }

    async fn attendance_on(
        &self,
        institute_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, AttendanceSql>(
            r#"
            SELECT id, date, batch_id, subject_id, institute_id
            FROM attendance
            WHERE institute_id = ? AND date = ?
            ORDER BY id
            "#,
        )
        .bind(institute_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        let detail_rows = sqlx::query_as::<_, DetailSql>(
            r#"
            SELECT d.id, d.attendance_id, d.student_id, d.status
            FROM attendance_details d
            JOIN attendance a ON a.id = d.attendance_id
            WHERE a.institute_id = ? AND a.date = ?
            ORDER BY d.id
            "#,
        )
        .bind(institute_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        let mut details: HashMap<u64, Vec<AttendanceDetail>> = HashMap::new();
        for row in detail_rows {
            let status = AttendanceStatus::from_str(&row.status).map_err(|_| {
                AppError::DataIntegrity(format!(
                    "attendance detail {} has unknown status {:?}",
                    row.id, row.status
                ))
            })?;
            details.entry(row.attendance_id).or_default().push(AttendanceDetail {
                id: row.id,
                student_id: row.student_id,
                status,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Attendance {
                details: details.remove(&row.id).unwrap_or_default(),
                id: row.id,
                date: row.date,
                batch_id: row.batch_id,
                subject_id: row.subject_id,
                institute_id: row.institute_id,
            })
            .collect())
    }

    async fn status_counts(
        &self,
        institute_id: u64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> StoreResult<StatusCounts> {
        let (total, present) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(d.id),
                CAST(COALESCE(SUM(d.status = 'PRESENT'), 0) AS SIGNED)
            FROM attendance_details d
            JOIN attendance a ON a.id = d.attendance_id
            WHERE a.institute_id = ?
            AND (? IS NULL OR a.date >= ?)
            AND (? IS NULL OR a.date <= ?)
            "#,
        )
        .bind(institute_id)
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(StatusCounts { total, present })
    }
}
