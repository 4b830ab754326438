use super::{SUBJECT_IN_USE, Store, StoreResult};
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
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct State {
    next_id: u64,
    users: BTreeMap<u64, User>,
    students: BTreeMap<u64, Student>,
    batches: BTreeMap<u64, Batch>,
    subjects: BTreeMap<u64, Subject>,
    attendance: BTreeMap<u64, Attendance>,
    /// (student_id, batch_id)
    student_batches: BTreeSet<(u64, u64)>,
    /// (batch_id, subject_id)
    batch_subjects: BTreeSet<(u64, u64)>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn hydrate_student(&self, student: &Student) -> Student {
        let mut student = student.clone();
        student.batch_ids = self
            .student_batches
            .iter()
            .filter(|(s, _)| *s == student.id)
            .map(|(_, b)| *b)
            .collect();
        student
    }

    fn hydrate_batch(&self, batch: &Batch) -> Batch {
        let mut batch = batch.clone();
        batch.subject_ids = self
            .batch_subjects
            .iter()
            .filter(|(b, _)| *b == batch.id)
            .map(|(_, s)| *s)
            .collect();
        batch
    }

    fn owned_student(&self, institute_id: u64, id: u64) -> Option<&Student> {
        self.students
            .get(&id)
            .filter(|s| s.institute_id == institute_id)
    }

    fn owned_batch(&self, institute_id: u64, id: u64) -> Option<&Batch> {
        self.batches
            .get(&id)
            .filter(|b| b.institute_id == institute_id)
    }

    fn email_taken_by_other(&self, email: &str, except: Option<u64>) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != except)
    }

    fn set_memberships(&mut self, student_id: u64, batch_ids: &[u64]) {
        self.student_batches.retain(|(s, _)| *s != student_id);
        for batch_id in batch_ids {
            self.student_batches.insert((student_id, *batch_id));
        }
    }

    fn remove_student(&mut self, id: u64) {
        self.students.remove(&id);
        self.student_batches.retain(|(s, _)| *s != id);
        for record in self.attendance.values_mut() {
            record.details.retain(|d| d.student_id != id);
        }
    }

    fn remove_batch(&mut self, id: u64) {
        self.batches.remove(&id);
        self.student_batches.retain(|(_, b)| *b != id);
        self.batch_subjects.retain(|(b, _)| *b != id);
        self.attendance.retain(|_, a| a.batch_id != id);
    }
}

/// Lock-guarded store with the same semantics as the MySQL schema.
/// Used when no database is configured and by tests.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| AppError::Internal("in-memory store poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| AppError::Internal("in-memory store poisoned".to_string()))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.read()?;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.write()?;
        if state.email_taken_by_other(&user.email, None) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let id = state.next_id();
        let user = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            mobile: user.mobile,
            institute_id: user.institute_id,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_institutes(&self) -> StoreResult<Vec<User>> {
        let state = self.read()?;
        Ok(state
            .users
            .values()
            .filter(|u| u.role == Role::Institute)
            .cloned()
            .collect())
    }

    async fn list_managers(&self, institute_id: u64) -> StoreResult<Vec<User>> {
        let state = self.read()?;
        Ok(state
            .users
            .values()
            .filter(|u| u.role == Role::Manager && u.institute_id == Some(institute_id))
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: u64, profile: &UpdateProfile) -> StoreResult<Option<User>> {
        let mut state = self.write()?;
        if !state.users.contains_key(&id) {
            return Ok(None);
        }
        if state.email_taken_by_other(&profile.email, Some(id)) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let user = state.users.get_mut(&id).map(|user| {
            user.name = Some(profile.name.clone());
            user.email = profile.email.clone();
            user.mobile = profile.mobile.clone();
            user.clone()
        });
        Ok(user)
    }

    async fn delete_user(&self, id: u64) -> StoreResult<bool> {
        let mut state = self.write()?;
        let Some(user) = state.users.remove(&id) else {
            return Ok(false);
        };

        if user.role == Role::Institute {
            state.users.retain(|_, u| u.institute_id != Some(id));
            let students: Vec<u64> = state
                .students
                .values()
                .filter(|s| s.institute_id == id)
                .map(|s| s.id)
                .collect();
            for student_id in students {
                state.remove_student(student_id);
            }
            let batches: Vec<u64> = state
                .batches
                .values()
                .filter(|b| b.institute_id == id)
                .map(|b| b.id)
                .collect();
            for batch_id in batches {
                state.remove_batch(batch_id);
            }
            state.attendance.retain(|_, a| a.institute_id != id);
        }
        Ok(true)
    }

    async fn all_emails(&self) -> StoreResult<Vec<String>> {
        Ok(self.read()?.users.values().map(|u| u.email.clone()).collect())
    }

    async fn list_students(&self, institute_id: u64) -> StoreResult<Vec<Student>> {
        let state = self.read()?;
        Ok(state
            .students
            .values()
            .filter(|s| s.institute_id == institute_id)
            .map(|s| state.hydrate_student(s))
            .collect())
    }

    async fn find_student(&self, institute_id: u64, id: u64) -> StoreResult<Option<Student>> {
        let state = self.read()?;
        Ok(state
            .owned_student(institute_id, id)
            .map(|s| state.hydrate_student(s)))
    }

    async fn find_students_by_roll_no(
        &self,
        institute_id: u64,
        roll_no: &str,
    ) -> StoreResult<Vec<Student>> {
        let state = self.read()?;
        Ok(state
            .students
            .values()
            .filter(|s| s.institute_id == institute_id && s.roll_no.as_deref() == Some(roll_no))
            .map(|s| state.hydrate_student(s))
            .collect())
    }

    async fn insert_student(&self, institute_id: u64, input: &StudentInput) -> StoreResult<Student> {
        let mut state = self.write()?;
        let id = state.next_id();
        let student = Student {
            id,
            name: input.name.clone(),
            roll_no: input.roll_no.clone(),
            mobile: input.mobile.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            dob: input.dob,
            gender: input.gender.clone(),
            stream: input.stream.clone(),
            status: StudentStatus::Active,
            institute_id,
            batch_ids: Vec::new(),
        };
        state.students.insert(id, student.clone());
        state.set_memberships(id, &input.batch_ids);
        Ok(state.hydrate_student(&student))
    }

    async fn update_student(
        &self,
        institute_id: u64,
        id: u64,
        input: &StudentInput,
    ) -> StoreResult<Option<Student>> {
        let mut state = self.write()?;
        if state.owned_student(institute_id, id).is_none() {
            return Ok(None);
        }

        if let Some(student) = state.students.get_mut(&id) {
            student.name = input.name.clone();
            student.roll_no = input.roll_no.clone();
            student.mobile = input.mobile.clone();
            student.email = input.email.clone();
            student.address = input.address.clone();
            student.dob = input.dob;
            student.gender = input.gender.clone();
            student.stream = input.stream.clone();
        }
        state.set_memberships(id, &input.batch_ids);

        Ok(state.students.get(&id).map(|s| state.hydrate_student(s)))
    }

    async fn set_student_status(
        &self,
        institute_id: u64,
        id: u64,
        status: StudentStatus,
    ) -> StoreResult<Option<Student>> {
        let mut state = self.write()?;
        match state.students.get_mut(&id) {
            Some(student) if student.institute_id == institute_id => student.status = status,
            _ => return Ok(None),
        }
        Ok(state.students.get(&id).map(|s| state.hydrate_student(s)))
    }

    async fn delete_student(&self, institute_id: u64, id: u64) -> StoreResult<bool> {
        let mut state = self.write()?;
        if state.owned_student(institute_id, id).is_none() {
            return Ok(false);
        }
        state.remove_student(id);
        Ok(true)
    }

    async fn count_students(&self, institute_id: u64) -> StoreResult<i64> {
        let state = self.read()?;
        Ok(state
            .students
            .values()
            .filter(|s| s.institute_id == institute_id)
            .count() as i64)
    }

    async fn list_batches(&self, institute_id: u64) -> StoreResult<Vec<Batch>> {
        let state = self.read()?;
        Ok(state
            .batches
            .values()
            .filter(|b| b.institute_id == institute_id)
            .map(|b| state.hydrate_batch(b))
            .collect())
    }

    async fn find_batch(&self, institute_id: u64, id: u64) -> StoreResult<Option<Batch>> {
        let state = self.read()?;
        Ok(state
            .owned_batch(institute_id, id)
            .map(|b| state.hydrate_batch(b)))
    }

    async fn insert_batch(&self, institute_id: u64, input: &BatchInput) -> StoreResult<Batch> {
        let mut state = self.write()?;
        let id = state.next_id();
        let batch = Batch {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            institute_id,
            subject_ids: Vec::new(),
        };
        state.batches.insert(id, batch.clone());
        Ok(batch)
    }

    async fn update_batch(
        &self,
        institute_id: u64,
        id: u64,
        input: &BatchInput,
    ) -> StoreResult<Option<Batch>> {
        let mut state = self.write()?;
        match state.batches.get_mut(&id) {
            Some(batch) if batch.institute_id == institute_id => {
                batch.name = input.name.clone();
                batch.description = input.description.clone();
            }
            _ => return Ok(None),
        }
        Ok(state.batches.get(&id).map(|b| state.hydrate_batch(b)))
    }

    async fn delete_batch(&self, institute_id: u64, id: u64) -> StoreResult<bool> {
        let mut state = self.write()?;
        if state.owned_batch(institute_id, id).is_none() {
            return Ok(false);
        }
        state.remove_batch(id);
        Ok(true)
    }

    async fn count_batches(&self, institute_id: u64) -> StoreResult<i64> {
        let state = self.read()?;
        Ok(state
            .batches
            .values()
            .filter(|b| b.institute_id == institute_id)
            .count() as i64)
    }

    async fn link_subject(&self, batch_id: u64, subject_id: u64) -> StoreResult<()> {
        self.write()?.batch_subjects.insert((batch_id, subject_id));
        Ok(())
    }

    async fn unlink_subject(&self, batch_id: u64, subject_id: u64) -> StoreResult<()> {
        self.write()?.batch_subjects.remove(&(batch_id, subject_id));
        Ok(())
    }

    async fn batch_subjects(&self, batch_id: u64) -> StoreResult<Vec<Subject>> {
        let state = self.read()?;
        Ok(state
            .batch_subjects
            .iter()
            .filter(|(b, _)| *b == batch_id)
            .filter_map(|(_, s)| state.subjects.get(s).cloned())
            .collect())
    }

    async fn list_subjects(&self) -> StoreResult<Vec<Subject>> {
        Ok(self.read()?.subjects.values().cloned().collect())
    }

    async fn find_subject(&self, id: u64) -> StoreResult<Option<Subject>> {
        Ok(self.read()?.subjects.get(&id).cloned())
    }

    async fn insert_subject(&self, input: &SubjectInput) -> StoreResult<Subject> {
        let mut state = self.write()?;
        let id = state.next_id();
        let subject = Subject {
            id,
            name: input.name.clone(),
            code: input.code.clone(),
            description: input.description.clone(),
        };
        state.subjects.insert(id, subject.clone());
        Ok(subject)
    }

    async fn update_subject(&self, id: u64, input: &SubjectInput) -> StoreResult<Option<Subject>> {
        let mut state = self.write()?;
        Ok(state.subjects.get_mut(&id).map(|subject| {
            subject.name = input.name.clone();
            subject.code = input.code.clone();
            subject.description = input.description.clone();
            subject.clone()
        }))
    }

    async fn delete_subject(&self, id: u64) -> StoreResult<bool> {
        let mut state = self.write()?;
        if !state.subjects.contains_key(&id) {
            return Ok(false);
        }
        if state.attendance.values().any(|a| a.subject_id == Some(id)) {
            return Err(AppError::Conflict(SUBJECT_IN_USE.to_string()));
        }
        state.subjects.remove(&id);
        state.batch_subjects.retain(|(_, s)| *s != id);
        Ok(true)
    }

    async fn save_attendance(&self, record: NewAttendance) -> StoreResult<Attendance> {
        let mut state = self.write()?;
        state.attendance.retain(|_, a| {
            !(a.institute_id == record.institute_id
                && a.date == record.date
                && a.batch_id == record.batch_id
                && a.subject_id == record.subject_id)
        });

        let id = state.next_id();
        let details = record
            .details
            .iter()
            .map(|(student_id, status)| AttendanceDetail {
                id: state.next_id(),
                student_id: *student_id,
                status: *status,
            })
            .collect();

        let saved = Attendance {
            id,
            date: record.date,
            batch_id: record.batch_id,
            subject_id: record.subject_id,
            institute_id: record.institute_id,
            details,
        };
        state.attendance.insert(id, saved.clone());
        Ok(saved)
    }

    async fn attendance_on(
        &self,
        institute_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Vec<Attendance>> {
        let state = self.read()?;
        Ok(state
            .attendance
            .values()
            .filter(|a| a.institute_id == institute_id && a.date == date)
            .cloned()
            .collect())
    }

    async fn status_counts(
        &self,
        institute_id: u64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> StoreResult<StatusCounts> {
        let state = self.read()?;
        let mut counts = StatusCounts::default();
        let in_range = |date: NaiveDate| {
            from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
        };

        for record in state
            .attendance
            .values()
            .filter(|a| a.institute_id == institute_id && in_range(a.date))
        {
            for detail in &record.details {
                counts.total += 1;
                if detail.status == AttendanceStatus::Present {
                    counts.present += 1;
                }
            }
        }
        Ok(counts)
    }
}
