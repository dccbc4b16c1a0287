use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Prefix of the hash holding a cached course, followed by the course code.
pub const COURSE_CACHE_PREFIX: &str = "course:cache:";

/// Sorted set ranking students by score.
pub const STUDENT_RANKING_KEY: &str = "ranking:students";

/// Default lifetime of a cached course, in seconds.
pub const COURSE_CACHE_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub student_id: String,
    pub name: StudentName,
    pub email: String,
    #[serde(with = "bson::serde_helpers::time_0_3_offsetdatetime_as_bson_datetime")]
    pub enrolled_at: OffsetDateTime,
    pub metadata: StudentMetadata,
}

impl Student {
    pub fn new(
        student_id: impl Into<String>,
        first: impl Into<String>,
        last: impl Into<String>,
        email: impl Into<String>,
        credits_completed: i32,
    ) -> Self {
        Self {
            id: None,
            student_id: student_id.into(),
            name: StudentName {
                first: first.into(),
                last: last.into(),
            },
            email: email.into(),
            enrolled_at: OffsetDateTime::now_utc(),
            metadata: StudentMetadata { credits_completed },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentName {
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMetadata {
    pub credits_completed: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub course_code: String,
    pub title: String,
    pub credits: i32,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ScheduleEntry>>,
}

impl Course {
    pub fn new(
        course_code: impl Into<String>,
        title: impl Into<String>,
        credits: i32,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            course_code: course_code.into(),
            title: title.into(),
            credits,
            department: department.into(),
            schedule: None,
        }
    }

    /// Appends a weekly session to the course schedule.
    pub fn with_session(mut self, entry: ScheduleEntry) -> Self {
        self.schedule.get_or_insert_with(Vec::new).push(entry);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day: String,
    pub start: String,
    pub end: String,
    pub room: String,
}

impl ScheduleEntry {
    pub fn new(
        day: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            day: day.into(),
            start: start.into(),
            end: end.into(),
            room: room.into(),
        }
    }
}

/// A student's registration in a course for one term.
///
/// `student_id` and `course_id` hold the store-generated identifiers, not the
/// natural keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub student_id: ObjectId,
    pub course_id: ObjectId,
    pub term: String,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub grades: Vec<Grade>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
}

/// One assessed grade; enrollments start with none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub assessment: String,
    pub score: f64,
}

/// Flat projection of a course as stored in the key-value cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseCacheEntry {
    pub course_code: String,
    pub title: String,
    pub credits: i32,
}

impl CourseCacheEntry {
    /// Cache key for a course code.
    pub fn key_for(course_code: &str) -> String {
        format!("{COURSE_CACHE_PREFIX}{course_code}")
    }

    pub fn key(&self) -> String {
        Self::key_for(&self.course_code)
    }

    /// Field/value pairs written into the cache hash.
    pub fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("courseCode".to_string(), self.course_code.clone()),
            ("title".to_string(), self.title.clone()),
            ("credits".to_string(), self.credits.to_string()),
        ]
    }
}

impl From<&Course> for CourseCacheEntry {
    fn from(course: &Course) -> Self {
        Self {
            course_code: course.course_code.clone(),
            title: course.title.clone(),
            credits: course.credits,
        }
    }
}
