//! Store seams for academic records.
//!
//! [`DocumentStore`] holds the records themselves and assigns their identifiers;
//! [`KeyValueStore`] holds derived cache hashes and sorted rankings.

pub mod memory;
pub mod mongo;
pub mod redis;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::errors::StoreError;
use crate::models::{Course, Enrollment, Student};

pub use memory::{MemoryDocumentStore, MemoryKeyValueStore};
pub use mongo::MongoStore;
pub use self::redis::RedisStore;

/// Collections of the academic document database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Students,
    Courses,
    Enrollments,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Students,
        Collection::Courses,
        Collection::Enrollments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Students => "students",
            Collection::Courses => "courses",
            Collection::Enrollments => "enrollments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document store holding students, courses and enrollments.
///
/// Inserts never check natural keys: inserting the same student twice stores
/// two records with distinct generated identifiers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts students, returning their generated identifiers in input order.
    async fn insert_students(&self, students: &[Student]) -> Result<Vec<ObjectId>, StoreError>;

    /// Inserts courses, returning their generated identifiers in input order.
    async fn insert_courses(&self, courses: &[Course]) -> Result<Vec<ObjectId>, StoreError>;

    /// Inserts enrollments, returning their generated identifiers in input order.
    async fn insert_enrollments(
        &self,
        enrollments: &[Enrollment],
    ) -> Result<Vec<ObjectId>, StoreError>;

    /// Looks up a student by `studentId`. Returns the first match, if any.
    async fn find_student_by_natural_key(
        &self,
        student_id: &str,
    ) -> Result<Option<Student>, StoreError>;

    /// Looks up a course by `courseCode`. Returns the first match, if any.
    async fn find_course_by_natural_key(
        &self,
        course_code: &str,
    ) -> Result<Option<Course>, StoreError>;

    /// Number of documents currently in a collection.
    async fn count(&self, collection: Collection) -> Result<u64, StoreError>;
}

/// Key-value store holding cache hashes and sorted rankings.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Writes fields into the hash at `key`, replacing existing values.
    async fn cache_put_fields(
        &self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<(), StoreError>;

    /// Sets the key to expire `ttl` from now. Returns false if the key does not exist.
    async fn cache_set_ttl(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Upserts a member's score in a ranking.
    async fn ranking_set_score(
        &self,
        ranking: &str,
        member: &str,
        score: f64,
    ) -> Result<(), StoreError>;

    /// All fields of the hash at `key`; empty when absent or expired.
    async fn cache_fields(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// Remaining lifetime of `key`, or `None` when it is absent or never expires.
    async fn cache_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError>;

    /// Members of a ranking ordered by score, then member.
    async fn ranking(&self, ranking: &str) -> Result<Vec<(String, f64)>, StoreError>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn insert_students(&self, students: &[Student]) -> Result<Vec<ObjectId>, StoreError> {
        (**self).insert_students(students).await
    }

    async fn insert_courses(&self, courses: &[Course]) -> Result<Vec<ObjectId>, StoreError> {
        (**self).insert_courses(courses).await
    }

    async fn insert_enrollments(
        &self,
        enrollments: &[Enrollment],
    ) -> Result<Vec<ObjectId>, StoreError> {
        (**self).insert_enrollments(enrollments).await
    }

    async fn find_student_by_natural_key(
        &self,
        student_id: &str,
    ) -> Result<Option<Student>, StoreError> {
        (**self).find_student_by_natural_key(student_id).await
    }

    async fn find_course_by_natural_key(
        &self,
        course_code: &str,
    ) -> Result<Option<Course>, StoreError> {
        (**self).find_course_by_natural_key(course_code).await
    }

    async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        (**self).count(collection).await
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn cache_put_fields(
        &self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<(), StoreError> {
        (**self).cache_put_fields(key, fields).await
    }

    async fn cache_set_ttl(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        (**self).cache_set_ttl(key, ttl).await
    }

    async fn ranking_set_score(
        &self,
        ranking: &str,
        member: &str,
        score: f64,
    ) -> Result<(), StoreError> {
        (**self).ranking_set_score(ranking, member, score).await
    }

    async fn cache_fields(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        (**self).cache_fields(key).await
    }

    async fn cache_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        (**self).cache_ttl(key).await
    }

    async fn ranking(&self, ranking: &str) -> Result<Vec<(String, f64)>, StoreError> {
        (**self).ranking(ranking).await
    }
}
