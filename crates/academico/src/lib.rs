//! Academic records domain.
//!
//! Students, courses and enrollments live in a document store; derived course
//! cache entries and the student ranking live in a key-value store. Both stores
//! sit behind the traits in [`store`], with MongoDB/Redis backends for real
//! deployments and in-memory backends for tests.

pub mod errors;
pub mod models;
pub mod store;

pub use errors::StoreError;
pub use models::{
    COURSE_CACHE_PREFIX, COURSE_CACHE_TTL_SECS, Course, CourseCacheEntry, Enrollment,
    EnrollmentStatus, Grade, STUDENT_RANKING_KEY, ScheduleEntry, Student, StudentMetadata,
    StudentName,
};
