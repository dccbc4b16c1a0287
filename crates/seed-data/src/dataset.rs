//! The fixed academic dataset.

use academico::{Course, EnrollmentStatus, ScheduleEntry, Student};

/// Enrollment described by natural keys, resolved to generated identifiers at
/// seed time.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentPlan {
    pub student_id: String,
    pub course_code: String,
    pub term: String,
    pub status: EnrollmentStatus,
}

impl EnrollmentPlan {
    pub fn active(student_id: &str, course_code: &str, term: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            course_code: course_code.to_string(),
            term: term.to_string(),
            status: EnrollmentStatus::Active,
        }
    }
}

/// Everything a seeding run writes.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub students: Vec<Student>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<EnrollmentPlan>,
    /// Course codes mirrored into the key-value cache.
    pub cached_courses: Vec<String>,
    /// Student ids added to the ranking with a zero score.
    pub ranked_students: Vec<String>,
}

/// Two students, two courses, one enrollment each for term 2025-01.
pub fn academic_dataset() -> Dataset {
    let students = vec![
        Student::new("S-2024001", "Laura", "Gomez", "laura.gomez@uni.edu", 45),
        Student::new("S-2024002", "Juan", "Perez", "juan.perez@uni.edu", 12),
    ];

    let courses = vec![
        Course::new("MATH101", "Cálculo I", 4, "Matemáticas")
            .with_session(ScheduleEntry::new("Lunes", "08:00", "10:00", "A101")),
        Course::new("CS102", "Programación I", 3, "Ciencias de la Computación"),
    ];

    let enrollments = vec![
        EnrollmentPlan::active("S-2024001", "MATH101", "2025-01"),
        EnrollmentPlan::active("S-2024002", "CS102", "2025-01"),
    ];

    Dataset {
        students,
        courses,
        enrollments,
        cached_courses: vec!["MATH101".to_string()],
        ranked_students: vec!["S-2024001".to_string(), "S-2024002".to_string()],
    }
}
