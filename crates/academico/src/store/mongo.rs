//! MongoDB-backed document store.

use std::collections::HashMap;

use async_trait::async_trait;
use bson::{Bson, doc, oid::ObjectId};
use mongodb::{Client, Database};
use serde::Serialize;
use tracing::{debug, info};

use super::{Collection, DocumentStore};
use crate::errors::StoreError;
use crate::models::{Course, Enrollment, Student};

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connects to `uri` and selects `database`.
    ///
    /// The driver connects lazily, so the server is pinged here to surface an
    /// unreachable store before any record is written.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        info!("Connecting to document store at {}", uri);

        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;

        info!("Connected to document store, database '{}'", database);
        Ok(Self::new(db))
    }

    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn insert_batch<T>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> Result<Vec<ObjectId>, StoreError>
    where
        T: Serialize + Send + Sync,
    {
        // insert_many rejects an empty batch
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let result = self
            .db
            .collection::<T>(collection.as_str())
            .insert_many(records)
            .await?;

        debug!(
            "Inserted {} documents into {}",
            result.inserted_ids.len(),
            collection
        );
        Ok(ordered_ids(result.inserted_ids))
    }
}

/// Orders the driver's index → id map back into input order.
fn ordered_ids(inserted: HashMap<usize, Bson>) -> Vec<ObjectId> {
    let mut ids: Vec<(usize, Bson)> = inserted.into_iter().collect();
    ids.sort_by_key(|(index, _)| *index);
    ids.into_iter()
        .filter_map(|(_, id)| id.as_object_id())
        .collect()
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_students(&self, students: &[Student]) -> Result<Vec<ObjectId>, StoreError> {
        self.insert_batch(Collection::Students, students).await
    }

    async fn insert_courses(&self, courses: &[Course]) -> Result<Vec<ObjectId>, StoreError> {
        self.insert_batch(Collection::Courses, courses).await
    }

    async fn insert_enrollments(
        &self,
        enrollments: &[Enrollment],
    ) -> Result<Vec<ObjectId>, StoreError> {
        self.insert_batch(Collection::Enrollments, enrollments).await
    }

    async fn find_student_by_natural_key(
        &self,
        student_id: &str,
    ) -> Result<Option<Student>, StoreError> {
        let student = self
            .db
            .collection::<Student>(Collection::Students.as_str())
            .find_one(doc! { "studentId": student_id })
            .await?;

        Ok(student)
    }

    async fn find_course_by_natural_key(
        &self,
        course_code: &str,
    ) -> Result<Option<Course>, StoreError> {
        let course = self
            .db
            .collection::<Course>(Collection::Courses.as_str())
            .find_one(doc! { "courseCode": course_code })
            .await?;

        Ok(course)
    }

    async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        let count = self
            .db
            .collection::<bson::Document>(collection.as_str())
            .count_documents(doc! {})
            .await?;

        Ok(count)
    }
}
