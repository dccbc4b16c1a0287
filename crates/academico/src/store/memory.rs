//! In-process stores mirroring the MongoDB and Redis semantics the seeder
//! relies on. Expiry follows tokio's clock, so paused-time tests can advance it.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{Collection, DocumentStore, KeyValueStore};
use crate::errors::StoreError;
use crate::models::{Course, Enrollment, Student};

#[derive(Debug, Default)]
struct Documents {
    students: Vec<Student>,
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
}

/// Document store kept in memory. Every insert gets a fresh [`ObjectId`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<Documents>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn students(&self) -> Vec<Student> {
        self.documents.read().await.students.clone()
    }

    pub async fn courses(&self) -> Vec<Course> {
        self.documents.read().await.courses.clone()
    }

    pub async fn enrollments(&self) -> Vec<Enrollment> {
        self.documents.read().await.enrollments.clone()
    }
}

/// Clones records into `target`, stamping each with a new identifier.
fn insert_with_ids<T: Clone>(
    target: &mut Vec<T>,
    records: &[T],
    set_id: impl Fn(&mut T, ObjectId),
) -> Vec<ObjectId> {
    records
        .iter()
        .map(|record| {
            let id = ObjectId::new();
            let mut stored = record.clone();
            set_id(&mut stored, id);
            target.push(stored);
            id
        })
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_students(&self, students: &[Student]) -> Result<Vec<ObjectId>, StoreError> {
        let mut documents = self.documents.write().await;
        Ok(insert_with_ids(&mut documents.students, students, |s, id| {
            s.id = Some(id)
        }))
    }

    async fn insert_courses(&self, courses: &[Course]) -> Result<Vec<ObjectId>, StoreError> {
        let mut documents = self.documents.write().await;
        Ok(insert_with_ids(&mut documents.courses, courses, |c, id| {
            c.id = Some(id)
        }))
    }

    async fn insert_enrollments(
        &self,
        enrollments: &[Enrollment],
    ) -> Result<Vec<ObjectId>, StoreError> {
        let mut documents = self.documents.write().await;
        Ok(insert_with_ids(
            &mut documents.enrollments,
            enrollments,
            |e, id| e.id = Some(id),
        ))
    }

    async fn find_student_by_natural_key(
        &self,
        student_id: &str,
    ) -> Result<Option<Student>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .students
            .iter()
            .find(|s| s.student_id == student_id)
            .cloned())
    }

    async fn find_course_by_natural_key(
        &self,
        course_code: &str,
    ) -> Result<Option<Course>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .courses
            .iter()
            .find(|c| c.course_code == course_code)
            .cloned())
    }

    async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        let documents = self.documents.read().await;
        let count = match collection {
            Collection::Students => documents.students.len(),
            Collection::Courses => documents.courses.len(),
            Collection::Enrollments => documents.enrollments.len(),
        };
        Ok(count as u64)
    }
}

#[derive(Debug, Clone)]
struct HashEntry {
    fields: HashMap<String, String>,
    expires_at: Option<Instant>,
}

impl HashEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

#[derive(Debug, Default)]
struct KeySpace {
    hashes: HashMap<String, HashEntry>,
    rankings: HashMap<String, HashMap<String, f64>>,
}

impl KeySpace {
    /// Live hash at `key`, dropping it first if it has expired.
    fn live_hash(&mut self, key: &str) -> Option<&mut HashEntry> {
        if self.hashes.get(key).is_some_and(HashEntry::is_expired) {
            self.hashes.remove(key);
        }
        self.hashes.get_mut(key)
    }
}

/// Key-value store kept in memory, with hash expiry and sorted rankings.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    keys: RwLock<KeySpace>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn cache_put_fields(
        &self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<(), StoreError> {
        // no fields, no key
        if fields.is_empty() {
            return Ok(());
        }

        let mut keys = self.keys.write().await;
        if keys.live_hash(key).is_none() {
            keys.hashes.insert(
                key.to_string(),
                HashEntry {
                    fields: HashMap::new(),
                    expires_at: None,
                },
            );
        }

        if let Some(entry) = keys.hashes.get_mut(key) {
            for (field, value) in fields {
                entry.fields.insert(field.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn cache_set_ttl(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut keys = self.keys.write().await;
        match keys.live_hash(key) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ranking_set_score(
        &self,
        ranking: &str,
        member: &str,
        score: f64,
    ) -> Result<(), StoreError> {
        let mut keys = self.keys.write().await;
        keys.rankings
            .entry(ranking.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn cache_fields(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut keys = self.keys.write().await;
        Ok(keys
            .live_hash(key)
            .map(|entry| entry.fields.clone())
            .unwrap_or_default())
    }

    async fn cache_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let mut keys = self.keys.write().await;
        Ok(keys
            .live_hash(key)
            .and_then(|entry| entry.expires_at)
            .map(|at| at.saturating_duration_since(Instant::now())))
    }

    async fn ranking(&self, ranking: &str) -> Result<Vec<(String, f64)>, StoreError> {
        let keys = self.keys.read().await;
        let mut members: Vec<(String, f64)> = keys
            .rankings
            .get(ranking)
            .map(|scores| {
                scores
                    .iter()
                    .map(|(member, score)| (member.clone(), *score))
                    .collect()
            })
            .unwrap_or_default();

        members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Ok(members)
    }
}
