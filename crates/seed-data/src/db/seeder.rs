//! Store seeding for the academic dataset.

use std::future::Future;
use std::time::Duration;

use academico::store::{Collection, DocumentStore, KeyValueStore};
use academico::{
    COURSE_CACHE_TTL_SECS, CourseCacheEntry, Enrollment, STUDENT_RANKING_KEY, StoreError,
};
use bson::oid::ObjectId;
use thiserror::Error;
use tracing::{debug, info};

use crate::dataset::{Dataset, EnrollmentPlan};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Student {0} not found")]
    MissingStudent(String),
    #[error("Course {0} not found")]
    MissingCourse(String),
    #[error("Stored {0} record has no generated id")]
    MissingId(Collection),
    #[error("Cache key {0} vanished before its TTL was set")]
    CacheKeyMissing(String),
}

/// Identifiers generated while seeding the document store.
#[derive(Debug, Clone, Default)]
pub struct SeededDocuments {
    pub student_ids: Vec<ObjectId>,
    pub course_ids: Vec<ObjectId>,
    pub enrollment_ids: Vec<ObjectId>,
}

/// Outcome of a full seeding run.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub documents: SeededDocuments,
    /// Document counts per collection after seeding.
    pub counts: Vec<(Collection, u64)>,
    /// Cache keys written.
    pub cache_keys: Vec<String>,
}

/// Seeder writing the academic dataset into a document store and, afterwards,
/// a key-value store.
///
/// Nothing is deduplicated: seeding twice stores every student, course and
/// enrollment twice, while cache hashes and ranking scores are overwritten.
pub struct Seeder<D> {
    documents: D,
    cache_ttl: Duration,
}

impl<D: DocumentStore> Seeder<D> {
    /// Creates a new seeder over the given document store.
    pub fn new(documents: D) -> Self {
        Self {
            documents,
            cache_ttl: Duration::from_secs(COURSE_CACHE_TTL_SECS),
        }
    }

    /// Sets the lifetime of cached course entries.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    /// Connects to both stores and seeds them in order.
    ///
    /// The key-value store is only connected once the document store has been
    /// reached and seeded; a failed document connection never touches it.
    pub async fn run<DF, KF, KFut, K>(
        connect_documents: DF,
        connect_cache: KF,
        dataset: &Dataset,
        cache_ttl: Duration,
    ) -> Result<SeedReport, SeedError>
    where
        DF: Future<Output = Result<D, StoreError>>,
        KF: FnOnce() -> KFut,
        KFut: Future<Output = Result<K, StoreError>>,
        K: KeyValueStore,
    {
        let seeder = Seeder::new(connect_documents.await?).with_cache_ttl(cache_ttl);
        let documents = seeder.seed_documents(dataset).await?;
        let counts = seeder.collection_counts().await?;

        let cache = connect_cache().await?;
        let cache_keys = seeder.seed_cache(&cache, dataset).await?;

        Ok(SeedReport {
            documents,
            counts,
            cache_keys,
        })
    }

    /// Seeds students, then courses, then enrollments referencing them.
    pub async fn seed_documents(&self, dataset: &Dataset) -> Result<SeededDocuments, SeedError> {
        let student_ids = self.seed_students(dataset).await?;
        let course_ids = self.seed_courses(dataset).await?;
        let enrollment_ids = self.seed_enrollments(&dataset.enrollments).await?;

        Ok(SeededDocuments {
            student_ids,
            course_ids,
            enrollment_ids,
        })
    }

    /// Seeds students into the document store.
    pub async fn seed_students(&self, dataset: &Dataset) -> Result<Vec<ObjectId>, SeedError> {
        info!("Seeding {} students...", dataset.students.len());

        let ids = self.documents.insert_students(&dataset.students).await?;

        info!("Seeded {} students", ids.len());
        Ok(ids)
    }

    /// Seeds courses into the document store.
    pub async fn seed_courses(&self, dataset: &Dataset) -> Result<Vec<ObjectId>, SeedError> {
        info!("Seeding {} courses...", dataset.courses.len());

        let ids = self.documents.insert_courses(&dataset.courses).await?;

        info!("Seeded {} courses", ids.len());
        Ok(ids)
    }

    /// Resolves each plan against the stored students and courses, then inserts
    /// the enrollments as one batch.
    pub async fn seed_enrollments(
        &self,
        plans: &[EnrollmentPlan],
    ) -> Result<Vec<ObjectId>, SeedError> {
        info!("Seeding {} enrollments...", plans.len());

        let mut enrollments = Vec::with_capacity(plans.len());
        for plan in plans {
            enrollments.push(self.resolve_enrollment(plan).await?);
        }

        let ids = self.documents.insert_enrollments(&enrollments).await?;

        info!("Seeded {} enrollments", ids.len());
        Ok(ids)
    }

    /// Looks up the plan's student and course by natural key.
    async fn resolve_enrollment(&self, plan: &EnrollmentPlan) -> Result<Enrollment, SeedError> {
        let student = self
            .documents
            .find_student_by_natural_key(&plan.student_id)
            .await?
            .ok_or_else(|| SeedError::MissingStudent(plan.student_id.clone()))?;
        let course = self
            .documents
            .find_course_by_natural_key(&plan.course_code)
            .await?
            .ok_or_else(|| SeedError::MissingCourse(plan.course_code.clone()))?;

        let student_id = student.id.ok_or(SeedError::MissingId(Collection::Students))?;
        let course_id = course.id.ok_or(SeedError::MissingId(Collection::Courses))?;

        debug!(
            "Enrolling {} ({}) in {} ({})",
            plan.student_id, student_id, plan.course_code, course_id
        );

        Ok(Enrollment {
            id: None,
            student_id,
            course_id,
            term: plan.term.clone(),
            status: plan.status,
            grades: Vec::new(),
        })
    }

    /// Document counts for every collection, logged as they are read.
    pub async fn collection_counts(&self) -> Result<Vec<(Collection, u64)>, SeedError> {
        let mut counts = Vec::with_capacity(Collection::ALL.len());
        for collection in Collection::ALL {
            let count = self.documents.count(collection).await?;
            info!("  {}: {}", collection, count);
            counts.push((collection, count));
        }
        Ok(counts)
    }

    /// Writes cached courses with their TTL, then zero scores for ranked
    /// students. Returns the cache keys written.
    pub async fn seed_cache<K: KeyValueStore>(
        &self,
        cache: &K,
        dataset: &Dataset,
    ) -> Result<Vec<String>, SeedError> {
        info!("Caching {} courses...", dataset.cached_courses.len());

        let mut keys = Vec::with_capacity(dataset.cached_courses.len());
        for code in &dataset.cached_courses {
            let course = dataset
                .courses
                .iter()
                .find(|c| &c.course_code == code)
                .ok_or_else(|| SeedError::MissingCourse(code.clone()))?;

            let entry = CourseCacheEntry::from(course);
            let key = entry.key();
            cache.cache_put_fields(&key, &entry.fields()).await?;
            if !cache.cache_set_ttl(&key, self.cache_ttl).await? {
                return Err(SeedError::CacheKeyMissing(key));
            }

            debug!("Cached {} for {}s", key, self.cache_ttl.as_secs());
            keys.push(key);
        }

        info!(
            "Ranking {} students in {}...",
            dataset.ranked_students.len(),
            STUDENT_RANKING_KEY
        );
        for student_id in &dataset.ranked_students {
            cache
                .ranking_set_score(STUDENT_RANKING_KEY, student_id, 0.0)
                .await?;
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::academic_dataset;
    use academico::EnrollmentStatus;
    use academico::store::{MemoryDocumentStore, MemoryKeyValueStore};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_seed_documents() {
        let seeder = Seeder::new(MemoryDocumentStore::new());
        let seeded = seeder.seed_documents(&academic_dataset()).await.unwrap();

        assert_eq!(seeded.student_ids.len(), 2);
        assert_eq!(seeded.course_ids.len(), 2);
        assert_eq!(seeded.enrollment_ids.len(), 2);

        let store = seeder.documents();
        let student_keys: Vec<String> = store
            .students()
            .await
            .into_iter()
            .map(|s| s.student_id)
            .collect();
        assert_eq!(student_keys, vec!["S-2024001", "S-2024002"]);

        let course_keys: Vec<String> = store
            .courses()
            .await
            .into_iter()
            .map(|c| c.course_code)
            .collect();
        assert_eq!(course_keys, vec!["MATH101", "CS102"]);
    }

    #[tokio::test]
    async fn test_enrollments_reference_generated_ids() {
        let seeder = Seeder::new(MemoryDocumentStore::new());
        seeder.seed_documents(&academic_dataset()).await.unwrap();

        let store = seeder.documents();
        let students = store.students().await;
        let courses = store.courses().await;
        let student_ids: HashSet<ObjectId> = students.iter().filter_map(|s| s.id).collect();
        let course_ids: HashSet<ObjectId> = courses.iter().filter_map(|c| c.id).collect();

        let enrollments = store.enrollments().await;
        assert_eq!(enrollments.len(), 2);
        for enrollment in &enrollments {
            assert!(student_ids.contains(&enrollment.student_id));
            assert!(course_ids.contains(&enrollment.course_id));
            assert_eq!(enrollment.term, "2025-01");
            assert_eq!(enrollment.status, EnrollmentStatus::Active);
            assert!(enrollment.grades.is_empty());
        }

        // S-2024001 takes MATH101, S-2024002 takes CS102
        assert_eq!(Some(enrollments[0].student_id), students[0].id);
        assert_eq!(Some(enrollments[0].course_id), courses[0].id);
        assert_eq!(Some(enrollments[1].student_id), students[1].id);
        assert_eq!(Some(enrollments[1].course_id), courses[1].id);
    }

    #[tokio::test]
    async fn test_enrollment_for_unknown_student_fails() {
        let seeder = Seeder::new(MemoryDocumentStore::new());
        let result = seeder
            .seed_enrollments(&[EnrollmentPlan::active("S-2099999", "MATH101", "2025-01")])
            .await;

        assert!(matches!(result, Err(SeedError::MissingStudent(id)) if id == "S-2099999"));
        assert!(seeder.documents().enrollments().await.is_empty());
    }

    #[tokio::test]
    async fn test_enrollment_for_unknown_course_fails() {
        let seeder = Seeder::new(MemoryDocumentStore::new());
        let dataset = academic_dataset();
        seeder.seed_students(&dataset).await.unwrap();

        let result = seeder.seed_enrollments(&dataset.enrollments).await;

        assert!(matches!(result, Err(SeedError::MissingCourse(code)) if code == "MATH101"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seed_cache() {
        let seeder = Seeder::new(MemoryDocumentStore::new());
        let cache = MemoryKeyValueStore::new();

        let keys = seeder.seed_cache(&cache, &academic_dataset()).await.unwrap();
        assert_eq!(keys, vec!["course:cache:MATH101"]);

        let fields = cache.cache_fields("course:cache:MATH101").await.unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields["courseCode"], "MATH101");
        assert_eq!(fields["title"], "Cálculo I");
        assert_eq!(fields["credits"], "4");

        let ttl = cache.cache_ttl("course:cache:MATH101").await.unwrap().unwrap();
        assert!(ttl > Duration::ZERO && ttl <= HOUR);

        let ranking = cache.ranking("ranking:students").await.unwrap();
        assert_eq!(
            ranking,
            vec![
                ("S-2024001".to_string(), 0.0),
                ("S-2024002".to_string(), 0.0),
            ]
        );

        tokio::time::advance(HOUR).await;
        assert!(
            cache
                .cache_fields("course:cache:MATH101")
                .await
                .unwrap()
                .is_empty()
        );
    }

    /// Cache whose keys are gone by the time EXPIRE runs.
    struct EvictingCache(MemoryKeyValueStore);

    #[async_trait::async_trait]
    impl KeyValueStore for EvictingCache {
        async fn cache_put_fields(
            &self,
            key: &str,
            fields: &[(String, String)],
        ) -> Result<(), StoreError> {
            self.0.cache_put_fields(key, fields).await
        }

        async fn cache_set_ttl(&self, _key: &str, _ttl: Duration) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn ranking_set_score(
            &self,
            ranking: &str,
            member: &str,
            score: f64,
        ) -> Result<(), StoreError> {
            self.0.ranking_set_score(ranking, member, score).await
        }

        async fn cache_fields(
            &self,
            key: &str,
        ) -> Result<std::collections::HashMap<String, String>, StoreError> {
            self.0.cache_fields(key).await
        }

        async fn cache_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
            self.0.cache_ttl(key).await
        }

        async fn ranking(&self, ranking: &str) -> Result<Vec<(String, f64)>, StoreError> {
            self.0.ranking(ranking).await
        }
    }

    #[tokio::test]
    async fn test_cache_key_lost_before_ttl_fails() {
        let seeder = Seeder::new(MemoryDocumentStore::new());
        let cache = EvictingCache(MemoryKeyValueStore::new());

        let result = seeder.seed_cache(&cache, &academic_dataset()).await;

        assert!(matches!(
            result,
            Err(SeedError::CacheKeyMissing(key)) if key == "course:cache:MATH101"
        ));
        // Ranking is only written after every cached course has its TTL
        assert!(cache.ranking("ranking:students").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reseeding_duplicates_documents_but_not_cache() {
        let seeder = Seeder::new(MemoryDocumentStore::new());
        let cache = MemoryKeyValueStore::new();
        let dataset = academic_dataset();

        for _ in 0..2 {
            seeder.seed_documents(&dataset).await.unwrap();
            seeder.seed_cache(&cache, &dataset).await.unwrap();
        }

        let counts = seeder.collection_counts().await.unwrap();
        assert_eq!(
            counts,
            vec![
                (Collection::Students, 4),
                (Collection::Courses, 4),
                (Collection::Enrollments, 4),
            ]
        );

        assert_eq!(
            cache.cache_fields("course:cache:MATH101").await.unwrap().len(),
            3
        );
        assert_eq!(cache.ranking("ranking:students").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_run_seeds_both_stores() {
        let documents = Arc::new(MemoryDocumentStore::new());
        let cache = Arc::new(MemoryKeyValueStore::new());

        let report = Seeder::<Arc<MemoryDocumentStore>>::run(
            {
                let documents = Arc::clone(&documents);
                async move { Ok::<_, StoreError>(documents) }
            },
            || {
                let cache = Arc::clone(&cache);
                async move { Ok::<_, StoreError>(cache) }
            },
            &academic_dataset(),
            HOUR,
        )
        .await
        .unwrap();

        assert_eq!(report.documents.enrollment_ids.len(), 2);
        assert_eq!(report.cache_keys, vec!["course:cache:MATH101"]);
        assert_eq!(
            report.counts,
            vec![
                (Collection::Students, 2),
                (Collection::Courses, 2),
                (Collection::Enrollments, 2),
            ]
        );
        assert_eq!(documents.students().await.len(), 2);
        assert_eq!(cache.ranking("ranking:students").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_document_connection_failure_skips_cache() {
        let cache_connected = AtomicBool::new(false);

        let result = Seeder::<MemoryDocumentStore>::run(
            async {
                Err::<MemoryDocumentStore, _>(StoreError::Unavailable(
                    "connection refused".to_string(),
                ))
            },
            || {
                cache_connected.store(true, Ordering::SeqCst);
                async { Ok::<_, StoreError>(MemoryKeyValueStore::new()) }
            },
            &academic_dataset(),
            HOUR,
        )
        .await;

        assert!(matches!(
            result,
            Err(SeedError::Store(StoreError::Unavailable(_)))
        ));
        assert!(!cache_connected.load(Ordering::SeqCst));
    }
}
