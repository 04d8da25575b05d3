//! Database repository for enrollments (the student/class join table).

use crate::db::{
    errors::Result,
    models::enrollments::{EnrolledClassDBResponse, EnrolledStudentDBResponse},
};
use crate::types::{ClassId, UserId, abbrev_uuid};
use sqlx::{Connection, FromRow, PgConnection};
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct StudentClassRow {
    pub student_id: UserId,
    pub class_id: ClassId,
    pub name: String,
    pub code: String,
}

pub struct Enrollments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Enrollments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Students enrolled in a class, ordered by student name.
    #[instrument(skip(self), fields(class_id = %abbrev_uuid(&class_id)), err)]
    pub async fn students_for_class(&mut self, class_id: ClassId) -> Result<Vec<EnrolledStudentDBResponse>> {
        let students = sqlx::query_as::<_, EnrolledStudentDBResponse>(
            r#"
            SELECT u.id, u.name, u.email
            FROM enrollments e
            INNER JOIN users u ON u.id = e.student_id
            WHERE e.class_id = $1
            ORDER BY u.name ASC
            "#,
        )
        .bind(class_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(students)
    }

    /// Classes a student is enrolled in.
    #[instrument(skip(self), fields(student_id = %abbrev_uuid(&student_id)), err)]
    pub async fn classes_for_student(&mut self, student_id: UserId) -> Result<Vec<EnrolledClassDBResponse>> {
        let classes = sqlx::query_as::<_, EnrolledClassDBResponse>(
            r#"
            SELECT c.id, c.name, c.code
            FROM enrollments e
            INNER JOIN classes c ON c.id = e.class_id
            WHERE e.student_id = $1
            ORDER BY c.name ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(classes)
    }

    /// Enrolled classes for many students at once, keyed by student id.
    /// Avoids an N+1 when annotating a user listing.
    #[instrument(skip(self, student_ids), fields(count = student_ids.len()), err)]
    pub async fn classes_for_students_bulk(&mut self, student_ids: &[UserId]) -> Result<HashMap<UserId, Vec<EnrolledClassDBResponse>>> {
        if student_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, StudentClassRow>(
            r#"
            SELECT e.student_id, c.id AS class_id, c.name, c.code
            FROM enrollments e
            INNER JOIN classes c ON c.id = e.class_id
            WHERE e.student_id = ANY($1)
            ORDER BY c.name ASC
            "#,
        )
        .bind(student_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result: HashMap<UserId, Vec<EnrolledClassDBResponse>> = HashMap::new();
        for row in rows {
            result.entry(row.student_id).or_default().push(EnrolledClassDBResponse {
                id: row.class_id,
                name: row.name,
                code: row.code,
            });
        }

        Ok(result)
    }

    /// Replace a student's entire enrollment set: delete every existing row,
    /// then insert one row per class id. Runs in a single transaction so a
    /// failure partway through rolls back cleanly. Duplicate ids in the input
    /// collapse via ON CONFLICT DO NOTHING.
    #[instrument(skip(self, class_ids), fields(student_id = %abbrev_uuid(&student_id), count = class_ids.len()), err)]
    pub async fn resync_for_student(&mut self, student_id: UserId, class_ids: &[ClassId]) -> Result<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM enrollments WHERE student_id = $1")
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        for class_id in class_ids {
            sqlx::query("INSERT INTO enrollments (student_id, class_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(student_id)
                .bind(class_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Remove a single enrollment. Idempotent: an absent row is not an error.
    #[instrument(skip(self), fields(student_id = %abbrev_uuid(&student_id), class_id = %abbrev_uuid(&class_id)), err)]
    pub async fn remove(&mut self, student_id: UserId, class_id: ClassId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM enrollments WHERE student_id = $1 AND class_id = $2")
            .bind(student_id)
            .bind(class_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::errors::DbError;
    use crate::db::handlers::{Classes, Repository, Users};
    use crate::db::models::classes::ClassCreateDBRequest;
    use crate::test_utils::user_create_request;
    use sqlx::PgPool;
    use uuid::Uuid;

    async fn setup_student_and_classes(pool: &PgPool, class_count: usize) -> (UserId, Vec<ClassId>) {
        let mut conn = pool.acquire().await.unwrap();

        let student = {
            let mut users = Users::new(&mut conn);
            users
                .create(&user_create_request(&format!("student_{}@example.com", Uuid::new_v4().simple()), Role::Student))
                .await
                .unwrap()
        };

        let mut class_ids = Vec::new();
        let mut classes = Classes::new(&mut conn);
        for i in 0..class_count {
            let class = classes
                .create(&ClassCreateDBRequest {
                    name: format!("Class {i}"),
                    code: format!("C{}-{}", i, Uuid::new_v4().simple()),
                    teacher_id: None,
                })
                .await
                .unwrap();
            class_ids.push(class.id);
        }

        (student.id, class_ids)
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_resync_replaces_existing_set(pool: PgPool) {
        let (student_id, class_ids) = setup_student_and_classes(&pool, 3).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Enrollments::new(&mut conn);

        repo.resync_for_student(student_id, &class_ids[..2]).await.unwrap();
        let classes = repo.classes_for_student(student_id).await.unwrap();
        assert_eq!(classes.len(), 2);

        // Resync to a different set - old rows must be gone
        repo.resync_for_student(student_id, &class_ids[2..]).await.unwrap();
        let classes = repo.classes_for_student(student_id).await.unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].id, class_ids[2]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_resync_empty_clears_all(pool: PgPool) {
        let (student_id, class_ids) = setup_student_and_classes(&pool, 2).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Enrollments::new(&mut conn);

        repo.resync_for_student(student_id, &class_ids).await.unwrap();
        repo.resync_for_student(student_id, &[]).await.unwrap();

        let classes = repo.classes_for_student(student_id).await.unwrap();
        assert!(classes.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_resync_collapses_duplicates(pool: PgPool) {
        let (student_id, class_ids) = setup_student_and_classes(&pool, 2).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Enrollments::new(&mut conn);

        let with_duplicates = vec![class_ids[0], class_ids[0], class_ids[1]];
        repo.resync_for_student(student_id, &with_duplicates).await.unwrap();

        let classes = repo.classes_for_student(student_id).await.unwrap();
        let mut ids: Vec<ClassId> = classes.iter().map(|c| c.id).collect();
        ids.sort();
        let mut expected = class_ids.clone();
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_resync_unknown_class_rolls_back(pool: PgPool) {
        let (student_id, class_ids) = setup_student_and_classes(&pool, 1).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Enrollments::new(&mut conn);
        repo.resync_for_student(student_id, &class_ids).await.unwrap();

        // Second id does not exist - the whole resync must roll back
        let err = repo
            .resync_for_student(student_id, &[class_ids[0], Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        let classes = repo.classes_for_student(student_id).await.unwrap();
        assert_eq!(classes.len(), 1, "original enrollment survives the failed resync");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_remove_is_idempotent(pool: PgPool) {
        let (student_id, class_ids) = setup_student_and_classes(&pool, 1).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Enrollments::new(&mut conn);
        repo.resync_for_student(student_id, &class_ids).await.unwrap();

        assert!(repo.remove(student_id, class_ids[0]).await.unwrap());
        // Removing again is not an error
        assert!(!repo.remove(student_id, class_ids[0]).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_students_for_class_ordered_by_name(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();

        let class = {
            let mut classes = Classes::new(&mut conn);
            classes
                .create(&ClassCreateDBRequest {
                    name: "Roster".to_string(),
                    code: "R1".to_string(),
                    teacher_id: None,
                })
                .await
                .unwrap()
        };

        for name in ["Charlie", "Alice", "Bob"] {
            let mut users = Users::new(&mut conn);
            let mut request = user_create_request(&format!("{}@example.com", name.to_lowercase()), Role::Student);
            request.name = Some(name.to_string());
            let student = users.create(&request).await.unwrap();

            let mut repo = Enrollments::new(&mut conn);
            repo.resync_for_student(student.id, &[class.id]).await.unwrap();
        }

        let mut repo = Enrollments::new(&mut conn);
        let students = repo.students_for_class(class.id).await.unwrap();
        let names: Vec<_> = students.iter().map(|s| s.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Charlie"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_classes_for_students_bulk(pool: PgPool) {
        let (student_a, class_ids) = setup_student_and_classes(&pool, 2).await;
        let (student_b, more_class_ids) = setup_student_and_classes(&pool, 1).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Enrollments::new(&mut conn);
        repo.resync_for_student(student_a, &class_ids).await.unwrap();
        repo.resync_for_student(student_b, &more_class_ids).await.unwrap();

        let map = repo.classes_for_students_bulk(&[student_a, student_b]).await.unwrap();
        assert_eq!(map.get(&student_a).unwrap().len(), 2);
        assert_eq!(map.get(&student_b).unwrap().len(), 1);

        let empty = repo.classes_for_students_bulk(&[]).await.unwrap();
        assert!(empty.is_empty());
    }
}
