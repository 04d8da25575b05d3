//! Database repository for classes.

use crate::db::{
    errors::Result,
    models::classes::{ClassCreateDBRequest, ClassDBResponse, ClassDetailDBResponse, ClassTeacherDBResponse},
};
use crate::types::{ClassId, UserId, abbrev_uuid};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct Class {
    pub id: ClassId,
    pub name: String,
    pub code: String,
    pub teacher_id: Option<UserId>,
}

// Flat row produced by the list query; folded into ClassDetailDBResponse
#[derive(Debug, Clone, FromRow)]
struct ClassDetailRow {
    pub id: ClassId,
    pub name: String,
    pub code: String,
    pub teacher_id: Option<UserId>,
    pub enrolled_count: i64,
    pub teacher_name: Option<String>,
    pub teacher_email: Option<String>,
}

pub struct Classes<'c> {
    db: &'c mut PgConnection,
}

impl From<Class> for ClassDBResponse {
    fn from(class: Class) -> Self {
        Self {
            id: class.id,
            name: class.name,
            code: class.code,
            teacher_id: class.teacher_id,
        }
    }
}

impl From<ClassDetailRow> for ClassDetailDBResponse {
    fn from(row: ClassDetailRow) -> Self {
        let teacher = match (row.teacher_id, row.teacher_email) {
            (Some(id), Some(email)) => Some(ClassTeacherDBResponse {
                id,
                name: row.teacher_name,
                email,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            code: row.code,
            teacher_id: row.teacher_id,
            enrolled_count: row.enrolled_count,
            teacher,
        }
    }
}

impl<'c> Classes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(code = %request.code), err)]
    pub async fn create(&mut self, request: &ClassCreateDBRequest) -> Result<ClassDBResponse> {
        let class_id = Uuid::new_v4();

        let class = sqlx::query_as::<_, Class>(
            r#"
            INSERT INTO classes (id, name, code, teacher_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(class_id)
        .bind(&request.name)
        .bind(&request.code)
        .bind(request.teacher_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ClassDBResponse::from(class))
    }

    #[instrument(skip(self), fields(class_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: ClassId) -> Result<Option<ClassDBResponse>> {
        let class = sqlx::query_as::<_, Class>("SELECT * FROM classes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(class.map(ClassDBResponse::from))
    }

    /// List all classes ordered by name, each with its enrollment count and
    /// assigned teacher (if any).
    #[instrument(skip(self), err)]
    pub async fn list_with_details(&mut self) -> Result<Vec<ClassDetailDBResponse>> {
        let rows = sqlx::query_as::<_, ClassDetailRow>(
            r#"
            SELECT c.id, c.name, c.code, c.teacher_id,
                   COUNT(e.student_id) AS enrolled_count,
                   t.name AS teacher_name,
                   t.email AS teacher_email
            FROM classes c
            LEFT JOIN enrollments e ON e.class_id = c.id
            LEFT JOIN users t ON t.id = c.teacher_id
            GROUP BY c.id, c.name, c.code, c.teacher_id, t.name, t.email
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows.into_iter().map(ClassDetailDBResponse::from).collect())
    }

    /// Delete a class. Enrollment and attendance rows cascade at the schema level.
    #[instrument(skip(self), fields(class_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: ClassId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
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
    use crate::db::handlers::{Repository, Users};
    use crate::test_utils::user_create_request;
    use sqlx::PgPool;

    fn class_create(name: &str, code: &str) -> ClassCreateDBRequest {
        ClassCreateDBRequest {
            name: name.to_string(),
            code: code.to_string(),
            teacher_id: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_class(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Classes::new(&mut conn);

        let created = repo.create(&class_create("Mathematics", "MATH101")).await.unwrap();
        assert_eq!(created.name, "Mathematics");
        assert_eq!(created.code, "MATH101");
        assert!(created.teacher_id.is_none());

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.code, "MATH101");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_code_is_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Classes::new(&mut conn);

        repo.create(&class_create("Mathematics", "MATH101")).await.unwrap();
        let err = repo.create(&class_create("Other Mathematics", "MATH101")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_with_details_includes_teacher_and_count(pool: PgPool) {
        let teacher = {
            let mut conn = pool.acquire().await.unwrap();
            let mut users = Users::new(&mut conn);
            users.create(&user_create_request("teacher@example.com", Role::Teacher)).await.unwrap()
        };
        let student = {
            let mut conn = pool.acquire().await.unwrap();
            let mut users = Users::new(&mut conn);
            users.create(&user_create_request("student@example.com", Role::Student)).await.unwrap()
        };

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Classes::new(&mut conn);

        let with_teacher = repo
            .create(&ClassCreateDBRequest {
                name: "Biology".to_string(),
                code: "BIO1".to_string(),
                teacher_id: Some(teacher.id),
            })
            .await
            .unwrap();
        let without_teacher = repo.create(&class_create("Arts", "ART1")).await.unwrap();

        sqlx::query("INSERT INTO enrollments (student_id, class_id) VALUES ($1, $2)")
            .bind(student.id)
            .bind(with_teacher.id)
            .execute(&pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Classes::new(&mut conn);
        let classes = repo.list_with_details().await.unwrap();

        // Ordered by name: Arts before Biology
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].id, without_teacher.id);
        assert_eq!(classes[0].enrolled_count, 0);
        assert!(classes[0].teacher.is_none());

        assert_eq!(classes[1].id, with_teacher.id);
        assert_eq!(classes[1].enrolled_count, 1);
        let detail_teacher = classes[1].teacher.as_ref().unwrap();
        assert_eq!(detail_teacher.id, teacher.id);
        assert_eq!(detail_teacher.email, "teacher@example.com");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_class(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Classes::new(&mut conn);

        let created = repo.create(&class_create("History", "HIST1")).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }
}
