// src/database.rs
use log::info;
use sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions};
use std::path::PathBuf;
use uuid::Uuid;

use crate::models::SubmissionRecord;

pub async fn init_db(database_url: Option<&str>) -> Result<SqlitePool, sqlx::Error> {
    let db_path = get_db_path(database_url)?;

    // Create parent directory BEFORE attempting to connect
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
    }

    let absolute_path = if db_path.is_relative() {
        std::env::current_dir().map_err(sqlx::Error::Io)?.join(&db_path)
    } else {
        db_path
    };

    let db_url = format!("sqlite://{}?mode=rwc", absolute_path.display());
    info!("📦 Connecting to {}", db_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    migrate(&pool).await?;
    info!("✅ Database ready");

    Ok(pool)
}

/// Single-connection in-memory database.
pub async fn init_memory_db() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn get_db_path(database_url: Option<&str>) -> Result<PathBuf, sqlx::Error> {
    match database_url {
        Some(url) => {
            let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")).ok_or_else(|| {
                sqlx::Error::Configuration("DATABASE_URL must start with 'sqlite:'".into())
            })?;
            Ok(PathBuf::from(path))
        }
        None => {
            let base = dirs::data_dir().ok_or_else(|| {
                sqlx::Error::Configuration("No data directory available; set DATABASE_URL".into())
            })?;
            Ok(base.join("interview").join("interview.db"))
        }
    }
}

/// Records one delivery attempt of a submission.
pub async fn save_submission(
    pool: &SqlitePool,
    record: &SubmissionRecord,
    delivered: bool,
    error_message: Option<&str>,
) -> Result<(), sqlx::Error> {
    let payload = serde_json::to_string(record).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    sqlx::query(
        r#"
        INSERT INTO submissions (id, session_id, candidate_name, candidate_email, domain, experience_level, score_percentage, subjective_score, delivered, error_message, payload, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&record.resume_id)
    .bind(&record.candidate_name)
    .bind(&record.candidate_email)
    .bind(&record.domain)
    .bind(&record.experience_level)
    .bind(i64::from(record.score_percentage))
    .bind(i64::from(record.subjective_score))
    .bind(delivered)
    .bind(error_message)
    .bind(&payload)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_all_submissions(pool: &SqlitePool) -> Result<Vec<HistoryEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, session_id, candidate_name, candidate_email, domain, experience_level, score_percentage, subjective_score, delivered, error_message, created_at
        FROM submissions
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| HistoryEntry {
            id: row.get(0),
            session_id: row.get(1),
            candidate_name: row.get(2),
            candidate_email: row.get(3),
            domain: row.get(4),
            experience_level: row.get(5),
            score_percentage: row.get(6),
            subjective_score: row.get(7),
            delivered: row.get(8),
            error_message: row.get(9),
            created_at: row.get(10),
        })
        .collect())
}

#[derive(serde::Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub session_id: String,
    pub candidate_name: String,
    pub candidate_email: String,
    pub domain: String,
    pub experience_level: String,
    pub score_percentage: i64,
    pub subjective_score: i64,
    pub delivered: bool,
    pub error_message: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> SubmissionRecord {
        SubmissionRecord {
            resume_id: id.to_string(),
            candidate_name: "Asha Rao".to_string(),
            candidate_email: "asha@example.com".to_string(),
            domain: "System Design".to_string(),
            experience_level: "Senior".to_string(),
            total_questions: 8,
            coding_questions: 1,
            mcq_questions: 3,
            subjective_questions: 4,
            correct_answers: 1,
            score_percentage: 65,
            coding_score: None,
            mcq_score: None,
            subjective_score: 65,
            feedback_summary: "Subjective: Clear communication and understanding.".to_string(),
            interview_duration: 12,
            completed_on_time: true,
            status: "COMPLETED".to_string(),
            notes: None,
            answers: vec![],
        }
    }

    #[test]
    fn database_path_requires_sqlite_scheme() {
        assert_eq!(
            get_db_path(Some("sqlite:data/interview.db")).unwrap(),
            PathBuf::from("data/interview.db")
        );
        assert!(get_db_path(Some("postgres://localhost/db")).is_err());
    }

    #[tokio::test]
    async fn stores_and_lists_delivery_attempts() {
        let pool = init_memory_db().await.unwrap();
        save_submission(&pool, &record("RES_1"), false, Some("connection refused"))
            .await
            .unwrap();
        save_submission(&pool, &record("RES_1"), true, None).await.unwrap();

        let history = get_all_submissions(&pool).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|h| h.session_id == "RES_1"));
        assert_eq!(history.iter().filter(|h| h.delivered).count(), 1);
        assert!(history.iter().any(|h| h.error_message.as_deref() == Some("connection refused")));
    }
}
