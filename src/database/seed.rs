use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::assessment::{Assessment, QuestionKind};
use crate::models::candidate::Candidate;
use crate::models::job::{Job, JobStatus};
use crate::models::stage::{Stage, StageHistoryEvent};
use crate::models::user::User;
use crate::utils::slug::slugify;

const JOB_TITLES: &[&str] = &[
    "Senior Full Stack Developer",
    "Frontend Engineer",
    "Backend Engineer",
    "DevOps Engineer",
    "Product Manager",
    "Data Scientist",
    "Mobile Developer",
    "QA Engineer",
    "Site Reliability Engineer",
    "Platform Engineer",
    "Engineering Manager",
    "Security Engineer",
];

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Patricia", "Robert", "Linda", "Michael", "Elizabeth", "David", "Susan",
    "Thomas", "Sarah", "Daniel", "Nancy", "Laura", "Kevin", "Amira",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Garcia", "Miller", "Davis", "Martinez", "Wilson", "Anderson",
    "Taylor", "Moore", "Lee", "Perez", "Walker", "Young", "Nguyen",
];

const TAG_SETS: &[&[&str]] = &[
    &["remote", "full-time"],
    &["on-site", "full-time"],
    &["hybrid", "contract"],
    &["remote", "part-time"],
    &["hybrid", "full-time"],
];

/// Populate an empty store with demo data: a handful of users, a board of
/// jobs with a dense order, candidates whose history chains walk the forward
/// path to their current stage, and assessments covering every question
/// variant. Returns false when data already exists.
pub async fn seed_if_empty(pool: &SqlitePool) -> Result<bool> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(false);
    }

    // All randomness happens up front so the inserts below are plain loops.
    let users = demo_users();
    let jobs = demo_jobs();
    let (candidates, history) = demo_candidates(&jobs, &users);
    let assessments = demo_assessments(&jobs);

    let mut tx = pool.begin().await?;

    for user in &users {
        sqlx::query("INSERT INTO users (id, name, email, role) VALUES (?1, ?2, ?3, ?4)")
            .bind(user.id.to_string())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.role)
            .execute(&mut *tx)
            .await?;
    }

    for job in &jobs {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, title, slug, description, status, tags, sort_order, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(job.id.to_string())
        .bind(&job.title)
        .bind(&job.slug)
        .bind(&job.description)
        .bind(job.status.as_str())
        .bind(serde_json::to_string(&job.tags)?)
        .bind(job.order)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    for candidate in &candidates {
        sqlx::query(
            r#"
            INSERT INTO candidates (id, name, email, phone, job_id, current_stage, applied_at, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, '[]')
            "#,
        )
        .bind(candidate.id.to_string())
        .bind(&candidate.name)
        .bind(&candidate.email)
        .bind(&candidate.phone)
        .bind(candidate.job_id.to_string())
        .bind(candidate.current_stage.as_str())
        .bind(candidate.applied_at)
        .execute(&mut *tx)
        .await?;
    }

    for event in &history {
        sqlx::query(
            r#"
            INSERT INTO stage_history (id, candidate_id, from_stage, to_stage, timestamp, changed_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.candidate_id.to_string())
        .bind(event.from_stage.map(|s| s.as_str()))
        .bind(event.to_stage.as_str())
        .bind(event.timestamp)
        .bind(&event.changed_by)
        .execute(&mut *tx)
        .await?;
    }

    for assessment in &assessments {
        sqlx::query(
            r#"
            INSERT INTO assessments (id, job_id, title, description, sections, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(assessment.id.to_string())
        .bind(assessment.job_id.to_string())
        .bind(&assessment.title)
        .bind(&assessment.description)
        .bind(serde_json::to_string(&assessment.sections)?)
        .bind(assessment.created_at)
        .bind(assessment.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        jobs = jobs.len(),
        candidates = candidates.len(),
        history = history.len(),
        assessments = assessments.len(),
        "seeded empty database"
    );
    Ok(true)
}

fn demo_users() -> Vec<User> {
    [
        ("Admin User", "admin@talentflow.local", "admin"),
        ("HR Manager", "hr@talentflow.local", "hr"),
        ("Tech Lead", "tech@talentflow.local", "hr"),
    ]
    .into_iter()
    .map(|(name, email, role)| User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
    })
    .collect()
}

fn demo_jobs() -> Vec<Job> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    JOB_TITLES
        .iter()
        .enumerate()
        .map(|(index, title)| {
            let status = if index < 8 {
                JobStatus::Active
            } else if index < 10 {
                JobStatus::Draft
            } else {
                JobStatus::Archived
            };
            let tags = TAG_SETS
                .choose(&mut rng)
                .map(|set| set.iter().map(|t| t.to_string()).collect())
                .unwrap_or_default();

            Job {
                id: Uuid::new_v4(),
                title: title.to_string(),
                slug: slugify(title),
                description: format!(
                    "We are looking for an experienced {title} to join our team."
                ),
                status,
                tags,
                order: index as i64,
                created_at: now - Duration::days(rng.gen_range(1..60)),
                updated_at: now,
            }
        })
        .collect()
}

fn demo_candidates(jobs: &[Job], users: &[User]) -> (Vec<Candidate>, Vec<StageHistoryEvent>) {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let active_jobs: Vec<&Job> = jobs.iter().filter(|j| j.status == JobStatus::Active).collect();

    let mut candidates = Vec::new();
    let mut history = Vec::new();

    for _ in 0..25 {
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Alex");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Doe");
        let job = match active_jobs.choose(&mut rng) {
            Some(job) => *job,
            None => continue,
        };
        let stage = *Stage::ALL.choose(&mut rng).unwrap_or(&Stage::Applied);
        let applied_at = now - Duration::days(rng.gen_range(1..90));

        let candidate = Candidate {
            id: Uuid::new_v4(),
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}{}@example.com",
                first.to_lowercase(),
                last.to_lowercase(),
                rng.gen_range(1..1000)
            ),
            phone: format!("+1-555-{:04}", rng.gen_range(0..10_000)),
            job_id: job.id,
            current_stage: stage,
            applied_at,
            notes: Vec::new(),
        };

        let changed_by = users
            .choose(&mut rng)
            .map(|u| u.id.to_string())
            .unwrap_or_else(|| "system".to_string());

        // Genesis event, then one hop per stage on the forward path until the
        // candidate's current stage is reached.
        history.push(StageHistoryEvent {
            id: Uuid::new_v4(),
            candidate_id: candidate.id,
            from_stage: None,
            to_stage: Stage::Applied,
            timestamp: applied_at,
            changed_by: changed_by.clone(),
        });
        let stage_index = Stage::ALL.iter().position(|s| *s == stage).unwrap_or(0);
        for step in 1..=stage_index {
            history.push(StageHistoryEvent {
                id: Uuid::new_v4(),
                candidate_id: candidate.id,
                from_stage: Some(Stage::ALL[step - 1]),
                to_stage: Stage::ALL[step],
                timestamp: applied_at + Duration::days(5 * step as i64),
                changed_by: changed_by.clone(),
            });
        }

        candidates.push(candidate);
    }

    (candidates, history)
}

fn demo_assessments(jobs: &[Job]) -> Vec<Assessment> {
    let now = Utc::now();

    jobs.iter()
        .filter(|j| j.status == JobStatus::Active)
        .take(2)
        .map(|job| {
            let mut assessment = Assessment {
                id: Uuid::new_v4(),
                job_id: job.id,
                title: format!("{} Assessment", job.title),
                description: format!("Screening questionnaire for the {} role", job.title),
                sections: Vec::new(),
                created_at: now,
                updated_at: now,
            };

            let skills = assessment.add_section("Technical Skills");
            let ops = [
                (
                    "How many years of professional experience do you have?",
                    true,
                    QuestionKind::SingleChoice {
                        options: vec![
                            "0-2 years".into(),
                            "2-5 years".into(),
                            "5-10 years".into(),
                            "10+ years".into(),
                        ],
                    },
                ),
                (
                    "Which of the following technologies are you proficient in?",
                    true,
                    QuestionKind::MultiChoice {
                        options: vec![
                            "JavaScript".into(),
                            "TypeScript".into(),
                            "Rust".into(),
                            "Go".into(),
                            "Python".into(),
                        ],
                    },
                ),
                (
                    "On a scale of 1-10, how would you rate your problem-solving skills?",
                    true,
                    QuestionKind::Numeric {
                        min: Some(1),
                        max: Some(10),
                    },
                ),
                (
                    "What is your current job title?",
                    false,
                    QuestionKind::ShortText {
                        max_length: Some(100),
                    },
                ),
                (
                    "Describe a challenging project you worked on.",
                    true,
                    QuestionKind::LongText {
                        max_length: Some(500),
                    },
                ),
            ];
            for (text, required, kind) in ops {
                let _ = assessment.add_question(&skills, text, required, kind);
            }

            let preferences = assessment.add_section("Work Preferences");
            let _ = assessment.add_question(
                &preferences,
                "Upload your CV",
                false,
                QuestionKind::FileUpload {
                    accepted_formats: Some(vec![".pdf".into(), ".doc".into()]),
                },
            );

            assessment.normalize();
            assessment
        })
        .collect()
}
