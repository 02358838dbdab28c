//! services/api/src/bin/seed.rs
//!
//! Wipes the database and repopulates it with sample users, jobs, and
//! applications for local development.

use api_lib::{adapters::PgStore, config::ConfigError, error::ApiError};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use udaan_core::domain::{ApplicationStatus, NewApplication, NewJob, NewUser, Role};
use udaan_core::ports::{ApplicationRepository, JobRepository, UserRepository};

struct SeedUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: Role,
}

const SEED_USERS: &[SeedUser] = &[
    SeedUser {
        name: "Rahul Sharma",
        email: "rahul.sharma@student.com",
        password: "student123",
        role: Role::Student,
    },
    SeedUser {
        name: "Priya Patel",
        email: "priya.patel@student.com",
        password: "student123",
        role: Role::Student,
    },
    SeedUser {
        name: "Amit Kumar",
        email: "amit.kumar@student.com",
        password: "student123",
        role: Role::Student,
    },
    SeedUser {
        name: "Dr. Rajesh Verma",
        email: "admin@udaan.com",
        password: "admin123",
        role: Role::Admin,
    },
    SeedUser {
        name: "Sundar Pichai",
        email: "hr@google.com",
        password: "recruiter123",
        role: Role::Recruiter,
    },
    SeedUser {
        name: "Neha Kapoor",
        email: "talent@flipkart.com",
        password: "recruiter123",
        role: Role::Recruiter,
    },
];

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("failed to hash seed password: {}", e)))
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    let store = PgStore::new(pool);
    store.run_migrations().await?;

    info!("Clearing existing data...");
    store.wipe().await?;

    let users = &store as &dyn UserRepository;
    let jobs = &store as &dyn JobRepository;
    let applications = &store as &dyn ApplicationRepository;

    // --- Users ---
    let mut created = Vec::new();
    for seed in SEED_USERS {
        let user = users
            .insert(NewUser {
                name: seed.name.to_string(),
                email: seed.email.to_string(),
                password_hash: hash_password(seed.password)?,
                role: seed.role,
            })
            .await?;
        created.push(user);
    }
    info!("Inserted {} users", created.len());

    let by_email = |email: &str| {
        created
            .iter()
            .find(|u| u.email == email)
            .expect("seed user was just inserted")
    };
    let recruiter_google = by_email("hr@google.com");
    let recruiter_flipkart = by_email("talent@flipkart.com");

    // --- Jobs ---
    let job_google = jobs
        .insert(NewJob {
            title: "Software Engineer Intern".to_string(),
            company: "Google India".to_string(),
            location: Some("Bangalore".to_string()),
            description: Some(
                "Work on Google-scale systems and help build scalable web services.".to_string(),
            ),
            skills_required: vec!["dsa".to_string(), "rust".to_string()],
            eligibility: "B.Tech (CS/IT) with CGPA 8.0+".to_string(),
            last_date: NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid date"),
            posted_by: Some(recruiter_google.id),
        })
        .await?;
    let job_flipkart = jobs
        .insert(NewJob {
            title: "Frontend Developer".to_string(),
            company: "Flipkart".to_string(),
            location: Some("Bangalore".to_string()),
            description: Some("Develop modern web UIs using React and TypeScript.".to_string()),
            skills_required: vec!["react".to_string(), "typescript".to_string()],
            eligibility: "B.Tech (CS/IT) with CGPA 7.5+".to_string(),
            last_date: NaiveDate::from_ymd_opt(2026, 11, 30).expect("valid date"),
            posted_by: Some(recruiter_flipkart.id),
        })
        .await?;
    info!("Inserted 2 jobs");

    // --- Applications (already under review) ---
    let first = applications
        .insert(NewApplication {
            student_id: by_email("rahul.sharma@student.com").id,
            job_id: job_google.id,
            resume: None,
        })
        .await?;
    applications
        .set_status(first.id, ApplicationStatus::Pending)
        .await?;
    let second = applications
        .insert(NewApplication {
            student_id: by_email("priya.patel@student.com").id,
            job_id: job_flipkart.id,
            resume: None,
        })
        .await?;
    applications
        .set_status(second.id, ApplicationStatus::Pending)
        .await?;
    info!("Inserted 2 applications");

    info!("Database seeded successfully");
    for seed in SEED_USERS {
        info!(
            "login: {} / {} ({})",
            seed.email,
            seed.password,
            seed.role.as_str()
        );
    }

    Ok(())
}
