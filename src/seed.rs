//! Startup seeding.
//!
//! Runs before the listener binds. An empty store gets the fixed sample
//! records, each with its verification number derived from the configured
//! secret. A non-empty store is left untouched, so restarts keep whatever
//! codes were derived under the secret in effect at first seed.
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    database::{self, Registration},
    verification::derive_code,
};

struct SampleRecord {
    reg_no: &'static str,
    name: &'static str,
    father_name: &'static str,
    mother_name: &'static str,
    venue: &'static str,
}

const SAMPLE_RECORDS: [SampleRecord; 5] = [
    SampleRecord {
        reg_no: "12345678",
        name: "Sohel Rahman",
        father_name: "Siddiqur Rahman",
        mother_name: "Hosne Ara Begu",
        venue: "BUET, ECE Building, Room 233",
    },
    SampleRecord {
        reg_no: "87654321",
        name: "John Doe",
        father_name: "Robert Doe",
        mother_name: "Jane Doe",
        venue: "BUET, CSE Building, Room 101",
    },
    SampleRecord {
        reg_no: "11223344",
        name: "Alice Smith",
        father_name: "Bob Smith",
        mother_name: "Carol Smith",
        venue: "BUET, EEE Building, Room 205",
    },
    SampleRecord {
        reg_no: "55667788",
        name: "Mohammad Rahman",
        father_name: "Abdul Rahman",
        mother_name: "Fatima Rahman",
        venue: "BUET, ME Building, Room 150",
    },
    SampleRecord {
        reg_no: "99887766",
        name: "Sarah Johnson",
        father_name: "Michael Johnson",
        mother_name: "Lisa Johnson",
        venue: "BUET, CE Building, Room 301",
    },
];

pub async fn seed(pool: &SqlitePool, secret: &str) -> Result<(), sqlx::Error> {
    if database::count_registrations(pool).await? > 0 {
        return Ok(());
    }

    info!("Setting up sample data...");

    for record in &SAMPLE_RECORDS {
        let registration = Registration {
            reg_no: record.reg_no.to_string(),
            name: record.name.to_string(),
            father_name: Some(record.father_name.to_string()),
            mother_name: Some(record.mother_name.to_string()),
            venue: Some(record.venue.to_string()),
            verification_no: derive_code(secret, record.reg_no),
        };

        database::upsert_registration(pool, &registration).await?;
        info!(
            "Added: {} -> {}",
            registration.reg_no, registration.verification_no
        );
    }

    info!("Sample data added successfully");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{SAMPLE_RECORDS, seed};
    use crate::{
        config::DEV_FALLBACK_SECRET,
        database::{count_registrations, find_registration, list_registrations, memory_pool},
        verification::derive_code,
    };

    #[tokio::test]
    async fn test_seeds_all_sample_records() {
        let pool = memory_pool().await;

        seed(&pool, DEV_FALLBACK_SECRET).await.unwrap();

        assert_eq!(
            count_registrations(&pool).await.unwrap(),
            SAMPLE_RECORDS.len() as i64
        );
    }

    #[tokio::test]
    async fn test_codes_match_derivation() {
        let pool = memory_pool().await;

        seed(&pool, DEV_FALLBACK_SECRET).await.unwrap();

        for record in &SAMPLE_RECORDS {
            let code = derive_code(DEV_FALLBACK_SECRET, record.reg_no);
            let row = find_registration(&pool, record.reg_no, &code)
                .await
                .unwrap()
                .expect("seeded record should match its derived code");

            assert_eq!(row.name, record.name);
            assert_eq!(row.venue.as_deref(), Some(record.venue));
        }
    }

    #[tokio::test]
    async fn test_reseeding_is_a_noop() {
        let pool = memory_pool().await;

        seed(&pool, DEV_FALLBACK_SECRET).await.unwrap();
        let before = list_registrations(&pool).await.unwrap();

        // second run must not touch rows even under a different secret
        seed(&pool, "rotated-secret").await.unwrap();
        let after = list_registrations(&pool).await.unwrap();

        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.reg_no, b.reg_no);
            assert_eq!(a.verification_no, b.verification_no);
        }
    }
}
