// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Duplicate pair storage operations.

use rusqlite::{params, Connection, OptionalExtension, Params, Row};

use super::{PairStore, SqliteStorage, StorageError};
use crate::contact::ContactId;
use crate::duplicate::{canonical_pair, DuplicateCandidate, DuplicatePair, PairId, PairStatus};

const PAIR_COLUMNS: &str =
    "id, contact_a, contact_b, similarity_score, match_type, status, created_at";

/// Internal struct for database row data.
struct PairRow {
    id: PairId,
    contact_a: ContactId,
    contact_b: ContactId,
    similarity_score: f64,
    match_type: String,
    status: String,
    created_at: i64,
}

impl PairRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PairRow {
            id: row.get(0)?,
            contact_a: row.get(1)?,
            contact_b: row.get(2)?,
            similarity_score: row.get(3)?,
            match_type: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_pair(self) -> Result<DuplicatePair, StorageError> {
        let match_type = self
            .match_type
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("pair {}: {}", self.id, e)))?;
        let status = self
            .status
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("pair {}: {}", self.id, e)))?;

        Ok(DuplicatePair {
            id: self.id,
            contact_a: self.contact_a,
            contact_b: self.contact_b,
            similarity_score: self.similarity_score,
            match_type,
            status,
            created_at: self.created_at.max(0) as u64,
        })
    }
}

fn query_pairs<P: Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Vec<DuplicatePair>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAIR_COLUMNS} FROM duplicate_pairs {filter}"
    ))?;
    let rows = stmt.query_map(params, PairRow::from_row)?;

    let mut pairs = Vec::new();
    for row in rows {
        pairs.push(row?.into_pair()?);
    }
    Ok(pairs)
}

impl PairStore for SqliteStorage {
    fn find_existing(
        &self,
        a: ContactId,
        b: ContactId,
    ) -> Result<Option<DuplicatePair>, StorageError> {
        let (a, b) = canonical_pair(a, b);
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {PAIR_COLUMNS} FROM duplicate_pairs
                     WHERE contact_a = ?1 AND contact_b = ?2"
                ),
                params![a, b],
                PairRow::from_row,
            )
            .optional()?;
        row.map(PairRow::into_pair).transpose()
    }

    fn save_all(
        &self,
        candidates: Vec<DuplicateCandidate>,
    ) -> Result<Vec<DuplicatePair>, StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut inserted = Vec::with_capacity(candidates.len());

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO duplicate_pairs
                 (contact_a, contact_b, similarity_score, match_type, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for candidate in candidates {
                let (a, b) = canonical_pair(candidate.contact_a, candidate.contact_b);
                let changed = stmt.execute(params![
                    a,
                    b,
                    candidate.similarity_score,
                    candidate.match_type.as_str(),
                    PairStatus::Pending.as_str(),
                    candidate.created_at as i64,
                ])?;
                // Zero rows means the unique (contact_a, contact_b) constraint fired
                if changed == 1 {
                    inserted.push(candidate.into_pair(tx.last_insert_rowid()));
                }
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn find_by_id(&self, id: PairId) -> Result<Option<DuplicatePair>, StorageError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {PAIR_COLUMNS} FROM duplicate_pairs WHERE id = ?1"),
                params![id],
                PairRow::from_row,
            )
            .optional()?;
        row.map(PairRow::into_pair).transpose()
    }

    fn save(&self, pair: &DuplicatePair) -> Result<(), StorageError> {
        let rows_affected = self.conn()?.execute(
            "UPDATE duplicate_pairs
             SET similarity_score = ?2, match_type = ?3, status = ?4
             WHERE id = ?1",
            params![
                pair.id,
                pair.similarity_score,
                pair.match_type.as_str(),
                pair.status.as_str(),
            ],
        )?;
        if rows_affected == 0 {
            return Err(StorageError::NotFound(format!("duplicate pair {}", pair.id)));
        }
        Ok(())
    }

    fn update_status_if(
        &self,
        id: PairId,
        expected: PairStatus,
        next: PairStatus,
    ) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let rows_affected = conn.execute(
            "UPDATE duplicate_pairs SET status = ?3 WHERE id = ?1 AND status = ?2",
            params![id, expected.as_str(), next.as_str()],
        )?;
        if rows_affected == 1 {
            return Ok(true);
        }

        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM duplicate_pairs WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(false)
        } else {
            Err(StorageError::NotFound(format!("duplicate pair {}", id)))
        }
    }

    fn find_all(&self) -> Result<Vec<DuplicatePair>, StorageError> {
        query_pairs(&*self.conn()?, "ORDER BY id", [])
    }

    fn find_all_pending(&self) -> Result<Vec<DuplicatePair>, StorageError> {
        query_pairs(
            &*self.conn()?,
            "WHERE status = ?1 ORDER BY similarity_score DESC, id",
            params![PairStatus::Pending.as_str()],
        )
    }

    fn find_pending_for_contact(
        &self,
        contact_id: ContactId,
    ) -> Result<Vec<DuplicatePair>, StorageError> {
        query_pairs(
            &*self.conn()?,
            "WHERE status = ?1 AND (contact_a = ?2 OR contact_b = ?2)
             ORDER BY similarity_score DESC, id",
            params![PairStatus::Pending.as_str(), contact_id],
        )
    }

    fn find_high_confidence(&self, threshold: f64) -> Result<Vec<DuplicatePair>, StorageError> {
        query_pairs(
            &*self.conn()?,
            "WHERE status = ?1 AND similarity_score >= ?2
             ORDER BY similarity_score DESC, id",
            params![PairStatus::Pending.as_str(), threshold],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicate::MatchType;

    #[test]
    fn test_unique_constraint_skips_reversed_pair() {
        let storage = SqliteStorage::in_memory().unwrap();
        let first = storage
            .save_all(vec![DuplicateCandidate::new(1, 2, 1.0, MatchType::EmailExact)])
            .unwrap();
        assert_eq!(first.len(), 1);

        let second = storage
            .save_all(vec![DuplicateCandidate::new(2, 1, 1.0, MatchType::EmailExact)])
            .unwrap();
        assert!(second.is_empty());
        assert_eq!(storage.find_all().unwrap().len(), 1);
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let storage = SqliteStorage::in_memory().unwrap();
        let candidate = DuplicateCandidate::new(7, 3, 0.85, MatchType::PhoneFuzzy);
        let created_at = candidate.created_at;
        let saved = storage.save_all(vec![candidate]).unwrap().remove(0);

        let loaded = storage.find_by_id(saved.id).unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!((loaded.contact_a, loaded.contact_b), (3, 7));
        assert_eq!(loaded.created_at, created_at);
        assert_eq!(loaded.status, PairStatus::Pending);
    }

    #[test]
    fn test_update_status_if_unknown_pair() {
        let storage = SqliteStorage::in_memory().unwrap();
        let result = storage.update_status_if(99, PairStatus::Pending, PairStatus::Ignored);
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_match_type_is_reported() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO duplicate_pairs
                 (contact_a, contact_b, similarity_score, match_type, status, created_at)
                 VALUES (1, 2, 0.9, 'EMAIL', 'PENDING', 0)",
                [],
            )
            .unwrap();
        assert!(matches!(storage.find_all(), Err(StorageError::Corrupt(_))));
    }
}
