//! Store methods for saved container state.

use crate::{error::SimResult, types::Tick};
use rusqlite::{params, OptionalExtension};

use super::SimStore;

impl SimStore {
    /// Upsert one container's JSON under its namespaced key.
    pub fn save_container(
        &self,
        run_id:     &str,
        key:        &str,
        state_json: &str,
        tick:       Tick,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO container_state (run_id, key, state_json, saved_tick, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (run_id, key) DO UPDATE SET
                 state_json = excluded.state_json,
                 saved_tick = excluded.saved_tick,
                 saved_at   = excluded.saved_at",
            params![run_id, key, state_json, tick as i64, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn load_container(&self, run_id: &str, key: &str) -> SimResult<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT state_json FROM container_state WHERE run_id = ?1 AND key = ?2",
                params![run_id, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(json)
    }

    /// Tick of the most recent save for this run, if any.
    pub fn last_saved_tick(&self, run_id: &str) -> SimResult<Option<Tick>> {
        let tick = self
            .conn
            .query_row(
                "SELECT MAX(saved_tick) FROM container_state WHERE run_id = ?1",
                params![run_id],
                |row| row.get::<_, Option<i64>>(0),
            )?;
        Ok(tick.map(|t| t as u64))
    }
}
