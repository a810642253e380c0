//! Schedule mutators

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::required;
use crate::error::{CoreError, CoreResult};
use crate::models::{parse_time, NewScheduleBlock, Schedule, ScheduleBlock};
use crate::storage::DocumentKey;
use crate::store::Store;

impl Store {
    /// Blocks planned for `date`, sorted by start time
    pub fn schedule_for(&self, date: NaiveDate) -> Vec<ScheduleBlock> {
        let mut schedule: Schedule = self.read(DocumentKey::Schedule);
        schedule.remove(&date).unwrap_or_default()
    }

    /// Add a block to a day
    pub fn add_schedule_block(&self, date: NaiveDate, input: NewScheduleBlock) -> CoreResult<ScheduleBlock> {
        let time = parse_time(&input.time).ok_or_else(|| {
            CoreError::validation(format!("Invalid time: {}. Expected HH:mm", input.time))
        })?;
        let activity = required(&input.activity, "Activity is required")?;
        if input.duration == 0 {
            return Err(CoreError::validation("Duration must be at least one minute"));
        }

        let block = ScheduleBlock {
            id: Uuid::new_v4().to_string(),
            time,
            activity,
            block_type: input.block_type,
            duration: input.duration,
            completed: false,
            completed_at: None,
        };

        self.transact(DocumentKey::Schedule, |schedule: &mut Schedule| {
            let day = schedule.entry(date).or_default();
            day.push(block.clone());
            day.sort_by_key(|b| b.time);
            Ok(block)
        })
    }

    /// Mark a block as done
    pub fn complete_schedule_block(&self, date: NaiveDate, block_id: &str) -> CoreResult<ScheduleBlock> {
        self.transact(DocumentKey::Schedule, |schedule: &mut Schedule| {
            let block = schedule
                .get_mut(&date)
                .and_then(|day| day.iter_mut().find(|b| b.id == block_id))
                .ok_or_else(|| CoreError::not_found("Schedule block", block_id))?;
            block.completed = true;
            block.completed_at = Some(Utc::now());
            Ok(block.clone())
        })
    }

    /// Remove a block; an emptied day is dropped from the schedule
    pub fn delete_schedule_block(&self, date: NaiveDate, block_id: &str) -> CoreResult<ScheduleBlock> {
        self.transact(DocumentKey::Schedule, |schedule: &mut Schedule| {
            let day = schedule
                .get_mut(&date)
                .ok_or_else(|| CoreError::not_found("Schedule block", block_id))?;
            let position = day
                .iter()
                .position(|b| b.id == block_id)
                .ok_or_else(|| CoreError::not_found("Schedule block", block_id))?;
            let removed = day.remove(position);
            if day.is_empty() {
                schedule.remove(&date);
            }
            Ok(removed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn test_blocks_are_kept_in_time_order() {
        let store = Store::in_memory();
        store
            .add_schedule_block(date(), NewScheduleBlock::new("14:00", "Problem set", 90))
            .unwrap();
        store
            .add_schedule_block(date(), NewScheduleBlock::new("08:30", "Flashcards", 30))
            .unwrap();
        store
            .add_schedule_block(date(), NewScheduleBlock::new("10:00", "Lecture", 60))
            .unwrap();

        let activities: Vec<_> = store
            .schedule_for(date())
            .into_iter()
            .map(|b| b.activity)
            .collect();
        assert_eq!(activities, vec!["Flashcards", "Lecture", "Problem set"]);
        assert!(store.schedule_for(date().succ_opt().unwrap()).is_empty());
    }

    #[test]
    fn test_add_block_validation() {
        let store = Store::in_memory();

        let err = store
            .add_schedule_block(date(), NewScheduleBlock::new("25:00", "Lecture", 60))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid time: 25:00. Expected HH:mm");

        assert!(store
            .add_schedule_block(date(), NewScheduleBlock::new("09:00", " ", 60))
            .is_err());
        assert!(store
            .add_schedule_block(date(), NewScheduleBlock::new("09:00", "Lecture", 0))
            .is_err());
        assert!(store.documents().load_raw(DocumentKey::Schedule).unwrap().is_none());
    }

    #[test]
    fn test_complete_block() {
        let store = Store::in_memory();
        let block = store
            .add_schedule_block(date(), NewScheduleBlock::new("09:00", "Lecture", 60))
            .unwrap();
        assert_eq!(block.time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        let done = store.complete_schedule_block(date(), &block.id).unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());
        assert!(store.schedule_for(date())[0].completed);

        assert!(store.complete_schedule_block(date(), "missing").is_err());
    }

    #[test]
    fn test_delete_last_block_drops_the_day() {
        let store = Store::in_memory();
        let block = store
            .add_schedule_block(date(), NewScheduleBlock::new("09:00", "Lecture", 60))
            .unwrap();

        store.delete_schedule_block(date(), &block.id).unwrap();

        let schedule: Schedule = store.read(DocumentKey::Schedule);
        assert!(schedule.is_empty());
        assert!(store.delete_schedule_block(date(), &block.id).is_err());
    }
}
