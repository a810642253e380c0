//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use studyos_core::analytics::{OverallProgress, SubjectMetrics};
use studyos_core::importers::ImportSummary;
use studyos_core::models::{
    HabitCheck, JournalEntry, SavedContentItem, ScheduleBlock, Subject, Topic, UserProfile,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print any value as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print a single subject with its topics
    pub fn print_subject(&self, subject: &Subject) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", subject.id);
                println!("Name:      {}", subject.name);
                println!("Status:    {}", subject.status);
                println!("Dates:     {} → {}", subject.start_date, subject.exam_date);
                if let Some(archived) = subject.archived_date {
                    println!("Archived:  {}", archived);
                }
                if subject.target_score > 0 {
                    match subject.actual_score {
                        Some(actual) => {
                            println!("Score:     {} (target {})", actual, subject.target_score)
                        }
                        None => println!("Target:    {}", subject.target_score),
                    }
                }
                println!(
                    "Hours:     {:.1} / {:.1}",
                    subject.hours_completed, subject.total_hours
                );
                println!("Progress:  {:.0}%", subject.progress());

                if !subject.topics.is_empty() {
                    println!();
                    println!("── Topics ({}) ──", subject.topics.len());
                    for topic in &subject.topics {
                        println!("{}", topic_line(topic));
                    }
                }
            }
            OutputFormat::Json => self.json(subject)?,
            OutputFormat::Quiet => println!("{}", subject.id),
        }
        Ok(())
    }

    /// Print a list of subjects
    pub fn print_subjects(&self, subjects: &[Subject]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if subjects.is_empty() {
                    println!("No subjects found.");
                    return Ok(());
                }
                for subject in subjects {
                    println!(
                        "{} | {} | {:<8} | exam {} | {:>3.0}% | {} topic(s)",
                        truncate(&subject.id, 20),
                        truncate(&subject.name, 30),
                        subject.status,
                        subject.exam_date,
                        subject.progress(),
                        subject.topics.len()
                    );
                }
                println!("\n{} subject(s)", subjects.len());
            }
            OutputFormat::Json => self.json(subjects)?,
            OutputFormat::Quiet => {
                for subject in subjects {
                    println!("{}", subject.id);
                }
            }
        }
        Ok(())
    }

    pub fn print_topic(&self, topic: &Topic) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("{}", topic_line(topic));
                if !topic.notes.is_empty() {
                    println!("  {}", truncate_line(&topic.notes, 70));
                }
            }
            OutputFormat::Json => self.json(topic)?,
            OutputFormat::Quiet => println!("{}", topic.id),
        }
        Ok(())
    }

    /// Print one day of the schedule
    pub fn print_schedule(&self, date: NaiveDate, blocks: &[ScheduleBlock]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Schedule for {}", date);
                if blocks.is_empty() {
                    println!("Nothing planned.");
                    return Ok(());
                }
                for block in blocks {
                    println!(
                        "{} {} | {:>3} min | {:<8} | {} | {}",
                        if block.completed { "✓" } else { " " },
                        block.time.format("%H:%M"),
                        block.duration,
                        block.block_type,
                        truncate(&block.activity, 40),
                        short_id(&block.id)
                    );
                }
                let planned: u32 = blocks.iter().map(|b| b.duration).sum();
                println!("\n{} block(s), {} min planned", blocks.len(), planned);
            }
            OutputFormat::Json => self.json(blocks)?,
            OutputFormat::Quiet => {
                for block in blocks {
                    println!("{}", block.id);
                }
            }
        }
        Ok(())
    }

    pub fn print_journal(&self, date: NaiveDate, entry: Option<&JournalEntry>) -> Result<()> {
        match self.format {
            OutputFormat::Human => match entry {
                None => println!("No journal entry for {}.", date),
                Some(entry) => {
                    println!("Journal for {}", date);
                    for (field, value) in &entry.fields {
                        match value.as_str() {
                            Some(text) => println!("  {}: {}", field, text),
                            None => println!("  {}: {}", field, value),
                        }
                    }
                    println!("\nUpdated {}", entry.last_updated.format("%Y-%m-%d %H:%M"));
                }
            },
            OutputFormat::Json => self.json(&entry)?,
            OutputFormat::Quiet => {}
        }
        Ok(())
    }

    pub fn print_habits(
        &self,
        date: NaiveDate,
        habits: &BTreeMap<String, HabitCheck>,
        streaks: &BTreeMap<String, u32>,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Habits for {}", date);
                if habits.is_empty() {
                    println!("Nothing logged.");
                    return Ok(());
                }
                for (name, check) in habits {
                    let streak = streaks.get(name).copied().unwrap_or(0);
                    println!(
                        "{} {} ({} day streak)",
                        if check.completed { "✓" } else { "✗" },
                        name,
                        streak
                    );
                }
            }
            OutputFormat::Json => self.json(&serde_json::json!({
                "date": date,
                "habits": habits,
                "streaks": streaks,
            }))?,
            OutputFormat::Quiet => {
                for (name, check) in habits {
                    if check.completed {
                        println!("{}", name);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn print_profile(&self, profile: &UserProfile) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Name:           {}", profile.name.as_deref().unwrap_or("(not set)"));
                println!("Current streak: {} day(s)", profile.current_streak);
                println!("Longest streak: {} day(s)", profile.longest_streak);
                if let Some(last) = profile.last_study_date {
                    println!("Last studied:   {}", last);
                }
                println!("Study hours:    {:.1}", profile.total_study_hours);
                for (key, value) in &profile.extra {
                    println!("{:<15} {}", format!("{}:", key), value);
                }
            }
            OutputFormat::Json => self.json(profile)?,
            OutputFormat::Quiet => println!("{}", profile.current_streak),
        }
        Ok(())
    }

    /// Print the overall progress dashboard
    pub fn print_progress(&self, progress: &OverallProgress) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if progress.total_subjects == 0 {
                    println!("No active subjects.");
                    return Ok(());
                }
                println!(
                    "Overall progress: {}% across {} active subject(s)",
                    progress.average_progress, progress.total_subjects
                );
                println!("Study streak:     {} day(s)", progress.streak);

                if !progress.upcoming_exams.is_empty() {
                    println!();
                    println!("── Upcoming exams ──");
                    for exam in &progress.upcoming_exams {
                        println!(
                            "{} | {} | {}",
                            exam.exam_date,
                            truncate(&exam.subject_name, 30),
                            describe_days(exam.days_until)
                        );
                    }
                }

                if !progress.critical_topics.is_empty() {
                    println!();
                    println!("── Critical topics ──");
                    for topic in &progress.critical_topics {
                        println!(
                            "{:>3}% | {} / {}",
                            topic.mastery,
                            truncate(&topic.subject_name, 25),
                            truncate(&topic.topic_name, 35)
                        );
                    }
                }
            }
            OutputFormat::Json => self.json(progress)?,
            OutputFormat::Quiet => println!("{}", progress.average_progress),
        }
        Ok(())
    }

    pub fn print_metrics(&self, metrics: &SubjectMetrics) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Subject:         {}", metrics.subject_id);
                println!("Progress:        {}%", metrics.progress);
                println!(
                    "Topics:          {} total, {} completed, {} in progress, {} not started",
                    metrics.total_topics, metrics.completed, metrics.in_progress, metrics.not_started
                );
                println!("Time spent:      {:.1} h", metrics.time_spent);
                println!("Remaining (est): {:.1} h", metrics.remaining_hours);
                println!("Revisions done:  {}", metrics.revisions_completed);
                println!("Exam:            {}", describe_days(metrics.days_until_exam));
            }
            OutputFormat::Json => self.json(metrics)?,
            OutputFormat::Quiet => println!("{}", metrics.progress),
        }
        Ok(())
    }

    /// Print saved posts and videos
    pub fn print_content<'a>(
        &self,
        items: impl IntoIterator<Item = &'a SavedContentItem>,
    ) -> Result<()> {
        let items: Vec<&SavedContentItem> = items.into_iter().collect();
        match self.format {
            OutputFormat::Human => {
                if items.is_empty() {
                    println!("No saved content found.");
                    return Ok(());
                }
                for item in &items {
                    let title = if item.title.is_empty() { &item.url } else { &item.title };
                    println!(
                        "{} {:<9} | {} | {} | {}",
                        if item.watched { "✓" } else { " " },
                        item.platform,
                        truncate(&item.id, 14),
                        truncate_line(title, 45),
                        item.duration.as_deref().unwrap_or(&item.content_type)
                    );
                }
                println!("\n{} item(s)", items.len());
            }
            OutputFormat::Json => self.json(&items)?,
            OutputFormat::Quiet => {
                for item in &items {
                    println!("{}", item.id);
                }
            }
        }
        Ok(())
    }

    pub fn print_import(&self, summary: &ImportSummary) -> Result<()> {
        match self.format {
            OutputFormat::Human => println!(
                "✓ Imported {} item(s), skipped {} ({} stored)",
                summary.imported, summary.skipped, summary.total
            ),
            OutputFormat::Json => self.json(summary)?,
            OutputFormat::Quiet => println!("{}", summary.imported),
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"success": true, "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn topic_line(topic: &Topic) -> String {
    let flags = topic.revisions.flags();
    let revisions: String = flags
        .iter()
        .map(|done| if *done { '●' } else { '○' })
        .collect();
    format!(
        "{} | {:>3}% | {:<6} | {} | {:.1} h | {}",
        truncate(&topic.id, 20),
        topic.mastery,
        topic.priority,
        revisions,
        topic.time_spent,
        truncate(&topic.name, 35)
    )
}

/// "in 3 days", "today", "2 days ago"
fn describe_days(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d if d > 0 => format!("in {} days", d),
        -1 => "yesterday".to_string(),
        d => format!("{} days ago", -d),
    }
}

/// First eight characters of an id
fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("ÄÖÜäöüßÄÖÜ extra", 8), "ÄÖÜäö...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
        assert_eq!(truncate_line("very long single line here", 10), "very lo...");
    }

    #[test]
    fn test_describe_days() {
        assert_eq!(describe_days(0), "today");
        assert_eq!(describe_days(1), "tomorrow");
        assert_eq!(describe_days(12), "in 12 days");
        assert_eq!(describe_days(-1), "yesterday");
        assert_eq!(describe_days(-4), "4 days ago");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0f8a2c1e-77aa-4e0b"), "0f8a2c1e");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_topic_line_shows_revisions() {
        let mut topic = Topic::new("optics", "Optics");
        topic.mastery = 40;
        topic
            .revisions
            .mark_complete(studyos_core::models::RevisionLevel::Second, chrono::Utc::now());

        let line = topic_line(&topic);
        assert!(line.contains(" 40%"));
        assert!(line.contains("○●○"));
    }
}
