//! studyos Core Library
//!
//! This crate provides the core of studyos, a local-first personal study
//! tracker: subjects and topics with mastery and spaced revisions, a daily
//! schedule, habits, a journal, a profile with study streaks, and saved
//! external content.
//!
//! # Architecture
//!
//! - **Documents**: each collection is one JSON document under a namespaced
//!   key (`studyos.subjects`, `studyos.schedule`, ...), persisted as a file
//!   per key in the data directory
//! - **Mutators**: validated read-modify-write transactions on one document
//! - **Analytics**: pure functions over a snapshot of the documents
//! - **Read models**: views that reload on interval ticks and on writes
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open()?;
//!
//! let physics = store.add_subject(NewSubject::new("Physics", exam_date))?;
//! let optics = store.add_topic(&physics.id, NewTopic::new("Optics"))?;
//! store.update_topic_mastery(&physics.id, &optics.id, 60)?;
//!
//! let progress = store.overall_progress();
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Subjects, topics, schedule, journal, habits, profile, content
//! - `analytics`: Progress aggregates and streak rules
//! - `read_model`: Self-refreshing views
//! - `importers`: YouTube and scraper imports
//! - `services`: Traits for external knowledge and video services
//! - `storage`: Backends, backup bundles and storage errors
//! - `config`: Application configuration

pub mod analytics;
pub mod config;
pub mod error;
pub mod importers;
pub mod models;
mod mutators;
pub mod read_model;
pub mod services;
pub mod storage;
pub mod store;

pub use analytics::{OverallProgress, SubjectMetrics};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use importers::{ImportSummary, ScrapedItem, YoutubeVideo};
pub use models::{
    NewScheduleBlock, NewSubject, NewTopic, Platform, Priority, ProfileUpdate, Subject,
    SubjectStatus, SubjectUpdate, Topic,
};
pub use read_model::{ReadModel, Snapshot};
pub use storage::{DocumentKey, StorageError, StorageStats};
pub use store::Store;
