//! Scraper for Vulcan Optivum HTML lesson plans.
//!
//! Fetches a published class plan, walks its `table.tabela` markup and turns
//! it into [`Lesson`] records:
//! - grouped cells (parallel language tracks) split into one record per group
//! - the shared-teacher markup defect of combined slots is reconciled
//! - results can be day-sorted, day-filtered and cached in memory
//!
//! ```no_run
//! use optivum_timetable::PlanScraper;
//!
//! let mut scraper = PlanScraper::new("http://zst.grudziadz.com.pl/plan/plany/o1.html")?;
//! for lesson in scraper.lessons(true, true)? {
//!     println!("{} {} {}", lesson.day_index, lesson.period_index, lesson.name);
//! }
//! # Ok::<(), optivum_timetable::Error>(())
//! ```

pub mod error;
pub mod extract;
pub mod lesson;
pub mod plan;

pub use error::{Error, Result};
pub use extract::{parse_timetable, ParseOutcome, HEADER_ROWS};
pub use lesson::Lesson;
pub use plan::PlanScraper;
