//! Finds every lesson held in one room across all published class plans.
//!
//! Usage: `room-lookup [BASE_URL] [ROOM] [--json]`
//!
//! Walks the numbered plan documents `o1.html` .. `o28.html` under the base
//! URL, scrapes each class with caching and day-sorting enabled, keeps the
//! lessons whose room matches, and prints them as a table (or JSON). The
//! first fetch error aborts the remaining classes.

use optivum_timetable::{Lesson, PlanScraper};
use url::Url;

const DEFAULT_BASE: &str = "http://zst.grudziadz.com.pl/plan/plany/";
const DEFAULT_ROOM: &str = "41";
const CLASS_COUNT: u32 = 28;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (base, room, json) = parse_args();

    let mut base_url = Url::parse(&base)?;
    if !base_url.path().ends_with('/') {
        base_url.set_path(&format!("{}/", base_url.path()));
    }

    let mut hits: Vec<(u32, Lesson)> = Vec::new();
    for class in 1..=CLASS_COUNT {
        let plan_url = base_url.join(&format!("o{class}.html"))?;
        eprintln!("Parsing o{class}.html ...");

        let mut scraper = PlanScraper::new(plan_url.as_str())?;
        let lessons = scraper.lessons(true, true)?;
        hits.extend(
            lessons
                .into_iter()
                .filter(|l| l.room_number == room)
                .map(|l| (class, l)),
        );
    }

    if json {
        let lessons: Vec<&Lesson> = hits.iter().map(|(_, l)| l).collect();
        println!("{}", serde_json::to_string_pretty(&lessons)?);
    } else {
        print_table(&room, &hits);
    }
    Ok(())
}

fn parse_args() -> (String, String, bool) {
    let mut base = DEFAULT_BASE.to_string();
    let mut room = DEFAULT_ROOM.to_string();
    let mut json = false;

    let mut positional = 0;
    for arg in std::env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else {
            match positional {
                0 => base = arg,
                _ => room = arg,
            }
            positional += 1;
        }
    }
    (base, room, json)
}

fn print_table(room: &str, hits: &[(u32, Lesson)]) {
    println!("Lessons in room {room}:");
    println!("{:<6} {:<4} {:<7} {:<24} {}", "class", "day", "period", "lesson", "teacher");
    for (class, lesson) in hits {
        println!(
            "o{:<5} {:<4} {:<7} {:<24} {}",
            class, lesson.day_index, lesson.period_index, lesson.name, lesson.teacher_id
        );
    }
    println!("{} lessons total", hits.len());
}
