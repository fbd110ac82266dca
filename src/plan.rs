//! Fetching, caching and querying one class plan.

use std::time::Duration;

use log::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::extract::parse_timetable;
use crate::lesson::Lesson;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!("optivum-timetable/", env!("CARGO_PKG_VERSION"));

/// Cached extraction result, tagged with the sort state it was produced in.
///
/// A sorted plan is also a valid answer to an unsorted request, so `Sorted`
/// satisfies both; `Unsorted` only satisfies unsorted requests. Callers that
/// want reliable cache hits should request a consistent sort state.
#[derive(Debug, Default)]
enum PlanCache {
    #[default]
    Empty,
    Unsorted(Vec<Lesson>),
    Sorted(Vec<Lesson>),
}

impl PlanCache {
    fn lookup(&self, sort_by_day: bool) -> Option<&Vec<Lesson>> {
        match self {
            PlanCache::Sorted(lessons) => Some(lessons),
            PlanCache::Unsorted(lessons) if !sort_by_day => Some(lessons),
            _ => None,
        }
    }
}

/// Scraper for a single class plan document.
///
/// One instance per plan URL; instances are independent, so a batch caller
/// can drive several of them side by side. The last extraction result is
/// kept in memory and reused when the caller opts into caching.
#[derive(Debug)]
pub struct PlanScraper {
    url: Url,
    agent: ureq::Agent,
    cache: PlanCache,
}

impl PlanScraper {
    /// Create a scraper with the default timeout and user-agent.
    pub fn new(url: &str) -> Result<Self> {
        Self::with_config(url, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT)
    }

    /// Create a scraper with an explicit request timeout and user-agent.
    pub fn with_config(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(Duration::from_secs(timeout_secs)))
                .user_agent(user_agent)
                .build(),
        );
        Ok(Self {
            url,
            agent,
            cache: PlanCache::Empty,
        })
    }

    /// The plan URL this scraper was built for.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the raw plan HTML. Useful on its own for debugging.
    ///
    /// Any transport error or non-success status is returned as-is; there is
    /// no retry and no empty-document fallback.
    pub fn fetch_document(&self) -> Result<String> {
        match self.agent.get(self.url.as_str()).call() {
            Ok(resp) if resp.status().is_success() => {
                resp.into_body().read_to_string().map_err(|e| Error::Network {
                    url: self.url.to_string(),
                    source: Box::new(e),
                })
            }
            Ok(resp) => Err(Error::Status {
                status: resp.status().as_u16(),
                url: self.url.to_string(),
            }),
            Err(ureq::Error::StatusCode(status)) => Err(Error::Status {
                status,
                url: self.url.to_string(),
            }),
            Err(e) => Err(Error::Network {
                url: self.url.to_string(),
                source: Box::new(e),
            }),
        }
    }

    /// Fetch and extract all lessons of this plan.
    ///
    /// With `use_cache`, a previous result in a compatible sort state is
    /// returned without touching the network. With `sort_by_day`, the result
    /// is stably sorted by ascending day index before being cached.
    pub fn lessons(&mut self, use_cache: bool, sort_by_day: bool) -> Result<Vec<Lesson>> {
        if use_cache {
            if let Some(lessons) = self.cache.lookup(sort_by_day) {
                debug!("cache hit for {} (sorted: {})", self.url, sort_by_day);
                return Ok(lessons.clone());
            }
        }

        let html = self.fetch_document()?;
        Ok(self.lessons_from_html(&html, sort_by_day))
    }

    /// Extract lessons from an already fetched document, updating the cache.
    ///
    /// This is the parse step of [`PlanScraper::lessons`] without the fetch;
    /// it cannot fail, malformed markup yields an empty plan.
    pub fn lessons_from_html(&mut self, html: &str, sort_by_day: bool) -> Vec<Lesson> {
        let outcome = parse_timetable(html);
        let mut lessons = outcome.lessons;

        if sort_by_day {
            // sort_by_key is stable: same-day lessons keep document order.
            lessons.sort_by_key(|l| l.day_index);
            self.cache = PlanCache::Sorted(lessons.clone());
        } else {
            self.cache = PlanCache::Unsorted(lessons.clone());
        }
        lessons
    }

    /// Lessons of a single weekday, 0 = Monday .. 4 = Friday.
    ///
    /// Validates the day before any network or parse work; an in-range day
    /// with no lessons is an empty result, not an error.
    pub fn lessons_by_day(&mut self, day: i32, use_cache: bool) -> Result<Vec<Lesson>> {
        if !(0..=4).contains(&day) {
            return Err(Error::InvalidDay(day));
        }

        let lessons = self.lessons(use_cache, false)?;
        Ok(lessons
            .into_iter()
            .filter(|l| l.day_index == day as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    const PLAN_HTML: &str = r#"
    <table class="tabela">
        <tr><th>Nr</th><th>Pon</th><th>Wt</th></tr>
        <tr><td class="nr">1</td>
            <td class="l"><span class="p">matematyka</span> <span class="n">An</span> <span class="s">12</span></td>
            <td class="l"><span class="p">fizyka</span> <span class="n">Cz</span> <span class="s">110</span></td>
        </tr>
        <tr><td class="nr">2</td>
            <td class="l"><span class="p">j.polski</span> <span class="n">Bk</span> <span class="s">7</span></td>
            <td class="l">&nbsp;</td>
        </tr>
    </table>
    "#;

    /// URL that nothing listens on; any fetch attempt fails fast.
    const DEAD_URL: &str = "http://127.0.0.1:1/plan/o1.html";

    /// Serve `count` HTTP responses on an ephemeral port, then stop.
    fn serve(status_line: &'static str, body: &'static str, count: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/plan/o1.html", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            for _ in 0..count {
                let Ok((mut stream, _)) = listener.accept() else { return };
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        url
    }

    #[test]
    fn test_fetch_and_parse() {
        let url = serve("200 OK", PLAN_HTML, 1);
        let mut scraper = PlanScraper::new(&url).unwrap();
        let lessons = scraper.lessons(false, false).unwrap();
        assert_eq!(lessons.len(), 3);
        assert_eq!(lessons[0].name, "matematyka");
    }

    #[test]
    fn test_cache_hit_fetches_once() {
        // The server answers exactly one request; the second call must be
        // served from cache or it would fail on a refused connection.
        let url = serve("200 OK", PLAN_HTML, 1);
        let mut scraper = PlanScraper::new(&url).unwrap();
        let first = scraper.lessons(true, true).unwrap();
        let second = scraper.lessons(true, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sorted_cache_serves_unsorted_request() {
        let mut scraper = PlanScraper::new(DEAD_URL).unwrap();
        scraper.lessons_from_html(PLAN_HTML, true);
        let lessons = scraper.lessons(true, false).unwrap();
        assert_eq!(lessons.len(), 3);
    }

    #[test]
    fn test_unsorted_cache_misses_sorted_request() {
        let mut scraper = PlanScraper::new(DEAD_URL).unwrap();
        scraper.lessons_from_html(PLAN_HTML, false);
        // A sorted request cannot be answered from the unsorted cache, so
        // the scraper goes back to the (dead) network.
        assert!(matches!(
            scraper.lessons(true, true),
            Err(Error::Network { .. })
        ));
    }

    #[test]
    fn test_sorting_is_stable_and_idempotent() {
        let mut scraper = PlanScraper::new(DEAD_URL).unwrap();
        let sorted = scraper.lessons_from_html(PLAN_HTML, true);

        assert!(sorted.windows(2).all(|w| w[0].day_index <= w[1].day_index));
        // Same-day lessons keep their document order after sorting.
        let monday: Vec<_> = sorted.iter().filter(|l| l.day_index == 0).collect();
        assert_eq!(monday[0].name, "matematyka");
        assert_eq!(monday[1].name, "j.polski");

        let mut resorted = sorted.clone();
        resorted.sort_by_key(|l| l.day_index);
        assert_eq!(resorted, sorted);
    }

    #[test]
    fn test_lessons_by_day_filters_exactly() {
        let mut scraper = PlanScraper::new(DEAD_URL).unwrap();
        scraper.lessons_from_html(PLAN_HTML, false);

        let monday = scraper.lessons_by_day(0, true).unwrap();
        assert_eq!(monday.len(), 2);
        assert!(monday.iter().all(|l| l.day_index == 0));

        let friday = scraper.lessons_by_day(4, true).unwrap();
        assert!(friday.is_empty());
    }

    #[test]
    fn test_lessons_by_day_rejects_out_of_range() {
        // Validation fires before any fetch, so the dead URL is never hit.
        let mut scraper = PlanScraper::new(DEAD_URL).unwrap();
        assert!(matches!(
            scraper.lessons_by_day(-1, true),
            Err(Error::InvalidDay(-1))
        ));
        assert!(matches!(
            scraper.lessons_by_day(5, true),
            Err(Error::InvalidDay(5))
        ));
    }

    #[test]
    fn test_http_500_surfaces_and_populates_no_cache() {
        let url = serve("500 Internal Server Error", "boom", 2);
        let mut scraper = PlanScraper::new(&url).unwrap();

        match scraper.lessons(true, true) {
            Err(Error::Status { status: 500, .. }) => {}
            other => panic!("expected status error, got {other:?}"),
        }
        // Nothing was cached, so the retry fetches again and fails again.
        assert!(scraper.lessons(true, true).is_err());
    }

    #[test]
    fn test_invalid_url_is_rejected_at_construction() {
        assert!(matches!(
            PlanScraper::new("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }
}
