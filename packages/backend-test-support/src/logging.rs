//! Test logging shared by unit tests (installed from a `ctor` hook) and the
//! integration test binaries (called from their fixtures).

use once_cell::sync::OnceCell;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// sqlx logs every statement at info; keep it out of engine traces.
const QUIET_DIRECTIVES: &[&str] = &["sqlx=warn", "sea_orm=warn"];

fn filter() -> EnvFilter {
    let base = std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    QUIET_DIRECTIVES
        .iter()
        .filter_map(|d| d.parse::<Directive>().ok())
        .fold(EnvFilter::new(base), EnvFilter::add_directive)
}

/// Install the test subscriber once per process.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, else `warn`.
/// `TEST_LOG_FORMAT=json` emits the same JSON lines the server writes,
/// which helps when checking span fields such as `session_id`.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let json = std::env::var("TEST_LOG_FORMAT").is_ok_and(|f| f == "json");
        let builder = fmt().with_env_filter(filter()).with_test_writer().without_time();
        if json {
            builder.json().with_current_span(true).try_init().ok();
        } else {
            builder.try_init().ok();
        }
    });
}
