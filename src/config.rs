//! Runtime configuration for the Skirmish server.
//!
//! Lifecycle: `main` calls [`init`] once before serving any action; every later
//! [`settings`] call observes that value and it never changes afterwards. If
//! nothing was injected the first read falls back to [`Settings::from_env`].

use once_cell::sync::OnceCell;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Whether players may open play sessions at all.
    pub game_started: bool,
    /// Waiting duel tickets older than this are purged. `None` keeps them forever.
    pub queue_ttl: Option<Duration>,
    /// Upper bound on one whole game transaction.
    pub store_timeout: Duration,
    /// How long a play session keeps accepting actions.
    pub session_window: Duration,
    /// Redis pub/sub channel of the shared narrative feed.
    pub feed_channel: String,
    /// How long a reply waits for its feed line before leaving it in flight.
    pub feed_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            game_started: true,
            queue_ttl: None,
            store_timeout: Duration::from_millis(5_000),
            session_window: Duration::from_secs(3_600),
            feed_channel: "game:feed".into(),
            feed_timeout: Duration::from_millis(500),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();

        let game_started = env::var("GAME_STARTED")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.game_started);

        // 0 (or unset) = never expire
        let queue_ttl = env::var("QUEUE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let store_timeout = env::var("STORE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.store_timeout);

        let session_window = env::var("SESSION_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_window);

        let feed_channel = env::var("FEED_CHANNEL").unwrap_or(defaults.feed_channel);

        let feed_timeout = env::var("FEED_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.feed_timeout);

        Settings {
            game_started,
            queue_ttl,
            store_timeout,
            session_window,
            feed_channel,
            feed_timeout,
        }
    }
}

static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// Inject the process-wide settings. Returns the rejected value if settings
/// were already fixed (injected earlier or already read).
pub fn init(settings: Settings) -> Result<(), Settings> {
    SETTINGS.set(settings)
}

pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(Settings::from_env)
}
