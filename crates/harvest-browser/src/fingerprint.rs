use harvest_core::BrowserConfig;
use rand::seq::SliceRandom;
use rand::Rng;

/// Common desktop user agents
const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
];

/// Common viewport sizes
const VIEWPORTS: [(u32, u32); 4] = [(1920, 1080), (1366, 768), (1536, 864), (1440, 900)];

/// Identity a browser session presents to the sites it visits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl FingerprintConfig {
    /// Generate a randomized fingerprint configuration
    pub fn randomized() -> Self {
        let mut rng = rand::thread_rng();

        let user_agent = USER_AGENTS
            .choose(&mut rng)
            .copied()
            .unwrap_or(USER_AGENTS[0]);
        let (width, height) = VIEWPORTS[rng.gen_range(0..VIEWPORTS.len())];

        Self {
            user_agent: user_agent.to_string(),
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Fingerprint from configuration: a fixed user agent when one is set,
    /// a randomized one otherwise. The viewport always follows the config.
    pub fn from_config(config: &BrowserConfig) -> Self {
        let user_agent = config
            .user_agent
            .clone()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| Self::randomized().user_agent);

        Self {
            user_agent,
            viewport_width: config.window_width,
            viewport_height: config.window_height,
        }
    }
}
